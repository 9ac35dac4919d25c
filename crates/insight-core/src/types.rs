use crate::{
    Result,
    constants::{DEFAULT_PAGE_LIMIT, MAX_RATING, MIN_RATING, MONEY_SCALE, STATE_CODE_LENGTH},
    error::Error,
};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Generate a fresh opaque identifier (UUID v4, hyphenated).
///
/// All entities use random string keys rather than sequential integers.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Inclusive calendar date range `[start, end]`.
///
/// Construction guarantees `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = Error;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Create a range, rejecting `start > end`.
    ///
    /// # Errors
    /// Returns `Error::InvalidDateRange` when the start falls after the end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidDateRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    /// Range covering a single day.
    #[must_use]
    pub fn single_day(date: NaiveDate) -> Self {
        DateRange {
            start: date,
            end: date,
        }
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inclusive-bounds intersection test: `a1 <= b2 && b1 <= a2`.
    ///
    /// Ranges that only share a boundary day overlap, so a booking ending on
    /// the 15th blocks another one starting on the 15th.
    #[inline]
    #[must_use]
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Whether `date` falls inside the range (bounds included).
    #[inline]
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether `other` lies entirely inside this range.
    #[inline]
    #[must_use]
    pub fn contains_range(&self, other: &DateRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Number of calendar days covered, bounds included.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Non-negative monetary amount with two decimal places.
///
/// Stored as an integer number of centavos so sums stay exact in SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Create an amount from a decimal value, rounding half away from zero
    /// to two places.
    ///
    /// # Errors
    /// Returns `Error::InvalidAmount` for negative values or values that do
    /// not fit in 64-bit centavos.
    pub fn new(amount: Decimal) -> Result<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(Error::InvalidAmount(format!(
                "amount must not be negative, got {amount}"
            )));
        }

        amount
            .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Money)
            .ok_or_else(|| Error::InvalidAmount(format!("amount out of range: {amount}")))
    }

    /// Create an amount from centavos.
    ///
    /// # Errors
    /// Returns `Error::InvalidAmount` for negative values.
    pub fn from_cents(cents: i64) -> Result<Self> {
        if cents < 0 {
            return Err(Error::InvalidAmount(format!(
                "amount must not be negative, got {cents} centavos"
            )));
        }
        Ok(Money(cents))
    }

    /// Amount in centavos (the stored representation).
    #[inline]
    #[must_use]
    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Amount as a two-place decimal.
    #[must_use]
    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(self.0, MONEY_SCALE)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = Error;

    fn try_from(amount: Decimal) -> Result<Self> {
        Money::new(amount)
    }
}

/// Interprets the integer as centavos; this is how the amount is stored.
impl TryFrom<i64> for Money {
    type Error = Error;

    fn try_from(cents: i64) -> Result<Self> {
        Money::from_cents(cents)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.as_decimal()
    }
}

impl std::str::FromStr for Money {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let amount: Decimal = s
            .trim()
            .parse()
            .map_err(|e| Error::InvalidAmount(format!("{s:?}: {e}")))?;
        Money::new(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_decimal())
    }
}

/// Two-letter Brazilian state code (UF), stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateCode(String);

impl StateCode {
    /// Create a state code, normalizing to upper-case.
    ///
    /// # Errors
    /// Returns `Error::InvalidStateCode` unless the trimmed input is exactly
    /// two ASCII letters.
    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim().to_ascii_uppercase();

        if code.len() != STATE_CODE_LENGTH || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::InvalidStateCode(code));
        }

        Ok(StateCode(code))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StateCode {
    type Error = Error;

    fn try_from(code: String) -> Result<Self> {
        StateCode::new(&code)
    }
}

impl From<StateCode> for String {
    fn from(code: StateCode) -> Self {
        code.0
    }
}

impl std::str::FromStr for StateCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        StateCode::new(s)
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review score between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// # Errors
    /// Returns `Error::InvalidRating` outside `1..=5`.
    pub fn new(value: u8) -> Result<Self> {
        if !(MIN_RATING..=MAX_RATING).contains(&value) {
            return Err(Error::InvalidRating(i64::from(value)));
        }
        Ok(Rating(value))
    }

    #[inline]
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Every valid rating in ascending order.
    pub fn all() -> impl Iterator<Item = Rating> {
        (MIN_RATING..=MAX_RATING).map(Rating)
    }
}

impl TryFrom<u8> for Rating {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Rating::new(value)
    }
}

impl TryFrom<i64> for Rating {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        u8::try_from(value)
            .map_err(|_| Error::InvalidRating(value))
            .and_then(Rating::new)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review count per rating value, always covering 1 through 5.
///
/// Serializes as a map `{1: n, 2: n, 3: n, 4: n, 5: n}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "BTreeMap<u8, i64>", from = "BTreeMap<u8, i64>")]
pub struct RatingSummary {
    counts: [i64; MAX_RATING as usize],
}

impl RatingSummary {
    /// Build a summary from `(rating, count)` pairs.
    ///
    /// Pairs whose rating is outside `1..=5` are ignored; repeated ratings
    /// accumulate.
    pub fn from_counts<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        let mut summary = RatingSummary::default();
        for (rating, count) in pairs {
            if let Ok(rating) = Rating::try_from(rating) {
                summary.counts[usize::from(rating.get() - MIN_RATING)] += count;
            }
        }
        summary
    }

    #[must_use]
    pub fn count(&self, rating: Rating) -> i64 {
        self.counts[usize::from(rating.get() - MIN_RATING)]
    }

    /// Total number of reviews.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.counts.iter().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Mean rating, `None` without reviews.
    #[must_use]
    pub fn average(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let weighted: i64 = self
            .iter()
            .map(|(rating, count)| i64::from(rating.get()) * count)
            .sum();
        Some(weighted as f64 / total as f64)
    }

    /// `(rating, count)` pairs in ascending rating order.
    pub fn iter(&self) -> impl Iterator<Item = (Rating, i64)> + '_ {
        Rating::all().map(|rating| (rating, self.count(rating)))
    }

    #[must_use]
    pub fn to_map(&self) -> BTreeMap<u8, i64> {
        self.iter().map(|(rating, count)| (rating.get(), count)).collect()
    }
}

impl From<RatingSummary> for BTreeMap<u8, i64> {
    fn from(summary: RatingSummary) -> Self {
        summary.to_map()
    }
}

impl From<BTreeMap<u8, i64>> for RatingSummary {
    fn from(map: BTreeMap<u8, i64>) -> Self {
        RatingSummary::from_counts(map.into_iter().map(|(k, v)| (i64::from(k), v)))
    }
}

/// Offset pagination (`skip`/`limit`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Page {
    #[must_use]
    pub fn new(skip: u32, limit: u32) -> Self {
        Self { skip, limit }
    }

    /// First `limit` rows.
    #[must_use]
    pub fn first(limit: u32) -> Self {
        Self { skip: 0, limit }
    }

    /// Offset as bound in SQL.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.skip)
    }

    /// Limit as bound in SQL.
    #[must_use]
    pub fn sql_limit(&self) -> i64 {
        i64::from(self.limit)
    }
}
