use chrono::NaiveDate;
use insight_core::{DateRange, Money, new_id};
use serde::{Deserialize, Serialize};

/// Rental contract (aluguel) between a client and a property
///
/// Maps to the `alugueis` table. The period is inclusive on both ends and
/// the schema rejects `data_inicio > data_fim`. The price is stored as
/// integer centavos in `preco_total_centavos`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use insight_core::{DateRange, Money};
/// use insight_storage::models::Rental;
///
/// let period = DateRange::new(
///     NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
/// )
/// .unwrap();
/// let rental = Rental::new("cliente", "hospedagem", period, "1500.00".parse::<Money>().unwrap());
///
/// assert_eq!(rental.period().unwrap(), period);
/// assert_eq!(rental.preco_total.cents(), 150_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rental {
    /// Opaque UUID primary key
    #[sqlx(rename = "aluguel_id")]
    pub id: String,

    pub cliente_id: String,

    pub hospedagem_id: String,

    /// First day of the stay (inclusive)
    pub data_inicio: NaiveDate,

    /// Last day of the stay (inclusive)
    pub data_fim: NaiveDate,

    /// Total contract price
    #[sqlx(rename = "preco_total_centavos", try_from = "i64")]
    pub preco_total: Money,
}

impl Rental {
    /// Create a rental with a freshly generated id
    pub fn new(
        cliente_id: impl Into<String>,
        hospedagem_id: impl Into<String>,
        period: DateRange,
        preco_total: Money,
    ) -> Self {
        Self {
            id: new_id(),
            cliente_id: cliente_id.into(),
            hospedagem_id: hospedagem_id.into(),
            data_inicio: period.start(),
            data_fim: period.end(),
            preco_total,
        }
    }

    /// The rental period as a validated range
    ///
    /// # Errors
    ///
    /// Returns `insight_core::Error::InvalidDateRange` when the dates were
    /// edited into the wrong order.
    pub fn period(&self) -> insight_core::Result<DateRange> {
        DateRange::new(self.data_inicio, self.data_fim)
    }

    /// Whether the stay covers `date`
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.data_inicio <= date && date <= self.data_fim
    }
}

/// Partial update for [`Rental`]
///
/// Dates are applied independently; the repository validates the resulting
/// period before writing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RentalUpdate {
    pub cliente_id: Option<String>,
    pub hospedagem_id: Option<String>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
    pub preco_total: Option<Money>,
}

impl RentalUpdate {
    pub fn is_empty(&self) -> bool {
        self.cliente_id.is_none()
            && self.hospedagem_id.is_none()
            && self.data_inicio.is_none()
            && self.data_fim.is_none()
            && self.preco_total.is_none()
    }

    /// Set both dates from a range
    pub fn with_period(mut self, period: DateRange) -> Self {
        self.data_inicio = Some(period.start());
        self.data_fim = Some(period.end());
        self
    }

    pub fn apply(&self, rental: &mut Rental) {
        if let Some(cliente_id) = &self.cliente_id {
            rental.cliente_id = cliente_id.clone();
        }
        if let Some(hospedagem_id) = &self.hospedagem_id {
            rental.hospedagem_id = hospedagem_id.clone();
        }
        if let Some(data_inicio) = self.data_inicio {
            rental.data_inicio = data_inicio;
        }
        if let Some(data_fim) = self.data_fim {
            rental.data_fim = data_fim;
        }
        if let Some(preco_total) = self.preco_total {
            rental.preco_total = preco_total;
        }
    }
}
