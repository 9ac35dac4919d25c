//! Domain constants for the rental data-access layer.
//!
//! Grouped by concern so callers can find the limits a query applies
//! without reading the SQL.

// ============================================================================
// Pagination
// ============================================================================

/// Number of rows returned by listing operations when no limit is given.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

// ============================================================================
// Reviews
// ============================================================================

/// Lowest accepted review score.
pub const MIN_RATING: u8 = 1;

/// Highest accepted review score.
pub const MAX_RATING: u8 = 5;

/// Minimum number of reviews before a property appears in the
/// highest-rated ranking.
pub const MIN_REVIEWS_FOR_RANKING: i64 = 3;

/// Default size of the highest-rated properties ranking.
pub const DEFAULT_RANKING_LIMIT: u32 = 10;

/// Default number of reviews returned by the recent-reviews lookup.
pub const DEFAULT_RECENT_REVIEWS: u32 = 5;

// ============================================================================
// Rentals
// ============================================================================

/// Default size of the most-frequent-clients ranking.
pub const DEFAULT_TOP_CLIENTS: u32 = 10;

/// Decimal places kept for monetary amounts (`DECIMAL(10, 2)`).
pub const MONEY_SCALE: u32 = 2;

// ============================================================================
// Addresses
// ============================================================================

/// Length of a state (UF) code, e.g. `SP`.
pub const STATE_CODE_LENGTH: usize = 2;
