//! Crate-wide constants.

/// Decimal places kept for money values (totals, balances, amounts).
pub const MONEY_DECIMAL_PRECISION: u32 = 2;

/// Decimal places kept for asset quantities (fractional crypto units).
pub const QUANTITY_DECIMAL_PRECISION: u32 = 8;

/// Default currency for new accounts.
pub const DEFAULT_CURRENCY: &str = "MXN";

/// Category used when a transaction carries none.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Category assigned to both legs of an internal transfer.
pub const INTERNAL_TRANSFER_CATEGORY: &str = "Internal Transfer";

/// Maximum number of categories returned by the spending chart.
pub const SPENDING_CHART_TOP_CATEGORIES: usize = 10;
