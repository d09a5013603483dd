pub mod holdings_calculator;
pub mod holdings_model;

pub use holdings_calculator::HoldingsCalculator;
pub use holdings_model::{Lot, PositionHoldings};

#[cfg(test)]
pub(crate) mod tests;
