use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};
use crate::utils::decimal_serde::decimal_serde;

/// Trailing window the dashboard aggregates over, ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    Month,
    Quarter,
    Year,
}

impl Period {
    pub fn days(&self) -> i64 {
        match self {
            Period::Week => 7,
            Period::Month => 30,
            Period::Quarter => 90,
            Period::Year => 365,
        }
    }

    /// Distance between samples in the balance trend chart.
    pub fn sample_step(&self) -> Duration {
        let days = match self {
            Period::Week => 1,
            Period::Month => 7,
            Period::Quarter => 14,
            Period::Year => 30,
        };
        Duration::days(days)
    }

    pub fn duration(&self) -> Duration {
        Duration::days(self.days())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "quarter" => Ok(Period::Quarter),
            "year" => Ok(Period::Year),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown period '{}', expected week, month, quarter or year",
                other
            ))
            .into()),
        }
    }
}

/// Kinds of dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    BalanceTrend,
    SpendingCategories,
    InvestmentPerformance,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::BalanceTrend => "balance_trend",
            ChartKind::SpendingCategories => "spending_categories",
            ChartKind::InvestmentPerformance => "investment_performance",
        }
    }
}

impl FromStr for ChartKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "balance_trend" => Ok(ChartKind::BalanceTrend),
            "spending_categories" => Ok(ChartKind::SpendingCategories),
            "investment_performance" => Ok(ChartKind::InvestmentPerformance),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown chart type '{}'",
                other
            ))
            .into()),
        }
    }
}

/// Headline numbers for the dashboard. Debit balances count as assets,
/// credit balances as debt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(with = "decimal_serde")]
    pub total_balance: Decimal,
    #[serde(with = "decimal_serde")]
    pub total_credit_available: Decimal,
    #[serde(with = "decimal_serde")]
    pub total_investments_value: Decimal,
    #[serde(with = "decimal_serde")]
    pub period_income: Decimal,
    #[serde(with = "decimal_serde")]
    pub period_expenses: Decimal,
    #[serde(with = "decimal_serde")]
    pub period_profit_loss: Decimal,
}

/// Chart payload shaped for the charting frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub chart_type: String,
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<Decimal>,
}
