use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::accounts::{AccountKind, AccountRepository};
use crate::constants::{MONEY_DECIMAL_PRECISION, SPENDING_CHART_TOP_CATEGORIES, UNCATEGORIZED};
use crate::dashboard::dashboard_model::{
    ChartData, ChartDataset, ChartKind, DashboardSummary, Period,
};
use crate::errors::Result;
use crate::holdings::HoldingsCalculator;
use crate::movements::MovementRepository;
use crate::positions::PositionRepository;
use crate::transactions::{Transaction, TransactionRepository};

/// Read-only aggregation over the stores backing the dashboard.
pub struct DashboardService {
    account_repo: AccountRepository,
    transaction_repo: TransactionRepository,
    position_repo: PositionRepository,
    movement_repo: MovementRepository,
}

impl DashboardService {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self {
            account_repo: AccountRepository::new(pool.clone()),
            transaction_repo: TransactionRepository::new(pool.clone()),
            position_repo: PositionRepository::new(pool.clone()),
            movement_repo: MovementRepository::new(pool),
        }
    }

    pub fn get_summary(&self, period: Period) -> Result<DashboardSummary> {
        let mut total_balance = Decimal::ZERO;
        let mut total_credit_available = Decimal::ZERO;
        for account in self.account_repo.list_accounts()? {
            match account.kind {
                AccountKind::Debit => total_balance += account.balance,
                AccountKind::Credit => total_balance -= account.balance,
            }
            total_credit_available += account.available_credit();
        }

        let total_investments_value = self.open_positions_value()?;

        let now = chrono::Utc::now();
        let start = now - period.duration();
        let rows = self
            .transaction_repo
            .list_non_transfer(Some(start), Some(now), None)?;

        let mut period_income = Decimal::ZERO;
        let mut period_expenses = Decimal::ZERO;
        for row in &rows {
            if row.amount > Decimal::ZERO {
                period_income += row.amount;
            } else {
                period_expenses += row.amount.abs();
            }
        }

        Ok(DashboardSummary {
            total_balance: total_balance.round_dp(MONEY_DECIMAL_PRECISION),
            total_credit_available: total_credit_available.round_dp(MONEY_DECIMAL_PRECISION),
            total_investments_value: total_investments_value.round_dp(MONEY_DECIMAL_PRECISION),
            period_profit_loss: (period_income - period_expenses)
                .round_dp(MONEY_DECIMAL_PRECISION),
            period_income: period_income.round_dp(MONEY_DECIMAL_PRECISION),
            period_expenses: period_expenses.round_dp(MONEY_DECIMAL_PRECISION),
        })
    }

    pub fn get_chart_data(&self, kind: &str, period: Period) -> Result<ChartData> {
        match kind.parse::<ChartKind>()? {
            ChartKind::BalanceTrend => self.balance_trend(period),
            ChartKind::SpendingCategories => self.spending_categories(period),
            ChartKind::InvestmentPerformance => self.investment_performance(),
        }
    }

    /// Total balance sampled across the period. Each sample is the current
    /// total with the transactions recorded after it backed out.
    fn balance_trend(&self, period: Period) -> Result<ChartData> {
        let now = chrono::Utc::now();
        let start = now - period.duration();

        let mut current_total = Decimal::ZERO;
        for account in self.account_repo.list_accounts()? {
            match account.kind {
                AccountKind::Debit => current_total += account.balance,
                AccountKind::Credit => current_total -= account.balance,
            }
        }

        let rows = self
            .transaction_repo
            .list_non_transfer(Some(start), Some(now), None)?;

        let mut sample_points = Vec::new();
        let mut cursor = start;
        while cursor < now {
            sample_points.push(cursor);
            cursor += period.sample_step();
        }
        sample_points.push(now);

        let mut labels = Vec::with_capacity(sample_points.len());
        let mut data = Vec::with_capacity(sample_points.len());
        for sample in sample_points {
            let later_flow: Decimal = rows
                .iter()
                .filter(|row| row.transaction_date > sample)
                .map(|row| row.amount)
                .sum();
            labels.push(sample.format("%Y-%m-%d").to_string());
            data.push((current_total - later_flow).round_dp(MONEY_DECIMAL_PRECISION));
        }

        Ok(ChartData {
            chart_type: ChartKind::BalanceTrend.as_str().to_string(),
            labels,
            datasets: vec![ChartDataset {
                label: "Total balance".to_string(),
                data,
            }],
        })
    }

    /// Top expense categories in the period, absolute amounts, largest
    /// first.
    fn spending_categories(&self, period: Period) -> Result<ChartData> {
        let now = chrono::Utc::now();
        let start = now - period.duration();
        let rows = self
            .transaction_repo
            .list_non_transfer(Some(start), Some(now), None)?;

        let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
        for row in rows.iter().filter(|row| row.amount < Decimal::ZERO) {
            let category = Self::category_of(row);
            *by_category.entry(category).or_default() += row.amount.abs();
        }

        let mut ranked: Vec<(String, Decimal)> = by_category.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(SPENDING_CHART_TOP_CATEGORIES);

        let (labels, data) = ranked
            .into_iter()
            .map(|(category, amount)| (category, amount.round_dp(MONEY_DECIMAL_PRECISION)))
            .unzip();

        Ok(ChartData {
            chart_type: ChartKind::SpendingCategories.as_str().to_string(),
            labels,
            datasets: vec![ChartDataset {
                label: "Spending".to_string(),
                data,
            }],
        })
    }

    /// Open-lot cost basis per open position.
    fn investment_performance(&self) -> Result<ChartData> {
        let mut labels = Vec::new();
        let mut data = Vec::new();

        for position in self.position_repo.list_positions()? {
            let ledger = self.movement_repo.list_for_position(&position.id)?;
            let holdings = HoldingsCalculator::calculate(&position.id, &ledger);
            if !holdings.is_open() {
                continue;
            }
            labels.push(position.symbol);
            data.push(holdings.open_lots_cost().round_dp(MONEY_DECIMAL_PRECISION));
        }

        Ok(ChartData {
            chart_type: ChartKind::InvestmentPerformance.as_str().to_string(),
            labels,
            datasets: vec![ChartDataset {
                label: "Invested".to_string(),
                data,
            }],
        })
    }

    fn open_positions_value(&self) -> Result<Decimal> {
        let mut total = Decimal::ZERO;
        for position in self.position_repo.list_positions()? {
            let ledger = self.movement_repo.list_for_position(&position.id)?;
            let holdings = HoldingsCalculator::calculate(&position.id, &ledger);
            if holdings.is_open() {
                total += holdings.open_lots_cost();
            }
        }
        Ok(total)
    }

    fn category_of(row: &Transaction) -> String {
        row.category
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED.to_string())
    }
}
