mod common;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use finanza_core::accounts::{AccountKind, AccountService, NewAccount};
use finanza_core::dashboard::{DashboardService, Period};
use finanza_core::errors::Error;
use finanza_core::movements::{MovementService, MovementType, NewMovement};
use finanza_core::positions::{AssetClass, NewPosition, PositionService};
use finanza_core::transactions::{NewTransaction, TransactionService};

fn create_account(
    db: &common::TestDb,
    name: &str,
    kind: AccountKind,
    balance: Decimal,
    credit_limit: Option<Decimal>,
) -> String {
    AccountService::new(db.pool.clone())
        .create_account(NewAccount {
            name: name.to_string(),
            kind,
            currency: None,
            balance: Some(balance),
            credit_limit,
        })
        .unwrap()
        .id
}

fn record(db: &common::TestDb, account_id: &str, amount: Decimal, category: &str, days_ago: i64) {
    TransactionService::new(db.pool.clone())
        .create_transaction(NewTransaction {
            amount,
            description: format!("{} item", category),
            transaction_date: Utc::now() - Duration::days(days_ago),
            account_id: Some(account_id.to_string()),
            section_id: None,
            category: Some(category.to_string()),
        })
        .unwrap();
}

#[test]
fn summary_nets_debit_against_credit_debt() {
    let db = common::setup_db();
    create_account(&db, "Nomina", AccountKind::Debit, dec!(10000), None);
    create_account(&db, "Oro", AccountKind::Credit, dec!(2500), Some(dec!(40000)));

    let dashboard = DashboardService::new(db.pool.clone());
    let summary = dashboard.get_summary(Period::Month).unwrap();

    assert_eq!(summary.total_balance, dec!(7500));
    assert_eq!(summary.total_credit_available, dec!(37500));
    assert_eq!(summary.total_investments_value, dec!(0));
}

#[test]
fn summary_windows_income_and_expenses() {
    let db = common::setup_db();
    let account = create_account(&db, "Nomina", AccountKind::Debit, dec!(0), None);

    record(&db, &account, dec!(1000), "Salary", 3);
    record(&db, &account, dec!(-250), "Food", 2);
    // Outside the week window.
    record(&db, &account, dec!(-999), "Rent", 20);

    let dashboard = DashboardService::new(db.pool.clone());
    let summary = dashboard.get_summary(Period::Week).unwrap();

    assert_eq!(summary.period_income, dec!(1000));
    assert_eq!(summary.period_expenses, dec!(250));
    assert_eq!(summary.period_profit_loss, dec!(750));

    let month = dashboard.get_summary(Period::Month).unwrap();
    assert_eq!(month.period_expenses, dec!(1249));
}

#[test]
fn summary_values_open_positions_at_cost() {
    let db = common::setup_db();
    let positions = PositionService::new(db.pool.clone());
    let movements = MovementService::new(db.pool.clone());

    let position = positions
        .create_position(NewPosition {
            asset_class: AssetClass::Crypto,
            symbol: "BTC".to_string(),
        })
        .unwrap();

    movements
        .create_movement(NewMovement {
            position_id: position.id.clone(),
            movement_type: MovementType::Buy,
            quantity: dec!(0.5),
            unit_price: dec!(60000),
            movement_datetime: Utc::now() - Duration::days(10),
            comment: None,
        })
        .unwrap();
    movements
        .create_movement(NewMovement {
            position_id: position.id.clone(),
            movement_type: MovementType::Sell,
            quantity: dec!(0.2),
            unit_price: dec!(70000),
            movement_datetime: Utc::now() - Duration::days(5),
            comment: None,
        })
        .unwrap();

    let dashboard = DashboardService::new(db.pool.clone());
    let summary = dashboard.get_summary(Period::Month).unwrap();

    // 0.3 BTC still open at its 60000 acquisition price.
    assert_eq!(summary.total_investments_value, dec!(18000));
}

#[test]
fn spending_chart_ranks_categories() {
    let db = common::setup_db();
    let account = create_account(&db, "Nomina", AccountKind::Debit, dec!(0), None);

    record(&db, &account, dec!(-300), "Rent", 1);
    record(&db, &account, dec!(-100), "Food", 2);
    record(&db, &account, dec!(-200), "Transport", 3);
    record(&db, &account, dec!(500), "Salary", 1);

    let dashboard = DashboardService::new(db.pool.clone());
    let chart = dashboard.get_chart_data("spending_categories", Period::Month).unwrap();

    assert_eq!(chart.chart_type, "spending_categories");
    assert_eq!(chart.labels, vec!["Rent", "Transport", "Food"]);
    assert_eq!(chart.datasets.len(), 1);
    assert_eq!(chart.datasets[0].data, vec![dec!(300), dec!(200), dec!(100)]);
}

#[test]
fn balance_trend_ends_at_the_current_total() {
    let db = common::setup_db();
    let account = create_account(&db, "Nomina", AccountKind::Debit, dec!(5000), None);
    record(&db, &account, dec!(-1000), "Rent", 3);

    let dashboard = DashboardService::new(db.pool.clone());
    let chart = dashboard.get_chart_data("balance_trend", Period::Week).unwrap();

    assert_eq!(chart.datasets.len(), 1);
    let data = &chart.datasets[0].data;
    assert_eq!(data.len(), chart.labels.len());
    // Last sample is now; first sample predates the expense.
    assert_eq!(*data.last().unwrap(), dec!(5000));
    assert_eq!(*data.first().unwrap(), dec!(6000));
}

#[test]
fn investment_chart_lists_open_positions_only() {
    let db = common::setup_db();
    let positions = PositionService::new(db.pool.clone());
    let movements = MovementService::new(db.pool.clone());

    let open = positions
        .create_position(NewPosition {
            asset_class: AssetClass::Equity,
            symbol: "VOO".to_string(),
        })
        .unwrap();
    let closed = positions
        .create_position(NewPosition {
            asset_class: AssetClass::Equity,
            symbol: "QQQ".to_string(),
        })
        .unwrap();

    for (position_id, sell_all) in [(&open.id, false), (&closed.id, true)] {
        movements
            .create_movement(NewMovement {
                position_id: position_id.clone(),
                movement_type: MovementType::Buy,
                quantity: dec!(10),
                unit_price: dec!(100),
                movement_datetime: Utc::now() - Duration::days(10),
                comment: None,
            })
            .unwrap();
        if sell_all {
            movements
                .create_movement(NewMovement {
                    position_id: position_id.clone(),
                    movement_type: MovementType::Sell,
                    quantity: dec!(10),
                    unit_price: dec!(120),
                    movement_datetime: Utc::now() - Duration::days(5),
                    comment: None,
                })
                .unwrap();
        }
    }

    let dashboard = DashboardService::new(db.pool.clone());
    let chart = dashboard
        .get_chart_data("investment_performance", Period::Month)
        .unwrap();

    assert_eq!(chart.labels, vec!["VOO"]);
    assert_eq!(chart.datasets[0].data, vec![dec!(1000)]);
}

#[test]
fn unknown_chart_kind_is_a_validation_error() {
    let db = common::setup_db();
    let dashboard = DashboardService::new(db.pool.clone());

    let err = dashboard.get_chart_data("pie_of_doom", Period::Month).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
