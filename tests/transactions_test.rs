mod common;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use finanza_core::accounts::{AccountKind, AccountService, NewAccount};
use finanza_core::errors::{DatabaseError, Error};
use finanza_core::transactions::{
    NewTransaction, NewTransfer, TransactionFilters, TransactionService, TransactionUpdate,
    TransferEndpointType,
};

fn dt_utc(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap()
        .and_utc()
}

fn setup_account(db: &common::TestDb, name: &str) -> String {
    let accounts = AccountService::new(db.pool.clone());
    accounts
        .create_account(NewAccount {
            name: name.to_string(),
            kind: AccountKind::Debit,
            currency: None,
            balance: None,
            credit_limit: None,
        })
        .unwrap()
        .id
}

fn spend(account_id: &str, amount: Decimal, category: &str, date_str: &str) -> NewTransaction {
    NewTransaction {
        amount,
        description: format!("{} spending", category),
        transaction_date: dt_utc(date_str),
        account_id: Some(account_id.to_string()),
        section_id: None,
        category: Some(category.to_string()),
    }
}

fn transfer_between(from: &str, to: &str, amount: Decimal) -> NewTransfer {
    NewTransfer {
        amount,
        description: "Move money".to_string(),
        transaction_date: dt_utc("2024-05-01 12:00:00"),
        from_type: TransferEndpointType::Account,
        from_id: from.to_string(),
        to_type: TransferEndpointType::Account,
        to_id: to.to_string(),
        category: None,
    }
}

#[test]
fn internal_transfer_writes_a_signed_pair() {
    let db = common::setup_db();
    let from = setup_account(&db, "Nomina");
    let to = setup_account(&db, "Ahorro");
    let service = TransactionService::new(db.pool.clone());

    let (outgoing, incoming) = service
        .create_internal_transfer(transfer_between(&from, &to, dec!(1500)))
        .unwrap();

    assert_eq!(outgoing.amount, dec!(-1500));
    assert_eq!(incoming.amount, dec!(1500));
    assert!(outgoing.is_internal_transfer && incoming.is_internal_transfer);
    assert_eq!(outgoing.transaction_date, incoming.transaction_date);
    assert_eq!(outgoing.transfer_from_id, incoming.transfer_from_id);
    assert_eq!(outgoing.transfer_to_id, incoming.transfer_to_id);
    assert_eq!(outgoing.account_id.as_deref(), Some(from.as_str()));
    assert_eq!(incoming.account_id.as_deref(), Some(to.as_str()));
}

#[test]
fn transfer_amount_sign_is_normalized() {
    let db = common::setup_db();
    let from = setup_account(&db, "Nomina");
    let to = setup_account(&db, "Ahorro");
    let service = TransactionService::new(db.pool.clone());

    // A negative amount means the same thing as its absolute value.
    let (outgoing, incoming) = service
        .create_internal_transfer(transfer_between(&from, &to, dec!(-200)))
        .unwrap();

    assert_eq!(outgoing.amount, dec!(-200));
    assert_eq!(incoming.amount, dec!(200));

    let err = service
        .create_internal_transfer(transfer_between(&from, &to, dec!(0)))
        .unwrap_err();
    assert!(matches!(err, Error::Transaction(_)));
}

#[test]
fn deleting_either_leg_removes_the_pair() {
    let db = common::setup_db();
    let from = setup_account(&db, "Nomina");
    let to = setup_account(&db, "Ahorro");
    let service = TransactionService::new(db.pool.clone());

    let (outgoing, incoming) = service
        .create_internal_transfer(transfer_between(&from, &to, dec!(200)))
        .unwrap();

    let deleted = service.delete_transaction(&incoming.id).unwrap();
    assert_eq!(deleted, 2);

    for id in [&outgoing.id, &incoming.id] {
        let err = service.get_transaction(id).unwrap_err();
        assert!(matches!(
            err,
            Error::Database(DatabaseError::NotFound(_))
        ));
    }
}

#[test]
fn transfer_legs_reject_updates() {
    let db = common::setup_db();
    let from = setup_account(&db, "Nomina");
    let to = setup_account(&db, "Ahorro");
    let service = TransactionService::new(db.pool.clone());

    let (outgoing, _) = service
        .create_internal_transfer(transfer_between(&from, &to, dec!(200)))
        .unwrap();

    let err = service
        .update_transaction(TransactionUpdate {
            id: outgoing.id,
            amount: Some(dec!(-300)),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, Error::Transaction(_)));
}

#[test]
fn transfer_to_itself_is_invalid() {
    let db = common::setup_db();
    let account = setup_account(&db, "Nomina");
    let service = TransactionService::new(db.pool.clone());

    let err = service
        .create_internal_transfer(transfer_between(&account, &account, dec!(100)))
        .unwrap_err();
    assert!(matches!(err, Error::Transaction(_)));
}

#[test]
fn transfer_requires_existing_accounts() {
    let db = common::setup_db();
    let from = setup_account(&db, "Nomina");
    let service = TransactionService::new(db.pool.clone());

    let err = service
        .create_internal_transfer(transfer_between(&from, "missing", dec!(100)))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Database(DatabaseError::NotFound(_))
    ));
}

#[test]
fn transfer_endpoints_outside_accounts_skip_the_account_link() {
    let db = common::setup_db();
    let from = setup_account(&db, "Nomina");
    let service = TransactionService::new(db.pool.clone());

    let (outgoing, incoming) = service
        .create_internal_transfer(NewTransfer {
            amount: dec!(5000),
            description: "Fund brokerage".to_string(),
            transaction_date: dt_utc("2024-05-01 12:00:00"),
            from_type: TransferEndpointType::Account,
            from_id: from.clone(),
            to_type: TransferEndpointType::Equity,
            to_id: "VOO".to_string(),
            category: None,
        })
        .unwrap();

    assert_eq!(outgoing.account_id.as_deref(), Some(from.as_str()));
    assert!(incoming.account_id.is_none());
    assert_eq!(incoming.transfer_to_type, Some(TransferEndpointType::Equity));
}

#[test]
fn section_must_belong_to_the_account() {
    let db = common::setup_db();
    let account = setup_account(&db, "Nomina");
    let other = setup_account(&db, "Ahorro");
    let sections = finanza_core::sections::SectionService::new(db.pool.clone());
    let service = TransactionService::new(db.pool.clone());

    let section = sections
        .create_section(finanza_core::sections::NewSection {
            account_id: other,
            name: "Apartado".to_string(),
            initial_balance: None,
        })
        .unwrap();

    let err = service
        .create_transaction(NewTransaction {
            amount: dec!(-100),
            description: "Groceries".to_string(),
            transaction_date: dt_utc("2024-05-02 09:00:00"),
            account_id: Some(account),
            section_id: Some(section.id),
            category: None,
        })
        .unwrap_err();
    assert!(matches!(err, Error::Transaction(_)));
}

#[test]
fn spending_summary_excludes_internal_transfers() {
    let db = common::setup_db();
    let from = setup_account(&db, "Nomina");
    let to = setup_account(&db, "Ahorro");
    let service = TransactionService::new(db.pool.clone());

    service
        .create_transaction(spend(&from, dec!(20000), "Salary", "2024-05-01 09:00:00"))
        .unwrap();
    service
        .create_transaction(spend(&from, dec!(-3000), "Rent", "2024-05-02 09:00:00"))
        .unwrap();
    service
        .create_transaction(spend(&from, dec!(-450.75), "Food", "2024-05-03 09:00:00"))
        .unwrap();
    service
        .create_internal_transfer(transfer_between(&from, &to, dec!(5000)))
        .unwrap();

    let summary = service.get_spending_summary(None, None, None).unwrap();
    assert_eq!(summary.total_income, dec!(20000));
    assert_eq!(summary.total_expenses, dec!(3450.75));
    assert_eq!(summary.net, dec!(16549.25));

    // Largest category first.
    assert_eq!(summary.by_category[0].category, "Rent");
    assert_eq!(summary.by_category[0].amount, dec!(3000));
    assert_eq!(summary.by_category[1].category, "Food");
}

#[test]
fn search_filters_and_paginates() {
    let db = common::setup_db();
    let account = setup_account(&db, "Nomina");
    let other = setup_account(&db, "Ahorro");
    let service = TransactionService::new(db.pool.clone());

    for day in 1..=5 {
        service
            .create_transaction(spend(
                &account,
                dec!(-10),
                "Food",
                &format!("2024-05-{:02} 09:00:00", day),
            ))
            .unwrap();
    }
    service
        .create_transaction(spend(&other, dec!(-99), "Food", "2024-05-06 09:00:00"))
        .unwrap();

    let filters = TransactionFilters {
        account_id: Some(account),
        ..Default::default()
    };
    let page1 = service.search_transactions(1, 2, &filters).unwrap();
    assert_eq!(page1.meta.total_row_count, 5);
    assert_eq!(page1.data.len(), 2);
    // Newest first.
    assert!(page1.data[0].transaction_date > page1.data[1].transaction_date);

    let page3 = service.search_transactions(3, 2, &filters).unwrap();
    assert_eq!(page3.data.len(), 1);
}

#[test]
fn monthly_trends_cover_empty_months() {
    let db = common::setup_db();
    let account = setup_account(&db, "Nomina");
    let service = TransactionService::new(db.pool.clone());

    let now = Utc::now();
    service
        .create_transaction(NewTransaction {
            amount: dec!(-120),
            description: "Streaming".to_string(),
            transaction_date: now,
            account_id: Some(account),
            section_id: None,
            category: Some("Entertainment".to_string()),
        })
        .unwrap();

    let trends = service.get_monthly_trends(3, None).unwrap();
    assert_eq!(trends.len(), 3);
    assert_eq!(trends[2].month, now.format("%Y-%m").to_string());
    assert_eq!(trends[2].expenses, dec!(120));
    assert_eq!(trends[0].income, dec!(0));
    assert_eq!(trends[0].expenses, dec!(0));
}
