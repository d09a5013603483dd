mod common;

use rust_decimal_macros::dec;

use finanza_core::accounts::{AccountKind, AccountService, NewAccount};
use finanza_core::charges::{ChargeService, CompoundFrequency, NewAccountCharge, PaymentFrequency};
use finanza_core::errors::{DatabaseError, Error};

fn setup_credit_account(db: &common::TestDb) -> String {
    AccountService::new(db.pool.clone())
        .create_account(NewAccount {
            name: "Oro".to_string(),
            kind: AccountKind::Credit,
            currency: None,
            balance: Some(dec!(10000)),
            credit_limit: Some(dec!(50000)),
        })
        .unwrap()
        .id
}

fn interest(account_id: &str, name: &str) -> NewAccountCharge {
    NewAccountCharge {
        account_id: account_id.to_string(),
        name: name.to_string(),
        rate: dec!(12),
        is_fee: false,
        payment_frequency: PaymentFrequency::Monthly,
        compound_frequency: CompoundFrequency::Monthly12,
    }
}

#[test]
fn charge_requires_existing_account() {
    let db = common::setup_db();
    let charges = ChargeService::new(db.pool.clone());

    let err = charges.create_charge(interest("missing", "Interest")).unwrap_err();
    assert!(matches!(
        err,
        Error::Database(DatabaseError::NotFound(_))
    ));
}

#[test]
fn deactivated_charges_drop_out_of_the_active_list() {
    let db = common::setup_db();
    let account_id = setup_credit_account(&db);
    let charges = ChargeService::new(db.pool.clone());

    let kept = charges.create_charge(interest(&account_id, "Interest")).unwrap();
    let dropped = charges.create_charge(interest(&account_id, "Annual fee")).unwrap();

    charges.deactivate_charge(&dropped.id).unwrap();

    let active = charges.list_for_account(&account_id, true).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, kept.id);

    let all = charges.list_for_account(&account_id, false).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn projected_cost_uses_active_charges_and_the_balance() {
    let db = common::setup_db();
    let account_id = setup_credit_account(&db);
    let charges = ChargeService::new(db.pool.clone());

    charges.create_charge(interest(&account_id, "Interest")).unwrap();

    // 10000 * ((1 + 0.01)^12 - 1)
    let cost = charges.project_annual_cost(&account_id).unwrap();
    assert_eq!(cost, dec!(1268.25));
}

#[test]
fn negative_rate_is_rejected() {
    let db = common::setup_db();
    let account_id = setup_credit_account(&db);
    let charges = ChargeService::new(db.pool.clone());

    let mut input = interest(&account_id, "Interest");
    input.rate = dec!(-1);
    let err = charges.create_charge(input).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
