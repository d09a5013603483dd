use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::holdings::HoldingsCalculator;
use crate::movements::{Movement, MovementType};

const POSITION: &str = "pos-1";

fn dt_utc(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap()
        .and_utc()
}

fn movement(
    id: &str,
    movement_type: MovementType,
    date_str: &str,
    qty: Decimal,
    price: Decimal,
) -> Movement {
    Movement {
        id: id.to_string(),
        position_id: POSITION.to_string(),
        movement_type,
        quantity: qty,
        unit_price: price,
        total_amount: (qty * price).round_dp(2),
        movement_datetime: dt_utc(date_str),
        comment: None,
        created_at: dt_utc(date_str),
    }
}

fn buy(id: &str, date_str: &str, qty: Decimal, price: Decimal) -> Movement {
    movement(id, MovementType::Buy, date_str, qty, price)
}

fn sell(id: &str, date_str: &str, qty: Decimal, price: Decimal) -> Movement {
    movement(id, MovementType::Sell, date_str, qty, price)
}

#[test]
fn empty_ledger_is_flat() {
    let holdings = HoldingsCalculator::calculate(POSITION, &[]);

    assert_eq!(holdings.current_quantity, Decimal::ZERO);
    assert_eq!(holdings.total_cost, Decimal::ZERO);
    assert_eq!(holdings.total_proceeds, Decimal::ZERO);
    assert_eq!(holdings.average_cost_basis, Decimal::ZERO);
    assert_eq!(holdings.realized_pnl, Decimal::ZERO);
    assert!(holdings.open_lots.is_empty());
}

#[test]
fn buys_accumulate_lots_in_order() {
    let ledger = vec![
        buy("b1", "2024-01-10 10:00:00", dec!(10), dec!(100)),
        buy("b2", "2024-02-10 10:00:00", dec!(5), dec!(110)),
    ];

    let holdings = HoldingsCalculator::calculate(POSITION, &ledger);

    assert_eq!(holdings.current_quantity, dec!(15));
    assert_eq!(holdings.total_cost, dec!(1550));
    assert_eq!(holdings.open_lots.len(), 2);
    assert_eq!(holdings.open_lots[0].unit_price, dec!(100));
    assert_eq!(holdings.open_lots[1].unit_price, dec!(110));
    // 1550 / 15
    assert_eq!(holdings.average_cost_basis.round_dp(4), dec!(103.3333));
}

#[test]
fn sell_relieves_oldest_lot_first() {
    let ledger = vec![
        buy("b1", "2024-01-10 10:00:00", dec!(10), dec!(100)),
        buy("b2", "2024-02-10 10:00:00", dec!(10), dec!(110)),
        sell("s1", "2024-03-10 10:00:00", dec!(15), dec!(120)),
    ];

    let holdings = HoldingsCalculator::calculate(POSITION, &ledger);

    // 5 units of the second lot remain at their own price.
    assert_eq!(holdings.current_quantity, dec!(5));
    assert_eq!(holdings.open_lots.len(), 1);
    assert_eq!(holdings.open_lots[0].remaining, dec!(5));
    assert_eq!(holdings.open_lots[0].unit_price, dec!(110));
    assert_eq!(holdings.average_cost_basis, dec!(110));

    // Sold: 10 @ 100 + 5 @ 110 = 1550 cost against 1800 proceeds.
    assert_eq!(holdings.total_proceeds, dec!(1800));
    assert_eq!(holdings.realized_pnl, dec!(250));
}

#[test]
fn partial_relief_keeps_lot_price() {
    let ledger = vec![
        buy("b1", "2024-01-10 10:00:00", dec!(10), dec!(100)),
        sell("s1", "2024-01-20 10:00:00", dec!(4), dec!(105)),
    ];

    let holdings = HoldingsCalculator::calculate(POSITION, &ledger);

    assert_eq!(holdings.open_lots[0].remaining, dec!(6));
    assert_eq!(holdings.open_lots[0].unit_price, dec!(100));
    assert_eq!(holdings.realized_pnl, dec!(20));
}

#[test]
fn fully_closed_position_has_zero_basis() {
    let ledger = vec![
        buy("b1", "2024-01-10 10:00:00", dec!(8), dec!(50)),
        sell("s1", "2024-02-10 10:00:00", dec!(8), dec!(60)),
    ];

    let holdings = HoldingsCalculator::calculate(POSITION, &ledger);

    assert_eq!(holdings.current_quantity, Decimal::ZERO);
    assert_eq!(holdings.average_cost_basis, Decimal::ZERO);
    assert!(holdings.open_lots.is_empty());
    assert_eq!(holdings.realized_pnl, dec!(80));
    assert!(!holdings.is_open());
}

#[test]
fn oversell_floors_quantity_at_zero() {
    // The calculator itself never goes negative, even on a ledger the
    // write path would have rejected.
    let ledger = vec![
        buy("b1", "2024-01-10 10:00:00", dec!(5), dec!(100)),
        sell("s1", "2024-02-10 10:00:00", dec!(9), dec!(100)),
    ];

    let holdings = HoldingsCalculator::calculate(POSITION, &ledger);

    assert_eq!(holdings.current_quantity, Decimal::ZERO);
    assert!(holdings.open_lots.is_empty());
}

#[test]
fn fractional_quantities_stay_exact() {
    let ledger = vec![
        buy("b1", "2024-01-10 10:00:00", dec!(0.12345678), dec!(43210.55)),
        sell("s1", "2024-02-10 10:00:00", dec!(0.00345678), dec!(50000.00)),
    ];

    let holdings = HoldingsCalculator::calculate(POSITION, &ledger);

    assert_eq!(holdings.current_quantity, dec!(0.12));
    assert_eq!(holdings.open_lots[0].remaining, dec!(0.12));
    assert_eq!(holdings.open_lots[0].unit_price, dec!(43210.55));
}

#[test]
fn event_time_orders_the_replay_not_insertion_order() {
    // The sell is listed first but happens last; replay must sort.
    let ledger = vec![
        sell("s1", "2024-03-10 10:00:00", dec!(3), dec!(120)),
        buy("b1", "2024-01-10 10:00:00", dec!(5), dec!(100)),
    ];

    let holdings = HoldingsCalculator::calculate(POSITION, &ledger);

    assert_eq!(holdings.current_quantity, dec!(2));
    assert_eq!(holdings.realized_pnl, dec!(60));
}

#[test]
fn created_at_breaks_same_instant_ties() {
    let mut first = buy("b1", "2024-01-10 10:00:00", dec!(5), dec!(100));
    let mut second = sell("s1", "2024-01-10 10:00:00", dec!(5), dec!(110));
    first.created_at = dt_utc("2024-01-10 10:00:01");
    second.created_at = dt_utc("2024-01-10 10:00:02");

    let ledger = vec![second.clone(), first.clone()];
    let holdings = HoldingsCalculator::calculate(POSITION, &ledger);

    // The buy was inserted first, so the sell is covered.
    assert_eq!(holdings.current_quantity, Decimal::ZERO);
    assert_eq!(holdings.realized_pnl, dec!(50));
    assert!(HoldingsCalculator::first_uncovered_sell(&ledger).is_none());
}

#[test]
fn uncovered_sell_is_reported() {
    let ledger = vec![
        buy("b1", "2024-01-10 10:00:00", dec!(5), dec!(100)),
        sell("s1", "2024-02-10 10:00:00", dec!(8), dec!(100)),
    ];

    let offender = HoldingsCalculator::first_uncovered_sell(&ledger);
    assert_eq!(offender.map(|m| m.id), Some("s1".to_string()));
}

#[test]
fn backdated_sell_before_any_buy_is_uncovered() {
    // The end total would be fine; the prefix at the sell's event time is
    // not.
    let ledger = vec![
        buy("b1", "2024-03-10 10:00:00", dec!(10), dec!(100)),
        sell("s1", "2024-01-10 10:00:00", dec!(1), dec!(100)),
    ];

    let offender = HoldingsCalculator::first_uncovered_sell(&ledger);
    assert_eq!(offender.map(|m| m.id), Some("s1".to_string()));
}

#[test]
fn covered_ledger_passes_the_prefix_check() {
    let ledger = vec![
        buy("b1", "2024-01-10 10:00:00", dec!(10), dec!(100)),
        sell("s1", "2024-02-10 10:00:00", dec!(4), dec!(110)),
        buy("b2", "2024-03-10 10:00:00", dec!(2), dec!(120)),
        sell("s2", "2024-04-10 10:00:00", dec!(8), dec!(130)),
    ];

    assert!(HoldingsCalculator::first_uncovered_sell(&ledger).is_none());
}

#[test]
fn holdings_serialize_with_camel_case_keys() {
    use std::str::FromStr;

    let ledger = vec![buy("b1", "2024-01-10 10:00:00", dec!(4), dec!(25.50))];
    let holdings = HoldingsCalculator::calculate(POSITION, &ledger);

    let json = serde_json::to_value(&holdings).unwrap();
    assert_eq!(json["positionId"], POSITION);
    assert_eq!(json["openLots"].as_array().unwrap().len(), 1);

    let avg = Decimal::from_str(json["averageCostBasis"].as_str().unwrap()).unwrap();
    assert_eq!(avg, dec!(25.50));
    let cost = Decimal::from_str(json["totalCost"].as_str().unwrap()).unwrap();
    assert_eq!(cost, dec!(102.00));
}

#[test]
fn realized_pnl_spans_multiple_sells() {
    let ledger = vec![
        buy("b1", "2024-01-10 10:00:00", dec!(10), dec!(100)),
        sell("s1", "2024-02-10 10:00:00", dec!(4), dec!(110)),
        sell("s2", "2024-03-10 10:00:00", dec!(6), dec!(90)),
    ];

    let holdings = HoldingsCalculator::calculate(POSITION, &ledger);

    // 440 + 540 proceeds against 1000 cost, fully closed.
    assert_eq!(holdings.total_proceeds, dec!(980));
    assert_eq!(holdings.realized_pnl, dec!(-20));
}
