//! Unit tests for on-chain and DeFi indicators

use chainsignal::indicators::defi::{calculate_tvl_delta, TvlDelta};
use chainsignal::indicators::onchain::{ActiveAddressesDelta, ExchangeNetflow, ValuationBand};
use chainsignal::indicators::IndicatorCalculator;
use chainsignal::models::Vote;

#[test]
fn test_mvrv_bands() {
    let mvrv = ValuationBand::mvrv(1.0, 3.0);
    assert_eq!(mvrv.evaluate(&[3.5]).unwrap().1, Vote::Bearish);
    assert_eq!(mvrv.evaluate(&[0.8]).unwrap().1, Vote::Bullish);
    assert_eq!(mvrv.evaluate(&[2.0]).unwrap().1, Vote::Neutral);
}

#[test]
fn test_nvt_and_sopr_bands() {
    let nvt = ValuationBand::nvt(20.0, 50.0);
    assert_eq!(nvt.evaluate(&[60.0]).unwrap().1, Vote::Bearish);
    assert_eq!(nvt.evaluate(&[15.0]).unwrap().1, Vote::Bullish);

    let sopr = ValuationBand::sopr(0.95, 1.05);
    assert_eq!(sopr.evaluate(&[1.1]).unwrap().1, Vote::Bearish);
    assert_eq!(sopr.evaluate(&[0.9]).unwrap().1, Vote::Bullish);
}

#[test]
fn test_valuation_band_reads_latest_value() {
    let mvrv = ValuationBand::mvrv(1.0, 3.0);
    let (value, vote) = mvrv.evaluate(&[0.5, 0.7, 3.2]).unwrap();
    assert_eq!(value, 3.2);
    assert_eq!(vote, Vote::Bearish);
}

#[test]
fn test_exchange_netflow_inflow_is_bearish() {
    assert_eq!(ExchangeNetflow.evaluate(&[1200.0]).unwrap().1, Vote::Bearish);
    assert_eq!(ExchangeNetflow.evaluate(&[-800.0]).unwrap().1, Vote::Bullish);
    assert_eq!(ExchangeNetflow.evaluate(&[0.0]).unwrap().1, Vote::Neutral);
}

#[test]
fn test_active_addresses_delta() {
    let indicator = ActiveAddressesDelta::new(2, 0.05);
    assert_eq!(indicator.min_history(), 3);

    let (change, vote) = indicator.evaluate(&[1000.0, 1020.0, 1100.0]).unwrap();
    assert!((change - 0.1).abs() < 1e-12);
    assert_eq!(vote, Vote::Bullish);

    let (_, vote) = indicator.evaluate(&[1000.0, 990.0, 1010.0]).unwrap();
    assert_eq!(vote, Vote::Neutral);
}

#[test]
fn test_tvl_delta() {
    assert!(calculate_tvl_delta(&[100.0, 110.0], 2).is_none());
    assert_eq!(calculate_tvl_delta(&[100.0, 105.0, 80.0], 2), Some(-0.2));

    let indicator = TvlDelta::new(2, 0.05);
    let (_, vote) = indicator.evaluate(&[100.0, 105.0, 80.0]).unwrap();
    assert_eq!(vote, Vote::Bearish);
}

#[test]
fn test_tvl_delta_from_zero_base_has_no_value() {
    assert!(calculate_tvl_delta(&[0.0, 10.0], 1).is_none());
}
