use async_trait::async_trait;
use core_logic::{
    bid_fees, compute_fee_bid, CoreError, FeeMarket, GasConfig, NetworkError,
};

/// Fee market with fixed readings
struct StaticMarket {
    base_fee: Option<u128>,
    priority_fee: u128,
}

#[async_trait]
impl FeeMarket for StaticMarket {
    fn endpoint(&self) -> &str {
        "static://market"
    }

    async fn base_fee(&self) -> Result<u128, NetworkError> {
        self.base_fee.ok_or_else(|| NetworkError::MissingBaseFee {
            endpoint: self.endpoint().to_string(),
        })
    }

    async fn priority_fee(&self) -> Result<u128, NetworkError> {
        Ok(self.priority_fee)
    }
}

fn gwei(amount: u128) -> u128 {
    amount * 1_000_000_000
}

#[test]
fn test_fee_bid_typical_mainnet() {
    // base 30 gwei, tip 2 gwei
    let bid = compute_fee_bid(gwei(30), gwei(2), &GasConfig::default()).unwrap();

    assert_eq!(bid.max_priority_fee_per_gas, 2_400_000_000);
    assert_eq!(bid.max_fee_per_gas, 36_000_000_000 + 2_400_000_000);
}

#[test]
fn test_fee_bid_zero_market() {
    let bid = compute_fee_bid(0, 0, &GasConfig::default()).unwrap();
    assert_eq!(bid.max_fee_per_gas, 0);
    assert_eq!(bid.max_priority_fee_per_gas, 0);
}

#[test]
fn test_fee_bid_small_values_truncate() {
    // 1 wei * 1.2 = 1.2 -> 1
    let bid = compute_fee_bid(1, 1, &GasConfig::default()).unwrap();
    assert_eq!(bid.max_priority_fee_per_gas, 1);
    assert_eq!(bid.max_fee_per_gas, 2);

    // 4 * 1.2 = 4.8 -> 4 ; 9 * 1.2 = 10.8 -> 10 ; 10 + 4
    let bid = compute_fee_bid(9, 4, &GasConfig::default()).unwrap();
    assert_eq!(bid.max_priority_fee_per_gas, 4);
    assert_eq!(bid.max_fee_per_gas, 14);
}

#[test]
fn test_fee_bid_is_exact_for_large_values() {
    // Beyond f64 integer precision
    let base: u128 = 123_456_789_012_345_678_901;
    let bid = compute_fee_bid(base, 0, &GasConfig::default()).unwrap();
    assert_eq!(bid.max_fee_per_gas, base * 12 / 10);
}

#[test]
fn test_max_fee_never_below_priority() {
    for (base, tip) in [(0u128, 5u128), (1, 1_000), (gwei(100), gwei(50)), (7, 0)] {
        let bid = compute_fee_bid(base, tip, &GasConfig::default()).unwrap();
        assert!(bid.max_fee_per_gas >= bid.max_priority_fee_per_gas);
    }
}

#[test]
fn test_custom_multiplier() {
    let config = GasConfig::new().with_fee_multiplier(2.0);
    let bid = compute_fee_bid(gwei(10), gwei(1), &config).unwrap();
    assert_eq!(bid.max_priority_fee_per_gas, gwei(2));
    assert_eq!(bid.max_fee_per_gas, gwei(22));
}

#[test]
fn test_invalid_multiplier_is_config_error() {
    let config = GasConfig::new().with_fee_multiplier(0.0);
    assert!(matches!(
        compute_fee_bid(1, 1, &config),
        Err(CoreError::Config(_))
    ));
}

#[tokio::test]
async fn test_bid_fees_reads_market() {
    let market = StaticMarket {
        base_fee: Some(gwei(20)),
        priority_fee: gwei(1),
    };

    let bid = bid_fees(&market, &GasConfig::default()).await.unwrap();
    assert_eq!(bid.max_priority_fee_per_gas, 1_200_000_000);
    assert_eq!(bid.max_fee_per_gas, 24_000_000_000 + 1_200_000_000);
}

#[tokio::test]
async fn test_bid_fees_surfaces_market_error() {
    let market = StaticMarket {
        base_fee: None,
        priority_fee: gwei(1),
    };

    let result = bid_fees(&market, &GasConfig::default()).await;
    assert!(matches!(
        result,
        Err(CoreError::Network(NetworkError::MissingBaseFee { .. }))
    ));
}
