//! Run-time configuration
use core::time::Duration;

use lazy_static::lazy_static;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, DurationSeconds, serde_as};
use strum::{Display, EnumString};
use tonsig_tlb_ton::MsgAddress;

use crate::MultisigError;

lazy_static! {
    /// Attached to every new order on top of the transferred value: 0.05 TON
    pub static ref ORDER_FEE: BigUint = BigUint::from(50_000_000_u64);
}

/// Lifetime of a new order: 3 days
pub const DEFAULT_ORDER_TTL: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// Validity window of a message handed to the wallet: 10 minutes
pub const DEFAULT_VALID_FOR: Duration = Duration::from_secs(10 * 60);

/// Number of orders shown per multisig
pub const ORDERS_PER_MULTISIG: usize = 3;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    #[inline]
    pub const fn is_testnet(self) -> bool {
        matches!(self, Self::Testnet)
    }

    /// Base URL of the indexer API
    #[inline]
    pub const fn indexer_base_url(self) -> &'static str {
        match self {
            Self::Mainnet => "https://tonapi.io/v2",
            Self::Testnet => "https://testnet.tonapi.io/v2",
        }
    }

    /// User-friendly url-safe form of the address, with test-only flag set
    /// on testnet
    #[inline]
    pub fn format_address(self, address: MsgAddress, bounceable: bool) -> String {
        address.to_base64_url_flags(!bounceable, self.is_testnet())
    }

    /// Parse raw or user-friendly address, rejecting user-friendly ones
    /// issued for another network
    pub fn parse_address(self, s: &str) -> Result<MsgAddress, MultisigError> {
        let s = s.trim();
        if s.len() != 48 {
            return MsgAddress::from_hex(s).map_err(|err| MultisigError::Address(err.to_string()));
        }
        let (address, _non_bounceable, non_production) = if s.contains(['-', '_']) {
            MsgAddress::from_base64_url_flags(s)
        } else {
            MsgAddress::from_base64_std_flags(s)
        }
        .map_err(|err| MultisigError::Address(err.to_string()))?;
        if non_production != self.is_testnet() {
            return Err(MultisigError::Address(format!("{s} is not a {self} address")));
        }
        Ok(address)
    }
}

/// Tunables of order preparation, loadable from JSON:
/// ```json
/// {"order_fee": "50000000", "order_ttl": 259200, "valid_for": 600, "orders_per_multisig": 3}
/// ```
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
    /// nanotons
    #[serde_as(as = "DisplayFromStr")]
    pub order_fee: BigUint,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub order_ttl: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub valid_for: Duration,
    pub orders_per_multisig: usize,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            order_fee: ORDER_FEE.clone(),
            order_ttl: DEFAULT_ORDER_TTL,
            valid_for: DEFAULT_VALID_FOR,
            orders_per_multisig: ORDERS_PER_MULTISIG,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use crate::tests::addr;

    use super::*;

    #[test]
    fn default_order_config() {
        let config = OrderConfig::default();
        assert_eq!(config.order_fee, BigUint::from(50_000_000_u32));
        assert_eq!(config.order_ttl.as_secs(), 259_200);
        assert_eq!(config.valid_for.as_secs(), 600);
        assert_eq!(config.orders_per_multisig, 3);
    }

    #[test]
    fn partial_order_config() {
        let config: OrderConfig =
            serde_json::from_value(json!({"order_fee": "100000000", "valid_for": 60})).unwrap();
        assert_eq!(config.order_fee, BigUint::from(100_000_000_u32));
        assert_eq!(config.valid_for, Duration::from_secs(60));
        assert_eq!(config.order_ttl, DEFAULT_ORDER_TTL);
    }

    #[rstest]
    #[case(Network::Mainnet, true, 'E')]
    #[case(Network::Mainnet, false, 'U')]
    #[case(Network::Testnet, true, 'k')]
    #[case(Network::Testnet, false, '0')]
    fn address_flags(#[case] network: Network, #[case] bounceable: bool, #[case] first: char) {
        let formatted = network.format_address(addr(1), bounceable);
        assert_eq!(formatted.len(), 48);
        assert!(formatted.starts_with(first));
        assert_eq!(formatted.parse::<MsgAddress>().unwrap(), addr(1));
    }

    #[test]
    fn parse_address_for_network() {
        let testnet = Network::Testnet.format_address(addr(1), true);
        assert_eq!(Network::Testnet.parse_address(&testnet).unwrap(), addr(1));
        assert!(matches!(
            Network::Mainnet.parse_address(&testnet),
            Err(MultisigError::Address(_))
        ));
        assert_eq!(
            Network::Mainnet.parse_address(&addr(1).to_hex()).unwrap(),
            addr(1)
        );
        assert!(Network::Mainnet.parse_address("garbage").is_err());
    }

    #[rstest]
    #[case("mainnet", Network::Mainnet)]
    #[case("testnet", Network::Testnet)]
    fn parse_network(#[case] s: &str, #[case] network: Network) {
        assert_eq!(s.parse::<Network>().unwrap(), network);
        assert_eq!(network.to_string(), s);
    }
}
