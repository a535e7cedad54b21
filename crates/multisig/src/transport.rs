//! Request handed to a wallet for signing and sending
use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use tonsig_tlb::BagOfCells;

use crate::{
    MultisigError,
    config::{Network, OrderConfig},
    order::PreparedMessage,
};

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportMessage {
    /// User-friendly bounceable address
    pub address: String,
    /// nanotons
    #[serde_as(as = "DisplayFromStr")]
    pub amount: BigUint,
    /// Base64-encoded BoC
    pub payload: String,
}

impl TransportMessage {
    pub fn new(prepared: &PreparedMessage, network: Network) -> Result<Self, MultisigError> {
        Ok(Self {
            address: network.format_address(prepared.send_to, true),
            amount: prepared.value.clone(),
            payload: BagOfCells::from_root(prepared.payload.clone()).to_base64()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportRequest {
    /// UNIX timestamp
    pub valid_until: i64,
    pub messages: Vec<TransportMessage>,
}

impl TransportRequest {
    pub fn new(
        prepared: &PreparedMessage,
        valid_until: i64,
        network: Network,
    ) -> Result<Self, MultisigError> {
        Ok(Self {
            valid_until,
            messages: vec![TransportMessage::new(prepared, network)?],
        })
    }

    /// Request valid for `valid_for` from `now`, see
    /// [`DEFAULT_VALID_FOR`](crate::config::DEFAULT_VALID_FOR)
    pub fn valid_for(
        prepared: &PreparedMessage,
        now: DateTime<Utc>,
        valid_for: core::time::Duration,
        network: Network,
    ) -> Result<Self, MultisigError> {
        let valid_for = i64::try_from(valid_for.as_secs()).unwrap_or(i64::MAX);
        Self::new(prepared, now.timestamp().saturating_add(valid_for), network)
    }

    /// Request valid for [`valid_for`](OrderConfig::valid_for) from `now`
    #[inline]
    pub fn from_config(
        prepared: &PreparedMessage,
        now: DateTime<Utc>,
        config: &OrderConfig,
        network: Network,
    ) -> Result<Self, MultisigError> {
        Self::valid_for(prepared, now, config.valid_for, network)
    }
}
