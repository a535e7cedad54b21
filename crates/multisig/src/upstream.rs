//! Views of multisig and order accounts as returned by the indexer, and
//! their human-readable summaries.
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, Map, PickFirst, serde_as};
use strum::Display;
use tonsig_tlb_ton::MsgAddress;
use tracing::warn;

use crate::{
    MultisigError,
    action::{Action, try_decode_orders},
    config::{Network, OrderConfig},
    order::MultisigConfig,
    stack::OrderData,
};

/// Multisigs the account participates in
#[derive(Debug, Clone, Deserialize)]
pub struct AccountMultisigs {
    pub multisigs: Vec<MultisigView>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MultisigView {
    pub address: MsgAddress,
    #[serde(default)]
    pub orders: Vec<OrderView>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct OrderView {
    pub address: MsgAddress,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub order_seqno: u64,
    pub approvals_num: u32,
    pub threshold: u32,
    pub sent_for_execution: bool,
    /// UNIX timestamp
    pub expiration_date: i64,
    /// UNIX timestamp
    pub creation_date: i64,
}

/// Current state of a multisig
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct MultisigData {
    pub address: MsgAddress,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub seqno: u64,
    pub threshold: u32,
    #[serde(default)]
    pub signers: Vec<MsgAddress>,
    #[serde(default)]
    pub proposers: Vec<MsgAddress>,
}

impl From<MultisigData> for MultisigConfig {
    fn from(data: MultisigData) -> Self {
        Self {
            threshold: data.threshold,
            signers: data.signers,
            proposers: data.proposers,
            seqno: data.seqno,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Executed,
    Expired,
}

impl OrderStatus {
    pub fn of(order: &OrderView, now: DateTime<Utc>) -> Self {
        if order.sent_for_execution {
            Self::Executed
        } else if order.expiration_date <= now.timestamp() {
            Self::Expired
        } else {
            Self::Pending
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Approvals {
    pub current: u32,
    pub required: u32,
    pub has_user_approved: bool,
}

/// Order as shown to a user
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: u64,
    pub address: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub status: OrderStatus,
    /// RFC 3339 with milliseconds
    pub created_at: String,
    #[serde_as(as = "Map<_, _>")]
    pub details: Vec<(&'static str, String)>,
    pub approvals: Approvals,
}

impl OrderSummary {
    /// A single action is shown as is, none or several show as `UNKNOWN`
    pub fn new(
        order: &OrderView,
        actions: &[Action],
        order_data: &OrderData,
        user: MsgAddress,
        now: DateTime<Utc>,
        network: Network,
    ) -> Result<Self, MultisigError> {
        let action = match actions {
            [action] => action,
            _ => &Action::Unknown,
        };
        let created_at = DateTime::<Utc>::from_timestamp(order.creation_date, 0)
            .ok_or_else(|| {
                MultisigError::protocol(format!("creation date {}", order.creation_date))
            })?
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        Ok(Self {
            id: order.order_seqno,
            address: network.format_address(order.address, true),
            kind: action.kind(),
            status: OrderStatus::of(order, now),
            created_at,
            details: action.details(network),
            approvals: Approvals {
                current: order.approvals_num,
                required: order.threshold,
                has_user_approved: order_data.is_approved_by(user),
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultisigSummary {
    pub address: String,
    pub orders: Vec<OrderSummary>,
}

/// Summarize first orders of the multisig by ascending seqno.
///
/// `fetch` provides the state of each order, usually from its
/// `get_order_data` get-method.
pub fn summarize_multisig<F>(
    multisig: &MultisigView,
    user: MsgAddress,
    now: DateTime<Utc>,
    network: Network,
    config: &OrderConfig,
    mut fetch: F,
) -> Result<MultisigSummary, MultisigError>
where
    F: FnMut(&OrderView) -> Result<OrderData, MultisigError>,
{
    let mut orders: Vec<&OrderView> = multisig.orders.iter().collect();
    orders.sort_by_key(|order| order.order_seqno);

    let orders = orders
        .into_iter()
        .take(config.orders_per_multisig)
        .map(|order| {
            let data = fetch(order)?;
            let actions = match data.order.as_deref().map(try_decode_orders) {
                Some(Ok(actions)) => actions,
                Some(Err(err)) => {
                    warn!(order = %order.address, %err, "undecodable orders cell");
                    Vec::new()
                }
                None => {
                    warn!(order = %order.address, "order has no orders cell");
                    Vec::new()
                }
            };
            OrderSummary::new(order, &actions, &data, user, now, network)
        })
        .collect::<Result<_, _>>()?;

    Ok(MultisigSummary {
        address: network.format_address(multisig.address, false),
        orders,
    })
}

/// [`summarize_multisig`] for every multisig of the account
pub fn summarize_account<F>(
    account: &AccountMultisigs,
    user: MsgAddress,
    now: DateTime<Utc>,
    network: Network,
    config: &OrderConfig,
    mut fetch: F,
) -> Result<Vec<MultisigSummary>, MultisigError>
where
    F: FnMut(&OrderView) -> Result<OrderData, MultisigError>,
{
    account
        .multisigs
        .iter()
        .map(|multisig| summarize_multisig(multisig, user, now, network, config, &mut fetch))
        .collect()
}
