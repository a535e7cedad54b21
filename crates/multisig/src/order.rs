//! Construction of [`new_order`](NewOrder) messages sent to a multisig
use core::{fmt, str::FromStr, time::Duration};

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use num_bigint::BigUint;
use num_traits::One;
use strum::Display;
use tonsig_tlb::{
    Cell, ResultExt,
    r#as::{NBits, Ref},
    bits::{de::BitReaderExt, integer::ConstU32, ser::BitWriterExt},
    de::{CellDeserialize, CellParser, CellParserError},
    ser::{CellBuilder, CellBuilderError, CellSerialize, CellSerializeExt},
};
use tonsig_tlb_ton::{MsgAddress, SendMode};
use tracing::info;

use crate::{
    MultisigError,
    action::{encode_transfer, pack_order},
    config::{DEFAULT_ORDER_TTL, ORDER_FEE, OrderConfig},
    op,
};

lazy_static! {
    /// Order seqno asking the multisig to pick the next free one
    pub static ref PENDING_ORDER_SEQNO: BigUint = (BigUint::one() << 256_u32) - 1_u8;
}

/// Seqno of the order being created
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderSeqno {
    /// Next free seqno, `-1` upstream and `2^256 - 1` on the wire
    Pending,
    Assigned(BigUint),
}

impl OrderSeqno {
    /// `uint256` value stored in [`NewOrder`]
    #[inline]
    pub fn to_wire(&self) -> BigUint {
        match self {
            Self::Pending => PENDING_ORDER_SEQNO.clone(),
            Self::Assigned(seqno) => seqno.clone(),
        }
    }
}

impl From<u64> for OrderSeqno {
    #[inline]
    fn from(seqno: u64) -> Self {
        Self::Assigned(seqno.into())
    }
}

impl FromStr for OrderSeqno {
    type Err = MultisigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-1" {
            return Ok(Self::Pending);
        }
        s.parse()
            .map(Self::Assigned)
            .map_err(|err| MultisigError::protocol(format!("order seqno {s:?}: {err}")))
    }
}

impl fmt::Display for OrderSeqno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("-1"),
            Self::Assigned(seqno) => fmt::Display::fmt(seqno, f),
        }
    }
}

/// Request to create a new order or to approve an existing one
/// ```tlb
/// new_order#f718510f query_id:uint64
///     order_seqno:uint256
///     signer:(## 1)
///     index:uint8
///     expiration_date:uint48
///     order:^Order = InternalMsgBody;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub query_id: u64,
    pub order_seqno: BigUint,
    pub is_signer: bool,
    pub index: u8,
    pub expiration_date: u64,
    pub order: Cell,
}

impl CellSerialize for NewOrder {
    fn store(&self, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        builder
            .pack(op::NEW_ORDER)?
            .pack(self.query_id)?
            .pack_as::<_, &NBits<256>>(&self.order_seqno)
            .context("order_seqno")?
            .pack(self.is_signer)?
            .pack(self.index)?
            .pack_as::<_, NBits<48>>(self.expiration_date)
            .context("expiration_date")?
            .store_as::<_, Ref>(&self.order)
            .context("order")?;
        Ok(())
    }
}

impl<'de> CellDeserialize<'de> for NewOrder {
    fn parse(parser: &mut CellParser<'de>) -> Result<Self, CellParserError> {
        parser.unpack::<ConstU32<{ op::NEW_ORDER }>>()?;
        Ok(Self {
            query_id: parser.unpack()?,
            order_seqno: parser
                .unpack_as::<_, NBits<256>>()
                .context("order_seqno")?,
            is_signer: parser.unpack()?,
            index: parser.unpack()?,
            expiration_date: parser
                .unpack_as::<_, NBits<48>>()
                .context("expiration_date")?,
            order: parser.parse_as::<_, Ref>().context("order")?,
        })
    }
}

/// Body of a `new_order` message carrying given orders cell
pub fn build_new_order_message(
    orders: Cell,
    expiration_date: u64,
    is_signer: bool,
    addr_idx: u8,
    order_seqno: BigUint,
    query_id: u64,
) -> Result<Cell, CellBuilderError> {
    NewOrder {
        query_id,
        order_seqno,
        is_signer,
        index: addr_idx,
        expiration_date,
        order: orders,
    }
    .to_cell()
}

/// Current configuration of a multisig
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultisigConfig {
    pub threshold: u32,
    pub signers: Vec<MsgAddress>,
    pub proposers: Vec<MsgAddress>,
    pub seqno: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Signer,
    Proposer,
}

impl MultisigConfig {
    /// Role of the address and its index within the signers or proposers
    /// list. Signers take precedence.
    pub fn resolve_role(&self, address: MsgAddress) -> Result<(Role, u8), MultisigError> {
        let (role, index) = self
            .signers
            .iter()
            .position(|a| *a == address)
            .map(|i| (Role::Signer, i))
            .or_else(|| {
                self.proposers
                    .iter()
                    .position(|a| *a == address)
                    .map(|i| (Role::Proposer, i))
            })
            .ok_or(MultisigError::NotAuthorized)?;
        let index = u8::try_from(index).map_err(|_| MultisigError::IndexOutOfRange(index))?;
        Ok((role, index))
    }
}

/// Where and when the order is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderParams {
    pub multisig_address: MsgAddress,
    pub order_seqno: OrderSeqno,
    /// UNIX timestamp, `uint48`
    pub expiration_date: u64,
}

impl OrderParams {
    /// Next order of the multisig, expiring in [`DEFAULT_ORDER_TTL`]
    #[inline]
    pub fn from_config(
        multisig_address: MsgAddress,
        config: &MultisigConfig,
        now: DateTime<Utc>,
    ) -> Self {
        Self::with_ttl(multisig_address, config, now, DEFAULT_ORDER_TTL)
    }

    /// Next order of the multisig, expiring in
    /// [`order_ttl`](OrderConfig::order_ttl)
    #[inline]
    pub fn with_order_config(
        multisig_address: MsgAddress,
        config: &MultisigConfig,
        now: DateTime<Utc>,
        order_config: &OrderConfig,
    ) -> Self {
        Self::with_ttl(multisig_address, config, now, order_config.order_ttl)
    }

    pub fn with_ttl(
        multisig_address: MsgAddress,
        config: &MultisigConfig,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            multisig_address,
            order_seqno: config.seqno.into(),
            expiration_date: u64::try_from(now.timestamp())
                .unwrap_or_default()
                .saturating_add(ttl.as_secs()),
        }
    }
}

/// Internal message ready to be handed to a wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedMessage {
    pub send_to: MsgAddress,
    pub payload: Cell,
    /// nanotons
    pub value: BigUint,
}

/// Wraps messages into `new_order` requests to a multisig
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    params: OrderParams,
    config: MultisigConfig,
    order_fee: BigUint,
    query_id: u64,
}

impl OrderBuilder {
    #[inline]
    pub fn new(params: OrderParams, config: MultisigConfig) -> Self {
        Self {
            params,
            config,
            order_fee: ORDER_FEE.clone(),
            query_id: 0,
        }
    }

    /// Builder attaching [`order_fee`](OrderConfig::order_fee)
    #[inline]
    pub fn from_config(
        params: OrderParams,
        config: MultisigConfig,
        order_config: &OrderConfig,
    ) -> Self {
        Self::new(params, config).with_order_fee(order_config.order_fee.clone())
    }

    /// Value attached on top of the transferred one
    #[inline]
    pub fn with_order_fee(mut self, order_fee: BigUint) -> Self {
        self.order_fee = order_fee;
        self
    }

    #[inline]
    pub fn with_query_id(mut self, query_id: u64) -> Self {
        self.query_id = query_id;
        self
    }

    #[inline]
    pub fn params(&self) -> &OrderParams {
        &self.params
    }

    #[inline]
    pub fn config(&self) -> &MultisigConfig {
        &self.config
    }

    /// Create an order with a single action sending `value` with `payload`
    /// to `destination` on behalf of the multisig.
    pub fn prepare(
        &self,
        requester: MsgAddress,
        destination: MsgAddress,
        value: BigUint,
        payload: Cell,
    ) -> Result<PreparedMessage, MultisigError> {
        let (role, index) = self.config.resolve_role(requester)?;
        let order_seqno = self.params.order_seqno.to_wire();

        let orders = pack_order(
            encode_transfer(SendMode::default(), destination, value.clone(), payload)
                .context("action")?,
        )
        .context("orders")?;
        let payload = build_new_order_message(
            orders,
            self.params.expiration_date,
            matches!(role, Role::Signer),
            index,
            order_seqno,
            self.query_id,
        )?;

        info!(
            %role,
            index,
            seqno = %self.params.order_seqno,
            multisig = %self.params.multisig_address,
            "order prepared",
        );
        Ok(PreparedMessage {
            send_to: self.params.multisig_address,
            payload,
            value: value + &self.order_fee,
        })
    }
}

/// Shortcut for [`OrderBuilder::prepare`] with zero query id and default
/// order fee
#[inline]
pub fn prepare_create_order(
    requester: MsgAddress,
    order_params: &OrderParams,
    multisig_config: &MultisigConfig,
    destination: MsgAddress,
    value: BigUint,
    payload: Cell,
) -> Result<PreparedMessage, MultisigError> {
    OrderBuilder::new(order_params.clone(), multisig_config.clone()).prepare(
        requester,
        destination,
        value,
        payload,
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tonsig_tlb_ton::currency::ONE_TON;

    use crate::{
        action::{Action, decode_orders},
        tests::{addr, assert_store_parse_eq},
    };

    use super::*;

    fn config() -> MultisigConfig {
        MultisigConfig {
            threshold: 2,
            signers: vec![addr(1), addr(2), addr(3)],
            proposers: vec![addr(4)],
            seqno: 11,
        }
    }

    fn params(order_seqno: OrderSeqno) -> OrderParams {
        OrderParams {
            multisig_address: addr(100),
            order_seqno,
            expiration_date: 1_700_000_000,
        }
    }

    #[test]
    fn new_order_serde() {
        assert_store_parse_eq(NewOrder {
            query_id: 5,
            order_seqno: PENDING_ORDER_SEQNO.clone(),
            is_signer: true,
            index: 1,
            expiration_date: 1_700_000_000,
            order: Cell::new(),
        });
    }

    #[test]
    fn new_order_layout() {
        let cell =
            build_new_order_message(Cell::new(), 42, false, 7, BigUint::from(3_u8), 0).unwrap();

        assert_eq!(cell.data.len(), 32 + 64 + 256 + 1 + 8 + 48);
        assert_eq!(cell.references.len(), 1);
        let mut parser = cell.parser();
        assert_eq!(parser.unpack::<u32>().unwrap(), 0xf718510f);
        assert_eq!(parser.unpack::<u64>().unwrap(), 0);
    }

    #[test]
    fn signer_role() {
        assert_eq!(config().resolve_role(addr(3)).unwrap(), (Role::Signer, 2));
    }

    #[test]
    fn proposer_role() {
        assert_eq!(config().resolve_role(addr(4)).unwrap(), (Role::Proposer, 0));
    }

    #[test]
    fn signer_takes_precedence() {
        let mut config = config();
        config.proposers.push(addr(1));
        assert_eq!(config.resolve_role(addr(1)).unwrap(), (Role::Signer, 0));
    }

    #[test]
    fn outsider_is_not_authorized() {
        assert!(matches!(
            config().resolve_role(addr(9)),
            Err(MultisigError::NotAuthorized)
        ));
    }

    #[test]
    fn index_out_of_range() {
        let outsider = MsgAddress {
            workchain_id: -1,
            address: [0; 32],
        };
        let mut config = MultisigConfig {
            signers: (0..=u8::MAX).map(addr).collect(),
            ..Default::default()
        };
        config.signers.push(outsider);

        assert!(matches!(
            config.resolve_role(outsider),
            Err(MultisigError::IndexOutOfRange(256))
        ));
    }

    #[test]
    fn approve_controller_order() {
        let mut body = Cell::builder();
        body.pack(op::CONTROLLER_APPROVE).unwrap().pack(0_u64).unwrap();
        let value = BigUint::from(100_000_000_u64);

        let prepared = prepare_create_order(
            addr(3),
            &params(OrderSeqno::Pending),
            &config(),
            addr(50),
            value.clone(),
            body.into_cell(),
        )
        .unwrap();

        assert_eq!(prepared.send_to, addr(100));
        assert_eq!(prepared.value, value + &*ORDER_FEE);

        let new_order: NewOrder = prepared.payload.parse_fully().unwrap();
        assert_eq!(new_order.order_seqno, (BigUint::one() << 256) - 1_u8);
        assert!(new_order.is_signer);
        assert_eq!(new_order.index, 2);
        assert_eq!(new_order.expiration_date, 1_700_000_000);
        assert_eq!(
            decode_orders(&new_order.order),
            [Action::ApproveController {
                controller_address: addr(50)
            }]
        );
    }

    #[test]
    fn proposer_order_with_assigned_seqno() {
        let prepared = OrderBuilder::new(params(OrderSeqno::from(11)), config())
            .with_query_id(77)
            .with_order_fee(BigUint::ZERO)
            .prepare(addr(4), addr(50), ONE_TON.clone(), Cell::new())
            .unwrap();

        assert_eq!(prepared.value, *ONE_TON);
        let new_order: NewOrder = prepared.payload.parse_fully().unwrap();
        assert_eq!(new_order.query_id, 77);
        assert_eq!(new_order.order_seqno, BigUint::from(11_u8));
        assert!(!new_order.is_signer);
        assert_eq!(new_order.index, 0);
    }

    #[test]
    fn unauthorized_requester() {
        assert!(matches!(
            prepare_create_order(
                addr(9),
                &params(OrderSeqno::Pending),
                &config(),
                addr(50),
                ONE_TON.clone(),
                Cell::new(),
            ),
            Err(MultisigError::NotAuthorized)
        ));
    }

    #[test]
    fn params_from_config() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let params = OrderParams::from_config(addr(100), &config(), now);
        assert_eq!(params.order_seqno, OrderSeqno::Assigned(BigUint::from(11_u8)));
        assert_eq!(params.expiration_date, 1_700_000_000 + 3 * 24 * 60 * 60);
    }

    #[test]
    fn configured_order_fee_and_ttl() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let order_config: OrderConfig = serde_json::from_value(serde_json::json!({
            "order_fee": "70000000",
            "order_ttl": 3600,
        }))
        .unwrap();
        let params = OrderParams::with_order_config(addr(100), &config(), now, &order_config);
        assert_eq!(params.expiration_date, 1_700_003_600);

        let prepared = OrderBuilder::from_config(params, config(), &order_config)
            .prepare(addr(1), addr(50), ONE_TON.clone(), Cell::new())
            .unwrap();

        assert_eq!(prepared.value, ONE_TON.clone() + 70_000_000_u64);
        let new_order: NewOrder = prepared.payload.parse_fully().unwrap();
        assert_eq!(new_order.expiration_date, 1_700_003_600);
    }

    #[test]
    fn parse_order_seqno() {
        assert_eq!("-1".parse::<OrderSeqno>().unwrap(), OrderSeqno::Pending);
        assert_eq!("12".parse::<OrderSeqno>().unwrap(), OrderSeqno::from(12));
        assert!("x".parse::<OrderSeqno>().is_err());
        assert_eq!(OrderSeqno::Pending.to_string(), "-1");
    }
}
