//! Message bodies for every kind of transaction the multisig can be asked
//! to perform, along with the value attached to them.
use num_bigint::BigUint;
use tonsig_tlb::{
    Cell, Error, ResultExt,
    r#as::{NBits, SnakeString},
    bits::ser::BitWriterExt,
    ser::{CellBuilder, CellBuilderError, CellSerializeExt},
};
use tonsig_tlb_ton::{MsgAddress, currency::Coins};

use crate::{
    MultisigError,
    jetton::{JettonChangeAdmin, JettonInternalTransfer, JettonMint, JettonTransfer},
    op,
    order::{OrderBuilder, PreparedMessage},
};

/// Text sent directly to an order contract to approve it
pub const APPROVE_COMMENT: &str = "approve";

const TENTH_TON: u64 = 100_000_000;

/// Transaction to be performed on behalf of the multisig
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    ApproveController {
        controller: MsgAddress,
    },
    PoolDonate {
        pool: MsgAddress,
    },
    SetInterest {
        pool: MsgAddress,
        /// `uint24`
        interest_rate: u32,
    },
    SetGovernanceFee {
        pool: MsgAddress,
        /// `uint24`
        governance_fee: u32,
    },
    SetOperationalParams {
        pool: MsgAddress,
        min_validator_loan: BigUint,
        max_validator_loan: BigUint,
        disbalance_tolerance: u8,
        /// `uint48`
        credit_start_before: u64,
    },
    /// Approval sent by a signer straight to the order contract, without
    /// creating a new order
    ApproveOrder {
        order: MsgAddress,
    },
    JettonTransfer {
        jetton_wallet: MsgAddress,
        amount: BigUint,
        destination: MsgAddress,
        response_destination: MsgAddress,
        forward_ton_amount: BigUint,
        value: BigUint,
    },
    JettonMint {
        jetton_master: MsgAddress,
        to: MsgAddress,
        amount: BigUint,
        ton_amount: BigUint,
        value: BigUint,
    },
    ChangeMinterAdmin {
        jetton_master: MsgAddress,
        new_admin: MsgAddress,
        value: BigUint,
    },
}

impl TransactionKind {
    /// Contract the message is addressed to
    pub fn target(&self) -> MsgAddress {
        match self {
            Self::ApproveController { controller } => *controller,
            Self::PoolDonate { pool }
            | Self::SetInterest { pool, .. }
            | Self::SetGovernanceFee { pool, .. }
            | Self::SetOperationalParams { pool, .. } => *pool,
            Self::ApproveOrder { order } => *order,
            Self::JettonTransfer { jetton_wallet, .. } => *jetton_wallet,
            Self::JettonMint { jetton_master, .. }
            | Self::ChangeMinterAdmin { jetton_master, .. } => *jetton_master,
        }
    }

    /// Value attached to the message, in nanotons
    pub fn value(&self) -> BigUint {
        match self {
            Self::ApproveController { .. }
            | Self::SetOperationalParams { .. }
            | Self::ApproveOrder { .. } => TENTH_TON.into(),
            Self::PoolDonate { .. } => (10 * TENTH_TON).into(),
            Self::SetInterest { .. } | Self::SetGovernanceFee { .. } => (3 * TENTH_TON).into(),
            Self::JettonTransfer { value, .. }
            | Self::JettonMint { value, .. }
            | Self::ChangeMinterAdmin { value, .. } => value.clone(),
        }
    }

    /// Whether the message has to be wrapped into a multisig order
    #[inline]
    pub fn needs_order(&self) -> bool {
        !matches!(self, Self::ApproveOrder { .. })
    }

    /// Message body with given query id, usually current time in millis
    pub fn body(&self, query_id: u64) -> Result<Cell, CellBuilderError> {
        match self {
            Self::ApproveController { .. } => header(op::CONTROLLER_APPROVE, query_id),
            Self::PoolDonate { .. } => header(op::POOL_DONATE, query_id),
            Self::SetInterest { interest_rate, .. } => {
                header_with(op::SET_INTEREST, query_id, |b| {
                    b.pack_as::<_, NBits<24>>(check_bits(*interest_rate as u64, 24)?)
                        .context("interest_rate")?;
                    Ok(())
                })
            }
            Self::SetGovernanceFee { governance_fee, .. } => {
                header_with(op::SET_GOVERNANCE_FEE, query_id, |b| {
                    b.pack_as::<_, NBits<24>>(check_bits(*governance_fee as u64, 24)?)
                        .context("governance_fee")?;
                    Ok(())
                })
            }
            Self::SetOperationalParams {
                min_validator_loan,
                max_validator_loan,
                disbalance_tolerance,
                credit_start_before,
                ..
            } => header_with(op::SET_OPERATIONAL_PARAMS, query_id, |b| {
                b.pack_as::<_, &Coins>(min_validator_loan)
                    .context("min_validator_loan")?
                    .pack_as::<_, &Coins>(max_validator_loan)
                    .context("max_validator_loan")?
                    .pack(*disbalance_tolerance)?
                    .pack_as::<_, NBits<48>>(check_bits(*credit_start_before, 48)?)
                    .context("credit_start_before")?;
                Ok(())
            }),
            Self::ApproveOrder { .. } => {
                let mut builder = Cell::builder();
                builder
                    .pack(op::COMMENT)?
                    .store_as::<_, SnakeString>(APPROVE_COMMENT)?;
                Ok(builder.into_cell())
            }
            Self::JettonTransfer {
                amount,
                destination,
                response_destination,
                forward_ton_amount,
                ..
            } => JettonTransfer::<Cell, Cell> {
                query_id,
                amount: amount.clone(),
                dst: *destination,
                response_dst: *response_destination,
                custom_payload: None,
                forward_ton_amount: forward_ton_amount.clone(),
                forward_payload: Cell::new(),
            }
            .to_cell(),
            Self::JettonMint {
                jetton_master,
                to,
                amount,
                ton_amount,
                ..
            } => JettonMint {
                query_id,
                to: *to,
                ton_amount: ton_amount.clone(),
                master_msg: JettonInternalTransfer {
                    query_id,
                    amount: amount.clone(),
                    from: *jetton_master,
                    response_address: *to,
                    forward_ton_amount: BigUint::ZERO,
                    forward_payload: Cell::new(),
                },
            }
            .to_cell(),
            Self::ChangeMinterAdmin { new_admin, .. } => JettonChangeAdmin {
                query_id,
                new_admin: *new_admin,
            }
            .to_cell(),
        }
    }

    /// Message to the target contract, sent as is
    pub fn prepare(&self, query_id: u64) -> Result<PreparedMessage, MultisigError> {
        Ok(PreparedMessage {
            send_to: self.target(),
            payload: self.body(query_id)?,
            value: self.value(),
        })
    }

    /// Message to be sent by `requester`: a new order of the multisig for
    /// every kind except [`ApproveOrder`](Self::ApproveOrder), which goes
    /// straight to the order contract.
    pub fn prepare_order(
        &self,
        requester: MsgAddress,
        orders: &OrderBuilder,
        query_id: u64,
    ) -> Result<PreparedMessage, MultisigError> {
        let message = self.prepare(query_id)?;
        if !self.needs_order() {
            return Ok(message);
        }
        orders.prepare(requester, message.send_to, message.value, message.payload)
    }
}

fn header(opcode: u32, query_id: u64) -> Result<Cell, CellBuilderError> {
    header_with(opcode, query_id, |_| Ok(()))
}

fn header_with(
    opcode: u32,
    query_id: u64,
    rest: impl FnOnce(&mut CellBuilder) -> Result<(), CellBuilderError>,
) -> Result<Cell, CellBuilderError> {
    let mut builder = Cell::builder();
    builder.pack(opcode)?.pack(query_id).context("query_id")?;
    rest(&mut builder)?;
    Ok(builder.into_cell())
}

fn check_bits(v: u64, bits: u32) -> Result<u64, CellBuilderError> {
    if v >> bits != 0 {
        return Err(Error::custom(format!("{v} does not fit into {bits} bits")));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use rstest::rstest;
    use tonsig_tlb::bits::de::BitReaderExt;
    use tonsig_tlb_ton::currency::ONE_TON;

    use crate::{
        action::{Action, decode_orders},
        config::ORDER_FEE,
        order::{MultisigConfig, NewOrder, OrderParams},
        tests::addr,
    };

    use super::*;

    fn builder() -> OrderBuilder {
        let config = MultisigConfig {
            threshold: 1,
            signers: vec![addr(1)],
            proposers: vec![addr(2)],
            seqno: 4,
        };
        let params = OrderParams::from_config(addr(100), &config, DateTime::<Utc>::UNIX_EPOCH);
        OrderBuilder::new(params, config)
    }

    fn decoded(kind: &TransactionKind) -> Action {
        let prepared = kind.prepare_order(addr(1), &builder(), 1).unwrap();
        let new_order: NewOrder = prepared.payload.parse_fully().unwrap();
        let mut actions = decode_orders(&new_order.order);
        assert_eq!(actions.len(), 1);
        actions.remove(0)
    }

    #[rstest]
    #[case(TransactionKind::ApproveController { controller: addr(5) }, 100_000_000)]
    #[case(TransactionKind::PoolDonate { pool: addr(5) }, 1_000_000_000)]
    #[case(TransactionKind::SetInterest { pool: addr(5), interest_rate: 10 }, 300_000_000)]
    #[case(TransactionKind::SetGovernanceFee { pool: addr(5), governance_fee: 10 }, 300_000_000)]
    #[case(TransactionKind::ApproveOrder { order: addr(5) }, 100_000_000)]
    fn attached_value(#[case] kind: TransactionKind, #[case] nano: u64) {
        assert_eq!(kind.value(), BigUint::from(nano));
        assert_eq!(kind.target(), addr(5));
    }

    #[test]
    fn approve_controller_body() {
        let body = TransactionKind::ApproveController { controller: addr(5) }
            .body(0x42)
            .unwrap();
        assert_eq!(body.data.len(), 32 + 64);
        let mut parser = body.parser();
        assert_eq!(parser.unpack::<u32>().unwrap(), 0x7b4b42e6);
        assert_eq!(parser.unpack::<u64>().unwrap(), 0x42);
    }

    #[test]
    fn approve_order_goes_directly() {
        let kind = TransactionKind::ApproveOrder { order: addr(5) };
        let prepared = kind.prepare_order(addr(1), &builder(), 1).unwrap();

        assert_eq!(prepared.send_to, addr(5));
        assert_eq!(prepared.value, BigUint::from(100_000_000_u32));
        let mut parser = prepared.payload.parser();
        assert_eq!(parser.unpack::<u32>().unwrap(), 0);
        assert_eq!(parser.parse_as::<String, SnakeString>().unwrap(), "approve");
    }

    #[test]
    fn wrapped_into_order() {
        let kind = TransactionKind::PoolDonate { pool: addr(5) };
        let prepared = kind.prepare_order(addr(2), &builder(), 1).unwrap();

        assert_eq!(prepared.send_to, addr(100));
        assert_eq!(prepared.value, BigUint::from(1_000_000_000_u64) + &*ORDER_FEE);
        assert_eq!(
            decoded(&kind),
            Action::PoolDonation {
                amount: ONE_TON.clone(),
                pool_address: addr(5),
            }
        );
    }

    #[test]
    fn operational_params_decode_back() {
        let kind = TransactionKind::SetOperationalParams {
            pool: addr(5),
            min_validator_loan: ONE_TON.clone(),
            max_validator_loan: BigUint::from(2_000_000_u32) * &*ONE_TON,
            disbalance_tolerance: 30,
            credit_start_before: 0,
        };
        assert_eq!(
            decoded(&kind),
            Action::UpdatePoolParams {
                min_validator_loan: ONE_TON.clone(),
                max_validator_loan: BigUint::from(2_000_000_u32) * &*ONE_TON,
                disbalance_tolerance: 30,
                credit_start_before: 0,
                pool_address: addr(5),
            }
        );
    }

    #[test]
    fn jetton_kinds_decode_back() {
        let transfer = TransactionKind::JettonTransfer {
            jetton_wallet: addr(6),
            amount: BigUint::from(1_000_u32),
            destination: addr(7),
            response_destination: addr(100),
            forward_ton_amount: BigUint::ZERO,
            value: BigUint::from(50_000_000_u32),
        };
        assert_eq!(transfer.value(), BigUint::from(50_000_000_u32));
        assert_eq!(
            decoded(&transfer),
            Action::SendJetton {
                amount: BigUint::from(1_000_u32),
                recipient: addr(7),
                jetton_wallet: addr(6),
            }
        );

        let mint = TransactionKind::JettonMint {
            jetton_master: addr(8),
            to: addr(7),
            amount: BigUint::from(5_u8),
            ton_amount: BigUint::from(10_000_000_u32),
            value: BigUint::from(50_000_000_u32),
        };
        assert_eq!(
            decoded(&mint),
            Action::MintJetton {
                amount: BigUint::from(5_u8),
                recipient: addr(7),
                jetton_master: addr(8),
            }
        );

        let change_admin = TransactionKind::ChangeMinterAdmin {
            jetton_master: addr(8),
            new_admin: addr(9),
            value: BigUint::from(50_000_000_u32),
        };
        assert_eq!(
            decoded(&change_admin),
            Action::ChangeJettonMinterOwner {
                new_owner: addr(9),
                kton_contract: addr(8),
            }
        );
    }

    #[test]
    fn rate_overflow() {
        let kind = TransactionKind::SetInterest {
            pool: addr(5),
            interest_rate: 1 << 24,
        };
        assert!(kind.body(0).is_err());
    }
}
