//! Order actions: encoding of transfer requests and decoding of stored
//! actions into human-readable [`Action`]s.
//!
//! Decoding never fails: anything that does not match a known layout
//! exactly becomes [`Action::Unknown`].
use num_bigint::BigUint;
use strum::IntoStaticStr;
use tonsig_tlb::{
    Cell, CodecError, Error, ResultExt,
    r#as::{Data, NBits, Ref, SnakeString},
    bits::{
        de::{BitReader, BitReaderExt},
        integer::ConstU32,
        ser::BitWriterExt,
    },
    de::{CellDeserialize, CellParser, CellParserError},
    ser::{CellBuilder, CellBuilderError, CellSerialize, CellSerializeExt},
};
use tonsig_tlb_ton::{
    MsgAddress, SendMode,
    currency::Coins,
    hashmap::Dictionary,
    message::{CommonMsgInfoRelaxed, MessageRelaxed},
};
use tracing::debug;

use crate::{config::Network, jetton::JettonMint, op};

/// Width of keys in orders and address dictionaries
pub const KEY_BITS: u32 = 8;

/// Human-readable action of a multisig order
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    UpdateConfig {
        signers: Vec<MsgAddress>,
        proposers: Vec<MsgAddress>,
        threshold: u8,
    },
    SendTon {
        amount: BigUint,
        recipient: MsgAddress,
        comment: String,
    },
    SendJetton {
        amount: BigUint,
        recipient: MsgAddress,
        jetton_wallet: MsgAddress,
    },
    MintJetton {
        amount: BigUint,
        recipient: MsgAddress,
        jetton_master: MsgAddress,
    },
    ChangeJettonMinterOwner {
        new_owner: MsgAddress,
        kton_contract: MsgAddress,
    },
    ApproveController {
        controller_address: MsgAddress,
    },
    PoolDonation {
        amount: BigUint,
        pool_address: MsgAddress,
    },
    UpdateInterestRate {
        interest_rate: u32,
        pool_address: MsgAddress,
    },
    UpdateGovernanceFee {
        governance_fee: u32,
        pool_address: MsgAddress,
    },
    UpdatePoolParams {
        min_validator_loan: BigUint,
        max_validator_loan: BigUint,
        disbalance_tolerance: u8,
        credit_start_before: u64,
        pool_address: MsgAddress,
    },
    Unknown,
}

impl Action {
    /// Stable type tag, e.g. `SEND_TON`
    #[inline]
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Decode a single value of the orders dictionary
    pub fn decode(cell: &Cell) -> Self {
        match decode_action(&mut cell.parser()) {
            Ok(action) => action,
            Err(err) => {
                debug!(%err, "action decodes to UNKNOWN");
                Self::Unknown
            }
        }
    }

    /// Fields of the action rendered as strings, starting with `type`.
    ///
    /// Addresses are shown in bounceable user-friendly form, lists of
    /// addresses are joined with newlines and amounts are in nanotons.
    pub fn details(&self, network: Network) -> Vec<(&'static str, String)> {
        let a = |addr: &MsgAddress| network.format_address(*addr, true);
        let list = |addrs: &[MsgAddress]| addrs.iter().map(a).collect::<Vec<_>>().join("\n");

        let mut details = vec![("type", self.kind().to_string())];
        details.extend(match self {
            Self::UpdateConfig {
                signers,
                proposers,
                threshold,
            } => vec![
                ("signers", list(signers)),
                ("proposers", list(proposers)),
                ("threshold", threshold.to_string()),
            ],
            Self::SendTon {
                amount,
                recipient,
                comment,
            } => vec![
                ("amount", amount.to_string()),
                ("recipient", a(recipient)),
                ("comment", comment.clone()),
            ],
            Self::SendJetton {
                amount,
                recipient,
                jetton_wallet,
            } => vec![
                ("amount", amount.to_string()),
                ("recipient", a(recipient)),
                ("jetton_wallet", a(jetton_wallet)),
            ],
            Self::MintJetton {
                amount,
                recipient,
                jetton_master,
            } => vec![
                ("amount", amount.to_string()),
                ("recipient", a(recipient)),
                ("jetton_master", a(jetton_master)),
            ],
            Self::ChangeJettonMinterOwner {
                new_owner,
                kton_contract,
            } => vec![
                ("new_owner", a(new_owner)),
                ("kton_contract", a(kton_contract)),
            ],
            Self::ApproveController { controller_address } => {
                vec![("controller_address", a(controller_address))]
            }
            Self::PoolDonation {
                amount,
                pool_address,
            } => vec![
                ("amount", amount.to_string()),
                ("pool_address", a(pool_address)),
            ],
            Self::UpdateInterestRate {
                interest_rate,
                pool_address,
            } => vec![
                ("interest_rate", interest_rate.to_string()),
                ("pool_address", a(pool_address)),
            ],
            Self::UpdateGovernanceFee {
                governance_fee,
                pool_address,
            } => vec![
                ("governance_fee", governance_fee.to_string()),
                ("pool_address", a(pool_address)),
            ],
            Self::UpdatePoolParams {
                min_validator_loan,
                max_validator_loan,
                disbalance_tolerance,
                credit_start_before,
                pool_address,
            } => vec![
                ("min_validator_loan", min_validator_loan.to_string()),
                ("max_validator_loan", max_validator_loan.to_string()),
                ("disbalance_tolerance", disbalance_tolerance.to_string()),
                ("credit_start_before", credit_start_before.to_string()),
                ("pool_address", a(pool_address)),
            ],
            Self::Unknown => Vec::new(),
        });
        details
    }
}

/// Decode every action of the orders cell in ascending key order.
///
/// A malformed dictionary results in a single [`Action::Unknown`].
pub fn decode_orders(orders: &Cell) -> Vec<Action> {
    try_decode_orders(orders).unwrap_or_else(|err| {
        debug!(%err, "orders dictionary decodes to UNKNOWN");
        vec![Action::Unknown]
    })
}

/// Same as [`decode_orders`], but returns an error when the orders
/// dictionary itself is malformed
pub fn try_decode_orders(orders: &Cell) -> Result<Vec<Action>, CodecError> {
    let dict = Dictionary::<Cell>::load_direct_as::<Ref>(&mut orders.parser(), KEY_BITS)?;
    Ok(dict.values().map(Action::decode).collect())
}

/// Puts the action at key `0` of an 8-bit dictionary stored directly
/// into a fresh cell
pub fn pack_order(action: Cell) -> Result<Cell, CellBuilderError> {
    let mut dict = Dictionary::new(KEY_BITS);
    dict.insert(0, action);

    let mut builder = Cell::builder();
    dict.store_direct_as::<Ref>(&mut builder)?;
    Ok(builder.into_cell())
}

/// Internal message to be sent by the multisig
/// ```tlb
/// send_message#f1381e5b mode:uint8 message:^MessageRelaxed = Action;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest<T = Cell> {
    pub mode: SendMode,
    pub message: MessageRelaxed<T>,
}

impl<T> TransferRequest<T> {
    /// Bounceable transfer with `PAY_GAS_SEPARATELY | IGNORE_ERRORS` mode
    #[inline]
    pub fn new(destination: MsgAddress, value: BigUint, body: T) -> Self {
        Self::with_mode(SendMode::default(), destination, value, body)
    }

    #[inline]
    pub fn with_mode(mode: SendMode, destination: MsgAddress, value: BigUint, body: T) -> Self {
        Self {
            mode,
            message: MessageRelaxed::transfer(destination, value, true, body),
        }
    }
}

impl<T> CellSerialize for TransferRequest<T>
where
    T: CellSerialize,
{
    fn store(&self, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        builder
            .pack(op::TRANSFER_REQUEST)?
            .pack(self.mode)?
            .store_as::<_, Ref>(&self.message)
            .context("message")?;
        Ok(())
    }
}

impl<'de, T> CellDeserialize<'de> for TransferRequest<T>
where
    T: CellDeserialize<'de>,
{
    fn parse(parser: &mut CellParser<'de>) -> Result<Self, CellParserError> {
        parser.unpack::<ConstU32<{ op::TRANSFER_REQUEST }>>()?;
        Ok(Self {
            mode: parser.unpack()?,
            message: parser.parse_as::<_, Ref>().context("message")?,
        })
    }
}

/// Action cell asking the multisig to send `value` to `destination` with
/// given `body`
#[inline]
pub fn encode_transfer(
    send_mode: SendMode,
    destination: MsgAddress,
    value: BigUint,
    body: Cell,
) -> Result<Cell, CellBuilderError> {
    TransferRequest::with_mode(send_mode, destination, value, body).to_cell()
}

type DecodeResult = Result<Action, CodecError>;

/// Top-level dispatch entry, selected by opcode
struct ActionRule {
    op: u32,
    min_bits: usize,
    min_refs: usize,
    decode: fn(&mut CellParser<'_>) -> DecodeResult,
}

const ACTION_RULES: &[ActionRule] = &[
    ActionRule {
        op: op::UPDATE_CONFIG,
        min_bits: 8,
        min_refs: 1,
        decode: decode_update_config,
    },
    ActionRule {
        op: op::TRANSFER_REQUEST,
        min_bits: 8,
        min_refs: 1,
        decode: decode_transfer_request,
    },
];

fn decode_action(parser: &mut CellParser<'_>) -> DecodeResult {
    if parser.bits_left() <= 32 {
        return Err(Error::custom(format!(
            "{} bits are not enough for an opcode",
            parser.bits_left()
        )));
    }
    let opcode: u32 = parser.unpack()?;
    let rule = ACTION_RULES
        .iter()
        .find(|r| {
            r.op == opcode
                && parser.bits_left() >= r.min_bits
                && parser.references_left() >= r.min_refs
        })
        .ok_or_else(|| CodecError::custom(format!("unsupported action {opcode:#010x}")))?;
    (rule.decode)(parser)
}

fn decode_update_config(parser: &mut CellParser<'_>) -> DecodeResult {
    let threshold: u8 = parser.unpack().context("threshold")?;
    let signers = parser.pop_reference().context("signers")?;
    let signers = if signers.data.len() <= 1 {
        Vec::new()
    } else {
        load_addresses(&mut signers.parser()).context("signers")?
    };
    let proposers = if parser.bits_left() > 1 {
        load_addresses(parser).context("proposers")?
    } else {
        Vec::new()
    };
    Ok(Action::UpdateConfig {
        signers,
        proposers,
        threshold,
    })
}

/// Values of an 8-bit address dictionary stored directly in the parser
pub(crate) fn load_addresses(parser: &mut CellParser<'_>) -> Result<Vec<MsgAddress>, CodecError> {
    Ok(Dictionary::<MsgAddress>::load_direct_as::<Data>(parser, KEY_BITS)?
        .into_values()
        .collect())
}

/// Destination and value of the internal message being sent
struct Transfer {
    to: MsgAddress,
    value: BigUint,
}

fn decode_transfer_request(parser: &mut CellParser<'_>) -> DecodeResult {
    let _mode: SendMode = parser.unpack().context("mode")?;
    let message: MessageRelaxed = parser.parse_as::<_, Ref>().context("message")?;
    let CommonMsgInfoRelaxed::Internal(info) = message.info else {
        return Err(Error::custom("only internal messages can be interpreted"));
    };
    if info.dst.is_null() {
        return Err(Error::custom("message has no destination"));
    }
    let transfer = Transfer {
        to: info.dst,
        value: info.value.grams,
    };

    let mut body = message.body.parser();
    let rule = BODY_RULES
        .iter()
        .find(|r| (r.accepts)(&body))
        .ok_or_else(|| CodecError::custom("unsupported message body"))?;
    (rule.decode)(&mut body, transfer).with_context(|| rule.name)
}

/// Dispatch entry for the body of a transfer request
struct BodyRule {
    name: &'static str,
    accepts: fn(&CellParser<'_>) -> bool,
    decode: fn(&mut CellParser<'_>, Transfer) -> DecodeResult,
}

/// Bits taken by opcode and query id
const HEADER_BITS: usize = 32 + 64;
/// Bits of the shortest non-zero coins amount followed by a standard address
const COINS_AND_ADDRESS_BITS: usize = 4 + MsgAddress::STD_BITS_LEN;

const BODY_RULES: &[BodyRule] = &[
    BodyRule {
        name: "comment",
        accepts: |b| b.bits_left() == 0 || peek_op(b) == Some(op::COMMENT),
        decode: decode_send_ton,
    },
    BodyRule {
        name: "jetton_transfer",
        accepts: |b| {
            b.bits_left() >= HEADER_BITS + COINS_AND_ADDRESS_BITS
                && peek_op(b) == Some(op::JETTON_TRANSFER)
        },
        decode: decode_send_jetton,
    },
    BodyRule {
        name: "jetton_mint",
        accepts: |b| {
            b.bits_left() >= HEADER_BITS + COINS_AND_ADDRESS_BITS
                && b.references_left() == 1
                && peek_op(b) == Some(op::JETTON_MINT)
        },
        decode: decode_mint_jetton,
    },
    BodyRule {
        name: "change_admin",
        accepts: |b| {
            b.bits_left() >= HEADER_BITS + MsgAddress::STD_BITS_LEN
                && peek_op(b) == Some(op::JETTON_CHANGE_ADMIN)
        },
        decode: decode_change_admin,
    },
    BodyRule {
        name: "controller_approve",
        accepts: |b| b.bits_left() == HEADER_BITS && peek_op(b) == Some(op::CONTROLLER_APPROVE),
        decode: |_, t| {
            Ok(Action::ApproveController {
                controller_address: t.to,
            })
        },
    },
    BodyRule {
        name: "pool_donate",
        accepts: |b| b.bits_left() == HEADER_BITS && peek_op(b) == Some(op::POOL_DONATE),
        decode: |_, t| {
            Ok(Action::PoolDonation {
                amount: t.value,
                pool_address: t.to,
            })
        },
    },
    BodyRule {
        name: "set_interest",
        accepts: |b| b.bits_left() == HEADER_BITS + 24 && peek_op(b) == Some(op::SET_INTEREST),
        decode: |b, t| {
            b.skip(HEADER_BITS)?;
            Ok(Action::UpdateInterestRate {
                interest_rate: b.unpack_as::<_, NBits<24>>()?,
                pool_address: t.to,
            })
        },
    },
    BodyRule {
        name: "set_governance_fee",
        accepts: |b| {
            b.bits_left() == HEADER_BITS + 24 && peek_op(b) == Some(op::SET_GOVERNANCE_FEE)
        },
        decode: |b, t| {
            b.skip(HEADER_BITS)?;
            Ok(Action::UpdateGovernanceFee {
                governance_fee: b.unpack_as::<_, NBits<24>>()?,
                pool_address: t.to,
            })
        },
    },
    BodyRule {
        name: "set_operational_params",
        accepts: |b| {
            b.bits_left() >= HEADER_BITS + 4 + 4 + 8 + 48
                && peek_op(b) == Some(op::SET_OPERATIONAL_PARAMS)
        },
        decode: decode_pool_params,
    },
];

/// Opcode without advancing the parser
fn peek_op(parser: &CellParser<'_>) -> Option<u32> {
    if parser.bits_left() < 32 {
        return None;
    }
    parser.clone().unpack().ok()
}

fn decode_send_ton(body: &mut CellParser<'_>, t: Transfer) -> DecodeResult {
    let comment = if body.bits_left() > 0 {
        body.skip(32)?;
        let bytes: Vec<u8> = body.parse_as::<_, SnakeString>()?;
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        String::new()
    };
    Ok(Action::SendTon {
        amount: t.value,
        recipient: t.to,
        comment,
    })
}

fn decode_send_jetton(body: &mut CellParser<'_>, t: Transfer) -> DecodeResult {
    body.skip(HEADER_BITS)?;
    Ok(Action::SendJetton {
        amount: body.unpack_as::<_, Coins>().context("amount")?,
        recipient: body.unpack().context("destination")?,
        jetton_wallet: t.to,
    })
}

fn decode_mint_jetton(body: &mut CellParser<'_>, t: Transfer) -> DecodeResult {
    let mint: JettonMint = body.parse()?;
    Ok(Action::MintJetton {
        amount: mint.amount().clone(),
        recipient: mint.to,
        jetton_master: t.to,
    })
}

fn decode_change_admin(body: &mut CellParser<'_>, t: Transfer) -> DecodeResult {
    body.skip(HEADER_BITS)?;
    Ok(Action::ChangeJettonMinterOwner {
        new_owner: body.unpack().context("new_admin")?,
        kton_contract: t.to,
    })
}

fn decode_pool_params(body: &mut CellParser<'_>, t: Transfer) -> DecodeResult {
    body.skip(HEADER_BITS)?;
    Ok(Action::UpdatePoolParams {
        min_validator_loan: body.unpack_as::<_, Coins>().context("min_validator_loan")?,
        max_validator_loan: body.unpack_as::<_, Coins>().context("max_validator_loan")?,
        disbalance_tolerance: body.unpack().context("disbalance_tolerance")?,
        credit_start_before: body
            .unpack_as::<_, NBits<48>>()
            .context("credit_start_before")?,
        pool_address: t.to,
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tonsig_tlb::bits::ser::BitWriter;
    use tonsig_tlb_ton::{currency::ONE_TON, message::ExternalOutMsgInfo};

    use crate::{
        jetton::{JettonChangeAdmin, JettonInternalTransfer, JettonTransfer},
        tests::addr,
    };

    use super::*;

    fn order_of(body: Cell) -> Cell {
        pack_order(encode_transfer(SendMode::default(), addr(7), ONE_TON.clone(), body).unwrap())
            .unwrap()
    }

    fn single(body: Cell) -> Action {
        let actions = decode_orders(&order_of(body));
        assert_eq!(actions.len(), 1);
        actions.into_iter().next().unwrap()
    }

    fn header(opcode: u32) -> CellBuilder {
        let mut b = Cell::builder();
        b.pack(opcode).unwrap().pack(0x1234_u64).unwrap();
        b
    }

    fn comment(text: &str) -> Cell {
        let mut b = Cell::builder();
        b.pack(op::COMMENT)
            .unwrap()
            .store_as::<_, SnakeString>(text)
            .unwrap();
        b.into_cell()
    }

    #[test]
    fn transfer_request_layout() {
        let cell = encode_transfer(SendMode::default(), addr(7), ONE_TON.clone(), Cell::new())
            .unwrap();

        assert_eq!(cell.data.len(), 32 + 8);
        assert_eq!(cell.references.len(), 1);
        let mut parser = cell.parser();
        assert_eq!(parser.unpack::<u32>().unwrap(), 0xf1381e5b);
        assert_eq!(parser.unpack::<u8>().unwrap(), 3);

        let got: TransferRequest = cell.parse_fully().unwrap();
        assert_eq!(got, TransferRequest::new(addr(7), ONE_TON.clone(), Cell::new()));
    }

    #[test]
    fn send_ton_round_trip() {
        assert_eq!(
            single(comment("hello")),
            Action::SendTon {
                amount: ONE_TON.clone(),
                recipient: addr(7),
                comment: "hello".into(),
            }
        );
    }

    #[test]
    fn send_ton_long_comment() {
        let text = "z".repeat(400);
        assert_eq!(
            single(comment(&text)),
            Action::SendTon {
                amount: ONE_TON.clone(),
                recipient: addr(7),
                comment: text,
            }
        );
    }

    #[test]
    fn send_ton_comment_lossy() {
        let mut body = Cell::builder();
        body.pack(op::COMMENT).unwrap().pack(0xFF_u8).unwrap();
        assert_eq!(
            single(body.into_cell()),
            Action::SendTon {
                amount: ONE_TON.clone(),
                recipient: addr(7),
                comment: "\u{FFFD}".into(),
            }
        );
    }

    #[test]
    fn send_ton_empty_body() {
        assert_eq!(
            single(Cell::new()),
            Action::SendTon {
                amount: ONE_TON.clone(),
                recipient: addr(7),
                comment: String::new(),
            }
        );
    }

    #[test]
    fn send_jetton() {
        let body = JettonTransfer::<Cell, Cell> {
            query_id: 1,
            amount: BigUint::from(500_u32),
            dst: addr(9),
            response_dst: addr(1),
            custom_payload: None,
            forward_ton_amount: BigUint::from(1_u8),
            forward_payload: Cell::new(),
        }
        .to_cell()
        .unwrap();

        assert_eq!(
            single(body),
            Action::SendJetton {
                amount: BigUint::from(500_u32),
                recipient: addr(9),
                jetton_wallet: addr(7),
            }
        );
    }

    #[test]
    fn mint_jetton() {
        let body = JettonMint::<Cell> {
            query_id: 1,
            to: addr(9),
            ton_amount: BigUint::from(10_u8),
            master_msg: JettonInternalTransfer {
                query_id: 1,
                amount: BigUint::from(777_u32),
                from: addr(7),
                response_address: addr(9),
                forward_ton_amount: BigUint::ZERO,
                forward_payload: Cell::new(),
            },
        }
        .to_cell()
        .unwrap();

        assert_eq!(
            single(body),
            Action::MintJetton {
                amount: BigUint::from(777_u32),
                recipient: addr(9),
                jetton_master: addr(7),
            }
        );
    }

    #[test]
    fn change_minter_owner() {
        let body = JettonChangeAdmin {
            query_id: 1,
            new_admin: addr(3),
        }
        .to_cell()
        .unwrap();

        assert_eq!(
            single(body),
            Action::ChangeJettonMinterOwner {
                new_owner: addr(3),
                kton_contract: addr(7),
            }
        );
    }

    #[test]
    fn approve_controller() {
        assert_eq!(
            single(header(op::CONTROLLER_APPROVE).into_cell()),
            Action::ApproveController {
                controller_address: addr(7)
            }
        );
    }

    #[test]
    fn pool_donation() {
        assert_eq!(
            single(header(op::POOL_DONATE).into_cell()),
            Action::PoolDonation {
                amount: ONE_TON.clone(),
                pool_address: addr(7),
            }
        );
    }

    #[test]
    fn interest_rate_and_governance_fee() {
        let mut b = header(op::SET_INTEREST);
        b.pack_as::<_, NBits<24>>(1_500_u32).unwrap();
        assert_eq!(
            single(b.into_cell()),
            Action::UpdateInterestRate {
                interest_rate: 1_500,
                pool_address: addr(7),
            }
        );

        let mut b = header(op::SET_GOVERNANCE_FEE);
        b.pack_as::<_, NBits<24>>(4_096_u32).unwrap();
        assert_eq!(
            single(b.into_cell()),
            Action::UpdateGovernanceFee {
                governance_fee: 4_096,
                pool_address: addr(7),
            }
        );
    }

    #[test]
    fn pool_params() {
        let mut b = header(op::SET_OPERATIONAL_PARAMS);
        b.pack_as::<_, &Coins>(&*ONE_TON)
            .unwrap()
            .pack_as::<_, &Coins>(&BigUint::from(5_000_000_000_000_u64))
            .unwrap()
            .pack(10_u8)
            .unwrap()
            .pack_as::<_, NBits<48>>(3_600_u64)
            .unwrap();

        assert_eq!(
            single(b.into_cell()),
            Action::UpdatePoolParams {
                min_validator_loan: ONE_TON.clone(),
                max_validator_loan: BigUint::from(5_000_000_000_000_u64),
                disbalance_tolerance: 10,
                credit_start_before: 3_600,
                pool_address: addr(7),
            }
        );
    }

    #[rstest]
    #[case(op::CONTROLLER_APPROVE, 0)]
    #[case(op::POOL_DONATE, 0)]
    #[case(op::SET_INTEREST, 24)]
    #[case(op::SET_GOVERNANCE_FEE, 24)]
    fn exact_length_with_trailing_bit(#[case] opcode: u32, #[case] extra: usize) {
        let mut exact = header(opcode);
        exact.repeat_bit(extra, false).unwrap();
        assert!(!single(exact.into_cell()).is_unknown());

        let mut longer = header(opcode);
        longer.repeat_bit(extra + 1, false).unwrap();
        assert_eq!(single(longer.into_cell()), Action::Unknown);
    }

    #[rstest]
    #[case(0)]
    #[case(8)]
    #[case(32)]
    fn short_cells_are_unknown(#[case] bits: usize) {
        let mut b = Cell::builder();
        b.repeat_bit(bits, true).unwrap();
        assert_eq!(Action::decode(&b.into_cell()), Action::Unknown);
    }

    #[test]
    fn unknown_opcode() {
        let mut b = Cell::builder();
        b.pack(0xdeadbeef_u32).unwrap().pack(0_u64).unwrap();
        assert_eq!(Action::decode(&b.into_cell()), Action::Unknown);
    }

    #[test]
    fn unknown_body() {
        assert_eq!(single(header(0xdeadbeef).into_cell()), Action::Unknown);
    }

    #[test]
    fn transfer_request_without_reference() {
        let mut b = Cell::builder();
        b.pack(op::TRANSFER_REQUEST).unwrap().pack(3_u8).unwrap();
        assert_eq!(Action::decode(&b.into_cell()), Action::Unknown);
    }

    #[test]
    fn external_out_is_unknown() {
        let message = MessageRelaxed {
            info: CommonMsgInfoRelaxed::ExternalOut(ExternalOutMsgInfo {
                src: addr(1),
                dst: MsgAddress::NULL,
                created_lt: 0,
                created_at: None,
            }),
            init: None,
            body: Cell::new(),
        };
        let action = TransferRequest {
            mode: SendMode::default(),
            message,
        }
        .to_cell()
        .unwrap();

        assert_eq!(Action::decode(&action), Action::Unknown);
    }

    fn addresses(addrs: &[MsgAddress]) -> Dictionary<MsgAddress> {
        let mut dict = Dictionary::new(KEY_BITS);
        for (i, a) in addrs.iter().enumerate() {
            dict.insert(i as u64, *a);
        }
        dict
    }

    #[test]
    fn update_config() {
        let mut signers = Cell::builder();
        addresses(&[addr(1), addr(2), addr(3)])
            .store_direct_as::<Data>(&mut signers)
            .unwrap();

        let mut b = Cell::builder();
        b.pack(op::UPDATE_CONFIG)
            .unwrap()
            .pack(2_u8)
            .unwrap()
            .store_reference(signers.into_cell())
            .unwrap();
        addresses(&[addr(4)])
            .store_direct_as::<Data>(&mut b)
            .unwrap();

        assert_eq!(
            Action::decode(&b.into_cell()),
            Action::UpdateConfig {
                signers: vec![addr(1), addr(2), addr(3)],
                proposers: vec![addr(4)],
                threshold: 2,
            }
        );
    }

    #[test]
    fn update_config_empty_proposers() {
        let mut signers = Cell::builder();
        addresses(&[addr(1)])
            .store_direct_as::<Data>(&mut signers)
            .unwrap();

        let mut b = Cell::builder();
        b.pack(op::UPDATE_CONFIG)
            .unwrap()
            .pack(1_u8)
            .unwrap()
            .store_reference(signers.into_cell())
            .unwrap()
            // hme_empty$0
            .pack(false)
            .unwrap();

        assert_eq!(
            Action::decode(&b.into_cell()),
            Action::UpdateConfig {
                signers: vec![addr(1)],
                proposers: Vec::new(),
                threshold: 1,
            }
        );
    }

    #[test]
    fn malformed_orders_dictionary() {
        let mut b = Cell::builder();
        // hml_long$10 with label longer than the key
        b.pack((true, false)).unwrap().pack(0xff_u8).unwrap().pack(true).unwrap();
        assert_eq!(decode_orders(&b.into_cell()), vec![Action::Unknown]);
    }

    #[test]
    fn orders_in_ascending_key_order() {
        let mut dict = Dictionary::new(KEY_BITS);
        dict.insert(
            5,
            encode_transfer(SendMode::default(), addr(5), ONE_TON.clone(), Cell::new()).unwrap(),
        );
        dict.insert(1, header(op::CONTROLLER_APPROVE).into_cell());
        dict.insert(
            2,
            encode_transfer(
                SendMode::default(),
                addr(2),
                ONE_TON.clone(),
                header(op::CONTROLLER_APPROVE).into_cell(),
            )
            .unwrap(),
        );
        let mut b = Cell::builder();
        dict.store_direct_as::<Ref>(&mut b).unwrap();

        let actions = decode_orders(&b.into_cell());
        assert_eq!(
            actions.iter().map(Action::kind).collect::<Vec<_>>(),
            ["UNKNOWN", "APPROVE_CONTROLLER", "SEND_TON"]
        );
    }

    #[test]
    fn kinds() {
        assert_eq!(Action::Unknown.kind(), "UNKNOWN");
        assert_eq!(
            Action::ChangeJettonMinterOwner {
                new_owner: addr(1),
                kton_contract: addr(2)
            }
            .kind(),
            "CHANGE_JETTON_MINTER_OWNER"
        );
    }

    #[test]
    fn details_use_friendly_addresses() {
        let action = Action::PoolDonation {
            amount: ONE_TON.clone(),
            pool_address: addr(7),
        };
        assert_eq!(
            action.details(Network::Testnet),
            vec![
                ("type", "POOL_DONATION".to_string()),
                ("amount", "1000000000".to_string()),
                ("pool_address", addr(7).to_base64_url_flags(false, true)),
            ]
        );
    }
}
