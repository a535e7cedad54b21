//! TVM stack returned by `get_order_data` get-method of an order contract
use std::{collections::VecDeque, sync::Arc};

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;
use serde::Deserialize;
use serde_json::Value;
use tonsig_tlb::{BagOfCells, Cell, bits::de::BitReaderExt};
use tonsig_tlb_ton::MsgAddress;

use crate::{MultisigError, action::load_addresses};

/// Single entry of the stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackItem {
    Int(BigInt),
    Null,
    Cell(Arc<Cell>),
    Tuple(Vec<StackItem>),
}

/// Stack entry as it comes in JSON
#[derive(Deserialize)]
struct RawStackItem {
    r#type: String,
    #[serde(default)]
    num: Option<String>,
    #[serde(default)]
    cell: Option<String>,
    #[serde(default)]
    tuple: Option<Vec<Value>>,
}

impl StackItem {
    /// ```json
    /// {"type": "num", "num": "-0x1f"}
    /// {"type": "cell", "cell": "b5ee9c72..."}
    /// {"type": "tuple", "tuple": [...]}
    /// ```
    pub fn from_json(value: &Value) -> Result<Self, MultisigError> {
        let RawStackItem {
            r#type,
            num,
            cell,
            tuple,
        } = RawStackItem::deserialize(value)?;
        match (r#type.as_str(), num, cell, tuple) {
            ("num", Some(num), _, _) => parse_int(&num).map(Self::Int),
            ("null" | "nan", ..) => Ok(Self::Null),
            ("cell", _, Some(cell), _) => BagOfCells::parse_hex(cell)?
                .into_single_root()
                .map(Self::Cell)
                .ok_or_else(|| MultisigError::protocol("cell item must have a single root")),
            ("tuple", _, _, Some(tuple)) => tuple
                .iter()
                .map(Self::from_json)
                .collect::<Result<_, _>>()
                .map(Self::Tuple),
            (t @ ("num" | "cell" | "tuple"), ..) => Err(MultisigError::protocol(format!(
                "{t} stack item without {t:?} field"
            ))),
            (t, ..) => Err(MultisigError::protocol(format!(
                "unsupported stack item type: {t:?}"
            ))),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Null => "null",
            Self::Cell(_) => "cell",
            Self::Tuple(_) => "tuple",
        }
    }
}

/// Decimal or `0x`-prefixed hex integer with optional leading `-`
fn parse_int(s: &str) -> Result<BigInt, MultisigError> {
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (Sign::Minus, rest),
        None => (Sign::Plus, s),
    };
    let magnitude = match digits.strip_prefix("0x") {
        Some(hex) => BigUint::parse_bytes(hex.as_bytes(), 16),
        None => BigUint::parse_bytes(digits.as_bytes(), 10),
    }
    .ok_or_else(|| MultisigError::protocol(format!("invalid number: {s:?}")))?;
    Ok(BigInt::from_biguint(sign, magnitude))
}

pub fn parse_stack(items: &[Value]) -> Result<Vec<StackItem>, MultisigError> {
    items.iter().map(StackItem::from_json).collect()
}

/// Reads items from the top of the stack. Optional reads on an exhausted
/// stack yield `None`.
#[derive(Debug, Clone, Default)]
pub struct StackReader(VecDeque<StackItem>);

impl StackReader {
    #[inline]
    pub fn new(items: impl IntoIterator<Item = StackItem>) -> Self {
        Self(items.into_iter().collect())
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.0.len()
    }

    pub fn pop(&mut self) -> Result<StackItem, MultisigError> {
        self.0
            .pop_front()
            .ok_or_else(|| MultisigError::protocol("stack is exhausted"))
    }

    fn pop_opt(&mut self) -> Option<StackItem> {
        self.0.pop_front().filter(|item| *item != StackItem::Null)
    }

    pub fn read_int(&mut self) -> Result<BigInt, MultisigError> {
        self.read_int_opt()?
            .ok_or_else(|| MultisigError::protocol("expected int, got null"))
    }

    pub fn read_int_opt(&mut self) -> Result<Option<BigInt>, MultisigError> {
        self.pop_opt()
            .map(|item| match item {
                StackItem::Int(v) => Ok(v),
                item => Err(unexpected("int", &item)),
            })
            .transpose()
    }

    pub fn read_uint_opt<T>(&mut self) -> Result<Option<T>, MultisigError>
    where
        T: TryFrom<BigInt>,
    {
        self.read_int_opt()?
            .map(|v| {
                T::try_from(v.clone())
                    .map_err(|_| MultisigError::protocol(format!("{v} is out of range")))
            })
            .transpose()
    }

    pub fn read_bool_opt(&mut self) -> Result<Option<bool>, MultisigError> {
        Ok(self.read_int_opt()?.map(|v| !v.is_zero()))
    }

    pub fn read_cell_opt(&mut self) -> Result<Option<Arc<Cell>>, MultisigError> {
        self.pop_opt()
            .map(|item| match item {
                StackItem::Cell(cell) => Ok(cell),
                item => Err(unexpected("cell", &item)),
            })
            .transpose()
    }

    /// Address stored at the start of a slice
    pub fn read_address(&mut self) -> Result<MsgAddress, MultisigError> {
        let cell = self
            .read_cell_opt()?
            .ok_or_else(|| MultisigError::protocol("expected address, got null"))?;
        Ok(cell.parser().unpack()?)
    }
}

fn unexpected(expected: &str, got: &StackItem) -> MultisigError {
    MultisigError::protocol(format!("expected {expected}, got {}", got.type_name()))
}

/// State of an order contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderData {
    pub multisig_address: MsgAddress,
    pub order_seqno: BigInt,
    pub threshold: Option<u32>,
    pub executed: Option<bool>,
    pub signers: Vec<MsgAddress>,
    /// `approvals[i]` is set when `signers[i]` has approved
    pub approvals: Vec<bool>,
    pub approvals_num: Option<u32>,
    pub expiration_date: Option<u64>,
    pub order: Option<Arc<Cell>>,
}

impl OrderData {
    pub fn from_stack(items: impl IntoIterator<Item = StackItem>) -> Result<Self, MultisigError> {
        let mut stack = StackReader::new(items);

        let multisig_address = stack.read_address()?;
        let order_seqno = stack.read_int()?;
        let threshold = stack.read_uint_opt()?;
        let executed = stack.read_bool_opt()?;
        let signers = match stack.read_cell_opt()? {
            Some(cell) if cell.data.len() > 1 => load_addresses(&mut cell.parser())?,
            _ => Vec::new(),
        };
        let approvals = stack
            .read_int_opt()?
            .map(|mask| approvals_from_mask(&mask, signers.len()))
            .unwrap_or_default();

        Ok(Self {
            multisig_address,
            order_seqno,
            threshold,
            executed,
            signers,
            approvals,
            approvals_num: stack.read_uint_opt()?,
            expiration_date: stack.read_uint_opt()?,
            order: stack.read_cell_opt()?,
        })
    }

    /// Whether `signer` is among signers of the order and has approved it
    #[inline]
    pub fn is_approved_by(&self, signer: MsgAddress) -> bool {
        is_signer_approved(signer, &self.signers, &self.approvals)
    }
}

/// Bit `i` of the mask means signer `i` has approved
pub fn approvals_from_mask(mask: &BigInt, signers: usize) -> Vec<bool> {
    (0..signers as u64).map(|i| mask.bit(i)).collect()
}

pub fn is_signer_approved(signer: MsgAddress, signers: &[MsgAddress], approvals: &[bool]) -> bool {
    signers
        .iter()
        .position(|s| *s == signer)
        .and_then(|i| approvals.get(i).copied())
        .unwrap_or(false)
}

/// Response of `get_order_data` get-method
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDataResponse {
    pub stack: Vec<Value>,
}

impl OrderDataResponse {
    pub fn order_data(&self) -> Result<OrderData, MultisigError> {
        OrderData::from_stack(parse_stack(&self.stack)?)
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use rstest::rstest;
    use serde_json::json;
    use tonsig_tlb::{bits::ser::BitWriterExt, r#as::Data};
    use tonsig_tlb_ton::hashmap::Dictionary;

    use crate::{action::KEY_BITS, tests::addr};

    use super::*;

    fn boc_hex(cell: Cell) -> String {
        hex::encode(
            BagOfCells::from_root(cell)
                .serialize(Default::default())
                .unwrap(),
        )
    }

    fn address_cell(address: MsgAddress) -> Cell {
        let mut b = Cell::builder();
        b.pack(address).unwrap();
        b.into_cell()
    }

    fn signers_cell(signers: &[MsgAddress]) -> Cell {
        let mut dict = Dictionary::new(KEY_BITS);
        for (i, s) in signers.iter().enumerate() {
            dict.insert(i as u64, *s);
        }
        let mut b = Cell::builder();
        dict.store_direct_as::<Data>(&mut b).unwrap();
        b.into_cell()
    }

    #[test]
    fn numbers() {
        assert_eq!(
            parse_stack(&[
                json!({"type": "num", "num": "0x1f"}),
                json!({"type": "num", "num": "-0x1f"}),
                json!({"type": "num", "num": "42"}),
                json!({"type": "num", "num": "-7"}),
            ])
            .unwrap(),
            [31, -31, 42, -7].map(|v| StackItem::Int(v.into()))
        );
    }

    #[test]
    fn null_and_nan() {
        assert_eq!(
            parse_stack(&[json!({"type": "null"}), json!({"type": "nan"})]).unwrap(),
            [StackItem::Null, StackItem::Null]
        );
    }

    #[test]
    fn nested_tuple() {
        assert_eq!(
            StackItem::from_json(&json!({
                "type": "tuple",
                "tuple": [
                    {"type": "num", "num": "1"},
                    {"type": "tuple", "tuple": [{"type": "null"}]},
                ],
            }))
            .unwrap(),
            StackItem::Tuple(vec![
                StackItem::Int(1.into()),
                StackItem::Tuple(vec![StackItem::Null]),
            ])
        );
    }

    #[test]
    fn cell_item() {
        // empty cell
        let item =
            StackItem::from_json(&json!({"type": "cell", "cell": "b5ee9c72010101010002000000"}))
                .unwrap();
        let StackItem::Cell(cell) = item else {
            panic!("expected cell, got {item:?}");
        };
        assert_eq!(
            cell.hash(),
            hex!("96a296d224f285c67bee93c30f8a309157f0daa35dc5b87e410b78630a09cfc7")
        );
    }

    #[test]
    fn unsupported_type() {
        assert!(matches!(
            StackItem::from_json(&json!({"type": "slice", "slice": "00"})),
            Err(MultisigError::Protocol(_))
        ));
        assert!(StackItem::from_json(&json!({"type": "num", "num": "abc"})).is_err());
    }

    #[rstest]
    #[case(json!({"type": "num"}), "num stack item without \"num\" field")]
    #[case(json!({"type": "cell", "num": "1"}), "cell stack item without \"cell\" field")]
    #[case(json!({"type": "tuple"}), "tuple stack item without \"tuple\" field")]
    fn missing_payload_field(#[case] item: Value, #[case] msg: &str) {
        match StackItem::from_json(&item) {
            Err(MultisigError::Protocol(got)) => assert_eq!(got, msg),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn order_data() {
        let signers = [addr(1), addr(2), addr(3)];
        let stack = [
            json!({"type": "cell", "cell": boc_hex(address_cell(addr(100)))}),
            json!({"type": "num", "num": "0x5"}),
            json!({"type": "num", "num": "2"}),
            json!({"type": "num", "num": "0"}),
            json!({"type": "cell", "cell": boc_hex(signers_cell(&signers))}),
            json!({"type": "num", "num": "0x5"}),
            json!({"type": "num", "num": "2"}),
            json!({"type": "num", "num": "1700000000"}),
            json!({"type": "cell", "cell": boc_hex(Cell::new())}),
        ];
        let response: OrderDataResponse =
            serde_json::from_value(json!({ "stack": stack })).unwrap();

        let data = response.order_data().unwrap();
        assert_eq!(data.multisig_address, addr(100));
        assert_eq!(data.order_seqno, BigInt::from(5));
        assert_eq!(data.threshold, Some(2));
        assert_eq!(data.executed, Some(false));
        assert_eq!(data.signers, signers);
        assert_eq!(data.approvals, [true, false, true]);
        assert_eq!(data.approvals_num, Some(2));
        assert_eq!(data.expiration_date, Some(1_700_000_000));
        assert_eq!(data.order.as_deref(), Some(&Cell::new()));

        assert!(data.is_approved_by(addr(3)));
        assert!(!data.is_approved_by(addr(2)));
        assert!(!data.is_approved_by(addr(9)));
    }

    #[test]
    fn missing_trailing_items() {
        let data = OrderData::from_stack([
            StackItem::Cell(Arc::new(address_cell(addr(100)))),
            StackItem::Int(1.into()),
            StackItem::Null,
        ])
        .unwrap();

        assert_eq!(data.threshold, None);
        assert_eq!(data.executed, None);
        assert!(data.signers.is_empty());
        assert!(data.approvals.is_empty());
        assert_eq!(data.order, None);
    }

    #[test]
    fn wrong_item_type() {
        assert!(matches!(
            OrderData::from_stack([StackItem::Int(1.into())]),
            Err(MultisigError::Protocol(_))
        ));
    }

    #[test]
    fn approvals_bitmask() {
        assert_eq!(
            approvals_from_mask(&0b1010.into(), 5),
            [false, true, false, true, false]
        );
        assert!(is_signer_approved(addr(2), &[addr(1), addr(2)], &[false, true]));
        assert!(!is_signer_approved(addr(2), &[addr(1), addr(2)], &[true]));
    }
}
