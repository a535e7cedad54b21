//! Collection of types related to [Message](https://docs.ton.org/develop/data-formats/msg-tlb#message-tl-b)
use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use tonsig_tlb::{
    Cell, Either, Error, ResultExt,
    r#as::{EitherInlineOrRef, Ref, Same},
    bits::{
        de::{BitReader, BitReaderExt, BitUnpack},
        ser::{BitPack, BitWriter, BitWriterExt},
    },
    de::{CellDeserialize, CellParser, CellParserError},
    ser::{CellBuilder, CellBuilderError, CellSerialize, CellSerializeExt},
};

use crate::{
    MsgAddress, UnixTimestamp,
    currency::{CurrencyCollection, Grams},
    state_init::StateInit,
};

/// Message as it is passed to the `SENDRAWMSG` primitive, where the fields
/// filled in by validators may be left empty:
/// ```tlb
/// message$_ {X:Type} info:CommonMsgInfoRelaxed
/// init:(Maybe (Either StateInit ^StateInit))
/// body:(Either X ^X) = MessageRelaxed X;
/// ```
///
/// The body is stored inline only when the cell keeps two spare bits after
/// it, with each of its references counted as a bit. Otherwise it goes to
/// a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRelaxed<T = Cell, IC = Cell, ID = Cell> {
    pub info: CommonMsgInfoRelaxed,
    pub init: Option<StateInit<IC, ID>>,
    pub body: T,
}

impl<T> MessageRelaxed<T> {
    /// Simple native transfer message
    #[inline]
    pub const fn transfer(dst: MsgAddress, grams: BigUint, bounce: bool, body: T) -> Self {
        Self {
            info: CommonMsgInfoRelaxed::transfer(dst, grams, bounce),
            init: None,
            body,
        }
    }
}

impl<T, IC, ID> MessageRelaxed<T, IC, ID> {
    #[inline]
    pub fn with_state_init(mut self, state_init: impl Into<Option<StateInit<IC, ID>>>) -> Self {
        self.init = state_init.into();
        self
    }
}

impl<T, IC, ID> CellSerialize for MessageRelaxed<T, IC, ID>
where
    T: CellSerialize,
    IC: CellSerialize,
    ID: CellSerialize,
{
    fn store(&self, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        builder
            // info:CommonMsgInfoRelaxed
            .store(&self.info)
            .context("info")?
            // init:(Maybe (Either StateInit ^StateInit))
            .store_as::<_, &Option<EitherInlineOrRef>>(&self.init)
            .context("init")?;

        // body:(Either X ^X)
        let body = self.body.to_cell().context("body")?;
        let inline = body.data.len() + body.references.len() + 2 <= builder.capacity_left()
            && body.references.len() <= builder.references_left();
        builder
            .store_as::<_, Either<Same, Ref>>(if inline {
                Either::Left(body)
            } else {
                Either::Right(body)
            })
            .context("body")?;
        Ok(())
    }
}

impl<'de, T, IC, ID> CellDeserialize<'de> for MessageRelaxed<T, IC, ID>
where
    T: CellDeserialize<'de>,
    IC: CellDeserialize<'de>,
    ID: CellDeserialize<'de>,
{
    fn parse(parser: &mut CellParser<'de>) -> Result<Self, CellParserError> {
        Ok(Self {
            // info:CommonMsgInfoRelaxed
            info: parser.parse().context("info")?,
            // init:(Maybe (Either StateInit ^StateInit))
            init: parser
                .parse_as::<_, Option<EitherInlineOrRef>>()
                .context("init")?,
            // body:(Either X ^X)
            body: parser.parse_as::<_, EitherInlineOrRef>().context("body")?,
        })
    }
}

/// `info` field for [`MessageRelaxed`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommonMsgInfoRelaxed {
    /// ```tlb
    /// int_msg_info$0
    /// ```
    Internal(InternalMsgInfo),

    /// ```tlb
    /// ext_out_msg_info$11
    /// ```
    ExternalOut(ExternalOutMsgInfo),
}

impl CommonMsgInfoRelaxed {
    #[inline]
    pub const fn transfer(dst: MsgAddress, grams: BigUint, bounce: bool) -> Self {
        Self::Internal(InternalMsgInfo::transfer(dst, grams, bounce))
    }
}

impl CellSerialize for CommonMsgInfoRelaxed {
    #[inline]
    fn store(&self, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        match self {
            Self::Internal(msg) => builder
                // int_msg_info$0
                .pack(false)?
                .store(msg)
                .context("int_msg_info")?,
            Self::ExternalOut(msg) => builder
                // ext_out_msg_info$11
                .pack((true, true))?
                .pack(msg)
                .context("ext_out_msg_info")?,
        };
        Ok(())
    }
}

impl<'de> CellDeserialize<'de> for CommonMsgInfoRelaxed {
    #[inline]
    fn parse(parser: &mut CellParser<'de>) -> Result<Self, CellParserError> {
        match parser.unpack()? {
            // int_msg_info$0
            false => Ok(Self::Internal(parser.parse().context("int_msg_info")?)),
            true => match parser.unpack()? {
                // ext_in_msg_info$10
                false => Err(Error::custom(
                    "ext_in_msg_info$10 is not allowed in relaxed messages",
                )),
                // ext_out_msg_info$11
                true => Ok(Self::ExternalOut(
                    parser.unpack().context("ext_out_msg_info")?,
                )),
            },
        }
    }
}

/// [`int_msg_info$0`](https://docs.ton.org/develop/data-formats/msg-tlb#int_msg_info0)
/// ```tlb
/// int_msg_info$0 ihr_disabled:Bool bounce:Bool bounced:Bool
/// src:MsgAddress dest:MsgAddressInt
/// value:CurrencyCollection ihr_fee:Grams fwd_fee:Grams
/// created_lt:uint64 created_at:uint32 = CommonMsgInfoRelaxed;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalMsgInfo {
    /// Hyper cube routing flag.
    pub ihr_disabled: bool,
    /// Message should be bounced if there are errors during processing.
    pub bounce: bool,
    /// Message itself is a result of bounce.
    pub bounced: bool,
    /// Sender, usually left empty and filled in by validators
    pub src: MsgAddress,
    pub dst: MsgAddress,
    pub value: CurrencyCollection,
    pub ihr_fee: BigUint,
    pub fwd_fee: BigUint,
    pub created_lt: u64,
    pub created_at: Option<DateTime<Utc>>,
}

impl InternalMsgInfo {
    #[inline]
    pub const fn transfer(dst: MsgAddress, grams: BigUint, bounce: bool) -> Self {
        InternalMsgInfo {
            ihr_disabled: true,
            bounce,
            bounced: false,
            src: MsgAddress::NULL,
            dst,
            value: CurrencyCollection::grams(grams),
            ihr_fee: BigUint::ZERO,
            fwd_fee: BigUint::ZERO,
            created_lt: 0,
            created_at: None,
        }
    }
}

impl CellSerialize for InternalMsgInfo {
    fn store(&self, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        builder
            .pack(self.ihr_disabled)?
            .pack(self.bounce)?
            .pack(self.bounced)?
            .pack(self.src)
            .context("src")?
            .pack(self.dst)
            .context("dst")?
            .store(&self.value)
            .context("value")?
            .pack_as::<_, &Grams>(&self.ihr_fee)
            .context("ihr_fee")?
            .pack_as::<_, &Grams>(&self.fwd_fee)
            .context("fwd_fee")?
            .pack(self.created_lt)?
            .pack_as::<_, UnixTimestamp>(self.created_at)
            .context("created_at")?;
        Ok(())
    }
}

impl<'de> CellDeserialize<'de> for InternalMsgInfo {
    fn parse(parser: &mut CellParser<'de>) -> Result<Self, CellParserError> {
        Ok(Self {
            ihr_disabled: parser.unpack()?,
            bounce: parser.unpack()?,
            bounced: parser.unpack()?,
            src: parser.unpack().context("src")?,
            dst: parser.unpack().context("dst")?,
            value: parser.parse().context("value")?,
            ihr_fee: parser.unpack_as::<_, Grams>().context("ihr_fee")?,
            fwd_fee: parser.unpack_as::<_, Grams>().context("fwd_fee")?,
            created_lt: parser.unpack()?,
            created_at: parser
                .unpack_as::<_, UnixTimestamp>()
                .context("created_at")?,
        })
    }
}

/// [`ext_out_msg_info$11`](https://docs.ton.org/develop/data-formats/msg-tlb#ext_out_msg_info11)
/// ```tlb
/// ext_out_msg_info$11 src:MsgAddress dest:MsgAddressExt
/// created_lt:uint64 created_at:uint32 = CommonMsgInfoRelaxed;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalOutMsgInfo {
    pub src: MsgAddress,
    pub dst: MsgAddress,
    pub created_lt: u64,
    pub created_at: Option<DateTime<Utc>>,
}

impl BitPack for ExternalOutMsgInfo {
    fn pack<W>(&self, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        writer
            .pack(self.src)?
            .pack(self.dst)?
            .pack(self.created_lt)?
            .pack_as::<_, UnixTimestamp>(self.created_at)?;
        Ok(())
    }
}

impl BitUnpack for ExternalOutMsgInfo {
    fn unpack<R>(reader: &mut R) -> Result<Self, R::Error>
    where
        R: BitReader + ?Sized,
    {
        Ok(Self {
            src: reader.unpack()?,
            dst: reader.unpack()?,
            created_lt: reader.unpack()?,
            created_at: reader.unpack_as::<_, UnixTimestamp>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::currency::ONE_TON;

    use super::*;

    fn dst() -> MsgAddress {
        "EQBGXZ9ddZeWypx8EkJieHJX75ct0bpkmu0Y4YoYr3NM0Z9e"
            .parse()
            .unwrap()
    }

    #[test]
    fn transfer_layout() {
        let msg = MessageRelaxed::transfer(dst(), ONE_TON.clone(), true, Cell::new());

        let cell = msg.to_cell().unwrap();
        // 0 1 1 0 | 00 | addr_std | grams (4 + 32) | 0 | 0 | 0 | 64 | 32 | 0 | 0
        assert_eq!(
            cell.data.len(),
            4 + 2 + MsgAddress::STD_BITS_LEN + 4 + 32 + 1 + 4 + 4 + 64 + 32 + 1 + 1
        );
        assert!(cell.references.is_empty());

        let got: MessageRelaxed = cell.parse_fully().unwrap();
        assert_eq!(got, msg);
    }

    #[test]
    fn large_body_goes_to_reference() {
        let mut body = Cell::builder();
        body.repeat_bit(800, true).unwrap();
        let msg = MessageRelaxed::transfer(dst(), ONE_TON.clone(), true, body.into_cell());

        let cell = msg.to_cell().unwrap();
        assert_eq!(cell.references.len(), 1);

        let got: MessageRelaxed = cell.parse_fully().unwrap();
        assert_eq!(got, msg);
    }

    #[test]
    fn body_keeps_two_spare_bits() {
        let info_bits = MessageRelaxed::transfer(dst(), ONE_TON.clone(), true, ())
            .to_cell()
            .unwrap()
            .data
            .len()
            - 1;
        let body = |bits: usize| {
            let mut body = Cell::builder();
            body.repeat_bit(bits, true).unwrap();
            MessageRelaxed::transfer(dst(), ONE_TON.clone(), true, body.into_cell())
                .to_cell()
                .unwrap()
        };
        let left = 1023 - info_bits;

        let inline = body(left - 2);
        assert!(inline.references.is_empty());
        assert_eq!(inline.data.len(), 1022);

        let referenced = body(left - 1);
        assert_eq!(referenced.references.len(), 1);
        assert_eq!(referenced.data.len(), info_bits + 1);
        let got: MessageRelaxed = referenced.parse_fully().unwrap();
        assert_eq!(got.body.data.len(), left - 1);
    }

    #[test]
    fn external_out_serde() {
        let info = CommonMsgInfoRelaxed::ExternalOut(ExternalOutMsgInfo {
            src: dst(),
            dst: MsgAddress::NULL,
            created_lt: 5,
            created_at: None,
        });

        let cell = info.to_cell().unwrap();
        let got: CommonMsgInfoRelaxed = cell.parse_fully().unwrap();

        assert_eq!(got, info);
    }

    #[test]
    fn external_in_rejected() {
        let mut builder = Cell::builder();
        builder.pack((true, false)).unwrap();
        let cell = builder.into_cell();
        assert!(cell.parse_fully::<CommonMsgInfoRelaxed>().is_err());
    }
}
