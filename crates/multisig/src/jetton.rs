//! Jetton message bodies from [TEP-74](https://github.com/ton-blockchain/TEPs/blob/master/text/0074-jettons-standard.md#tl-b-schema)
//! and the minter admin extensions.
use num_bigint::BigUint;
use tonsig_tlb::{
    Cell, ResultExt,
    r#as::{EitherInlineOrRef, ParseFully, Ref},
    bits::{de::BitReaderExt, integer::ConstU32, ser::BitWriterExt},
    de::{CellDeserialize, CellParser, CellParserError},
    ser::{CellBuilder, CellBuilderError, CellSerialize},
};
use tonsig_tlb_ton::{MsgAddress, currency::Coins};

use crate::op;

/// Jetton Transfer message
/// ```tlb
/// transfer#0f8a7ea5 query_id:uint64 amount:(VarUInteger 16) destination:MsgAddress
/// response_destination:MsgAddress custom_payload:(Maybe ^Cell)
/// forward_ton_amount:(VarUInteger 16) forward_payload:(Either Cell ^Cell)
/// = InternalMsgBody;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JettonTransfer<P = Cell, F = Cell> {
    pub query_id: u64,
    pub amount: BigUint,
    pub dst: MsgAddress,
    pub response_dst: MsgAddress,
    pub custom_payload: Option<P>,
    pub forward_ton_amount: BigUint,
    pub forward_payload: F,
}

impl<P, F> CellSerialize for JettonTransfer<P, F>
where
    P: CellSerialize,
    F: CellSerialize,
{
    fn store(&self, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        builder
            // transfer#0f8a7ea5
            .pack(op::JETTON_TRANSFER)?
            // query_id:uint64
            .pack(self.query_id)?
            // amount:(VarUInteger 16)
            .pack_as::<_, &Coins>(&self.amount)
            .context("amount")?
            // destination:MsgAddress
            .pack(self.dst)
            .context("destination")?
            // response_destination:MsgAddress
            .pack(self.response_dst)
            .context("response_destination")?
            // custom_payload:(Maybe ^Cell)
            .store_as::<_, Option<Ref>>(self.custom_payload.as_ref())
            .context("custom_payload")?
            // forward_ton_amount:(VarUInteger 16)
            .pack_as::<_, &Coins>(&self.forward_ton_amount)
            .context("forward_ton_amount")?
            // forward_payload:(Either Cell ^Cell)
            .store_as::<_, EitherInlineOrRef>(&self.forward_payload)
            .context("forward_payload")?;
        Ok(())
    }
}

impl<'de, P, F> CellDeserialize<'de> for JettonTransfer<P, F>
where
    P: CellDeserialize<'de>,
    F: CellDeserialize<'de>,
{
    fn parse(parser: &mut CellParser<'de>) -> Result<Self, CellParserError> {
        // transfer#0f8a7ea5
        parser.unpack::<ConstU32<{ op::JETTON_TRANSFER }>>()?;
        Ok(Self {
            // query_id:uint64
            query_id: parser.unpack()?,
            // amount:(VarUInteger 16)
            amount: parser.unpack_as::<_, Coins>().context("amount")?,
            // destination:MsgAddress
            dst: parser.unpack().context("destination")?,
            // response_destination:MsgAddress
            response_dst: parser.unpack().context("response_destination")?,
            // custom_payload:(Maybe ^Cell)
            custom_payload: parser
                .parse_as::<_, Option<Ref<ParseFully>>>()
                .context("custom_payload")?,
            // forward_ton_amount:(VarUInteger 16)
            forward_ton_amount: parser
                .unpack_as::<_, Coins>()
                .context("forward_ton_amount")?,
            // forward_payload:(Either Cell ^Cell)
            forward_payload: parser
                .parse_as::<_, EitherInlineOrRef<ParseFully>>()
                .context("forward_payload")?,
        })
    }
}

/// Jetton Internal Transfer message sent from minter or wallet to a wallet
/// ```tlb
/// internal_transfer#178d4519 query_id:uint64 amount:(VarUInteger 16) from:MsgAddress
/// response_address:MsgAddress forward_ton_amount:(VarUInteger 16)
/// forward_payload:(Either Cell ^Cell)
/// = InternalMsgBody;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JettonInternalTransfer<F = Cell> {
    pub query_id: u64,
    pub amount: BigUint,
    pub from: MsgAddress,
    pub response_address: MsgAddress,
    pub forward_ton_amount: BigUint,
    pub forward_payload: F,
}

impl<F> CellSerialize for JettonInternalTransfer<F>
where
    F: CellSerialize,
{
    fn store(&self, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        builder
            .pack(op::JETTON_INTERNAL_TRANSFER)?
            .pack(self.query_id)?
            .pack_as::<_, &Coins>(&self.amount)
            .context("amount")?
            .pack(self.from)
            .context("from")?
            .pack(self.response_address)
            .context("response_address")?
            .pack_as::<_, &Coins>(&self.forward_ton_amount)
            .context("forward_ton_amount")?
            .store_as::<_, EitherInlineOrRef>(&self.forward_payload)
            .context("forward_payload")?;
        Ok(())
    }
}

impl<'de, F> CellDeserialize<'de> for JettonInternalTransfer<F>
where
    F: CellDeserialize<'de>,
{
    fn parse(parser: &mut CellParser<'de>) -> Result<Self, CellParserError> {
        parser.unpack::<ConstU32<{ op::JETTON_INTERNAL_TRANSFER }>>()?;
        Ok(Self {
            query_id: parser.unpack()?,
            amount: parser.unpack_as::<_, Coins>().context("amount")?,
            from: parser.unpack().context("from")?,
            response_address: parser.unpack().context("response_address")?,
            forward_ton_amount: parser
                .unpack_as::<_, Coins>()
                .context("forward_ton_amount")?,
            forward_payload: parser
                .parse_as::<_, EitherInlineOrRef<ParseFully>>()
                .context("forward_payload")?,
        })
    }
}

/// Mint request to a jetton minter
/// ```tlb
/// mint#15 query_id:uint64 to:MsgAddress ton_amount:(VarUInteger 16)
/// master_msg:^JettonInternalTransfer
/// = InternalMsgBody;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JettonMint<F = Cell> {
    pub query_id: u64,
    pub to: MsgAddress,
    pub ton_amount: BigUint,
    pub master_msg: JettonInternalTransfer<F>,
}

impl<F> JettonMint<F> {
    /// Amount of jettons to be minted
    #[inline]
    pub fn amount(&self) -> &BigUint {
        &self.master_msg.amount
    }
}

impl<F> CellSerialize for JettonMint<F>
where
    F: CellSerialize,
{
    fn store(&self, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        builder
            .pack(op::JETTON_MINT)?
            .pack(self.query_id)?
            .pack(self.to)
            .context("to")?
            .pack_as::<_, &Coins>(&self.ton_amount)
            .context("ton_amount")?
            .store_as::<_, Ref>(&self.master_msg)
            .context("master_msg")?;
        Ok(())
    }
}

impl<'de, F> CellDeserialize<'de> for JettonMint<F>
where
    F: CellDeserialize<'de>,
{
    fn parse(parser: &mut CellParser<'de>) -> Result<Self, CellParserError> {
        parser.unpack::<ConstU32<{ op::JETTON_MINT }>>()?;
        Ok(Self {
            query_id: parser.unpack()?,
            to: parser.unpack().context("to")?,
            ton_amount: parser.unpack_as::<_, Coins>().context("ton_amount")?,
            master_msg: parser
                .parse_as::<_, Ref<ParseFully>>()
                .context("master_msg")?,
        })
    }
}

/// Transfer of jetton minter ownership
/// ```tlb
/// change_admin#3 query_id:uint64 new_admin:MsgAddress = InternalMsgBody;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JettonChangeAdmin {
    pub query_id: u64,
    pub new_admin: MsgAddress,
}

impl CellSerialize for JettonChangeAdmin {
    fn store(&self, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        builder
            .pack(op::JETTON_CHANGE_ADMIN)?
            .pack(self.query_id)?
            .pack(self.new_admin)
            .context("new_admin")?;
        Ok(())
    }
}

impl<'de> CellDeserialize<'de> for JettonChangeAdmin {
    fn parse(parser: &mut CellParser<'de>) -> Result<Self, CellParserError> {
        parser.unpack::<ConstU32<{ op::JETTON_CHANGE_ADMIN }>>()?;
        Ok(Self {
            query_id: parser.unpack()?,
            new_admin: parser.unpack().context("new_admin")?,
        })
    }
}
