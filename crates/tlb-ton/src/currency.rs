//! Collection of types to work with currencies
use lazy_static::lazy_static;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use tonsig_tlb::{
    CodecError, Error, ResultExt,
    r#as::{Data, VarInt},
    bits::{de::BitReaderExt, ser::BitWriterExt},
    de::{CellDeserialize, CellParser, CellParserError},
    ser::{CellBuilder, CellBuilderError, CellSerialize},
};

use crate::hashmap::{Dictionary, HashmapE};

lazy_static! {
    /// 1 gram (nano-TON)
    pub static ref ONE_GRAM: BigUint = BigUint::one();
    /// 1 TON
    pub static ref ONE_TON: BigUint = &*ONE_GRAM * NANO_PER_TON;
}

const NANO_PER_TON: u64 = 1_000_000_000;
const NANO_DIGITS: usize = 9;

/// Alias for `VarUInteger 16`
/// ```tlb
/// nanograms$_ amount:(VarUInteger 16) = Grams;
/// ```
pub type Coins = VarInt<4>;

/// Alias for `VarUInteger 16`
/// ```tlb
/// nanograms$_ amount:(VarUInteger 16) = Grams;
/// ```
pub type Grams = Coins;

/// Converts decimal TON amount (e.g. `"0.05"`) into nanotons.
///
/// At most 9 fractional digits are accepted.
pub fn to_nano(amount: impl AsRef<str>) -> Result<BigUint, CodecError> {
    let amount = amount.as_ref().trim();
    let (int, frac) = amount.split_once('.').unwrap_or((amount, ""));
    if int.is_empty() && frac.is_empty() {
        return Err(Error::custom(format!("invalid amount: {amount:?}")));
    }
    if frac.len() > NANO_DIGITS {
        return Err(Error::custom(format!(
            "too many fractional digits: {}",
            frac.len()
        )));
    }
    if !int.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(Error::custom(format!("invalid amount: {amount:?}")));
    }
    let digits = format!("{int}{frac:0<NANO_DIGITS$}");
    BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| CodecError::custom(format!("invalid amount: {amount:?}")))
}

/// Formats nanotons as decimal TON amount without trailing zeros
pub fn from_nano(nano: &BigUint) -> String {
    let int = nano / NANO_PER_TON;
    let frac = nano % NANO_PER_TON;
    if frac.is_zero() {
        return int.to_string();
    }
    let frac = format!("{:0>NANO_DIGITS$}", frac.to_string());
    format!("{int}.{}", frac.trim_end_matches('0'))
}

/// [`CurrencyCollection`](https://docs.ton.org/develop/data-formats/msg-tlb#currencycollection)
/// ```tlb
/// currencies$_ grams:Grams other:ExtraCurrencyCollection = CurrencyCollection;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CurrencyCollection {
    pub grams: BigUint,
    pub other: ExtraCurrencyCollection,
}

impl CurrencyCollection {
    #[inline]
    pub const fn grams(grams: BigUint) -> Self {
        Self {
            grams,
            other: ExtraCurrencyCollection::new(),
        }
    }
}

impl CellSerialize for CurrencyCollection {
    #[inline]
    fn store(&self, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        builder
            .pack_as::<_, &Grams>(&self.grams)
            .context("grams")?
            .store(&self.other)
            .context("other")?;
        Ok(())
    }
}

impl<'de> CellDeserialize<'de> for CurrencyCollection {
    #[inline]
    fn parse(parser: &mut CellParser<'de>) -> Result<Self, CellParserError> {
        Ok(Self {
            grams: parser.unpack_as::<_, Grams>().context("grams")?,
            other: parser.parse().context("other")?,
        })
    }
}

/// ```tlb
/// extra_currencies$_ dict:(HashmapE 32 (VarUInteger 32)) = ExtraCurrencyCollection;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraCurrencyCollection(pub Dictionary<BigUint>);

impl ExtraCurrencyCollection {
    #[inline]
    pub const fn new() -> Self {
        Self(Dictionary::new(32))
    }
}

impl Default for ExtraCurrencyCollection {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl CellSerialize for ExtraCurrencyCollection {
    #[inline]
    fn store(&self, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        builder.store_as::<_, &HashmapE<32, Data<VarInt<5>>>>(&self.0)?;
        Ok(())
    }
}

impl<'de> CellDeserialize<'de> for ExtraCurrencyCollection {
    #[inline]
    fn parse(parser: &mut CellParser<'de>) -> Result<Self, CellParserError> {
        Ok(Self(parser.parse_as::<_, HashmapE<32, Data<VarInt<5>>>>()?))
    }
}
