//! Dictionaries keyed by fixed-width unsigned integers, stored as
//! [Hashmap](https://docs.ton.org/develop/data-formats/tl-b-types#hashmap)
//! binary tries.
use core::marker::PhantomData;
use std::collections::{BTreeMap, btree_map};

use strum::Display;
use tonsig_tlb::{
    Cell, CodecError, ResultExt,
    r#as::{NBits, Ref, Same, Unary},
    bits::{
        de::{BitReader, BitReaderExt},
        integer::{pack_uint, unpack_uint},
        ser::BitWriterExt,
    },
    de::{CellDeserialize, CellParser, CellParserError, r#as::CellDeserializeAs},
    ser::{CellBuilder, CellBuilderError, CellSerialize, r#as::CellSerializeAs},
};
use tracing::trace;

/// Ordered mapping from `key_bits`-wide unsigned keys to values.
///
/// Iteration always goes in ascending key order, regardless of the order
/// entries were inserted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary<V> {
    key_bits: u32,
    entries: BTreeMap<u64, V>,
}

impl<V> Dictionary<V> {
    /// Widest supported key
    pub const MAX_KEY_BITS: u32 = u64::BITS;

    #[inline]
    #[must_use]
    pub const fn new(key_bits: u32) -> Self {
        Self {
            key_bits,
            entries: BTreeMap::new(),
        }
    }

    #[inline]
    pub const fn key_bits(&self) -> u32 {
        self.key_bits
    }

    /// Inserts the value, returning the previous one stored under this key.
    ///
    /// Keys wider than [`key_bits`](Dictionary::key_bits) are rejected
    /// when the dictionary is stored.
    #[inline]
    pub fn insert(&mut self, key: u64, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    #[inline]
    pub fn get(&self, key: u64) -> Option<&V> {
        self.entries.get(&key)
    }

    #[inline]
    pub fn remove(&mut self, key: u64) -> Option<V> {
        self.entries.remove(&key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> btree_map::Iter<'_, u64, V> {
        self.entries.iter()
    }

    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.keys().copied()
    }

    #[inline]
    pub fn values(&self) -> btree_map::Values<'_, u64, V> {
        self.entries.values()
    }

    #[inline]
    pub fn into_values(self) -> btree_map::IntoValues<u64, V> {
        self.entries.into_values()
    }

    fn check_keys(&self) -> Result<(), CodecError> {
        if self.key_bits > Self::MAX_KEY_BITS {
            return Err(CodecError::dictionary(format!(
                "{} bit keys are not supported",
                self.key_bits
            )));
        }
        match self.entries.last_key_value() {
            Some((&key, _)) if key & !mask(self.key_bits) != 0 => Err(CodecError::dictionary(
                format!("key {key} does not fit into {} bits", self.key_bits),
            )),
            _ => Ok(()),
        }
    }

    /// Store entries as `Hashmap n X` right into the given builder, using
    /// an adapter for values.
    ///
    /// Empty dictionary has no direct representation and results in an
    /// error.
    pub fn store_direct_as<As>(&self, builder: &mut CellBuilder) -> Result<(), CellBuilderError>
    where
        As: CellSerializeAs<V> + ?Sized,
    {
        self.check_keys()?;
        if self.is_empty() {
            return Err(CodecError::dictionary(
                "empty dictionary cannot be stored directly",
            ));
        }
        let entries: Vec<(u64, &V)> = self.entries.iter().map(|(k, v)| (*k, v)).collect();
        store_edge::<V, As>(builder, &entries, self.key_bits)
    }

    /// Parse `Hashmap n X` stored right in the given parser, using an
    /// adapter for values.
    ///
    /// A slice with at most one bit and no references is treated as an
    /// empty dictionary.
    pub fn load_direct_as<'de, As>(
        parser: &mut CellParser<'de>,
        key_bits: u32,
    ) -> Result<Self, CellParserError>
    where
        As: CellDeserializeAs<'de, V> + ?Sized,
    {
        let mut dict = Self::new(key_bits);
        dict.check_keys()?;
        if parser.bits_left() <= 1 && parser.no_references_left() {
            parser.skip(parser.bits_left())?;
            return Ok(dict);
        }
        load_edge::<V, As>(parser, key_bits, 0, &mut dict.entries).map_err(|err| {
            match err.kind() {
                CodecError::Dictionary(_) => err,
                _ => CodecError::dictionary(err),
            }
        })?;
        Ok(dict)
    }
}

impl<V> Dictionary<V> {
    /// Shortcut for [`.store_direct_as::<Same>()`](Dictionary::store_direct_as)
    #[inline]
    pub fn store_direct(&self, builder: &mut CellBuilder) -> Result<(), CellBuilderError>
    where
        V: CellSerialize,
    {
        self.store_direct_as::<Same>(builder)
    }

    /// Shortcut for [`::load_direct_as::<Same>()`](Dictionary::load_direct_as)
    #[inline]
    pub fn load_direct<'de>(
        parser: &mut CellParser<'de>,
        key_bits: u32,
    ) -> Result<Self, CellParserError>
    where
        V: CellDeserialize<'de>,
    {
        Self::load_direct_as::<Same>(parser, key_bits)
    }
}

impl<V> IntoIterator for Dictionary<V> {
    type Item = (u64, V);
    type IntoIter = btree_map::IntoIter<u64, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a Dictionary<V> {
    type Item = (&'a u64, &'a V);
    type IntoIter = btree_map::Iter<'a, u64, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Lowest `bits` bits set
#[inline]
fn mask(bits: u32) -> u64 {
    u64::MAX.checked_shr(u64::BITS - bits).unwrap_or(0)
}

/// Appends `n` lowest bits of `bits` to the key prefix
#[inline]
fn push_bits(prefix: u64, bits: u64, n: u32) -> u64 {
    prefix.checked_shl(n).unwrap_or(0) | (bits & mask(n))
}

/// Number of bits needed for `#<= m`
#[inline]
const fn len_bits(m: u32) -> u32 {
    u32::BITS - m.leading_zeros()
}

/// ```tlb
/// hm_edge#_ {n:#} {X:Type} {l:#} {m:#} label:(HmLabel ~l n)
/// {n = (~m) + l} node:(HashmapNode m X) = Hashmap n X;
///
/// hmn_leaf#_ {X:Type} value:X = HashmapNode 0 X;
/// hmn_fork#_ {n:#} {X:Type} left:^(Hashmap n X)
///            right:^(Hashmap n X) = HashmapNode (n + 1) X;
/// ```
///
/// `entries` are sorted by key and share all bits above `m`.
fn store_edge<V, As>(
    builder: &mut CellBuilder,
    entries: &[(u64, &V)],
    m: u32,
) -> Result<(), CellBuilderError>
where
    As: CellSerializeAs<V> + ?Sized,
{
    let (Some(&(first, value)), Some(&(last, _))) = (entries.first(), entries.last()) else {
        return Err(CodecError::dictionary("empty edge"));
    };
    // common prefix of the smallest and the largest keys
    let l = match (first ^ last) & mask(m) {
        0 => m,
        diff => m - 1 - diff.ilog2(),
    };
    let label = first.checked_shr(m - l).unwrap_or(0) & mask(l);
    store_label(builder, label, l, m).context("label")?;

    let m = m - l;
    if m == 0 {
        // hmn_leaf#_
        return As::store_as(value, builder).context("value");
    }

    // hmn_fork#_
    let bit = m - 1;
    let split = entries.partition_point(|(key, _)| (key >> bit) & 1 == 0);
    let (left, right) = entries.split_at(split);
    for (branch, entries) in [("left", left), ("right", right)] {
        let mut child = Cell::builder();
        store_edge::<V, As>(&mut child, entries, bit).context(branch)?;
        builder.store_reference(child.into_cell()).context(branch)?;
    }
    Ok(())
}

fn load_edge<'de, V, As>(
    parser: &mut CellParser<'de>,
    m: u32,
    prefix: u64,
    entries: &mut BTreeMap<u64, V>,
) -> Result<(), CellParserError>
where
    As: CellDeserializeAs<'de, V> + ?Sized,
{
    let (label, l) = load_label(parser, m).context("label")?;
    let prefix = push_bits(prefix, label, l);

    let m = m - l;
    if m == 0 {
        // hmn_leaf#_
        let value = As::parse_as(parser).context("value")?;
        entries.insert(prefix, value);
        return Ok(());
    }

    // hmn_fork#_
    for (bit, branch) in [(0, "left"), (1, "right")] {
        let child = parser
            .pop_reference()
            .map_err(|_| CodecError::dictionary(format!("{branch} fork reference is missing")))?;
        let mut child = child.parser();
        load_edge::<V, As>(&mut child, m - 1, push_bits(prefix, bit, 1), entries)
            .context(branch)?;
        if !child.is_empty() {
            return Err(CodecError::dictionary(format!(
                "{branch}: {} bits, {} references left",
                child.bits_left(),
                child.references_left(),
            )));
        }
    }
    Ok(())
}

/// ```tlb
/// hml_short$0 {m:#} {n:#} len:(Unary ~n) {n <= m} s:(n * Bit) = HmLabel ~n m;
/// hml_long$10 {m:#} n:(#<= m) s:(n * Bit) = HmLabel ~n m;
/// hml_same$11 {m:#} v:Bit n:(#<= m) = HmLabel ~n m;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
enum HmLabel {
    #[strum(serialize = "hml_short$0")]
    Short,
    #[strum(serialize = "hml_long$10")]
    Long,
    #[strum(serialize = "hml_same$11")]
    Same(bool),
}

impl HmLabel {
    /// Picks the shortest encoding of `n`-bit `label`, preferring
    /// `hml_short`, then `hml_long` on ties.
    fn choose(label: u64, n: u32, m: u32) -> Self {
        let k = len_bits(m);
        let short = 2 * n + 2;
        let long = 2 + k + n;
        let same = 3 + k;
        let uniform = (label == 0 || label == mask(n)).then_some(label != 0);
        match uniform {
            Some(v) if same < short && same < long => Self::Same(v),
            _ if long < short => Self::Long,
            _ => Self::Short,
        }
    }
}

fn store_label(
    builder: &mut CellBuilder,
    label: u64,
    n: u32,
    m: u32,
) -> Result<(), CellBuilderError> {
    let kind = HmLabel::choose(label, n, m);
    trace!(n, m, label = %kind, "dictionary edge");
    let k = len_bits(m) as usize;
    match kind {
        HmLabel::Short => {
            builder
                .pack(false)?
                // len:(Unary ~n)
                .pack_as::<_, Unary>(n as usize)?;
            // s:(n * Bit)
            pack_uint(builder, label, n as usize)?;
        }
        HmLabel::Long => {
            builder.pack_as::<_, NBits<2>>(0b10_u8)?;
            // n:(#<= m)
            pack_uint(builder, n.into(), k)?;
            // s:(n * Bit)
            pack_uint(builder, label, n as usize)?;
        }
        HmLabel::Same(v) => {
            builder
                .pack_as::<_, NBits<2>>(0b11_u8)?
                // v:Bit
                .pack(v)?;
            // n:(#<= m)
            pack_uint(builder, n.into(), k)?;
        }
    }
    Ok(())
}

/// Returns label bits and their count
fn load_label(parser: &mut CellParser<'_>, m: u32) -> Result<(u64, u32), CellParserError> {
    let k = len_bits(m) as usize;
    let check = |n: u64| -> Result<u32, CellParserError> {
        // {n <= m}
        if n > m.into() {
            return Err(CodecError::dictionary(format!(
                "label of {n} bits exceeds remaining {m} key bits"
            )));
        }
        Ok(n as u32)
    };
    Ok(match parser.read_bit()? {
        // hml_short$0
        false => {
            // len:(Unary ~n)
            let n = check(parser.unpack_as::<usize, Unary>()? as u64)?;
            // s:(n * Bit)
            (unpack_uint(parser, n as usize)?, n)
        }
        true => match parser.read_bit()? {
            // hml_long$10
            false => {
                // n:(#<= m)
                let n = check(unpack_uint(parser, k)?)?;
                // s:(n * Bit)
                (unpack_uint(parser, n as usize)?, n)
            }
            // hml_same$11
            true => {
                // v:Bit
                let v = parser.read_bit()?;
                // n:(#<= m)
                let n = check(unpack_uint(parser, k)?)?;
                (if v { mask(n) } else { 0 }, n)
            }
        },
    })
}

/// Adapter for dictionaries stored right in the current cell:
/// ```tlb
/// hm_edge#_ {n:#} {X:Type} {l:#} {m:#} label:(HmLabel ~l n)
/// {n = (~m) + l} node:(HashmapNode m X) = Hashmap n X;
/// ```
/// where `n` is `N` and `X` is handled by `As`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hashmap<const N: u32, As: ?Sized = Same>(PhantomData<As>);

impl<const N: u32, V, As> CellSerializeAs<Dictionary<V>> for Hashmap<N, As>
where
    As: CellSerializeAs<V> + ?Sized,
{
    #[inline]
    fn store_as(source: &Dictionary<V>, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        ensure_key_bits::<N, V>(source)?;
        source.store_direct_as::<As>(builder)
    }
}

impl<'de, const N: u32, V, As> CellDeserializeAs<'de, Dictionary<V>> for Hashmap<N, As>
where
    As: CellDeserializeAs<'de, V> + ?Sized,
{
    #[inline]
    fn parse_as(parser: &mut CellParser<'de>) -> Result<Dictionary<V>, CellParserError> {
        Dictionary::load_direct_as::<As>(parser, N)
    }
}

/// Adapter for optional dictionaries:
/// ```tlb
/// hme_empty$0 {n:#} {X:Type} = HashmapE n X;
/// hme_root$1 {n:#} {X:Type} root:^(Hashmap n X) = HashmapE n X;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HashmapE<const N: u32, As: ?Sized = Same>(PhantomData<As>);

impl<const N: u32, V, As> CellSerializeAs<Dictionary<V>> for HashmapE<N, As>
where
    As: CellSerializeAs<V> + ?Sized,
{
    #[inline]
    fn store_as(source: &Dictionary<V>, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        ensure_key_bits::<N, V>(source)?;
        if source.is_empty() {
            // hme_empty$0
            builder.pack(false)?;
            return Ok(());
        }
        builder
            // hme_root$1
            .pack(true)?
            // root:^(Hashmap n X)
            .store_as::<_, Ref<&Hashmap<N, As>>>(source)?;
        Ok(())
    }
}

impl<'de, const N: u32, V, As> CellDeserializeAs<'de, Dictionary<V>> for HashmapE<N, As>
where
    As: CellDeserializeAs<'de, V> + ?Sized,
{
    #[inline]
    fn parse_as(parser: &mut CellParser<'de>) -> Result<Dictionary<V>, CellParserError> {
        Ok(match parser.read_bit()? {
            // hme_empty$0
            false => Dictionary::new(N),
            // hme_root$1 root:^(Hashmap n X)
            true => parser.parse_as::<_, Ref<Hashmap<N, As>>>()?,
        })
    }
}

#[inline]
fn ensure_key_bits<const N: u32, V>(dict: &Dictionary<V>) -> Result<(), CodecError> {
    if dict.key_bits() != N {
        return Err(CodecError::dictionary(format!(
            "expected {N} bit keys, got {}",
            dict.key_bits()
        )));
    }
    Ok(())
}
