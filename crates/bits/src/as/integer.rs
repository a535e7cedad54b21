use bitvec::{mem::bits_of, order::Msb0, view::AsBits};
use num_bigint::BigUint;

use crate::{
    Error, ResultExt,
    de::{BitReader, BitReaderExt, r#as::{BitUnpackAs, BitUnpackAsWithArgs}},
    ser::{BitWriter, BitWriterExt, r#as::{BitPackAs, BitPackAsWithArgs}},
};

use super::{NBits, VarBytes};

/// Writes lowest `n` bits of big-endian `bytes`, left-padding with zeros
/// when `bytes` are shorter.
#[inline]
fn write_low_bits<W>(writer: &mut W, bytes: &[u8], n: usize) -> Result<(), W::Error>
where
    W: BitWriter + ?Sized,
{
    let bits = bytes.as_bits::<Msb0>();
    if n <= bits.len() {
        return writer.write_bitslice(&bits[bits.len() - n..]);
    }
    writer
        .with_repeat_bit(n - bits.len(), false)?
        .write_bitslice(bits)
}

impl<const BITS: usize> BitPackAs<BigUint> for NBits<BITS> {
    #[inline]
    fn pack_as<W>(source: &BigUint, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        <VarNBits as BitPackAsWithArgs<BigUint>>::pack_as_with(source, writer, BITS)
    }
}

impl<const BITS: usize> BitUnpackAs<BigUint> for NBits<BITS> {
    #[inline]
    fn unpack_as<R>(reader: &mut R) -> Result<BigUint, R::Error>
    where
        R: BitReader + ?Sized,
    {
        <VarNBits as BitUnpackAsWithArgs<BigUint>>::unpack_as_with(reader, BITS)
    }
}

/// Adapter for [`VarUInteger n`](https://docs.ton.org/develop/data-formats/msg-tlb#varuinteger-n)
/// where `n` is *constant*.
///
/// ```tlb
/// var_uint$_ {n:#} len:(#< n) value:(uint (len * 8)) = VarUInteger n;
/// ```
/// Zero is stored as zero-length value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarInt<const BITS_FOR_BYTES_LEN: usize>;

impl<const BITS_FOR_BYTES_LEN: usize> BitPackAs<BigUint> for VarInt<BITS_FOR_BYTES_LEN> {
    #[inline]
    fn pack_as<W>(source: &BigUint, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        let bytes = if source != &BigUint::ZERO {
            source.to_bytes_be()
        } else {
            // BigUint::to_bytes_be() returns [0] instead of []
            Vec::new()
        };
        writer.pack_as::<_, VarBytes<BITS_FOR_BYTES_LEN>>(bytes)?;
        Ok(())
    }
}

impl<const BITS_FOR_BYTES_LEN: usize> BitUnpackAs<BigUint> for VarInt<BITS_FOR_BYTES_LEN> {
    #[inline]
    fn unpack_as<R>(reader: &mut R) -> Result<BigUint, R::Error>
    where
        R: BitReader + ?Sized,
    {
        reader
            .unpack_as::<Vec<u8>, VarBytes<BITS_FOR_BYTES_LEN>>()
            .map(|bytes| BigUint::from_bytes_be(&bytes))
    }
}

/// Unsigned integer of `n` bits where `n` is *dynamic*.
///
/// Same truncation rules as for [`NBits`] apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarNBits;

macro_rules! impl_var_nbits_for_integers {
    ($($t:tt)+) => {$(
        impl BitPackAsWithArgs<$t> for VarNBits {
            /// number of bits
            type Args = usize;

            #[inline]
            fn pack_as_with<W>(source: &$t, writer: &mut W, num_bits: Self::Args) -> Result<(), W::Error>
            where
                W: BitWriter + ?Sized,
            {
                write_low_bits(writer, &source.to_be_bytes(), num_bits)
            }
        }

        impl BitUnpackAsWithArgs<$t> for VarNBits {
            /// number of bits
            type Args = usize;

            #[inline]
            fn unpack_as_with<R>(reader: &mut R, num_bits: Self::Args) -> Result<$t, R::Error>
            where
                R: BitReader + ?Sized,
            {
                if num_bits > bits_of::<$t>() {
                    return Err(Error::custom(format!(
                        "{num_bits} bits do not fit into {}",
                        stringify!($t),
                    )));
                }
                let mut v: $t = 0;
                for i in 0..num_bits {
                    let bit = reader.read_bit().with_context(|| format!("bit {i}"))?;
                    v = (v << 1) | bit as $t;
                }
                Ok(v)
            }
        }
    )+};
}
impl_var_nbits_for_integers! { u8 u16 u32 u64 u128 usize }

impl BitPackAsWithArgs<BigUint> for VarNBits {
    /// number of bits
    type Args = usize;

    #[inline]
    fn pack_as_with<W>(
        source: &BigUint,
        writer: &mut W,
        num_bits: Self::Args,
    ) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        write_low_bits(writer, &source.to_bytes_be(), num_bits)
    }
}

impl BitUnpackAsWithArgs<BigUint> for VarNBits {
    /// number of bits
    type Args = usize;

    #[inline]
    fn unpack_as_with<R>(reader: &mut R, num_bits: Self::Args) -> Result<BigUint, R::Error>
    where
        R: BitReader + ?Sized,
    {
        let mut bits = reader.read_bitvec(num_bits)?;
        let total_bits = bits.len().next_multiple_of(8);
        let shift = total_bits - bits.len();
        bits.resize(total_bits, false);
        bits.shift_right(shift);
        Ok(BigUint::from_bytes_be(bits.as_raw_slice()))
    }
}

#[cfg(test)]
mod tests {
    use bitvec::bits;

    use crate::{r#as::NBits, ser::r#as::pack_as, tests::assert_pack_unpack_as_eq};

    use super::*;

    #[test]
    fn coins_zero_is_empty() {
        assert_eq!(
            pack_as::<_, VarInt<4>>(BigUint::ZERO).unwrap(),
            bits![u8, Msb0; 0, 0, 0, 0],
        );
    }

    #[test]
    fn coins_too_large() {
        let v = BigUint::from_bytes_be(&[0xff; 16]);
        assert!(pack_as::<_, VarInt<4>>(v).is_err());
    }

    #[test]
    fn serde_coins() {
        assert_pack_unpack_as_eq::<BigUint, VarInt<4>>(1_000_000_000_u64.into());
    }

    #[test]
    fn big_nbits_truncates() {
        let v = BigUint::from(0x1ff_u32);
        assert_eq!(
            pack_as::<_, NBits<4>>(v).unwrap(),
            bits![u8, Msb0; 1, 1, 1, 1],
        );
    }

    #[test]
    fn serde_big_nbits() {
        assert_pack_unpack_as_eq::<BigUint, NBits<100>>(12345_u64.into());
    }

    #[test]
    fn var_nbits_pads() {
        let mut w = bitvec::vec::BitVec::<u8, Msb0>::new();
        w.pack_as_with::<_, VarNBits>(5_u8, 10).unwrap();
        assert_eq!(w, bits![u8, Msb0; 0, 0, 0, 0, 0, 0, 0, 1, 0, 1]);
    }
}
