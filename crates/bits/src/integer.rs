//! Primitive integers and constant tags
use bitvec::{
    mem::bits_of,
    order::Msb0,
    view::{AsBits, AsMutBits},
};

use crate::{
    Error,
    r#as::{AsBytes, NBits, VarNBits},
    de::{BitReader, BitReaderExt, BitUnpack, r#as::{BitUnpackAs, BitUnpackAsWithArgs}},
    ser::{BitPack, BitWriter, BitWriterExt, r#as::{BitPackAs, BitPackAsWithArgs}},
};

macro_rules! impl_bit_serde_for_integers {
    ($($t:tt)+) => {$(
        impl BitPack for $t {
            #[inline]
            fn pack<W>(&self, writer: &mut W) -> Result<(), W::Error>
            where
                W: BitWriter + ?Sized,
            {
                writer.pack_as::<_, AsBytes>(self.to_be_bytes())?;
                Ok(())
            }
        }

        impl BitUnpack for $t {
            #[inline]
            fn unpack<R>(reader: &mut R) -> Result<Self, R::Error>
            where
                R: BitReader + ?Sized,
            {
                reader.read_bytes_array().map(Self::from_be_bytes)
            }
        }

        /// Keeps only lowest `BITS` bits of two's complement representation
        impl<const BITS: usize> BitPackAs<$t> for NBits<BITS> {
            #[inline]
            fn pack_as<W>(source: &$t, writer: &mut W) -> Result<(), W::Error>
            where
                W: BitWriter + ?Sized,
            {
                if BITS > bits_of::<$t>() {
                    // sign-extend into the extra high bits
                    let negative = $t::MIN != 0 && source.leading_zeros() == 0;
                    writer.repeat_bit(BITS - bits_of::<$t>(), negative)?;
                }
                let bytes = source.to_be_bytes();
                let bits = bytes.as_bits::<Msb0>();
                writer.write_bitslice(&bits[bits.len() - BITS.min(bits.len())..])
            }
        }

        /// Sign-extends signed integers
        impl<const BITS: usize> BitUnpackAs<$t> for NBits<BITS> {
            #[inline]
            fn unpack_as<R>(reader: &mut R) -> Result<$t, R::Error>
            where
                R: BitReader + ?Sized,
            {
                const SIZE: usize = bits_of::<$t>();
                if BITS > SIZE {
                    return Err(Error::custom(format!(
                        "{BITS} bits do not fit into {}",
                        stringify!($t),
                    )));
                }
                if BITS == 0 {
                    return Ok(0);
                }
                let mut arr = [0u8; SIZE / 8];
                reader.read_bits_into(&mut arr.as_mut_bits::<Msb0>()[SIZE - BITS..])?;
                let shift = (SIZE - BITS) as u32;
                Ok(($t::from_be_bytes(arr) << shift) >> shift)
            }
        }
    )+};
}
impl_bit_serde_for_integers! {
    u8 u16 u32 u64 u128 usize
    i8 i16 i32 i64 i128 isize
}

macro_rules! const_uint {
    ($($vis:vis $name:ident<$typ:tt, $bits:literal>)+) => {$(
        /// Constant tag that fails to **de**serialize on mismatch
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        $vis struct $name<const VALUE: $typ, const BITS: usize = $bits>;

        impl<const VALUE: $typ, const BITS: usize> BitPack for $name<VALUE, BITS> {
            #[inline]
            fn pack<W>(&self, writer: &mut W) -> Result<(), W::Error>
            where
                W: BitWriter + ?Sized,
            {
                writer.pack_as::<_, NBits<BITS>>(VALUE)?;
                Ok(())
            }
        }

        impl<const VALUE: $typ, const BITS: usize> BitUnpack for $name<VALUE, BITS> {
            #[inline]
            fn unpack<R>(reader: &mut R) -> Result<Self, R::Error>
            where
                R: BitReader + ?Sized,
            {
                let v = reader.unpack_as::<$typ, NBits<BITS>>()?;
                if v != VALUE {
                    return Err(Error::custom(format!(
                        "expected {VALUE:#x}, got: {v:#x}"
                    )));
                }
                Ok(Self)
            }
        }
    )+};
}

const_uint! {
    pub ConstU8  <u8,   8>
    pub ConstU32 <u32,  32>
}

/// Packs `value` as `bits`-wide unsigned integer, truncating wider values
#[inline]
pub fn pack_uint<W>(writer: &mut W, value: u64, bits: usize) -> Result<(), W::Error>
where
    W: BitWriter + ?Sized,
{
    <VarNBits as BitPackAsWithArgs<u64>>::pack_as_with(&value, writer, bits)
}

/// Reads `bits`-wide unsigned integer
#[inline]
pub fn unpack_uint<R>(reader: &mut R, bits: usize) -> Result<u64, R::Error>
where
    R: BitReader + ?Sized,
{
    <VarNBits as BitUnpackAsWithArgs<u64>>::unpack_as_with(reader, bits)
}

#[cfg(test)]
mod tests {
    use bitvec::{bits, order::Msb0};
    use rstest::rstest;

    use crate::{
        de::unpack_fully,
        ser::{pack, r#as::pack_as},
        tests::{assert_pack_unpack_as_eq, assert_pack_unpack_eq},
    };

    use super::*;

    #[test]
    fn store_uint() {
        assert_eq!(
            pack(0xFD_FE_u16).unwrap(),
            bits![u8, Msb0; 1, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 0],
        )
    }

    #[test]
    fn serde_uint() {
        assert_pack_unpack_eq(12345_u32);
    }

    #[test]
    fn store_nbits_uint() {
        assert_eq!(
            pack_as::<_, NBits<7>>(0x7E_u8).unwrap(),
            bits![u8, Msb0; 1, 1, 1, 1, 1, 1, 0],
        )
    }

    #[test]
    fn nbits_truncates() {
        assert_eq!(
            pack_as::<_, NBits<4>>(0x1F_u32).unwrap(),
            bits![u8, Msb0; 1, 1, 1, 1],
        )
    }

    #[rstest]
    #[case(-1)]
    #[case(0)]
    #[case(-128)]
    #[case(127)]
    fn serde_signed_workchain(#[case] v: i32) {
        assert_pack_unpack_as_eq::<i32, NBits<8>>(v);
    }

    #[test]
    fn const_tag_mismatch() {
        let bits = pack(0xf718510f_u32).unwrap();
        assert!(unpack_fully::<ConstU32<0xf718510f>>(&bits).is_ok());
        assert!(unpack_fully::<ConstU32<0xf1381e5b>>(&bits).is_err());
    }
}
