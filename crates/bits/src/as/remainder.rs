use bitvec::{order::Msb0, vec::BitVec};

use crate::{
    Error,
    de::{BitReader, BitReaderExt, r#as::BitUnpackAs},
};

/// Reads everything left in the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Remainder;

impl BitUnpackAs<BitVec<u8, Msb0>> for Remainder {
    #[inline]
    fn unpack_as<R>(reader: &mut R) -> Result<BitVec<u8, Msb0>, R::Error>
    where
        R: BitReader + ?Sized,
    {
        let n = reader.bits_left();
        reader.read_bitvec(n)
    }
}

impl BitUnpackAs<Vec<u8>> for Remainder {
    #[inline]
    fn unpack_as<R>(reader: &mut R) -> Result<Vec<u8>, R::Error>
    where
        R: BitReader + ?Sized,
    {
        let n = reader.bits_left();
        if n % 8 != 0 {
            return Err(Error::custom(format!("{n} bits left is not whole bytes")));
        }
        reader.read_bytes_vec(n / 8)
    }
}

impl BitUnpackAs<String> for Remainder {
    #[inline]
    fn unpack_as<R>(reader: &mut R) -> Result<String, R::Error>
    where
        R: BitReader + ?Sized,
    {
        let bytes: Vec<u8> = reader.unpack_as::<_, Self>()?;
        String::from_utf8(bytes).map_err(Error::custom)
    }
}
