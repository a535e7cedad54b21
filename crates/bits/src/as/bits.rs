use bitvec::{order::Msb0, view::AsBits};

use crate::{
    Error, ResultExt,
    de::{BitReader, BitReaderExt, r#as::BitUnpackAs},
    ser::{BitPack, BitWriter, BitWriterExt, r#as::BitPackAs},
};

/// **Ser**ialize value by taking a reference to `[u8]` on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AsBytes;

impl<T> BitPackAs<T> for AsBytes
where
    T: AsRef<[u8]> + ?Sized,
{
    #[inline]
    fn pack_as<W>(source: &T, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        source.as_ref().as_bits::<Msb0>().pack(writer)
    }
}

/// **De**/**ser**ialize value from/into exactly `N` bits.
///
/// Values wider than `N` bits are truncated to their lowest `N` bits
/// on **ser**ialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NBits<const BITS: usize>;

/// **De**/**ser**ialize bytes by prefixing its length with `N`-bit integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarBytes<const BITS_FOR_BYTES_LEN: usize>;

impl<const BITS_FOR_BYTES_LEN: usize, T> BitPackAs<T> for VarBytes<BITS_FOR_BYTES_LEN>
where
    T: AsRef<[u8]> + ?Sized,
{
    #[inline]
    fn pack_as<W>(source: &T, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        let source = source.as_ref();
        if BITS_FOR_BYTES_LEN < usize::BITS as usize && source.len() >> BITS_FOR_BYTES_LEN != 0 {
            return Err(Error::custom(format!(
                "{} bytes do not fit into {BITS_FOR_BYTES_LEN}-bit length",
                source.len()
            )));
        }
        writer
            .pack_as::<_, NBits<BITS_FOR_BYTES_LEN>>(source.len())
            .context("len")?
            .pack_as::<_, AsBytes>(source)?;
        Ok(())
    }
}

impl<const BITS_FOR_BYTES_LEN: usize> BitUnpackAs<Vec<u8>> for VarBytes<BITS_FOR_BYTES_LEN> {
    #[inline]
    fn unpack_as<R>(reader: &mut R) -> Result<Vec<u8>, R::Error>
    where
        R: BitReader + ?Sized,
    {
        let num_bytes: usize = reader
            .unpack_as::<_, NBits<BITS_FOR_BYTES_LEN>>()
            .context("len")?;
        reader.read_bytes_vec(num_bytes)
    }
}
