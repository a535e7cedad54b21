use crate::{
    de::{BitReader, BitUnpack, r#as::BitUnpackAs},
    ser::{BitPack, BitWriter, r#as::BitPackAs},
};

/// Adapter to **de**/**ser**ialize value with its own implementation.
/// Used as a default for wrapping adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Same;

impl<T> BitPackAs<T> for Same
where
    T: BitPack + ?Sized,
{
    #[inline]
    fn pack_as<W>(source: &T, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        source.pack(writer)
    }
}

impl<T> BitUnpackAs<T> for Same
where
    T: BitUnpack,
{
    #[inline]
    fn unpack_as<R>(reader: &mut R) -> Result<T, R::Error>
    where
        R: BitReader + ?Sized,
    {
        T::unpack(reader)
    }
}
