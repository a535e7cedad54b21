use bitvec::{order::Msb0, slice::BitSlice};

use crate::{CodecError, Error};

use super::{BitReader, BitReaderExt};

/// Adapter to **de**serialize `T`.
/// See [`as`](crate::as) module-level documentation for more.
pub trait BitUnpackAs<T> {
    /// Unpacks value using an adapter
    fn unpack_as<R>(reader: &mut R) -> Result<T, R::Error>
    where
        R: BitReader + ?Sized;
}

/// Same as [`BitUnpackAs`], but arguments are calculated in runtime.
pub trait BitUnpackAsWithArgs<T> {
    type Args;

    /// Unpacks value with args using an adapter
    fn unpack_as_with<R>(reader: &mut R, args: Self::Args) -> Result<T, R::Error>
    where
        R: BitReader + ?Sized;
}

/// **De**serialize value from [`BitSlice`] using an adapter
#[inline]
pub fn unpack_as<T, As>(mut bits: &BitSlice<u8, Msb0>) -> Result<T, CodecError>
where
    As: BitUnpackAs<T> + ?Sized,
{
    bits.unpack_as::<_, As>()
}

/// **De**serialize value from [`BitSlice`] using an adapter
/// and ensure that no more data left.
#[inline]
pub fn unpack_fully_as<T, As>(mut bits: &BitSlice<u8, Msb0>) -> Result<T, CodecError>
where
    As: BitUnpackAs<T> + ?Sized,
{
    let v = bits.unpack_as::<T, As>()?;
    if !bits.is_empty() {
        return Err(Error::custom(format!("{} more bits left", bits.len())));
    }
    Ok(v)
}

/// [Maybe](https://docs.ton.org/develop/data-formats/tl-b-types#maybe)
impl<T, As> BitUnpackAs<Option<T>> for Option<As>
where
    As: BitUnpackAs<T>,
{
    #[inline]
    fn unpack_as<R>(reader: &mut R) -> Result<Option<T>, R::Error>
    where
        R: BitReader + ?Sized,
    {
        Ok(match reader.read_bit()? {
            false => None,
            true => Some(reader.unpack_as::<_, As>()?),
        })
    }
}
