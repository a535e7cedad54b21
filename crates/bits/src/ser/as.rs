use bitvec::{order::Msb0, vec::BitVec};

use crate::CodecError;

use super::{BitWriter, BitWriterExt};

/// Adapter to **ser**ialize `T`.
///
/// This approach is heavily inspired by
/// [serde_with](https://docs.rs/serde_with/latest/serde_with).
/// Please, read their docs for more usage examples.
pub trait BitPackAs<T: ?Sized> {
    /// Packs the value using an adapter
    fn pack_as<W>(source: &T, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized;
}

/// Same as [`BitPackAs`], but arguments are calculated in runtime.
pub trait BitPackAsWithArgs<T: ?Sized> {
    type Args;

    /// Packs the value with args using an adapter
    fn pack_as_with<W>(source: &T, writer: &mut W, args: Self::Args) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized;
}

/// **Ser**ialize given value into [`BitVec`] using an adapter
#[inline]
pub fn pack_as<T, As>(value: T) -> Result<BitVec<u8, Msb0>, CodecError>
where
    As: BitPackAs<T> + ?Sized,
{
    let mut writer = BitVec::new();
    writer.pack_as::<_, As>(value)?;
    Ok(writer)
}

impl<'a, T, As> BitPackAs<&'a T> for &'a As
where
    As: BitPackAs<T> + ?Sized,
    T: ?Sized,
{
    #[inline]
    fn pack_as<W>(source: &&'a T, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        As::pack_as(*source, writer)
    }
}

/// [Maybe](https://docs.ton.org/develop/data-formats/tl-b-types#maybe)
impl<T, As> BitPackAs<Option<T>> for Option<As>
where
    As: BitPackAs<T>,
{
    #[inline]
    fn pack_as<W>(source: &Option<T>, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        match source {
            None => {
                // nothing$0
                writer.pack(false)?;
            }
            Some(v) => {
                // just$1
                writer.pack(true)?.pack_as::<&T, &As>(v)?;
            }
        }
        Ok(())
    }
}
