//! Binary **de**serialization for [TL-B](https://docs.ton.org/develop/data-formats/tl-b-language)
pub mod r#as;
mod reader;

pub use self::reader::*;

use std::{rc::Rc, sync::Arc};

use bitvec::{order::Msb0, slice::BitSlice, view::AsBits};
use either::Either;

use crate::{CodecError, Error, ResultExt};

/// A type that can be bitwise-**de**serialized from any [`BitReader`].
pub trait BitUnpack: Sized {
    /// Unpacks the value from given reader
    fn unpack<R>(reader: &mut R) -> Result<Self, R::Error>
    where
        R: BitReader + ?Sized;
}

/// **De**serialize the value from [`BitSlice`]
#[inline]
pub fn unpack<T>(mut bits: &BitSlice<u8, Msb0>) -> Result<T, CodecError>
where
    T: BitUnpack,
{
    bits.unpack()
}

/// **De**serialize the value from bytes slice
#[inline]
pub fn unpack_bytes<T>(bytes: impl AsRef<[u8]>) -> Result<T, CodecError>
where
    T: BitUnpack,
{
    unpack(bytes.as_ref().as_bits())
}

/// **De**serialize the value from [`BitSlice`] and ensure that no more
/// data left.
#[inline]
pub fn unpack_fully<T>(mut bits: &BitSlice<u8, Msb0>) -> Result<T, CodecError>
where
    T: BitUnpack,
{
    let v = bits.unpack()?;
    if !bits.is_empty() {
        return Err(Error::custom(format!("{} more bits left", bits.len())));
    }
    Ok(v)
}

impl BitUnpack for () {
    #[inline]
    fn unpack<R>(_reader: &mut R) -> Result<Self, R::Error>
    where
        R: BitReader + ?Sized,
    {
        Ok(())
    }
}

impl BitUnpack for bool {
    #[inline]
    fn unpack<R>(reader: &mut R) -> Result<Self, R::Error>
    where
        R: BitReader + ?Sized,
    {
        reader.read_bit()
    }
}

impl<const N: usize> BitUnpack for [u8; N] {
    #[inline]
    fn unpack<R>(reader: &mut R) -> Result<Self, R::Error>
    where
        R: BitReader + ?Sized,
    {
        reader.read_bytes_array()
    }
}

macro_rules! impl_bit_unpack_for_tuple {
    ($($n:tt:$t:ident),+) => {
        impl<$($t),+> BitUnpack for ($($t,)+)
        where $(
            $t: BitUnpack,
        )+
        {
            #[inline]
            fn unpack<R>(reader: &mut R) -> Result<Self, R::Error>
            where
                R: BitReader + ?Sized,
            {
                Ok(($(
                    $t::unpack(reader).context(concat!(".", stringify!($n)))?,
                )+))
            }
        }
    };
}
impl_bit_unpack_for_tuple!(0:T0);
impl_bit_unpack_for_tuple!(0:T0,1:T1);
impl_bit_unpack_for_tuple!(0:T0,1:T1,2:T2);
impl_bit_unpack_for_tuple!(0:T0,1:T1,2:T2,3:T3);

impl<T> BitUnpack for Box<T>
where
    T: BitUnpack,
{
    #[inline]
    fn unpack<R>(reader: &mut R) -> Result<Self, R::Error>
    where
        R: BitReader + ?Sized,
    {
        T::unpack(reader).map(Box::new)
    }
}

impl<T> BitUnpack for Rc<T>
where
    T: BitUnpack,
{
    #[inline]
    fn unpack<R>(reader: &mut R) -> Result<Self, R::Error>
    where
        R: BitReader + ?Sized,
    {
        T::unpack(reader).map(Rc::new)
    }
}

impl<T> BitUnpack for Arc<T>
where
    T: BitUnpack,
{
    #[inline]
    fn unpack<R>(reader: &mut R) -> Result<Self, R::Error>
    where
        R: BitReader + ?Sized,
    {
        T::unpack(reader).map(Arc::new)
    }
}

impl<Left, Right> BitUnpack for Either<Left, Right>
where
    Left: BitUnpack,
    Right: BitUnpack,
{
    #[inline]
    fn unpack<R>(reader: &mut R) -> Result<Self, R::Error>
    where
        R: BitReader + ?Sized,
    {
        match reader.unpack().context("tag")? {
            false => reader.unpack().map(Either::Left).context("left"),
            true => reader.unpack().map(Either::Right).context("right"),
        }
    }
}

/// [Maybe](https://docs.ton.org/develop/data-formats/tl-b-types#maybe)
impl<T> BitUnpack for Option<T>
where
    T: BitUnpack,
{
    #[inline]
    fn unpack<R>(reader: &mut R) -> Result<Self, R::Error>
    where
        R: BitReader + ?Sized,
    {
        Ok(match reader.read_bit()? {
            false => None,
            true => Some(reader.unpack()?),
        })
    }
}
