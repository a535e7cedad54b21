//! Binary **ser**ialization for [TL-B](https://docs.ton.org/develop/data-formats/tl-b-language)
pub mod r#as;
mod writer;

pub use self::writer::*;

use std::{rc::Rc, sync::Arc};

use bitvec::{order::Msb0, slice::BitSlice, vec::BitVec, view::AsBits};
use either::Either;
use impl_tools::autoimpl;

use crate::{CodecError, ResultExt};

/// A type that can be bitwise-**ser**ilalized into any [`BitWriter`].
#[autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>, Rc<T>, Arc<T>)]
pub trait BitPack {
    /// Packs the value into given writer
    fn pack<W>(&self, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized;
}

/// **Ser**ialize given value into [`BitVec`]
#[inline]
pub fn pack<T>(value: T) -> Result<BitVec<u8, Msb0>, CodecError>
where
    T: BitPack,
{
    let mut writer = BitVec::new();
    BitWriterExt::pack(&mut writer, value)?;
    Ok(writer)
}

/// Returns number of bits the value would occupy once packed
#[inline]
pub fn bits_for<T>(value: T) -> Result<usize, CodecError>
where
    T: BitPack,
{
    let mut writer = NoopBitWriter.counted();
    writer.pack(value)?;
    Ok(writer.bit_count())
}

impl BitPack for () {
    #[inline]
    fn pack<W>(&self, _writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        Ok(())
    }
}

impl BitPack for bool {
    #[inline]
    fn pack<W>(&self, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        writer.write_bit(*self)
    }
}

impl<T, const N: usize> BitPack for [T; N]
where
    T: BitPack,
{
    #[inline]
    fn pack<W>(&self, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        writer.pack_many(self)?;
        Ok(())
    }
}

impl BitPack for BitSlice<u8, Msb0> {
    #[inline]
    fn pack<W>(&self, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        writer.write_bitslice(self)
    }
}

impl BitPack for BitVec<u8, Msb0> {
    #[inline]
    fn pack<W>(&self, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        self.as_bitslice().pack(writer)
    }
}

/// Raw bytes without length prefix
impl BitPack for [u8] {
    #[inline]
    fn pack<W>(&self, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        writer.write_bitslice(self.as_bits())
    }
}

/// UTF-8 bytes without length prefix
impl BitPack for str {
    #[inline]
    fn pack<W>(&self, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        self.as_bytes().pack(writer)
    }
}

macro_rules! impl_bit_pack_for_tuple {
    ($($n:tt:$t:ident),+) => {
        impl<$($t),+> BitPack for ($($t,)+)
        where $(
            $t: BitPack,
        )+
        {
            #[inline]
            fn pack<W>(&self, writer: &mut W) -> Result<(), W::Error>
            where
                W: BitWriter + ?Sized,
            {
                $(self.$n.pack(writer).context(concat!(".", stringify!($n)))?;)+
                Ok(())
            }
        }
    };
}
impl_bit_pack_for_tuple!(0:T0);
impl_bit_pack_for_tuple!(0:T0,1:T1);
impl_bit_pack_for_tuple!(0:T0,1:T1,2:T2);
impl_bit_pack_for_tuple!(0:T0,1:T1,2:T2,3:T3);

/// Implementation of [`Either X Y`](https://docs.ton.org/develop/data-formats/tl-b-types#either):
/// ```tlb
/// left$0 {X:Type} {Y:Type} value:X = Either X Y;
/// right$1 {X:Type} {Y:Type} value:Y = Either X Y;
/// ```
impl<L, R> BitPack for Either<L, R>
where
    L: BitPack,
    R: BitPack,
{
    #[inline]
    fn pack<W>(&self, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        match self {
            Self::Left(l) => writer
                .pack(false)
                .context("tag")?
                .pack(l)
                .context("left")?,
            Self::Right(r) => writer
                .pack(true)
                .context("tag")?
                .pack(r)
                .context("right")?,
        };
        Ok(())
    }
}

/// Implementation of [`Maybe X`](https://docs.ton.org/develop/data-formats/tl-b-types#maybe):
/// ```tlb
/// nothing$0 {X:Type} = Maybe X;
/// just$1 {X:Type} value:X = Maybe X;
/// ```
impl<T> BitPack for Option<T>
where
    T: BitPack,
{
    #[inline]
    fn pack<W>(&self, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        match self {
            None => writer.pack(false)?,
            Some(v) => writer.pack(true)?.pack(v)?,
        };
        Ok(())
    }
}
