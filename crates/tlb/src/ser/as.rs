use core::marker::PhantomData;

use crate::{Either, ResultExt, bits::ser::BitWriterExt};

use super::{CellBuilder, CellBuilderError, CellSerialize};

/// Adapter to **ser**ialize `T`.
/// See [`as`](crate::as) module-level documentation for more.
pub trait CellSerializeAs<T: ?Sized> {
    /// Store given value using an adapter
    fn store_as(source: &T, builder: &mut CellBuilder) -> Result<(), CellBuilderError>;
}

/// Borrowed value bound to an adapter, so it can be used wherever
/// [`CellSerialize`] is expected.
pub struct CellSerializeAsWrap<'a, T, As>
where
    T: ?Sized,
    As: ?Sized,
{
    value: &'a T,
    _phantom: PhantomData<As>,
}

impl<T, As> CellSerialize for CellSerializeAsWrap<'_, T, As>
where
    T: ?Sized,
    As: CellSerializeAs<T> + ?Sized,
{
    #[inline]
    fn store(&self, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        As::store_as(self.value, builder)
    }
}

/// Helper to wrap a value into [`CellSerializeAsWrap`]
pub trait CellSerializeWrapAsExt {
    /// Wrap `self` so it would be **ser**ialized with `As` adapter
    #[inline]
    fn wrap_as<As>(&self) -> CellSerializeAsWrap<'_, Self, As>
    where
        As: CellSerializeAs<Self> + ?Sized,
    {
        CellSerializeAsWrap {
            value: self,
            _phantom: PhantomData,
        }
    }
}
impl<T> CellSerializeWrapAsExt for T where T: ?Sized {}

impl<'a, T, As> CellSerializeAs<&'a T> for &'a As
where
    As: CellSerializeAs<T> + ?Sized,
    T: ?Sized,
{
    #[inline]
    fn store_as(source: &&T, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        As::store_as(*source, builder)
    }
}

impl<T, As> CellSerializeAs<[T]> for [As]
where
    As: CellSerializeAs<T>,
{
    #[inline]
    fn store_as(source: &[T], builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        for (i, v) in source.iter().enumerate() {
            builder
                .store_as::<&T, &As>(v)
                .with_context(|| format!("[{i}]"))?;
        }
        Ok(())
    }
}

macro_rules! impl_cell_serialize_as_for_tuple {
    ($($n:tt:$t:ident as $a:ident),+) => {
        impl<$($t, $a),+> CellSerializeAs<($($t,)+)> for ($($a,)+)
        where $(
            $a: CellSerializeAs<$t>,
        )+
        {
            #[inline]
            fn store_as(source: &($($t,)+), builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
                builder$(
                    .store_as::<&$t, &$a>(&source.$n)
                    .context(concat!(".", stringify!($n)))?)+;
                Ok(())
            }
        }
    };
}
impl_cell_serialize_as_for_tuple!(0:T0 as As0);
impl_cell_serialize_as_for_tuple!(0:T0 as As0,1:T1 as As1);
impl_cell_serialize_as_for_tuple!(0:T0 as As0,1:T1 as As1,2:T2 as As2);
impl_cell_serialize_as_for_tuple!(0:T0 as As0,1:T1 as As1,2:T2 as As2,3:T3 as As3);

impl<Left, Right, AsLeft, AsRight> CellSerializeAs<Either<Left, Right>> for Either<AsLeft, AsRight>
where
    AsLeft: CellSerializeAs<Left>,
    AsRight: CellSerializeAs<Right>,
{
    #[inline]
    fn store_as(
        source: &Either<Left, Right>,
        builder: &mut CellBuilder,
    ) -> Result<(), CellBuilderError> {
        match source {
            Either::Left(l) => builder
                .pack(false)
                .context("tag")?
                .store_as::<&Left, &AsLeft>(l)
                .context("left")?,
            Either::Right(r) => builder
                .pack(true)
                .context("tag")?
                .store_as::<&Right, &AsRight>(r)
                .context("right")?,
        };
        Ok(())
    }
}

/// [Maybe](https://docs.ton.org/develop/data-formats/tl-b-types#maybe)
impl<T, As> CellSerializeAs<Option<T>> for Option<As>
where
    As: CellSerializeAs<T>,
{
    #[inline]
    fn store_as(source: &Option<T>, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        match source {
            None => builder.pack(false)?,
            Some(v) => builder.pack(true)?.store_as::<&T, &As>(v)?,
        };
        Ok(())
    }
}
