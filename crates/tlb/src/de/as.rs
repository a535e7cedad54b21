use std::{rc::Rc, sync::Arc};

use crate::{Either, ResultExt, bits::de::BitReaderExt};

use super::{CellParser, CellParserError};

/// Adapter to **de**serialize `T`.
/// See [`as`](crate::as) module-level documentation for more.
pub trait CellDeserializeAs<'de, T> {
    /// Parse value using an adapter
    fn parse_as(parser: &mut CellParser<'de>) -> Result<T, CellParserError>;
}

/// Owned version of [`CellDeserializeAs`]
pub trait CellDeserializeAsOwned<T>: for<'de> CellDeserializeAs<'de, T> {}
impl<T, As> CellDeserializeAsOwned<T> for As where As: for<'de> CellDeserializeAs<'de, T> + ?Sized {}

macro_rules! impl_cell_deserialize_as_for_tuple {
    ($($n:tt:$t:ident as $a:ident),+) => {
        impl<'de, $($t, $a),+> CellDeserializeAs<'de, ($($t,)+)> for ($($a,)+)
        where $(
            $a: CellDeserializeAs<'de, $t>,
        )+
        {
            #[inline]
            fn parse_as(parser: &mut CellParser<'de>) -> Result<($($t,)+), CellParserError> {
                Ok(($(
                    parser.parse_as::<$t, $a>()
                        .context(concat!(".", stringify!($n)))?,
                )+))
            }
        }
    };
}
impl_cell_deserialize_as_for_tuple!(0:T0 as As0);
impl_cell_deserialize_as_for_tuple!(0:T0 as As0,1:T1 as As1);
impl_cell_deserialize_as_for_tuple!(0:T0 as As0,1:T1 as As1,2:T2 as As2);
impl_cell_deserialize_as_for_tuple!(0:T0 as As0,1:T1 as As1,2:T2 as As2,3:T3 as As3);

impl<'de, T, As> CellDeserializeAs<'de, Box<T>> for Box<As>
where
    As: CellDeserializeAs<'de, T> + ?Sized,
{
    #[inline]
    fn parse_as(parser: &mut CellParser<'de>) -> Result<Box<T>, CellParserError> {
        parser.parse_as::<T, As>().map(Box::new)
    }
}

impl<'de, T, As> CellDeserializeAs<'de, Rc<T>> for Rc<As>
where
    As: CellDeserializeAs<'de, T> + ?Sized,
{
    #[inline]
    fn parse_as(parser: &mut CellParser<'de>) -> Result<Rc<T>, CellParserError> {
        parser.parse_as::<T, As>().map(Rc::new)
    }
}

impl<'de, T, As> CellDeserializeAs<'de, Arc<T>> for Arc<As>
where
    As: CellDeserializeAs<'de, T> + ?Sized,
{
    #[inline]
    fn parse_as(parser: &mut CellParser<'de>) -> Result<Arc<T>, CellParserError> {
        parser.parse_as::<T, As>().map(Arc::new)
    }
}

impl<'de, Left, Right, AsLeft, AsRight> CellDeserializeAs<'de, Either<Left, Right>>
    for Either<AsLeft, AsRight>
where
    AsLeft: CellDeserializeAs<'de, Left>,
    AsRight: CellDeserializeAs<'de, Right>,
{
    #[inline]
    fn parse_as(parser: &mut CellParser<'de>) -> Result<Either<Left, Right>, CellParserError> {
        Ok(match parser.unpack().context("tag")? {
            false => Either::Left(parser.parse_as::<Left, AsLeft>().context("left")?),
            true => Either::Right(parser.parse_as::<Right, AsRight>().context("right")?),
        })
    }
}

/// [Maybe](https://docs.ton.org/develop/data-formats/tl-b-types#maybe)
impl<'de, T, As> CellDeserializeAs<'de, Option<T>> for Option<As>
where
    As: CellDeserializeAs<'de, T>,
{
    #[inline]
    fn parse_as(parser: &mut CellParser<'de>) -> Result<Option<T>, CellParserError> {
        Ok(match parser.unpack()? {
            false => None,
            true => Some(parser.parse_as::<T, As>()?),
        })
    }
}
