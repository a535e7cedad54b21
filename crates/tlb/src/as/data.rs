use core::marker::PhantomData;

use crate::{
    bits::{
        de::r#as::BitUnpackAs,
        r#as::Same,
        ser::r#as::BitPackAs,
    },
    de::{CellParser, CellParserError, r#as::CellDeserializeAs},
    ser::{CellBuilder, CellBuilderError, r#as::CellSerializeAs},
};

/// Adapter to **de**/**ser**ialize value as plain bits of the current cell
/// by using its bit-level `As` adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Data<As: ?Sized = Same>(PhantomData<As>);

impl<T, As> CellSerializeAs<T> for Data<As>
where
    As: BitPackAs<T> + ?Sized,
    T: ?Sized,
{
    #[inline]
    fn store_as(source: &T, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        As::pack_as(source, builder)
    }
}

impl<'de, T, As> CellDeserializeAs<'de, T> for Data<As>
where
    As: BitUnpackAs<T> + ?Sized,
{
    #[inline]
    fn parse_as(parser: &mut CellParser<'de>) -> Result<T, CellParserError> {
        As::unpack_as(parser)
    }
}
