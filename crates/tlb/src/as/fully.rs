use core::marker::PhantomData;

use crate::{
    bits::r#as::Same,
    de::{CellParser, CellParserError, r#as::CellDeserializeAs},
};

/// Adapter to **de**serialize value and ensure that no more data and references
/// left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParseFully<As: ?Sized = Same>(PhantomData<As>);

impl<'de, T, As> CellDeserializeAs<'de, T> for ParseFully<As>
where
    As: CellDeserializeAs<'de, T> + ?Sized,
{
    #[inline]
    fn parse_as(parser: &mut CellParser<'de>) -> Result<T, CellParserError> {
        let v = parser.parse_as::<_, As>()?;
        parser.ensure_empty()?;
        Ok(v)
    }
}
