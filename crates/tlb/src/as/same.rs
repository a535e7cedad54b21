use crate::{
    bits::r#as::Same,
    de::{CellDeserialize, CellParser, CellParserError, r#as::CellDeserializeAs},
    ser::{CellBuilder, CellBuilderError, CellSerialize, r#as::CellSerializeAs},
};

impl<T> CellSerializeAs<T> for Same
where
    T: CellSerialize + ?Sized,
{
    #[inline]
    fn store_as(source: &T, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        source.store(builder)
    }
}

impl<'de, T> CellDeserializeAs<'de, T> for Same
where
    T: CellDeserialize<'de>,
{
    #[inline]
    fn parse_as(parser: &mut CellParser<'de>) -> Result<T, CellParserError> {
        T::parse(parser)
    }
}
