use core::marker::PhantomData;

use crate::{
    Cell, Either, ResultExt,
    bits::{r#as::Same, ser::BitWriter},
    de::{CellParser, CellParserError, r#as::CellDeserializeAs},
    ser::{CellBuilder, CellBuilderError, r#as::CellSerializeAs},
};

/// Adapter to **de**/**ser**ialize value from/into reference to the child cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ref<As: ?Sized = Same>(PhantomData<As>);

impl<T, As> CellSerializeAs<T> for Ref<As>
where
    As: CellSerializeAs<T> + ?Sized,
    T: ?Sized,
{
    #[inline]
    fn store_as(source: &T, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        builder.store_reference_as::<&T, &As>(source).context("^")?;
        Ok(())
    }
}

impl<'de, T, As> CellDeserializeAs<'de, T> for Ref<As>
where
    As: CellDeserializeAs<'de, T> + ?Sized,
{
    #[inline]
    fn parse_as(parser: &mut CellParser<'de>) -> Result<T, CellParserError> {
        parser.parse_reference_as::<T, As>().context("^")
    }
}

/// ```tlb
/// {X:Type} Either X ^X = EitherInlineOrRef X
/// ```
///
/// The value is stored inline only when the builder still has room for
/// its bits plus at least one more bit and enough free references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EitherInlineOrRef<As: ?Sized = Same>(PhantomData<As>);

impl<T, As> CellSerializeAs<T> for EitherInlineOrRef<As>
where
    As: CellSerializeAs<T> + ?Sized,
    T: ?Sized,
{
    #[inline]
    fn store_as(source: &T, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        let mut b = Cell::builder();
        As::store_as(source, &mut b)?;
        let cell = b.into_cell();
        // one bit is taken by the tag itself
        let fits = cell.data.len() < builder.capacity_left()
            && cell.references.len() <= builder.references_left();
        builder.store_as::<_, Either<Same, Ref>>(if fits {
            Either::Left(cell)
        } else {
            Either::Right(cell)
        })?;
        Ok(())
    }
}

impl<'de, T, As> CellDeserializeAs<'de, T> for EitherInlineOrRef<As>
where
    As: CellDeserializeAs<'de, T>,
{
    #[inline]
    fn parse_as(parser: &mut CellParser<'de>) -> Result<T, CellParserError> {
        parser
            .parse_as::<Either<T, T>, Either<As, Ref<As>>>()
            .map(Either::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::{
        bits::ser::BitWriterExt,
        ser::{CellSerializeExt, CellSerializeWrapAsExt},
    };

    use super::*;

    fn body(bits: usize) -> Cell {
        let mut b = Cell::builder();
        b.repeat_bit(bits, true).unwrap();
        b.into_cell()
    }

    #[test]
    fn small_body_inline() {
        let cell = body(8).wrap_as::<EitherInlineOrRef>().to_cell().unwrap();
        assert_eq!(cell.data.len(), 9);
        assert!(!cell.data[0]);
        assert!(cell.references.is_empty());

        let parsed: Cell = cell.parse_fully_as::<_, EitherInlineOrRef>().unwrap();
        assert_eq!(parsed, body(8));
    }

    #[rstest]
    #[case(22, false)]
    #[case(23, true)]
    fn inline_boundary(#[case] bits: usize, #[case] in_ref: bool) {
        let mut builder = Cell::builder();
        builder
            .with_repeat_bit(1000, false)
            .unwrap()
            .store_as::<_, EitherInlineOrRef>(body(bits))
            .unwrap();
        let cell = builder.into_cell();
        assert_eq!(cell.data[1000], in_ref);
        assert_eq!(cell.references.len(), usize::from(in_ref));
        if in_ref {
            assert_eq!(*cell.references[0], body(bits));
        }
    }
}
