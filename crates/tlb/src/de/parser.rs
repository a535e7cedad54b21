use core::mem;
use std::sync::Arc;

use crate::{
    Cell, CodecError, Error, ResultExt,
    bits::{
        bitvec::{order::Msb0, slice::BitSlice},
        de::BitReader,
    },
};

use super::{CellDeserialize, r#as::CellDeserializeAs};

/// [`Error`] for [`CellParser`]
pub type CellParserError = CodecError;

/// Cell parser created with [`Cell::parser()`].
///
/// Cloning the parser gives a lookahead cursor that does not affect the
/// original one.
#[derive(Debug, Clone)]
pub struct CellParser<'de> {
    pub(super) data: &'de BitSlice<u8, Msb0>,
    pub(super) references: &'de [Arc<Cell>],
}

impl<'de> CellParser<'de> {
    #[inline]
    pub(crate) const fn new(data: &'de BitSlice<u8, Msb0>, references: &'de [Arc<Cell>]) -> Self {
        Self { data, references }
    }

    /// Parse the value using its [`CellDeserialize`] implementation.
    #[inline]
    pub fn parse<T>(&mut self) -> Result<T, CellParserError>
    where
        T: CellDeserialize<'de>,
    {
        T::parse(self)
    }

    /// Parse value using an adapter.
    ///
    /// This approach is heavily inspired by
    /// [serde_with](https://docs.rs/serde_with/latest/serde_with).
    /// Please, read their docs for more usage examples.
    #[inline]
    pub fn parse_as<T, As>(&mut self) -> Result<T, CellParserError>
    where
        As: CellDeserializeAs<'de, T> + ?Sized,
    {
        As::parse_as(self)
    }

    /// Take next reference
    #[inline]
    pub fn pop_reference(&mut self) -> Result<&'de Arc<Cell>, CellParserError> {
        let (first, rest) = self
            .references
            .split_first()
            .ok_or(CodecError::MissingRef)?;
        self.references = rest;
        Ok(first)
    }

    /// Parse next reference fully using an adapter
    #[inline]
    pub fn parse_reference_as<T, As>(&mut self) -> Result<T, CellParserError>
    where
        As: CellDeserializeAs<'de, T> + ?Sized,
    {
        self.pop_reference()?.parse_fully_as::<T, As>()
    }

    #[inline]
    pub fn bits_left(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn no_bits_left(&self) -> bool {
        self.bits_left() == 0
    }

    #[inline]
    pub const fn references_left(&self) -> usize {
        self.references.len()
    }

    #[inline]
    pub const fn no_references_left(&self) -> bool {
        self.references_left() == 0
    }

    /// Returns whether this parser has no more data and references.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.no_bits_left() && self.no_references_left()
    }

    /// Returns an error if this parser has more data or references.
    #[inline]
    pub fn ensure_empty(&self) -> Result<(), CellParserError> {
        if !self.is_empty() {
            return Err(Error::custom(format!(
                "more data left: {} bits, {} references",
                self.data.len(),
                self.references.len(),
            )));
        }
        Ok(())
    }

    /// Consume everything left into a fresh [`Cell`]
    #[inline]
    pub fn remainder(&mut self) -> Cell {
        Cell {
            data: mem::take(&mut self.data).to_bitvec(),
            references: mem::take(&mut self.references).to_vec(),
        }
    }
}

impl BitReader for CellParser<'_> {
    type Error = CellParserError;

    #[inline]
    fn bits_left(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn read_bit(&mut self) -> Result<bool, Self::Error> {
        self.data.read_bit()
    }

    #[inline]
    fn read_bits_into(&mut self, dst: &mut BitSlice<u8, Msb0>) -> Result<(), Self::Error> {
        self.data.read_bits_into(dst)
    }

    #[inline]
    fn skip(&mut self, n: usize) -> Result<(), Self::Error> {
        self.data.skip(n).context("skip")
    }
}

impl<'de> CellDeserialize<'de> for CellParser<'de> {
    #[inline]
    fn parse(parser: &mut CellParser<'de>) -> Result<Self, CellParserError> {
        Ok(Self {
            data: mem::take(&mut parser.data),
            references: mem::take(&mut parser.references),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::bits::{de::BitReaderExt, ser::BitWriterExt};

    use super::*;

    #[test]
    fn lookahead_and_remainder() {
        let mut builder = Cell::builder();
        builder
            .pack(0xABCD_u16)
            .unwrap()
            .store_reference(Cell::new())
            .unwrap();
        let cell = builder.into_cell();

        let mut parser = cell.parser();
        let mut lookahead = parser.clone();
        assert_eq!(lookahead.unpack::<u8>().unwrap(), 0xAB);
        assert_eq!(parser.bits_left(), 16);

        parser.skip(8).unwrap();
        let rest = parser.remainder();
        assert_eq!(rest.data.len(), 8);
        assert_eq!(rest.references.len(), 1);
        assert!(parser.is_empty());
    }

    #[test]
    fn missing_reference() {
        let cell = Cell::new();
        assert_eq!(
            cell.parser().pop_reference().unwrap_err(),
            CodecError::MissingRef
        );
    }

    #[test]
    fn underflow() {
        let cell = Cell::new();
        let err = cell.parser().unpack::<u8>().unwrap_err();
        assert_eq!(
            err,
            CodecError::Underflow {
                requested: 8,
                left: 0
            }
        );
    }
}
