use std::sync::Arc;

use crate::{
    Cell, CodecError, ResultExt,
    bits::{
        adapters::LimitWriter,
        bitvec::{order::Msb0, slice::BitSlice, vec::BitVec},
        ser::BitWriter,
    },
};

use super::{CellSerialize, r#as::CellSerializeAs};

type CellBitWriter = LimitWriter<BitVec<u8, Msb0>>;

/// [`Error`](crate::Error) for [`CellBuilder`]
pub type CellBuilderError = CodecError;

/// Maximum number of data bits in a single cell
pub const MAX_BITS_LEN: usize = 1023;
/// Maximum number of references in a single cell
pub const MAX_REFS_COUNT: usize = 4;

/// Cell builder created with [`Cell::builder()`].
///
/// [`CellBuilder`] can then be converted to constructed [`Cell`] by using
/// [`.into_cell()`](CellBuilder::into_cell).
#[derive(Debug, Clone)]
pub struct CellBuilder {
    data: CellBitWriter,
    references: Vec<Arc<Cell>>,
}

impl CellBuilder {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            data: LimitWriter::new(BitVec::EMPTY, MAX_BITS_LEN),
            references: Vec::new(),
        }
    }

    /// Store the value using its [`CellSerialize`] implementation
    #[inline]
    pub fn store<T>(&mut self, value: T) -> Result<&mut Self, CellBuilderError>
    where
        T: CellSerialize,
    {
        value.store(self)?;
        Ok(self)
    }

    /// Store all values from given iterator using [`CellSerialize`]
    /// implementation of its item type.
    #[inline]
    pub fn store_many<T>(
        &mut self,
        values: impl IntoIterator<Item = T>,
    ) -> Result<&mut Self, CellBuilderError>
    where
        T: CellSerialize,
    {
        for (i, v) in values.into_iter().enumerate() {
            self.store(v).with_context(|| format!("[{i}]"))?;
        }
        Ok(self)
    }

    /// Store given value using an adapter.
    ///
    /// This approach is heavily inspired by
    /// [serde_with](https://docs.rs/serde_with/latest/serde_with).
    /// Please, read their docs for more usage examples.
    #[inline]
    pub fn store_as<T, As>(&mut self, value: T) -> Result<&mut Self, CellBuilderError>
    where
        As: CellSerializeAs<T> + ?Sized,
    {
        As::store_as(&value, self)?;
        Ok(self)
    }

    /// Store all values from iterator using an adapter.
    #[inline]
    pub fn store_many_as<T, As>(
        &mut self,
        values: impl IntoIterator<Item = T>,
    ) -> Result<&mut Self, CellBuilderError>
    where
        As: CellSerializeAs<T> + ?Sized,
    {
        for (i, v) in values.into_iter().enumerate() {
            self.store_as::<T, As>(v)
                .with_context(|| format!("[{i}]"))?;
        }
        Ok(self)
    }

    #[inline]
    fn ensure_reference(&self) -> Result<(), CellBuilderError> {
        if self.references.len() == MAX_REFS_COUNT {
            return Err(CodecError::TooManyRefs);
        }
        Ok(())
    }

    /// Append already built cell as a reference
    #[inline]
    pub fn store_reference(
        &mut self,
        cell: impl Into<Arc<Cell>>,
    ) -> Result<&mut Self, CellBuilderError> {
        self.ensure_reference()?;
        self.references.push(cell.into());
        Ok(self)
    }

    /// Store given value into a new child cell using an adapter and
    /// append it as a reference
    #[inline]
    pub fn store_reference_as<T, As>(&mut self, value: T) -> Result<&mut Self, CellBuilderError>
    where
        As: CellSerializeAs<T> + ?Sized,
    {
        self.ensure_reference()?;
        let mut builder = Self::new();
        builder.store_as::<T, As>(value)?;
        self.references.push(builder.into_cell().into());
        Ok(self)
    }

    /// Returns number of references that can still be stored
    #[inline]
    pub fn references_left(&self) -> usize {
        MAX_REFS_COUNT - self.references.len()
    }

    /// Returns number of bits already stored
    #[inline]
    pub fn bits_len(&self) -> usize {
        self.data.bit_count()
    }

    /// Convert builder to [`Cell`]
    #[inline]
    #[must_use]
    pub fn into_cell(self) -> Cell {
        Cell {
            data: self.data.into_inner(),
            references: self.references,
        }
    }
}

impl Default for CellBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl BitWriter for CellBuilder {
    type Error = CodecError;

    #[inline]
    fn capacity_left(&self) -> usize {
        self.data.capacity_left()
    }

    #[inline]
    fn write_bit(&mut self, bit: bool) -> Result<(), Self::Error> {
        self.data.write_bit(bit)
    }

    #[inline]
    fn write_bitslice(&mut self, bits: &BitSlice<u8, Msb0>) -> Result<(), Self::Error> {
        self.data.write_bitslice(bits)
    }

    #[inline]
    fn repeat_bit(&mut self, n: usize, bit: bool) -> Result<(), Self::Error> {
        self.data.repeat_bit(n, bit)
    }
}

#[cfg(test)]
mod tests {
    use crate::bits::ser::BitWriterExt;

    use super::*;

    #[test]
    fn too_many_bits() {
        let mut builder = Cell::builder();
        builder.repeat_bit(1000, true).unwrap();
        let err = builder.pack(0_u32).unwrap_err();
        assert_eq!(
            err.kind(),
            &CodecError::Overflow {
                requested: 32,
                left: 23
            }
        );
        assert!(err.is_structural());
        assert_eq!(builder.bits_len(), 1000);
    }

    #[test]
    fn too_many_references() {
        let mut builder = Cell::builder();
        for _ in 0..MAX_REFS_COUNT {
            builder.store_reference(Cell::new()).unwrap();
        }
        assert_eq!(builder.references_left(), 0);
        assert_eq!(
            builder.store_reference(Cell::new()).unwrap_err(),
            CodecError::TooManyRefs
        );
    }
}
