use ::bitvec::{order::Msb0, slice::BitSlice, vec::BitVec, view::AsMutBits};
use impl_tools::autoimpl;

use crate::{CodecError, Error};

use super::{
    BitUnpack,
    r#as::{BitUnpackAs, BitUnpackAsWithArgs},
};

/// Bitwise reader.
#[autoimpl(for <R: trait + ?Sized> &mut R, Box<R>)]
pub trait BitReader {
    // An error ocurred while reading
    type Error: Error;

    /// Returns number of bits left to read
    fn bits_left(&self) -> usize;

    /// Reads a single bit.
    fn read_bit(&mut self) -> Result<bool, Self::Error>;

    /// Reads exactly `dst.len()` bits into given bitslice.
    /// Might be optimized by the implementation.
    #[inline]
    fn read_bits_into(&mut self, dst: &mut BitSlice<u8, Msb0>) -> Result<(), Self::Error> {
        for mut bit in dst.iter_mut() {
            *bit = self.read_bit()?
        }
        Ok(())
    }

    /// Skips exactly `n` bits.
    #[inline]
    fn skip(&mut self, n: usize) -> Result<(), Self::Error> {
        for _ in 0..n {
            self.read_bit()?;
        }
        Ok(())
    }
}

/// Extension helper for [`BitReader`].
pub trait BitReaderExt: BitReader {
    /// Reads `n` bits into newly allocated [`BitVec`]
    #[inline]
    fn read_bitvec(&mut self, n: usize) -> Result<BitVec<u8, Msb0>, Self::Error> {
        let mut dst = BitVec::repeat(false, n);
        self.read_bits_into(&mut dst)?;
        Ok(dst)
    }

    #[inline]
    fn read_bytes_array<const N: usize>(&mut self) -> Result<[u8; N], Self::Error> {
        let mut arr = [0; N];
        self.read_bits_into(arr.as_mut_bits())?;
        Ok(arr)
    }

    #[inline]
    fn read_bytes_vec(&mut self, n: usize) -> Result<Vec<u8>, Self::Error> {
        let mut v = vec![0; n];
        self.read_bits_into(v.as_mut_bits())?;
        Ok(v)
    }

    /// Unpack value using its [`BitUnpack`] implementation
    #[inline]
    fn unpack<T>(&mut self) -> Result<T, Self::Error>
    where
        T: BitUnpack,
    {
        T::unpack(self)
    }

    /// Unpack value using an adapter.
    /// See [`as`](crate::as) module-level documentation for more.
    #[inline]
    fn unpack_as<T, As>(&mut self) -> Result<T, Self::Error>
    where
        As: BitUnpackAs<T> + ?Sized,
    {
        As::unpack_as(self)
    }

    /// Unpack value with args using an adapter.
    #[inline]
    fn unpack_as_with<T, As>(&mut self, args: As::Args) -> Result<T, Self::Error>
    where
        As: BitUnpackAsWithArgs<T> + ?Sized,
    {
        As::unpack_as_with(self, args)
    }

    /// Borrows reader, rather than consuming it.
    #[inline]
    fn as_mut(&mut self) -> &mut Self {
        self
    }
}
impl<T> BitReaderExt for T where T: BitReader + ?Sized {}

impl BitReader for &BitSlice<u8, Msb0> {
    type Error = CodecError;

    #[inline]
    fn bits_left(&self) -> usize {
        self.len()
    }

    #[inline]
    fn read_bit(&mut self) -> Result<bool, Self::Error> {
        let (bit, rest) = self
            .split_first()
            .ok_or_else(|| CodecError::underflow(1, 0))?;
        *self = rest;
        Ok(*bit)
    }

    #[inline]
    fn read_bits_into(&mut self, dst: &mut BitSlice<u8, Msb0>) -> Result<(), Self::Error> {
        if self.len() < dst.len() {
            return Err(Error::underflow(dst.len(), self.len()));
        }
        let (v, rest) = self.split_at(dst.len());
        dst.copy_from_bitslice(v);
        *self = rest;
        Ok(())
    }

    #[inline]
    fn skip(&mut self, n: usize) -> Result<(), Self::Error> {
        if self.len() < n {
            return Err(Error::underflow(n, self.len()));
        }
        *self = &self[n..];
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bitvec::bits;

    use super::*;

    #[test]
    fn read_past_end() {
        let mut bits = bits![u8, Msb0; 1, 0, 1];
        bits.skip(1).unwrap();
        assert_eq!(bits.bits_left(), 2);
        assert_eq!(
            bits.read_bitvec(3).unwrap_err(),
            CodecError::Underflow {
                requested: 3,
                left: 2
            }
        );
        assert_eq!(bits.read_bitvec(2).unwrap(), bits![u8, Msb0; 0, 1]);
    }
}
