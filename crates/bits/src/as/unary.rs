use crate::{
    de::{BitReader, r#as::BitUnpackAs},
    ser::{BitWriter, BitWriterExt, r#as::BitPackAs},
};

/// [`Unary ~n`](https://docs.ton.org/develop/data-formats/tl-b-types#unary)
/// adapter
/// ```tlb
/// unary_zero$0 = Unary ~0;
/// unary_succ$1 {n:#} x:(Unary ~n) = Unary ~(n + 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Unary;

impl BitPackAs<usize> for Unary {
    #[inline]
    fn pack_as<W>(num: &usize, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        writer
            // unary_succ$1 {n:#} x:(Unary ~n) = Unary ~(n + 1);
            .with_repeat_bit(*num, true)?
            // unary_zero$0 = Unary ~0;
            .pack(false)?;
        Ok(())
    }
}

impl BitUnpackAs<usize> for Unary {
    #[inline]
    fn unpack_as<R>(reader: &mut R) -> Result<usize, R::Error>
    where
        R: BitReader + ?Sized,
    {
        let mut n = 0;
        while reader.read_bit()? {
            n += 1;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use bitvec::{bits, order::Msb0};

    use crate::{de::r#as::unpack_as, ser::r#as::pack_as};

    use super::*;

    #[test]
    fn pack_unary() {
        assert_eq!(
            pack_as::<_, Unary>(3_usize).unwrap(),
            bits![u8, Msb0; 1, 1, 1, 0]
        );
    }

    #[test]
    fn unterminated_unary() {
        assert!(unpack_as::<usize, Unary>(bits![u8, Msb0; 1, 1]).is_err());
    }
}
