use std::sync::Arc;

use crate::{
    Cell, Error, ResultExt,
    bits::{
        de::BitReaderExt,
        ser::{BitWriter, BitWriterExt},
    },
    de::{CellParser, CellParserError, r#as::CellDeserializeAs},
    ser::{CellBuilder, CellBuilderError, MAX_BITS_LEN, r#as::CellSerializeAs},
};

/// UTF-8 string stored as a snake: bytes fill the current cell as much as
/// possible and the rest continues in a chain of child cells, each
/// referenced by the previous one.
///
/// On **de**serialization all remaining data must be whole bytes and
/// every cell in the chain may have at most one reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnakeString;

impl<T> CellSerializeAs<T> for SnakeString
where
    T: AsRef<str> + ?Sized,
{
    fn store_as(source: &T, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        let bytes = source.as_ref().as_bytes();
        let inline = bytes.len().min(builder.capacity_left() / 8);
        let (head, tail) = bytes.split_at(inline);
        builder.pack(head)?;
        if tail.is_empty() {
            return Ok(());
        }

        let mut next: Option<Cell> = None;
        for chunk in tail.chunks(MAX_BITS_LEN / 8).rev() {
            let mut b = Cell::builder();
            b.pack(chunk)?;
            if let Some(child) = next.take() {
                b.store_reference(child)?;
            }
            next = Some(b.into_cell());
        }
        if let Some(child) = next {
            builder.store_reference(child).context("^")?;
        }
        Ok(())
    }
}

/// Raw bytes of the chain, without UTF-8 validation
impl<'de> CellDeserializeAs<'de, Vec<u8>> for SnakeString {
    fn parse_as(parser: &mut CellParser<'de>) -> Result<Vec<u8>, CellParserError> {
        let mut bytes = Vec::new();
        let mut next = read_chunk(parser, &mut bytes)?;
        while let Some(cell) = next {
            let mut p = cell.parser();
            next = read_chunk(&mut p, &mut bytes).context("^")?;
        }
        Ok(bytes)
    }
}

impl<'de> CellDeserializeAs<'de, String> for SnakeString {
    #[inline]
    fn parse_as(parser: &mut CellParser<'de>) -> Result<String, CellParserError> {
        let bytes: Vec<u8> = parser.parse_as::<_, SnakeString>()?;
        String::from_utf8(bytes).map_err(Error::custom)
    }
}

fn read_chunk<'de>(
    parser: &mut CellParser<'de>,
    dst: &mut Vec<u8>,
) -> Result<Option<&'de Arc<Cell>>, CellParserError> {
    let bits = parser.bits_left();
    if bits % 8 != 0 {
        return Err(Error::custom(format!("{bits} bits is not a whole number of bytes")));
    }
    if parser.references_left() > 1 {
        return Err(Error::custom(format!(
            "snake cell has {} references",
            parser.references_left()
        )));
    }
    dst.extend(parser.read_bytes_vec(bits / 8)?);
    if parser.no_references_left() {
        return Ok(None);
    }
    parser.pop_reference().map(Some)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::{
        bits::{de::BitReader, r#as::NBits},
        ser::{CellSerializeExt, CellSerializeWrapAsExt},
    };

    use super::*;

    #[rstest]
    #[case("")]
    #[case("approve")]
    #[case("привет, мир")]
    fn short_string_inline(#[case] s: &str) {
        let cell = s.wrap_as::<SnakeString>().to_cell().unwrap();
        assert_eq!(cell.data.len(), s.len() * 8);
        assert!(cell.references.is_empty());
        assert_eq!(cell.parse_fully_as::<String, SnakeString>().unwrap(), s);
    }

    #[test]
    fn long_string_chain() {
        let s = "x".repeat(300);
        let mut builder = Cell::builder();
        builder
            .pack_as::<_, NBits<32>>(0_u32)
            .unwrap()
            .store_as::<_, SnakeString>(&s)
            .unwrap();
        let cell = builder.into_cell();

        // 32 bits used by the tag leave room for 123 bytes
        assert_eq!(cell.data.len(), 32 + 123 * 8);
        assert_eq!(cell.references.len(), 1);
        let first = &cell.references[0];
        assert_eq!(first.data.len(), 127 * 8);
        assert_eq!(first.references[0].data.len(), (300 - 123 - 127) * 8);
        assert!(first.references[0].references.is_empty());

        let mut parser = cell.parser();
        parser.skip(32).unwrap();
        assert_eq!(parser.parse_as::<String, SnakeString>().unwrap(), s);
    }

    #[test]
    fn unaligned_tail() {
        let mut builder = Cell::builder();
        builder.pack(0x41_u8).unwrap().pack(true).unwrap();
        let cell = builder.into_cell();
        assert!(cell.parse_fully_as::<String, SnakeString>().is_err());
    }

    #[test]
    fn invalid_utf8() {
        let mut builder = Cell::builder();
        builder.pack(0xFF_u8).unwrap();
        let cell = builder.into_cell();
        assert!(cell.parse_fully_as::<String, SnakeString>().is_err());
        assert_eq!(
            cell.parse_fully_as::<Vec<u8>, SnakeString>().unwrap(),
            [0xFF]
        );
    }
}
