//! Collection of types related to [Bag Of Cells](https://docs.ton.org/develop/data-formats/cell-boc#bag-of-cells)
use std::{
    collections::{HashMap, HashSet},
    fmt::Debug,
    sync::Arc,
};

use crc::Crc;

use crate::{
    Cell, CodecError, Error, ResultExt,
    bits::{
        bitvec::{order::Msb0, slice::BitSlice, vec::BitVec, view::AsBits},
        de::{BitReader, BitReaderExt},
        r#as::{NBits, VarNBits},
        ser::{BitWriter, BitWriterExt},
    },
};

/// Alias to [`BagOfCells`]
pub type BoC = BagOfCells;

/// [Bag Of Cells](https://docs.ton.org/develop/data-formats/cell-boc#bag-of-cells) is used to **de**/**ser**ialize a set of cells from/into
/// bytes.
///
/// ```rust
/// # use tonsig_tlb::{
/// #     r#as::Data,
/// #     bits::ser::BitWriterExt,
/// #     BagOfCells, BagOfCellsArgs, Cell, CodecError,
/// # };
/// # fn main() -> Result<(), CodecError> {
/// let data: u32 = 1234;
/// let mut builder = Cell::builder();
/// builder.pack(data)?;
/// let root = builder.into_cell();
///
/// let boc = BagOfCells::from_root(root);
/// let packed = boc.serialize(BagOfCellsArgs {
///     has_idx: false,
///     has_crc32c: true,
/// })?;
///
/// let unpacked = BagOfCells::deserialize(&packed)?;
/// let got: u32 = unpacked
///     .single_root()
///     .unwrap()
///     .parse_fully_as::<_, Data>()?;
///
/// assert_eq!(got, data);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct BagOfCells {
    roots: Vec<Arc<Cell>>,
}

/// Serialization flags for [`BagOfCells`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BagOfCellsArgs {
    pub has_idx: bool,
    pub has_crc32c: bool,
}

impl Default for BagOfCellsArgs {
    #[inline]
    fn default() -> Self {
        Self {
            has_idx: false,
            has_crc32c: true,
        }
    }
}

impl BagOfCells {
    /// Create from single root cell
    #[inline]
    pub fn from_root(root: impl Into<Arc<Cell>>) -> Self {
        Self {
            roots: [root.into()].into(),
        }
    }

    /// Add root
    #[inline]
    pub fn add_root(&mut self, root: impl Into<Arc<Cell>>) {
        self.roots.push(root.into())
    }

    /// Return single root or `None` otherwise
    #[inline]
    pub fn single_root(&self) -> Option<&Arc<Cell>> {
        let [root]: &[_; 1] = self.roots.as_slice().try_into().ok()?;
        Some(root)
    }

    /// Consume `self` and return single root or `None` otherwise
    #[inline]
    pub fn into_single_root(self) -> Option<Arc<Cell>> {
        let [root] = self.roots.try_into().ok()?;
        Some(root)
    }

    /// Post-order walk over unique cells, children visited last-to-first.
    /// Reversing the result puts every cell before all of its descendants.
    fn visit(cell: &Arc<Cell>, visited: &mut HashSet<Arc<Cell>>, sorted: &mut Vec<Arc<Cell>>) {
        if !visited.insert(cell.clone()) {
            return;
        }
        for r in cell.references.iter().rev() {
            Self::visit(r, visited, sorted);
        }
        sorted.push(cell.clone());
    }

    fn to_raw(&self) -> Result<RawBagOfCells, CodecError> {
        let [root] = self.roots.as_slice() else {
            return Err(Error::custom("only single root cell supported"));
        };

        let mut sorted = Vec::new();
        Self::visit(root, &mut HashSet::new(), &mut sorted);
        sorted.reverse();

        let indices: HashMap<&Arc<Cell>, u32> = sorted
            .iter()
            .enumerate()
            .map(|(i, c)| (c, i as u32))
            .collect();
        let cells = sorted
            .iter()
            .map(|cell| {
                Ok(RawCell {
                    data: cell.data.clone(),
                    references: cell
                        .references
                        .iter()
                        .map(|r| {
                            indices
                                .get(r)
                                .copied()
                                .ok_or_else(|| CodecError::custom("unindexed reference"))
                        })
                        .collect::<Result<_, CodecError>>()?,
                    level: cell.level(),
                })
            })
            .collect::<Result<_, CodecError>>()?;

        Ok(RawBagOfCells {
            cells,
            roots: vec![0],
            has_crc32c: false,
        })
    }

    /// Serialize into bytes
    pub fn serialize(&self, args: BagOfCellsArgs) -> Result<Vec<u8>, CodecError> {
        let mut buf: BitVec<u8, Msb0> = BitVec::new();
        self.to_raw()?.pack(&mut buf, args)?;
        if buf.len() % 8 != 0 {
            return Err(Error::custom("produced stream is not byte-aligned"));
        }
        let mut bytes = buf.into_vec();
        if args.has_crc32c {
            // crc32c:has_crc32c?uint32
            let cs = CRC_32_ISCSI.checksum(&bytes);
            bytes.extend(cs.to_le_bytes());
        }
        Ok(bytes)
    }

    /// Parse from bytes
    pub fn deserialize(bytes: impl AsRef<[u8]>) -> Result<Self, CodecError> {
        let bytes = bytes.as_ref();
        let mut reader: &BitSlice<u8, Msb0> = bytes.as_bits();
        let raw = RawBagOfCells::unpack(&mut reader)?;

        if raw.has_crc32c {
            let consumed = (bytes.len() * 8 - reader.bits_left()) / 8;
            // crc32c:has_crc32c?uint32
            let cs = u32::from_le_bytes(reader.read_bytes_array().context("crc32c")?);
            if cs != CRC_32_ISCSI.checksum(&bytes[..consumed]) {
                return Err(Error::custom("CRC mismatch"));
            }
        }
        if reader.bits_left() != 0 {
            return Err(Error::custom(format!(
                "{} trailing bytes",
                reader.bits_left() / 8
            )));
        }

        raw.into_cells()
    }

    /// Parse hexadecimal string
    #[inline]
    pub fn parse_hex(s: impl AsRef<[u8]>) -> Result<Self, CodecError> {
        hex::decode(s)
            .map_err(Error::custom)
            .and_then(Self::deserialize)
    }

    /// Parse base64-encoded string
    #[cfg(feature = "base64")]
    #[inline]
    pub fn parse_base64(s: impl AsRef<[u8]>) -> Result<Self, CodecError> {
        use base64::{Engine, engine::general_purpose::STANDARD};

        STANDARD
            .decode(s)
            .map_err(Error::custom)
            .and_then(Self::deserialize)
    }

    /// Serialize with default [`BagOfCellsArgs`] and encode with standard
    /// base64 alphabet
    #[cfg(feature = "base64")]
    #[inline]
    pub fn to_base64(&self) -> Result<String, CodecError> {
        use base64::{Engine, engine::general_purpose::STANDARD};

        self.serialize(BagOfCellsArgs::default())
            .map(|bytes| STANDARD.encode(bytes))
    }
}

impl Debug for BagOfCells {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(&self.roots).finish()
    }
}

impl TryFrom<&[u8]> for BagOfCells {
    type Error = CodecError;

    #[inline]
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::deserialize(value)
    }
}

const CRC_32_ISCSI: Crc<u32> = Crc::<u32>::new(&crc::CRC_32_ISCSI);

#[derive(PartialEq, Eq, Debug, Clone)]
struct RawBagOfCells {
    cells: Vec<RawCell>,
    roots: Vec<u32>,
    has_crc32c: bool,
}

impl RawBagOfCells {
    ///```tlb
    /// serialized_boc_idx#68ff65f3
    /// ```
    const INDEXED_BOC_TAG: u32 = 0x68ff65f3;

    /// ```tlb
    /// serialized_boc_idx_crc32c#acc3a728
    /// ```
    const INDEXED_CRC32_TAG: u32 = 0xacc3a728;

    /// ```tlb
    /// serialized_boc#b5ee9c72
    /// ```
    const GENERIC_BOC_TAG: u32 = 0xb5ee9c72;

    /// Minimal number of bytes to hold `n`, but at least one
    fn bytes_for(n: u32) -> usize {
        ((u32::BITS - n.leading_zeros()) as usize).div_ceil(8).max(1)
    }

    /// ```tlb
    /// serialized_boc#b5ee9c72 has_idx:(## 1) has_crc32c:(## 1)
    ///   has_cache_bits:(## 1) flags:(## 2) { flags = 0 }
    ///   size:(## 3) { size <= 4 }
    ///   off_bytes:(## 8) { off_bytes <= 8 }
    ///   cells:(##(size * 8))
    ///   roots:(##(size * 8)) { roots >= 1 }
    ///   absent:(##(size * 8)) { roots + absent <= cells }
    ///   tot_cells_size:(##(off_bytes * 8))
    ///   root_list:(roots * ##(size * 8))
    ///   index:has_idx?(cells * ##(off_bytes * 8))
    ///   cell_data:(tot_cells_size * [ uint8 ])
    ///   crc32c:has_crc32c?uint32
    ///   = BagOfCells;
    /// ```
    /// Checksum is appended by the caller.
    fn pack<W>(&self, writer: &mut W, args: BagOfCellsArgs) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        let size_bytes = Self::bytes_for(self.cells.len() as u32);

        let mut tot_cells_size: u32 = 0;
        let mut index = Vec::<u32>::with_capacity(self.cells.len());
        for cell in &self.cells {
            tot_cells_size += cell.size(size_bytes);
            // each entry points to the end of its cell
            index.push(tot_cells_size);
        }
        let off_bytes = Self::bytes_for(tot_cells_size);

        writer
            // serialized_boc#b5ee9c72
            .pack(Self::GENERIC_BOC_TAG)?
            // has_idx:(## 1)
            .pack(args.has_idx)?
            // has_crc32c:(## 1)
            .pack(args.has_crc32c)?
            // has_cache_bits:(## 1)
            .pack(false)?
            // flags:(## 2) { flags = 0 }
            .pack_as::<u8, NBits<2>>(0)?
            // size:(## 3) { size <= 4 }
            .pack_as::<_, NBits<3>>(size_bytes)?
            // off_bytes:(## 8) { off_bytes <= 8 }
            .pack_as::<_, NBits<8>>(off_bytes)?
            // cells:(##(size * 8))
            .pack_as_with::<_, VarNBits>(self.cells.len() as u32, size_bytes * 8)?
            // roots:(##(size * 8)) { roots >= 1 }
            .pack_as_with::<_, VarNBits>(self.roots.len() as u32, size_bytes * 8)?
            // absent:(##(size * 8)) { roots + absent <= cells }
            .pack_as_with::<_, VarNBits>(0u32, size_bytes * 8)?
            // tot_cells_size:(##(off_bytes * 8))
            .pack_as_with::<_, VarNBits>(tot_cells_size, off_bytes * 8)?;
        // root_list:(roots * ##(size * 8))
        for root in &self.roots {
            writer.pack_as_with::<_, VarNBits>(*root, size_bytes * 8)?;
        }
        if args.has_idx {
            // index:has_idx?(cells * ##(off_bytes * 8))
            for offset in index {
                writer.pack_as_with::<_, VarNBits>(offset, off_bytes * 8)?;
            }
        }
        // cell_data:(tot_cells_size * [ uint8 ])
        for (i, cell) in self.cells.iter().enumerate() {
            cell.pack(writer, size_bytes)
                .with_context(|| format!("[{i}]"))?;
        }
        Ok(())
    }

    /// Reads everything up to, but not including, the checksum.
    ///
    /// ```tlb
    /// serialized_boc_idx#68ff65f3 size:(## 8) { size <= 4 }
    ///   off_bytes:(## 8) { off_bytes <= 8 }
    ///   cells:(##(size * 8))
    ///   roots:(##(size * 8)) { roots = 1 }
    ///   absent:(##(size * 8)) { roots + absent <= cells }
    ///   tot_cells_size:(##(off_bytes * 8))
    ///   index:(cells * ##(off_bytes * 8))
    ///   cell_data:(tot_cells_size * [ uint8 ])
    ///   = BagOfCells;
    ///
    /// serialized_boc_idx_crc32c#acc3a728 size:(## 8) { size <= 4 }
    ///   off_bytes:(## 8) { off_bytes <= 8 }
    ///   cells:(##(size * 8))
    ///   roots:(##(size * 8)) { roots = 1 }
    ///   absent:(##(size * 8)) { roots + absent <= cells }
    ///   tot_cells_size:(##(off_bytes * 8))
    ///   index:(cells * ##(off_bytes * 8))
    ///   cell_data:(tot_cells_size * [ uint8 ])
    ///   crc32c:uint32 = BagOfCells;
    /// ```
    fn unpack(reader: &mut &BitSlice<u8, Msb0>) -> Result<Self, CodecError> {
        let tag: u32 = reader.unpack().context("tag")?;
        let (has_idx, has_crc32c, size_bytes): (bool, bool, usize) = match tag {
            Self::INDEXED_BOC_TAG => (true, false, reader.unpack_as::<_, NBits<8>>()?),
            Self::INDEXED_CRC32_TAG => (true, true, reader.unpack_as::<_, NBits<8>>()?),
            Self::GENERIC_BOC_TAG => {
                // has_idx:(## 1) has_crc32c:(## 1)
                let (has_idx, has_crc32c) = reader.unpack()?;
                // has_cache_bits:(## 1)
                let _has_cache_bits: bool = reader.unpack()?;
                // flags:(## 2) { flags = 0 }
                let flags: u8 = reader.unpack_as::<_, NBits<2>>()?;
                if flags != 0 {
                    return Err(Error::custom(format!("unsupported flags: {flags:#b}")));
                }
                // size:(## 3) { size <= 4 }
                (has_idx, has_crc32c, reader.unpack_as::<_, NBits<3>>()?)
            }
            _ => return Err(Error::custom(format!("invalid BoC tag: {tag:#x}"))),
        };
        if !(1..=4).contains(&size_bytes) {
            return Err(Error::custom(format!("invalid size: {size_bytes}")));
        }
        // off_bytes:(## 8) { off_bytes <= 8 }
        let off_bytes: usize = reader.unpack_as::<_, NBits<8>>()?;
        if !(1..=8).contains(&off_bytes) {
            return Err(Error::custom(format!("invalid off_bytes: {off_bytes}")));
        }
        // cells:(##(size * 8))
        let cells: u32 = reader.unpack_as_with::<_, VarNBits>(size_bytes * 8)?;
        // roots:(##(size * 8)) { roots >= 1 }
        let roots: u32 = reader.unpack_as_with::<_, VarNBits>(size_bytes * 8)?;
        // absent:(##(size * 8)) { roots + absent <= cells }
        let absent: u32 = reader.unpack_as_with::<_, VarNBits>(size_bytes * 8)?;
        if roots == 0 || roots.saturating_add(absent) > cells {
            return Err(Error::custom(format!(
                "invalid counts: {roots} roots, {absent} absent, {cells} cells"
            )));
        }
        // tot_cells_size:(##(off_bytes * 8))
        let tot_cells_size: u64 = reader.unpack_as_with::<_, VarNBits>(off_bytes * 8)?;
        let root_list = if tag == Self::GENERIC_BOC_TAG {
            // root_list:(roots * ##(size * 8))
            (0..roots)
                .map(|_| reader.unpack_as_with::<u32, VarNBits>(size_bytes * 8))
                .collect::<Result<_, CodecError>>()
                .context("root_list")?
        } else {
            vec![0]
        };
        if has_idx {
            // index:has_idx?(cells * ##(off_bytes * 8))
            reader
                .skip(cells as usize * off_bytes * 8)
                .context("index")?;
        }
        // cell_data:(tot_cells_size * [ uint8 ])
        let data_bits = usize::try_from(tot_cells_size)
            .ok()
            .and_then(|n| n.checked_mul(8))
            .filter(|&n| n <= reader.bits_left())
            .ok_or_else(|| {
                CodecError::custom(format!(
                    "cell_data: {tot_cells_size} bytes declared, {} bits left",
                    reader.bits_left()
                ))
            })?;
        // every cell takes at least two descriptor bytes
        if u64::from(cells) * 2 > tot_cells_size {
            return Err(Error::custom(format!(
                "{cells} cells do not fit into {tot_cells_size} bytes"
            )));
        }
        let (mut data, rest) = (*reader).split_at(data_bits);
        *reader = rest;
        let cells = (0..cells)
            .map(|i| RawCell::unpack(&mut data, size_bytes).with_context(|| format!("[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .context("cell_data")?;
        if !data.is_empty() {
            return Err(Error::custom(format!(
                "cell_data: {} bits left after the last cell",
                data.len()
            )));
        }

        Ok(Self {
            cells,
            roots: root_list,
            has_crc32c,
        })
    }

    /// Links cells by their indices. References may only point forward.
    fn into_cells(self) -> Result<BagOfCells, CodecError> {
        let num_cells = self.cells.len();
        let mut cells: Vec<Arc<Cell>> = Vec::with_capacity(num_cells);
        for (i, raw_cell) in self.cells.into_iter().enumerate().rev() {
            let references = raw_cell
                .references
                .into_iter()
                .map(|r| {
                    let r = r as usize;
                    if r <= i || r >= num_cells {
                        return Err(CodecError::custom(format!(
                            "invalid reference: [{i}] -> [{r}]"
                        )));
                    }
                    Ok(cells[num_cells - 1 - r].clone())
                })
                .collect::<Result<_, CodecError>>()?;
            cells.push(Arc::new(Cell {
                data: raw_cell.data,
                references,
            }));
        }
        Ok(BagOfCells {
            roots: self
                .roots
                .into_iter()
                .map(|r| {
                    let r = r as usize;
                    if r >= num_cells {
                        return Err(CodecError::custom(format!("invalid root: [{r}]")));
                    }
                    Ok(cells[num_cells - 1 - r].clone())
                })
                .collect::<Result<_, CodecError>>()?,
        })
    }
}

#[derive(PartialEq, Eq, Debug, Clone)]
struct RawCell {
    data: BitVec<u8, Msb0>,
    references: Vec<u32>,
    level: u8,
}

impl RawCell {
    fn unpack(reader: &mut &BitSlice<u8, Msb0>, size_bytes: usize) -> Result<Self, CodecError> {
        let refs_descriptor: u8 = reader.unpack()?;
        let level: u8 = refs_descriptor >> 5;
        let is_exotic: bool = (refs_descriptor >> 3) & 0b1 == 1;
        if is_exotic {
            return Err(Error::custom("exotic cells are not supported"));
        }
        let ref_num: usize = refs_descriptor as usize & 0b111;
        if ref_num > 4 {
            return Err(Error::custom(format!("too many references: {ref_num}")));
        }

        let bits_descriptor: u8 = reader.unpack()?;
        let num_bytes: usize = ((bits_descriptor >> 1) + (bits_descriptor & 1)) as usize;
        let full_bytes = (bits_descriptor & 1) == 0;

        let mut data = reader.read_bitvec(num_bytes * 8)?;
        if !data.is_empty() && !full_bytes {
            let trailing_zeros = data.trailing_zeros();
            if trailing_zeros >= 8 {
                return Err(Error::custom("last byte must be non zero"));
            }
            data.truncate(data.len() - trailing_zeros - 1);
        }

        let references = (0..ref_num)
            .map(|_| reader.unpack_as_with::<u32, VarNBits>(size_bytes * 8))
            .collect::<Result<_, CodecError>>()?;

        Ok(Self {
            data,
            references,
            level,
        })
    }

    fn pack<W>(&self, writer: &mut W, ref_size_bytes: usize) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        let is_exotic: u8 = 0;
        let refs_descriptor: u8 = self.references.len() as u8 + is_exotic * 8 + self.level * 32;
        writer.pack(refs_descriptor)?;

        let padding_bits = self.data.len() % 8;
        let full_bytes = padding_bits == 0;
        let bits_descriptor: u8 = (self.data.len() / 8 + self.data.len().div_ceil(8)) as u8;
        writer.pack(bits_descriptor)?;

        writer.write_bitslice(&self.data)?;
        if !full_bytes {
            writer.write_bit(true)?;
            writer.repeat_bit(8 - padding_bits - 1, false)?;
        }

        for r in &self.references {
            writer.pack_as_with::<_, VarNBits>(*r, ref_size_bytes * 8)?;
        }
        Ok(())
    }

    fn size(&self, ref_size_bytes: usize) -> u32 {
        let data_len = self.data.len().div_ceil(8);
        (2 + data_len + self.references.len() * ref_size_bytes) as u32
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use rstest::rstest;

    use crate::{
        r#as::{Data, Ref},
        ser::{CellSerializeExt, CellSerializeWrapAsExt},
    };

    use super::*;

    #[test]
    fn empty_cell() {
        let boc = BagOfCells::from_root(Cell::new());
        assert_eq!(
            boc.serialize(BagOfCellsArgs::default()).unwrap(),
            hex!("b5ee9c724101010100020000004cacb9cd"),
        );
        #[cfg(feature = "base64")]
        assert_eq!(boc.to_base64().unwrap(), "te6cckEBAQEAAgAAAEysuc0=");
    }

    #[test]
    fn shared_children_deduplicated() {
        let leaf = Arc::new({
            let mut b = Cell::builder();
            b.pack(0xABCD_u16).unwrap();
            b.into_cell()
        });
        let mut builder = Cell::builder();
        builder
            .store_reference(leaf.clone())
            .unwrap()
            .store_reference(leaf.clone())
            .unwrap();
        let root = builder.into_cell();

        let raw = BagOfCells::from_root(root.clone()).to_raw().unwrap();
        assert_eq!(raw.cells.len(), 2);
        assert_eq!(raw.cells[0].references, [1, 1]);

        let bytes = BagOfCells::from_root(root.clone())
            .serialize(BagOfCellsArgs::default())
            .unwrap();
        let got = BagOfCells::deserialize(bytes)
            .unwrap()
            .into_single_root()
            .unwrap();
        assert_eq!(*got, root);
    }

    #[test]
    fn parents_before_children() {
        let root = (
            ().wrap_as::<Ref>(),
            (0x7F_u8.wrap_as::<Data>(), ().wrap_as::<Ref>()).wrap_as::<Ref>(),
        )
            .to_cell()
            .unwrap();
        let raw = BagOfCells::from_root(root).to_raw().unwrap();
        for (i, cell) in raw.cells.iter().enumerate() {
            assert!(cell.references.iter().all(|&r| r as usize > i));
        }
        assert_eq!(raw.cells.len(), 3);
    }

    #[rstest]
    #[case(BagOfCellsArgs { has_idx: false, has_crc32c: false })]
    #[case(BagOfCellsArgs { has_idx: true, has_crc32c: false })]
    #[case(BagOfCellsArgs { has_idx: false, has_crc32c: true })]
    #[case(BagOfCellsArgs { has_idx: true, has_crc32c: true })]
    fn serde(#[case] args: BagOfCellsArgs) {
        let mut child = Cell::builder();
        child.with_repeat_bit(3, true).unwrap();
        let mut builder = Cell::builder();
        builder
            .pack(0xDEADBEEF_u32)
            .unwrap()
            .store_reference(child.into_cell())
            .unwrap();
        let root = builder.into_cell();

        let bytes = BagOfCells::from_root(root.clone()).serialize(args).unwrap();
        let got = BagOfCells::deserialize(&bytes).unwrap();
        assert_eq!(**got.single_root().unwrap(), root);
    }

    #[test]
    fn crc_mismatch() {
        let mut bytes = hex!("b5ee9c724101010100020000004cacb9cd");
        bytes[16] ^= 1;
        assert!(BagOfCells::deserialize(bytes).is_err());
    }

    #[test]
    fn indexed_tag() {
        // serialized_boc_idx#68ff65f3 with one empty cell
        let boc = BagOfCells::deserialize(hex!("68ff65f3 01 01 01 01 00 02 02 0000")).unwrap();
        assert_eq!(**boc.single_root().unwrap(), Cell::new());
    }

    #[test]
    fn backward_reference() {
        // single cell referencing itself
        assert!(BagOfCells::parse_hex("b5ee9c7201010101000300010000").is_err());
    }
}
