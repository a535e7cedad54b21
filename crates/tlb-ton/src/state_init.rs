//! Collection of types related to [StateInit](https://docs.ton.org/develop/data-formats/msg-tlb#stateinit-tl-b)
use impl_tools::autoimpl;
use tonsig_tlb::{
    Cell, ResultExt,
    r#as::{NBits, Ref},
    bits::{
        de::{BitReader, BitReaderExt, BitUnpack},
        ser::{BitPack, BitWriter, BitWriterExt},
    },
    de::{CellDeserialize, CellParser, CellParserError},
    ser::{CellBuilder, CellBuilderError, CellSerialize},
};

/// [StateInit](https://docs.ton.org/develop/data-formats/msg-tlb#stateinit-tl-b)
/// ```tlb
/// _ split_depth:(Maybe (## 5)) special:(Maybe TickTock)
/// code:(Maybe ^Cell) data:(Maybe ^Cell)
/// library:(HashmapE 256 SimpleLib) = StateInitWithLibs;
/// ```
///
/// Libraries are kept as the raw root of `HashmapE 256 SimpleLib`, since
/// its keys are wider than [`Dictionary`](crate::hashmap::Dictionary)
/// supports.
#[derive(Debug, Clone, PartialEq, Eq)]
#[autoimpl(Default)]
pub struct StateInit<C = Cell, D = Cell> {
    pub split_depth: Option<u8>,
    pub special: Option<TickTock>,
    pub code: Option<C>,
    pub data: Option<D>,
    pub library: Option<Cell>,
}

impl<C, D> CellSerialize for StateInit<C, D>
where
    C: CellSerialize,
    D: CellSerialize,
{
    #[inline]
    fn store(&self, builder: &mut CellBuilder) -> Result<(), CellBuilderError> {
        builder
            // split_depth:(Maybe (## 5))
            .pack_as::<_, Option<NBits<5>>>(self.split_depth)?
            // special:(Maybe TickTock)
            .pack(self.special)?
            // code:(Maybe ^Cell)
            .store_as::<_, Option<Ref>>(self.code.as_ref())
            .context("code")?
            // data:(Maybe ^Cell)
            .store_as::<_, Option<Ref>>(self.data.as_ref())
            .context("data")?
            // library:(HashmapE 256 SimpleLib)
            .store_as::<_, Option<Ref>>(self.library.as_ref())
            .context("library")?;
        Ok(())
    }
}

impl<'de, C, D> CellDeserialize<'de> for StateInit<C, D>
where
    C: CellDeserialize<'de>,
    D: CellDeserialize<'de>,
{
    #[inline]
    fn parse(parser: &mut CellParser<'de>) -> Result<Self, CellParserError> {
        Ok(Self {
            // split_depth:(Maybe (## 5))
            split_depth: parser.unpack_as::<_, Option<NBits<5>>>()?,
            // special:(Maybe TickTock)
            special: parser.unpack()?,
            // code:(Maybe ^Cell)
            code: parser.parse_as::<_, Option<Ref>>().context("code")?,
            // data:(Maybe ^Cell)
            data: parser.parse_as::<_, Option<Ref>>().context("data")?,
            // library:(HashmapE 256 SimpleLib)
            library: parser.parse_as::<_, Option<Ref>>().context("library")?,
        })
    }
}

/// `tick_tock` field for [`StateInit`]
/// ```tlb
/// tick_tock$_ tick:Bool tock:Bool = TickTock;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTock {
    pub tick: bool,
    pub tock: bool,
}

impl BitPack for TickTock {
    #[inline]
    fn pack<W>(&self, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        writer.pack(self.tick)?.pack(self.tock)?;
        Ok(())
    }
}

impl BitUnpack for TickTock {
    #[inline]
    fn unpack<R>(reader: &mut R) -> Result<Self, R::Error>
    where
        R: BitReader + ?Sized,
    {
        Ok(Self {
            tick: reader.unpack()?,
            tock: reader.unpack()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use tonsig_tlb::ser::CellSerializeExt;

    use crate::MsgAddress;

    use super::*;

    #[test]
    fn state_init_serde() {
        let s = StateInit::<Cell, Cell> {
            split_depth: None,
            special: Some(TickTock {
                tick: true,
                tock: false,
            }),
            code: Some(Cell::new()),
            data: None,
            library: None,
        };
        let cell = s.to_cell().unwrap();
        assert_eq!(cell.data.len(), 1 + 3 + 1 + 1 + 1);
        assert_eq!(cell.references.len(), 1);

        let got: StateInit = cell.parse_fully().unwrap();
        assert_eq!(got, s);
    }

    #[test]
    fn derive_address() {
        let s = StateInit::<Cell, Cell>::default();
        let addr = MsgAddress::derive(0, s.clone()).unwrap();
        assert_eq!(addr.workchain_id, 0);
        assert_eq!(addr.address, s.to_cell().unwrap().hash());
        assert_ne!(addr, MsgAddress::NULL);
    }
}
