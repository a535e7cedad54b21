//! [TL-B](https://docs.ton.org/develop/data-formats/tl-b-language) types
//! of the TON blockchain: addresses, currencies, dictionaries and messages.
//!
//! ```rust
//! # use tonsig_tlb::{Cell, ser::CellSerializeExt};
//! # use tonsig_tlb_ton::{MsgAddress, currency::ONE_TON, message::MessageRelaxed};
//! let dst: MsgAddress = "EQBGXZ9ddZeWypx8EkJieHJX75ct0bpkmu0Y4YoYr3NM0Z9e".parse()?;
//! let msg = MessageRelaxed::transfer(dst, ONE_TON.clone(), true, Cell::new());
//! let cell = msg.to_cell()?;
//! assert_eq!(cell.parse_fully::<MessageRelaxed>()?, msg);
//! # Ok::<_, tonsig_tlb::CodecError>(())
//! ```
mod address;
pub mod currency;
pub mod hashmap;
pub mod message;
mod send_mode;
pub mod state_init;
mod timestamp;

pub use self::{address::*, send_mode::*, timestamp::*};
