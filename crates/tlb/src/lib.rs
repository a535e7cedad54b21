//! Cell-level [TL-B](https://docs.ton.org/develop/data-formats/tl-b-language)
//! **de**/**ser**ialization.
//!
//! A [`Cell`] is built with [`CellBuilder`] and read back with
//! [`CellParser`]. Types describe their layout by implementing
//! [`CellSerialize`]/[`CellDeserialize`] or through adapters from
//! [`as`](crate::as) module.
pub mod r#as;
pub mod boc;
mod cell;
pub mod de;
pub mod ser;
#[cfg(test)]
mod tests;

pub use self::{boc::*, cell::*, de::*, ser::*};

pub use tonsig_bits::{self as bits, CodecError, Either, Error, ResultExt};
