//! Bit-level **de**/**ser**ialization primitives for
//! [TL-B](https://docs.ton.org/develop/data-formats/tl-b-language).
//!
//! Values are written with [`BitPack`](ser::BitPack) into any
//! [`BitWriter`](ser::BitWriter) and read back with
//! [`BitUnpack`](de::BitUnpack) from any [`BitReader`](de::BitReader).
//! Types that need custom encoding are handled by adapters from
//! [`as`] module.
pub mod adapters;
pub mod r#as;
pub mod de;
mod error;
pub mod integer;
pub mod ser;

pub use self::error::*;

pub use ::either::Either;
pub use bitvec;
pub use num_bigint;

#[cfg(test)]
mod tests;
