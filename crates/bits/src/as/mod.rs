//! **De**/**ser**ialization helpers for
//! [TL-B](https://docs.ton.org/develop/data-formats/tl-b-language).
//!
//! This approach is heavily inspired by
//! [serde_with](https://docs.rs/serde_with/latest/serde_with).
//! Please, read their docs for more usage examples.
mod bits;
mod integer;
mod remainder;
mod same;
mod unary;

pub use self::{bits::*, integer::*, remainder::*, same::*, unary::*};
