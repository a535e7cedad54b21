//! **De**/**ser**ialization helpers for
//! [TL-B](https://docs.ton.org/develop/data-formats/tl-b-language).
//!
//! This approach is heavily inspired by
//! [serde_with](https://docs.rs/serde_with/latest/serde_with).
//! Please, read their docs for more usage examples.
mod data;
mod fully;
mod reference;
mod same;
mod snake;

pub use self::{data::*, fully::*, reference::*, snake::*};

pub use crate::bits::r#as::*;
