//! Multisig order codec for [TON](https://ton.org) blockchain.
//!
//! | crate | |
//! |---|---|
//! | [`bits`] | bit-level **de**/**ser**ialization |
//! | [`tlb`] | cells, bags of cells and cell-level adapters |
//! | [`ton`] | addresses, currencies, dictionaries and messages |
//! | [`multisig`] | order encoding, action decoding and summaries |
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

#[doc(inline)]
pub use tonsig_bits as bits;
#[doc(inline)]
pub use tonsig_multisig as multisig;
#[doc(inline)]
pub use tonsig_tlb as tlb;
#[doc(inline)]
pub use tonsig_tlb_ton as ton;
