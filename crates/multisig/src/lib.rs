//! Codec for orders of [multisig-v2](https://github.com/ton-blockchain/multisig-contract-v2)
//! wallets on TON.
//!
//! Encoding wraps a message into a `new_order` request sent by one of
//! signers or proposers:
//! ```rust
//! # use tonsig_multisig::{
//! #     MultisigConfig, OrderParams, OrderSeqno, prepare_create_order,
//! # };
//! # use tonsig_tlb::Cell;
//! # use tonsig_tlb_ton::{MsgAddress, currency::ONE_TON};
//! let signer = MsgAddress { workchain_id: 0, address: [1; 32] };
//! let multisig = MsgAddress { workchain_id: 0, address: [2; 32] };
//! let config = MultisigConfig {
//!     threshold: 1,
//!     signers: vec![signer],
//!     proposers: vec![],
//!     seqno: 0,
//! };
//! let params = OrderParams {
//!     multisig_address: multisig,
//!     order_seqno: OrderSeqno::Pending,
//!     expiration_date: 1_700_000_000,
//! };
//! let prepared = prepare_create_order(
//!     signer, &params, &config, signer, ONE_TON.clone(), Cell::new(),
//! )?;
//! assert_eq!(prepared.send_to, multisig);
//! # Ok::<_, tonsig_multisig::MultisigError>(())
//! ```
//!
//! Decoding turns stored actions back into [`Action`]s, falling back to
//! [`Action::Unknown`] for anything it does not recognize.
pub mod action;
pub mod config;
mod error;
pub mod jetton;
pub mod op;
pub mod order;
pub mod payload;
pub mod stack;
pub mod transport;
pub mod upstream;

#[cfg(test)]
mod tests;

pub use self::{
    action::{Action, decode_orders, encode_transfer, pack_order},
    config::{Network, OrderConfig},
    error::*,
    order::{
        MultisigConfig, OrderBuilder, OrderParams, OrderSeqno, PreparedMessage,
        build_new_order_message, prepare_create_order,
    },
    payload::TransactionKind,
    stack::{OrderData, StackItem},
    transport::TransportRequest,
};
