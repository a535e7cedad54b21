use thiserror::Error as ThisError;
use tonsig_tlb::CodecError;

/// Error returned by order construction and upstream decoding
#[derive(Debug, ThisError)]
pub enum MultisigError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// Requester is neither a signer nor a proposer of the multisig
    #[error("sender is not a signer or proposer")]
    NotAuthorized,
    /// Role index does not fit into `uint8`
    #[error("address index {0} does not fit into 8 bits")]
    IndexOutOfRange(usize),
    /// Upstream data does not follow the expected shape
    #[error("protocol: {0}")]
    Protocol(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid address: {0}")]
    Address(String),
}

impl MultisigError {
    #[inline]
    pub fn protocol(msg: impl ToString) -> Self {
        Self::Protocol(msg.to_string())
    }
}
