//! Operation codes: leading `uint32` of message bodies and order actions

/// `new_order#f718510f`
pub const NEW_ORDER: u32 = 0xf718510f;
/// `send_message#f1381e5b`
pub const TRANSFER_REQUEST: u32 = 0xf1381e5b;
/// `update_multisig_params#1d0cfbd3`
pub const UPDATE_CONFIG: u32 = 0x1d0cfbd3;

/// Plain text comment prefix of an internal message body
pub const COMMENT: u32 = 0;

/// `transfer#0f8a7ea5` from TEP-74
pub const JETTON_TRANSFER: u32 = 0x0f8a7ea5;
/// `mint#15`
pub const JETTON_MINT: u32 = 21;
/// `internal_transfer#178d4519` from TEP-74
pub const JETTON_INTERNAL_TRANSFER: u32 = 0x178d4519;
/// `change_admin#3`
pub const JETTON_CHANGE_ADMIN: u32 = 3;

pub const CONTROLLER_APPROVE: u32 = 0x7b4b42e6;
pub const POOL_DONATE: u32 = 0x73affe21;
pub const SET_INTEREST: u32 = 0xc9f04485;
pub const SET_GOVERNANCE_FEE: u32 = 0x2aaa96a0;
pub const SET_OPERATIONAL_PARAMS: u32 = 0x9ef2c8d1;
