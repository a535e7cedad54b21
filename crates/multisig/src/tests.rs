use core::fmt::Debug;

use tonsig_tlb::{
    de::CellDeserializeOwned,
    ser::{CellSerialize, CellSerializeExt},
};
use tonsig_tlb_ton::MsgAddress;

/// Basechain address filled with given byte
pub fn addr(n: u8) -> MsgAddress {
    MsgAddress {
        workchain_id: 0,
        address: [n; 32],
    }
}

#[track_caller]
pub fn assert_store_parse_eq<T>(value: T)
where
    T: CellSerialize + CellDeserializeOwned + PartialEq + Debug,
{
    assert_eq!(value.to_cell().unwrap().parse_fully::<T>().unwrap(), value)
}
