use core::{
    fmt::{self, Debug},
    ops::{BitOr, BitOrAssign},
};

use tonsig_tlb::bits::{
    de::{BitReader, BitReaderExt, BitUnpack},
    ser::{BitPack, BitWriter, BitWriterExt},
};

/// [Message mode](https://docs.ton.org/develop/smart-contracts/messages#message-modes)
/// passed to `SENDRAWMSG` as `uint8`
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SendMode(u8);

impl SendMode {
    /// Ordinary message
    pub const ORDINARY: Self = Self(0);
    /// Pay transfer fees separately from the message value
    pub const PAY_GAS_SEPARATELY: Self = Self(1);
    /// Ignore some errors arising while processing this message
    /// during the action phase
    pub const IGNORE_ERRORS: Self = Self(2);
    /// Bounce transaction in case of any errors during action phase
    pub const BOUNCE_ON_ACTION_FAIL: Self = Self(16);
    /// Current account must be destroyed if its resulting balance is zero
    pub const DESTROY_IF_ZERO: Self = Self(32);
    /// Carry all the remaining value of the inbound message
    pub const CARRY_REMAINING_VALUE: Self = Self(64);
    /// Carry all the remaining balance of the current smart contract
    pub const CARRY_ALL_BALANCE: Self = Self(128);

    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for SendMode {
    /// `PAY_GAS_SEPARATELY | IGNORE_ERRORS`
    #[inline]
    fn default() -> Self {
        Self::PAY_GAS_SEPARATELY | Self::IGNORE_ERRORS
    }
}

impl BitOr for SendMode {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SendMode {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<u8> for SendMode {
    #[inline]
    fn from(bits: u8) -> Self {
        Self(bits)
    }
}

impl From<SendMode> for u8 {
    #[inline]
    fn from(mode: SendMode) -> Self {
        mode.0
    }
}

impl Debug for SendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SendMode({:#04x})", self.0)
    }
}

impl BitPack for SendMode {
    #[inline]
    fn pack<W>(&self, writer: &mut W) -> Result<(), W::Error>
    where
        W: BitWriter + ?Sized,
    {
        writer.pack(self.0)?;
        Ok(())
    }
}

impl BitUnpack for SendMode {
    #[inline]
    fn unpack<R>(reader: &mut R) -> Result<Self, R::Error>
    where
        R: BitReader + ?Sized,
    {
        reader.unpack().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use tonsig_tlb::bits::{de::unpack_fully, ser::pack};

    use super::*;

    #[test]
    fn default_mode() {
        assert_eq!(SendMode::default().bits(), 3);
        assert!(SendMode::default().contains(SendMode::IGNORE_ERRORS));
        assert!(!SendMode::default().contains(SendMode::CARRY_ALL_BALANCE));
    }

    #[test]
    fn send_mode_serde() {
        let mode = SendMode::CARRY_ALL_BALANCE | SendMode::IGNORE_ERRORS;

        let packed = pack(mode).unwrap();
        assert_eq!(packed.len(), 8);
        let got: SendMode = unpack_fully(&packed).unwrap();

        assert_eq!(got, mode);
        assert_eq!(u8::from(got), 130);
    }
}
