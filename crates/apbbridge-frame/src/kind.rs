//! Transaction kinds and their 3-bit wire codes.

/// The seven transactions the bridge understands.
///
/// The discriminant is the code carried in bits [7:5] of the header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TransactionKind {
    Read = 0b000,
    Write = 0b001,
    BlockRead = 0b010,
    BlockWrite = 0b011,
    CyclicRead = 0b100,
    CyclicWrite = 0b101,
    ReadModifyWrite = 0b110,
}

impl TransactionKind {
    /// 3-bit wire code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look up a kind by wire code. Code `0b111` is unassigned.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0b000 => Some(Self::Read),
            0b001 => Some(Self::Write),
            0b010 => Some(Self::BlockRead),
            0b011 => Some(Self::BlockWrite),
            0b100 => Some(Self::CyclicRead),
            0b101 => Some(Self::CyclicWrite),
            0b110 => Some(Self::ReadModifyWrite),
            _ => None,
        }
    }

    /// Byte address increment between consecutive elements.
    pub fn address_step(self) -> u32 {
        match self {
            Self::BlockRead | Self::BlockWrite => 4,
            _ => 0,
        }
    }

    /// True for kinds whose size field carries `count - 1`.
    pub fn is_multi(self) -> bool {
        matches!(
            self,
            Self::BlockRead | Self::BlockWrite | Self::CyclicRead | Self::CyclicWrite
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::BlockRead => "block_read",
            Self::BlockWrite => "block_write",
            Self::CyclicRead => "cyclic_read",
            Self::CyclicWrite => "cyclic_write",
            Self::ReadModifyWrite => "rmw",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
