use bytes::{Buf, BufMut, BytesMut};

use crate::error::{FrameError, Result};
use crate::kind::TransactionKind;

/// Size of a register value on the wire.
pub const WORD_SIZE: usize = 4;

/// Largest element count of a block or cyclic transfer.
pub const MAX_TRANSFER_COUNT: usize = 256;

/// Mask of the transfer-size field in the header byte.
pub const SIZE_FIELD_MASK: u8 = 0x1F;

const KIND_SHIFT: u8 = 5;

/// Number of bytes used for the address field.
///
/// Must match the `ADDR_BYTE_COUNT` generic of the bridge in the FPGA; a
/// mismatch cannot be detected from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressWidth(u8);

impl AddressWidth {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(bytes: u8) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&bytes) {
            return Err(FrameError::InvalidAddressWidth(bytes));
        }
        Ok(Self(bytes))
    }

    /// Width of the address field in bytes.
    pub fn bytes(self) -> usize {
        self.0 as usize
    }

    /// Highest byte address the field can carry.
    pub fn max_address(self) -> u64 {
        (1u64 << (8 * u32::from(self.0))) - 1
    }

    /// Convert a register index to its byte address (`register * 4`) and
    /// check that it fits the address field.
    pub fn byte_address(self, register: u32) -> Result<u32> {
        let addr = u64::from(register) << 2;
        self.check(addr)?;
        Ok(addr as u32)
    }

    fn check(self, addr: u64) -> Result<()> {
        let max = self.max_address();
        if addr > max {
            return Err(FrameError::AddressOutOfRange { addr, max });
        }
        Ok(())
    }
}

impl Default for AddressWidth {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

/// A status byte returned by the peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(u8);

impl Status {
    /// Bit 7 flags SLVERR; the remaining bits are reserved.
    pub const ERROR_BIT: u8 = 0x80;
    pub const OK: Status = Status(0x00);
    pub const SLVERR: Status = Status(Self::ERROR_BIT);

    pub fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    pub fn is_error(self) -> bool {
        self.0 & Self::ERROR_BIT != 0
    }

    pub fn raw(self) -> u8 {
        self.0
    }
}

/// A single bridge transaction. Addresses are byte addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Read { addr: u32 },
    Write { addr: u32, data: u32 },
    BlockRead { addr: u32, count: usize },
    BlockWrite { addr: u32, data: Vec<u32> },
    CyclicRead { addr: u32, count: usize },
    CyclicWrite { addr: u32, data: Vec<u32> },
    ReadModifyWrite { addr: u32, data: u32, mask: u32 },
}

impl Request {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Request::Read { .. } => TransactionKind::Read,
            Request::Write { .. } => TransactionKind::Write,
            Request::BlockRead { .. } => TransactionKind::BlockRead,
            Request::BlockWrite { .. } => TransactionKind::BlockWrite,
            Request::CyclicRead { .. } => TransactionKind::CyclicRead,
            Request::CyclicWrite { .. } => TransactionKind::CyclicWrite,
            Request::ReadModifyWrite { .. } => TransactionKind::ReadModifyWrite,
        }
    }

    pub fn addr(&self) -> u32 {
        match self {
            Request::Read { addr }
            | Request::Write { addr, .. }
            | Request::BlockRead { addr, .. }
            | Request::BlockWrite { addr, .. }
            | Request::CyclicRead { addr, .. }
            | Request::CyclicWrite { addr, .. }
            | Request::ReadModifyWrite { addr, .. } => *addr,
        }
    }

    /// Number of transfer elements (1 for single and RMW transactions).
    pub fn count(&self) -> usize {
        match self {
            Request::BlockRead { count, .. } | Request::CyclicRead { count, .. } => *count,
            Request::BlockWrite { data, .. } | Request::CyclicWrite { data, .. } => data.len(),
            _ => 1,
        }
    }

    /// Payload words following the address field.
    fn payload(&self) -> &[u32] {
        match self {
            Request::Write { data, .. } => std::slice::from_ref(data),
            Request::BlockWrite { data, .. } | Request::CyclicWrite { data, .. } => data,
            _ => &[],
        }
    }

    /// Total wire size of this request.
    pub fn wire_size(&self, width: AddressWidth) -> usize {
        let words = match self {
            Request::ReadModifyWrite { .. } => 2,
            other => other.payload().len(),
        };
        1 + width.bytes() + words * WORD_SIZE
    }
}

/// Pack a header byte: kind in bits [7:5], `count - 1` in bits [4:0].
///
/// Counts above 32 do not fit the size field and are truncated to its low
/// five bits; `count` must be at least 1.
pub fn header_byte(kind: TransactionKind, count: usize) -> u8 {
    let size = if kind.is_multi() {
        (count.saturating_sub(1) as u8) & SIZE_FIELD_MASK
    } else {
        0
    };
    (kind.code() << KIND_SHIFT) | size
}

/// Encode a request into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬────────────────────┬──────────────────────────────┐
/// │ Header   │ Address            │ Payload                      │
/// │ kind|size│ (1-4B BE)          │ (0, 1, count or 2 words BE)  │
/// └──────────┴────────────────────┴──────────────────────────────┘
/// ```
pub fn encode_request(request: &Request, width: AddressWidth, dst: &mut BytesMut) -> Result<()> {
    width.check(u64::from(request.addr()))?;

    let count = request.count();
    if request.kind().is_multi() && !(1..=MAX_TRANSFER_COUNT).contains(&count) {
        return Err(FrameError::CountOutOfRange(count));
    }

    dst.reserve(request.wire_size(width));
    dst.put_u8(header_byte(request.kind(), count));
    dst.put_uint(u64::from(request.addr()), width.bytes());
    match request {
        Request::ReadModifyWrite { data, mask, .. } => {
            dst.put_u32(*data);
            dst.put_u32(*mask);
        }
        other => {
            for word in other.payload() {
                dst.put_u32(*word);
            }
        }
    }
    Ok(())
}

/// Decode a request from a buffer, as the peripheral side sees it.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete request yet.
/// On success, consumes the request bytes from the buffer. The element count
/// is recovered from the 5-bit size field, so it is always in 1..=32.
pub fn decode_request(src: &mut BytesMut, width: AddressWidth) -> Result<Option<Request>> {
    let Some(&header) = src.first() else {
        return Ok(None);
    };

    let code = header >> KIND_SHIFT;
    let kind = TransactionKind::from_code(code).ok_or(FrameError::UnknownKind(code))?;
    let count = usize::from(header & SIZE_FIELD_MASK) + 1;

    let payload_words = match kind {
        TransactionKind::Write => 1,
        TransactionKind::BlockWrite | TransactionKind::CyclicWrite => count,
        TransactionKind::ReadModifyWrite => 2,
        _ => 0,
    };
    let total = 1 + width.bytes() + payload_words * WORD_SIZE;
    if src.len() < total {
        return Ok(None);
    }

    src.advance(1);
    let addr = src.get_uint(width.bytes()) as u32;
    let request = match kind {
        TransactionKind::Read => Request::Read { addr },
        TransactionKind::Write => Request::Write {
            addr,
            data: src.get_u32(),
        },
        TransactionKind::BlockRead => Request::BlockRead { addr, count },
        TransactionKind::CyclicRead => Request::CyclicRead { addr, count },
        TransactionKind::BlockWrite => Request::BlockWrite {
            addr,
            data: (0..count).map(|_| src.get_u32()).collect(),
        },
        TransactionKind::CyclicWrite => Request::CyclicWrite {
            addr,
            data: (0..count).map(|_| src.get_u32()).collect(),
        },
        TransactionKind::ReadModifyWrite => Request::ReadModifyWrite {
            addr,
            data: src.get_u32(),
            mask: src.get_u32(),
        },
    };
    Ok(Some(request))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(request: &Request, width: u8) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_request(request, AddressWidth::new(width).unwrap(), &mut buf).unwrap();
        buf.to_vec()
    }

    #[test]
    fn address_width_bounds() {
        assert!(matches!(
            AddressWidth::new(0),
            Err(FrameError::InvalidAddressWidth(0))
        ));
        assert!(matches!(
            AddressWidth::new(5),
            Err(FrameError::InvalidAddressWidth(5))
        ));
        assert_eq!(AddressWidth::new(1).unwrap().max_address(), 0xFF);
        assert_eq!(AddressWidth::new(4).unwrap().max_address(), 0xFFFF_FFFF);
        assert_eq!(AddressWidth::default().bytes(), 4);
    }

    #[test]
    fn byte_address_is_register_times_four() {
        let width = AddressWidth::new(2).unwrap();
        assert_eq!(width.byte_address(0x10).unwrap(), 0x40);
        assert_eq!(width.byte_address(0x3FFF).unwrap(), 0xFFFC);
        assert!(matches!(
            width.byte_address(0x4000),
            Err(FrameError::AddressOutOfRange {
                addr: 0x10000,
                max: 0xFFFF
            })
        ));
    }

    #[test]
    fn byte_address_shift_does_not_overflow() {
        let width = AddressWidth::new(4).unwrap();
        assert_eq!(width.byte_address(0x3FFF_FFFF).unwrap(), 0xFFFF_FFFC);
        assert!(matches!(
            width.byte_address(u32::MAX),
            Err(FrameError::AddressOutOfRange { .. })
        ));
    }

    #[test]
    fn read_frame_per_width() {
        let req = Request::Read { addr: 0x40 };
        assert_eq!(encode(&req, 1), [0x00, 0x40]);
        assert_eq!(encode(&req, 2), [0x00, 0x00, 0x40]);
        assert_eq!(encode(&req, 3), [0x00, 0x00, 0x00, 0x40]);
        assert_eq!(encode(&req, 4), [0x00, 0x00, 0x00, 0x00, 0x40]);
    }

    #[test]
    fn write_frame_layout() {
        let req = Request::Write {
            addr: 0x1234,
            data: 0xDEAD_BEEF,
        };
        assert_eq!(encode(&req, 2), [0x20, 0x12, 0x34, 0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(req.wire_size(AddressWidth::new(2).unwrap()), 7);
    }

    #[test]
    fn block_read_header_carries_count_minus_one() {
        let req = Request::BlockRead {
            addr: 0x00,
            count: 4,
        };
        assert_eq!(encode(&req, 1), [0b010_00011, 0x00]);
    }

    #[test]
    fn cyclic_write_frame_layout() {
        let req = Request::CyclicWrite {
            addr: 0x400,
            data: vec![0xAA, 0xBB, 0xCC],
        };
        assert_eq!(
            encode(&req, 2),
            [
                0b101_00010,
                0x04,
                0x00,
                0x00,
                0x00,
                0x00,
                0xAA,
                0x00,
                0x00,
                0x00,
                0xBB,
                0x00,
                0x00,
                0x00,
                0xCC
            ]
        );
    }

    #[test]
    fn rmw_frame_carries_data_then_mask() {
        let req = Request::ReadModifyWrite {
            addr: 0x40,
            data: 0x0000_00FF,
            mask: 0x0000_000F,
        };
        assert_eq!(
            encode(&req, 1),
            [0xC0, 0x40, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00, 0x0F]
        );
    }

    #[test]
    fn block_write_of_256_sets_size_field_to_all_ones() {
        let req = Request::BlockWrite {
            addr: 0,
            data: vec![0; 256],
        };
        let bytes = encode(&req, 4);
        assert_eq!(bytes[0], 0b011_11111);
        assert_eq!(bytes[0] & SIZE_FIELD_MASK, 0x1F);
        assert_eq!(bytes.len(), 1 + 4 + 256 * WORD_SIZE);
    }

    #[test]
    fn header_ignores_count_for_single_kinds() {
        assert_eq!(header_byte(TransactionKind::Read, 7), 0x00);
        assert_eq!(header_byte(TransactionKind::ReadModifyWrite, 1), 0xC0);
        assert_eq!(header_byte(TransactionKind::CyclicRead, 32), 0b100_11111);
        assert_eq!(header_byte(TransactionKind::CyclicRead, 33), 0b100_00000);
    }

    #[test]
    fn encode_rejects_bad_counts() {
        let width = AddressWidth::default();
        let mut buf = BytesMut::new();
        for count in [0, MAX_TRANSFER_COUNT + 1] {
            let err = encode_request(&Request::BlockRead { addr: 0, count }, width, &mut buf);
            assert!(matches!(err, Err(FrameError::CountOutOfRange(c)) if c == count));
        }
        let err = encode_request(
            &Request::CyclicWrite {
                addr: 0,
                data: Vec::new(),
            },
            width,
            &mut buf,
        );
        assert!(matches!(err, Err(FrameError::CountOutOfRange(0))));
        assert!(buf.is_empty());
    }

    #[test]
    fn encode_rejects_address_beyond_width() {
        let mut buf = BytesMut::new();
        let err = encode_request(
            &Request::Read { addr: 0x100 },
            AddressWidth::new(1).unwrap(),
            &mut buf,
        );
        assert!(matches!(err, Err(FrameError::AddressOutOfRange { .. })));
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_waits_for_complete_request() {
        let width = AddressWidth::new(2).unwrap();
        let mut buf = BytesMut::new();
        assert!(decode_request(&mut buf, width).unwrap().is_none());

        buf.extend_from_slice(&[0x20, 0x00, 0x40, 0x01]);
        assert!(decode_request(&mut buf, width).unwrap().is_none());
        assert_eq!(buf.len(), 4);

        buf.extend_from_slice(&[0x02, 0x03, 0x04]);
        let req = decode_request(&mut buf, width).unwrap().unwrap();
        assert_eq!(
            req,
            Request::Write {
                addr: 0x40,
                data: 0x0102_0304
            }
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_back_to_back_requests() {
        let width = AddressWidth::new(3).unwrap();
        let first = Request::BlockWrite {
            addr: 0x10,
            data: vec![1, 2, 3],
        };
        let second = Request::ReadModifyWrite {
            addr: 0x20,
            data: 0xF,
            mask: 0xF,
        };
        let mut buf = BytesMut::new();
        encode_request(&first, width, &mut buf).unwrap();
        encode_request(&second, width, &mut buf).unwrap();

        assert_eq!(decode_request(&mut buf, width).unwrap(), Some(first));
        assert_eq!(decode_request(&mut buf, width).unwrap(), Some(second));
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_rejects_unassigned_kind() {
        let mut buf = BytesMut::from(&[0xE0, 0x00][..]);
        let err = decode_request(&mut buf, AddressWidth::new(1).unwrap());
        assert!(matches!(err, Err(FrameError::UnknownKind(0b111))));
    }

    #[test]
    fn status_error_bit() {
        assert!(!Status::OK.is_error());
        assert!(Status::SLVERR.is_error());
        assert!(Status::from_byte(0xFF).is_error());
        assert!(!Status::from_byte(0x7F).is_error());
        assert_eq!(Status::from_byte(0x81).raw(), 0x81);
    }
}
