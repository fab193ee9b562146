//! In-process model of the FPGA side of the bridge.
//!
//! [`SimulatedPeripheral`] implements `Read + Write`: request frames written
//! to it are decoded and executed against a register file, and the protocol
//! response is queued for the next reads. Reading past the queued response
//! returns EOF, like a closed stream.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io::{self, Read, Write};

use apbbridge_frame::{decode_request, AddressWidth, Request, Status};
use bytes::BytesMut;
use tracing::trace;

/// A register file behind the bridge. Addresses are byte addresses.
#[derive(Debug)]
pub struct SimulatedPeripheral {
    width: AddressWidth,
    registers: BTreeMap<u32, u32>,
    read_faults: BTreeSet<u32>,
    write_faults: BTreeSet<u32>,
    rx: BytesMut,
    tx: VecDeque<u8>,
    frames: Vec<Request>,
}

impl SimulatedPeripheral {
    pub fn new(width: AddressWidth) -> Self {
        Self {
            width,
            registers: BTreeMap::new(),
            read_faults: BTreeSet::new(),
            write_faults: BTreeSet::new(),
            rx: BytesMut::new(),
            tx: VecDeque::new(),
            frames: Vec::new(),
        }
    }

    /// Preload a register.
    pub fn with_register(mut self, addr: u32, value: u32) -> Self {
        self.registers.insert(addr, value);
        self
    }

    /// Answer SLVERR for every access to `addr`.
    pub fn with_fault(mut self, addr: u32) -> Self {
        self.read_faults.insert(addr);
        self.write_faults.insert(addr);
        self
    }

    /// Answer SLVERR for writes to `addr`; reads succeed.
    pub fn with_read_only(mut self, addr: u32) -> Self {
        self.write_faults.insert(addr);
        self
    }

    /// Current register value; unwritten registers read as zero.
    pub fn register(&self, addr: u32) -> u32 {
        self.registers.get(&addr).copied().unwrap_or(0)
    }

    /// Every request decoded so far, in arrival order.
    pub fn frames(&self) -> &[Request] {
        &self.frames
    }

    /// Response bytes not yet read by the host.
    pub fn pending_response(&self) -> usize {
        self.tx.len()
    }

    fn execute(&mut self, request: &Request) {
        let step = request.kind().address_step();
        let element = |i: usize| request.addr().wrapping_add(step.wrapping_mul(i as u32));

        match request {
            Request::Read { .. } | Request::BlockRead { .. } | Request::CyclicRead { .. } => {
                for i in 0..request.count() {
                    self.read_element(element(i));
                }
            }
            Request::Write { addr, data } => self.write_element(*addr, *data),
            Request::BlockWrite { data, .. } | Request::CyclicWrite { data, .. } => {
                for (i, value) in data.iter().enumerate() {
                    self.write_element(element(i), *value);
                }
            }
            Request::ReadModifyWrite { addr, data, mask } => {
                if self.read_faults.contains(addr) {
                    // The write phase is not attempted after a failed read.
                    self.push_status(Status::SLVERR);
                    self.push_status(Status::SLVERR);
                    return;
                }
                self.push_status(Status::OK);
                let old = self.register(*addr);
                self.write_element(*addr, (old & !mask) | (data & mask));
            }
        }
    }

    fn read_element(&mut self, addr: u32) {
        if self.read_faults.contains(&addr) {
            self.push_status(Status::SLVERR);
            return;
        }
        self.push_status(Status::OK);
        let value = self.register(addr);
        self.tx.extend(value.to_be_bytes());
    }

    fn write_element(&mut self, addr: u32, value: u32) {
        if self.write_faults.contains(&addr) {
            self.push_status(Status::SLVERR);
            return;
        }
        self.registers.insert(addr, value);
        self.push_status(Status::OK);
    }

    fn push_status(&mut self, status: Status) {
        self.tx.push_back(status.raw());
    }
}

impl Write for SimulatedPeripheral {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.rx.extend_from_slice(buf);
        while let Some(request) = decode_request(&mut self.rx, self.width)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?
        {
            trace!(?request, "simulated peripheral executing request");
            self.execute(&request);
            self.frames.push(request);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for SimulatedPeripheral {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.tx.len());
        for (slot, byte) in buf.iter_mut().zip(self.tx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use apbbridge_frame::{encode_request, RequestWriter};

    use super::*;

    fn width(bytes: u8) -> AddressWidth {
        AddressWidth::new(bytes).unwrap()
    }

    fn response(sim: &mut SimulatedPeripheral) -> Vec<u8> {
        let mut out = Vec::new();
        sim.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn read_unknown_register_returns_zero() {
        let mut sim = SimulatedPeripheral::new(width(1));
        sim.write_all(&[0x00, 0x10]).unwrap();
        assert_eq!(response(&mut sim), [0x00, 0, 0, 0, 0]);
    }

    #[test]
    fn request_split_across_writes_is_reassembled() {
        let mut sim = SimulatedPeripheral::new(width(2));
        sim.write_all(&[0x20, 0x00]).unwrap();
        assert!(sim.frames().is_empty());
        sim.write_all(&[0x40, 0xDE, 0xAD, 0xBE, 0xEF]).unwrap();

        assert_eq!(sim.frames().len(), 1);
        assert_eq!(sim.register(0x40), 0xDEAD_BEEF);
        assert_eq!(response(&mut sim), [0x00]);
    }

    #[test]
    fn faulted_read_has_no_data() {
        let mut sim = SimulatedPeripheral::new(width(1))
            .with_register(0x04, 9)
            .with_fault(0x08);
        let mut writer = RequestWriter::new(width(1));
        writer
            .send(&mut sim, &Request::BlockRead { addr: 0x04, count: 2 })
            .unwrap();
        assert_eq!(response(&mut sim), [0x00, 0, 0, 0, 9, 0x80]);
    }

    #[test]
    fn rmw_read_fault_fails_both_phases() {
        let mut sim = SimulatedPeripheral::new(width(1))
            .with_register(0x40, 0xAB)
            .with_fault(0x40);
        let mut buf = BytesMut::new();
        encode_request(
            &Request::ReadModifyWrite {
                addr: 0x40,
                data: 0,
                mask: 0xFF,
            },
            width(1),
            &mut buf,
        )
        .unwrap();
        sim.write_all(&buf).unwrap();

        assert_eq!(response(&mut sim), [0x80, 0x80]);
        assert_eq!(sim.register(0x40), 0xAB);
    }

    #[test]
    fn unassigned_kind_is_invalid_data() {
        let mut sim = SimulatedPeripheral::new(width(1));
        let err = sim.write(&[0xE0, 0x00]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn reading_past_response_is_eof() {
        let mut sim = SimulatedPeripheral::new(width(1));
        let mut buf = [0u8; 4];
        assert_eq!(sim.read(&mut buf).unwrap(), 0);
    }
}
