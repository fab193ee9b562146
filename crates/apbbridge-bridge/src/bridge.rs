use std::io::{Read, Write};

use apbbridge_frame::{read_status, read_word, AddressWidth, Request, RequestWriter};
use apbbridge_transport::BridgeStream;
use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Operation, Result};

/// Driver for the APB serial bridge over a duplex byte stream.
///
/// Every operation is one complete request/response exchange: the request
/// frame is written, then the whole expected response is consumed before the
/// call returns. On multi-element transfers the response is always drained to
/// the last element, even after a SLVERR, so the stream stays in sync for the
/// next call; the first error seen is the one returned.
///
/// Register arguments are register indices; the byte address on the wire is
/// `register * 4`.
///
/// Operations take `&mut self`. To share a bridge across threads wrap it in a
/// `Mutex`; interleaved frames would corrupt the stream.
pub struct SerialBridge<T> {
    inner: T,
    writer: RequestWriter,
}

impl<T: Read + Write> SerialBridge<T> {
    /// Create a bridge with the given address width (1-4 bytes).
    pub fn new(address_byte_count: u8, inner: T) -> Result<Self> {
        Ok(Self::with_width(AddressWidth::new(address_byte_count)?, inner))
    }

    /// Create a bridge from a configuration. Timeouts are ignored here; they
    /// belong to the stream (see [`SerialBridge::with_config_stream`]).
    pub fn with_config(inner: T, config: &BridgeConfig) -> Result<Self> {
        Ok(Self::with_width(config.validate()?, inner))
    }

    fn with_width(width: AddressWidth, inner: T) -> Self {
        Self {
            inner,
            writer: RequestWriter::new(width),
        }
    }

    /// Read a single register.
    pub fn read(&mut self, register: u32) -> Result<u32> {
        let addr = self.byte_address(register)?;
        self.send(&Request::Read { addr })?;

        let values = self.collect_reads(Operation::Read, addr, 1)?;
        Ok(values[0])
    }

    /// Write a single register.
    pub fn write(&mut self, register: u32, data: u32) -> Result<()> {
        let addr = self.byte_address(register)?;
        self.send(&Request::Write { addr, data })?;
        self.collect_write_status(Operation::Write, addr, &[data])
    }

    /// Read `count` (1-256) consecutive registers starting at `register`.
    pub fn block_read(&mut self, register: u32, count: usize) -> Result<Vec<u32>> {
        let addr = self.byte_address(register)?;
        self.send(&Request::BlockRead { addr, count })?;
        self.collect_reads(Operation::BlockRead, addr, count)
    }

    /// Write 1-256 consecutive registers starting at `register`.
    pub fn block_write(&mut self, register: u32, values: &[u32]) -> Result<()> {
        let addr = self.byte_address(register)?;
        self.send(&Request::BlockWrite {
            addr,
            data: values.to_vec(),
        })?;
        self.collect_write_status(Operation::BlockWrite, addr, values)
    }

    /// Read the same register `count` (1-256) times, e.g. to drain a FIFO.
    pub fn cyclic_read(&mut self, register: u32, count: usize) -> Result<Vec<u32>> {
        let addr = self.byte_address(register)?;
        self.send(&Request::CyclicRead { addr, count })?;
        self.collect_reads(Operation::CyclicRead, addr, count)
    }

    /// Write 1-256 values to the same register, e.g. to fill a FIFO.
    ///
    /// A SLVERR on element `i` is reported at `addr + 4 * i`, as block writes
    /// are, although the physical address does not change.
    pub fn cyclic_write(&mut self, register: u32, values: &[u32]) -> Result<()> {
        let addr = self.byte_address(register)?;
        self.send(&Request::CyclicWrite {
            addr,
            data: values.to_vec(),
        })?;
        self.collect_write_status(Operation::CyclicWrite, addr, values)
    }

    /// Atomic read-modify-write: the peripheral stores
    /// `(old & !mask) | (data & mask)`. Nothing is returned.
    pub fn rmw(&mut self, register: u32, data: u32, mask: u32) -> Result<()> {
        let addr = self.byte_address(register)?;
        self.send(&Request::ReadModifyWrite { addr, data, mask })?;

        let first_error = read_status(&mut self.inner)?
            .is_error()
            .then(|| slave_error(Operation::RmwRead, addr.into(), None));
        let write_phase = match read_status(&mut self.inner) {
            Ok(status) => status,
            Err(err) => return Err(keep_first(first_error, err.into())),
        };

        match first_error {
            Some(err) => Err(err),
            None if write_phase.is_error() => {
                Err(slave_error(Operation::RmwWrite, addr.into(), None))
            }
            None => Ok(()),
        }
    }

    /// Address width this bridge encodes.
    pub fn address_width(&self) -> AddressWidth {
        self.writer.width()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the bridge and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    fn byte_address(&self, register: u32) -> Result<u32> {
        Ok(self.writer.width().byte_address(register)?)
    }

    fn send(&mut self, request: &Request) -> Result<()> {
        debug!(
            kind = %request.kind(),
            addr = format_args!("{:#010X}", request.addr()),
            count = request.count(),
            "issuing bridge transaction"
        );
        self.writer.send(&mut self.inner, request)?;
        Ok(())
    }

    /// Consume `count` status(+data) units. Errored elements carry no data.
    fn collect_reads(
        &mut self,
        operation: Operation,
        addr: u32,
        count: usize,
    ) -> Result<Vec<u32>> {
        let mut values = Vec::with_capacity(count);
        let mut first_error = None;

        for _ in 0..count {
            let status = match read_status(&mut self.inner) {
                Ok(status) => status,
                Err(err) => return Err(keep_first(first_error, err.into())),
            };
            if status.is_error() {
                if first_error.is_none() {
                    first_error = Some(slave_error(operation, addr.into(), None));
                }
                continue;
            }
            match read_word(&mut self.inner) {
                Ok(word) => values.push(word),
                Err(err) => return Err(keep_first(first_error, err.into())),
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(values),
        }
    }

    /// Consume one status byte per written value. Element `i` is reported at
    /// `addr + 4 * i`, computed without wrapping, so it can exceed the
    /// configured address width near the top of the address space.
    fn collect_write_status(
        &mut self,
        operation: Operation,
        addr: u32,
        values: &[u32],
    ) -> Result<()> {
        let mut first_error = None;

        for (idx, &data) in values.iter().enumerate() {
            let status = match read_status(&mut self.inner) {
                Ok(status) => status,
                Err(err) => return Err(keep_first(first_error, err.into())),
            };
            if status.is_error() && first_error.is_none() {
                let element_addr = u64::from(addr) + 4 * idx as u64;
                first_error = Some(slave_error(operation, element_addr, Some(data)));
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl SerialBridge<BridgeStream> {
    /// Create a bridge over a socket stream and apply the configured timeouts.
    pub fn with_config_stream(inner: BridgeStream, config: &BridgeConfig) -> Result<Self> {
        let width = config.validate()?;
        inner.set_read_timeout(config.read_timeout)?;
        inner.set_write_timeout(config.write_timeout)?;
        Ok(Self::with_width(width, inner))
    }
}

impl<T> std::fmt::Debug for SerialBridge<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialBridge")
            .field("address_width", &self.writer.width().bytes())
            .finish_non_exhaustive()
    }
}

/// A transport fault after a SLVERR does not replace the SLVERR.
fn keep_first(first_error: Option<BridgeError>, err: BridgeError) -> BridgeError {
    match first_error {
        Some(first) => {
            warn!(error = %err, "response ended early after SLVERR");
            first
        }
        None => err,
    }
}

fn slave_error(operation: Operation, addr: u64, data: Option<u32>) -> BridgeError {
    warn!(%operation, addr = format_args!("{addr:#010X}"), "peripheral returned SLVERR");
    BridgeError::SlaveError {
        operation,
        addr,
        data,
    }
}
