use std::io::{Read, Write};
use std::time::Duration;

use apbbridge_bridge::{connect, BridgeConfig, SerialBridge, SimulatedPeripheral};
use apbbridge_transport::Target;
use clap::{Args, Subcommand};
use tracing::debug;

use crate::exit::{bridge_error, transport_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod read;
pub mod rmw;
pub mod version;
pub mod write;

/// Target name of the in-process simulated peripheral.
pub const SIM_TARGET: &str = "sim";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read a single register.
    Read(ReadArgs),
    /// Write a single register.
    Write(WriteArgs),
    /// Read consecutive registers.
    BlockRead(CountArgs),
    /// Write consecutive registers.
    BlockWrite(ValuesArgs),
    /// Read one register repeatedly (FIFO drain).
    CyclicRead(CountArgs),
    /// Write one register repeatedly (FIFO fill).
    CyclicWrite(ValuesArgs),
    /// Atomically update the masked bits of a register.
    Rmw(RmwArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Read(args) => read::run_single(args, conn, format),
        Command::BlockRead(args) => read::run_block(args, conn, format),
        Command::CyclicRead(args) => read::run_cyclic(args, conn, format),
        Command::Write(args) => write::run_single(args, conn, format),
        Command::BlockWrite(args) => write::run_block(args, conn, format),
        Command::CyclicWrite(args) => write::run_cyclic(args, conn, format),
        Command::Rmw(args) => rmw::run(args, conn, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where and how to reach the bridge.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Bridge target: tcp://host:port, unix:/path or `sim`.
    #[arg(long, short = 't', env = "APBBRIDGE_TARGET", global = true)]
    pub target: Option<String>,

    /// Address bytes per frame; must match the ADDR_BYTE_COUNT generic.
    #[arg(
        long,
        value_name = "N",
        default_value = "4",
        env = "APBBRIDGE_ADDR_BYTES",
        global = true
    )]
    pub addr_bytes: u8,

    /// Read/write timeout on the stream (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s", env = "APBBRIDGE_TIMEOUT", global = true)]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Register index (byte address = index * 4).
    #[arg(value_parser = parse_u32)]
    pub register: u32,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Register index (byte address = index * 4).
    #[arg(value_parser = parse_u32)]
    pub register: u32,
    /// Value to write.
    #[arg(value_parser = parse_u32)]
    pub value: u32,
}

#[derive(Args, Debug)]
pub struct CountArgs {
    /// First register index.
    #[arg(value_parser = parse_u32)]
    pub register: u32,
    /// Number of transfers (1-256).
    #[arg(long, short = 'n', default_value = "1")]
    pub count: usize,
}

#[derive(Args, Debug)]
pub struct ValuesArgs {
    /// First register index.
    #[arg(value_parser = parse_u32)]
    pub register: u32,
    /// Values to write, in order (1-256).
    #[arg(value_parser = parse_u32, num_args = 1.., required = true)]
    pub values: Vec<u32>,
}

#[derive(Args, Debug)]
pub struct RmwArgs {
    /// Register index.
    #[arg(value_parser = parse_u32)]
    pub register: u32,
    /// New bit values.
    #[arg(long, value_parser = parse_u32)]
    pub data: u32,
    /// Bits to modify (1 = take from data, 0 = keep).
    #[arg(long, value_parser = parse_u32)]
    pub mask: u32,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Any duplex stream the CLI can drive.
pub trait Link: Read + Write {}

impl<T: Read + Write> Link for T {}

pub type CliBridge = SerialBridge<Box<dyn Link>>;

/// Open the bridge described by the connection arguments.
pub fn open_bridge(conn: &ConnectionArgs) -> CliResult<CliBridge> {
    let target = conn
        .target
        .as_deref()
        .ok_or_else(|| CliError::new(USAGE, "no target given (use --target or APBBRIDGE_TARGET)"))?;
    let timeout = parse_duration(&conn.timeout)?;
    let config = BridgeConfig {
        address_byte_count: conn.addr_bytes,
        read_timeout: Some(timeout),
        write_timeout: Some(timeout),
    };

    let link: Box<dyn Link> = if target == SIM_TARGET {
        let width = config
            .validate()
            .map_err(|err| bridge_error("invalid configuration", err))?;
        debug!("using simulated peripheral");
        Box::new(SimulatedPeripheral::new(width))
    } else {
        let target: Target = target
            .parse()
            .map_err(|err| transport_error("invalid target", err))?;
        let bridge = connect(&target, &config)
            .map_err(|err| bridge_error(&format!("connect to {target} failed"), err))?;
        Box::new(bridge.into_inner())
    };

    SerialBridge::with_config(link, &config)
        .map_err(|err| bridge_error("invalid configuration", err))
}

/// Parse a decimal, `0x` hex or `0b` binary 32-bit number. `_` separators
/// are allowed.
pub fn parse_u32(input: &str) -> Result<u32, String> {
    let cleaned = input.trim().replace('_', "");
    let (digits, radix) = if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        (hex, 16)
    } else if let Some(bin) = cleaned
        .strip_prefix("0b")
        .or_else(|| cleaned.strip_prefix("0B"))
    {
        (bin, 2)
    } else {
        (cleaned.as_str(), 10)
    };

    u32::from_str_radix(digits, radix).map_err(|err| format!("invalid number {input:?}: {err}"))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(target: Option<&str>, addr_bytes: u8) -> ConnectionArgs {
        ConnectionArgs {
            target: target.map(str::to_string),
            addr_bytes,
            timeout: "1s".to_string(),
        }
    }

    #[test]
    fn parse_u32_radixes() {
        assert_eq!(parse_u32("16"), Ok(16));
        assert_eq!(parse_u32("0x10"), Ok(16));
        assert_eq!(parse_u32("0XdeadBEEF"), Ok(0xDEAD_BEEF));
        assert_eq!(parse_u32("0b1010"), Ok(10));
        assert_eq!(parse_u32("0xFFFF_FFFF"), Ok(u32::MAX));
    }

    #[test]
    fn parse_u32_rejects_overflow_and_garbage() {
        assert!(parse_u32("0x1_0000_0000").is_err());
        assert!(parse_u32("-1").is_err());
        assert!(parse_u32("0x").is_err());
        assert!(parse_u32("ten").is_err());
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
    }

    #[test]
    fn open_sim_bridge() {
        let mut bridge = open_bridge(&conn(Some(SIM_TARGET), 2)).expect("sim should open");
        bridge.write(0x10, 0x1234).unwrap();
        assert_eq!(bridge.read(0x10).unwrap(), 0x1234);
    }

    #[test]
    fn open_requires_target() {
        let err = open_bridge(&conn(None, 4)).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn open_rejects_bad_width_and_target() {
        assert_eq!(open_bridge(&conn(Some(SIM_TARGET), 5)).unwrap_err().code, USAGE);
        assert_eq!(
            open_bridge(&conn(Some("/dev/ttyUSB0"), 4)).unwrap_err().code,
            USAGE
        );
    }
}
