//! Loopback device: serves the bridge protocol over TCP from a simulated
//! register file, for trying the CLI without hardware.
//!
//! Run with:
//!   cargo run --example loopback-device --features sim -- 127.0.0.1:7070
//!
//! In another terminal:
//!   cargo run --features cli -- --target tcp://127.0.0.1:7070 block-read 0 --count 4

use std::io::{self, Read, Write};
use std::net::TcpListener;

use apbbridge::bridge::SimulatedPeripheral;
use apbbridge::frame::AddressWidth;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bind = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:7070".to_string());
    let listener = TcpListener::bind(&bind)?;
    eprintln!("Listening on {}", listener.local_addr()?);

    for conn in listener.incoming() {
        let mut conn = conn?;
        eprintln!("Host connected: {}", conn.peer_addr()?);

        // Fresh register file per connection; register 0 is a read-only ID.
        let mut device = SimulatedPeripheral::new(AddressWidth::default())
            .with_register(0x00, 0xC0DE_0001)
            .with_read_only(0x00);

        let mut buf = [0u8; 1024];
        loop {
            let n = match conn.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    eprintln!("Host disconnected: {e}");
                    break;
                }
            };
            if let Err(e) = device.write_all(&buf[..n]) {
                eprintln!("Rejected request: {e}");
                break;
            }
            io::copy(&mut device, &mut conn)?;
        }
        eprintln!("Handled {} request(s)", device.frames().len());
    }

    Ok(())
}
