use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One register touched by a transfer.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RegisterValue {
    pub register: u32,
    pub byte_address: String,
    pub value: String,
}

#[derive(Serialize)]
struct TransferOutput<'a> {
    operation: &'a str,
    register: u32,
    count: usize,
    registers: &'a [RegisterValue],
    values: Vec<u32>,
}

#[derive(Serialize)]
struct AckOutput<'a> {
    operation: &'a str,
    register: u32,
    count: usize,
    status: &'a str,
}

/// Pair each value with the register it came from. `step` is 1 for block
/// transfers and 0 for cyclic ones.
pub fn register_values(register: u32, step: u32, values: &[u32]) -> Vec<RegisterValue> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let register = register.wrapping_add(step.wrapping_mul(i as u32));
            RegisterValue {
                register,
                byte_address: format!("{:#010X}", u64::from(register) << 2),
                value: format!("{value:#010X}"),
            }
        })
        .collect()
}

pub fn print_values(
    operation: &str,
    register: u32,
    step: u32,
    values: &[u32],
    format: OutputFormat,
) {
    let rows = register_values(register, step, values);
    match format {
        OutputFormat::Json => {
            let out = TransferOutput {
                operation,
                register,
                count: values.len(),
                registers: &rows,
                values: values.to_vec(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["REGISTER", "BYTE ADDRESS", "VALUE"]);
            for row in &rows {
                table.add_row(vec![
                    format!("{:#X}", row.register),
                    row.byte_address.clone(),
                    row.value.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in &rows {
                println!("{} = {}", row.byte_address, row.value);
            }
        }
    }
}

pub fn print_ack(operation: &str, register: u32, count: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = AckOutput {
                operation,
                register,
                count,
                status: "ok",
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["OPERATION", "REGISTER", "COUNT", "STATUS"])
                .add_row(vec![
                    operation.to_string(),
                    format!("{register:#X}"),
                    count.to_string(),
                    "ok".to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{operation} {register:#X} x{count}: ok");
        }
    }
}
