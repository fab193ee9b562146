use crate::cmd::{open_bridge, ConnectionArgs, ValuesArgs, WriteArgs};
use crate::exit::{bridge_error, CliResult, SUCCESS};
use crate::output::{print_ack, OutputFormat};

pub fn run_single(args: WriteArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut bridge = open_bridge(conn)?;
    bridge
        .write(args.register, args.value)
        .map_err(|err| bridge_error("write failed", err))?;
    print_ack("write", args.register, 1, format);
    Ok(SUCCESS)
}

pub fn run_block(args: ValuesArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut bridge = open_bridge(conn)?;
    bridge
        .block_write(args.register, &args.values)
        .map_err(|err| bridge_error("block write failed", err))?;
    print_ack("block_write", args.register, args.values.len(), format);
    Ok(SUCCESS)
}

pub fn run_cyclic(args: ValuesArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut bridge = open_bridge(conn)?;
    bridge
        .cyclic_write(args.register, &args.values)
        .map_err(|err| bridge_error("cyclic write failed", err))?;
    print_ack("cyclic_write", args.register, args.values.len(), format);
    Ok(SUCCESS)
}
