use crate::cmd::{open_bridge, ConnectionArgs, CountArgs, ReadArgs};
use crate::exit::{bridge_error, CliResult, SUCCESS};
use crate::output::{print_values, OutputFormat};

pub fn run_single(args: ReadArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut bridge = open_bridge(conn)?;
    let value = bridge
        .read(args.register)
        .map_err(|err| bridge_error("read failed", err))?;
    print_values("read", args.register, 0, &[value], format);
    Ok(SUCCESS)
}

pub fn run_block(args: CountArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut bridge = open_bridge(conn)?;
    let values = bridge
        .block_read(args.register, args.count)
        .map_err(|err| bridge_error("block read failed", err))?;
    print_values("block_read", args.register, 1, &values, format);
    Ok(SUCCESS)
}

pub fn run_cyclic(args: CountArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut bridge = open_bridge(conn)?;
    let values = bridge
        .cyclic_read(args.register, args.count)
        .map_err(|err| bridge_error("cyclic read failed", err))?;
    print_values("cyclic_read", args.register, 0, &values, format);
    Ok(SUCCESS)
}
