use tracing::info;

use crate::cmd::{open_bridge, ConnectionArgs, RmwArgs};
use crate::exit::{bridge_error, CliResult, SUCCESS};
use crate::output::{print_ack, OutputFormat};

pub fn run(args: RmwArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut bridge = open_bridge(conn)?;
    bridge
        .rmw(args.register, args.data, args.mask)
        .map_err(|err| bridge_error("rmw failed", err))?;
    info!(
        register = args.register,
        data = format_args!("{:#010X}", args.data),
        mask = format_args!("{:#010X}", args.mask),
        "read-modify-write acknowledged"
    );
    print_ack("rmw", args.register, 1, format);
    Ok(SUCCESS)
}
