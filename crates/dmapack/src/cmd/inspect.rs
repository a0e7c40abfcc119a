use crate::cmd::{load_schema, InspectArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_layout, OutputFormat};

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let schema = load_schema(&args.layout)?;
    print_layout(&schema, format);
    Ok(SUCCESS)
}
