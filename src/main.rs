//! # hcs-convert
//!
//! Command-line front end for the high-content screening metadata parsers.
//!
//! ## Usage
//!
//! ```bash
//! # One CQ3K acquisition, tiles written as JSON
//! hcs-convert -v cq3k --path /data/cq3k/plate_1 --output tiles.json
//!
//! # ScanR on a 384-well plate with a condition table
//! hcs-convert scanr --path /data/scanr/plate_2/data --layout 384-well \
//!     --condition-table conditions.csv
//!
//! # Several Operetta acquisitions described in a run file
//! hcs-convert -vv operetta --config run.toml
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
