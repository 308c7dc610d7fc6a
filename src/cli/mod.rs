use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use hcs_converters::formats::cq3k::{Cq3kAcquisition, Cq3kParser};
use hcs_converters::formats::operetta::{OperettaAcquisition, OperettaParser};
use hcs_converters::formats::scanr::{ScanRAcquisition, ScanRParser};
use hcs_converters::model::{AcquisitionInput, AcquisitionOptions, PlateLayout};
use hcs_converters::parser::OnAcquisitionError;

mod config;
mod convert;

pub use config::RunConfig;

/// hcs-convert - High-content screening metadata to tile descriptors
#[derive(Parser)]
#[command(name = "hcs-convert")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Plate layout used to decode ScanR well numbers.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum LayoutArg {
    /// 4 x 6 wells
    #[value(name = "24-well")]
    Wells24,
    /// 6 x 8 wells
    #[value(name = "48-well")]
    Wells48,
    /// 8 x 12 wells
    #[default]
    #[value(name = "96-well")]
    Wells96,
    /// 16 x 24 wells
    #[value(name = "384-well")]
    Wells384,
}

impl From<LayoutArg> for PlateLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Wells24 => PlateLayout::Wells24,
            LayoutArg::Wells48 => PlateLayout::Wells48,
            LayoutArg::Wells96 => PlateLayout::Wells96,
            LayoutArg::Wells384 => PlateLayout::Wells384,
        }
    }
}

/// Options shared by every vendor subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct AcquisitionArgs {
    /// Load acquisitions and the failure policy from a TOML run file
    #[arg(long, value_name = "FILE", conflicts_with = "paths")]
    config: Option<PathBuf>,

    /// Acquisition directory (repeat for several acquisitions of one plate)
    #[arg(long = "path", value_name = "DIR")]
    paths: Vec<String>,

    /// Plate name (defaults to the last path component)
    #[arg(long)]
    plate_name: Option<String>,

    /// Id of the first acquisition; further paths count up from it
    #[arg(long, default_value_t = 0)]
    acquisition_id: u32,

    /// CSV file mapping wells to experimental conditions
    #[arg(long, value_name = "CSV")]
    condition_table: Option<PathBuf>,

    /// Skip acquisitions that fail to parse instead of aborting
    #[arg(long)]
    skip_failed: bool,

    /// Write the tiled images as JSON
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl AcquisitionArgs {
    /// Acquisitions and failure policy, from the run file or the flags
    fn acquisitions<A, F>(&self, build: F) -> Result<(Vec<A>, OnAcquisitionError)>
    where
        A: serde::de::DeserializeOwned,
        F: Fn(AcquisitionInput) -> A,
    {
        let (acquisitions, on_error) = match &self.config {
            Some(path) => {
                let config = RunConfig::<A>::from_file(path)?;
                (config.acquisitions, config.on_error)
            }
            None => {
                let advanced = AcquisitionOptions {
                    condition_table_path: self.condition_table.clone(),
                    ..Default::default()
                };
                let acquisitions = self
                    .paths
                    .iter()
                    .zip(self.acquisition_id..)
                    .map(|(path, id)| {
                        build(
                            AcquisitionInput::new(path.as_str())
                                .with_plate_name(self.plate_name.clone())
                                .with_acquisition_id(id)
                                .with_advanced(advanced.clone()),
                        )
                    })
                    .collect();
                (acquisitions, OnAcquisitionError::default())
            }
        };

        let on_error = if self.skip_failed {
            OnAcquisitionError::Skip
        } else {
            on_error
        };
        Ok((acquisitions, on_error))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse Yokogawa CQ3K acquisitions
    Cq3k {
        #[command(flatten)]
        args: AcquisitionArgs,
    },

    /// Parse Olympus ScanR acquisitions
    Scanr {
        #[command(flatten)]
        args: AcquisitionArgs,

        /// Plate layout for --path acquisitions (run files set it per acquisition)
        #[arg(long, default_value = "96-well", value_enum)]
        layout: LayoutArg,
    },

    /// Parse PerkinElmer Operetta acquisitions
    Operetta {
        #[command(flatten)]
        args: AcquisitionArgs,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Cq3k { args } => {
            let (acquisitions, on_error) = args.acquisitions(Cq3kAcquisition::new)?;
            convert::run(&Cq3kParser, &acquisitions, on_error, args.output)
        }
        Commands::Scanr { args, layout } => {
            let layout = PlateLayout::from(layout);
            let (acquisitions, on_error) =
                args.acquisitions(|input| ScanRAcquisition::new(input, layout))?;
            convert::run(&ScanRParser, &acquisitions, on_error, args.output)
        }
        Commands::Operetta { args } => {
            let (acquisitions, on_error) = args.acquisitions(OperettaAcquisition::new)?;
            convert::run(&OperettaParser, &acquisitions, on_error, args.output)
        }
    }
}
