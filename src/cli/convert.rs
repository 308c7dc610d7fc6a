use anyhow::{Context, Result};
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use hcs_converters::aggregation::CollectionAggregator;
use hcs_converters::logging::{RunLogger, DEFAULT_TARGET};
use hcs_converters::model::AcquisitionModel;
use hcs_converters::parser::{parse_acquisitions, AcquisitionParser, OnAcquisitionError};

/// Parse every acquisition with `parser` and report the resulting images
pub fn run<P: AcquisitionParser>(
    parser: &P,
    acquisitions: &[P::Acquisition],
    on_error: OnAcquisitionError,
    output: Option<PathBuf>,
) -> Result<()> {
    info!("hcs-convert - {} metadata", parser.vendor());
    info!("==================================");
    info!("Acquisitions: {}", acquisitions.len());
    for acquisition in acquisitions {
        info!(
            "  [{}] {} (plate {})",
            acquisition.acquisition_id(),
            acquisition.path(),
            acquisition.plate_name()
        );
    }
    info!("On error: {:?}", on_error);

    let log = RunLogger::new(format!(
        "{}::{}",
        DEFAULT_TARGET,
        parser.vendor().to_lowercase()
    ));
    let images = parse_acquisitions(parser, acquisitions, &CollectionAggregator, on_error, &log)
        .with_context(|| format!("Failed to parse {} acquisitions", parser.vendor()))?;

    info!("Parsing complete!");
    info!("  Images: {}", images.len());
    info!(
        "  Tiles: {}",
        images.iter().map(|image| image.tiles.len()).sum::<usize>()
    );
    for image in &images {
        info!(
            "  {}: {} tiles ({})",
            image.path(),
            image.tiles.len(),
            image.fov_names().join(", ")
        );
    }

    let warnings = log.warning_count();
    if warnings > 0 {
        warn!("{} warnings emitted during parsing", warnings);
    }

    if let Some(output) = output {
        let file = File::create(&output)
            .with_context(|| format!("Failed to create output file: {}", output.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &images)
            .context("Failed to serialize tiled images")?;
        writer
            .flush()
            .with_context(|| format!("Failed to write output file: {}", output.display()))?;
        info!("Wrote {}", output.display());
    }

    Ok(())
}
