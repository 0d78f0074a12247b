//! Report every rolling window in which a metric tracks the base metric.
//!
//! Usage: `corr_scan [DATA] [BASE_METRIC]`. Defaults, the window size and the
//! threshold come from `corrview.json` (see `ViewerConfig`).

use std::path::PathBuf;

use anyhow::{Context, Result};

use corrview::analysis::scan;
use corrview::config::ViewerConfig;
use corrview::data::loader;

fn main() -> Result<()> {
    env_logger::init();

    let config = ViewerConfig::load_default();
    let mut args = std::env::args().skip(1);
    let data_path = args.next().map(PathBuf::from).unwrap_or_else(|| config.data_path.clone());
    let base_metric = args.next().unwrap_or_else(|| config.base_metric.clone());

    let dataset = loader::load_file(&data_path, &config.date_column)
        .with_context(|| format!("loading {}", data_path.display()))?;
    log::info!(
        "{}: {} records, scanning {} metrics against {base_metric} (window {}, threshold {:.2})",
        data_path.display(),
        dataset.len(),
        dataset.metric_names().len().saturating_sub(1),
        config.window_size,
        config.correlation_threshold
    );

    let hits = scan(
        &dataset,
        &base_metric,
        config.window_size,
        config.correlation_threshold,
    )?;

    for hit in &hits {
        println!(
            "There is a {:.2} correlation between {base_metric} and {} from {} to {}.",
            hit.value, hit.metric, hit.start_date, hit.end_date
        );
    }
    log::info!("{} windows reported", hits.len());
    Ok(())
}
