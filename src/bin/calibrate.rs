//! Offline calibration CLI: derives a [`voxforensics::PipelineConfig`] from a
//! labeled corpus and writes it to disk.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use voxforensics::calibration::{self, CalibrationOptions};

#[derive(Parser, Debug)]
#[command(name = "calibrate", about = "Calibrate sensor thresholds, weights, and veto levels from a labeled corpus")]
struct Args {
    /// Directory containing `organic/*.wav` and `synthetic/*.wav` subdirectories.
    #[arg(long)]
    corpus_dir: PathBuf,

    /// Path to write the calibrated configuration JSON to.
    #[arg(long)]
    out: PathBuf,

    /// Percentile of organic scores used as each sensor's threshold.
    #[arg(long, default_value_t = 99)]
    percentile: usize,

    /// Target false-positive rate for veto threshold calibration.
    #[arg(long, default_value_t = 0.05)]
    target_fpr: f64,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let options = CalibrationOptions { percentile: args.percentile, target_fpr: args.target_fpr };

    let config = match calibration::calibrate(&args.corpus_dir, &options) {
        Ok(config) => config,
        Err(e) => {
            error!("calibration failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = calibration::persist::save(&config, &args.out) {
        error!("failed to write calibrated configuration: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
