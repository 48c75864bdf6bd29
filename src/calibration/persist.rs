//! Versioned persistence of a calibrated [`PipelineConfig`] (§4.5, §6).

use std::path::Path;

use chrono::Utc;
use log::info;

use crate::config::{CalibrationMeta, PipelineConfig};
use crate::errors::PipelineError;

pub fn stamp_meta(config: &mut PipelineConfig, dataset_fingerprint: String) {
    config.meta = CalibrationMeta {
        calibrated_at: Utc::now().to_rfc3339(),
        dataset_fingerprint,
    };
}

pub fn save(config: &PipelineConfig, path: &Path) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(config).map_err(|e| PipelineError::ConfigParse(e.to_string()))?;
    std::fs::write(path, json).map_err(|source| PipelineError::ConfigIo { path: path.display().to_string(), source })?;
    info!("wrote calibrated configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_meta_sets_fingerprint() {
        let mut config = PipelineConfig::default_config();
        stamp_meta(&mut config, "abc123".to_string());
        assert_eq!(config.meta.dataset_fingerprint, "abc123");
        assert_ne!(config.meta.calibrated_at, "unset");
    }

    #[test]
    fn test_save_rejects_unwritable_path() {
        let config = PipelineConfig::default_config();
        let result = save(&config, Path::new("/nonexistent/dir/out.json"));
        assert!(matches!(result, Err(PipelineError::ConfigIo { .. })));
    }
}
