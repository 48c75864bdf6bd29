//! Layered configuration (§4.8, §6). Loaded once at pipeline construction;
//! never touched again while the pipeline runs (§3 "Configuration").

use std::collections::HashMap;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;
use crate::fusion::VetoThresholds;
use crate::profile::FusionProfile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationMeta {
    pub calibrated_at: String,
    pub dataset_fingerprint: String,
}

impl Default for CalibrationMeta {
    fn default() -> Self {
        Self { calibrated_at: "unset".to_string(), dataset_fingerprint: "unset".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    pub profiles: HashMap<String, FusionProfile>,
    pub veto: VetoThresholds,
    pub stage_weights: HashMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Per-sensor calibrated threshold, keyed by sensor name.
    pub sensors: HashMap<String, f64>,
    pub fusion: FusionConfig,
    pub meta: CalibrationMeta,
}

const STAGE_WEIGHT_TOLERANCE: f64 = 1e-6;

impl PipelineConfig {
    /// Documented built-in constants (§4.4, §4.8): usable with zero external
    /// configuration.
    pub fn default_config() -> Self {
        let mut stage_weights = HashMap::new();
        stage_weights.insert("physics".to_string(), 0.5);
        stage_weights.insert("feature".to_string(), 0.15);
        stage_weights.insert("temporal".to_string(), 0.15);
        stage_weights.insert("artifact".to_string(), 0.1);
        stage_weights.insert("neural".to_string(), 0.1);

        let mut profiles = HashMap::new();
        profiles.insert("default".to_string(), FusionProfile::default_wideband());
        profiles.insert("narrowband".to_string(), FusionProfile::default_narrowband());

        Self {
            sensors: HashMap::new(),
            fusion: FusionConfig { profiles, veto: VetoThresholds::default(), stage_weights },
            meta: CalibrationMeta::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let raw = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let config: PipelineConfig = serde_json::from_str(&raw).map_err(|e| PipelineError::ConfigParse(e.to_string()))?;
        config.warn_on_unknown_keys(&raw);
        config.validate()?;
        info!("loaded pipeline configuration from {}", path.display());
        Ok(config)
    }

    /// Forward-compat warning only (§6): unknown keys never reject a load.
    /// Round-trips the parsed config back to a `Value` and diffs top-level
    /// object keys against the original document.
    fn warn_on_unknown_keys(&self, raw: &str) {
        let (Ok(original), Ok(roundtripped)) = (
            serde_json::from_str::<serde_json::Value>(raw),
            serde_json::to_value(self),
        ) else {
            return;
        };
        if let (Some(original_obj), Some(roundtripped_obj)) = (original.as_object(), roundtripped.as_object()) {
            for key in original_obj.keys() {
                if !roundtripped_obj.contains_key(key) {
                    warn!("configuration has unknown top-level key '{key}', ignoring");
                }
            }
        }
    }

    /// §7 "Configuration errors": caught at construction, never at call time.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let sum: f64 = self.fusion.stage_weights.values().sum();
        if (sum - 1.0).abs() > STAGE_WEIGHT_TOLERANCE {
            return Err(PipelineError::StageWeightsInvalid(sum));
        }

        let veto = &self.fusion.veto;
        if !(veto.moderate > 0.0 && veto.moderate < veto.high_confidence && veto.high_confidence <= 1.0) {
            return Err(PipelineError::VetoThresholdsInvalid { moderate: veto.moderate, high: veto.high_confidence });
        }

        for (name, profile) in &self.fusion.profiles {
            if profile.total_raw_weight() <= 0.0 {
                return Err(PipelineError::ProfileWeightsInvalid(name.clone()));
            }
        }

        for required in ["default", "narrowband"] {
            if !self.fusion.profiles.contains_key(required) {
                return Err(PipelineError::ConfigMissingKey(format!("fusion.profiles.{required}")));
            }
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(PipelineConfig::default_config().validate().is_ok());
    }

    #[test]
    fn test_bad_stage_weights_rejected() {
        let mut config = PipelineConfig::default_config();
        config.fusion.stage_weights.insert("physics".to_string(), 0.9);
        assert!(matches!(config.validate(), Err(PipelineError::StageWeightsInvalid(_))));
    }

    #[test]
    fn test_bad_veto_thresholds_rejected() {
        let mut config = PipelineConfig::default_config();
        config.fusion.veto.moderate = 0.9;
        config.fusion.veto.high_confidence = 0.8;
        assert!(matches!(config.validate(), Err(PipelineError::VetoThresholdsInvalid { .. })));
    }

    #[test]
    fn test_zero_weight_profile_rejected() {
        let mut config = PipelineConfig::default_config();
        config.fusion.profiles.get_mut("narrowband").unwrap().weights.clear();
        assert!(matches!(config.validate(), Err(PipelineError::ProfileWeightsInvalid(_))));
    }

    #[test]
    fn test_missing_default_profile_rejected() {
        let mut config = PipelineConfig::default_config();
        config.fusion.profiles.remove("default");
        assert!(matches!(config.validate(), Err(PipelineError::ConfigMissingKey(_))));
    }

    #[test]
    fn test_missing_narrowband_profile_rejected() {
        let mut config = PipelineConfig::default_config();
        config.fusion.profiles.remove("narrowband");
        assert!(matches!(config.validate(), Err(PipelineError::ConfigMissingKey(_))));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = PipelineConfig::load(Path::new("/nonexistent/path/config.json"));
        assert!(matches!(result, Err(PipelineError::ConfigIo { .. })));
    }

    #[test]
    fn test_roundtrip_through_json() {
        let config = PipelineConfig::default_config();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert!(parsed.validate().is_ok());
    }
}
