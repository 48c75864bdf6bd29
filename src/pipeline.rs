//! Pipeline — construction and the `analyze` entry point (§6).

use std::collections::HashMap;
use std::time::Duration;

use log::info;

use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::fusion::{FusionEngine, FusionResult};
use crate::physics::PhysicsStage;
use crate::preprocessor::{self, CANONICAL_SAMPLE_RATE};
use crate::sensors::bandwidth::BandwidthSensor;
use crate::sensors::breath::BreathSensor;
use crate::sensors::coarticulation::CoarticulationSensor;
use crate::sensors::digital_silence::DigitalSilenceSensor;
use crate::sensors::dynamic_range::DynamicRangeSensor;
use crate::sensors::formant_trajectory::FormantTrajectorySensor;
use crate::sensors::glottal_inertia::GlottalInertiaSensor;
use crate::sensors::global_formants::GlobalFormantsSensor;
use crate::sensors::hf_deepfake::HfDeepfakeSensor;
use crate::sensors::pitch_velocity::PitchVelocitySensor;
use crate::sensors::prosodic_continuity::ProsodicContinuitySensor;
use crate::sensors::{Registry, SensorContext};
use crate::stages::{self, StageResult};

pub struct Pipeline {
    registry: Registry,
    config: PipelineConfig,
    fusion: FusionEngine,
}

impl Pipeline {
    /// Sensors, profiles, and stage weights are frozen at construction
    /// (§3 "Lifecycles"); `analyze` never re-reads configuration.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let registry = build_registry(&config);
        info!("pipeline constructed with {} sensors, profiles={:?}", registry.len(), config.fusion.profiles.keys().collect::<Vec<_>>());
        let fusion = FusionEngine::new(config.fusion.veto);
        Ok(Self { registry, config, fusion })
    }

    pub fn with_default_config() -> Self {
        Self::new(PipelineConfig::default_config()).expect("built-in default configuration is always valid")
    }

    pub fn analyze(&self, raw: &[f32], input_rate: u32, channels: u32, deadline: Option<Duration>) -> Result<FusionResult, PipelineError> {
        let prepared = preprocessor::prepare(raw, input_rate, channels)?;
        let context = SensorContext { deadline };

        let default_profile = self
            .config
            .fusion
            .profiles
            .get("default")
            .expect("config validation guarantees a 'default' profile");
        let narrowband_profile = self
            .config
            .fusion
            .profiles
            .get("narrowband")
            .unwrap_or(default_profile);

        let physics_stage = PhysicsStage::new(default_profile, narrowband_profile);
        let physics_result = physics_stage.run(&self.registry, &prepared.samples, CANONICAL_SAMPLE_RATE, &context);

        let mut stage_results: HashMap<String, StageResult> = HashMap::new();
        stage_results.insert("physics".to_string(), StageResult::ok(physics_result.physics_score));
        stage_results.insert("feature".to_string(), stages::feature::run(&prepared.samples, CANONICAL_SAMPLE_RATE));
        stage_results.insert("temporal".to_string(), stages::temporal::run(&prepared.samples, CANONICAL_SAMPLE_RATE));
        stage_results.insert("artifact".to_string(), stages::artifact::run(&prepared.samples, CANONICAL_SAMPLE_RATE));
        stage_results.insert("neural".to_string(), stages::neural::run(&prepared.samples, CANONICAL_SAMPLE_RATE));

        let active_profile = self
            .config
            .fusion
            .profiles
            .get(&physics_result.profile_used)
            .unwrap_or(default_profile);

        Ok(self.fusion.fuse(
            &stage_results,
            &self.config.fusion.stage_weights,
            physics_result.sensor_results,
            physics_result.profile_used,
            physics_result.rolloff_hz,
            active_profile.thresholds.synthetic,
            active_profile.thresholds.real,
        ))
    }
}

fn threshold_for(config: &PipelineConfig, sensor_name: &str, default: f64) -> Option<f64> {
    Some(*config.sensors.get(sensor_name).unwrap_or(&default))
}

pub(crate) fn build_registry(config: &PipelineConfig) -> Registry {
    let mut registry = Registry::new();
    registry
        .register(Box::new(GlottalInertiaSensor::new(threshold_for(config, "GlottalInertiaSensor", 0.7))))
        .register(Box::new(PitchVelocitySensor::new(threshold_for(config, "PitchVelocitySensor", 0.7))))
        .register(Box::new(DigitalSilenceSensor::new(threshold_for(config, "DigitalSilenceSensor", 0.7))))
        .register(Box::new(FormantTrajectorySensor::new(threshold_for(config, "FormantTrajectorySensor", 0.6))))
        .register(Box::new(GlobalFormantsSensor::new(threshold_for(config, "GlobalFormantsSensor", 0.6))))
        .register(Box::new(CoarticulationSensor::new(threshold_for(config, "CoarticulationSensor", 0.6))))
        .register(Box::new(BreathSensor::new(threshold_for(config, "BreathSensor", 0.6))))
        .register(Box::new(DynamicRangeSensor::new(threshold_for(config, "DynamicRangeSensor", 0.6))))
        .register(Box::new(BandwidthSensor::new(threshold_for(config, "BandwidthSensor", 4000.0))))
        .register(Box::new(ProsodicContinuitySensor::new(threshold_for(config, "ProsodicContinuitySensor", 0.7))))
        .register(Box::new(HfDeepfakeSensor::new(threshold_for(config, "HfDeepfakeSensor", 0.8), None)));
    registry
}
