use std::sync::Arc;

use crate::{
    bridge::GeometryBridge,
    error::Result,
    optimizer::{SafeZoneConfig, SafeZoneOptimizer},
};

/// Builder for [`SafeZoneOptimizer`] with a fluent API
pub struct SafeZoneOptimizerBuilder {
    config: SafeZoneConfig,
    bridge: Option<GeometryBridge>,
}

impl SafeZoneOptimizerBuilder {
    /// Create a builder holding the default configuration
    pub fn new() -> Self {
        Self {
            config: SafeZoneConfig::default(),
            bridge: None,
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: SafeZoneConfig) -> Self {
        self.config = config;
        self
    }

    /// Safety margin around protected regions, in pixels
    pub fn margin(mut self, margin: u32) -> Self {
        self.config.margin = margin;
        self
    }

    /// Simplification tolerance; negative values clamp to 0
    pub fn simplify_tolerance(mut self, tolerance: f64) -> Self {
        self.config.simplify_tolerance = tolerance.max(0.0);
        self
    }

    /// Minimum safe zone area; negative values clamp to 0
    pub fn min_area(mut self, area: f64) -> Self {
        self.config.min_area = area.max(0.0);
        self
    }

    /// Use a specific bridge instead of the process-wide default
    pub fn with_bridge(mut self, bridge: GeometryBridge) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Validate the configuration and build the optimizer
    pub fn build(self) -> Result<SafeZoneOptimizer> {
        self.config.validate()?;

        Ok(SafeZoneOptimizer {
            config: self.config,
            bridge: Arc::new(self.bridge.unwrap_or_default()),
        })
    }
}

impl Default for SafeZoneOptimizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
