//! Nonlinear threshold amplification.
//!
//! Past a critical level, effects grow faster than the shock that drives
//! them. Each rule blends its multiplier in through a logistic of the excess
//! over its level, so the transform is continuous at the level and the
//! identity below it.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub level: f64,
    pub multiplier: f64,
    pub steepness: f64,
}

impl ThresholdRule {
    pub fn new(level: f64, multiplier: f64, steepness: f64) -> Self {
        Self {
            level,
            multiplier,
            steepness,
        }
    }

    /// Blend weight in [0, 1): 0 at the level, rising with the excess.
    pub fn weight(&self, magnitude: f64) -> f64 {
        let excess = magnitude - self.level;
        if excess <= 0.0 {
            return 0.0;
        }
        2.0 / (1.0 + (-self.steepness * excess).exp()) - 1.0
    }

    pub fn apply(&self, value: f64) -> f64 {
        value * (1.0 + (self.multiplier - 1.0) * self.weight(value.abs()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub rules: Vec<ThresholdRule>,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            rules: vec![
                ThresholdRule::new(0.15, 1.5, 5.0), // high-exposure sectors start shedding jobs
                ThresholdRule::new(0.25, 2.5, 8.0), // broad automation
            ],
        }
    }
}

impl ThresholdSet {
    pub fn new(rules: Vec<ThresholdRule>) -> Self {
        Self { rules }
    }

    /// Applies every rule in order, each to the previous output.
    pub fn apply(&self, value: f64) -> f64 {
        self.rules.iter().fold(value, |x, rule| rule.apply(x))
    }

    /// Factor by which `driver` is amplified; 1 for a zero driver.
    pub fn amplification(&self, driver: f64) -> f64 {
        if driver == 0.0 {
            return 1.0;
        }
        self.apply(driver) / driver
    }

    /// Rules that fire while `apply` chains them, so a later rule counts as
    /// soon as the earlier outputs carry the value past its level.
    pub fn active_bands(&self, driver: f64) -> usize {
        let mut value = driver;
        let mut active = 0;
        for rule in &self.rules {
            if value.abs() > rule.level {
                active += 1;
            }
            value = rule.apply(value);
        }
        active
    }
}
