//! Setup module for configuring network integration.
//!
//! This module provides the [`IntegrationSetup`] struct and its builder for
//! configuring the step-size control used when a network is integrated across
//! its time grid. It handles:
//!
//! - Error tolerance settings (relative and absolute)
//! - Initial, minimum and maximum number of internal steps
//! - The order of the underlying single-step scheme
//!
//! The time grid itself belongs to the network and is not part of the setup.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::error::SimulationError;

/// Default relative and absolute tolerance
pub const DEFAULT_TOLERANCE: f64 = 1.49012e-8;

/// Configuration for the adaptive integration of a network
///
/// # Fields
///
/// * `rtol` - Relative tolerance for error control (default: 1.49012e-8)
/// * `atol` - Absolute tolerance for error control (default: 1.49012e-8)
/// * `initial_step` - First trial step; derived from the grid spacing when `None`
/// * `min_step` - Smallest permitted internal step (default: 1e-12)
/// * `max_steps` - Maximum number of attempted internal steps (default: 500000)
/// * `order` - Order of the single-step scheme, used to scale step changes (default: 4)
///
/// # Examples
///
/// ```
/// use reaction_kinetics::prelude::IntegrationSetupBuilder;
///
/// let setup = IntegrationSetupBuilder::default()
///     .rtol(1e-6)
///     .atol(1e-9)
///     .build()
///     .unwrap();
///
/// assert_eq!(setup.max_steps, 500_000);
/// assert!(setup.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct IntegrationSetup {
    #[builder(default = "DEFAULT_TOLERANCE")]
    pub rtol: f64,
    #[builder(default = "DEFAULT_TOLERANCE")]
    pub atol: f64,
    #[builder(default = "None")]
    #[serde(default)]
    pub initial_step: Option<f64>,
    #[builder(default = "1e-12")]
    pub min_step: f64,
    #[builder(default = "500_000")]
    pub max_steps: usize,
    #[builder(default = "4")]
    pub order: u32,
}

impl Default for IntegrationSetup {
    fn default() -> Self {
        Self {
            rtol: DEFAULT_TOLERANCE,
            atol: DEFAULT_TOLERANCE,
            initial_step: None,
            min_step: 1e-12,
            max_steps: 500_000,
            order: 4,
        }
    }
}

impl IntegrationSetup {
    /// Creates the default setup with optionally overridden tolerances.
    ///
    /// # Arguments
    ///
    /// * `rtol` - Relative tolerance, default when `None`
    /// * `atol` - Absolute tolerance, default when `None`
    pub fn with_tolerances(rtol: Option<f64>, atol: Option<f64>) -> Self {
        Self {
            rtol: rtol.unwrap_or(DEFAULT_TOLERANCE),
            atol: atol.unwrap_or(DEFAULT_TOLERANCE),
            ..Self::default()
        }
    }

    /// Checks that every setting is usable by the solver.
    ///
    /// # Returns
    ///
    /// * [`SimulationError::InvalidTolerance`] if a tolerance or step size is
    ///   not a positive finite number
    /// * [`SimulationError::InvalidSetup`] if `max_steps` or `order` is zero
    pub fn validate(&self) -> Result<(), SimulationError> {
        positive_finite("rtol", self.rtol)?;
        positive_finite("atol", self.atol)?;
        positive_finite("min_step", self.min_step)?;

        if let Some(step) = self.initial_step {
            positive_finite("initial_step", step)?;
        }

        if self.max_steps == 0 {
            return Err(SimulationError::InvalidSetup(
                "max_steps must be at least 1".to_string(),
            ));
        }

        if self.order == 0 {
            return Err(SimulationError::InvalidSetup(
                "order must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn positive_finite(name: &'static str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidTolerance { name, value })
    }
}
