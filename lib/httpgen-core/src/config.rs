//! Plan configuration types.

use std::sync::Arc;

use crate::aws::{Clock, SystemClock};

/// Default multipart boundary token.
///
/// Fixed so that building the same options twice yields the same plan.
pub const DEFAULT_BOUNDARY: &str = "----HttpgenFormBoundary7MA4YWxkTrZu0gW";

/// Configuration for plan construction.
#[derive(Debug, Clone)]
pub struct PlanConfig {
    /// Multipart boundary token.
    pub boundary: String,
    /// Time source for the AWS V2 `Date` header.
    pub clock: Arc<dyn Clock>,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            boundary: DEFAULT_BOUNDARY.to_string(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl PlanConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> PlanConfigBuilder {
        PlanConfigBuilder::default()
    }
}

/// Builder for [`PlanConfig`].
#[derive(Debug, Clone, Default)]
pub struct PlanConfigBuilder {
    boundary: Option<String>,
    clock: Option<Arc<dyn Clock>>,
}

impl PlanConfigBuilder {
    /// Set the multipart boundary token.
    #[must_use]
    pub fn boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = Some(boundary.into());
        self
    }

    /// Set the clock.
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> PlanConfig {
        let defaults = PlanConfig::default();
        PlanConfig {
            boundary: self
                .boundary
                .filter(|boundary| !boundary.is_empty())
                .unwrap_or(defaults.boundary),
            clock: self.clock.unwrap_or(defaults.clock),
        }
    }
}
