//! Schema configuration.
//!
//! Limits applied to the compiled schema. Applications usually embed this
//! under a `[graphql]` section of their own configuration file.
//!
//! # Example Configuration
//!
//! ```toml
//! [graphql]
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! ```

use serde::{Deserialize, Serialize};

/// Limits and switches for a compiled schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Maximum query depth allowed.
    /// Default: unlimited
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Maximum query complexity allowed.
    /// Default: unlimited
    #[serde(default)]
    pub max_complexity: Option<usize>,

    /// Enable introspection queries (`__schema`, `__type`).
    /// Default: true
    #[serde(default = "default_introspection")]
    pub introspection: bool,
}

fn default_introspection() -> bool {
    true
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            max_complexity: None,
            introspection: default_introspection(),
        }
    }
}

impl SchemaConfig {
    /// Sets the maximum query depth.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Sets the maximum query complexity.
    #[must_use]
    pub fn with_max_complexity(mut self, complexity: usize) -> Self {
        self.max_complexity = Some(complexity);
        self
    }

    /// Enables or disables introspection.
    #[must_use]
    pub fn with_introspection(mut self, enabled: bool) -> Self {
        self.introspection = enabled;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a limit is set to zero.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == Some(0) {
            return Err("max_depth must be > 0".into());
        }
        if self.max_complexity == Some(0) {
            return Err("max_complexity must be > 0".into());
        }
        Ok(())
    }
}
