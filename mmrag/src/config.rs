//! Configuration for the multimodal pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MmError, Result};

/// Tunable parameters for the pipeline's retrieval and answer paths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// How many retrieved results feed the answer context window.
    pub max_context_sources: usize,
    /// Character cap for the `content_preview` metadata written at ingestion.
    pub content_preview_chars: usize,
    /// Character cap for the context preview embedded in templated answers.
    pub context_preview_chars: usize,
    /// Per-request deadline applied to each encoder call and store
    /// round-trip. `None` disables the deadline.
    pub request_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_context_sources: 3,
            content_preview_chars: 100,
            context_preview_chars: 300,
            request_timeout: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new builder for constructing a [`PipelineConfig`].
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set how many retrieved results feed the answer context window.
    pub fn max_context_sources(mut self, count: usize) -> Self {
        self.config.max_context_sources = count;
        self
    }

    /// Set the character cap for ingestion content previews.
    pub fn content_preview_chars(mut self, chars: usize) -> Self {
        self.config.content_preview_chars = chars;
        self
    }

    /// Set the character cap for context previews in templated answers.
    pub fn context_preview_chars(mut self, chars: usize) -> Self {
        self.config.context_preview_chars = chars;
        self
    }

    /// Set the per-request deadline for encoder and store calls.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    /// Build the [`PipelineConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`MmError::Config`] if:
    /// - `max_context_sources == 0`
    /// - `content_preview_chars == 0` or `context_preview_chars == 0`
    /// - `request_timeout` is set to zero
    pub fn build(self) -> Result<PipelineConfig> {
        if self.config.max_context_sources == 0 {
            return Err(MmError::Config(
                "max_context_sources must be greater than zero".to_string(),
            ));
        }
        if self.config.content_preview_chars == 0 || self.config.context_preview_chars == 0 {
            return Err(MmError::Config("preview sizes must be greater than zero".to_string()));
        }
        if self.config.request_timeout == Some(Duration::ZERO) {
            return Err(MmError::Config("request_timeout must be non-zero".to_string()));
        }
        Ok(self.config)
    }
}
