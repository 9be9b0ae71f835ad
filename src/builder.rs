//! Viewpoint builder
//!
//! Opens the navigation database and its index and wires them into a
//! [`Viewpoint`].

use crate::config::Config;
use crate::database::{NavDatabase, ObjectSource};
use crate::error::{Result, SynvisError};
use crate::viewpoint::Viewpoint;
use std::path::PathBuf;

/// Builder for a [`Viewpoint`] with custom file paths and settings.
pub struct ViewpointBuilder {
    config: Config,
    source: Option<Box<dyn ObjectSource>>,
}

impl ViewpointBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            source: None,
        }
    }

    /// Replace the whole configuration. Paths set earlier are overwritten.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.database_path = path.into();
        self
    }

    pub fn index_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.index_path = path.into();
        self
    }

    /// Display size in pixels.
    pub fn display(mut self, width: f64, height: f64) -> Self {
        self.config = self.config.with_display(width, height);
        self
    }

    /// Serve records from `source` instead of opening the configured files.
    pub fn source(mut self, source: Box<dyn ObjectSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Validate the configuration and open both files. Failing to open
    /// either is fatal.
    pub fn build(self) -> Result<Viewpoint> {
        self.config.validate().map_err(SynvisError::InvalidConfig)?;

        let source = match self.source {
            Some(source) => source,
            None => Box::new(NavDatabase::open(
                &self.config.database_path,
                &self.config.index_path,
            )?),
        };
        Viewpoint::with_source(self.config, source)
    }
}

impl Default for ViewpointBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ViewpointBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewpointBuilder")
            .field("config", &self.config)
            .field("custom_source", &self.source.is_some())
            .finish()
    }
}
