//! Load: layered configuration: defaults, config files, environment.

use std::path::Path;

use anyhow::{Context, Result};
use engine::AnomalyRule;

use super::model::ReporterConfig;

/// Searched in order when no explicit path is given; all optional.
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["log-reporter", "config/log-reporter"];

impl ReporterConfig {
    /// Load configuration.
    /// Priority: Environment Variables > Config File > Defaults
    ///
    /// An explicit `path` must exist. Nested keys use a double underscore:
    /// `LOGREPORT_ANALYSIS__TOP_N=20`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = config::Config::try_from(&ReporterConfig::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = config::Config::builder().add_source(defaults);

        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                for candidate in DEFAULT_CONFIG_PATHS {
                    builder = builder.add_source(config::File::with_name(candidate).required(false));
                }
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix("LOGREPORT")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("ingest.extensions")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.analysis.top_n == 0 {
            anyhow::bail!("analysis.top_n must be > 0");
        }
        if !(0.0..=1.0).contains(&self.analysis.anomaly_threshold) {
            anyhow::bail!(
                "analysis.anomaly_threshold must be within [0, 1], got {}",
                self.analysis.anomaly_threshold
            );
        }
        if self.ingest.extensions.is_empty() {
            anyhow::bail!("ingest.extensions must list at least one extension");
        }
        if let Some(bad) = self
            .ingest
            .extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.contains(['/', '\\', '*']))
        {
            anyhow::bail!("ingest.extensions contains an invalid entry: {:?}", bad);
        }
        if self.output.max_failed_line_chars == 0 {
            anyhow::bail!("output.max_failed_line_chars must be > 0");
        }
        if self.output.dir.is_empty() {
            anyhow::bail!("output.dir must not be empty");
        }
        Ok(())
    }

    pub fn anomaly_rule(&self) -> AnomalyRule {
        AnomalyRule {
            threshold_ratio: self.analysis.anomaly_threshold,
            min_requests: self.analysis.anomaly_min_requests,
        }
    }
}
