use crate::config::AnalyticsConfig;
use crate::error::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

/// Environment prefix for configuration overrides, e.g.
/// `JOURNAL_TILT__MIN_TRADES=10`.
pub const ENV_PREFIX: &str = "JOURNAL_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads analytics configuration by layering defaults, a TOML file, and
    /// `JOURNAL_`-prefixed environment variables, then validates the result.
    ///
    /// A missing file is not an error: defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the merged
    /// configuration fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<AnalyticsConfig> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading analytics configuration");

        let config: AnalyticsConfig = Figment::from(Serialized::defaults(AnalyticsConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Loads defaults overlaid with environment variables only.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment override has the wrong type or the
    /// merged configuration fails validation.
    pub fn load_default() -> Result<AnalyticsConfig> {
        let config: AnalyticsConfig = Figment::from(Serialized::defaults(AnalyticsConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }
}
