//! Configuration access port trait.
//!
//! Adapters only supply raw strings. The typed getters fall back to the
//! caller's default when a key is absent, but a key that is present and does
//! not parse is an error rather than a silent default.

use crate::domain::error::ConfigError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_usize(&self, section: &str, key: &str, default: usize) -> Result<usize, ConfigError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| {
                ConfigError::new(section, key, format!("expected a whole number, got {raw:?}"))
            }),
        }
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, ConfigError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| {
                ConfigError::new(section, key, format!("expected a number, got {raw:?}"))
            }),
        }
    }
}
