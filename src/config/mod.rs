//! Configuration module for feedsift
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use once_cell::sync::OnceCell;

/// Global settings instance
static SETTINGS: OnceCell<Settings> = OnceCell::new();

/// Initialize global settings with an already loaded value
pub fn init(settings: Settings) -> Result<&'static Settings> {
    SETTINGS
        .set(settings)
        .map_err(|_| anyhow::anyhow!("Settings already initialized"))?;
    SETTINGS
        .get()
        .ok_or_else(|| anyhow::anyhow!("Settings not initialized"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_only_once() {
        let mut settings = Settings::default();
        settings.search.max_concurrency = 3;

        let installed = init(settings).unwrap();
        assert_eq!(installed.search.max_concurrency, 3);
        assert!(init(Settings::default()).is_err());
    }
}
