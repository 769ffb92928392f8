// src/pipeline/validate.rs

use std::path::Path;

use crate::error::Result;
use crate::models::{Config, Listing};

/// Validate the configuration file and every listing's facet registry.
pub fn run_validate(config_path: &Path) -> Result<Config> {
    log::info!("Validating {}", config_path.display());

    let config = match Config::load(config_path).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
    };

    log::info!("✓ Config OK");
    log::info!("  - base_url: {}", config.source.base_url);
    log::info!("  - timeout: {}s", config.source.timeout_secs);
    log::info!("  - page_size: {}", config.session.page_size);
    match config.session.cap {
        Some(cap) => log::info!("  - cap: {}", cap),
        None => log::info!("  - cap: none"),
    }

    for listing in Listing::ALL {
        let registry = listing.registry();
        log::info!(
            "✓ {}: {} facet(s)",
            listing.display_name(),
            registry.len()
        );
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_validate_accepts_good_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session]\npage_size = 20\ncap = 100").unwrap();

        let config = run_validate(file.path()).unwrap();
        assert_eq!(config.session.page_size, 20);
        assert_eq!(config.session.cap, Some(100));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session]\npage_size = 0").unwrap();

        assert!(matches!(
            run_validate(file.path()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_requires_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            run_validate(&dir.path().join("missing.toml")),
            Err(AppError::Io(_))
        ));
    }
}
