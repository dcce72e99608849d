//! Read solver configuration files.
//!
//! A config file is a JSON object with any subset of the `LinSolveConfig`
//! fields; missing fields take their defaults:
//!
//! ```json
//! { "lsparse": [1.0, 0.5], "sp_idcs": [4, 3], "lsmooth": { "spatial": 0.1, "spectral": 0.1 } }
//! ```

use std::fs::File;
use std::path::Path;

use crate::domain::LinSolveConfig;
use crate::error::SpookError;

pub fn read_config_json(path: &Path) -> Result<LinSolveConfig, SpookError> {
    let file = File::open(path).map_err(|source| SpookError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config: LinSolveConfig = serde_json::from_reader(file)?;
    log::debug!("Loaded config from '{}': {config:?}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SparsityWeights;

    #[test]
    fn partial_config_file_uses_defaults() {
        let path = std::env::temp_dir().join(format!("spook_config_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "lsparse": 2.5, "cache_cross_term": true }"#).unwrap();
        let config = read_config_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.lsparse, SparsityWeights::Uniform(2.5));
        assert!(config.cache_cross_term);
        assert_eq!(config.lsmooth, LinSolveConfig::default().lsmooth);
        assert_eq!(config.sp_idcs, None);
    }

    #[test]
    fn malformed_config_is_a_json_error() {
        let path = std::env::temp_dir().join(format!("spook_bad_config_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "lsparse": "lots" }"#).unwrap();
        let err = read_config_json(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, SpookError::Json(_)), "unexpected error: {err}");
    }
}
