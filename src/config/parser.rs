use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Every section and key is optional; anything missing takes its default.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use link_sweeper::config::load_config;
///
/// let config = load_config(Path::new("link-sweeper.toml")).unwrap();
/// println!("Workers: {}", config.crawler.concurrency);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so two runs can be matched to the exact settings they used.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Renderer;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
concurrency = 8
probe-timeout-secs = 5
crawl-timeout-secs = 20
settle-timeout-secs = 15
max-redirects = 3
renderer = "static"
progress-interval = 25

[user-agent]
name = "TestSweeper"
version = "0.1"

[output]
summary-path = "./summary.md"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.concurrency, 8);
        assert_eq!(config.crawler.probe_timeout_secs, 5);
        assert_eq!(config.crawler.max_redirects, 3);
        assert_eq!(config.crawler.renderer, Renderer::Static);
        assert_eq!(config.crawler.progress_interval, 25);
        assert_eq!(config.user_agent.header_value(), "TestSweeper/0.1");
        assert_eq!(config.output.summary_path.as_deref(), Some("./summary.md"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let file = create_temp_config("[crawler]\nconcurrency = 2\n");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.concurrency, 2);
        assert_eq!(config.crawler.probe_timeout_secs, 10);
        assert_eq!(config.crawler.crawl_timeout_secs, 30);
        assert_eq!(config.crawler.renderer, Renderer::Browser);
        assert_eq!(config.user_agent.name, "link-sweeper");
        assert!(config.output.summary_path.is_none());
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config.crawler.concurrency, 5);
        assert_eq!(config.crawler.max_redirects, 10);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result.unwrap_err(), ConfigError::Io(_)));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_renderer_rejected() {
        let result = parse_config("[crawler]\nrenderer = \"firefox\"\n");
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[crawler]\nconcurrency = 0\n");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("[crawler]\nconcurrency = 3\n");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA-256 produces 64 hex characters
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_load_config_with_hash() {
        let file = create_temp_config("[user-agent]\nname = \"hash-test\"\n");
        let (config, hash) = load_config_with_hash(file.path()).unwrap();
        assert_eq!(config.user_agent.name, "hash-test");
        assert_eq!(hash, compute_config_hash(file.path()).unwrap());
    }
}
