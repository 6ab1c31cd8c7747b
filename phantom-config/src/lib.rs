//! Loader for `phantom.yaml` with environment overlays.
//!
//! Sources merge in the order they are added; `PHANTOM__`-prefixed
//! environment variables (`__` separates nesting, e.g.
//! `PHANTOM__WEBDRIVER__URL`) override every file. After merging, `${VAR}`
//! placeholders in string values are expanded.
//!
//! ```yaml
//! version: "1"
//! webdriver:
//!   url: http://localhost:9515
//!   browser: chrome
//!   headless: true
//! logging:
//!   format: json
//!   filter: phantom=debug,info
//! random_moves: true
//! cursor:
//!   move:
//!     max_tries: 5
//!     overshoot_threshold: 400
//!   click:
//!     hesitate_ms: 80
//!   typing:
//!     mistake_rate: 0.03
//! ```
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use phantom_common::observability::{LogConfig, LogFormat};
use phantom_cursor::options::DefaultOptions;
use serde::Deserialize;
use serde_json::Value;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PhantomConfig {
    pub version: Option<String>,
    pub webdriver: WebDriverConfig,
    pub logging: LoggingConfig,
    /// Per-action cursor defaults.
    pub cursor: DefaultOptions,
    /// Run the idle-movement loop between actions.
    pub random_moves: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chrome,
    Firefox,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebDriverConfig {
    pub url: String,
    pub browser: Browser,
    pub headless: bool,
    pub connect_timeout_secs: u64,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9515".into(),
            browser: Browser::Chrome,
            headless: true,
            connect_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub app_name: String,
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let defaults = LogConfig::default();
        Self {
            app_name: defaults.app_name,
            dir: defaults.log_dir,
            format: defaults.format,
            emit_stderr: defaults.emit_stderr,
            filter: defaults.default_filter,
        }
    }
}

impl From<LoggingConfig> for LogConfig {
    fn from(cfg: LoggingConfig) -> Self {
        LogConfig {
            app_name: cfg.app_name,
            log_dir: cfg.dir,
            emit_stderr: cfg.emit_stderr,
            format: cfg.format,
            default_filter: cfg.filter,
        }
    }
}

/// `$XDG_CONFIG_HOME/phantom/phantom.yaml` (or the platform equivalent).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("phantom").join("phantom.yaml"))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) if s.contains('$') => {
            let mut cur = std::mem::take(s);
            for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                let expanded = match shellexpand::env(&cur) {
                    Ok(cow) => cow.into_owned(),
                    Err(_) => break,
                };
                if expanded == cur {
                    break;
                }
                cur = expanded;
            }
            *s = cur;
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder over the `config` crate wiring (YAML + env overrides).
pub struct PhantomConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for PhantomConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PhantomConfigLoader {
    /// Start with `PHANTOM__` environment overrides only.
    ///
    /// ```
    /// use phantom_config::PhantomConfigLoader;
    ///
    /// let config = PhantomConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.webdriver.url, "http://localhost:9515");
    /// assert_eq!(config.cursor.movement.max_tries, 10);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a file that must exist; the format is inferred from the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use phantom_config::{Browser, PhantomConfigLoader};
    ///
    /// let cfg = PhantomConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// webdriver:
    ///   url: "http://localhost:4444"
    ///   browser: firefox
    /// cursor:
    ///   click:
    ///     hesitate_ms: 120
    ///     move:
    ///       max_tries: 4
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.webdriver.browser, Browser::Firefox);
    /// assert!(cfg.webdriver.headless);
    /// assert_eq!(cfg.cursor.click.hesitate_ms, 120);
    /// assert_eq!(cfg.cursor.click.movement.max_tries, 4);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge every source, expand `${VAR}` placeholders and deserialize.
    ///
    /// ```
    /// use phantom_config::PhantomConfigLoader;
    ///
    /// unsafe { std::env::set_var("PHANTOM_DOC_DRIVER", "http://grid.internal:4444"); }
    ///
    /// let config = PhantomConfigLoader::new()
    ///     .with_yaml_str("webdriver:\n  url: \"${PHANTOM_DOC_DRIVER}\"")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.webdriver.url, "http://grid.internal:4444");
    ///
    /// unsafe { std::env::remove_var("PHANTOM_DOC_DRIVER"); }
    /// ```
    pub fn load(self) -> Result<PhantomConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("PHANTOM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_nested_strings() {
        temp_env::with_vars([("GRID_HOST", Some("grid")), ("GRID_PORT", Some("4444"))], || {
            let mut v = json!({
                "webdriver": { "url": "http://${GRID_HOST}:$GRID_PORT" },
                "tags": ["${GRID_HOST}", 1, false, null]
            });
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!({
                    "webdriver": { "url": "http://grid:4444" },
                    "tags": ["grid", 1, false, null]
                })
            );
        });
    }

    #[test]
    fn expands_through_indirection() {
        temp_env::with_vars(
            [("INNER", Some("9515")), ("OUTER", Some("localhost:${INNER}"))],
            || {
                let mut v = json!("http://${OUTER}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("http://localhost:9515"));
            },
        );
    }

    #[test]
    fn cyclic_references_terminate() {
        temp_env::with_vars([("PING", Some("${PONG}")), ("PONG", Some("${PING}"))], || {
            let mut v = json!("<${PING}>");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with('<') && s.ends_with('>'));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("${PHANTOM_SURELY_UNSET_VARIABLE}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("${PHANTOM_SURELY_UNSET_VARIABLE}"));
    }

    #[test]
    fn logging_section_maps_onto_log_config() {
        let cfg = LoggingConfig {
            format: LogFormat::Json,
            filter: "debug".into(),
            ..LoggingConfig::default()
        };
        let log: LogConfig = cfg.into();
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.default_filter, "debug");
        assert_eq!(log.app_name, "phantom");
    }
}
