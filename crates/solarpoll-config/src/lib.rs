//! Configuration for solarpoll.
//!
//! TOML file + environment loading, API-key resolution (env + plaintext),
//! and translation to `solarpoll_core::CollectorConfig`. Core never reads
//! config files; the binary goes through this crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use solarpoll_core::{CollectorConfig, SamplePolicy};

/// Prefix of environment overrides (`SOLARPOLL_INTERVAL`, `SOLARPOLL_OUTPUT`).
pub const ENV_PREFIX: &str = "SOLARPOLL_";

/// Fallback environment variable for the API key.
pub const API_KEY_ENV: &str = "SOLARPOLL_API_KEY";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for input '{input}'")]
    NoCredentials { input: String },

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Durations ───────────────────────────────────────────────────────

/// Durations as humantime strings (`"5s"`, `"15m"`); bare integers are seconds.
mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Secs(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Secs(secs) => Ok(Duration::from_secs(secs)),
            Raw::Text(text) => humantime::parse_duration(text.trim()).map_err(D::Error::custom),
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Time between collection cycles.
    #[serde(default = "default_interval", with = "duration_str")]
    pub interval: Duration,

    /// Output format: "line" or "json".
    #[serde(default = "default_output")]
    pub output: String,

    /// Polled inverters.
    #[serde(default)]
    pub inputs: Vec<Input>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            output: default_output(),
            inputs: Vec::new(),
        }
    }
}

fn default_interval() -> Duration {
    Duration::from_secs(15 * 60)
}
fn default_output() -> String {
    "line".into()
}

/// One polled inverter.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Input {
    /// Measurement name for this input's points.
    #[serde(default = "default_name")]
    pub name: String,

    /// Monitoring site identifier.
    #[serde(default)]
    pub site_id: String,

    /// Inverter serial number.
    #[serde(default)]
    pub serial_number: String,

    /// API key (plaintext -- prefer `api_key_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// IANA zone of the site (empty = UTC).
    #[serde(default)]
    pub time_zone: String,

    #[serde(default = "default_response_timeout", with = "duration_str")]
    pub response_timeout: Duration,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub on_invalid_timestamp: SamplePolicy,
}

fn default_name() -> String {
    "solaredge".into()
}
fn default_response_timeout() -> Duration {
    CollectorConfig::default().response_timeout
}
fn default_api_base() -> String {
    CollectorConfig::default().api_base
}

impl Input {
    /// Whether `time_zone` names a known zone (empty counts as UTC).
    pub fn zone_is_known(&self) -> bool {
        let name = self.time_zone.trim();
        name.is_empty() || name.parse::<Tz>().is_ok()
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "solarpoll", "solarpoll").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("solarpoll");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from defaults, a TOML file, and the environment.
///
/// An explicit `path` must exist; the default path may be absent.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(p) if !p.exists() => {
            return Err(ConfigError::NotFound {
                path: p.to_path_buf(),
            });
        }
        Some(p) => p.to_path_buf(),
        None => config_path(),
    };

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed(ENV_PREFIX).only(&["interval", "output"]));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Render a config back to TOML.
pub fn to_toml(cfg: &Config) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(cfg)?)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve an input's API key.
///
/// Order: the variable named by `api_key_env`, then `SOLARPOLL_API_KEY`,
/// then the plaintext `api_key`.
pub fn resolve_api_key(input: &Input) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = input.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            if !val.is_empty() {
                return Ok(SecretString::from(val));
            }
        }
    }

    if let Ok(val) = std::env::var(API_KEY_ENV) {
        if !val.is_empty() {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(ref key) = input.api_key {
        if !key.is_empty() {
            return Ok(SecretString::from(key.clone()));
        }
    }

    Err(ConfigError::NoCredentials {
        input: input.name.clone(),
    })
}

// ── Validation & translation ────────────────────────────────────────

fn validation(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Check an input's static fields (everything except credentials).
pub fn validate_input(input: &Input, index: usize) -> Result<(), ConfigError> {
    let prefix = format!("inputs[{index}]");
    if input.name.trim().is_empty() {
        return Err(validation(format!("{prefix}.name"), "must not be empty"));
    }
    if input.site_id.trim().is_empty() {
        return Err(validation(format!("{prefix}.site_id"), "must not be empty"));
    }
    if input.serial_number.trim().is_empty() {
        return Err(validation(
            format!("{prefix}.serial_number"),
            "must not be empty",
        ));
    }
    match url::Url::parse(&input.api_base) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => {}
        Ok(u) => {
            return Err(validation(
                format!("{prefix}.api_base"),
                format!("expected an http(s) URL, got scheme '{}'", u.scheme()),
            ));
        }
        Err(e) => {
            return Err(validation(
                format!("{prefix}.api_base"),
                format!("invalid URL '{}': {e}", input.api_base),
            ));
        }
    }
    Ok(())
}

/// Build a `CollectorConfig` for one input.
pub fn input_to_collector_config(
    input: &Input,
    index: usize,
) -> Result<CollectorConfig, ConfigError> {
    validate_input(input, index)?;
    let api_key = resolve_api_key(input)?;

    Ok(CollectorConfig {
        name: input.name.clone(),
        site_id: input.site_id.trim().to_owned(),
        serial_number: input.serial_number.trim().to_owned(),
        api_key,
        time_zone: input.time_zone.clone(),
        response_timeout: input.response_timeout,
        api_base: input.api_base.clone(),
        sample_policy: input.on_invalid_timestamp,
    })
}

/// Build a `CollectorConfig` for every input.
pub fn collector_configs(cfg: &Config) -> Result<Vec<CollectorConfig>, ConfigError> {
    if cfg.interval.is_zero() {
        return Err(validation("interval", "must be greater than zero"));
    }
    if cfg.inputs.is_empty() {
        return Err(validation("inputs", "at least one [[inputs]] entry is required"));
    }
    cfg.inputs
        .iter()
        .enumerate()
        .map(|(i, input)| input_to_collector_config(input, i))
        .collect()
}

// ── Sample config ───────────────────────────────────────────────────

/// A commented starting config.
pub fn sample_config() -> &'static str {
    r#"# solarpoll configuration

## Time between collection cycles. The monitoring API allows
## 300 requests per site per day.
interval = "15m"

## Output format on stdout: "line" (InfluxDB line protocol) or "json".
output = "line"

[[inputs]]
  ## Measurement name for this inverter's points.
  name = "solaredge"

  ## Your specific site id.
  site_id = "123456"

  ## The serial number of your inverter.
  serial_number = "12345678-00"

  ## API key, or the name of an environment variable holding it.
  ## SOLARPOLL_API_KEY is used when neither is set.
  # api_key = "L4QLVQ1LOKCQX2193VSEICXW61NP6B1O"
  api_key_env = "SOLAREDGE_API_KEY"

  ## Zone the site reports local times in. Unknown names fall back to UTC.
  time_zone = "Europe/Prague"

  ## Response timeout (default 5s).
  response_timeout = "5s"

  ## What to do with a sample whose date cannot be parsed:
  ## "abort" drops the whole cycle, "skip" drops just that sample.
  # on_invalid_timestamp = "abort"

  # api_base = "https://monitoringapi.solaredge.com"
"#
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    // Jail serializes env access between tests and gives each one a
    // scratch working directory.
    fn load_in(jail: &mut Jail, contents: &str) -> Result<Config, ConfigError> {
        jail.set_env(API_KEY_ENV, "");
        jail.create_file("solarpoll.toml", contents)
            .map_err(|e| ConfigError::Io(std::io::Error::other(e.to_string())))?;
        load_config(Some(Path::new("solarpoll.toml")))
    }

    fn input() -> Input {
        Input {
            name: "roof".into(),
            site_id: "123456".into(),
            serial_number: "12345678-00".into(),
            api_key: Some("plain-key".into()),
            api_key_env: None,
            time_zone: "Europe/Prague".into(),
            response_timeout: Duration::from_secs(5),
            api_base: default_api_base(),
            on_invalid_timestamp: SamplePolicy::Abort,
        }
    }

    #[test]
    fn loads_inputs_with_defaults() {
        Jail::expect_with(|jail| {
            let cfg = load_in(
                jail,
                r#"
interval = "5m"

[[inputs]]
site_id = "123456"
serial_number = "12345678-00"
api_key = "k"
time_zone = "MST"
"#,
            )
            .unwrap();
            assert_eq!(cfg.interval, Duration::from_secs(300));
            assert_eq!(cfg.output, "line");
            assert_eq!(cfg.inputs.len(), 1);

            let input = &cfg.inputs[0];
            assert_eq!(input.name, "solaredge");
            assert_eq!(input.response_timeout, Duration::from_secs(5));
            assert_eq!(input.api_base, "https://monitoringapi.solaredge.com");
            assert_eq!(input.on_invalid_timestamp, SamplePolicy::Abort);
            Ok(())
        });
    }

    #[test]
    fn parses_timeout_and_policy() {
        Jail::expect_with(|jail| {
            let cfg = load_in(
                jail,
                r#"
[[inputs]]
site_id = "1"
serial_number = "A"
response_timeout = "1500ms"
on_invalid_timestamp = "skip"
"#,
            )
            .unwrap();
            assert_eq!(cfg.inputs[0].response_timeout, Duration::from_millis(1500));
            assert_eq!(cfg.inputs[0].on_invalid_timestamp, SamplePolicy::Skip);
            Ok(())
        });
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/solarpoll.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn bad_duration_is_rejected() {
        Jail::expect_with(|jail| {
            let result = load_in(jail, "interval = \"often\"\n");
            assert!(matches!(result, Err(ConfigError::Figment(_))));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_interval_and_output() {
        Jail::expect_with(|jail| {
            jail.set_env("SOLARPOLL_INTERVAL", "90");
            jail.set_env("SOLARPOLL_OUTPUT", "json");

            let cfg = load_in(jail, "interval = \"1h\"\noutput = \"line\"\n").unwrap();
            assert_eq!(cfg.interval, Duration::from_secs(90));
            assert_eq!(cfg.output, "json");
            Ok(())
        });
    }

    #[test]
    fn api_key_env_takes_precedence() {
        Jail::expect_with(|jail| {
            jail.set_env("ROOF_KEY", "from-env");
            jail.set_env(API_KEY_ENV, "global");
            let mut inp = input();
            inp.api_key_env = Some("ROOF_KEY".into());

            let key = resolve_api_key(&inp).unwrap();
            assert_eq!(key.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn global_env_key_beats_plaintext() {
        Jail::expect_with(|jail| {
            jail.set_env(API_KEY_ENV, "global");
            let key = resolve_api_key(&input()).unwrap();
            assert_eq!(key.expose_secret(), "global");
            Ok(())
        });
    }

    #[test]
    fn missing_key_is_no_credentials() {
        Jail::expect_with(|jail| {
            jail.set_env(API_KEY_ENV, "");
            let mut inp = input();
            inp.api_key = None;
            inp.api_key_env = Some("SOLARPOLL_TEST_UNSET_VAR".into());
            match resolve_api_key(&inp) {
                Err(ConfigError::NoCredentials { input }) => assert_eq!(input, "roof"),
                other => panic!("expected NoCredentials, got {other:?}"),
            }
            Ok(())
        });
    }

    #[test]
    fn validation_names_the_field() {
        let mut inp = input();
        inp.serial_number = "  ".into();
        match validate_input(&inp, 2) {
            Err(ConfigError::Validation { field, .. }) => {
                assert_eq!(field, "inputs[2].serial_number");
            }
            other => panic!("expected Validation, got {other:?}"),
        }

        let mut inp = input();
        inp.api_base = "ftp://example.com".into();
        assert!(matches!(
            validate_input(&inp, 0),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn collector_configs_require_inputs() {
        let cfg = Config::default();
        assert!(matches!(
            collector_configs(&cfg),
            Err(ConfigError::Validation { field, .. }) if field == "inputs"
        ));
    }

    #[test]
    fn input_translates_to_collector_config() {
        Jail::expect_with(|jail| {
            jail.set_env(API_KEY_ENV, "");
            let mut inp = input();
            inp.on_invalid_timestamp = SamplePolicy::Skip;
            let cc = input_to_collector_config(&inp, 0).unwrap();
            assert_eq!(cc.name, "roof");
            assert_eq!(cc.site_id, "123456");
            assert_eq!(cc.time_zone, "Europe/Prague");
            assert_eq!(cc.sample_policy, SamplePolicy::Skip);
            assert_eq!(cc.api_key.expose_secret(), "plain-key");
            Ok(())
        });
    }

    #[test]
    fn zone_check() {
        let mut inp = input();
        assert!(inp.zone_is_known());
        inp.time_zone = String::new();
        assert!(inp.zone_is_known());
        inp.time_zone = "Nowhere/Special".into();
        assert!(!inp.zone_is_known());
    }

    #[test]
    fn sample_config_parses() {
        Jail::expect_with(|jail| {
            let cfg = load_in(jail, sample_config()).unwrap();
            assert_eq!(cfg.interval, Duration::from_secs(900));
            assert_eq!(cfg.inputs.len(), 1);
            assert_eq!(
                cfg.inputs[0].api_key_env.as_deref(),
                Some("SOLAREDGE_API_KEY")
            );
            validate_input(&cfg.inputs[0], 0).unwrap();
            Ok(())
        });
    }

    #[test]
    fn config_renders_back_to_toml() {
        let cfg = Config {
            inputs: vec![input()],
            ..Config::default()
        };
        let rendered = to_toml(&cfg).unwrap();
        assert!(rendered.contains("interval = \"15m\""));
        assert!(rendered.contains("response_timeout = \"5s\""));
        assert!(rendered.contains("on_invalid_timestamp = \"abort\""));
    }
}
