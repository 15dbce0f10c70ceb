//! Process configuration.
//!
//! Two file formats are accepted: the line-based `key=value` format, and YAML
//! for files ending in `.yaml` or `.yml`. Both carry the same keys:
//!
//! ```text
//! vhost=example.com,www.example.com
//! port=8080
//! diskpath=/srv/www
//! drop_uid=1000
//! drop_gid=1000
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::server::listener::Privileges;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "HARBOR_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "server.config";
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("missing required key `{0}`")]
    MissingKey(&'static str),
    #[error("invalid value for `{key}`: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub vhosts: Vec<String>,
    pub port: u16,
    pub disk_path: PathBuf,
    pub drop_uid: Option<u32>,
    pub drop_gid: Option<u32>,
    pub poll_timeout: Duration,
}

/// YAML form of the configuration file.
#[derive(Debug, Deserialize)]
struct FileConfig {
    vhost: Option<HostList>,
    port: Option<u16>,
    diskpath: Option<PathBuf>,
    drop_uid: Option<u32>,
    drop_gid: Option<u32>,
    poll_timeout_ms: Option<u64>,
}

/// `vhost` may be a comma separated string or a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HostList {
    One(String),
    Many(Vec<String>),
}

impl HostList {
    fn into_names(self) -> Vec<String> {
        match self {
            HostList::One(s) => split_hosts(&s),
            HostList::Many(v) => v.iter().flat_map(|s| split_hosts(s)).collect(),
        }
    }
}

impl Config {
    /// Loads the file named by `HARBOR_CONFIG`, or `server.config`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_file(path)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        if is_yaml {
            Self::from_yaml(&text)
        } else {
            Self::from_key_values(&text)
        }
    }

    /// Parses `key=value` lines. Blank lines and `#` comments are skipped, and
    /// the first occurrence of a key wins.
    pub fn from_key_values(text: &str) -> Result<Self, ConfigError> {
        let mut values: HashMap<&str, &str> = HashMap::new();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                values.entry(key.trim()).or_insert(value.trim());
            }
        }

        let vhosts = split_hosts(values.get("vhost").ok_or(ConfigError::MissingKey("vhost"))?);
        let port = parse_value("port", values.get("port").ok_or(ConfigError::MissingKey("port"))?)?;
        let disk_path = PathBuf::from(
            values
                .get("diskpath")
                .ok_or(ConfigError::MissingKey("diskpath"))?,
        );
        let drop_uid = values.get("drop_uid").map(|v| parse_value("drop_uid", v)).transpose()?;
        let drop_gid = values.get("drop_gid").map(|v| parse_value("drop_gid", v)).transpose()?;
        let poll_timeout_ms = values
            .get("poll_timeout_ms")
            .map(|v| parse_value("poll_timeout_ms", v))
            .transpose()?
            .unwrap_or(DEFAULT_POLL_TIMEOUT_MS);

        Ok(Self {
            vhosts,
            port,
            disk_path,
            drop_uid,
            drop_gid,
            poll_timeout: Duration::from_millis(poll_timeout_ms),
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = serde_yaml::from_str(text)?;
        Ok(Self {
            vhosts: file.vhost.ok_or(ConfigError::MissingKey("vhost"))?.into_names(),
            port: file.port.ok_or(ConfigError::MissingKey("port"))?,
            disk_path: file.diskpath.ok_or(ConfigError::MissingKey("diskpath"))?,
            drop_uid: file.drop_uid,
            drop_gid: file.drop_gid,
            poll_timeout: Duration::from_millis(file.poll_timeout_ms.unwrap_or(DEFAULT_POLL_TIMEOUT_MS)),
        })
    }

    /// The identity to switch to after binding.
    ///
    /// Both ids must be set and non-zero, otherwise neither is used.
    pub fn privileges(&self) -> Option<Privileges> {
        match (self.drop_uid, self.drop_gid) {
            (Some(uid), Some(gid)) if uid > 0 && gid > 0 => Some(Privileges { uid, gid }),
            _ => None,
        }
    }
}

fn split_hosts(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(String::from)
        .collect()
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
