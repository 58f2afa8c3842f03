use dotenv::dotenv;
use jsonwebtoken::Algorithm;
use std::{env, fmt, net::SocketAddr, path::PathBuf, str::FromStr};
use thiserror::Error;
use tracing::Level;

const RABBIT_URL: &str = "RABBIT_URL";
const APP_ID: &str = "APP_ID";
const BIND_ADDR: &str = "BIND_ADDR";
const INGEST_PATH: &str = "INGEST_PATH";
const DATA_TOPIC: &str = "DATA_TOPIC";
const DEVICE_ID_CLAIM: &str = "DEVICE_ID_CLAIM";
const MAX_BODY_BYTES: &str = "MAX_BODY_BYTES";
const JWT_ALGORITHM: &str = "JWT_ALGORITHM";
const JWT_SECRET: &str = "JWT_SECRET";
const JWT_PUBLIC_KEY_FILE: &str = "JWT_PUBLIC_KEY_FILE";
const JWT_ISSUER: &str = "JWT_ISSUER";
const JWT_AUDIENCE: &str = "JWT_AUDIENCE";
const JWT_LEEWAY_SECS: &str = "JWT_LEEWAY_SECS";
const LOG_LEVEL: &str = "LOG_LEVEL";

pub const DEFAULT_APP_ID: &str = "telemetry-ingest";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_INGEST_PATH: &str = "/data";
pub const DEFAULT_DATA_TOPIC: &str = "iot-data";
pub const DEFAULT_DEVICE_ID_CLAIM: &str = "deviceId";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
pub const DEFAULT_JWT_LEEWAY_SECS: u64 = 60;

/// Errors raised while loading configuration or key material.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to read JWT public key {path:?}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JWT key material: {0}")]
    Key(#[from] jsonwebtoken::errors::Error),
}

/// Where the token signature key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum JwtKey {
    /// Shared HMAC secret for the HS* algorithms.
    Secret(String),
    /// PEM encoded public key for the RS*, PS*, ES* and EdDSA algorithms.
    PublicKeyFile(PathBuf),
}

impl fmt::Debug for JwtKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Secret(_) => f.write_str("Secret(<redacted>)"),
            Self::PublicKeyFile(path) => f.debug_tuple("PublicKeyFile").field(path).finish(),
        }
    }
}

/// Bearer token validation settings.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub algorithm: Algorithm,
    pub key: JwtKey,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub leeway_secs: u64,
}

impl JwtConfig {
    /// HS256 validation with a shared secret and no issuer or audience requirement.
    pub fn hmac(secret: &str) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            key: JwtKey::Secret(secret.to_owned()),
            issuer: None,
            audience: None,
            leeway_secs: DEFAULT_JWT_LEEWAY_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub rabbit_url: String,
    pub app_id: String,
    pub bind_addr: SocketAddr,
    pub ingest_path: String,
    pub data_topic: String,
    pub device_id_claim: String,
    pub max_body_bytes: usize,
    pub jwt: JwtConfig,
    pub log_level: Level,
}

impl Config {
    /// Loads a `.env` file if present, then reads the process environment.
    pub fn try_from_env() -> Result<Config, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let rabbit_url = var(RABBIT_URL).ok_or(ConfigError::Missing(RABBIT_URL))?;
        let app_id = var(APP_ID).unwrap_or_else(|| DEFAULT_APP_ID.to_string());
        let bind_addr = parse_or(var(BIND_ADDR), BIND_ADDR, DEFAULT_BIND_ADDR)?;

        let ingest_path = var(INGEST_PATH).unwrap_or_else(|| DEFAULT_INGEST_PATH.to_string());
        if !ingest_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                name: INGEST_PATH,
                reason: format!("{ingest_path} must start with '/'"),
            });
        }

        let data_topic = var(DATA_TOPIC).unwrap_or_else(|| DEFAULT_DATA_TOPIC.to_string());
        let device_id_claim =
            var(DEVICE_ID_CLAIM).unwrap_or_else(|| DEFAULT_DEVICE_ID_CLAIM.to_string());
        let max_body_bytes = match var(MAX_BODY_BYTES) {
            Some(raw) => parse(&raw, MAX_BODY_BYTES)?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let algorithm = parse_or(var(JWT_ALGORITHM), JWT_ALGORITHM, "HS256")?;
        let key = match (var(JWT_SECRET), var(JWT_PUBLIC_KEY_FILE)) {
            (Some(secret), None) => JwtKey::Secret(secret),
            (None, Some(path)) => JwtKey::PublicKeyFile(PathBuf::from(path)),
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid {
                    name: JWT_SECRET,
                    reason: format!("set only one of {JWT_SECRET} and {JWT_PUBLIC_KEY_FILE}"),
                });
            }
            (None, None) => return Err(ConfigError::Missing(JWT_SECRET)),
        };
        let leeway_secs = match var(JWT_LEEWAY_SECS) {
            Some(raw) => parse(&raw, JWT_LEEWAY_SECS)?,
            None => DEFAULT_JWT_LEEWAY_SECS,
        };

        let log_level = parse_or(var(LOG_LEVEL), LOG_LEVEL, "info")?;

        Ok(Config {
            rabbit_url,
            app_id,
            bind_addr,
            ingest_path,
            data_topic,
            device_id_claim,
            max_body_bytes,
            jwt: JwtConfig {
                algorithm,
                key,
                issuer: var(JWT_ISSUER),
                audience: var(JWT_AUDIENCE),
                leeway_secs,
            },
            log_level,
        })
    }
}

fn parse<T>(raw: &str, name: &'static str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse::<T>().map_err(|err| ConfigError::Invalid {
        name,
        reason: format!("{raw}: {err}"),
    })
}

fn parse_or<T>(raw: Option<String>, name: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    parse(raw.as_deref().unwrap_or(default), name)
}
