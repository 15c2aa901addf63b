use rtc_token::{decode_app_id, IssueOptions, Role, DEFAULT_EXPIRE_SECONDS};
use serde::{Deserialize, Serialize};
use std::env;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Environment prefix conventionally used for the app credentials.
pub const DEFAULT_ENV_PREFIX: &str = "AGORA";

/// Configuration for issuing channel access tokens
///
/// Holds the application credentials and the defaults applied to every
/// token. The certificate is optional: without it the service runs in
/// tokenless mode and issues no tokens.
///
/// # Examples
///
/// ## Creating a configuration manually
///
/// ```
/// use rtc_access::AccessConfig;
///
/// let config = AccessConfig::new(
///     "4a410e05b4554ec1a81555f44bc3228e",
///     Some("02f9818234cb497d8ec7770cec6ffb82"),
/// );
/// assert!(config.validate().is_ok());
/// ```
///
/// ## Loading from environment variables
///
/// ```no_run
/// use rtc_access::AccessConfig;
///
/// // AGORA_APP_ID=4a410e05b4554ec1a81555f44bc3228e
/// // AGORA_APP_CERTIFICATE=02f9818234cb497d8ec7770cec6ffb82
/// let config = AccessConfig::from_env("AGORA")
///     .expect("Failed to load configuration from environment");
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// 32-hex-character application identifier
    pub app_id: String,
    /// Signing certificate; `None` selects tokenless mode
    #[serde(default)]
    pub app_certificate: Option<String>,
    /// Token lifetime in seconds
    #[serde(default = "default_expire_seconds")]
    pub default_expire_seconds: u32,
    /// Role used when the caller does not ask for one
    #[serde(default)]
    pub default_role: Role,
}

fn default_expire_seconds() -> u32 {
    DEFAULT_EXPIRE_SECONDS
}

impl fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessConfig")
            .field("app_id", &self.app_id)
            .field(
                "app_certificate",
                &self.app_certificate.as_ref().map(|_| "[REDACTED]"),
            )
            .field("default_expire_seconds", &self.default_expire_seconds)
            .field("default_role", &self.default_role)
            .finish()
    }
}

/// Builder for AccessConfig
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rtc_access::{AccessConfigBuilder, Role};
///
/// let config = AccessConfigBuilder::new()
///     .app_id("4a410e05b4554ec1a81555f44bc3228e")
///     .app_certificate("02f9818234cb497d8ec7770cec6ffb82")
///     .default_expire_seconds(600)
///     .default_role(Role::Subscriber)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug)]
pub struct AccessConfigBuilder {
    app_id: Option<String>,
    app_certificate: Option<String>,
    default_expire_seconds: Option<u32>,
    default_role: Option<Role>,
}

impl AccessConfigBuilder {
    /// Create a new AccessConfigBuilder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new AccessConfigBuilder from an existing AccessConfig
    pub fn from_config(config: &AccessConfig) -> Self {
        Self {
            app_id: Some(config.app_id.clone()),
            app_certificate: config.app_certificate.clone(),
            default_expire_seconds: Some(config.default_expire_seconds),
            default_role: Some(config.default_role),
        }
    }

    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn app_certificate(mut self, certificate: impl Into<String>) -> Self {
        self.app_certificate = Some(certificate.into());
        self
    }

    /// Remove the certificate, switching to tokenless mode
    pub fn tokenless(mut self) -> Self {
        self.app_certificate = None;
        self
    }

    pub fn default_expire_seconds(mut self, seconds: u32) -> Self {
        self.default_expire_seconds = Some(seconds);
        self
    }

    pub fn default_role(mut self, role: Role) -> Self {
        self.default_role = Some(role);
        self
    }

    /// Build the AccessConfig
    ///
    /// # Errors
    ///
    /// Returns an error if the app id is missing or any field is invalid
    pub fn build(self) -> Result<AccessConfig, ConfigError> {
        let config = AccessConfig {
            app_id: self.app_id.ok_or(ConfigError::MissingAppId)?,
            app_certificate: self.app_certificate,
            default_expire_seconds: self
                .default_expire_seconds
                .unwrap_or_else(default_expire_seconds),
            default_role: self.default_role.unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }
}

/// Errors that can occur when working with token configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingAppId,
    InvalidAppId(String),
    InvalidExpiry(String),
    InvalidRole(String),
    IOError(String),
    ParseError(String),
    AlreadyInitialized,
    EnvVarError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingAppId => {
                write!(f, "App ID is required but was not provided. Set it in the configuration or via AGORA_APP_ID.")
            }
            ConfigError::InvalidAppId(e) => {
                write!(f, "Invalid App ID: {}. The App ID must be 32 hexadecimal characters.", e)
            }
            ConfigError::InvalidExpiry(e) => {
                write!(f, "Invalid token lifetime: {}. Use a positive number of seconds.", e)
            }
            ConfigError::InvalidRole(e) => {
                write!(f, "Invalid role: {}. Use 'publisher' or 'subscriber'.", e)
            }
            ConfigError::IOError(e) => {
                write!(f, "I/O error occurred while reading configuration: {}. Please check file permissions and paths.", e)
            }
            ConfigError::ParseError(e) => {
                write!(f, "Failed to parse configuration data: {}. Please ensure the configuration format is correct.", e)
            }
            ConfigError::AlreadyInitialized => {
                write!(f, "Global configuration has already been initialized. Call get_default_config() to access it or create a new local configuration.")
            }
            ConfigError::EnvVarError(e) => {
                write!(f, "Environment variable error: {}. Please ensure all required environment variables are set correctly.", e)
            }
        }
    }
}

impl Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        ConfigError::IOError(error.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::ParseError(error.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(error: toml::de::Error) -> Self {
        ConfigError::ParseError(error.to_string())
    }
}

impl From<std::env::VarError> for ConfigError {
    fn from(error: std::env::VarError) -> Self {
        ConfigError::EnvVarError(error.to_string())
    }
}

impl AccessConfig {
    /// Create a new configuration with default lifetime and role
    pub fn new(app_id: impl Into<String>, app_certificate: Option<&str>) -> Self {
        AccessConfig {
            app_id: app_id.into(),
            app_certificate: app_certificate.map(str::to_string),
            default_expire_seconds: DEFAULT_EXPIRE_SECONDS,
            default_role: Role::default(),
        }
    }

    pub fn builder() -> AccessConfigBuilder {
        AccessConfigBuilder::new()
    }

    /// Convert this configuration to a builder for modification
    pub fn to_builder(&self) -> AccessConfigBuilder {
        AccessConfigBuilder::from_config(self)
    }

    /// Whether a certificate is configured
    pub fn is_tokenless(&self) -> bool {
        self.app_certificate.as_deref().map_or(true, str::is_empty)
    }

    /// Issue options derived from the configured defaults
    pub fn issue_options(&self) -> IssueOptions {
        IssueOptions {
            role: self.default_role,
            expire_seconds: self.default_expire_seconds,
        }
    }

    /// Create a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file_content = fs::read_to_string(path)?;
        let config: AccessConfig = serde_json::from_str(&file_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration from a TOML file
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file_content = fs::read_to_string(path)?;
        let config: AccessConfig = toml::from_str(&file_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration from environment variables
    ///
    /// The environment variables should be named with the given prefix followed by:
    /// - APP_ID: The application identifier
    /// - APP_CERTIFICATE: The signing certificate (optional, tokenless mode if unset)
    /// - EXPIRE_SECONDS: Token lifetime in seconds (optional, defaults to 3600)
    /// - ROLE: Either "publisher" or "subscriber" (optional, defaults to "publisher")
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the app id is missing or any variable is invalid.
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        Self::load_env(prefix, |_| Ok(None))
    }

    /// Create a configuration from environment variables or files
    ///
    /// Like `from_env`, but the certificate may also be read from the file
    /// named by `{PREFIX}_APP_CERTIFICATE_FILE`, which takes precedence.
    pub fn from_env_or_file(prefix: &str) -> Result<Self, ConfigError> {
        Self::load_env(prefix, |prefix| {
            match env::var(format!("{}_APP_CERTIFICATE_FILE", prefix)) {
                Ok(cert_file) => fs::read_to_string(cert_file)
                    .map(|cert| Some(cert.trim().to_string()))
                    .map_err(|e| {
                        ConfigError::IOError(format!("Failed to read certificate file: {}", e))
                    }),
                Err(std::env::VarError::NotPresent) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn load_env(
        prefix: &str,
        certificate_file: impl Fn(&str) -> Result<Option<String>, ConfigError>,
    ) -> Result<Self, ConfigError> {
        let app_id = match env::var(format!("{}_APP_ID", prefix)) {
            Ok(app_id) => app_id,
            Err(std::env::VarError::NotPresent) => return Err(ConfigError::MissingAppId),
            Err(e) => return Err(e.into()),
        };

        let app_certificate = match certificate_file(prefix)? {
            Some(cert) => Some(cert),
            None => optional_var(&format!("{}_APP_CERTIFICATE", prefix))?,
        };

        let default_expire_seconds = match optional_var(&format!("{}_EXPIRE_SECONDS", prefix))? {
            Some(value) => value
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidExpiry(value))?,
            None => DEFAULT_EXPIRE_SECONDS,
        };

        let default_role = match optional_var(&format!("{}_ROLE", prefix))? {
            Some(value) => value
                .parse::<Role>()
                .map_err(|_| ConfigError::InvalidRole(value))?,
            None => Role::default(),
        };

        let config = AccessConfig {
            app_id,
            app_certificate,
            default_expire_seconds,
            default_role,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Checks that the app id decodes to 16 bytes and the lifetime is non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.is_empty() {
            return Err(ConfigError::MissingAppId);
        }

        decode_app_id(&self.app_id).map_err(|e| ConfigError::InvalidAppId(e.to_string()))?;

        if self.default_expire_seconds == 0 {
            return Err(ConfigError::InvalidExpiry("0".to_string()));
        }

        Ok(())
    }
}

fn optional_var(name: &str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// Global configuration singleton
static DEFAULT_CONFIG: OnceLock<AccessConfig> = OnceLock::new();

/// Set the default global configuration
///
/// Returns an error if a default configuration is already set.
pub fn set_default_config(config: AccessConfig) -> Result<(), ConfigError> {
    config.validate()?;
    DEFAULT_CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)
}

/// Get the default global configuration, if set
pub fn get_default_config() -> Option<&'static AccessConfig> {
    DEFAULT_CONFIG.get()
}

/// Try to load a default configuration from standard locations
///
/// This function attempts to load a configuration from:
/// 1. Environment variables with the prefix "AGORA"
/// 2. A file at ./rtc.json
/// 3. A file at ~/.rtc/config.json
/// 4. A file at /etc/rtc/config.json
/// 5. TOML files with the same paths
///
/// Returns None if no configuration could be found.
pub fn try_load_default_config() -> Option<AccessConfig> {
    if let Ok(config) = AccessConfig::from_env_or_file(DEFAULT_ENV_PREFIX) {
        return Some(config);
    }

    let json_paths = ["./rtc.json", "~/.rtc/config.json", "/etc/rtc/config.json"];
    for path in json_paths.iter() {
        let Some(expanded_path) = expand_home(path) else {
            continue;
        };
        if expanded_path.exists() {
            if let Ok(config) = AccessConfig::from_file(&expanded_path) {
                return Some(config);
            }
        }
    }

    let toml_paths = ["./rtc.toml", "~/.rtc/config.toml", "/etc/rtc/config.toml"];
    for path in toml_paths.iter() {
        let Some(expanded_path) = expand_home(path) else {
            continue;
        };
        if expanded_path.exists() {
            if let Ok(config) = AccessConfig::from_toml(&expanded_path) {
                return Some(config);
            }
        }
    }

    None
}

fn expand_home(path: &str) -> Option<std::path::PathBuf> {
    match path.strip_prefix("~/") {
        Some(stripped) => dirs::home_dir().map(|home| home.join(stripped)),
        None => Some(Path::new(path).to_path_buf()),
    }
}
