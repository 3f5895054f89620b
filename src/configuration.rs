use crate::error::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// JWT signing settings, read once at startup and shared read-only.
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    /// HS512 shared secret
    pub secret: String,
    /// Token lifetime in seconds
    pub expiration: i64,
    /// Request header carrying the token
    #[serde(default = "default_token_header")]
    pub token_header: String,
    /// Scheme prefix in front of the token, e.g. `Bearer`
    #[serde(default = "default_token_head")]
    pub token_head: String,
}

impl JwtSettings {
    pub fn new(secret: impl Into<String>, expiration: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration,
            token_header: default_token_header(),
            token_head: default_token_head(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt.secret".to_string()));
        }
        if self.expiration <= 0 {
            return Err(ConfigError::InvalidValue(format!(
                "jwt.expiration must be positive, got {}",
                self.expiration
            )));
        }
        if self.token_header.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt.token_header".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"<redacted>")
            .field("expiration", &self.expiration)
            .field("token_header", &self.token_header)
            .field("token_head", &self.token_head)
            .finish()
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_token_header() -> String {
    "Authorization".to_string()
}

fn default_token_head() -> String {
    "Bearer".to_string()
}

/// Loads `configuration.yaml` (optional) overlaid with `APP__*` variables,
/// e.g. `APP__JWT__SECRET`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;
    settings.jwt.validate()?;
    Ok(settings)
}
