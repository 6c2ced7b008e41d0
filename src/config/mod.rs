use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Prefix of every environment variable read by the service
pub const ENV_PREFIX: &str = "MESSMENU";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {message}")]
    LoadError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub observability: ObservabilityConfig,
    pub dynamodb_client: DynamoDbClient,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Where and how mess collections are read
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_region")]
    pub region: String,
    /// Overrides the regional endpoint, e.g. `http://localhost:8000` for DynamoDB Local
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub collection_prefix: String,
    #[serde(default = "default_document_id_attribute")]
    pub document_id_attribute: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub enable_json_logging: bool,
}

impl Config {
    /// Load settings from `MESSMENU_*` variables and build the DynamoDB
    /// client. Credentials come from the default AWS provider chain.
    pub async fn from_environment() -> Result<Self, ConfigError> {
        let server = ServerConfig::from_env()?;
        let store = StoreConfig::from_env()?;
        let observability = ObservabilityConfig::from_env()?;

        server.validate()?;
        store.validate()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(store.region.clone()));
        if let Some(endpoint_url) = &store.endpoint_url {
            loader = loader.endpoint_url(endpoint_url.clone());
        }
        let aws_config = loader.load().await;
        let dynamodb_client = DynamoDbClient::new(&aws_config);

        let config = Config {
            server,
            store,
            observability,
            dynamodb_client,
        };

        info!("Configuration loaded successfully");
        debug!("Configuration: {:?}", config);

        Ok(config)
    }
}

fn load<T: for<'de> Deserialize<'de>>(section: &str) -> Result<T, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to load {} config: {}", section, e),
        })?;

    settings
        .try_deserialize()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to deserialize {} config: {}", section, e),
        })
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        load("server")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::ValidationError {
                message: "Server port cannot be 0".to_string(),
            });
        }
        Ok(())
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        load("store")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.region.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Store region cannot be empty".to_string(),
            });
        }
        if self.document_id_attribute.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Document id attribute cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        load("observability")
    }
}

// Default value functions
pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    3000
}

pub(crate) fn default_region() -> String {
    "us-west-2".to_string()
}

pub(crate) fn default_document_id_attribute() -> String {
    "id".to_string()
}

pub(crate) fn default_service_name() -> String {
    "mess-menu".to_string()
}

pub(crate) fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}
