use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    #[serde(default)]
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
    pub cors_allowed_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("storage", "postgres")?
            .set_default("database_max_connections", 20)?
            .set_default("access_token_ttl_minutes", 24 * 60)?
            .set_default("bcrypt_cost", i64::from(bcrypt::DEFAULT_COST))?
            .set_default("cors_allowed_origin", "http://localhost:5173")?
            .add_source(config::Environment::default())
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.jwt_secret.len() < 32 {
            return Err(config::ConfigError::Message(
                "JWT_SECRET must be at least 32 characters long".to_string(),
            ));
        }
        if self.storage == StorageBackend::Postgres && self.database_url.is_empty() {
            return Err(config::ConfigError::Message(
                "DATABASE_URL is required when STORAGE=postgres".to_string(),
            ));
        }
        Ok(())
    }
}
