//! Configuration module
//!
//! Environment-driven configuration for the ClauseGuard API: server, database,
//! blob cache, session signing, AI model, Google sign-in, Stripe and SMTP.

use std::env;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_EXPIRY_HOURS: i64 = 24;
const SERVER_PORT: u16 = 8080;

/// Settings every deployment needs regardless of which integrations are on.
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub environment: String,
}

/// Full service configuration.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub base: BaseConfig,
    pub database_url: String,
    pub redis_url: String,
    // Uploads
    pub max_contract_size_bytes: usize,
    // Anthropic Messages API
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub anthropic_max_tokens: u32,
    // Google sign-in
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_callback_url: String,
    /// Browser client, used for post-login and checkout redirects
    pub client_url: String,
    // Stripe
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub premium_price_cents: i64,
    // Email notifications
    pub email_enabled: bool,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
    pub smtp_tls: bool,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl Config {
    fn as_service(&self) -> &ServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.as_service().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_service().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_service().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_service().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_service().base.environment
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_service().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_service().base.db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_service().base.jwt_secret
    }

    pub fn jwt_expiry_hours(&self) -> i64 {
        self.as_service().base.jwt_expiry_hours
    }

    pub fn database_url(&self) -> &str {
        &self.as_service().database_url
    }

    pub fn redis_url(&self) -> &str {
        &self.as_service().redis_url
    }

    pub fn max_contract_size_bytes(&self) -> usize {
        self.as_service().max_contract_size_bytes
    }

    pub fn anthropic_api_key(&self) -> &str {
        &self.as_service().anthropic_api_key
    }

    pub fn anthropic_model(&self) -> &str {
        &self.as_service().anthropic_model
    }

    pub fn anthropic_max_tokens(&self) -> u32 {
        self.as_service().anthropic_max_tokens
    }

    pub fn google_client_id(&self) -> &str {
        &self.as_service().google_client_id
    }

    pub fn google_client_secret(&self) -> &str {
        &self.as_service().google_client_secret
    }

    pub fn google_callback_url(&self) -> &str {
        &self.as_service().google_callback_url
    }

    pub fn client_url(&self) -> &str {
        self.as_service().client_url.trim_end_matches('/')
    }

    pub fn stripe_secret_key(&self) -> &str {
        &self.as_service().stripe_secret_key
    }

    pub fn stripe_webhook_secret(&self) -> &str {
        &self.as_service().stripe_webhook_secret
    }

    pub fn premium_price_cents(&self) -> i64 {
        self.as_service().premium_price_cents
    }

    pub fn email_enabled(&self) -> bool {
        self.as_service().email_enabled
    }

    pub fn smtp_host(&self) -> Option<&str> {
        self.as_service().smtp_host.as_deref()
    }

    pub fn smtp_port(&self) -> Option<u16> {
        self.as_service().smtp_port
    }

    pub fn smtp_user(&self) -> Option<&str> {
        self.as_service().smtp_user.as_deref()
    }

    pub fn smtp_password(&self) -> Option<&str> {
        self.as_service().smtp_password.as_deref()
    }

    pub fn smtp_from(&self) -> Option<&str> {
        self.as_service().smtp_from.as_deref()
    }

    pub fn smtp_tls(&self) -> bool {
        self.as_service().smtp_tls
    }
}

fn required(name: &str) -> Result<String, anyhow::Error> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} must be set", name))
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const MAX_CONTRACT_SIZE_MB: usize = 10;
        const ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
        const ANTHROPIC_MAX_TOKENS: u32 = 4096;
        const PREMIUM_PRICE_CENTS: i64 = 1000;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_contract_size_mb = env::var("MAX_CONTRACT_SIZE_MB")
            .unwrap_or_else(|_| MAX_CONTRACT_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_CONTRACT_SIZE_MB);

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| JWT_EXPIRY_HOURS.to_string())
                .parse()
                .unwrap_or(JWT_EXPIRY_HOURS),
            environment,
        };

        let config = ServiceConfig {
            base,
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            max_contract_size_bytes: max_contract_size_mb * 1024 * 1024,
            anthropic_api_key: required("ANTHROPIC_API_KEY")?,
            anthropic_model: env::var("ANTHROPIC_MODEL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| ANTHROPIC_MODEL.to_string()),
            anthropic_max_tokens: env::var("ANTHROPIC_MAX_TOKENS")
                .unwrap_or_else(|_| ANTHROPIC_MAX_TOKENS.to_string())
                .parse()
                .unwrap_or(ANTHROPIC_MAX_TOKENS),
            google_client_id: required("GOOGLE_CLIENT_ID")?,
            google_client_secret: required("GOOGLE_CLIENT_SECRET")?,
            google_callback_url: required("GOOGLE_CALLBACK_URL")?,
            client_url: env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
            premium_price_cents: env::var("PREMIUM_PRICE_CENTS")
                .unwrap_or_else(|_| PREMIUM_PRICE_CENTS.to_string())
                .parse()
                .unwrap_or(PREMIUM_PRICE_CENTS),
            email_enabled: env::var("EMAIL_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            smtp_host: env::var("SMTP_HOST").ok().filter(|s| !s.is_empty()),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&p| p > 0),
            smtp_user: env::var("SMTP_USER").ok().filter(|s| !s.is_empty()),
            smtp_password: env::var("SMTP_PASSWORD").ok().filter(|s| !s.is_empty()),
            smtp_from: env::var("SMTP_FROM").ok().filter(|s| !s.is_empty()),
            smtp_tls: env::var("SMTP_TLS")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let env = self.base.environment.to_lowercase();
        let is_production = env == "production" || env == "prod";
        if is_production && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if !self.redis_url.starts_with("redis://") && !self.redis_url.starts_with("rediss://") {
            return Err(anyhow::anyhow!("REDIS_URL must be a redis:// or rediss:// URL"));
        }

        if self.max_contract_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_CONTRACT_SIZE_MB must be greater than 0"));
        }

        if self.premium_price_cents <= 0 {
            return Err(anyhow::anyhow!("PREMIUM_PRICE_CENTS must be positive"));
        }

        if self.email_enabled && (self.smtp_host.is_none() || self.smtp_from.is_none()) {
            return Err(anyhow::anyhow!(
                "EMAIL_ENABLED=true requires SMTP_HOST and SMTP_FROM to be set"
            ));
        }

        Ok(())
    }
}
