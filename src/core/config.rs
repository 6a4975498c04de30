use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub moderation: ModerationConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Tuning knobs for the image moderation pipeline.
///
/// The two score thresholds split final verdicts into three bands:
/// below `flag_threshold` is auto-approved, between the thresholds is
/// flagged for human review, at or above `nsfw_threshold` is rejected.
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// Scores at or above this value require human review
    pub flag_threshold: f64,
    /// Scores at or above this value are rejected outright
    pub nsfw_threshold: f64,
    /// Smallest accepted image edge in pixels
    pub min_dimension: u32,
    /// Largest accepted image edge in pixels
    pub max_dimension: u32,
    /// Analyze every Nth pixel of the decoded image
    pub sample_stride: usize,
    /// Interval between background sweeps of pending images
    pub poll_interval_secs: u64,
    /// Maximum pending images processed per sweep
    pub batch_size: i64,
    /// API key for the external NSFW classifier; absence disables the integration
    pub nsfw_api_key: Option<String>,
    /// Endpoint of the external NSFW classifier
    pub nsfw_api_url: String,
    /// Hard timeout for external classifier calls
    pub nsfw_api_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            moderation: ModerationConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    // Default values for database connection pool (conservative defaults for small-medium apps)
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl ModerationConfig {
    const DEFAULT_FLAG_THRESHOLD: f64 = 0.5;
    const DEFAULT_NSFW_THRESHOLD: f64 = 0.7;
    const DEFAULT_MIN_DIMENSION: u32 = 50;
    const DEFAULT_MAX_DIMENSION: u32 = 10000;
    const DEFAULT_SAMPLE_STRIDE: usize = 10;
    const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;
    const DEFAULT_BATCH_SIZE: i64 = 20;
    const DEFAULT_NSFW_API_TIMEOUT_SECS: u64 = 8;

    pub fn from_env() -> Result<Self, String> {
        let flag_threshold = env::var("MODERATION_FLAG_THRESHOLD")
            .unwrap_or_else(|_| Self::DEFAULT_FLAG_THRESHOLD.to_string())
            .parse::<f64>()
            .map_err(|_| "MODERATION_FLAG_THRESHOLD must be a valid number".to_string())?;

        let nsfw_threshold = env::var("MODERATION_NSFW_THRESHOLD")
            .unwrap_or_else(|_| Self::DEFAULT_NSFW_THRESHOLD.to_string())
            .parse::<f64>()
            .map_err(|_| "MODERATION_NSFW_THRESHOLD must be a valid number".to_string())?;

        if !(0.0..=1.0).contains(&flag_threshold) || !(0.0..=1.0).contains(&nsfw_threshold) {
            return Err("Moderation thresholds must be within 0.0..=1.0".to_string());
        }
        if flag_threshold > nsfw_threshold {
            return Err(
                "MODERATION_FLAG_THRESHOLD must not exceed MODERATION_NSFW_THRESHOLD".to_string(),
            );
        }

        let min_dimension = env::var("MODERATION_MIN_DIMENSION")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_DIMENSION.to_string())
            .parse::<u32>()
            .map_err(|_| "MODERATION_MIN_DIMENSION must be a valid number".to_string())?;

        let max_dimension = env::var("MODERATION_MAX_DIMENSION")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_DIMENSION.to_string())
            .parse::<u32>()
            .map_err(|_| "MODERATION_MAX_DIMENSION must be a valid number".to_string())?;

        let sample_stride = env::var("MODERATION_SAMPLE_STRIDE")
            .unwrap_or_else(|_| Self::DEFAULT_SAMPLE_STRIDE.to_string())
            .parse::<usize>()
            .map_err(|_| "MODERATION_SAMPLE_STRIDE must be a valid number".to_string())?
            .max(1);

        let poll_interval_secs = env::var("MODERATION_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_POLL_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "MODERATION_POLL_INTERVAL_SECS must be a valid number".to_string())?;

        let batch_size = env::var("MODERATION_BATCH_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_BATCH_SIZE.to_string())
            .parse::<i64>()
            .map_err(|_| "MODERATION_BATCH_SIZE must be a valid number".to_string())?;

        // Only use the key if it is non-empty; an empty value disables the adapter
        let nsfw_api_key = env::var("NSFW_API_KEY").ok().filter(|s| !s.is_empty());

        let nsfw_api_url = env::var("NSFW_API_URL")
            .unwrap_or_else(|_| "https://api.deepai.org/api/nsfw-detector".to_string());

        let nsfw_api_timeout_secs = env::var("NSFW_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_NSFW_API_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "NSFW_API_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            flag_threshold,
            nsfw_threshold,
            min_dimension,
            max_dimension,
            sample_stride,
            poll_interval_secs,
            batch_size,
            nsfw_api_key,
            nsfw_api_url,
            nsfw_api_timeout: Duration::from_secs(nsfw_api_timeout_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Adboard API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Image moderation API for the Adboard marketplace".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}
