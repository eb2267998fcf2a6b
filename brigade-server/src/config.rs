//! Server configuration

use crate::error::BoxError;

/// Where uploaded media is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaBackend {
    /// Files under `media_dir`, served at `/media/*`
    Local,
    /// Objects in `s3_bucket`
    S3,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT signing secret
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,

    pub media_backend: MediaBackend,
    /// Root directory for the local media store
    pub media_dir: String,
    pub s3_bucket: Option<String>,
    /// Public base URL prepended to media keys
    pub media_base_url: String,

    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Ollama base URL; unset disables the provider
    pub ollama_url: Option<String>,
    pub ollama_model: String,
    /// Per-provider timeout
    pub vision_timeout_secs: u64,
    /// Minimum score for a review to pass
    pub ai_pass_score: i32,

    pub fcm_endpoint: String,
    /// FCM legacy server key; unset disables push
    pub fcm_server_key: Option<String>,

    /// Bootstrap superadmin, created on first start if no superadmin exists
    pub superadmin_email: Option<String>,
    pub superadmin_password: Option<String>,
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env_opt(name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = env_or("ENVIRONMENT", "development");

        let media_backend = match env_or("MEDIA_BACKEND", "local").as_str() {
            "local" => MediaBackend::Local,
            "s3" => MediaBackend::S3,
            other => return Err(format!("MEDIA_BACKEND must be local or s3, got '{other}'").into()),
        };
        let s3_bucket = env_opt("S3_BUCKET");
        if media_backend == MediaBackend::S3 && s3_bucket.is_none() {
            return Err("S3_BUCKET must be set when MEDIA_BACKEND=s3".into());
        }

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: env_parse("HTTP_PORT", 8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            jwt_expiry_hours: env_parse("JWT_EXPIRY_HOURS", 24),
            environment,
            media_backend,
            media_dir: env_or("MEDIA_DIR", "./media"),
            s3_bucket,
            media_base_url: env_or("MEDIA_BASE_URL", "/media"),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            openai_model: env_or("OPENAI_MODEL", "gpt-4o-mini"),
            gemini_api_key: env_opt("GEMINI_API_KEY"),
            gemini_model: env_or("GEMINI_MODEL", "gemini-1.5-flash"),
            ollama_url: env_opt("OLLAMA_URL"),
            ollama_model: env_or("OLLAMA_MODEL", "llava"),
            vision_timeout_secs: env_parse("VISION_TIMEOUT_SECS", 30),
            ai_pass_score: env_parse::<i32>("AI_PASS_SCORE", 70).clamp(0, 100),
            fcm_endpoint: env_or("FCM_ENDPOINT", "https://fcm.googleapis.com/fcm/send"),
            fcm_server_key: env_opt("FCM_SERVER_KEY"),
            superadmin_email: env_opt("SUPERADMIN_EMAIL"),
            superadmin_password: env_opt("SUPERADMIN_PASSWORD"),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
