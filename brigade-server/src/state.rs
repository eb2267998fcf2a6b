//! Application state shared by all handlers

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{JwtConfig, RateLimiter};
use crate::config::{Config, MediaBackend};
use crate::error::BoxError;
use crate::media::{LocalMediaStore, MediaStore, S3MediaStore};
use crate::notify::{FcmPushSender, NoopPushSender, Notifier, PushSender};
use crate::vision::VisionChain;

#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    pub jwt: Arc<JwtConfig>,
    /// Rate limiter for the login route
    pub rate_limiter: RateLimiter,
    /// Uploaded photos (local disk or S3)
    pub media: Arc<dyn MediaStore>,
    /// Set when media is served from local disk under `/media`
    pub local_media_dir: Option<PathBuf>,
    /// Ordered vision providers for AI photo review
    pub vision: Arc<VisionChain>,
    pub notifier: Notifier,
    /// Minimum score for an AI review to pass
    pub ai_pass_score: i32,
}

impl AppState {
    /// Connect, migrate and wire up external services
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.vision_timeout_secs.max(1) + 5))
            .build()?;

        let (media, local_media_dir): (Arc<dyn MediaStore>, Option<PathBuf>) =
            match config.media_backend {
                MediaBackend::Local => {
                    let store = LocalMediaStore::new(&config.media_dir, &config.media_base_url);
                    let root = store.root().to_path_buf();
                    (Arc::new(store), Some(root))
                }
                MediaBackend::S3 => {
                    let bucket = config
                        .s3_bucket
                        .clone()
                        .ok_or("S3_BUCKET must be set when MEDIA_BACKEND=s3")?;
                    let store = S3MediaStore::from_env(bucket, &config.media_base_url).await;
                    (Arc::new(store), None)
                }
            };

        let sender: Arc<dyn PushSender> = match &config.fcm_server_key {
            Some(key) => Arc::new(FcmPushSender::new(
                config.fcm_endpoint.clone(),
                key.clone(),
                http.clone(),
            )),
            None => {
                tracing::info!("FCM_SERVER_KEY not set, push notifications disabled");
                Arc::new(NoopPushSender)
            }
        };

        let vision = VisionChain::from_config(config, http);
        if vision.is_empty() {
            tracing::warn!("No vision provider configured, AI photo review disabled");
        } else {
            tracing::info!(providers = ?vision.provider_names(), "Vision providers configured");
        }

        Ok(Self {
            pool,
            jwt: Arc::new(JwtConfig::new(&config.jwt_secret, config.jwt_expiry_hours)),
            rate_limiter: RateLimiter::new(),
            media,
            local_media_dir,
            vision: Arc::new(vision),
            notifier: Notifier::new(sender),
            ai_pass_score: config.ai_pass_score,
        })
    }
}
