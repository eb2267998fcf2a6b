//! Login throttling per client IP and per account

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// At most `max` hits inside any rolling `window`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub max: usize,
    pub window: Duration,
}

/// Login attempts per client IP
pub const LOGIN_PER_IP: Limit = Limit {
    max: 5,
    window: Duration::from_secs(60),
};

/// Failed passwords per account before it is locked for the rest of the window
pub const FAILED_LOGINS_PER_ACCOUNT: Limit = Limit {
    max: 10,
    window: Duration::from_secs(15 * 60),
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
    Ip(String),
    Account(String),
}

impl Key {
    fn limit(&self) -> Limit {
        match self {
            Key::Ip(_) => LOGIN_PER_IP,
            Key::Account(_) => FAILED_LOGINS_PER_ACCOUNT,
        }
    }
}

/// Login throttling: a rolling window per client IP, plus a lockout per
/// account fed only by wrong passwords. Accounts are keyed by normalized
/// email so the lockout also covers logins from many addresses.
#[derive(Clone, Default)]
pub struct RateLimiter {
    hits: Arc<Mutex<HashMap<Key, VecDeque<Instant>>>>,
}

/// Drop hits that fell out of the window ending at `now`
fn prune(hits: &mut VecDeque<Instant>, window: Duration, now: Instant) {
    while hits
        .front()
        .is_some_and(|t| now.saturating_duration_since(*t) >= window)
    {
        hits.pop_front();
    }
}

/// Time until the oldest hit leaves the window, if the window is full
fn retry_after(hits: &VecDeque<Instant>, limit: Limit, now: Instant) -> Option<Duration> {
    if hits.len() < limit.max {
        return None;
    }
    let oldest = hits.front()?;
    Some(limit.window.saturating_sub(now.saturating_duration_since(*oldest)))
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a login attempt from `ip`. `Err` carries the wait before the
    /// next attempt is allowed; rejected attempts are not counted.
    pub async fn hit_ip(&self, ip: &str) -> Result<(), Duration> {
        self.hit_at(Key::Ip(ip.to_owned()), Instant::now()).await
    }

    /// Remaining lockout for `email`, if it has too many recent failures
    pub async fn account_locked(&self, email: &str) -> Option<Duration> {
        self.locked_at(&Key::Account(email.to_owned()), Instant::now()).await
    }

    pub async fn record_failure(&self, email: &str) {
        // A full window only means the account stays locked
        let _ = self
            .hit_at(Key::Account(email.to_owned()), Instant::now())
            .await;
    }

    /// Forget failures after a successful login
    pub async fn clear_account(&self, email: &str) {
        self.hits.lock().await.remove(&Key::Account(email.to_owned()));
    }

    async fn hit_at(&self, key: Key, now: Instant) -> Result<(), Duration> {
        let limit = key.limit();
        let mut map = self.hits.lock().await;
        let hits = map.entry(key).or_default();
        prune(hits, limit.window, now);
        if let Some(wait) = retry_after(hits, limit, now) {
            return Err(wait);
        }
        hits.push_back(now);
        Ok(())
    }

    async fn locked_at(&self, key: &Key, now: Instant) -> Option<Duration> {
        let limit = key.limit();
        let mut map = self.hits.lock().await;
        let hits = map.get_mut(key)?;
        prune(hits, limit.window, now);
        retry_after(hits, limit, now)
    }

    /// Drop keys with no hit left in their window
    pub async fn cleanup(&self) {
        self.cleanup_at(Instant::now()).await;
    }

    async fn cleanup_at(&self, now: Instant) {
        let mut map = self.hits.lock().await;
        map.retain(|key, hits| {
            prune(hits, key.limit().window, now);
            !hits.is_empty()
        });
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.hits.lock().await.len()
    }
}

/// `TooManyRequests` telling the client how long to wait
pub fn too_many_requests(wait: Duration) -> AppError {
    let secs = wait.as_secs().max(1);
    AppError::with_message(
        ErrorCode::TooManyRequests,
        format!("Too many login attempts, try again in {secs}s"),
    )
    .with_detail("retry_after_secs", secs)
}

/// Client IP: first `X-Forwarded-For` entry, then the peer address.
pub fn extract_ip(request: &Request) -> String {
    client_ip(
        request.headers(),
        request
            .extensions()
            .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
            .map(|ci| ci.0),
    )
}

pub fn client_ip(headers: &http::HeaderMap, peer: Option<std::net::SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let ip = first.trim();
        if !ip.is_empty() {
            return ip.to_owned();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

/// Login: [`LOGIN_PER_IP`] attempts per client IP
pub async fn login_rate_limit(
    State(state): State<crate::state::AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = extract_ip(&request);
    if let Err(wait) = state.rate_limiter.hit_ip(&ip).await {
        tracing::warn!(ip = %ip, retry_after_secs = wait.as_secs(), "Login rate limit exceeded");
        return Err(too_many_requests(wait));
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[tokio::test]
    async fn ip_window_rolls() {
        let limiter = RateLimiter::new();
        let ip = || Key::Ip("10.0.0.1".into());
        let t0 = Instant::now();
        for i in 0..LOGIN_PER_IP.max as u64 {
            assert!(limiter.hit_at(ip(), t0 + secs(i)).await.is_ok());
        }
        // Oldest hit (t0) leaves the window at t0 + 60s
        assert_eq!(limiter.hit_at(ip(), t0 + secs(20)).await, Err(secs(40)));
        assert!(limiter.hit_at(ip(), t0 + secs(60)).await.is_ok());
        assert!(limiter.hit_at(ip(), t0 + secs(60)).await.is_err());
    }

    #[tokio::test]
    async fn ips_are_independent() {
        let limiter = RateLimiter::new();
        let t0 = Instant::now();
        for _ in 0..LOGIN_PER_IP.max {
            limiter.hit_at(Key::Ip("10.0.0.1".into()), t0).await.unwrap();
        }
        assert!(limiter.hit_at(Key::Ip("10.0.0.1".into()), t0).await.is_err());
        assert!(limiter.hit_at(Key::Ip("10.0.0.2".into()), t0).await.is_ok());
    }

    #[tokio::test]
    async fn account_locks_after_failures_and_clears_on_success() {
        let limiter = RateLimiter::new();
        let email = "cook@bistro.test";
        for _ in 0..FAILED_LOGINS_PER_ACCOUNT.max - 1 {
            limiter.record_failure(email).await;
        }
        assert_eq!(limiter.account_locked(email).await, None);

        limiter.record_failure(email).await;
        let wait = limiter.account_locked(email).await.unwrap();
        assert!(wait > secs(14 * 60) && wait <= FAILED_LOGINS_PER_ACCOUNT.window);
        assert_eq!(limiter.account_locked("chef@bistro.test").await, None);

        limiter.clear_account(email).await;
        assert_eq!(limiter.account_locked(email).await, None);
    }

    #[tokio::test]
    async fn account_lock_expires_with_window() {
        let limiter = RateLimiter::new();
        let key = Key::Account("cook@bistro.test".into());
        let t0 = Instant::now();
        for _ in 0..FAILED_LOGINS_PER_ACCOUNT.max {
            let _ = limiter.hit_at(key.clone(), t0).await;
        }
        assert!(limiter.locked_at(&key, t0 + secs(60)).await.is_some());
        assert!(limiter.locked_at(&key, t0 + FAILED_LOGINS_PER_ACCOUNT.window).await.is_none());
    }

    #[tokio::test]
    async fn cleanup_drops_expired_keys_only() {
        let limiter = RateLimiter::new();
        let t0 = Instant::now();
        limiter.hit_at(Key::Ip("10.0.0.1".into()), t0).await.unwrap();
        limiter.hit_at(Key::Account("cook@bistro.test".into()), t0).await.unwrap();

        limiter.cleanup_at(t0 + secs(30)).await;
        assert_eq!(limiter.tracked().await, 2);
        // IP window is 60s, account window 15min
        limiter.cleanup_at(t0 + secs(61)).await;
        assert_eq!(limiter.tracked().await, 1);
    }

    #[test]
    fn retry_after_reported_in_whole_seconds() {
        let err = too_many_requests(Duration::from_millis(300));
        assert_eq!(err.code, ErrorCode::TooManyRequests);
        assert_eq!(err.details.unwrap()["retry_after_secs"], 1);
    }

    #[test]
    fn forwarded_for_wins_over_peer() {
        let mut headers = http::HeaderMap::new();
        let peer = Some("192.168.1.9:5000".parse().unwrap());
        assert_eq!(client_ip(&headers, peer), "192.168.1.9");
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        assert_eq!(client_ip(&headers, peer), "203.0.113.7");
        assert_eq!(client_ip(&http::HeaderMap::new(), None), "unknown");
    }
}
