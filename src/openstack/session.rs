//! OpenStack Session
//!
//! Combines authentication, token caching, and per-service clients.
//! A session is created once at startup and shared by every handler;
//! the scoped token is cached and reissued shortly before it expires.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use url::Url;

use super::auth::{self, Credentials};
use super::catalog::{Service, ServiceCatalog};
use super::http::HttpClient;
use crate::config::OpenStackConfig;

/// Token expiry buffer - reissue tokens this much before they actually expire
/// This prevents using tokens that are about to expire during a request
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL when Keystone omits the expiry timestamp
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Authenticated OpenStack session with token caching
#[derive(Debug)]
pub struct Session {
    http: HttpClient,
    credentials: Credentials,
    region: String,
    cache: RwLock<Option<CachedToken>>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    catalog: Arc<ServiceCatalog>,
    /// When this token stops being usable (buffer already applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Translate a Keystone expiry timestamp into a local deadline
fn deadline_from(expires_at: Option<DateTime<Utc>>) -> Instant {
    let ttl = expires_at
        .map(|at| (at - Utc::now()).to_std().unwrap_or(Duration::ZERO))
        .unwrap_or(DEFAULT_TOKEN_TTL);
    Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER)
}

impl Session {
    /// Authenticate against Keystone and build a reusable session.
    ///
    /// Fails when the auth URL is malformed or the credentials are
    /// rejected, so misconfiguration surfaces at startup rather than
    /// on the first request.
    pub async fn connect(config: &OpenStackConfig) -> Result<Self> {
        Url::parse(&config.auth_url)
            .with_context(|| format!("invalid auth URL '{}'", config.auth_url))?;

        let session = Self {
            http: HttpClient::new()?,
            credentials: Credentials::from(config),
            region: config.region.clone(),
            cache: RwLock::new(None),
        };

        session
            .current()
            .await
            .context("failed to authenticate with OpenStack")?;

        Ok(session)
    }

    /// Get a valid token and catalog, reissuing when the cached one has expired
    async fn current(&self) -> Result<CachedToken> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.clone());
                }
                tracing::debug!("cached token expired, requesting a new one");
            }
        }

        let issued = auth::issue_token(&self.http, &self.credentials).await?;
        let cached = CachedToken {
            token: issued.token,
            catalog: Arc::new(issued.catalog),
            expires_at: deadline_from(issued.expires_at),
        };

        {
            let mut cache = self.cache.write().await;
            *cache = Some(cached.clone());
        }

        tracing::debug!(region = %self.region, "token issued and cached");

        Ok(cached)
    }

    /// Build a client for one service by resolving its catalog endpoint
    pub async fn service_client(&self, service: Service) -> Result<ServiceClient<'_>> {
        let cached = self.current().await?;
        let base = cached
            .catalog
            .endpoint_url(service, &self.region)
            .with_context(|| format!("failed to create {} client", service))?;

        Ok(ServiceClient {
            session: self,
            base,
        })
    }
}

/// Client scoped to one service endpoint from the catalog
pub struct ServiceClient<'a> {
    session: &'a Session,
    base: String,
}

impl ServiceClient<'_> {
    /// Join a request path onto the service endpoint
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    /// GET a path relative to the service endpoint
    pub async fn get(&self, path: &str) -> Result<Value> {
        self.get_url(&self.url(path)).await
    }

    /// GET an absolute URL with the session token. Pagination links come
    /// back absolute, so they bypass the path join.
    pub async fn get_url(&self, url: &str) -> Result<Value> {
        let cached = self.session.current().await?;
        self.session.http.get(url, &cached.token).await
    }
}
