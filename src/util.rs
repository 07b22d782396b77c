use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use crate::backend::{HttpTeacherApi, TeacherApi};
use crate::session::SessionStore;
use crate::stream::DEFAULT_WORD_DELAY;

/// Initialize dotenv and structured tracing based on RUST_LOG.
///
/// Environment files are resolved in order:
/// - an explicit path via ENV_FILE / DOTENV_PATH
/// - the default `.env` in the working directory
pub fn init_tracing() {
    let mut env_source: String = "none".into();
    for key in ["ENV_FILE", "DOTENV_PATH"] {
        if let Ok(p) = std::env::var(key) {
            let p = p.trim();
            if !p.is_empty()
                && std::path::Path::new(p).is_file()
                && dotenvy::from_filename(p).is_ok()
            {
                env_source = format!("{p} ({key})");
                break;
            }
        }
    }

    if env_source == "none" && dotenvy::dotenv().is_ok() {
        env_source = ".env".into();
    }

    // Initialize tracing (respects RUST_LOG potentially provided by the env file)
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=info".into());
    let subscriber = fmt().with_env_filter(EnvFilter::new(filter)).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    tracing::info!("Environment loaded from: {}", env_source);
}

/// Get the bind address for the HTTP server.
///
/// BIND_ADDR takes precedence; a bare PORT (the convention of container
/// platforms) binds all interfaces on that port; default is 0.0.0.0:8080.
pub fn env_bind_addr() -> String {
    if let Ok(addr) = std::env::var("BIND_ADDR") {
        let addr = addr.trim().to_string();
        if !addr.is_empty() {
            return addr;
        }
    }
    if let Ok(port) = std::env::var("PORT") {
        if let Ok(n) = port.trim().parse::<u16>() {
            return format!("0.0.0.0:{n}");
        }
    }
    "0.0.0.0:8080".into()
}

/// Resolve the tutoring backend base URL from the environment.
pub fn teacher_api_url() -> String {
    std::env::var("TEACHER_API_URL")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "https://backend-teacher-production.up.railway.app".into())
}

/// Inter-token delay for streamed replies, overridable for latency tuning.
pub fn stream_delay_from_env() -> Duration {
    std::env::var("TUTORBRIDGE_STREAM_DELAY_MS")
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_WORD_DELAY)
}

/// Build an HTTP client honoring proxy and timeout environment variables.
///
/// Environment:
/// - TUTORBRIDGE_NO_PROXY = 1|true|yes|on   -> disable all proxies
/// - TUTORBRIDGE_PROXY_URL = <url>          -> proxy for all schemes
/// - TUTORBRIDGE_HTTP_TIMEOUT_SECONDS       -> overall request timeout (default 60)
pub fn build_http_client_from_env() -> reqwest::Client {
    let mut builder = reqwest::Client::builder();

    let timeout_secs = std::env::var("TUTORBRIDGE_HTTP_TIMEOUT_SECONDS")
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(60);
    builder = builder.timeout(Duration::from_secs(timeout_secs));

    let no_proxy = std::env::var("TUTORBRIDGE_NO_PROXY")
        .map(|v| v.trim().to_ascii_lowercase())
        .map(|v| v == "1" || v == "true" || v == "yes" || v == "on")
        .unwrap_or(false);

    if no_proxy {
        builder = builder.no_proxy();
    } else if let Ok(url) = std::env::var("TUTORBRIDGE_PROXY_URL") {
        let u = url.trim();
        if !u.is_empty() {
            if let Ok(p) = reqwest::Proxy::all(u) {
                builder = builder.proxy(p);
            }
        }
    }

    // User-Agent for observability
    builder = builder.user_agent(format!("tutorbridge/{}", env!("CARGO_PKG_VERSION")));

    builder.build().unwrap_or_else(|_| reqwest::Client::new())
}

/// Shared application state used by the HTTP server and handlers.
#[derive(Clone)]
pub struct AppState {
    pub teacher: Arc<dyn TeacherApi>,
    pub sessions: SessionStore,
    /// Kept for the service-info endpoint; the client owns the URL otherwise.
    pub backend_url: String,
    pub stream_delay: Duration,
}

impl AppState {
    /// Assemble state from the environment: one shared HTTP client pointed
    /// at the configured backend, and an empty session store.
    pub fn from_env() -> Self {
        let backend_url = teacher_api_url();
        let client = HttpTeacherApi::new(build_http_client_from_env(), backend_url.clone());
        Self {
            teacher: Arc::new(client),
            sessions: SessionStore::new(),
            backend_url,
            stream_delay: stream_delay_from_env(),
        }
    }

    /// Assemble state around an injected backend client (tests, embedding).
    pub fn with_teacher(teacher: Arc<dyn TeacherApi>, backend_url: impl Into<String>) -> Self {
        Self {
            teacher,
            sessions: SessionStore::new(),
            backend_url: backend_url.into(),
            stream_delay: Duration::ZERO,
        }
    }
}

/// Build a CORS layer from environment variables.
///
/// Environment variables:
/// - CORS_ALLOWED_ORIGINS: "*" or comma-separated origins
/// - CORS_ALLOWED_METHODS: "*" or comma-separated methods
/// - CORS_ALLOWED_HEADERS: "*" or comma-separated request header names
/// - CORS_MAX_AGE: max age in seconds (u64)
///
/// Defaults are permissive (Any): avatar platforms call the bridge from
/// browser contexts with unpredictable origins.
pub fn cors_layer_from_env() -> tower_http::cors::CorsLayer {
    let mut layer = tower_http::cors::CorsLayer::new();

    // Allowed origins
    if let Ok(origins) = std::env::var("CORS_ALLOWED_ORIGINS") {
        let s = origins.trim();
        if s == "*" {
            layer = layer.allow_origin(tower_http::cors::Any);
        } else {
            let mut vals = Vec::new();
            for part in s.split(',') {
                let p = part.trim();
                if p.is_empty() {
                    continue;
                }
                if let Ok(hv) = http::HeaderValue::from_str(p) {
                    vals.push(hv);
                }
            }
            if !vals.is_empty() {
                layer = layer.allow_origin(tower_http::cors::AllowOrigin::list(vals));
            } else {
                layer = layer.allow_origin(tower_http::cors::Any);
            }
        }
    } else {
        layer = layer.allow_origin(tower_http::cors::Any);
    }

    // Allowed methods
    if let Ok(methods) = std::env::var("CORS_ALLOWED_METHODS") {
        let s = methods.trim();
        if s == "*" {
            layer = layer.allow_methods(tower_http::cors::Any);
        } else {
            let mut vals = Vec::new();
            for part in s.split(',') {
                let p = part.trim().to_ascii_uppercase();
                if p.is_empty() {
                    continue;
                }
                if let Ok(m) = http::Method::from_bytes(p.as_bytes()) {
                    vals.push(m);
                }
            }
            if !vals.is_empty() {
                layer = layer.allow_methods(tower_http::cors::AllowMethods::list(vals));
            } else {
                layer = layer.allow_methods(tower_http::cors::Any);
            }
        }
    } else {
        layer = layer.allow_methods(tower_http::cors::Any);
    }

    // Allowed headers
    if let Ok(headers) = std::env::var("CORS_ALLOWED_HEADERS") {
        let s = headers.trim();
        if s == "*" {
            layer = layer.allow_headers(tower_http::cors::Any);
        } else {
            let mut vals = Vec::new();
            for part in s.split(',') {
                let p = part.trim();
                if p.is_empty() {
                    continue;
                }
                if let Ok(h) = http::header::HeaderName::try_from(p) {
                    vals.push(h);
                }
            }
            if !vals.is_empty() {
                layer = layer.allow_headers(tower_http::cors::AllowHeaders::list(vals));
            } else {
                layer = layer.allow_headers(tower_http::cors::Any);
            }
        }
    } else {
        layer = layer.allow_headers(tower_http::cors::Any);
    }

    // Max age
    if let Ok(secs) = std::env::var("CORS_MAX_AGE") {
        if let Ok(n) = secs.trim().parse::<u64>() {
            layer = layer.max_age(Duration::from_secs(n));
        }
    }

    layer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bind_addr_when_unset() {
        std::env::remove_var("BIND_ADDR");
        std::env::remove_var("PORT");
        assert_eq!(env_bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn default_stream_delay() {
        std::env::remove_var("TUTORBRIDGE_STREAM_DELAY_MS");
        assert_eq!(stream_delay_from_env(), DEFAULT_WORD_DELAY);
    }
}
