//! Shared REST transport
//!
//! All four partner clients ride on `RestClient`: API-key header, fixed
//! timeouts, fixed-attempt retry for transient failures, circuit breaker,
//! and uniform mapping of HTTP statuses onto `PortError`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::warn;

use core_kernel::{
    AdapterHealth, CircuitBreakerConfig, HealthCheckResult, HealthCheckable, PortError,
};

use crate::config::PartnerConfig;

/// Circuit breaker state for fault tolerance
#[derive(Debug)]
struct CircuitBreaker {
    config: CircuitBreakerConfig,
    failure_count: AtomicU64,
    success_count: AtomicU64,
    is_open: AtomicBool,
    last_failure_time: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            failure_count: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            is_open: AtomicBool::new(false),
            last_failure_time: RwLock::new(None),
        }
    }

    async fn is_available(&self) -> bool {
        if !self.is_open.load(Ordering::Relaxed) {
            return true;
        }

        // Half-open once the reset timeout has elapsed
        let last_failure = self.last_failure_time.read().await;
        if let Some(time) = *last_failure {
            if time.elapsed() > Duration::from_secs(self.config.reset_timeout_secs) {
                return true;
            }
        }

        false
    }

    fn record_success(&self) {
        self.failure_count.store(0, Ordering::Relaxed);
        let success = self.success_count.fetch_add(1, Ordering::Relaxed) + 1;
        if success >= self.config.success_threshold as u64 {
            self.is_open.store(false, Ordering::Relaxed);
            self.success_count.store(0, Ordering::Relaxed);
        }
    }

    async fn record_failure(&self) {
        self.success_count.store(0, Ordering::Relaxed);
        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= self.config.failure_threshold as u64 {
            self.is_open.store(true, Ordering::Relaxed);
            *self.last_failure_time.write().await = Some(Instant::now());
        }
    }
}

/// Shared HTTP transport for one partner
#[derive(Debug)]
pub struct RestClient {
    partner: String,
    http: reqwest::Client,
    config: PartnerConfig,
    breaker: Option<CircuitBreaker>,
}

impl RestClient {
    /// Creates a client for the named partner
    pub fn new(partner: impl Into<String>, config: PartnerConfig) -> Result<Self, PortError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| PortError::Internal {
                message: "failed to build HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;

        let breaker = config.circuit_breaker.clone().map(CircuitBreaker::new);

        Ok(Self {
            partner: partner.into(),
            http,
            config,
            breaker,
        })
    }

    /// Returns the partner name this client talks to
    pub fn partner(&self) -> &str {
        &self.partner
    }

    /// Checks if the circuit breaker is open (blocking requests)
    pub async fn is_circuit_open(&self) -> bool {
        match &self.breaker {
            Some(breaker) => !breaker.is_available().await,
            None => false,
        }
    }

    /// Issues a GET and decodes the JSON response
    pub async fn get_json<R>(&self, path: &str) -> Result<R, PortError>
    where
        R: DeserializeOwned,
    {
        self.send_json(Method::GET, path, None).await
    }

    /// Issues a POST with a JSON body and decodes the JSON response
    pub async fn post_json<T, R>(&self, path: &str, body: &T) -> Result<R, PortError>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(|e| PortError::Transformation {
            message: format!("failed to encode request body: {}", e),
        })?;
        self.send_json(Method::POST, path, Some(body)).await
    }

    async fn send_json<R>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<R, PortError>
    where
        R: DeserializeOwned,
    {
        let response = self.execute_with_retry(method, path, body).await?;
        response.json::<R>().await.map_err(|e| {
            PortError::Transformation {
                message: format!("{}: failed to decode response: {}", self.partner, e),
            }
        })
    }

    /// Runs the request with the configured fixed-attempt retry
    ///
    /// Only transient failures are retried; the final error is returned
    /// unchanged so callers see what actually happened.
    async fn execute_with_retry(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, PortError> {
        if let Some(breaker) = &self.breaker {
            if !breaker.is_available().await {
                return Err(PortError::unavailable(format!(
                    "{}: circuit breaker open",
                    self.partner
                )));
            }
        }

        let max_attempts = self.config.retry.max_attempts.max(1);
        let backoff = Duration::from_millis(self.config.retry.backoff_ms);
        let mut attempt = 1;

        loop {
            let result = self.send_once(method.clone(), path, body.as_ref()).await;

            match result {
                Ok(response) => {
                    if let Some(breaker) = &self.breaker {
                        breaker.record_success();
                    }
                    return Ok(response);
                }
                Err(err) => {
                    if let Some(breaker) = &self.breaker {
                        breaker.record_failure().await;
                    }
                    if err.is_transient() && attempt < max_attempts {
                        warn!(
                            partner = %self.partner,
                            %path,
                            attempt,
                            error = %err,
                            "partner call failed, retrying"
                        );
                        tokio::time::sleep(backoff).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, PortError> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        let mut request = self
            .http
            .request(method, &url)
            .header(&self.config.api_key_header, &self.config.api_key);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.map_transport_error(path, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(self.map_status(path, status, response.headers()))
    }

    fn map_transport_error(&self, path: &str, error: reqwest::Error) -> PortError {
        if error.is_timeout() {
            PortError::Timeout {
                operation: format!("{} {}", self.partner, path),
                duration_ms: self.config.timeout_secs * 1000,
            }
        } else if error.is_connect() {
            PortError::unavailable(format!("{}: connect failed", self.partner))
        } else {
            PortError::Internal {
                message: format!("{}: request failed", self.partner),
                source: Some(Box::new(error)),
            }
        }
    }

    fn map_status(
        &self,
        path: &str,
        status: StatusCode,
        headers: &reqwest::header::HeaderMap,
    ) -> PortError {
        match status {
            StatusCode::NOT_FOUND => PortError::not_found(self.partner.clone(), path),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized {
                message: format!("{} rejected credentials ({})", self.partner, status),
            },
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = headers
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(self.config.retry.backoff_ms / 1000);
                PortError::RateLimited { retry_after_secs }
            }
            s if s.is_server_error() => PortError::unavailable(format!(
                "{} returned {}",
                self.partner, s
            )),
            s if s == StatusCode::UNPROCESSABLE_ENTITY || s == StatusCode::BAD_REQUEST => {
                PortError::validation(format!("{} rejected the request ({})", self.partner, s))
            }
            s => PortError::internal(format!("{} returned unexpected status {}", self.partner, s)),
        }
    }
}

#[async_trait::async_trait]
impl HealthCheckable for RestClient {
    /// Pings the partner's health endpoint
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();

        if self.is_circuit_open().await {
            return HealthCheckResult {
                adapter_id: self.partner.clone(),
                status: AdapterHealth::Degraded,
                latency_ms: 0,
                message: Some("circuit breaker open".to_string()),
                checked_at: Utc::now(),
            };
        }

        let result = self.send_once(Method::GET, "health", None).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: self.partner.clone(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: self.partner.clone(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(e.to_string()),
                checked_at: Utc::now(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> RestClient {
        RestClient::new("speedpay", PartnerConfig::new("https://sp.example/v2", "key")).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        let client = test_client();
        let headers = reqwest::header::HeaderMap::new();

        assert!(matches!(
            client.map_status("payments", StatusCode::NOT_FOUND, &headers),
            PortError::NotFound { .. }
        ));
        assert!(matches!(
            client.map_status("payments", StatusCode::FORBIDDEN, &headers),
            PortError::Unauthorized { .. }
        ));
        assert!(matches!(
            client.map_status("payments", StatusCode::TOO_MANY_REQUESTS, &headers),
            PortError::RateLimited { .. }
        ));
        assert!(matches!(
            client.map_status("payments", StatusCode::BAD_GATEWAY, &headers),
            PortError::ServiceUnavailable { .. }
        ));
        assert!(matches!(
            client.map_status("payments", StatusCode::UNPROCESSABLE_ENTITY, &headers),
            PortError::Validation { .. }
        ));
    }

    #[test]
    fn test_server_errors_are_transient_and_client_errors_are_not() {
        let client = test_client();
        let headers = reqwest::header::HeaderMap::new();

        assert!(client
            .map_status("x", StatusCode::SERVICE_UNAVAILABLE, &headers)
            .is_transient());
        assert!(client
            .map_status("x", StatusCode::TOO_MANY_REQUESTS, &headers)
            .is_transient());
        assert!(!client
            .map_status("x", StatusCode::BAD_REQUEST, &headers)
            .is_transient());
        assert!(!client
            .map_status("x", StatusCode::NOT_FOUND, &headers)
            .is_transient());
    }

    #[tokio::test]
    async fn test_circuit_breaker_opens_after_threshold() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 3,
            reset_timeout_secs: 60,
            success_threshold: 1,
        });

        assert!(breaker.is_available().await);
        breaker.record_failure().await;
        breaker.record_failure().await;
        assert!(breaker.is_available().await);
        breaker.record_failure().await;
        assert!(!breaker.is_available().await);
    }

    #[tokio::test]
    async fn test_circuit_breaker_success_resets_failures() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 2,
            reset_timeout_secs: 60,
            success_threshold: 1,
        });

        breaker.record_failure().await;
        breaker.record_success();
        breaker.record_failure().await;
        // One failure since the last success; still closed
        assert!(breaker.is_available().await);
    }

    #[tokio::test]
    async fn test_new_client_circuit_initially_closed() {
        let client = test_client();
        assert!(!client.is_circuit_open().await);
    }
}
