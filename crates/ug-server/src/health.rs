//! Health Check System
//!
//! Reports whether the upload policy is complete and which transfer backend
//! is active.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use ug_uploads::UploadService;

/// Health check status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy | Self::Degraded)
    }
}

/// Individual component health
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Overall health report
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    pub fn http_status(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Health checker configuration
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Cache duration for health results
    pub cache_duration: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            cache_duration: Duration::from_secs(10),
        }
    }
}

struct CachedHealth {
    report: HealthReport,
    cached_at: Instant,
}

/// Health checker service
pub struct HealthChecker {
    config: HealthConfig,
    start_time: Instant,
    cache: RwLock<Option<CachedHealth>>,
    uploads: Arc<UploadService>,
}

impl HealthChecker {
    pub fn new(config: HealthConfig, uploads: Arc<UploadService>) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            cache: RwLock::new(None),
            uploads,
        }
    }

    /// Get cached health or perform checks
    pub async fn check(&self) -> HealthReport {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.cached_at.elapsed() < self.config.cache_duration {
                    debug!("Returning cached health report");
                    return cached.report.clone();
                }
            }
        }

        let report = self.perform_checks();

        let mut cache = self.cache.write().await;
        *cache = Some(CachedHealth {
            report: report.clone(),
            cached_at: Instant::now(),
        });

        report
    }

    fn perform_checks(&self) -> HealthReport {
        let components = vec![self.check_policy(), self.check_transfer()];

        let status = if components.iter().any(|c| c.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else if components.iter().any(|c| c.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        if !status.is_healthy() {
            warn!(status = ?status, "Health check failed");
        }

        HealthReport {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            components,
            timestamp: chrono::Utc::now(),
        }
    }

    fn check_policy(&self) -> ComponentHealth {
        let missing = self.uploads.policy().missing_sections();

        let (status, message) = if missing.is_empty() {
            (HealthStatus::Healthy, "Upload policy complete".to_string())
        } else {
            (
                HealthStatus::Unhealthy,
                format!("Missing configuration: {}", missing.join(", ")),
            )
        };

        ComponentHealth {
            name: "policy".to_string(),
            status,
            message: Some(message),
            details: Some(serde_json::json!({ "missing": missing })),
        }
    }

    fn check_transfer(&self) -> ComponentHealth {
        let backend = self.uploads.transfer_backend();

        let (status, message) = if !self.uploads.transfer_available() {
            (HealthStatus::Unhealthy, Some(format!("{} backend is not configured", backend)))
        } else if backend == "memory" {
            (
                HealthStatus::Degraded,
                Some("Files are kept in memory only".to_string()),
            )
        } else {
            (HealthStatus::Healthy, None)
        };

        ComponentHealth {
            name: "transfer".to_string(),
            status,
            message,
            details: Some(serde_json::json!({ "backend": backend })),
        }
    }
}

/// Simple liveness check
pub async fn liveness() -> &'static str {
    "OK"
}

/// Readiness check
pub async fn readiness(State(health): State<Arc<HealthChecker>>) -> (StatusCode, Json<HealthReport>) {
    let report = health.check().await;
    let status = report.http_status();
    (status, Json(report))
}
