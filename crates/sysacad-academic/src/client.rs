//! HTTP client for `GET {base_url}/especialidades/{id}`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use sysacad_config::AcademicServiceConfig;
use tracing::{debug, error, instrument, warn};

use crate::circuit_breaker::{BreakerError, CircuitBreaker, CircuitBreakerConfig};
use crate::error::AcademicError;
use crate::specialty::{Specialty, SpecialtyValidator};

/// Academic service client.
///
/// Cloning shares the underlying connection pool and circuit breaker, so one
/// breaker guards every call the process makes.
#[derive(Debug, Clone)]
pub struct AcademicClient {
    http: reqwest::Client,
    base_url: String,
    breaker: Arc<CircuitBreaker>,
}

impl AcademicClient {
    /// Builds a client whose requests are bounded by `config.timeout()`.
    pub fn new(config: &AcademicServiceConfig) -> Result<Self, AcademicError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        let breaker = CircuitBreaker::new(
            "academic_service",
            CircuitBreakerConfig {
                failure_threshold: config.failure_threshold,
                reset_timeout: config.reset_timeout(),
            },
        );

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            breaker: Arc::new(breaker),
        })
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    fn specialty_url(&self, specialty_id: i32) -> String {
        format!("{}/especialidades/{}", self.base_url, specialty_id)
    }

    /// Status-only existence check. 404 is a successful answer for the breaker.
    async fn exists(&self, specialty_id: i32) -> Result<bool, AcademicError> {
        let url = self.specialty_url(specialty_id);
        let result: Result<bool, BreakerError<AcademicError>> = self
            .breaker
            .call(|| async {
                let response = self.http.get(&url).send().await?;
                match response.status() {
                    StatusCode::OK => Ok(true),
                    StatusCode::NOT_FOUND => Ok(false),
                    status => Err(AcademicError::UnexpectedStatus(status.as_u16())),
                }
            })
            .await;

        flatten(result)
    }

    async fn fetch(&self, specialty_id: i32) -> Result<Option<Specialty>, AcademicError> {
        let url = self.specialty_url(specialty_id);
        let result: Result<Option<Specialty>, BreakerError<AcademicError>> = self
            .breaker
            .call(|| async {
                let response = self.http.get(&url).send().await?;
                match response.status() {
                    StatusCode::OK => Ok(Some(response.json::<Specialty>().await?)),
                    StatusCode::NOT_FOUND => Ok(None),
                    status => Err(AcademicError::UnexpectedStatus(status.as_u16())),
                }
            })
            .await;

        flatten(result)
    }
}

fn flatten<T>(result: Result<T, BreakerError<AcademicError>>) -> Result<T, AcademicError> {
    result.map_err(|e| match e {
        BreakerError::Open => AcademicError::CircuitOpen,
        BreakerError::Inner(e) => e,
    })
}

#[async_trait]
impl SpecialtyValidator for AcademicClient {
    #[instrument(skip(self), fields(specialty.id = specialty_id))]
    async fn validate_specialty(&self, specialty_id: i32) -> Result<bool, AcademicError> {
        match self.exists(specialty_id).await {
            Ok(exists) => {
                debug!(exists, "Specialty validated");
                Ok(exists)
            }
            Err(e) => {
                error!(error = %e, "Circuit breaker open or error validating specialty");
                Err(e)
            }
        }
    }

    #[instrument(skip(self), fields(specialty.id = specialty_id))]
    async fn get_specialty(&self, specialty_id: i32) -> Option<Specialty> {
        match self.fetch(specialty_id).await {
            Ok(specialty) => specialty,
            Err(e) => {
                warn!(error = %e, "Circuit breaker open or error fetching specialty");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit_breaker::CircuitState;
    use axum::{Json, Router, extract::Path, http::StatusCode as AxumStatus, routing::get};
    use std::time::Duration;

    /// Serves `/especialidades/{id}`: 1..=99 exist, 500 fails, 900 hangs,
    /// everything else is 404.
    async fn spawn_stub() -> String {
        async fn especialidad(
            Path(id): Path<i32>,
        ) -> Result<Json<serde_json::Value>, AxumStatus> {
            match id {
                1..=99 => Ok(Json(serde_json::json!({"id": id, "nombre": "Sistemas"}))),
                500 => Err(AxumStatus::INTERNAL_SERVER_ERROR),
                900 => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Err(AxumStatus::NOT_FOUND)
                }
                _ => Err(AxumStatus::NOT_FOUND),
            }
        }

        let app = Router::new().route("/especialidades/{id}", get(especialidad));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: String, threshold: u32) -> AcademicClient {
        AcademicClient::new(&AcademicServiceConfig {
            base_url,
            timeout_seconds: 1,
            failure_threshold: threshold,
            reset_timeout_seconds: 60,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_validate_specialty_ok_and_not_found() {
        let client = client_for(spawn_stub().await, 5);
        assert!(client.validate_specialty(3).await.unwrap());
        assert!(!client.validate_specialty(404).await.unwrap());
        // 404 is an answer, not a failure
        assert_eq!(client.breaker().consecutive_failures(), 0);
    }

    #[tokio::test]
    async fn test_validate_specialty_propagates_server_error() {
        let client = client_for(spawn_stub().await, 5);
        let err = client.validate_specialty(500).await.unwrap_err();
        assert!(matches!(err, AcademicError::UnexpectedStatus(500)));
        assert!(err.is_bad_gateway());
        assert_eq!(client.breaker().consecutive_failures(), 1);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let client = client_for(spawn_stub().await, 5);
        let err = client.validate_specialty(900).await.unwrap_err();
        assert!(matches!(err, AcademicError::Transport(ref e) if e.is_timeout()));
        assert_eq!(client.breaker().consecutive_failures(), 1);
    }

    #[tokio::test]
    async fn test_connection_refused_opens_circuit() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{}", addr), 2);
        for _ in 0..2 {
            assert!(matches!(
                client.validate_specialty(1).await,
                Err(AcademicError::Transport(_))
            ));
        }
        assert_eq!(client.breaker().state(), CircuitState::Open);
        assert!(matches!(
            client.validate_specialty(1).await,
            Err(AcademicError::CircuitOpen)
        ));
    }

    #[tokio::test]
    async fn test_get_specialty_collapses_failures_to_none() {
        let client = client_for(spawn_stub().await, 5);

        let specialty = client.get_specialty(7).await.unwrap();
        assert_eq!(specialty.id(), Some(7));
        assert_eq!(specialty.name(), Some("Sistemas"));

        assert!(client.get_specialty(404).await.is_none());
        assert!(client.get_specialty(500).await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_breaker() {
        let client = client_for(spawn_stub().await, 1);
        let other = client.clone();
        client.validate_specialty(500).await.ok();
        assert!(matches!(
            other.validate_specialty(1).await,
            Err(AcademicError::CircuitOpen)
        ));
    }
}
