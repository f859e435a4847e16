//! HTTP control plane source
//!
//! Talks to the management backend's heartbeat endpoint and hands the
//! returned configuration map to the engine.
//!
//! ## Example
//!
//! ```ignore
//! use rasp_infrastructure::sync::HttpRemoteConfigSource;
//!
//! let source = HttpRemoteConfigSource::new(&store.snapshot(), &settings.remote)?;
//! let config = source.fetch().await?;
//! ```

use crate::constants::{APP_ID_HEADER, APP_SECRET_HEADER, HEARTBEAT_PATH};
use crate::error_ext::ErrorContext;
use crate::settings::RemoteClientConfig;
use async_trait::async_trait;
use rasp_domain::error::{Error, Result};
use rasp_domain::ports::RemoteConfigSource;
use rasp_domain::value_objects::{ConfigSnapshot, ConfigValue, RawConfigMap};
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicI64, Ordering};

/// Heartbeat-based remote configuration source
pub struct HttpRemoteConfigSource {
    client: Client,
    endpoint: String,
    app_id: String,
    app_secret: String,
    rasp_id: String,
    // Timestamp of the last configuration received, echoed back
    config_time: AtomicI64,
}

impl HttpRemoteConfigSource {
    /// Build a source from the boot snapshot
    ///
    /// Requires `cloud.backend_url`; TLS peer verification follows
    /// `openrasp.ssl_verifypeer`.
    pub fn new(snapshot: &ConfigSnapshot, config: &RemoteClientConfig) -> Result<Self> {
        let backend = snapshot.cloud_backend_url.trim_end_matches('/');
        if backend.is_empty() {
            return Err(Error::configuration(
                "cloud.backend_url is required when cloud.enable is true",
            ));
        }
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!snapshot.https_verify_peer)
            .build()
            .config_context("Failed to build control plane HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", backend, HEARTBEAT_PATH),
            app_id: snapshot.cloud_app_id.clone(),
            app_secret: snapshot.cloud_app_secret.clone(),
            rasp_id: snapshot.rasp_id.clone(),
            config_time: AtomicI64::new(0),
        })
    }

    /// Heartbeat URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteConfigSource for HttpRemoteConfigSource {
    async fn fetch(&self) -> Result<RawConfigMap> {
        let body = json!({
            "rasp_id": self.rasp_id,
            "config_time": self.config_time.load(Ordering::Acquire),
        });
        let response = self
            .client
            .post(&self.endpoint)
            .header(APP_ID_HEADER, &self.app_id)
            .header(APP_SECRET_HEADER, &self.app_secret)
            .json(&body)
            .send()
            .await
            .sync_context("Heartbeat request failed")?
            .error_for_status()
            .sync_context("Heartbeat rejected")?;
        let payload: Value = response
            .json()
            .await
            .sync_context("Invalid heartbeat response")?;

        match parse_heartbeat_response(&payload)? {
            Some((config_time, config)) => {
                self.config_time.store(config_time, Ordering::Release);
                Ok(config)
            }
            None => Ok(RawConfigMap::new()),
        }
    }

    fn source_name(&self) -> &str {
        "http-heartbeat"
    }
}

/// Extract `(config_time, config)` from a heartbeat response body
///
/// `Ok(None)` means the backend had no newer configuration. A non-zero
/// `status` is a transient failure.
pub fn parse_heartbeat_response(payload: &Value) -> Result<Option<(i64, RawConfigMap)>> {
    let status = payload.get("status").and_then(Value::as_i64).unwrap_or(0);
    if status != 0 {
        let description = payload
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(Error::transient_sync(format!(
            "heartbeat returned status {}: {}",
            status, description
        )));
    }
    let Some(data) = payload.get("data") else {
        return Ok(None);
    };
    let Some(config) = data.get("config") else {
        return Ok(None);
    };
    let ConfigValue::Map(map) = ConfigValue::from(config.clone()) else {
        return Err(Error::transient_sync("heartbeat config is not an object"));
    };
    let config_time = data.get("config_time").and_then(Value::as_i64).unwrap_or(0);
    Ok(Some((config_time, map)))
}
