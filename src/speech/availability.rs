//! Advisory check of which speech backends are reachable
//!
//! Only used to enable or disable speak triggers. The dispatcher never
//! consults it and always walks the full fallback chain.

use log::{info, warn};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Backend identifier for on-device synthesis
pub const DEVICE_BACKEND: &str = "device";

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    available_methods: Vec<String>,
}

/// Backend identifier → reachable, captured once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityState {
    backends: BTreeMap<String, bool>,
}

/// Enabled state and hint for speak triggers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affordance {
    pub enabled: bool,
    pub hint: String,
}

impl AvailabilityState {
    /// State built from the server's method list plus local capability
    pub fn from_methods<I, S>(methods: I, device_supported: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut backends: BTreeMap<String, bool> =
            methods.into_iter().map(|m| (m.into(), true)).collect();
        backends
            .entry(DEVICE_BACKEND.to_string())
            .and_modify(|reachable| *reachable = *reachable && device_supported)
            .or_insert(device_supported);
        Self { backends }
    }

    pub fn is_available(&self, backend: &str) -> bool {
        self.backends.get(backend).copied().unwrap_or(false)
    }

    /// Reachable backends, sorted by name
    pub fn available(&self) -> Vec<&str> {
        self.backends
            .iter()
            .filter(|(_, reachable)| **reachable)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn as_map(&self) -> &BTreeMap<String, bool> {
        &self.backends
    }

    pub fn affordance(&self) -> Affordance {
        let available = self.available();
        if available.is_empty() {
            Affordance {
                enabled: false,
                hint: "TTS not available".to_string(),
            }
        } else {
            Affordance {
                enabled: true,
                hint: format!("Available: {}", available.join(", ")),
            }
        }
    }
}

/// Queries the server's speech status endpoint
#[derive(Debug, Clone)]
pub struct AvailabilityProbe {
    http: Client,
    status_url: Url,
}

impl AvailabilityProbe {
    pub fn new(status_url: Url) -> Self {
        Self {
            http: Client::new(),
            status_url,
        }
    }

    /// Fetch the current state; any failure degrades to local-only
    pub async fn check(&self, device_supported: bool) -> AvailabilityState {
        match self.fetch_methods().await {
            Ok(methods) => {
                info!("📊 Available speech methods: {:?}", methods);
                AvailabilityState::from_methods(methods, device_supported)
            }
            Err(e) => {
                warn!("⚠️ Could not check speech status: {}", e);
                AvailabilityState::from_methods(Vec::<String>::new(), device_supported)
            }
        }
    }

    async fn fetch_methods(&self) -> Result<Vec<String>, reqwest::Error> {
        let body: StatusBody = self
            .http
            .get(self.status_url.clone())
            .timeout(PROBE_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body.available_methods)
    }
}
