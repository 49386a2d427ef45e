//! D&D 5e reference data client (https://www.dnd5eapi.co)
//!
//! Read-only. Failures are logged and degrade to empty results so the
//! character creator and item library keep working offline.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::infrastructure::ports::{
    ApiReference, ClassDetails, EquipmentDetails, ReferenceDataPort, ReferenceError,
};

/// Default public API host.
pub const DEFAULT_DND5E_API_URL: &str = "https://www.dnd5eapi.co";

/// Ruleset path segment.
const API_PREFIX: &str = "/api/2014";

#[derive(Clone)]
pub struct Dnd5eApiClient {
    client: Client,
    base_url: String,
}

impl Dnd5eApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}/{}", self.base_url, API_PREFIX, path.trim_start_matches('/'))
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ReferenceError> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ReferenceError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ReferenceError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ReferenceError::InvalidResponse(e.to_string()))
    }

    /// Fetch and log-on-failure; `None` means "degrade".
    async fn fetch_or_warn<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        match self.fetch(path).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Reference data unavailable");
                None
            }
        }
    }

    async fn fetch_list(&self, path: &str) -> Vec<ApiReference> {
        self.fetch_or_warn::<ResourceList>(path)
            .await
            .map(|list| list.results)
            .unwrap_or_default()
    }
}

impl Default for Dnd5eApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_DND5E_API_URL, Duration::from_secs(10))
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ResourceList {
    #[serde(default)]
    results: Vec<ApiReference>,
}

#[derive(Debug, Deserialize)]
struct ClassResponse {
    index: String,
    name: String,
    #[serde(default)]
    hit_die: u8,
}

#[derive(Debug, Deserialize)]
struct LevelResponse {
    #[serde(default)]
    features: Vec<ApiReference>,
}

#[derive(Debug, Deserialize)]
struct EquipmentResponse {
    index: String,
    name: String,
    #[serde(default)]
    equipment_category: Option<ApiReference>,
    #[serde(default)]
    cost: Option<Cost>,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default)]
    desc: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Cost {
    quantity: u32,
    unit: String,
}

impl From<EquipmentResponse> for EquipmentDetails {
    fn from(raw: EquipmentResponse) -> Self {
        Self {
            index: raw.index,
            name: raw.name,
            category: raw.equipment_category.map(|c| c.name),
            cost: raw.cost.map(|c| format!("{} {}", c.quantity, c.unit)),
            weight: raw.weight,
            description: raw.desc,
        }
    }
}

fn encode(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.trim().as_bytes()).collect()
}

#[async_trait]
impl ReferenceDataPort for Dnd5eApiClient {
    async fn list_races(&self) -> Vec<ApiReference> {
        self.fetch_list("races").await
    }

    async fn list_classes(&self) -> Vec<ApiReference> {
        self.fetch_list("classes").await
    }

    async fn list_subclasses(&self, class_index: &str) -> Vec<ApiReference> {
        self.fetch_list(&format!("classes/{}/subclasses", encode(class_index)))
            .await
    }

    async fn list_equipment(&self) -> Vec<ApiReference> {
        self.fetch_list("equipment").await
    }

    async fn class_details(&self, class_index: &str) -> Option<ClassDetails> {
        let raw: ClassResponse = self
            .fetch_or_warn(&format!("classes/{}", encode(class_index)))
            .await?;
        Some(ClassDetails {
            index: raw.index,
            name: raw.name,
            hit_die: raw.hit_die,
        })
    }

    async fn class_level_features(&self, class_index: &str, level: u8) -> Vec<String> {
        self.fetch_or_warn::<LevelResponse>(&format!(
            "classes/{}/levels/{}",
            encode(class_index),
            level
        ))
        .await
        .map(|raw| raw.features.into_iter().map(|f| f.name).collect())
        .unwrap_or_default()
    }

    async fn equipment_details(&self, index: &str) -> Option<EquipmentDetails> {
        self.fetch_or_warn::<EquipmentResponse>(&format!("equipment/{}", encode(index)))
            .await
            .map(EquipmentDetails::from)
    }
}
