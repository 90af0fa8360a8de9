//! ILP REST API HTTP client.

use anyhow::{Context, Result};
use medroute_core::{Drone, FleetSnapshot, RestrictedArea, ServicePoint, ServicePointAvailability};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_ILP_ENDPOINT: &str =
    "https://ilp-rest-2025-bvh6e9hschfagrgy.ukwest-01.azurewebsites.net";

const DRONES_PATH: &str = "/drones";
const SERVICE_POINTS_PATH: &str = "/service-points";
const AVAILABILITY_PATH: &str = "/drones-for-service-points";
const RESTRICTED_AREAS_PATH: &str = "/restricted-areas";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the ILP data service.
#[derive(Debug, Clone)]
pub struct IlpClient {
    client: Client,
    base_url: String,
}

impl IlpClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_drones(&self) -> Vec<Drone> {
        self.fetch_list(DRONES_PATH).await
    }

    pub async fn fetch_service_points(&self) -> Vec<ServicePoint> {
        self.fetch_list(SERVICE_POINTS_PATH).await
    }

    pub async fn fetch_availability(&self) -> Vec<ServicePointAvailability> {
        self.fetch_list(AVAILABILITY_PATH).await
    }

    pub async fn fetch_restricted_areas(&self) -> Vec<RestrictedArea> {
        self.fetch_list(RESTRICTED_AREAS_PATH).await
    }

    /// Fetch all four collections concurrently into one planning snapshot.
    pub async fn fetch_snapshot(&self) -> FleetSnapshot {
        let (drones, service_points, availability, restricted_areas) = tokio::join!(
            self.fetch_drones(),
            self.fetch_service_points(),
            self.fetch_availability(),
            self.fetch_restricted_areas(),
        );

        tracing::info!(
            drones = drones.len(),
            service_points = service_points.len(),
            availability = availability.len(),
            restricted_areas = restricted_areas.len(),
            "Fetched fleet snapshot"
        );

        FleetSnapshot {
            drones,
            service_points,
            availability,
            restricted_areas,
        }
    }

    async fn fetch_list<T: DeserializeOwned>(&self, path: &str) -> Vec<T> {
        match self.try_fetch_list(path).await {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(path, "ILP fetch failed, using empty list: {:#}", err);
                Vec::new()
            }
        }
    }

    async fn try_fetch_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "ILP request {} failed: {} {}",
                path,
                status,
                body
            ));
        }

        // A literal `null` body counts as an empty list.
        let items: Option<Vec<T>> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", path))?;

        Ok(items.unwrap_or_default())
    }
}
