use async_trait::async_trait;
use reqwest::{header::ACCEPT, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::errors::Error;

use super::types::MedicineRecord;
use super::{CatalogConfig, CatalogId, DrugClass, Medicine};

/// User agent string for catalog requests.
const USER_AGENT_VALUE: &str = concat!("prescriber/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("HTTP error! Status: {status}")]
    Status { status: u16 },

    #[error("Malformed catalog response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Invalid catalog URL: {0}")]
    Url(String),

    #[error("Catalog fetch did not complete: {0}")]
    Aborted(#[source] tokio::task::JoinError),
}

impl From<CatalogError> for Error {
    fn from(err: CatalogError) -> Self {
        Error::CatalogUnavailable {
            reason: err.to_string(),
        }
    }
}

/// Read-only source of drug classes and their medicines. Every call re-fetches.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_classes(&self) -> Result<Vec<DrugClass>, CatalogError>;

    /// An empty list is a valid answer for a class without medicines.
    async fn list_medicines(&self, class_id: &CatalogId) -> Result<Vec<Medicine>, CatalogError>;
}

/// Catalog service reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    config: CatalogConfig,
}

impl HttpCatalog {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .build()
            .map_err(CatalogError::Transport)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        tracing::debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(CatalogError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(CatalogError::Transport)?;
        serde_json::from_slice(&body).map_err(CatalogError::Decode)
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn list_classes(&self) -> Result<Vec<DrugClass>, CatalogError> {
        let url = self.config.classes_url()?;
        self.get_json(url).await
    }

    async fn list_medicines(&self, class_id: &CatalogId) -> Result<Vec<Medicine>, CatalogError> {
        let url = self.config.medicines_url(class_id)?;
        let records: Vec<MedicineRecord> = self.get_json(url).await?;

        Ok(records
            .into_iter()
            .map(|record| record.into_medicine(class_id))
            .collect())
    }
}
