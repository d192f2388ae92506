use std::env;

use reqwest::Url;

use super::{CatalogError, CatalogId};

const DEFAULT_BASE_URL: &str = "https://cliniqueplushealthcare.com.ng/prescriptions";
const DEFAULT_CLASSES_PATH: &str = "drug_class";
const DEFAULT_MEDICINES_PATH: &str = "get_drug_class_by_id";

/// Locations of the two read-only catalog endpoints.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CatalogConfig {
    base_url: String,
    classes_path: String,
    medicines_path: String,
}

impl CatalogConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            classes_path: DEFAULT_CLASSES_PATH.to_string(),
            medicines_path: DEFAULT_MEDICINES_PATH.to_string(),
        }
    }

    pub fn from_env() -> Self {
        let base_url = env::var("CATALOG_BASE_URL").unwrap_or(DEFAULT_BASE_URL.to_string());

        let classes_path =
            env::var("CATALOG_CLASSES_PATH").unwrap_or(DEFAULT_CLASSES_PATH.to_string());

        let medicines_path =
            env::var("CATALOG_MEDICINES_PATH").unwrap_or(DEFAULT_MEDICINES_PATH.to_string());

        Self {
            base_url,
            classes_path,
            medicines_path,
        }
    }

    pub fn with_paths(
        mut self,
        classes_path: impl Into<String>,
        medicines_path: impl Into<String>,
    ) -> Self {
        self.classes_path = classes_path.into();
        self.medicines_path = medicines_path.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint A: every drug class.
    pub fn classes_url(&self) -> Result<Url, CatalogError> {
        self.endpoint(&self.classes_path, None)
    }

    /// Endpoint B: medicines of one class, the id appended as an escaped path segment.
    pub fn medicines_url(&self, class_id: &CatalogId) -> Result<Url, CatalogError> {
        self.endpoint(&self.medicines_path, Some(class_id))
    }

    fn endpoint(&self, path: &str, class_id: Option<&CatalogId>) -> Result<Url, CatalogError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CatalogError::Url(format!("{}: {}", self.base_url, e)))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| CatalogError::Url(format!("{} cannot be a base", self.base_url)))?;
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|s| !s.is_empty()));
            if let Some(id) = class_id {
                segments.push(id.as_str());
            }
        }

        Ok(url)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
