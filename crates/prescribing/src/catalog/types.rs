use std::fmt;

use derive_new::new;
use serde::{Deserialize, Serialize};

/// Opaque catalog identifier.
///
/// The catalog service emits ids as JSON numbers or strings; both are kept as text so that
/// comparisons never depend on the wire representation.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(from = "RawId", into = "String")]
pub struct CatalogId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Integer(i64),
    Text(String),
}

impl From<RawId> for CatalogId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Integer(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        }
    }
}

impl From<CatalogId> for String {
    fn from(id: CatalogId) -> Self {
        id.0
    }
}

impl From<&str> for CatalogId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<i64> for CatalogId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl CatalogId {
    /// Parse a raw form value. Blank values select nothing.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Drug class as served by the classes endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, new)]
pub struct DrugClass {
    pub id: CatalogId,
    pub name: String,
}

/// Medicine belonging to a drug class.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, new)]
pub struct Medicine {
    pub id: CatalogId,
    pub name: String,
    pub class_id: CatalogId,
}

/// Wire shape of the medicines-by-class endpoint. The class id is implied by the request.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct MedicineRecord {
    pub medicine_id: CatalogId,
    pub medicine_name: String,
}

impl MedicineRecord {
    pub(crate) fn into_medicine(self, class_id: &CatalogId) -> Medicine {
        Medicine {
            id: self.medicine_id,
            name: self.medicine_name,
            class_id: class_id.clone(),
        }
    }
}
