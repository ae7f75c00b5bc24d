//! Wire types for the remote catalog API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::Error;

/// One entry of a page's picture listing. The listing only carries the id;
/// full metadata comes from the per-item detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PictureStub {
    pub id: u64,
}

/// One page of the paginated catalog resource.
///
/// All four fields are required; a document missing any of them is rejected
/// as an invalid page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    pub pictures: Vec<PictureStub>,
    pub page: u32,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
    #[serde(rename = "pageCount")]
    pub page_count: u32,
}

impl Page {
    /// Validate and convert a raw page document.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPage` naming the offending field when the
    /// document does not carry the required shape.
    pub fn from_value(raw: &Value) -> Result<Self, Error> {
        serde_json::from_value(raw.clone()).map_err(|e| Error::InvalidPage(e.to_string()))
    }
}

/// Full metadata record for one catalog item.
///
/// The API returns a flat object of scalar fields; everything beyond the
/// identifier and the two picture URLs is kept verbatim in `extra` so the
/// index can cover fields this crate does not know about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: u64,
    pub cropped_picture: String,
    pub full_picture: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Item {
    /// Every scalar field value of this item, stringified, in field order.
    ///
    /// Covers the identifier, both picture URLs, and any extra scalar
    /// fields. Non-scalar extras (arrays, objects, null) are skipped.
    pub fn scalar_values(&self) -> Vec<String> {
        let mut values = vec![
            self.id.to_string(),
            self.cropped_picture.clone(),
            self.full_picture.clone(),
        ];
        for value in self.extra.values() {
            match value {
                Value::String(s) => values.push(s.clone()),
                Value::Number(n) => values.push(n.to_string()),
                Value::Bool(b) => values.push(b.to_string()),
                Value::Null | Value::Array(_) | Value::Object(_) => {}
            }
        }
        values
    }
}
