use serde::{Deserialize, Serialize};

/// Network-assigned bundle information attached to stored assets and events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaData {
    /// Identifier of the bundle the entity was uploaded in.
    pub bundle_id: String,
    /// Unix timestamp (seconds) of the upload.
    pub entity_upload_timestamp: i64,
}

impl MetaData {
    /// Creates metadata from its two fields.
    pub fn new(bundle_id: impl Into<String>, entity_upload_timestamp: i64) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            entity_upload_timestamp,
        }
    }
}
