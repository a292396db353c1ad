use serde::{Deserialize, Serialize};

use catalog_store_macros::Document;

/// A manufacturer or label products belong to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Document)]
#[document(collection = "brands")]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl Brand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}
