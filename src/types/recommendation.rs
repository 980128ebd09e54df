use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One recommendation item. The shape of the payload varies per agent kind
/// (flight legs, stays, transit routes, restaurants), so everything beyond
/// the identifier is carried opaquely and left to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub details: Value,
}

impl Recommendation {
    pub fn new(id: impl Into<String>, details: Value) -> Self {
        Self {
            id: Some(id.into()),
            details,
        }
    }
}
