use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

pub mod deals;
pub mod health;
pub mod properties;
pub mod tasks;
pub mod translation;
pub mod yachts;

/// One entry of a full-reorder batch. Every reorder endpoint takes the
/// complete new ordering in one request.
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct OrderedId {
    pub id: Uuid,
    pub display_order: i64,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct ReorderRequest {
    pub items: Vec<OrderedId>,
}

impl ReorderRequest {
    pub fn pairs(&self) -> Vec<(Uuid, i64)> {
        self.items
            .iter()
            .map(|item| (item.id, item.display_order))
            .collect()
    }
}
