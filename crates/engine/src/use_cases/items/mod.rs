//! Item library backed by the equipment reference list.

use std::sync::Arc;

use crate::infrastructure::ports::{ApiReference, EquipmentDetails, ReferenceDataPort};

pub struct ItemLibrary {
    reference: Arc<dyn ReferenceDataPort>,
}

impl ItemLibrary {
    pub fn new(reference: Arc<dyn ReferenceDataPort>) -> Self {
        Self { reference }
    }

    /// Every equipment entry, or those whose name contains `query`
    /// (case-insensitive).
    pub async fn library(&self, query: Option<&str>) -> Vec<ApiReference> {
        let all = self.reference.list_equipment().await;
        match query.map(str::trim).filter(|q| !q.is_empty()) {
            None => all,
            Some(query) => {
                let needle = query.to_lowercase();
                all.into_iter()
                    .filter(|item| item.name.to_lowercase().contains(&needle))
                    .collect()
            }
        }
    }

    pub async fn details(&self, index: &str) -> Option<EquipmentDetails> {
        self.reference.equipment_details(index.trim()).await
    }
}
