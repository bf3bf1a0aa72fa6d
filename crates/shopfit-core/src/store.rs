//! Persistence boundary for workshops, tool rosters, and saved layouts.

use crate::core::models::layout::Layout;
use crate::core::models::tool::Tool;
use crate::core::models::workshop::Workshop;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Workshop '{0}' not found")]
    WorkshopNotFound(String),
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Read access to workshops and their tools, plus append-only layout storage.
pub trait EntityStore: Send + Sync {
    fn workshop(&self, id: &str) -> Result<Workshop, StoreError>;
    fn tools(&self, workshop_id: &str) -> Result<Vec<Arc<Tool>>, StoreError>;
    /// Persists a layout under a fresh id and returns the stored record.
    fn save_layout(&self, layout: Layout) -> Result<Layout, StoreError>;
    fn layouts(&self, workshop_id: &str) -> Result<Vec<Layout>, StoreError>;
}

#[derive(Debug, Default)]
struct Tables {
    workshops: HashMap<String, (Workshop, Vec<Arc<Tool>>)>,
    layouts: Vec<Layout>,
    next_layout: u64,
}

/// A process-local store, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_workshop(&self, workshop: Workshop, tools: Vec<Arc<Tool>>) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        tables.workshops.insert(workshop.id.clone(), (workshop, tools));
        Ok(())
    }
}

impl EntityStore for InMemoryStore {
    fn workshop(&self, id: &str) -> Result<Workshop, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        tables
            .workshops
            .get(id)
            .map(|(workshop, _)| workshop.clone())
            .ok_or_else(|| StoreError::WorkshopNotFound(id.to_string()))
    }

    fn tools(&self, workshop_id: &str) -> Result<Vec<Arc<Tool>>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        tables
            .workshops
            .get(workshop_id)
            .map(|(_, tools)| tools.clone())
            .ok_or_else(|| StoreError::WorkshopNotFound(workshop_id.to_string()))
    }

    fn save_layout(&self, mut layout: Layout) -> Result<Layout, StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        if !tables.workshops.contains_key(&layout.workshop_id) {
            return Err(StoreError::WorkshopNotFound(layout.workshop_id));
        }
        tables.next_layout += 1;
        layout.id = format!("layout-{}", tables.next_layout);
        tables.layouts.push(layout.clone());
        Ok(layout)
    }

    fn layouts(&self, workshop_id: &str) -> Result<Vec<Layout>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables
            .layouts
            .iter()
            .filter(|l| l.workshop_id == workshop_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::catalog::ToolCatalog;
    use crate::core::models::geometry::Dimensions;

    fn store_with_garage() -> InMemoryStore {
        let store = InMemoryStore::new();
        let shop = Workshop::new("garage", "Garage", Dimensions::new(240.0, 180.0, 96.0));
        store
            .insert_workshop(shop, ToolCatalog::standard().tools().to_vec())
            .unwrap();
        store
    }

    #[test]
    fn unknown_workshop_is_reported() {
        let store = InMemoryStore::new();
        assert_eq!(
            store.workshop("nope"),
            Err(StoreError::WorkshopNotFound("nope".to_string()))
        );
        assert!(store.tools("nope").is_err());
    }

    #[test]
    fn save_layout_assigns_sequential_ids() {
        let store = store_with_garage();
        let first = store.save_layout(Layout::new("garage", Vec::new())).unwrap();
        let second = store.save_layout(Layout::new("garage", Vec::new())).unwrap();
        assert_eq!(first.id, "layout-1");
        assert_eq!(second.id, "layout-2");
        assert_eq!(store.layouts("garage").unwrap().len(), 2);
        assert!(store.layouts("other").unwrap().is_empty());
    }

    #[test]
    fn save_layout_rejects_unknown_workshop() {
        let store = store_with_garage();
        let result = store.save_layout(Layout::new("shed", Vec::new()));
        assert_eq!(result, Err(StoreError::WorkshopNotFound("shed".to_string())));
    }

    #[test]
    fn tools_are_returned_in_insertion_order() {
        let store = store_with_garage();
        let ids: Vec<String> = store.tools("garage").unwrap().iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids.first().map(String::as_str), Some("table_saw"));
        assert_eq!(ids.len(), 8);
    }
}
