use crate::core::constraints::factory::{ConstraintFactory, ConstraintSelection, ConstraintSet};
use crate::core::research::data::ResearchData;
use crate::core::research::records::{MobileToolRecord, SafetyFinding, WorkflowPattern};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    research_version: String,
    content: String,
    selection: ConstraintSelection,
}

#[derive(Serialize)]
struct ResearchContent<'a> {
    safety: &'a [SafetyFinding],
    workflow: &'a [WorkflowPattern],
    mobile: &'a [MobileToolRecord],
}

/// Canonical text of the records a constraint set is built from. Two datasets that
/// share a version label but differ in content never share an entry.
fn content_of(data: &ResearchData) -> Result<String, toml::ser::Error> {
    toml::to_string(&ResearchContent {
        safety: &data.safety,
        workflow: &data.workflow,
        mobile: &data.mobile,
    })
}

/// Constraint sets keyed by research content and normalized selection. Owned by the
/// caller and shared across runs at its discretion.
#[derive(Debug, Default, Clone)]
pub struct ConstraintCache {
    sets: HashMap<CacheKey, Arc<ConstraintSet>>,
    hits: usize,
    misses: usize,
}

impl ConstraintCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &mut self,
        data: &ResearchData,
        selection: &ConstraintSelection,
    ) -> Arc<ConstraintSet> {
        let selection = selection.normalized();
        let content = match content_of(data) {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "Research data has no canonical form; building uncached.");
                self.misses += 1;
                return Arc::new(ConstraintFactory::build(data, &selection));
            }
        };
        let key = CacheKey {
            research_version: data.version.clone(),
            content,
            selection,
        };
        if let Some(set) = self.sets.get(&key) {
            self.hits += 1;
            debug!(version = %key.research_version, "Constraint cache hit.");
            return Arc::clone(set);
        }
        self.misses += 1;
        let set = Arc::new(ConstraintFactory::build(data, &key.selection));
        self.sets.insert(key, Arc::clone(&set));
        set
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::tool::ToolKind;

    #[test]
    fn equivalent_selections_share_one_entry() {
        let data = ResearchData::builtin();
        let mut cache = ConstraintCache::new();
        let a = cache.get_or_build(
            &data,
            &ConstraintSelection {
                project_types: vec!["Furniture".into(), "cabinetry".into()],
                mobile_kinds: Some(vec![ToolKind::Planer, ToolKind::BandSaw]),
            },
        );
        let b = cache.get_or_build(
            &data,
            &ConstraintSelection {
                project_types: vec!["cabinetry".into(), "furniture".into()],
                mobile_kinds: Some(vec![ToolKind::BandSaw, ToolKind::Planer]),
            },
        );
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn different_research_versions_are_cached_separately() {
        let data = ResearchData::builtin();
        let mut other = data.clone();
        other.version = "custom".to_string();

        let mut cache = ConstraintCache::new();
        cache.get_or_build(&data, &ConstraintSelection::all());
        cache.get_or_build(&other, &ConstraintSelection::all());
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn datasets_sharing_a_version_are_cached_separately() {
        let with_finding = ResearchData {
            safety: ResearchData::builtin()
                .safety
                .into_iter()
                .filter(|f| f.tool == ToolKind::TableSaw)
                .collect(),
            ..ResearchData::default()
        };
        let empty = ResearchData::default();
        assert_eq!(with_finding.version, empty.version);

        let mut cache = ConstraintCache::new();
        let first = cache.get_or_build(&with_finding, &ConstraintSelection::all());
        let second = cache.get_or_build(&empty, &ConstraintSelection::all());

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(cache.len(), 2);
        assert_eq!((cache.hits(), cache.misses()), (0, 2));
    }

    #[test]
    fn identical_content_hits_the_cache() {
        let data = ResearchData::builtin();
        let copy = data.clone();
        let mut cache = ConstraintCache::new();
        let a = cache.get_or_build(&data, &ConstraintSelection::all());
        let b = cache.get_or_build(&copy, &ConstraintSelection::all());
        assert!(Arc::ptr_eq(&a, &b));
    }
}
