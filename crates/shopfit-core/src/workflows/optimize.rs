use crate::core::constraints::factory::{ConstraintSelection, ConstraintSet};
use crate::core::constraints::priority::Priority;
use crate::core::models::layout::{Layout, LayoutMetadata};
use crate::core::models::tool::Tool;
use crate::core::models::workshop::Workshop;
use crate::core::research::data::{ResearchData, SkippedRecord};
use crate::core::scoring::space_savings_percent;
use crate::engine::cache::ConstraintCache;
use crate::engine::config::SearchConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::search;
use crate::engine::state::{ConvergencePoint, OptimizationState, SearchState};
use crate::engine::strategy::{self, SearchContext};
use crate::store::EntityStore;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Where a run takes its constraints from.
#[derive(Debug, Clone)]
pub enum ConstraintSource {
    /// Built from research data for the request's roster and project types.
    Research(Arc<ResearchData>),
    /// A set the caller already built; used as is.
    Prebuilt(Arc<ConstraintSet>),
}

#[derive(Debug, Clone)]
pub struct OptimizationRequest {
    pub workshop: Workshop,
    pub tools: Vec<Arc<Tool>>,
    pub config: SearchConfig,
    pub constraints: ConstraintSource,
}

impl OptimizationRequest {
    pub fn new(
        workshop: Workshop,
        tools: Vec<Arc<Tool>>,
        config: SearchConfig,
        research: Arc<ResearchData>,
    ) -> Self {
        Self {
            workshop,
            tools,
            config,
            constraints: ConstraintSource::Research(research),
        }
    }

    pub fn with_constraints(mut self, constraints: Arc<ConstraintSet>) -> Self {
        self.constraints = ConstraintSource::Prebuilt(constraints);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSatisfaction {
    pub total: usize,
    pub satisfied: usize,
    pub violated_by_priority: BTreeMap<Priority, usize>,
}

#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub total_time: Duration,
    pub iterations: usize,
    pub terminal_state: SearchState,
    pub convergence: Vec<ConvergencePoint>,
    pub constraint_satisfaction: ConstraintSatisfaction,
    pub skipped_records: Vec<SkippedRecord>,
    pub space_savings_percent: f64,
}

#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Always present, even when the search was cancelled or out of budget.
    pub best_layout: Layout,
    /// Every scored layout, best first. Empty unless `keep_candidates` is set.
    pub candidates: Vec<Layout>,
    pub statistics: RunStatistics,
}

pub fn run(
    request: &OptimizationRequest,
    reporter: &ProgressReporter,
    cancel: &AtomicBool,
) -> Result<OptimizationResult, EngineError> {
    run_with_cache(request, &mut ConstraintCache::new(), reporter, cancel)
}

#[instrument(skip_all, name = "optimize_workflow", fields(workshop = %request.workshop.id))]
pub fn run_with_cache(
    request: &OptimizationRequest,
    cache: &mut ConstraintCache,
    reporter: &ProgressReporter,
    cancel: &AtomicBool,
) -> Result<OptimizationResult, EngineError> {
    let started = Instant::now();

    // === Phase 1: Validation and constraint preparation ===
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    validate_request(request)?;
    let constraints = resolve_constraints(request, cache);
    if !constraints.skipped().is_empty() {
        warn!(
            skipped = constraints.skipped().len(),
            "Some research records were skipped while building constraints."
        );
    }
    info!(
        tools = request.tools.len(),
        constraints = constraints.len(),
        algorithm = %request.config.algorithm,
        "Starting layout optimization."
    );
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Search ===
    reporter.report(Progress::PhaseStart { name: "Search" });
    let ctx = SearchContext::new(
        &request.workshop,
        &request.tools,
        &constraints,
        &request.config,
    );
    let mut strategy = strategy::create(&request.config);
    let monitor = search::monitors_for(&request.config, cancel);
    let state = search::run(&ctx, strategy.as_mut(), &monitor, reporter);
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Finalize ===
    reporter.report(Progress::PhaseStart { name: "Finalize" });
    let result = finalize(request, &constraints, state, strategy.name(), started.elapsed())?;
    reporter.report(Progress::PhaseFinish);

    info!(
        iterations = result.statistics.iterations,
        best = result.best_layout.score.as_ref().map_or(0, |s| s.overall),
        state = ?result.statistics.terminal_state,
        "Layout optimization complete."
    );
    Ok(result)
}

/// Loads the workshop and roster from `store`, optimizes, and persists the best layout.
/// The returned result carries the stored record, id included.
pub fn optimize_and_save(
    store: &dyn EntityStore,
    workshop_id: &str,
    config: SearchConfig,
    research: Arc<ResearchData>,
    reporter: &ProgressReporter,
    cancel: &AtomicBool,
) -> Result<OptimizationResult, EngineError> {
    let workshop = store.workshop(workshop_id)?;
    let tools = store.tools(workshop_id)?;
    let request = OptimizationRequest::new(workshop, tools, config, research);
    let mut result = run(&request, reporter, cancel)?;
    result.best_layout = store.save_layout(result.best_layout)?;
    info!(layout = %result.best_layout.id, "Saved optimized layout.");
    Ok(result)
}

fn validate_request(request: &OptimizationRequest) -> Result<(), EngineError> {
    request.config.validate()?;

    let floor = &request.workshop.dimensions;
    if !floor.is_finite() || floor.length < 0.0 || floor.width < 0.0 {
        return Err(EngineError::InvalidRequest(format!(
            "workshop '{}' has invalid dimensions {}x{}",
            request.workshop.id, floor.length, floor.width
        )));
    }

    for tool in &request.tools {
        let dims = &tool.dimensions;
        if !dims.is_finite() || dims.length < 0.0 || dims.width < 0.0 {
            return Err(EngineError::InvalidRequest(format!(
                "tool '{}' has invalid dimensions {}x{}",
                tool.id, dims.length, dims.width
            )));
        }
    }

    if let Some(id) = request.tools.iter().map(|t| t.id.as_str()).duplicates().next() {
        return Err(EngineError::InvalidRequest(format!(
            "tool id '{id}' appears more than once"
        )));
    }
    Ok(())
}

fn resolve_constraints(
    request: &OptimizationRequest,
    cache: &mut ConstraintCache,
) -> Arc<ConstraintSet> {
    match &request.constraints {
        ConstraintSource::Prebuilt(set) => Arc::clone(set),
        ConstraintSource::Research(data) => {
            let selection =
                ConstraintSelection::for_roster(&request.config.project_types, &request.tools);
            cache.get_or_build(data, &selection)
        }
    }
}

fn finalize(
    request: &OptimizationRequest,
    constraints: &ConstraintSet,
    state: OptimizationState,
    algorithm: &str,
    elapsed: Duration,
) -> Result<OptimizationResult, EngineError> {
    let OptimizationState {
        state: terminal_state,
        best,
        iterations,
        convergence,
        history,
        ..
    } = state;

    let best = best.ok_or_else(|| EngineError::PhaseFailed {
        phase: "Finalize",
        reason: "search produced no scored layout".to_string(),
    })?;

    let metadata = LayoutMetadata {
        algorithm: algorithm.to_string(),
        iterations,
        elapsed,
    };
    let best_layout = best.into_layout().with_metadata(metadata.clone());

    let constraint_satisfaction = satisfaction(&best_layout, &request.workshop, constraints);
    let space_savings_percent = space_savings_percent(
        best_layout.len(),
        best_layout.mobile_count(),
        request.workshop.floor_area(),
    );

    let candidates = history
        .into_iter()
        .sorted_by(|a, b| b.cmp(a))
        .map(|c| c.into_layout().with_metadata(metadata.clone()))
        .collect();

    Ok(OptimizationResult {
        best_layout,
        candidates,
        statistics: RunStatistics {
            total_time: elapsed,
            iterations,
            terminal_state,
            convergence,
            constraint_satisfaction,
            skipped_records: constraints.skipped().to_vec(),
            space_savings_percent,
        },
    })
}

fn satisfaction(
    layout: &Layout,
    workshop: &Workshop,
    constraints: &ConstraintSet,
) -> ConstraintSatisfaction {
    let index = layout.index();
    let mut summary = ConstraintSatisfaction {
        total: constraints.len(),
        ..ConstraintSatisfaction::default()
    };
    for constraint in constraints {
        if constraint.evaluate_indexed(&index, workshop).satisfied {
            summary.satisfied += 1;
        } else {
            *summary.violated_by_priority.entry(constraint.priority).or_default() += 1;
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constraints::factory::ConstraintFactory;
    use crate::core::models::catalog::ToolCatalog;
    use crate::core::models::geometry::Dimensions;
    use crate::core::models::tool::ToolKind;
    use crate::engine::config::Algorithm;
    use crate::store::InMemoryStore;
    use std::sync::Mutex;

    fn garage() -> Workshop {
        Workshop::new("garage", "Two-car garage", Dimensions::new(288.0, 240.0, 96.0))
    }

    fn roster() -> Vec<Arc<Tool>> {
        ToolCatalog::standard()
            .tools()
            .iter()
            .map(|tool| {
                let mobile = matches!(tool.kind, ToolKind::BandSaw | ToolKind::Planer);
                Arc::new((**tool).clone().mobile(mobile))
            })
            .collect()
    }

    fn config(algorithm: Algorithm, iterations: usize) -> SearchConfig {
        SearchConfig::builder()
            .algorithm(algorithm)
            .max_iterations(iterations)
            .time_limit(Duration::from_secs(60))
            .seed(7)
            .build()
            .unwrap()
    }

    fn request(config: SearchConfig) -> OptimizationRequest {
        OptimizationRequest::new(garage(), roster(), config, Arc::new(ResearchData::builtin()))
    }

    fn optimize(request: &OptimizationRequest) -> OptimizationResult {
        run(request, &ProgressReporter::new(), &AtomicBool::new(false)).unwrap()
    }

    #[test]
    fn grid_repair_is_idempotent() {
        let req = request(config(Algorithm::GridRepair, 200));
        let first = optimize(&req);
        let second = optimize(&req);
        assert_eq!(
            first.best_layout.score.as_ref().map(|s| s.overall),
            second.best_layout.score.as_ref().map(|s| s.overall)
        );
        assert_eq!(first.best_layout.placements, second.best_layout.placements);
    }

    #[test]
    fn annealing_is_reproducible_for_a_fixed_seed() {
        let req = request(config(Algorithm::SimulatedAnnealing, 150));
        let first = optimize(&req);
        let second = optimize(&req);
        assert_eq!(first.best_layout.placements, second.best_layout.placements);
        let scores = |r: &OptimizationResult| {
            r.statistics.convergence.iter().map(|p| (p.iteration, p.score)).collect::<Vec<_>>()
        };
        assert_eq!(scores(&first), scores(&second));
    }

    #[test]
    fn iterations_never_exceed_budget() {
        for algorithm in [Algorithm::GridRepair, Algorithm::SimulatedAnnealing, Algorithm::Genetic] {
            let result = optimize(&request(config(algorithm, 20)));
            assert!(result.statistics.iterations <= 20);
            assert!(result.statistics.terminal_state.is_terminal());
        }
    }

    #[test]
    fn time_limit_ends_an_unbounded_run() {
        let config = SearchConfig::builder()
            .algorithm(Algorithm::SimulatedAnnealing)
            .max_iterations(usize::MAX)
            .time_limit(Duration::from_millis(1))
            .patience(None)
            .seed(7)
            .build()
            .unwrap();
        let result = optimize(&request(config));

        assert_eq!(result.statistics.terminal_state, SearchState::BudgetExhausted);
        assert!(result.statistics.total_time < Duration::from_secs(5));
        assert!(result.statistics.iterations < usize::MAX);
        assert_eq!(result.best_layout.len(), 8);
    }

    #[test]
    fn best_layout_improves_on_or_matches_the_seed() {
        let result = optimize(&request(config(Algorithm::GridRepair, 300)));
        let seed = result.statistics.convergence.first().unwrap().score;
        let best = result.best_layout.score.as_ref().unwrap().overall;
        assert!(best >= seed);
        assert_eq!(result.best_layout.metadata.algorithm, "grid_repair");
        assert_eq!(result.best_layout.len(), 8);
    }

    #[test]
    fn cancelled_run_still_returns_a_layout() {
        let cancel = AtomicBool::new(true);
        let result = run(
            &request(config(Algorithm::Genetic, 100)),
            &ProgressReporter::new(),
            &cancel,
        )
        .unwrap();
        assert_eq!(result.statistics.terminal_state, SearchState::Cancelled);
        assert_eq!(result.statistics.iterations, 0);
        assert_eq!(result.best_layout.len(), 8);
    }

    #[test]
    fn zero_iterations_returns_the_scored_seed() {
        let result = optimize(&request(config(Algorithm::GridRepair, 0)));
        assert_eq!(result.statistics.terminal_state, SearchState::BudgetExhausted);
        assert!(result.best_layout.score.is_some());
    }

    #[test]
    fn empty_roster_yields_well_formed_result() {
        let mut req = request(config(Algorithm::SimulatedAnnealing, 10));
        req.tools.clear();
        let result = optimize(&req);
        assert!(result.best_layout.is_empty());
        assert_eq!(result.best_layout.score.as_ref().unwrap().overall, 100);
        assert_eq!(result.statistics.space_savings_percent, 0.0);
    }

    #[test]
    fn zero_area_workshop_is_accepted() {
        let mut req = request(config(Algorithm::GridRepair, 5));
        req.workshop.dimensions = Dimensions::new(0.0, 0.0, 96.0);
        let result = optimize(&req);
        assert_eq!(result.best_layout.len(), 8);
    }

    #[test]
    fn invalid_dimensions_are_rejected() {
        let mut req = request(config(Algorithm::GridRepair, 5));
        req.workshop.dimensions = Dimensions::new(f64::NAN, 100.0, 96.0);
        let result = run(&req, &ProgressReporter::new(), &AtomicBool::new(false));
        assert!(matches!(result, Err(EngineError::InvalidRequest(_))));
    }

    #[test]
    fn duplicate_tool_ids_are_rejected() {
        let mut req = request(config(Algorithm::GridRepair, 5));
        let first = Arc::clone(&req.tools[0]);
        req.tools.push(first);
        let result = run(&req, &ProgressReporter::new(), &AtomicBool::new(false));
        assert!(matches!(result, Err(EngineError::InvalidRequest(msg)) if msg.contains("table_saw")));
    }

    #[test]
    fn satisfaction_counts_cover_every_constraint() {
        let result = optimize(&request(config(Algorithm::GridRepair, 50)));
        let summary = &result.statistics.constraint_satisfaction;
        let violated: usize = summary.violated_by_priority.values().sum();
        assert!(summary.total > 0);
        assert_eq!(summary.satisfied + violated, summary.total);
    }

    #[test]
    fn kept_candidates_are_sorted_best_first() {
        let mut cfg = config(Algorithm::Genetic, 3);
        cfg.keep_candidates = true;
        let result = optimize(&request(cfg));
        assert!(!result.candidates.is_empty());
        let scores: Vec<u32> = result
            .candidates
            .iter()
            .map(|l| l.score.as_ref().unwrap().overall)
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn prebuilt_constraints_are_used_as_given() {
        let req = request(config(Algorithm::GridRepair, 5)).with_constraints(Arc::new(ConstraintSet::default()));
        let result = optimize(&req);
        assert_eq!(result.statistics.constraint_satisfaction.total, 0);
    }

    #[test]
    fn cache_is_reused_across_runs() {
        let req = request(config(Algorithm::GridRepair, 5));
        let mut cache = ConstraintCache::new();
        let cancel = AtomicBool::new(false);
        run_with_cache(&req, &mut cache, &ProgressReporter::new(), &cancel).unwrap();
        run_with_cache(&req, &mut cache, &ProgressReporter::new(), &cancel).unwrap();
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn progress_reports_all_three_phases() {
        let phases = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::PhaseStart { name } = event {
                phases.lock().unwrap().push(name);
            }
        }));
        run(&request(config(Algorithm::GridRepair, 3)), &reporter, &AtomicBool::new(false)).unwrap();
        drop(reporter);
        assert_eq!(phases.into_inner().unwrap(), vec!["Preparation", "Search", "Finalize"]);
    }

    #[test]
    fn optimize_and_save_persists_the_best_layout() {
        let store = InMemoryStore::new();
        store.insert_workshop(garage(), roster()).unwrap();
        let result = optimize_and_save(
            &store,
            "garage",
            config(Algorithm::GridRepair, 10),
            Arc::new(ResearchData::builtin()),
            &ProgressReporter::new(),
            &AtomicBool::new(false),
        )
        .unwrap();
        assert_eq!(result.best_layout.id, "layout-1");
        assert_eq!(store.layouts("garage").unwrap(), vec![result.best_layout]);
    }

    #[test]
    fn optimize_and_save_reports_missing_workshop() {
        let store = InMemoryStore::new();
        let result = optimize_and_save(
            &store,
            "shed",
            SearchConfig::default(),
            Arc::new(ResearchData::builtin()),
            &ProgressReporter::new(),
            &AtomicBool::new(false),
        );
        assert!(matches!(result, Err(EngineError::Store { .. })));
    }

    #[test]
    fn factory_built_set_matches_cached_set() {
        let req = request(config(Algorithm::GridRepair, 1));
        let direct = ConstraintFactory::build(
            &ResearchData::builtin(),
            &ConstraintSelection::for_roster(&req.config.project_types, &req.tools),
        );
        let cached = resolve_constraints(&req, &mut ConstraintCache::new());
        assert_eq!(direct.len(), cached.len());
    }
}
