use crate::cli::OptimizeArgs;
use crate::config::resolve_search_config;
use crate::error::{CliError, Result};
use crate::progress::CliProgressHandler;
use shopfit::core::models::catalog::ToolCatalog;
use shopfit::core::models::geometry::Dimensions;
use shopfit::core::models::layout::Layout;
use shopfit::core::models::tool::Tool;
use shopfit::core::models::workshop::Workshop;
use shopfit::core::research::data::ResearchData;
use shopfit::engine::progress::ProgressReporter;
use shopfit::workflows::optimize::{self, OptimizationRequest, OptimizationResult};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

const MAX_LISTED_VIOLATIONS: usize = 10;

pub fn run(args: OptimizeArgs) -> Result<()> {
    let config = resolve_search_config(&args)?;

    let catalog = match &args.tools {
        Some(path) => {
            info!(path = %path.display(), "Loading tool catalog.");
            ToolCatalog::load_csv(path)?
        }
        None => ToolCatalog::standard(),
    };
    let tools = mark_mobile(catalog.tools(), &args.mobile)?;

    let research = match &args.research {
        Some(path) => {
            info!(path = %path.display(), "Loading research data.");
            ResearchData::load(path)?
        }
        None => ResearchData::builtin(),
    };
    for skipped in &research.skipped {
        warn!(
            section = %skipped.section,
            index = skipped.index,
            reason = %skipped.reason,
            "Skipped research record."
        );
    }

    let (length, width) = args.floor;
    let workshop = Workshop::new(
        "workshop",
        &args.name,
        Dimensions::new(length, width, args.height),
    );
    let request = OptimizationRequest::new(workshop, tools, config, Arc::new(research));

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let cancel = cancel_on_interrupt();

    println!("Searching for a layout of {} tools...", request.tools.len());
    let result = optimize::run(&request, &reporter, &cancel)?;
    if cancel.load(Ordering::Relaxed) {
        println!("Interrupted; reporting the best layout found so far.");
    }
    print!("{}", render_summary(&result));

    if let Some(path) = &args.output {
        write_layout(path, &result.best_layout)?;
        println!("Best layout written to: {}", path.display());
    }
    Ok(())
}

/// A flag raised by Ctrl-C. The search stops at its next iteration and still reports
/// the best layout found.
fn cancel_on_interrupt() -> Arc<AtomicBool> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
        warn!(error = %e, "Could not install the Ctrl-C handler; the search cannot be interrupted.");
    }
    cancel
}

/// Copies the catalog roster, flagging the listed ids as mobile.
pub fn mark_mobile(tools: &[Arc<Tool>], mobile_ids: &[String]) -> Result<Vec<Arc<Tool>>> {
    if let Some(unknown) = mobile_ids.iter().find(|id| !tools.iter().any(|t| &t.id == *id)) {
        return Err(CliError::Argument(format!(
            "--mobile names unknown tool id '{unknown}'"
        )));
    }
    Ok(tools
        .iter()
        .map(|tool| {
            if mobile_ids.contains(&tool.id) && !tool.is_mobile {
                Arc::new((**tool).clone().mobile(true))
            } else {
                Arc::clone(tool)
            }
        })
        .collect())
}

pub fn write_layout(path: &Path, layout: &Layout) -> Result<()> {
    let content = toml::to_string_pretty(layout).map_err(|e| CliError::Output {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    std::fs::write(path, content).map_err(|e| CliError::Output {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

pub fn render_summary(result: &OptimizationResult) -> String {
    use std::fmt::Write;

    let layout = &result.best_layout;
    let stats = &result.statistics;
    let mut out = String::new();

    let overall = layout.score.as_ref().map_or(0, |s| s.overall);
    let _ = writeln!(
        out,
        "Best layout: {overall}/100 ({}, {} iterations, {:?}, {:.2}s)",
        layout.metadata.algorithm,
        stats.iterations,
        stats.terminal_state,
        stats.total_time.as_secs_f64()
    );
    if let Some(score) = &layout.score {
        let c = &score.categories;
        let _ = writeln!(
            out,
            "  safety {:.1} | workflow {:.1} | space {:.1} | accessibility {:.1}",
            c.safety, c.workflow, c.space, c.accessibility
        );
    }

    let sat = &stats.constraint_satisfaction;
    let violated = sat
        .violated_by_priority
        .iter()
        .rev()
        .map(|(priority, count)| format!("{priority}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = write!(out, "  constraints: {}/{} satisfied", sat.satisfied, sat.total);
    if violated.is_empty() {
        let _ = writeln!(out);
    } else {
        let _ = writeln!(out, " (violated {violated})");
    }
    let _ = writeln!(out, "  space savings: {:.1}%", stats.space_savings_percent);

    for placement in &layout.placements {
        let p = placement.position;
        let _ = write!(out, "    {:<16} x={:>7.1} y={:>7.1}", placement.tool.id, p.x, p.y);
        if let Some(parked) = placement.parked_position {
            let _ = write!(out, "  parked x={:.1} y={:.1}", parked.x, parked.y);
        }
        let _ = writeln!(out);
    }

    if let Some(score) = &layout.score {
        for violation in score.violations.iter().take(MAX_LISTED_VIOLATIONS) {
            let _ = writeln!(out, "  ! {violation}");
        }
        if score.violations.len() > MAX_LISTED_VIOLATIONS {
            let _ = writeln!(
                out,
                "  ... and {} more",
                score.violations.len() - MAX_LISTED_VIOLATIONS
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use shopfit::engine::config::SearchConfig;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn interrupt_flag_starts_lowered_and_survives_repeat_installs() {
        let first = cancel_on_interrupt();
        let second = cancel_on_interrupt();
        assert!(!first.load(Ordering::Relaxed));
        assert!(!second.load(Ordering::Relaxed));
    }

    #[test]
    fn mark_mobile_flags_only_listed_tools() {
        let catalog = ToolCatalog::standard();
        let tools = mark_mobile(catalog.tools(), &["planer".to_string()]).unwrap();
        let mobile: Vec<&str> = tools
            .iter()
            .filter(|t| t.is_mobile)
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(mobile, vec!["planer"]);
    }

    #[test]
    fn mark_mobile_rejects_unknown_ids() {
        let catalog = ToolCatalog::standard();
        let result = mark_mobile(catalog.tools(), &["lathe".to_string()]);
        assert!(matches!(result, Err(CliError::Argument(msg)) if msg.contains("lathe")));
    }

    fn small_result() -> OptimizationResult {
        let catalog = ToolCatalog::standard();
        let tools = mark_mobile(catalog.tools(), &["band_saw".to_string()]).unwrap();
        let config = SearchConfig::builder().max_iterations(5).build().unwrap();
        let request = OptimizationRequest::new(
            Workshop::new("w", "Garage", Dimensions::new(288.0, 240.0, 96.0)),
            tools,
            config,
            Arc::new(ResearchData::builtin()),
        );
        optimize::run(&request, &ProgressReporter::new(), &AtomicBool::new(false)).unwrap()
    }

    #[test]
    fn summary_lists_every_placement() {
        let result = small_result();
        let summary = render_summary(&result);
        assert!(summary.starts_with("Best layout: "));
        for placement in &result.best_layout.placements {
            assert!(summary.contains(&placement.tool.id));
        }
        assert!(summary.contains("parked x="));
    }

    #[test]
    fn written_layout_reads_back() {
        let result = small_result();
        let dir = tempdir().unwrap();
        let path = dir.path().join("layout.toml");
        write_layout(&path, &result.best_layout).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let layout: Layout = toml::from_str(&text).unwrap();
        assert_eq!(layout.placements.len(), result.best_layout.placements.len());
        assert_eq!(layout.placements[0].tool.id, "table_saw");
    }
}
