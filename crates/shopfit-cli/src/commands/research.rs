use crate::cli::{ResearchArgs, ResearchCommands};
use crate::error::Result;
use shopfit::core::constraints::factory::{ConstraintFactory, ConstraintSelection};
use shopfit::core::research::data::ResearchData;
use std::path::Path;
use tracing::info;

pub fn run(args: ResearchArgs) -> Result<()> {
    match args.command {
        ResearchCommands::Check { path } => {
            let data = ResearchData::load(&path)?;
            print!("{}", render_check(&path, &data));
        }
        ResearchCommands::Constraints {
            path,
            project_types,
        } => {
            let data = match &path {
                Some(path) => ResearchData::load(path)?,
                None => ResearchData::builtin(),
            };
            print!("{}", render_constraints(&data, project_types));
        }
    }
    Ok(())
}

fn render_check(path: &Path, data: &ResearchData) -> String {
    use std::fmt::Write;

    info!(path = %path.display(), version = %data.version, "Checked research file.");
    let mut out = String::new();
    let _ = writeln!(out, "{} (version {})", path.display(), data.version);
    let _ = writeln!(out, "  safety findings:   {}", data.safety.len());
    let _ = writeln!(out, "  workflow patterns: {}", data.workflow.len());
    let _ = writeln!(out, "  mobile records:    {}", data.mobile.len());
    let _ = writeln!(out, "  skipped:           {}", data.skipped.len());
    for skipped in &data.skipped {
        let _ = writeln!(
            out,
            "    [{}#{}] {}",
            skipped.section, skipped.index, skipped.reason
        );
    }
    out
}

fn render_constraints(data: &ResearchData, project_types: Vec<String>) -> String {
    use std::fmt::Write;

    let selection = ConstraintSelection {
        project_types,
        ..ConstraintSelection::all()
    };
    let set = ConstraintFactory::build(data, &selection);
    let mut out = String::new();
    for constraint in &set {
        let _ = writeln!(
            out,
            "{:<9} {:<48} {}",
            constraint.priority.to_string(),
            constraint.id,
            constraint.description
        );
    }
    let _ = writeln!(out, "{} constraints, {} skipped", set.len(), set.skipped().len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn check_reports_counts_and_skipped_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("research.toml");
        fs::write(
            &path,
            r#"
            version = "local-1"

            [[safety]]
            tool = "planer"
            requirement-type = "clearance"
            priority = "HIGH"
            measurements.front = { min = 48 }
            measurements.back = { min = 48 }
            measurements.sides = { min = 18 }

            [[safety]]
            tool = "jointer"
            "#,
        )
        .unwrap();

        let data = ResearchData::load(&path).unwrap();
        let report = render_check(&path, &data);
        assert!(report.contains("version local-1"));
        assert!(report.contains("safety findings:   1"));
        assert!(report.contains("skipped:           1"));
        assert!(report.contains("[safety#1]"));
    }

    #[test]
    fn builtin_constraints_list_required_rules_first() {
        let report = render_constraints(&ResearchData::builtin(), Vec::new());
        let first = report.lines().next().unwrap();
        assert!(first.starts_with("REQUIRED"));
        assert!(report.contains("safety_clearance_table_saw"));
    }

    #[test]
    fn project_type_filter_narrows_workflow_rules() {
        let all = render_constraints(&ResearchData::builtin(), Vec::new());
        let kitchen = render_constraints(&ResearchData::builtin(), vec!["kitchen goods".to_string()]);
        let count = |s: &str| s.lines().filter(|l| l.contains("workflow_")).count();
        assert!(count(&kitchen) < count(&all));
    }
}
