use crate::cli::OptimizeArgs;
use crate::error::{CliError, Result};
use shopfit::engine::config::SearchConfig;
use std::time::Duration;
use tracing::debug;

/// The search configuration file, if any, with command-line overrides applied on top.
pub fn resolve_search_config(args: &OptimizeArgs) -> Result<SearchConfig> {
    let mut config = match &args.config {
        Some(path) => {
            debug!(path = %path.display(), "Loading search configuration file.");
            SearchConfig::load(path)?
        }
        None => SearchConfig::default(),
    };

    if let Some(algorithm) = args.algorithm {
        config.algorithm = algorithm.into();
    }
    if let Some(iterations) = args.max_iterations {
        config.max_iterations = iterations;
    }
    if let Some(secs) = args.time_limit {
        config.time_limit = Duration::try_from_secs_f64(secs)
            .map_err(|_| CliError::Argument(format!("invalid time limit: {secs}")))?;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if !args.project_types.is_empty() {
        config.project_types = args.project_types.clone();
    }

    config.validate()?;
    Ok(config)
}
