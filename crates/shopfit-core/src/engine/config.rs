use crate::core::scoring::ScoringWeights;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("Failed to read search config '{path}': {message}")]
    Io { path: String, message: String },
    #[error("Failed to parse search config '{path}': {message}")]
    Parse { path: String, message: String },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[default]
    #[serde(alias = "constraint_satisfaction", alias = "grid")]
    GridRepair,
    #[serde(alias = "annealing")]
    SimulatedAnnealing,
    Genetic,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::GridRepair => "grid_repair",
            Algorithm::SimulatedAnnealing => "simulated_annealing",
            Algorithm::Genetic => "genetic",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Temperatures are in overall-score points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AnnealingConfig {
    pub initial_temperature: f64,
    pub cooling_rate: f64,
    pub min_temperature: f64,
    /// Largest random displacement of one placement per move, in inches.
    pub move_step: f64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 10.0,
            cooling_rate: 0.995,
            min_temperature: 0.01,
            move_step: 24.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct GeneticConfig {
    pub population_size: usize,
    pub tournament_size: usize,
    pub mutation_rate: f64,
    pub elitism: usize,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 24,
            tournament_size: 3,
            mutation_rate: 0.2,
            elitism: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub algorithm: Algorithm,
    pub max_iterations: usize,
    pub time_limit: Duration,
    /// Iterations without improvement before the search is considered converged.
    pub patience: Option<usize>,
    pub seed: u64,
    pub weights: ScoringWeights,
    pub project_types: Vec<String>,
    pub keep_candidates: bool,
    /// Initial move length of the grid repair neighbourhood, in inches.
    pub grid_step: f64,
    pub annealing: AnnealingConfig,
    pub genetic: GeneticConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            max_iterations: 1000,
            time_limit: Duration::from_millis(30_000),
            patience: Some(50),
            seed: 0,
            weights: ScoringWeights::default(),
            project_types: Vec::new(),
            keep_candidates: false,
            grid_step: 12.0,
            annealing: AnnealingConfig::default(),
            genetic: GeneticConfig::default(),
        }
    }
}

impl SearchConfig {
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.patience == Some(0) {
            return Err(invalid("patience", "must be at least 1 when set"));
        }
        if !(self.grid_step.is_finite() && self.grid_step > 0.0) {
            return Err(invalid("grid_step", format!("must be positive, got {}", self.grid_step)));
        }

        let sa = &self.annealing;
        if !(sa.initial_temperature.is_finite() && sa.initial_temperature > 0.0) {
            return Err(invalid("annealing.initial_temperature", "must be positive"));
        }
        if !(sa.cooling_rate > 0.0 && sa.cooling_rate < 1.0) {
            return Err(invalid(
                "annealing.cooling_rate",
                format!("must be in (0, 1), got {}", sa.cooling_rate),
            ));
        }
        if !(sa.min_temperature.is_finite() && sa.min_temperature >= 0.0) {
            return Err(invalid("annealing.min_temperature", "must be non-negative"));
        }
        if !(sa.move_step.is_finite() && sa.move_step > 0.0) {
            return Err(invalid("annealing.move_step", "must be positive"));
        }

        let ga = &self.genetic;
        if ga.population_size < 2 {
            return Err(invalid("genetic.population_size", "must be at least 2"));
        }
        if ga.tournament_size == 0 || ga.tournament_size > ga.population_size {
            return Err(invalid(
                "genetic.tournament_size",
                "must be between 1 and the population size",
            ));
        }
        if !(0.0..=1.0).contains(&ga.mutation_rate) {
            return Err(invalid("genetic.mutation_rate", "must be in [0, 1]"));
        }
        if ga.elitism >= ga.population_size {
            return Err(invalid("genetic.elitism", "must be smaller than the population size"));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content, &path.to_string_lossy())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let file: SearchConfigFile = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        file.into_builder().build()
    }
}

/// On-disk form of [`SearchConfig`]. Every key is optional; missing keys keep defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct SearchConfigFile {
    algorithm: Option<Algorithm>,
    max_iterations: Option<usize>,
    time_limit_ms: Option<u64>,
    /// `0` disables the patience window.
    patience: Option<usize>,
    seed: Option<u64>,
    project_types: Option<Vec<String>>,
    keep_candidates: Option<bool>,
    grid_step: Option<f64>,
    weights: Option<ScoringWeights>,
    annealing: Option<AnnealingConfig>,
    genetic: Option<GeneticConfig>,
}

impl SearchConfigFile {
    fn into_builder(self) -> SearchConfigBuilder {
        SearchConfigBuilder {
            algorithm: self.algorithm,
            max_iterations: self.max_iterations,
            time_limit: self.time_limit_ms.map(Duration::from_millis),
            patience: self.patience.map(|p| (p > 0).then_some(p)),
            seed: self.seed,
            weights: self.weights,
            project_types: self.project_types,
            keep_candidates: self.keep_candidates,
            grid_step: self.grid_step,
            annealing: self.annealing,
            genetic: self.genetic,
        }
    }
}

#[derive(Default)]
pub struct SearchConfigBuilder {
    algorithm: Option<Algorithm>,
    max_iterations: Option<usize>,
    time_limit: Option<Duration>,
    patience: Option<Option<usize>>,
    seed: Option<u64>,
    weights: Option<ScoringWeights>,
    project_types: Option<Vec<String>>,
    keep_candidates: Option<bool>,
    grid_step: Option<f64>,
    annealing: Option<AnnealingConfig>,
    genetic: Option<GeneticConfig>,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }
    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
    pub fn patience(mut self, patience: Option<usize>) -> Self {
        self.patience = Some(patience);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = Some(weights);
        self
    }
    pub fn project_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.project_types = Some(types.into_iter().map(Into::into).collect());
        self
    }
    pub fn keep_candidates(mut self, keep: bool) -> Self {
        self.keep_candidates = Some(keep);
        self
    }
    pub fn grid_step(mut self, step: f64) -> Self {
        self.grid_step = Some(step);
        self
    }
    pub fn annealing(mut self, annealing: AnnealingConfig) -> Self {
        self.annealing = Some(annealing);
        self
    }
    pub fn genetic(mut self, genetic: GeneticConfig) -> Self {
        self.genetic = Some(genetic);
        self
    }

    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        let defaults = SearchConfig::default();
        let config = SearchConfig {
            algorithm: self.algorithm.unwrap_or(defaults.algorithm),
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            time_limit: self.time_limit.unwrap_or(defaults.time_limit),
            patience: self.patience.unwrap_or(defaults.patience),
            seed: self.seed.unwrap_or(defaults.seed),
            weights: self.weights.unwrap_or(defaults.weights),
            project_types: self.project_types.unwrap_or(defaults.project_types),
            keep_candidates: self.keep_candidates.unwrap_or(defaults.keep_candidates),
            grid_step: self.grid_step.unwrap_or(defaults.grid_step),
            annealing: self.annealing.unwrap_or(defaults.annealing),
            genetic: self.genetic.unwrap_or(defaults.genetic),
        };
        config.validate()?;
        Ok(config)
    }
}
