use std::time::Duration;

/// How long a single decision may search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Budget {
    /// Target wall-clock time; may be extended up to the configured hard cap.
    Time(Duration),
    /// Fixed number of iterations, ignoring the clock.
    Iterations(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// UCB1 exploration constant.
    pub exploration: f64,
    /// Visits a node needs before its children are tracked.
    pub expansion_threshold: u32,
    pub batch_size: usize,
    pub target: Duration,
    pub max_duration: Duration,
    /// Multiplier applied to the target while the root has not converged.
    pub extension_factor: f64,
    /// Score margin that maps to a reward of about 0.73.
    pub reward_scale: f64,
    pub workers: usize,
    pub iteration_cap: Option<usize>,
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration: 5.0,
            expansion_threshold: 1,
            batch_size: 200,
            target: Duration::from_millis(1000),
            max_duration: Duration::from_millis(4000),
            extension_factor: 1.5,
            reward_scale: 3.0,
            workers: 1,
            iteration_cap: None,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base = Self::default();

        let exploration = read("FOX_SEARCH_EXPLORATION")
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite() && *value >= 0.0)
            .unwrap_or(base.exploration);
        let expansion_threshold = read("FOX_SEARCH_EXPANSION_THRESHOLD")
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(base.expansion_threshold);
        let batch_size = read("FOX_SEARCH_BATCH")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(base.batch_size);
        let target = read("FOX_SEARCH_TARGET_MS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(base.target);
        let max_duration = read("FOX_SEARCH_MAX_MS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(base.max_duration);
        let extension_factor = read("FOX_SEARCH_EXTENSION")
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite() && *value >= 1.0)
            .unwrap_or(base.extension_factor);
        let reward_scale = read("FOX_SEARCH_REWARD_SCALE")
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite() && *value > 0.0)
            .unwrap_or(base.reward_scale);
        let workers = read("FOX_SEARCH_WORKERS")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(base.workers);
        let iteration_cap = read("FOX_SEARCH_ITERATIONS")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|value| *value > 0);
        let seed = read("FOX_SEARCH_SEED").and_then(|raw| raw.trim().parse::<u64>().ok());

        Self {
            exploration,
            expansion_threshold,
            batch_size,
            target,
            max_duration: max_duration.max(target),
            extension_factor,
            reward_scale,
            workers,
            iteration_cap,
            seed,
        }
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        match budget {
            Budget::Time(target) => {
                self.target = target;
                self.max_duration = self.max_duration.max(target);
                self.iteration_cap = None;
            }
            Budget::Iterations(count) => self.iteration_cap = Some(count.max(1)),
        }
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Logistic map of a score margin into (0, 1).
    pub fn reward(&self, margin: i32) -> f64 {
        1.0 / (1.0 + (-(margin as f64) / self.reward_scale).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::{Budget, SearchConfig};
    use std::collections::HashMap;
    use std::time::Duration;

    #[test]
    fn defaults_match_classic_ismcts_knobs() {
        let config = SearchConfig::default();
        assert_eq!(config.exploration, 5.0);
        assert_eq!(config.expansion_threshold, 1);
        assert!(config.max_duration >= config.target);
    }

    #[test]
    fn reader_overrides_and_rejects_garbage() {
        let mut vars = HashMap::new();
        vars.insert("FOX_SEARCH_EXPLORATION".to_string(), "0.7".to_string());
        vars.insert("FOX_SEARCH_WORKERS".to_string(), "4".to_string());
        vars.insert("FOX_SEARCH_TARGET_MS".to_string(), "250".to_string());
        vars.insert("FOX_SEARCH_MAX_MS".to_string(), "100".to_string());
        vars.insert("FOX_SEARCH_EXTENSION".to_string(), "0.5".to_string());
        vars.insert("FOX_SEARCH_BATCH".to_string(), "zero".to_string());
        vars.insert("FOX_SEARCH_ITERATIONS".to_string(), "300".to_string());

        let config = SearchConfig::from_reader(|key| vars.get(key).cloned());
        assert_eq!(config.exploration, 0.7);
        assert_eq!(config.workers, 4);
        assert_eq!(config.target, Duration::from_millis(250));
        // Hard cap never sits below the target.
        assert_eq!(config.max_duration, Duration::from_millis(250));
        assert_eq!(config.extension_factor, 1.5);
        assert_eq!(config.batch_size, 200);
        assert_eq!(config.iteration_cap, Some(300));
    }

    #[test]
    fn budget_switches_modes() {
        let config = SearchConfig::default().with_budget(Budget::Iterations(0));
        assert_eq!(config.iteration_cap, Some(1));
        let config = config.with_budget(Budget::Time(Duration::from_secs(10)));
        assert_eq!(config.iteration_cap, None);
        assert_eq!(config.max_duration, Duration::from_secs(10));
    }

    #[test]
    fn reward_is_logistic_in_margin() {
        let config = SearchConfig::default();
        assert!((config.reward(0) - 0.5).abs() < 1e-12);
        assert!(config.reward(6) > config.reward(1));
        assert!(config.reward(-20) > 0.0);
        assert!(config.reward(20) < 1.0);
        assert!((config.reward(3) + config.reward(-3) - 1.0).abs() < 1e-12);
    }
}
