use std::time::Duration;

use fox_bot::{Budget, IsmctsPolicy, Policy, RandomPolicy, SearchConfig};
use serde::Deserialize;
use thiserror::Error;

use crate::config::{AgentConfig, AgentKind};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid {kind:?} parameters for agent '{name}': {source}")]
    InvalidParams {
        name: String,
        kind: AgentKind,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("agent '{name}' sets both iterations and target_ms")]
    ConflictingBudget { name: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RandomParams {
    seed: Option<u64>,
}

/// Overrides on top of `SearchConfig::from_env()`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct IsmctsParams {
    iterations: Option<usize>,
    target_ms: Option<u64>,
    max_ms: Option<u64>,
    exploration: Option<f64>,
    workers: Option<usize>,
    seed: Option<u64>,
}

#[derive(Debug, Clone)]
enum Implementation {
    Random { seed: Option<u64> },
    Ismcts { config: SearchConfig },
}

/// Validated agent definition that can spawn fresh policies per game.
#[derive(Debug, Clone)]
pub struct AgentBlueprint {
    pub name: String,
    implementation: Implementation,
}

impl AgentBlueprint {
    pub fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let invalid = |source| AgentError::InvalidParams {
            name: config.name.clone(),
            kind: config.kind,
            source,
        };
        let params = if config.params.is_null() {
            serde_yaml::Value::Mapping(Default::default())
        } else {
            config.params.clone()
        };

        let implementation = match config.kind {
            AgentKind::Random => {
                let params: RandomParams = serde_yaml::from_value(params).map_err(invalid)?;
                Implementation::Random { seed: params.seed }
            }
            AgentKind::Ismcts => {
                let params: IsmctsParams = serde_yaml::from_value(params).map_err(invalid)?;
                Implementation::Ismcts {
                    config: search_config(&config.name, params)?,
                }
            }
        };

        Ok(Self {
            name: config.name.clone(),
            implementation,
        })
    }

    /// Policy for one game. `game_seed` keeps unseeded agents reproducible.
    pub fn spawn_policy(&self, game_seed: u64) -> Box<dyn Policy> {
        match &self.implementation {
            Implementation::Random { seed } => Box::new(RandomPolicy::with_seed(
                seed.map_or(game_seed, |seed| seed ^ game_seed),
            )),
            Implementation::Ismcts { config } => {
                let seed = config.seed.map_or(game_seed, |seed| seed ^ game_seed);
                Box::new(IsmctsPolicy::new(config.with_seed(seed)))
            }
        }
    }
}

fn search_config(name: &str, params: IsmctsParams) -> Result<SearchConfig, AgentError> {
    let mut config = SearchConfig::from_env();
    match (params.iterations, params.target_ms) {
        (Some(_), Some(_)) => {
            return Err(AgentError::ConflictingBudget {
                name: name.to_string(),
            });
        }
        (Some(count), None) => config = config.with_budget(Budget::Iterations(count)),
        (None, Some(ms)) => config = config.with_budget(Budget::Time(Duration::from_millis(ms))),
        (None, None) => {}
    }
    if let Some(ms) = params.max_ms {
        config.max_duration = Duration::from_millis(ms).max(config.target);
    }
    if let Some(exploration) = params.exploration.filter(|k| k.is_finite() && *k >= 0.0) {
        config.exploration = exploration;
    }
    if let Some(workers) = params.workers {
        config = config.with_workers(workers);
    }
    config.seed = params.seed.or(config.seed);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(kind: AgentKind, params: &str) -> AgentConfig {
        AgentConfig {
            name: "a".to_string(),
            kind,
            params: serde_yaml::from_str(params).expect("yaml params"),
        }
    }

    #[test]
    fn ismcts_params_override_the_search_config() {
        let blueprint = AgentBlueprint::from_config(&agent(
            AgentKind::Ismcts,
            "{iterations: 250, workers: 2, exploration: 1.5, seed: 9}",
        ))
        .unwrap();
        let Implementation::Ismcts { config } = blueprint.implementation else {
            panic!("expected an ismcts agent");
        };
        assert_eq!(config.iteration_cap, Some(250));
        assert_eq!(config.workers, 2);
        assert_eq!(config.exploration, 1.5);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn empty_params_use_defaults() {
        let blueprint = AgentBlueprint::from_config(&agent(AgentKind::Random, "~")).unwrap();
        assert!(matches!(
            blueprint.implementation,
            Implementation::Random { seed: None }
        ));
        assert_eq!(blueprint.spawn_policy(3).name(), "random");
    }

    #[test]
    fn rejects_unknown_and_conflicting_params() {
        let err = AgentBlueprint::from_config(&agent(AgentKind::Random, "{depth: 3}")).unwrap_err();
        assert!(matches!(err, AgentError::InvalidParams { .. }));

        let err = AgentBlueprint::from_config(&agent(
            AgentKind::Ismcts,
            "{iterations: 10, target_ms: 100}",
        ))
        .unwrap_err();
        assert!(matches!(err, AgentError::ConflictingBudget { .. }));
    }
}
