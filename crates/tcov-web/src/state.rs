use std::sync::Arc;
use tcov_core::{ConfigError, EngineConfig, Matcher};

/// Read-only engine configuration shared by every request.
#[derive(Debug, Clone)]
pub struct WebState {
    config: Arc<EngineConfig>,
    matcher: Arc<Matcher>,
}

impl Default for WebState {
    fn default() -> Self {
        Self {
            config: Arc::new(EngineConfig::default()),
            matcher: Arc::new(Matcher::default()),
        }
    }
}

impl WebState {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let matcher = config.matcher()?;
        Ok(Self {
            config: Arc::new(config),
            matcher: Arc::new(matcher),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn match_threshold(&self) -> f64 {
        self.config.matching.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::WebState;
    use tcov_core::{Attribute, AttributeWeight, EngineConfig, ScoringStrategy};

    #[test]
    fn default_state_uses_default_threshold() {
        let state = WebState::default();
        assert_eq!(state.match_threshold(), 0.7);
        assert_eq!(state.config(), &EngineConfig::default());
    }

    #[test]
    fn new_rejects_invalid_strategy() {
        let mut config = EngineConfig::default();
        config.matching.strategy = ScoringStrategy::Weighted {
            weights: vec![AttributeWeight {
                attribute: Attribute::Name,
                weight: -1.0,
            }],
        };
        assert!(WebState::new(config).is_err());
    }
}
