use crate::error::StrategyError;
use crate::fvg_flip::FvgFlip;
use crate::stoch_macd_scalp::StochMacdScalp;
use crate::trend_rider::TrendRider;
use crate::triangle_sync::TriangleSync;
use crate::Strategy;
use configuration::Strategies;
use core_types::{Bar, Candidate, StrategyId};

/// Creates a new rule instance based on the provided ID and configuration.
pub fn create_strategy(
    id: StrategyId,
    config: &Strategies,
) -> Result<Box<dyn Strategy>, StrategyError> {
    // The compiler will error if a new StrategyId is added but not handled here.
    match id {
        StrategyId::FvgFlip => Ok(Box::new(FvgFlip::new(config.fvg_flip.clone())?)),
        StrategyId::TriangleSync => Ok(Box::new(TriangleSync::new(config.triangle_sync.clone())?)),
        StrategyId::StochMacdScalp => Ok(Box::new(StochMacdScalp::new(
            config.stoch_macd_scalp.clone(),
        )?)),
        StrategyId::TrendRider => Ok(Box::new(TrendRider::new(config.trend_rider.clone())?)),
    }
}

/// The enabled rules, held in fixed priority order.
pub struct RuleSet {
    rules: Vec<Box<dyn Strategy>>,
}

impl RuleSet {
    /// Builds every enabled rule. Duplicates in the enabled list are ignored and
    /// the configured order does not matter: priority is always `StrategyId` order.
    pub fn from_config(config: &Strategies) -> Result<Self, StrategyError> {
        let mut rules = Vec::new();
        for id in StrategyId::ALL {
            if config.enabled.contains(&id) {
                rules.push(create_strategy(id, config)?);
            }
        }
        if rules.is_empty() {
            return Err(StrategyError::InvalidParameters(
                "at least one rule must be enabled".to_string(),
            ));
        }
        Ok(Self { rules })
    }

    pub fn ids(&self) -> Vec<StrategyId> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Runs the rules in priority order; the first one that fires wins.
    pub fn evaluate(&self, bars: &[Bar]) -> Option<Candidate> {
        self.rules.iter().find_map(|rule| {
            let candidate = rule.evaluate(bars);
            if let Some(c) = &candidate {
                tracing::debug!(rule = %rule.id(), direction = %c.direction, "Rule fired.");
            }
            candidate
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_are_ordered_by_priority() {
        let mut config = Strategies::default();
        config.enabled = vec![StrategyId::TrendRider, StrategyId::FvgFlip, StrategyId::TrendRider];
        let set = RuleSet::from_config(&config).unwrap();
        assert_eq!(set.ids(), vec![StrategyId::FvgFlip, StrategyId::TrendRider]);
    }

    #[test]
    fn empty_rule_set_is_an_error() {
        let mut config = Strategies::default();
        config.enabled.clear();
        assert!(RuleSet::from_config(&config).is_err());
    }

    #[test]
    fn short_window_yields_nothing() {
        let set = RuleSet::from_config(&Strategies::default()).unwrap();
        assert!(set.evaluate(&[]).is_none());
        assert!(set.evaluate(&crate::test_util::choppy(5, 1.0)).is_none());
    }
}
