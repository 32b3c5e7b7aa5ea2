use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::goal_model::{self, ExpectedGoals};
use crate::odds::{self, FairOdds, MarketEdges};
use crate::outcome::{self, OutcomeProbs};
use crate::policy::StakingPolicy;
use crate::scoreline;
use crate::signals::{MarketQuote, MatchSignals};
use crate::staking::{self, BetRecommendation};

/// Everything one calculation produced. Intermediates are kept so the
/// caller can render the same diagnostic dump the model has always printed;
/// nothing here is read back by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResult {
    pub expected: ExpectedGoals,
    pub probs: OutcomeProbs,
    pub fair: FairOdds,
    pub edges: MarketEdges,
    pub recommendation: Option<BetRecommendation>,
}

/// Run the full pricing pipeline for one immutable input bundle.
///
/// Validation happens once here at the boundary; the stages themselves only
/// apply local numerical guards. The computation is pure and bounded: one
/// fixed (horizon+1)^2 grid pass, no I/O, no shared state.
pub fn compute_recommendation(
    signals: &MatchSignals,
    market: &MarketQuote,
    policy: &StakingPolicy,
) -> Result<CalculationResult, EngineError> {
    signals.validate()?;
    market.validate()?;
    let policy = policy.clone().sanitized();

    let expected = goal_model::estimate(signals, &policy);
    let grid = scoreline::build(expected, signals, &policy);
    let probs = outcome::aggregate(
        &grid,
        signals.score_home,
        signals.score_away,
        expected,
        &policy,
    )?;
    let fair = odds::fair_odds(&probs);
    let edges = odds::edges(&fair, market);
    let recommendation = staking::select(&policy, &fair, market, &edges, signals.bankroll);

    Ok(CalculationResult {
        expected,
        probs,
        fair,
        edges,
        recommendation,
    })
}
