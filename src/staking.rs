use serde::{Deserialize, Serialize};

use crate::odds::{FairOdds, MarketEdges};
use crate::outcome::Outcome;
use crate::policy::StakingPolicy;
use crate::signals::MarketQuote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Back,
    Lay,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Back => "Back",
            Direction::Lay => "Lay",
        }
    }
}

/// The single bet (if any) this calculation recommends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BetRecommendation {
    pub outcome: Outcome,
    pub direction: Direction,
    pub fair_odds: f64,
    pub market_odds: f64,
    pub edge: f64,
    pub stake: f64,
    /// Amount at risk if a laid outcome occurs; absent for back bets.
    pub liability: Option<f64>,
}

/// Kelly shrink fraction for the band the quoted odds fall in; zero beyond
/// the last band.
pub fn band_fraction(policy: &StakingPolicy, market_odds: f64) -> f64 {
    if market_odds <= 1.0 {
        return 0.0;
    }
    for band in &policy.kelly_bands {
        if market_odds <= band.max_odds {
            return band.fraction;
        }
    }
    0.0
}

/// Risk-banded fractional-Kelly stake, floored at zero. The caller screens
/// `market_odds <= 1.0` at validation; the guard here keeps the division
/// safe for direct use.
pub fn stake(policy: &StakingPolicy, edge: f64, market_odds: f64, bankroll: f64) -> f64 {
    if market_odds <= 1.0 {
        return 0.0;
    }
    let fraction = band_fraction(policy, market_odds);
    (bankroll * fraction * edge / (market_odds - 1.0)).max(0.0)
}

/// Pick the single eligible outcome/direction with the largest edge above
/// the policy threshold. `None` is the expected result when the market
/// offers no value.
pub fn select(
    policy: &StakingPolicy,
    fair: &FairOdds,
    market: &MarketQuote,
    edges: &MarketEdges,
    bankroll: f64,
) -> Option<BetRecommendation> {
    let mut best: Option<BetRecommendation> = None;

    for outcome in Outcome::ALL {
        let market_odds = market.get(outcome);
        // Too extreme to stake safely regardless of edge.
        if market_odds <= 1.0 || market_odds > policy.odds_ceiling {
            continue;
        }
        let pair = edges.get(outcome);

        let mut consider = |direction: Direction, edge: f64| {
            if edge <= policy.edge_threshold {
                return;
            }
            if best.is_some_and(|b| b.edge >= edge) {
                return;
            }
            let stake = stake(policy, edge, market_odds, bankroll);
            if stake <= 0.0 {
                return;
            }
            let liability = match direction {
                Direction::Lay => Some(stake * (market_odds - 1.0)),
                Direction::Back => None,
            };
            best = Some(BetRecommendation {
                outcome,
                direction,
                fair_odds: fair.get(outcome),
                market_odds,
                edge,
                stake,
                liability,
            });
        };

        if policy.direction.allows_back() {
            consider(Direction::Back, pair.back);
        }
        if policy.direction.allows_lay() {
            consider(Direction::Lay, pair.lay);
        }
    }

    best
}
