use crate::goal_model::ExpectedGoals;
use crate::policy::StakingPolicy;
use crate::signals::MatchSignals;

// Slopes for the optional adaptive zero inflation: sustained attacking
// output makes a scoreless continuation less likely.
const ZI_XG_SLOPE: f64 = 0.03;
const ZI_SOT_SLOPE: f64 = 0.005;
const ZI_MAX: f64 = 0.3;

/// Joint probability mass over remaining-goals pairs, truncated at the
/// policy horizon. Cells are products of two independent zero-inflated
/// Poisson masses and are all strictly positive; the grid deliberately does
/// not sum to 1 (truncation loss is absorbed by outcome normalization).
#[derive(Debug, Clone)]
pub struct ScorelineGrid {
    pub(crate) horizon: usize,
    // Row-major: cells[h * (horizon + 1) + a].
    pub(crate) cells: Vec<f64>,
}

impl ScorelineGrid {
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn prob(&self, home_remaining: usize, away_remaining: usize) -> f64 {
        self.cells[home_remaining * (self.horizon + 1) + away_remaining]
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let side = self.horizon + 1;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, p)| (idx / side, idx % side, *p))
    }
}

/// Build the scoreline grid for the remainder of the match.
pub fn build(
    expected: ExpectedGoals,
    signals: &MatchSignals,
    policy: &StakingPolicy,
) -> ScorelineGrid {
    let horizon = policy.horizon as usize;

    let p0_home = zero_inflation(
        policy,
        signals.home.inplay_xg,
        signals.home.shots_on_target,
    );
    let p0_away = zero_inflation(
        policy,
        signals.away.inplay_xg,
        signals.away.shots_on_target,
    );

    let pmf_home = zero_inflated_pmf(expected.home, p0_home, horizon);
    let pmf_away = zero_inflated_pmf(expected.away, p0_away, horizon);

    let side = horizon + 1;
    let mut cells = vec![0.0; side * side];
    for (h, ph) in pmf_home.iter().enumerate() {
        for (a, pa) in pmf_away.iter().enumerate() {
            cells[h * side + a] = ph * pa;
        }
    }

    ScorelineGrid { horizon, cells }
}

fn zero_inflation(policy: &StakingPolicy, inplay_xg: f64, shots_on_target: u32) -> f64 {
    if !policy.adaptive_zero_inflation {
        return policy.zero_inflation_base.clamp(0.0, ZI_MAX);
    }
    let reduced = policy.zero_inflation_base
        - ZI_XG_SLOPE * inplay_xg
        - ZI_SOT_SLOPE * shots_on_target as f64;
    reduced.clamp(0.0, ZI_MAX)
}

/// Zero-inflated Poisson pmf over 0..=max_k.
///
/// The recurrence `pure[k] = pure[k-1] * lambda / k` avoids factorials and
/// powers entirely, so the bounded k range cannot overflow. Unlike a plain
/// truncated pmf the tail mass past max_k is NOT folded into the last
/// bucket; the aggregation step renormalizes the outcome buckets instead.
fn zero_inflated_pmf(lambda: f64, p_zero: f64, max_k: usize) -> Vec<f64> {
    let lambda = lambda.max(0.0);
    let mut pure = vec![0.0; max_k + 1];
    pure[0] = (-lambda).exp();
    for k in 1..=max_k {
        pure[k] = pure[k - 1] * lambda / k as f64;
    }

    let mut pmf = pure;
    for p in pmf.iter_mut() {
        *p *= 1.0 - p_zero;
    }
    pmf[0] += p_zero;
    pmf
}
