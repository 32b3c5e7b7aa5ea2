use serde::{Deserialize, Serialize};

use crate::policy::StakingPolicy;
use crate::signals::{MatchSignals, TeamSignals};

/// Hard range for a side's remaining-match goal rate. The floor keeps every
/// downstream probability strictly positive; the ceiling keeps the rate
/// inside the range the bounded scoreline grid can represent faithfully.
pub const LAMBDA_FLOOR: f64 = 0.10;
pub const LAMBDA_CEILING: f64 = 3.5;

const SOT_BOOST_PER_SHOT: f64 = 0.015;
const SOT_BOOST_CAP: f64 = 0.12;
const CORNER_BOOST_PER: f64 = 0.005;
const CORNER_BOOST_CAP: f64 = 0.05;
const CARD_PENALTY_PER: f64 = 0.02;
const CARD_PENALTY_CAP: f64 = 0.10;
const INJURY_PENALTY_PER: f64 = 0.03;
const INJURY_PENALTY_CAP: f64 = 0.12;
const TABLE_GAP_PER_PLACE: f64 = 0.004;
const TABLE_GAP_CAP: f64 = 0.08;

/// Poisson rates for goals each side scores over the rest of the match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExpectedGoals {
    pub home: f64,
    pub away: f64,
}

/// Estimate remaining-match expected goals for both sides.
///
/// Inputs are assumed validated at the engine boundary; every step here is
/// individually clamped so one extreme signal cannot corrupt the rate.
pub fn estimate(signals: &MatchSignals, policy: &StakingPolicy) -> ExpectedGoals {
    ExpectedGoals {
        home: side_rate(&signals.home, &signals.away, signals.elapsed_minutes, policy),
        away: side_rate(&signals.away, &signals.home, signals.elapsed_minutes, policy),
    }
}

fn side_rate(own: &TeamSignals, opp: &TeamSignals, elapsed: f64, policy: &StakingPolicy) -> f64 {
    let remaining = (90.0 - elapsed).max(0.0);

    // Accrued xG plus the unplayed share of the pre-match full-match rate.
    let base = own.inplay_xg + own.prematch_xg * remaining / 90.0;

    // Strength ratio against the opponent's defensive record; the floor
    // keeps a near-zero conceded average from blowing the ratio up.
    let strength = own.avg_goals_scored / opp.avg_goals_conceded.max(policy.strength_floor);
    let mut rate = base * (1.0 - policy.strength_weight + policy.strength_weight * strength);

    rate *= time_decay(elapsed, policy.decay_floor);
    rate *= 1.0 + (own.possession_pct - 50.0) / policy.possession_weight;

    rate *= 1.0 + (own.shots_on_target as f64 * SOT_BOOST_PER_SHOT).min(SOT_BOOST_CAP);
    rate *= 1.0 + (own.corners as f64 * CORNER_BOOST_PER).min(CORNER_BOOST_CAP);
    rate *= 1.0 - (own.cards as f64 * CARD_PENALTY_PER).min(CARD_PENALTY_CAP);
    rate *= 1.0 - (own.injuries as f64 * INJURY_PENALTY_PER).min(INJURY_PENALTY_CAP);
    rate *= table_gap_factor(own.league_position, opp.league_position);

    rate.clamp(LAMBDA_FLOOR, LAMBDA_CEILING)
}

// Goals are less certain early on; the factor rises linearly from the floor
// at kickoff to 1.0 at the 90th minute and stays there through stoppage.
fn time_decay(elapsed: f64, floor: f64) -> f64 {
    let t = (elapsed.clamp(0.0, 90.0)) / 90.0;
    floor + (1.0 - floor) * t
}

fn table_gap_factor(own_pos: u32, opp_pos: u32) -> f64 {
    // Position 0 means the table position is unknown for that side.
    if own_pos == 0 || opp_pos == 0 {
        return 1.0;
    }
    let gap = opp_pos as f64 - own_pos as f64;
    1.0 + (gap * TABLE_GAP_PER_PLACE).clamp(-TABLE_GAP_CAP, TABLE_GAP_CAP)
}
