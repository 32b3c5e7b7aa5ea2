use rand::Rng;

use crate::goal_model;
use crate::odds;
use crate::outcome::{self, OutcomeProbs};
use crate::policy::StakingPolicy;
use crate::scoreline;
use crate::signals::{MarketQuote, MatchSignals, TeamSignals};

// How far a synthetic quote may drift from the model's fair price. Wide
// enough that demo runs show both value and no-bet outcomes.
const QUOTE_DRIFT_LO: f64 = 0.85;
const QUOTE_DRIFT_HI: f64 = 1.20;
const QUOTE_FLOOR: f64 = 1.05;

/// One synthetic in-play situation with a market quoted around fair value.
pub fn random_scenario<R: Rng>(rng: &mut R, policy: &StakingPolicy) -> (MatchSignals, MarketQuote) {
    let signals = random_signals(rng);

    let expected = goal_model::estimate(&signals, policy);
    let grid = scoreline::build(expected, &signals, policy);
    let probs = outcome::aggregate(
        &grid,
        signals.score_home,
        signals.score_away,
        expected,
        policy,
    )
    .unwrap_or(OutcomeProbs {
        home: 1.0 / 3.0,
        draw: 1.0 / 3.0,
        away: 1.0 / 3.0,
    });
    let fair = odds::fair_odds(&probs);

    let market = MarketQuote {
        home: jitter_quote(rng, fair.home),
        draw: jitter_quote(rng, fair.draw),
        away: jitter_quote(rng, fair.away),
    };
    (signals, market)
}

pub fn random_signals<R: Rng>(rng: &mut R) -> MatchSignals {
    let elapsed = rng.gen_range(5.0..88.0_f64).round();
    let progress = elapsed / 90.0;

    let home_possession = rng.gen_range(32.0..68.0_f64).round();
    // Providers round, so the two shares rarely sum to exactly 100.
    let away_possession = (100.0 - home_possession + rng.gen_range(-1.0..=1.0)).clamp(0.0, 100.0);

    let home = random_side(rng, progress, home_possession, true);
    let away = random_side(rng, progress, away_possession, false);

    MatchSignals {
        home,
        away,
        elapsed_minutes: elapsed,
        score_home: random_score(rng, progress),
        score_away: random_score(rng, progress),
        bankroll: rng.gen_range(250.0..5000.0_f64).round(),
    }
}

fn random_side<R: Rng>(rng: &mut R, progress: f64, possession: f64, is_home: bool) -> TeamSignals {
    let quality = if is_home {
        rng.gen_range(0.9..1.9)
    } else {
        rng.gen_range(0.7..1.7)
    };
    let full_match_xg = quality * rng.gen_range(0.8..1.2);

    TeamSignals {
        avg_goals_scored: quality,
        avg_goals_conceded: rng.gen_range(0.6..1.8),
        prematch_xg: full_match_xg,
        inplay_xg: full_match_xg * progress * rng.gen_range(0.4..1.6),
        possession_pct: possession,
        shots_on_target: rng.gen_range(0..=(1 + (progress * 8.0) as u32)),
        corners: rng.gen_range(0..=(1 + (progress * 9.0) as u32)),
        cards: rng.gen_range(0..=3),
        injuries: rng.gen_range(0..=2),
        league_position: rng.gen_range(1..=20),
    }
}

fn random_score<R: Rng>(rng: &mut R, progress: f64) -> u32 {
    let cap = 1 + (progress * 2.5) as u32;
    rng.gen_range(0..=cap)
}

fn jitter_quote<R: Rng>(rng: &mut R, fair: f64) -> f64 {
    (fair * rng.gen_range(QUOTE_DRIFT_LO..QUOTE_DRIFT_HI)).max(QUOTE_FLOOR)
}
