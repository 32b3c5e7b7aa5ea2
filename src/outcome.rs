use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::goal_model::ExpectedGoals;
use crate::policy::StakingPolicy;
use crate::scoreline::ScorelineGrid;

// The dampened draw bucket may never collapse to zero.
const DRAW_DAMP_MIN: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Home => "Home",
            Outcome::Draw => "Draw",
            Outcome::Away => "Away",
        }
    }
}

/// Normalized match-outcome probabilities; components sum to 1 and each is
/// strictly positive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OutcomeProbs {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl OutcomeProbs {
    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }
}

pub fn classify(home_goals: u32, away_goals: u32) -> Outcome {
    if home_goals > away_goals {
        Outcome::Home
    } else if home_goals < away_goals {
        Outcome::Away
    } else {
        Outcome::Draw
    }
}

/// Reduce the scoreline grid to the three outcome probabilities.
///
/// Normalizing by the bucket sum corrects both the truncation loss at the
/// horizon and the zero-inflated construction not integrating to 1.
pub fn aggregate(
    grid: &ScorelineGrid,
    score_home: u32,
    score_away: u32,
    expected: ExpectedGoals,
    policy: &StakingPolicy,
) -> Result<OutcomeProbs, EngineError> {
    let mut home = 0.0;
    let mut draw = 0.0;
    let mut away = 0.0;

    for (kh, ka, p) in grid.iter() {
        match classify(score_home + kh as u32, score_away + ka as u32) {
            Outcome::Home => home += p,
            Outcome::Draw => draw += p,
            Outcome::Away => away += p,
        }
    }

    if policy.draw_dampening {
        draw *= draw_damp_factor(expected, policy);
    }

    let sum = home + draw + away;
    if !(sum > 0.0) || !sum.is_finite() {
        return Err(EngineError::Internal(
            "outcome bucket sum is not strictly positive",
        ));
    }

    Ok(OutcomeProbs {
        home: home / sum,
        draw: draw / sum,
        away: away / sum,
    })
}

// Sides far apart in expected goals draw less often than independent
// Poisson margins imply; shave the draw bucket before normalizing.
fn draw_damp_factor(expected: ExpectedGoals, policy: &StakingPolicy) -> f64 {
    let gap = (expected.home - expected.away).abs();
    (1.0 - policy.draw_damp_scale * gap.powf(policy.draw_damp_power)).clamp(DRAW_DAMP_MIN, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoreline;
    use crate::signals::{MatchSignals, TeamSignals};

    fn neutral_signals() -> MatchSignals {
        MatchSignals {
            home: TeamSignals::default(),
            away: TeamSignals::default(),
            elapsed_minutes: 0.0,
            score_home: 0,
            score_away: 0,
            bankroll: 0.0,
        }
    }

    fn probs_for(lambda_home: f64, lambda_away: f64, score: (u32, u32)) -> OutcomeProbs {
        let policy = StakingPolicy::default();
        let expected = ExpectedGoals {
            home: lambda_home,
            away: lambda_away,
        };
        let grid = scoreline::build(expected, &neutral_signals(), &policy);
        aggregate(&grid, score.0, score.1, expected, &policy).unwrap()
    }

    #[test]
    fn probabilities_normalize_to_one() {
        for (lh, la) in [(0.3, 0.3), (1.2, 0.8), (2.5, 2.5), (3.5, 0.1)] {
            let p = probs_for(lh, la, (0, 0));
            let sum = p.home + p.draw + p.away;
            assert!((sum - 1.0).abs() < 1e-9, "sum {sum} for ({lh}, {la})");
            assert!(p.home > 0.0 && p.draw > 0.0 && p.away > 0.0);
        }
    }

    #[test]
    fn current_score_shifts_the_classification() {
        let level = probs_for(1.0, 1.0, (0, 0));
        let leading = probs_for(1.0, 1.0, (2, 0));
        assert!(leading.home > level.home);
        assert!(leading.away < level.away);
    }

    #[test]
    fn stronger_home_side_is_favored() {
        let p = probs_for(1.2, 0.8, (0, 0));
        assert!(p.home > p.away);
    }

    #[test]
    fn home_probability_is_monotone_in_home_lambda() {
        let mut prev = 0.0;
        for step in 1..=30 {
            let lambda_home = step as f64 * 0.1;
            let p = probs_for(lambda_home, 1.0, (0, 0));
            assert!(
                p.home >= prev - 1e-12,
                "home prob regressed at lambda {lambda_home}"
            );
            prev = p.home;
        }
    }

    #[test]
    fn draw_dampening_moves_mass_away_from_the_draw() {
        let expected = ExpectedGoals {
            home: 2.4,
            away: 0.6,
        };
        let base_policy = StakingPolicy::default();
        let damped_policy = StakingPolicy {
            draw_dampening: true,
            draw_damp_scale: 0.15,
            ..StakingPolicy::default()
        };
        let grid = scoreline::build(expected, &neutral_signals(), &base_policy);
        let plain = aggregate(&grid, 0, 0, expected, &base_policy).unwrap();
        let damped = aggregate(&grid, 0, 0, expected, &damped_policy).unwrap();
        assert!(damped.draw < plain.draw);
        assert!(damped.draw > 0.0);
        let sum = damped.home + damped.draw + damped.away;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn damp_factor_is_floored() {
        let policy = StakingPolicy {
            draw_dampening: true,
            draw_damp_scale: 0.3,
            draw_damp_power: 2.0,
            ..StakingPolicy::default()
        };
        let f = draw_damp_factor(
            ExpectedGoals {
                home: 3.5,
                away: 0.1,
            },
            &policy,
        );
        assert!((f - DRAW_DAMP_MIN).abs() < 1e-12);
    }

    #[test]
    fn degenerate_grid_is_an_internal_error() {
        let grid = ScorelineGrid {
            horizon: 2,
            cells: vec![0.0; 9],
        };
        let result = aggregate(
            &grid,
            0,
            0,
            ExpectedGoals {
                home: 1.0,
                away: 1.0,
            },
            &StakingPolicy::default(),
        );
        assert!(matches!(result, Err(EngineError::Internal(_))));
    }

    #[test]
    fn classify_matches_goal_difference() {
        assert_eq!(classify(2, 1), Outcome::Home);
        assert_eq!(classify(1, 1), Outcome::Draw);
        assert_eq!(classify(0, 3), Outcome::Away);
    }
}
