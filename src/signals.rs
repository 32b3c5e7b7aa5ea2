use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::outcome::Outcome;

/// Per-side inputs for one calculation. Pre-match averages come from recent
/// form tables; the in-play block is whatever the live stats page shows at
/// the moment of the calculation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TeamSignals {
    pub avg_goals_scored: f64,
    pub avg_goals_conceded: f64,
    /// Full-match expected goals implied by pre-match form.
    pub prematch_xg: f64,
    /// xG accrued so far in this match.
    #[serde(default)]
    pub inplay_xg: f64,
    /// 0..=100; the two sides need not sum to 100 (providers round).
    #[serde(default = "default_possession")]
    pub possession_pct: f64,
    #[serde(default)]
    pub shots_on_target: u32,
    #[serde(default)]
    pub corners: u32,
    #[serde(default)]
    pub cards: u32,
    #[serde(default)]
    pub injuries: u32,
    /// League table position, 1 = top. 0 means unknown and is ignored.
    #[serde(default)]
    pub league_position: u32,
}

fn default_possession() -> f64 {
    50.0
}

/// One immutable input bundle per calculation. Constructed fresh by the
/// caller; nothing here survives the call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchSignals {
    pub home: TeamSignals,
    pub away: TeamSignals,
    /// 0..=120 to admit stoppage and extra time; remaining time clamps at 90.
    pub elapsed_minutes: f64,
    pub score_home: u32,
    pub score_away: u32,
    /// Account balance the stake is sized against.
    pub bankroll: f64,
}

/// Live decimal odds quoted by the market for the three outcomes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MarketQuote {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl TeamSignals {
    fn validate(&self, side: Side) -> Result<(), EngineError> {
        check_finite_non_negative(self.avg_goals_scored, side.field("avg_goals_scored"))?;
        check_finite_non_negative(self.avg_goals_conceded, side.field("avg_goals_conceded"))?;
        check_finite_non_negative(self.prematch_xg, side.field("prematch_xg"))?;
        check_finite_non_negative(self.inplay_xg, side.field("inplay_xg"))?;

        let field = side.field("possession_pct");
        if !self.possession_pct.is_finite() || !(0.0..=100.0).contains(&self.possession_pct) {
            return Err(EngineError::invalid(
                field,
                format!("must be within 0..=100, got {}", self.possession_pct),
            ));
        }
        Ok(())
    }
}

impl MatchSignals {
    pub fn validate(&self) -> Result<(), EngineError> {
        self.home.validate(Side::Home)?;
        self.away.validate(Side::Away)?;

        if !self.elapsed_minutes.is_finite() || !(0.0..=120.0).contains(&self.elapsed_minutes) {
            return Err(EngineError::invalid(
                "elapsed_minutes",
                format!("must be within 0..=120, got {}", self.elapsed_minutes),
            ));
        }
        check_finite_non_negative(self.bankroll, "bankroll")?;
        Ok(())
    }
}

impl MarketQuote {
    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    /// Decimal odds at or below 1.0 imply a guaranteed-loss quote; reject
    /// before anything divides by `odds - 1`.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (odds, field) in [
            (self.home, "market.home"),
            (self.draw, "market.draw"),
            (self.away, "market.away"),
        ] {
            if !odds.is_finite() || odds <= 1.0 {
                return Err(EngineError::invalid(
                    field,
                    format!("decimal odds must be > 1.0, got {odds}"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Side {
    Home,
    Away,
}

impl Side {
    fn field(self, name: &str) -> &'static str {
        // Static field paths keep EngineError allocation-free on the happy
        // path and give the caller a stable identifier to match on.
        match (self, name) {
            (Side::Home, "avg_goals_scored") => "home.avg_goals_scored",
            (Side::Home, "avg_goals_conceded") => "home.avg_goals_conceded",
            (Side::Home, "prematch_xg") => "home.prematch_xg",
            (Side::Home, "inplay_xg") => "home.inplay_xg",
            (Side::Home, "possession_pct") => "home.possession_pct",
            (Side::Away, "avg_goals_scored") => "away.avg_goals_scored",
            (Side::Away, "avg_goals_conceded") => "away.avg_goals_conceded",
            (Side::Away, "prematch_xg") => "away.prematch_xg",
            (Side::Away, "inplay_xg") => "away.inplay_xg",
            (Side::Away, "possession_pct") => "away.possession_pct",
            _ => "signals",
        }
    }
}

fn check_finite_non_negative(value: f64, field: &'static str) -> Result<(), EngineError> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::invalid(
            field,
            format!("must be a finite non-negative number, got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral_signals() -> MatchSignals {
        MatchSignals {
            home: TeamSignals {
                avg_goals_scored: 1.4,
                avg_goals_conceded: 1.1,
                prematch_xg: 1.4,
                ..TeamSignals::default()
            },
            away: TeamSignals {
                avg_goals_scored: 1.0,
                avg_goals_conceded: 1.3,
                prematch_xg: 1.0,
                ..TeamSignals::default()
            },
            elapsed_minutes: 30.0,
            score_home: 0,
            score_away: 0,
            bankroll: 1000.0,
        }
    }

    #[test]
    fn valid_bundle_passes() {
        assert!(neutral_signals().validate().is_ok());
    }

    #[test]
    fn possession_out_of_range_names_the_side() {
        let mut s = neutral_signals();
        s.away.possession_pct = 120.0;
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("away.possession_pct"));
    }

    #[test]
    fn nan_xg_is_rejected() {
        let mut s = neutral_signals();
        s.home.inplay_xg = f64::NAN;
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("home.inplay_xg"));
    }

    #[test]
    fn elapsed_minutes_beyond_extra_time_is_rejected() {
        let mut s = neutral_signals();
        s.elapsed_minutes = 130.0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn market_odds_at_or_below_one_are_rejected() {
        let quote = MarketQuote {
            home: 2.1,
            draw: 1.0,
            away: 3.4,
        };
        let err = quote.validate().unwrap_err();
        assert!(err.to_string().contains("market.draw"));
    }

    #[test]
    fn default_possession_is_even_split() {
        let raw = r#"{"avg_goals_scored":1.0,"avg_goals_conceded":1.0,"prematch_xg":1.2}"#;
        let side: TeamSignals = serde_json::from_str(raw).unwrap();
        assert_eq!(side.possession_pct, 50.0);
        assert_eq!(side.shots_on_target, 0);
    }
}
