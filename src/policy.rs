use std::env;

use serde::{Deserialize, Serialize};

/// Which side of the book the deployment is allowed to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetDirection {
    Back,
    Lay,
    Both,
}

impl BetDirection {
    pub fn allows_back(self) -> bool {
        matches!(self, BetDirection::Back | BetDirection::Both)
    }

    pub fn allows_lay(self) -> bool {
        matches!(self, BetDirection::Lay | BetDirection::Both)
    }
}

/// One tier of the Kelly shrink schedule: bets quoted at or below `max_odds`
/// use `fraction` of full Kelly. Market odds beyond the last band get no
/// stake at all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KellyBand {
    pub max_odds: f64,
    pub fraction: f64,
}

/// Every tunable in the pipeline, injected as one record so behavior
/// variants are configuration rather than code forks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingPolicy {
    /// Weight of the strength ratio when blended into the base goal rate.
    pub strength_weight: f64,
    /// Floor for the opponent conceded-goals average in the strength ratio.
    pub strength_floor: f64,
    /// Lower bound of the time-decay factor applied to early-match rates.
    pub decay_floor: f64,
    /// Denominator K in the `1 + (possession - 50) / K` adjustment.
    pub possession_weight: f64,
    /// Extra probability mass assigned to a scoreless continuation.
    pub zero_inflation_base: f64,
    /// When set, accrued xG and shots on target lower the zero inflation.
    pub adaptive_zero_inflation: bool,
    /// Remaining-goals range considered per side (grid is (h+1) x (h+1)).
    pub horizon: u8,
    pub draw_dampening: bool,
    pub draw_damp_scale: f64,
    pub draw_damp_power: f64,
    pub direction: BetDirection,
    /// Minimum edge an outcome must clear before it can be recommended.
    pub edge_threshold: f64,
    /// Market odds above this are never staked, whatever the edge.
    pub odds_ceiling: f64,
    pub kelly_bands: Vec<KellyBand>,
}

impl Default for StakingPolicy {
    fn default() -> Self {
        Self {
            strength_weight: 0.30,
            strength_floor: 0.60,
            decay_floor: 0.35,
            possession_weight: 200.0,
            zero_inflation_base: 0.10,
            adaptive_zero_inflation: false,
            horizon: 5,
            draw_dampening: false,
            draw_damp_scale: 0.06,
            draw_damp_power: 1.0,
            direction: BetDirection::Both,
            edge_threshold: 0.05,
            odds_ceiling: 10.0,
            kelly_bands: vec![
                KellyBand {
                    max_odds: 2.5,
                    fraction: 1.0 / 8.0,
                },
                KellyBand {
                    max_odds: 6.0,
                    fraction: 1.0 / 16.0,
                },
                KellyBand {
                    max_odds: 10.0,
                    fraction: 1.0 / 32.0,
                },
            ],
        }
    }
}

impl StakingPolicy {
    /// Clamp every tunable into its documented range. Out-of-range values
    /// from a config file or env var are pulled back rather than rejected,
    /// matching how cached league params are shrunk toward defaults.
    pub fn sanitized(mut self) -> Self {
        self.strength_weight = self.strength_weight.clamp(0.0, 0.5);
        self.strength_floor = self.strength_floor.clamp(0.5, 0.75);
        self.decay_floor = self.decay_floor.clamp(0.30, 1.0);
        self.possession_weight = self.possession_weight.clamp(100.0, 300.0);
        self.zero_inflation_base = self.zero_inflation_base.clamp(0.0, 0.3);
        self.horizon = self.horizon.clamp(3, 8);
        self.draw_damp_scale = self.draw_damp_scale.clamp(0.0, 0.3);
        self.draw_damp_power = self.draw_damp_power.clamp(0.5, 2.0);
        self.edge_threshold = self.edge_threshold.clamp(0.0, 0.5);
        self.odds_ceiling = self.odds_ceiling.clamp(6.0, 20.0);

        if self.kelly_bands.is_empty() {
            self.kelly_bands = Self::default().kelly_bands;
        }
        for band in &mut self.kelly_bands {
            band.max_odds = band.max_odds.clamp(1.01, 20.0);
            // Observed shrink factors run 1/32 up to 1/4.
            band.fraction = band.fraction.clamp(0.0, 0.25);
        }
        self.kelly_bands
            .sort_by(|a, b| a.max_odds.total_cmp(&b.max_odds));
        self
    }

    /// Defaults overridden by `FAIRLINE_*` environment variables, each
    /// parsed leniently and clamped by `sanitized`.
    pub fn from_env() -> Self {
        let mut policy = Self::default();
        if let Some(v) = env_f64("FAIRLINE_ZERO_INFLATION") {
            policy.zero_inflation_base = v;
        }
        if let Some(v) = env_f64("FAIRLINE_DECAY_FLOOR") {
            policy.decay_floor = v;
        }
        if let Some(v) = env_f64("FAIRLINE_POSSESSION_WEIGHT") {
            policy.possession_weight = v;
        }
        if let Some(v) = env_f64("FAIRLINE_EDGE_THRESHOLD") {
            policy.edge_threshold = v;
        }
        if let Some(v) = env_f64("FAIRLINE_ODDS_CEILING") {
            policy.odds_ceiling = v;
        }
        if let Some(v) = env::var("FAIRLINE_HORIZON")
            .ok()
            .and_then(|v| v.trim().parse::<u8>().ok())
        {
            policy.horizon = v;
        }
        policy.draw_dampening = env_bool("FAIRLINE_DRAW_DAMPENING", policy.draw_dampening);
        policy.adaptive_zero_inflation = env_bool(
            "FAIRLINE_ADAPTIVE_ZERO_INFLATION",
            policy.adaptive_zero_inflation,
        );
        if let Ok(raw) = env::var("FAIRLINE_DIRECTION") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "back" => policy.direction = BetDirection::Back,
                "lay" => policy.direction = BetDirection::Lay,
                "both" => policy.direction = BetDirection::Both,
                _ => {}
            }
        }
        policy.sanitized()
    }
}

fn env_f64(key: &str) -> Option<f64> {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_already_sane() {
        let policy = StakingPolicy::default();
        let sanitized = policy.clone().sanitized();
        assert_eq!(policy.horizon, sanitized.horizon);
        assert_eq!(policy.kelly_bands.len(), sanitized.kelly_bands.len());
        assert!((policy.zero_inflation_base - sanitized.zero_inflation_base).abs() < 1e-12);
    }

    #[test]
    fn sanitize_clamps_out_of_range_values() {
        let policy = StakingPolicy {
            zero_inflation_base: 0.9,
            decay_floor: 0.0,
            possession_weight: 10.0,
            horizon: 40,
            odds_ceiling: 500.0,
            ..StakingPolicy::default()
        }
        .sanitized();
        assert!((policy.zero_inflation_base - 0.3).abs() < 1e-12);
        assert!((policy.decay_floor - 0.30).abs() < 1e-12);
        assert!((policy.possession_weight - 100.0).abs() < 1e-12);
        assert_eq!(policy.horizon, 8);
        assert!((policy.odds_ceiling - 20.0).abs() < 1e-12);
    }

    #[test]
    fn sanitize_restores_empty_band_schedule() {
        let policy = StakingPolicy {
            kelly_bands: Vec::new(),
            ..StakingPolicy::default()
        }
        .sanitized();
        assert!(!policy.kelly_bands.is_empty());
    }

    #[test]
    fn sanitize_sorts_bands_by_odds() {
        let policy = StakingPolicy {
            kelly_bands: vec![
                KellyBand {
                    max_odds: 6.0,
                    fraction: 0.0625,
                },
                KellyBand {
                    max_odds: 2.5,
                    fraction: 0.125,
                },
            ],
            ..StakingPolicy::default()
        }
        .sanitized();
        assert!(policy.kelly_bands[0].max_odds < policy.kelly_bands[1].max_odds);
    }

    #[test]
    fn policy_round_trips_through_json() {
        let policy = StakingPolicy::default();
        let raw = serde_json::to_string(&policy).unwrap();
        let back: StakingPolicy = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.horizon, policy.horizon);
        assert_eq!(back.direction, policy.direction);
        assert_eq!(back.kelly_bands.len(), policy.kelly_bands.len());
    }

    #[test]
    fn direction_flags() {
        assert!(BetDirection::Both.allows_back());
        assert!(BetDirection::Both.allows_lay());
        assert!(!BetDirection::Back.allows_lay());
        assert!(!BetDirection::Lay.allows_back());
    }
}
