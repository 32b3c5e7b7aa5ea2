use serde::{Deserialize, Serialize};

use crate::outcome::{Outcome, OutcomeProbs};
use crate::signals::MarketQuote;

/// Decimal odds implied directly by the model probabilities, no margin.
/// Always finite because every outcome probability is strictly positive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FairOdds {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl FairOdds {
    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }
}

/// Proportional price discrepancy for both book sides of one outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EdgePair {
    /// Positive when the market overprices the outcome (back it).
    pub back: f64,
    /// Positive when the market underprices the outcome (lay it).
    pub lay: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MarketEdges {
    pub home: EdgePair,
    pub draw: EdgePair,
    pub away: EdgePair,
}

impl MarketEdges {
    pub fn get(&self, outcome: Outcome) -> EdgePair {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }
}

pub fn fair_odds(probs: &OutcomeProbs) -> FairOdds {
    FairOdds {
        home: 1.0 / probs.home,
        draw: 1.0 / probs.draw,
        away: 1.0 / probs.away,
    }
}

pub fn edges(fair: &FairOdds, market: &MarketQuote) -> MarketEdges {
    MarketEdges {
        home: edge_pair(fair.home, market.home),
        draw: edge_pair(fair.draw, market.draw),
        away: edge_pair(fair.away, market.away),
    }
}

fn edge_pair(fair: f64, market: f64) -> EdgePair {
    EdgePair {
        back: (market - fair) / fair,
        lay: (fair - market) / fair,
    }
}
