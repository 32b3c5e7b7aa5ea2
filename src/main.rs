use std::env;
use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;

use fairline::outcome::Outcome;
use fairline::staking::Direction;
use fairline::{
    CalculationResult, MarketQuote, MatchSignals, StakingPolicy, compute_recommendation, fake_feed,
    staking,
};

/// Input bundle the caller hands the engine: one situation, one quote.
#[derive(Debug, Deserialize)]
struct InputBundle {
    signals: MatchSignals,
    market: MarketQuote,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let policy = StakingPolicy::from_env();
    let as_json = args.iter().any(|a| a == "--json");

    if args.iter().any(|a| a == "--demo") {
        let count = args
            .iter()
            .skip_while(|a| *a != "--demo")
            .nth(1)
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(5)
            .clamp(1, 100);
        return run_demo(count, &policy);
    }

    match args.iter().find(|a| !a.starts_with("--")).map(String::as_str) {
        Some(path) => price_file(path, &policy, as_json),
        None => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("fairline - in-play fair odds and stake sizing");
    println!();
    println!("USAGE:");
    println!("  fairline <bundle.json> [--json]   price one situation from a JSON bundle");
    println!("  fairline --demo [N]               price N synthetic situations");
    println!();
    println!("The bundle holds {{\"signals\": {{..}}, \"market\": {{..}}}}; policy tunables");
    println!("come from FAIRLINE_* environment variables (a .env file is honored).");
}

fn price_file(path: &str, policy: &StakingPolicy, as_json: bool) -> Result<()> {
    let raw = fs::read_to_string(path).with_context(|| format!("read input bundle {path}"))?;
    let bundle: InputBundle =
        serde_json::from_str(&raw).with_context(|| format!("parse input bundle {path}"))?;

    let result = compute_recommendation(&bundle.signals, &bundle.market, policy)?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&bundle.signals, &bundle.market, policy, &result);
    }
    Ok(())
}

fn run_demo(count: usize, policy: &StakingPolicy) -> Result<()> {
    let mut rng = rand::thread_rng();
    for idx in 1..=count {
        let (signals, market) = fake_feed::random_scenario(&mut rng, policy);
        println!("=== Demo situation {idx}/{count} ===");
        let result = compute_recommendation(&signals, &market, policy)?;
        print_report(&signals, &market, policy, &result);
        println!();
    }
    Ok(())
}

// Diagnostic dump of every intermediate, rendered from the returned record
// only; the engine never reads any of this back.
fn print_report(
    signals: &MatchSignals,
    market: &MarketQuote,
    policy: &StakingPolicy,
    result: &CalculationResult,
) {
    println!(
        "[{}] minute {:.0}, score {}-{}, bankroll {:.2}",
        Utc::now().format("%Y-%m-%d %H:%M:%S"),
        signals.elapsed_minutes,
        signals.score_home,
        signals.score_away,
        signals.bankroll
    );
    println!(
        "Remaining xG     : home {:.3}  away {:.3}",
        result.expected.home, result.expected.away
    );
    println!(
        "Probabilities    : home {:.4}  draw {:.4}  away {:.4}",
        result.probs.home, result.probs.draw, result.probs.away
    );
    println!(
        "Fair odds        : home {:.2}  draw {:.2}  away {:.2}",
        result.fair.home, result.fair.draw, result.fair.away
    );
    println!(
        "Market odds      : home {:.2}  draw {:.2}  away {:.2}",
        market.home, market.draw, market.away
    );

    for outcome in Outcome::ALL {
        let pair = result.edges.get(outcome);
        let quoted = market.get(outcome);
        println!(
            "{:<5} edges      : back {:+.4} (stake {:.2})  lay {:+.4} (stake {:.2})",
            outcome.label(),
            pair.back,
            staking::stake(policy, pair.back, quoted, signals.bankroll),
            pair.lay,
            staking::stake(policy, pair.lay, quoted, signals.bankroll),
        );
    }

    match &result.recommendation {
        Some(rec) => {
            println!(
                "Recommended {} bet on {}: market {:.2} vs fair {:.2}, edge {:+.4}",
                rec.direction.label(),
                rec.outcome.label(),
                rec.market_odds,
                rec.fair_odds,
                rec.edge
            );
            match (rec.direction, rec.liability) {
                (Direction::Lay, Some(liability)) => {
                    println!("Stake {:.2}, liability {:.2}", rec.stake, liability)
                }
                _ => println!("Stake {:.2}", rec.stake),
            }
        }
        None => println!("No recommended bet."),
    }
}
