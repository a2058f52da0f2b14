// Prop bets: per-team totals and a blowout yes/no.

use serde::Serialize;

use crate::odds::juice::{generate_total_juice, TotalJuice};
use crate::odds::moneyline::{FAVORITE_FLOOR, UNDERDOG_CEILING};
use crate::odds::normal::normal_cdf;
use crate::stats::round_to_half;

/// Final margin (either side) that counts as a blowout.
pub const BLOWOUT_MARGIN: f64 = 20.0;

const MIN_PROP_PROBABILITY: f64 = 0.01;
const MAX_PROP_PROBABILITY: f64 = 0.99;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TeamTotalProp {
    pub line: f64,
    pub over: i32,
    pub under: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlowoutProp {
    pub threshold: f64,
    /// Model probability of the blowout, before vig.
    pub probability: f64,
    pub yes: i32,
    pub no: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PropBets {
    pub team1_total: TeamTotalProp,
    pub team2_total: TeamTotalProp,
    pub blowout: BlowoutProp,
}

/// Inputs for [`generate_prop_bets`], all already computed by the market.
#[derive(Debug, Clone, Copy)]
pub struct PropContext<'a> {
    pub team1_average: f64,
    pub team2_average: f64,
    /// Game total line.
    pub total: f64,
    /// Team1 spread line (negative = team1 favored).
    pub spread: f64,
    /// Standard deviation of the final margin.
    pub margin_sigma: f64,
    pub vig: f64,
    pub seed_key: &'a str,
}

/// American price for a probability with half the vig loaded on.
pub fn probability_to_american(probability: f64, vig: f64) -> i32 {
    let p = if probability.is_finite() {
        probability
    } else {
        0.5
    };
    let loaded = (p * (1.0 + vig.max(0.0) / 2.0)).clamp(MIN_PROP_PROBABILITY, MAX_PROP_PROBABILITY);
    let price = if loaded >= 0.5 {
        (-(loaded / (1.0 - loaded)) * 100.0).clamp(FAVORITE_FLOOR, -100.0)
    } else {
        (((1.0 - loaded) / loaded) * 100.0).clamp(100.0, UNDERDOG_CEILING)
    };
    price.round() as i32
}

/// Probability that either team wins by more than [`BLOWOUT_MARGIN`].
pub fn blowout_probability(expected_margin: f64, margin_sigma: f64) -> f64 {
    if !expected_margin.is_finite() || !margin_sigma.is_finite() || margin_sigma <= 0.0 {
        return 0.0;
    }
    let upper = 1.0 - normal_cdf((BLOWOUT_MARGIN - expected_margin) / margin_sigma);
    let lower = normal_cdf((-BLOWOUT_MARGIN - expected_margin) / margin_sigma);
    (upper + lower).clamp(0.0, 1.0)
}

fn scoring_share(team1_average: f64, team2_average: f64) -> f64 {
    let combined = team1_average + team2_average;
    if !combined.is_finite() || combined <= 0.0 {
        return 0.5;
    }
    (team1_average / combined).clamp(0.0, 1.0)
}

fn team_total(line: f64, juice: TotalJuice) -> TeamTotalProp {
    TeamTotalProp {
        line,
        over: juice.over,
        under: juice.under,
    }
}

/// Team totals split the game total by scoring share; the blowout prop reads
/// the tails of the normal margin model centered on the spread.
pub fn generate_prop_bets(ctx: &PropContext<'_>) -> PropBets {
    let share = scoring_share(ctx.team1_average, ctx.team2_average);
    let team1_line = round_to_half(ctx.total * share);
    let team2_line = round_to_half(ctx.total * (1.0 - share));

    let team1_juice = generate_total_juice(&format!("{}-team1-total", ctx.seed_key));
    let team2_juice = generate_total_juice(&format!("{}-team2-total", ctx.seed_key));

    let probability = blowout_probability(-ctx.spread, ctx.margin_sigma);
    PropBets {
        team1_total: team_total(team1_line, team1_juice),
        team2_total: team_total(team2_line, team2_juice),
        blowout: BlowoutProp {
            threshold: BLOWOUT_MARGIN,
            probability,
            yes: probability_to_american(probability, ctx.vig),
            no: probability_to_american(1.0 - probability, ctx.vig),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(spread: f64, sigma: f64) -> PropContext<'static> {
        PropContext {
            team1_average: 150.0,
            team2_average: 100.0,
            total: 250.0,
            spread,
            margin_sigma: sigma,
            vig: 0.045,
            seed_key: "1-2-w5-props",
        }
    }

    #[test]
    fn american_prices() {
        assert_eq!(probability_to_american(0.5, 0.0), -100);
        assert_eq!(probability_to_american(0.75, 0.0), -300);
        assert_eq!(probability_to_american(0.25, 0.0), 300);
        assert_eq!(probability_to_american(0.0, 0.0), 5000);
        assert_eq!(probability_to_american(1.0, 0.0), -5000);
    }

    #[test]
    fn vig_makes_both_sides_worse() {
        assert!(probability_to_american(0.6, 0.05) < probability_to_american(0.6, 0.0));
        assert!(probability_to_american(0.3, 0.05) < probability_to_american(0.3, 0.0));
    }

    #[test]
    fn blowout_probability_is_symmetric_in_margin() {
        let a = blowout_probability(8.0, 20.0);
        let b = blowout_probability(-8.0, 20.0);
        assert!((a - b).abs() < 1e-12);
        assert!(blowout_probability(0.0, 20.0) < a);
        assert_eq!(blowout_probability(5.0, 0.0), 0.0);
    }

    #[test]
    fn team_totals_follow_scoring_share() {
        let props = generate_prop_bets(&context(-20.0, 25.0));
        assert_eq!(props.team1_total.line, 150.0);
        assert_eq!(props.team2_total.line, 100.0);
        assert!((-120..=-105).contains(&props.team1_total.over));
        assert!((-120..=-105).contains(&props.team2_total.under));
    }

    #[test]
    fn big_favorite_makes_blowout_likelier() {
        let close = generate_prop_bets(&context(-1.5, 25.0));
        let lopsided = generate_prop_bets(&context(-30.0, 25.0));
        assert!(lopsided.blowout.probability > close.blowout.probability);
        assert!(lopsided.blowout.yes < close.blowout.yes);
        assert_eq!(lopsided.blowout.threshold, 20.0);
    }

    #[test]
    fn props_are_deterministic() {
        assert_eq!(
            generate_prop_bets(&context(-6.5, 22.0)),
            generate_prop_bets(&context(-6.5, 22.0))
        );
    }
}
