// src/scenario/keywords.rs
// Deterministic keyword/regex scenario parser used when the language model is unavailable

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::model::{ScenarioConfidence, ScenarioParams, TimeHorizon};

static PERCENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)\s*(?:%|percent\b|per\s+cent\b|pct\b)")
        .unwrap()
});

static INCREASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:increas\w*|grow\w*|rise|rises|rising|rose|boost\w*|rais\w*|up|higher|gain\w*)\b")
        .unwrap()
});

static DECREASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:decreas\w*|declin\w*|drop\w*|reduc\w*|cut|cuts|cutting|fall|falls|falling|fell|lower\w*|down|shrink\w*|loss|losses|lose|loses|losing|lost)\b")
        .unwrap()
});

static GRADUAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:gradual\w*|ramp\w*|phase[sd]?\s+in|progressive\w*|slowly|over\s+time|step\s+by\s+step)\b")
        .unwrap()
});

static DELAYED_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:next\s+month|starting|start\s+(?:in|from)|beginning)\b").unwrap());

static LONG_TERM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:year\w*|annual\w*|long)\b").unwrap());

static SHORT_TERM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:week\w*|short|immediate\w*)\b").unwrap());

pub const GRADUAL_RAMP_PERIODS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// Parses a scenario without any external call. Never fails.
///
/// Text without a percentage yields the neutral multiplier 1.0.
pub fn parse_scenario_keywords(text: &str) -> ScenarioParams {
    let percent = PERCENT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .filter(|p| p.is_finite());

    let multiplier = match (percent, direction(text)) {
        (Some(p), Direction::Down) => (1.0 - p / 100.0).max(0.0),
        (Some(p), Direction::Up) => 1.0 + p / 100.0,
        (None, _) => 1.0,
    };

    let ramp_periods = if GRADUAL.is_match(text) {
        GRADUAL_RAMP_PERIODS
    } else {
        0
    };
    let start_period = if DELAYED_START.is_match(text) { 1 } else { 0 };

    let time_horizon = if LONG_TERM.is_match(text) {
        TimeHorizon::LongTerm
    } else if SHORT_TERM.is_match(text) {
        TimeHorizon::ShortTerm
    } else {
        TimeHorizon::MediumTerm
    };

    ScenarioParams {
        multiplier,
        start_period,
        ramp_periods,
        time_horizon,
        confidence: if percent.is_some() {
            ScenarioConfidence::Medium
        } else {
            ScenarioConfidence::Low
        },
    }
}

/// Earliest direction keyword wins; no keyword means an increase.
fn direction(text: &str) -> Direction {
    let up = INCREASE.find(text).map(|m| m.start());
    let down = DECREASE.find(text).map(|m| m.start());
    match (up, down) {
        (Some(u), Some(d)) if d < u => Direction::Down,
        (None, Some(_)) => Direction::Down,
        _ => Direction::Up,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn multiplier_from_text() {
        let cases = [
            ("increase 10%", 1.10),
            ("sales grow by 12.5 %", 1.125),
            ("revenue drops 20 percent", 0.80),
            ("cut costs by 150%", 0.0),
            ("boost 5 pct", 1.05),
            ("revenue grows 1,000%", 11.0),
            ("a 1,250.5 percent rise", 13.505),
            ("something vague", 1.0),
            ("", 1.0),
        ];
        for (text, expected) in cases {
            assert_relative_eq!(parse_scenario_keywords(text).multiplier, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn earliest_direction_wins() {
        let params = parse_scenario_keywords("decline of 10% after the rise");
        assert_relative_eq!(params.multiplier, 0.9, epsilon = 1e-9);
    }

    #[test]
    fn gradual_and_start() {
        let params =
            parse_scenario_keywords("increase 10% starting next month, gradual over 3 months");
        assert_eq!(params.start_period, 1);
        assert_eq!(params.ramp_periods, 3);
        assert_eq!(params.confidence, ScenarioConfidence::Medium);
    }

    #[test]
    fn horizon_keywords() {
        let cases = [
            ("growth over the next year", TimeHorizon::LongTerm),
            ("an immediate 5% bump", TimeHorizon::ShortTerm),
            ("increase 5%", TimeHorizon::MediumTerm),
        ];
        for (text, expected) in cases {
            assert_eq!(parse_scenario_keywords(text).time_horizon, expected, "{}", text);
        }
    }

    proptest! {
        #[test]
        fn never_panics_and_stays_valid(text in ".{0,200}") {
            let params = parse_scenario_keywords(&text);
            prop_assert!(params.multiplier.is_finite());
            prop_assert!(params.multiplier >= 0.0);
            prop_assert!(params.ramp_periods <= GRADUAL_RAMP_PERIODS);
        }
    }
}
