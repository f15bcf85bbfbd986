//! Bracket round labels.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Rounds of the double-elimination bracket, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketRound {
    WinnersR1,
    WinnersR2,
    WinnersFinals,
    ElimR1,
    ElimR2,
    ElimR3,
    ElimFinals,
    GrandFinals,
}

impl BracketRound {
    pub const ALL: [BracketRound; 8] = [
        BracketRound::WinnersR1,
        BracketRound::WinnersR2,
        BracketRound::WinnersFinals,
        BracketRound::ElimR1,
        BracketRound::ElimR2,
        BracketRound::ElimR3,
        BracketRound::ElimFinals,
        BracketRound::GrandFinals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BracketRound::WinnersR1 => "winners_r1",
            BracketRound::WinnersR2 => "winners_r2",
            BracketRound::WinnersFinals => "winners_finals",
            BracketRound::ElimR1 => "elim_r1",
            BracketRound::ElimR2 => "elim_r2",
            BracketRound::ElimR3 => "elim_r3",
            BracketRound::ElimFinals => "elim_finals",
            BracketRound::GrandFinals => "grand_finals",
        }
    }
}

impl std::fmt::Display for BracketRound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Label outside the known round set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown bracket round: {0}")]
pub struct UnknownRound(pub String);

impl FromStr for BracketRound {
    type Err = UnknownRound;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BracketRound::ALL
            .into_iter()
            .find(|round| round.as_str() == s)
            .ok_or_else(|| UnknownRound(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_labels() {
        for round in BracketRound::ALL {
            assert_eq!(round.as_str().parse::<BracketRound>(), Ok(round));
        }
    }

    #[test]
    fn test_unknown_labels() {
        assert!("exhibition".parse::<BracketRound>().is_err());
        assert!("".parse::<BracketRound>().is_err());
        // Labels are case sensitive, matching how they are stored
        assert!("Grand_Finals".parse::<BracketRound>().is_err());
    }

    #[test]
    fn test_serde_matches_as_str() {
        let json = serde_json::to_string(&BracketRound::ElimFinals).unwrap();
        assert_eq!(json, "\"elim_finals\"");
    }
}
