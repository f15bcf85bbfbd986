//! Bracket assembly.
//!
//! Series are bucketed by their round label. Labels outside [`BracketRound`]
//! cannot be placed; they are returned in [`BracketAssembly::dropped`] so the
//! caller can log them and the validation report can list them.

use serde::Serialize;

use crate::models::{BracketMatch, BracketRound};

/// Eight round buckets, each ordered by bracket position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bracket {
    pub winners_r1: Vec<BracketMatch>,
    pub winners_r2: Vec<BracketMatch>,
    pub winners_finals: Vec<BracketMatch>,
    pub elim_r1: Vec<BracketMatch>,
    pub elim_r2: Vec<BracketMatch>,
    pub elim_r3: Vec<BracketMatch>,
    pub elim_finals: Vec<BracketMatch>,
    pub grand_finals: Vec<BracketMatch>,
}

impl Bracket {
    pub fn bucket(&self, round: BracketRound) -> &[BracketMatch] {
        match round {
            BracketRound::WinnersR1 => &self.winners_r1,
            BracketRound::WinnersR2 => &self.winners_r2,
            BracketRound::WinnersFinals => &self.winners_finals,
            BracketRound::ElimR1 => &self.elim_r1,
            BracketRound::ElimR2 => &self.elim_r2,
            BracketRound::ElimR3 => &self.elim_r3,
            BracketRound::ElimFinals => &self.elim_finals,
            BracketRound::GrandFinals => &self.grand_finals,
        }
    }

    fn bucket_mut(&mut self, round: BracketRound) -> &mut Vec<BracketMatch> {
        match round {
            BracketRound::WinnersR1 => &mut self.winners_r1,
            BracketRound::WinnersR2 => &mut self.winners_r2,
            BracketRound::WinnersFinals => &mut self.winners_finals,
            BracketRound::ElimR1 => &mut self.elim_r1,
            BracketRound::ElimR2 => &mut self.elim_r2,
            BracketRound::ElimR3 => &mut self.elim_r3,
            BracketRound::ElimFinals => &mut self.elim_finals,
            BracketRound::GrandFinals => &mut self.grand_finals,
        }
    }

    pub fn len(&self) -> usize {
        BracketRound::ALL
            .iter()
            .map(|r| self.bucket(*r).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A series whose round label is not a known bracket round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedMatch {
    pub match_id: i64,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BracketAssembly {
    pub bracket: Bracket,
    pub placed: usize,
    pub dropped: Vec<DroppedMatch>,
}

pub fn assemble_bracket(matches: Vec<BracketMatch>) -> BracketAssembly {
    let mut out = BracketAssembly::default();

    for m in matches {
        match m.bracket_round.parse::<BracketRound>() {
            Ok(round) => {
                out.bracket.bucket_mut(round).push(m);
                out.placed += 1;
            }
            Err(_) => out.dropped.push(DroppedMatch {
                match_id: m.id,
                label: m.bracket_round,
            }),
        }
    }

    for round in BracketRound::ALL {
        out.bracket
            .bucket_mut(round)
            .sort_by_key(|m| (m.bracket_position, m.id));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn series(id: i64, round: &str, position: i64) -> BracketMatch {
        BracketMatch {
            id,
            team1_id: 1,
            team2_id: 2,
            team1_name: "Los Angeles Thieves".to_string(),
            team1_abbr: "LAT".to_string(),
            team1_logo: None,
            team2_name: "New York Subliners".to_string(),
            team2_abbr: "NYSL".to_string(),
            team2_logo: None,
            team1_score: 3,
            team2_score: 2,
            winner_id: Some(1),
            bracket_round: round.to_string(),
            bracket_position: position,
            match_date: NaiveDate::from_ymd_opt(2024, 6, 20)
                .unwrap()
                .and_hms_opt(20, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_buckets_ordered_by_position() {
        let assembly = assemble_bracket(vec![
            series(3, "winners_r1", 2),
            series(1, "winners_r1", 1),
            series(2, "grand_finals", 1),
            series(4, "winners_r1", 3),
        ]);
        let ids: Vec<i64> = assembly.bracket.winners_r1.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert_eq!(assembly.bracket.grand_finals.len(), 1);
        assert_eq!(assembly.placed, 4);
        assert_eq!(assembly.bracket.len(), 4);
        assert!(assembly.dropped.is_empty());
    }

    #[test]
    fn test_unknown_label_not_in_any_bucket() {
        let assembly = assemble_bracket(vec![
            series(1, "elim_r1", 1),
            series(99, "exhibition", 1),
            series(100, "Winners_R1", 1),
        ]);
        for round in BracketRound::ALL {
            assert!(assembly.bracket.bucket(round).iter().all(|m| m.id < 99));
        }
        assert_eq!(assembly.placed, 1);
        assert_eq!(
            assembly.dropped,
            vec![
                DroppedMatch {
                    match_id: 99,
                    label: "exhibition".to_string()
                },
                DroppedMatch {
                    match_id: 100,
                    label: "Winners_R1".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_empty_bracket_serializes_all_buckets() {
        let assembly = assemble_bracket(Vec::new());
        assert!(assembly.bracket.is_empty());
        let json = serde_json::to_value(&assembly.bracket).unwrap();
        for round in BracketRound::ALL {
            assert_eq!(json[round.as_str()], serde_json::json!([]));
        }
    }
}
