//! Outcome schedule: which rounds are forced wins
//!
//! The decision depends on the round number only. The policy is a table
//! so it can be replaced without touching grid synthesis.

use serde::{Deserialize, Serialize};
use sf_core::Money;

use crate::card::PrizeKind;

/// Win/lose decision for one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub should_win: bool,
    pub prize_kind: PrizeKind,
    /// Cash amount; zero for losses and grand prizes
    pub amount: Money,
}

impl Outcome {
    pub fn lose() -> Self {
        Self {
            should_win: false,
            prize_kind: PrizeKind::None,
            amount: Money::ZERO,
        }
    }

    pub fn cash(amount: Money) -> Self {
        Self {
            should_win: true,
            prize_kind: PrizeKind::Cash,
            amount,
        }
    }

    pub fn grand_prize() -> Self {
        Self {
            should_win: true,
            prize_kind: PrizeKind::GrandPrize,
            amount: Money::ZERO,
        }
    }
}

/// Round → outcome policy
pub trait OutcomeSchedule {
    fn decide_outcome(&self, round: u64) -> Outcome;
}

/// Prize configured for a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduledPrize {
    Cash { amount: Money },
    GrandPrize,
}

/// One table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub round: u64,
    pub prize: ScheduledPrize,
    #[serde(default)]
    pub note: Option<String>,
}

/// Policy table of forced wins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PrizeSchedule {
    pub entries: Vec<ScheduleEntry>,
}

impl PrizeSchedule {
    /// Empty schedule: every round loses
    pub fn new() -> Self {
        Self::default()
    }

    /// Round 3 pays 30.00 cash, round 8 is the grand prize
    pub fn standard() -> Self {
        let mut schedule = Self::new();
        schedule.add(3, ScheduledPrize::Cash {
            amount: Money::new(30, 0),
        });
        schedule.add(8, ScheduledPrize::GrandPrize);
        schedule
    }

    /// Add or replace the prize for a round
    pub fn add(&mut self, round: u64, prize: ScheduledPrize) {
        self.entries.retain(|e| e.round != round);
        self.entries.push(ScheduleEntry {
            round,
            prize,
            note: None,
        });
        self.entries.sort_by_key(|e| e.round);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Last scheduled round, if any
    pub fn last_round(&self) -> Option<u64> {
        self.entries.last().map(|e| e.round)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut schedule: PrizeSchedule = serde_json::from_str(json)?;
        schedule.entries.sort_by_key(|e| e.round);
        Ok(schedule)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl OutcomeSchedule for PrizeSchedule {
    fn decide_outcome(&self, round: u64) -> Outcome {
        match self.entries.iter().find(|e| e.round == round) {
            Some(ScheduleEntry {
                prize: ScheduledPrize::Cash { amount },
                ..
            }) => Outcome::cash(*amount),
            Some(ScheduleEntry {
                prize: ScheduledPrize::GrandPrize,
                ..
            }) => Outcome::grand_prize(),
            None => Outcome::lose(),
        }
    }
}

impl<F> OutcomeSchedule for F
where
    F: Fn(u64) -> Outcome,
{
    fn decide_outcome(&self, round: u64) -> Outcome {
        self(round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_rounds() {
        let schedule = PrizeSchedule::standard();
        assert_eq!(
            schedule.decide_outcome(3),
            Outcome {
                should_win: true,
                prize_kind: PrizeKind::Cash,
                amount: Money::new(30, 0),
            }
        );
        let grand = schedule.decide_outcome(8);
        assert!(grand.should_win);
        assert_eq!(grand.prize_kind, PrizeKind::GrandPrize);
    }

    #[test]
    fn test_other_rounds_lose() {
        let schedule = PrizeSchedule::standard();
        for round in (0..=1000).filter(|r| *r != 3 && *r != 8) {
            assert!(!schedule.decide_outcome(round).should_win, "round {round}");
        }
        assert!(!schedule.decide_outcome(u64::MAX).should_win);
    }

    #[test]
    fn test_replace_entry() {
        let mut schedule = PrizeSchedule::standard();
        schedule.add(3, ScheduledPrize::GrandPrize);
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.decide_outcome(3).prize_kind, PrizeKind::GrandPrize);
        assert_eq!(schedule.last_round(), Some(8));
    }

    #[test]
    fn test_json_table() {
        let json = r#"{
            "entries": [
                { "round": 5, "prize": { "type": "grand_prize" } },
                { "round": 1, "prize": { "type": "cash", "amount": 1000 }, "note": "welcome" }
            ]
        }"#;
        let schedule = PrizeSchedule::from_json(json).unwrap();
        assert_eq!(schedule.entries[0].round, 1);
        assert_eq!(schedule.decide_outcome(1), Outcome::cash(Money::new(10, 0)));
        assert_eq!(schedule.decide_outcome(3), Outcome::lose());
    }

    #[test]
    fn test_closure_schedule() {
        let every_tenth = |round: u64| {
            if round % 10 == 0 {
                Outcome::cash(Money::new(5, 0))
            } else {
                Outcome::lose()
            }
        };
        assert!(every_tenth.decide_outcome(20).should_win);
        assert!(!every_tenth.decide_outcome(21).should_win);
    }
}
