// ABOUTME: Day-index parsing, day counting, and the per-day completion map for plans
// ABOUTME: Pure logic behind mark-day-complete and the completed_marked invariant
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use crate::errors::{AppError, AppResult};

/// A day index as received over the wire: clients send either a bare
/// integer or a `"Day N"` section label.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DayIndexInput {
    Number(i64),
    Label(String),
}

/// Normalize a day-index input to an integer >= 1
///
/// Accepts a positive integer, a numeric string, or a `"Day N"` label
/// (case-insensitive).
///
/// # Errors
///
/// Returns `InvalidFormat` for anything that does not parse, and
/// `InvalidInput` for indexes below 1.
pub fn parse_day_index(input: &DayIndexInput) -> AppResult<u32> {
    let value = match input {
        DayIndexInput::Number(n) => *n,
        DayIndexInput::Label(raw) => {
            let trimmed = raw.trim();
            if let Ok(n) = trimmed.parse::<i64>() {
                n
            } else {
                let rest = trimmed
                    .strip_prefix("Day ")
                    .or_else(|| trimmed.strip_prefix("day "))
                    .ok_or_else(|| {
                        AppError::new(
                            crate::errors::ErrorCode::InvalidFormat,
                            format!("Unparseable day index: {raw:?}"),
                        )
                    })?;
                rest.trim().parse::<i64>().map_err(|_| {
                    AppError::new(
                        crate::errors::ErrorCode::InvalidFormat,
                        format!("Unparseable day index: {raw:?}"),
                    )
                })?
            }
        }
    };

    u32::try_from(value)
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| AppError::invalid_input(format!("Day index must be >= 1, got {value}")))
}

/// Count the distinct `## Day N` section headers in a plan body.
///
/// Plans are free-form markdown from the generation model; this header scan
/// is the only structure they are guaranteed to carry. A body without day
/// headers counts as zero (callers treat such plans as single-day).
#[must_use]
pub fn count_plan_days(plan_details: &str) -> u32 {
    static DAY_HEADER: OnceLock<Regex> = OnceLock::new();
    let re = DAY_HEADER.get_or_init(|| {
        Regex::new(r"(?m)^##\s+Day\s+(\d+)").expect("day header pattern is valid")
    });

    let days: BTreeSet<u32> = re
        .captures_iter(plan_details)
        .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse().ok()))
        .collect();

    u32::try_from(days.len()).unwrap_or(u32::MAX)
}

/// Aggregate completion state of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
    /// No day marked yet
    Incomplete,
    /// At least one day marked, but not all
    PartiallyComplete,
    /// Every day in range marked
    Complete,
}

/// Per-day completion flags for a plan.
///
/// Externally serialized as a JSON object with string keys `day_N`, matching
/// the stored `day_completion_status` column representation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayCompletionMap {
    days: BTreeMap<u32, bool>,
}

impl DayCompletionMap {
    /// Empty map (fresh plan)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from the stored column value; `None`/empty reads as a fresh map
    ///
    /// # Errors
    ///
    /// Returns a serialization error when the stored JSON is malformed or a
    /// key does not follow the `day_N` shape
    pub fn from_stored(raw: Option<&str>) -> AppResult<Self> {
        let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
            return Ok(Self::new());
        };

        let object: BTreeMap<String, bool> = serde_json::from_str(raw)?;
        let mut days = BTreeMap::new();
        for (key, value) in object {
            let index: u32 = key
                .strip_prefix("day_")
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| {
                    AppError::new(
                        crate::errors::ErrorCode::SerializationError,
                        format!("Invalid day completion key: {key:?}"),
                    )
                })?;
            days.insert(index, value);
        }
        Ok(Self { days })
    }

    /// Serialize to the stored column representation
    ///
    /// # Errors
    ///
    /// Returns an error if JSON encoding fails
    pub fn to_stored(&self) -> AppResult<String> {
        let object: BTreeMap<String, bool> = self
            .days
            .iter()
            .map(|(index, done)| (format!("day_{index}"), *done))
            .collect();
        Ok(serde_json::to_string(&object)?)
    }

    /// Mark a day complete; marking an already-complete day is a no-op
    pub fn mark_day(&mut self, day_index: u32) {
        self.days.insert(day_index, true);
    }

    /// Whether a specific day is marked complete
    #[must_use]
    pub fn is_day_complete(&self, day_index: u32) -> bool {
        self.days.get(&day_index).copied().unwrap_or(false)
    }

    /// Whether every day in `1..=total_days` is marked complete
    #[must_use]
    pub fn all_complete(&self, total_days: u32) -> bool {
        total_days >= 1 && (1..=total_days).all(|day| self.is_day_complete(day))
    }

    /// Days currently marked complete, ascending
    pub fn completed_days(&self) -> impl Iterator<Item = u32> + '_ {
        self.days
            .iter()
            .filter(|(_, done)| **done)
            .map(|(day, _)| *day)
    }

    /// Classify the aggregate completion state for `total_days`
    #[must_use]
    pub fn state(&self, total_days: u32) -> CompletionState {
        if self.all_complete(total_days) {
            CompletionState::Complete
        } else if self.completed_days().next().is_some() {
            CompletionState::PartiallyComplete
        } else {
            CompletionState::Incomplete
        }
    }

}

impl Serialize for DayCompletionMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for (index, done) in &self.days {
            map.serialize_entry(&format!("day_{index}"), done)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_day_index_integer() {
        assert_eq!(parse_day_index(&DayIndexInput::Number(2)).unwrap(), 2);
        assert_eq!(
            parse_day_index(&DayIndexInput::Label("3".to_owned())).unwrap(),
            3
        );
    }

    #[test]
    fn test_parse_day_index_label() {
        assert_eq!(
            parse_day_index(&DayIndexInput::Label("Day 2".to_owned())).unwrap(),
            2
        );
        assert_eq!(
            parse_day_index(&DayIndexInput::Label("day 14".to_owned())).unwrap(),
            14
        );
    }

    #[test]
    fn test_parse_day_index_rejects_garbage() {
        assert!(parse_day_index(&DayIndexInput::Label("Week 2".to_owned())).is_err());
        assert!(parse_day_index(&DayIndexInput::Label("Day two".to_owned())).is_err());
        assert!(parse_day_index(&DayIndexInput::Number(0)).is_err());
        assert!(parse_day_index(&DayIndexInput::Number(-1)).is_err());
    }

    #[test]
    fn test_count_plan_days() {
        let body = "# Plan\n## Day 1: Push\n...\n## Day 2: Pull\n...\n## Day 3: Legs\n";
        assert_eq!(count_plan_days(body), 3);
    }

    #[test]
    fn test_count_plan_days_distinct_and_unstructured() {
        // Repeated headers count once; a body without headers counts zero
        let body = "## Day 1\ntext\n## Day 1\n## Day 2\n";
        assert_eq!(count_plan_days(body), 2);
        assert_eq!(count_plan_days("Just do squats every morning."), 0);
        // Indented or inline mentions are not section headers
        assert_eq!(count_plan_days("see ## Day 4 below\n  ## Day 5\n"), 0);
    }

    #[test]
    fn test_completion_map_round_trip() {
        let mut map = DayCompletionMap::new();
        map.mark_day(1);
        map.mark_day(3);

        let stored = map.to_stored().unwrap();
        assert!(stored.contains("\"day_1\":true"));
        assert!(stored.contains("\"day_3\":true"));

        let restored = DayCompletionMap::from_stored(Some(&stored)).unwrap();
        assert_eq!(restored, map);
    }

    #[test]
    fn test_completion_map_from_empty_column() {
        assert_eq!(DayCompletionMap::from_stored(None).unwrap(), DayCompletionMap::new());
        assert_eq!(
            DayCompletionMap::from_stored(Some("")).unwrap(),
            DayCompletionMap::new()
        );
    }

    #[test]
    fn test_completion_map_rejects_bad_keys() {
        assert!(DayCompletionMap::from_stored(Some(r#"{"monday":true}"#)).is_err());
    }

    #[test]
    fn test_all_complete_and_state() {
        let mut map = DayCompletionMap::new();
        assert_eq!(map.state(3), CompletionState::Incomplete);

        map.mark_day(1);
        map.mark_day(3);
        assert!(!map.all_complete(3));
        assert_eq!(map.state(3), CompletionState::PartiallyComplete);

        map.mark_day(2);
        assert!(map.all_complete(3));
        assert_eq!(map.state(3), CompletionState::Complete);

        // Marking an already-complete day changes nothing
        map.mark_day(2);
        assert!(map.all_complete(3));
    }

    #[test]
    fn test_out_of_range_day_never_satisfies_completion() {
        let mut map = DayCompletionMap::new();
        map.mark_day(5);
        assert!(!map.all_complete(3));
        assert_eq!(map.state(3), CompletionState::PartiallyComplete);
    }
}
