// ABOUTME: Pure merge of the global question catalog with trainer overlay rows
// ABOUTME: Produces the ordered effective question set a trainer sees for a context
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::database::questions::{
    GlobalQuestion, OverlayAction, QuestionType, TrainerQuestionOverlay,
};

/// Stable identity of an effective question
///
/// Global catalog questions keep their catalog id; trainer-original questions
/// are keyed by their overlay row id. The rendered forms (`global_<id>`,
/// `trainer_<id>`) are what intake answers reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKey {
    /// Sourced from the global catalog
    Global(i64),
    /// A trainer-original addition
    TrainerOwn(i64),
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global(id) => write!(f, "global_{id}"),
            Self::TrainerOwn(id) => write!(f, "trainer_{id}"),
        }
    }
}

impl Serialize for QuestionKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Where the content of an effective question came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    /// Untouched global catalog content
    Global,
    /// Trainer-edited or trainer-added content
    Trainer,
}

/// Context filter for a resolution
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionFilter {
    pub category: Option<String>,
    pub template: Option<String>,
    #[serde(default)]
    pub defaults_only: bool,
}

/// A resolved question as one trainer sees it; derived, never persisted
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveQuestion {
    /// Stable identity, rendered as `global_<id>` / `trainer_<id>`
    pub key: QuestionKey,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Option<Vec<String>>,
    pub category: String,
    pub template: Option<String>,
    pub question_source: QuestionSource,
}

impl EffectiveQuestion {
    fn from_global(question: &GlobalQuestion) -> Self {
        Self {
            key: QuestionKey::Global(question.id),
            question_text: question.question_text.clone(),
            question_type: question.question_type,
            options: question.options.clone(),
            category: question.category.clone(),
            template: question.template.clone(),
            question_source: QuestionSource::Global,
        }
    }

    fn from_overlay(key: QuestionKey, overlay: &TrainerQuestionOverlay) -> Self {
        Self {
            key,
            question_text: overlay.question_text.clone(),
            question_type: overlay.question_type,
            options: overlay.options.clone(),
            category: overlay.category.clone(),
            template: overlay.template.clone(),
            question_source: QuestionSource::Trainer,
        }
    }
}

/// Merge the (already filtered) global catalog with a trainer's overlays.
///
/// The result preserves insertion order: globals first in catalog order, then
/// trainer additions in overlay-row order. Overlays apply as:
///
/// - `delete` referencing a global question hides it for this trainer only
/// - `edit` referencing a global question replaces its content in place,
///   re-tagged as trainer-sourced, keeping its catalog position
/// - `add` appends a trainer-original question; when a template filter is
///   active, only additions whose template tag matches are included
///
/// Overlays referencing globals absent from the seeded set (filtered out or
/// since removed from the catalog) have no target and are skipped.
#[must_use]
pub fn resolve(
    globals: &[GlobalQuestion],
    overlays: &[TrainerQuestionOverlay],
    filter: &QuestionFilter,
) -> Vec<EffectiveQuestion> {
    // Slot vector keeps insertion order; the index map gives keyed access.
    // Deletions blank a slot rather than shifting later entries.
    let mut slots: Vec<Option<EffectiveQuestion>> = Vec::with_capacity(globals.len());
    let mut index_by_global: HashMap<i64, usize> = HashMap::with_capacity(globals.len());

    for question in globals {
        index_by_global.insert(question.id, slots.len());
        slots.push(Some(EffectiveQuestion::from_global(question)));
    }

    for overlay in overlays {
        match (overlay.action, overlay.global_question_id) {
            (OverlayAction::Delete, Some(global_id)) => {
                if let Some(&slot) = index_by_global.get(&global_id) {
                    slots[slot] = None;
                }
            }
            (OverlayAction::Edit, Some(global_id)) => {
                if let Some(&slot) = index_by_global.get(&global_id) {
                    slots[slot] = Some(EffectiveQuestion::from_overlay(
                        QuestionKey::Global(global_id),
                        overlay,
                    ));
                }
            }
            (OverlayAction::Add, None) => {
                if let Some(template) = &filter.template {
                    if overlay.template.as_ref() != Some(template) {
                        continue;
                    }
                }
                slots.push(Some(EffectiveQuestion::from_overlay(
                    QuestionKey::TrainerOwn(overlay.id),
                    overlay,
                )));
            }
            // Malformed rows (delete/edit without a target, add with one)
            // cannot be applied; the write path rejects them upfront.
            _ => {}
        }
    }

    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn global(id: i64, text: &str, category: &str) -> GlobalQuestion {
        GlobalQuestion {
            id,
            question_text: text.to_owned(),
            question_type: QuestionType::Text,
            options: None,
            category: category.to_owned(),
            is_default: false,
            template: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn overlay(
        id: i64,
        global_question_id: Option<i64>,
        action: OverlayAction,
        text: &str,
        template: Option<&str>,
    ) -> TrainerQuestionOverlay {
        TrainerQuestionOverlay {
            id,
            trainer_id: 5,
            global_question_id,
            question_text: text.to_owned(),
            question_type: QuestionType::Text,
            options: None,
            category: "health".to_owned(),
            action,
            template: template.map(str::to_owned),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_overlays_passes_catalog_through() {
        let globals = vec![global(1, "Goals?", "goals"), global(2, "Injuries?", "health")];
        let resolved = resolve(&globals, &[], &QuestionFilter::default());

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].key.to_string(), "global_1");
        assert_eq!(resolved[0].question_source, QuestionSource::Global);
        assert_eq!(resolved[1].key.to_string(), "global_2");
    }

    #[test]
    fn test_delete_hides_global() {
        let globals = vec![global(1, "Goals?", "goals"), global(2, "Injuries?", "health")];
        let overlays = vec![overlay(10, Some(1), OverlayAction::Delete, "Goals?", None)];

        let resolved = resolve(&globals, &overlays, &QuestionFilter::default());
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].key, QuestionKey::Global(2));
    }

    #[test]
    fn test_edit_replaces_in_place() {
        let globals = vec![global(1, "Goals?", "goals"), global(2, "Injuries?", "health")];
        let overlays = vec![overlay(
            10,
            Some(1),
            OverlayAction::Edit,
            "What are your training goals?",
            None,
        )];

        let resolved = resolve(&globals, &overlays, &QuestionFilter::default());
        assert_eq!(resolved.len(), 2);
        // Edited question keeps its catalog position and key
        assert_eq!(resolved[0].key, QuestionKey::Global(1));
        assert_eq!(resolved[0].question_text, "What are your training goals?");
        assert_eq!(resolved[0].question_source, QuestionSource::Trainer);
        assert_eq!(resolved[1].question_source, QuestionSource::Global);
    }

    #[test]
    fn test_add_appends_after_catalog() {
        let globals = vec![global(1, "Goals?", "goals")];
        let overlays = vec![overlay(10, None, OverlayAction::Add, "Injury history?", None)];

        let resolved = resolve(&globals, &overlays, &QuestionFilter::default());
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[1].key.to_string(), "trainer_10");
        assert_eq!(resolved[1].question_source, QuestionSource::Trainer);
    }

    #[test]
    fn test_add_respects_template_filter() {
        let overlays = vec![overlay(
            10,
            None,
            OverlayAction::Add,
            "Injury history?",
            Some("intake_v2"),
        )];

        let matching = QuestionFilter {
            template: Some("intake_v2".to_owned()),
            ..Default::default()
        };
        let other = QuestionFilter {
            template: Some("other".to_owned()),
            ..Default::default()
        };

        assert_eq!(resolve(&[], &overlays, &matching).len(), 1);
        assert!(resolve(&[], &overlays, &other).is_empty());
        // No filter includes everything
        assert_eq!(resolve(&[], &overlays, &QuestionFilter::default()).len(), 1);
    }

    #[test]
    fn test_overlay_for_filtered_out_global_is_skipped() {
        // Catalog pre-filtered to "health" only; the edit targets a goals
        // question that is not seeded, so it has nothing to replace.
        let globals = vec![global(2, "Injuries?", "health")];
        let overlays = vec![overlay(10, Some(1), OverlayAction::Edit, "Edited", None)];

        let resolved = resolve(&globals, &overlays, &QuestionFilter::default());
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].key, QuestionKey::Global(2));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let globals = vec![global(1, "Goals?", "goals"), global(2, "Injuries?", "health")];
        let overlays = vec![
            overlay(10, Some(1), OverlayAction::Edit, "Edited goals", None),
            overlay(11, None, OverlayAction::Add, "Extra", None),
        ];

        let first = resolve(&globals, &overlays, &QuestionFilter::default());
        let second = resolve(&globals, &overlays, &QuestionFilter::default());

        let keys = |qs: &[EffectiveQuestion]| {
            qs.iter().map(|q| q.key.to_string()).collect::<Vec<_>>()
        };
        assert_eq!(keys(&first), keys(&second));
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn test_key_serialization() {
        let json = serde_json::to_string(&QuestionKey::Global(7)).unwrap();
        assert_eq!(json, "\"global_7\"");
        let json = serde_json::to_string(&QuestionKey::TrainerOwn(3)).unwrap();
        assert_eq!(json, "\"trainer_3\"");
    }
}
