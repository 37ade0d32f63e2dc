// ABOUTME: Question-overlay resolution for trainer intake forms
// ABOUTME: Merges the global question catalog with per-trainer add/edit/delete overlays
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

//! # Intake question resolution
//!
//! Every trainer sees the platform's global question catalog through their own
//! overlay rows: a global question can be hidden (`delete`), replaced in place
//! (`edit`), or supplemented with trainer-original questions (`add`). The
//! resolver in this module performs that merge purely over already-fetched
//! rows; it never touches storage and never mutates the catalog.

mod resolver;

pub use resolver::{resolve, EffectiveQuestion, QuestionFilter, QuestionKey, QuestionSource};
