// ABOUTME: Plan domain logic: day-completion parsing/classification and AI prompt building
// ABOUTME: Pure helpers exercised by the plans database manager and generation routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

//! # Plan domain logic
//!
//! Demo and generated plans are markdown documents organized into `## Day N`
//! sections. This module holds the pure rules around them: parsing day
//! indexes from client input, counting a plan's days, tracking the per-day
//! completion map, and building the generation prompt. Persistence lives in
//! [`crate::database::plans`].

mod completion;
mod generator;

pub use completion::{
    count_plan_days, parse_day_index, CompletionState, DayCompletionMap, DayIndexInput,
};
pub use generator::{
    build_plan_prompt, demo_plan_name, extract_plan_title, format_assessment_findings,
    AssessmentFinding,
};
