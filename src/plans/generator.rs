// ABOUTME: Prompt building and title extraction for AI-generated workout plans
// ABOUTME: Shapes client assessment data into the markdown skeleton the model fills in
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

use std::fmt::Write as _;

/// One assessment's findings, already joined with its catalog name
#[derive(Debug, Clone)]
pub struct AssessmentFinding {
    pub assessment_name: String,
    /// The submitted `input_data` payload
    pub input_data: serde_json::Value,
}

/// Render assessment findings as the bullet list embedded in the prompt
#[must_use]
pub fn format_assessment_findings(findings: &[AssessmentFinding]) -> String {
    if findings.is_empty() {
        return "No assessment data available.".to_owned();
    }

    let mut out = String::new();
    for finding in findings {
        let values = match &finding.input_data {
            serde_json::Value::Object(map) => map
                .iter()
                .map(|(k, v)| format!("{k}: {}", render_json_value(v)))
                .collect::<Vec<_>>()
                .join(", "),
            other => render_json_value(other),
        };
        let _ = writeln!(out, "- {}: {values}", finding.assessment_name);
    }
    out.trim_end().to_owned()
}

fn render_json_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build the full plan-generation prompt: the trainer's selected prompt,
/// client findings, trainer comments, and the fixed markdown skeleton the
/// model is expected to fill in. The `## Day N` headers in the skeleton are
/// what day counting later keys on.
#[must_use]
pub fn build_plan_prompt(
    selected_prompt: &str,
    assessment_findings: &str,
    additional_comments: Option<&str>,
) -> String {
    format!(
        r"{selected_prompt}

# [Client's Name]'s [Workout Name] Workout Plan
## Client Profile
- **Assessment Data**:
{assessment_findings}

## Trainer's Additional Comments
{comments}

## Day 1: [Title Day Name]
### Warm-Up
- **Exercise Name**: Description (duration)

### Main Workout
#### Muscle Group/Workout Focus
1. **Exercise Name**
- **Sets**: X
- **Reps**: X
- **Rest**: X seconds
- **Intensity**: [Description]
- **Alternative**: [Alternative exercise if equipment is not available]

### Cool Down
- **Exercise Name**: Description (duration)

## Day 2: [Title Day Name]
### Warm-Up
...

## Day 3: [Title Day Name]
### Warm-Up
...

## Additional Notes
...
",
        comments = additional_comments.unwrap_or("None")
    )
}

/// Derive a plan title from the model output's first markdown heading
///
/// Falls back to the provided default when the first line is not a heading.
#[must_use]
pub fn extract_plan_title(plan_details: &str, fallback: &str) -> String {
    let first_line = plan_details.lines().next().unwrap_or_default().trim();
    first_line
        .strip_prefix('#')
        .map(|rest| rest.trim_start_matches('#').trim())
        .filter(|title| !title.is_empty())
        .map_or_else(|| fallback.to_owned(), str::to_owned)
}

/// Name a quick (demo) plan from its extracted title
#[must_use]
pub fn demo_plan_name(title: &str) -> String {
    format!("{title} (Quick)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_assessment_findings_empty() {
        assert_eq!(
            format_assessment_findings(&[]),
            "No assessment data available."
        );
    }

    #[test]
    fn test_format_assessment_findings() {
        let findings = vec![AssessmentFinding {
            assessment_name: "Flexibility".to_owned(),
            input_data: serde_json::json!({ "sit_and_reach_cm": 12, "notes": "tight hamstrings" }),
        }];
        let rendered = format_assessment_findings(&findings);
        assert!(rendered.starts_with("- Flexibility: "));
        assert!(rendered.contains("notes: tight hamstrings"));
        assert!(rendered.contains("sit_and_reach_cm: 12"));
    }

    #[test]
    fn test_build_plan_prompt_contains_day_skeleton() {
        let prompt = build_plan_prompt("You are a fitness trainer.", "- none", Some("low impact"));
        assert!(prompt.contains("## Day 1"));
        assert!(prompt.contains("## Day 3"));
        assert!(prompt.contains("low impact"));
    }

    #[test]
    fn test_extract_plan_title() {
        let details = "# Alex's Strength Plan\n## Day 1: Push\n";
        assert_eq!(extract_plan_title(details, "Quick Plan"), "Alex's Strength Plan");
        assert_eq!(extract_plan_title("no heading here", "Quick Plan"), "Quick Plan");
        assert_eq!(demo_plan_name("Alex's Strength Plan"), "Alex's Strength Plan (Quick)");
    }
}
