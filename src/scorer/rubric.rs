//! LLM-backed scorer: one request per rubric criterion, run concurrently,
//! then an aggregator that averages the bands and renders a text report.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use futures::future::try_join_all;
use serde::Deserialize;
use tracing::{debug, info};

use super::{Report, Scorer, Task1Input, Task2Input};
use crate::llm::{ChatClient, Part, extract_json};

/// One rubric dimension and what the examiner should look at.
#[derive(Debug, Clone, Copy)]
pub struct Criterion {
    pub name: &'static str,
    pub focus: &'static str,
}

pub const TASK1_CRITERIA: [Criterion; 4] = [
    Criterion {
        name: "Task Achievement",
        focus: "whether the response gives an accurate overview of the visual, selects and reports the key features, and makes relevant comparisons",
    },
    COHERENCE,
    LEXICAL,
    GRAMMAR,
];

pub const TASK2_CRITERIA: [Criterion; 4] = [
    Criterion {
        name: "Task Response",
        focus: "whether every part of the question is addressed, the position is clear throughout, and ideas are extended and supported",
    },
    COHERENCE,
    LEXICAL,
    GRAMMAR,
];

const COHERENCE: Criterion = Criterion {
    name: "Coherence and Cohesion",
    focus: "logical organisation, paragraphing, progression of ideas and the use of cohesive devices and referencing",
};

const LEXICAL: Criterion = Criterion {
    name: "Lexical Resource",
    focus: "range and precision of vocabulary, collocation, less common items, and errors in word choice, word formation and spelling",
};

const GRAMMAR: Criterion = Criterion {
    name: "Grammatical Range and Accuracy",
    focus: "range of sentence structures, control of complex forms, and the frequency and impact of grammatical and punctuation errors",
};

/// A single criterion's verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionScore {
    pub name: &'static str,
    pub band: f32,
    pub feedback: String,
}

#[derive(Deserialize)]
struct Assessment {
    band: f32,
    feedback: String,
}

/// Scores both task types through a [`ChatClient`].
pub struct RubricScorer {
    client: ChatClient,
}

impl RubricScorer {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    async fn assess_all(
        &self,
        task: &str,
        criteria: &[Criterion],
        parts: &[Part<'_>],
    ) -> Result<Vec<CriterionScore>> {
        info!(task, model = self.client.model(), "scoring {} criteria", criteria.len());
        let futures = criteria.iter().map(|criterion| async move {
            let system = system_prompt(task, criterion);
            let raw = self
                .client
                .complete_json(&system, parts)
                .await
                .with_context(|| format!("{} assessment failed", criterion.name))?;
            let score = parse_assessment(criterion, &raw)?;
            debug!(criterion = criterion.name, band = score.band, "criterion scored");
            Ok::<_, anyhow::Error>(score)
        });
        try_join_all(futures).await
    }
}

#[async_trait]
impl Scorer<Task1Input> for RubricScorer {
    async fn score(&self, input: &Task1Input) -> Result<Report> {
        let essay = format!("Student's Task 1 response:\n\n{}", input.essay);
        let parts = [Part::Text(&essay), Part::Image(&input.image_data_url)];
        let scores = self.assess_all("Task 1", &TASK1_CRITERIA, &parts).await?;
        Ok(Report::Text(render_report("Task 1", &scores)))
    }
}

#[async_trait]
impl Scorer<Task2Input> for RubricScorer {
    async fn score(&self, input: &Task2Input) -> Result<Report> {
        let prompt = format!(
            "Task 2 question:\n\n{}\n\nStudent's essay:\n\n{}",
            input.question, input.essay
        );
        let parts = [Part::Text(&prompt)];
        let scores = self.assess_all("Task 2", &TASK2_CRITERIA, &parts).await?;
        Ok(Report::Text(render_report("Task 2", &scores)))
    }
}

fn system_prompt(task: &str, criterion: &Criterion) -> String {
    format!(
        r#"You are an experienced IELTS examiner marking an Academic Writing {task} response.

Assess ONLY the criterion "{name}": {focus}.

Respond with ONLY a JSON object, no markdown fences, no extra text:
{{"band": <number from 0 to 9 in steps of 0.5>, "feedback": "<3-5 sentences quoting the essay where useful and ending with one concrete improvement>"}}"#,
        name = criterion.name,
        focus = criterion.focus,
    )
}

/// Parse and sanity-check one criterion reply.
pub fn parse_assessment(criterion: &Criterion, raw: &str) -> Result<CriterionScore> {
    let assessment: Assessment = serde_json::from_str(extract_json(raw)).with_context(|| {
        format!("could not read the {} assessment", criterion.name)
    })?;

    if !assessment.band.is_finite() || !(0.0..=9.0).contains(&assessment.band) {
        bail!(
            "{} band {} is outside 0-9",
            criterion.name,
            assessment.band
        );
    }

    Ok(CriterionScore {
        name: criterion.name,
        band: round_half(assessment.band),
        feedback: assessment.feedback.trim().to_string(),
    })
}

/// Round to the nearest half band; quarters round up.
pub fn round_half(band: f32) -> f32 {
    (band * 2.0).round() / 2.0
}

/// Mean of the criterion bands rounded to the nearest half band.
pub fn overall_band(scores: &[CriterionScore]) -> f32 {
    if scores.is_empty() {
        return 0.0;
    }
    let sum: f32 = scores.iter().map(|s| s.band).sum();
    round_half(sum / scores.len() as f32)
}

/// Plain-text report with dashed banners and numbered labels.
pub fn render_report(task: &str, scores: &[CriterionScore]) -> String {
    let mut out = format!(
        "---- Overall Band ----\nEstimated {task} band: {:.1}\n\n---- Criterion Scores ----\n",
        overall_band(scores)
    );
    for (i, score) in scores.iter().enumerate() {
        out.push_str(&format!("{}. {}: {:.1}\n", i + 1, score.name, score.band));
    }
    for score in scores {
        out.push_str(&format!("\n---- {} ----\n{}\n", score.name, score.feedback));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use crate::normalize::normalize;

    fn score(name: &'static str, band: f32) -> CriterionScore {
        CriterionScore {
            name,
            band,
            feedback: format!("{name} feedback."),
        }
    }

    #[test]
    fn criteria_lists_have_four_distinct_entries() {
        for list in [TASK1_CRITERIA, TASK2_CRITERIA] {
            let names: HashSet<_> = list.iter().map(|c| c.name).collect();
            assert_eq!(list.len(), 4);
            assert_eq!(names.len(), 4);
        }
        assert_eq!(TASK1_CRITERIA[0].name, "Task Achievement");
        assert_eq!(TASK2_CRITERIA[0].name, "Task Response");
    }

    #[test]
    fn criterion_names_survive_banner_conversion() {
        for c in TASK1_CRITERIA.iter().chain(TASK2_CRITERIA.iter()) {
            assert!(!c.name.contains('-'), "{} would not become a heading", c.name);
        }
    }

    #[test]
    fn parse_valid_assessment() {
        let s = parse_assessment(&COHERENCE, r#"{"band": 6.5, "feedback": " Clear paragraphs. "}"#)
            .unwrap();
        assert_eq!(s.band, 6.5);
        assert_eq!(s.feedback, "Clear paragraphs.");
        assert_eq!(s.name, "Coherence and Cohesion");
    }

    #[test]
    fn parse_fenced_assessment() {
        let s = parse_assessment(&LEXICAL, "```json\n{\"band\": 7, \"feedback\": \"ok\"}\n```").unwrap();
        assert_eq!(s.band, 7.0);
    }

    #[test]
    fn parse_rounds_to_half_band() {
        let s = parse_assessment(&GRAMMAR, r#"{"band": 6.3, "feedback": "x"}"#).unwrap();
        assert_eq!(s.band, 6.5);
    }

    #[test]
    fn parse_rejects_out_of_range_band() {
        let err = parse_assessment(&GRAMMAR, r#"{"band": 11, "feedback": "x"}"#).unwrap_err();
        assert!(err.to_string().contains("outside 0-9"));
    }

    #[test]
    fn parse_rejects_non_json() {
        assert!(parse_assessment(&GRAMMAR, "Band seven, nice work").is_err());
    }

    #[test]
    fn parse_rejects_missing_feedback() {
        assert!(parse_assessment(&GRAMMAR, r#"{"band": 6}"#).is_err());
    }

    #[test]
    fn round_half_rounds_quarters_up() {
        assert_eq!(round_half(6.25), 6.5);
        assert_eq!(round_half(6.75), 7.0);
        assert_eq!(round_half(6.1), 6.0);
    }

    #[test]
    fn overall_band_averages() {
        let scores = [
            score("A", 6.0),
            score("B", 6.5),
            score("C", 6.5),
            score("D", 6.0),
        ];
        assert_eq!(overall_band(&scores), 6.5);
        assert_eq!(overall_band(&[]), 0.0);
    }

    #[test]
    fn rendered_report_normalizes_to_sections() {
        let scores = [score("Task Response", 7.0), score("Lexical Resource", 6.0)];
        let md = normalize(&render_report("Task 2", &scores));

        assert!(md.starts_with("## Overall Band\n\nEstimated Task 2 band: 6.5"));
        assert!(md.contains("## Criterion Scores\n\n**1. Task Response:** 7.0"));
        assert!(md.contains("**2. Lexical Resource:** 6.0"));
        assert!(md.contains("## Task Response\n\nTask Response feedback."));
        assert!(!md.contains("\n\n\n"));
    }

    #[test]
    fn system_prompt_names_criterion_and_task() {
        let prompt = system_prompt("Task 1", &TASK1_CRITERIA[0]);
        assert!(prompt.contains("Task 1"));
        assert!(prompt.contains("Task Achievement"));
        assert!(prompt.contains("\"band\""));
    }
}
