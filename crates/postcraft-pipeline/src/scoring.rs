//! Virality scoring: weighted model criteria, with a deterministic heuristic fallback.

use serde::{Deserialize, Serialize};

use crate::metadata::PostMetadata;

/// Per-criterion scores on a 0–10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriteriaScores {
    pub hook: f64,
    pub clarity: f64,
    pub emotion: f64,
    pub novelty: f64,
    pub compliance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub hook: f64,
    pub clarity: f64,
    pub emotion: f64,
    pub novelty: f64,
    pub compliance: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            hook: 0.25,
            clarity: 0.20,
            emotion: 0.20,
            novelty: 0.15,
            compliance: 0.20,
        }
    }
}

impl CriteriaScores {
    /// Clamp every criterion into 0–10.
    #[must_use]
    pub fn clamped(self) -> Self {
        let c = |v: f64| if v.is_finite() { v.clamp(0.0, 10.0) } else { 0.0 };
        Self {
            hook: c(self.hook),
            clarity: c(self.clarity),
            emotion: c(self.emotion),
            novelty: c(self.novelty),
            compliance: c(self.compliance),
        }
    }

    /// Weighted overall on 0–10, rounded to one decimal.
    #[must_use]
    pub fn overall(&self, weights: &ScoringWeights) -> f64 {
        let raw = self.hook * weights.hook
            + self.clarity * weights.clarity
            + self.emotion * weights.emotion
            + self.novelty * weights.novelty
            + self.compliance * weights.compliance;
        (raw * 10.0).round() / 10.0
    }

    /// Names of criteria strictly below `threshold`, in declaration order.
    #[must_use]
    pub fn below(&self, threshold: f64) -> Vec<&'static str> {
        [
            ("hook", self.hook),
            ("clarity", self.clarity),
            ("emotion", self.emotion),
            ("novelty", self.novelty),
            ("compliance", self.compliance),
        ]
        .into_iter()
        .filter(|(_, v)| *v < threshold)
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    Model,
    Heuristic,
}

/// A post's score on the 0–100 scale plus the feedback the optimizer consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViralityScore {
    pub virality_score: u8,
    pub percentile: u8,
    pub predicted_engagement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<CriteriaScores>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub source: ScoreSource,
}

/// `50 + 20·hook + 10·cta + 10·(words > 50)`, clamped to 100.
#[must_use]
pub fn heuristic_score(meta: &PostMetadata) -> u8 {
    let mut score: u8 = 50;
    if meta.has_hook {
        score += 20;
    }
    if meta.has_cta {
        score += 10;
    }
    if meta.word_count > 50 {
        score += 10;
    }
    score.min(100)
}

/// Coarse engagement label for a 0–100 score.
#[must_use]
pub fn engagement_label(score: u8) -> &'static str {
    match score {
        0..=49 => "low",
        50..=69 => "medium",
        70..=84 => "high",
        _ => "viral",
    }
}

/// Full heuristic score with feedback derived from the metadata flags.
#[must_use]
pub fn heuristic_virality(meta: &PostMetadata) -> ViralityScore {
    let score = heuristic_score(meta);
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut recommendations = Vec::new();

    if meta.has_hook {
        strengths.push("Opens with a substantial hook".to_string());
    } else {
        weaknesses.push("Opening line is too short to hook readers".to_string());
        recommendations.push("Lead with a bold, specific first line".to_string());
    }
    if meta.has_cta {
        strengths.push("Includes a call to action".to_string());
    } else {
        weaknesses.push("No call to action".to_string());
        recommendations.push("Ask readers to comment, share or follow".to_string());
    }
    if meta.word_count > 50 {
        strengths.push("Enough substance to hold attention".to_string());
    } else {
        weaknesses.push("Thin on detail".to_string());
        recommendations.push("Add a concrete example or number".to_string());
    }

    ViralityScore {
        virality_score: score,
        percentile: score,
        predicted_engagement: engagement_label(score).to_string(),
        criteria: None,
        strengths,
        weaknesses,
        recommendations,
        source: ScoreSource::Heuristic,
    }
}

/// Shape of the scorer agent's JSON reply. Missing lists default to empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModelScoreReply {
    pub scores: CriteriaScores,
    #[serde(default)]
    pub percentile: Option<f64>,
    #[serde(default)]
    pub predicted_engagement: Option<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl ModelScoreReply {
    pub(crate) fn into_virality(self, weights: &ScoringWeights) -> ViralityScore {
        let criteria = self.scores.clamped();
        let score = to_percent(criteria.overall(weights) * 10.0);
        let percentile = self.percentile.map_or(score, to_percent);
        let predicted_engagement = self
            .predicted_engagement
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| engagement_label(score).to_string());

        ViralityScore {
            virality_score: score,
            percentile,
            predicted_engagement,
            criteria: Some(criteria),
            strengths: self.strengths,
            weaknesses: self.weaknesses,
            recommendations: self.recommendations,
            source: ScoreSource::Model,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_percent(value: f64) -> u8 {
    if value.is_finite() {
        value.round().clamp(0.0, 100.0) as u8
    } else {
        0
    }
}
