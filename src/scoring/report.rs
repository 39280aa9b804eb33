use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    percentage,
    scorer::{QuestionOutcome, ScoreResult},
};
use crate::models::quiz::Difficulty;

/// Percentage from which an attempt is rated Excellent.
pub const EXCELLENT_THRESHOLD: u32 = 80;
/// Percentage from which an attempt is rated Good.
pub const GOOD_THRESHOLD: u32 = 50;

/// Coarse performance classification of a percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerformanceTier {
    Poor,
    Good,
    Excellent,
}

impl PerformanceTier {
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= EXCELLENT_THRESHOLD {
            PerformanceTier::Excellent
        } else if percentage >= GOOD_THRESHOLD {
            PerformanceTier::Good
        } else {
            PerformanceTier::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceTier::Poor => "Poor",
            PerformanceTier::Good => "Good",
            PerformanceTier::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PerformanceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Poor" => Ok(PerformanceTier::Poor),
            "Good" => Ok(PerformanceTier::Good),
            "Excellent" => Ok(PerformanceTier::Excellent),
            other => Err(format!("unknown performance tier '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: u32,
    pub total: u32,
}

impl Tally {
    fn add(&mut self, is_correct: bool) {
        self.total += 1;
        if is_correct {
            self.correct += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyAnalysis {
    pub easy: Tally,
    pub medium: Tally,
    pub hard: Tally,
}

impl DifficultyAnalysis {
    fn bucket_mut(&mut self, difficulty: Difficulty) -> &mut Tally {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
        }
    }
}

/// Qualitative feedback, only produced when questions carry tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub category_breakdown: Vec<CategoryScore>,
    pub difficulty_analysis: DifficultyAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub percentage: u32,
    pub performance: PerformanceTier,
    /// Seconds, never negative.
    pub time_spent: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    pub results: Vec<QuestionOutcome>,
}

/// Turns a score into a report.
///
/// `time_spent` is informational: negative values are clamped to zero.
pub fn build_report(score: ScoreResult, time_spent: Option<i64>) -> Report {
    let performance = PerformanceTier::from_percentage(score.percentage);

    let time_spent = match time_spent {
        Some(t) if t < 0 => {
            tracing::debug!(time_spent = t, "negative time spent clamped to zero");
            0
        }
        Some(t) => t as u64,
        None => 0,
    };

    let analysis = analyze(&score.outcomes, performance);

    Report {
        total_questions: score.total_questions,
        correct_answers: score.correct_count,
        percentage: score.percentage,
        performance,
        time_spent,
        analysis,
        results: score.outcomes,
    }
}

fn analyze(outcomes: &[QuestionOutcome], tier: PerformanceTier) -> Option<Analysis> {
    let tagged = outcomes
        .iter()
        .any(|o| o.category.is_some() || o.difficulty.is_some());
    if !tagged {
        return None;
    }

    let mut categories: Vec<(String, Tally)> = Vec::new();
    let mut difficulty_analysis = DifficultyAnalysis::default();

    for outcome in outcomes {
        if let Some(category) = &outcome.category {
            match categories.iter_mut().find(|(name, _)| name == category) {
                Some((_, tally)) => tally.add(outcome.is_correct),
                None => {
                    let mut tally = Tally::default();
                    tally.add(outcome.is_correct);
                    categories.push((category.clone(), tally));
                }
            }
        }
        if let Some(difficulty) = outcome.difficulty {
            difficulty_analysis
                .bucket_mut(difficulty)
                .add(outcome.is_correct);
        }
    }

    let category_breakdown: Vec<CategoryScore> = categories
        .into_iter()
        .map(|(category, tally)| CategoryScore {
            category,
            correct: tally.correct,
            total: tally.total,
            percentage: percentage(tally.correct, tally.total),
        })
        .collect();

    let strengths = category_breakdown
        .iter()
        .filter(|c| c.percentage >= EXCELLENT_THRESHOLD)
        .map(|c| format!("Strong understanding of {} ({}%)", c.category, c.percentage))
        .collect();

    let weak: Vec<&CategoryScore> = category_breakdown
        .iter()
        .filter(|c| c.percentage < GOOD_THRESHOLD)
        .collect();

    let weaknesses = weak
        .iter()
        .map(|c| format!("Needs improvement in {} ({}%)", c.category, c.percentage))
        .collect();

    let recommendations = recommend(tier, &category_breakdown, &weak);

    Some(Analysis {
        strengths,
        weaknesses,
        recommendations,
        category_breakdown,
        difficulty_analysis,
    })
}

fn recommend(
    tier: PerformanceTier,
    breakdown: &[CategoryScore],
    weak: &[&CategoryScore],
) -> Vec<String> {
    let mut out = Vec::new();
    match tier {
        PerformanceTier::Poor => {
            // ties resolve to the first category seen
            if let Some(lowest) = breakdown.iter().min_by_key(|c| c.percentage) {
                out.push(format!("Review the fundamentals of {}", lowest.category));
            }
            out.push("Revisit the explanation for every question you missed".to_string());
            out.push("Retake the quiz once you have reviewed the material".to_string());
        }
        PerformanceTier::Good => {
            for c in weak {
                out.push(format!("Practice more questions on {}", c.category));
            }
            out.push("Focus on the questions you missed to reach the Excellent tier".to_string());
        }
        PerformanceTier::Excellent => {
            out.push("Move on to advanced material".to_string());
            out.push("Try a quiz at a harder difficulty level".to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::Question;
    use crate::scoring::scorer::{AnswerSheet, score, tests::question};

    fn score_of(percentage: u32) -> ScoreResult {
        ScoreResult {
            total_questions: 100,
            correct_count: percentage,
            percentage,
            outcomes: Vec::new(),
        }
    }

    #[test]
    fn tier_boundaries_are_inclusive() {
        assert_eq!(PerformanceTier::from_percentage(100), PerformanceTier::Excellent);
        assert_eq!(PerformanceTier::from_percentage(80), PerformanceTier::Excellent);
        assert_eq!(PerformanceTier::from_percentage(79), PerformanceTier::Good);
        assert_eq!(PerformanceTier::from_percentage(50), PerformanceTier::Good);
        assert_eq!(PerformanceTier::from_percentage(49), PerformanceTier::Poor);
        assert_eq!(PerformanceTier::from_percentage(0), PerformanceTier::Poor);
    }

    #[test]
    fn time_spent_is_clamped_or_defaulted() {
        assert_eq!(build_report(score_of(10), Some(125)).time_spent, 125);
        assert_eq!(build_report(score_of(10), Some(-30)).time_spent, 0);
        assert_eq!(build_report(score_of(10), None).time_spent, 0);
    }

    #[test]
    fn untagged_questions_produce_no_analysis() {
        let questions = vec![question("q1", 0), question("q2", 1)];
        let result = score(&questions, &AnswerSheet::new()).unwrap();

        let report = build_report(result, None);
        assert!(report.analysis.is_none());
        assert_eq!(report.performance, PerformanceTier::Poor);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("analysis").is_none());
    }

    fn tagged(id: &str, category: &str, difficulty: Difficulty) -> Question {
        let mut q = question(id, 0);
        q.category = Some(category.to_string());
        q.difficulty = Some(difficulty);
        q
    }

    #[test]
    fn analysis_breaks_down_by_category_and_difficulty() {
        let questions = vec![
            tagged("q1", "Ownership", Difficulty::Easy),
            tagged("q2", "Traits", Difficulty::Medium),
            tagged("q3", "Ownership", Difficulty::Hard),
            tagged("q4", "Traits", Difficulty::Medium),
            tagged("q5", "Async", Difficulty::Hard),
        ];
        let mut sheet = AnswerSheet::new();
        sheet.record("q1", 0);
        sheet.record("q3", 0);
        sheet.record("q2", 0);
        sheet.record("q4", 2);
        sheet.record("q5", 1);

        let report = build_report(score(&questions, &sheet).unwrap(), Some(60));
        assert_eq!(report.percentage, 60);
        assert_eq!(report.performance, PerformanceTier::Good);

        let analysis = report.analysis.expect("tags present");
        assert_eq!(
            analysis.category_breakdown,
            vec![
                CategoryScore { category: "Ownership".into(), correct: 2, total: 2, percentage: 100 },
                CategoryScore { category: "Traits".into(), correct: 1, total: 2, percentage: 50 },
                CategoryScore { category: "Async".into(), correct: 0, total: 1, percentage: 0 },
            ]
        );
        assert_eq!(analysis.difficulty_analysis.easy, Tally { correct: 1, total: 1 });
        assert_eq!(analysis.difficulty_analysis.medium, Tally { correct: 1, total: 2 });
        assert_eq!(analysis.difficulty_analysis.hard, Tally { correct: 1, total: 2 });

        assert_eq!(analysis.strengths, vec!["Strong understanding of Ownership (100%)"]);
        assert_eq!(analysis.weaknesses, vec!["Needs improvement in Async (0%)"]);
        assert_eq!(
            analysis.recommendations,
            vec![
                "Practice more questions on Async",
                "Focus on the questions you missed to reach the Excellent tier",
            ]
        );
    }

    #[test]
    fn poor_attempt_points_at_lowest_category() {
        let questions = vec![
            tagged("q1", "Lifetimes", Difficulty::Hard),
            tagged("q2", "Macros", Difficulty::Hard),
            tagged("q3", "Macros", Difficulty::Hard),
        ];
        let mut sheet = AnswerSheet::new();
        sheet.record("q2", 0);

        let report = build_report(score(&questions, &sheet).unwrap(), None);
        assert_eq!(report.performance, PerformanceTier::Poor);

        let analysis = report.analysis.unwrap();
        assert_eq!(
            analysis.recommendations[0],
            "Review the fundamentals of Lifetimes"
        );
        assert_eq!(analysis.weaknesses.len(), 1);
    }

    #[test]
    fn lowest_category_ties_pick_first_seen() {
        let questions = vec![
            tagged("q1", "Alpha", Difficulty::Easy),
            tagged("q2", "Beta", Difficulty::Easy),
        ];

        let report = build_report(score(&questions, &AnswerSheet::new()).unwrap(), None);
        let analysis = report.analysis.unwrap();
        assert_eq!(analysis.recommendations[0], "Review the fundamentals of Alpha");
    }

    #[test]
    fn difficulty_only_tags_still_activate_analysis() {
        let mut q = question("q1", 0);
        q.difficulty = Some(Difficulty::Easy);
        let mut sheet = AnswerSheet::new();
        sheet.record("q1", 0);

        let report = build_report(score(&[q], &sheet).unwrap(), None);
        let analysis = report.analysis.unwrap();
        assert!(analysis.category_breakdown.is_empty());
        assert_eq!(analysis.difficulty_analysis.easy, Tally { correct: 1, total: 1 });
        assert_eq!(
            analysis.recommendations,
            vec!["Move on to advanced material", "Try a quiz at a harder difficulty level"]
        );
    }
}
