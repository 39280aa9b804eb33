use serde::{Deserialize, Serialize};

use super::{report::PerformanceTier, rounded_ratio};
use crate::models::result::QuizResult;

/// Share of Poor attempts (percent) above which remedial action is suggested.
pub const POOR_SHARE_THRESHOLD: u64 = 30;
/// Share of Excellent attempts (percent) above which advanced material is suggested.
pub const EXCELLENT_SHARE_THRESHOLD: u64 = 70;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceBreakdown {
    pub excellent: u32,
    pub good: u32,
    pub poor: u32,
}

/// Cross-attempt statistics for one quiz.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStatistics {
    pub total_attempts: u32,
    pub average_score: u32,
    pub performance_breakdown: PerformanceBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowest_score: Option<u32>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Aggregates every stored attempt of a quiz. An empty slice is valid input.
pub fn aggregate(results: &[QuizResult]) -> QuizStatistics {
    if results.is_empty() {
        return QuizStatistics::default();
    }

    let mut breakdown = PerformanceBreakdown::default();
    let mut sum = 0u64;
    for result in results {
        sum += u64::from(result.percentage);
        match result.performance {
            PerformanceTier::Excellent => breakdown.excellent += 1,
            PerformanceTier::Good => breakdown.good += 1,
            PerformanceTier::Poor => breakdown.poor += 1,
        }
    }

    let total = results.len() as u64;

    QuizStatistics {
        total_attempts: total as u32,
        average_score: rounded_ratio(sum, total),
        performance_breakdown: breakdown,
        highest_score: results.iter().map(|r| r.percentage).max(),
        lowest_score: results.iter().map(|r| r.percentage).min(),
        recommendations: class_recommendations(&breakdown, total),
    }
}

fn class_recommendations(breakdown: &PerformanceBreakdown, total: u64) -> Vec<String> {
    let lines: [&str; 3] = if u64::from(breakdown.poor) * 100 > total * POOR_SHARE_THRESHOLD {
        [
            "Review core concepts with the class",
            "Provide additional practice materials",
            "Consider one-on-one support",
        ]
    } else if u64::from(breakdown.excellent) * 100 > total * EXCELLENT_SHARE_THRESHOLD {
        [
            "Excellent class performance",
            "Consider advanced topics",
            "Maintain the current teaching approach",
        ]
    } else {
        [
            "Good overall performance",
            "Focus on struggling students",
            "Reinforce key concepts",
        ]
    };
    lines.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(percentage: u32) -> QuizResult {
        QuizResult {
            id: 0,
            quiz_id: 1,
            user_id: 1,
            user_name: "Student".into(),
            user_email: "student@example.com".into(),
            answers: Vec::new(),
            total_questions: 100,
            correct_answers: percentage,
            percentage,
            performance: PerformanceTier::from_percentage(percentage),
            time_spent: 0,
            created_at: chrono::Utc::now(),
        }
    }

    fn results(percentages: &[u32]) -> Vec<QuizResult> {
        percentages.iter().copied().map(result).collect()
    }

    #[test]
    fn empty_results_are_all_zero() {
        let stats = aggregate(&[]);
        assert_eq!(stats.total_attempts, 0);
        assert_eq!(stats.average_score, 0);
        assert_eq!(stats.performance_breakdown, PerformanceBreakdown::default());
        assert_eq!(stats.highest_score, None);
        assert_eq!(stats.lowest_score, None);
        assert!(stats.recommendations.is_empty());

        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("highestScore").is_none());
    }

    #[test]
    fn ten_attempts_average_rounds_half_up() {
        let stats = aggregate(&results(&[90, 85, 40, 60, 95, 30, 70, 80, 20, 55]));

        assert_eq!(stats.total_attempts, 10);
        assert_eq!(stats.average_score, 63);
        assert_eq!(
            stats.performance_breakdown,
            PerformanceBreakdown { excellent: 4, good: 3, poor: 3 }
        );
        assert_eq!(stats.highest_score, Some(95));
        assert_eq!(stats.lowest_score, Some(20));
    }

    #[test]
    fn average_just_below_half_rounds_down() {
        // 62.4
        let stats = aggregate(&results(&[90, 85, 40, 60, 95, 30, 70, 80, 20, 54]));
        assert_eq!(stats.average_score, 62);
    }

    #[test]
    fn poor_share_over_threshold_suggests_remedial_work() {
        // 4 of 10 poor
        let stats = aggregate(&results(&[10, 20, 30, 40, 60, 60, 60, 90, 90, 90]));
        assert_eq!(stats.recommendations[0], "Review core concepts with the class");
    }

    #[test]
    fn poor_share_at_threshold_is_not_remedial() {
        // exactly 3 of 10 poor, 3 of 10 excellent
        let stats = aggregate(&results(&[10, 20, 30, 60, 60, 60, 60, 90, 90, 90]));
        assert_eq!(stats.recommendations[0], "Good overall performance");
    }

    #[test]
    fn excellent_share_over_threshold_suggests_advanced_topics() {
        // 8 of 10 excellent
        let stats = aggregate(&results(&[80, 85, 90, 95, 100, 80, 85, 90, 60, 60]));
        assert_eq!(stats.recommendations[0], "Excellent class performance");
        assert_eq!(stats.recommendations.len(), 3);
    }

    #[test]
    fn excellent_share_at_threshold_is_balanced() {
        // exactly 7 of 10 excellent
        let stats = aggregate(&results(&[80, 85, 90, 95, 100, 80, 85, 60, 60, 60]));
        assert_eq!(stats.recommendations[0], "Good overall performance");
    }
}
