//! Answer scoring, report generation and cross-attempt statistics.
//!
//! Everything in here is synchronous and pure: callers hand in fully
//! materialized quiz and result data and get owned values back.

pub mod aggregate;
pub mod report;
pub mod scorer;

pub use aggregate::{QuizStatistics, aggregate};
pub use report::{PerformanceTier, Report, build_report};
pub use scorer::{AnswerSheet, ScoreResult, score};

/// Selection recorded for a question the user did not answer.
pub const UNANSWERED: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    /// The quiz data itself is broken (no questions, or an answer key that
    /// does not point at an option).
    #[error("quiz data integrity error: {0}")]
    DataIntegrity(String),
}

/// `round(numerator / denominator)` with halves rounded up.
///
/// `denominator` must be non-zero.
pub(crate) fn rounded_ratio(numerator: u64, denominator: u64) -> u32 {
    ((numerator * 2 + denominator) / (denominator * 2)) as u32
}

/// Integer percentage of `part` in `whole`, halves rounded up.
pub(crate) fn percentage(part: u32, whole: u32) -> u32 {
    rounded_ratio(u64::from(part) * 100, u64::from(whole))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(0, 5), 0);
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn rounded_ratio_boundaries() {
        assert_eq!(rounded_ratio(625, 10), 63);
        assert_eq!(rounded_ratio(624, 10), 62);
        assert_eq!(rounded_ratio(0, 1), 0);
    }
}
