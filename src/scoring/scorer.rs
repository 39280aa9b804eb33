use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{ScoringError, UNANSWERED, percentage};
use crate::models::{
    quiz::{Difficulty, Question},
    result::SubmittedAnswer,
};

/// Selected option per question id for one attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    selections: HashMap<String, i64>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a selection. A later call for the same question replaces the earlier one.
    pub fn record(&mut self, question_id: impl Into<String>, selection: i64) {
        self.selections.insert(question_id.into(), selection);
    }

    /// The selection for `question_id`, or [`UNANSWERED`].
    pub fn selection_for(&self, question_id: &str) -> i64 {
        self.selections
            .get(question_id)
            .copied()
            .unwrap_or(UNANSWERED)
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

impl<'a> FromIterator<&'a SubmittedAnswer> for AnswerSheet {
    fn from_iter<T: IntoIterator<Item = &'a SubmittedAnswer>>(iter: T) -> Self {
        let mut sheet = AnswerSheet::new();
        for answer in iter {
            sheet.record(answer.question_id.clone(), answer.selection());
        }
        sheet
    }
}

/// Outcome for a single question, in quiz order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOutcome {
    pub question_id: String,
    pub question: String,
    pub options: Vec<String>,
    pub selected_answer: i64,
    pub correct_answer: i64,
    pub is_correct: bool,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub total_questions: u32,
    pub correct_count: u32,
    pub percentage: u32,
    pub outcomes: Vec<QuestionOutcome>,
}

/// Scores one attempt against a quiz's questions.
///
/// Questions missing from `sheet` count as unanswered; sheet entries for ids
/// that are not in `questions` are ignored.
pub fn score(questions: &[Question], sheet: &AnswerSheet) -> Result<ScoreResult, ScoringError> {
    if questions.is_empty() {
        return Err(ScoringError::DataIntegrity(
            "quiz has no questions".to_string(),
        ));
    }

    let mut outcomes = Vec::with_capacity(questions.len());
    let mut correct_count = 0u32;

    for question in questions {
        let in_range = usize::try_from(question.correct_option_index)
            .is_ok_and(|idx| idx < question.options.len());
        if !in_range {
            return Err(ScoringError::DataIntegrity(format!(
                "question '{}' has answer index {} but {} options",
                question.id,
                question.correct_option_index,
                question.options.len()
            )));
        }

        let selected = sheet.selection_for(&question.id);
        let is_correct = selected == question.correct_option_index;
        if is_correct {
            correct_count += 1;
        }

        outcomes.push(QuestionOutcome {
            question_id: question.id.clone(),
            question: question.text.clone(),
            options: question.options.clone(),
            selected_answer: selected,
            correct_answer: question.correct_option_index,
            is_correct,
            explanation: question.explanation.clone(),
            category: question.category.clone(),
            difficulty: question.difficulty,
        });
    }

    let total_questions = outcomes.len() as u32;

    Ok(ScoreResult {
        total_questions,
        correct_count,
        percentage: percentage(correct_count, total_questions),
        outcomes,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn question(id: &str, correct: i64) -> Question {
        Question {
            id: id.to_string(),
            text: format!("Question {id}"),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_option_index: correct,
            explanation: format!("Because {correct}"),
            category: None,
            difficulty: None,
        }
    }

    fn sheet(pairs: &[(&str, i64)]) -> AnswerSheet {
        let mut sheet = AnswerSheet::new();
        for (id, sel) in pairs {
            sheet.record(*id, *sel);
        }
        sheet
    }

    #[test]
    fn all_correct_scores_full_marks() {
        let questions: Vec<_> = (0..7).map(|i| question(&format!("q{i}"), i % 4)).collect();
        let answers = questions
            .iter()
            .fold(AnswerSheet::new(), |mut s, q| {
                s.record(q.id.clone(), q.correct_option_index);
                s
            });

        let result = score(&questions, &answers).unwrap();
        assert_eq!(result.correct_count, 7);
        assert_eq!(result.percentage, 100);
    }

    #[test]
    fn empty_submission_scores_zero() {
        let questions: Vec<_> = (1..=5).map(|i| question(&format!("q{i}"), 0)).collect();

        let result = score(&questions, &AnswerSheet::new()).unwrap();
        assert_eq!(result.correct_count, 0);
        assert_eq!(result.percentage, 0);
        assert!(result.outcomes.iter().all(|o| o.selected_answer == UNANSWERED));
    }

    #[test]
    fn scores_mixed_submission_in_question_order() {
        let questions = vec![
            question("q1", 0),
            question("q2", 1),
            question("q3", 2),
            question("q4", 3),
        ];
        let answers = sheet(&[("q4", 3), ("q3", 0), ("q1", 0), ("q2", 1)]);

        let result = score(&questions, &answers).unwrap();
        assert_eq!(result.total_questions, 4);
        assert_eq!(result.correct_count, 3);
        assert_eq!(result.percentage, 75);

        let ids: Vec<_> = result.outcomes.iter().map(|o| o.question_id.as_str()).collect();
        assert_eq!(ids, ["q1", "q2", "q3", "q4"]);
        assert!(!result.outcomes[2].is_correct);
        assert_eq!(result.outcomes[2].selected_answer, 0);
        assert_eq!(result.outcomes[2].correct_answer, 2);
        assert_eq!(result.outcomes[2].explanation, "Because 2");
    }

    #[test]
    fn thirds_round_to_nearest() {
        let questions = vec![question("a", 0), question("b", 0), question("c", 0)];

        let one = score(&questions, &sheet(&[("a", 0)])).unwrap();
        assert_eq!(one.percentage, 33);

        let two = score(&questions, &sheet(&[("a", 0), ("b", 0)])).unwrap();
        assert_eq!(two.percentage, 67);
    }

    #[test]
    fn unknown_and_out_of_range_selections_are_harmless() {
        let questions = vec![question("q1", 2), question("q2", 1)];
        let answers = sheet(&[("q1", 2), ("q2", 99), ("ghost", 1), ("q3", -7)]);

        let result = score(&questions, &answers).unwrap();
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.percentage, 50);
        assert_eq!(result.outcomes.len(), 2);
    }

    #[test]
    fn duplicate_answers_keep_the_last_one() {
        let submitted = vec![
            SubmittedAnswer::new("q1", 0),
            SubmittedAnswer::new("q1", 3),
        ];
        let answers: AnswerSheet = submitted.iter().collect();
        assert_eq!(answers.len(), 1);

        let result = score(&[question("q1", 3)], &answers).unwrap();
        assert_eq!(result.correct_count, 1);
    }

    #[test]
    fn empty_quiz_is_a_data_integrity_error() {
        let err = score(&[], &AnswerSheet::new()).unwrap_err();
        assert!(matches!(err, ScoringError::DataIntegrity(_)));
    }

    #[test]
    fn answer_key_outside_options_is_rejected() {
        let mut broken = question("q1", 0);
        broken.correct_option_index = 4;
        assert!(score(&[broken.clone()], &AnswerSheet::new()).is_err());

        broken.correct_option_index = -1;
        // -1 would otherwise match every unanswered question
        assert!(score(&[broken], &AnswerSheet::new()).is_err());
    }

    #[test]
    fn scoring_is_idempotent() {
        let questions = vec![question("q1", 1), question("q2", 2), question("q3", 3)];
        let answers = sheet(&[("q1", 1), ("q3", 0)]);

        let first = score(&questions, &answers).unwrap();
        let second = score(&questions, &answers).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
