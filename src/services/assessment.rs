use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::database::models::assessment::{AnswerInput, AssessmentOption, NewOption};
use crate::error::ApiError;

pub const MIN_OPTIONS: usize = 2;

pub fn check_question(question: &str, options: &[NewOption]) -> Result<(), ApiError> {
    if question.trim().is_empty() {
        return Err(ApiError::invalid_field("question", "is required"));
    }
    if options.len() < MIN_OPTIONS {
        return Err(ApiError::invalid_field("options", "at least two options are required"));
    }
    if options.iter().any(|o| o.option_text.trim().is_empty()) {
        return Err(ApiError::invalid_field("options", "option text is required"));
    }
    if options.iter().any(|o| !o.point.is_finite() || o.point < 0.0) {
        return Err(ApiError::invalid_field("options", "points must be non-negative"));
    }
    Ok(())
}

/// Total points of a set of answers.
///
/// `options` are the rows loaded for the answers' option ids. Every answer
/// must name an option of its own question, and no question may be answered twice.
pub fn score_answers(answers: &[AnswerInput], options: &[AssessmentOption]) -> Result<f64, ApiError> {
    let mut seen = HashSet::new();
    if let Some(dup) = answers.iter().find(|a| !seen.insert(a.question_id)) {
        return Err(ApiError::invalid_field(
            "answers",
            format!("question {} is answered more than once", dup.question_id),
        ));
    }

    let by_id: HashMap<Uuid, &AssessmentOption> = options.iter().map(|o| (o.id, o)).collect();
    answers.iter().try_fold(0.0, |total, answer| match by_id.get(&answer.option_id) {
        Some(option) if option.question_id == answer.question_id => Ok(total + option.point),
        _ => Err(ApiError::invalid_field(
            "answers",
            format!("option {} does not belong to question {}", answer.option_id, answer.question_id),
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(question_id: Uuid, point: f64) -> AssessmentOption {
        AssessmentOption {
            id: Uuid::new_v4(),
            question_id,
            option_text: format!("{} points", point),
            point,
        }
    }

    #[test]
    fn points_are_summed() {
        let (q1, q2) = (Uuid::new_v4(), Uuid::new_v4());
        let (a, b) = (option(q1, 2.0), option(q2, 3.5));
        let answers = vec![
            AnswerInput { question_id: q1, option_id: a.id },
            AnswerInput { question_id: q2, option_id: b.id },
        ];
        assert_eq!(score_answers(&answers, &[a, b]).unwrap(), 5.5);
    }

    #[test]
    fn option_from_another_question_is_rejected() {
        let (q1, q2) = (Uuid::new_v4(), Uuid::new_v4());
        let foreign = option(q2, 1.0);
        let answers = vec![AnswerInput { question_id: q1, option_id: foreign.id }];
        assert_eq!(score_answers(&answers, &[foreign]).unwrap_err().status_code(), 400);
    }

    #[test]
    fn unknown_option_is_rejected() {
        let answers = vec![AnswerInput { question_id: Uuid::new_v4(), option_id: Uuid::new_v4() }];
        assert!(score_answers(&answers, &[]).is_err());
    }

    #[test]
    fn duplicate_question_is_rejected() {
        let q = Uuid::new_v4();
        let (a, b) = (option(q, 1.0), option(q, 2.0));
        let answers = vec![
            AnswerInput { question_id: q, option_id: a.id },
            AnswerInput { question_id: q, option_id: b.id },
        ];
        assert!(score_answers(&answers, &[a, b]).is_err());
    }

    #[test]
    fn questions_need_two_non_negative_options() {
        let good = vec![
            NewOption { option_text: "Never".into(), point: 0.0 },
            NewOption { option_text: "Often".into(), point: 2.0 },
        ];
        assert!(check_question("Does the child make eye contact?", &good).is_ok());
        assert!(check_question("  ", &good).is_err());
        assert!(check_question("Q", &good[..1]).is_err());

        let negative = vec![
            NewOption { option_text: "A".into(), point: -1.0 },
            NewOption { option_text: "B".into(), point: 1.0 },
        ];
        assert!(check_question("Q", &negative).is_err());
    }
}
