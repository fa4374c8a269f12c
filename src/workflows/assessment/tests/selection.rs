use super::common::*;
use std::sync::Arc;

use crate::workflows::assessment::catalog::built_in_answer_key;
use crate::workflows::assessment::domain::{JobId, QuestionId, QuestionSpec};
use crate::workflows::assessment::selector::{QuestionSelector, QuestionSource};

fn ids(questions: &[QuestionSpec]) -> Vec<u64> {
    questions.iter().map(|question| question.id.0).collect()
}

#[test]
fn job_scoped_questions_take_priority() {
    let catalog = MemoryCatalog::with(vec![
        question(1, "A"),
        for_job(question(2, "B"), 5),
        for_job(question(3, "C"), 5),
        for_job(question(4, "D"), 6),
    ]);
    let selector = QuestionSelector::new(Arc::new(catalog));

    let selected = selector.select(Some(JobId(5))).expect("catalog reachable");
    assert_eq!(selected.source, QuestionSource::Job);
    assert_eq!(ids(&selected.questions), vec![2, 3]);
    assert_eq!(selected.answer_key.len(), 2);
    assert_eq!(selected.answer_key.get(QuestionId(3)), Some("C"));
}

#[test]
fn job_without_questions_falls_back_to_general_pool() {
    let catalog = MemoryCatalog::with(vec![
        question(1, "A"),
        question(2, "B"),
        for_job(question(3, "C"), 6),
    ]);
    let selector = QuestionSelector::new(Arc::new(catalog));

    let selected = selector.select(Some(JobId(5))).expect("catalog reachable");
    assert_eq!(selected.source, QuestionSource::General);
    assert_eq!(ids(&selected.questions), vec![1, 2]);
    assert!(!selected.questions.is_empty());
}

#[test]
fn inactive_questions_are_never_selected() {
    let catalog = MemoryCatalog::with(vec![
        inactive(for_job(question(1, "A"), 5)),
        question(2, "B"),
        inactive(question(3, "C")),
    ]);
    let selector = QuestionSelector::new(Arc::new(catalog));

    let selected = selector.select(Some(JobId(5))).expect("catalog reachable");
    assert_eq!(selected.source, QuestionSource::General);
    assert_eq!(ids(&selected.questions), vec![2]);
}

#[test]
fn built_in_set_used_only_when_both_scopes_are_empty() {
    let selector = QuestionSelector::new(Arc::new(MemoryCatalog::default()));

    let selected = selector.select(None).expect("catalog reachable");
    assert_eq!(selected.source, QuestionSource::BuiltIn);
    assert_eq!(ids(&selected.questions), vec![1, 2, 3, 4]);
    assert_eq!(selected.answer_key, built_in_answer_key());
}

#[test]
fn built_in_set_served_when_only_other_jobs_have_questions() {
    let catalog = MemoryCatalog::with(vec![for_job(question(40, "A"), 9)]);
    let selector = QuestionSelector::new(Arc::new(catalog));

    // The catalog is not empty, yet nothing fits this job or the general pool, so the
    // built-in set is served and scored against its own key. Ids 1-4 are not checked
    // against the catalog; the selector only logs a warning.
    let selected = selector.select(Some(JobId(5))).expect("catalog reachable");
    assert_eq!(selected.source, QuestionSource::BuiltIn);
    assert_eq!(selected.answer_key, built_in_answer_key());
    assert!(selected
        .questions
        .iter()
        .all(|question| question.id != QuestionId(40)));
}

#[test]
fn no_job_goes_straight_to_general_pool() {
    let catalog = MemoryCatalog::with(vec![for_job(question(1, "A"), 5), question(2, "B")]);
    let selector = QuestionSelector::new(Arc::new(catalog));

    let selected = selector.select(None).expect("catalog reachable");
    assert_eq!(selected.source, QuestionSource::General);
    assert_eq!(ids(&selected.questions), vec![2]);
}

#[test]
fn catalog_failure_is_propagated() {
    let selector = QuestionSelector::new(Arc::new(OfflineCatalog));
    assert!(selector.select(Some(JobId(1))).is_err());
    assert!(selector.select(None).is_err());
}
