//! Skill assessment: question selection with fallback, scoring, level bands and
//! recruiter attribution.

pub mod attribution;
pub mod catalog;
pub mod domain;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod selector;
pub mod service;

#[cfg(test)]
mod tests;

pub use attribution::RecruiterAttributionResolver;
pub use catalog::{
    built_in_answer_key, built_in_questions, CatalogError, JobDirectory, QuestionCatalog,
};
pub use domain::{
    AnswerKey, AssessmentResult, CandidateQuestion, JobId, QuestionId, QuestionSpec, RecruiterId,
    SkillLevel, StudentId, Submission,
};
pub use repository::{RepositoryError, ResultRepository, StudentSnapshot};
pub use router::assessment_router;
pub use scoring::{answers_match, classify, score, AnswerCheck, ScoreSheet};
pub use selector::{QuestionSelector, QuestionSource, SelectedQuestions};
pub use service::{
    AnswerReview, AssessmentOutcome, AssessmentService, AssessmentServiceError, QuestionSheet,
};
