use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};

use super::attribution::RecruiterAttributionResolver;
use super::catalog::{CatalogError, JobDirectory, QuestionCatalog};
use super::domain::{
    AssessmentResult, CandidateQuestion, JobId, QuestionId, QuestionSpec, StudentId, Submission,
};
use super::repository::{RepositoryError, ResultRepository, StudentSnapshot};
use super::scoring::{classify, score, AnswerCheck};
use super::selector::{QuestionSelector, QuestionSource};

/// Serves question sheets, scores submissions and records the results.
pub struct AssessmentService<Q, J, R> {
    selector: QuestionSelector<Q>,
    attribution: RecruiterAttributionResolver<J>,
    results: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<Q, J, R> AssessmentService<Q, J, R>
where
    Q: QuestionCatalog + 'static,
    J: JobDirectory + 'static,
    R: ResultRepository + 'static,
{
    pub fn new(catalog: Arc<Q>, jobs: Arc<J>, results: Arc<R>) -> Self {
        Self::with_clock(catalog, jobs, results, Arc::new(SystemClock))
    }

    pub fn with_clock(
        catalog: Arc<Q>,
        jobs: Arc<J>,
        results: Arc<R>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            selector: QuestionSelector::new(catalog),
            attribution: RecruiterAttributionResolver::new(jobs),
            results,
            clock,
        }
    }

    /// Questions for `job_id` with the correct answers stripped.
    pub fn questions(&self, job_id: Option<JobId>) -> Result<QuestionSheet, AssessmentServiceError> {
        let selected = self.selector.select(job_id)?;
        Ok(QuestionSheet {
            source: selected.source,
            questions: selected
                .questions
                .iter()
                .map(QuestionSpec::candidate_view)
                .collect(),
        })
    }

    /// Score a submission and record it when the student is known.
    pub fn submit(
        &self,
        student_id: StudentId,
        job_id: Option<JobId>,
        submission: Submission,
    ) -> Result<AssessmentOutcome, AssessmentServiceError> {
        let answers = submission.answers.ok_or_else(|| {
            AssessmentServiceError::Validation("Answers not provided".to_string())
        })?;

        let selected = self.selector.select(job_id)?;
        let sheet = score(&selected.answer_key, &answers);
        let level = classify(sheet.score, sheet.total);
        let recruiter_id = self.attribution.resolve(job_id, &selected.questions);

        let result = AssessmentResult {
            student_id,
            score: sheet.score,
            total: sheet.total,
            level,
            taken_at: self.clock.now(),
            recruiter_id,
        };

        let recorded = if self.results.student_exists(student_id)? {
            self.results.record_result(&result)?;
            self.results
                .update_student_snapshot(student_id, StudentSnapshot::from(&result))?;
            true
        } else {
            warn!(student = student_id.0, "unknown student, assessment scored but not recorded");
            false
        };

        info!(
            student = student_id.0,
            source = ?selected.source,
            score = result.score,
            total = result.total,
            level = %result.level,
            recorded,
            "assessment submitted"
        );

        let reviews = review(&selected.questions, sheet.checks);
        Ok(AssessmentOutcome {
            result,
            source: selected.source,
            reviews,
            recorded,
        })
    }

    /// Every recorded result for the student, oldest first.
    pub fn history(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<AssessmentResult>, AssessmentServiceError> {
        if !self.results.student_exists(student_id)? {
            return Err(AssessmentServiceError::StudentNotFound(student_id));
        }
        let mut results = self.results.results_for_student(student_id)?;
        results.sort_by_key(|result| result.taken_at);
        Ok(results)
    }
}

fn review(questions: &[QuestionSpec], checks: Vec<AnswerCheck>) -> Vec<AnswerReview> {
    checks
        .into_iter()
        .map(|check| {
            let question = questions.iter().find(|question| question.id == check.question_id);
            AnswerReview {
                question_id: check.question_id,
                question: question.map(|question| question.text.clone()),
                options: question
                    .map(|question| question.options.clone())
                    .unwrap_or_default(),
                submitted: check.submitted,
                correct_answer: check.correct_answer,
                is_correct: check.is_correct,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionSheet {
    pub source: QuestionSource,
    pub questions: Vec<CandidateQuestion>,
}

/// Per-question feedback returned after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerReview {
    pub question_id: QuestionId,
    pub question: Option<String>,
    pub options: Vec<String>,
    pub submitted: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentOutcome {
    pub result: AssessmentResult,
    pub source: QuestionSource,
    pub reviews: Vec<AnswerReview>,
    /// `false` when the student is unknown and nothing was persisted.
    pub recorded: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("student {0} not found")]
    StudentNotFound(StudentId),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
