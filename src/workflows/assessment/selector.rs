use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::catalog::{built_in_answer_key, built_in_questions, CatalogError, QuestionCatalog};
use super::domain::{AnswerKey, JobId, QuestionSpec};

/// Where a selected question set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    Job,
    General,
    BuiltIn,
}

/// Question set a candidate is tested on, with the key used to score it.
#[derive(Debug, Clone)]
pub struct SelectedQuestions {
    pub source: QuestionSource,
    pub questions: Vec<QuestionSpec>,
    pub answer_key: AnswerKey,
}

/// Resolves the question set for an optional job, falling back to the general
/// pool and finally to the built-in set.
pub struct QuestionSelector<Q> {
    catalog: Arc<Q>,
}

impl<Q> QuestionSelector<Q>
where
    Q: QuestionCatalog + 'static,
{
    pub fn new(catalog: Arc<Q>) -> Self {
        Self { catalog }
    }

    pub fn select(&self, job_id: Option<JobId>) -> Result<SelectedQuestions, CatalogError> {
        if let Some(job) = job_id {
            let scoped = self.catalog.active_for_job(job)?;
            if !scoped.is_empty() {
                return Ok(from_catalog(QuestionSource::Job, scoped));
            }
            debug!(job = job.0, "no job-scoped questions, using general pool");
        }

        let general = self.catalog.active_general()?;
        if !general.is_empty() {
            return Ok(from_catalog(QuestionSource::General, general));
        }

        let stranded = self.catalog.active_count()?;
        if stranded > 0 {
            warn!(
                job = job_id.map(|job| job.0),
                stranded,
                "serving built-in questions while the catalog holds active questions for other jobs"
            );
        }

        Ok(SelectedQuestions {
            source: QuestionSource::BuiltIn,
            questions: built_in_questions(),
            answer_key: built_in_answer_key(),
        })
    }
}

fn from_catalog(source: QuestionSource, questions: Vec<QuestionSpec>) -> SelectedQuestions {
    let answer_key = AnswerKey::from_questions(&questions);
    SelectedQuestions {
        source,
        questions,
        answer_key,
    }
}
