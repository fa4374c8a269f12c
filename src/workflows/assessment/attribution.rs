use std::sync::Arc;

use tracing::warn;

use super::catalog::JobDirectory;
use super::domain::{JobId, QuestionSpec, RecruiterId};

/// Decides which recruiter a test session is credited to.
///
/// The job's recruiter wins; otherwise the first question carrying an owner;
/// otherwise nobody.
pub struct RecruiterAttributionResolver<J> {
    jobs: Arc<J>,
}

impl<J> RecruiterAttributionResolver<J>
where
    J: JobDirectory + 'static,
{
    pub fn new(jobs: Arc<J>) -> Self {
        Self { jobs }
    }

    pub fn resolve(&self, job_id: Option<JobId>, questions: &[QuestionSpec]) -> Option<RecruiterId> {
        job_id
            .and_then(|job| self.job_recruiter(job))
            .or_else(|| first_owner(questions))
    }

    fn job_recruiter(&self, job: JobId) -> Option<RecruiterId> {
        match self.jobs.recruiter_for_job(job) {
            Ok(recruiter) => recruiter,
            Err(err) => {
                warn!(job = job.0, error = %err, "job lookup failed, attributing by question owner");
                None
            }
        }
    }
}

fn first_owner(questions: &[QuestionSpec]) -> Option<RecruiterId> {
    questions
        .iter()
        .find_map(|question| question.owner_recruiter_id)
}
