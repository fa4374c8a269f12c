use serde::Serialize;

use super::domain::{AssessmentResult, SkillLevel, StudentId};

/// Latest score and level kept on the student record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StudentSnapshot {
    pub score: u32,
    pub level: SkillLevel,
}

impl From<&AssessmentResult> for StudentSnapshot {
    fn from(result: &AssessmentResult) -> Self {
        Self {
            score: result.score,
            level: result.level,
        }
    }
}

/// Persistence boundary for assessment results.
pub trait ResultRepository: Send + Sync {
    fn student_exists(&self, student: StudentId) -> Result<bool, RepositoryError>;
    fn record_result(&self, result: &AssessmentResult) -> Result<(), RepositoryError>;
    fn update_student_snapshot(
        &self,
        student: StudentId,
        snapshot: StudentSnapshot,
    ) -> Result<(), RepositoryError>;
    /// Results for one student in no particular order.
    fn results_for_student(&self, student: StudentId)
        -> Result<Vec<AssessmentResult>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("result storage unavailable: {0}")]
    Unavailable(String),
}
