use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::clock::ManualClock;
use crate::workflows::assessment::catalog::{CatalogError, JobDirectory, QuestionCatalog};
use crate::workflows::assessment::domain::{
    AssessmentResult, JobId, QuestionId, QuestionSpec, RecruiterId, StudentId,
};
use crate::workflows::assessment::repository::{
    RepositoryError, ResultRepository, StudentSnapshot,
};
use crate::workflows::assessment::service::AssessmentService;

pub(super) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 24, 10, 0, 0).unwrap()
}

pub(super) fn question(id: u64, answer: &str) -> QuestionSpec {
    QuestionSpec {
        id: QuestionId(id),
        text: format!("Question {id}?"),
        options: vec![answer.to_string(), "None of these".to_string()],
        correct_answer: answer.to_string(),
        active: true,
        job_id: None,
        owner_recruiter_id: None,
    }
}

pub(super) fn for_job(mut question: QuestionSpec, job: u64) -> QuestionSpec {
    question.job_id = Some(JobId(job));
    question
}

pub(super) fn owned_by(mut question: QuestionSpec, recruiter: u64) -> QuestionSpec {
    question.owner_recruiter_id = Some(RecruiterId(recruiter));
    question
}

pub(super) fn inactive(mut question: QuestionSpec) -> QuestionSpec {
    question.active = false;
    question
}

#[derive(Default)]
pub(super) struct MemoryCatalog {
    questions: Vec<QuestionSpec>,
}

impl MemoryCatalog {
    pub(super) fn with(questions: Vec<QuestionSpec>) -> Self {
        Self { questions }
    }

    fn active(&self) -> impl Iterator<Item = &QuestionSpec> {
        self.questions.iter().filter(|question| question.active)
    }
}

impl QuestionCatalog for MemoryCatalog {
    fn active_for_job(&self, job: JobId) -> Result<Vec<QuestionSpec>, CatalogError> {
        Ok(self
            .active()
            .filter(|question| question.job_id == Some(job))
            .cloned()
            .collect())
    }

    fn active_general(&self) -> Result<Vec<QuestionSpec>, CatalogError> {
        Ok(self
            .active()
            .filter(|question| question.job_id.is_none())
            .cloned()
            .collect())
    }

    fn active_count(&self) -> Result<usize, CatalogError> {
        Ok(self.active().count())
    }
}

pub(super) struct OfflineCatalog;

impl QuestionCatalog for OfflineCatalog {
    fn active_for_job(&self, _job: JobId) -> Result<Vec<QuestionSpec>, CatalogError> {
        Err(CatalogError::Unavailable("catalog offline".to_string()))
    }

    fn active_general(&self) -> Result<Vec<QuestionSpec>, CatalogError> {
        Err(CatalogError::Unavailable("catalog offline".to_string()))
    }

    fn active_count(&self) -> Result<usize, CatalogError> {
        Err(CatalogError::Unavailable("catalog offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryJobs {
    owners: HashMap<JobId, Option<RecruiterId>>,
}

impl MemoryJobs {
    pub(super) fn with(jobs: impl IntoIterator<Item = (u64, Option<u64>)>) -> Self {
        Self {
            owners: jobs
                .into_iter()
                .map(|(job, owner)| (JobId(job), owner.map(RecruiterId)))
                .collect(),
        }
    }
}

impl JobDirectory for MemoryJobs {
    fn recruiter_for_job(&self, job: JobId) -> Result<Option<RecruiterId>, CatalogError> {
        Ok(self.owners.get(&job).copied().flatten())
    }
}

pub(super) struct OfflineJobs;

impl JobDirectory for OfflineJobs {
    fn recruiter_for_job(&self, _job: JobId) -> Result<Option<RecruiterId>, CatalogError> {
        Err(CatalogError::Unavailable("jobs offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryResults {
    students: Mutex<HashSet<StudentId>>,
    results: Mutex<Vec<AssessmentResult>>,
    snapshots: Mutex<HashMap<StudentId, StudentSnapshot>>,
    fail_snapshot: bool,
}

impl MemoryResults {
    pub(super) fn with_students(students: impl IntoIterator<Item = u64>) -> Self {
        Self {
            students: Mutex::new(students.into_iter().map(StudentId).collect()),
            ..Self::default()
        }
    }

    pub(super) fn failing_snapshot(mut self) -> Self {
        self.fail_snapshot = true;
        self
    }

    pub(super) fn recorded(&self) -> Vec<AssessmentResult> {
        self.results.lock().expect("results mutex poisoned").clone()
    }

    pub(super) fn snapshot(&self, student: u64) -> Option<StudentSnapshot> {
        self.snapshots
            .lock()
            .expect("snapshot mutex poisoned")
            .get(&StudentId(student))
            .copied()
    }
}

impl ResultRepository for MemoryResults {
    fn student_exists(&self, student: StudentId) -> Result<bool, RepositoryError> {
        Ok(self
            .students
            .lock()
            .expect("students mutex poisoned")
            .contains(&student))
    }

    fn record_result(&self, result: &AssessmentResult) -> Result<(), RepositoryError> {
        self.results
            .lock()
            .expect("results mutex poisoned")
            .push(result.clone());
        Ok(())
    }

    fn update_student_snapshot(
        &self,
        student: StudentId,
        snapshot: StudentSnapshot,
    ) -> Result<(), RepositoryError> {
        if self.fail_snapshot {
            return Err(RepositoryError::Unavailable("snapshot write rejected".to_string()));
        }
        self.snapshots
            .lock()
            .expect("snapshot mutex poisoned")
            .insert(student, snapshot);
        Ok(())
    }

    fn results_for_student(
        &self,
        student: StudentId,
    ) -> Result<Vec<AssessmentResult>, RepositoryError> {
        Ok(self
            .recorded()
            .into_iter()
            .filter(|result| result.student_id == student)
            .collect())
    }
}

pub(super) type TestAssessment = AssessmentService<MemoryCatalog, MemoryJobs, MemoryResults>;

pub(super) struct Harness {
    pub(super) service: Arc<TestAssessment>,
    pub(super) results: Arc<MemoryResults>,
    pub(super) clock: Arc<ManualClock>,
}

pub(super) fn harness(catalog: MemoryCatalog, jobs: MemoryJobs, results: MemoryResults) -> Harness {
    let results = Arc::new(results);
    let clock = Arc::new(ManualClock::new(t0()));
    let service = Arc::new(AssessmentService::with_clock(
        Arc::new(catalog),
        Arc::new(jobs),
        results.clone(),
        clock.clone(),
    ));
    Harness {
        service,
        results,
        clock,
    }
}

/// Four general questions answered A, B, C, D; student 7 exists.
pub(super) fn four_question_harness() -> Harness {
    harness(
        MemoryCatalog::with(vec![
            question(10, "A"),
            question(11, "B"),
            question(12, "C"),
            question(13, "D"),
        ]),
        MemoryJobs::default(),
        MemoryResults::with_students([7]),
    )
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
