use metrics_exporter_prometheus::PrometheusHandle;
use skillfit::workflows::assessment::{
    AssessmentResult, CatalogError, JobDirectory, JobId, QuestionCatalog, QuestionId,
    QuestionSpec, RecruiterId, RepositoryError, ResultRepository, StudentId, StudentSnapshot,
};
use skillfit::workflows::verification::{
    code_message, welcome_message, AccountDirectory, AccountId, AccountRecord, AccountRole,
    DeliveryError, DirectoryError, Identity, LoggingNotifier, NewAccount, OutboundMessage,
    VerificationCode, VerificationNotifier,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct AccountTable {
    next_id: u64,
    records: HashMap<(AccountRole, Identity), AccountRecord>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAccountDirectory {
    accounts: Arc<Mutex<AccountTable>>,
}

impl InMemoryAccountDirectory {
    pub(crate) fn holds(&self, role: AccountRole, id: AccountId) -> bool {
        let guard = self.accounts.lock().expect("account mutex poisoned");
        guard
            .records
            .values()
            .any(|record| record.role == role && record.id == id)
    }
}

impl AccountDirectory for InMemoryAccountDirectory {
    fn find(
        &self,
        role: AccountRole,
        identity: &Identity,
    ) -> Result<Option<AccountRecord>, DirectoryError> {
        let guard = self.accounts.lock().expect("account mutex poisoned");
        Ok(guard.records.get(&(role, identity.clone())).cloned())
    }

    fn create(&self, account: NewAccount) -> Result<AccountRecord, DirectoryError> {
        let mut guard = self.accounts.lock().expect("account mutex poisoned");
        let key = (account.role, account.identity.clone());
        if guard.records.contains_key(&key) {
            return Err(DirectoryError::Conflict);
        }
        guard.next_id += 1;
        let record = AccountRecord {
            id: AccountId(guard.next_id),
            role: account.role,
            identity: account.identity,
            name: account.name,
            credential: account.credential,
        };
        guard.records.insert(key, record.clone());
        Ok(record)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryQuestionCatalog {
    questions: Arc<Mutex<Vec<QuestionSpec>>>,
}

impl InMemoryQuestionCatalog {
    pub(crate) fn seeded() -> Self {
        let catalog = Self::default();
        for question in seed_questions() {
            catalog.insert(question);
        }
        catalog
    }

    pub(crate) fn insert(&self, question: QuestionSpec) {
        self.questions
            .lock()
            .expect("catalog mutex poisoned")
            .push(question);
    }

    fn active_where(&self, scope: impl Fn(&QuestionSpec) -> bool) -> Vec<QuestionSpec> {
        let guard = self.questions.lock().expect("catalog mutex poisoned");
        guard
            .iter()
            .filter(|question| question.active && scope(*question))
            .cloned()
            .collect()
    }
}

impl QuestionCatalog for InMemoryQuestionCatalog {
    fn active_for_job(&self, job: JobId) -> Result<Vec<QuestionSpec>, CatalogError> {
        Ok(self.active_where(|question| question.job_id == Some(job)))
    }

    fn active_general(&self) -> Result<Vec<QuestionSpec>, CatalogError> {
        Ok(self.active_where(|question| question.job_id.is_none()))
    }

    fn active_count(&self) -> Result<usize, CatalogError> {
        Ok(self.active_where(|_| true).len())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryJobDirectory {
    owners: Arc<Mutex<HashMap<JobId, Option<RecruiterId>>>>,
}

impl InMemoryJobDirectory {
    pub(crate) fn seeded() -> Self {
        let jobs = Self::default();
        jobs.post(JobId(1), Some(RecruiterId(900)));
        jobs.post(JobId(2), None);
        jobs
    }

    pub(crate) fn post(&self, job: JobId, recruiter: Option<RecruiterId>) {
        self.owners
            .lock()
            .expect("job mutex poisoned")
            .insert(job, recruiter);
    }
}

impl JobDirectory for InMemoryJobDirectory {
    fn recruiter_for_job(&self, job: JobId) -> Result<Option<RecruiterId>, CatalogError> {
        let guard = self.owners.lock().expect("job mutex poisoned");
        Ok(guard.get(&job).copied().flatten())
    }
}

/// Results store that treats verified student accounts as the set of known students.
#[derive(Clone)]
pub(crate) struct InMemoryResultRepository {
    accounts: InMemoryAccountDirectory,
    results: Arc<Mutex<Vec<AssessmentResult>>>,
    snapshots: Arc<Mutex<HashMap<StudentId, StudentSnapshot>>>,
}

impl InMemoryResultRepository {
    pub(crate) fn new(accounts: InMemoryAccountDirectory) -> Self {
        Self {
            accounts,
            results: Arc::default(),
            snapshots: Arc::default(),
        }
    }

    pub(crate) fn snapshot(&self, student: StudentId) -> Option<StudentSnapshot> {
        self.snapshots
            .lock()
            .expect("snapshot mutex poisoned")
            .get(&student)
            .copied()
    }
}

impl ResultRepository for InMemoryResultRepository {
    fn student_exists(&self, student: StudentId) -> Result<bool, RepositoryError> {
        Ok(self.accounts.holds(AccountRole::Student, AccountId(student.0)))
    }

    fn record_result(&self, result: &AssessmentResult) -> Result<(), RepositoryError> {
        self.results
            .lock()
            .expect("result mutex poisoned")
            .push(result.clone());
        Ok(())
    }

    fn update_student_snapshot(
        &self,
        student: StudentId,
        snapshot: StudentSnapshot,
    ) -> Result<(), RepositoryError> {
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
        let guard = self.results.lock().expect("result mutex poisoned");
        Ok(guard
            .iter()
            .filter(|result| result.student_id == student)
            .cloned()
            .collect())
    }
}

/// Notifier that logs like [`LoggingNotifier`] and keeps every rendered message.
#[derive(Default, Clone)]
pub(crate) struct OutboxNotifier {
    log: LoggingNotifier,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl OutboxNotifier {
    pub(crate) fn messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().expect("outbox mutex poisoned").clone()
    }

    fn keep(&self, message: OutboundMessage) {
        self.sent
            .lock()
            .expect("outbox mutex poisoned")
            .push(message);
    }
}

impl VerificationNotifier for OutboxNotifier {
    fn send_code(
        &self,
        identity: &Identity,
        code: &VerificationCode,
        name: &str,
    ) -> Result<(), DeliveryError> {
        self.keep(code_message(identity, code, name));
        self.log.send_code(identity, code, name)
    }

    fn send_welcome(
        &self,
        identity: &Identity,
        name: &str,
        role: AccountRole,
    ) -> Result<(), DeliveryError> {
        self.keep(welcome_message(identity, name, role));
        self.log.send_welcome(identity, name, role)
    }
}

/// Starter catalog: a general pool plus a short set scoped to job 1.
pub(crate) fn seed_questions() -> Vec<QuestionSpec> {
    let general = [
        (
            101,
            "Which HTTP method is idempotent?",
            ["POST", "PUT", "PATCH", "CONNECT"],
            "PUT",
        ),
        (
            102,
            "Which data structure gives O(1) average lookup by key?",
            ["Linked list", "Hash map", "Binary heap", "Stack"],
            "Hash map",
        ),
        (
            103,
            "Which SQL clause filters grouped rows?",
            ["WHERE", "ORDER BY", "HAVING", "LIMIT"],
            "HAVING",
        ),
        (
            104,
            "Which git command creates a new commit that undoes an earlier one?",
            ["git reset", "git revert", "git stash", "git clean"],
            "git revert",
        ),
    ];
    let backend = [
        (
            201,
            "Which isolation level prevents non-repeatable reads?",
            [
                "Read uncommitted",
                "Read committed",
                "Repeatable read",
                "None",
            ],
            "Repeatable read",
        ),
        (
            202,
            "Which status code signals a missing resource?",
            ["200", "301", "404", "500"],
            "404",
        ),
    ];

    let to_question = |job: Option<JobId>| {
        move |(id, text, options, answer): (u64, &str, [&str; 4], &str)| QuestionSpec {
            id: QuestionId(id),
            text: text.to_string(),
            options: options.iter().map(|option| option.to_string()).collect(),
            correct_answer: answer.to_string(),
            active: true,
            job_id: job,
            owner_recruiter_id: None,
        }
    };

    general
        .into_iter()
        .map(to_question(None))
        .chain(backend.into_iter().map(to_question(Some(JobId(1)))))
        .collect()
}
