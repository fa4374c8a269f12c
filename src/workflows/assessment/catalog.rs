use super::domain::{AnswerKey, JobId, QuestionId, QuestionSpec, RecruiterId};

/// Read-only access to the persisted question catalog.
///
/// Every method returns active questions only, in insertion order.
pub trait QuestionCatalog: Send + Sync {
    fn active_for_job(&self, job: JobId) -> Result<Vec<QuestionSpec>, CatalogError>;
    fn active_general(&self) -> Result<Vec<QuestionSpec>, CatalogError>;
    /// Active questions across every scope.
    fn active_count(&self) -> Result<usize, CatalogError>;
}

/// Read-only view of job postings.
pub trait JobDirectory: Send + Sync {
    /// `Ok(None)` covers both an unknown job and a job nobody owns.
    fn recruiter_for_job(&self, job: JobId) -> Result<Option<RecruiterId>, CatalogError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

const BUILT_IN: [(u64, &str, [&str; 4], &str); 4] = [
    (
        1,
        "Which language is used for backend development?",
        ["HTML", "Java", "CSS", "Bootstrap"],
        "Java",
    ),
    (
        2,
        "React is a ______ library?",
        ["Backend", "Frontend", "Database", "Testing"],
        "Frontend",
    ),
    (
        3,
        "Spring Boot is written in which language?",
        ["Python", "C#", "Java", "Kotlin"],
        "Java",
    ),
    (
        4,
        "Which database is NoSQL?",
        ["MySQL", "MongoDB", "Oracle", "PostgreSQL"],
        "MongoDB",
    ),
];

/// Fixed fallback served when the catalog has nothing for the requested scope.
///
/// Ids 1-4 are not reserved in the catalog, so they can collide with real questions.
pub fn built_in_questions() -> Vec<QuestionSpec> {
    BUILT_IN
        .iter()
        .map(|(id, text, options, answer)| QuestionSpec {
            id: QuestionId(*id),
            text: (*text).to_string(),
            options: options.iter().map(|option| (*option).to_string()).collect(),
            correct_answer: (*answer).to_string(),
            active: true,
            job_id: None,
            owner_recruiter_id: None,
        })
        .collect()
}

/// Answer key paired with [`built_in_questions`].
pub fn built_in_answer_key() -> AnswerKey {
    [
        (QuestionId(1), "Java"),
        (QuestionId(2), "Frontend"),
        (QuestionId(3), "Java"),
        (QuestionId(4), "MongoDB"),
    ]
    .into_iter()
    .map(|(id, answer)| (id, answer.to_string()))
    .collect()
}
