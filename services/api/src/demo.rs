use crate::infra::{
    InMemoryAccountDirectory, InMemoryJobDirectory, InMemoryQuestionCatalog,
    InMemoryResultRepository, OutboxNotifier,
};
use chrono::SecondsFormat;
use clap::Args;
use skillfit::error::AppError;
use skillfit::workflows::assessment::{
    AssessmentService, JobId, QuestionSelector, StudentId, Submission,
};
use skillfit::workflows::verification::{
    AccountRole, RegistrationRequest, RegistrationService, ShardedVerificationStore,
    VerificationService, CODE_LENGTH,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Email the demo student registers with.
    #[arg(long, default_value = "demo.student@example.com")]
    pub(crate) email: String,
    /// Display name for the demo student.
    #[arg(long, default_value = "Demo Student")]
    pub(crate) name: String,
    /// Job to take the assessment for. Job 1 has its own questions; others use the general pool.
    #[arg(long)]
    pub(crate) job_id: Option<u64>,
    /// How many questions the student answers correctly (defaults to all).
    #[arg(long)]
    pub(crate) correct: Option<usize>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        email,
        name,
        job_id,
        correct,
    } = args;
    let job_id = job_id.map(JobId);

    println!("SkillFit demo");

    let outbox = OutboxNotifier::default();
    let accounts = InMemoryAccountDirectory::default();
    let verification = Arc::new(VerificationService::new(
        Arc::new(ShardedVerificationStore::default()),
        Arc::new(outbox.clone()),
    ));
    let registration = RegistrationService::new(verification, Arc::new(accounts.clone()));

    let pending = match registration.register(
        AccountRole::Student,
        RegistrationRequest {
            email: Some(email.clone()),
            name: Some(name),
            password: None,
        },
    ) {
        Ok(pending) => pending,
        Err(err) => {
            println!("  Registration rejected: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Code issued to {} (expires {})",
        pending.email,
        pending.expires_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    let Some(code) = code_from_outbox(&outbox) else {
        println!("  No verification mail captured");
        return Ok(());
    };
    println!("- Mailbox received code {}", mask(&code));

    let account = match registration.confirm(AccountRole::Student, Some(email), Some(code)) {
        Ok(account) => account,
        Err(err) => {
            println!("  Verification failed: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Account {} created for {} ({})",
        account.id.0,
        account.name,
        account.role.label()
    );

    let catalog = Arc::new(InMemoryQuestionCatalog::seeded());
    let results = Arc::new(InMemoryResultRepository::new(accounts));
    let assessment = AssessmentService::new(
        catalog.clone(),
        Arc::new(InMemoryJobDirectory::seeded()),
        results.clone(),
    );

    let sheet = match assessment.questions(job_id) {
        Ok(sheet) => sheet,
        Err(err) => {
            println!("  Questions unavailable: {}", err);
            return Ok(());
        }
    };
    println!("\nAssessment ({:?} questions)", sheet.source);
    for question in &sheet.questions {
        println!("  [{}] {}", question.id, question.text);
        println!("      options: {}", question.options.join(" | "));
    }

    let key = match QuestionSelector::new(catalog).select(job_id) {
        Ok(selected) => selected.answer_key,
        Err(err) => {
            println!("  Answer key unavailable: {}", err);
            return Ok(());
        }
    };
    let correct = correct.unwrap_or(key.len());
    let submission = Submission::with_answers(key.iter().enumerate().map(
        |(index, (id, answer))| {
            let answer = if index < correct {
                answer.to_string()
            } else {
                "I don't know".to_string()
            };
            (id.to_string(), answer)
        },
    ));

    let student = StudentId(account.id.0);
    let outcome = match assessment.submit(student, job_id, submission) {
        Ok(outcome) => outcome,
        Err(err) => {
            println!("  Submission rejected: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Scored {}/{} -> {}",
        outcome.result.score, outcome.result.total, outcome.result.level
    );
    match outcome.result.recruiter_id {
        Some(recruiter) => println!("  Attributed to recruiter {}", recruiter.0),
        None => println!("  General assessment, no recruiter attribution"),
    }
    for review in &outcome.reviews {
        let verdict = if review.is_correct { "correct" } else { "wrong" };
        println!(
            "    - [{}] {} (answered {:?}, expected {:?})",
            review.question_id,
            verdict,
            review.submitted.as_deref().unwrap_or("-"),
            review.correct_answer
        );
    }

    if let Some(snapshot) = results.snapshot(student) {
        println!(
            "  Student profile now shows score {} / {}",
            snapshot.score, snapshot.level
        );
    }
    match assessment.history(student) {
        Ok(history) => println!("  {} result(s) on record", history.len()),
        Err(err) => println!("  History unavailable: {}", err),
    }

    Ok(())
}

fn code_from_outbox(outbox: &OutboxNotifier) -> Option<String> {
    outbox.messages().into_iter().rev().find_map(|message| {
        message
            .body
            .split_whitespace()
            .find(|word| word.len() == CODE_LENGTH && word.chars().all(|c| c.is_ascii_digit()))
            .map(str::to_string)
    })
}

fn mask(code: &str) -> String {
    let visible = code.len().saturating_sub(2);
    format!("{}{}", "*".repeat(visible), &code[visible..])
}
