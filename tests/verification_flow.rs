use chrono::{Duration, TimeZone, Utc};
use skillfit::clock::ManualClock;
use skillfit::workflows::verification::{
    code_ttl, spawn_sweeper, Identity, LoggingNotifier, SequenceCodeGenerator,
    ShardedVerificationStore, VerificationFailure, VerificationService,
};
use std::sync::Arc;
use std::thread;

type Service = VerificationService<ShardedVerificationStore, LoggingNotifier>;

fn service_at_noon(codes: &[&str]) -> (Arc<Service>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 9, 24, 12, 0, 0)
            .single()
            .expect("valid start instant"),
    ));
    let service = Arc::new(VerificationService::with_parts(
        Arc::new(ShardedVerificationStore::new(8)),
        Arc::new(LoggingNotifier),
        clock.clone(),
        Arc::new(
            SequenceCodeGenerator::new(codes.iter().copied()).expect("codes supplied"),
        ),
    ));
    (service, clock)
}

#[test]
fn reissue_then_verify_lifecycle() {
    let (service, clock) = service_at_noon(&["100001", "100002"]);
    let who = Identity::new("kai@example.com");

    let first = service.issue(&who, "Kai", None).expect("first code issued");
    let second = service.issue(&who, "Kai R.", None).expect("second code issued");
    assert_ne!(first.code, second.code);
    assert_eq!(service.read_name(&who).as_deref(), Some("Kai R."));

    let stale = service.verify(&who, first.code.as_str());
    assert_eq!(stale, Err(VerificationFailure::Invalid));

    clock.advance(code_ttl());
    let payload = service
        .verify_and_consume(&who, second.code.as_str())
        .expect("still valid at the expiry instant");
    assert_eq!(payload.name, "Kai R.");
    assert!(payload.secret.is_none());
    assert_eq!(
        service.verify(&who, second.code.as_str()),
        Err(VerificationFailure::NotFound)
    );
}

#[test]
fn recruiter_secret_survives_only_as_a_hash() {
    let (service, _clock) = service_at_noon(&["555555"]);
    let who = Identity::new("hiring@example.com");

    service
        .issue(&who, "Hiring Desk", Some("correct horse"))
        .expect("code issued");
    let stored = service.read_secret(&who).expect("secret pending");
    assert!(!stored.as_phc().contains("correct horse"));
    assert!(stored.verify("correct horse"));
    assert!(!stored.verify("Correct horse"));
}

#[test]
fn distinct_identities_progress_in_parallel() {
    let codes: Vec<String> = (0..32).map(|n| format!("{:06}", 200000 + n)).collect();
    let code_refs: Vec<&str> = codes.iter().map(String::as_str).collect();
    let (service, _clock) = service_at_noon(&code_refs);

    let issued: Vec<(Identity, String)> = (0..32)
        .map(|n| {
            let who = Identity::new(format!("user{n}@example.com"));
            let issued = service.issue(&who, "User", None).expect("code issued");
            (who, issued.code.as_str().to_string())
        })
        .collect();

    let handles: Vec<_> = issued
        .into_iter()
        .map(|(who, code)| {
            let service = service.clone();
            thread::spawn(move || service.verify(&who, &code))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("thread completes"), Ok(()));
    }
    assert_eq!(service.pending_count(), 0);
}

#[test]
fn expired_entry_reports_expired_then_not_found() {
    let (service, clock) = service_at_noon(&["777777"]);
    let who = Identity::new("late@example.com");
    service.issue(&who, "Late", None).expect("code issued");

    clock.advance(code_ttl() + Duration::seconds(1));
    assert_eq!(service.verify(&who, "777777"), Err(VerificationFailure::Expired));
    assert_eq!(service.verify(&who, "777777"), Err(VerificationFailure::NotFound));
}

#[tokio::test]
async fn sweeper_evicts_abandoned_codes() {
    let (service, clock) = service_at_noon(&["123123", "321321"]);
    service
        .issue(&Identity::new("gone@example.com"), "Gone", None)
        .expect("code issued");
    clock.advance(Duration::minutes(10));
    service
        .issue(&Identity::new("fresh@example.com"), "Fresh", None)
        .expect("code issued");
    assert_eq!(service.pending_count(), 2);

    let handle = spawn_sweeper(service.clone(), std::time::Duration::from_millis(10));
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    handle.abort();

    assert_eq!(service.pending_count(), 1);
    assert_eq!(
        service.read_name(&Identity::new("fresh@example.com")).as_deref(),
        Some("Fresh")
    );
}
