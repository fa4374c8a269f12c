//! Verification-gated registration and skill assessment for the SkillFit platform.
//!
//! The crate holds the two pieces of the platform that carry real policy: the
//! single-use verification codes that gate account creation, and the assessment
//! engine that selects questions, scores submissions and attributes results to a
//! recruiter. Storage, mail delivery and account persistence are reached through
//! traits so the HTTP service and the tests can plug in their own collaborators.

pub mod clock;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
