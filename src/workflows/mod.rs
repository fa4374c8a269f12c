pub mod assessment;
pub mod verification;
