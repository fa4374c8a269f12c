use std::sync::Mutex;

use rand::rngs::OsRng;
use rand::Rng;

use super::domain::{VerificationCode, CODE_LENGTH};

/// Produces fresh verification codes.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> VerificationCode;
}

/// Draws every digit from the operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRngCodeGenerator;

impl CodeGenerator for OsRngCodeGenerator {
    fn generate(&self) -> VerificationCode {
        let mut rng = OsRng;
        let code = (0..CODE_LENGTH)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        VerificationCode(code)
    }
}

/// Deterministic generator for demos and tests.
///
/// Returns the configured codes in order, wrapping around at the end. Building one
/// from an empty list yields `None`.
#[derive(Debug)]
pub struct SequenceCodeGenerator {
    codes: Vec<VerificationCode>,
    index: Mutex<usize>,
}

impl SequenceCodeGenerator {
    pub fn new<I, S>(codes: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: Vec<VerificationCode> = codes
            .into_iter()
            .map(|code| VerificationCode(code.into()))
            .collect();
        if codes.is_empty() {
            return None;
        }
        Some(Self {
            codes,
            index: Mutex::new(0),
        })
    }
}

impl CodeGenerator for SequenceCodeGenerator {
    fn generate(&self) -> VerificationCode {
        let mut index = self.index.lock().expect("sequence mutex poisoned");
        let code = self.codes[*index % self.codes.len()].clone();
        *index += 1;
        code
    }
}
