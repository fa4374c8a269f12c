use serde::Serialize;
use tracing::{debug, info};

use super::domain::{code_ttl, AccountRole, Identity, VerificationCode};

/// Outbound delivery of verification codes and welcome notes.
///
/// Delivery is best effort. Callers log failures and carry on.
pub trait VerificationNotifier: Send + Sync {
    fn send_code(
        &self,
        identity: &Identity,
        code: &VerificationCode,
        name: &str,
    ) -> Result<(), DeliveryError>;

    fn send_welcome(
        &self,
        identity: &Identity,
        name: &str,
        role: AccountRole,
    ) -> Result<(), DeliveryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("mail transport unavailable: {0}")]
    Transport(String),
    #[error("recipient rejected: {0}")]
    Rejected(String),
}

/// Rendered mail ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub fn code_message(identity: &Identity, code: &VerificationCode, name: &str) -> OutboundMessage {
    let minutes = code_ttl().num_minutes();
    OutboundMessage {
        to: identity.to_string(),
        subject: "SkillFit - Email Verification OTP".to_string(),
        body: format!(
            "Hello {name},\n\n\
             Thank you for registering with SkillFit!\n\n\
             Your OTP for email verification is: {code}\n\n\
             This OTP will expire in {minutes} minutes.\n\n\
             If you didn't register for SkillFit, please ignore this email.\n\n\
             Best regards,\n\
             SkillFit Team",
            code = code.as_str(),
        ),
    }
}

pub fn welcome_message(identity: &Identity, name: &str, role: AccountRole) -> OutboundMessage {
    OutboundMessage {
        to: identity.to_string(),
        subject: "Welcome to SkillFit - Registration Successful!".to_string(),
        body: format!(
            "Hello {name},\n\n\
             Congratulations! Your account has been successfully registered with SkillFit as a {role}.\n\n\
             You can now:\n\
             - Take assessments and improve your skills\n\
             - View your performance and progress\n\
             - Connect with recruiters and explore job opportunities\n\n\
             We're excited to have you on board!\n\n\
             Best regards,\n\
             SkillFit Team",
            role = role.label(),
        ),
    }
}

/// Development notifier that writes rendered mail to the tracing pipeline.
///
/// Bodies, which contain live codes, are emitted at debug level only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotifier;

impl LoggingNotifier {
    fn emit(&self, message: OutboundMessage) {
        info!(to = %message.to, subject = %message.subject, "mail dispatched");
        debug!(to = %message.to, body = %message.body, "mail body");
    }
}

impl VerificationNotifier for LoggingNotifier {
    fn send_code(
        &self,
        identity: &Identity,
        code: &VerificationCode,
        name: &str,
    ) -> Result<(), DeliveryError> {
        self.emit(code_message(identity, code, name));
        Ok(())
    }

    fn send_welcome(
        &self,
        identity: &Identity,
        name: &str,
        role: AccountRole,
    ) -> Result<(), DeliveryError> {
        self.emit(welcome_message(identity, name, role));
        Ok(())
    }
}
