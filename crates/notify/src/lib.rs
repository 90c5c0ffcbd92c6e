//! Outbound account email for AeroSAMEC.
//!
//! [`Notifier`] is what the API holds: it renders the account templates,
//! builds the links against the public base URL and hands them to SMTP. When
//! SMTP is not configured the messages are only logged, which is how local
//! development runs.

pub mod email;
pub mod templates;

pub use email::{EmailConfig, EmailDelivery, EmailError};
use templates::OutgoingEmail;

/// Path of the page that consumes verification (first-login) tokens.
pub const VERIFY_EMAIL_PATH: &str = "/verificar-email";

/// Path of the page that consumes password-reset tokens.
pub const RESET_PASSWORD_PATH: &str = "/reset-password";

/// Account email sender.
#[derive(Clone)]
pub struct Notifier {
    delivery: Option<EmailDelivery>,
    base_url: String,
}

impl Notifier {
    /// `base_url` is the public URL of the web front end; a trailing slash is
    /// ignored.
    pub fn new(config: Option<EmailConfig>, base_url: &str) -> Self {
        Self {
            delivery: config.map(EmailDelivery::new),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// A notifier that never talks to SMTP.
    pub fn log_only(base_url: &str) -> Self {
        Self::new(None, base_url)
    }

    pub fn is_smtp_enabled(&self) -> bool {
        self.delivery.is_some()
    }

    /// Link carrying a verification token.
    pub fn verification_link(&self, token: &str) -> String {
        format!("{}{VERIFY_EMAIL_PATH}?token={token}", self.base_url)
    }

    /// Link carrying a password-reset token.
    pub fn reset_link(&self, token: &str) -> String {
        format!("{}{RESET_PASSWORD_PATH}?token={token}", self.base_url)
    }

    /// Welcome email with the temporary password and the activation link.
    pub async fn send_account_created(
        &self,
        to: &str,
        first_name: &str,
        temporary_password: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let email =
            templates::account_created(first_name, temporary_password, &self.verification_link(token));
        self.dispatch(to, email).await
    }

    pub async fn send_verification_resent(
        &self,
        to: &str,
        first_name: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let email = templates::verification_resent(first_name, &self.verification_link(token));
        self.dispatch(to, email).await
    }

    pub async fn send_password_reset(
        &self,
        to: &str,
        first_name: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let email = templates::password_reset(first_name, &self.reset_link(token));
        self.dispatch(to, email).await
    }

    async fn dispatch(&self, to: &str, email: OutgoingEmail) -> Result<(), EmailError> {
        match &self.delivery {
            Some(delivery) => delivery.send(to, &email).await,
            None => {
                tracing::warn!(
                    to,
                    subject = %email.subject,
                    link = %email.link_target,
                    "SMTP not configured, email not sent"
                );
                Ok(())
            }
        }
    }
}
