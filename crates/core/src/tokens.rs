//! Single-use account tokens: email verification and password reset.
//!
//! A token is random bytes rendered as hex. The plaintext travels exactly
//! once, inside the emailed link; only its SHA-256 digest is persisted, so a
//! database leak cannot be replayed against the reset endpoints.

use chrono::Duration;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::hashing::{hex_encode, sha256_hex};
use crate::types::Timestamp;

/// Random bytes in a password-reset token (64 hex chars).
pub const RESET_TOKEN_BYTES: usize = 32;

/// Random bytes in an email-verification token (48 hex chars).
pub const VERIFICATION_TOKEN_BYTES: usize = 24;

/// Random bytes in a temporary password (8 hex chars).
pub const TEMPORARY_PASSWORD_BYTES: usize = 4;

/// Lifetime of a password-reset token.
pub const RESET_TOKEN_TTL_MINS: i64 = 60;

/// Lifetime of a verification token, counted from when it was sent.
pub const VERIFICATION_TOKEN_TTL_HOURS: i64 = 24;

/// Minimum gap between two verification emails for the same account.
pub const RESEND_COOLDOWN_MINS: i64 = 10;

/// Which flow a presented token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenContext {
    /// "Forgot password" link.
    ResetPassword,
    /// Verification link sent with the temporary password.
    FirstLogin,
}

/// A freshly generated token.
pub struct GeneratedToken {
    /// Goes into the email link. Never stored.
    pub plaintext: String,
    /// SHA-256 hex digest, stored on the user row.
    pub hash: String,
}

/// Generate a token of `byte_len` random bytes.
pub fn generate_token(byte_len: usize) -> GeneratedToken {
    let plaintext = random_hex(byte_len);
    let hash = hash_token(&plaintext);
    GeneratedToken { plaintext, hash }
}

/// Digest a presented token for lookup.
pub fn hash_token(token: &str) -> String {
    sha256_hex(token.trim().as_bytes())
}

/// Generate the temporary password handed to a newly created account.
pub fn generate_temporary_password() -> String {
    random_hex(TEMPORARY_PASSWORD_BYTES)
}

/// When a reset token issued at `now` stops being accepted.
pub fn reset_token_expiry(now: Timestamp) -> Timestamp {
    now + Duration::minutes(RESET_TOKEN_TTL_MINS)
}

/// Whether a verification token sent at `sent_at` is past its lifetime.
pub fn verification_token_expired(sent_at: Timestamp, now: Timestamp) -> bool {
    now - sent_at > Duration::hours(VERIFICATION_TOKEN_TTL_HOURS)
}

/// Minutes (rounded up) the caller must still wait before another
/// verification email may be sent, or `None` when sending is allowed.
pub fn resend_wait_minutes(last_sent: Option<Timestamp>, now: Timestamp) -> Option<i64> {
    let last_sent = last_sent?;
    let cooldown = Duration::minutes(RESEND_COOLDOWN_MINS);
    let elapsed = now - last_sent;
    if elapsed >= cooldown {
        return None;
    }
    let remaining_secs = (cooldown - elapsed).num_seconds();
    Some((remaining_secs + 59) / 60)
}

fn random_hex(byte_len: usize) -> String {
    let mut bytes = vec![0u8; byte_len];
    rand::rng().fill_bytes(&mut bytes);
    hex_encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn generated_token_has_expected_length_and_hash() {
        let token = generate_token(RESET_TOKEN_BYTES);
        assert_eq!(token.plaintext.len(), RESET_TOKEN_BYTES * 2);
        assert_eq!(token.hash, hash_token(&token.plaintext));
        assert_eq!(token.hash.len(), 64);
    }

    #[test]
    fn tokens_are_unique() {
        let a = generate_token(VERIFICATION_TOKEN_BYTES);
        let b = generate_token(VERIFICATION_TOKEN_BYTES);
        assert_ne!(a.plaintext, b.plaintext);
    }

    #[test]
    fn hash_ignores_surrounding_whitespace() {
        assert_eq!(hash_token(" abc \n"), hash_token("abc"));
    }

    #[test]
    fn temporary_password_is_eight_hex_chars() {
        let pw = generate_temporary_password();
        assert_eq!(pw.len(), 8);
        assert!(pw.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn reset_token_expires_after_an_hour() {
        let now = Utc::now();
        assert_eq!(reset_token_expiry(now) - now, Duration::hours(1));
    }

    #[test]
    fn verification_token_lifetime_is_24_hours() {
        let sent = Utc::now();
        assert!(!verification_token_expired(sent, sent + Duration::hours(23)));
        assert!(verification_token_expired(sent, sent + Duration::hours(25)));
    }

    #[test]
    fn resend_allowed_without_previous_send() {
        assert_eq!(resend_wait_minutes(None, Utc::now()), None);
    }

    #[test]
    fn resend_cooldown_rounds_remaining_minutes_up() {
        let now = Utc::now();
        let last = now - Duration::seconds(4 * 60 + 30);
        assert_eq!(resend_wait_minutes(Some(last), now), Some(6));

        let last = now - Duration::minutes(10);
        assert_eq!(resend_wait_minutes(Some(last), now), None);
    }

    #[test]
    fn token_context_serializes_screaming_case() {
        let json = serde_json::to_string(&TokenContext::ResetPassword).unwrap();
        assert_eq!(json, "\"RESET_PASSWORD\"");
        let json = serde_json::to_string(&TokenContext::FirstLogin).unwrap();
        assert_eq!(json, "\"FIRST_LOGIN\"");
    }
}
