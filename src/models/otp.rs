use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

pub const OTP_LENGTH: usize = 6;

/// Password-reset challenge embedded on the user document.
///
/// Code and expiry live in one sub-document so they are always set or
/// cleared together.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OtpChallenge {
    pub code: String,
    pub expires_at: BsonDateTime,
    pub created_at: BsonDateTime,
}

impl OtpChallenge {
    pub fn new(code: impl Into<String>, issued_at: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            code: code.into(),
            expires_at: BsonDateTime::from_chrono(issued_at + ttl),
            created_at: BsonDateTime::from_chrono(issued_at),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at.to_chrono()
    }

    pub fn accepts(&self, code: &str, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && self.code == code
    }
}

/// Six ASCII digits, nothing else.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == OTP_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}
