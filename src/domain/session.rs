use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A login session identified by an opaque bearer token.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: String, user_id: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            token,
            user_id: user_id.into(),
            expires_at: now + ttl,
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A one-time code sent to confirm an e-mail address.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct OtpRecord {
    pub email: String,
    pub otp_code: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub verified: bool,
}

impl OtpRecord {
    pub fn new(email: impl Into<String>, otp_code: String, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            email: email.into(),
            otp_code,
            expires_at: now + ttl,
            created_at: now,
            verified: false,
        }
    }

    /// True when `code` can still be redeemed at `now`.
    pub fn accepts(&self, code: &str, now: DateTime<Utc>) -> bool {
        !self.verified && self.expires_at > now && self.otp_code == code
    }
}
