use super::money::{Amount, Balance};
use crate::error::PaymentError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    #[default]
    Google,
    Email,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    It,
}

impl FromStr for Language {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::En),
            "it" => Ok(Language::It),
            _ => Err(PaymentError::validation("Language must be 'en' or 'it'")),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::En => f.write_str("en"),
            Language::It => f.write_str("it"),
        }
    }
}

/// A registered user and the personal wallet attached to it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub username: Option<String>,
    pub picture: Option<String>,
    pub password_hash: Option<String>,
    pub auth_method: AuthMethod,
    pub is_verified: bool,
    pub language: Language,
    pub wallet_balance: Balance,
    pub biometric_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// The part of a [`User`] that is safe to hand back to clients.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub username: Option<String>,
    pub picture: Option<String>,
    pub auth_method: AuthMethod,
    pub is_verified: bool,
    pub language: Language,
    pub wallet_balance: Balance,
    pub biometric_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.into(),
            name: name.into(),
            username: None,
            picture: None,
            password_hash: None,
            auth_method: AuthMethod::Google,
            is_verified: true,
            language: Language::En,
            wallet_balance: Balance::ZERO,
            biometric_enabled: false,
            created_at: now,
            updated_at: now,
            last_login: None,
        }
    }

    /// Builds an unverified e-mail/password account.
    pub fn with_password(
        email: impl Into<String>,
        name: impl Into<String>,
        username: impl Into<String>,
        password_hash: String,
        language: Language,
    ) -> Self {
        Self {
            username: Some(username.into()),
            password_hash: Some(password_hash),
            auth_method: AuthMethod::Email,
            is_verified: false,
            language,
            ..Self::new(email, name)
        }
    }

    /// Credits the personal wallet.
    pub fn deposit(&mut self, amount: Amount) {
        self.wallet_balance += amount.into();
        self.touch();
    }

    /// Debits the personal wallet if it covers `amount`.
    pub fn withdraw(&mut self, amount: Balance) -> Result<(), PaymentError> {
        if self.wallet_balance >= amount {
            self.wallet_balance -= amount;
            self.touch();
            Ok(())
        } else {
            Err(PaymentError::validation("Insufficient balance"))
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            username: self.username.clone(),
            picture: self.picture.clone(),
            auth_method: self.auth_method,
            is_verified: self.is_verified,
            language: self.language,
            wallet_balance: self.wallet_balance,
            biometric_enabled: self.biometric_enabled,
            created_at: self.created_at,
            last_login: self.last_login,
        }
    }
}
