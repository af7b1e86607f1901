use crate::config::AuthConfig;
use crate::domain::ports::{OtpNotifierRef, Stores};
use crate::domain::session::{OtpRecord, Session};
use crate::domain::user::{AuthMethod, Language, User, UserProfile};
use crate::error::{PaymentError, Result};
use crate::infrastructure::credentials;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp_code: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendOtpRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct OtpSentResponse {
    pub message: String,
    pub email: String,
    pub otp_sent: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub session_token: String,
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(PaymentError::validation("Invalid email address")),
    }
}

/// Accounts, one-time codes and sessions.
pub struct AuthService {
    stores: Stores,
    notifier: OtpNotifierRef,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(stores: Stores, notifier: OtpNotifierRef, config: AuthConfig) -> Self {
        Self {
            stores,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Registers an unverified e-mail account and sends it a code.
    pub async fn signup(&self, req: SignupRequest) -> Result<OtpSentResponse> {
        let email = normalize_email(&req.email)?;
        let username = req.username.trim().to_string();
        let name = req.name.trim().to_string();
        if username.is_empty() {
            return Err(PaymentError::validation("Username is required"));
        }
        if name.is_empty() {
            return Err(PaymentError::validation("Name is required"));
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(PaymentError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user = {
            let _guard = self.stores.guard.lock().await;
            if self.stores.users.find_by_email(&email).await?.is_some() {
                return Err(PaymentError::validation("Email already registered"));
            }
            if self.stores.users.find_by_username(&username).await?.is_some() {
                return Err(PaymentError::validation("Username already taken"));
            }
            let user = User::with_password(
                email.clone(),
                name,
                username,
                credentials::hash_password(&req.password),
                req.language,
            );
            self.stores.users.store(user.clone()).await?;
            user
        };
        info!(user_id = %user.id, "account created, awaiting verification");

        self.issue_otp(&user).await?;
        Ok(OtpSentResponse {
            message: "Account created. Check your email for the verification code".into(),
            email,
            otp_sent: true,
        })
    }

    pub async fn resend_otp(&self, req: ResendOtpRequest) -> Result<OtpSentResponse> {
        let email = normalize_email(&req.email)?;
        let user = self
            .stores
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| PaymentError::not_found("User not found"))?;
        if user.is_verified {
            return Err(PaymentError::validation("Account already verified"));
        }
        self.issue_otp(&user).await?;
        Ok(OtpSentResponse {
            message: "Verification code sent".into(),
            email,
            otp_sent: true,
        })
    }

    async fn issue_otp(&self, user: &User) -> Result<()> {
        let code = credentials::generate_otp();
        self.stores
            .otps
            .store(OtpRecord::new(user.email.clone(), code.clone(), self.config.otp_ttl))
            .await?;
        self.notifier.send_otp(&user.email, &user.name, &code).await
    }

    /// Redeems the pending code for `email`, verifies the account and logs it in.
    pub async fn verify_otp(&self, req: VerifyOtpRequest) -> Result<AuthResponse> {
        let email = normalize_email(&req.email)?;
        let code = req.otp_code.trim();

        let user = {
            let _guard = self.stores.guard.lock().await;
            let mut otp = match self.stores.otps.get(&email).await? {
                Some(otp) if otp.accepts(code, Utc::now()) => otp,
                _ => {
                    warn!(%email, "rejected OTP");
                    return Err(PaymentError::validation("Invalid or expired OTP"));
                }
            };
            let mut user = self
                .stores
                .users
                .find_by_email(&email)
                .await?
                .ok_or_else(|| PaymentError::not_found("User not found"))?;

            otp.verified = true;
            self.stores.otps.store(otp).await?;

            user.is_verified = true;
            user.last_login = Some(Utc::now());
            user.touch();
            self.stores.users.store(user.clone()).await?;
            user
        };
        info!(user_id = %user.id, "account verified");

        self.open_session(user).await
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse> {
        let email = normalize_email(&req.email)
            .map_err(|_| PaymentError::unauthorized("Invalid email or password"))?;

        let user = {
            let _guard = self.stores.guard.lock().await;
            let mut user = match self.stores.users.find_by_email(&email).await? {
                Some(user)
                    if user.auth_method == AuthMethod::Email
                        && user
                            .password_hash
                            .as_deref()
                            .is_some_and(|h| credentials::verify_password(&req.password, h)) =>
                {
                    user
                }
                _ => {
                    warn!(%email, "failed login");
                    return Err(PaymentError::unauthorized("Invalid email or password"));
                }
            };
            if !user.is_verified {
                return Err(PaymentError::forbidden("Please verify your email first"));
            }
            user.last_login = Some(Utc::now());
            user.touch();
            self.stores.users.store(user.clone()).await?;
            user
        };

        self.open_session(user).await
    }

    async fn open_session(&self, user: User) -> Result<AuthResponse> {
        let pruned = self.stores.sessions.delete_expired(Utc::now()).await?;
        if pruned > 0 {
            debug!(pruned, "expired sessions removed");
        }

        let session = Session::new(
            credentials::generate_session_token(),
            user.id.clone(),
            self.config.session_ttl,
        );
        let session_token = session.token.clone();
        self.stores.sessions.store(session).await?;
        debug!(user_id = %user.id, "session opened");

        Ok(AuthResponse {
            user: user.profile(),
            session_token,
        })
    }

    /// Resolves a bearer token to its user.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<User> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PaymentError::unauthorized("No session token provided"))?;

        let session = match self.stores.sessions.get(token).await? {
            Some(session) if !session.is_expired(Utc::now()) => session,
            _ => return Err(PaymentError::unauthorized("Invalid or expired session")),
        };

        self.stores
            .users
            .get(&session.user_id)
            .await?
            .ok_or_else(|| PaymentError::unauthorized("User not found"))
    }

    /// Ends every session of the user.
    pub async fn logout(&self, user: &User) -> Result<()> {
        let removed = self.stores.sessions.delete_for_user(&user.id).await?;
        info!(user_id = %user.id, removed, "logged out");
        Ok(())
    }

    pub async fn update_language(&self, user: &User, language: &str) -> Result<()> {
        let language: Language = language.parse()?;
        self.update_user(&user.id, |u| u.language = language).await
    }

    pub async fn set_biometric(&self, user: &User, enabled: bool) -> Result<()> {
        self.update_user(&user.id, |u| u.biometric_enabled = enabled)
            .await
    }

    /// Applies `change` to the freshest copy of the user.
    async fn update_user(&self, user_id: &str, change: impl FnOnce(&mut User)) -> Result<()> {
        let _guard = self.stores.guard.lock().await;
        let mut user = self
            .stores
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("User not found"))?;
        change(&mut user);
        user.touch();
        self.stores.users.store(user).await
    }
}
