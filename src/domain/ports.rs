use super::competition::Competition;
use super::payment::MatchdayPayment;
use super::session::{OtpRecord, Session};
use super::transaction::Transaction;
use super::user::User;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn store(&self, user: User) -> Result<()>;
    async fn get(&self, user_id: &str) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn store(&self, session: Session) -> Result<()>;
    async fn get(&self, token: &str) -> Result<Option<Session>>;
    /// Removes every session of `user_id`, returning how many were dropped.
    async fn delete_for_user(&self, user_id: &str) -> Result<usize>;
    /// Removes every session that expired before `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize>;
}

/// At most one OTP is kept per e-mail address; storing replaces it.
#[async_trait]
pub trait OtpStore: Send + Sync {
    async fn store(&self, otp: OtpRecord) -> Result<()>;
    async fn get(&self, email: &str) -> Result<Option<OtpRecord>>;
}

#[async_trait]
pub trait CompetitionStore: Send + Sync {
    async fn store(&self, competition: Competition) -> Result<()>;
    async fn get(&self, competition_id: &str) -> Result<Option<Competition>>;
    async fn get_all(&self) -> Result<Vec<Competition>>;

    async fn find_by_invite_code(&self, invite_code: &str) -> Result<Option<Competition>> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .find(|c| c.invite_code == invite_code))
    }

    async fn find_by_participant(&self, user_id: &str) -> Result<Vec<Competition>> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter(|c| c.is_participant(user_id))
            .collect())
    }
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn store(&self, tx: Transaction) -> Result<()>;
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Transaction>>;
    async fn find_by_competition(&self, competition_id: &str) -> Result<Vec<Transaction>>;
}

#[async_trait]
pub trait MatchdayPaymentStore: Send + Sync {
    async fn store(&self, payment: MatchdayPayment) -> Result<()>;
    async fn find(&self, competition_id: &str, user_id: &str) -> Result<Vec<MatchdayPayment>>;
    async fn find_by_competition(&self, competition_id: &str) -> Result<Vec<MatchdayPayment>>;
}

/// One document upsert inside a [`UnitOfWork`].
#[derive(Debug, Clone)]
pub enum Write {
    User(User),
    Competition(Competition),
    Transaction(Transaction),
    MatchdayPayment(MatchdayPayment),
}

/// Applies a batch of upserts atomically: either every write lands or none.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn commit(&self, writes: Vec<Write>) -> Result<()>;
}

/// Delivers one-time codes to users.
#[async_trait]
pub trait OtpNotifier: Send + Sync {
    async fn send_otp(&self, email: &str, name: &str, otp_code: &str) -> Result<()>;
}

pub type UserStoreRef = Arc<dyn UserStore>;
pub type SessionStoreRef = Arc<dyn SessionStore>;
pub type OtpStoreRef = Arc<dyn OtpStore>;
pub type CompetitionStoreRef = Arc<dyn CompetitionStore>;
pub type TransactionStoreRef = Arc<dyn TransactionStore>;
pub type MatchdayPaymentStoreRef = Arc<dyn MatchdayPaymentStore>;
pub type UnitOfWorkRef = Arc<dyn UnitOfWork>;
pub type OtpNotifierRef = Arc<dyn OtpNotifier>;

/// Every store the services need, sharing one backend.
///
/// Any read-modify-write that touches a balance, a roster or a uniqueness
/// check runs while holding `guard`, so concurrent requests never act on the
/// same stale snapshot. Writes that must land together go through
/// [`Stores::commit`].
#[derive(Clone)]
pub struct Stores {
    pub guard: Arc<Mutex<()>>,
    pub users: UserStoreRef,
    pub sessions: SessionStoreRef,
    pub otps: OtpStoreRef,
    pub competitions: CompetitionStoreRef,
    pub transactions: TransactionStoreRef,
    pub payments: MatchdayPaymentStoreRef,
    pub unit_of_work: UnitOfWorkRef,
}

impl Stores {
    pub async fn commit(&self, writes: Vec<Write>) -> Result<()> {
        self.unit_of_work.commit(writes).await
    }
}
