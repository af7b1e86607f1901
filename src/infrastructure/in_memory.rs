use crate::domain::competition::Competition;
use crate::domain::payment::MatchdayPayment;
use crate::domain::ports::{
    CompetitionStore, MatchdayPaymentStore, OtpStore, SessionStore, Stores, TransactionStore,
    UnitOfWork, UserStore, Write,
};
use crate::domain::session::{OtpRecord, Session};
use crate::domain::transaction::Transaction;
use crate::domain::user::User;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for users, keyed by user id.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn store(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.username.as_deref() == Some(username))
            .cloned())
    }
}

/// A thread-safe in-memory store for sessions, keyed by token.
#[derive(Default, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn store(&self, session: Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.token.clone(), session);
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(token).cloned())
    }

    async fn delete_for_user(&self, user_id: &str) -> Result<usize> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);
        Ok(before - sessions.len())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        Ok(before - sessions.len())
    }
}

/// A thread-safe in-memory store for one-time codes, keyed by e-mail.
#[derive(Default, Clone)]
pub struct InMemoryOtpStore {
    otps: Arc<RwLock<HashMap<String, OtpRecord>>>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn store(&self, otp: OtpRecord) -> Result<()> {
        let mut otps = self.otps.write().await;
        otps.insert(otp.email.clone(), otp);
        Ok(())
    }

    async fn get(&self, email: &str) -> Result<Option<OtpRecord>> {
        let otps = self.otps.read().await;
        Ok(otps.get(email).cloned())
    }
}

/// A thread-safe in-memory store for competitions, keyed by competition id.
#[derive(Default, Clone)]
pub struct InMemoryCompetitionStore {
    competitions: Arc<RwLock<HashMap<String, Competition>>>,
}

impl InMemoryCompetitionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompetitionStore for InMemoryCompetitionStore {
    async fn store(&self, competition: Competition) -> Result<()> {
        let mut competitions = self.competitions.write().await;
        competitions.insert(competition.id.clone(), competition);
        Ok(())
    }

    async fn get(&self, competition_id: &str) -> Result<Option<Competition>> {
        let competitions = self.competitions.read().await;
        Ok(competitions.get(competition_id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Competition>> {
        let competitions = self.competitions.read().await;
        Ok(competitions.values().cloned().collect())
    }
}

/// An append-only in-memory transaction log.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    transactions: Arc<RwLock<HashMap<String, Transaction>>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn store(&self, tx: Transaction) -> Result<()> {
        let mut transactions = self.transactions.write().await;
        transactions.insert(tx.id.clone(), tx);
        Ok(())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_competition(&self, competition_id: &str) -> Result<Vec<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions
            .values()
            .filter(|t| t.competition_id.as_deref() == Some(competition_id))
            .cloned()
            .collect())
    }
}

/// In-memory matchday payments, ordered by `competition/user/matchday` key.
#[derive(Default, Clone)]
pub struct InMemoryMatchdayPaymentStore {
    payments: Arc<RwLock<BTreeMap<String, MatchdayPayment>>>,
}

impl InMemoryMatchdayPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MatchdayPaymentStore for InMemoryMatchdayPaymentStore {
    async fn store(&self, payment: MatchdayPayment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.key(), payment);
        Ok(())
    }

    async fn find(&self, competition_id: &str, user_id: &str) -> Result<Vec<MatchdayPayment>> {
        let prefix = format!("{competition_id}/{user_id}/");
        let payments = self.payments.read().await;
        Ok(payments
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn find_by_competition(&self, competition_id: &str) -> Result<Vec<MatchdayPayment>> {
        let prefix = format!("{competition_id}/");
        let payments = self.payments.read().await;
        Ok(payments
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(_, p)| p.clone())
            .collect())
    }
}

/// Applies batches to the in-memory stores it was built from.
///
/// Write locks are taken in a fixed order (users, competitions,
/// transactions, payments) and held until the whole batch is applied, so
/// readers never observe half a batch.
#[derive(Clone)]
pub struct InMemoryUnitOfWork {
    users: InMemoryUserStore,
    competitions: InMemoryCompetitionStore,
    transactions: InMemoryTransactionStore,
    payments: InMemoryMatchdayPaymentStore,
}

impl InMemoryUnitOfWork {
    pub fn new(
        users: InMemoryUserStore,
        competitions: InMemoryCompetitionStore,
        transactions: InMemoryTransactionStore,
        payments: InMemoryMatchdayPaymentStore,
    ) -> Self {
        Self {
            users,
            competitions,
            transactions,
            payments,
        }
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn commit(&self, writes: Vec<Write>) -> Result<()> {
        let mut users = self.users.users.write().await;
        let mut competitions = self.competitions.competitions.write().await;
        let mut transactions = self.transactions.transactions.write().await;
        let mut payments = self.payments.payments.write().await;

        for write in writes {
            match write {
                Write::User(user) => {
                    users.insert(user.id.clone(), user);
                }
                Write::Competition(competition) => {
                    competitions.insert(competition.id.clone(), competition);
                }
                Write::Transaction(tx) => {
                    transactions.insert(tx.id.clone(), tx);
                }
                Write::MatchdayPayment(payment) => {
                    payments.insert(payment.key(), payment);
                }
            }
        }
        Ok(())
    }
}

impl Stores {
    /// Volatile stores; everything is lost when the process exits.
    pub fn in_memory() -> Self {
        let users = InMemoryUserStore::new();
        let competitions = InMemoryCompetitionStore::new();
        let transactions = InMemoryTransactionStore::new();
        let payments = InMemoryMatchdayPaymentStore::new();
        let unit_of_work = InMemoryUnitOfWork::new(
            users.clone(),
            competitions.clone(),
            transactions.clone(),
            payments.clone(),
        );

        Self {
            guard: Arc::default(),
            users: Arc::new(users),
            sessions: Arc::new(InMemorySessionStore::new()),
            otps: Arc::new(InMemoryOtpStore::new()),
            competitions: Arc::new(competitions),
            transactions: Arc::new(transactions),
            payments: Arc::new(payments),
            unit_of_work: Arc::new(unit_of_work),
        }
    }
}
