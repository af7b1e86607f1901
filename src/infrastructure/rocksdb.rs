use crate::domain::competition::Competition;
use crate::domain::payment::MatchdayPayment;
use crate::domain::ports::{
    CompetitionStore, MatchdayPaymentStore, OtpStore, SessionStore, Stores, TransactionStore,
    UnitOfWork, UserStore, Write,
};
use crate::domain::session::{OtpRecord, Session};
use crate::domain::transaction::Transaction;
use crate::domain::user::User;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

pub const CF_USERS: &str = "users";
pub const CF_SESSIONS: &str = "sessions";
pub const CF_OTPS: &str = "otps";
pub const CF_COMPETITIONS: &str = "competitions";
pub const CF_TRANSACTIONS: &str = "transactions";
pub const CF_MATCHDAY_PAYMENTS: &str = "matchday_payments";

const COLUMN_FAMILIES: [&str; 6] = [
    CF_USERS,
    CF_SESSIONS,
    CF_OTPS,
    CF_COMPETITIONS,
    CF_TRANSACTIONS,
    CF_MATCHDAY_PAYMENTS,
];

/// A persistent store implementation using RocksDB.
///
/// Every document kind lives in its own column family, keyed by its string
/// id and stored as JSON. `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at `path`, creating any missing
    /// column family.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    /// One handle per document kind, all backed by this database.
    pub fn stores(&self) -> Stores {
        Stores {
            guard: Arc::default(),
            users: Arc::new(self.clone()),
            sessions: Arc::new(self.clone()),
            otps: Arc::new(self.clone()),
            competitions: Arc::new(self.clone()),
            transactions: Arc::new(self.clone()),
            payments: Arc::new(self.clone()),
            unit_of_work: Arc::new(self.clone()),
        }
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| PaymentError::internal(format!("{name} column family not found")))
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, key: &str, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key.as_bytes(), bytes)?;
        Ok(())
    }

    fn batch_json<T: Serialize>(
        &self,
        batch: &mut WriteBatch,
        cf_name: &str,
        key: &str,
        value: &T,
    ) -> Result<()> {
        let cf = self.cf(cf_name)?;
        batch.put_cf(cf, key.as_bytes(), serde_json::to_vec(value)?);
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &str) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_pinned_cf(cf, key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Decodes every value whose key starts with `prefix` (all values when empty).
    fn scan_json<T: DeserializeOwned>(&self, cf_name: &str, prefix: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mode = if prefix.is_empty() {
            IteratorMode::Start
        } else {
            IteratorMode::From(prefix.as_bytes(), Direction::Forward)
        };

        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, mode) {
            let (key, value) = item?;
            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }
}

#[async_trait]
impl UserStore for RocksDBStore {
    async fn store(&self, user: User) -> Result<()> {
        self.put_json(CF_USERS, &user.id, &user)
    }

    async fn get(&self, user_id: &str) -> Result<Option<User>> {
        self.get_json(CF_USERS, user_id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users: Vec<User> = self.scan_json(CF_USERS, "")?;
        Ok(users.into_iter().find(|u| u.email == email))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let users: Vec<User> = self.scan_json(CF_USERS, "")?;
        Ok(users
            .into_iter()
            .find(|u| u.username.as_deref() == Some(username)))
    }
}

#[async_trait]
impl SessionStore for RocksDBStore {
    async fn store(&self, session: Session) -> Result<()> {
        self.put_json(CF_SESSIONS, &session.token, &session)
    }

    async fn get(&self, token: &str) -> Result<Option<Session>> {
        self.get_json(CF_SESSIONS, token)
    }

    async fn delete_for_user(&self, user_id: &str) -> Result<usize> {
        let cf = self.cf(CF_SESSIONS)?;
        let sessions: Vec<Session> = self.scan_json(CF_SESSIONS, "")?;
        let mut removed = 0;
        for session in sessions.iter().filter(|s| s.user_id == user_id) {
            self.db.delete_cf(cf, session.token.as_bytes())?;
            removed += 1;
        }
        Ok(removed)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let cf = self.cf(CF_SESSIONS)?;
        let sessions: Vec<Session> = self.scan_json(CF_SESSIONS, "")?;
        let mut batch = WriteBatch::default();
        for session in sessions.iter().filter(|s| s.is_expired(now)) {
            batch.delete_cf(cf, session.token.as_bytes());
        }
        let removed = batch.len();
        self.db.write(batch)?;
        Ok(removed)
    }
}

#[async_trait]
impl OtpStore for RocksDBStore {
    async fn store(&self, otp: OtpRecord) -> Result<()> {
        self.put_json(CF_OTPS, &otp.email, &otp)
    }

    async fn get(&self, email: &str) -> Result<Option<OtpRecord>> {
        self.get_json(CF_OTPS, email)
    }
}

#[async_trait]
impl CompetitionStore for RocksDBStore {
    async fn store(&self, competition: Competition) -> Result<()> {
        self.put_json(CF_COMPETITIONS, &competition.id, &competition)
    }

    async fn get(&self, competition_id: &str) -> Result<Option<Competition>> {
        self.get_json(CF_COMPETITIONS, competition_id)
    }

    async fn get_all(&self) -> Result<Vec<Competition>> {
        self.scan_json(CF_COMPETITIONS, "")
    }
}

#[async_trait]
impl TransactionStore for RocksDBStore {
    async fn store(&self, tx: Transaction) -> Result<()> {
        self.put_json(CF_TRANSACTIONS, &tx.id, &tx)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let all: Vec<Transaction> = self.scan_json(CF_TRANSACTIONS, "")?;
        Ok(all.into_iter().filter(|t| t.user_id == user_id).collect())
    }

    async fn find_by_competition(&self, competition_id: &str) -> Result<Vec<Transaction>> {
        let all: Vec<Transaction> = self.scan_json(CF_TRANSACTIONS, "")?;
        Ok(all
            .into_iter()
            .filter(|t| t.competition_id.as_deref() == Some(competition_id))
            .collect())
    }
}

#[async_trait]
impl MatchdayPaymentStore for RocksDBStore {
    async fn store(&self, payment: MatchdayPayment) -> Result<()> {
        self.put_json(CF_MATCHDAY_PAYMENTS, &payment.key(), &payment)
    }

    async fn find(&self, competition_id: &str, user_id: &str) -> Result<Vec<MatchdayPayment>> {
        self.scan_json(CF_MATCHDAY_PAYMENTS, &format!("{competition_id}/{user_id}/"))
    }

    async fn find_by_competition(&self, competition_id: &str) -> Result<Vec<MatchdayPayment>> {
        self.scan_json(CF_MATCHDAY_PAYMENTS, &format!("{competition_id}/"))
    }
}

/// Serialises the whole batch first, then hands RocksDB a single
/// `WriteBatch`, which it applies atomically.
#[async_trait]
impl UnitOfWork for RocksDBStore {
    async fn commit(&self, writes: Vec<Write>) -> Result<()> {
        let mut batch = WriteBatch::default();
        for write in &writes {
            match write {
                Write::User(user) => self.batch_json(&mut batch, CF_USERS, &user.id, user)?,
                Write::Competition(competition) => {
                    self.batch_json(&mut batch, CF_COMPETITIONS, &competition.id, competition)?
                }
                Write::Transaction(tx) => self.batch_json(&mut batch, CF_TRANSACTIONS, &tx.id, tx)?,
                Write::MatchdayPayment(payment) => {
                    self.batch_json(&mut batch, CF_MATCHDAY_PAYMENTS, &payment.key(), payment)?
                }
            }
        }
        self.db.write(batch)?;
        Ok(())
    }
}
