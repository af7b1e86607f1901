use super::money::Balance;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    Withdraw,
    Payment,
    MatchdayPayment,
    Prize,
    Refund,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum WalletKind {
    External,
    Personal,
    Competition,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Completed,
    Pending,
    Failed,
}

/// One line of the money-movement log.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub competition_id: Option<String>,
    pub r#type: TransactionType,
    pub amount: Balance,
    pub description: String,
    pub from_wallet: WalletKind,
    pub to_wallet: WalletKind,
    #[serde(default)]
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        user_id: impl Into<String>,
        r#type: TransactionType,
        amount: Balance,
        description: impl Into<String>,
        from_wallet: WalletKind,
        to_wallet: WalletKind,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            competition_id: None,
            r#type,
            amount,
            description: description.into(),
            from_wallet,
            to_wallet,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        }
    }

    pub fn for_competition(mut self, competition_id: impl Into<String>) -> Self {
        self.competition_id = Some(competition_id.into());
        self
    }
}

/// Orders newest first and keeps at most `limit` entries.
pub fn newest_first(mut transactions: Vec<Transaction>, limit: usize) -> Vec<Transaction> {
    transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    transactions.truncate(limit);
    transactions
}
