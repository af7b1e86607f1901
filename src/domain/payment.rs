use super::competition::Competition;
use super::money::{Balance, euro};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A participant's fee for one matchday, once paid.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct MatchdayPayment {
    pub competition_id: String,
    pub user_id: String,
    pub matchday: u32,
    pub amount: Balance,
    pub paid_at: DateTime<Utc>,
}

impl MatchdayPayment {
    pub fn new(
        competition_id: impl Into<String>,
        user_id: impl Into<String>,
        matchday: u32,
        amount: Balance,
    ) -> Self {
        Self {
            competition_id: competition_id.into(),
            user_id: user_id.into(),
            matchday,
            amount,
            paid_at: Utc::now(),
        }
    }

    /// Storage key: unique per competition, user and matchday.
    pub fn key(&self) -> String {
        payment_key(&self.competition_id, &self.user_id, self.matchday)
    }
}

pub fn payment_key(competition_id: &str, user_id: &str, matchday: u32) -> String {
    format!("{competition_id}/{user_id}/{matchday:04}")
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct MatchdayEntry {
    pub matchday: u32,
    pub status: PaymentStatus,
    pub amount: Balance,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentSummary {
    pub paid_count: u32,
    pub pending_count: u32,
    pub paid_amount: Balance,
    pub total_amount: Balance,
    pub remaining_amount: Balance,
    pub balance_display: String,
}

/// Paid and pending matchdays of one participant.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct MatchdaySchedule {
    pub entries: Vec<MatchdayEntry>,
    pub summary: PaymentSummary,
}

impl MatchdaySchedule {
    /// Lays out matchdays `1..=total_matchdays`, marking those covered by
    /// `payments`. Pending matchdays are priced at the current daily fee;
    /// paid ones keep the amount actually charged.
    pub fn build(competition: &Competition, payments: &[MatchdayPayment]) -> Self {
        let paid: HashMap<u32, &MatchdayPayment> =
            payments.iter().map(|p| (p.matchday, p)).collect();

        let entries: Vec<MatchdayEntry> = (1..=competition.total_matchdays)
            .map(|matchday| match paid.get(&matchday) {
                Some(p) => MatchdayEntry {
                    matchday,
                    status: PaymentStatus::Paid,
                    amount: p.amount,
                    paid_at: Some(p.paid_at),
                },
                None => MatchdayEntry {
                    matchday,
                    status: PaymentStatus::Pending,
                    amount: competition.daily_payment_amount,
                    paid_at: None,
                },
            })
            .collect();

        let paid_amount: Balance = entries
            .iter()
            .filter(|e| e.status == PaymentStatus::Paid)
            .map(|e| e.amount)
            .sum();
        let remaining_amount: Balance = entries
            .iter()
            .filter(|e| e.status == PaymentStatus::Pending)
            .map(|e| e.amount)
            .sum();
        let paid_count = entries
            .iter()
            .filter(|e| e.status == PaymentStatus::Paid)
            .count() as u32;
        let total_amount = paid_amount + remaining_amount;

        Self {
            summary: PaymentSummary {
                paid_count,
                pending_count: competition.total_matchdays - paid_count,
                paid_amount,
                total_amount,
                remaining_amount,
                balance_display: format!(
                    "{} / {}",
                    euro(paid_amount.value()),
                    euro(total_amount.value())
                ),
            },
            entries,
        }
    }
}
