use super::money::{Amount, Balance};
use crate::error::PaymentError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOTAL_MATCHDAYS: u32 = 36;
pub const INVITE_LINK_SCHEME: &str = "fantapay://join/";

pub type Standings = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Daily,
    Final,
    Mixed,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PrizeSlot {
    pub position: u32,
    pub amount: Balance,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CompetitionRules {
    pub r#type: RuleType,
    #[serde(default)]
    pub daily_prize: Option<Balance>,
    #[serde(default)]
    pub final_prize_pool: Vec<PrizeSlot>,
}

fn default_total_matchdays() -> u32 {
    DEFAULT_TOTAL_MATCHDAYS
}

/// What a client sends to open a new competition.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CompetitionDraft {
    pub name: String,
    pub rules: CompetitionRules,
    #[serde(default = "default_total_matchdays")]
    pub total_matchdays: u32,
    #[serde(default)]
    pub participation_cost_per_team: Balance,
    #[serde(default)]
    pub expected_teams: Option<u32>,
    #[serde(default)]
    pub total_prize_pool: Option<Balance>,
    #[serde(default)]
    pub daily_payment_enabled: bool,
    #[serde(default)]
    pub daily_payment_amount: Balance,
}

impl CompetitionDraft {
    /// Checks the draft and returns it with its name trimmed.
    pub fn validated(mut self) -> Result<Self, PaymentError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(PaymentError::validation("Competition name is required"));
        }
        if self.total_matchdays == 0 {
            return Err(PaymentError::validation(
                "Total matchdays must be at least 1",
            ));
        }
        if self.participation_cost_per_team < Balance::ZERO
            || self.daily_payment_amount < Balance::ZERO
            || self.total_prize_pool.is_some_and(|p| p < Balance::ZERO)
        {
            return Err(PaymentError::validation("Costs cannot be negative"));
        }
        if self.daily_payment_enabled && self.daily_payment_amount == Balance::ZERO {
            return Err(PaymentError::validation(
                "Daily payment amount must be positive when daily payments are enabled",
            ));
        }
        Ok(self)
    }
}

/// A fantasy league: its roster, its shared wallet and its matchday counter.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Competition {
    pub id: String,
    pub name: String,
    pub admin_id: String,
    pub rules: CompetitionRules,
    pub invite_code: String,
    pub invite_link: String,
    pub participants: Vec<String>,
    pub wallet_balance: Balance,
    pub is_active: bool,
    pub standings: Standings,
    pub current_matchday: u32,
    pub total_matchdays: u32,
    pub participation_cost_per_team: Balance,
    pub expected_teams: Option<u32>,
    pub total_prize_pool: Option<Balance>,
    pub daily_payment_enabled: bool,
    pub daily_payment_amount: Balance,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Competition {
    /// Opens a competition from an already validated draft. The admin is
    /// the first participant.
    pub fn new(admin_id: impl Into<String>, draft: CompetitionDraft, invite_code: String) -> Self {
        let admin_id = admin_id.into();
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            admin_id: admin_id.clone(),
            rules: draft.rules,
            invite_link: format!("{INVITE_LINK_SCHEME}{invite_code}"),
            invite_code,
            participants: vec![admin_id],
            wallet_balance: Balance::ZERO,
            is_active: true,
            standings: Standings::new(),
            current_matchday: 1,
            total_matchdays: draft.total_matchdays,
            participation_cost_per_team: draft.participation_cost_per_team,
            expected_teams: draft.expected_teams,
            total_prize_pool: draft.total_prize_pool,
            daily_payment_enabled: draft.daily_payment_enabled,
            daily_payment_amount: draft.daily_payment_amount,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin_id == user_id
    }

    pub fn ensure_participant(&self, user_id: &str) -> Result<(), PaymentError> {
        if self.is_participant(user_id) {
            Ok(())
        } else {
            Err(PaymentError::forbidden(
                "Not a participant in this competition",
            ))
        }
    }

    pub fn add_participant(&mut self, user_id: &str) -> Result<(), PaymentError> {
        if !self.is_active {
            return Err(PaymentError::validation("Competition is not active"));
        }
        if self.is_participant(user_id) {
            return Err(PaymentError::validation("Already joined this competition"));
        }
        self.participants.push(user_id.to_string());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replaces the standings, optionally moving the matchday counter.
    pub fn set_standings(
        &mut self,
        standings: Standings,
        matchday: Option<u32>,
    ) -> Result<(), PaymentError> {
        if let Some(matchday) = matchday {
            self.check_matchday(matchday)?;
            self.current_matchday = matchday;
        }
        self.standings = standings;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn check_matchday(&self, matchday: u32) -> Result<(), PaymentError> {
        if (1..=self.total_matchdays).contains(&matchday) {
            Ok(())
        } else {
            Err(PaymentError::validation(format!(
                "Matchday {matchday} is outside 1..={}",
                self.total_matchdays
            )))
        }
    }

    /// The per-matchday fee, if this competition collects one.
    pub fn daily_fee(&self) -> Result<Amount, PaymentError> {
        if !self.daily_payment_enabled {
            return Err(PaymentError::validation(
                "Daily payments are not enabled for this competition",
            ));
        }
        Amount::new(self.daily_payment_amount.value())
    }

    /// Participation cost left over once every matchday fee is paid.
    pub fn residual_fee(&self) -> Balance {
        let matchday_total = Balance::new(
            self.daily_payment_amount.value() * rust_decimal::Decimal::from(self.total_matchdays),
        );
        self.participation_cost_per_team - matchday_total
    }

    pub fn credit(&mut self, amount: Balance) {
        self.wallet_balance += amount;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft() -> CompetitionDraft {
        CompetitionDraft {
            name: "  Serie A Friends ".into(),
            rules: CompetitionRules {
                r#type: RuleType::Mixed,
                daily_prize: Some(Balance::new(dec!(15))),
                final_prize_pool: vec![],
            },
            total_matchdays: 36,
            participation_cost_per_team: Balance::new(dec!(210)),
            expected_teams: Some(10),
            total_prize_pool: None,
            daily_payment_enabled: true,
            daily_payment_amount: Balance::new(dec!(5)),
        }
    }

    #[test]
    fn test_new_competition_has_admin_as_participant() {
        let comp = Competition::new("admin", draft().validated().unwrap(), "ABCD1234".into());
        assert_eq!(comp.name, "Serie A Friends");
        assert_eq!(comp.participants, vec!["admin".to_string()]);
        assert_eq!(comp.invite_link, "fantapay://join/ABCD1234");
        assert_eq!(comp.current_matchday, 1);
        assert!(comp.is_admin("admin"));
    }

    #[test]
    fn test_draft_validation() {
        let mut d = draft();
        d.name = "   ".into();
        assert!(d.validated().is_err());

        let mut d = draft();
        d.total_matchdays = 0;
        assert!(d.validated().is_err());

        let mut d = draft();
        d.daily_payment_amount = Balance::ZERO;
        assert!(d.validated().is_err());

        let mut d = draft();
        d.daily_payment_enabled = false;
        d.daily_payment_amount = Balance::ZERO;
        assert!(d.validated().is_ok());
    }

    #[test]
    fn test_draft_defaults_from_json() {
        let d: CompetitionDraft =
            serde_json::from_str(r#"{"name":"x","rules":{"type":"final"}}"#).unwrap();
        assert_eq!(d.total_matchdays, DEFAULT_TOTAL_MATCHDAYS);
        assert!(!d.daily_payment_enabled);
        assert_eq!(d.participation_cost_per_team, Balance::ZERO);
    }

    #[test]
    fn test_residual_fee() {
        let comp = Competition::new("admin", draft(), "X".into());
        // 210 - 5 * 36
        assert_eq!(comp.residual_fee(), Balance::new(dec!(30)));
    }

    #[test]
    fn test_join_twice_rejected() {
        let mut comp = Competition::new("admin", draft(), "X".into());
        assert!(comp.add_participant("bob").is_ok());
        assert!(matches!(
            comp.add_participant("bob"),
            Err(PaymentError::ValidationError(ref m)) if m == "Already joined this competition"
        ));
        assert_eq!(comp.participants.len(), 2);
    }

    #[test]
    fn test_join_inactive_rejected() {
        let mut comp = Competition::new("admin", draft(), "X".into());
        comp.is_active = false;
        assert!(matches!(
            comp.add_participant("bob"),
            Err(PaymentError::ValidationError(ref m)) if m == "Competition is not active"
        ));
        assert_eq!(comp.participants, vec!["admin".to_string()]);
    }

    #[test]
    fn test_standings_matchday_bounds() {
        let mut comp = Competition::new("admin", draft(), "X".into());
        assert!(comp.set_standings(Standings::new(), Some(37)).is_err());
        assert_eq!(comp.current_matchday, 1);
        assert!(comp.set_standings(Standings::new(), Some(10)).is_ok());
        assert_eq!(comp.current_matchday, 10);
    }

    #[test]
    fn test_daily_fee_requires_enabled() {
        let mut comp = Competition::new("admin", draft(), "X".into());
        assert_eq!(comp.daily_fee().unwrap().value(), dec!(5));
        comp.daily_payment_enabled = false;
        assert!(comp.daily_fee().is_err());
    }
}
