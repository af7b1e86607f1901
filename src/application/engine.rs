use super::competitions::load_for_participant;
use crate::domain::competition::Competition;
use crate::domain::money::{Amount, Balance};
use crate::domain::payment::{MatchdayEntry, MatchdayPayment, MatchdaySchedule, PaymentSummary};
use crate::domain::ports::{Stores, Write};
use crate::domain::transaction::{Transaction, TransactionType, WalletKind, newest_first};
use crate::domain::user::User;
use crate::error::{PaymentError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::info;

/// History endpoints return at most this many entries.
pub const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct WalletUpdate {
    pub message: String,
    pub new_balance: Balance,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CompetitionPaymentReceipt {
    pub message: String,
    pub new_user_balance: Balance,
    pub new_competition_balance: Balance,
}

#[derive(Debug, Deserialize)]
pub struct MatchdayPaymentRequest {
    pub matchdays: Vec<u32>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MatchdayPaymentReceipt {
    pub message: String,
    pub matchdays_paid: Vec<u32>,
    pub total_amount: Balance,
    pub new_user_balance: Balance,
    pub new_competition_balance: Balance,
}

/// One participant's own matchday schedule.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MatchdayStatus {
    pub competition_id: String,
    pub user_id: String,
    pub daily_payment_enabled: bool,
    pub daily_payment_amount: Balance,
    pub total_matchdays: u32,
    pub current_matchday: u32,
    pub payments: Vec<MatchdayEntry>,
    pub summary: PaymentSummary,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ParticipantStatus {
    pub user_id: String,
    pub name: String,
    pub is_admin: bool,
    pub matchday_payments: Vec<MatchdayEntry>,
    pub summary: PaymentSummary,
}

/// Every participant's schedule, in roster order.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PaymentStatusTable {
    pub competition_id: String,
    pub competition_name: String,
    pub daily_payment_amount: Balance,
    pub total_matchdays: u32,
    pub current_matchday: u32,
    pub competition_balance: Balance,
    pub participants: Vec<ParticipantStatus>,
}

/// A competition transaction annotated with who made it.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub user_name: String,
}

/// Moves money between personal wallets, competition wallets and the
/// outside world, and keeps the log of every movement.
///
/// Each operation validates everything before its first write and holds the
/// shared store guard from the first read to the last write.
pub struct PaymentEngine {
    stores: Stores,
}

impl PaymentEngine {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    async fn fresh_user(&self, user_id: &str) -> Result<User> {
        self.stores
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("User not found"))
    }

    pub async fn balance(&self, user: &User) -> Result<Balance> {
        Ok(self.fresh_user(&user.id).await?.wallet_balance)
    }

    /// Credits the personal wallet from outside.
    pub async fn topup(&self, user: &User, amount: Amount) -> Result<WalletUpdate> {
        let _guard = self.stores.guard.lock().await;
        let mut user = self.fresh_user(&user.id).await?;
        user.deposit(amount);
        let new_balance = user.wallet_balance;
        let tx = Transaction::new(
            &user.id,
            TransactionType::Deposit,
            amount.into(),
            format!("Wallet top-up of {amount}"),
            WalletKind::External,
            WalletKind::Personal,
        );
        self.stores
            .commit(vec![Write::User(user.clone()), Write::Transaction(tx)])
            .await?;
        info!(user_id = %user.id, amount = %amount.value(), "wallet topped up");

        Ok(WalletUpdate {
            message: "Wallet topped up successfully".into(),
            new_balance,
        })
    }

    /// Debits the personal wallet to outside.
    pub async fn withdraw(&self, user: &User, amount: Amount) -> Result<WalletUpdate> {
        let _guard = self.stores.guard.lock().await;
        let mut user = self.fresh_user(&user.id).await?;
        user.withdraw(amount.into())?;
        let new_balance = user.wallet_balance;
        let tx = Transaction::new(
            &user.id,
            TransactionType::Withdraw,
            amount.into(),
            format!("Withdrawal of {amount}"),
            WalletKind::Personal,
            WalletKind::External,
        );
        self.stores
            .commit(vec![Write::User(user.clone()), Write::Transaction(tx)])
            .await?;
        info!(user_id = %user.id, amount = %amount.value(), "wallet withdrawal");

        Ok(WalletUpdate {
            message: "Withdrawal successful".into(),
            new_balance,
        })
    }

    /// Moves `amount` from the user's wallet into the competition wallet.
    ///
    /// The balance is checked before the competition is looked up, so a
    /// short wallet reports "Insufficient balance" even for an unknown or
    /// foreign competition.
    pub async fn pay_competition(
        &self,
        user: &User,
        competition_id: &str,
        amount: Amount,
    ) -> Result<CompetitionPaymentReceipt> {
        let _guard = self.stores.guard.lock().await;
        let mut user = self.fresh_user(&user.id).await?;
        user.withdraw(amount.into())?;
        let mut competition = load_for_participant(&self.stores, &user, competition_id).await?;
        competition.credit(amount.into());
        let receipt = CompetitionPaymentReceipt {
            message: "Payment successful".into(),
            new_user_balance: user.wallet_balance,
            new_competition_balance: competition.wallet_balance,
        };

        let tx = Transaction::new(
            &user.id,
            TransactionType::Payment,
            amount.into(),
            format!("Payment to {}", competition.name),
            WalletKind::Personal,
            WalletKind::Competition,
        )
        .for_competition(&competition.id);

        info!(
            user_id = %user.id,
            competition_id = %competition.id,
            amount = %amount.value(),
            "competition fee paid"
        );
        self.stores
            .commit(vec![
                Write::User(user),
                Write::Competition(competition),
                Write::Transaction(tx),
            ])
            .await?;
        Ok(receipt)
    }

    /// Pays the daily fee for each listed matchday, all or nothing.
    pub async fn pay_matchdays(
        &self,
        user: &User,
        competition_id: &str,
        req: MatchdayPaymentRequest,
    ) -> Result<MatchdayPaymentReceipt> {
        let _guard = self.stores.guard.lock().await;
        let mut user = self.fresh_user(&user.id).await?;
        let mut competition = load_for_participant(&self.stores, &user, competition_id).await?;
        let fee = competition.daily_fee()?;

        let matchdays = requested_matchdays(&competition, &req.matchdays)?;
        let already_paid: BTreeSet<u32> = self
            .stores
            .payments
            .find(&competition.id, &user.id)
            .await?
            .into_iter()
            .map(|p| p.matchday)
            .collect();
        if let Some(day) = matchdays.iter().find(|d| already_paid.contains(d)) {
            return Err(PaymentError::validation(format!(
                "Matchday {day} already paid"
            )));
        }

        let total = fee.times(matchdays.len());
        user.withdraw(total)?;
        competition.credit(total);

        let receipt = MatchdayPaymentReceipt {
            message: format!("Paid {} matchday(s)", matchdays.len()),
            matchdays_paid: matchdays.clone(),
            total_amount: total,
            new_user_balance: user.wallet_balance,
            new_competition_balance: competition.wallet_balance,
        };

        info!(
            user_id = %user.id,
            competition_id = %competition.id,
            ?matchdays,
            total = %total.value(),
            "matchday fees paid"
        );
        let mut writes = Vec::with_capacity(2 + 2 * matchdays.len());
        for day in matchdays {
            writes.push(Write::MatchdayPayment(MatchdayPayment::new(
                &competition.id,
                &user.id,
                day,
                fee.into(),
            )));
            writes.push(Write::Transaction(
                Transaction::new(
                    &user.id,
                    TransactionType::MatchdayPayment,
                    fee.into(),
                    format!("Paid matchday {day}"),
                    WalletKind::Personal,
                    WalletKind::Competition,
                )
                .for_competition(&competition.id),
            ));
        }
        writes.push(Write::User(user));
        writes.push(Write::Competition(competition));
        self.stores.commit(writes).await?;
        Ok(receipt)
    }

    /// The caller's own paid and pending matchdays.
    pub async fn matchday_status(&self, user: &User, competition_id: &str) -> Result<MatchdayStatus> {
        let competition = load_for_participant(&self.stores, user, competition_id).await?;
        let payments = self.stores.payments.find(&competition.id, &user.id).await?;
        let schedule = MatchdaySchedule::build(&competition, &payments);

        Ok(MatchdayStatus {
            competition_id: competition.id,
            user_id: user.id.clone(),
            daily_payment_enabled: competition.daily_payment_enabled,
            daily_payment_amount: competition.daily_payment_amount,
            total_matchdays: competition.total_matchdays,
            current_matchday: competition.current_matchday,
            payments: schedule.entries,
            summary: schedule.summary,
        })
    }

    pub async fn status_table(&self, user: &User, competition_id: &str) -> Result<PaymentStatusTable> {
        let competition = load_for_participant(&self.stores, user, competition_id).await?;
        self.build_status_table(competition).await
    }

    /// Status table without a membership check, for operator tooling.
    pub async fn status_table_unchecked(&self, competition_id: &str) -> Result<PaymentStatusTable> {
        let competition = self
            .stores
            .competitions
            .get(competition_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("Competition not found"))?;
        self.build_status_table(competition).await
    }

    async fn build_status_table(&self, competition: Competition) -> Result<PaymentStatusTable> {
        let mut by_user: HashMap<String, Vec<MatchdayPayment>> = HashMap::new();
        for payment in self.stores.payments.find_by_competition(&competition.id).await? {
            by_user.entry(payment.user_id.clone()).or_default().push(payment);
        }

        let mut participants = Vec::with_capacity(competition.participants.len());
        for user_id in &competition.participants {
            let name = self
                .stores
                .users
                .get(user_id)
                .await?
                .map(|u| u.name)
                .unwrap_or_else(|| "Unknown".to_string());
            let payments = by_user.remove(user_id).unwrap_or_default();
            let schedule = MatchdaySchedule::build(&competition, &payments);
            participants.push(ParticipantStatus {
                user_id: user_id.clone(),
                name,
                is_admin: competition.is_admin(user_id),
                matchday_payments: schedule.entries,
                summary: schedule.summary,
            });
        }

        Ok(PaymentStatusTable {
            competition_id: competition.id,
            competition_name: competition.name,
            daily_payment_amount: competition.daily_payment_amount,
            total_matchdays: competition.total_matchdays,
            current_matchday: competition.current_matchday,
            competition_balance: competition.wallet_balance,
            participants,
        })
    }

    /// The caller's own transactions, newest first.
    pub async fn transactions(&self, user: &User) -> Result<Vec<Transaction>> {
        let txs = self.stores.transactions.find_by_user(&user.id).await?;
        Ok(newest_first(txs, HISTORY_LIMIT))
    }

    /// The competition's activity log, newest first.
    pub async fn competition_transactions(
        &self,
        user: &User,
        competition_id: &str,
    ) -> Result<Vec<ActivityEntry>> {
        let competition = load_for_participant(&self.stores, user, competition_id).await?;
        let txs = newest_first(
            self.stores
                .transactions
                .find_by_competition(&competition.id)
                .await?,
            HISTORY_LIMIT,
        );

        let mut names: HashMap<String, String> = HashMap::new();
        let mut entries = Vec::with_capacity(txs.len());
        for tx in txs {
            if !names.contains_key(&tx.user_id) {
                let name = self
                    .stores
                    .users
                    .get(&tx.user_id)
                    .await?
                    .map(|u| u.name)
                    .unwrap_or_else(|| "Unknown".to_string());
                names.insert(tx.user_id.clone(), name);
            }
            let user_name = names[&tx.user_id].clone();
            entries.push(ActivityEntry {
                transaction: tx,
                user_name,
            });
        }
        Ok(entries)
    }
}

/// Validates a matchday list: non-empty, no repeats, inside the season.
/// Returns the matchdays sorted.
fn requested_matchdays(competition: &Competition, matchdays: &[u32]) -> Result<Vec<u32>> {
    if matchdays.is_empty() {
        return Err(PaymentError::validation("No matchdays selected"));
    }
    let unique: BTreeSet<u32> = matchdays.iter().copied().collect();
    if unique.len() != matchdays.len() {
        return Err(PaymentError::validation("Duplicate matchdays in request"));
    }
    for day in &unique {
        competition.check_matchday(*day)?;
    }
    Ok(unique.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::competitions::{CompetitionService, JoinRequest};
    use crate::domain::competition::{CompetitionDraft, CompetitionRules, RuleType};
    use crate::domain::payment::PaymentStatus;
    use crate::domain::ports::UnitOfWork;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    /// Refuses every batch, as a backend that fails mid-request would.
    struct RejectingUnitOfWork;

    #[async_trait]
    impl UnitOfWork for RejectingUnitOfWork {
        async fn commit(&self, _writes: Vec<Write>) -> Result<()> {
            Err(PaymentError::internal("disk full"))
        }
    }

    struct Fixture {
        stores: Stores,
        engine: PaymentEngine,
        admin: User,
        player: User,
        competition: Competition,
    }

    async fn fixture(fee: Balance) -> Fixture {
        let stores = Stores::in_memory();
        let engine = PaymentEngine::new(stores.clone());
        let competitions = CompetitionService::new(stores.clone());

        let admin = User::new("admin@example.com", "Admin");
        let player = User::new("player@example.com", "Player");
        stores.users.store(admin.clone()).await.unwrap();
        stores.users.store(player.clone()).await.unwrap();

        let draft = CompetitionDraft {
            name: "League".into(),
            rules: CompetitionRules {
                r#type: RuleType::Mixed,
                daily_prize: None,
                final_prize_pool: vec![],
            },
            total_matchdays: 36,
            participation_cost_per_team: Balance::new(dec!(216)),
            expected_teams: None,
            total_prize_pool: None,
            daily_payment_enabled: fee > Balance::ZERO,
            daily_payment_amount: fee,
        };
        let competition = competitions.create(&admin, draft).await.unwrap();
        competitions
            .join(
                &player,
                JoinRequest {
                    invite_code: competition.invite_code.clone(),
                },
            )
            .await
            .unwrap();

        Fixture {
            stores,
            engine,
            admin,
            player,
            competition,
        }
    }

    fn amount(v: rust_decimal::Decimal) -> Amount {
        Amount::new(v).unwrap()
    }

    #[tokio::test]
    async fn test_topup_and_withdraw() {
        let f = fixture(Balance::new(dec!(6))).await;

        let update = f.engine.topup(&f.player, amount(dec!(50))).await.unwrap();
        assert_eq!(update.new_balance, Balance::new(dec!(50)));

        let update = f.engine.withdraw(&f.player, amount(dec!(20))).await.unwrap();
        assert_eq!(update.new_balance, Balance::new(dec!(30)));

        let err = f.engine.withdraw(&f.player, amount(dec!(31))).await.unwrap_err();
        assert_eq!(err.to_string(), "Insufficient balance");
        assert_eq!(f.engine.balance(&f.player).await.unwrap(), Balance::new(dec!(30)));

        let history = f.engine.transactions(&f.player).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().any(|t| t.description == "Wallet top-up of €50"));
        assert!(history.iter().any(|t| t.description == "Withdrawal of €20"));
    }

    #[tokio::test]
    async fn test_pay_competition_moves_money() {
        let f = fixture(Balance::new(dec!(6))).await;
        f.engine.topup(&f.player, amount(dec!(100))).await.unwrap();

        let receipt = f
            .engine
            .pay_competition(&f.player, &f.competition.id, amount(dec!(40)))
            .await
            .unwrap();
        assert_eq!(receipt.new_user_balance, Balance::new(dec!(60)));
        assert_eq!(receipt.new_competition_balance, Balance::new(dec!(40)));

        let err = f
            .engine
            .pay_competition(&f.player, &f.competition.id, amount(dec!(61)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Insufficient balance");

        let log = f
            .engine
            .competition_transactions(&f.admin, &f.competition.id)
            .await
            .unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].user_name, "Player");
        assert_eq!(log[0].transaction.description, "Payment to League");
    }

    #[tokio::test]
    async fn test_pay_matchdays_success() {
        let f = fixture(Balance::new(dec!(6))).await;
        f.engine.topup(&f.player, amount(dec!(200))).await.unwrap();

        let receipt = f
            .engine
            .pay_matchdays(
                &f.player,
                &f.competition.id,
                MatchdayPaymentRequest {
                    matchdays: vec![3, 1, 2],
                },
            )
            .await
            .unwrap();
        assert_eq!(receipt.matchdays_paid, vec![1, 2, 3]);
        assert_eq!(receipt.total_amount, Balance::new(dec!(18)));
        assert_eq!(receipt.new_user_balance, Balance::new(dec!(182)));
        assert_eq!(receipt.new_competition_balance, Balance::new(dec!(18)));

        let status = f
            .engine
            .matchday_status(&f.player, &f.competition.id)
            .await
            .unwrap();
        assert_eq!(status.payments.len(), 36);
        assert_eq!(status.summary.paid_count, 3);
        assert_eq!(status.summary.pending_count, 33);
        assert_eq!(status.payments[0].status, PaymentStatus::Paid);
        assert_eq!(status.payments[3].status, PaymentStatus::Pending);
        assert_eq!(status.summary.balance_display, "€18 / €216");

        let logged: Vec<_> = f
            .engine
            .transactions(&f.player)
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.r#type == TransactionType::MatchdayPayment)
            .collect();
        assert_eq!(logged.len(), 3);
        assert!(logged.iter().any(|t| t.description == "Paid matchday 2"));
    }

    #[tokio::test]
    async fn test_pay_matchdays_is_all_or_nothing() {
        let f = fixture(Balance::new(dec!(10))).await;
        f.engine.topup(&f.player, amount(dec!(100))).await.unwrap();
        f.engine
            .pay_matchdays(
                &f.player,
                &f.competition.id,
                MatchdayPaymentRequest { matchdays: vec![2] },
            )
            .await
            .unwrap();

        let err = f
            .engine
            .pay_matchdays(
                &f.player,
                &f.competition.id,
                MatchdayPaymentRequest {
                    matchdays: vec![1, 2, 3],
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Matchday 2 already paid");

        for bad in [vec![], vec![4, 4], vec![0], vec![37]] {
            assert!(
                f.engine
                    .pay_matchdays(
                        &f.player,
                        &f.competition.id,
                        MatchdayPaymentRequest { matchdays: bad },
                    )
                    .await
                    .is_err()
            );
        }

        // 10 matchdays at €10 exceed the €90 left
        let err = f
            .engine
            .pay_matchdays(
                &f.player,
                &f.competition.id,
                MatchdayPaymentRequest {
                    matchdays: (3..=12).collect(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Insufficient balance");

        let status = f
            .engine
            .matchday_status(&f.player, &f.competition.id)
            .await
            .unwrap();
        assert_eq!(status.summary.paid_count, 1);
        assert_eq!(f.engine.balance(&f.player).await.unwrap(), Balance::new(dec!(90)));
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_no_partial_payment() {
        let f = fixture(Balance::new(dec!(5))).await;
        f.engine.topup(&f.player, amount(dec!(50))).await.unwrap();

        let mut broken = f.stores.clone();
        broken.unit_of_work = Arc::new(RejectingUnitOfWork);
        let engine = PaymentEngine::new(broken);

        let err = engine
            .pay_matchdays(
                &f.player,
                &f.competition.id,
                MatchdayPaymentRequest {
                    matchdays: vec![1, 2, 3],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InternalError(_)));
        assert!(
            engine
                .pay_competition(&f.player, &f.competition.id, amount(dec!(10)))
                .await
                .is_err()
        );

        assert_eq!(f.engine.balance(&f.player).await.unwrap(), Balance::new(dec!(50)));
        let status = f
            .engine
            .matchday_status(&f.player, &f.competition.id)
            .await
            .unwrap();
        assert_eq!(status.summary.paid_count, 0);
        let competition = f
            .stores
            .competitions
            .get(&f.competition.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(competition.wallet_balance, Balance::ZERO);
        assert!(
            f.engine
                .competition_transactions(&f.admin, &f.competition.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_pay_competition_checks_balance_first() {
        let f = fixture(Balance::new(dec!(5))).await;
        let outsider = User::new("eve@example.com", "Eve");
        f.stores.users.store(outsider.clone()).await.unwrap();

        let err = f
            .engine
            .pay_competition(&outsider, &f.competition.id, amount(dec!(5)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Insufficient balance");

        let err = f
            .engine
            .pay_competition(&outsider, "missing", amount(dec!(5)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Insufficient balance");

        f.engine.topup(&outsider, amount(dec!(5))).await.unwrap();
        assert!(matches!(
            f.engine.pay_competition(&outsider, "missing", amount(dec!(5))).await,
            Err(PaymentError::NotFound(_))
        ));
        assert_eq!(f.engine.balance(&outsider).await.unwrap(), Balance::new(dec!(5)));
    }

    #[tokio::test]
    async fn test_pay_matchdays_requires_daily_payments() {
        let f = fixture(Balance::ZERO).await;
        f.engine.topup(&f.player, amount(dec!(100))).await.unwrap();

        let err = f
            .engine
            .pay_matchdays(
                &f.player,
                &f.competition.id,
                MatchdayPaymentRequest { matchdays: vec![1] },
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Daily payments are not enabled for this competition"
        );
    }

    #[tokio::test]
    async fn test_outsiders_are_rejected() {
        let f = fixture(Balance::new(dec!(5))).await;
        let outsider = User::new("eve@example.com", "Eve");
        f.stores.users.store(outsider.clone()).await.unwrap();
        f.engine.topup(&outsider, amount(dec!(100))).await.unwrap();

        assert!(matches!(
            f.engine
                .pay_competition(&outsider, &f.competition.id, amount(dec!(5)))
                .await,
            Err(PaymentError::Forbidden(_))
        ));
        assert!(matches!(
            f.engine.status_table(&outsider, &f.competition.id).await,
            Err(PaymentError::Forbidden(_))
        ));
        assert!(matches!(
            f.engine.matchday_status(&outsider, "missing").await,
            Err(PaymentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_status_table_lists_roster_in_order() {
        let f = fixture(Balance::new(dec!(5))).await;
        f.engine.topup(&f.player, amount(dec!(50))).await.unwrap();
        f.engine
            .pay_matchdays(
                &f.player,
                &f.competition.id,
                MatchdayPaymentRequest {
                    matchdays: vec![1, 2],
                },
            )
            .await
            .unwrap();

        let table = f.engine.status_table(&f.admin, &f.competition.id).await.unwrap();
        assert_eq!(table.participants.len(), 2);
        assert_eq!(table.participants[0].user_id, f.admin.id);
        assert!(table.participants[0].is_admin);
        assert_eq!(table.participants[0].summary.paid_count, 0);
        assert_eq!(table.participants[1].name, "Player");
        assert_eq!(table.participants[1].summary.paid_amount, Balance::new(dec!(10)));
        assert_eq!(table.competition_balance, Balance::new(dec!(10)));
    }

    #[tokio::test]
    async fn test_concurrent_payments_never_overdraw() {
        let f = fixture(Balance::new(dec!(10))).await;
        f.engine.topup(&f.player, amount(dec!(30))).await.unwrap();

        let engine = std::sync::Arc::new(f.engine);
        let mut handles = Vec::new();
        for day in 1..=6u32 {
            let engine = engine.clone();
            let player = f.player.clone();
            let comp_id = f.competition.id.clone();
            handles.push(tokio::spawn(async move {
                engine
                    .pay_matchdays(&player, &comp_id, MatchdayPaymentRequest { matchdays: vec![day] })
                    .await
                    .is_ok()
            }));
        }

        let mut succeeded = 0;
        for h in handles {
            if h.await.unwrap() {
                succeeded += 1;
            }
        }
        assert_eq!(succeeded, 3);
        assert_eq!(engine.balance(&f.player).await.unwrap(), Balance::ZERO);
    }
}
