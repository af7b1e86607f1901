use crate::domain::competition::{Competition, CompetitionDraft, Standings};
use crate::domain::money::Balance;
use crate::domain::ports::Stores;
use crate::domain::user::User;
use crate::error::{PaymentError, Result};
use crate::infrastructure::credentials;
use serde::{Deserialize, Serialize};
use tracing::info;

const MAX_INVITE_CODE_ATTEMPTS: usize = 16;

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub invite_code: String,
}

#[derive(Debug, Deserialize)]
pub struct StandingsUpdate {
    pub standings: Standings,
    #[serde(default)]
    pub matchday: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ParticipantInfo {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A competition as seen by one of its participants.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CompetitionDetails {
    #[serde(flatten)]
    pub competition: Competition,
    pub participant_details: Vec<ParticipantInfo>,
    pub residual_fee: Balance,
}

/// Creating, joining and administering competitions.
pub struct CompetitionService {
    stores: Stores,
}

impl CompetitionService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn create(&self, admin: &User, draft: CompetitionDraft) -> Result<Competition> {
        let draft = draft.validated()?;

        let _guard = self.stores.guard.lock().await;
        let existing = self.stores.competitions.get_all().await?;
        let wanted = draft.name.to_lowercase();
        if existing.iter().any(|c| c.name.to_lowercase() == wanted) {
            return Err(PaymentError::validation(
                "A competition with this name already exists",
            ));
        }

        let invite_code = (0..MAX_INVITE_CODE_ATTEMPTS)
            .map(|_| credentials::generate_invite_code())
            .find(|code| existing.iter().all(|c| &c.invite_code != code))
            .ok_or_else(|| PaymentError::internal("could not allocate an invite code"))?;

        let competition = Competition::new(admin.id.clone(), draft, invite_code);
        self.stores.competitions.store(competition.clone()).await?;
        info!(
            competition_id = %competition.id,
            admin_id = %admin.id,
            invite_code = %competition.invite_code,
            "competition created"
        );
        Ok(competition)
    }

    pub async fn join(&self, user: &User, req: JoinRequest) -> Result<Competition> {
        let code = req.invite_code.trim().to_uppercase();

        let _guard = self.stores.guard.lock().await;
        let mut competition = self
            .stores
            .competitions
            .find_by_invite_code(&code)
            .await?
            .ok_or_else(|| PaymentError::not_found("Competition not found"))?;
        competition.add_participant(&user.id)?;
        self.stores.competitions.store(competition.clone()).await?;
        info!(competition_id = %competition.id, user_id = %user.id, "participant joined");
        Ok(competition)
    }

    /// Competitions the user takes part in, newest first.
    pub async fn my_competitions(&self, user: &User) -> Result<Vec<Competition>> {
        let mut competitions = self.stores.competitions.find_by_participant(&user.id).await?;
        competitions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(competitions)
    }

    /// Loads a competition the user belongs to.
    pub async fn load_for_participant(&self, user: &User, competition_id: &str) -> Result<Competition> {
        load_for_participant(&self.stores, user, competition_id).await
    }

    pub async fn details(&self, user: &User, competition_id: &str) -> Result<CompetitionDetails> {
        let competition = self.load_for_participant(user, competition_id).await?;

        let mut participant_details = Vec::with_capacity(competition.participants.len());
        for id in &competition.participants {
            if let Some(p) = self.stores.users.get(id).await? {
                participant_details.push(ParticipantInfo {
                    id: p.id,
                    name: p.name,
                    email: p.email,
                });
            }
        }

        Ok(CompetitionDetails {
            residual_fee: competition.residual_fee(),
            competition,
            participant_details,
        })
    }

    pub async fn update_standings(
        &self,
        user: &User,
        competition_id: &str,
        update: StandingsUpdate,
    ) -> Result<Competition> {
        let _guard = self.stores.guard.lock().await;
        let mut competition = self
            .stores
            .competitions
            .get(competition_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("Competition not found"))?;
        if !competition.is_admin(&user.id) {
            return Err(PaymentError::forbidden("Only admin can update standings"));
        }
        competition.set_standings(update.standings, update.matchday)?;
        self.stores.competitions.store(competition.clone()).await?;
        info!(
            competition_id = %competition.id,
            matchday = competition.current_matchday,
            "standings updated"
        );
        Ok(competition)
    }
}

/// Fetches `competition_id`, failing unless `user` is on its roster.
pub(crate) async fn load_for_participant(
    stores: &Stores,
    user: &User,
    competition_id: &str,
) -> Result<Competition> {
    let competition = stores
        .competitions
        .get(competition_id)
        .await?
        .ok_or_else(|| PaymentError::not_found("Competition not found"))?;
    competition.ensure_participant(&user.id)?;
    Ok(competition)
}
