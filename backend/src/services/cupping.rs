//! Cupping session service
//!
//! Competition sessions move strictly forward through
//! `setup -> scoring -> adjudication -> finalized`. QC sessions are a single
//! cupper scoring a single lot and are stored already finalized.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use shared::{
    blind_code, compute_results, generate_id, CuppingSample, CuppingSession, IdKind, JudgeScore,
    LotCuppingScore, ScoreSheet, SessionStatus, SessionType,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::store::{AppData, Store};

/// Placeholder shown instead of a lot id while a competition is blind
pub const MASKED_LOT_ID: &str = "BLIND";

/// Cupping service
#[derive(Clone)]
pub struct CuppingService {
    store: Store,
}

/// Input for creating a competition session
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Defaults to today
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct AddJudgeInput {
    pub judge_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AddSampleInput {
    pub green_bean_lot_id: String,
}

/// A judge's sheet for one sample
#[derive(Debug, Deserialize)]
pub struct SubmitScoreInput {
    pub sample_id: String,
    pub sheet: ScoreSheet,
}

/// Head judge replacement sheet
#[derive(Debug, Deserialize)]
pub struct OverrideScoreInput {
    pub sheet: ScoreSheet,
}

/// Input for an ad hoc QC cupping of one lot
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQcInput {
    pub green_bean_lot_id: String,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub sheet: ScoreSheet,
}

fn validate_sheet(sheet: &ScoreSheet) -> AppResult<()> {
    sheet
        .defects
        .validate()
        .map_err(|msg| AppError::validation("defects", msg))?;
    match sheet.invalid_attribute() {
        Some(attr) => Err(AppError::validation(
            attr.as_str(),
            if attr.is_sensory() {
                "Sensory attributes must be between 6 and 10"
            } else {
                "Cup attributes must be between 0 and 10"
            },
        )),
        None => Ok(()),
    }
}

fn not_modifiable(session: &CuppingSession, action: &str) -> AppError {
    tracing::warn!(session_id = %session.id, status = %session.status, action, "Rejected session change");
    AppError::InvalidStateTransition(format!(
        "Cannot {} while session is {}",
        action,
        session.status.as_str()
    ))
}

/// Store the ranked results and copy each sample's score onto its lot
fn finalize(data: &mut AppData, session_idx: usize) {
    let results = compute_results(&data.cupping_sessions[session_idx]);
    let (session_id, session_name, date) = {
        let s = &data.cupping_sessions[session_idx];
        (s.id.clone(), s.name.clone(), s.date)
    };

    for result in &results {
        match data
            .green_bean_lots
            .iter_mut()
            .find(|l| l.id == result.green_bean_lot_id)
        {
            Some(lot) => lot.cupping_scores.push(LotCuppingScore {
                session_id: session_id.clone(),
                session_name: session_name.clone(),
                date,
                score: result.total_score,
            }),
            None => tracing::warn!(
                session_id = %session_id,
                lot_id = %result.green_bean_lot_id,
                "Finalized sample references a missing lot"
            ),
        }
    }

    let session = &mut data.cupping_sessions[session_idx];
    session.status = SessionStatus::Finalized;
    session.results = Some(results);
}

/// What a given user may see of a session
///
/// Until a competition is finalized, viewers other than head judges get
/// blind codes only and just their own sheets.
pub fn view_for(user: &AuthUser, session: &CuppingSession) -> CuppingSession {
    if user.is_head_judge() || session.status == SessionStatus::Finalized {
        return session.clone();
    }
    let mut view = session.clone();
    for sample in &mut view.samples {
        sample.green_bean_lot_id = MASKED_LOT_ID.to_string();
    }
    view.scores.retain(|s| s.judge_id == user.user_id);
    view
}

impl CuppingService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    fn session_index(data: &AppData, session_id: &str) -> AppResult<usize> {
        data.cupping_sessions
            .iter()
            .position(|s| s.id == session_id)
            .ok_or_else(|| AppError::NotFound("Cupping session".to_string()))
    }

    /// Create a competition session in `setup`
    pub async fn create_session(
        &self,
        user: &AuthUser,
        input: CreateSessionInput,
    ) -> AppResult<CuppingSession> {
        input.validate()?;
        let session = CuppingSession {
            id: generate_id(IdKind::CuppingSession),
            name: input.name.trim().to_string(),
            date: input.date.unwrap_or_else(|| Utc::now().date_naive()),
            session_type: SessionType::Competition,
            status: SessionStatus::Setup,
            judges: vec![],
            samples: vec![],
            scores: vec![],
            results: None,
            created_by: user.user_id.clone(),
        };

        let mut data = self.store.write().await;
        data.cupping_sessions.push(session.clone());

        tracing::info!(session_id = %session.id, name = %session.name, "Competition session created");
        Ok(session)
    }

    pub async fn add_judge(
        &self,
        session_id: &str,
        input: AddJudgeInput,
    ) -> AppResult<CuppingSession> {
        let mut data = self.store.write().await;
        let idx = Self::session_index(&data, session_id)?;

        let judge = data
            .user(&input.judge_id)
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;
        if !judge.role.can_judge() {
            return Err(AppError::validation(
                "judge_id",
                "Only cuppers and head judges can sit on a panel",
            ));
        }

        let session = &mut data.cupping_sessions[idx];
        if session.status != SessionStatus::Setup {
            return Err(not_modifiable(session, "add judges"));
        }
        if session.judges.contains(&input.judge_id) {
            return Err(AppError::DuplicateEntry("judge_id".to_string()));
        }

        session.judges.push(input.judge_id);
        tracing::info!(session_id, judges = session.judges.len(), "Judge added");
        Ok(session.clone())
    }

    /// Place a lot on the table under the next blind code
    pub async fn add_sample(
        &self,
        session_id: &str,
        input: AddSampleInput,
    ) -> AppResult<CuppingSample> {
        let mut data = self.store.write().await;
        let idx = Self::session_index(&data, session_id)?;

        if data.green_lot(&input.green_bean_lot_id).is_none() {
            return Err(AppError::NotFound("Green bean lot".to_string()));
        }

        let session = &mut data.cupping_sessions[idx];
        if session.status != SessionStatus::Setup {
            return Err(not_modifiable(session, "add samples"));
        }
        if session
            .samples
            .iter()
            .any(|s| s.green_bean_lot_id == input.green_bean_lot_id)
        {
            return Err(AppError::DuplicateEntry("green_bean_lot_id".to_string()));
        }

        let sample = CuppingSample {
            id: generate_id(IdKind::CuppingSample),
            green_bean_lot_id: input.green_bean_lot_id,
            blind_code: blind_code(session.samples.len() + 1),
        };
        session.samples.push(sample.clone());

        tracing::info!(session_id, blind_code = %sample.blind_code, "Sample added");
        Ok(sample)
    }

    /// Advance a competition to its next stage
    pub async fn advance(&self, session_id: &str) -> AppResult<CuppingSession> {
        let mut data = self.store.write().await;
        let idx = Self::session_index(&data, session_id)?;
        let session = &mut data.cupping_sessions[idx];

        let next = match session.status.next() {
            Some(next) => next,
            None => return Err(not_modifiable(session, "advance")),
        };

        match session.status {
            SessionStatus::Setup => {
                if session.judges.is_empty() || session.samples.is_empty() {
                    return Err(AppError::InvalidStateTransition(
                        "A session needs at least one judge and one sample before scoring"
                            .to_string(),
                    ));
                }
            }
            SessionStatus::Scoring => {
                let pending = session.pending_sheets();
                if pending > 0 {
                    tracing::warn!(session_id, pending, "Rejected advance with missing sheets");
                    return Err(AppError::InvalidStateTransition(format!(
                        "{} score sheet(s) still missing",
                        pending
                    )));
                }
            }
            SessionStatus::Adjudication | SessionStatus::Finalized => {}
        }

        if next == SessionStatus::Finalized {
            finalize(&mut data, idx);
        } else {
            session.status = next;
        }

        let session = &data.cupping_sessions[idx];
        tracing::info!(session_id, status = %session.status, "Session advanced");
        Ok(session.clone())
    }

    /// A judge submits (or corrects) their own sheet while scoring is open
    pub async fn submit_score(
        &self,
        user: &AuthUser,
        session_id: &str,
        input: SubmitScoreInput,
    ) -> AppResult<JudgeScore> {
        validate_sheet(&input.sheet)?;

        let mut data = self.store.write().await;
        let idx = Self::session_index(&data, session_id)?;
        let session = &mut data.cupping_sessions[idx];

        if session.status != SessionStatus::Scoring {
            return Err(not_modifiable(session, "submit scores"));
        }
        if !session.judges.contains(&user.user_id) {
            return Err(AppError::InsufficientPermissions);
        }
        if session.sample(&input.sample_id).is_none() {
            return Err(AppError::NotFound("Cupping sample".to_string()));
        }

        let score = JudgeScore {
            sample_id: input.sample_id,
            judge_id: user.user_id.clone(),
            total: input.sheet.total(),
            sheet: input.sheet,
            submitted_at: Utc::now(),
            adjudicated: false,
        };
        session
            .scores
            .retain(|s| !(s.sample_id == score.sample_id && s.judge_id == score.judge_id));
        session.scores.push(score.clone());

        tracing::info!(session_id, sample_id = %score.sample_id, judge_id = %score.judge_id, total = %score.total, "Score submitted");
        Ok(score)
    }

    /// Head judge replaces a sheet during adjudication
    pub async fn override_score(
        &self,
        session_id: &str,
        sample_id: &str,
        judge_id: &str,
        input: OverrideScoreInput,
    ) -> AppResult<JudgeScore> {
        validate_sheet(&input.sheet)?;

        let mut data = self.store.write().await;
        let idx = Self::session_index(&data, session_id)?;
        let session = &mut data.cupping_sessions[idx];

        if session.status != SessionStatus::Adjudication {
            return Err(not_modifiable(session, "override scores"));
        }

        let score = session
            .scores
            .iter_mut()
            .find(|s| s.sample_id == sample_id && s.judge_id == judge_id)
            .ok_or_else(|| AppError::NotFound("Score sheet".to_string()))?;

        score.total = input.sheet.total();
        score.sheet = input.sheet;
        score.submitted_at = Utc::now();
        score.adjudicated = true;

        tracing::info!(session_id, sample_id, judge_id, total = %score.total, "Score adjudicated");
        Ok(score.clone())
    }

    /// Ad hoc QC cupping: one cupper, one lot, stored finalized with rank 1
    pub async fn create_qc_session(
        &self,
        user: &AuthUser,
        input: CreateQcInput,
    ) -> AppResult<CuppingSession> {
        input.validate()?;
        validate_sheet(&input.sheet)?;

        let mut data = self.store.write().await;
        if data.green_lot(&input.green_bean_lot_id).is_none() {
            return Err(AppError::NotFound("Green bean lot".to_string()));
        }

        let sample = CuppingSample {
            id: generate_id(IdKind::CuppingSample),
            green_bean_lot_id: input.green_bean_lot_id.clone(),
            blind_code: blind_code(1),
        };
        let session = CuppingSession {
            id: generate_id(IdKind::CuppingSession),
            name: input
                .name
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| format!("QC {}", input.green_bean_lot_id)),
            date: input.date.unwrap_or_else(|| Utc::now().date_naive()),
            session_type: SessionType::Qc,
            status: SessionStatus::Adjudication,
            judges: vec![user.user_id.clone()],
            scores: vec![JudgeScore {
                sample_id: sample.id.clone(),
                judge_id: user.user_id.clone(),
                total: input.sheet.total(),
                sheet: input.sheet,
                submitted_at: Utc::now(),
                adjudicated: false,
            }],
            samples: vec![sample],
            results: None,
            created_by: user.user_id.clone(),
        };

        data.cupping_sessions.push(session);
        let idx = data.cupping_sessions.len() - 1;
        finalize(&mut data, idx);

        let session = data.cupping_sessions[idx].clone();
        tracing::info!(session_id = %session.id, lot_id = %input.green_bean_lot_id, "QC cupping recorded");
        Ok(session)
    }

    /// Sessions visible to the user
    ///
    /// Cuppers see only the sessions they judge; head judges and admins see all.
    pub async fn list_sessions(&self, user: &AuthUser) -> AppResult<Vec<CuppingSession>> {
        let data = self.store.read().await;
        let mut sessions: Vec<CuppingSession> = data
            .cupping_sessions
            .iter()
            .filter(|s| user.is_head_judge() || s.judges.contains(&user.user_id))
            .map(|s| view_for(user, s))
            .collect();
        sessions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(sessions)
    }

    pub async fn get_session(&self, user: &AuthUser, session_id: &str) -> AppResult<CuppingSession> {
        let data = self.store.read().await;
        let session = data
            .session(session_id)
            .ok_or_else(|| AppError::NotFound("Cupping session".to_string()))?;

        if !user.is_head_judge() && !session.judges.contains(&user.user_id) {
            return Err(AppError::InsufficientPermissions);
        }
        Ok(view_for(user, session))
    }
}
