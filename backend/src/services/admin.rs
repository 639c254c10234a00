//! Administration service: user management and cascading deletes
//!
//! Cascades are explicit per entity; nothing else is removed implicitly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shared::{
    generate_id, validate_email, validate_password, IdKind, Role, SessionStatus, User,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::store::Store;

/// Admin service
#[derive(Clone)]
pub struct AdminService {
    store: Store,
    bcrypt_cost: u32,
}

/// Input for creating a user account
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Records removed by a delete, keyed by collection
#[derive(Debug, Default, Serialize)]
pub struct DeleteSummary {
    pub deleted: BTreeMap<String, usize>,
}

impl DeleteSummary {
    fn record(&mut self, collection: &str, count: usize) {
        self.deleted.insert(collection.to_string(), count);
    }
}

/// Remove matching items, returning how many went
fn remove_where<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> usize {
    let before = items.len();
    items.retain(|item| !pred(item));
    before - items.len()
}

impl AdminService {
    pub fn new(store: Store, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let data = self.store.read().await;
        Ok(data.users.clone())
    }

    pub async fn create_user(&self, input: CreateUserInput) -> AppResult<User> {
        input.validate()?;
        let email = input.email.trim().to_lowercase();
        validate_email(&email).map_err(|msg| AppError::validation("email", msg))?;
        validate_password(&input.password).map_err(|msg| AppError::validation("password", msg))?;

        let password_hash = bcrypt::hash(&input.password, self.bcrypt_cost)
            .map_err(|e| AppError::Internal(format!("Password hashing error: {}", e)))?;

        let mut data = self.store.write().await;
        if data.user_by_email(&email).is_some() {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        let user = User {
            id: generate_id(IdKind::User),
            name: input.name.trim().to_string(),
            email,
            role: input.role,
            password_hash,
        };
        data.users.push(user.clone());

        tracing::info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    pub async fn delete_user(&self, actor: &AuthUser, user_id: &str) -> AppResult<DeleteSummary> {
        if actor.user_id == user_id {
            return Err(AppError::validation("user_id", "You cannot delete your own account"));
        }

        let mut data = self.store.write().await;
        let removed = remove_where(&mut data.users, |u| u.id == user_id);
        if removed == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        // Open competition panels lose the judge and any sheets they left
        let mut panels = 0;
        let mut sheets = 0;
        for session in data.cupping_sessions.iter_mut().filter(|s| {
            matches!(s.status, SessionStatus::Setup | SessionStatus::Scoring)
        }) {
            if remove_where(&mut session.judges, |j| j == user_id) > 0 {
                panels += 1;
                sheets += remove_where(&mut session.scores, |s| s.judge_id == user_id);
            }
        }

        let mut summary = DeleteSummary::default();
        summary.record("users", removed);
        summary.record("session_panels", panels);
        summary.record("score_sheets", sheets);
        tracing::info!(user_id, deleted_by = %actor.user_id, "User deleted");
        Ok(summary)
    }

    /// Delete a farm with its harvest lots and GAP entries
    pub async fn delete_farm(&self, farm_id: &str) -> AppResult<DeleteSummary> {
        let mut data = self.store.write().await;
        let farms = remove_where(&mut data.farms, |f| f.id == farm_id);
        if farms == 0 {
            return Err(AppError::NotFound("Farm".to_string()));
        }

        let mut summary = DeleteSummary::default();
        summary.record("farms", farms);
        summary.record(
            "harvest_lots",
            remove_where(&mut data.harvest_lots, |l| l.farm_id == farm_id),
        );
        summary.record(
            "gap_logs",
            remove_where(&mut data.gap_logs, |e| e.farm_id == farm_id),
        );

        tracing::info!(farm_id, ?summary.deleted, "Farm deleted");
        Ok(summary)
    }

    /// Delete a harvest lot with its processing batches and their parchment lots
    pub async fn delete_harvest_lot(&self, lot_id: &str) -> AppResult<DeleteSummary> {
        let mut data = self.store.write().await;
        let lots = remove_where(&mut data.harvest_lots, |l| l.id == lot_id);
        if lots == 0 {
            return Err(AppError::NotFound("Harvest lot".to_string()));
        }

        let batch_ids: Vec<String> = data
            .processing_batches
            .iter()
            .filter(|b| b.harvest_lot_id == lot_id)
            .map(|b| b.id.clone())
            .collect();

        let mut summary = DeleteSummary::default();
        summary.record("harvest_lots", lots);
        summary.record(
            "processing_batches",
            remove_where(&mut data.processing_batches, |b| b.harvest_lot_id == lot_id),
        );
        summary.record(
            "parchment_lots",
            remove_where(&mut data.parchment_lots, |p| batch_ids.contains(&p.batch_id)),
        );

        tracing::info!(lot_id, ?summary.deleted, "Harvest lot deleted");
        Ok(summary)
    }

    /// Delete a green bean lot with roaster inventory on it and their roast batches
    pub async fn delete_green_lot(&self, lot_id: &str) -> AppResult<DeleteSummary> {
        let mut data = self.store.write().await;
        let lots = remove_where(&mut data.green_bean_lots, |l| l.id == lot_id);
        if lots == 0 {
            return Err(AppError::NotFound("Green bean lot".to_string()));
        }

        let item_ids: Vec<String> = data
            .roaster_inventory
            .iter()
            .filter(|i| i.green_bean_lot_id == lot_id)
            .map(|i| i.id.clone())
            .collect();

        let mut summary = DeleteSummary::default();
        summary.record("green_bean_lots", lots);
        summary.record(
            "roaster_inventory",
            remove_where(&mut data.roaster_inventory, |i| i.green_bean_lot_id == lot_id),
        );
        summary.record(
            "roast_batches",
            remove_where(&mut data.roast_batches, |b| item_ids.contains(&b.inventory_item_id)),
        );

        tracing::info!(lot_id, ?summary.deleted, "Green bean lot deleted");
        Ok(summary)
    }

    pub async fn delete_session(&self, session_id: &str) -> AppResult<DeleteSummary> {
        let mut data = self.store.write().await;
        let sessions = remove_where(&mut data.cupping_sessions, |s| s.id == session_id);
        if sessions == 0 {
            return Err(AppError::NotFound("Cupping session".to_string()));
        }

        let mut summary = DeleteSummary::default();
        summary.record("cupping_sessions", sessions);
        tracing::info!(session_id, "Cupping session deleted");
        Ok(summary)
    }
}
