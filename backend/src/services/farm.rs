//! Farm registry service

use serde::Deserialize;
use shared::{generate_id, Farm, IdKind, Role};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::store::Store;

/// Farm service
#[derive(Clone)]
pub struct FarmService {
    store: Store,
}

/// Input for registering a farm
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFarmInput {
    #[validate(length(min = 1, max = 200))]
    pub farmer_name: String,
    #[validate(length(min = 1, max = 500))]
    pub location: String,
    /// Admins may assign the farm to a farmer account
    pub owner_id: Option<String>,
}

/// Input for updating a farm
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFarmInput {
    #[validate(length(min = 1, max = 200))]
    pub farmer_name: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub location: Option<String>,
}

impl FarmService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Register a farm; farmers always own the farms they create
    pub async fn create_farm(&self, user: &AuthUser, input: CreateFarmInput) -> AppResult<Farm> {
        input.validate()?;
        let mut data = self.store.write().await;

        let owner_id = if user.role == Role::Farmer {
            Some(user.user_id.clone())
        } else {
            input.owner_id
        };

        if let Some(owner) = owner_id.as_deref() {
            match data.user(owner) {
                Some(u) if u.role == Role::Farmer => {}
                Some(_) => {
                    return Err(AppError::validation(
                        "owner_id",
                        "Farm owner must be a farmer account",
                    ))
                }
                None => return Err(AppError::NotFound("User".to_string())),
            }
        }

        let farm = Farm {
            id: generate_id(IdKind::Farm),
            farmer_name: input.farmer_name.trim().to_string(),
            location: input.location.trim().to_string(),
            owner_id,
        };
        data.farms.push(farm.clone());

        tracing::info!(farm_id = %farm.id, "Farm registered");
        Ok(farm)
    }

    /// Farmers see their own farms; every other role sees all farms
    pub async fn list_farms(&self, user: &AuthUser) -> AppResult<Vec<Farm>> {
        let data = self.store.read().await;
        let farms = data
            .farms
            .iter()
            .filter(|f| user.role != Role::Farmer || f.owner_id.as_deref() == Some(&user.user_id))
            .cloned()
            .collect();
        Ok(farms)
    }

    pub async fn get_farm(&self, user: &AuthUser, farm_id: &str) -> AppResult<Farm> {
        let data = self.store.read().await;
        let farm = data
            .farm(farm_id)
            .ok_or_else(|| AppError::NotFound("Farm".to_string()))?;

        if user.role == Role::Farmer && farm.owner_id.as_deref() != Some(&user.user_id) {
            return Err(AppError::InsufficientPermissions);
        }
        Ok(farm.clone())
    }

    pub async fn update_farm(
        &self,
        user: &AuthUser,
        farm_id: &str,
        input: UpdateFarmInput,
    ) -> AppResult<Farm> {
        input.validate()?;
        let mut data = self.store.write().await;
        let farm = data
            .farms
            .iter_mut()
            .find(|f| f.id == farm_id)
            .ok_or_else(|| AppError::NotFound("Farm".to_string()))?;

        if user.role == Role::Farmer && farm.owner_id.as_deref() != Some(&user.user_id) {
            return Err(AppError::InsufficientPermissions);
        }

        if let Some(name) = input.farmer_name {
            farm.farmer_name = name.trim().to_string();
        }
        if let Some(location) = input.location {
            farm.location = location.trim().to_string();
        }

        tracing::info!(farm_id = %farm.id, "Farm updated");
        Ok(farm.clone())
    }
}
