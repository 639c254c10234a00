//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::str::FromStr;

use coffee_trace_backend::middleware::AuthUser;
use coffee_trace_backend::store::SEED_USERS;
use coffee_trace_backend::{AppState, Config};
use rust_decimal::Decimal;
use shared::{CuppingDefects, Role, ScoreSheet};

pub const FARMER: usize = 0;
pub const PROCESSOR: usize = 1;
pub const ROASTER: usize = 2;
pub const CUPPER: usize = 3;
pub const CUPPER2: usize = 4;
pub const HEAD_JUDGE: usize = 5;
pub const ADMIN: usize = 6;

// Helper to create Decimal from string
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn test_config(seed_demo_data: bool) -> Config {
    let mut config = Config::default();
    config.auth.bcrypt_cost = 4;
    config.store.seed_demo_data = seed_demo_data;
    config
}

/// State with the demo supply chain loaded
pub fn demo_state() -> AppState {
    AppState::new(test_config(true)).unwrap()
}

/// State with only the seeded accounts
pub fn empty_state() -> AppState {
    AppState::new(test_config(false)).unwrap()
}

/// One of the seeded accounts as an authenticated user
pub fn seeded(index: usize) -> AuthUser {
    let (id, name, email, role) = SEED_USERS[index];
    AuthUser {
        user_id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role,
    }
}

pub fn user_with_role(id: &str, role: Role) -> AuthUser {
    AuthUser {
        user_id: id.to_string(),
        name: format!("Test {}", role),
        email: format!("{}@coffee.test", id.to_lowercase()),
        role,
    }
}

/// Sheet with every sensory attribute at `value` and perfect cups
pub fn sheet(value: &str) -> ScoreSheet {
    let v = dec(value);
    ScoreSheet {
        fragrance_aroma: v,
        flavor: v,
        aftertaste: v,
        acidity: v,
        body: v,
        balance: v,
        uniformity: Decimal::from(10),
        clean_cup: Decimal::from(10),
        sweetness: Decimal::from(10),
        overall: v,
        defects: CuppingDefects::default(),
        notes: None,
    }
}
