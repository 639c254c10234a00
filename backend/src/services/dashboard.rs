//! Role-specific dashboard summaries

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{Availability, Farm, GapLogEntry, ParchmentStatus, Role, SessionStatus};

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::store::{AppData, Store};

const RECENT_GAP_ENTRIES: usize = 5;

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    store: Store,
}

/// Dashboard payload, tagged by the viewer's role
#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Dashboard {
    Farmer(FarmerDashboard),
    Processor(ProcessorDashboard),
    Roaster(RoasterDashboard),
    Cupper(CupperDashboard),
    HeadJudge(HeadJudgeDashboard),
    Admin(AdminDashboard),
}

#[derive(Debug, Serialize)]
pub struct FarmerDashboard {
    pub farms: Vec<Farm>,
    pub lots_by_status: BTreeMap<String, usize>,
    pub total_harvest_kg: Decimal,
    pub recent_gap_entries: Vec<GapLogEntry>,
}

#[derive(Debug, Serialize)]
pub struct ProcessorDashboard {
    pub batches_by_status: BTreeMap<String, usize>,
    pub lots_ready_for_processing: usize,
    pub parchment_awaiting_hulling: usize,
    pub parchment_awaiting_kg: Decimal,
    pub green_stock_by_grade: BTreeMap<String, Decimal>,
}

#[derive(Debug, Serialize)]
pub struct RoasterDashboard {
    pub inventory_items: usize,
    pub inventory_remaining_kg: Decimal,
    pub roast_batches: usize,
    pub average_yield_percent: Option<Decimal>,
    pub available_green_lots: usize,
}

#[derive(Debug, Serialize)]
pub struct CupperDashboard {
    pub sessions_by_status: BTreeMap<String, usize>,
    pub pending_sheets: usize,
}

#[derive(Debug, Serialize)]
pub struct HeadJudgeDashboard {
    pub sessions_by_status: BTreeMap<String, usize>,
    pub pending_sheets: usize,
    pub awaiting_finalization: usize,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub entity_counts: BTreeMap<String, usize>,
    pub users_by_role: BTreeMap<String, usize>,
}

fn count_by<I: IntoIterator<Item = &'static str>>(keys: I) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key.to_string()).or_insert(0) += 1;
    }
    counts
}

fn farmer(data: &AppData, user: &AuthUser) -> FarmerDashboard {
    let farms: Vec<Farm> = data
        .farms
        .iter()
        .filter(|f| f.owner_id.as_deref() == Some(&user.user_id))
        .cloned()
        .collect();
    let owns = |farm_id: &str| farms.iter().any(|f| f.id == farm_id);

    let lots: Vec<_> = data.harvest_lots.iter().filter(|l| owns(&l.farm_id)).collect();

    let mut recent_gap_entries: Vec<GapLogEntry> = data
        .gap_logs
        .iter()
        .filter(|e| owns(&e.farm_id))
        .cloned()
        .collect();
    recent_gap_entries.sort_by(|a, b| b.date.cmp(&a.date));
    recent_gap_entries.truncate(RECENT_GAP_ENTRIES);

    FarmerDashboard {
        lots_by_status: count_by(lots.iter().map(|l| l.status.as_str())),
        total_harvest_kg: lots.iter().map(|l| l.weight_kg).sum(),
        recent_gap_entries,
        farms,
    }
}

fn processor(data: &AppData) -> ProcessorDashboard {
    let awaiting: Vec<_> = data
        .parchment_lots
        .iter()
        .filter(|p| p.status == ParchmentStatus::AwaitingHulling)
        .collect();

    let mut green_stock_by_grade = BTreeMap::new();
    for lot in data
        .green_bean_lots
        .iter()
        .filter(|l| l.status != Availability::Depleted)
    {
        *green_stock_by_grade
            .entry(lot.grade.to_string())
            .or_insert(Decimal::ZERO) += lot.current_weight_kg;
    }

    ProcessorDashboard {
        batches_by_status: count_by(data.processing_batches.iter().map(|b| b.status.as_str())),
        lots_ready_for_processing: data
            .harvest_lots
            .iter()
            .filter(|l| l.status == shared::HarvestLotStatus::Ready)
            .count(),
        parchment_awaiting_hulling: awaiting.len(),
        parchment_awaiting_kg: awaiting.iter().map(|p| p.weight_kg).sum(),
        green_stock_by_grade,
    }
}

fn roaster(data: &AppData, user: &AuthUser) -> RoasterDashboard {
    let items: Vec<_> = data
        .roaster_inventory
        .iter()
        .filter(|i| i.roaster_id == user.user_id)
        .collect();
    let batches: Vec<_> = data
        .roast_batches
        .iter()
        .filter(|b| b.roaster_id == user.user_id)
        .collect();

    let average_yield_percent = if batches.is_empty() {
        None
    } else {
        let total: Decimal = batches.iter().map(|b| b.yield_percent).sum();
        Some((total / Decimal::from(batches.len())).round_dp(2))
    };

    RoasterDashboard {
        inventory_items: items.len(),
        inventory_remaining_kg: items.iter().map(|i| i.remaining_weight_kg).sum(),
        roast_batches: batches.len(),
        average_yield_percent,
        available_green_lots: data
            .green_bean_lots
            .iter()
            .filter(|l| l.status == Availability::Available)
            .count(),
    }
}

fn cupper(data: &AppData, user: &AuthUser) -> CupperDashboard {
    let sessions: Vec<_> = data
        .cupping_sessions
        .iter()
        .filter(|s| s.judges.contains(&user.user_id))
        .collect();

    CupperDashboard {
        sessions_by_status: count_by(sessions.iter().map(|s| s.status.as_str())),
        pending_sheets: sessions
            .iter()
            .filter(|s| s.status == SessionStatus::Scoring)
            .map(|s| s.pending_sheets_for(&user.user_id))
            .sum(),
    }
}

fn head_judge(data: &AppData) -> HeadJudgeDashboard {
    HeadJudgeDashboard {
        sessions_by_status: count_by(data.cupping_sessions.iter().map(|s| s.status.as_str())),
        pending_sheets: data
            .cupping_sessions
            .iter()
            .filter(|s| s.status == SessionStatus::Scoring)
            .map(|s| s.pending_sheets())
            .sum(),
        awaiting_finalization: data
            .cupping_sessions
            .iter()
            .filter(|s| s.status == SessionStatus::Adjudication)
            .count(),
    }
}

fn admin(data: &AppData) -> AdminDashboard {
    let entity_counts = [
        ("users", data.users.len()),
        ("farms", data.farms.len()),
        ("harvest_lots", data.harvest_lots.len()),
        ("processing_batches", data.processing_batches.len()),
        ("parchment_lots", data.parchment_lots.len()),
        ("green_bean_lots", data.green_bean_lots.len()),
        ("cupping_sessions", data.cupping_sessions.len()),
        ("gap_logs", data.gap_logs.len()),
        ("roaster_inventory", data.roaster_inventory.len()),
        ("roast_batches", data.roast_batches.len()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    AdminDashboard {
        entity_counts,
        users_by_role: count_by(data.users.iter().map(|u| u.role.as_str())),
    }
}

impl DashboardService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Summary for the viewer's role
    pub async fn for_user(&self, user: &AuthUser) -> AppResult<Dashboard> {
        let data = self.store.read().await;
        let dashboard = match user.role {
            Role::Farmer => Dashboard::Farmer(farmer(&data, user)),
            Role::Processor => Dashboard::Processor(processor(&data)),
            Role::Roaster => Dashboard::Roaster(roaster(&data, user)),
            Role::Cupper => Dashboard::Cupper(cupper(&data, user)),
            Role::HeadJudge => Dashboard::HeadJudge(head_judge(&data)),
            Role::Admin => Dashboard::Admin(admin(&data)),
        };
        tracing::debug!(user_id = %user.user_id, role = %user.role, "Dashboard built");
        Ok(dashboard)
    }
}
