//! In-memory data store
//!
//! All entities live in one `AppData` behind a tokio `RwLock`. Services take
//! the read guard for queries and the write guard for the whole of a mutation.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use shared::{
    blind_code, compute_results, generate_id, Availability, BatchCompletion, BatchStatus,
    CuppingDefects, CuppingSample, CuppingSession, DryingReading, Farm, GapActivity, GapLogEntry,
    GreenBeanLot, GreenGrade, HarvestLot, HarvestLotStatus, IdKind, JudgeScore, LotCuppingScore,
    ParchmentLot, ParchmentStatus, PhysicalLabResults, ProcessType, ProcessingBatch, RoastBatch,
    RoasterInventoryItem, Role, ScoreSheet, SessionStatus, SessionType, User,
};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Shared handle to the store
pub type Store = Arc<RwLock<AppData>>;

/// Every collection the platform keeps
#[derive(Debug, Clone, Default)]
pub struct AppData {
    pub users: Vec<User>,
    pub farms: Vec<Farm>,
    pub harvest_lots: Vec<HarvestLot>,
    pub processing_batches: Vec<ProcessingBatch>,
    pub parchment_lots: Vec<ParchmentLot>,
    pub green_bean_lots: Vec<GreenBeanLot>,
    pub cupping_sessions: Vec<CuppingSession>,
    pub gap_logs: Vec<GapLogEntry>,
    pub roaster_inventory: Vec<RoasterInventoryItem>,
    pub roast_batches: Vec<RoastBatch>,
    /// Random-password hash checked on logins for unknown emails
    pub login_dummy_hash: String,
}

impl AppData {
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
    }

    pub fn farm(&self, id: &str) -> Option<&Farm> {
        self.farms.iter().find(|f| f.id == id)
    }

    pub fn harvest_lot(&self, id: &str) -> Option<&HarvestLot> {
        self.harvest_lots.iter().find(|l| l.id == id)
    }

    pub fn batch(&self, id: &str) -> Option<&ProcessingBatch> {
        self.processing_batches.iter().find(|b| b.id == id)
    }

    pub fn parchment_lot(&self, id: &str) -> Option<&ParchmentLot> {
        self.parchment_lots.iter().find(|p| p.id == id)
    }

    pub fn green_lot(&self, id: &str) -> Option<&GreenBeanLot> {
        self.green_bean_lots.iter().find(|g| g.id == id)
    }

    pub fn session(&self, id: &str) -> Option<&CuppingSession> {
        self.cupping_sessions.iter().find(|s| s.id == id)
    }

    pub fn inventory_item(&self, id: &str) -> Option<&RoasterInventoryItem> {
        self.roaster_inventory.iter().find(|i| i.id == id)
    }

    /// Farms a user may act on as farmer
    pub fn owns_farm(&self, user_id: &str, farm_id: &str) -> bool {
        self.farm(farm_id)
            .map_or(false, |f| f.owner_id.as_deref() == Some(user_id))
    }
}

/// Wrap data into a shareable store
pub fn new_store(data: AppData) -> Store {
    Arc::new(RwLock::new(data))
}

/// Password every seeded account is created with
pub const DEMO_PASSWORD: &str = "coffee123";

/// Seeded accounts: (id, name, email, role)
pub const SEED_USERS: [(&str, &str, &str, Role); 7] = [
    ("USR-00000001", "Somchai Farmer", "farmer@coffee.test", Role::Farmer),
    ("USR-00000002", "Malee Processor", "processor@coffee.test", Role::Processor),
    ("USR-00000003", "Arthit Roaster", "roaster@coffee.test", Role::Roaster),
    ("USR-00000004", "Nok Cupper", "cupper@coffee.test", Role::Cupper),
    ("USR-00000005", "Kanya Cupper", "cupper2@coffee.test", Role::Cupper),
    ("USR-00000006", "Prasert Head Judge", "judge@coffee.test", Role::HeadJudge),
    ("USR-00000007", "Platform Admin", "admin@coffee.test", Role::Admin),
];

/// Build the initial store contents
pub fn seed(config: &Config) -> AppResult<AppData> {
    let password_hash = bcrypt::hash(DEMO_PASSWORD, config.auth.bcrypt_cost)
        .map_err(|e| AppError::Internal(format!("Password hashing error: {}", e)))?;

    let login_dummy_hash = bcrypt::hash(generate_id(IdKind::User), config.auth.bcrypt_cost)
        .map_err(|e| AppError::Internal(format!("Password hashing error: {}", e)))?;

    let mut data = AppData {
        users: SEED_USERS
            .iter()
            .map(|(id, name, email, role)| User {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
                role: *role,
                password_hash: password_hash.clone(),
            })
            .collect(),
        login_dummy_hash,
        ..AppData::default()
    };

    if config.store.seed_demo_data {
        seed_demo_chain(&mut data);
    }

    tracing::info!(
        users = data.users.len(),
        farms = data.farms.len(),
        green_lots = data.green_bean_lots.len(),
        "Store seeded"
    );

    Ok(data)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

fn sensory_sheet(value: Decimal, notes: &str) -> ScoreSheet {
    ScoreSheet {
        fragrance_aroma: value,
        flavor: value,
        aftertaste: value,
        acidity: value,
        body: value,
        balance: value,
        uniformity: Decimal::from(10),
        clean_cup: Decimal::from(10),
        sweetness: Decimal::from(10),
        overall: value,
        defects: CuppingDefects::default(),
        notes: Some(notes.to_string()),
    }
}

/// One farm traced all the way to graded green coffee with a QC score
fn seed_demo_chain(data: &mut AppData) {
    let farmer = SEED_USERS[0];
    let cupper = SEED_USERS[3];

    data.farms.push(Farm {
        id: "FARM-00000001".to_string(),
        farmer_name: farmer.1.to_string(),
        location: "Doi Chang, Chiang Rai".to_string(),
        owner_id: Some(farmer.0.to_string()),
    });

    data.gap_logs.push(GapLogEntry {
        id: "GAP-00000001".to_string(),
        farm_id: "FARM-00000001".to_string(),
        date: date(2024, 9, 2),
        activity: GapActivity::Fertilizer,
        description: "Organic compost applied to upper terraces".to_string(),
        product_used: Some("Coffee pulp compost".to_string()),
        quantity: Some(Decimal::from(250)),
        recorded_by: farmer.0.to_string(),
    });

    data.harvest_lots.push(HarvestLot {
        id: "HL-00000001".to_string(),
        farm_id: "FARM-00000001".to_string(),
        farmer_name: farmer.1.to_string(),
        variety: "Typica".to_string(),
        weight_kg: Decimal::from(500),
        plot: "North Slope".to_string(),
        harvest_date: date(2024, 11, 20),
        status: HarvestLotStatus::Processing,
        created_by: Some(farmer.0.to_string()),
    });
    data.harvest_lots.push(HarvestLot {
        id: "HL-00000002".to_string(),
        farm_id: "FARM-00000001".to_string(),
        farmer_name: farmer.1.to_string(),
        variety: "Catimor".to_string(),
        weight_kg: Decimal::from(320),
        plot: "Creek Plot".to_string(),
        harvest_date: date(2024, 12, 5),
        status: HarvestLotStatus::Ready,
        created_by: Some(farmer.0.to_string()),
    });

    let drying_start = Utc.with_ymd_and_hms(2024, 11, 22, 8, 0, 0).single();
    let drying_log = drying_start
        .map(|start| {
            [(380, 315, 62), (245, 330, 58), (115, 300, 55)]
                .into_iter()
                .enumerate()
                .map(|(day, (moisture, temp, humidity))| DryingReading {
                    timestamp: start + Duration::days(day as i64 * 4),
                    moisture_percent: Decimal::new(moisture, 1),
                    temperature_celsius: Decimal::new(temp, 1),
                    humidity_percent: Decimal::from(humidity),
                })
                .collect()
        })
        .unwrap_or_default();

    data.processing_batches.push(ProcessingBatch {
        id: "PB-00000001".to_string(),
        harvest_lot_id: "HL-00000001".to_string(),
        status: BatchStatus::Completed,
        process_type: ProcessType::Washed,
        start_date: date(2024, 11, 21),
        drying_log,
        completion: Some(BatchCompletion {
            completed_date: date(2024, 12, 6),
            final_moisture_percent: Decimal::new(115, 1),
            parchment_weight_kg: Decimal::from(100),
        }),
    });

    data.parchment_lots.push(ParchmentLot {
        id: "PL-00000001".to_string(),
        batch_id: "PB-00000001".to_string(),
        weight_kg: Decimal::ZERO,
        moisture_percent: Decimal::new(115, 1),
        status: ParchmentStatus::Hulled,
        lab_results: Some(PhysicalLabResults {
            moisture_percent: Decimal::new(112, 1),
            water_activity: Decimal::new(55, 2),
            density: Some(Decimal::from(720)),
            screen_size: Some(16),
            primary_defects: 0,
            secondary_defects: 3,
            tested_by: SEED_USERS[1].0.to_string(),
            tested_at: drying_start.unwrap_or_else(Utc::now) + Duration::days(15),
        }),
    });

    for (id, grade, weight) in [
        ("GB-00000001", GreenGrade::Aa, Decimal::from(48)),
        ("GB-00000002", GreenGrade::A, Decimal::from(32)),
    ] {
        data.green_bean_lots.push(GreenBeanLot {
            id: id.to_string(),
            parchment_lot_id: "PL-00000001".to_string(),
            grade,
            initial_weight_kg: weight,
            current_weight_kg: weight,
            status: Availability::Available,
            cupping_scores: vec![],
            withdrawals: vec![],
        });
    }

    let sheet = sensory_sheet(Decimal::new(825, 2), "Stone fruit, honey, clean finish");
    let mut qc = CuppingSession {
        id: "CS-00000001".to_string(),
        name: "QC GB-00000001".to_string(),
        date: date(2024, 12, 12),
        session_type: SessionType::Qc,
        status: SessionStatus::Finalized,
        judges: vec![cupper.0.to_string()],
        samples: vec![CuppingSample {
            id: "SMP-00000001".to_string(),
            green_bean_lot_id: "GB-00000001".to_string(),
            blind_code: blind_code(1),
        }],
        scores: vec![JudgeScore {
            sample_id: "SMP-00000001".to_string(),
            judge_id: cupper.0.to_string(),
            total: sheet.total(),
            sheet,
            submitted_at: Utc::now(),
            adjudicated: false,
        }],
        results: None,
        created_by: cupper.0.to_string(),
    };
    let results = compute_results(&qc);
    if let (Some(result), Some(lot)) = (results.first(), data.green_bean_lots.first_mut()) {
        lot.cupping_scores.push(LotCuppingScore {
            session_id: qc.id.clone(),
            session_name: qc.name.clone(),
            date: qc.date,
            score: result.total_score,
        });
    }
    qc.results = Some(results);
    data.cupping_sessions.push(qc);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(seed_demo_data: bool) -> Config {
        let mut config = Config::default();
        config.auth.bcrypt_cost = 4;
        config.store.seed_demo_data = seed_demo_data;
        config
    }

    #[test]
    fn test_seed_users_always_present() {
        let data = seed(&test_config(false)).unwrap();
        assert_eq!(data.users.len(), SEED_USERS.len());
        assert!(data.farms.is_empty());
        let admin = data.user_by_email("ADMIN@coffee.test").unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(bcrypt::verify(DEMO_PASSWORD, &admin.password_hash).unwrap());
    }

    #[test]
    fn test_demo_chain_is_linked() {
        let data = seed(&test_config(true)).unwrap();
        let green = data.green_lot("GB-00000001").unwrap();
        let parchment = data.parchment_lot(&green.parchment_lot_id).unwrap();
        let batch = data.batch(&parchment.batch_id).unwrap();
        let harvest = data.harvest_lot(&batch.harvest_lot_id).unwrap();
        assert!(data.farm(&harvest.farm_id).is_some());
        assert_eq!(green.cupping_scores.len(), 1);
        // 7 x 8.25 + 30
        assert_eq!(green.cupping_scores[0].score, Decimal::new(8775, 2));
    }

    #[test]
    fn test_owns_farm() {
        let data = seed(&test_config(true)).unwrap();
        assert!(data.owns_farm("USR-00000001", "FARM-00000001"));
        assert!(!data.owns_farm("USR-00000002", "FARM-00000001"));
        assert!(!data.owns_farm("USR-00000001", "FARM-MISSING"));
    }
}
