//! Cupping session models and SCA score aggregation

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation::validate_cupping_score;

/// A cupping session (ad hoc QC or judged competition)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuppingSession {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub session_type: SessionType,
    pub status: SessionStatus,
    /// User ids of the judges on the panel
    pub judges: Vec<String>,
    pub samples: Vec<CuppingSample>,
    pub scores: Vec<JudgeScore>,
    pub results: Option<Vec<SampleResult>>,
    pub created_by: String,
}

impl CuppingSession {
    pub fn sample(&self, sample_id: &str) -> Option<&CuppingSample> {
        self.samples.iter().find(|s| s.id == sample_id)
    }

    pub fn score_for(&self, sample_id: &str, judge_id: &str) -> Option<&JudgeScore> {
        self.scores
            .iter()
            .find(|s| s.sample_id == sample_id && s.judge_id == judge_id)
    }

    /// Number of (sample, judge) pairs still waiting for a sheet
    pub fn pending_sheets(&self) -> usize {
        self.samples
            .iter()
            .flat_map(|s| self.judges.iter().map(move |j| (s, j)))
            .filter(|(s, j)| self.score_for(&s.id, j).is_none())
            .count()
    }

    /// Pending sheets for a single judge
    pub fn pending_sheets_for(&self, judge_id: &str) -> usize {
        if !self.judges.iter().any(|j| j == judge_id) {
            return 0;
        }
        self.samples
            .iter()
            .filter(|s| self.score_for(&s.id, judge_id).is_none())
            .count()
    }

    /// Every sample has a sheet from every judge
    pub fn is_fully_scored(&self) -> bool {
        !self.samples.is_empty() && !self.judges.is_empty() && self.pending_sheets() == 0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Qc,
    Competition,
}

/// Competition session stage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Setup,
    Scoring,
    Adjudication,
    Finalized,
}

impl SessionStatus {
    /// The only stage a session may advance to; `Finalized` has none
    pub fn next(&self) -> Option<SessionStatus> {
        match self {
            SessionStatus::Setup => Some(SessionStatus::Scoring),
            SessionStatus::Scoring => Some(SessionStatus::Adjudication),
            SessionStatus::Adjudication => Some(SessionStatus::Finalized),
            SessionStatus::Finalized => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Setup => "setup",
            SessionStatus::Scoring => "scoring",
            SessionStatus::Adjudication => "adjudication",
            SessionStatus::Finalized => "finalized",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Setup => write!(f, "Setup"),
            SessionStatus::Scoring => write!(f, "Scoring"),
            SessionStatus::Adjudication => write!(f, "Adjudication"),
            SessionStatus::Finalized => write!(f, "Finalized"),
        }
    }
}

/// A coffee placed on the cupping table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuppingSample {
    pub id: String,
    pub green_bean_lot_id: String,
    pub blind_code: String,
}

/// Blind code for the n-th sample of a session (1-based)
pub fn blind_code(position: usize) -> String {
    format!("S-{:03}", position)
}

/// One judge's sheet for one sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeScore {
    pub sample_id: String,
    pub judge_id: String,
    pub sheet: ScoreSheet,
    /// Sheet total after defect deduction, fixed at submission
    pub total: Decimal,
    pub submitted_at: DateTime<Utc>,
    /// Set when a head judge overrode the sheet during adjudication
    #[serde(default)]
    pub adjudicated: bool,
}

/// SCA cupping form
/// Sensory attributes are scored 6.0-10.0; uniformity, clean cup and
/// sweetness are 0-10 (2 points per cup)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSheet {
    pub fragrance_aroma: Decimal,
    pub flavor: Decimal,
    pub aftertaste: Decimal,
    pub acidity: Decimal,
    pub body: Decimal,
    pub balance: Decimal,
    pub uniformity: Decimal,
    pub clean_cup: Decimal,
    pub sweetness: Decimal,
    pub overall: Decimal,
    #[serde(default)]
    pub defects: CuppingDefects,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ScoreSheet {
    /// Sum of the ten attributes before deductions
    pub fn raw_total(&self) -> Decimal {
        Attribute::ALL.iter().map(|a| a.value(self)).sum()
    }

    /// Final sheet score
    pub fn total(&self) -> Decimal {
        self.raw_total() - self.defects.total_deduction()
    }

    /// First attribute outside its valid range, if any
    pub fn invalid_attribute(&self) -> Option<Attribute> {
        Attribute::ALL
            .into_iter()
            .find(|a| validate_cupping_score(a.value(self), !a.is_sensory()).is_err())
    }

    pub fn is_valid(&self) -> bool {
        self.invalid_attribute().is_none()
    }
}

/// Defect cups found during cupping
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CuppingDefects {
    /// 2 points each
    pub taint_count: u32,
    /// 4 points each
    pub fault_count: u32,
}

/// Cups on the SCA form; each cup carries at most one defect
pub const CUPS_PER_SAMPLE: u32 = 5;

impl CuppingDefects {
    pub fn total_deduction(&self) -> Decimal {
        Decimal::from(self.taint_count) * Decimal::TWO
            + Decimal::from(self.fault_count) * Decimal::from(4)
    }

    /// Defect cups cannot outnumber the cups on the form
    pub fn validate(&self) -> Result<(), &'static str> {
        if u64::from(self.taint_count) + u64::from(self.fault_count) > u64::from(CUPS_PER_SAMPLE) {
            return Err("Taint and fault cups cannot exceed the 5 cups on the form");
        }
        Ok(())
    }
}

/// Attributes on the SCA form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    FragranceAroma,
    Flavor,
    Aftertaste,
    Acidity,
    Body,
    Balance,
    Uniformity,
    CleanCup,
    Sweetness,
    Overall,
}

impl Attribute {
    pub const ALL: [Attribute; 10] = [
        Attribute::FragranceAroma,
        Attribute::Flavor,
        Attribute::Aftertaste,
        Attribute::Acidity,
        Attribute::Body,
        Attribute::Balance,
        Attribute::Uniformity,
        Attribute::CleanCup,
        Attribute::Sweetness,
        Attribute::Overall,
    ];

    pub fn value(&self, sheet: &ScoreSheet) -> Decimal {
        match self {
            Attribute::FragranceAroma => sheet.fragrance_aroma,
            Attribute::Flavor => sheet.flavor,
            Attribute::Aftertaste => sheet.aftertaste,
            Attribute::Acidity => sheet.acidity,
            Attribute::Body => sheet.body,
            Attribute::Balance => sheet.balance,
            Attribute::Uniformity => sheet.uniformity,
            Attribute::CleanCup => sheet.clean_cup,
            Attribute::Sweetness => sheet.sweetness,
            Attribute::Overall => sheet.overall,
        }
    }

    /// Sensory attributes use the 6-10 scale; cup attributes use 0-10
    pub fn is_sensory(&self) -> bool {
        !matches!(
            self,
            Attribute::Uniformity | Attribute::CleanCup | Attribute::Sweetness
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::FragranceAroma => "fragrance_aroma",
            Attribute::Flavor => "flavor",
            Attribute::Aftertaste => "aftertaste",
            Attribute::Acidity => "acidity",
            Attribute::Body => "body",
            Attribute::Balance => "balance",
            Attribute::Uniformity => "uniformity",
            Attribute::CleanCup => "clean_cup",
            Attribute::Sweetness => "sweetness",
            Attribute::Overall => "overall",
        }
    }
}

/// Finalised result for one sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleResult {
    pub sample_id: String,
    pub green_bean_lot_id: String,
    pub blind_code: String,
    pub judge_count: usize,
    pub average_attributes: BTreeMap<Attribute, Decimal>,
    pub total_score: Decimal,
    pub rank: u32,
    pub classification: CoffeeClassification,
}

/// Mean attributes and mean judge total for one sample
#[derive(Debug, Clone, PartialEq)]
pub struct SampleAggregate {
    pub judge_count: usize,
    pub average_attributes: BTreeMap<Attribute, Decimal>,
    /// Mean of the judges' own totals, rounded to 2 dp
    pub total_score: Decimal,
}

/// Aggregate the judges' sheets for one sample
///
/// The total is the mean of each judge's already computed total, not a
/// recomputation from the averaged attributes.
pub fn aggregate_sample(scores: &[&JudgeScore]) -> Option<SampleAggregate> {
    if scores.is_empty() {
        return None;
    }
    let n = Decimal::from(scores.len());

    let average_attributes = Attribute::ALL
        .into_iter()
        .map(|attr| {
            let sum: Decimal = scores.iter().map(|s| attr.value(&s.sheet)).sum();
            (attr, (sum / n).round_dp(2))
        })
        .collect();

    let total: Decimal = scores.iter().map(|s| s.total).sum();

    Some(SampleAggregate {
        judge_count: scores.len(),
        average_attributes,
        total_score: (total / n).round_dp(2),
    })
}

/// Standard competition ranking ("1,1,3") of totals, highest first
///
/// Returns one rank per input, in input order.
pub fn competition_ranks(totals: &[Decimal]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..totals.len()).collect();
    order.sort_by(|a, b| totals[*b].cmp(&totals[*a]));

    let mut ranks = vec![0u32; totals.len()];
    for (position, &idx) in order.iter().enumerate() {
        ranks[idx] = if position > 0 && totals[order[position - 1]] == totals[idx] {
            ranks[order[position - 1]]
        } else {
            position as u32 + 1
        };
    }
    ranks
}

/// Compute ranked results for every scored sample of a session
///
/// Samples with no sheets are left out. Results are ordered by rank, then
/// blind code.
pub fn compute_results(session: &CuppingSession) -> Vec<SampleResult> {
    let aggregated: Vec<(&CuppingSample, SampleAggregate)> = session
        .samples
        .iter()
        .filter_map(|sample| {
            let sheets: Vec<&JudgeScore> = session
                .scores
                .iter()
                .filter(|s| s.sample_id == sample.id)
                .collect();
            aggregate_sample(&sheets).map(|agg| (sample, agg))
        })
        .collect();

    let totals: Vec<Decimal> = aggregated.iter().map(|(_, a)| a.total_score).collect();
    let ranks = competition_ranks(&totals);

    let mut results: Vec<SampleResult> = aggregated
        .into_iter()
        .zip(ranks)
        .map(|((sample, agg), rank)| SampleResult {
            sample_id: sample.id.clone(),
            green_bean_lot_id: sample.green_bean_lot_id.clone(),
            blind_code: sample.blind_code.clone(),
            judge_count: agg.judge_count,
            classification: classify_by_score(agg.total_score),
            average_attributes: agg.average_attributes,
            total_score: agg.total_score,
            rank,
        })
        .collect();

    results.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.blind_code.cmp(&b.blind_code)));
    results
}

/// Coffee classification based on cupping score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CoffeeClassification {
    /// 90+ points
    Outstanding,
    /// 85-89.99 points
    Excellent,
    /// 80-84.99 points
    VeryGood,
    /// Below 80 points
    BelowSpecialty,
}

impl std::fmt::Display for CoffeeClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoffeeClassification::Outstanding => write!(f, "Outstanding"),
            CoffeeClassification::Excellent => write!(f, "Excellent"),
            CoffeeClassification::VeryGood => write!(f, "Very Good"),
            CoffeeClassification::BelowSpecialty => write!(f, "Below Specialty"),
        }
    }
}

/// Classify coffee based on cupping score
pub fn classify_by_score(score: Decimal) -> CoffeeClassification {
    if score >= Decimal::from(90) {
        CoffeeClassification::Outstanding
    } else if score >= Decimal::from(85) {
        CoffeeClassification::Excellent
    } else if score >= Decimal::from(80) {
        CoffeeClassification::VeryGood
    } else {
        CoffeeClassification::BelowSpecialty
    }
}
