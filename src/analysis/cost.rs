//! Hosting cost projection
//!
//! Walks the load curve month by month against an ascending tier table,
//! upgrading whenever the current tier can no longer hold the load. Amounts are
//! in the tier table's currency (INR for the built-in Atlas table).

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::access::AccessReport;
use super::evolution::{compound, EvolutionReport};
use super::Status;
use crate::config::{ensure_growth_rate, ensure_non_negative, CostConfig};
use crate::error::{AdvisorError, Result};

// =============================================================================
// Tier Table
// =============================================================================

/// One hosting tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSpec {
    pub name: String,
    #[serde(default)]
    pub label: String,
    pub included_storage_gb: f64,
    pub max_iops: f64,
    pub base_monthly_cost: f64,
    /// Cost per GB above `included_storage_gb`
    pub storage_overage_rate: f64,
    /// Cost per IOPS above `max_iops`
    pub iops_overage_rate: f64,
    /// Shared tiers have fixed IOPS and never bill overage
    #[serde(default)]
    pub charges_iops_overage: bool,
}

impl TierSpec {
    fn fits(&self, storage_gb: f64, iops: f64) -> bool {
        storage_gb <= self.included_storage_gb && iops <= self.max_iops
    }

    /// Base cost plus overage for the given load
    pub fn monthly_cost(&self, storage_gb: f64, iops: f64) -> (f64, f64, f64) {
        let storage_overage =
            (storage_gb - self.included_storage_gb).max(0.0) * self.storage_overage_rate;
        let iops_overage = if self.charges_iops_overage {
            (iops - self.max_iops).max(0.0) * self.iops_overage_rate
        } else {
            0.0
        };
        (self.base_monthly_cost, storage_overage, iops_overage)
    }
}

/// Tiers ordered by ascending capacity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TierSpec>", into = "Vec<TierSpec>")]
pub struct TierTable {
    tiers: Vec<TierSpec>,
}

static ATLAS: OnceLock<TierTable> = OnceLock::new();

impl TierTable {
    /// Validate and wrap a tier list
    pub fn new(tiers: Vec<TierSpec>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(AdvisorError::config("cost.tiers must contain at least one tier"));
        }
        for tier in &tiers {
            if tier.name.trim().is_empty() {
                return Err(AdvisorError::config("cost.tiers entries need a name"));
            }
            let field = |f: &str| format!("cost.tiers.{}.{}", tier.name, f);
            ensure_non_negative(&field("included_storage_gb"), tier.included_storage_gb)?;
            ensure_non_negative(&field("max_iops"), tier.max_iops)?;
            ensure_non_negative(&field("base_monthly_cost"), tier.base_monthly_cost)?;
            ensure_non_negative(&field("storage_overage_rate"), tier.storage_overage_rate)?;
            ensure_non_negative(&field("iops_overage_rate"), tier.iops_overage_rate)?;
        }
        for pair in tiers.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            let ascending = upper.included_storage_gb >= lower.included_storage_gb
                && upper.max_iops >= lower.max_iops
                && (upper.included_storage_gb > lower.included_storage_gb
                    || upper.max_iops > lower.max_iops);
            if !ascending {
                return Err(AdvisorError::config(format!(
                    "cost.tiers must be in ascending capacity order: {} does not exceed {}",
                    upper.name, lower.name
                )));
            }
        }
        Ok(Self { tiers })
    }

    /// MongoDB Atlas tiers, priced in INR
    pub fn atlas() -> &'static TierTable {
        ATLAS.get_or_init(|| {
            // (storage GB, IOPS), monthly base, (per extra GB, per extra 1k IOPS)
            let shared = |name: &str, capacity: (f64, f64), base: f64, rates: (f64, f64)| {
                TierSpec {
                    name: name.to_string(),
                    label: if base > 0.0 { "Shared" } else { "Free" }.to_string(),
                    included_storage_gb: capacity.0,
                    max_iops: capacity.1,
                    base_monthly_cost: base,
                    storage_overage_rate: rates.0,
                    iops_overage_rate: rates.1 / 1000.0,
                    charges_iops_overage: false,
                }
            };
            let dedicated = |name: &str, capacity: (f64, f64), base: f64, rates: (f64, f64)| {
                TierSpec {
                    label: "Dedicated".to_string(),
                    charges_iops_overage: true,
                    ..shared(name, capacity, base, rates)
                }
            };
            TierTable {
                tiers: vec![
                    shared("M0", (0.5, 100.0), 0.0, (0.0, 0.0)),
                    shared("M2", (2.0, 200.0), 720.0, (30.0, 5.0)),
                    shared("M5", (5.0, 500.0), 2_160.0, (30.0, 5.0)),
                    dedicated("M10", (10.0, 1_000.0), 5_940.0, (45.0, 8.0)),
                    dedicated("M20", (20.0, 2_000.0), 11_880.0, (45.0, 8.0)),
                    dedicated("M30", (40.0, 3_000.0), 18_900.0, (60.0, 10.0)),
                    dedicated("M40", (80.0, 4_000.0), 31_500.0, (60.0, 10.0)),
                    dedicated("M50", (160.0, 6_000.0), 54_000.0, (75.0, 12.0)),
                    dedicated("M60", (320.0, 8_000.0), 108_000.0, (75.0, 12.0)),
                ],
            }
        })
    }

    pub fn tiers(&self) -> &[TierSpec] {
        &self.tiers
    }

    pub fn get(&self, name: &str) -> Option<&TierSpec> {
        self.tiers.iter().find(|t| t.name == name)
    }

    fn top(&self) -> usize {
        self.tiers.len() - 1
    }

    /// Smallest tier at or above `from` that holds the load
    fn select(&self, from: usize, storage_gb: f64, iops: f64) -> Option<usize> {
        (from..self.tiers.len()).find(|&i| self.tiers[i].fits(storage_gb, iops))
    }
}

impl TryFrom<Vec<TierSpec>> for TierTable {
    type Error = AdvisorError;

    fn try_from(tiers: Vec<TierSpec>) -> Result<Self> {
        TierTable::new(tiers)
    }
}

impl From<TierTable> for Vec<TierSpec> {
    fn from(table: TierTable) -> Self {
        table.tiers
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// A growth-rate sensitivity scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub name: String,
    /// Applied to both growth rates while they are positive
    pub growth_multiplier: f64,
    /// Applied to baseline IOPS
    #[serde(default = "default_iops_multiplier")]
    pub iops_multiplier: f64,
}

fn default_iops_multiplier() -> f64 {
    1.0
}

impl ScenarioSpec {
    pub fn new(name: impl Into<String>, growth_multiplier: f64, iops_multiplier: f64) -> Self {
        Self {
            name: name.into(),
            growth_multiplier,
            iops_multiplier,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let field = |key: &str| format!("cost.scenarios.{}.{}", self.name, key);
        ensure_non_negative(&field("growth_multiplier"), self.growth_multiplier)?;
        ensure_non_negative(&field("iops_multiplier"), self.iops_multiplier)?;
        Ok(())
    }
}

/// Starting load and its growth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostInputs {
    pub storage_gb: f64,
    /// Portion of `storage_gb` taken by indexes
    pub index_storage_gb: f64,
    /// Effective write IOPS
    pub iops: f64,
    pub storage_growth_rate: f64,
    pub iops_growth_rate: f64,
    pub horizon_months: u32,
    /// Storage writes per logical write
    #[serde(default = "default_write_amplification")]
    pub write_amplification: f64,
}

fn default_write_amplification() -> f64 {
    1.0
}

impl CostInputs {
    pub fn new(storage_gb: f64, iops: f64, growth_rate: f64, horizon_months: u32) -> Self {
        Self {
            storage_gb,
            index_storage_gb: 0.0,
            iops,
            storage_growth_rate: growth_rate,
            iops_growth_rate: growth_rate,
            horizon_months,
            write_amplification: 1.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("cost.storage_gb", self.storage_gb)?;
        ensure_non_negative("cost.index_storage_gb", self.index_storage_gb)?;
        ensure_non_negative("cost.iops", self.iops)?;
        ensure_growth_rate("cost.storage_growth_rate", self.storage_growth_rate)?;
        ensure_growth_rate("cost.iops_growth_rate", self.iops_growth_rate)?;
        ensure_non_negative("cost.write_amplification", self.write_amplification)?;
        if self.horizon_months == 0 || self.horizon_months > crate::config::MAX_HORIZON_MONTHS {
            return Err(AdvisorError::config(format!(
                "cost horizon must be within 1..={} months",
                crate::config::MAX_HORIZON_MONTHS
            )));
        }
        Ok(())
    }

    fn storage_at(&self, month: u32) -> f64 {
        compound(self.storage_gb, self.storage_growth_rate, month)
    }

    fn iops_at(&self, month: u32) -> f64 {
        compound(self.iops, self.iops_growth_rate, month)
    }

    /// Inputs under `scenario`. The growth multiplier only amplifies growth;
    /// a flat or shrinking rate is kept as is.
    fn scaled(&self, scenario: &ScenarioSpec) -> Result<Self> {
        scenario.validate()?;
        let amplify = |rate: f64| if rate > 0.0 { rate * scenario.growth_multiplier } else { rate };
        let scaled = Self {
            iops: self.iops * scenario.iops_multiplier,
            storage_growth_rate: amplify(self.storage_growth_rate),
            iops_growth_rate: amplify(self.iops_growth_rate),
            ..self.clone()
        };
        scaled.validate()?;
        Ok(scaled)
    }
}

// =============================================================================
// Report Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthCost {
    pub month: u32,
    pub tier: String,
    pub storage_gb: f64,
    pub iops: f64,
    pub base_cost: f64,
    pub storage_overage_cost: f64,
    pub iops_overage_cost: f64,
    pub total_cost: f64,
    pub storage_utilization_pct: f64,
    pub iops_utilization_pct: f64,
    pub status: Status,
    /// Load is beyond the top tier
    pub exceeds_capacity: bool,
    pub upgraded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Constraint {
    Storage,
    Iops,
    Both,
}

/// First month the starting tier can no longer hold the load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakeven {
    pub month: u32,
    pub constraint: Constraint,
    pub from_tier: String,
    pub to_tier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub growth_multiplier: f64,
    pub iops_multiplier: f64,
    pub final_month_cost: f64,
    pub final_tier: String,
    pub breakeven_month: Option<u32>,
    pub capacity_exceeded: bool,
    pub total_cost: f64,
    /// Final-month cost minus the current trajectory's
    pub delta: f64,
    pub delta_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MilestoneKind {
    TierUpgrade { from: String, to: String },
    CostThreshold { status: Status, threshold: f64 },
    CapacityExceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub month: u32,
    #[serde(flatten)]
    pub kind: MilestoneKind,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecommendation {
    pub title: String,
    pub rationale: String,
    /// Final-month cost if the recommendation is applied
    pub projected_final_cost: f64,
    pub monthly_savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub current_monthly_cost: f64,
    pub month_one_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_six_cost: Option<f64>,
    pub final_month_cost: f64,
    /// Sum over months `1..=horizon`
    pub total_cost: f64,
    pub average_monthly_cost: f64,
}

/// Result of the cost projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    pub inputs: CostInputs,
    /// Months `0..=horizon`
    pub months: Vec<MonthCost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakeven: Option<Breakeven>,
    pub capacity_exceeded: bool,
    pub scenarios: Vec<ScenarioResult>,
    pub milestones: Vec<Milestone>,
    pub recommendations: Vec<CostRecommendation>,
    pub summary: CostSummary,
}

impl CostReport {
    pub fn month(&self, month: u32) -> Option<&MonthCost> {
        self.months.iter().find(|m| m.month == month)
    }

    pub fn final_month(&self) -> Option<&MonthCost> {
        self.months.last()
    }
}

// =============================================================================
// Projection
// =============================================================================

/// Month-by-month costs and breakeven, without scenarios or recommendations
struct Projection {
    months: Vec<MonthCost>,
    breakeven: Option<Breakeven>,
    capacity_exceeded: bool,
}

impl Projection {
    fn final_cost(&self) -> f64 {
        self.months.last().map_or(0.0, |m| m.total_cost)
    }

    fn total_cost(&self) -> f64 {
        self.months.iter().filter(|m| m.month >= 1).map(|m| m.total_cost).sum()
    }
}

fn pct(value: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        value / capacity * 100.0
    } else if value > 0.0 {
        100.0
    } else {
        0.0
    }
}

fn cost_status(total: f64, exceeds: bool, config: &CostConfig) -> Status {
    if exceeds || total >= config.critical_cost {
        Status::Critical
    } else if total >= config.warning_cost {
        Status::Warning
    } else {
        Status::Healthy
    }
}

fn run_projection(inputs: &CostInputs, tiers: &TierTable, config: &CostConfig) -> Projection {
    let mut months = Vec::with_capacity(inputs.horizon_months as usize + 1);
    let mut current: Option<usize> = None;
    let mut capacity_exceeded = false;

    for month in 0..=inputs.horizon_months {
        let storage_gb = inputs.storage_at(month);
        let iops = inputs.iops_at(month);

        let from = current.unwrap_or(0);
        let (index, exceeds) = match tiers.select(from, storage_gb, iops) {
            Some(i) => (i, false),
            None => (tiers.top(), true),
        };
        capacity_exceeded |= exceeds;

        let tier = &tiers.tiers[index];
        let (base_cost, storage_overage_cost, iops_overage_cost) =
            tier.monthly_cost(storage_gb, iops);
        let total_cost = base_cost + storage_overage_cost + iops_overage_cost;

        months.push(MonthCost {
            month,
            tier: tier.name.clone(),
            storage_gb,
            iops,
            base_cost,
            storage_overage_cost,
            iops_overage_cost,
            total_cost,
            storage_utilization_pct: pct(storage_gb, tier.included_storage_gb),
            iops_utilization_pct: pct(iops, tier.max_iops),
            status: cost_status(total_cost, exceeds, config),
            exceeds_capacity: exceeds,
            upgraded: current.is_some_and(|c| c != index),
        });
        current = Some(index);
    }

    let breakeven = breakeven(&months, tiers);
    Projection {
        months,
        breakeven,
        capacity_exceeded,
    }
}

fn breakeven(months: &[MonthCost], tiers: &TierTable) -> Option<Breakeven> {
    let start = tiers.get(&months.first()?.tier)?;
    months.iter().filter(|m| m.month >= 1).find_map(|m| {
        let storage = m.storage_gb > start.included_storage_gb;
        let iops = m.iops > start.max_iops;
        let constraint = match (storage, iops) {
            (true, true) => Constraint::Both,
            (true, false) => Constraint::Storage,
            (false, true) => Constraint::Iops,
            (false, false) => return None,
        };
        Some(Breakeven {
            month: m.month,
            constraint,
            from_tier: start.name.clone(),
            to_tier: m.tier.clone(),
        })
    })
    .filter(|b| b.from_tier != b.to_tier)
}

fn milestones(months: &[MonthCost], config: &CostConfig) -> Vec<Milestone> {
    let mut out = Vec::new();
    let mut warned = false;
    let mut critical = false;
    let mut exceeded = false;

    for pair in months.windows(2) {
        let (previous, month) = (&pair[0], &pair[1]);
        if month.upgraded {
            out.push(Milestone {
                month: month.month,
                kind: MilestoneKind::TierUpgrade {
                    from: previous.tier.clone(),
                    to: month.tier.clone(),
                },
                description: format!("Upgrade from {} to {}", previous.tier, month.tier),
            });
        }
    }

    for month in months.iter().filter(|m| m.month >= 1) {
        if !warned && month.total_cost >= config.warning_cost {
            warned = true;
            out.push(Milestone {
                month: month.month,
                kind: MilestoneKind::CostThreshold {
                    status: Status::Warning,
                    threshold: config.warning_cost,
                },
                description: format!("Monthly cost passes {:.0}", config.warning_cost),
            });
        }
        if !critical && month.total_cost >= config.critical_cost {
            critical = true;
            out.push(Milestone {
                month: month.month,
                kind: MilestoneKind::CostThreshold {
                    status: Status::Critical,
                    threshold: config.critical_cost,
                },
                description: format!("Monthly cost passes {:.0}", config.critical_cost),
            });
        }
        if !exceeded && month.exceeds_capacity {
            exceeded = true;
            out.push(Milestone {
                month: month.month,
                kind: MilestoneKind::CapacityExceeded,
                description: format!("Load outgrows the largest tier ({})", month.tier),
            });
        }
    }

    out.sort_by_key(|m| m.month);
    out
}

fn recommendations(
    inputs: &CostInputs,
    baseline: &Projection,
    tiers: &TierTable,
    config: &CostConfig,
) -> Vec<CostRecommendation> {
    let final_cost = baseline.final_cost();
    let mut out = Vec::new();

    let mut reprojected = |title: &str, rationale: String, adjusted: CostInputs| {
        let projected = run_projection(&adjusted, tiers, config).final_cost();
        out.push(CostRecommendation {
            title: title.to_string(),
            rationale,
            projected_final_cost: projected,
            monthly_savings: (final_cost - projected).max(0.0),
        });
    };

    let index_ratio = pct(inputs.index_storage_gb, inputs.storage_gb);
    if inputs.storage_gb > 0.0 && index_ratio > config.index_ratio_warning_pct {
        reprojected(
            "Drop unused indexes",
            format!("Indexes take {:.0}% of storage", index_ratio),
            CostInputs {
                storage_gb: inputs.storage_gb - inputs.index_storage_gb / 2.0,
                index_storage_gb: inputs.index_storage_gb / 2.0,
                ..inputs.clone()
            },
        );
    }

    if inputs.storage_growth_rate > 0.05 {
        reprojected(
            "Archive cold data",
            format!(
                "Storage grows {:.0}% per month; archiving slows growth by 30%",
                inputs.storage_growth_rate * 100.0
            ),
            CostInputs {
                storage_growth_rate: inputs.storage_growth_rate * 0.7,
                ..inputs.clone()
            },
        );
    }

    if inputs.write_amplification > 5.0 {
        reprojected(
            "Reduce write amplification",
            format!(
                "Each write touches {:.1} storage locations; \
                 trimming indexes to reach 5x cuts IOPS",
                inputs.write_amplification
            ),
            CostInputs {
                iops: inputs.iops * 5.0 / inputs.write_amplification,
                ..inputs.clone()
            },
        );
    }

    if final_cost > config.critical_cost {
        let projected = final_cost * 0.7;
        out.push(CostRecommendation {
            title: "Shard across smaller clusters".to_string(),
            rationale: format!(
                "Final monthly cost {:.0} passes {:.0}",
                final_cost, config.critical_cost
            ),
            projected_final_cost: projected,
            monthly_savings: final_cost - projected,
        });
    }

    let annual: f64 = baseline
        .months
        .iter()
        .filter(|m| (1..=12).contains(&m.month))
        .map(|m| m.total_cost)
        .sum();
    if annual > config.self_host_annual_cost {
        let projected = final_cost * 0.6;
        out.push(CostRecommendation {
            title: "Evaluate self-hosting".to_string(),
            rationale: format!(
                "Annual spend {:.0} passes {:.0}",
                annual, config.self_host_annual_cost
            ),
            projected_final_cost: projected,
            monthly_savings: final_cost - projected,
        });
    }

    if out.is_empty() {
        out.push(CostRecommendation {
            title: "Monitor growth".to_string(),
            rationale: "Costs stay within the current plan".to_string(),
            projected_final_cost: final_cost,
            monthly_savings: 0.0,
        });
    }

    out
}

fn summary(projection: &Projection) -> CostSummary {
    let cost_at = |month: u32| {
        projection.months.iter().find(|m| m.month == month).map(|m| m.total_cost)
    };
    let billed = projection.months.iter().filter(|m| m.month >= 1).count();
    let total_cost = projection.total_cost();

    CostSummary {
        current_monthly_cost: cost_at(0).unwrap_or(0.0),
        month_one_cost: cost_at(1).unwrap_or(0.0),
        month_six_cost: cost_at(6),
        final_month_cost: projection.final_cost(),
        total_cost,
        average_monthly_cost: if billed > 0 { total_cost / billed as f64 } else { 0.0 },
    }
}

/// Project costs for `inputs` against `tiers`
pub fn estimate_cost(
    inputs: &CostInputs,
    tiers: &TierTable,
    config: &CostConfig,
) -> Result<CostReport> {
    inputs.validate()?;
    tracing::debug!(
        storage_gb = inputs.storage_gb,
        iops = inputs.iops,
        horizon = inputs.horizon_months,
        "estimating cost"
    );

    let baseline = run_projection(inputs, tiers, config);
    let baseline_final = baseline.final_cost();

    let mut scenarios = Vec::with_capacity(config.scenarios.len());
    for spec in &config.scenarios {
        let scaled = match inputs.scaled(spec) {
            Ok(scaled) => scaled,
            Err(err) => {
                tracing::warn!(scenario = %spec.name, error = %err, "skipping cost scenario");
                continue;
            }
        };
        let projection = run_projection(&scaled, tiers, config);
        let final_month_cost = projection.final_cost();
        let delta = final_month_cost - baseline_final;
        scenarios.push(ScenarioResult {
            name: spec.name.clone(),
            growth_multiplier: spec.growth_multiplier,
            iops_multiplier: spec.iops_multiplier,
            final_month_cost,
            final_tier: projection.months.last().map(|m| m.tier.clone()).unwrap_or_default(),
            breakeven_month: projection.breakeven.as_ref().map(|b| b.month),
            capacity_exceeded: projection.capacity_exceeded,
            total_cost: projection.total_cost(),
            delta,
            delta_pct: if baseline_final > 0.0 { delta / baseline_final * 100.0 } else { 0.0 },
        });
    }

    if baseline.capacity_exceeded {
        tracing::warn!("projected load exceeds the largest tier");
    }

    Ok(CostReport {
        milestones: milestones(&baseline.months, config),
        recommendations: recommendations(inputs, &baseline, tiers, config),
        summary: summary(&baseline),
        inputs: inputs.clone(),
        breakeven: baseline.breakeven,
        capacity_exceeded: baseline.capacity_exceeded,
        months: baseline.months,
        scenarios,
    })
}

/// Project costs from an evolution report's month-0 load and growth rates
pub fn estimate_from_evolution(
    evolution: &EvolutionReport,
    access: &AccessReport,
    tiers: &TierTable,
    config: &CostConfig,
) -> Result<CostReport> {
    let start = evolution
        .load_at(0)
        .ok_or_else(|| AdvisorError::config("evolution report has no month 0"))?;

    let inputs = CostInputs {
        storage_gb: start.storage_gb,
        index_storage_gb: start.index_storage_gb,
        iops: start.write_iops,
        storage_growth_rate: evolution.size_growth_rate,
        iops_growth_rate: evolution.write_growth_rate,
        horizon_months: evolution.horizon_months,
        write_amplification: access.write_amplification.factor,
    };
    estimate_cost(&inputs, tiers, config)
}
