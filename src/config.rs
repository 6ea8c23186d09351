//! Configuration management for the schema advisor
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (advisor.toml)
//! - Environment variables (ADVISOR__SECTION__KEY)
//!
//! ## Example config file (advisor.toml):
//! ```toml
//! [access]
//! high_frequency_threshold = 700.0
//! amplification_warning = 5.0
//! amplification_critical = 7.0
//!
//! [evolution]
//! horizon_months = 12
//! array_growth_rate = 0.12
//!
//! [[cost.scenarios]]
//! name = "Aggressive"
//! growth_multiplier = 2.0
//!
//! [latency]
//! load_multipliers = [1.0, 10.0, 40.0]
//!
//! [patterns]
//! subset_field_threshold = 15
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::analysis::cost::{ScenarioSpec, TierSpec, TierTable};
use crate::error::{AdvisorError, Result};

/// Longest projection horizon accepted, in months
pub const MAX_HORIZON_MONTHS: u32 = 120;

/// Main configuration for the advisor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Schema materialization settings
    #[serde(default)]
    pub schema: SchemaSection,

    /// Defaults for synthesized workloads
    #[serde(default)]
    pub workload: WorkloadConfig,

    /// Access-pattern thresholds
    #[serde(default)]
    pub access: AccessConfig,

    /// Growth projection settings
    #[serde(default)]
    pub evolution: EvolutionConfig,

    /// Tier table and sensitivity scenarios
    #[serde(default)]
    pub cost: CostConfig,

    /// Latency model coefficients
    #[serde(default)]
    pub latency: LatencyConfig,

    /// Fallback risk/performance scoring weights
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Modeling pattern detection
    #[serde(default)]
    pub patterns: PatternsConfig,
}

/// Schema materialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSection {
    /// Deepest nesting accepted when reading a tree from JSON
    #[serde(default = "default_max_depth_limit")]
    pub max_depth_limit: usize,
}

/// Defaults used when no workload is declared
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Documents per collection
    #[serde(default = "default_documents")]
    pub default_documents: f64,

    /// Elements per embedded array
    #[serde(default = "default_array_elements")]
    pub default_array_elements: f64,
}

/// Access-pattern analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Queries/day at or above which a field counts as high-frequency
    #[serde(default = "default_high_frequency_threshold")]
    pub high_frequency_threshold: f64,

    /// Queries/day above which a foreign key gets a recommended index
    #[serde(default = "default_index_candidate_threshold")]
    pub index_candidate_threshold: f64,

    /// Selectivity percentage below which an index field is weak
    #[serde(default = "default_weak_selectivity_pct")]
    pub weak_selectivity_pct: f64,

    #[serde(default = "default_amplification_warning")]
    pub amplification_warning: f64,

    #[serde(default = "default_amplification_critical")]
    pub amplification_critical: f64,

    #[serde(default = "default_max_recommended_indexes")]
    pub max_recommended_indexes: usize,

    /// Queries/day below which cold fields become archival candidates
    #[serde(default = "default_rare_query_threshold")]
    pub rare_query_threshold: f64,

    /// Write share (percent) above which a collection is write-heavy
    #[serde(default = "default_write_heavy_pct")]
    pub write_heavy_pct: f64,

    /// Writes/sec above which a collection gets a shard key
    #[serde(default = "default_shard_write_ops_threshold")]
    pub shard_write_ops_threshold: f64,

    /// Average document size used for index storage estimates
    #[serde(default = "default_document_size_bytes")]
    pub document_size_bytes: f64,
}

/// Growth projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    #[serde(default = "default_horizon_months")]
    pub horizon_months: u32,

    /// Monthly storage/document growth; estimated from field count when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_growth_rate: Option<f64>,

    /// Monthly write-rate growth; follows the size rate when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_growth_rate: Option<f64>,

    /// Monthly element growth for arrays without a declared rate
    #[serde(default = "default_array_growth_rate")]
    pub array_growth_rate: f64,

    #[serde(default = "default_danger_mb")]
    pub danger_mb: f64,

    /// Hard per-document size ceiling
    #[serde(default = "default_ceiling_mb")]
    pub ceiling_mb: f64,

    /// Effective write IOPS above which sharding is suggested
    #[serde(default = "default_shard_iops_threshold")]
    pub shard_iops_threshold: f64,

    /// Consecutive months above the shard threshold before it is flagged
    #[serde(default = "default_shard_sustain_months")]
    pub shard_sustain_months: u32,

    /// Documents per collection at which range-filtered fields need a compound index
    #[serde(default = "default_compound_index_documents")]
    pub compound_index_documents: f64,

    /// Storage multiple over month 0 at which cold data should be archived
    #[serde(default = "default_archive_growth_factor")]
    pub archive_growth_factor: f64,

    /// Stored bytes per field per document
    #[serde(default = "default_bytes_per_field")]
    pub bytes_per_field: f64,

    /// Index storage as a share of document storage, per five indexes
    #[serde(default = "default_index_storage_ratio")]
    pub index_storage_ratio: f64,

    #[serde(default = "default_min_index_storage_gb")]
    pub min_index_storage_gb: f64,
}

/// Cost estimation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostConfig {
    /// Replaces the built-in Atlas tier table when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiers: Option<Vec<TierSpec>>,

    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<ScenarioSpec>,

    /// Monthly cost at which a month is flagged as warning
    #[serde(default = "default_warning_cost")]
    pub warning_cost: f64,

    #[serde(default = "default_critical_cost")]
    pub critical_cost: f64,

    /// Index/storage share (percent) above which index cleanup is recommended
    #[serde(default = "default_index_ratio_warning_pct")]
    pub index_ratio_warning_pct: f64,

    /// Annual spend above which self-hosting is worth evaluating
    #[serde(default = "default_self_host_annual_cost")]
    pub self_host_annual_cost: f64,
}

/// Latency model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyConfig {
    /// Concurrent users represented by a load multiplier of 1
    #[serde(default = "default_baseline_load")]
    pub baseline_load: u64,

    #[serde(default = "default_load_multipliers")]
    pub load_multipliers: Vec<f64>,

    #[serde(default = "default_load_exponent")]
    pub load_exponent: f64,

    /// Added per nesting level beyond the first
    #[serde(default = "default_depth_penalty")]
    pub depth_penalty: f64,

    #[serde(default = "default_reference_penalty")]
    pub reference_penalty: f64,

    #[serde(default = "default_array_penalty")]
    pub array_penalty: f64,

    #[serde(default = "default_unindexed_multiplier")]
    pub unindexed_multiplier: f64,

    #[serde(default = "default_excellent_below_ms")]
    pub excellent_below_ms: f64,

    #[serde(default = "default_slow_above_ms")]
    pub slow_above_ms: f64,

    /// User count the at-scale projection targets
    #[serde(default = "default_scale_target_users")]
    pub scale_target_users: u64,

    #[serde(default = "default_base_read_ms")]
    pub base_read_ms: f64,

    #[serde(default = "default_base_write_ms")]
    pub base_write_ms: f64,
}

/// Weights for the fallback risk and performance scores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_depth_weight")]
    pub depth_weight: f64,

    /// Field count is divided by this before being added to the risk score
    #[serde(default = "default_field_divisor")]
    pub field_divisor: f64,

    #[serde(default = "default_warning_weight")]
    pub warning_weight: f64,

    #[serde(default = "default_unbounded_weight")]
    pub unbounded_weight: f64,

    #[serde(default = "default_depth_cost")]
    pub depth_cost: f64,

    #[serde(default = "default_reference_cost")]
    pub reference_cost: f64,

    #[serde(default = "default_array_cost")]
    pub array_cost: f64,

    #[serde(default = "default_warning_cost_points")]
    pub warning_cost: f64,
}

/// Modeling pattern thresholds and the parameters quoted in suggested commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternsConfig {
    /// A collection needs more top-level fields than this for the subset pattern
    #[serde(default = "default_subset_field_threshold")]
    pub subset_field_threshold: usize,

    #[serde(default = "default_ttl_expire_after_seconds")]
    pub ttl_expire_after_seconds: u64,

    #[serde(default = "default_capped_size_bytes")]
    pub capped_size_bytes: u64,

    #[serde(default = "default_capped_max_documents")]
    pub capped_max_documents: u64,
}

// Default value functions
fn default_max_depth_limit() -> usize {
    crate::schema::DEFAULT_MAX_DEPTH
}

fn default_documents() -> f64 {
    50_000.0
}

fn default_array_elements() -> f64 {
    10.0
}

fn default_high_frequency_threshold() -> f64 {
    700.0
}

fn default_index_candidate_threshold() -> f64 {
    500.0
}

fn default_weak_selectivity_pct() -> f64 {
    20.0
}

fn default_amplification_warning() -> f64 {
    5.0
}

fn default_amplification_critical() -> f64 {
    7.0
}

fn default_max_recommended_indexes() -> usize {
    8
}

fn default_rare_query_threshold() -> f64 {
    120.0
}

fn default_write_heavy_pct() -> f64 {
    30.0
}

fn default_shard_write_ops_threshold() -> f64 {
    50.0
}

fn default_document_size_bytes() -> f64 {
    3.0 * 1024.0
}

fn default_horizon_months() -> u32 {
    12
}

fn default_array_growth_rate() -> f64 {
    0.12
}

fn default_danger_mb() -> f64 {
    12.0
}

fn default_ceiling_mb() -> f64 {
    16.0
}

fn default_shard_iops_threshold() -> f64 {
    300.0
}

fn default_shard_sustain_months() -> u32 {
    2
}

fn default_compound_index_documents() -> f64 {
    1_000_000.0
}

fn default_archive_growth_factor() -> f64 {
    1.5
}

fn default_bytes_per_field() -> f64 {
    150.0
}

fn default_index_storage_ratio() -> f64 {
    0.15
}

fn default_min_index_storage_gb() -> f64 {
    0.1
}

fn default_scenarios() -> Vec<ScenarioSpec> {
    vec![
        ScenarioSpec::new("Conservative", 0.3, 1.0),
        ScenarioSpec::new("Current", 1.0, 1.0),
        ScenarioSpec::new("Aggressive", 2.0, 1.0),
        ScenarioSpec::new("Peak Load", 1.0, 1.5),
    ]
}

fn default_warning_cost() -> f64 {
    10_000.0
}

fn default_critical_cost() -> f64 {
    20_000.0
}

fn default_index_ratio_warning_pct() -> f64 {
    25.0
}

fn default_self_host_annual_cost() -> f64 {
    600_000.0
}

fn default_baseline_load() -> u64 {
    50_000
}

fn default_load_multipliers() -> Vec<f64> {
    vec![1.0, 10.0, 40.0]
}

fn default_load_exponent() -> f64 {
    0.7
}

fn default_depth_penalty() -> f64 {
    0.15
}

fn default_reference_penalty() -> f64 {
    0.25
}

fn default_array_penalty() -> f64 {
    0.3
}

fn default_unindexed_multiplier() -> f64 {
    4.0
}

fn default_excellent_below_ms() -> f64 {
    50.0
}

fn default_slow_above_ms() -> f64 {
    200.0
}

fn default_scale_target_users() -> u64 {
    5_000_000
}

fn default_base_read_ms() -> f64 {
    25.0
}

fn default_base_write_ms() -> f64 {
    15.0
}

fn default_depth_weight() -> f64 {
    8.0
}

fn default_field_divisor() -> f64 {
    10.0
}

fn default_warning_weight() -> f64 {
    6.0
}

fn default_unbounded_weight() -> f64 {
    12.0
}

fn default_depth_cost() -> f64 {
    5.0
}

fn default_reference_cost() -> f64 {
    3.0
}

fn default_array_cost() -> f64 {
    2.0
}

fn default_warning_cost_points() -> f64 {
    4.0
}

impl Default for SchemaSection {
    fn default() -> Self {
        Self {
            max_depth_limit: default_max_depth_limit(),
        }
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            default_documents: default_documents(),
            default_array_elements: default_array_elements(),
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            high_frequency_threshold: default_high_frequency_threshold(),
            index_candidate_threshold: default_index_candidate_threshold(),
            weak_selectivity_pct: default_weak_selectivity_pct(),
            amplification_warning: default_amplification_warning(),
            amplification_critical: default_amplification_critical(),
            max_recommended_indexes: default_max_recommended_indexes(),
            rare_query_threshold: default_rare_query_threshold(),
            write_heavy_pct: default_write_heavy_pct(),
            shard_write_ops_threshold: default_shard_write_ops_threshold(),
            document_size_bytes: default_document_size_bytes(),
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            horizon_months: default_horizon_months(),
            size_growth_rate: None,
            write_growth_rate: None,
            array_growth_rate: default_array_growth_rate(),
            danger_mb: default_danger_mb(),
            ceiling_mb: default_ceiling_mb(),
            shard_iops_threshold: default_shard_iops_threshold(),
            shard_sustain_months: default_shard_sustain_months(),
            compound_index_documents: default_compound_index_documents(),
            archive_growth_factor: default_archive_growth_factor(),
            bytes_per_field: default_bytes_per_field(),
            index_storage_ratio: default_index_storage_ratio(),
            min_index_storage_gb: default_min_index_storage_gb(),
        }
    }
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            tiers: None,
            scenarios: default_scenarios(),
            warning_cost: default_warning_cost(),
            critical_cost: default_critical_cost(),
            index_ratio_warning_pct: default_index_ratio_warning_pct(),
            self_host_annual_cost: default_self_host_annual_cost(),
        }
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            baseline_load: default_baseline_load(),
            load_multipliers: default_load_multipliers(),
            load_exponent: default_load_exponent(),
            depth_penalty: default_depth_penalty(),
            reference_penalty: default_reference_penalty(),
            array_penalty: default_array_penalty(),
            unindexed_multiplier: default_unindexed_multiplier(),
            excellent_below_ms: default_excellent_below_ms(),
            slow_above_ms: default_slow_above_ms(),
            scale_target_users: default_scale_target_users(),
            base_read_ms: default_base_read_ms(),
            base_write_ms: default_base_write_ms(),
        }
    }
}

fn default_subset_field_threshold() -> usize {
    15
}

fn default_ttl_expire_after_seconds() -> u64 {
    3600
}

fn default_capped_size_bytes() -> u64 {
    5_242_880
}

fn default_capped_max_documents() -> u64 {
    5000
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            subset_field_threshold: default_subset_field_threshold(),
            ttl_expire_after_seconds: default_ttl_expire_after_seconds(),
            capped_size_bytes: default_capped_size_bytes(),
            capped_max_documents: default_capped_max_documents(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            depth_weight: default_depth_weight(),
            field_divisor: default_field_divisor(),
            warning_weight: default_warning_weight(),
            unbounded_weight: default_unbounded_weight(),
            depth_cost: default_depth_cost(),
            reference_cost: default_reference_cost(),
            array_cost: default_array_cost(),
            warning_cost: default_warning_cost_points(),
        }
    }
}

/// Fail with a configuration error unless `value` is finite and non-negative
pub(crate) fn ensure_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AdvisorError::config(format!(
            "{} must be a finite non-negative number, got {}",
            name, value
        )))
    }
}

/// Fail unless `rate` is a finite monthly growth rate above -100%
pub(crate) fn ensure_growth_rate(name: &str, rate: f64) -> Result<()> {
    if rate.is_finite() && rate > -1.0 {
        Ok(())
    } else {
        Err(AdvisorError::config(format!(
            "{} must be greater than -100% per month, got {}",
            name, rate
        )))
    }
}

impl PatternsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ttl_expire_after_seconds == 0 {
            return Err(AdvisorError::config("patterns.ttl_expire_after_seconds must be positive"));
        }
        if self.capped_size_bytes == 0 || self.capped_max_documents == 0 {
            return Err(AdvisorError::config("patterns capped collection limits must be positive"));
        }
        Ok(())
    }
}

impl AccessConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("access.high_frequency_threshold", self.high_frequency_threshold)?;
        ensure_non_negative("access.index_candidate_threshold", self.index_candidate_threshold)?;
        ensure_non_negative("access.rare_query_threshold", self.rare_query_threshold)?;
        ensure_non_negative("access.shard_write_ops_threshold", self.shard_write_ops_threshold)?;
        ensure_non_negative("access.document_size_bytes", self.document_size_bytes)?;

        if !(0.0..=100.0).contains(&self.weak_selectivity_pct) {
            return Err(AdvisorError::config("access.weak_selectivity_pct must be within 0..=100"));
        }
        if !(0.0..=100.0).contains(&self.write_heavy_pct) {
            return Err(AdvisorError::config("access.write_heavy_pct must be within 0..=100"));
        }
        ensure_non_negative("access.amplification_warning", self.amplification_warning)?;
        ensure_non_negative("access.amplification_critical", self.amplification_critical)?;
        if self.amplification_warning > self.amplification_critical {
            return Err(AdvisorError::config(
                "access.amplification_warning cannot exceed access.amplification_critical",
            ));
        }
        Ok(())
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.horizon_months == 0 || self.horizon_months > MAX_HORIZON_MONTHS {
            return Err(AdvisorError::config(format!(
                "evolution.horizon_months must be within 1..={}, got {}",
                MAX_HORIZON_MONTHS, self.horizon_months
            )));
        }
        if let Some(rate) = self.size_growth_rate {
            ensure_growth_rate("evolution.size_growth_rate", rate)?;
        }
        if let Some(rate) = self.write_growth_rate {
            ensure_growth_rate("evolution.write_growth_rate", rate)?;
        }
        ensure_growth_rate("evolution.array_growth_rate", self.array_growth_rate)?;

        ensure_non_negative("evolution.danger_mb", self.danger_mb)?;
        ensure_non_negative("evolution.ceiling_mb", self.ceiling_mb)?;
        if self.danger_mb > self.ceiling_mb {
            return Err(AdvisorError::config(
                "evolution.danger_mb cannot exceed evolution.ceiling_mb",
            ));
        }
        ensure_non_negative("evolution.shard_iops_threshold", self.shard_iops_threshold)?;
        if self.shard_sustain_months == 0 {
            return Err(AdvisorError::config("evolution.shard_sustain_months must be at least 1"));
        }
        ensure_non_negative("evolution.compound_index_documents", self.compound_index_documents)?;
        ensure_non_negative("evolution.archive_growth_factor", self.archive_growth_factor)?;
        ensure_non_negative("evolution.bytes_per_field", self.bytes_per_field)?;
        ensure_non_negative("evolution.index_storage_ratio", self.index_storage_ratio)?;
        ensure_non_negative("evolution.min_index_storage_gb", self.min_index_storage_gb)?;
        Ok(())
    }
}

impl CostConfig {
    /// Tier table in effect: the configured one, or the built-in Atlas table
    pub fn tier_table(&self) -> Result<TierTable> {
        match &self.tiers {
            Some(tiers) => TierTable::new(tiers.clone()),
            None => Ok(TierTable::atlas().clone()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.tier_table()?;
        if self.scenarios.is_empty() {
            return Err(AdvisorError::config("cost.scenarios must define at least one scenario"));
        }
        for scenario in &self.scenarios {
            scenario.validate()?;
        }
        ensure_non_negative("cost.warning_cost", self.warning_cost)?;
        ensure_non_negative("cost.critical_cost", self.critical_cost)?;
        if self.warning_cost > self.critical_cost {
            return Err(AdvisorError::config("cost.warning_cost cannot exceed cost.critical_cost"));
        }
        ensure_non_negative("cost.index_ratio_warning_pct", self.index_ratio_warning_pct)?;
        ensure_non_negative("cost.self_host_annual_cost", self.self_host_annual_cost)?;
        Ok(())
    }
}

impl LatencyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.baseline_load == 0 {
            return Err(AdvisorError::config("latency.baseline_load must be positive"));
        }
        for multiplier in &self.load_multipliers {
            ensure_non_negative("latency.load_multipliers", *multiplier)?;
        }
        ensure_non_negative("latency.load_exponent", self.load_exponent)?;
        ensure_non_negative("latency.depth_penalty", self.depth_penalty)?;
        ensure_non_negative("latency.reference_penalty", self.reference_penalty)?;
        ensure_non_negative("latency.array_penalty", self.array_penalty)?;
        if !(self.unindexed_multiplier.is_finite() && self.unindexed_multiplier >= 1.0) {
            return Err(AdvisorError::config("latency.unindexed_multiplier must be at least 1"));
        }
        ensure_non_negative("latency.excellent_below_ms", self.excellent_below_ms)?;
        ensure_non_negative("latency.slow_above_ms", self.slow_above_ms)?;
        if self.excellent_below_ms > self.slow_above_ms {
            return Err(AdvisorError::config(
                "latency.excellent_below_ms cannot exceed latency.slow_above_ms",
            ));
        }
        ensure_non_negative("latency.base_read_ms", self.base_read_ms)?;
        ensure_non_negative("latency.base_write_ms", self.base_write_ms)?;
        Ok(())
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("scoring.depth_weight", self.depth_weight)?;
        if !(self.field_divisor.is_finite() && self.field_divisor > 0.0) {
            return Err(AdvisorError::config("scoring.field_divisor must be positive"));
        }
        ensure_non_negative("scoring.warning_weight", self.warning_weight)?;
        ensure_non_negative("scoring.unbounded_weight", self.unbounded_weight)?;
        ensure_non_negative("scoring.depth_cost", self.depth_cost)?;
        ensure_non_negative("scoring.reference_cost", self.reference_cost)?;
        ensure_non_negative("scoring.array_cost", self.array_cost)?;
        ensure_non_negative("scoring.warning_cost", self.warning_cost)?;
        Ok(())
    }
}

impl AdvisorConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = ["advisor.toml", ".advisor.toml", "config/advisor.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) =
            directories::ProjectDirs::from("dev", "schema-advisor", "advisor")
        {
            let xdg_config = config_dir.config_dir().join("advisor.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // ADVISOR__ACCESS__HIGH_FREQUENCY_THRESHOLD=900
        builder = builder.add_source(
            Environment::with_prefix("ADVISOR")
                .separator("__")
                .try_parsing(true),
        );

        let config: AdvisorConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check every section, failing on the first out-of-range value
    pub fn validate(&self) -> Result<()> {
        if self.schema.max_depth_limit == 0 {
            return Err(AdvisorError::config("schema.max_depth_limit must be positive"));
        }
        ensure_non_negative("workload.default_documents", self.workload.default_documents)?;
        ensure_non_negative(
            "workload.default_array_elements",
            self.workload.default_array_elements,
        )?;
        self.access.validate()?;
        self.evolution.validate()?;
        self.cost.validate()?;
        self.latency.validate()?;
        self.scoring.validate()?;
        self.patterns.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AdvisorConfig::default();
        assert_eq!(config.evolution.horizon_months, 12);
        assert_eq!(config.cost.scenarios.len(), 4);
        assert_eq!(config.latency.load_multipliers, vec![1.0, 10.0, 40.0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serialize_config() {
        let config = AdvisorConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[access]"));
        assert!(toml_str.contains("[evolution]"));
        assert!(toml_str.contains("[[cost.scenarios]]"));
    }

    #[test]
    fn test_invalid_horizon() {
        let mut config = AdvisorConfig::default();
        config.evolution.horizon_months = 0;
        assert!(matches!(config.validate(), Err(AdvisorError::Configuration(_))));

        config.evolution.horizon_months = MAX_HORIZON_MONTHS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_growth_rate() {
        let mut config = AdvisorConfig::default();
        config.evolution.size_growth_rate = Some(-1.0);
        assert!(config.validate().is_err());

        config.evolution.size_growth_rate = Some(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_thresholds() {
        let mut config = AdvisorConfig::default();
        config.access.amplification_warning = 9.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_patterns_section_from_toml() {
        let config: AdvisorConfig = toml::from_str(
            r#"
            [patterns]
            subset_field_threshold = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.patterns.subset_field_threshold, 8);
        assert_eq!(config.patterns.ttl_expire_after_seconds, 3600);
        assert!(config.validate().is_ok());

        let mut config = AdvisorConfig::default();
        config.patterns.ttl_expire_after_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("advisor.toml");
        let path_str = path.to_str().unwrap();

        let mut config = AdvisorConfig::default();
        config.access.high_frequency_threshold = 900.0;
        config.save(path_str).unwrap();

        let loaded = AdvisorConfig::load_from(Some(path_str)).unwrap();
        assert_eq!(loaded.access.high_frequency_threshold, 900.0);
        assert_eq!(loaded.cost.scenarios.len(), 4);
    }
}
