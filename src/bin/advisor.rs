//! Schema Advisor CLI
//!
//! Runs structural metrics, diffs and workload analyses over schema documents.
//!
//! Usage:
//!   schema-advisor metrics schema.json
//!   schema-advisor diff v1.json v2.json
//!   schema-advisor cost schema.json --workload workload.json --format json
//!   schema-advisor patterns schema.json
//!   schema-advisor config init

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use schema_advisor::analysis::access::AccessReport;
use schema_advisor::analysis::cost::{CostReport, MilestoneKind};
use schema_advisor::analysis::evolution::EvolutionReport;
use schema_advisor::analysis::latency::LatencyReport;
use schema_advisor::analysis::patterns::PatternReport;
use schema_advisor::analysis::scoring::ScoreReport;
use schema_advisor::diff::compare_collections;
use schema_advisor::lineage::{ancestry, diff_with_parent};
use schema_advisor::{
    diff, Advisor, AdvisorConfig, AnalysisKind, AnalysisReport, ChangeKind, DiffEntry,
    DiffSummary, MemoryStore, Schema, SchemaDocument, SchemaId, StructuralMetrics, Workload,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-advisor")]
#[command(about = "Analyze generated MongoDB schemas: metrics, diffs and projections")]
struct Cli {
    /// Configuration file layered over the default locations
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Structural metrics of a schema
    Metrics {
        /// Schema document or bare schema tree (JSON)
        file: PathBuf,
    },

    /// Structural diff between two schemas
    Diff {
        before: PathBuf,
        after: PathBuf,
    },

    /// Walk a document's version chain and diff it against its parent
    Lineage {
        /// Directory of schema document JSON files
        #[arg(short, long)]
        store: PathBuf,
        /// Document id
        id: String,
    },

    /// Access-pattern analysis
    Access {
        file: PathBuf,
        /// Declared workload (JSON); synthesized when absent
        #[arg(short, long)]
        workload: Option<PathBuf>,
    },

    /// Growth projection
    Evolution {
        file: PathBuf,
        #[arg(short, long)]
        workload: Option<PathBuf>,
    },

    /// Month-by-month cost projection
    Cost {
        file: PathBuf,
        #[arg(short, long)]
        workload: Option<PathBuf>,
    },

    /// Latency simulation
    Latency {
        file: PathBuf,
        #[arg(short, long)]
        workload: Option<PathBuf>,
    },

    /// Modeling pattern suggestions
    Patterns {
        file: PathBuf,
    },

    /// Every analysis in one report
    Report {
        file: PathBuf,
        #[arg(short, long)]
        workload: Option<PathBuf>,
        /// Write the JSON report to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect or create configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration to a file
    Init {
        #[arg(default_value = "advisor.toml")]
        path: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Load and validate configuration
    Validate,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let json = match cli.format.as_str() {
        "json" => true,
        "text" => false,
        other => bail!("unknown format '{}', expected text or json", other),
    };

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Config { action } => run_config(&action, config_path, json)?,

        Commands::Metrics { file } => {
            let config = load_config(config_path)?;
            let document = load_document(&file, config.schema.max_depth_limit)?;
            let metrics = document.schema.metrics();
            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                println!("📊 Structural metrics: {}\n", document.id);
                print_metrics(&metrics);
            }
        }

        Commands::Diff { before, after } => {
            let config = load_config(config_path)?;
            let before = load_document(&before, config.schema.max_depth_limit)?;
            let after = load_document(&after, config.schema.max_depth_limit)?;
            let entries = diff(&before.schema, &after.schema);
            if json {
                let report = serde_json::json!({
                    "entries": entries,
                    "summary": DiffSummary::of(&entries),
                    "collections": compare_collections(&before.schema, &after.schema),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("🔍 Diff: {} -> {}\n", before.id, after.id);
                print_diff(&entries);
            }
        }

        Commands::Lineage { store, id } => {
            let store = MemoryStore::load_dir(&store)
                .with_context(|| format!("loading schema store from {}", store.display()))?;
            let id = SchemaId::new(id);
            let chain = ancestry(&store, &id)?;
            let entries = diff_with_parent(&store, &id)?;
            if json {
                let versions: Vec<_> = chain
                    .iter()
                    .map(|d| {
                        serde_json::json!({
                            "id": d.id,
                            "version": d.version,
                            "createdAt": d.created_at,
                        })
                    })
                    .collect();
                let report = serde_json::json!({"lineage": versions, "diffWithParent": entries});
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("🧬 Lineage of {}\n", id);
                for document in &chain {
                    let note = document.refinement_text.as_deref().unwrap_or("initial generation");
                    println!(
                        "  v{} {} ({}) - {}",
                        document.version,
                        document.id,
                        document.created_at.to_rfc3339(),
                        note
                    );
                }
                println!();
                print_diff(&entries);
            }
        }

        Commands::Access { file, workload } => {
            analyze(config_path, &file, workload.as_deref(), AnalysisKind::Access, json)?
        }
        Commands::Evolution { file, workload } => {
            analyze(config_path, &file, workload.as_deref(), AnalysisKind::Evolution, json)?
        }
        Commands::Cost { file, workload } => {
            analyze(config_path, &file, workload.as_deref(), AnalysisKind::Cost, json)?
        }
        Commands::Latency { file, workload } => {
            analyze(config_path, &file, workload.as_deref(), AnalysisKind::Latency, json)?
        }
        Commands::Patterns { file } => {
            analyze(config_path, &file, None, AnalysisKind::Patterns, json)?
        }

        Commands::Report { file, workload, output } => {
            let config = load_config(config_path)?;
            let document = load_document(&file, config.schema.max_depth_limit)?;
            let advisor = Advisor::new(config)?;
            let workload = load_workload(workload.as_deref())?;
            let report = advisor.full_report(&document, workload.as_ref())?;

            if let Some(path) = output {
                std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
                println!("✅ Report written to {:?}", path);
            } else if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("📋 Schema report: {} (v{})\n", report.schema_id, report.version);
                print_metrics(&report.metrics);
                print_access(&report.access);
                print_evolution(&report.evolution);
                print_cost(&report.cost);
                print_latency(&report.latency);
                print_scores(&report.scores);
                print_patterns(&report.patterns);
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> anyhow::Result<AdvisorConfig> {
    AdvisorConfig::load_from(path).context("loading configuration")
}

fn run_config(action: &ConfigAction, path: Option<&str>, json: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = AdvisorConfig::load_from(path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
        ConfigAction::Init { path, force } => {
            if Path::new(path).exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path);
            }
            AdvisorConfig::default().save(path)?;
            println!("✅ Wrote default configuration to {}", path);
        }
        ConfigAction::Validate => {
            AdvisorConfig::load_from(path)?;
            println!("✅ Configuration is valid");
        }
    }
    Ok(())
}

fn analyze(
    config_path: Option<&str>,
    file: &Path,
    workload: Option<&Path>,
    kind: AnalysisKind,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let document = load_document(file, config.schema.max_depth_limit)?;
    let advisor = Advisor::new(config)?;
    let workload = load_workload(workload)?;
    let result = advisor.run(&document, workload.as_ref(), kind)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let short_hash = result.input_hash.as_str().get(..12).unwrap_or_default();
    println!("🔍 {} analysis: {} (input {})\n", kind, result.schema_id, short_hash);
    match &result.report {
        AnalysisReport::Metrics(metrics) => print_metrics(metrics),
        AnalysisReport::Access(report) => print_access(report),
        AnalysisReport::Evolution(report) => print_evolution(report),
        AnalysisReport::Cost(report) => print_cost(report),
        AnalysisReport::Latency(report) => print_latency(report),
        AnalysisReport::Scores(report) => print_scores(report),
        AnalysisReport::Patterns(report) => print_patterns(report),
    }
    Ok(())
}

/// Read a schema document, or wrap a bare schema tree as version 1
fn load_document(path: &Path, max_depth: usize) -> anyhow::Result<SchemaDocument> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

    let is_document = value.get("schema").is_some() && value.get("id").is_some();
    if is_document {
        let document: SchemaDocument = serde_json::from_value(value)?;
        document.validate()?;
        return Ok(document);
    }

    let schema = Schema::from_json_with_limit(&value, max_depth)?;
    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "schema".to_string());
    Ok(SchemaDocument::initial(id, "", schema))
}

fn load_workload(path: Option<&Path>) -> anyhow::Result<Option<Workload>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let workload: Workload = serde_json::from_str(&content)
        .with_context(|| format!("parsing workload {}", path.display()))?;
    Ok(Some(workload))
}

// =============================================================================
// Text output
// =============================================================================

fn print_metrics(metrics: &StructuralMetrics) {
    println!("  Collections: {}", metrics.collections);
    println!("  Fields:      {}", metrics.fields);
    println!("  Max depth:   {}", metrics.max_depth);
    println!("  References:  {}", metrics.references);
    println!("  Arrays:      {}", metrics.arrays);
    println!();
}

fn print_diff(entries: &[DiffEntry]) {
    if entries.is_empty() {
        println!("✅ No structural changes");
        return;
    }
    for entry in entries {
        let marker = match entry.kind {
            ChangeKind::Added => "+",
            ChangeKind::Removed => "-",
            ChangeKind::Modified => "~",
        };
        println!("  {} {}", marker, entry.path);
    }
    let summary = DiffSummary::of(entries);
    println!(
        "\n  {} added, {} removed, {} modified",
        summary.added, summary.removed, summary.modified
    );
}

fn print_access(report: &AccessReport) {
    println!("🔑 Access patterns ({} queried fields)", report.fields.len());
    for index in &report.recommendations {
        println!("  {} ({:.0}ms -> {:.0}ms)", index.command, index.before_ms, index.after_ms);
        println!("    └─ {}", index.reason);
    }
    for index in &report.redundant_indexes {
        println!("  ⚠️  Redundant index on {}: {}", index.collection, index.fields.join(", "));
    }
    for weak in report.selectivity.iter().filter(|s| s.weak) {
        println!("  ⚠️  Weak selectivity on {} ({:.1}%)", weak.path, weak.selectivity_pct);
    }
    println!(
        "  Coverage: {}/{} high-frequency fields ({:.0}%, {:?})",
        report.coverage.covered,
        report.coverage.high_frequency_fields,
        report.coverage.ratio * 100.0,
        report.coverage.status
    );
    println!(
        "  Write amplification: {:.1}x ({:?})",
        report.write_amplification.factor, report.write_amplification.status
    );
    for shard in &report.shard_keys {
        println!("  Shard {}: {}", shard.collection, shard.command);
    }
    println!();
}

fn print_evolution(report: &EvolutionReport) {
    println!(
        "📈 Evolution over {} months ({:.0}% size growth/month, risk {:?})",
        report.horizon_months,
        report.size_growth_rate * 100.0,
        report.risk_level
    );
    if let (Some(first), Some(last)) = (report.load.first(), report.load.last()) {
        println!(
            "  Storage {:.2} GB -> {:.2} GB, write IOPS {:.0} -> {:.0}",
            first.storage_gb, last.storage_gb, first.write_iops, last.write_iops
        );
    }
    for issue in &report.issues {
        println!("  Month {:>2}: [{}] {}", issue.month, issue.fix, issue.issue);
        println!("            └─ {}", issue.suggestion);
    }
    if report.issues.is_empty() {
        println!("  ✅ No thresholds crossed");
    }
    println!();
}

fn print_cost(report: &CostReport) {
    println!("💰 Cost projection");
    for month in &report.months {
        let flag = if month.exceeds_capacity {
            " ❌ exceeds capacity"
        } else if month.upgraded {
            " ⬆"
        } else {
            ""
        };
        println!(
            "  Month {:>2}: {:<4} {:>10.0}{}",
            month.month, month.tier, month.total_cost, flag
        );
    }
    match &report.breakeven {
        Some(b) => println!(
            "  Breakeven: month {} ({:?}), {} -> {}",
            b.month, b.constraint, b.from_tier, b.to_tier
        ),
        None => println!("  Breakeven: none within horizon"),
    }
    for scenario in &report.scenarios {
        println!(
            "  {:<12} final {:>10.0} ({:+.1}%)",
            scenario.name, scenario.final_month_cost, scenario.delta_pct
        );
    }
    for milestone in &report.milestones {
        if matches!(milestone.kind, MilestoneKind::CapacityExceeded) {
            println!("  ❌ Month {}: {}", milestone.month, milestone.description);
        }
    }
    for recommendation in &report.recommendations {
        println!(
            "  • {} (saves {:.0}/month)",
            recommendation.title, recommendation.monthly_savings
        );
    }
    println!();
}

fn print_latency(report: &LatencyReport) {
    println!("⏱  Latency (baseline {} users)", report.baseline_load);
    for simulation in &report.simulations {
        let points: Vec<String> = simulation
            .points
            .iter()
            .map(|p| format!("{:.0}ms {:?}", p.latency_ms, p.status))
            .collect();
        println!("  {:<48} {}", simulation.description, points.join(" | "));
    }
    if let Some(scale) = &report.at_scale {
        println!(
            "  At {} users: read {:.0}ms, write {:.0}ms ({:?}{})",
            scale.target_users,
            scale.read_latency_ms,
            scale.write_latency_ms,
            scale.status,
            if scale.needs_sharding { ", sharding needed" } else { "" }
        );
    }
    for recommendation in &report.recommendations {
        println!("  • {}: {}", recommendation.issue, recommendation.suggestion);
    }
    println!();
}

fn print_scores(report: &ScoreReport) {
    println!(
        "🎯 Future risk {:.0}/100, performance {:.0}/100 ({} warnings)",
        report.future_risk.value, report.performance_index.value, report.warnings
    );
}

fn print_patterns(report: &PatternReport) {
    if report.recommendations.is_empty() {
        println!("🧩 No modeling patterns suggested");
        return;
    }

    let summary = &report.summary;
    println!(
        "🧩 Modeling patterns: {} ({} high, {} medium, {} low)",
        summary.total_patterns, summary.high_priority, summary.medium_priority, summary.low_priority
    );
    for recommendation in &report.recommendations {
        println!(
            "  [{:?}] {} on {}: {}",
            recommendation.priority,
            recommendation.pattern,
            recommendation.collection,
            recommendation.description
        );
        for reason in &recommendation.reasons {
            println!("      - {}", reason);
        }
        if let Some(step) = recommendation.implementation.first() {
            println!("      → {}", step);
        }
    }
    println!();
}
