//! Schema analyses
//!
//! Every analyzer is a pure function of a schema tree, a workload and its
//! configuration section. [`Advisor`] wires them together for a
//! [`SchemaDocument`] and tags each result with a hash of its inputs so callers
//! can cache by (schema id, analysis kind, input hash).
//!
//! ```text
//! SchemaTree ──► AccessPatternAnalyzer ──► EvolutionProjector ──► CostEstimator
//!      │                  │
//!      ├──────────────────┴──────────────► LatencySimulator
//!      │
//!      └──► PatternDetector
//! ```

pub mod access;
pub mod cost;
pub mod evolution;
pub mod latency;
pub mod patterns;
pub mod scoring;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::checksum::Checksum;
use crate::config::AdvisorConfig;
use crate::error::Result;
use crate::schema::{SchemaDocument, SchemaId};
use crate::tree::StructuralMetrics;
use crate::workload::Workload;

pub use access::{analyze_access, AccessReport, QueryPattern};
pub use cost::{
    estimate_cost, estimate_from_evolution, CostInputs, CostReport, TierSpec, TierTable,
};
pub use evolution::{project_evolution, EvolutionReport, Fix, RiskTier};
pub use latency::{simulate_latency, LatencyMetrics, LatencyReport, LatencyStatus};
pub use patterns::{detect_patterns, ModelingPattern, PatternReport};
pub use scoring::{score, ScoreReport};

/// Three-level health flag shared by several reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Healthy,
    Warning,
    Critical,
}

/// Kind of analysis, part of the cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Metrics,
    Access,
    Evolution,
    Cost,
    Latency,
    Scores,
    Patterns,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 7] = [
        AnalysisKind::Metrics,
        AnalysisKind::Access,
        AnalysisKind::Evolution,
        AnalysisKind::Cost,
        AnalysisKind::Latency,
        AnalysisKind::Scores,
        AnalysisKind::Patterns,
    ];
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalysisKind::Metrics => "metrics",
            AnalysisKind::Access => "access",
            AnalysisKind::Evolution => "evolution",
            AnalysisKind::Cost => "cost",
            AnalysisKind::Latency => "latency",
            AnalysisKind::Scores => "scores",
            AnalysisKind::Patterns => "patterns",
        };
        write!(f, "{}", name)
    }
}

/// Output of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisReport {
    Metrics(StructuralMetrics),
    Access(Box<AccessReport>),
    Evolution(Box<EvolutionReport>),
    Cost(Box<CostReport>),
    Latency(Box<LatencyReport>),
    Scores(ScoreReport),
    Patterns(PatternReport),
}

/// A derived result, keyed by schema id, kind and input hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub schema_id: SchemaId,
    pub kind: AnalysisKind,
    pub input_hash: Checksum,
    pub report: AnalysisReport,
}

/// Every analysis of one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullReport {
    pub schema_id: SchemaId,
    pub version: u32,
    pub input_hash: Checksum,
    pub metrics: StructuralMetrics,
    pub access: AccessReport,
    pub evolution: EvolutionReport,
    pub cost: CostReport,
    pub latency: LatencyReport,
    pub scores: ScoreReport,
    pub patterns: PatternReport,
}

/// Runs analyses for schema documents under one validated configuration
#[derive(Debug, Clone)]
pub struct Advisor {
    config: AdvisorConfig,
    tiers: TierTable,
}

impl Advisor {
    /// Validate `config` once; every later call reuses it
    pub fn new(config: AdvisorConfig) -> Result<Self> {
        config.validate()?;
        let tiers = config.cost.tier_table()?;
        Ok(Self { config, tiers })
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    /// Synthesized workload for a document, skewed by its workload hint
    pub fn synthesize_workload(&self, document: &SchemaDocument) -> Workload {
        let mut workload = Workload::synthesize(&document.schema, &self.config.workload);
        if let Some(hint) = &document.workload_type {
            workload.apply_hint(hint);
        }
        workload
    }

    /// Hash of everything an analysis of `document` depends on
    pub fn input_hash(&self, document: &SchemaDocument, workload: &Workload) -> Result<Checksum> {
        let schema = document.schema.checksum();
        let workload = Checksum::from_json(&serde_json::to_value(workload)?);
        let config = Checksum::from_json(&serde_json::to_value(&self.config)?);
        Ok(Checksum::combine([&schema, &workload, &config]))
    }

    /// Run a single analysis. A synthesized workload is used when none is given.
    pub fn run(
        &self,
        document: &SchemaDocument,
        workload: Option<&Workload>,
        kind: AnalysisKind,
    ) -> Result<AnalysisResult> {
        document.validate()?;
        let synthesized;
        let workload = match workload {
            Some(w) => w,
            None => {
                synthesized = self.synthesize_workload(document);
                &synthesized
            }
        };

        tracing::debug!(schema_id = %document.id, kind = %kind, "running analysis");

        let schema = &document.schema;
        let config = &self.config;
        let report = match kind {
            AnalysisKind::Metrics => AnalysisReport::Metrics(schema.metrics()),
            AnalysisKind::Access => {
                AnalysisReport::Access(Box::new(analyze_access(schema, workload, &config.access)?))
            }
            AnalysisKind::Evolution => {
                let access = analyze_access(schema, workload, &config.access)?;
                let evolution = project_evolution(schema, workload, &access, &config.evolution)?;
                AnalysisReport::Evolution(Box::new(evolution))
            }
            AnalysisKind::Cost => {
                let access = analyze_access(schema, workload, &config.access)?;
                let evolution = project_evolution(schema, workload, &access, &config.evolution)?;
                let cost = estimate_from_evolution(&evolution, &access, &self.tiers, &config.cost)?;
                AnalysisReport::Cost(Box::new(cost))
            }
            AnalysisKind::Latency => {
                let access = analyze_access(schema, workload, &config.access)?;
                let metrics = LatencyMetrics::from_analysis(schema, &access);
                let latency = simulate_latency(&metrics, Some(workload), &config.latency)?;
                AnalysisReport::Latency(Box::new(latency))
            }
            AnalysisKind::Scores => {
                let access = analyze_access(schema, workload, &config.access)?;
                let evolution = project_evolution(schema, workload, &access, &config.evolution)?;
                let scores = score(schema, &access, &evolution, None, None, &config.scoring)?;
                AnalysisReport::Scores(scores)
            }
            AnalysisKind::Patterns => {
                AnalysisReport::Patterns(detect_patterns(schema, &config.patterns)?)
            }
        };

        Ok(AnalysisResult {
            schema_id: document.id.clone(),
            kind,
            input_hash: self.input_hash(document, workload)?,
            report,
        })
    }

    /// Run every analysis, sharing intermediate results
    pub fn full_report(
        &self,
        document: &SchemaDocument,
        workload: Option<&Workload>,
    ) -> Result<FullReport> {
        document.validate()?;
        let synthesized;
        let workload = match workload {
            Some(w) => w,
            None => {
                synthesized = self.synthesize_workload(document);
                &synthesized
            }
        };

        tracing::debug!(
            schema_id = %document.id,
            version = document.version,
            "running full report"
        );

        let schema = &document.schema;
        let config = &self.config;
        let access = analyze_access(schema, workload, &config.access)?;
        let evolution = project_evolution(schema, workload, &access, &config.evolution)?;
        let cost = estimate_from_evolution(&evolution, &access, &self.tiers, &config.cost)?;
        let metrics = LatencyMetrics::from_analysis(schema, &access);
        let latency = simulate_latency(&metrics, Some(workload), &config.latency)?;
        let scores = score(schema, &access, &evolution, None, None, &config.scoring)?;
        let patterns = detect_patterns(schema, &config.patterns)?;

        Ok(FullReport {
            schema_id: document.id.clone(),
            version: document.version,
            input_hash: self.input_hash(document, workload)?,
            metrics: schema.metrics(),
            access,
            evolution,
            cost,
            latency,
            scores,
            patterns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use serde_json::json;

    fn document() -> SchemaDocument {
        let schema = Schema::from_json(&json!({
            "users": {"_id": "ObjectId", "name": "string", "email": "string"},
            "orders": {
                "_id": "ObjectId",
                "userId": "ObjectId",
                "createdAt": "date",
                "items": [{"productId": "ObjectId", "qty": "number"}]
            }
        }))
        .unwrap();
        SchemaDocument::initial("doc-1", "online shop", schema)
    }

    #[test]
    fn test_run_every_kind() {
        let advisor = Advisor::new(AdvisorConfig::default()).unwrap();
        let doc = document();
        for kind in AnalysisKind::ALL {
            let result = advisor.run(&doc, None, kind).unwrap();
            assert_eq!(result.kind, kind);
            assert_eq!(result.schema_id, doc.id);
        }
    }

    #[test]
    fn test_input_hash_is_stable() {
        let advisor = Advisor::new(AdvisorConfig::default()).unwrap();
        let doc = document();
        let a = advisor.run(&doc, None, AnalysisKind::Cost).unwrap();
        let b = advisor.run(&doc, None, AnalysisKind::Cost).unwrap();
        assert_eq!(a, b);

        let hinted = doc.clone().with_workload_type("write-heavy");
        let c = advisor.run(&hinted, None, AnalysisKind::Cost).unwrap();
        assert_ne!(a.input_hash, c.input_hash);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AdvisorConfig::default();
        config.evolution.horizon_months = 0;
        assert!(Advisor::new(config).is_err());
    }

    #[test]
    fn test_full_report() {
        let advisor = Advisor::new(AdvisorConfig::default()).unwrap();
        let report = advisor.full_report(&document(), None).unwrap();
        assert_eq!(report.metrics.collections, 2);
        assert_eq!(report.evolution.load.len(), 13);
        assert_eq!(report.cost.months.len(), 13);
        assert_eq!(report.patterns.collection_count, 2);
        assert!(report
            .patterns
            .find(ModelingPattern::ExtendedReference, "orders")
            .is_some());
        assert!(serde_json::to_value(&report).is_ok());
    }

    #[test]
    fn test_invalid_document_rejected() {
        let advisor = Advisor::new(AdvisorConfig::default()).unwrap();
        let mut orphan = document();
        orphan.version = 2;

        for kind in AnalysisKind::ALL {
            assert!(advisor.run(&orphan, None, kind).is_err(), "{}", kind);
        }
        assert!(advisor.full_report(&orphan, None).is_err());

        let mut own_parent = document();
        own_parent.parent_id = Some(own_parent.id.clone());
        assert!(advisor.full_report(&own_parent, None).is_err());
    }
}
