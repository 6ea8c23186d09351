//! Schema Advisor
//!
//! Deterministic analysis and projection engine for generated MongoDB schemas.
//! Every analysis is a pure function of a schema tree, a workload and a
//! validated configuration; nothing here performs network I/O or keeps state
//! between calls.
//!
//! ## Features
//!
//! - **Schema Trees**: Tagged-variant trees with structural metrics (fields, depth, references, arrays)
//! - **Structural Diff**: Deterministic added/removed/modified entries between two versions
//! - **Lineage**: Version chains resolved through an injected schema store
//! - **Access Patterns**: Query classification, index recommendations, selectivity, coverage, write amplification
//! - **Evolution**: Compounding growth projections with array size risk tiers and one-time issues
//! - **Cost**: Month-by-month tier selection, breakeven month and sensitivity scenarios
//! - **Latency**: Load- and structure-driven latency estimates per query shape
//! - **Patterns**: Modeling pattern suggestions (time-series, TTL, bucketing, subset and others)
//!
//! ## Architecture
//!
//! ```text
//! SchemaDocument ─┬─► tree (metrics)
//!                 ├─► diff / lineage
//!                 └─► analysis::Advisor
//!                       ├─► access ──► evolution ──► cost
//!                       ├─► latency
//!                       ├─► scoring
//!                       └─► patterns
//! ```

pub mod analysis;
pub mod checksum;
pub mod config;
pub mod diff;
pub mod error;
pub mod lineage;
pub mod naming;
pub mod schema;
pub mod tree;
pub mod workload;

pub use analysis::{Advisor, AnalysisKind, AnalysisReport, AnalysisResult, FullReport, Status};
pub use checksum::Checksum;
pub use config::AdvisorConfig;
pub use diff::{diff, ChangeKind, DiffEntry, DiffSummary};
pub use error::{AdvisorError, Result};
pub use lineage::{MemoryStore, SchemaStore};
pub use schema::{Schema, SchemaDocument, SchemaId, SchemaNode, TypeTag};
pub use tree::StructuralMetrics;
pub use workload::Workload;
