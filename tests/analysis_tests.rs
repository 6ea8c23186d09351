//! End-to-end tests over the JSON fixtures
//!
//! Structural properties of trees and diffs, lineage resolution from a store
//! directory, and the growth, cost and latency scenarios.

use schema_advisor::analysis::access::analyze_access;
use schema_advisor::analysis::cost::{estimate_cost, Constraint, CostInputs, TierSpec, TierTable};
use schema_advisor::analysis::evolution::{project, project_evolution, Fix, RiskTier};
use schema_advisor::analysis::latency::{estimate_latency, LatencyMetrics, QueryShape};
use schema_advisor::analysis::patterns::{detect_patterns, ModelingPattern, Priority};
use schema_advisor::config::{
    AccessConfig, CostConfig, EvolutionConfig, LatencyConfig, PatternsConfig,
};
use schema_advisor::lineage::{ancestry, diff_with_parent};
use schema_advisor::{
    diff, Advisor, AdvisorConfig, AdvisorError, AnalysisKind, AnalysisReport, ChangeKind,
    DiffEntry, MemoryStore, Schema, SchemaDocument, SchemaId, Workload,
};

fn document(json: &str) -> SchemaDocument {
    serde_json::from_str(json).unwrap()
}

fn tree(json: &str) -> Schema {
    Schema::from_json(&serde_json::from_str(json).unwrap()).unwrap()
}

fn shop_v1() -> SchemaDocument {
    document(include_str!("fixtures/shop_v1.json"))
}

fn shop_v2() -> SchemaDocument {
    document(include_str!("fixtures/shop_v2.json"))
}

fn all_trees() -> Vec<Schema> {
    vec![
        shop_v1().schema,
        shop_v2().schema,
        tree(include_str!("fixtures/orders_items.json")),
        tree(include_str!("fixtures/blog.json")),
    ]
}

// =============================================================================
// Tree and Diff Properties
// =============================================================================

#[test]
fn test_field_count_at_least_collection_count() {
    for schema in all_trees() {
        assert!(schema.collections.values().all(|c| !c.is_empty()));
        assert!(schema.field_count() >= schema.collection_count());
    }
}

#[test]
fn test_blog_metrics() {
    let blog = tree(include_str!("fixtures/blog.json"));
    let metrics = blog.metrics();
    assert_eq!(metrics.collections, 3);
    // authors 3, posts 7 + comments 3 + replies 2 + meta 2 + seo 2, categories 2
    assert_eq!(metrics.fields, 21);
    // posts.meta.seo
    assert_eq!(metrics.max_depth, 3);
    // authorId, comments.userId, comments.replies.userId
    assert_eq!(metrics.references, 3);
    // tags, comments, comments.replies, meta.seo.keywords
    assert_eq!(metrics.arrays, 4);
}

#[test]
fn test_diff_is_reflexive() {
    for schema in all_trees() {
        assert!(diff(&schema, &schema).is_empty());
    }
}

#[test]
fn test_diff_is_symmetric() {
    let trees = all_trees();
    for a in &trees {
        for b in &trees {
            let forward: Vec<DiffEntry> = diff(a, b).iter().map(DiffEntry::reversed).collect();
            assert_eq!(forward, diff(b, a));
        }
    }
}

#[test]
fn test_diff_between_versions() {
    let entries = diff(&shop_v1().schema, &shop_v2().schema);
    assert_eq!(
        entries,
        vec![
            DiffEntry { path: "orders.deliveryDate".to_string(), kind: ChangeKind::Added },
            DiffEntry { path: "orders.legacyFlag".to_string(), kind: ChangeKind::Removed },
        ]
    );
}

// =============================================================================
// Lineage
// =============================================================================

#[test]
fn test_lineage_from_store_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("shop_v1.json"), include_str!("fixtures/shop_v1.json")).unwrap();
    std::fs::create_dir(dir.path().join("refinements")).unwrap();
    std::fs::write(
        dir.path().join("refinements/shop_v2.json"),
        include_str!("fixtures/shop_v2.json"),
    )
    .unwrap();

    let store = MemoryStore::load_dir(dir.path()).unwrap();
    assert_eq!(store.len(), 2);

    let v2 = SchemaId::new("shop-v2");
    let chain: Vec<u32> = ancestry(&store, &v2).unwrap().iter().map(|d| d.version).collect();
    assert_eq!(chain, vec![2, 1]);

    let entries = diff_with_parent(&store, &v2).unwrap();
    assert_eq!(entries, diff(&shop_v1().schema, &shop_v2().schema));
}

#[test]
fn test_refined_document_matches_fixture_lineage() {
    let v1 = shop_v1();
    let v2 = v1.refine("shop-v2", "track delivery dates, drop the legacy flag", shop_v2().schema);
    assert_eq!(v2.version, 2);
    assert_eq!(v2.parent_id, Some(v1.id.clone()));
    assert_eq!(v2.root(), &v1.id);
    assert!(v2.input_text.ends_with("Refinement: track delivery dates, drop the legacy flag"));
    assert!(v2.validate().is_ok());
}

// =============================================================================
// Evolution
// =============================================================================

#[test]
fn test_projection_is_monotone_for_non_negative_rates() {
    for rate in [0.0, 0.01, 0.1, 0.5, 2.0] {
        let values = project(1234.5, rate, 24).unwrap();
        assert_eq!(values.len(), 25);
        assert!(values.windows(2).all(|w| w[1] >= w[0]), "rate {}", rate);
    }
}

#[test]
fn test_orders_items_danger_before_breach() {
    let schema = tree(include_str!("fixtures/orders_items.json"));
    let workload: Workload =
        serde_json::from_str(include_str!("fixtures/orders_items_workload.json")).unwrap();
    let config = EvolutionConfig { horizon_months: 6, ..EvolutionConfig::default() };

    let access = analyze_access(&schema, &workload, &AccessConfig::default()).unwrap();
    let report = project_evolution(&schema, &workload, &access, &config).unwrap();

    let items = report.arrays.iter().find(|a| a.path == "orders.items").unwrap();
    assert_eq!(items.points.len(), 7);

    let crosses_danger = items
        .points
        .iter()
        .find(|p| p.contribution_mb >= 12.0)
        .map(|p| p.month)
        .unwrap();
    let danger = items.first_month_at(RiskTier::Danger).unwrap();
    assert!(danger <= crosses_danger);

    let convert = report.issues.iter().find(|i| i.fix == Fix::ConvertToReference).unwrap();
    assert_eq!(convert.month, danger);

    let split = report.issues.iter().find(|i| i.fix == Fix::SplitCollection).unwrap();
    assert!(split.month > convert.month);
    assert_eq!(Some(split.month), items.first_month_at(RiskTier::Breach));

    // every issue is reported once
    let mut keys: Vec<(Fix, &str)> =
        report.issues.iter().map(|i| (i.fix, i.subject.as_str())).collect();
    let total = keys.len();
    keys.sort_by_key(|(fix, subject)| (format!("{}", fix), subject.to_string()));
    keys.dedup();
    assert_eq!(keys.len(), total);
}

// =============================================================================
// Cost
// =============================================================================

fn m2_m10() -> TierTable {
    TierTable::new(vec![
        TierSpec {
            name: "M2".to_string(),
            label: "Shared".to_string(),
            included_storage_gb: 10.0,
            max_iops: 2000.0,
            base_monthly_cost: 720.0,
            storage_overage_rate: 30.0,
            iops_overage_rate: 0.0,
            charges_iops_overage: false,
        },
        TierSpec {
            name: "M10".to_string(),
            label: "Dedicated".to_string(),
            included_storage_gb: 80.0,
            max_iops: 3000.0,
            base_monthly_cost: 5940.0,
            storage_overage_rate: 45.0,
            iops_overage_rate: 0.008,
            charges_iops_overage: true,
        },
    ])
    .unwrap()
}

#[test]
fn test_storage_breakeven_month() {
    let inputs = CostInputs::new(5.0, 150.0, 0.20, 12);
    let report = estimate_cost(&inputs, &m2_m10(), &CostConfig::default()).unwrap();

    let first_over = report.months.iter().find(|m| m.storage_gb > 10.0).unwrap().month;
    let breakeven = report.breakeven.as_ref().unwrap();
    assert_eq!(breakeven.month, first_over);
    assert_eq!(breakeven.month, 4);
    assert_eq!(breakeven.constraint, Constraint::Storage);
    assert_eq!(breakeven.to_tier, "M10");
}

#[test]
fn test_breakeven_never_sooner_with_slower_growth() {
    let tiers = m2_m10();
    let config = CostConfig::default();
    let mut previous = 0;

    for rate in [0.40, 0.30, 0.20, 0.10, 0.06, 0.03, 0.0] {
        let inputs = CostInputs::new(5.0, 150.0, rate, 12);
        let report = estimate_cost(&inputs, &tiers, &config).unwrap();
        let month = report.breakeven.map_or(u32::MAX, |b| b.month);
        assert!(month >= previous, "rate {}", rate);
        previous = month;
    }
}

#[test]
fn test_zero_growth_cost_is_flat() {
    let mut config = AdvisorConfig::default();
    config.evolution.size_growth_rate = Some(0.0);
    let advisor = Advisor::new(config).unwrap();

    let result = advisor.run(&shop_v1(), None, AnalysisKind::Cost).unwrap();
    let AnalysisReport::Cost(report) = result.report else {
        panic!("expected a cost report");
    };
    assert_eq!(report.month(12).unwrap().total_cost, report.month(1).unwrap().total_cost);
    assert!(report.breakeven.is_none());
    assert!(report
        .months
        .iter()
        .all(|m| m.storage_overage_cost >= 0.0 && m.iops_overage_cost >= 0.0));
}

#[test]
fn test_default_scenarios_accept_shrinking_and_flat_growth() {
    let config = CostConfig::default();
    for rate in [-0.6, -0.2, 0.0] {
        let inputs = CostInputs::new(50.0, 100.0, rate, 12);
        let report = estimate_cost(&inputs, TierTable::atlas(), &config).unwrap();
        assert_eq!(report.scenarios.len(), config.scenarios.len(), "rate {}", rate);

        // without growth to amplify, only the IOPS multiplier can move a scenario
        let baseline = report.final_month().unwrap().total_cost;
        for scenario in report.scenarios.iter().filter(|s| s.iops_multiplier == 1.0) {
            assert_eq!(scenario.final_month_cost, baseline, "{} at rate {}", scenario.name, rate);
        }
        assert!(report.months.windows(2).all(|w| w[1].storage_gb <= w[0].storage_gb));
    }
}

#[test]
fn test_capacity_overflow_is_reported_not_raised() {
    let inputs = CostInputs::new(300.0, 500.0, 0.25, 12);
    let report = estimate_cost(&inputs, TierTable::atlas(), &CostConfig::default()).unwrap();
    assert!(report.capacity_exceeded);
    assert_eq!(report.final_month().unwrap().tier, "M60");
    assert!(report.final_month().unwrap().exceeds_capacity);
}

// =============================================================================
// Latency
// =============================================================================

#[test]
fn test_latency_grows_with_load() {
    let config = LatencyConfig::default();
    for schema in all_trees() {
        let metrics = LatencyMetrics::from_metrics(&schema.metrics(), 2);
        for shape in QueryShape::ALL {
            let at_one = estimate_latency(shape, 1.0, &metrics, &config);
            let at_two = estimate_latency(shape, 2.0, &metrics, &config);
            assert!(at_two >= at_one);
        }
    }
}

// =============================================================================
// Advisor
// =============================================================================

#[test]
fn test_full_report_is_deterministic() {
    let advisor = Advisor::new(AdvisorConfig::default()).unwrap();
    let doc = shop_v2();

    let first = advisor.full_report(&doc, None).unwrap();
    let second = advisor.full_report(&doc, None).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.version, 2);

    let json = serde_json::to_value(&first).unwrap();
    assert!(json["cost"]["months"].is_array());
    assert!(json["access"]["write_amplification"]["factor"].is_number());
    assert!(json["patterns"]["recommendations"].is_array());
}

#[test]
fn test_advisor_rejects_broken_lineage() {
    let advisor = Advisor::new(AdvisorConfig::default()).unwrap();
    let mut orphan = shop_v2();
    orphan.parent_id = None;

    let err = advisor.run(&orphan, None, AnalysisKind::Metrics).unwrap_err();
    assert!(matches!(err, AdvisorError::LineageBroken { .. }));
    assert!(matches!(
        advisor.full_report(&orphan, None),
        Err(AdvisorError::LineageBroken { .. })
    ));
}

// =============================================================================
// Parsing
// =============================================================================

#[test]
fn test_fixture_keeps_document_order() {
    let blog = tree(include_str!("fixtures/blog.json"));
    let collections: Vec<&str> = blog.collections.keys().map(String::as_str).collect();
    assert_eq!(collections, vec!["authors", "posts", "categories"]);

    let posts: Vec<&str> = blog.collections["posts"].keys().map(String::as_str).collect();
    assert_eq!(
        posts,
        vec!["_id", "authorId", "title", "publishedAt", "tags", "comments", "meta"]
    );
}

// =============================================================================
// Patterns
// =============================================================================

#[test]
fn test_telemetry_schema_patterns() {
    let schema = tree(
        r#"{
            "sensor_readings": {"deviceId": "ObjectId", "timestamp": "date", "value": "number"},
            "sessions": {"userId": "ObjectId", "token": "string", "expiresAt": "date"},
            "orders": {"customerId": "ObjectId", "total": "number", "status": "string"},
            "notifications": {"type": "string", "sentAt": "date", "body": "string"}
        }"#,
    );
    let report = detect_patterns(&schema, &PatternsConfig::default()).unwrap();

    for (pattern, collection) in [
        (ModelingPattern::TimeSeries, "sensor_readings"),
        (ModelingPattern::Bucketing, "sensor_readings"),
        (ModelingPattern::Ttl, "sessions"),
        (ModelingPattern::ExtendedReference, "orders"),
        (ModelingPattern::Capped, "notifications"),
        (ModelingPattern::Polymorphic, "notifications"),
    ] {
        assert!(report.find(pattern, collection).is_some(), "{} on {}", pattern, collection);
    }

    let priorities: Vec<Priority> = report.recommendations.iter().map(|r| r.priority).collect();
    assert!(priorities.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(report.summary.total_patterns, report.recommendations.len());
}
