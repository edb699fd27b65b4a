mod common;

use common::{InMemoryFactTable, VerbatimFactTable};
use geo_ref::extractor::DistinctLocationExtractor;
use geo_ref::hierarchy::{Configuration, HierarchyLevel, LevelSpec};
use geo_ref::identifier::SqlIdentifier;
use geo_ref::location::LocationTuple;
use geo_ref::source::FactQuery;
use geo_ref::GeoRefError;

fn config() -> Configuration {
    Configuration::new(SqlIdentifier::table("sales").unwrap())
}

fn column(name: &str) -> LevelSpec {
    LevelSpec::Column(SqlIdentifier::column(name).unwrap())
}

fn value(v: &str) -> LevelSpec {
    LevelSpec::StaticValue(v.to_string())
}

#[tokio::test]
async fn test_duplicate_rows_collapse_to_one_tuple() {
    let fact = InMemoryFactTable::new(vec![
        vec![("prov", Some("Jawa Barat")), ("kota", Some("Bandung"))],
        vec![("prov", Some("Jawa Barat")), ("kota", Some("Bandung"))],
        vec![("prov", Some("Jawa Barat")), ("kota", Some("Bogor"))],
    ]);
    let config = config()
        .with_level(HierarchyLevel::Province, column("prov"))
        .with_level(HierarchyLevel::City, column("kota"));

    let extracted = DistinctLocationExtractor::new(&fact)
        .extract(&config)
        .await
        .unwrap();

    assert_eq!(extracted.tuples.len(), 2);
    assert_eq!(
        extracted.active_levels,
        vec![HierarchyLevel::Province, HierarchyLevel::City]
    );
    assert_eq!(extracted.tuples[0].get(HierarchyLevel::City), Some("Bandung"));
    assert_eq!(extracted.tuples[1].get(HierarchyLevel::City), Some("Bogor"));
}

#[tokio::test]
async fn test_static_levels_are_backfilled() {
    let fact = InMemoryFactTable::new(vec![
        vec![("kota", Some("Bandung"))],
        vec![("kota", Some("Bandung"))],
        vec![("kota", Some("Jakarta"))],
    ]);
    let config = config()
        .with_level(HierarchyLevel::City, column("kota"))
        .with_level(HierarchyLevel::Province, value("Jawa Barat"));

    let extracted = DistinctLocationExtractor::new(&fact)
        .extract(&config)
        .await
        .unwrap();

    assert_eq!(
        extracted.tuples,
        vec![
            LocationTuple::new()
                .with(HierarchyLevel::Province, Some("Jawa Barat"))
                .with(HierarchyLevel::City, Some("Bandung")),
            LocationTuple::new()
                .with(HierarchyLevel::Province, Some("Jawa Barat"))
                .with(HierarchyLevel::City, Some("Jakarta")),
        ]
    );
}

#[tokio::test]
async fn test_static_only_configuration_probes_and_yields_one_tuple() {
    let fact = InMemoryFactTable::new(vec![
        vec![("amount", Some("10"))],
        vec![("amount", Some("20"))],
    ]);
    let config = config()
        .with_level(HierarchyLevel::Province, value("Jawa Barat"))
        .with_level(HierarchyLevel::City, value("Bandung"));

    let extracted = DistinctLocationExtractor::new(&fact)
        .extract(&config)
        .await
        .unwrap();

    assert!(matches!(fact.issued().as_slice(), [FactQuery::Probe { .. }]));
    assert_eq!(
        extracted.tuples,
        vec![LocationTuple::new()
            .with(HierarchyLevel::Province, Some("Jawa Barat"))
            .with(HierarchyLevel::City, Some("Bandung"))]
    );
}

#[tokio::test]
async fn test_null_column_values_are_excluded() {
    let fact = InMemoryFactTable::new(vec![
        vec![("prov", None)],
        vec![("prov", Some("Banten"))],
    ]);
    let config = config().with_level(HierarchyLevel::Province, column("prov"));

    let extracted = DistinctLocationExtractor::new(&fact)
        .extract(&config)
        .await
        .unwrap();

    assert_eq!(extracted.tuples.len(), 1);
    assert_eq!(
        extracted.tuples[0].get(HierarchyLevel::Province),
        Some("Banten")
    );
}

#[tokio::test]
async fn test_dedup_is_case_sensitive() {
    let fact = InMemoryFactTable::new(vec![
        vec![("prov", Some("BANTEN"))],
        vec![("prov", Some("Banten"))],
    ]);
    let config = config().with_level(HierarchyLevel::Province, column("prov"));

    let extracted = DistinctLocationExtractor::new(&fact)
        .extract(&config)
        .await
        .unwrap();

    assert_eq!(extracted.tuples.len(), 2);
}

#[tokio::test]
async fn test_empty_fact_table_yields_no_tuples() {
    let fact = InMemoryFactTable::new(Vec::new());
    let config = config().with_level(HierarchyLevel::Province, column("prov"));

    let extracted = DistinctLocationExtractor::new(&fact)
        .extract(&config)
        .await
        .unwrap();

    assert!(extracted.tuples.is_empty());
}

#[tokio::test]
async fn test_extraction_failure_is_fatal() {
    let fact = InMemoryFactTable::unreachable();
    let config = config().with_level(HierarchyLevel::Province, column("prov"));

    let result = DistinctLocationExtractor::new(&fact).extract(&config).await;

    match result {
        Err(GeoRefError::Query { sql, .. }) => assert!(sql.starts_with("SELECT DISTINCT")),
        other => panic!("expected query error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_repeated_result_rows_are_collapsed_by_the_extractor() {
    let fact = VerbatimFactTable::new(vec![
        vec![("city", Some("Bandung"))],
        vec![("city", Some("Bogor"))],
        vec![("city", Some("Bandung"))],
        vec![("city", Some("Bogor"))],
    ]);
    let config = config()
        .with_level(HierarchyLevel::Province, value("Jawa Barat"))
        .with_level(HierarchyLevel::City, column("kota"));

    let extracted = DistinctLocationExtractor::new(&fact)
        .extract(&config)
        .await
        .unwrap();

    assert_eq!(
        extracted.tuples,
        vec![
            LocationTuple::new()
                .with(HierarchyLevel::Province, Some("Jawa Barat"))
                .with(HierarchyLevel::City, Some("Bandung")),
            LocationTuple::new()
                .with(HierarchyLevel::Province, Some("Jawa Barat"))
                .with(HierarchyLevel::City, Some("Bogor")),
        ]
    );
}
