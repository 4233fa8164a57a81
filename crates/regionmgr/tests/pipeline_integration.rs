//! End-to-end tests: dump source through pipeline to output files.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use splitroute_ipset::{reserved, AddressSet};
use splitroute_regionmgr::output::OutputWriter;
use splitroute_regionmgr::{
    CachedSource, DelegationSource, Pipeline, Placement, RegionError, Result, ScopeKey,
};
use splitroute_types::IpFamily;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

const DUMP: &str = "\
2|apnic|20240101|9|19830613|20240101|+1000
apnic|*|asn|*|1|summary
apnic|*|ipv4|*|6|summary
apnic|*|ipv6|*|2|summary
apnic|CN|asn|4134|1|20020801|allocated
apnic|AU|ipv4|1.0.0.0|256|20110811|assigned
apnic|CN|ipv4|1.0.1.0|256|20110414|allocated
apnic|CN|ipv4|1.0.2.0|512|20110414|allocated
apnic|CN|ipv4|1.0.8.0|2048|20110412|allocated
apnic|CN|ipv4|5.5.5.0|200|20110414|allocated
apnic|JP|ipv4|1.0.16.0|4096|20110412|allocated
apnic|CN|ipv6|2400:3200::|32|20090407|allocated
apnic|CN|ipv6|2400:3201::|32|20090407|allocated
";

struct StaticSource(&'static str);

#[async_trait]
impl DelegationSource for StaticSource {
    async fn fetch(&self) -> Result<String> {
        Ok(self.0.to_string())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

struct FailingSource;

#[async_trait]
impl DelegationSource for FailingSource {
    async fn fetch(&self) -> Result<String> {
        Err(RegionError::HttpStatus {
            url: "http://registry.invalid/dump".to_string(),
            status: 503,
        })
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}

fn key(s: &str) -> ScopeKey {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_pipeline_writes_expected_lists() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new([key("CN-ipv4"), key("CN-ipv6")]);
    let context = pipeline.run(&StaticSource(DUMP)).await.unwrap();

    assert_eq!(context.matched(), 5);
    assert_eq!(context.anomalies(), 1);

    let writer = OutputWriter::new(dir.path());
    writer.write(&context).unwrap();

    let v4 = fs::read_to_string(writer.domestic_path(&key("CN-ipv4"))).unwrap();
    assert_eq!(v4, "1.0.1.0/24\n1.0.2.0/23\n1.0.8.0/21\n");

    let v6 = fs::read_to_string(writer.domestic_path(&key("CN-ipv6"))).unwrap();
    assert_eq!(v6, "2400:3200::/31\n");

    let v6_overseas = fs::read_to_string(writer.overseas_path(&key("CN-ipv6"))).unwrap();
    let first = v6_overseas.lines().next().unwrap();
    assert_eq!(first, "2000::/16");
    assert!(!v6_overseas.lines().any(|l| l == "2001:db8::/32"));
}

#[tokio::test]
async fn test_overseas_file_round_trips_into_a_canonical_set() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new([key("CN-ipv4")]);
    let context = pipeline.run(&StaticSource(DUMP)).await.unwrap();

    let writer = OutputWriter::new(dir.path());
    writer.write(&context).unwrap();

    let text = fs::read_to_string(writer.overseas_path(&key("CN-ipv4"))).unwrap();
    let reloaded = AddressSet::aggregate_cidrs(IpFamily::V4, text.lines()).unwrap();
    assert_eq!(reloaded.to_string(), text);

    let domestic = &context.get(&key("CN-ipv4")).unwrap().domestic;
    let whole = reloaded
        .union(domestic)
        .unwrap()
        .union(reserved::reserved(IpFamily::V4))
        .unwrap();
    assert_eq!(whole, AddressSet::universe(IpFamily::V4));
}

#[tokio::test]
async fn test_cached_pipeline_survives_source_outage() {
    let dir = TempDir::new().unwrap();
    let cache_path = dir.path().join("cache/dump.txt");

    let warm = CachedSource::new(StaticSource(DUMP), &cache_path, Duration::from_secs(3600));
    let pipeline = Pipeline::new([key("CN-ipv4")]);
    let first = pipeline.run(&warm).await.unwrap();

    let offline = CachedSource::new(FailingSource, &cache_path, Duration::from_secs(3600));
    let second = pipeline.run(&offline).await.unwrap();
    assert_eq!(
        first.get(&key("CN-ipv4")).unwrap(),
        second.get(&key("CN-ipv4")).unwrap()
    );

    offline.clear().unwrap();
    let err = pipeline.run(&offline).await.unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_check_classifies_against_every_scope() {
    let pipeline = Pipeline::new([key("CN-ipv4"), key("JP-ipv4")]);
    let context = pipeline.run(&StaticSource(DUMP)).await.unwrap();

    let address = "1.0.16.1".parse().unwrap();
    let placements: Vec<(String, Placement)> = context
        .classify(&address)
        .into_iter()
        .map(|(scope, placement)| (scope.to_string(), placement))
        .collect();
    assert_eq!(
        placements,
        vec![
            ("CN-ipv4".to_string(), Placement::Overseas),
            ("JP-ipv4".to_string(), Placement::Domestic),
        ]
    );
}
