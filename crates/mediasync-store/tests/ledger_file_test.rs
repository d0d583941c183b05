//! Ledger file format and sweep behavior on a real directory.

use std::collections::BTreeSet;

use mediasync_core::{AssetId, LedgerEntry};
use mediasync_store::{sweep, Ledger, LiveSet, OutputLayout, SweepMode};
use tempfile::TempDir;

const EXISTING_LEDGER: &str = r#"{
  "4f1c2d3e-aaaa-bbbb-cccc-000000000001": {
    "hash": "",
    "processedAt": 1735689600000,
    "originalSize": 52341,
    "processedSize": 18022
  },
  "9a07b2c1-aaaa-bbbb-cccc-000000000002": {
    "hash": "9e107d9d372bb6826bd81d3542a419d6",
    "processedAt": 1735689601234,
    "originalSize": 10485760,
    "processedSize": 2097152
  }
}"#;

#[tokio::test]
async fn test_loads_ledger_written_by_previous_runs() {
    let dir = TempDir::new().unwrap();
    let layout = OutputLayout::new(dir.path());
    std::fs::write(layout.ledger_path(), EXISTING_LEDGER).unwrap();

    let ledger = Ledger::load(layout.ledger_path()).await.unwrap();

    assert_eq!(ledger.len(), 2);
    let video = ledger
        .get(&AssetId::from("9a07b2c1-aaaa-bbbb-cccc-000000000002"))
        .unwrap();
    assert_eq!(video.hash, "9e107d9d372bb6826bd81d3542a419d6");
    assert_eq!(video.processed_at, 1_735_689_601_234);
    assert_eq!(video.processed_size, 2_097_152);
}

#[tokio::test]
async fn test_saved_ledger_keeps_camel_case_shape() {
    let dir = TempDir::new().unwrap();
    let layout = OutputLayout::new(dir.path());
    let mut ledger = Ledger::empty(layout.ledger_path());
    ledger.insert(
        AssetId::from("abc"),
        LedgerEntry {
            hash: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
            processed_at: 1,
            original_size: 10,
            processed_size: 5,
        },
    );

    ledger.save().await.unwrap();

    let raw = std::fs::read_to_string(layout.ledger_path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["abc"]["processedAt"], 1);
    assert_eq!(value["abc"]["originalSize"], 10);
    assert_eq!(value["abc"]["processedSize"], 5);
    assert!(raw.contains("\n  \"abc\""), "expected pretty-printed output");
}

#[tokio::test]
async fn test_sweep_then_reload_is_consistent() {
    let dir = TempDir::new().unwrap();
    let layout = OutputLayout::new(dir.path());
    std::fs::write(layout.ledger_path(), EXISTING_LEDGER).unwrap();
    std::fs::write(dir.path().join("4f1c2d3e-aaaa-bbbb-cccc-000000000001.webp"), b"img").unwrap();
    std::fs::write(dir.path().join("9a07b2c1-aaaa-bbbb-cccc-000000000002.mp4"), b"vid").unwrap();
    std::fs::write(dir.path().join("temp_9a07b2c1-aaaa-bbbb-cccc-000000000002.mp4"), b"tmp").unwrap();

    let mut ledger = Ledger::load(layout.ledger_path()).await.unwrap();
    let live: BTreeSet<AssetId> = [AssetId::from("9a07b2c1-aaaa-bbbb-cccc-000000000002")]
        .into_iter()
        .collect();
    let live = LiveSet::from(live);

    let report = sweep(&layout, &mut ledger, &live, SweepMode::Delete).await.unwrap();

    assert_eq!(report.removed, vec!["4f1c2d3e-aaaa-bbbb-cccc-000000000001.webp".to_string()]);
    let reloaded = Ledger::load(layout.ledger_path()).await.unwrap();
    assert_eq!(reloaded.len(), 1);
    assert!(dir.path().join("temp_9a07b2c1-aaaa-bbbb-cccc-000000000002.mp4").exists());
}
