//! Serde serialization/deserialization tests for core types.
//!
//! Catalog files written by earlier releases use localized key names; these
//! tests pin that on-disk format and the English aliases accepted on read.

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use crate::{AuthConfig, CatalogRecord, RecordPatch, Session};

// ============================================================================
// CatalogRecord Serde Tests
// ============================================================================

#[test]
fn test_record_reads_original_keys() {
    let value = json!({
        "序号": 1,
        "标题": "飞牛论坛",
        "外网跳转URL": "https://club.fnnas.com/",
        "内网跳转URL": "https://club.fnnas.com/",
        "本地图片URL": "",
        "网络图片URL": "https://img.example.com/1.jpg"
    });

    let record: CatalogRecord = serde_json::from_value(value).unwrap();
    assert_eq!(record.sequence_number, 1);
    assert_eq!(record.title, "飞牛论坛");
    assert_eq!(record.local_icon_path, None);
    assert_eq!(record.remote_icon_url, "https://img.example.com/1.jpg");
}

#[test]
fn test_record_accepts_english_aliases() {
    let value = json!({
        "sequence_number": 7,
        "title": "Grafana",
        "external_url": "https://grafana.example.com",
        "internal_url": "http://192.168.1.5:3000",
        "local_icon_path": "/conf/7_Grafana.jpg",
        "remote_icon_url": "https://grafana.example.com/favicon.ico"
    });

    let record: CatalogRecord = serde_json::from_value(value).unwrap();
    assert_eq!(record.sequence_number, 7);
    assert_eq!(record.internal_url, "http://192.168.1.5:3000");
    assert_eq!(record.local_icon_path.as_deref(), Some("/conf/7_Grafana.jpg"));
}

#[test]
fn test_record_writes_original_keys() {
    let mut record = CatalogRecord::new(2, "测速", "http://test.ustc.edu.cn/", "");
    record.local_icon_path = Some("/conf/2_测速.jpg".to_string());

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["序号"], 2);
    assert_eq!(value["外网跳转URL"], "http://test.ustc.edu.cn/");
    assert_eq!(value["本地图片URL"], "/conf/2_测速.jpg");
    assert!(value.get("sequence_number").is_none());
}

#[test]
fn test_record_missing_fields_default() {
    let record: CatalogRecord = serde_json::from_value(json!({"标题": "bare"})).unwrap();
    assert_eq!(record.sequence_number, 0);
    assert!(record.external_url.is_empty());
    assert!(record.local_icon_path.is_none());
    assert!(!record.has_remote_icon());
}

#[test]
fn test_record_null_local_path() {
    let record: CatalogRecord =
        serde_json::from_value(json!({"序号": 1, "本地图片URL": null})).unwrap();
    assert!(record.local_icon_path.is_none());
}

#[test]
fn test_catalog_roundtrip_preserves_fields() {
    let mut records = vec![
        CatalogRecord::new(1, "a", "https://a.example.com", "http://a.lan"),
        CatalogRecord::new(2, "b", "https://b.example.com", "http://b.lan"),
    ];
    records[1].remote_icon_url = "https://b.example.com/favicon.ico".to_string();
    records[1].local_icon_path = Some("/conf/2_b.jpg".to_string());

    let json = serde_json::to_string_pretty(&records).unwrap();
    let parsed: Vec<CatalogRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, records);
}

// ============================================================================
// RecordPatch Serde Tests
// ============================================================================

#[test]
fn test_patch_absent_fields_are_none() {
    let patch: RecordPatch = serde_json::from_value(json!({"标题": "x"})).unwrap();
    assert_eq!(patch.title.as_deref(), Some("x"));
    assert!(patch.external_url.is_none());
    assert!(patch.remote_icon_url.is_none());
}

#[test]
fn test_patch_ignores_sequence_number() {
    let patch: RecordPatch =
        serde_json::from_value(json!({"序号": 99, "external_url": "https://x.dev"})).unwrap();
    assert_eq!(patch.external_url.as_deref(), Some("https://x.dev"));
}

// ============================================================================
// Auth Serde Tests
// ============================================================================

#[test]
fn test_auth_config_format() {
    let config = AuthConfig::new("ab12", 45);
    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(value, json!({"password": "ab12", "timeout": 45}));
}

#[test]
fn test_session_roundtrip() {
    let now = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
    let session = Session::new("tok", now, Duration::minutes(10));
    let json = serde_json::to_string(&session).unwrap();
    let parsed: Session = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, session);
}
