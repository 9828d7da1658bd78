//! Catalog record types.
//!
//! This module contains the launcher shortcut model:
//! - [`CatalogRecord`] - One persisted shortcut
//! - [`RecordPatch`] - Partial record carried by create/update requests
//! - [`IconChange`] - Which icon-relevant field an update touched
//!
//! Records keep the on-disk key names of the original catalog files so that
//! existing `fnicon.json` files load unchanged. English snake_case keys are
//! accepted as aliases on read.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

/// Icon used when neither the request nor the discovery cascade yields one.
pub const DEFAULT_ICON_URL: &str = "https://fnnas.com/favicon.ico";

/// URL prefix under which downloaded icons are served.
const LOCAL_ICON_PREFIX: &str = "/conf/";

/// Characters outside ASCII word characters and the CJK unified block.
static UNSAFE_TITLE_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9_\x{4E00}-\x{9FA5}]").expect("Invalid regex")
});

// ============================================================================
// Catalog Record
// ============================================================================

/// A single launcher shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Position/identity within the catalog. Zero means "unassigned".
    #[serde(rename = "序号", alias = "sequence_number", default)]
    pub sequence_number: u32,

    /// Display title.
    #[serde(rename = "标题", alias = "title", default)]
    pub title: String,

    /// URL opened from outside the home network.
    #[serde(rename = "外网跳转URL", alias = "external_url", default)]
    pub external_url: String,

    /// URL opened from inside the home network.
    #[serde(rename = "内网跳转URL", alias = "internal_url", default)]
    pub internal_url: String,

    /// Served path of the downloaded icon, e.g. `/conf/1_title.jpg`.
    #[serde(
        rename = "本地图片URL",
        alias = "local_icon_path",
        default,
        deserialize_with = "empty_as_none"
    )]
    pub local_icon_path: Option<String>,

    /// Remote icon the local copy was downloaded from.
    #[serde(rename = "网络图片URL", alias = "remote_icon_url", default)]
    pub remote_icon_url: String,
}

impl CatalogRecord {
    /// Creates a record with no icon information.
    pub fn new(
        sequence_number: u32,
        title: impl Into<String>,
        external_url: impl Into<String>,
        internal_url: impl Into<String>,
    ) -> Self {
        Self {
            sequence_number,
            title: title.into(),
            external_url: external_url.into(),
            internal_url: internal_url.into(),
            local_icon_path: None,
            remote_icon_url: String::new(),
        }
    }

    /// Builds a new record from a create request.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRecord`] if the title is missing or blank.
    pub fn from_patch(sequence_number: u32, patch: RecordPatch) -> Result<Self, CoreError> {
        let title = patch
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| CoreError::InvalidRecord("title is required".to_string()))?;

        Ok(Self {
            sequence_number,
            title,
            external_url: patch.external_url.unwrap_or_default(),
            internal_url: patch.internal_url.unwrap_or_default(),
            local_icon_path: None,
            remote_icon_url: patch.remote_icon_url.unwrap_or_default(),
        })
    }

    /// Merges a partial update into this record.
    ///
    /// Returns which icon-relevant field changed value. An explicitly
    /// changed remote icon takes precedence over a changed external URL.
    pub fn apply_patch(&mut self, patch: RecordPatch) -> IconChange {
        let remote_changed = patch
            .remote_icon_url
            .as_ref()
            .is_some_and(|r| *r != self.remote_icon_url);
        let external_changed = patch
            .external_url
            .as_ref()
            .is_some_and(|e| *e != self.external_url);

        if let Some(title) = patch.title.filter(|t| !t.trim().is_empty()) {
            self.title = title;
        }
        if let Some(external) = patch.external_url {
            self.external_url = external;
        }
        if let Some(internal) = patch.internal_url {
            self.internal_url = internal;
        }
        if let Some(remote) = patch.remote_icon_url {
            self.remote_icon_url = remote;
        }

        if remote_changed {
            IconChange::RemoteIcon
        } else if external_changed {
            IconChange::ExternalUrl
        } else {
            IconChange::Unchanged
        }
    }

    /// File name the icon of this record is stored under.
    pub fn icon_file_name(&self) -> String {
        icon_file_name(self.sequence_number, &self.title)
    }

    /// File name of the local icon, if the record points at a local file.
    ///
    /// Remote (`http…`) values and empty values yield `None`.
    pub fn local_icon_file_name(&self) -> Option<&str> {
        let path = self.local_icon_path.as_deref()?;
        if path.is_empty() || path.starts_with("http") {
            return None;
        }
        path.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Returns true if the record has a remote icon to mirror locally.
    pub fn has_remote_icon(&self) -> bool {
        !self.remote_icon_url.trim().is_empty()
    }
}

/// Which icon-relevant field an update changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconChange {
    /// Neither the external URL nor the remote icon changed.
    Unchanged,
    /// The external URL changed; the icon must be rediscovered.
    ExternalUrl,
    /// The remote icon URL was explicitly set to a new value.
    RemoteIcon,
}

// ============================================================================
// Record Patch
// ============================================================================

/// Partial record as sent by the front end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    /// New title.
    #[serde(rename = "标题", alias = "title", default)]
    pub title: Option<String>,

    /// New external URL.
    #[serde(rename = "外网跳转URL", alias = "external_url", default)]
    pub external_url: Option<String>,

    /// New internal URL.
    #[serde(rename = "内网跳转URL", alias = "internal_url", default)]
    pub internal_url: Option<String>,

    /// New remote icon URL.
    #[serde(rename = "网络图片URL", alias = "remote_icon_url", default)]
    pub remote_icon_url: Option<String>,
}

// ============================================================================
// Helpers
// ============================================================================

/// Replaces every character that is not safe in an icon file name with `_`.
pub fn sanitize_title(title: &str) -> String {
    UNSAFE_TITLE_CHARS.replace_all(title, "_").into_owned()
}

/// Deterministic icon file name for a record identity.
pub fn icon_file_name(sequence_number: u32, title: &str) -> String {
    format!("{sequence_number}_{}.jpg", sanitize_title(title))
}

/// Served path referencing an icon file inside the configuration directory.
pub fn local_icon_ref(file_name: &str) -> String {
    format!("{LOCAL_ICON_PREFIX}{file_name}")
}

/// Sorts records by ascending sequence number, keeping ties in input order.
pub fn sort_records(records: &mut [CatalogRecord]) {
    records.sort_by_key(|r| r.sequence_number);
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CatalogRecord {
        let mut r = CatalogRecord::new(3, "NAS", "https://nas.example.com", "http://10.0.0.2");
        r.remote_icon_url = "https://nas.example.com/favicon.ico".to_string();
        r
    }

    #[test]
    fn test_sanitize_title_keeps_cjk_and_word_chars() {
        assert_eq!(sanitize_title("飞牛论坛"), "飞牛论坛");
        assert_eq!(sanitize_title("my site/v2 (beta)"), "my_site_v2__beta_");
        assert_eq!(sanitize_title("a.b-c"), "a_b_c");
    }

    #[test]
    fn test_icon_file_name() {
        assert_eq!(icon_file_name(2, "中科大 测速"), "2_中科大_测速.jpg");
        assert_eq!(local_icon_ref("2_x.jpg"), "/conf/2_x.jpg");
    }

    #[test]
    fn test_from_patch_requires_title() {
        let err = CatalogRecord::from_patch(1, RecordPatch::default()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRecord(_)));

        let patch = RecordPatch {
            title: Some("Router".to_string()),
            external_url: Some("http://router.lan".to_string()),
            ..Default::default()
        };
        let r = CatalogRecord::from_patch(4, patch).unwrap();
        assert_eq!(r.sequence_number, 4);
        assert_eq!(r.external_url, "http://router.lan");
        assert!(r.internal_url.is_empty());
        assert!(r.local_icon_path.is_none());
    }

    #[test]
    fn test_apply_patch_unrelated_field_is_unchanged() {
        let mut r = record();
        let change = r.apply_patch(RecordPatch {
            title: Some("Storage".to_string()),
            internal_url: Some("http://10.0.0.3".to_string()),
            ..Default::default()
        });
        assert_eq!(change, IconChange::Unchanged);
        assert_eq!(r.title, "Storage");
    }

    #[test]
    fn test_apply_patch_same_values_is_unchanged() {
        let mut r = record();
        let change = r.apply_patch(RecordPatch {
            external_url: Some(r.external_url.clone()),
            remote_icon_url: Some(r.remote_icon_url.clone()),
            ..Default::default()
        });
        assert_eq!(change, IconChange::Unchanged);
    }

    #[test]
    fn test_apply_patch_external_change() {
        let mut r = record();
        let change = r.apply_patch(RecordPatch {
            external_url: Some("https://other.example.org".to_string()),
            ..Default::default()
        });
        assert_eq!(change, IconChange::ExternalUrl);
    }

    #[test]
    fn test_apply_patch_remote_wins_over_external() {
        let mut r = record();
        let change = r.apply_patch(RecordPatch {
            external_url: Some("https://other.example.org".to_string()),
            remote_icon_url: Some("https://cdn.example.org/i.png".to_string()),
            ..Default::default()
        });
        assert_eq!(change, IconChange::RemoteIcon);
        assert_eq!(r.remote_icon_url, "https://cdn.example.org/i.png");
    }

    #[test]
    fn test_blank_title_is_ignored_on_update() {
        let mut r = record();
        r.apply_patch(RecordPatch {
            title: Some("  ".to_string()),
            ..Default::default()
        });
        assert_eq!(r.title, "NAS");
    }

    #[test]
    fn test_local_icon_file_name() {
        let mut r = record();
        assert_eq!(r.local_icon_file_name(), None);

        r.local_icon_path = Some("/conf/3_NAS.jpg".to_string());
        assert_eq!(r.local_icon_file_name(), Some("3_NAS.jpg"));

        r.local_icon_path = Some("https://cdn.example.org/3.jpg".to_string());
        assert_eq!(r.local_icon_file_name(), None);
    }

    #[test]
    fn test_sort_records() {
        let mut records = vec![
            CatalogRecord::new(3, "c", "", ""),
            CatalogRecord::new(1, "a", "", ""),
            CatalogRecord::new(2, "b", "", ""),
        ];
        sort_records(&mut records);
        let seqs: Vec<u32> = records.iter().map(|r| r.sequence_number).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }
}
