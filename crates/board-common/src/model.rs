use chrono::{DateTime, NaiveDate, NaiveDateTime};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Pseudo-category meaning "no category filter".
pub const ALL_CATEGORY: &str = "전체";

/// Records of this type may carry a `portfolioRef`.
pub const PORTFOLIO_CATEGORY: &str = "포트폴리오";

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnouncementRecord {
    /// The only field whose bad shape drops the whole record.
    pub id: u64,
    #[serde(rename = "type", deserialize_with = "lenient_text")]
    pub kind: String,
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(deserialize_with = "lenient_text")]
    pub content: String,
    #[serde(deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(deserialize_with = "lenient_flag")]
    pub is_important: bool,
    #[serde(
        deserialize_with = "lenient_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub portfolio_ref: Option<u64>,
    #[serde(
        deserialize_with = "lenient_link",
        skip_serializing_if = "Option::is_none"
    )]
    pub external_link: Option<ExternalLink>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalLink {
    pub url: String,
    #[serde(default)]
    pub open_in_new_tab: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardSettings {
    #[serde(
        deserialize_with = "lenient_page_size",
        skip_serializing_if = "Option::is_none"
    )]
    pub posts_per_page: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The announcements (or notifications) document: `{ announcements, settings }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnnouncementDocument {
    #[serde(deserialize_with = "lenient_records")]
    pub announcements: Vec<AnnouncementRecord>,
    pub settings: BoardSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnnouncementDocument {
    /// Page size from `settings.postsPerPage`; missing or zero falls back to the default.
    pub fn page_size(&self) -> u32 {
        match self.settings.posts_per_page {
            Some(n) if n > 0 => n,
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    pub fn find(&self, id: u64) -> Option<&AnnouncementRecord> {
        self.announcements.iter().find(|a| a.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioRecord {
    pub id: u64,
    pub title: String,
    pub subtitle: String,
    pub image: String,
    pub modal_image: String,
    pub description: String,
    pub details: Map<String, Value>,
    pub date: String,
    pub status: String,
    pub order: u32,
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineItem {
    pub id: u64,
    pub date: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub order: u32,
    pub is_inverted: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AboutSection {
    #[serde(deserialize_with = "lenient_records")]
    pub timeline: Vec<TimelineItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The site content document: portfolio grid, about timeline and metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ContentDocument {
    #[serde(deserialize_with = "lenient_records")]
    pub portfolio: Vec<PortfolioRecord>,
    pub about: AboutSection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parse a content date. Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive
/// `YYYY-MM-DDTHH:MM:SS`; only the calendar date is kept.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

fn lenient_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    let Value::Array(items) = raw else {
        if !raw.is_null() {
            warn!("expected a JSON array of records, ignoring value");
        }
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            serde_json::from_value(item)
                .inspect_err(|e| warn!(index, error = %e, "skipping malformed record"))
                .ok()
        })
        .collect())
}

// Advisory record fields: a wrong shape degrades to the empty value, never a lost record.

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_bool().unwrap_or(false))
}

/// Only a JSON integer is a reference; `"5"` never matches portfolio id 5.
fn lenient_ref<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_u64())
}

fn lenient_link<'de, D>(deserializer: D) -> Result<Option<ExternalLink>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(raw)
        .inspect_err(|e| warn!(error = %e, "ignoring malformed externalLink"))
        .ok())
}

fn lenient_page_size<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(raw.as_u64().and_then(|n| u32::try_from(n).ok()))
}
