/// View models and text helpers for the board renderer.
///
/// Nothing here touches markup beyond escaping and the small content-formatting rules;
/// layout stays with whoever renders the cards.
use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{
    parse_calendar_date, AnnouncementRecord, PortfolioRecord, TimelineItem, ALL_CATEGORY,
};
use crate::xref::resolve_portfolio_link;

pub const PREVIEW_LEN: usize = 120;

const TRUSTED_NEWS_DOMAINS: &[&str] = &[
    "moneytoday.co.kr",
    "mk.co.kr",
    "etnews.com",
    "yakup.com",
    "hankyung.com",
    "naver.com",
    "daum.net",
    "joins.com",
    "chosun.com",
    "donga.com",
    "hani.co.kr",
    "khan.co.kr",
    "yna.co.kr",
    "newsis.com",
    "ytn.co.kr",
    "sbs.co.kr",
    "kbs.co.kr",
    "mbc.co.kr",
];

/// Only portfolio items with this status appear on the grid.
pub const ACTIVE_STATUS: &str = "active";

/// Display labels for well-known portfolio `details` keys; other keys show as written.
const DETAIL_LABELS: &[(&str, &str)] = &[
    ("targetCustomer", "대상 고객"),
    ("category", "서비스 카테고리"),
    ("hostOrganization", "주관 기관"),
    ("selectedField", "선정 분야"),
    ("managingOrganization", "주관 기관"),
    ("totalPrize", "총 상금"),
];

static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"- (.+?):").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardAction {
    /// Open the off-site article.
    External {
        url: String,
        open_in_new_tab: bool,
        trusted_source: bool,
    },
    /// Open the detail dialog.
    Detail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnnouncementCard {
    pub id: u64,
    pub category: String,
    pub title: String,
    pub preview: String,
    pub date: String,
    pub display_date: String,
    pub important: bool,
    pub action: CardAction,
    pub portfolio_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PortfolioSummary {
    pub id: u64,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnnouncementDetail {
    pub card: AnnouncementCard,
    pub content_html: String,
    pub portfolio: Option<PortfolioSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryTab {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DetailEntry {
    pub key: String,
    pub label: String,
    pub value: String,
}

/// A portfolio grid tile together with what its modal shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PortfolioCard {
    pub id: u64,
    pub title: String,
    pub subtitle: String,
    pub image: String,
    pub modal_image: String,
    pub description: String,
    pub details: Vec<DetailEntry>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimelineEntry {
    pub id: u64,
    pub date: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub inverted: bool,
}

impl From<&PortfolioRecord> for PortfolioSummary {
    fn from(record: &PortfolioRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            description: record.description.clone(),
        }
    }
}

pub fn card(record: &AnnouncementRecord, portfolio: &[PortfolioRecord]) -> AnnouncementCard {
    // Links that are not http(s) are never offered; the record falls back to its detail view.
    let action = match &record.external_link {
        Some(link) if is_valid_url(&link.url) => CardAction::External {
            url: link.url.clone(),
            open_in_new_tab: link.open_in_new_tab,
            trusted_source: is_trusted_domain(&link.url),
        },
        _ => CardAction::Detail,
    };

    AnnouncementCard {
        id: record.id,
        category: record.kind.clone(),
        title: record.title.clone(),
        preview: truncate_text(&record.content, PREVIEW_LEN),
        date: record.date.clone(),
        display_date: format_date_ko(&record.date),
        important: record.is_important,
        action,
        portfolio_title: resolve_portfolio_link(record, portfolio).map(|p| p.title.clone()),
    }
}

pub fn detail(record: &AnnouncementRecord, portfolio: &[PortfolioRecord]) -> AnnouncementDetail {
    AnnouncementDetail {
        card: card(record, portfolio),
        content_html: format_content(&record.content),
        portfolio: resolve_portfolio_link(record, portfolio).map(PortfolioSummary::from),
    }
}

/// Filter tabs: the all-sentinel first, then each record type in first-seen order.
pub fn category_tabs(records: &[AnnouncementRecord]) -> Vec<CategoryTab> {
    let mut tabs = vec![CategoryTab {
        category: ALL_CATEGORY.to_string(),
        count: records.len(),
    }];
    for record in records {
        if record.kind.is_empty() || record.kind == ALL_CATEGORY {
            continue;
        }
        match tabs[1..].iter_mut().find(|t| t.category == record.kind) {
            Some(tab) => tab.count += 1,
            None => tabs.push(CategoryTab {
                category: record.kind.clone(),
                count: 1,
            }),
        }
    }
    tabs
}

/// Active portfolio items ordered by `order`; equal orders keep document order.
pub fn portfolio_grid(portfolio: &[PortfolioRecord]) -> Vec<PortfolioCard> {
    let mut active: Vec<&PortfolioRecord> = portfolio
        .iter()
        .filter(|p| p.status == ACTIVE_STATUS)
        .collect();
    active.sort_by_key(|p| p.order);
    active
        .into_iter()
        .map(|p| PortfolioCard {
            id: p.id,
            title: p.title.clone(),
            subtitle: p.subtitle.clone(),
            image: p.image.clone(),
            modal_image: p.modal_image.clone(),
            description: p.description.clone(),
            details: p
                .details
                .iter()
                .map(|(key, value)| DetailEntry {
                    key: key.clone(),
                    label: detail_label(key).to_string(),
                    value: detail_value(value),
                })
                .collect(),
            tags: p.tags.clone(),
        })
        .collect()
}

/// About-page timeline ordered by `order`.
pub fn timeline(items: &[TimelineItem]) -> Vec<TimelineEntry> {
    let mut sorted: Vec<&TimelineItem> = items.iter().collect();
    sorted.sort_by_key(|t| t.order);
    sorted
        .into_iter()
        .map(|t| TimelineEntry {
            id: t.id,
            date: t.date.clone(),
            title: t.title.clone(),
            description: t.description.clone(),
            image: t.image.clone(),
            inverted: t.is_inverted,
        })
        .collect()
}

pub fn detail_label(key: &str) -> &str {
    DETAIL_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(key, |&(_, label)| label)
}

fn detail_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn escape_html(unsafe_text: &str) -> String {
    let mut out = String::with_capacity(unsafe_text.len());
    for ch in unsafe_text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

/// First `max_chars` characters followed by `...`, or the text unchanged if it fits.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}

/// Escape, then turn newlines into `<br>` and bold `■` bullets and `- label:` prefixes.
pub fn format_content(content: &str) -> String {
    let escaped = escape_html(content)
        .replace('\n', "<br>")
        .replace('■', "<strong>■</strong>");
    LABEL_RE
        .replace_all(&escaped, "<strong>- $1:</strong>")
        .into_owned()
}

/// `2024-01-10` → `2024년 1월 10일`. Unparseable dates are shown as written.
pub fn format_date_ko(raw: &str) -> String {
    match parse_calendar_date(raw) {
        Some(date) => format!("{}년 {}월 {}일", date.year(), date.month(), date.day()),
        None => raw.to_string(),
    }
}

pub fn is_valid_url(raw: &str) -> bool {
    reqwest::Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

pub fn is_trusted_domain(raw: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(raw) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    TRUSTED_NEWS_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
}
