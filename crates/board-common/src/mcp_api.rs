use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::admin::{NewPortfolio, NewTimelineItem, PortfolioPatch, TimelinePatch};
use crate::model::{AnnouncementRecord, PortfolioRecord, TimelineItem};
use crate::pager::PageItem;
use crate::view::{
    AnnouncementCard, AnnouncementDetail, CategoryTab, PortfolioCard, PortfolioSummary,
    TimelineEntry,
};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QueryAnnouncementsParams {
    /// Category to show, e.g. "공고" or "포트폴리오" (default: "전체", every category).
    pub category: Option<String>,
    /// Case-insensitive substring matched against title and content.
    pub search: Option<String>,
    /// 1-based page number (default: 1).
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AnnouncementIdParams {
    pub announcement_id: u64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PortfolioIdParams {
    pub portfolio_id: u64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TimelineIdParams {
    pub timeline_id: u64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddPortfolioParams {
    /// Requires title, subtitle, image and description.
    pub item: NewPortfolio,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdatePortfolioParams {
    pub portfolio_id: u64,
    /// Only the given fields change.
    pub patch: PortfolioPatch,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddTimelineParams {
    /// Requires date, title, description and image.
    pub item: NewTimelineItem,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateTimelineParams {
    pub timeline_id: u64,
    /// Only the given fields change.
    pub patch: TimelinePatch,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LinkAnnouncementParams {
    pub announcement_id: u64,
    pub portfolio_id: u64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ImportContentParams {
    /// `{ "content": ..., "notifications": ... }` as an object or as JSON text.
    pub bundle: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QueryAnnouncementsResponse {
    pub category: String,
    pub search: Option<String>,
    pub page: u32,
    pub page_size: u32,
    pub total_matched: usize,
    pub total_pages: usize,
    pub items: Vec<AnnouncementCard>,
    pub pagination: Vec<PageItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnnouncementDetailResponse {
    pub announcement: AnnouncementDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryTab>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PortfolioGridResponse {
    pub items: Vec<PortfolioCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AboutTimelineResponse {
    pub items: Vec<TimelineEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PortfolioLinkResponse {
    pub announcement_id: u64,
    /// `None` when the announcement links nowhere or the reference is broken.
    pub portfolio: Option<PortfolioSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LinkedAnnouncementsResponse {
    pub portfolio_id: u64,
    pub announcements: Vec<AnnouncementCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PortfolioListResponse {
    pub items: Vec<PortfolioRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PortfolioItemResponse {
    pub item: PortfolioRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TimelineListResponse {
    pub items: Vec<TimelineItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TimelineItemResponse {
    pub item: TimelineItem,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnnouncementResponse {
    pub announcement: AnnouncementRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportContentResponse {
    pub file_name: String,
    /// Where the bundle was written, when an export directory is configured.
    pub written_to: Option<String>,
    pub bundle: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImportContentResponse {
    pub portfolio_count: usize,
    pub timeline_count: usize,
    pub announcement_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReloadContentResponse {
    pub changed: bool,
    pub digest: String,
    pub announcement_count: usize,
}
