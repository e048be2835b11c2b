/// Admin console: CRUD over an in-memory copy of the site documents.
///
/// Edits never reach the source files. `export` produces the JSON bundle an operator
/// copies back by hand; everything else is lost when the session ends.
use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::CommonError;
use crate::model::{
    AnnouncementDocument, AnnouncementRecord, ContentDocument, PortfolioRecord, TimelineItem,
};

const DEFAULT_STATUS: &str = "active";

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    /// Defaults to `image`.
    pub modal_image: Option<String>,
    pub details: Option<Map<String, Value>>,
    /// Defaults to today.
    pub date: Option<String>,
    /// Defaults to "active".
    pub status: Option<String>,
    /// Defaults to one past the current maximum.
    pub order: Option<u32>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPatch {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image: Option<String>,
    pub modal_image: Option<String>,
    pub description: Option<String>,
    pub details: Option<Map<String, Value>>,
    pub date: Option<String>,
    pub status: Option<String>,
    pub order: Option<u32>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTimelineItem {
    pub date: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub order: Option<u32>,
    pub is_inverted: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePatch {
    pub date: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub order: Option<u32>,
    pub is_inverted: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub content: ContentDocument,
    pub notifications: AnnouncementDocument,
    pub export_date: String,
}

impl ExportBundle {
    /// Suggested download name, e.g. `nero-content-2024-05-01.json`.
    pub fn file_name(&self) -> String {
        let day = self.export_date.get(..10).unwrap_or(&self.export_date);
        format!("nero-content-{day}.json")
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ImportBundle {
    pub content: Option<ContentDocument>,
    pub notifications: Option<AnnouncementDocument>,
}

impl ImportBundle {
    pub fn parse(raw: &str) -> Result<Self, CommonError> {
        serde_json::from_str(raw).map_err(|e| CommonError::Import(e.to_string()))
    }

    /// Accepts the bundle object itself or a string holding its JSON text.
    pub fn from_json(value: Value) -> Result<Self, CommonError> {
        match value {
            Value::String(raw) => Self::parse(&raw),
            other => serde_json::from_value(other).map_err(|e| CommonError::Import(e.to_string())),
        }
    }
}

pub struct AdminConsole {
    content: ContentDocument,
    notifications: AnnouncementDocument,
    today: fn() -> NaiveDate,
}

impl AdminConsole {
    pub fn new(content: ContentDocument, notifications: AnnouncementDocument) -> Self {
        Self {
            content,
            notifications,
            today: || Local::now().date_naive(),
        }
    }

    /// Replace the clock used for default dates and `lastUpdated`.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn content(&self) -> &ContentDocument {
        &self.content
    }

    pub fn notifications(&self) -> &AnnouncementDocument {
        &self.notifications
    }

    fn today_string(&self) -> String {
        (self.today)().format("%Y-%m-%d").to_string()
    }

    fn touch_last_modified(&mut self) {
        let today = self.today_string();
        if let Some(metadata) = self.content.metadata.as_mut() {
            metadata.last_updated = Some(today);
        }
    }

    // --- portfolio ---

    pub fn list_portfolio(&self) -> &[PortfolioRecord] {
        &self.content.portfolio
    }

    pub fn add_portfolio(&mut self, data: NewPortfolio) -> Result<PortfolioRecord, CommonError> {
        let [title, subtitle, image, description] = required([
            ("title", data.title),
            ("subtitle", data.subtitle),
            ("image", data.image),
            ("description", data.description),
        ])?;

        let items = &self.content.portfolio;
        let id = next_id(items.iter().map(|p| p.id), "portfolio item")?;
        let order = resolve_order(data.order, items.iter().map(|p| p.order), "portfolio item")?;

        let record = PortfolioRecord {
            id,
            title,
            subtitle,
            modal_image: non_empty(data.modal_image).unwrap_or_else(|| image.clone()),
            image,
            description,
            details: data.details.unwrap_or_default(),
            date: non_empty(data.date).unwrap_or_else(|| self.today_string()),
            status: non_empty(data.status).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            order,
            tags: data.tags.unwrap_or_default(),
            extra: Map::new(),
        };

        self.content.portfolio.push(record.clone());
        self.touch_last_modified();
        info!(id, title = %record.title, "portfolio item added");
        Ok(record)
    }

    pub fn update_portfolio(
        &mut self,
        id: u64,
        patch: PortfolioPatch,
    ) -> Result<PortfolioRecord, CommonError> {
        let record = self
            .content
            .portfolio
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(CommonError::NotFound {
                kind: "portfolio item",
                id,
            })?;

        merge(&mut record.title, patch.title);
        merge(&mut record.subtitle, patch.subtitle);
        merge(&mut record.image, patch.image);
        merge(&mut record.modal_image, patch.modal_image);
        merge(&mut record.description, patch.description);
        merge(&mut record.details, patch.details);
        merge(&mut record.date, patch.date);
        merge(&mut record.status, patch.status);
        merge(&mut record.order, patch.order);
        merge(&mut record.tags, patch.tags);
        let updated = record.clone();

        self.touch_last_modified();
        info!(id, "portfolio item updated");
        Ok(updated)
    }

    pub fn delete_portfolio(&mut self, id: u64) -> Result<PortfolioRecord, CommonError> {
        let index = self
            .content
            .portfolio
            .iter()
            .position(|p| p.id == id)
            .ok_or(CommonError::NotFound {
                kind: "portfolio item",
                id,
            })?;
        let removed = self.content.portfolio.remove(index);
        self.touch_last_modified();
        info!(id, "portfolio item deleted");
        Ok(removed)
    }

    // --- timeline ---

    pub fn list_timeline(&self) -> &[TimelineItem] {
        &self.content.about.timeline
    }

    pub fn add_timeline(&mut self, data: NewTimelineItem) -> Result<TimelineItem, CommonError> {
        let [date, title, description, image] = required([
            ("date", data.date),
            ("title", data.title),
            ("description", data.description),
            ("image", data.image),
        ])?;

        let items = &self.content.about.timeline;
        let id = next_id(items.iter().map(|t| t.id), "timeline item")?;
        let order = resolve_order(data.order, items.iter().map(|t| t.order), "timeline item")?;

        let item = TimelineItem {
            id,
            date,
            title,
            description,
            image,
            order,
            is_inverted: data.is_inverted.unwrap_or(false),
            extra: Map::new(),
        };

        self.content.about.timeline.push(item.clone());
        self.touch_last_modified();
        info!(id, title = %item.title, "timeline item added");
        Ok(item)
    }

    pub fn update_timeline(
        &mut self,
        id: u64,
        patch: TimelinePatch,
    ) -> Result<TimelineItem, CommonError> {
        let item = self
            .content
            .about
            .timeline
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(CommonError::NotFound {
                kind: "timeline item",
                id,
            })?;

        merge(&mut item.date, patch.date);
        merge(&mut item.title, patch.title);
        merge(&mut item.description, patch.description);
        merge(&mut item.image, patch.image);
        merge(&mut item.order, patch.order);
        merge(&mut item.is_inverted, patch.is_inverted);
        let updated = item.clone();

        self.touch_last_modified();
        info!(id, "timeline item updated");
        Ok(updated)
    }

    pub fn delete_timeline(&mut self, id: u64) -> Result<TimelineItem, CommonError> {
        let index = self
            .content
            .about
            .timeline
            .iter()
            .position(|t| t.id == id)
            .ok_or(CommonError::NotFound {
                kind: "timeline item",
                id,
            })?;
        let removed = self.content.about.timeline.remove(index);
        self.touch_last_modified();
        info!(id, "timeline item deleted");
        Ok(removed)
    }

    // --- announcements ---

    /// Point an announcement at a portfolio item. The portfolio id is not checked here;
    /// a dangling reference just resolves to no link.
    pub fn link_announcement(
        &mut self,
        announcement_id: u64,
        portfolio_id: u64,
    ) -> Result<AnnouncementRecord, CommonError> {
        let record = self
            .notifications
            .announcements
            .iter_mut()
            .find(|a| a.id == announcement_id)
            .ok_or(CommonError::NotFound {
                kind: "announcement",
                id: announcement_id,
            })?;
        record.portfolio_ref = Some(portfolio_id);
        info!(announcement_id, portfolio_id, "announcement linked to portfolio");
        Ok(record.clone())
    }

    // --- export / import ---

    pub fn export(&self, now: DateTime<Utc>) -> ExportBundle {
        ExportBundle {
            content: self.content.clone(),
            notifications: self.notifications.clone(),
            export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Replace whichever documents the bundle carries.
    pub fn import(&mut self, bundle: ImportBundle) {
        if let Some(content) = bundle.content {
            self.content = content;
        }
        if let Some(notifications) = bundle.notifications {
            self.notifications = notifications;
        }
        info!("admin data imported");
    }
}

/// Unwrap every required field or report all the missing ones at once.
fn required<const N: usize>(
    fields: [(&str, Option<String>); N],
) -> Result<[String; N], CommonError> {
    let missing: Vec<String> = fields
        .iter()
        .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CommonError::MissingFields(missing));
    }
    Ok(fields.map(|(_, value)| value.unwrap_or_default()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn next_id(ids: impl Iterator<Item = u64>, kind: &'static str) -> Result<u64, CommonError> {
    ids.max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or(CommonError::Exhausted("id", kind))
}

/// An explicit order of 0 counts as unset.
fn resolve_order(
    requested: Option<u32>,
    orders: impl Iterator<Item = u32>,
    kind: &'static str,
) -> Result<u32, CommonError> {
    match requested.filter(|&o| o > 0) {
        Some(order) => Ok(order),
        None => orders
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or(CommonError::Exhausted("order", kind)),
    }
}

fn merge<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::model::Metadata;

    fn fixed_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn console() -> AdminConsole {
        let content: ContentDocument = serde_json::from_str(
            r#"{
                "portfolio": [
                    {"id": 3, "title": "A", "order": 2},
                    {"id": 7, "title": "B", "order": 5}
                ],
                "about": {"timeline": [{"id": 1, "date": "2019", "title": "Founded", "order": 1}]},
                "metadata": {"lastUpdated": "2023-01-01"}
            }"#,
        )
        .unwrap();
        let notifications: AnnouncementDocument = serde_json::from_str(
            r#"{"announcements": [{"id": 11, "type": "포트폴리오", "title": "t"}]}"#,
        )
        .unwrap();
        AdminConsole::new(content, notifications).with_clock(fixed_day)
    }

    fn new_portfolio() -> NewPortfolio {
        NewPortfolio {
            title: Some("New".to_string()),
            subtitle: Some("Sub".to_string()),
            image: Some("assets/img/new.png".to_string()),
            description: Some("Desc".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn add_portfolio_allocates_id_order_and_defaults() {
        let mut admin = console();
        let added = admin.add_portfolio(new_portfolio()).unwrap();
        assert_eq!(added.id, 8);
        assert_eq!(added.order, 6);
        assert_eq!(added.modal_image, "assets/img/new.png");
        assert_eq!(added.date, "2024-05-01");
        assert_eq!(added.status, "active");
        assert!(added.details.is_empty());
        assert_eq!(admin.list_portfolio().len(), 3);
        assert_eq!(
            admin.content().metadata.as_ref().and_then(|m| m.last_updated.as_deref()),
            Some("2024-05-01")
        );
    }

    #[test]
    fn add_refuses_when_ids_or_orders_are_exhausted() {
        let mut admin = console();
        admin.import(ImportBundle {
            content: Some(
                serde_json::from_str(r#"{"portfolio": [{"id": 18446744073709551615, "order": 1}]}"#)
                    .unwrap(),
            ),
            notifications: None,
        });
        let err = admin.add_portfolio(new_portfolio()).unwrap_err();
        assert!(matches!(err, CommonError::Exhausted("id", _)));
        assert_eq!(admin.list_portfolio().len(), 1);

        admin.import(ImportBundle {
            content: Some(
                serde_json::from_str(
                    r#"{"about": {"timeline": [{"id": 1, "order": 4294967295}]}}"#,
                )
                .unwrap(),
            ),
            notifications: None,
        });
        let item = NewTimelineItem {
            date: Some("2024".to_string()),
            title: Some("t".to_string()),
            description: Some("d".to_string()),
            image: Some("i.png".to_string()),
            ..Default::default()
        };
        let err = admin.add_timeline(item.clone()).unwrap_err();
        assert!(matches!(err, CommonError::Exhausted("order", _)));

        let placed = admin
            .add_timeline(NewTimelineItem {
                order: Some(3),
                ..item
            })
            .unwrap();
        assert_eq!((placed.id, placed.order), (2, 3));
    }

    #[test]
    fn add_portfolio_reports_every_missing_field() {
        let mut admin = console();
        let err = admin
            .add_portfolio(NewPortfolio {
                title: Some("Only title".to_string()),
                subtitle: Some(String::new()),
                ..Default::default()
            })
            .unwrap_err();
        match err {
            CommonError::MissingFields(fields) => {
                assert_eq!(fields, vec!["subtitle", "image", "description"])
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(admin.list_portfolio().len(), 2);
    }

    #[test]
    fn first_item_in_empty_collection_gets_id_one() {
        let mut admin =
            AdminConsole::new(ContentDocument::default(), AnnouncementDocument::default())
                .with_clock(fixed_day);
        let added = admin
            .add_portfolio(NewPortfolio {
                order: Some(0),
                ..new_portfolio()
            })
            .unwrap();
        assert_eq!((added.id, added.order), (1, 1));
        assert!(admin.content().metadata.is_none());
    }

    #[test]
    fn update_merges_only_given_fields() {
        let mut admin = console();
        let updated = admin
            .update_portfolio(
                7,
                PortfolioPatch {
                    title: Some("B2".to_string()),
                    order: Some(1),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "B2");
        assert_eq!(updated.order, 1);
        assert_eq!(updated.id, 7);

        let err = admin.update_portfolio(99, PortfolioPatch::default()).unwrap_err();
        assert!(matches!(err, CommonError::NotFound { id: 99, .. }));
    }

    #[test]
    fn delete_removes_and_returns() {
        let mut admin = console();
        let removed = admin.delete_portfolio(3).unwrap();
        assert_eq!(removed.title, "A");
        assert_eq!(admin.list_portfolio().len(), 1);
        assert!(admin.delete_portfolio(3).is_err());
    }

    #[test]
    fn timeline_crud() {
        let mut admin = console();
        let err = admin.add_timeline(NewTimelineItem::default()).unwrap_err();
        assert!(matches!(err, CommonError::MissingFields(ref f) if f.len() == 4));

        let added = admin
            .add_timeline(NewTimelineItem {
                date: Some("2024".to_string()),
                title: Some("Expansion".to_string()),
                description: Some("Second office".to_string()),
                image: Some("assets/img/about/2.jpg".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!((added.id, added.order, added.is_inverted), (2, 2, false));

        let updated = admin
            .update_timeline(
                2,
                TimelinePatch {
                    is_inverted: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated.is_inverted);
        assert_eq!(updated.title, "Expansion");

        admin.delete_timeline(1).unwrap();
        let ids: Vec<u64> = admin.list_timeline().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn link_announcement_sets_reference() {
        let mut admin = console();
        let linked = admin.link_announcement(11, 42).unwrap();
        assert_eq!(linked.portfolio_ref, Some(42));
        assert_eq!(admin.notifications().announcements[0].portfolio_ref, Some(42));
        assert!(admin.link_announcement(12, 42).is_err());
    }

    #[test]
    fn export_stamps_date_and_file_name() {
        let admin = console();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let bundle = admin.export(now);
        assert_eq!(bundle.export_date, "2024-05-01T08:30:00.000Z");
        assert_eq!(bundle.file_name(), "nero-content-2024-05-01.json");

        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["exportDate"], "2024-05-01T08:30:00.000Z");
        assert_eq!(json["notifications"]["announcements"][0]["id"], 11);
    }

    #[test]
    fn import_replaces_present_documents_only() {
        let mut admin = console();
        let bundle = ImportBundle::parse(
            r#"{"content": {"portfolio": [], "metadata": {"lastUpdated": "2020-02-02"}}}"#,
        )
        .unwrap();
        admin.import(bundle);
        assert!(admin.list_portfolio().is_empty());
        assert_eq!(
            admin.content().metadata,
            Some(Metadata {
                last_updated: Some("2020-02-02".to_string()),
                extra: Map::new(),
            })
        );
        assert_eq!(admin.notifications().announcements.len(), 1);

        assert!(matches!(
            ImportBundle::parse("{ nope"),
            Err(CommonError::Import(_))
        ));

        let as_text = serde_json::json!(r#"{"notifications": {"announcements": []}}"#);
        admin.import(ImportBundle::from_json(as_text).unwrap());
        assert!(admin.notifications().announcements.is_empty());
        assert!(ImportBundle::from_json(serde_json::json!([1, 2])).is_err());
    }
}
