/// MCP server for the Nero announcement board.
///
/// Board tools read a content snapshot that is only ever replaced wholesale
/// (`reload_content`). Admin tools edit a separate in-memory copy that lives for the
/// session; `export_content` is the only way edits leave the process.
use std::sync::Arc;

use chrono::Utc;
use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tokio::sync::RwLock;
use tracing::{info, warn};

use board_common::admin::{AdminConsole, ImportBundle};
use board_common::mcp_api::{
    AboutTimelineResponse, AddPortfolioParams, AddTimelineParams, AnnouncementDetailResponse,
    AnnouncementIdParams, AnnouncementResponse, CategoryListResponse, ExportContentResponse,
    ImportContentParams, ImportContentResponse, LinkAnnouncementParams,
    LinkedAnnouncementsResponse, PortfolioGridResponse, PortfolioIdParams, PortfolioItemResponse,
    PortfolioLinkResponse, PortfolioListResponse, QueryAnnouncementsParams,
    QueryAnnouncementsResponse, ReloadContentResponse, TimelineIdParams, TimelineItemResponse,
    TimelineListResponse, UpdatePortfolioParams, UpdateTimelineParams,
};
use board_common::model::ALL_CATEGORY;
use board_common::pager::page_window;
use board_common::query::{query, QueryState};
use board_common::store::{ContentSnapshot, ContentStore};
use board_common::view::{self, PortfolioSummary};
use board_common::xref::{linked_announcements, resolve_portfolio_link};

use crate::config::Config;
use crate::error::AppError;

#[derive(Clone)]
pub struct NeroBoardServer {
    board: Arc<RwLock<ContentSnapshot>>,
    admin: Arc<RwLock<AdminConsole>>,
    store: Arc<ContentStore>,
    config: Config,
    tool_router: ToolRouter<NeroBoardServer>,
}

impl NeroBoardServer {
    pub fn new(snapshot: ContentSnapshot, store: ContentStore, config: Config) -> Self {
        let admin = AdminConsole::new(snapshot.content.clone(), snapshot.announcements.clone());
        Self {
            board: Arc::new(RwLock::new(snapshot)),
            admin: Arc::new(RwLock::new(admin)),
            store: Arc::new(store),
            config,
            tool_router: Self::tool_router(),
        }
    }

    async fn write_export(&self, file_name: &str, json: &str) -> Result<Option<String>, AppError> {
        let Some(path) = self.config.export_path(file_name) else {
            return Ok(None);
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Export(format!("{}: {e}", parent.display())))?;
        }
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| AppError::Export(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), "content bundle exported");
        Ok(Some(path.display().to_string()))
    }
}

#[tool_router]
impl NeroBoardServer {
    #[tool(description = "List announcements newest first, filtered by category and a case-insensitive search over title and content, one page at a time. Returns cards, totals and the pagination bar. Pages past the end come back empty.")]
    async fn query_announcements(
        &self,
        Parameters(params): Parameters<QueryAnnouncementsParams>,
    ) -> Result<Json<QueryAnnouncementsResponse>, String> {
        let board = self.board.read().await;
        let page_size = board.announcements.page_size();
        let state = QueryState {
            category: Some(
                params
                    .category
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| ALL_CATEGORY.to_string()),
            ),
            search_term: params.search.map(|s| s.trim().to_string()),
            page: params.page.unwrap_or(1),
            page_size,
        };

        let result = query(&board.announcements.announcements, &state);
        let portfolio = &board.content.portfolio;
        let items = result.page.iter().map(|r| view::card(r, portfolio)).collect();

        Ok(Json(QueryAnnouncementsResponse {
            category: state.category.clone().unwrap_or_default(),
            search: state.search_term.clone().filter(|s| !s.is_empty()),
            page: state.page,
            page_size,
            total_matched: result.total_matched,
            total_pages: result.total_pages,
            items,
            pagination: page_window(state.page as usize, result.total_pages),
        }))
    }

    #[tool(description = "Get one announcement with its formatted content and linked portfolio item.")]
    async fn get_announcement(
        &self,
        Parameters(params): Parameters<AnnouncementIdParams>,
    ) -> Result<Json<AnnouncementDetailResponse>, String> {
        let board = self.board.read().await;
        let record = board
            .announcements
            .find(params.announcement_id)
            .ok_or_else(|| format!("announcement not found: {}", params.announcement_id))?;
        Ok(Json(AnnouncementDetailResponse {
            announcement: view::detail(record, &board.content.portfolio),
        }))
    }

    #[tool(description = "List the category filter tabs (\"전체\" first) with announcement counts.")]
    async fn list_categories(&self) -> Result<Json<CategoryListResponse>, String> {
        let board = self.board.read().await;
        Ok(Json(CategoryListResponse {
            categories: view::category_tabs(&board.announcements.announcements),
        }))
    }

    #[tool(description = "Portfolio grid: active items ordered by their order field, with detail labels for the item modal.")]
    async fn portfolio_grid(&self) -> Result<Json<PortfolioGridResponse>, String> {
        let board = self.board.read().await;
        Ok(Json(PortfolioGridResponse {
            items: view::portfolio_grid(&board.content.portfolio),
        }))
    }

    #[tool(description = "About-page timeline ordered by its order field.")]
    async fn about_timeline(&self) -> Result<Json<AboutTimelineResponse>, String> {
        let board = self.board.read().await;
        Ok(Json(AboutTimelineResponse {
            items: view::timeline(&board.content.about.timeline),
        }))
    }

    #[tool(description = "Resolve an announcement's portfolio reference. Returns no portfolio for non-portfolio announcements, missing references or broken references.")]
    async fn resolve_portfolio_link(
        &self,
        Parameters(params): Parameters<AnnouncementIdParams>,
    ) -> Result<Json<PortfolioLinkResponse>, String> {
        let board = self.board.read().await;
        let record = board
            .announcements
            .find(params.announcement_id)
            .ok_or_else(|| format!("announcement not found: {}", params.announcement_id))?;
        let portfolio =
            resolve_portfolio_link(record, &board.content.portfolio).map(PortfolioSummary::from);
        Ok(Json(PortfolioLinkResponse {
            announcement_id: record.id,
            portfolio,
        }))
    }

    #[tool(description = "List the announcements that reference a portfolio item.")]
    async fn linked_announcements(
        &self,
        Parameters(params): Parameters<PortfolioIdParams>,
    ) -> Result<Json<LinkedAnnouncementsResponse>, String> {
        let board = self.board.read().await;
        let portfolio = &board.content.portfolio;
        let announcements =
            linked_announcements(params.portfolio_id, &board.announcements.announcements)
                .into_iter()
                .map(|r| view::card(r, portfolio))
                .collect();
        Ok(Json(LinkedAnnouncementsResponse {
            portfolio_id: params.portfolio_id,
            announcements,
        }))
    }

    #[tool(description = "Admin: list portfolio items in the session's editable copy.")]
    async fn list_portfolio(&self) -> Result<Json<PortfolioListResponse>, String> {
        let admin = self.admin.read().await;
        Ok(Json(PortfolioListResponse {
            items: admin.list_portfolio().to_vec(),
        }))
    }

    #[tool(description = "Admin: add a portfolio item (title, subtitle, image and description are required). In-memory only until exported.")]
    async fn add_portfolio(
        &self,
        Parameters(params): Parameters<AddPortfolioParams>,
    ) -> Result<Json<PortfolioItemResponse>, String> {
        let mut admin = self.admin.write().await;
        let item = admin.add_portfolio(params.item).map_err(|e| e.to_string())?;
        Ok(Json(PortfolioItemResponse { item }))
    }

    #[tool(description = "Admin: update the given fields of a portfolio item.")]
    async fn update_portfolio(
        &self,
        Parameters(params): Parameters<UpdatePortfolioParams>,
    ) -> Result<Json<PortfolioItemResponse>, String> {
        let mut admin = self.admin.write().await;
        let item = admin
            .update_portfolio(params.portfolio_id, params.patch)
            .map_err(|e| e.to_string())?;
        Ok(Json(PortfolioItemResponse { item }))
    }

    #[tool(description = "Admin: delete a portfolio item and return it.")]
    async fn delete_portfolio(
        &self,
        Parameters(params): Parameters<PortfolioIdParams>,
    ) -> Result<Json<PortfolioItemResponse>, String> {
        let mut admin = self.admin.write().await;
        let item = admin
            .delete_portfolio(params.portfolio_id)
            .map_err(|e| e.to_string())?;
        Ok(Json(PortfolioItemResponse { item }))
    }

    #[tool(description = "Admin: list about-page timeline items in the session's editable copy.")]
    async fn list_timeline(&self) -> Result<Json<TimelineListResponse>, String> {
        let admin = self.admin.read().await;
        Ok(Json(TimelineListResponse {
            items: admin.list_timeline().to_vec(),
        }))
    }

    #[tool(description = "Admin: add a timeline item (date, title, description and image are required).")]
    async fn add_timeline(
        &self,
        Parameters(params): Parameters<AddTimelineParams>,
    ) -> Result<Json<TimelineItemResponse>, String> {
        let mut admin = self.admin.write().await;
        let item = admin.add_timeline(params.item).map_err(|e| e.to_string())?;
        Ok(Json(TimelineItemResponse { item }))
    }

    #[tool(description = "Admin: update the given fields of a timeline item.")]
    async fn update_timeline(
        &self,
        Parameters(params): Parameters<UpdateTimelineParams>,
    ) -> Result<Json<TimelineItemResponse>, String> {
        let mut admin = self.admin.write().await;
        let item = admin
            .update_timeline(params.timeline_id, params.patch)
            .map_err(|e| e.to_string())?;
        Ok(Json(TimelineItemResponse { item }))
    }

    #[tool(description = "Admin: delete a timeline item and return it.")]
    async fn delete_timeline(
        &self,
        Parameters(params): Parameters<TimelineIdParams>,
    ) -> Result<Json<TimelineItemResponse>, String> {
        let mut admin = self.admin.write().await;
        let item = admin
            .delete_timeline(params.timeline_id)
            .map_err(|e| e.to_string())?;
        Ok(Json(TimelineItemResponse { item }))
    }

    #[tool(description = "Admin: point an announcement at a portfolio item in the editable copy.")]
    async fn link_announcement(
        &self,
        Parameters(params): Parameters<LinkAnnouncementParams>,
    ) -> Result<Json<AnnouncementResponse>, String> {
        let mut admin = self.admin.write().await;
        let announcement = admin
            .link_announcement(params.announcement_id, params.portfolio_id)
            .map_err(|e| e.to_string())?;
        Ok(Json(AnnouncementResponse { announcement }))
    }

    #[tool(description = "Admin: export the editable copy as a JSON bundle ({content, notifications, exportDate}). Written to the export directory when one is configured.")]
    async fn export_content(&self) -> Result<Json<ExportContentResponse>, String> {
        let bundle = self.admin.read().await.export(Utc::now());
        let file_name = bundle.file_name();
        let value = serde_json::to_value(&bundle).map_err(|e| format!("export failed: {e}"))?;
        let json =
            serde_json::to_string_pretty(&value).map_err(|e| format!("export failed: {e}"))?;
        let written_to = self
            .write_export(&file_name, &json)
            .await
            .map_err(|e| e.to_string())?;
        Ok(Json(ExportContentResponse {
            file_name,
            written_to,
            bundle: value,
        }))
    }

    #[tool(description = "Admin: replace the editable copy's content and/or notifications documents from a bundle.")]
    async fn import_content(
        &self,
        Parameters(params): Parameters<ImportContentParams>,
    ) -> Result<Json<ImportContentResponse>, String> {
        let bundle = ImportBundle::from_json(params.bundle).map_err(|e| e.to_string())?;
        let mut admin = self.admin.write().await;
        admin.import(bundle);
        Ok(Json(ImportContentResponse {
            portfolio_count: admin.list_portfolio().len(),
            timeline_count: admin.list_timeline().len(),
            announcement_count: admin.notifications().announcements.len(),
        }))
    }

    #[tool(description = "Re-fetch both documents from the content source and swap in the new board snapshot. The admin copy is left as is.")]
    async fn reload_content(&self) -> Result<Json<ReloadContentResponse>, String> {
        info!("reload_content tool invoked");
        let snapshot = self.store.load_snapshot().await.map_err(|e| {
            warn!(error = %e, "reload failed, keeping current snapshot");
            format!("reload failed: {e}")
        })?;

        let mut board = self.board.write().await;
        let changed = board.digest != snapshot.digest;
        *board = snapshot;
        info!(changed, digest = %board.digest, "board snapshot replaced");

        Ok(Json(ReloadContentResponse {
            changed,
            digest: board.digest.clone(),
            announcement_count: board.announcements.announcements.len(),
        }))
    }
}

#[tool_handler]
impl ServerHandler for NeroBoardServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nero-board".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Nero announcement board MCP server. Use query_announcements to page through \
announcements by category and search term, get_announcement for one entry, list_categories for \
the filter tabs, portfolio_grid and about_timeline for the portfolio and about pages, and \
resolve_portfolio_link/linked_announcements for portfolio cross-references. \
Admin tools (add/update/delete/list portfolio and timeline, link_announcement, import_content) \
edit an in-memory copy; export_content produces the JSON bundle to copy back by hand."
                    .to_string(),
            ),
        }
    }
}
