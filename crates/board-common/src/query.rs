/// Filter → search → sort → paginate pipeline for board listings.
///
/// One engine serves every board (announcements, notifications): it is generic over
/// [`BoardEntry`] and a pure function of `(records, state)`.
use std::cmp::Reverse;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{parse_calendar_date, AnnouncementRecord, ALL_CATEGORY, DEFAULT_PAGE_SIZE};

/// What the engine needs to know about a listed record.
pub trait BoardEntry {
    fn category(&self) -> &str;
    fn title(&self) -> &str;
    fn body(&self) -> &str;
    /// Calendar date used for ordering; `None` when missing or unparseable.
    fn calendar_date(&self) -> Option<NaiveDate>;
}

impl BoardEntry for AnnouncementRecord {
    fn category(&self) -> &str {
        &self.kind
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn body(&self) -> &str {
        &self.content
    }

    fn calendar_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    /// Selected category; `None` or the all-sentinel disables the filter.
    pub category: Option<String>,
    /// Raw search input; trimmed before use, empty means no search.
    pub search_term: Option<String>,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            category: Some(ALL_CATEGORY.to_string()),
            search_term: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryState {
    fn category_filter(&self) -> Option<&str> {
        self.category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORY)
    }

    fn search_needle(&self) -> Option<String> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<'a, T> {
    pub page: Vec<&'a T>,
    pub total_matched: usize,
    pub total_pages: usize,
}

pub fn query<'a, T: BoardEntry>(records: &'a [T], state: &QueryState) -> QueryResult<'a, T> {
    let matched = filter_and_sort(records, state);

    let page_size = state.page_size.max(1) as usize;
    let total_matched = matched.len();
    let total_pages = total_matched.div_ceil(page_size);

    let page = page_offset(state.page, page_size)
        .filter(|&offset| offset < total_matched)
        .map(|offset| {
            let end = offset.saturating_add(page_size).min(total_matched);
            matched[offset..end].to_vec()
        })
        .unwrap_or_default();

    QueryResult {
        page,
        total_matched,
        total_pages,
    }
}

/// Filtered and date-descending records without pagination.
///
/// Equal dates keep their original relative order; records without a valid date sort
/// after every dated record.
pub fn filter_and_sort<'a, T: BoardEntry>(records: &'a [T], state: &QueryState) -> Vec<&'a T> {
    let category = state.category_filter();
    let needle = state.search_needle();

    let mut keyed: Vec<(Option<NaiveDate>, &T)> = records
        .iter()
        .filter(|r| category.is_none_or(|c| r.category() == c))
        .filter(|r| needle.as_deref().is_none_or(|n| matches_search(*r, n)))
        .map(|r| (r.calendar_date(), r))
        .collect();

    // `None < Some(_)`, so reversing puts undated records last. `sort_by_key` is stable.
    keyed.sort_by_key(|(date, _)| Reverse(*date));
    keyed.into_iter().map(|(_, r)| r).collect()
}

fn matches_search<T: BoardEntry>(record: &T, needle: &str) -> bool {
    record.title().to_lowercase().contains(needle) || record.body().to_lowercase().contains(needle)
}

fn page_offset(page: u32, page_size: usize) -> Option<usize> {
    let index = (page as usize).checked_sub(1)?;
    index.checked_mul(page_size)
}
