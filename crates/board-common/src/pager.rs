use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Pages shown on each side of the current one.
const WINDOW_RADIUS: usize = 2;

/// One slot of a pagination bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageItem {
    Prev { target: usize, disabled: bool },
    Page { number: usize, current: bool },
    Ellipsis,
    Next { target: usize, disabled: bool },
}

/// Pagination bar for `current` out of `total_pages`: prev, first page, a window of
/// `current ± 2`, last page, next, with ellipses over skipped ranges. Empty when there
/// is at most one page. An out-of-range `current` is clamped into `1..=total_pages`.
pub fn page_window(current: usize, total_pages: usize) -> Vec<PageItem> {
    if total_pages <= 1 {
        return Vec::new();
    }
    let current = current.clamp(1, total_pages);

    let start = current.saturating_sub(WINDOW_RADIUS).max(1);
    let end = current.saturating_add(WINDOW_RADIUS).min(total_pages);

    let mut items = vec![PageItem::Prev {
        target: current.saturating_sub(1),
        disabled: current <= 1,
    }];

    if start > 1 {
        items.push(PageItem::Page {
            number: 1,
            current: false,
        });
        if start > 2 {
            items.push(PageItem::Ellipsis);
        }
    }

    items.extend((start..=end).map(|number| PageItem::Page {
        number,
        current: number == current,
    }));

    if end < total_pages {
        if end + 1 < total_pages {
            items.push(PageItem::Ellipsis);
        }
        items.push(PageItem::Page {
            number: total_pages,
            current: false,
        });
    }

    items.push(PageItem::Next {
        target: current.saturating_add(1),
        disabled: current >= total_pages,
    });
    items
}
