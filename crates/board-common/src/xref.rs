use crate::model::{AnnouncementRecord, PortfolioRecord, PORTFOLIO_CATEGORY};

/// Resolve a record's `portfolioRef` to its portfolio entry.
///
/// Only portfolio-typed records link anywhere; a missing or dangling reference is
/// simply "no link".
pub fn resolve_portfolio_link<'a>(
    record: &AnnouncementRecord,
    portfolio: &'a [PortfolioRecord],
) -> Option<&'a PortfolioRecord> {
    if record.kind != PORTFOLIO_CATEGORY {
        return None;
    }
    let portfolio_id = record.portfolio_ref?;
    portfolio.iter().find(|p| p.id == portfolio_id)
}

/// Every record pointing at `portfolio_id`, in document order, whatever its type.
pub fn linked_announcements(
    portfolio_id: u64,
    records: &[AnnouncementRecord],
) -> Vec<&AnnouncementRecord> {
    records
        .iter()
        .filter(|r| r.portfolio_ref == Some(portfolio_id))
        .collect()
}
