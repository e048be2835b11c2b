use board_common::model::{AnnouncementRecord, ALL_CATEGORY};
use board_common::query::{filter_and_sort, query, BoardEntry, QueryState};
use proptest::prelude::*;

const CATEGORIES: &[&str] = &["공고", "포트폴리오", "언론보도", "Notice"];

fn arb_date() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => (2020i32..2026, 1u32..13, 1u32..29)
            .prop_map(|(y, m, d)| format!("{y:04}-{m:02}-{d:02}")),
        1 => Just("not a date".to_string()),
        1 => Just(String::new()),
    ]
}

fn arb_records() -> impl Strategy<Value = Vec<AnnouncementRecord>> {
    prop::collection::vec(
        (
            prop::sample::select(CATEGORIES),
            "[a-cA-C ]{0,12}",
            "[a-cA-C ]{0,24}",
            arb_date(),
        ),
        0..40,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (kind, title, content, date))| AnnouncementRecord {
                id: i as u64 + 1,
                kind: kind.to_string(),
                title,
                content,
                date,
                ..Default::default()
            })
            .collect()
    })
}

fn state(category: &str, search: &str, page: u32, page_size: u32) -> QueryState {
    QueryState {
        category: Some(category.to_string()),
        search_term: Some(search.to_string()),
        page,
        page_size,
    }
}

proptest! {
    #[test]
    fn category_filter_keeps_exact_matches(
        records in arb_records(),
        category in prop::sample::select(CATEGORIES),
    ) {
        let filtered = filter_and_sort(&records, &state(category, "", 1, 10));
        prop_assert!(filtered.iter().all(|r| r.kind == category));
        let expected = records.iter().filter(|r| r.kind == category).count();
        prop_assert_eq!(filtered.len(), expected);

        let all = filter_and_sort(&records, &state(ALL_CATEGORY, "", 1, 10));
        prop_assert_eq!(all.len(), records.len());
    }

    #[test]
    fn search_results_contain_the_term(records in arb_records(), term in "[a-cA-C]{1,2}") {
        let needle = term.to_lowercase();
        let found = filter_and_sort(&records, &state(ALL_CATEGORY, &term, 1, 10));
        let all_contain = found.iter().all(|r| {
            r.title.to_lowercase().contains(&needle) || r.content.to_lowercase().contains(&needle)
        });
        prop_assert!(all_contain);
    }

    #[test]
    fn empty_search_is_a_no_op(
        records in arb_records(),
        category in prop::sample::select(CATEGORIES),
    ) {
        let with_blank = filter_and_sort(&records, &state(category, "   ", 1, 10));
        let without = filter_and_sort(&records, &QueryState {
            search_term: None,
            ..state(category, "", 1, 10)
        });
        let a: Vec<u64> = with_blank.iter().map(|r| r.id).collect();
        let b: Vec<u64> = without.iter().map(|r| r.id).collect();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn output_is_date_descending_and_sort_is_idempotent(records in arb_records()) {
        let sorted = filter_and_sort(&records, &QueryState::default());
        for pair in sorted.windows(2) {
            prop_assert!(pair[0].calendar_date() >= pair[1].calendar_date());
        }

        let once: Vec<AnnouncementRecord> = sorted.iter().map(|r| (*r).clone()).collect();
        let twice = filter_and_sort(&once, &QueryState::default());
        let a: Vec<u64> = once.iter().map(|r| r.id).collect();
        let b: Vec<u64> = twice.iter().map(|r| r.id).collect();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn pages_partition_the_matches(records in arb_records(), page_size in 1u32..8) {
        let first = query(&records, &state(ALL_CATEGORY, "", 1, page_size));
        let expected_pages = first.total_matched.div_ceil(page_size as usize);
        prop_assert_eq!(first.total_pages, expected_pages);

        let mut seen = Vec::new();
        for page in 1..=first.total_pages as u32 {
            let result = query(&records, &state(ALL_CATEGORY, "", page, page_size));
            prop_assert!(!result.page.is_empty());
            prop_assert!(result.page.len() <= page_size as usize);
            seen.extend(result.page.iter().map(|r| r.id));
        }
        prop_assert_eq!(seen.len(), first.total_matched);

        let all: Vec<u64> = filter_and_sort(&records, &QueryState::default())
            .iter()
            .map(|r| r.id)
            .collect();
        prop_assert_eq!(seen, all);
    }

    #[test]
    fn out_of_range_page_is_empty(records in arb_records(), page_size in 1u32..8, past in 1u32..1000) {
        let first = query(&records, &state(ALL_CATEGORY, "", 1, page_size));
        let beyond = first.total_pages as u32 + past;
        let result = query(&records, &state(ALL_CATEGORY, "", beyond, page_size));
        prop_assert!(result.page.is_empty());
        prop_assert_eq!(result.total_matched, first.total_matched);
        prop_assert_eq!(result.total_pages, first.total_pages);
    }
}
