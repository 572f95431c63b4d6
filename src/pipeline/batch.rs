//! Notification batching.
//!
//! Tags classified items and splits them into webhook-sized batches.

use crate::models::{Item, NotificationBatch, NotificationEntry};

/// Title words that suggest a post announces a change to earlier news.
pub const UPDATE_KEYWORDS: [&str; 5] = ["UPDATED", "COMPLETED", "EXTENDED", "REVISED", "AMENDED"];

/// Case-insensitive keyword check on a title.
///
/// Only used to pick the styling of a new entry; it never changes whether an
/// item counts as new or updated.
pub fn looks_like_update(title: &str) -> bool {
    let upper = title.to_uppercase();
    UPDATE_KEYWORDS.iter().any(|keyword| upper.contains(keyword))
}

/// Build ordered batches of at most `max_batch_size` entries.
///
/// New items come first, then updated ones. Empty input yields no batches.
/// A `max_batch_size` of zero is treated as one.
pub fn build_batches(
    new_items: &[Item],
    updated_items: &[Item],
    max_batch_size: usize,
) -> Vec<NotificationBatch> {
    let entries: Vec<NotificationEntry> = new_items
        .iter()
        .map(|item| entry(item, false))
        .chain(updated_items.iter().map(|item| entry(item, true)))
        .collect();

    entries
        .chunks(max_batch_size.max(1))
        .map(|chunk| NotificationBatch::new(chunk.to_vec()))
        .collect()
}

fn entry(item: &Item, is_update: bool) -> NotificationEntry {
    NotificationEntry {
        title: item.title.clone(),
        url: item.url.clone(),
        date: item.date.clone(),
        is_update,
        looks_like_update: !is_update && looks_like_update(&item.title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_BATCH_SIZE;

    fn make_items(prefix: &str, count: usize) -> Vec<Item> {
        (0..count)
            .map(|i| {
                Item::new(
                    "01.01",
                    format!("{prefix} {i}"),
                    format!("https://example.com/{prefix}/{i}"),
                    "",
                )
                .unwrap()
            })
            .collect()
    }

    fn sizes(batches: &[NotificationBatch]) -> Vec<usize> {
        batches.iter().map(NotificationBatch::len).collect()
    }

    #[test]
    fn test_empty_input_yields_no_batches() {
        assert!(build_batches(&[], &[], MAX_BATCH_SIZE).is_empty());
    }

    #[test]
    fn test_twenty_three_new_items() {
        let batches = build_batches(&make_items("new", 23), &[], MAX_BATCH_SIZE);
        assert_eq!(sizes(&batches), vec![10, 10, 3]);
    }

    #[test]
    fn test_exact_multiple() {
        let batches = build_batches(&make_items("new", 10), &make_items("upd", 10), 10);
        assert_eq!(sizes(&batches), vec![10, 10]);
    }

    #[test]
    fn test_batch_counts_match_ceiling() {
        for total in 0..35 {
            let new_count = total / 2;
            let batches = build_batches(
                &make_items("new", new_count),
                &make_items("upd", total - new_count),
                10,
            );
            assert_eq!(batches.len(), total.div_ceil(10));

            let sizes = sizes(&batches);
            assert_eq!(sizes.iter().sum::<usize>(), total);
            if let Some((last, full)) = sizes.split_last() {
                assert!(full.iter().all(|&s| s == 10));
                assert!((1..=10).contains(last));
            }
        }
    }

    #[test]
    fn test_order_and_tagging_preserved() {
        let new_items = make_items("new", 7);
        let updated_items = make_items("upd", 6);

        let batches = build_batches(&new_items, &updated_items, 5);
        assert_eq!(sizes(&batches), vec![5, 5, 3]);

        let flattened: Vec<&NotificationEntry> =
            batches.iter().flat_map(|b| b.entries.iter()).collect();
        let expected: Vec<&Item> = new_items.iter().chain(&updated_items).collect();

        assert_eq!(flattened.len(), expected.len());
        for (i, (entry, item)) in flattened.iter().zip(expected).enumerate() {
            assert_eq!(entry.title, item.title);
            assert_eq!(entry.url, item.url);
            assert_eq!(entry.date, item.date);
            assert_eq!(entry.is_update, i >= new_items.len());
        }
    }

    #[test]
    fn test_summary_spans_boundary() {
        let batches = build_batches(&make_items("new", 8), &make_items("upd", 4), 10);
        let first = batches[0].summary();
        let second = batches[1].summary();
        assert_eq!((first.new_count, first.updated_count), (8, 2));
        assert_eq!((second.new_count, second.updated_count), (0, 2));
    }

    #[test]
    fn test_zero_batch_size_treated_as_one() {
        let batches = build_batches(&make_items("new", 3), &[], 0);
        assert_eq!(sizes(&batches), vec![1, 1, 1]);
    }

    #[test]
    fn test_looks_like_update_keywords() {
        assert!(looks_like_update("Maintenance (Completed)"));
        assert!(looks_like_update("event period extended"));
        assert!(looks_like_update("Patch Notes [Updated]"));
        assert!(looks_like_update("AMENDED: Terms"));
        assert!(looks_like_update("Revised schedule"));
        assert!(!looks_like_update("Patch Notes"));
    }

    #[test]
    fn test_advisory_flag_only_on_new_entries() {
        let new_items = vec![Item::new("01.01", "Maintenance (Extended)", "/a", "").unwrap()];
        let updated_items = vec![Item::new("01.01", "Event (Revised)", "/b", "").unwrap()];

        let batches = build_batches(&new_items, &updated_items, 10);
        let entries = &batches[0].entries;

        assert!(!entries[0].is_update);
        assert!(entries[0].looks_like_update);
        assert!(entries[1].is_update);
        assert!(!entries[1].looks_like_update);

        let summary = batches[0].summary();
        assert_eq!((summary.new_count, summary.updated_count), (1, 1));
    }
}
