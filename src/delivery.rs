//! # Incremental Delivery Engine
//! Pure diff of a newest-first item list against the stored cursor.
//! No I/O; the poll loop loads and stores the cursor around it.
//!
//! Policy: everything ahead of the cursor is new and is delivered oldest-first.
//! A missing cursor (first run) or one that no longer appears in the list
//! (source rotation, long outage, truncation) rebaselines: nothing is
//! delivered, the newest identity becomes the cursor.

use crate::ingest::types::Item;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeliveryPlan {
    /// New items, oldest first.
    pub fresh: Vec<Item>,
    /// Identity to persist; `None` when nothing was fetched.
    pub next_cursor: Option<String>,
    /// True when the cursor was absent or not found.
    pub rebaselined: bool,
}

pub fn plan_delivery(items: &[Item], cursor: Option<&str>) -> DeliveryPlan {
    let Some(newest) = items.first() else {
        return DeliveryPlan::default();
    };
    let next_cursor = Some(newest.identity().to_string());

    let pos = cursor.and_then(|c| items.iter().position(|it| it.identity() == c));
    match pos {
        Some(k) => DeliveryPlan {
            fresh: items[..k].iter().rev().cloned().collect(),
            next_cursor,
            rebaselined: false,
        },
        None => DeliveryPlan {
            fresh: Vec::new(),
            next_cursor,
            rebaselined: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> Vec<Item> {
        // newest first: i5 .. i1
        (1..=5)
            .rev()
            .map(|n| Item::new(format!("Binance Will List T{n}"), "", Some(format!("https://x.test/{n}")), "u"))
            .collect()
    }

    fn titles(v: &[Item]) -> Vec<&str> {
        v.iter().map(|i| i.title()).collect()
    }

    #[test]
    fn delivers_items_ahead_of_cursor_oldest_first() {
        let items = list();
        let i3 = items[2].identity().to_string();
        let plan = plan_delivery(&items, Some(&i3));
        assert_eq!(titles(&plan.fresh), vec!["Binance Will List T4", "Binance Will List T5"]);
        assert_eq!(plan.next_cursor.as_deref(), Some(items[0].identity()));
        assert!(!plan.rebaselined);
    }

    #[test]
    fn cursor_at_head_yields_nothing_but_still_advances() {
        let items = list();
        let i5 = items[0].identity().to_string();
        let plan = plan_delivery(&items, Some(&i5));
        assert!(plan.fresh.is_empty());
        assert_eq!(plan.next_cursor.as_deref(), Some(i5.as_str()));
        assert!(!plan.rebaselined);
    }

    #[test]
    fn unknown_cursor_rebaselines() {
        let items = list();
        let plan = plan_delivery(&items, Some("not-in-list"));
        assert!(plan.fresh.is_empty());
        assert_eq!(plan.next_cursor.as_deref(), Some(items[0].identity()));
        assert!(plan.rebaselined);
    }

    #[test]
    fn first_run_rebaselines() {
        let items = list();
        let plan = plan_delivery(&items, None);
        assert!(plan.fresh.is_empty());
        assert!(plan.rebaselined);
        assert_eq!(plan.next_cursor.as_deref(), Some(items[0].identity()));
    }

    #[test]
    fn empty_fetch_keeps_cursor_untouched() {
        let plan = plan_delivery(&[], Some("abc"));
        assert_eq!(plan, DeliveryPlan::default());
    }
}
