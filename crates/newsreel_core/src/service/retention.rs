//! Retention policy and the pure cleanup computation.
//!
//! # Responsibility
//! - Decide, for persisted news absent from a refreshed feed, which are
//!   soft-deleted and which are physically purged.
//! - Apply the optional count/age limits over the whole feed.
//!
//! # Invariants
//! - Unmatched items in `New`, `Unread`, `Updated` or `Hidden` are left
//!   untouched unless the policy explicitly requests otherwise.
//! - Physical removal only ever happens to items already in `Deleted`;
//!   everything else is soft-deleted first and purged on a later pass.
//! - Flagged items are exempt from count/age limits.

use crate::model::news::{News, NewsId, NewsState};

/// Per-scope cleanup policy for a feed reload.
#[derive(Debug, Clone, Default)]
pub struct RetentionPolicy {
    /// Soft-delete unmatched items already in state `Read`.
    pub delete_read_on_cleanup: bool,
    /// Soft-delete every unmatched item regardless of state.
    pub delete_unmatched: bool,
    /// Keep at most this many news per feed; oldest read items go first.
    pub max_news_count: Option<usize>,
    /// Soft-delete read items received longer ago than this many days.
    pub max_news_age_days: Option<i64>,
}

/// Result of one cleanup pass, before anything is persisted.
#[derive(Debug, Clone, Default)]
pub struct CleanupOutcome {
    /// Items to remove physically, with their child rows.
    pub to_purge: Vec<NewsId>,
    /// Items to transition to `Deleted`.
    pub to_soft_delete: Vec<NewsId>,
}

/// Classifies the persisted items absent from the refreshed feed.
pub fn cleanup(unmatched: &[News], policy: &RetentionPolicy) -> CleanupOutcome {
    let mut outcome = CleanupOutcome::default();
    for news in unmatched {
        match news.state {
            NewsState::Deleted => outcome.to_purge.push(news.uuid),
            NewsState::Read if policy.delete_read_on_cleanup => {
                outcome.to_soft_delete.push(news.uuid);
            }
            _ if policy.delete_unmatched => outcome.to_soft_delete.push(news.uuid),
            _ => {}
        }
    }
    outcome
}

/// Applies the count/age limits over the full news list of one feed.
///
/// Returns the items to soft-delete. Only read, unflagged items that are
/// not already deleted qualify; the count limit drops the oldest first by
/// received date.
pub fn retention_overflow(all_news: &[News], policy: &RetentionPolicy, now_ms: i64) -> Vec<NewsId> {
    let mut victims: Vec<NewsId> = Vec::new();

    if let Some(max_age_days) = policy.max_news_age_days {
        let cutoff = now_ms - max_age_days * 24 * 60 * 60 * 1000;
        for news in all_news {
            if qualifies(news) && news.received_date < cutoff {
                victims.push(news.uuid);
            }
        }
    }

    if let Some(max_count) = policy.max_news_count {
        let retained: Vec<&News> = all_news
            .iter()
            .filter(|news| news.state != NewsState::Deleted && !victims.contains(&news.uuid))
            .collect();
        if retained.len() > max_count {
            let mut candidates: Vec<&News> = retained
                .iter()
                .copied()
                .filter(|news| qualifies(news))
                .collect();
            candidates.sort_by_key(|news| news.received_date);
            let overflow = retained.len() - max_count;
            for news in candidates.into_iter().take(overflow) {
                victims.push(news.uuid);
            }
        }
    }

    victims
}

fn qualifies(news: &News) -> bool {
    news.state == NewsState::Read && !news.flagged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn news_in(state: NewsState, received_date: i64) -> News {
        let mut news = News::incoming(received_date);
        news.state = state;
        news
    }

    #[test]
    fn deleted_and_absent_is_purged() {
        let unmatched = [news_in(NewsState::Deleted, 0)];
        let outcome = cleanup(&unmatched, &RetentionPolicy::default());
        assert_eq!(outcome.to_purge, vec![unmatched[0].uuid]);
        assert!(outcome.to_soft_delete.is_empty());
    }

    #[test]
    fn read_and_absent_soft_deletes_only_under_policy() {
        let unmatched = [news_in(NewsState::Read, 0)];

        let outcome = cleanup(&unmatched, &RetentionPolicy::default());
        assert!(outcome.to_soft_delete.is_empty());

        let policy = RetentionPolicy {
            delete_read_on_cleanup: true,
            ..RetentionPolicy::default()
        };
        let outcome = cleanup(&unmatched, &policy);
        assert_eq!(outcome.to_soft_delete, vec![unmatched[0].uuid]);
    }

    #[test]
    fn unread_states_survive_cleanup() {
        let unmatched = [
            news_in(NewsState::New, 0),
            news_in(NewsState::Unread, 0),
            news_in(NewsState::Updated, 0),
            news_in(NewsState::Hidden, 0),
        ];
        let policy = RetentionPolicy {
            delete_read_on_cleanup: true,
            ..RetentionPolicy::default()
        };
        let outcome = cleanup(&unmatched, &policy);
        assert!(outcome.to_purge.is_empty());
        assert!(outcome.to_soft_delete.is_empty());
    }

    #[test]
    fn count_limit_drops_oldest_read_first() {
        let old_read = news_in(NewsState::Read, 100);
        let new_read = news_in(NewsState::Read, 200);
        let unread = news_in(NewsState::Unread, 50);
        let policy = RetentionPolicy {
            max_news_count: Some(2),
            ..RetentionPolicy::default()
        };
        let victims = retention_overflow(
            &[old_read.clone(), new_read.clone(), unread],
            &policy,
            1_000,
        );
        assert_eq!(victims, vec![old_read.uuid]);
    }

    #[test]
    fn flagged_items_escape_age_limit() {
        let mut flagged = news_in(NewsState::Read, 0);
        flagged.flagged = true;
        let stale = news_in(NewsState::Read, 0);
        let policy = RetentionPolicy {
            max_news_age_days: Some(1),
            ..RetentionPolicy::default()
        };
        let now = 10 * 24 * 60 * 60 * 1000;
        let victims = retention_overflow(&[flagged, stale.clone()], &policy, now);
        assert_eq!(victims, vec![stale.uuid]);
    }
}
