//! Pure feed merge computation.
//!
//! # Responsibility
//! - Classify every incoming news as addition, content update, state merge
//!   or no-op against the persisted news of the same feed.
//! - Surface the persisted items with no incoming counterpart for the
//!   retention pass.
//!
//! # Invariants
//! - Persisted object identity never changes; updates mutate a copy of the
//!   persisted record in place and retain the old snapshot.
//! - An addition always enters in state `New`, whatever the parser put on
//!   the incoming item.
//! - Incoming items may match an addition staged earlier in the same pass,
//!   so one batch never produces duplicate persisted items.

use crate::model::feed::Feed;
use crate::model::news::{
    normalize_title, MatchStrategy, News, NewsId, NewsParent, NewsState,
};

/// Parser-produced feed graph handed to a reload.
#[derive(Debug, Clone)]
pub struct IncomingFeed {
    pub feed: Feed,
    pub news: Vec<News>,
}

/// One content or state update with both snapshots retained for events.
#[derive(Debug, Clone)]
pub struct NewsUpdate {
    pub old: News,
    pub new: News,
    /// True when the content fingerprint changed; false for a pure state
    /// merge. State-only updates must leave the item's child rows alone.
    pub content_changed: bool,
}

/// Result of one merge pass, before anything is persisted.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// New items owned by the feed, in incoming order.
    pub additions: Vec<News>,
    pub updates: Vec<NewsUpdate>,
    /// Persisted items absent from the incoming feed, in feed order.
    pub unmatched: Vec<NewsId>,
    /// Replacement feed attributes, when they changed.
    pub feed_update: Option<Feed>,
}

/// Merges an incoming feed graph against the persisted feed and its news.
///
/// Pure computation over already-loaded data; persistence and events are
/// the engine's concern.
pub fn merge_feed(
    persisted_feed: &Feed,
    persisted_news: &[News],
    incoming: &IncomingFeed,
) -> MergeOutcome {
    let persisted_len = persisted_news.len();
    // Working set: persisted items first, staged additions appended behind
    // them so later incoming items can match either.
    let mut working: Vec<News> = persisted_news.to_vec();
    let mut snapshots: Vec<Option<News>> = vec![None; persisted_len];
    let mut matched = vec![false; persisted_len];
    let mut content_changed = vec![false; persisted_len];

    for item in &incoming.news {
        match resolve(item, &working) {
            Some((position, strategy)) => {
                let staged_addition = position >= persisted_len;
                if !staged_addition {
                    matched[position] = true;
                    if snapshots[position].is_none() {
                        snapshots[position] = Some(working[position].clone());
                    }
                }
                let changed =
                    apply_match(&mut working[position], item, strategy, staged_addition);
                if !staged_addition && changed {
                    content_changed[position] = true;
                }
            }
            None => {
                let mut addition = item.clone();
                addition.parent = Some(NewsParent::Feed(persisted_feed.uuid));
                addition.state = NewsState::New;
                addition.rev = 0;
                working.push(addition);
            }
        }
    }

    let mut outcome = MergeOutcome {
        additions: working.split_off(persisted_len),
        ..MergeOutcome::default()
    };

    for (position, current) in working.into_iter().enumerate() {
        if let Some(old) = snapshots[position].take() {
            if current != old {
                outcome.updates.push(NewsUpdate {
                    old,
                    new: current,
                    content_changed: content_changed[position],
                });
                continue;
            }
        }
        if !matched[position] {
            outcome.unmatched.push(current.uuid);
        }
    }

    if !persisted_feed.same_content(&incoming.feed) {
        let mut updated = persisted_feed.clone();
        updated.copy_content_from(&incoming.feed);
        outcome.feed_update = Some(updated);
    }

    outcome
}

/// Ordered identity resolution: permalink guid value, else link, else
/// normalized title. Returns the working-set position and the strategy that
/// matched, or `None` for a pure insertion.
fn resolve(incoming: &News, working: &[News]) -> Option<(usize, MatchStrategy)> {
    if let Some(guid) = &incoming.guid {
        if guid.permalink && !guid.value.is_empty() {
            return working
                .iter()
                .position(|candidate| {
                    candidate
                        .guid
                        .as_ref()
                        .is_some_and(|persisted| persisted.value == guid.value)
                })
                .map(|position| (position, MatchStrategy::Guid));
        }
    }
    if let Some(link) = incoming.link.as_deref().filter(|link| !link.is_empty()) {
        return working
            .iter()
            .position(|candidate| candidate.link.as_deref() == Some(link))
            .map(|position| (position, MatchStrategy::Link));
    }
    let title = incoming.title.as_deref().filter(|t| !t.trim().is_empty())?;
    let normalized = normalize_title(title);
    working
        .iter()
        .position(|candidate| {
            candidate
                .title
                .as_deref()
                .is_some_and(|persisted| normalize_title(persisted) == normalized)
        })
        .map(|position| (position, MatchStrategy::Title))
}

/// Applies one matched incoming item onto the persisted working copy.
/// Returns whether the content fingerprint changed.
///
/// A fingerprint change copies all attributes and forces `Updated`,
/// whatever state the incoming item carried. With an unchanged fingerprint
/// only the state-merge rule applies: incoming `New` never overwrites, any
/// other incoming state is taken verbatim. Two equal non-`New` states
/// therefore merge to themselves, never to `Updated`.
///
/// A match against an addition staged earlier in the same pass only folds
/// the content in; the addition keeps state `New`.
fn apply_match(
    persisted: &mut News,
    incoming: &News,
    strategy: MatchStrategy,
    staged_addition: bool,
) -> bool {
    if !persisted.same_content(incoming, strategy) {
        persisted.copy_content_from(incoming);
        if !staged_addition {
            persisted.state = NewsState::Updated;
        }
        return true;
    }
    if !staged_addition && incoming.state != NewsState::New {
        persisted.state = incoming.state;
    }
    false
}
