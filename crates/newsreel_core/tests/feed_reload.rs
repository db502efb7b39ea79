use newsreel_core::{
    open_db_in_memory, Engine, EventBus, Feed, IncomingFeed, Mark, News, NewsState,
    RetentionPolicy, ReloadOutcome,
};

const FEED_URL: &str = "http://example.org/feed";

fn engine() -> Engine {
    Engine::new(open_db_in_memory().unwrap(), EventBus::new())
}

fn subscribed(engine: &Engine) -> Mark {
    engine.create_bookmark(None, "Example", FEED_URL).unwrap()
}

fn item(title: &str, link: &str) -> News {
    let mut news = News::incoming(0);
    news.title = Some(title.to_string());
    news.link = Some(link.to_string());
    news
}

fn reload_with(
    engine: &Engine,
    bookmark: &Mark,
    items: Vec<News>,
    policy: &RetentionPolicy,
) -> ReloadOutcome {
    let incoming = IncomingFeed {
        feed: Feed::new(FEED_URL),
        news: items,
    };
    engine
        .handle_feed_reload(bookmark.uuid, &incoming, policy)
        .unwrap()
}

#[test]
fn absent_read_news_is_soft_deleted_under_policy() {
    let engine = engine();
    let bookmark = subscribed(&engine);
    let policy = RetentionPolicy {
        delete_read_on_cleanup: true,
        ..RetentionPolicy::default()
    };

    let outcome = reload_with(&engine, &bookmark, vec![item("a", "http://a")], &policy);
    let uuid = outcome.additions[0].uuid;
    engine
        .set_news_state(&[uuid], NewsState::Read, false, false)
        .unwrap();

    let outcome = reload_with(&engine, &bookmark, vec![], &policy);
    assert_eq!(outcome.soft_deleted, vec![uuid]);
    assert!(outcome.purged.is_empty());
    assert_eq!(
        engine.get_news(uuid).unwrap().unwrap().state,
        NewsState::Deleted
    );
}

#[test]
fn absent_read_news_survives_without_policy() {
    let engine = engine();
    let bookmark = subscribed(&engine);
    let policy = RetentionPolicy::default();

    let outcome = reload_with(&engine, &bookmark, vec![item("a", "http://a")], &policy);
    let uuid = outcome.additions[0].uuid;
    engine
        .set_news_state(&[uuid], NewsState::Read, false, false)
        .unwrap();

    let outcome = reload_with(&engine, &bookmark, vec![], &policy);
    assert!(outcome.soft_deleted.is_empty());
    assert_eq!(
        engine.get_news(uuid).unwrap().unwrap().state,
        NewsState::Read
    );
}

#[test]
fn absent_new_news_is_left_untouched() {
    let engine = engine();
    let bookmark = subscribed(&engine);
    let policy = RetentionPolicy {
        delete_read_on_cleanup: true,
        ..RetentionPolicy::default()
    };

    let outcome = reload_with(&engine, &bookmark, vec![item("a", "http://a")], &policy);
    let uuid = outcome.additions[0].uuid;

    let outcome = reload_with(&engine, &bookmark, vec![], &policy);
    assert!(outcome.soft_deleted.is_empty());
    assert!(outcome.purged.is_empty());
    assert_eq!(engine.get_news(uuid).unwrap().unwrap().state, NewsState::New);
}

#[test]
fn deleted_and_absent_news_is_purged_on_the_next_pass() {
    let engine = engine();
    let bookmark = subscribed(&engine);
    let policy = RetentionPolicy {
        delete_read_on_cleanup: true,
        ..RetentionPolicy::default()
    };

    let outcome = reload_with(&engine, &bookmark, vec![item("a", "http://a")], &policy);
    let uuid = outcome.additions[0].uuid;
    engine
        .set_news_state(&[uuid], NewsState::Read, false, false)
        .unwrap();

    // First empty pass soft-deletes, second purges.
    let outcome = reload_with(&engine, &bookmark, vec![], &policy);
    assert_eq!(outcome.soft_deleted, vec![uuid]);

    let outcome = reload_with(&engine, &bookmark, vec![], &policy);
    assert_eq!(outcome.purged, vec![uuid]);
    assert!(engine.get_news(uuid).unwrap().is_none());

    // The feed itself survives even when it is empty.
    assert!(engine.feed_by_link(FEED_URL).unwrap().is_some());
}

#[test]
fn delete_unmatched_policy_soft_deletes_every_absent_item() {
    let engine = engine();
    let bookmark = subscribed(&engine);
    let policy = RetentionPolicy {
        delete_unmatched: true,
        ..RetentionPolicy::default()
    };

    let outcome = reload_with(&engine, &bookmark, vec![item("a", "http://a")], &policy);
    let uuid = outcome.additions[0].uuid;

    let outcome = reload_with(&engine, &bookmark, vec![], &policy);
    assert_eq!(outcome.soft_deleted, vec![uuid]);
}

#[test]
fn count_limit_soft_deletes_oldest_read_items() {
    let engine = engine();
    let bookmark = subscribed(&engine);
    let policy = RetentionPolicy {
        max_news_count: Some(1),
        ..RetentionPolicy::default()
    };

    let mut old = item("old", "http://old");
    old.received_date = 100;
    let mut new = item("new", "http://new");
    new.received_date = 200;

    let outcome = reload_with(&engine, &bookmark, vec![old, new], &policy);
    let old_uuid = outcome.additions[0].uuid;
    let new_uuid = outcome.additions[1].uuid;
    engine
        .set_news_state(&[old_uuid, new_uuid], NewsState::Read, false, false)
        .unwrap();

    let outcome = reload_with(
        &engine,
        &bookmark,
        vec![item("old", "http://old"), item("new", "http://new")],
        &policy,
    );
    assert_eq!(outcome.soft_deleted, vec![old_uuid]);
    assert_eq!(
        engine.get_news(new_uuid).unwrap().unwrap().state,
        NewsState::Read
    );
}
