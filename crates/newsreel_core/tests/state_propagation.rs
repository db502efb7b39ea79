use newsreel_core::{
    open_db_in_memory, Engine, EngineError, EntityEvent, EntityListener, EventBus, Feed,
    IncomingFeed, Mark, News, NewsState, RetentionPolicy,
};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

fn engine() -> Engine {
    Engine::new(open_db_in_memory().unwrap(), EventBus::new())
}

fn item(title: &str, link: &str) -> News {
    let mut news = News::incoming(0);
    news.title = Some(title.to_string());
    news.link = Some(link.to_string());
    news
}

fn subscribe_feed(engine: &Engine, url: &str, items: Vec<News>) -> Mark {
    let bookmark = engine.create_bookmark(None, url, url).unwrap();
    let incoming = IncomingFeed {
        feed: Feed::new(url),
        news: items,
    };
    engine
        .handle_feed_reload(bookmark.uuid, &incoming, &RetentionPolicy::default())
        .unwrap();
    bookmark
}

#[derive(Default)]
struct NewsRecorder {
    updated: Mutex<Vec<EntityEvent<News>>>,
}

impl EntityListener<News> for NewsRecorder {
    fn entities_updated(&self, events: &[EntityEvent<News>]) {
        self.updated.lock().unwrap().extend_from_slice(events);
    }
}

#[test]
fn equivalent_news_across_feeds_change_together() {
    let engine = engine();
    subscribe_feed(
        &engine,
        "http://one.example/feed",
        vec![item("story", "http://shared/story")],
    );
    subscribe_feed(
        &engine,
        "http://two.example/feed",
        vec![item("story", "http://shared/story")],
    );

    let recorder = Arc::new(NewsRecorder::default());
    engine.bus().subscribe_news(recorder.clone());

    let feed_one = engine.feed_by_link("http://one.example/feed").unwrap().unwrap();
    let original = engine.news_of_feed(feed_one.uuid).unwrap()[0].clone();

    let changed = engine
        .set_news_state(&[original.uuid], NewsState::Read, true, false)
        .unwrap();
    assert_eq!(changed.len(), 2);
    for news in &changed {
        assert_eq!(news.state, NewsState::Read);
    }

    // Exactly one update event per affected news.
    let events = recorder.updated.lock().unwrap();
    assert_eq!(events.len(), 2);
    let mut uuids: Vec<Uuid> = events.iter().map(|event| event.entity.uuid).collect();
    uuids.sort();
    uuids.dedup();
    assert_eq!(uuids.len(), 2);

    let root_events: Vec<_> = events.iter().filter(|event| event.root).collect();
    assert_eq!(root_events.len(), 1);
    assert_eq!(root_events[0].entity.uuid, original.uuid);
}

#[test]
fn propagation_reaches_bin_copies() {
    let engine = engine();
    subscribe_feed(
        &engine,
        "http://one.example/feed",
        vec![item("story", "http://shared/story")],
    );
    let feed = engine.feed_by_link("http://one.example/feed").unwrap().unwrap();
    let original = engine.news_of_feed(feed.uuid).unwrap()[0].clone();

    let bin = engine.create_news_bin(None, "Keep").unwrap();
    let copies = engine.copy_news_to_bin(&[original.uuid], bin.uuid).unwrap();
    assert_eq!(copies.len(), 1);

    let changed = engine
        .set_news_state(&[original.uuid], NewsState::Read, true, false)
        .unwrap();
    assert_eq!(changed.len(), 2);
    assert_eq!(
        engine.get_news(copies[0].uuid).unwrap().unwrap().state,
        NewsState::Read
    );
}

#[test]
fn without_the_flag_only_the_exact_instance_changes() {
    let engine = engine();
    subscribe_feed(
        &engine,
        "http://one.example/feed",
        vec![item("story", "http://shared/story")],
    );
    subscribe_feed(
        &engine,
        "http://two.example/feed",
        vec![item("story", "http://shared/story")],
    );

    let feed_one = engine.feed_by_link("http://one.example/feed").unwrap().unwrap();
    let original = engine.news_of_feed(feed_one.uuid).unwrap()[0].clone();

    let changed = engine
        .set_news_state(&[original.uuid], NewsState::Read, false, false)
        .unwrap();
    assert_eq!(changed.len(), 1);

    let feed_two = engine.feed_by_link("http://two.example/feed").unwrap().unwrap();
    let other = engine.news_of_feed(feed_two.uuid).unwrap()[0].clone();
    assert_eq!(other.state, NewsState::New);
}

#[test]
fn title_only_identity_does_not_fan_out() {
    let engine = engine();
    let mut first = News::incoming(0);
    first.title = Some("same headline".into());
    let mut second = News::incoming(0);
    second.title = Some("same headline".into());

    subscribe_feed(&engine, "http://one.example/feed", vec![first]);
    subscribe_feed(&engine, "http://two.example/feed", vec![second]);

    let feed_one = engine.feed_by_link("http://one.example/feed").unwrap().unwrap();
    let original = engine.news_of_feed(feed_one.uuid).unwrap()[0].clone();

    let changed = engine
        .set_news_state(&[original.uuid], NewsState::Read, true, false)
        .unwrap();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].uuid, original.uuid);
}

#[test]
fn unsaved_news_is_rejected() {
    let engine = engine();
    let err = engine
        .set_news_state(&[Uuid::new_v4()], NewsState::Read, true, false)
        .unwrap_err();
    assert!(matches!(err, EngineError::IdentityResolution(_)));
}

#[test]
fn same_state_is_skipped_unless_forced() {
    let engine = engine();
    subscribe_feed(
        &engine,
        "http://one.example/feed",
        vec![item("story", "http://a")],
    );
    let feed = engine.feed_by_link("http://one.example/feed").unwrap().unwrap();
    let uuid = engine.news_of_feed(feed.uuid).unwrap()[0].uuid;

    engine
        .set_news_state(&[uuid], NewsState::Read, false, false)
        .unwrap();
    let changed = engine
        .set_news_state(&[uuid], NewsState::Read, false, false)
        .unwrap();
    assert!(changed.is_empty());

    let changed = engine
        .set_news_state(&[uuid], NewsState::Read, false, true)
        .unwrap();
    assert_eq!(changed.len(), 1);
}

#[test]
fn stale_revision_save_surfaces_concurrent_modification() {
    let engine = engine();
    subscribe_feed(
        &engine,
        "http://one.example/feed",
        vec![item("story", "http://a")],
    );
    let feed = engine.feed_by_link("http://one.example/feed").unwrap().unwrap();
    let mut loaded = engine.news_of_feed(feed.uuid).unwrap()[0].clone();

    loaded.title = Some("edited once".into());
    engine.save_news(&loaded).unwrap();

    // Same stale revision again: another writer already bumped it.
    loaded.title = Some("edited twice".into());
    let err = engine.save_news(&loaded).unwrap_err();
    assert!(matches!(err, EngineError::ConcurrentModification { .. }));
}

struct PanickingListener;

impl EntityListener<News> for PanickingListener {
    fn entities_updated(&self, _events: &[EntityEvent<News>]) {
        panic!("listener failure");
    }
}

#[test]
fn panicking_listener_does_not_starve_the_others() {
    let engine = engine();
    subscribe_feed(
        &engine,
        "http://one.example/feed",
        vec![item("story", "http://a")],
    );
    let feed = engine.feed_by_link("http://one.example/feed").unwrap().unwrap();
    let uuid = engine.news_of_feed(feed.uuid).unwrap()[0].uuid;

    let recorder = Arc::new(NewsRecorder::default());
    engine.bus().subscribe_news(Arc::new(PanickingListener));
    engine.bus().subscribe_news(recorder.clone());

    engine
        .set_news_state(&[uuid], NewsState::Read, false, false)
        .unwrap();

    // The state change committed and the healthy listener was notified.
    assert_eq!(recorder.updated.lock().unwrap().len(), 1);
    assert_eq!(
        engine.get_news(uuid).unwrap().unwrap().state,
        NewsState::Read
    );
}

#[test]
fn unsubscribed_listener_receives_nothing() {
    let engine = engine();
    subscribe_feed(
        &engine,
        "http://one.example/feed",
        vec![item("story", "http://a")],
    );
    let feed = engine.feed_by_link("http://one.example/feed").unwrap().unwrap();
    let uuid = engine.news_of_feed(feed.uuid).unwrap()[0].uuid;

    let recorder = Arc::new(NewsRecorder::default());
    let token = engine.bus().subscribe_news(recorder.clone());
    assert!(engine.bus().unsubscribe_news(token));

    engine
        .set_news_state(&[uuid], NewsState::Read, false, false)
        .unwrap();
    assert!(recorder.updated.lock().unwrap().is_empty());
}
