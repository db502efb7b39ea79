use newsreel_core::{
    open_db_in_memory, Attachment, Category, Engine, EventBus, Feed, Guid, IncomingFeed, Mark,
    News, NewsState, Person, RetentionPolicy, ReloadOutcome,
};
use uuid::Uuid;

const FEED_URL: &str = "http://example.org/feed";

fn engine() -> Engine {
    Engine::new(open_db_in_memory().unwrap(), EventBus::new())
}

fn subscribed(engine: &Engine) -> Mark {
    engine.create_bookmark(None, "Example", FEED_URL).unwrap()
}

fn item(title: &str, link: Option<&str>) -> News {
    let mut news = News::incoming(0);
    news.title = Some(title.to_string());
    news.link = link.map(str::to_string);
    news
}

fn rich_item(title: &str, link: &str) -> News {
    let mut news = item(title, Some(link));
    news.author = Some(Person::named("reporter"));
    news.categories.push(Category::named("tech"));
    news.attachments.push(Attachment {
        uuid: Uuid::new_v4(),
        news_uuid: news.uuid,
        url: format!("{link}/enclosure.mp3"),
        mime_type: Some("audio/mpeg".into()),
        length: Some(1024),
    });
    news
}

fn reload(engine: &Engine, bookmark: &Mark, items: Vec<News>) -> ReloadOutcome {
    let incoming = IncomingFeed {
        feed: Feed::new(FEED_URL),
        news: items,
    };
    engine
        .handle_feed_reload(bookmark.uuid, &incoming, &RetentionPolicy::default())
        .unwrap()
}

#[test]
fn first_reload_creates_feed_and_news() {
    let engine = engine();
    let bookmark = subscribed(&engine);

    let outcome = reload(&engine, &bookmark, vec![item("a", Some("http://a"))]);
    assert_eq!(outcome.additions.len(), 1);
    assert!(outcome.updates.is_empty());

    let feed = engine.feed_by_link(FEED_URL).unwrap().expect("feed");
    let stored = engine.news_of_feed(feed.uuid).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].state, NewsState::New);
}

#[test]
fn unchanged_reload_is_a_noop() {
    let engine = engine();
    let bookmark = subscribed(&engine);

    reload(&engine, &bookmark, vec![item("a", Some("http://a"))]);
    let outcome = reload(&engine, &bookmark, vec![item("a", Some("http://a"))]);

    assert!(outcome.additions.is_empty());
    assert!(outcome.updates.is_empty());
    assert!(outcome.affected().is_empty());
}

#[test]
fn permalink_guid_identity_survives_link_change() {
    let engine = engine();
    let bookmark = subscribed(&engine);

    let mut first = item("story", Some("http://a"));
    first.guid = Some(Guid::permalink("guid-1"));
    reload(&engine, &bookmark, vec![first]);

    let mut second = item("story", Some("http://b"));
    second.guid = Some(Guid::permalink("guid-1"));
    let outcome = reload(&engine, &bookmark, vec![second]);

    assert!(outcome.additions.is_empty());
    assert_eq!(outcome.updates.len(), 1);

    let feed = engine.feed_by_link(FEED_URL).unwrap().unwrap();
    let stored = engine.news_of_feed(feed.uuid).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].link.as_deref(), Some("http://b"));
    assert_eq!(stored[0].state, NewsState::Updated);
}

#[test]
fn title_change_marks_read_news_updated() {
    let engine = engine();
    let bookmark = subscribed(&engine);

    let outcome = reload(&engine, &bookmark, vec![item("old title", Some("http://a"))]);
    let uuid = outcome.additions[0].uuid;
    engine
        .set_news_state(&[uuid], NewsState::Read, false, false)
        .unwrap();

    let outcome = reload(&engine, &bookmark, vec![item("new title", Some("http://a"))]);
    assert_eq!(outcome.updates.len(), 1);
    assert_eq!(outcome.updates[0].state, NewsState::Updated);
    assert_eq!(outcome.updates[0].title.as_deref(), Some("new title"));
}

#[test]
fn incoming_new_never_overwrites_persisted_state() {
    let engine = engine();
    let bookmark = subscribed(&engine);

    reload(&engine, &bookmark, vec![item("a", Some("http://a"))]);
    reload(&engine, &bookmark, vec![item("b", Some("http://a"))]);

    let feed = engine.feed_by_link(FEED_URL).unwrap().unwrap();
    let stored = engine.news_of_feed(feed.uuid).unwrap();
    assert_eq!(stored[0].state, NewsState::Updated);

    // Same content again, parser default state New: nothing changes.
    let outcome = reload(&engine, &bookmark, vec![item("b", Some("http://a"))]);
    assert!(outcome.updates.is_empty());
    let stored = engine.news_of_feed(feed.uuid).unwrap();
    assert_eq!(stored[0].state, NewsState::Updated);
}

#[test]
fn equal_hidden_states_do_not_become_updated() {
    let engine = engine();
    let bookmark = subscribed(&engine);

    let outcome = reload(&engine, &bookmark, vec![item("a", Some("http://a"))]);
    let uuid = outcome.additions[0].uuid;
    engine
        .set_news_state(&[uuid], NewsState::Hidden, false, false)
        .unwrap();

    let mut incoming = item("a", Some("http://a"));
    incoming.state = NewsState::Hidden;
    let outcome = reload(&engine, &bookmark, vec![incoming]);
    assert!(outcome.updates.is_empty());

    let stored = engine.get_news(uuid).unwrap().unwrap();
    assert_eq!(stored.state, NewsState::Hidden);
}

#[test]
fn non_new_incoming_state_overwrites_verbatim() {
    let engine = engine();
    let bookmark = subscribed(&engine);

    reload(&engine, &bookmark, vec![item("a", Some("http://a"))]);

    let mut incoming = item("a", Some("http://a"));
    incoming.state = NewsState::Hidden;
    let outcome = reload(&engine, &bookmark, vec![incoming]);
    assert_eq!(outcome.updates.len(), 1);
    assert_eq!(outcome.updates[0].state, NewsState::Hidden);
}

#[test]
fn title_only_duplicates_collapse_to_one_news() {
    let engine = engine();
    let bookmark = subscribed(&engine);

    let mut first = item("breaking story", None);
    first.publish_date = Some(100);
    let mut second = item("breaking story", None);
    second.publish_date = Some(200);

    let outcome = reload(&engine, &bookmark, vec![first, second]);
    assert_eq!(outcome.additions.len(), 1);

    let feed = engine.feed_by_link(FEED_URL).unwrap().unwrap();
    let stored = engine.news_of_feed(feed.uuid).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].state, NewsState::New);
}

#[test]
fn publish_date_only_change_never_touches_title_matched_state() {
    let engine = engine();
    let bookmark = subscribed(&engine);

    let mut first = item("headline", None);
    first.publish_date = Some(100);
    let outcome = reload(&engine, &bookmark, vec![first]);
    let uuid = outcome.additions[0].uuid;
    engine
        .set_news_state(&[uuid], NewsState::Read, false, false)
        .unwrap();

    let mut refetched = item("headline", None);
    refetched.publish_date = Some(200);
    let outcome = reload(&engine, &bookmark, vec![refetched]);
    assert!(outcome.updates.is_empty());
    assert_eq!(
        engine.get_news(uuid).unwrap().unwrap().state,
        NewsState::Read
    );
}

#[test]
fn feed_attribute_changes_are_persisted() {
    let engine = engine();
    let bookmark = subscribed(&engine);
    reload(&engine, &bookmark, vec![]);

    let mut fetched = Feed::new(FEED_URL);
    fetched.title = Some("renamed".into());
    engine
        .handle_feed_reload(
            bookmark.uuid,
            &IncomingFeed {
                feed: fetched,
                news: vec![],
            },
            &RetentionPolicy::default(),
        )
        .unwrap();

    let feed = engine.feed_by_link(FEED_URL).unwrap().unwrap();
    assert_eq!(feed.title.as_deref(), Some("renamed"));
}

#[test]
fn state_merge_reload_keeps_child_rows() {
    let engine = engine();
    let bookmark = subscribed(&engine);

    let outcome = reload(&engine, &bookmark, vec![rich_item("story", "http://a")]);
    let uuid = outcome.additions[0].uuid;

    // Identical content and state: nothing to persist, children stay.
    let outcome = reload(&engine, &bookmark, vec![rich_item("story", "http://a")]);
    assert!(outcome.affected().is_empty());
    let stored = engine.get_news(uuid).unwrap().unwrap();
    assert_eq!(stored.attachments.len(), 1);

    // Identical content, incoming state Hidden: the state merges through
    // without disturbing the item's person, category and attachment rows.
    let mut hidden = rich_item("story", "http://a");
    hidden.state = NewsState::Hidden;
    let outcome = reload(&engine, &bookmark, vec![hidden]);
    assert_eq!(outcome.updates.len(), 1);

    let stored = engine.get_news(uuid).unwrap().unwrap();
    assert_eq!(stored.state, NewsState::Hidden);
    assert_eq!(stored.attachments.len(), 1);
    assert_eq!(stored.categories.len(), 1);
    assert_eq!(
        stored.author.as_ref().and_then(|author| author.name.as_deref()),
        Some("reporter")
    );
}

#[test]
fn content_update_replaces_child_rows_with_incoming_set() {
    let engine = engine();
    let bookmark = subscribed(&engine);

    let outcome = reload(&engine, &bookmark, vec![rich_item("story", "http://a")]);
    let uuid = outcome.additions[0].uuid;

    let mut changed = rich_item("revised story", "http://a");
    changed.attachments[0].url = "http://a/enclosure-v2.mp3".into();
    changed.attachments.push(Attachment {
        uuid: Uuid::new_v4(),
        news_uuid: changed.uuid,
        url: "http://a/transcript.txt".into(),
        mime_type: Some("text/plain".into()),
        length: None,
    });
    let outcome = reload(&engine, &bookmark, vec![changed]);
    assert_eq!(outcome.updates.len(), 1);

    let stored = engine.get_news(uuid).unwrap().unwrap();
    assert_eq!(stored.state, NewsState::Updated);
    let mut urls: Vec<&str> = stored
        .attachments
        .iter()
        .map(|attachment| attachment.url.as_str())
        .collect();
    urls.sort_unstable();
    assert_eq!(urls, ["http://a/enclosure-v2.mp3", "http://a/transcript.txt"]);
    assert!(stored
        .attachments
        .iter()
        .all(|attachment| attachment.news_uuid == uuid));
}

#[test]
fn updates_bump_the_revision() {
    let engine = engine();
    let bookmark = subscribed(&engine);

    let outcome = reload(&engine, &bookmark, vec![item("a", Some("http://a"))]);
    let uuid = outcome.additions[0].uuid;
    let before = engine.get_news(uuid).unwrap().unwrap().rev;

    let outcome = reload(&engine, &bookmark, vec![item("b", Some("http://a"))]);
    assert_eq!(outcome.updates[0].rev, before + 1);
}

#[test]
fn reload_through_a_non_bookmark_is_rejected() {
    let engine = engine();
    let bin = engine.create_news_bin(None, "Bin").unwrap();
    let incoming = IncomingFeed {
        feed: Feed::new(FEED_URL),
        news: vec![],
    };
    let err = engine
        .handle_feed_reload(bin.uuid, &incoming, &RetentionPolicy::default())
        .unwrap_err();
    assert!(err.to_string().contains("not a bookmark"));
}
