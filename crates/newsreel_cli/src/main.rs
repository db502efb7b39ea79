//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `newsreel_core` linkage.
//! - Run one in-memory reload cycle so wiring problems surface early.

use newsreel_core::{
    open_db_in_memory, Engine, EventBus, Feed, IncomingFeed, News, RetentionPolicy,
};

fn main() {
    println!("newsreel_core ping={}", newsreel_core::ping());
    println!("newsreel_core version={}", newsreel_core::core_version());

    let conn = match open_db_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("newsreel_cli: failed to open store: {err}");
            std::process::exit(1);
        }
    };
    let engine = Engine::new(conn, EventBus::new());

    let result = engine
        .create_bookmark(None, "Example", "http://example.org/feed")
        .and_then(|bookmark| {
            let mut item = News::incoming(0);
            item.title = Some("hello".into());
            item.link = Some("http://example.org/1".into());
            let incoming = IncomingFeed {
                feed: Feed::new("http://example.org/feed"),
                news: vec![item],
            };
            engine.handle_feed_reload(bookmark.uuid, &incoming, &RetentionPolicy::default())
        });

    match result {
        Ok(outcome) => println!(
            "newsreel_cli smoke reload added={} updated={}",
            outcome.additions.len(),
            outcome.updates.len()
        ),
        Err(err) => {
            eprintln!("newsreel_cli: smoke reload failed: {err}");
            std::process::exit(1);
        }
    }
}
