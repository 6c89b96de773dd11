//! End-to-end strip behaviour on a paused tokio clock.

use std::sync::Arc;
use std::time::Duration;

use tickerstrip::calendar::ExchangeCalendar;
use tickerstrip::config::StripSettings;
use tickerstrip::feed::assembly::fallback_items;
use tickerstrip::feed::MarketSnapshot;
use tickerstrip::ticker::TickerStrip;

use crate::mock_feed::{snapshot, MockFeed};

fn settings() -> StripSettings {
    StripSettings {
        frame_interval: Duration::from_millis(250),
        jitter_seed: Some(2024),
        ..StripSettings::default()
    }
}

fn mount(feed: Arc<MockFeed>) -> TickerStrip {
    TickerStrip::mount(settings(), feed, Arc::new(ExchangeCalendar::jse()))
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn two_indices_three_quotes_render_eighteen_loop_items() {
    let feed = Arc::new(MockFeed::new(snapshot(2, 3)));
    let strip = mount(feed.clone());
    settle().await;

    let snap = strip.snapshot().await;
    assert_eq!(snap.items.len(), 9);
    assert_eq!(snap.loop_items.len(), 18);
    assert_eq!(snap.loop_items[..9], snap.loop_items[9..]);
    assert_eq!(snap.items[0].symbol(), "IDX0");
    assert_eq!(snap.items[2].symbol(), "STK0");
    assert_eq!(snap.items[5].symbol(), "USD/ZAR");
    strip.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn direction_matches_change_on_every_update_path() {
    let feed = Arc::new(MockFeed::new(snapshot(5, 15)));
    let strip = mount(feed.clone());

    // Initial load.
    for item in strip.snapshot().await.items {
        assert_eq!(item.is_up(), item.change() >= 0.0);
    }

    // Polls plus jitter over five minutes, sampled every second.
    for _ in 0..300 {
        tokio::time::sleep(Duration::from_secs(1)).await;
        for item in strip.snapshot().await.items {
            assert_eq!(item.is_up(), item.change() >= 0.0, "{}", item.symbol());
        }
    }
    strip.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn jitter_never_lands_within_ten_seconds_of_a_poll() {
    let feed = Arc::new(MockFeed::new(snapshot(3, 4)));
    let strip = mount(feed.clone());
    settle().await;

    for cycle in 0..3 {
        let polled = strip.snapshot().await;
        // Sample the first nine seconds after each poll.
        for _ in 0..9 {
            tokio::time::sleep(Duration::from_secs(1)).await;
            assert_eq!(strip.snapshot().await.items, polled.items, "cycle {cycle}");
        }
        // Move to just after the next poll.
        tokio::time::sleep(Duration::from_secs(51)).await;
        settle().await;
        assert_eq!(feed.calls(), cycle + 2);
    }
    strip.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn failure_keeps_data_until_next_poll() {
    let feed = Arc::new(
        MockFeed::new(snapshot(1, 1)).then_fail(Duration::ZERO, "502 bad gateway"),
    );
    let strip = mount(feed.clone());
    settle().await;
    assert_eq!(strip.snapshot().await.items.len(), fallback_items().len());

    tokio::time::sleep(Duration::from_secs(60)).await;
    settle().await;
    assert_eq!(feed.calls(), 2);
    assert_eq!(strip.snapshot().await.items.len(), 1 + 1 + 4);
    strip.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn empty_poll_keeps_previous_list() {
    let feed = Arc::new(MockFeed::new(snapshot(2, 2)));
    let strip = mount(feed.clone());
    settle().await;
    let before = strip.snapshot().await;
    assert_eq!(before.items.len(), 8);

    feed.set_default(MarketSnapshot::default());
    strip.toggle_pause().await.unwrap();
    strip.refresh().await.unwrap();
    settle().await;

    let after = strip.snapshot().await;
    assert_eq!(feed.calls(), 2);
    assert_eq!(after.items, before.items);
    assert_eq!(after.last_fetched_at, before.last_fetched_at);
    strip.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn slow_superseded_fetch_is_discarded() {
    // First call (mount) is slow and returns one index; the manual refresh
    // issued right after answers immediately with a bigger list.
    let feed = Arc::new(
        MockFeed::new(snapshot(2, 3))
            .then_respond(Duration::from_secs(5), snapshot(1, 0))
            .then_respond(Duration::ZERO, snapshot(2, 3)),
    );
    let strip = mount(feed.clone());
    strip.refresh().await.unwrap();
    settle().await;
    assert_eq!(feed.calls(), 2);
    assert_eq!(strip.snapshot().await.items.len(), 9);

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(strip.snapshot().await.items.len(), 9, "older response must not win");
    strip.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn scroll_wraps_at_half_the_belt() {
    let feed = Arc::new(MockFeed::new(snapshot(1, 0)));
    let strip = TickerStrip::mount(
        StripSettings {
            frame_interval: Duration::from_millis(10),
            scroll_px_per_frame: 10.0,
            item_width_px: 20.0,
            ..settings()
        },
        feed,
        Arc::new(ExchangeCalendar::jse()),
    );
    settle().await;
    // 5 items × 20 px = 100 px per copy → wraps every 10 frames.
    assert_eq!(strip.snapshot().await.loop_width, 200.0);

    let mut previous = strip.snapshot().await.offset;
    let mut wraps = 0;
    for _ in 0..35 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let offset = strip.snapshot().await.offset;
        assert!(offset < 100.0);
        if offset < previous {
            assert_eq!(offset, 0.0, "wrap lands exactly on zero");
            wraps += 1;
        }
        previous = offset;
    }
    assert!(wraps >= 3);
    strip.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn unmount_cancels_all_loops_and_inflight_fetches() {
    let feed = Arc::new(
        MockFeed::new(snapshot(2, 3)).then_respond(Duration::from_secs(30), snapshot(1, 0)),
    );
    let strip = mount(feed.clone());
    settle().await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    strip.unmount().await;
    let frozen = strip.snapshot().await;
    assert!(!frozen.mounted);
    assert_eq!(frozen.items, fallback_items(), "in-flight fetch was aborted");

    tokio::time::sleep(Duration::from_secs(600)).await;
    let later = strip.snapshot().await;
    assert_eq!(feed.calls(), 1);
    assert_eq!(later.items, frozen.items);
    assert_eq!(later.offset, frozen.offset);
    assert_eq!(later.revision, frozen.revision);
    assert_eq!(later.market_status, frozen.market_status);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_polling() {
    let feed = Arc::new(MockFeed::new(snapshot(1, 1)));
    let strip = mount(feed.clone());
    settle().await;
    assert_eq!(feed.calls(), 1);

    drop(strip);
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(feed.calls(), 1);
}
