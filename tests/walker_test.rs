mod common;

use bpm_fetch::{Advance, Edition, FetchConfig, PageWalker, WalkMode, WalkerState};
use common::{row, test_config, FakeBrowser};

fn config() -> FetchConfig {
    test_config()
}

#[tokio::test]
async fn discovers_rows_in_document_order() {
    let fake = FakeBrowser::infinite(
        vec![
            row("First", &["A"], &["Dirty"]),
            row("Second", &["B"], &["Clean"]),
        ],
        2,
        0,
    );
    let config = config();
    let mut walker = PageWalker::new(&fake, WalkMode::InfiniteScroll, &config);

    let items = walker.discover_new_items().await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "First");
    assert_eq!(items[1].title, "Second");
    assert_eq!(items[0].index, 0);
    assert_eq!(items[1].index, 1);
    assert_eq!(items[0].artists, vec!["A".to_string()]);

    // A second scan with no new content discovers nothing.
    assert!(walker.discover_new_items().await.unwrap().is_empty());
}

#[tokio::test]
async fn scroll_reveals_more_rows_and_bumps_epoch() {
    let fake = FakeBrowser::infinite(
        vec![
            row("One", &["A"], &["Dirty"]),
            row("Two", &["A"], &["Dirty"]),
            row("Three", &["A"], &["Dirty"]),
            row("Four", &["A"], &["Dirty"]),
        ],
        2,
        2,
    );
    let config = config();
    let mut walker = PageWalker::new(&fake, WalkMode::InfiniteScroll, &config);

    let first = walker.discover_new_items().await.unwrap();
    assert_eq!(first.len(), 2);
    assert!(first.iter().all(|item| item.epoch == 0));

    assert_eq!(walker.advance().await.unwrap(), Advance::MoreContent);
    assert_eq!(walker.epoch(), 1);

    let second = walker.discover_new_items().await.unwrap();
    assert_eq!(second.len(), 2);
    assert_eq!(second[0].title, "Three");
    // Rows from after the re-render belong to the new epoch.
    assert!(second.iter().all(|item| item.epoch == 1));
}

#[tokio::test]
async fn two_stalled_scrolls_end_the_walk() {
    let fake = FakeBrowser::infinite(vec![row("Only", &["A"], &["Dirty"])], 1, 1);
    let config = config();
    let mut walker = PageWalker::new(&fake, WalkMode::InfiniteScroll, &config);

    walker.discover_new_items().await.unwrap();
    assert_eq!(walker.advance().await.unwrap(), Advance::NoChange);
    assert_eq!(walker.advance().await.unwrap(), Advance::EndOfPages);
    assert_eq!(walker.state(), WalkerState::Done);

    // Done is sticky.
    assert!(walker.discover_new_items().await.unwrap().is_empty());
    assert_eq!(walker.advance().await.unwrap(), Advance::EndOfPages);
}

#[tokio::test]
async fn pagination_walks_pages_and_detects_the_last_one() {
    let fake = FakeBrowser::paginated(vec![
        vec![
            row("P1 A", &["X"], &["Dirty"]),
            row("P1 B", &["X"], &["Dirty"]),
        ],
        vec![row("P2 A", &["X"], &["Dirty"])],
    ]);
    let config = config();
    let mut walker = PageWalker::new(&fake, WalkMode::Paginated, &config);

    let first = walker.discover_new_items().await.unwrap();
    assert_eq!(first.len(), 2);

    assert_eq!(walker.advance().await.unwrap(), Advance::MoreContent);
    let second = walker.discover_new_items().await.unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].title, "P2 A");
    // Discovery indexes keep increasing across pages.
    assert_eq!(second[0].index, 2);
    assert_eq!(second[0].epoch, 1);

    assert_eq!(walker.advance().await.unwrap(), Advance::EndOfPages);
    assert_eq!(walker.state(), WalkerState::Done);
}

#[tokio::test]
async fn unknown_edition_labels_are_dropped() {
    let fake = FakeBrowser::infinite(
        vec![row("Track", &["A"], &["Instrumental", "Dirty", "Acapella"])],
        1,
        0,
    );
    let config = config();
    let mut walker = PageWalker::new(&fake, WalkMode::InfiniteScroll, &config);

    let items = walker.discover_new_items().await.unwrap();
    assert_eq!(items.len(), 1);
    let labels: Vec<Edition> = items[0].editions.iter().map(|(e, _)| *e).collect();
    assert_eq!(labels, vec![Edition::Dirty]);
}
