#[allow(dead_code)]
mod common;

use std::time::Duration;

use color_eyre::Result;
use common::{TestHarness, records};
use roster::prelude::*;

const WIDTH: u16 = 60;
// toolbar + grid header + 5 body rows + footer
const HEIGHT: u16 = 8;
const FOOTER: usize = HEIGHT as usize - 1;

#[test]
fn first_frame_materializes_only_the_window() -> Result<()> {
    let mut h = TestHarness::loaded(records(100), WIDTH, HEIGHT)?;
    let screen = h.render()?;

    assert_eq!(screen[0], ">");
    assert!(screen[1].contains("Name"));
    assert!(screen[1].contains("Power ↕"));
    assert!(screen[2].starts_with(">"));
    assert!(screen[2].contains("ninja-0"));
    assert!(screen[6].contains("ninja-4"));
    assert!(screen.iter().all(|l| !l.contains("ninja-5")));
    insta::assert_snapshot!(screen[FOOTER], @"Showing 1 to 5 of 100 rows");

    let window = h.app.grid.window;
    assert_eq!(window.range(), 0..15);
    assert_eq!(h.app.grid.rows.len(), 15);
    Ok(())
}

#[test]
fn cursor_keeps_its_row_visible() -> Result<()> {
    let mut h = TestHarness::loaded(records(100), WIDTH, HEIGHT)?;
    h.render()?;
    for _ in 0..7 {
        h.action(Action::Down(1))?;
    }
    let screen = h.render()?;
    assert!(screen[2].contains("ninja-3"));
    assert!(screen[6].starts_with(">"));
    assert!(screen[6].contains("ninja-7"));
    insta::assert_snapshot!(screen[FOOTER], @"Showing 4 to 8 of 100 rows");

    h.action(Action::Last)?;
    let screen = h.render()?;
    assert!(screen[6].contains("ninja-99"));
    insta::assert_snapshot!(screen[FOOTER], @"Showing 96 to 100 of 100 rows");
    assert_eq!(h.app.grid.window.range(), 85..100);

    h.action(Action::Up(200))?;
    assert_eq!(h.app.cursor, 0);
    Ok(())
}

#[test]
fn resize_grows_the_window() -> Result<()> {
    let mut h = TestHarness::loaded(records(100), WIDTH, HEIGHT)?;
    h.render()?;
    h.tui.backend_mut().resize(WIDTH, 12);
    let screen = h.render()?;
    insta::assert_snapshot!(screen[11], @"Showing 1 to 9 of 100 rows");
    Ok(())
}

#[test]
fn scrolling_reuses_the_derived_view() -> Result<()> {
    let mut h = TestHarness::loaded(records(1000), WIDTH, HEIGHT)?;
    h.render()?;
    let generation = h.app.view_generation();
    for _ in 0..50 {
        h.action(Action::Down(1))?;
        h.render()?;
    }
    h.action(Action::Toggle)?;
    h.action(Action::Last)?;
    let screen = h.render()?;
    assert_eq!(h.app.view_generation(), generation);
    assert!(screen[6].contains("ninja-999"));
    insta::assert_snapshot!(screen[FOOTER], @"Showing 996 to 1000 of 1000 rows");

    h.type_str("9")?;
    assert!(h.app.view_generation() > generation);
    assert_eq!(h.app.visible_ids(), h.view_ids());
    Ok(())
}

#[test]
fn no_body_rows_shows_an_empty_range() -> Result<()> {
    let mut h = TestHarness::loaded(records(100), WIDTH, 3)?;
    let screen = h.render()?;
    insta::assert_snapshot!(screen[2], @"Showing 0 to 0 of 100 rows");
    Ok(())
}

#[test]
fn search_reports_filtered_total() -> Result<()> {
    let mut h = TestHarness::loaded(records(100), WIDTH, HEIGHT)?;
    h.type_str("NINJA-1")?;
    assert_eq!(h.app.store.criteria().search_query, "NINJA-1");
    assert_eq!(h.view_ids().len(), 11);

    let screen = h.render()?;
    assert!(screen[0].contains("NINJA-1"));
    insta::assert_snapshot!(screen[FOOTER], @"Showing 1 to 5 of 11 rows (filtered from 100 total)");

    h.ctrl('u')?;
    assert_eq!(h.view_ids().len(), 100);
    Ok(())
}

#[test]
fn no_results_message() -> Result<()> {
    let mut h = TestHarness::loaded(records(10), WIDTH, HEIGHT)?;
    h.type_str("sasuke")?;
    let screen = h.render()?;
    assert!(screen.iter().any(|l| l.trim() == "No results found."));
    insta::assert_snapshot!(screen[FOOTER], @"Showing 0 to 0 of 0 rows (filtered from 10 total)");
    Ok(())
}

#[test]
fn health_filter_then_sort() -> Result<()> {
    let mut h = TestHarness::loaded(records(100), WIDTH, HEIGHT)?;
    h.action(Action::ToggleHealth(Health::Injured))?;
    assert_eq!(h.view_ids().len(), 33);

    h.ctrl('s')?;
    assert_eq!(h.app.store.criteria().sort, SortState::Ascending);
    assert_eq!(h.view_ids().first().map(String::as_str), Some("1"));
    h.ctrl('s')?;
    assert_eq!(h.view_ids().first().map(String::as_str), Some("97"));

    let screen = h.render()?;
    assert!(screen[1].contains("Health (I)"));
    assert!(screen[1].contains("Power ↓"));
    assert!(screen[2].contains("ninja-97"));

    h.action(Action::ClearFilters)?;
    h.ctrl('s')?;
    assert_eq!(h.app.store.criteria().sort, SortState::Unsorted);
    assert_eq!(h.view_ids().len(), 100);
    Ok(())
}

#[test]
fn mark_selected_viewed_commits() -> Result<()> {
    let mut h = TestHarness::loaded(records(10), WIDTH, HEIGHT)?;
    h.action(Action::Toggle)?;
    h.action(Action::Down(1))?;
    h.action(Action::Toggle)?;
    let screen = h.render()?;
    assert!(screen[0].ends_with("[2 selected]"));
    assert!(screen[2].contains("[x]"));

    h.ctrl('v')?;
    // applied before the remote answers
    assert!(h.app.store.is_viewed("0"));
    assert!(h.app.store.is_viewed("1"));
    assert!(h.app.store.selection().is_empty());

    h.wait_until(|app| !app.store.is_mutating())?;
    assert_eq!(h.app.store.last_mutation_outcome(), Some(MutationState::Committed));
    let server: Vec<bool> = h.remote.snapshot().iter().map(|r| r.viewed).collect();
    assert_eq!(&server[..3], &[true, true, false]);

    let screen = h.render()?;
    assert!(screen[2].contains("●"));
    assert!(screen[3].contains("●"));
    assert!(!screen[4].contains("●"));
    Ok(())
}

#[test]
fn failed_update_rolls_back_and_reports() -> Result<()> {
    let mut h = TestHarness::loaded(records(3), 80, HEIGHT)?;
    h.remote.set_fail_patch(true);
    h.action(Action::Toggle)?;
    h.action(Action::MarkViewed)?;
    assert!(h.app.store.is_viewed("0"));

    h.wait_until(|app| !app.store.is_mutating())?;
    assert!(!h.app.store.is_viewed("0"));
    assert_eq!(h.app.store.error(), Some("Failed to update records: injected failure"));
    let screen = h.render()?;
    assert!(screen[FOOTER].ends_with("Failed to update records: injected failure"));
    assert!(!screen[2].contains("●"));

    h.ctrl('o')?;
    assert_eq!(h.app.store.error(), None);
    Ok(())
}

#[test]
fn bulk_actions_need_a_selection() -> Result<()> {
    let mut h = TestHarness::loaded(records(3), WIDTH, HEIGHT)?;
    h.action(Action::MarkViewed)?;
    h.action(Action::MarkUnviewed)?;
    assert!(!h.app.store.is_mutating());
    assert_eq!(h.app.store.error(), None);
    assert_eq!(h.remote.patch_calls(), 0);
    Ok(())
}

#[test]
fn bulk_actions_wait_for_the_update_in_flight() -> Result<()> {
    let remote = LocalRemote::new(records(3)).with_latency(Duration::ZERO, Duration::from_millis(100));
    let mut h = TestHarness::with_remote(remote, RosterOptions::default().build(), WIDTH, HEIGHT)?;
    h.reload()?;

    h.action(Action::Toggle)?;
    h.action(Action::MarkViewed)?;
    assert!(h.app.store.is_mutating());

    h.action(Action::Down(1))?;
    h.action(Action::Toggle)?;
    h.action(Action::MarkViewed)?;
    assert!(!h.app.store.is_viewed("1"));
    assert!(h.app.store.is_selected("1"));

    let screen = h.render()?;
    assert!(screen[FOOTER].contains("updating"));

    h.wait_until(|app| !app.store.is_mutating())?;
    assert_eq!(h.remote.patch_calls(), 1);
    assert!(h.app.store.is_viewed("0"));
    Ok(())
}

#[test]
fn select_all_acts_on_visible_rows() -> Result<()> {
    let mut h = TestHarness::loaded(records(6), WIDTH, HEIGHT)?;
    h.ctrl('t')?;
    assert_eq!(h.app.store.selection().len(), 6);
    let screen = h.render()?;
    assert!(screen[1].contains("[x]"));

    h.action(Action::ToggleHealth(Health::Healthy))?;
    assert_eq!(h.view_ids(), vec!["0", "3"]);
    h.ctrl('t')?;
    // hidden selections survive
    assert_eq!(h.app.store.selection().len(), 4);
    let screen = h.render()?;
    assert!(screen[1].contains("[ ]"));

    h.action(Action::ClearFilters)?;
    let screen = h.render()?;
    assert!(screen[1].contains("[-]"));

    h.ctrl('d')?;
    assert!(h.app.store.selection().is_empty());
    Ok(())
}

#[test]
fn load_failure_then_reload() -> Result<()> {
    let mut h = TestHarness::new(records(3), WIDTH, HEIGHT)?;
    h.remote.set_fail_fetch(true);
    h.reload()?;
    let screen = h.render()?;
    assert!(
        screen
            .iter()
            .any(|l| l.trim() == "Error: Failed to load records: injected failure")
    );

    h.remote.set_fail_fetch(false);
    h.ctrl('r')?;
    h.wait_until(|app| !app.store.is_loading())?;
    let screen = h.render()?;
    assert!(screen[2].contains("ninja-0"));
    assert_eq!(h.app.store.error(), None);
    assert_eq!(h.remote.fetch_calls(), 2);
    Ok(())
}

#[test]
fn loading_placeholder() -> Result<()> {
    let remote = LocalRemote::new(records(3)).with_latency(Duration::from_millis(50), Duration::ZERO);
    let mut h = TestHarness::with_remote(remote, RosterOptions::default().build(), WIDTH, HEIGHT)?;
    h.action(Action::Reload)?;
    assert!(h.app.store.is_loading());
    let screen = h.render()?;
    assert!(screen[2].trim() == "Loading records...");
    assert!(screen[3].starts_with("░"));

    h.wait_until(|app| !app.store.is_loading())?;
    let screen = h.render()?;
    assert!(screen[2].contains("ninja-0"));
    Ok(())
}

#[test]
fn initial_query_from_options() -> Result<()> {
    let options = RosterOptionsBuilder::default().query("ninja-2").build()?;
    let mut h = TestHarness::with_options(records(30), options, WIDTH, HEIGHT)?;
    h.reload()?;
    assert_eq!(h.view_ids().len(), 11);
    let screen = h.render()?;
    assert!(screen[0].starts_with("> ninja-2"));
    Ok(())
}
