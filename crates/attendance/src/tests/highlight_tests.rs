use super::*;

fn ids(values: &[i64]) -> BTreeSet<CompanyId> {
    values.iter().copied().map(CompanyId).collect()
}

#[tokio::test(start_paused = true)]
async fn highlight_clears_once_window_elapses() {
    let (events, mut rx) = broadcast::channel(8);
    let window = HighlightWindow::new(HIGHLIGHT_WINDOW, events);
    assert_eq!(window.duration(), Duration::from_millis(2000));

    window.arm(ids(&[1]));
    assert_eq!(window.highlighted(), ids(&[1]));

    tokio::time::sleep(Duration::from_millis(1999)).await;
    assert_eq!(window.highlighted(), ids(&[1]));

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(window.highlighted().is_empty());
    assert!(matches!(rx.try_recv(), Ok(BoardEvent::HighlightCleared)));
}

#[tokio::test(start_paused = true)]
async fn rearming_replaces_ids_and_restarts_window() {
    let (events, mut rx) = broadcast::channel(8);
    let window = HighlightWindow::new(HIGHLIGHT_WINDOW, events);

    window.arm(ids(&[1]));
    tokio::time::sleep(Duration::from_millis(1500)).await;
    window.arm(ids(&[2, 3]));
    assert_eq!(window.highlighted(), ids(&[2, 3]));

    // The first timer would have fired at 2000ms.
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(window.highlighted(), ids(&[2, 3]));
    assert!(rx.try_recv().is_err());

    tokio::time::sleep(Duration::from_millis(1001)).await;
    assert!(window.highlighted().is_empty());
    assert!(matches!(rx.try_recv(), Ok(BoardEvent::HighlightCleared)));
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn empty_change_set_leaves_running_window_alone() {
    let (events, _rx) = broadcast::channel(8);
    let window = HighlightWindow::new(HIGHLIGHT_WINDOW, events);

    window.arm(ids(&[4]));
    tokio::time::sleep(Duration::from_millis(500)).await;
    window.arm(BTreeSet::new());
    assert_eq!(window.highlighted(), ids(&[4]));

    tokio::time::sleep(Duration::from_millis(1501)).await;
    assert!(window.highlighted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_window_cancels_its_timer() {
    let (events, mut rx) = broadcast::channel(8);
    let window = HighlightWindow::new(HIGHLIGHT_WINDOW, events.clone());

    window.arm(ids(&[1]));
    drop(window);

    tokio::time::sleep(Duration::from_millis(5000)).await;
    assert!(rx.try_recv().is_err());
}
