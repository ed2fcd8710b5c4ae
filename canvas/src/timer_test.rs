use std::time::Duration;

use super::*;

const PERIOD: Duration = Duration::from_millis(50);

#[tokio::test(start_paused = true)]
async fn ticks_after_each_period() {
    let (mut timer, mut rx) = AutoRotateTimer::new(PERIOD);
    timer.start();
    assert!(timer.is_running());

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(rx.try_recv(), Ok(()));
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn unconsumed_ticks_coalesce() {
    let (mut timer, mut rx) = AutoRotateTimer::new(PERIOD);
    timer.start();
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(rx.try_recv(), Ok(()));
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_future_ticks() {
    let (mut timer, mut rx) = AutoRotateTimer::new(PERIOD);
    timer.start();
    timer.stop();
    assert!(!timer.is_running());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn sync_follows_flag_and_start_is_idempotent() {
    let (mut timer, _rx) = AutoRotateTimer::new(PERIOD);
    timer.sync(true);
    timer.sync(true);
    assert!(timer.is_running());
    timer.sync(false);
    assert!(!timer.is_running());
}

#[tokio::test(start_paused = true)]
async fn drop_stops_the_task() {
    let (mut timer, mut rx) = AutoRotateTimer::new(PERIOD);
    timer.start();
    drop(timer);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rx.recv().await.is_none());
}

#[test]
fn start_outside_runtime_is_a_no_op() {
    let (mut timer, _rx) = AutoRotateTimer::new(PERIOD);
    timer.start();
    assert!(!timer.is_running());
}
