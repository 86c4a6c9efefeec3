use crate::Scheduler;
use std::time::{Duration, Instant};

const INTERVAL: Duration = Duration::from_millis(16);

#[test]
fn fires_after_its_interval_and_repeats() {
    let t0 = Instant::now();
    let mut scheduler = Scheduler::new();
    let id = scheduler.schedule(INTERVAL, t0);

    assert!(scheduler.poll(t0).is_empty());
    assert_eq!(scheduler.poll(t0 + INTERVAL), vec![id]);
    assert!(scheduler.poll(t0 + INTERVAL).is_empty());
    assert_eq!(scheduler.poll(t0 + 2 * INTERVAL), vec![id]);
}

#[test]
fn cancel_is_synchronous_and_final() {
    let t0 = Instant::now();
    let mut scheduler = Scheduler::new();
    let id = scheduler.schedule(INTERVAL, t0);

    assert!(scheduler.cancel(id));
    assert!(!scheduler.is_scheduled(id));
    assert!(scheduler.poll(t0 + Duration::from_secs(10)).is_empty());
    assert!(!scheduler.cancel(id));
}

#[test]
fn due_timers_fire_in_registration_order() {
    let t0 = Instant::now();
    let mut scheduler = Scheduler::new();
    let a = scheduler.schedule(INTERVAL, t0);
    let b = scheduler.schedule(INTERVAL, t0);

    assert_eq!(scheduler.poll(t0 + INTERVAL), vec![a, b]);
}

#[test]
fn late_poll_fires_once_and_reschedules_from_now() {
    let t0 = Instant::now();
    let mut scheduler = Scheduler::new();
    let id = scheduler.schedule(INTERVAL, t0);

    let late = t0 + 10 * INTERVAL;
    assert_eq!(scheduler.poll(late), vec![id]);
    assert!(scheduler.poll(late).is_empty());
    assert_eq!(scheduler.poll(late + INTERVAL), vec![id]);
}

#[test]
fn next_deadline_tracks_the_earliest_timer() {
    let t0 = Instant::now();
    let mut scheduler = Scheduler::new();
    assert!(scheduler.next_deadline().is_none());

    scheduler.schedule(Duration::from_millis(100), t0);
    let fast = scheduler.schedule(INTERVAL, t0);
    assert_eq!(scheduler.next_deadline(), Some(t0 + INTERVAL));

    scheduler.cancel(fast);
    assert_eq!(
        scheduler.next_deadline(),
        Some(t0 + Duration::from_millis(100))
    );
}
