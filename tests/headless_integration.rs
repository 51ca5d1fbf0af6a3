use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use cubik::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use cubik::session::SessionStore;
use cubik::solve::PuzzleType;
use cubik::timer::{InputEdge, TimerMachine};

// Headless integration using the internal runtime + timer without a
// TTY: a spacebar press/release pair starts the timer, a second press
// stops it, and the finished solve lands in the store.
#[test]
fn headless_solve_flow_records_a_solve() {
    let mut timer = TimerMachine::new(false);
    let mut store = SessionStore::with_default_session();
    let t0 = Instant::now();

    let (tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let ticker = FixedTicker::new(Duration::from_millis(5));
    let runner = Runner::new(es, ticker);

    // Press, release, then press again to stop.
    tx.send(AppEvent::Key(KeyEvent::new(
        KeyCode::Char(' '),
        KeyModifiers::NONE,
    )))
    .unwrap();

    let mut offset = Duration::ZERO;
    let mut presses = 0u32;
    for _ in 0..100u32 {
        match runner.step() {
            AppEvent::Tick => {
                offset += Duration::from_millis(5);
                timer.on_tick(t0 + offset);
            }
            AppEvent::Resize => {}
            AppEvent::Key(_) => {
                presses += 1;
                match presses {
                    1 => {
                        timer.handle_edge(InputEdge::PressStart, t0 + offset);
                        timer.handle_edge(InputEdge::PressEnd, t0 + offset);
                        // Schedule the stopping press once running.
                        offset += Duration::from_millis(9_000);
                        tx.send(AppEvent::Key(KeyEvent::new(
                            KeyCode::Char(' '),
                            KeyModifiers::NONE,
                        )))
                        .unwrap();
                    }
                    _ => {
                        if let Some(result) =
                            timer.handle_edge(InputEdge::PressStart, t0 + offset)
                        {
                            store.record_solve(
                                PuzzleType::ThreeByThree,
                                "R U R' U'".to_string(),
                                result.raw_time_ms.unwrap_or(0),
                                result.penalty_units,
                            );
                        }
                        break;
                    }
                }
            }
        }
    }

    assert!(timer.is_idle());
    let solves = store.active().solves_of(PuzzleType::ThreeByThree);
    assert_eq!(solves.len(), 1);
    assert_eq!(solves[0].raw_time_ms, Some(9_000));
}

// Ticks alone (no further input) must carry inspection all the way to
// the automatic DNF.
#[test]
fn headless_inspection_overrun_becomes_a_dnf() {
    let mut timer = TimerMachine::new(true);
    let mut store = SessionStore::with_default_session();
    let t0 = Instant::now();

    timer.handle_edge(InputEdge::PressStart, t0);

    let (_tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let ticker = FixedTicker::new(Duration::from_millis(1));
    let runner = Runner::new(es, ticker);

    let mut offset = Duration::ZERO;
    let mut recorded = false;
    for _ in 0..50u32 {
        match runner.step() {
            AppEvent::Tick => {
                // Each tick advances simulated time by one second.
                offset += Duration::from_secs(1);
                if let Some(result) = timer.on_tick(t0 + offset) {
                    assert!(result.is_dnf);
                    assert_eq!(result.raw_time_ms, None);
                    store.record_dnf(PuzzleType::ThreeByThree, "scramble".to_string());
                    recorded = true;
                    break;
                }
            }
            _ => unreachable!("no keys were sent"),
        }
    }

    assert!(recorded, "inspection should have overrun into a DNF");
    assert!(timer.is_idle());
    let solves = store.active().solves_of(PuzzleType::ThreeByThree);
    assert_eq!(solves.len(), 1);
    assert!(solves[0].is_dnf);
    assert_eq!(solves[0].adjusted_time_ms(), f64::INFINITY);

    // The deferred scramble refresh fires exactly once.
    assert!(timer.take_scramble_refresh(t0 + offset + Duration::from_secs(2)));
    assert!(!timer.take_scramble_refresh(t0 + offset + Duration::from_secs(3)));
}

// Persistence round trip through the storage layer with solves from a
// headless run, including stats over the reloaded history.
#[test]
fn headless_history_survives_a_reload() {
    use cubik::stats::session_stats;
    use cubik::storage::{FileHistoryStore, HistoryStore};

    let dir = tempfile::tempdir().unwrap();
    let backend = FileHistoryStore::with_paths(
        dir.path().join("sessions.json"),
        dir.path().join("solves.json"),
    );

    let mut store = SessionStore::with_default_session();
    for (i, ms) in [12_000, 13_000, 11_500, 14_000, 12_500].iter().enumerate() {
        store.record_solve(
            PuzzleType::ThreeByThree,
            format!("scramble {i}"),
            *ms,
            0,
        );
    }
    backend.save(&store).unwrap();

    let reloaded = backend.load();
    assert_eq!(reloaded, store);

    let solves = reloaded.active().solves_of(PuzzleType::ThreeByThree);
    let stats = session_stats(&solves);
    assert_eq!(stats.ao5, Some(12_500.0));
    assert_eq!(stats.simple.best, Some(11_500.0));
    assert_eq!(stats.simple.worst, Some(14_000.0));
}
