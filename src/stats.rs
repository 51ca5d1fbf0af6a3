//! Pure statistics over an ordered (newest-first) solve history.
//!
//! Callers filter by puzzle type before invoking anything here; the
//! engine itself is stateless. Averages follow the usual speedcubing
//! "olympic" rule: drop the single best and worst of a window, average
//! the rest, and treat the whole window as a DNF once two or more of
//! its solves are DNFs.

use std::cmp::Ordering;

use itertools::Itertools;

use crate::solve::Solve;
use crate::util::mean;

/// Best/worst/mean over the finite (non-DNF) portion of a history.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimpleStats {
    pub best: Option<f64>,
    pub worst: Option<f64>,
    pub mean: Option<f64>,
}

/// Best and worst finite trimmed average over every contiguous window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RollingExtremes {
    pub best: Option<f64>,
    pub worst: Option<f64>,
}

/// Everything the stats panel shows, computed in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionStats {
    pub simple: SimpleStats,
    pub ao5: Option<f64>,
    pub ao12: Option<f64>,
    pub ao5_extremes: RollingExtremes,
    pub ao12_extremes: RollingExtremes,
}

fn adjusted_times(solves: &[Solve]) -> Vec<f64> {
    solves.iter().map(Solve::adjusted_time_ms).collect()
}

fn cmp_times(a: &f64, b: &f64) -> Ordering {
    // Adjusted times are never NaN, so +inf sorts last and the sort
    // stays stable for exact ties.
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

pub fn simple_stats(solves: &[Solve]) -> SimpleStats {
    let finite: Vec<f64> = adjusted_times(solves)
        .into_iter()
        .filter(|t| t.is_finite())
        .collect();

    SimpleStats {
        best: finite.iter().copied().min_by(cmp_times),
        worst: finite.iter().copied().max_by(cmp_times),
        mean: mean(&finite),
    }
}

/// Trimmed ("olympic") average of one window: drop the single lowest
/// and single highest adjusted time, average the remainder.
///
/// Returns `None` for windows of fewer than 3 solves; returns
/// `+inf` when 2 or more of the window's solves are DNFs, since the
/// average itself then counts as a DNF.
pub fn trimmed_average(window: &[Solve]) -> Option<f64> {
    if window.len() < 3 {
        return None;
    }

    let times = adjusted_times(window);
    if times.iter().filter(|t| t.is_infinite()).count() >= 2 {
        return Some(f64::INFINITY);
    }

    let sorted: Vec<f64> = times.into_iter().sorted_by(cmp_times).collect();
    mean(&sorted[1..sorted.len() - 1])
}

/// Trimmed average of the `n` most recent solves (history is
/// newest-first, so that is the leading slice). `None` while fewer
/// than `n` solves exist.
pub fn current_average(solves: &[Solve], n: usize) -> Option<f64> {
    if solves.len() < n {
        return None;
    }
    trimmed_average(&solves[..n])
}

/// Slide a window of size `n` over the whole history and keep the
/// minimum and maximum *finite* trimmed average seen. Windows whose
/// average is a DNF are skipped for both extremes, so the worst
/// average is never reported as DNF.
pub fn rolling_extremes(solves: &[Solve], n: usize) -> RollingExtremes {
    if n < 3 || solves.len() < n {
        return RollingExtremes::default();
    }

    let mut extremes = RollingExtremes::default();
    for window in solves.windows(n) {
        let avg = match trimmed_average(window) {
            Some(avg) if avg.is_finite() => avg,
            _ => continue,
        };
        extremes.best = Some(extremes.best.map_or(avg, |b| b.min(avg)));
        extremes.worst = Some(extremes.worst.map_or(avg, |w| w.max(avg)));
    }
    extremes
}

pub fn session_stats(solves: &[Solve]) -> SessionStats {
    SessionStats {
        simple: simple_stats(solves),
        ao5: current_average(solves, 5),
        ao12: current_average(solves, 12),
        ao5_extremes: rolling_extremes(solves, 5),
        ao12_extremes: rolling_extremes(solves, 12),
    }
}
