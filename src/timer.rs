//! The solve lifecycle: idle -> (optional inspection) -> armed-hold ->
//! running -> back to idle with a finished attempt.
//!
//! The machine is driven from the outside by press/release edges and a
//! periodic display tick carrying the current `Instant`. Inspection
//! seconds are derived from those instants and processed at most once
//! each, so the 8/12 s warnings and the 15/17 s thresholds fire exactly
//! once even when ticks arrive late or coalesced. All deadlines
//! (warning flash, delayed scramble refresh) live in plain fields that
//! every exit transition clears, so there is nothing to leak or cancel
//! twice.

use std::time::{Duration, Instant};

/// Seconds into inspection at which the display flashes a warning.
pub const INSPECTION_WARNING_SECS: [u64; 2] = [8, 12];
/// Seconds after which an un-started solve carries a +2 penalty.
pub const INSPECTION_PENALTY_SECS: u64 = 15;
/// Seconds after which the attempt becomes an automatic DNF.
pub const INSPECTION_DNF_SECS: u64 = 17;
/// How long each inspection warning flash stays visible.
pub const WARNING_FLASH: Duration = Duration::from_millis(500);
/// Delay before the scramble refreshes after an automatic DNF, so the
/// DNF verdict stays readable for a moment.
pub const SCRAMBLE_REFRESH_DELAY: Duration = Duration::from_secs(1);

/// A press-and-release pair is the single abstract input, whatever the
/// physical source (spacebar, touch, button).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEdge {
    PressStart,
    PressEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Inspecting {
        started_at: Instant,
        /// Last whole inspection second already processed.
        last_whole_sec: u64,
    },
    ArmedHold,
    Running {
        started_at: Instant,
    },
}

/// A finished attempt, ready to be recorded as a `Solve`.
/// `raw_time_ms` is `None` for an inspection-overrun DNF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveResult {
    pub raw_time_ms: Option<u64>,
    pub penalty_units: u8,
    pub is_dnf: bool,
}

#[derive(Debug)]
pub struct TimerMachine {
    phase: Phase,
    inspection_enabled: bool,
    pending_plus_two: bool,
    warning_until: Option<Instant>,
    scramble_refresh_at: Option<Instant>,
}

impl TimerMachine {
    pub fn new(inspection_enabled: bool) -> Self {
        Self {
            phase: Phase::Idle,
            inspection_enabled,
            pending_plus_two: false,
            warning_until: None,
            scramble_refresh_at: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    /// Puzzle and session switching is locked while a solve is in
    /// flight.
    pub fn can_switch_puzzle(&self) -> bool {
        self.is_idle()
    }

    /// A +2 accumulated during inspection that will attach to the next
    /// finished solve.
    pub fn pending_plus_two(&self) -> bool {
        self.pending_plus_two
    }

    pub fn warning_active(&self, now: Instant) -> bool {
        self.warning_until.is_some_and(|until| now < until)
    }

    /// Elapsed wall time shown on the big display while running.
    pub fn display_ms(&self, now: Instant) -> u64 {
        match self.phase {
            Phase::Running { started_at } => now.duration_since(started_at).as_millis() as u64,
            _ => 0,
        }
    }

    /// Seconds left on the inspection countdown, negative once into
    /// the penalty window. `None` outside of inspection.
    pub fn inspection_secs_left(&self, now: Instant) -> Option<i64> {
        match self.phase {
            Phase::Inspecting { started_at, .. } => {
                let elapsed = now.duration_since(started_at).as_secs() as i64;
                Some(INSPECTION_PENALTY_SECS as i64 - elapsed)
            }
            _ => None,
        }
    }

    /// A delayed scramble refresh is still outstanding (the display is
    /// holding the DNF verdict on screen).
    pub fn refresh_pending(&self) -> bool {
        self.scramble_refresh_at.is_some()
    }

    /// True exactly once after the post-DNF refresh delay has elapsed;
    /// the caller regenerates the scramble in response.
    pub fn take_scramble_refresh(&mut self, now: Instant) -> bool {
        match self.scramble_refresh_at {
            Some(at) if now >= at => {
                self.scramble_refresh_at = None;
                true
            }
            _ => false,
        }
    }

    /// Dropping a deadline that already fired (or never existed) is
    /// fine; callers invoke this on puzzle switches unconditionally.
    pub fn cancel_deadlines(&mut self) {
        self.warning_until = None;
        self.scramble_refresh_at = None;
    }

    /// Feed one input edge. Disallowed edges for the current phase are
    /// silently ignored. Returns a finished attempt when a running
    /// solve is stopped.
    pub fn handle_edge(&mut self, edge: InputEdge, now: Instant) -> Option<SolveResult> {
        match (edge, self.phase) {
            (InputEdge::PressStart, Phase::Idle) => {
                self.cancel_deadlines();
                self.pending_plus_two = false;
                self.phase = if self.inspection_enabled {
                    Phase::Inspecting {
                        started_at: now,
                        last_whole_sec: 0,
                    }
                } else {
                    Phase::ArmedHold
                };
                None
            }
            (InputEdge::PressStart, Phase::Inspecting { .. }) => {
                // Inspection ticker stops here; any pending +2 rides
                // along into the solve.
                self.warning_until = None;
                self.phase = Phase::ArmedHold;
                None
            }
            (InputEdge::PressEnd, Phase::ArmedHold) => {
                self.phase = Phase::Running { started_at: now };
                None
            }
            (InputEdge::PressStart, Phase::Running { started_at }) => {
                let raw = now.duration_since(started_at).as_millis() as u64;
                let penalty_units = u8::from(self.pending_plus_two);
                self.pending_plus_two = false;
                self.phase = Phase::Idle;
                Some(SolveResult {
                    raw_time_ms: Some(raw),
                    penalty_units,
                    is_dnf: false,
                })
            }
            _ => None,
        }
    }

    /// Advance time-driven behavior. Returns an automatic DNF when
    /// inspection overruns its 17th second.
    pub fn on_tick(&mut self, now: Instant) -> Option<SolveResult> {
        if self.warning_until.is_some_and(|until| now >= until) {
            self.warning_until = None;
        }

        let Phase::Inspecting {
            started_at,
            last_whole_sec,
        } = self.phase
        else {
            return None;
        };

        let elapsed = now.duration_since(started_at).as_secs();
        for sec in (last_whole_sec + 1)..=elapsed {
            if INSPECTION_WARNING_SECS.contains(&sec) {
                self.warning_until = Some(now + WARNING_FLASH);
            }
            if sec >= INSPECTION_PENALTY_SECS {
                self.pending_plus_two = true;
            }
            if sec >= INSPECTION_DNF_SECS {
                // Force-complete: no hold/release happens for this
                // attempt, and the countdown state is torn down before
                // the transition.
                self.pending_plus_two = false;
                self.warning_until = None;
                self.phase = Phase::Idle;
                self.scramble_refresh_at = Some(now + SCRAMBLE_REFRESH_DELAY);
                return Some(SolveResult {
                    raw_time_ms: None,
                    penalty_units: 0,
                    is_dnf: true,
                });
            }
        }
        self.phase = Phase::Inspecting {
            started_at,
            last_whole_sec: elapsed,
        };
        None
    }
}
