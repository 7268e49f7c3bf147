//! Status indicator LEDs.
//!
//! The indicator owns one output line per status role and drives observable
//! patterns on them. It makes no decisions of its own: the bring-up
//! orchestrator decides what to show, the indicator only shows it.
//!
//! Lines are write-only. The indicator keeps a shadow of the last level it
//! wrote but never reads a pin back.
//!
//! # Example
//!
//! ```ignore
//! use status_bringup::indicator::{Indicator, IndicatorLines, Role, SelfTest, FlashPattern};
//!
//! let lines = IndicatorLines::new(green, yellow, red);
//! let mut leds = Indicator::new(lines, delay, SelfTest::Blink)?;
//! leds.flash(Role::Failure, FlashPattern::SLOW)?;
//! leds.hold(Role::Failure)?;
//! ```

mod pattern;

pub use pattern::{
    FlashPattern, PatternError, DUR_LONG_MS, DUR_MED_MS, DUR_SHORT_MS, REPEAT_SHORT,
    REPEAT_STANDARD,
};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, ErrorKind, OutputPin};
use log::{debug, trace};
use std::fmt;

/// Number of steps in the chase self-test.
const CYCLE_STEPS: u32 = 30;

/// Duration of one chase self-test step in milliseconds.
const CYCLE_STEP_MS: u32 = DUR_MED_MS;

/// Semantic meaning of an indicator line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Green.
    Success,
    /// Yellow.
    Warning,
    /// Red.
    Failure,
}

impl Role {
    /// All roles in line order.
    pub const ALL: [Role; 3] = [Role::Success, Role::Warning, Role::Failure];

    /// Diagnostic label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Failure => "failure",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Success => 0,
            Self::Warning => 1,
            Self::Failure => 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Level of a line as last written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    On,
    Off,
}

/// Self-test run once while the indicator is initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelfTest {
    /// No self-test.
    None,
    /// One 250/250 ms blink per line, in role order.
    #[default]
    Blink,
    /// Rotating chase across all lines, 30 steps of 250 ms.
    Cycle,
}

/// The output lines backing each role.
///
/// One field per role, so every role maps to exactly one line.
pub struct IndicatorLines<P> {
    pub success: P,
    pub warning: P,
    pub failure: P,
}

impl<P> IndicatorLines<P> {
    pub fn new(success: P, warning: P, failure: P) -> Self {
        Self {
            success,
            warning,
            failure,
        }
    }

    fn get_mut(&mut self, role: Role) -> &mut P {
        match role {
            Role::Success => &mut self.success,
            Role::Warning => &mut self.warning,
            Role::Failure => &mut self.failure,
        }
    }
}

/// Drives the status lines with blocking flash and hold operations.
pub struct Indicator<P, D> {
    lines: IndicatorLines<P>,
    delay: D,
    states: [LineState; 3],
}

impl<P, D> Indicator<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Initialize every line to Off and run the requested self-test.
    ///
    /// # Errors
    ///
    /// Returns the first pin error. Callers treat this as fatal.
    pub fn new(
        lines: IndicatorLines<P>,
        delay: D,
        self_test: SelfTest,
    ) -> Result<Self, IndicatorError> {
        let mut indicator = Self {
            lines,
            delay,
            states: [LineState::Off; 3],
        };
        indicator.all_off()?;

        match self_test {
            SelfTest::None => {}
            SelfTest::Blink => {
                for role in Role::ALL {
                    indicator.flash(role, FlashPattern::SELF_TEST)?;
                }
            }
            SelfTest::Cycle => indicator.run_cycle()?,
        }

        debug!("Indicator initialized ({:?} self-test)", self_test);
        Ok(indicator)
    }

    /// Blink `role` according to `pattern`, blocking until done.
    ///
    /// The line is Off when this returns.
    pub fn flash(&mut self, role: Role, pattern: FlashPattern) -> Result<(), IndicatorError> {
        debug!("Flash {} {}", role, pattern);
        for _ in 0..pattern.repeat() {
            self.set(role, LineState::On)?;
            self.delay.delay_ms(pattern.on_ms());
            self.set(role, LineState::Off)?;
            self.delay.delay_ms(pattern.off_ms());
        }
        Ok(())
    }

    /// Switch `role` on and leave it on.
    pub fn hold(&mut self, role: Role) -> Result<(), IndicatorError> {
        debug!("Hold {}", role);
        self.set(role, LineState::On)
    }

    /// Switch `role` off.
    pub fn off(&mut self, role: Role) -> Result<(), IndicatorError> {
        self.set(role, LineState::Off)
    }

    /// Switch every line off.
    pub fn all_off(&mut self) -> Result<(), IndicatorError> {
        for role in Role::ALL {
            self.set(role, LineState::Off)?;
        }
        Ok(())
    }

    /// Switch every line on.
    pub fn all_on(&mut self) -> Result<(), IndicatorError> {
        for role in Role::ALL {
            self.set(role, LineState::On)?;
        }
        Ok(())
    }

    /// Last level written to `role`.
    pub fn state(&self, role: Role) -> LineState {
        self.states[role.index()]
    }

    fn run_cycle(&mut self) -> Result<(), IndicatorError> {
        for step in 0..CYCLE_STEPS {
            for role in Role::ALL {
                // Each line is dark on a different third of the rotation.
                let dark_step = (role.index() as u32 + 2) % 3;
                let state = if step % 3 == dark_step {
                    LineState::Off
                } else {
                    LineState::On
                };
                self.set(role, state)?;
            }
            self.delay.delay_ms(CYCLE_STEP_MS);
        }
        self.all_off()
    }

    fn set(&mut self, role: Role, state: LineState) -> Result<(), IndicatorError> {
        let pin = self.lines.get_mut(role);
        let result = match state {
            LineState::On => pin.set_high(),
            LineState::Off => pin.set_low(),
        };
        result.map_err(|e| IndicatorError {
            role,
            kind: e.kind(),
        })?;
        self.states[role.index()] = state;
        trace!("LED {} -> {:?}", role, state);
        Ok(())
    }
}

/// A write to an indicator line failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorError {
    /// Line that failed.
    pub role: Role,
    /// Error category reported by the pin driver.
    pub kind: ErrorKind,
}

impl fmt::Display for IndicatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to drive {} line: {:?}", self.role, self.kind)
    }
}

impl std::error::Error for IndicatorError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, FailingPin, SimBoard};

    // ==================== Initialization Tests ====================

    #[test]
    fn test_new_without_self_test_only_switches_off() {
        let board = SimBoard::new();
        let indicator = Indicator::new(board.lines(), board.delay(), SelfTest::None).unwrap();

        assert_eq!(board.clock_ms(), 0);
        for role in Role::ALL {
            assert_eq!(indicator.state(role), LineState::Off);
            assert_eq!(board.writes(role), vec![(0, false)]);
        }
    }

    #[test]
    fn test_blink_self_test_visits_each_line_once() {
        let board = SimBoard::new();
        let indicator = Indicator::new(board.lines(), board.delay(), SelfTest::Blink).unwrap();

        assert_eq!(board.writes(Role::Success), vec![(0, false), (0, true), (250, false)]);
        assert_eq!(
            board.writes(Role::Warning),
            vec![(0, false), (500, true), (750, false)]
        );
        assert_eq!(
            board.writes(Role::Failure),
            vec![(0, false), (1000, true), (1250, false)]
        );
        assert_eq!(board.clock_ms(), 1500);
        for role in Role::ALL {
            assert_eq!(indicator.state(role), LineState::Off);
        }
    }

    #[test]
    fn test_cycle_self_test_rotates_dark_line() {
        let board = SimBoard::new();
        Indicator::new(board.lines(), board.delay(), SelfTest::Cycle).unwrap();

        assert_eq!(board.clock_ms(), 30 * 250);

        // Step 0: yellow dark, step 1: red dark, step 2: green dark.
        assert_eq!(board.level_at(Role::Success, 0), Some(true));
        assert_eq!(board.level_at(Role::Warning, 0), Some(false));
        assert_eq!(board.level_at(Role::Failure, 0), Some(true));

        assert_eq!(board.level_at(Role::Failure, 250), Some(false));
        assert_eq!(board.level_at(Role::Warning, 250), Some(true));

        assert_eq!(board.level_at(Role::Success, 500), Some(false));

        for role in Role::ALL {
            assert_eq!(board.level(role), Some(false));
        }
    }

    // ==================== Flash / Hold Tests ====================

    #[test]
    fn test_flash_performs_exact_cycles_and_ends_off() {
        let board = SimBoard::new();
        let mut indicator = Indicator::new(board.lines(), board.delay(), SelfTest::None).unwrap();
        board.clear();

        let pattern = FlashPattern::new(30, 70, 4).unwrap();
        indicator.flash(Role::Warning, pattern).unwrap();

        let writes = board.writes(Role::Warning);
        assert_eq!(writes.len(), 8);
        assert_eq!(writes.iter().filter(|(_, on)| *on).count(), 4);
        assert_eq!(writes[0], (0, true));
        assert_eq!(writes[1], (30, false));
        assert_eq!(writes[2], (100, true));
        assert_eq!(*writes.last().unwrap(), (330, false));
        assert_eq!(board.clock_ms(), pattern.total_ms());
        assert_eq!(indicator.state(Role::Warning), LineState::Off);
        assert!(board.writes(Role::Success).is_empty());
        assert!(board.writes(Role::Failure).is_empty());
    }

    #[test]
    fn test_hold_is_immediate_and_idempotent() {
        let board = SimBoard::new();
        let mut indicator = Indicator::new(board.lines(), board.delay(), SelfTest::None).unwrap();

        indicator.hold(Role::Success).unwrap();
        indicator.hold(Role::Success).unwrap();

        assert_eq!(board.clock_ms(), 0);
        assert_eq!(board.level(Role::Success), Some(true));
        assert_eq!(indicator.state(Role::Success), LineState::On);
    }

    #[test]
    fn test_flash_after_hold_leaves_line_off() {
        let board = SimBoard::new();
        let mut indicator = Indicator::new(board.lines(), board.delay(), SelfTest::None).unwrap();

        indicator.hold(Role::Failure).unwrap();
        indicator.flash(Role::Failure, FlashPattern::FAST).unwrap();

        assert_eq!(indicator.state(Role::Failure), LineState::Off);
        assert_eq!(board.level(Role::Failure), Some(false));
    }

    #[test]
    fn test_all_on_all_off() {
        let board = SimBoard::new();
        let mut indicator = Indicator::new(board.lines(), board.delay(), SelfTest::None).unwrap();

        indicator.all_on().unwrap();
        for role in Role::ALL {
            assert_eq!(indicator.state(role), LineState::On);
        }

        indicator.off(Role::Warning).unwrap();
        assert_eq!(board.level(Role::Warning), Some(false));

        indicator.all_off().unwrap();
        for role in Role::ALL {
            assert_eq!(board.level(role), Some(false));
        }
    }

    // ==================== Error Tests ====================

    #[test]
    fn test_pin_error_is_reported_with_role() {
        let board = SimBoard::new();
        let lines = IndicatorLines::new(FailingPin::ok(), FailingPin::broken(), FailingPin::ok());

        let result = Indicator::new(lines, board.delay(), SelfTest::None);
        let err = result.err().unwrap();
        assert_eq!(err.role, Role::Warning);
        assert_eq!(err.kind, ErrorKind::Other);
        assert!(err.to_string().contains("warning"));
    }

    #[test]
    fn test_events_are_recorded_in_order() {
        let board = SimBoard::new();
        let mut indicator = Indicator::new(board.lines(), board.delay(), SelfTest::None).unwrap();
        board.clear();

        indicator.hold(Role::Warning).unwrap();
        indicator.hold(Role::Failure).unwrap();

        assert_eq!(
            board.events(),
            vec![
                Event::Led(Role::Warning, true),
                Event::Led(Role::Failure, true)
            ]
        );
    }
}
