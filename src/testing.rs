//! Deterministic test doubles.
//!
//! A [`SimBoard`] owns a simulated clock and a shared event log. Pins, delays
//! and fake collaborators created from the same board all record into that
//! log, so a test can assert on the exact interleaving of LED writes and
//! collaborator calls, and on when each write happened.

use crate::config::{CountryCode, WifiCredentials};
use crate::indicator::{IndicatorLines, Role};
use crate::network::{AuthMode, NetworkError, NetworkStack};
use crate::platform::{PeripheralError, Peripherals};
use crate::probe::{ConnectivityProbe, ProbeRequest};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};
use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;
use std::time::Duration;

const NS_PER_MS: u64 = 1_000_000;

/// Collaborator entry points, as recorded by the fakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    PeripheralInit,
    DriverInit,
    StationMode,
    Associate,
    Probe,
    Teardown,
}

/// One entry in the board log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Line written high (`true`) or low.
    Led(Role, bool),
    Call(Call),
}

type Timeline = Vec<(u64, bool)>;

#[derive(Default)]
struct BoardState {
    clock_ns: u64,
    events: Vec<Event>,
    writes: [Timeline; 3],
    history: [Timeline; 3],
}

fn slot(role: Role) -> usize {
    match role {
        Role::Success => 0,
        Role::Warning => 1,
        Role::Failure => 2,
    }
}

/// Simulated clock plus shared event log.
#[derive(Clone, Default)]
pub struct SimBoard {
    state: Rc<RefCell<BoardState>>,
}

impl SimBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// One recording pin per role.
    pub fn lines(&self) -> IndicatorLines<SimPin> {
        IndicatorLines::new(
            self.pin(Role::Success),
            self.pin(Role::Warning),
            self.pin(Role::Failure),
        )
    }

    pub fn pin(&self, role: Role) -> SimPin {
        SimPin {
            board: self.clone(),
            role,
        }
    }

    /// Delay that advances the simulated clock instead of sleeping.
    pub fn delay(&self) -> SimDelay {
        SimDelay {
            board: self.clone(),
        }
    }

    pub fn clock_ms(&self) -> u64 {
        self.state.borrow().clock_ns / NS_PER_MS
    }

    /// Writes to `role` since the last [`clear`](Self::clear), as `(ms, level)`.
    pub fn writes(&self, role: Role) -> Vec<(u64, bool)> {
        self.state.borrow().writes[slot(role)].clone()
    }

    /// Last level written to `role`, if any.
    pub fn level(&self, role: Role) -> Option<bool> {
        self.state.borrow().history[slot(role)]
            .last()
            .map(|&(_, high)| high)
    }

    /// Level of `role` at `t_ms`: the last write at or before that time.
    pub fn level_at(&self, role: Role, t_ms: u64) -> Option<bool> {
        self.state.borrow().history[slot(role)]
            .iter()
            .take_while(|&&(at, _)| at <= t_ms)
            .last()
            .map(|&(_, high)| high)
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.borrow().events.clone()
    }

    /// Collaborator calls only, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state
            .borrow()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Call(call) => Some(*call),
                Event::Led(..) => None,
            })
            .collect()
    }

    /// Forget recorded events and writes. Clock and levels are kept.
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.events.clear();
        for writes in state.writes.iter_mut() {
            writes.clear();
        }
    }

    fn record_write(&self, role: Role, high: bool) {
        let mut state = self.state.borrow_mut();
        let at = state.clock_ns / NS_PER_MS;
        state.events.push(Event::Led(role, high));
        state.writes[slot(role)].push((at, high));
        state.history[slot(role)].push((at, high));
    }

    fn record_call(&self, call: Call) {
        self.state.borrow_mut().events.push(Event::Call(call));
    }

    fn advance(&self, ns: u64) {
        self.state.borrow_mut().clock_ns += ns;
    }
}

/// Output pin that records every write on its board.
pub struct SimPin {
    board: SimBoard,
    role: Role,
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.board.record_write(self.role, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.board.record_write(self.role, true);
        Ok(())
    }
}

/// Delay driven by the board clock.
pub struct SimDelay {
    board: SimBoard,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.board.advance(u64::from(ns));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.board.advance(u64::from(ms) * NS_PER_MS);
    }
}

/// Pin driver fault reported by [`FailingPin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinFault;

impl digital::Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Pin that rejects some or all writes.
#[derive(Debug, Default)]
pub struct FailingPin {
    fail_low: bool,
    fail_high: bool,
}

impl FailingPin {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn broken() -> Self {
        Self {
            fail_low: true,
            fail_high: true,
        }
    }

    /// Can be switched off but never on.
    pub fn fails_high() -> Self {
        Self {
            fail_low: false,
            fail_high: true,
        }
    }
}

impl ErrorType for FailingPin {
    type Error = PinFault;
}

impl OutputPin for FailingPin {
    fn set_low(&mut self) -> Result<(), PinFault> {
        if self.fail_low {
            Err(PinFault)
        } else {
            Ok(())
        }
    }

    fn set_high(&mut self) -> Result<(), PinFault> {
        if self.fail_high {
            Err(PinFault)
        } else {
            Ok(())
        }
    }
}

/// Peripheral init that records its call.
pub struct FakePeripherals {
    board: SimBoard,
    fail: bool,
}

impl FakePeripherals {
    pub fn new(board: &SimBoard) -> Self {
        Self {
            board: board.clone(),
            fail: false,
        }
    }

    pub fn failing(board: &SimBoard) -> Self {
        Self {
            board: board.clone(),
            fail: true,
        }
    }
}

impl Peripherals for FakePeripherals {
    fn init(&mut self) -> Result<(), PeripheralError> {
        self.board.record_call(Call::PeripheralInit);
        if self.fail {
            return Err(PeripheralError::TextSink("sink unavailable".into()));
        }
        Ok(())
    }
}

/// Network stack with switchable failures.
pub struct FakeNetwork {
    board: SimBoard,
    fail_driver: bool,
    fail_station_mode: bool,
    fail_associate: bool,
}

impl FakeNetwork {
    pub fn new(board: &SimBoard) -> Self {
        Self {
            board: board.clone(),
            fail_driver: false,
            fail_station_mode: false,
            fail_associate: false,
        }
    }

    pub fn failing_driver(mut self) -> Self {
        self.fail_driver = true;
        self
    }

    pub fn failing_station_mode(mut self) -> Self {
        self.fail_station_mode = true;
        self
    }

    /// Association times out.
    pub fn failing_associate(mut self) -> Self {
        self.fail_associate = true;
        self
    }
}

impl NetworkStack for FakeNetwork {
    fn driver_init(&mut self, _country: CountryCode) -> Result<(), NetworkError> {
        self.board.record_call(Call::DriverInit);
        if self.fail_driver {
            return Err(NetworkError::Driver("radio not responding".into()));
        }
        Ok(())
    }

    fn enable_station_mode(&mut self) -> Result<(), NetworkError> {
        self.board.record_call(Call::StationMode);
        if self.fail_station_mode {
            return Err(NetworkError::Driver("mode switch rejected".into()));
        }
        Ok(())
    }

    fn associate(
        &mut self,
        _credentials: &WifiCredentials,
        _auth: AuthMode,
        timeout: Duration,
    ) -> Result<(), NetworkError> {
        self.board.record_call(Call::Associate);
        if self.fail_associate {
            return Err(NetworkError::Timeout(timeout));
        }
        Ok(())
    }

    fn teardown(&mut self) {
        self.board.record_call(Call::Teardown);
    }
}

/// Probe with a fixed verdict.
pub struct FakeProbe {
    board: SimBoard,
    pass: bool,
}

impl FakeProbe {
    pub fn new(board: &SimBoard, pass: bool) -> Self {
        Self {
            board: board.clone(),
            pass,
        }
    }

    pub fn passing(board: &SimBoard) -> Self {
        Self::new(board, true)
    }

    pub fn failing(board: &SimBoard) -> Self {
        Self::new(board, false)
    }
}

impl ConnectivityProbe for FakeProbe {
    fn probe(&mut self, _request: &ProbeRequest<'_>) -> bool {
        self.board.record_call(Call::Probe);
        self.pass
    }
}
