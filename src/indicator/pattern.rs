//! Timed on/off cadences.
//!
//! A [`FlashPattern`] is the only diagnostic channel a headless unit has, so
//! each bring-up failure class gets its own cadence. Durations follow the
//! original LED library: long 500 ms, medium 250 ms, short 100 ms.
//!
//! # Example
//!
//! ```
//! use status_bringup::indicator::FlashPattern;
//!
//! let pattern = FlashPattern::new(250, 250, 4).unwrap();
//! assert_eq!(pattern.total_ms(), 2_000);
//! assert!(FlashPattern::new(0, 250, 4).is_err());
//! ```

use std::fmt;

/// Long half-cycle in milliseconds.
pub const DUR_LONG_MS: u32 = 500;

/// Medium half-cycle in milliseconds.
pub const DUR_MED_MS: u32 = 250;

/// Short half-cycle in milliseconds.
pub const DUR_SHORT_MS: u32 = 100;

/// Repetitions used by the three-LED indicator board.
pub const REPEAT_STANDARD: u32 = 20;

/// Repetitions used by the two-LED notifier board.
pub const REPEAT_SHORT: u32 = 10;

/// A bounded on/off cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashPattern {
    on_ms: u32,
    off_ms: u32,
    repeat: u32,
}

impl FlashPattern {
    /// Slow cadence, signals peripheral or driver init failure.
    pub const SLOW: Self = Self::unchecked(DUR_LONG_MS, DUR_LONG_MS, REPEAT_STANDARD);

    /// Medium cadence, signals association failure.
    pub const MEDIUM: Self = Self::unchecked(DUR_MED_MS, DUR_MED_MS, REPEAT_STANDARD);

    /// Fast cadence, signals probe failure.
    pub const FAST: Self = Self::unchecked(DUR_SHORT_MS, DUR_SHORT_MS, REPEAT_STANDARD);

    /// Short low-intensity "thinking" flash shown before the probe.
    pub const PROGRESS: Self = Self::unchecked(DUR_SHORT_MS, DUR_MED_MS, REPEAT_SHORT);

    /// Success confirmation used when the plan flashes instead of holding.
    pub const CONFIRM: Self = Self::unchecked(DUR_MED_MS, DUR_MED_MS, REPEAT_SHORT);

    /// Fixed half-cycle of the initialization self-test blink.
    pub const SELF_TEST: Self = Self::unchecked(DUR_MED_MS, DUR_MED_MS, 1);

    const fn unchecked(on_ms: u32, off_ms: u32, repeat: u32) -> Self {
        Self {
            on_ms,
            off_ms,
            repeat,
        }
    }

    /// Create a pattern, rejecting zero durations and zero repetitions.
    pub fn new(on_ms: u32, off_ms: u32, repeat: u32) -> Result<Self, PatternError> {
        if on_ms == 0 {
            return Err(PatternError::ZeroOnDuration);
        }
        if off_ms == 0 {
            return Err(PatternError::ZeroOffDuration);
        }
        if repeat == 0 {
            return Err(PatternError::ZeroRepeat);
        }
        Ok(Self::unchecked(on_ms, off_ms, repeat))
    }

    /// Same cadence with a different repetition count.
    ///
    /// A zero count is clamped to one.
    pub const fn with_repeat(self, repeat: u32) -> Self {
        let repeat = if repeat == 0 { 1 } else { repeat };
        Self::unchecked(self.on_ms, self.off_ms, repeat)
    }

    /// On duration in milliseconds.
    pub const fn on_ms(&self) -> u32 {
        self.on_ms
    }

    /// Off duration in milliseconds.
    pub const fn off_ms(&self) -> u32 {
        self.off_ms
    }

    /// Number of on/off cycles.
    pub const fn repeat(&self) -> u32 {
        self.repeat
    }

    /// Duration of a single on/off cycle in milliseconds.
    pub const fn period_ms(&self) -> u64 {
        self.on_ms as u64 + self.off_ms as u64
    }

    /// How long [`crate::indicator::Indicator::flash`] blocks for this pattern.
    pub const fn total_ms(&self) -> u64 {
        self.period_ms() * self.repeat as u64
    }
}

impl fmt::Display for FlashPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}ms x{}", self.on_ms, self.off_ms, self.repeat)
    }
}

/// Invalid pattern parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternError {
    /// On duration was zero.
    ZeroOnDuration,
    /// Off duration was zero.
    ZeroOffDuration,
    /// Repeat count was zero.
    ZeroRepeat,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroOnDuration => write!(f, "on duration must be greater than zero"),
            Self::ZeroOffDuration => write!(f, "off duration must be greater than zero"),
            Self::ZeroRepeat => write!(f, "repeat count must be at least one"),
        }
    }
}

impl std::error::Error for PatternError {}
