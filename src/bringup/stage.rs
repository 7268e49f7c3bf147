//! Stages, states and the plan that orders them.

use crate::indicator::{FlashPattern, Role, REPEAT_SHORT};
use std::fmt;

/// One step of the bring-up sequence, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    PeripheralInit,
    NetworkDriverInit,
    NetworkAssociate,
    ConnectivityProbe,
}

impl Stage {
    /// All stages in canonical order.
    pub const ALL: [Stage; 4] = [
        Stage::PeripheralInit,
        Stage::NetworkDriverInit,
        Stage::NetworkAssociate,
        Stage::ConnectivityProbe,
    ];

    /// Diagnostic label.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PeripheralInit => "peripheral-init",
            Self::NetworkDriverInit => "network-driver-init",
            Self::NetworkAssociate => "network-associate",
            Self::ConnectivityProbe => "connectivity-probe",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Where the orchestrator is in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringupState {
    Idle,
    PeripheralInit,
    NetworkDriverInit,
    NetworkAssociate,
    ConnectivityProbe,
    Success,
    Failed,
}

impl BringupState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

impl From<Stage> for BringupState {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::PeripheralInit => Self::PeripheralInit,
            Stage::NetworkDriverInit => Self::NetworkDriverInit,
            Stage::NetworkAssociate => Self::NetworkAssociate,
            Stage::ConnectivityProbe => Self::ConnectivityProbe,
        }
    }
}

/// What the indicator shows when a stage fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureSignal {
    /// Line that flashes.
    pub role: Role,
    pub pattern: FlashPattern,
    /// Line held on before flashing, marking how far bring-up got.
    pub marker: Option<Role>,
    /// Keep `role` on once the flash is done.
    pub hold_after: bool,
}

impl FailureSignal {
    /// Flash `role` and leave it off.
    pub const fn flash(role: Role, pattern: FlashPattern) -> Self {
        Self {
            role,
            pattern,
            marker: None,
            hold_after: false,
        }
    }

    pub const fn with_marker(mut self, marker: Role) -> Self {
        self.marker = Some(marker);
        self
    }

    pub const fn then_hold(mut self) -> Self {
        self.hold_after = true;
        self
    }
}

/// What the indicator shows when every stage passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessSignal {
    /// Leave the line on.
    Hold(Role),
    /// Flash the line and leave it off.
    Flash(Role, FlashPattern),
}

/// A stage and its failure signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePlan {
    pub stage: Stage,
    pub on_failure: FailureSignal,
}

impl StagePlan {
    pub const fn new(stage: Stage, on_failure: FailureSignal) -> Self {
        Self { stage, on_failure }
    }
}

/// Ordered stage list plus progress and success signalling.
///
/// # Example
///
/// ```
/// use status_bringup::bringup::{BringupPlan, Stage};
///
/// let plan = BringupPlan::standard();
/// assert!(plan.validate().is_ok());
/// assert_eq!(plan.stages().len(), 4);
/// assert_eq!(plan.stages()[0].stage, Stage::PeripheralInit);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BringupPlan {
    stages: Vec<StagePlan>,
    progress: Option<FlashPattern>,
    on_success: SuccessSignal,
}

impl BringupPlan {
    /// Plan with the given stages, no progress flash, success held on.
    pub fn new(stages: Vec<StagePlan>) -> Self {
        Self {
            stages,
            progress: None,
            on_success: SuccessSignal::Hold(Role::Success),
        }
    }

    /// The three-LED board: all four stages, probe as the final gate.
    pub fn standard() -> Self {
        let init = FailureSignal::flash(Role::Failure, FlashPattern::SLOW);
        Self::new(vec![
            StagePlan::new(Stage::PeripheralInit, init),
            StagePlan::new(Stage::NetworkDriverInit, init),
            StagePlan::new(
                Stage::NetworkAssociate,
                FailureSignal::flash(Role::Failure, FlashPattern::MEDIUM),
            ),
            StagePlan::new(
                Stage::ConnectivityProbe,
                FailureSignal::flash(Role::Failure, FlashPattern::FAST)
                    .with_marker(Role::Warning)
                    .then_hold(),
            ),
        ])
        .with_progress(Some(FlashPattern::PROGRESS))
    }

    /// The two-LED notifier: stop once associated and flash success.
    pub fn association_only() -> Self {
        let init = FailureSignal::flash(
            Role::Failure,
            FlashPattern::SLOW.with_repeat(REPEAT_SHORT),
        );
        Self::new(vec![
            StagePlan::new(Stage::PeripheralInit, init),
            StagePlan::new(Stage::NetworkDriverInit, init),
            StagePlan::new(
                Stage::NetworkAssociate,
                FailureSignal::flash(Role::Failure, FlashPattern::MEDIUM.with_repeat(REPEAT_SHORT)),
            ),
        ])
        .with_success(SuccessSignal::Flash(Role::Success, FlashPattern::CONFIRM))
    }

    /// Flash shown on the Warning line right before the probe.
    pub fn with_progress(mut self, progress: Option<FlashPattern>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_success(mut self, on_success: SuccessSignal) -> Self {
        self.on_success = on_success;
        self
    }

    pub fn stages(&self) -> &[StagePlan] {
        &self.stages
    }

    pub fn progress(&self) -> Option<FlashPattern> {
        self.progress
    }

    pub fn on_success(&self) -> SuccessSignal {
        self.on_success
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.stages.iter().any(|s| s.stage == stage)
    }

    /// Check the plan can run.
    ///
    /// Stages must appear in canonical order without repeats, and association
    /// needs the driver brought up first.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.stages.is_empty() {
            return Err(PlanError::Empty);
        }

        for pair in self.stages.windows(2) {
            let (prev, next) = (pair[0].stage, pair[1].stage);
            if next == prev {
                return Err(PlanError::Duplicate(next));
            }
            if next < prev {
                return Err(PlanError::OutOfOrder {
                    stage: next,
                    after: prev,
                });
            }
        }

        if self.contains(Stage::NetworkAssociate) && !self.contains(Stage::NetworkDriverInit) {
            return Err(PlanError::MissingPrerequisite {
                stage: Stage::NetworkAssociate,
                requires: Stage::NetworkDriverInit,
            });
        }

        Ok(())
    }
}

impl Default for BringupPlan {
    fn default() -> Self {
        Self::standard()
    }
}

/// A plan that cannot run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanError {
    /// No stages.
    Empty,
    /// Stage listed twice.
    Duplicate(Stage),
    /// Stage listed after one that must follow it.
    OutOfOrder { stage: Stage, after: Stage },
    /// Stage listed without the stage it depends on.
    MissingPrerequisite { stage: Stage, requires: Stage },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "plan has no stages"),
            Self::Duplicate(stage) => write!(f, "stage {} listed more than once", stage),
            Self::OutOfOrder { stage, after } => {
                write!(f, "stage {} cannot run after {}", stage, after)
            }
            Self::MissingPrerequisite { stage, requires } => {
                write!(f, "stage {} requires {}", stage, requires)
            }
        }
    }
}

impl std::error::Error for PlanError {}
