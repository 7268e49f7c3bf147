//! Status-indicating bring-up.
//!
//! A [`BringupPlan`] lists the stages to run and how each outcome is shown on
//! the indicator. The [`Orchestrator`] runs the plan fail-fast against the
//! board collaborators:
//!
//! ```text
//! Idle -> PeripheralInit -> NetworkDriverInit -> NetworkAssociate -> ConnectivityProbe -> Success
//!              |                   |                    |                    |
//!              +-------------------+--------------------+--------------------+-----> Failed
//! ```
//!
//! Failure cadences with the standard plan:
//!
//! | Failed stage | Failure line | Other lines |
//! |--------------|--------------|-------------|
//! | peripheral or driver init | slow flash | off |
//! | association | medium flash | off |
//! | probe | fast flash, then held on | warning held on |

mod error;
mod orchestrator;
mod stage;

pub use error::{BringupError, InitFailure};
pub use orchestrator::{Orchestrator, Outcome};
pub use stage::{
    BringupPlan, BringupState, FailureSignal, PlanError, Stage, StagePlan, SuccessSignal,
};
