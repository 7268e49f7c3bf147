//! Fail-fast bring-up sequencer.

use super::error::{BringupError, InitFailure};
use super::stage::{BringupPlan, BringupState, FailureSignal, PlanError, Stage, SuccessSignal};
use crate::config::{BringupConfig, CountryCode};
use crate::indicator::{Indicator, IndicatorError, Role};
use crate::network::{AuthMode, NetworkError, NetworkStack};
use crate::platform::Peripherals;
use crate::probe::{ConnectivityProbe, ProbeRequest};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{error, info};
use std::ops::{Deref, DerefMut};

/// Result of one bring-up run.
#[derive(Debug)]
pub struct Outcome {
    /// Terminal state, `Success` or `Failed`.
    pub state: BringupState,
    pub failed_stage: Option<Stage>,
    pub error: Option<BringupError>,
}

impl Outcome {
    fn success() -> Self {
        Self {
            state: BringupState::Success,
            failed_stage: None,
            error: None,
        }
    }

    fn failed(stage: Stage, error: BringupError) -> Self {
        Self {
            state: BringupState::Failed,
            failed_stage: Some(stage),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.state == BringupState::Success
    }

    /// Process exit code: 0 on success, 1 on failure.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Runs a [`BringupPlan`] against the board collaborators.
///
/// Stages run strictly in plan order. The first failure is signalled on the
/// indicator and ends the run; later stages never execute. Once the network
/// driver is up it is torn down exactly once when `run` returns, whatever the
/// outcome.
pub struct Orchestrator<P, D, B, N, C> {
    indicator: Indicator<P, D>,
    peripherals: B,
    network: N,
    probe: C,
    plan: BringupPlan,
    config: BringupConfig,
    state: BringupState,
}

impl<P, D, B, N, C> Orchestrator<P, D, B, N, C>
where
    P: OutputPin,
    D: DelayNs,
    B: Peripherals,
    N: NetworkStack,
    C: ConnectivityProbe,
{
    /// Create an orchestrator for a validated plan.
    pub fn new(
        indicator: Indicator<P, D>,
        peripherals: B,
        network: N,
        probe: C,
        plan: BringupPlan,
        config: BringupConfig,
    ) -> Result<Self, PlanError> {
        plan.validate()?;
        Ok(Self {
            indicator,
            peripherals,
            network,
            probe,
            plan,
            config,
            state: BringupState::Idle,
        })
    }

    /// Run every stage of the plan.
    ///
    /// Stage failures are reported through the returned [`Outcome`].
    ///
    /// # Errors
    ///
    /// Only indicator failures are returned as errors. The driver is still
    /// torn down when one occurs.
    pub fn run(&mut self) -> Result<Outcome, IndicatorError> {
        let Self {
            indicator,
            peripherals,
            network,
            probe,
            plan,
            config,
            state,
        } = self;

        let mut idle_network = Some(network);
        let mut driver: Option<DriverGuard<'_, N>> = None;

        transition(state, BringupState::Idle);
        for step in plan.stages() {
            transition(state, step.stage.into());

            let result: Result<(), BringupError> = match step.stage {
                Stage::PeripheralInit => peripherals
                    .init()
                    .map_err(|e| InitFailure::Peripheral(e).into()),
                Stage::NetworkDriverInit => {
                    init_driver(&mut idle_network, &mut driver, config.country)
                }
                Stage::NetworkAssociate => associate(driver.as_deref_mut(), config),
                Stage::ConnectivityProbe => {
                    if let Some(progress) = plan.progress() {
                        indicator.flash(Role::Warning, progress)?;
                    }
                    run_probe(probe, config)
                }
            };

            if let Err(e) = result {
                error!("Stage {} failed: {}", step.stage, e);
                transition(state, BringupState::Failed);
                signal_failure(indicator, &step.on_failure)?;
                return Ok(Outcome::failed(step.stage, e));
            }
            info!("Stage {} passed", step.stage);
        }

        signal_success(indicator, plan.on_success())?;
        transition(state, BringupState::Success);
        Ok(Outcome::success())
    }

    /// Current position in the sequence.
    pub fn state(&self) -> BringupState {
        self.state
    }

    pub fn plan(&self) -> &BringupPlan {
        &self.plan
    }

    pub fn indicator(&self) -> &Indicator<P, D> {
        &self.indicator
    }
}

/// Tears the network driver down when dropped.
struct DriverGuard<'a, N: NetworkStack> {
    network: &'a mut N,
}

impl<N: NetworkStack> Deref for DriverGuard<'_, N> {
    type Target = N;

    fn deref(&self) -> &N {
        self.network
    }
}

impl<N: NetworkStack> DerefMut for DriverGuard<'_, N> {
    fn deref_mut(&mut self) -> &mut N {
        self.network
    }
}

impl<N: NetworkStack> Drop for DriverGuard<'_, N> {
    fn drop(&mut self) {
        info!("Tearing down network driver");
        self.network.teardown();
    }
}

fn transition(state: &mut BringupState, next: BringupState) {
    if *state != next {
        info!("Bring-up: {:?} -> {:?}", state, next);
    }
    *state = next;
}

fn init_driver<'a, N: NetworkStack>(
    idle: &mut Option<&'a mut N>,
    driver: &mut Option<DriverGuard<'a, N>>,
    country: CountryCode,
) -> Result<(), BringupError> {
    let network = idle
        .take()
        .ok_or_else(|| InitFailure::Driver(NetworkError::Driver("already initialized".into())))?;

    info!("Initializing network driver (country {})", country);
    network.driver_init(country).map_err(InitFailure::Driver)?;

    // Armed before station mode so a failure there still tears down.
    let guard = driver.insert(DriverGuard { network });
    guard.enable_station_mode().map_err(InitFailure::Driver)?;
    Ok(())
}

fn associate<N: NetworkStack>(
    network: Option<&mut N>,
    config: &BringupConfig,
) -> Result<(), BringupError> {
    let network = network.ok_or(BringupError::Association(NetworkError::NotInitialized))?;
    let auth = AuthMode::for_credentials(&config.wifi);

    info!(
        "Joining {} ({:?}, {} ms timeout)",
        config.wifi.ssid(),
        auth,
        config.association_timeout.as_millis()
    );
    network
        .associate(&config.wifi, auth, config.association_timeout)
        .map_err(BringupError::Association)
}

fn run_probe<C: ConnectivityProbe>(
    probe: &mut C,
    config: &BringupConfig,
) -> Result<(), BringupError> {
    if probe.probe(&ProbeRequest::from(&config.probe)) {
        Ok(())
    } else {
        Err(BringupError::Probe {
            host: config.probe.host().to_string(),
        })
    }
}

fn signal_failure<P: OutputPin, D: DelayNs>(
    indicator: &mut Indicator<P, D>,
    signal: &FailureSignal,
) -> Result<(), IndicatorError> {
    if let Some(marker) = signal.marker {
        indicator.hold(marker)?;
    }
    indicator.flash(signal.role, signal.pattern)?;
    if signal.hold_after {
        indicator.hold(signal.role)?;
    }
    Ok(())
}

fn signal_success<P: OutputPin, D: DelayNs>(
    indicator: &mut Indicator<P, D>,
    signal: SuccessSignal,
) -> Result<(), IndicatorError> {
    match signal {
        SuccessSignal::Hold(role) => indicator.hold(role),
        SuccessSignal::Flash(role, pattern) => indicator.flash(role, pattern),
    }
}
