//! Bring-up binary.
//!
//! Runs the standard bring-up plan once and reports the result on the LEDs:
//! - **Host**: `cargo run --bin bringup` (LEDs are log lines)
//! - **ESP32**: `cargo espflash flash --bin bringup --features esp32 --release`
//!
//! Credentials and the probe target are baked in at build time, e.g.
//! `BRINGUP_WIFI_SSID=lab BRINGUP_WIFI_PASSWORD=secret123 BRINGUP_TRUST_ANCHOR=ca.pem`.
//!
//! Exit code is 0 when every stage passed, 1 otherwise. On ESP32 there is no
//! process to return to, so the firmware parks with the result still showing.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{error, info};
use status_bringup::network::NetworkStack;
use status_bringup::platform::Peripherals;
use status_bringup::probe::ConnectivityProbe;
use status_bringup::{
    BringupConfig, BringupPlan, FlashPattern, Indicator, IndicatorLines, Orchestrator, Role,
    SelfTest,
};

/// Validate configuration, then run the standard plan. Returns the exit code.
fn bring_up<P, D, B, N, C>(
    lines: IndicatorLines<P>,
    delay: D,
    peripherals: B,
    network: N,
    probe: C,
) -> i32
where
    P: OutputPin,
    D: DelayNs,
    B: Peripherals,
    N: NetworkStack,
    C: ConnectivityProbe,
{
    let config = BringupConfig::from_build_env();
    let self_test = config
        .as_ref()
        .map(|c| c.self_test)
        .unwrap_or(SelfTest::None);

    let mut indicator = match Indicator::new(lines, delay, self_test) {
        Ok(indicator) => indicator,
        Err(e) => {
            eprintln!("Indicator unavailable: {}", e);
            return 1;
        }
    };

    // The logger is not attached until the first stage runs.
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid build configuration: {}", e);
            if let Err(e) = indicator.flash(Role::Failure, FlashPattern::SLOW) {
                eprintln!("Indicator failure: {}", e);
            }
            return 1;
        }
    };

    let plan = BringupPlan::standard();
    let mut orchestrator =
        match Orchestrator::new(indicator, peripherals, network, probe, plan, config) {
            Ok(orchestrator) => orchestrator,
            Err(e) => {
                eprintln!("Invalid bring-up plan: {}", e);
                return 1;
            }
        };

    match orchestrator.run() {
        Ok(outcome) => {
            match (&outcome.failed_stage, &outcome.error) {
                (Some(stage), Some(e)) => error!("Bring-up failed at {}: {}", stage, e),
                _ => info!("Bring-up complete"),
            }
            outcome.exit_code()
        }
        Err(e) => {
            error!("Indicator failure: {}", e);
            1
        }
    }
}

#[cfg(feature = "esp32")]
fn main() {
    use esp_idf_hal::delay::FreeRtos;
    use esp_idf_hal::gpio::OutputPin as _;
    use status_bringup::network::EspNetworkStack;
    use status_bringup::platform::{indicator_lines, EspPeripherals};
    use status_bringup::probe::EspTlsProbe;
    use std::time::Duration;

    // Link ESP-IDF patches (must be first!)
    esp_idf_sys::link_patches();

    let code = match esp_idf_hal::peripherals::Peripherals::take() {
        Ok(board) => {
            let pins = board.pins;
            match indicator_lines(
                pins.gpio0.downgrade_output(),
                pins.gpio1.downgrade_output(),
                pins.gpio2.downgrade_output(),
            ) {
                Ok(lines) => bring_up(
                    lines,
                    FreeRtos,
                    EspPeripherals::new(),
                    EspNetworkStack::new(board.modem),
                    EspTlsProbe::new(),
                ),
                Err(e) => {
                    eprintln!("Failed to configure indicator GPIOs: {:?}", e);
                    1
                }
            }
        }
        Err(e) => {
            eprintln!("Failed to take peripherals: {:?}", e);
            1
        }
    };

    info!("Bring-up finished (exit code {}), parking", code);
    loop {
        std::thread::sleep(Duration::from_secs(60));
    }
}

#[cfg(not(feature = "esp32"))]
fn main() {
    use status_bringup::network::HostNetworkStack;
    use status_bringup::platform::{HostPeripherals, LogPin, StdDelay};
    use status_bringup::probe::TlsProbe;

    let code = bring_up(
        LogPin::lines(),
        StdDelay,
        HostPeripherals::new(),
        HostNetworkStack::new(),
        TlsProbe::new(),
    );
    std::process::exit(code);
}
