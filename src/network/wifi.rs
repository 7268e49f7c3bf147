//! ESP32 WiFi network stack.
//!
//! Wraps the ESP-IDF WiFi driver. Everything acquired in
//! [`NetworkStack::driver_init`] (event loop, NVS partition, driver) is owned
//! by this struct and released in [`NetworkStack::teardown`].

use super::{AuthMode, NetworkError, NetworkStack};
use crate::config::{CountryCode, WifiCredentials};
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use esp_idf_sys::{esp, EspError};
use log::{info, warn};
use std::time::{Duration, Instant};

/// WiFi station driver for ESP32.
pub struct EspNetworkStack {
    modem: Option<Modem>,
    wifi: Option<BlockingWifi<EspWifi<'static>>>,
}

impl EspNetworkStack {
    /// Create a stack that will bring up WiFi on `modem`.
    pub fn new(modem: Modem) -> Self {
        Self {
            modem: Some(modem),
            wifi: None,
        }
    }

    fn wifi_mut(&mut self) -> Result<&mut BlockingWifi<EspWifi<'static>>, NetworkError> {
        self.wifi.as_mut().ok_or(NetworkError::NotInitialized)
    }

    fn set_country(country: CountryCode) -> Result<(), EspError> {
        let [a, b] = country.as_bytes();
        let code = [a, b, 0];
        // SAFETY: `code` is a NUL-terminated two-letter code that outlives the call.
        esp!(unsafe {
            esp_idf_sys::esp_wifi_set_country_code(code.as_ptr() as *const core::ffi::c_char, true)
        })
    }
}

impl NetworkStack for EspNetworkStack {
    fn driver_init(&mut self, country: CountryCode) -> Result<(), NetworkError> {
        let modem = self
            .modem
            .take()
            .ok_or_else(|| NetworkError::Driver("modem already consumed".into()))?;

        let sysloop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;

        let esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))?;
        let wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;
        self.wifi = Some(wifi);

        Self::set_country(country)?;
        info!("WiFi driver initialized (country {})", country);
        Ok(())
    }

    fn enable_station_mode(&mut self) -> Result<(), NetworkError> {
        let wifi = self.wifi_mut()?;
        wifi.set_configuration(&Configuration::Client(ClientConfiguration::default()))?;
        wifi.start()?;
        info!("Station mode enabled");
        Ok(())
    }

    fn associate(
        &mut self,
        credentials: &WifiCredentials,
        auth: AuthMode,
        timeout: Duration,
    ) -> Result<(), NetworkError> {
        info!("Connecting to WiFi: {}", credentials.ssid());

        let auth_method = match auth {
            AuthMode::Open => AuthMethod::None,
            AuthMode::Wpa2Personal => AuthMethod::WPA2Personal,
        };

        let client = Configuration::Client(ClientConfiguration {
            ssid: credentials
                .ssid()
                .try_into()
                .map_err(|_| NetworkError::Driver("SSID does not fit driver buffer".into()))?,
            password: credentials
                .password()
                .try_into()
                .map_err(|_| NetworkError::Driver("password does not fit driver buffer".into()))?,
            auth_method,
            ..Default::default()
        });

        let started = Instant::now();
        let wifi = self.wifi_mut()?;
        wifi.set_configuration(&client)?;
        wifi.wifi_mut().connect()?;

        // Both waits share the single association budget.
        let wifi = &*wifi;
        wifi.wifi_wait_while(|| wifi.is_connected().map(|c| !c), Some(timeout))
            .map_err(|e| timeout_or(e, timeout))?;

        let remaining = timeout.saturating_sub(started.elapsed());
        wifi.ip_wait_while(|| wifi.is_up().map(|up| !up), Some(remaining))
            .map_err(|e| timeout_or(e, timeout))?;

        let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
        info!("Connected to WiFi, IP: {}", ip_info.ip);
        Ok(())
    }

    fn teardown(&mut self) {
        let Some(mut wifi) = self.wifi.take() else {
            return;
        };
        info!("Disconnecting from WiFi");
        if let Err(e) = wifi.disconnect() {
            warn!("WiFi disconnect failed: {:?}", e);
        }
        if let Err(e) = wifi.stop() {
            warn!("WiFi stop failed: {:?}", e);
        }
    }
}

fn timeout_or(e: EspError, timeout: Duration) -> NetworkError {
    if e.code() == esp_idf_sys::ESP_ERR_TIMEOUT as esp_idf_sys::esp_err_t {
        NetworkError::Timeout(timeout)
    } else {
        NetworkError::Esp(e)
    }
}
