use std::path::PathBuf;

/// Compile-time configuration inputs read through `option_env!`.
const CONFIG_VARS: &[&str] = &[
    "BRINGUP_WIFI_SSID",
    "BRINGUP_WIFI_PASSWORD",
    "BRINGUP_COUNTRY",
    "BRINGUP_PROBE_HOST",
    "BRINGUP_PROBE_PATH",
];

fn main() {
    // Only run ESP-IDF build system when targeting ESP32 (Xtensa architecture)
    // Build scripts run on the host, so we check the TARGET env var
    if let Ok(target) = std::env::var("TARGET") {
        if target.contains("xtensa") {
            embuild::espidf::sysenv::output();
        }
    }

    for var in CONFIG_VARS {
        println!("cargo:rerun-if-env-changed={}", var);
    }

    embed_trust_anchor();
}

/// Copy the PEM file named by `BRINGUP_TRUST_ANCHOR` into `OUT_DIR`.
///
/// An empty file is written when the variable is unset so the
/// `include_bytes!` in the config module always resolves.
fn embed_trust_anchor() {
    println!("cargo:rerun-if-env-changed=BRINGUP_TRUST_ANCHOR");

    let out_dir = match std::env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => panic!("OUT_DIR not set by cargo"),
    };
    let dest = out_dir.join("trust_anchor.pem");

    let contents = match std::env::var("BRINGUP_TRUST_ANCHOR") {
        Ok(path) if !path.is_empty() => {
            println!("cargo:rerun-if-changed={}", path);
            match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => panic!("failed to read trust anchor {}: {}", path, e),
            }
        }
        _ => Vec::new(),
    };

    if let Err(e) = std::fs::write(&dest, contents) {
        panic!("failed to write {}: {}", dest.display(), e);
    }
}
