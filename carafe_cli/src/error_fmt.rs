//! Human-readable error descriptions and structured JSON error formatting.

use carafe_core::StationError;
use carafe_store::StoreError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(se) = err.downcast_ref::<StationError>() {
        return match se {
            StationError::Timeout => {
                "What happened: Scale read timed out.\nLikely causes: HX711 not wired correctly, no power/ground, or timeout too low.\nHow to fix: Verify the hx711_dt/hx711_sck pins and power, and consider increasing hardware.sensor_read_timeout_ms in the config.".to_string()
            }
            StationError::Hardware(msg) | StationError::HardwareFault(msg) => format!(
                "What happened: A device failed ({msg}).\nLikely causes: Loose wiring, wrong I2C address, or missing GPIO/I2C permissions.\nHow to fix: Check [pins] and [hardware] in the config and that I2C is enabled; run `carafe self-check`."
            ),
            StationError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing [pins] entries or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/carafe.toml for a sample."
            ),
            StationError::Storage(msg) => format!(
                "What happened: The ledger could not be used ({msg}).\nLikely causes: Unwritable storage.db_path or a corrupted database.\nHow to fix: Check the path and its permissions."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    if let Some(st) = err.downcast_ref::<StoreError>() {
        return format!(
            "What happened: The ledger could not be opened or read ({st}).\nLikely causes: Unwritable storage.db_path or a corrupted database.\nHow to fix: Check the path and its permissions, or unset storage.db_path to keep mugs in memory."
        );
    }

    // String-based heuristics for errors coming from device init
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if (lower.contains("hx711") && lower.contains("timeout")) || lower.contains("data-ready") {
        return "What happened: HX711 did not produce data within the configured timeout.\nLikely causes: Wrong DT/SCK pins, wiring/power issues, or timeout configured too low.\nHow to fix: Check [pins] in the config, verify 5V/GND, and raise hardware.sensor_read_timeout_ms.".to_string();
    }

    if lower.starts_with("open ") {
        return format!(
            "What happened: Failed to initialize a device ({msg}).\nLikely causes: Incorrect pin numbers or I2C addresses, I2C disabled, or insufficient GPIO permissions.\nHow to fix: Fix [pins]/[hardware] in the config; ensure the process may access /dev/gpiomem and /dev/i2c-1."
        );
    }

    if lower.contains("without hardware support") {
        return "What happened: This build cannot drive the real station.\nLikely causes: Built without the `hardware` feature.\nHow to fix: Use `carafe run --sim`, or rebuild with `--features hardware`.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable short name for the JSON `reason` field.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(se) = err.downcast_ref::<StationError>() {
        return match se {
            StationError::Timeout => "Timeout",
            StationError::Hardware(_) | StationError::HardwareFault(_) => "Hardware",
            StationError::Config(_) => "Config",
            StationError::Storage(_) => "Storage",
            StationError::Display(_) => "Display",
            StationError::State(_) => "State",
        };
    }
    if err.downcast_ref::<StoreError>().is_some() {
        return "Storage";
    }
    "Error"
}

/// Stable exit codes: 2 config, 3 scale timeout, 4 hardware, 5 storage, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match reason_name(err) {
        "Config" => 2,
        "Timeout" => 3,
        "Hardware" | "Display" => 4,
        "Storage" => 5,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_typed_and_coded() {
        let err = eyre::Report::new(StationError::Timeout);
        assert!(humanize(&err).contains("Scale read timed out"));
        assert_eq!(exit_code_for_error(&err), 3);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Timeout");
        assert_eq!(v["code"], 3);
    }

    #[test]
    fn wrapped_errors_keep_their_code() {
        use eyre::WrapErr;
        let res: Result<(), StationError> = Err(StationError::Config("bad".into()));
        let err = res.wrap_err("loading").unwrap_err();
        assert_eq!(exit_code_for_error(&err), 2);
    }

    #[test]
    fn plain_messages_fall_back() {
        let err = eyre::eyre!("something odd");
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).contains("Original: something odd"));
    }
}
