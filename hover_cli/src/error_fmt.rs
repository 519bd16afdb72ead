//! Human-readable error descriptions and structured JSON error formatting.

use hover_core::HoverError;
use hover_hardware::HwError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(he) = err.downcast_ref::<HoverError>() {
        return match he {
            HoverError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing file, TOML syntax error, or an out-of-range value.\nHow to fix: Edit the config file (see etc/hover.toml), then rerun."
            ),
            HoverError::ZeroCapacity | HoverError::CapacityTooLarge { .. } => format!(
                "What happened: {he}.\nLikely causes: sampler.buffer_size outside 1..=1024.\nHow to fix: Set sampler.buffer_size to the number of samples to average per cycle."
            ),
            HoverError::Sampler(msg) => format!(
                "What happened: The sampler thread could not start ({msg}).\nLikely causes: Thread limit reached or out of memory.\nHow to fix: Check system resources and rerun."
            ),
        };
    }

    if let Some(hw) = err.downcast_ref::<HwError>() {
        return match hw {
            HwError::InvalidChannel { kind, channel } => format!(
                "What happened: {kind} channel {channel} does not exist.\nLikely causes: Wrong value in [pins].\nHow to fix: Use adc_channel 0..=7 and pwm_channel 0 or 1."
            ),
            HwError::Gpio(_) | HwError::Spi(_) | HwError::Pwm(_) => format!(
                "What happened: Failed to initialize hardware ({err:#}).\nLikely causes: Peripheral not enabled in the boot config, wrong pins, or insufficient permissions.\nHow to fix: Enable SPI/PWM overlays, check [pins], and make sure the process can access /dev/gpiomem and /dev/spidev0.0."
            ),
            HwError::Io(e) => format!(
                "What happened: I/O error ({e}).\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug for more detail."
            ),
        };
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 for configuration, 4 for hardware, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(he) = err.downcast_ref::<HoverError>() {
        return match he {
            HoverError::Config(_) | HoverError::ZeroCapacity | HoverError::CapacityTooLarge { .. } => 3,
            HoverError::Sampler(_) => 1,
        };
    }
    // Also matches through wrap_err context.
    if err.downcast_ref::<HwError>().is_some() {
        return 4;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match exit_code_for_error(err) {
        3 => "Config",
        4 => "Hardware",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_map_to_exit_3() {
        let err = eyre::Report::new(HoverError::Config("sampler.rate_hz must be > 0".into()));
        assert_eq!(exit_code_for_error(&err), 3);
        assert!(humanize(&err).contains("sampler.rate_hz"));
    }

    #[test]
    fn wrapped_hardware_errors_map_to_exit_4() {
        use eyre::WrapErr;
        let res: Result<(), HwError> = Err(HwError::Spi("no such device".into()));
        let err = res.wrap_err("open altimeter").unwrap_err();
        assert_eq!(exit_code_for_error(&err), 4);
        let text = humanize(&err);
        assert!(text.contains("open altimeter"), "{text}");
        assert!(text.contains("no such device"), "{text}");
    }

    #[test]
    fn json_error_has_reason_and_message() {
        let err = eyre::Report::new(HoverError::ZeroCapacity);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Config");
        assert_eq!(v["exit_code"], 3);
        assert!(v["message"].as_str().unwrap().contains("buffer_size"));
    }

    #[test]
    fn unknown_errors_fall_back_to_generic() {
        let err = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).contains("Original: boom"));
    }
}
