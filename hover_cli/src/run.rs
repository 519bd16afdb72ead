//! `run` and `self-check`: backend assembly, rig start and result output.

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use eyre::Result;
use hover_core::{CycleReport, Rig, RunParams, YawReader};
use hover_hardware::{ConsoleDisplay, SimulatedAltimeter, SimulatedEncoder, SimulatedPwm};
use hover_traits::clock::MonotonicClock;
use hover_traits::{AltitudeSensor, DisplaySink, PwmOutput};
use serde_json::json;

/// Keeps the yaw edge source alive for the duration of a run.
#[allow(dead_code)]
enum EdgeSource {
    Sim(SimulatedEncoder),
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    Gpio(hover_hardware::hardware::GpioEncoder),
}

struct Backend {
    kind: &'static str,
    sensor: Box<dyn AltitudeSensor + Send>,
    pwm: Box<dyn PwmOutput>,
    yaw: YawReader,
    _edges: EdgeSource,
}

fn simulated(cfg: &hover_config::Config) -> Result<Backend> {
    let (decoder, yaw) = hover_core::QuadratureDecoder::new(hover_core::Phase::FORWARD[0]);
    let encoder = SimulatedEncoder::spawn(decoder, cfg.sim.yaw_counts_per_sec)?;
    Ok(Backend {
        kind: "sim",
        sensor: Box::new(SimulatedAltimeter::new(
            cfg.sim.altitude_raw,
            cfg.sim.noise_raw,
        )),
        pwm: Box::new(SimulatedPwm::new()),
        yaw,
        _edges: EdgeSource::Sim(encoder),
    })
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn build_backend(cfg: &hover_config::Config) -> Result<Backend> {
    use hover_hardware::hardware::{GpioEncoder, HardwarePwm, Mcp3008Altimeter};
    use eyre::WrapErr;

    let Some(pins) = &cfg.pins else {
        tracing::warn!("no [pins] section; falling back to simulated hardware");
        return simulated(cfg);
    };
    let sensor = Mcp3008Altimeter::new(pins.adc_channel).wrap_err("open altimeter")?;
    let pwm = HardwarePwm::new(pins.pwm_channel).wrap_err("open pwm")?;
    let (encoder, yaw) = GpioEncoder::new(pins.yaw_a, pins.yaw_b).wrap_err("open yaw encoder")?;
    Ok(Backend {
        kind: "hardware",
        sensor: Box::new(sensor),
        pwm: Box::new(pwm),
        yaw,
        _edges: EdgeSource::Gpio(encoder),
    })
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn build_backend(cfg: &hover_config::Config) -> Result<Backend> {
    if cfg.pins.is_some() {
        tracing::debug!("[pins] ignored: built without the hardware feature");
    }
    simulated(cfg)
}

fn display(quiet: bool, json: bool) -> Box<dyn DisplaySink> {
    if quiet {
        Box::new(ConsoleDisplay::new(std::io::sink()))
    } else if json {
        // Keep stdout parseable.
        Box::new(ConsoleDisplay::stderr())
    } else {
        Box::new(ConsoleDisplay::stdout())
    }
}

fn report_json(r: &CycleReport) -> serde_json::Value {
    json!({
        "cycle": r.cycle,
        "average": r.average,
        "altitude_percent": r.altitude_percent,
        "frequency_hz": r.frequency_hz,
        "duty": r.duty,
        "yaw": r.yaw,
        "yaw_degrees": r.yaw_degrees,
        "samples": r.sample_count,
    })
}

pub fn run(
    cfg: &hover_config::Config,
    cycles: Option<u64>,
    quiet: bool,
    json: bool,
    shutdown: &AtomicBool,
) -> Result<()> {
    let params = RunParams::from(cfg);
    let backend = build_backend(cfg)?;
    let kind = backend.kind;
    let _edges = backend._edges;

    let mut rig = Rig::start(
        backend.sensor,
        backend.pwm,
        display(quiet, json),
        backend.yaw,
        &params,
        MonotonicClock::new(),
    )?;
    tracing::info!(backend = kind, cycles = ?cycles, "run start");

    let started = Instant::now();
    let last = rig.run(shutdown, cycles);
    let done = rig.control().cycles();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let interrupted = cycles.is_none_or(|n| done < n);
    drop(rig);

    if json {
        let obj = json!({
            "backend": kind,
            "cycles": done,
            "elapsed_ms": elapsed_ms,
            "interrupted": interrupted,
            "last": last.as_ref().map(report_json),
        });
        println!("{obj}");
    } else {
        match last {
            Some(r) => println!(
                "run complete: {done} cycles in {elapsed_ms} ms; altitude {} ({}%), duty {}% @ {} Hz, yaw {} counts ({} deg)",
                r.average,
                r.altitude_percent,
                r.duty,
                r.frequency_hz,
                r.yaw,
                r.yaw_degrees
            ),
            None => println!("run complete: no cycles finished"),
        }
    }
    Ok(())
}

/// Build the configured rig and run exactly one cycle over a one-sample window.
pub fn self_check(cfg: &hover_config::Config, json: bool) -> Result<()> {
    let mut params = RunParams::from(cfg);
    params.sampler.buffer_size = 1;
    let backend = build_backend(cfg)?;
    let kind = backend.kind;
    let _edges = backend._edges;

    let mut rig = Rig::start(
        backend.sensor,
        backend.pwm,
        ConsoleDisplay::new(std::io::sink()),
        backend.yaw,
        &params,
        MonotonicClock::new(),
    )?;
    let never = AtomicBool::new(false);
    let report = rig
        .step(&never)
        .ok_or_else(|| eyre::eyre!("self-check cycle did not complete"))?;
    drop(rig);

    tracing::info!(backend = kind, duty = report.duty, "self-check ok");
    if json {
        println!(
            "{}",
            json!({ "status": "ok", "backend": kind, "report": report_json(&report) })
        );
    } else {
        println!(
            "self-check ok (backend={kind}, altitude={}, duty={}%)",
            report.average, report.duty
        );
    }
    Ok(())
}
