//! Rig lifecycle: sampler thread, control loop pacing and shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use hover_core::mocks::{ScriptedSensor, SpyDisplay, SpyPwm};
use hover_core::sampler::{SampleTick, Sampler};
use hover_core::{Phase, QuadratureDecoder, Rig, RunParams, buffer};
use hover_traits::clock::MonotonicClock;
use hover_traits::clock::test_clock::TestClock;

fn params(rate_hz: u32, window: usize) -> RunParams {
    let mut p = RunParams::default();
    p.sampler.rate_hz = rate_hz;
    p.sampler.buffer_size = window;
    p.runner.poll_us = 200;
    p
}

#[test]
fn rig_applies_startup_duty_then_tracks_sensor() {
    let pwm = SpyPwm::default();
    let display = SpyDisplay::default();
    let (_decoder, yaw) = QuadratureDecoder::new(Phase::FORWARD[0]);
    let mut rig = Rig::start(
        ScriptedSensor::new(vec![125]),
        pwm.clone(),
        display.clone(),
        yaw,
        &params(200, 4),
        MonotonicClock::new(),
    )
    .unwrap();

    let stop = AtomicBool::new(false);
    let last = rig.run(&stop, Some(3)).expect("three cycles");
    assert_eq!(last.cycle, 3);
    assert_eq!(last.average, 125);
    assert_eq!(last.duty, 15);
    assert!(last.sample_count >= 12);

    let calls = pwm.calls.lock().unwrap().clone();
    assert_eq!(calls[0], (150, 50));
    assert!(calls[1..].iter().all(|&c| c == (150, 15)));
    assert_eq!(display.value("PWM Duty"), Some(15));
    assert_eq!(rig.control().cycles(), 3);
}

#[test]
fn rig_rejects_zero_window() {
    let (_decoder, yaw) = QuadratureDecoder::new(Phase::FORWARD[0]);
    let err = Rig::start(
        ScriptedSensor::new(vec![0]),
        SpyPwm::default(),
        SpyDisplay::default(),
        yaw,
        &params(10, 0),
        MonotonicClock::new(),
    )
    .err()
    .expect("zero window must fail");
    assert!(format!("{err}").contains("capacity"));
}

#[test]
fn rig_rejects_degenerate_mapping() {
    let (_decoder, yaw) = QuadratureDecoder::new(Phase::FORWARD[0]);
    let mut p = params(10, 1);
    p.mapping.sensor_max = p.mapping.sensor_min;
    let err = Rig::start(
        ScriptedSensor::new(vec![0]),
        SpyPwm::default(),
        SpyDisplay::default(),
        yaw,
        &p,
        MonotonicClock::new(),
    )
    .err()
    .expect("degenerate mapping must fail");
    assert!(format!("{err}").contains("must differ"));
}

#[test]
fn shutdown_interrupts_unbounded_run() {
    let (_decoder, yaw) = QuadratureDecoder::new(Phase::FORWARD[0]);
    let mut rig = Rig::start(
        ScriptedSensor::new(vec![700]),
        SpyPwm::default(),
        SpyDisplay::default(),
        yaw,
        &params(100, 1),
        MonotonicClock::new(),
    )
    .unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let stopper = {
        let stop = Arc::clone(&stop);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(80));
            stop.store(true, Ordering::Relaxed);
        })
    };
    let start = Instant::now();
    let _ = rig.run(&stop, None);
    stopper.join().unwrap();
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn yaw_edges_show_up_in_reports() {
    let (mut decoder, yaw) = QuadratureDecoder::new(Phase::FORWARD[0]);
    let display = SpyDisplay::default();
    let mut rig = Rig::start(
        ScriptedSensor::new(vec![0]),
        SpyPwm::default(),
        display.clone(),
        yaw,
        &params(200, 1),
        MonotonicClock::new(),
    )
    .unwrap();

    let edges = std::thread::spawn(move || {
        // Two full forward turns of the Gray cycle from 00.
        for i in 1..=8 {
            let p = Phase::FORWARD[i % 4];
            decoder.on_edge(p.a(), p.b());
        }
    });
    edges.join().unwrap();

    let stop = AtomicBool::new(false);
    let report = rig.step(&stop).unwrap();
    assert_eq!(report.yaw, 8);
    assert_eq!(display.value("Yaw"), Some(8));
}

#[test]
fn sampler_runs_on_test_clock_and_stops_on_drop() {
    let clock = TestClock::new();
    let (tx, mut rx) = buffer::init(4).unwrap();
    let (tick, count) = SampleTick::new(ScriptedSensor::new(vec![1, 2, 3]), tx);
    let sampler = Sampler::spawn(tick, 10, clock.clone()).unwrap();
    assert_eq!(sampler.period(), Duration::from_millis(100));

    let deadline = Instant::now() + Duration::from_secs(2);
    while count.get() < 20 && Instant::now() < deadline {
        std::thread::yield_now();
    }
    drop(sampler);

    let produced = count.get();
    assert!(produced >= 20, "only {produced} ticks");
    // Virtual time advanced one period per tick.
    assert!(clock.elapsed() >= Duration::from_millis(100) * (produced - 1));
    assert_eq!(rx.len(), 4);
    assert!(rx.pop().is_some());
}

#[test]
fn sampler_shutdown_is_prompt() {
    let (tx, _rx) = buffer::init(1).unwrap();
    let (tick, count) = SampleTick::new(ScriptedSensor::new(vec![5]), tx);
    let sampler = Sampler::spawn(tick, 10, MonotonicClock::new()).unwrap();
    std::thread::sleep(Duration::from_millis(150));

    let start = Instant::now();
    drop(sampler);
    let shutdown_time = start.elapsed();
    assert!(
        shutdown_time < Duration::from_millis(300),
        "Shutdown took {shutdown_time:?}"
    );
    let after = count.get();
    std::thread::sleep(Duration::from_millis(150));
    assert_eq!(count.get(), after, "sampler kept ticking after drop");
}

#[test]
fn slow_sampler_drops_without_waiting_out_its_period() {
    let (tx, _rx) = buffer::init(1).unwrap();
    let (tick, count) = SampleTick::new(ScriptedSensor::new(vec![5]), tx);
    // 1 Hz: the thread is parked for almost a full second after its first tick.
    let sampler = Sampler::spawn(tick, 1, MonotonicClock::new()).unwrap();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(count.get(), 1);

    let start = Instant::now();
    drop(sampler);
    let shutdown_time = start.elapsed();
    assert!(
        shutdown_time < Duration::from_millis(300),
        "Shutdown took {shutdown_time:?}"
    );
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(count.get(), 1, "sampler ticked after drop");
}
