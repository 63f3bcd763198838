//! Mock hardware adapters for integration tests.
//!
//! Every mock is a cheap clonable handle around shared state, so a test can
//! hand one clone to the supervisor (which moves it into a stage thread)
//! and keep another to script inputs and assert on the recorded history.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use embedded_hal::pwm::{ErrorKind, ErrorType, SetDutyCycle};
use pipectl::app::events::PipelineEvent;
use pipectl::app::ports::{ActuatorSink, EventSink, SignalSource};
use pipectl::config::PipelineConfig;
use pipectl::error::{AcquisitionError, ActuationError};
use pipectl::events::{Button, EdgeFlags};
use pipectl::supervisor::{Devices, PipelineSupervisor, RunningPipeline};

/// Window used by the automatic-route scenarios: one far outlier among
/// nine samples around 50.
pub const WINDOW_WITH_OUTLIER: [u16; 10] = [50, 52, 51, 300, 49, 50, 53, 48, 52, 51];

/// Poll `cond` every few milliseconds until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}

// ── Signal source ─────────────────────────────────────────────

/// Replays scripted readings first, then cycles `pattern` forever.
#[derive(Clone)]
pub struct MockSignal {
    script: Arc<Mutex<VecDeque<Result<u16, AcquisitionError>>>>,
    pattern: Arc<Vec<u16>>,
    cursor: Arc<Mutex<usize>>,
}

#[allow(dead_code)]
impl MockSignal {
    pub fn cycling(pattern: &[u16]) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            pattern: Arc::new(pattern.to_vec()),
            cursor: Arc::new(Mutex::new(0)),
        }
    }

    /// Queue readings (or failures) ahead of the cycling pattern.
    pub fn push(&self, reading: Result<u16, AcquisitionError>) {
        self.script.lock().unwrap().push_back(reading);
    }
}

impl SignalSource for MockSignal {
    fn sample(&mut self) -> Result<u16, AcquisitionError> {
        if let Some(r) = self.script.lock().unwrap().pop_front() {
            return r;
        }
        let mut i = self.cursor.lock().unwrap();
        let v = self.pattern[*i % self.pattern.len()];
        *i += 1;
        Ok(v)
    }
}

// ── Actuator sink ─────────────────────────────────────────────

/// Records every applied duty fraction.
#[derive(Clone, Default)]
pub struct RecordingActuator {
    pub applied: Arc<Mutex<Vec<f32>>>,
    fail: Arc<Mutex<bool>>,
}

#[allow(dead_code)]
impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<f32> {
        self.applied.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<f32> {
        self.applied.lock().unwrap().last().copied()
    }

    pub fn count(&self) -> usize {
        self.applied.lock().unwrap().len()
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

impl ActuatorSink for RecordingActuator {
    fn set_duty_cycle(&mut self, fraction: f32) -> Result<(), ActuationError> {
        if *self.fail.lock().unwrap() {
            return Err(ActuationError::WriteFailed);
        }
        self.applied.lock().unwrap().push(fraction);
        Ok(())
    }
}

// ── embedded-hal PWM channel ──────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockPwmError;

impl embedded_hal::pwm::Error for MockPwmError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// A `SetDutyCycle` channel that records raw duty values.
#[derive(Clone)]
pub struct MockPwm {
    pub max: u16,
    pub duties: Arc<Mutex<Vec<u16>>>,
}

#[allow(dead_code)]
impl MockPwm {
    pub fn new(max: u16) -> Self {
        Self {
            max,
            duties: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn last(&self) -> Option<u16> {
        self.duties.lock().unwrap().last().copied()
    }
}

impl ErrorType for MockPwm {
    type Error = MockPwmError;
}

impl SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        self.max
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        if duty > self.max {
            return Err(MockPwmError);
        }
        self.duties.lock().unwrap().push(duty);
        Ok(())
    }
}

// ── Event sink ────────────────────────────────────────────────

/// Collects every emitted event.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<PipelineEvent>>,
}

#[allow(dead_code)]
impl CollectingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn any(&self, pred: impl Fn(&PipelineEvent) -> bool) -> bool {
        self.events.lock().unwrap().iter().any(pred)
    }

    pub fn count(&self, pred: impl Fn(&PipelineEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: &PipelineEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ── Test rig ──────────────────────────────────────────────────

/// A running pipeline on mock devices.
#[allow(dead_code)]
pub struct Rig {
    pub flags: Arc<EdgeFlags>,
    pub signal: MockSignal,
    pub manual: RecordingActuator,
    pub auto: RecordingActuator,
    pub sink: Arc<CollectingSink>,
    pub running: RunningPipeline,
    period: Duration,
}

/// Fast head period for host runs.
pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        head_period_ms: 10,
        telemetry_interval_secs: 1,
        ..Default::default()
    }
}

#[allow(dead_code)]
impl Rig {
    /// Raise `presses` before any stage thread exists, then start.
    pub fn start(config: PipelineConfig, signal: MockSignal, presses: &[Button]) -> Self {
        Self::start_with(config, signal, presses, |_, _| {})
    }

    /// Like [`start`](Self::start), with a hook to script the mocks first.
    pub fn start_with(
        config: PipelineConfig,
        signal: MockSignal,
        presses: &[Button],
        prepare: impl FnOnce(&RecordingActuator, &RecordingActuator),
    ) -> Self {
        let flags = Arc::new(EdgeFlags::new());
        for &b in presses {
            flags.raise(b);
        }
        let manual = RecordingActuator::new();
        let auto = RecordingActuator::new();
        prepare(&manual, &auto);
        let sink = CollectingSink::new();
        let period = Duration::from_millis(u64::from(config.head_period_ms));

        let running = PipelineSupervisor::new(config, sink.clone())
            .start(Devices {
                input: flags.clone(),
                signal: Ok(signal.clone()),
                manual_out: Ok(manual.clone()),
                auto_out: Ok(auto.clone()),
            })
            .expect("pipeline starts");

        Self {
            flags,
            signal,
            manual,
            auto,
            sink,
            running,
            period,
        }
    }

    /// Let `periods` head periods pass.
    pub fn settle(&self, periods: u32) {
        std::thread::sleep(self.period * periods);
    }
}
