//! Pipeline supervisor: wires the six stages and starts their threads.
//!
//! ```text
//!          manual_release            manual_out_release
//!        ┌───────────────▶ ManualAdjust ──────────────▶ ManualOutput
//!  Head ─┤
//!        └───────────────▶ Acquisition ──▶ Filter ─────▶ AutoOutput
//!          auto_release          filter_release  auto_out_release
//! ```
//!
//! Five handoffs start at zero and three buffers start at their initial
//! values before any thread exists.  Each stage gets its own thread on the
//! application core, all at the same priority.  A stage whose device failed
//! to bind is reported with `StageDisabled` and never spawned; the rest of
//! the pipeline still runs.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{error, info};

use crate::app::events::{PipelineEvent, TelemetryData};
use crate::app::ports::{ActuatorSink, EventSink, InputSource, SignalSource};
use crate::app::{PipelineStats, StageContext};
use crate::config::PipelineConfig;
use crate::drivers::task_pin::{Core, spawn_on_core};
use crate::error::{AcquisitionError, ActuationError, Error, Result};
use crate::pipeline::acquisition::OUT_OF_RANGE_SENTINEL;
use crate::pipeline::{
    AcquisitionStage, ActuationStage, FilterStage, HeadStage, ManualStage, MixLevel,
    PeriodicRelease, Route, SAMPLE_WINDOW, StageId,
};
use crate::sync::{HandoffSemaphore, shared_buffer};

/// Peripherals handed to the supervisor.  Each output device carries its
/// bind result so a failed bind disables only the stage that needs it.
pub struct Devices<I, S, M, A> {
    /// Press events for the head and manual stages.
    pub input: I,
    pub signal: core::result::Result<S, AcquisitionError>,
    pub manual_out: core::result::Result<M, ActuationError>,
    pub auto_out: core::result::Result<A, ActuationError>,
}

pub struct PipelineSupervisor {
    config: PipelineConfig,
    sink: Arc<dyn EventSink>,
    stats: Arc<PipelineStats>,
}

impl PipelineSupervisor {
    pub fn new(config: PipelineConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config,
            sink,
            stats: Arc::new(PipelineStats::new()),
        }
    }

    /// Validate the configuration, build the stages and spawn one thread
    /// per bound stage.
    ///
    /// A spawn failure aborts startup.  Stages already spawned stay parked
    /// on their handoffs, which the head never signals; the caller is
    /// expected to treat the error as fatal.
    pub fn start<I, S, M, A>(self, devices: Devices<I, S, M, A>) -> Result<RunningPipeline>
    where
        I: InputSource + Clone + Send + 'static,
        S: SignalSource + Send + 'static,
        M: ActuatorSink + Send + 'static,
        A: ActuatorSink + Send + 'static,
    {
        self.config.validate()?;
        let cfg = &self.config;
        let ctx = StageContext::new(self.sink.clone(), self.stats.clone());

        // ── Handoffs (all zero) ───────────────────────────────
        let manual_release = Arc::new(HandoffSemaphore::new());
        let manual_out_release = Arc::new(HandoffSemaphore::new());
        let auto_release = Arc::new(HandoffSemaphore::new());
        let filter_release = Arc::new(HandoffSemaphore::new());
        let auto_out_release = Arc::new(HandoffSemaphore::new());

        // ── Buffers ───────────────────────────────────────────
        let initial_mix = MixLevel::new(cfg.initial_level, cfg.level_total);
        let (mix_w, mix_r) = shared_buffer(initial_mix);
        let (window_w, window_r) = shared_buffer([OUT_OF_RANGE_SENTINEL; SAMPLE_WINDOW]);
        let (value_w, value_r) = shared_buffer(0u16);

        let mut spawner = StageSpawner {
            priority: cfg.stage_priority,
            stack_kb: cfg.stage_stack_kb,
            handles: Vec::with_capacity(StageId::COUNT),
        };

        // Consumers first, head last.
        match devices.manual_out {
            Ok(dev) => {
                let stage = ActuationStage::new(
                    Route::Manual,
                    manual_out_release.clone(),
                    mix_r,
                    u16::from(cfg.level_total),
                    dev,
                    ctx.clone(),
                );
                spawner.spawn(StageId::ManualOutput, move || {
                    futures_lite::future::block_on(stage.run())
                })?;
            }
            Err(e) => disable(&ctx, StageId::ManualOutput, e.into()),
        }

        match devices.auto_out {
            Ok(dev) => {
                let stage = ActuationStage::new(
                    Route::Automatic,
                    auto_out_release.clone(),
                    value_r,
                    cfg.resolution_max(),
                    dev,
                    ctx.clone(),
                );
                spawner.spawn(StageId::AutoOutput, move || {
                    futures_lite::future::block_on(stage.run())
                })?;
            }
            Err(e) => disable(&ctx, StageId::AutoOutput, e.into()),
        }

        let filter = FilterStage::new(
            filter_release.clone(),
            window_r,
            value_w,
            auto_out_release,
            cfg.band_percent,
            cfg.outlier_policy,
            ctx.clone(),
        );
        spawner.spawn(StageId::Filter, move || {
            futures_lite::future::block_on(filter.run())
        })?;

        match devices.signal {
            Ok(dev) => {
                let stage = AcquisitionStage::new(
                    dev,
                    auto_release.clone(),
                    window_w,
                    filter_release,
                    cfg.resolution_max(),
                    ctx.clone(),
                );
                spawner.spawn(StageId::Acquisition, move || {
                    futures_lite::future::block_on(stage.run())
                })?;
            }
            Err(e) => disable(&ctx, StageId::Acquisition, e.into()),
        }

        let manual = ManualStage::new(
            devices.input.clone(),
            manual_release.clone(),
            mix_w,
            manual_out_release,
            initial_mix,
            cfg.level_step,
            ctx.clone(),
        );
        spawner.spawn(StageId::ManualAdjust, move || {
            futures_lite::future::block_on(manual.run())
        })?;

        let head = HeadStage::new(
            devices.input,
            manual_release,
            auto_release,
            cfg.route_latch,
            ctx.clone(),
        );
        let release = PeriodicRelease::starting_at(
            Instant::now(),
            Duration::from_millis(u64::from(cfg.head_period_ms)),
        );
        spawner.spawn(StageId::Head, move || {
            futures_lite::future::block_on(head.run(release))
        })?;

        let stages = spawner.handles.len();
        info!("supervisor: {} of {} stages running", stages, StageId::COUNT);
        ctx.emit(&PipelineEvent::Started { stages });

        Ok(RunningPipeline {
            handles: spawner.handles,
            ctx,
            telemetry_interval: Duration::from_secs(u64::from(cfg.telemetry_interval_secs)),
        })
    }
}

fn disable(ctx: &StageContext, stage: StageId, error: Error) {
    error!("supervisor: {} not started: {}", stage.name(), error);
    ctx.emit(&PipelineEvent::StageDisabled { stage, error });
}

struct StageSpawner {
    priority: u8,
    stack_kb: usize,
    handles: Vec<(StageId, JoinHandle<()>)>,
}

impl StageSpawner {
    fn spawn(&mut self, id: StageId, f: impl FnOnce() + Send + 'static) -> Result<()> {
        let parked = self.handles.len();
        let handle = spawn_on_core(Core::App, self.priority, self.stack_kb, id.thread_name(), f)
            .map_err(|e| {
                error!(
                    "supervisor: spawning {} failed: {}; {} stage(s) left parked",
                    id.name(),
                    e,
                    parked
                );
                Error::Init("stage thread spawn failed")
            })?;
        self.handles.push((id, handle));
        Ok(())
    }
}

/// Handle to a started pipeline.  Stage threads run for process lifetime;
/// dropping this handle detaches them.
pub struct RunningPipeline {
    handles: Vec<(StageId, JoinHandle<()>)>,
    ctx: StageContext,
    telemetry_interval: Duration,
}

impl RunningPipeline {
    /// Stages that were spawned, in spawn order.
    pub fn stages(&self) -> Vec<StageId> {
        self.handles.iter().map(|(id, _)| *id).collect()
    }

    pub fn is_running(&self, stage: StageId) -> bool {
        self.handles
            .iter()
            .any(|(id, h)| *id == stage && !h.is_finished())
    }

    pub fn telemetry(&self) -> TelemetryData {
        self.ctx.stats().snapshot()
    }

    pub fn telemetry_interval(&self) -> Duration {
        self.telemetry_interval
    }

    /// Twice the telemetry interval, so one late report never trips the
    /// watchdog.
    pub fn watchdog_timeout_ms(&self) -> u32 {
        u32::try_from(self.telemetry_interval.as_millis().saturating_mul(2)).unwrap_or(u32::MAX)
    }

    /// Snapshot the counters and emit them as a `Telemetry` event.
    pub fn report_telemetry(&self) -> TelemetryData {
        let t = self.telemetry();
        self.ctx.emit(&PipelineEvent::Telemetry(t));
        t
    }
}
