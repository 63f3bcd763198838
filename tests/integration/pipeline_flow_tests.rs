//! End-to-end route scenarios: six stage threads, mock devices.

use std::time::Duration;

use pipectl::app::events::PipelineEvent;
use pipectl::config::{OutlierPolicy, PipelineConfig};
use pipectl::error::{AcquisitionError, ActuationError, Error};
use pipectl::events::Button;
use pipectl::pipeline::{Route, StageId};

use crate::mock_hw::{MockSignal, Rig, WINDOW_WITH_OUTLIER, test_config, wait_until};

const TIMEOUT: Duration = Duration::from_secs(3);

fn signal() -> MockSignal {
    MockSignal::cycling(&WINDOW_WITH_OUTLIER)
}

// ── Manual route ──────────────────────────────────────────────

#[test]
fn manual_increase_from_fifty_drives_fifty_five_percent() {
    let config = PipelineConfig {
        initial_level: 50,
        ..test_config()
    };
    let rig = Rig::start(config, signal(), &[Button::Increase, Button::ManualSelect]);

    assert!(wait_until(TIMEOUT, || rig.manual.count() >= 1));
    assert_eq!(rig.manual.history()[0], 0.55);
    assert!(rig.sink.any(|e| *e
        == PipelineEvent::LevelAdjusted {
            level: 55,
            complement: 45
        }));
}

#[test]
fn manual_route_is_one_shot_without_latch() {
    let rig = Rig::start(test_config(), signal(), &[Button::ManualSelect]);

    assert!(wait_until(TIMEOUT, || rig.manual.count() >= 1));
    rig.settle(10);

    assert_eq!(rig.manual.count(), 1);
    assert_eq!(rig.auto.count(), 0);
    assert_eq!(rig.sink.count(|e| *e == PipelineEvent::RouteArmed(Route::Manual)), 1);
}

#[test]
fn decrease_at_floor_keeps_level_zero() {
    let rig = Rig::start(test_config(), signal(), &[Button::Decrease, Button::ManualSelect]);

    assert!(wait_until(TIMEOUT, || rig.manual.count() >= 1));
    assert_eq!(rig.manual.last(), Some(0.0));
    assert!(rig.sink.any(|e| *e
        == PipelineEvent::LevelAdjusted {
            level: 0,
            complement: 100
        }));
}

#[test]
fn latched_manual_route_applies_later_presses() {
    let config = PipelineConfig {
        route_latch: true,
        initial_level: 20,
        ..test_config()
    };
    let rig = Rig::start(config, signal(), &[Button::ManualSelect]);
    assert!(wait_until(TIMEOUT, || rig.manual.count() >= 2));

    rig.flags.raise(Button::Increase);
    assert!(wait_until(TIMEOUT, || rig.manual.last() == Some(0.25)));
    assert_eq!(rig.auto.count(), 0);
}

// ── Automatic route ───────────────────────────────────────────

#[test]
fn auto_route_filters_outlier_and_drives_scaled_duty() {
    let rig = Rig::start(test_config(), signal(), &[Button::AutoSelect]);

    assert!(wait_until(TIMEOUT, || rig.auto.count() >= 1));
    let f = rig.auto.last().unwrap();
    assert!((f - 50.0 / 1023.0).abs() < 1e-6, "fraction {f}");
    assert!(rig.sink.any(|e| *e
        == PipelineEvent::Filtered {
            value: 50,
            accepted: 9
        }));
    assert!(rig.sink.any(|e| *e == PipelineEvent::WindowAcquired { min: 48, max: 300 }));
    assert_eq!(rig.manual.count(), 0);
}

#[test]
fn out_of_range_reading_is_stored_as_zero() {
    let signal = MockSignal::cycling(&[40]);
    signal.push(Ok(4000));
    let rig = Rig::start(test_config(), signal, &[Button::AutoSelect]);

    assert!(wait_until(TIMEOUT, || rig.auto.count() >= 1));
    assert!(rig.sink.any(|e| *e == PipelineEvent::SampleOutOfRange { index: 0, raw: 4000 }));
    // Window [0, 40 × 9]: the zero is trimmed, the rest average to 40.
    assert!(rig.sink.any(|e| *e
        == PipelineEvent::Filtered {
            value: 40,
            accepted: 9
        }));
}

#[test]
fn both_selects_in_one_period_arm_only_auto() {
    let rig = Rig::start(
        test_config(),
        signal(),
        &[Button::ManualSelect, Button::AutoSelect],
    );

    assert!(wait_until(TIMEOUT, || rig.auto.count() >= 1));
    rig.settle(10);
    assert_eq!(rig.manual.count(), 0);
    assert!(!rig.sink.any(|e| *e == PipelineEvent::RouteArmed(Route::Manual)));
}

#[test]
fn latched_auto_route_keeps_sampling() {
    let config = PipelineConfig {
        route_latch: true,
        ..test_config()
    };
    let rig = Rig::start(config, signal(), &[Button::AutoSelect]);

    assert!(wait_until(TIMEOUT, || rig.auto.count() >= 3));
    assert!(
        rig.running.telemetry().activations_of(StageId::Acquisition) >= 3
    );
}

// ── Faults ────────────────────────────────────────────────────

#[test]
fn acquisition_failure_skips_one_cycle_then_recovers() {
    let config = PipelineConfig {
        route_latch: true,
        ..test_config()
    };
    let signal = signal();
    signal.push(Ok(50));
    signal.push(Err(AcquisitionError::ReadFailed(-1)));
    let rig = Rig::start(config, signal, &[Button::AutoSelect]);

    assert!(wait_until(TIMEOUT, || rig.auto.count() >= 1));
    assert!(rig.sink.any(|e| *e
        == PipelineEvent::StageFault {
            stage: StageId::Acquisition,
            error: Error::Acquisition(AcquisitionError::ReadFailed(-1)),
        }));
    assert_eq!(rig.running.telemetry().faults_of(StageId::Acquisition), 1);
}

#[test]
fn degenerate_window_holds_output() {
    let config = PipelineConfig {
        route_latch: true,
        outlier_policy: OutlierPolicy::SinglePass,
        ..test_config()
    };
    let rig = Rig::start(config, signal(), &[Button::AutoSelect]);

    assert!(wait_until(TIMEOUT, || {
        rig.running.telemetry().faults_of(StageId::Filter) >= 2
    }));
    assert_eq!(rig.auto.count(), 0);
    assert!(rig.sink.any(|e| matches!(
        e,
        PipelineEvent::StageFault {
            stage: StageId::Filter,
            error: Error::DegenerateFilter(_)
        }
    )));
}

#[test]
fn actuator_failure_is_reported_and_skipped() {
    let rig = Rig::start_with(
        test_config(),
        signal(),
        &[Button::ManualSelect],
        |manual, _| manual.set_failing(true),
    );

    assert!(wait_until(TIMEOUT, || {
        rig.running.telemetry().faults_of(StageId::ManualOutput) >= 1
    }));
    assert_eq!(rig.manual.count(), 0);
    assert!(rig.sink.any(|e| *e
        == PipelineEvent::StageFault {
            stage: StageId::ManualOutput,
            error: Error::Actuation(ActuationError::WriteFailed),
        }));
}
