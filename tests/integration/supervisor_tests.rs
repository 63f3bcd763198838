//! Supervisor startup, partial binding, telemetry, and the PWM adapter
//! driven through the full pipeline.

use std::sync::Arc;
use std::time::Duration;

use pipectl::adapters::hardware::PwmActuator;
use pipectl::app::events::PipelineEvent;
use pipectl::config::PipelineConfig;
use pipectl::error::{AcquisitionError, ActuationError, Error};
use pipectl::events::{Button, EdgeFlags};
use pipectl::pipeline::StageId;
use pipectl::supervisor::{Devices, PipelineSupervisor};

use crate::mock_hw::{
    CollectingSink, MockPwm, MockSignal, RecordingActuator, Rig, WINDOW_WITH_OUTLIER, test_config,
    wait_until,
};

const TIMEOUT: Duration = Duration::from_secs(3);

#[test]
fn all_bound_devices_start_six_stages() {
    let rig = Rig::start(test_config(), MockSignal::cycling(&[1]), &[]);

    assert_eq!(rig.running.stages().len(), StageId::COUNT);
    for stage in StageId::ALL {
        assert!(rig.running.is_running(stage), "{} not running", stage.name());
    }
    assert!(rig.sink.any(|e| *e == PipelineEvent::Started { stages: 6 }));
    assert!(!rig.sink.any(|e| matches!(e, PipelineEvent::StageDisabled { .. })));
}

#[test]
fn unbound_signal_disables_only_acquisition() {
    let sink = CollectingSink::new();
    let manual = RecordingActuator::new();
    let flags = Arc::new(EdgeFlags::new());
    flags.raise(Button::ManualSelect);

    let running = PipelineSupervisor::new(test_config(), sink.clone())
        .start(Devices::<_, MockSignal, _, _> {
            input: flags,
            signal: Err(AcquisitionError::Unbound),
            manual_out: Ok(manual.clone()),
            auto_out: Ok(RecordingActuator::new()),
        })
        .unwrap();

    assert!(!running.stages().contains(&StageId::Acquisition));
    assert_eq!(running.stages().len(), StageId::COUNT - 1);
    assert!(sink.any(|e| *e
        == PipelineEvent::StageDisabled {
            stage: StageId::Acquisition,
            error: Error::Acquisition(AcquisitionError::Unbound),
        }));
    assert!(sink.any(|e| *e == PipelineEvent::Started { stages: 5 }));

    // The manual route is unaffected.
    assert!(wait_until(TIMEOUT, || manual.count() >= 1));
}

#[test]
fn unbound_outputs_are_reported_per_route() {
    let sink = CollectingSink::new();
    let running = PipelineSupervisor::new(test_config(), sink.clone())
        .start(Devices::<_, _, RecordingActuator, RecordingActuator> {
            input: Arc::new(EdgeFlags::new()),
            signal: Ok(MockSignal::cycling(&[1])),
            manual_out: Err(ActuationError::Unbound),
            auto_out: Err(ActuationError::Unbound),
        })
        .unwrap();

    assert!(!running.is_running(StageId::ManualOutput));
    assert!(!running.is_running(StageId::AutoOutput));
    assert_eq!(
        sink.count(|e| matches!(e, PipelineEvent::StageDisabled { .. })),
        2
    );
}

#[test]
fn invalid_config_is_rejected_before_any_thread() {
    let sink = CollectingSink::new();
    let config = PipelineConfig {
        adc_resolution_bits: 13,
        ..test_config()
    };
    let result = PipelineSupervisor::new(config, sink.clone()).start(Devices {
        input: Arc::new(EdgeFlags::new()),
        signal: Ok(MockSignal::cycling(&[1])),
        manual_out: Ok(RecordingActuator::new()),
        auto_out: Ok(RecordingActuator::new()),
    });

    assert!(matches!(result, Err(Error::Config(_))));
    assert!(sink.events().is_empty());
}

#[test]
fn telemetry_counts_head_activations_and_is_emitted() {
    let rig = Rig::start(test_config(), MockSignal::cycling(&[1]), &[]);

    assert!(wait_until(TIMEOUT, || {
        rig.running.telemetry().activations_of(StageId::Head) >= 3
    }));
    let t = rig.running.report_telemetry();
    assert_eq!(t.activations_of(StageId::AutoOutput), 0);
    assert!(rig.sink.any(|e| matches!(e, PipelineEvent::Telemetry(_))));
    assert_eq!(rig.running.telemetry_interval(), Duration::from_secs(1));
}

#[test]
fn pwm_adapter_scales_to_channel_resolution() {
    let manual_pwm = MockPwm::new(1023);
    let auto_pwm = MockPwm::new(255);
    let flags = Arc::new(EdgeFlags::new());
    flags.raise(Button::AutoSelect);

    let config = PipelineConfig {
        initial_level: 100,
        route_latch: true,
        ..test_config()
    };
    let _running = PipelineSupervisor::new(config, CollectingSink::new())
        .start(Devices {
            input: flags.clone(),
            signal: Ok(MockSignal::cycling(&WINDOW_WITH_OUTLIER)),
            manual_out: Ok(PwmActuator::new(manual_pwm.clone())),
            auto_out: Ok(PwmActuator::new(auto_pwm.clone())),
        })
        .unwrap();

    // 50 / 1023 of an 8-bit channel.
    assert!(wait_until(TIMEOUT, || auto_pwm.last() == Some(12)));

    flags.raise(Button::ManualSelect);
    assert!(wait_until(TIMEOUT, || manual_pwm.last() == Some(1023)));
}
