#![cfg(feature = "metrics")]
//! Tests for `serialframe` metrics.
//!
//! Counters are checked with `metrics_util::debugging::DebuggingRecorder`.

use metrics::{SharedString, Unit};
use metrics_util::{
    CompositeKey,
    debugging::{DebugValue, DebuggingRecorder, Snapshotter},
};
use rstest::rstest;
use serialframe::{
    Frame,
    RetransmissionController,
    Transmitter,
    metrics::{
        self as sf_metrics,
        CRC_ERRORS_TOTAL,
        Direction,
        FRAMES_TOTAL,
        RETRANSMISSIONS_TOTAL,
    },
    queue,
};

type Entry = (CompositeKey, Option<Unit>, Option<SharedString>, DebugValue);

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

/// Value of the counter `name`, optionally filtered by its direction label.
fn counter(snapshot: &[Entry], name: &str, direction: Option<&str>) -> u64 {
    snapshot
        .iter()
        .filter(|(k, _, _, _)| k.key().name() == name)
        .filter(|(k, _, _, _)| {
            direction.is_none_or(|dir| {
                k.key()
                    .labels()
                    .any(|l| l.key() == "direction" && l.value() == dir)
            })
        })
        .map(|(_, _, _, v)| match v {
            DebugValue::Counter(c) => *c,
            other => panic!("{name} is not a counter: {other:?}"),
        })
        .sum()
}

#[rstest]
#[case(Direction::Inbound, "inbound")]
#[case(Direction::Outbound, "outbound")]
fn frame_metric_carries_direction(#[case] direction: Direction, #[case] label: &str) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || sf_metrics::inc_frames(direction));

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter(&snapshot, FRAMES_TOTAL, Some(label)), 1);
}

#[test]
fn error_and_retransmission_metrics_increment() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        sf_metrics::inc_crc_errors();
        sf_metrics::inc_retransmissions();
        sf_metrics::inc_retransmissions();
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter(&snapshot, CRC_ERRORS_TOTAL, None), 1);
    assert_eq!(counter(&snapshot, RETRANSMISSIONS_TOTAL, None), 2);
}

#[tokio::test]
async fn link_halves_record_protocol_activity() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let _guard = metrics::set_default_local_recorder(&recorder);
    let (inbound_tx, _inbound) = queue::inbound();
    let (outbound_tx, mut outbound) = queue::outbound();
    let mut controller = RetransmissionController::new(inbound_tx, outbound_tx);
    let mut transmitter = Transmitter::new(Vec::new());
    let mut bad = Frame::from_data(b"bad").expect("valid frame");
    bad.crc ^= 0xFF;

    transmitter
        .write_frame(Frame::from_data(b"out").expect("valid frame"))
        .await
        .expect("send");
    controller.ingest(&bad.to_bytes());
    controller.ingest(&Frame::retx().to_bytes());
    controller.ingest(&Frame::from_data(b"in").expect("valid frame").to_bytes());
    while let Some(request) = outbound.try_pop() {
        transmitter.execute(request).await.expect("write");
    }

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter(&snapshot, FRAMES_TOTAL, Some("inbound")), 3);
    // data, RETX, resent RETX, ACK
    assert_eq!(counter(&snapshot, FRAMES_TOTAL, Some("outbound")), 4);
    assert_eq!(counter(&snapshot, CRC_ERRORS_TOTAL, None), 1);
    assert_eq!(counter(&snapshot, RETRANSMISSIONS_TOTAL, None), 1);
}
