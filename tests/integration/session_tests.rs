//! Session-level scenarios: start/stop gating, heartbeat cadence and
//! teardown on every kind of session end.

use crate::mock_hw::{MockBoard, MockLink, RecordingSink, Rx};

use sensorlink::app::events::AppEvent;
use sensorlink::app::ports::TelemetrySource;
use sensorlink::app::session::{Mode, Session, SessionEnd};
use sensorlink::config::{NodeConfig, SessionTiming};
use sensorlink::error::LinkError;
use sensorlink::sensors::TelemetrySample;
use sensorlink::sensors::simulated::TelemetryGenerator;

fn timing() -> SessionTiming {
    NodeConfig::default().session_timing()
}

fn mode_changes(sink: &RecordingSink) -> Vec<(Mode, Mode)> {
    sink.events
        .iter()
        .filter_map(|e| match e {
            AppEvent::ModeChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

fn run(board: &mut MockBoard, link: MockLink, sink: &mut RecordingSink) -> SessionEnd {
    let mut telemetry = TelemetryGenerator::from_seed(7);
    Session::open(link, timing(), board).run(board, &mut telemetry, sink)
}

// ── Start / stop gating ───────────────────────────────────────

#[test]
fn start_streams_within_a_second_and_stop_halts_sends() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let script = std::iter::once(Rx::Data(b"start"))
        .chain(Rx::timeouts(50))
        .chain([Rx::Data(b"stop")])
        .chain(Rx::timeouts(20))
        .chain([Rx::Closed]);
    let (link, log) = MockLink::new(script, board.clock());

    let end = run(&mut board, link, &mut sink);
    assert_eq!(end, SessionEnd::PeerClosed);

    let log = log.borrow();
    // 50 timed-out iterations plus the one that received `stop`.
    assert_eq!(log.sent.len(), 51);
    let (first_at, _) = log.sent[0];
    assert!(first_at <= 1000, "first sample at {first_at} ms");

    assert_eq!(
        mode_changes(&sink),
        vec![(Mode::Idle, Mode::Streaming), (Mode::Streaming, Mode::Idle)]
    );

    // Stop forces the indicator off; nothing turns it back on afterwards.
    let (last_send_at, _) = *log.sent.last().unwrap();
    let after_stop: Vec<bool> = board
        .writes
        .iter()
        .filter(|(t, _)| *t >= last_send_at)
        .map(|(_, on)| *on)
        .skip_while(|on| *on)
        .collect();
    assert!(!after_stop.is_empty());
    assert!(after_stop.iter().all(|on| !on));
    assert!(!board.led);
}

#[test]
fn payloads_are_parseable_json() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let script = std::iter::once(Rx::Data(b"start")).chain(Rx::timeouts(3));
    let (link, log) = MockLink::new(script, board.clock());
    run(&mut board, link, &mut sink);

    let log = log.borrow();
    assert_eq!(log.sent.len(), 4);
    for (_, text) in &log.sent {
        assert!(text.starts_with("{\"acc_x\":"));
        assert!(!text.ends_with('\n'));
        let sample: TelemetrySample = serde_json::from_str(text).unwrap();
        assert!((1..=100).contains(&sample.batt));
    }
}

#[test]
fn stop_while_idle_writes_nothing() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let (link, log) = MockLink::new([Rx::Data(b"stop"), Rx::Timeout, Rx::Closed], board.clock());

    run(&mut board, link, &mut sink);

    // Only the connect (on) and teardown (off) writes.
    let levels: Vec<bool> = board.writes.iter().map(|(_, on)| *on).collect();
    assert_eq!(levels, vec![true, false]);
    assert!(mode_changes(&sink).is_empty());
    assert!(log.borrow().sent.is_empty());
}

#[test]
fn repeated_stop_after_stop_leaves_indicator_off() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let script = [
        Rx::Data(b"start"),
        Rx::Data(b"stop"),
        Rx::Data(b"stop"),
        Rx::Data(b"stop"),
    ];
    let (link, _log) = MockLink::new(script, board.clock());
    let mut telemetry = TelemetryGenerator::from_seed(1);
    let mut session = Session::open(link, timing(), &mut board);

    for _ in 0..2 {
        session.step(&mut board, &mut telemetry, &mut sink).unwrap();
    }
    assert_eq!(session.mode(), Mode::Idle);
    let writes = board.writes.len();

    for _ in 0..2 {
        session.step(&mut board, &mut telemetry, &mut sink).unwrap();
    }
    assert_eq!(session.mode(), Mode::Idle);
    assert!(!session.indicator_on());
    assert_eq!(board.writes.len(), writes, "stop while idle must not write");
}

#[test]
fn start_while_streaming_is_noop() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let script = [Rx::Data(b"start"), Rx::Data(b"start"), Rx::Timeout, Rx::Closed];
    let (link, log) = MockLink::new(script, board.clock());

    run(&mut board, link, &mut sink);

    assert_eq!(mode_changes(&sink), vec![(Mode::Idle, Mode::Streaming)]);
    assert_eq!(log.borrow().sent.len(), 3);
}

#[test]
fn split_and_case_variant_commands_are_ignored() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let script = [
        Rx::Data(b"st"),
        Rx::Data(b"art"),
        Rx::Data(b"START"),
        Rx::Data(b"start\n"),
        Rx::Closed,
    ];
    let (link, log) = MockLink::new(script, board.clock());

    run(&mut board, link, &mut sink);

    assert!(mode_changes(&sink).is_empty());
    assert!(log.borrow().sent.is_empty());
    let unknown = sink.count(|e| matches!(e, AppEvent::CommandReceived(_)));
    assert_eq!(unknown, 4);
}

/// Source with values far outside the generator's ranges.
struct ExtremeSource {
    fill: f32,
}

impl TelemetrySource for ExtremeSource {
    fn next_sample(&mut self) -> TelemetrySample {
        let mut sample = TelemetryGenerator::from_seed(0).next_sample();
        sample.acc_x = self.fill;
        sample.acc_z = -self.fill;
        sample.temp = self.fill;
        sample.pres = self.fill;
        sample.co = -self.fill;
        sample.frec_z = self.fill;
        sample
    }
}

fn run_with(source: &mut impl TelemetrySource) -> (SessionEnd, Vec<String>, RecordingSink) {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let script = std::iter::once(Rx::Data(b"start"))
        .chain(Rx::timeouts(5))
        .chain([Rx::Closed]);
    let (link, log) = MockLink::new(script, board.clock());
    let end = Session::open(link, timing(), &mut board).run(&mut board, source, &mut sink);
    let sent = log.borrow().sent.iter().map(|(_, p)| p.clone()).collect();
    (end, sent, sink)
}

#[test]
fn extreme_samples_are_still_sent() {
    let (end, sent, sink) = run_with(&mut ExtremeSource { fill: f32::MAX });

    assert_eq!(end, SessionEnd::PeerClosed);
    assert_eq!(sent.len(), 6);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SampleSent(_))), 6);
    for text in &sent {
        let sample: TelemetrySample = serde_json::from_str(text).unwrap();
        assert_eq!(sample.acc_x, f32::MAX);
        assert_eq!(sample.co, -f32::MAX);
    }
}

#[test]
fn non_finite_samples_are_sent_as_null() {
    let (end, sent, _sink) = run_with(&mut ExtremeSource { fill: f32::NAN });

    assert_eq!(end, SessionEnd::PeerClosed);
    assert_eq!(sent.len(), 6);
    for text in &sent {
        let v: serde_json::Value = serde_json::from_str(text).unwrap();
        assert!(v["acc_x"].is_null());
        assert!(v["pres"].is_null());
        assert!(v["hum"].is_f64());
    }
}

// ── Heartbeat ─────────────────────────────────────────────────

#[test]
fn heartbeat_toggles_are_spaced_by_interval() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let script = std::iter::once(Rx::Data(b"start")).chain(Rx::timeouts(30));
    let (link, _log) = MockLink::new(script, board.clock());

    run(&mut board, link, &mut sink);

    // Drop the connect write and the teardown write.
    let toggles = &board.writes[1..board.writes.len() - 1];
    assert!(toggles.len() >= 10, "only {} toggles", toggles.len());
    for pair in toggles.windows(2) {
        assert!(pair[1].0 - pair[0].0 >= 200, "toggles at {:?}", pair);
        assert_ne!(pair[0].1, pair[1].1, "each heartbeat flips the level");
    }
}

#[test]
fn no_heartbeat_while_idle() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let (link, _log) = MockLink::new(Rx::timeouts(40), board.clock());

    run(&mut board, link, &mut sink);

    assert_eq!(board.writes.len(), 2);
    assert!(board.now() >= 40 * 110);
}

// ── Session end ───────────────────────────────────────────────

#[test]
fn peer_close_mid_stream_is_clean() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let script = std::iter::once(Rx::Data(b"start"))
        .chain(Rx::timeouts(5))
        .chain([Rx::Closed]);
    let (link, log) = MockLink::new(script, board.clock());

    let end = run(&mut board, link, &mut sink);

    assert!(end.is_clean());
    assert!(!board.led);
    assert!(log.borrow().dropped, "socket must be closed");
    assert!(sink.events.contains(&AppEvent::SessionEnded {
        end: SessionEnd::PeerClosed,
        samples_sent: 6,
    }));
}

#[test]
fn send_failure_ends_session_faulted() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let script = std::iter::once(Rx::Data(b"start")).chain(Rx::timeouts(10));
    let (link, log) = MockLink::new(script, board.clock());
    let link = link.fail_sends_after(3);

    let end = run(&mut board, link, &mut sink);

    assert_eq!(end, SessionEnd::SendFailed(LinkError::Io(32)));
    assert!(!end.is_clean());
    assert!(!board.led);
    assert_eq!(log.borrow().sent.len(), 3);
    assert!(log.borrow().dropped);
}

#[test]
fn receive_failure_ends_session_faulted() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let script = [
        Rx::Data(b"start"),
        Rx::Timeout,
        Rx::Fail(LinkError::Io(104)),
    ];
    let (link, log) = MockLink::new(script, board.clock());

    let end = run(&mut board, link, &mut sink);

    assert_eq!(end, SessionEnd::RecvFailed(LinkError::Io(104)));
    assert!(!board.led);
    assert!(log.borrow().dropped);
}

#[test]
fn peer_closed_error_is_treated_as_clean_close() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let (link, _log) = MockLink::new([Rx::Fail(LinkError::PeerClosed)], board.clock());

    let end = run(&mut board, link, &mut sink);

    assert_eq!(end, SessionEnd::PeerClosed);
    assert!(!board.led);
}
