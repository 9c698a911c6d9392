//! Supervisor scenarios: backoff selection, connectivity transitions and
//! session hand-off.

use std::cell::RefCell;
use std::rc::Rc;

use crate::mock_hw::{Connect, MockBoard, MockNetwork, NetworkLog, RecordingSink, Rx};

use sensorlink::app::events::AppEvent;
use sensorlink::app::session::SessionEnd;
use sensorlink::app::supervisor::{Attempt, ConnectivityState, Supervisor};
use sensorlink::config::NodeConfig;
use sensorlink::error::LinkError;
use sensorlink::sensors::simulated::TelemetryGenerator;

type Net = Rc<RefCell<NetworkLog>>;

fn supervisor(
    board: &MockBoard,
    outcomes: Vec<Connect>,
) -> (Supervisor<MockNetwork, TelemetryGenerator>, Net) {
    let (network, log) = MockNetwork::new(outcomes, board.clock());
    let sup = Supervisor::new(network, TelemetryGenerator::from_seed(3), &NodeConfig::default());
    (sup, log)
}

#[test]
fn three_connect_failures_wait_three_seconds_each() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let refused = LinkError::Connect(111);
    let (mut sup, _net) = supervisor(
        &board,
        vec![Connect::Err(refused), Connect::Err(refused), Connect::Err(refused)],
    );

    for _ in 0..3 {
        assert_eq!(sup.run_once(&mut board, &mut sink), Attempt::ConnectFailed(refused));
    }

    assert_eq!(board.delays, vec![3000, 3000, 3000]);
    assert_eq!(sup.consecutive_failures(), 3);
    assert_eq!(sup.state(), ConnectivityState::Disconnected);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ConnectFailed(_))), 3);
    assert!(board.writes.is_empty(), "indicator untouched without a session");
}

#[test]
fn socket_exhaustion_waits_one_second() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let (mut sup, _net) = supervisor(&board, vec![Connect::Err(LinkError::Resource(23))]);

    let attempt = sup.run_once(&mut board, &mut sink);

    assert_eq!(attempt, Attempt::SocketUnavailable(LinkError::Resource(23)));
    assert_eq!(board.delays, vec![1000]);
    assert!(sink.events.contains(&AppEvent::SocketUnavailable(LinkError::Resource(23))));
}

#[test]
fn peer_close_mid_stream_cools_down_before_next_attempt() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let script = std::iter::once(Rx::Data(b"start"))
        .chain(Rx::timeouts(8))
        .chain([Rx::Closed])
        .collect();
    let (mut sup, net) = supervisor(&board, vec![Connect::Ok(script)]);

    let attempt = sup.run_once(&mut board, &mut sink);

    assert_eq!(attempt, Attempt::SessionEnded(SessionEnd::PeerClosed));
    assert!(!board.led);
    assert_eq!(board.writes.first(), Some(&(0, true)), "connect lights the indicator");
    assert_eq!(board.delays.last(), Some(&3000));
    assert_eq!(board.backoff_delays(), vec![3000]);
    assert_eq!(sup.state(), ConnectivityState::Disconnected);
    assert_eq!(sup.sessions(), 1);
    assert_eq!(
        net.borrow().links[0].borrow().sent.len(),
        9,
        "one sample per streaming iteration"
    );

    let transitions: Vec<ConnectivityState> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::ConnectivityChanged(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![ConnectivityState::Connected, ConnectivityState::Disconnected]
    );
}

#[test]
fn faulted_session_also_cools_down() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let script = vec![Rx::Data(b"start"), Rx::Fail(LinkError::Io(104))];
    let (mut sup, _net) = supervisor(&board, vec![Connect::Ok(script)]);

    let attempt = sup.run_once(&mut board, &mut sink);

    assert_eq!(
        attempt,
        Attempt::SessionEnded(SessionEnd::RecvFailed(LinkError::Io(104)))
    );
    assert!(!board.led);
    assert_eq!(board.backoff_delays(), vec![3000]);
}

#[test]
fn successful_connect_resets_failure_count() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let (mut sup, net) = supervisor(
        &board,
        vec![
            Connect::Err(LinkError::Connect(113)),
            Connect::Err(LinkError::Resource(23)),
            Connect::Ok(vec![Rx::Closed]),
            Connect::Err(LinkError::Connect(111)),
        ],
    );

    sup.run_once(&mut board, &mut sink);
    sup.run_once(&mut board, &mut sink);
    assert_eq!(sup.consecutive_failures(), 2);

    sup.run_once(&mut board, &mut sink);
    assert_eq!(sup.consecutive_failures(), 0);

    sup.run_once(&mut board, &mut sink);
    assert_eq!(sup.consecutive_failures(), 1);
    assert_eq!(board.backoff_delays(), vec![3000, 1000, 3000, 3000]);
    assert_eq!(net.borrow().attempts, 4);
}

#[test]
fn only_one_session_alive_at_a_time() {
    let mut board = MockBoard::new();
    let mut sink = RecordingSink::new();
    let (mut sup, net) = supervisor(
        &board,
        vec![
            Connect::Ok(vec![Rx::Data(b"start"), Rx::Closed]),
            Connect::Ok(vec![Rx::Timeout, Rx::Closed]),
        ],
    );

    sup.run_once(&mut board, &mut sink);
    assert!(net.borrow().links[0].borrow().dropped);

    sup.run_once(&mut board, &mut sink);
    assert!(net.borrow().links[1].borrow().dropped);
    assert_eq!(sup.sessions(), 2);
    assert!(!board.led);
}
