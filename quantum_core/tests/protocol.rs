//! Wire contract checks against the public API: one sample in, five 9-byte frames out.
use quantum_core::protocol::{encode_byte, frame, FRAME_WIDTH};
use quantum_core::session::ProtocolSession;
use quantum_core::types::MetricSample;

#[test]
fn encode_scenarios() {
    assert_eq!(encode_byte(42.0), 42);
    assert_eq!(encode_byte(99.9), 99);
}

#[test]
fn frame_scenario() {
    assert_eq!(frame(10, 42.0, 9), vec![10, 42, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(frame(10, 42.0, 9).len(), FRAME_WIDTH);
}

#[tokio::test]
async fn send_scenario() {
    let sample = MetricSample {
        cpu: 50.0,
        mem: 30.0,
        la1: 1.0,
        la5: 2.0,
        la15: 3.0,
    };
    let mut session = ProtocolSession::new(Vec::new());
    session.send(&sample).await.unwrap();
    let wire = session.into_inner();

    let mut expected = Vec::new();
    for (id, v) in [(10u8, 50u8), (11, 30), (12, 1), (13, 2), (14, 3)] {
        expected.push(id);
        expected.push(v);
        expected.extend_from_slice(&[0; 7]);
    }
    assert_eq!(wire, expected);
}

#[tokio::test]
async fn real_load_values_survive_the_wire() {
    // load 1.57 -> 15.7 after scaling -> 15 on the wire
    let sample = MetricSample {
        cpu: 12.99,
        mem: 87.5,
        la1: 15.7,
        la5: 120.0,
        la15: 300.0,
    };
    let mut session = ProtocolSession::new(Vec::new());
    session.send(&sample).await.unwrap();
    let wire = session.into_inner();
    let values: Vec<u8> = wire.chunks(FRAME_WIDTH).map(|f| f[1]).collect();
    assert_eq!(values, vec![12, 87, 15, 120, 255]);
}
