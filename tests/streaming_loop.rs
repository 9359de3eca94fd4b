use sailpad::controller::{Control, ControlSnapshot, DeviceError, StateSource};
use sailpad::link::{CommandSink, LinkError};
use sailpad::mapping::CommandMapper;
use sailpad::streaming::{CommandStreamer, Connected, StreamError, Termination};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

// Hands out the same frame forever and counts refreshes
struct FixedSource {
    frame: ControlSnapshot,
    refreshes: Arc<AtomicUsize>,
}

impl StateSource for FixedSource {
    fn refresh(&mut self, snapshot: &mut ControlSnapshot) -> Result<(), DeviceError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        *snapshot = self.frame.clone();
        Ok(())
    }
}

// Accepts `budget` payloads, then reports the link as gone
struct FlakySink {
    budget: usize,
    attempts: Arc<AtomicUsize>,
    delivered: Arc<Mutex<Vec<String>>>,
}

impl CommandSink for FlakySink {
    fn send(&mut self, payload: &str) -> Result<(), LinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.delivered.lock().unwrap().len() >= self.budget {
            return Err(LinkError::SendError("connection reset".to_string()));
        }
        self.delivered.lock().unwrap().push(payload.to_string());
        Ok(())
    }
}

struct Harness {
    refreshes: Arc<AtomicUsize>,
    attempts: Arc<AtomicUsize>,
    delivered: Arc<Mutex<Vec<String>>>,
}

fn connect(frame: ControlSnapshot, budget: usize) -> (CommandStreamer<Connected>, Harness) {
    let harness = Harness {
        refreshes: Arc::new(AtomicUsize::new(0)),
        attempts: Arc::new(AtomicUsize::new(0)),
        delivered: Arc::new(Mutex::new(Vec::new())),
    };
    let streamer = CommandStreamer::connect(
        Box::new(FixedSource {
            frame,
            refreshes: harness.refreshes.clone(),
        }),
        Box::new(FlakySink {
            budget,
            attempts: harness.attempts.clone(),
            delivered: harness.delivered.clone(),
        }),
        CommandMapper::default(),
        None,
    );
    (streamer, harness)
}

#[test]
fn auto_mode_with_centred_sticks() {
    let frame = ControlSnapshot::default().with(Control::A, 1);
    let (mut streamer, harness) = connect(frame, 1);

    let payload = streamer.cycle().unwrap();

    assert_eq!(
        payload,
        r#"{"manual_sail_cmd":{"voltage":0.0},"manual_rudder_cmd":{"pos":-0.0},"manual_ballast_cmd":{"vel":0.0},"control_mode":{"rudder_mode":1,"winch_mode":1,"ballast_mode":1}}"#
    );
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(value["manual_sail_cmd"]["voltage"].as_f64(), Some(0.0));
    assert_eq!(value["manual_rudder_cmd"]["pos"].as_f64(), Some(0.0));
    assert_eq!(value["manual_ballast_cmd"]["vel"].as_f64(), Some(0.0));
    assert_eq!(harness.delivered.lock().unwrap().len(), 1);
}

#[test]
fn right_bumper_only_sends_partial_mode() {
    let frame = ControlSnapshot::default().with(Control::RightBumper, 1);
    let (mut streamer, _harness) = connect(frame, 1);

    let payload = streamer.cycle().unwrap();
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
    let mode = value["control_mode"].as_object().unwrap();
    assert_eq!(mode.len(), 2);
    assert_eq!(mode["rudder_mode"], 2);
    assert_eq!(mode["winch_mode"], 1);
}

#[test]
fn no_mode_button_means_no_mode_block() {
    let frame = ControlSnapshot::default()
        .with(Control::LeftBumper, 1)
        .with(Control::RightStickLeft, -90)
        .with(Control::RightTrigger, 200);
    let (mut streamer, _harness) = connect(frame, 1);

    let payload = streamer.cycle().unwrap();
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert!(value.get("control_mode").is_none());
    // -(-90 + 20) / 107 * 0.5
    assert_eq!(value["manual_rudder_cmd"]["pos"].as_f64(), Some(0.327103));
    // 200 * 90 / 255
    assert_eq!(value["manual_ballast_cmd"]["vel"].as_f64(), Some(70.588235));
}

#[test]
fn send_failure_is_final() {
    let (streamer, harness) = connect(ControlSnapshot::default(), 3);

    let terminated = streamer.run(&CancellationToken::new());

    assert_eq!(terminated.messages_sent(), 3);
    assert!(matches!(
        terminated.termination(),
        Some(Termination::Failed(StreamError::Link(_)))
    ));
    // Three good sends plus the one that failed, nothing after it
    assert_eq!(harness.attempts.load(Ordering::SeqCst), 4);
    assert_eq!(harness.refreshes.load(Ordering::SeqCst), 4);
    assert_eq!(harness.delivered.lock().unwrap().len(), 3);
    assert!(matches!(
        terminated.into_result(),
        Err(StreamError::Link(LinkError::SendError(_)))
    ));
}

#[test]
fn stop_request_ends_stream_between_cycles() {
    let stop = CancellationToken::new();
    let (mut streamer, harness) = connect(ControlSnapshot::default(), usize::MAX);

    streamer.cycle().unwrap();
    streamer.cycle().unwrap();
    stop.cancel();
    let terminated = streamer.run(&stop);

    assert_eq!(terminated.termination(), Some(&Termination::Stopped));
    assert_eq!(terminated.into_result(), Ok(2));
    assert_eq!(harness.attempts.load(Ordering::SeqCst), 2);
}
