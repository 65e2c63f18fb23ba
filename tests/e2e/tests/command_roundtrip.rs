//! Command-path round trips: controller client to device server, plus the
//! solenoid request/acknowledge exchange.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use riglink_e2e::{eventually, localhost_config};
use riglink_net::{DeviceServer, LinkClient, UdpTransport};
use riglink_types::{Message, MessageKind};

#[tokio::test]
async fn commands_and_waveforms_reach_the_device() {
    let config = localhost_config().await;

    let commands: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let waveforms: Arc<Mutex<Vec<Vec<f64>>>> = Arc::new(Mutex::new(Vec::new()));
    let mut device = {
        let commands = commands.clone();
        let waveforms = waveforms.clone();
        DeviceServer::new(
            config.clone(),
            move |command| commands.lock().push(command),
            move |points| waveforms.lock().push(points),
        )
    };
    let report = device.start().await;
    assert!(report.all_started(), "failed channels: {:?}", report.failed);

    let client = LinkClient::new(config);
    assert!(client.send_command("temperature test").await);
    assert!(client.send_waveform(&[0.0, 2.5, 5.0, 2.5]).await);

    assert!(
        eventually(|| !commands.lock().is_empty() && !waveforms.lock().is_empty()).await,
        "device never saw the traffic"
    );
    assert_eq!(commands.lock().as_slice(), ["temperature test"]);
    assert_eq!(waveforms.lock().as_slice(), [vec![0.0, 2.5, 5.0, 2.5]]);

    device.stop().await;
}

#[tokio::test]
async fn solenoid_command_returns_the_valve_acknowledgement() {
    let config = localhost_config().await;

    // Stand-in valve controller: one ack per received command, sent back
    // to wherever the command came from.
    let valve = UdpTransport::bind(
        format!("127.0.0.1:{}", config.solenoid_port),
        Duration::from_secs(5),
        config.max_packet_size,
    )
    .await
    .unwrap();
    let responder = tokio::spawn(async move {
        let request = valve.receive(MessageKind::Command).await.unwrap();
        assert_eq!(request.as_text(), Some("solenoid open"));
        let origin = request.sender.clone().unwrap();
        let mut ack = Message::ack("OK: valve open");
        assert!(valve.send(&mut ack, origin).await);
    });

    let client = LinkClient::new(config);
    let ack = client
        .send_solenoid_command("solenoid open", Duration::from_secs(2))
        .await;
    assert_eq!(ack.as_deref(), Some("OK: valve open"));

    responder.await.unwrap();
}

#[tokio::test]
async fn solenoid_command_times_out_when_nothing_answers() {
    let config = localhost_config().await;
    let client = LinkClient::new(config);

    let started = std::time::Instant::now();
    let ack = client
        .send_solenoid_command("solenoid pressure", Duration::from_millis(200))
        .await;
    assert_eq!(ack, None);
    // Timeout plus scheduling slack, never an unbounded wait.
    assert!(started.elapsed() < Duration::from_millis(800));
}
