//! End-to-end telemetry path: device-side sender to PC-side server.
//!
//! Exercises every sensor channel over real UDP sockets, including the
//! binary coil-current frame and the combined `pressure,status` solenoid
//! report.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use riglink_e2e::{eventually, localhost_config};
use riglink_net::{ChannelCallbacks, LinkServer, SensorBuffer, TelemetrySender};
use riglink_types::SensorStream;

#[tokio::test]
async fn telemetry_flows_from_device_to_server_buffer() {
    let config = localhost_config().await;
    let buffer = Arc::new(SensorBuffer::new(100));
    let mut server = LinkServer::new(config.clone(), buffer.clone(), ChannelCallbacks::new());

    let report = server.start().await;
    assert!(report.all_started(), "failed channels: {:?}", report.failed);

    let sender = TelemetrySender::new(config).await.unwrap();

    assert!(sender.send_coil_current(1.25).await);
    assert!(sender.send_temperature(36.6).await);
    assert!(sender.send_pressure(101.3).await);
    assert!(sender.send_solenoid(25.0, "OPEN").await);

    assert!(
        eventually(|| {
            buffer.latest(SensorStream::CoilCurrent).is_some()
                && buffer.latest(SensorStream::Temperature).is_some()
                && buffer.latest(SensorStream::Pressure).is_some()
                && buffer.latest(SensorStream::SolenoidPressure).is_some()
        })
        .await,
        "not all channels delivered a reading"
    );

    let coil = buffer.latest(SensorStream::CoilCurrent).unwrap();
    assert!((coil - 1.25).abs() < 1e-6);
    assert_eq!(buffer.latest(SensorStream::Temperature), Some(36.6));
    assert_eq!(buffer.latest(SensorStream::Pressure), Some(101.3));
    assert_eq!(buffer.latest(SensorStream::SolenoidPressure), Some(25.0));
    assert_eq!(buffer.solenoid_status(), "OPEN");

    server.stop().await;
    assert!(!server.is_running());
}

#[tokio::test]
async fn sensor_callbacks_fire_alongside_buffering() {
    let config = localhost_config().await;
    let buffer = Arc::new(SensorBuffer::new(100));

    let temperature_hits = Arc::new(AtomicUsize::new(0));
    let solenoid_hits = Arc::new(AtomicUsize::new(0));
    let callbacks = {
        let temperature_hits = temperature_hits.clone();
        let solenoid_hits = solenoid_hits.clone();
        ChannelCallbacks::new()
            .on_temperature(move |_| {
                temperature_hits.fetch_add(1, Ordering::SeqCst);
            })
            .on_solenoid(move |_, _| {
                solenoid_hits.fetch_add(1, Ordering::SeqCst);
            })
    };

    let mut server = LinkServer::new(config.clone(), buffer.clone(), callbacks);
    assert!(server.start().await.all_started());

    let sender = TelemetrySender::new(config).await.unwrap();
    for reading in [20.0, 20.5, 21.0] {
        assert!(sender.send_temperature(reading).await);
    }
    assert!(sender.send_solenoid(14.7, "CLOSED").await);

    assert!(
        eventually(|| {
            temperature_hits.load(Ordering::SeqCst) == 3
                && solenoid_hits.load(Ordering::SeqCst) == 1
        })
        .await,
        "callbacks did not all fire"
    );
    assert_eq!(buffer.len(SensorStream::Temperature), 3);
    assert_eq!(buffer.latest(SensorStream::Temperature), Some(21.0));

    server.stop().await;
}
