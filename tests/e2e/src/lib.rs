//! Shared fixtures for riglink end-to-end tests.
//!
//! Tests here run against real localhost sockets, no mocks: a full
//! PC-side server, a device-side server, and the client talking across
//! actual UDP ports, exactly as the bench is wired.

use riglink_config::LinkConfig;

/// A [`LinkConfig`] whose ports are all genuinely free on localhost.
///
/// Binds throwaway sockets to reserve distinct ports, then releases them
/// for the component under test. The solenoid telemetry port (control
/// port + 1) is reserved explicitly because it is derived, not listed.
pub async fn localhost_config() -> LinkConfig {
    // Reserve a consecutive port pair first, for solenoid control and its
    // derived telemetry port.
    let solenoid_port = loop {
        let control = tokio::net::UdpSocket::bind("127.0.0.1:0")
            .await
            .expect("bind throwaway socket");
        let port = control.local_addr().expect("local addr").port();
        if port == u16::MAX {
            continue;
        }
        if let Ok(telemetry) = tokio::net::UdpSocket::bind(("127.0.0.1", port + 1)).await {
            drop((control, telemetry));
            break port;
        }
    };

    let mut sockets = Vec::new();
    let mut ports = Vec::new();
    while ports.len() < 5 {
        let socket = tokio::net::UdpSocket::bind("127.0.0.1:0")
            .await
            .expect("bind throwaway socket");
        let port = socket.local_addr().expect("local addr").port();
        // The pair above is released already; steer clear of it.
        if port != solenoid_port && port != solenoid_port + 1 {
            ports.push(port);
        }
        sockets.push(socket);
    }
    drop(sockets);

    LinkConfig {
        local_host: "127.0.0.1".to_string(),
        device_host: "127.0.0.1".to_string(),
        coil_current_rx_port: ports[0],
        command_tx_port: ports[1],
        waveform_tx_port: ports[2],
        temperature_rx_port: ports[3],
        pressure_rx_port: ports[4],
        solenoid_port,
        socket_timeout_secs: 0.2,
        ..LinkConfig::default()
    }
}

/// Poll `check` every 20 ms until it holds, for up to one second.
pub async fn eventually(check: impl Fn() -> bool) -> bool {
    for _ in 0..50 {
        if check() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    false
}
