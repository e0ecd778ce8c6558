//! NanoPi M1 car server.
//!
//! Maps the H3 GPIO registers through `/dev/mem` (run as root) and serves
//! the web UI plus `/action?<name>` on port 8000.
//!
//! ```sh
//! RUST_LOG=debug cargo run --release --features web --bin m1-car
//! ```
//!
//! The car starts powered off; the UI sends `on` first.

use std::net::{IpAddr, UdpSocket};
use std::sync::Arc;

use anyhow::Context;

use m1_car::hal::DevMemMapper;
use m1_car::services::{run_server_with_state, SharedCar, WebServerConfig};
use m1_car::{Car, Config, Gpio};

/// First non-loopback IPv4 address, found by routing a UDP socket.
///
/// `connect` on UDP only selects a route; nothing is sent.
fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (ip.is_ipv4() && !ip.is_loopback()).then_some(ip)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::default();

    let gpio = Gpio::new(DevMemMapper::from_config(&config.gpio));
    let car = Car::from_config(gpio, &config.car);
    let state = Arc::new(SharedCar::new(car));

    let web_config = WebServerConfig::from_config(&config.web);
    let host = local_ip().map_or_else(|| "localhost".to_string(), |ip| ip.to_string());

    println!("-------------------------------------------");
    println!("Car is ready on http://{}:{}", host, web_config.addr.port());
    println!("-------------------------------------------");

    let result = run_server_with_state(Arc::clone(&state), web_config)
        .await
        .context("web server failed");

    // Leave the motors stopped if the server exits.
    if state.is_on() {
        state.dispatch("off");
    }

    result
}
