//! Desktop server example for testing the web UI without a board.
//!
//! Runs the HTTP server with the car wired to an in-memory register page
//! instead of `/dev/mem`, and prints the port A/G registers after every
//! change so you can watch the bits move.
//!
//! # Usage
//!
//! ```sh
//! cargo run --example desktop_server --features web
//! curl 'http://localhost:8000/action?on'
//! curl 'http://localhost:8000/action?forward'
//! ```
//!
//! # Configuration
//!
//! Edit the `Config::default()` call in `main()` to customize settings.

use std::sync::Arc;
use std::time::Duration;

use m1_car::gpio::layout::{CFG_OFFSET, DAT_OFFSET, PUL_OFFSET};
use m1_car::hal::{MockMapper, MockRegisters};
use m1_car::services::{build_router, SharedCar, WebServerConfig};
use m1_car::{Car, Config, Gpio, WebConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create runtime");

    rt.block_on(async {
        println!("=================================");
        println!("  m1-car Desktop Server");
        println!("=================================");
        println!();

        let config = Config::default().with_web(WebConfig::default().with_host("127.0.0.1"));

        let registers = MockRegisters::new();
        let gpio = Gpio::new(MockMapper::with_registers(registers.clone()));
        let car = Car::from_config(gpio, &config.car);
        let state = Arc::new(SharedCar::new(car));

        let web_config = WebServerConfig::from_config(&config.web);
        println!("  Web UI: http://{}", web_config.addr);
        println!("  Action: http://{}/action?on", web_config.addr);
        println!();
        println!("Press Ctrl+C to stop.");
        println!();

        spawn_register_monitor(registers);

        let router = build_router(state, &web_config);
        let listener = tokio::net::TcpListener::bind(web_config.addr)
            .await
            .expect("Failed to bind");
        axum::serve(listener, router).await.expect("Server error");
    });
}

/// Print port A and G registers whenever the page changes.
fn spawn_register_monitor(registers: MockRegisters) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(100));
        let mut last = registers.snapshot();
        loop {
            interval.tick().await;
            let now = registers.snapshot();
            if now == last {
                continue;
            }
            for (name, port) in [('A', 0), ('G', 6)] {
                println!(
                    "P{name}: CFG0={:08x} CFG1={:08x} DAT={:08x} PUL0={:08x}",
                    registers.port_word(port, CFG_OFFSET),
                    registers.port_word(port, CFG_OFFSET + 4),
                    registers.port_word(port, DAT_OFFSET),
                    registers.port_word(port, PUL_OFFSET),
                );
            }
            last = now;
        }
    });
}
