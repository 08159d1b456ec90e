//! Telenode - WiFi Telemetry Node Firmware
//!
//! Main firmware binary for the Raspberry Pi Pico W. Samples one analog
//! channel, plots it on an SSD1306 OLED, and streams every reading to
//! WebSocket clients. A push button toggles reporting; the LED mirrors it.
//!
//! Lifecycle: Booting -> Connecting -> Running. A missing display halts
//! the node; the WiFi join is retried forever; once running, the node
//! never goes back to joining.

#![no_std]
#![no_main]

use core::fmt::Write as _;

use cyw43::JoinOptions;
use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Stack, StackResources};
use embassy_rp::adc::{Adc, Channel as AdcChannel};
use embassy_rp::bind_interrupts;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_time::{Instant, Timer};
use heapless::String;
use rand_core::RngCore;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use telenode_core::state::{Event, NodeState};
use telenode_core::{ClientNotice, TelemetryNode, TickReport, MAX_CLIENTS};
use telenode_display::{DisplaySurface, Ssd1306, TelemetryRenderer};

mod board;
mod channels;
mod config;
mod tasks;

use crate::channels::{FramePublisher, CLIENT_EVENTS};

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

/// WiFi credentials, compiled in from the build environment
const WIFI_SSID: &str = env!("TELENODE_WIFI_SSID");
const WIFI_PASSWORD: &str = env!("TELENODE_WIFI_PASSWORD");

/// CYW43 firmware and country locale blobs
const RADIO_FIRMWARE: &[u8] = include_bytes!(concat!(env!("TELENODE_CYW43_FIRMWARE"), "/43439A0.bin"));
const RADIO_CLM: &[u8] = include_bytes!(concat!(env!("TELENODE_CYW43_FIRMWARE"), "/43439A0_clm.bin"));

/// One TCP socket per listener slot plus DHCP
const SOCKET_COUNT: usize = MAX_CLIENTS + 1;

/// SSD1306 bus speed
const I2C_FREQUENCY_HZ: u32 = 400_000;

static RADIO_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<SOCKET_COUNT>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Telenode firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();

    // Booting: indicator LOW, reporting off, then bring up the display
    let button = board::Button::new(Input::new(p.PIN_12, Pull::Up));
    let indicator = board::Indicator::new(Output::new(p.PIN_13, Level::Low));
    let sensor = board::Sensor::new(
        Adc::new_blocking(p.ADC, Default::default()),
        AdcChannel::new_pin(p.PIN_26, Pull::None),
    );
    let mut node: TelemetryNode<_, _, _> = TelemetryNode::new(button, indicator, sensor, &config);

    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);

    let mut display = Ssd1306::with_address(i2c, config.display.i2c_address);
    if let Err(err) = display.init() {
        error!(
            "SSD1306 at {=u8:#x} did not respond: {}",
            config.display.i2c_address, err
        );
        node.handle(Event::DisplayFailed);
        halt(node.state()).await;
    }
    info!("Display initialized");

    let mut renderer = TelemetryRenderer::new(display, config.graph.window());
    node.handle(Event::DisplayReady);
    show(&mut renderer, &["Connecting to WiFi..."]);

    // Radio bring-up
    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let state = RADIO_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, RADIO_FIRMWARE).await;
    spawner.spawn(tasks::cyw43_task(runner)).unwrap();

    control.init(RADIO_CLM).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    let seed = RoscRng.next_u64();
    let (stack, net_runner) = embassy_net::new(
        net_device,
        NetConfig::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(tasks::net_task(net_runner)).unwrap();
    info!("Radio initialized");

    // Connecting: no timeout, no backoff
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        match control
            .join(WIFI_SSID, JoinOptions::new(WIFI_PASSWORD.as_bytes()))
            .await
        {
            Ok(()) => break,
            Err(err) => {
                warn!("WiFi join attempt {} failed: status {}", attempts, err.status);
                node.handle(Event::LinkAttemptFailed);
                show(&mut renderer, &["WiFi not connected"]);
                Timer::after_millis(u64::from(config.timing.link_retry_ms)).await;
            }
        }
    }
    info!("Joined {} after {} attempt(s), waiting for DHCP...", WIFI_SSID, attempts);

    stack.wait_config_up().await;
    show_address(&mut renderer, stack);
    node.handle(Event::LinkUp);

    for slot in 0..MAX_CLIENTS as u8 {
        spawner
            .spawn(tasks::ws_server_task(stack, slot, config.server.port))
            .unwrap();
    }

    // Running
    let mut sink = FramePublisher::new();
    if let Err(err) = node.render_placeholder(&mut renderer) {
        warn!("Display update failed: {}", err);
    }

    info!("Node running, {}ms per tick", config.timing.update_interval_ms);

    let mut link_up = true;
    let pause_ms = u64::from(config.timing.update_interval_ms);

    loop {
        while let Ok(event) = CLIENT_EVENTS.try_receive() {
            log_client_notice(node.handle_client_event(&event));
        }

        let now_ms = Instant::now().as_millis() as u32;
        let report = node.tick(now_ms, &mut renderer, &mut sink);
        log_tick(&report);

        if link_up != stack.is_link_up() {
            link_up = !link_up;
            if link_up {
                info!("WiFi link restored");
            } else {
                warn!("WiFi link lost, continuing without reconnect");
                node.handle(Event::LinkDown);
            }
        }

        // Sleep a fixed interval after every tick
        Timer::after_millis(pause_ms).await;
    }
}

/// Draw a full-screen message, logging (not propagating) display errors
fn show<D: DisplaySurface>(renderer: &mut TelemetryRenderer<D>, lines: &[&str]) {
    if let Err(err) = renderer.show_message(lines) {
        warn!("Display update failed: {}", err);
    }
}

fn show_address<D: DisplaySurface>(renderer: &mut TelemetryRenderer<D>, stack: Stack<'_>) {
    let mut line: String<24> = String::new();
    match stack.config_v4() {
        Some(v4) => {
            let _ = write!(line, "IP: {}", v4.address.address());
        }
        None => {
            let _ = line.push_str("IP: -");
        }
    }

    info!("{=str}", line.as_str());
    show(renderer, &[line.as_str()]);
}

fn log_client_notice(notice: ClientNotice<'_>) {
    match notice {
        ClientNotice::Connected { client, clients } => {
            info!("Client [{}] connected ({} total)", client, clients)
        }
        ClientNotice::Disconnected { client, clients } => {
            info!("Client [{}] disconnected ({} remaining)", client, clients)
        }
        ClientNotice::Message { client, message } => {
            debug!("Client [{}] sent {}", client, message)
        }
        ClientNotice::Ignored(client) => warn!("Ignored stale event from client [{}]", client),
    }
}

fn log_tick(report: &TickReport) {
    if let Some(reporting) = report.toggled {
        info!("BTN: reporting {}", if reporting { "on" } else { "off" });
    }
    if let Some(err) = report.sample_error {
        warn!("ADC read failed: {}", err);
    }
    if let Some(err) = report.render_error {
        warn!("Display update failed: {}", err);
    }
    trace!(
        "tick: reading {} -> {} client(s)",
        report.reading,
        report.recipients
    );
}

/// Idle forever after a fatal fault
async fn halt(state: NodeState) -> ! {
    error!("Node halted: {}", state);
    loop {
        Timer::after_secs(60).await;
    }
}
