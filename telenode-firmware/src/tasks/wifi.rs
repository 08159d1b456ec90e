//! Radio and network stack runners

use cyw43_pio::PioSpi;
use defmt::*;
use embassy_net::Runner;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{DMA_CH0, PIO0};

/// CYW43 runner type for the Pico W wiring
pub type RadioRunner = cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>;

/// CYW43 driver task - services the radio's SPI link
#[embassy_executor::task]
pub async fn cyw43_task(runner: RadioRunner) -> ! {
    info!("Radio task started");
    runner.run().await
}

/// Network stack task - DHCP, ARP, and TCP timers
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    info!("Network task started");
    runner.run().await
}
