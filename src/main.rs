//! UART Command Pipeline Firmware for Raspberry Pi Pico 2 (RP2350)
//!
//! Type a digit and press Enter in a terminal on UART0 (115200 8N1):
//!
//! - **1** / **2**: LED on / off
//! - **3** / **4**: start / stop blinking the LED every 500 ms
//! - **5**: print the LED state
//! - **6**: print the date and time
//! - **0**: stop the pipeline and idle
//!
//! # Architecture
//!
//! - UART0 RX interrupt: collects bytes into the line capture, wakes the
//!   extractor and the menu producer on `\r`
//! - Extractor task: line -> command -> command queue
//! - Dispatcher task: command -> LED / toggle / clock, replies -> writer queue
//! - Writer task: writer queue -> UART0 TX
//! - Menu task: menu -> writer queue, once at start and after every line
//! - Toggle timer task: flips the LED while the toggle is armed
//!
//! After EXIT every task returns, `main` masks interrupts and sleeps.

#![no_std]
#![no_main]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]

// Modules only used in the binary (not testable on host)
mod board;

// Re-export testable modules from library for local use
mod config {
    pub use serial_command_pipeline::config::*;
}
mod cpu_cycles {
    pub use serial_command_pipeline::cpu_cycles::*;
}

use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::interrupt;
use embassy_rp::uart::{Blocking, Config as UartConfig, Uart, UartRx};
use serial_command_pipeline::command::CommandPool;
use serial_command_pipeline::tasks::{
    Dispatcher,
    run_command_extractor,
    run_menu_producer,
    run_toggle_timer,
    run_writer,
};
use serial_command_pipeline::{Pipeline, PipelineError};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::board::{BoardLed, UartWriter, UptimeClock};
use crate::config::{BOOT_BANNER, CLOCK_EPOCH, UART_BAUD_RATE};

// =============================================================================
// Pipeline State
// =============================================================================

static COMMAND_POOL: CommandPool = CommandPool::new();

static PIPELINE: Pipeline<'static> = Pipeline::new(&COMMAND_POOL);

static LED: StaticCell<BoardLed> = StaticCell::new();

/// Receive half of UART0. Never read from: the interrupt handler drains the
/// FIFO through the PAC. Kept so the pin stays configured.
static UART_RX: StaticCell<UartRx<'static, Blocking>> = StaticCell::new();

/// Stop the core after an unrecoverable pipeline error.
fn fatal(error: PipelineError) -> ! {
    error!("Fatal pipeline error: {}", error);
    panic!("pipeline halted");
}

// =============================================================================
// Interrupt Handler
// =============================================================================

/// UART0 receive / receive-timeout interrupt: hand every byte in the RX FIFO to
/// the line capture.
#[interrupt]
unsafe fn UART0_IRQ() {
    let regs = embassy_rp::pac::UART0;
    regs.uarticr().write(|w| {
        w.set_rxic(true);
        w.set_rtic(true);
    });

    while !regs.uartfr().read().rxfe() {
        let byte = regs.uartdr().read().data();
        PIPELINE.capture.on_byte_received(byte);
    }
}

// =============================================================================
// Tasks
// =============================================================================

#[embassy_executor::task]
async fn command_extractor_task() {
    if let Err(e) = run_command_extractor(&PIPELINE).await {
        fatal(e);
    }
}

#[embassy_executor::task]
async fn dispatcher_task(
    led: &'static BoardLed,
    clock: UptimeClock,
) {
    if let Err(e) = Dispatcher::new(&PIPELINE, led, clock).run().await {
        fatal(e);
    }
}

#[embassy_executor::task]
async fn writer_task(tx: UartWriter) {
    if let Err(e) = run_writer(&PIPELINE, tx).await {
        fatal(e);
    }
}

#[embassy_executor::task]
async fn menu_task() {
    if let Err(e) = run_menu_producer(&PIPELINE).await {
        fatal(e);
    }
}

#[embassy_executor::task]
async fn toggle_timer_task(led: &'static BoardLed) {
    if let Err(e) = run_toggle_timer(&PIPELINE, led).await {
        fatal(e);
    }
}

// Program metadata for `picotool info`
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"pico2-serial-commands"),
    embassy_rp::binary_info::rp_program_description!(c"UART command queue pipeline with LED and clock commands"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Serial command pipeline starting...");

    let p = embassy_rp::init(Default::default());
    cpu_cycles::init(embassy_rp::clocks::clk_sys_freq());
    info!("CPU clock: {} Hz", cpu_cycles::freq_hz());

    // On-board LED (GPIO25), off at boot
    let led: &'static BoardLed = LED.init(BoardLed::new(Output::new(p.PIN_25, Level::Low)));

    // UART0: TX=GPIO0, RX=GPIO1
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = UART_BAUD_RATE;
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let (mut tx, rx) = uart.split();
    UART_RX.init(rx);

    // Banner goes out before any task can use the transmitter
    if let Err(e) = tx.blocking_write(BOOT_BANNER.as_bytes()) {
        error!("Boot banner write failed: {}", e);
    }

    spawner.spawn(writer_task(UartWriter::new(tx))).unwrap();
    spawner.spawn(menu_task()).unwrap();
    spawner.spawn(command_extractor_task()).unwrap();
    spawner.spawn(dispatcher_task(led, UptimeClock::new(CLOCK_EPOCH))).unwrap();
    spawner.spawn(toggle_timer_task(led)).unwrap();
    info!("Pipeline tasks spawned");

    board::enable_rx_interrupt();
    info!("UART0 RX interrupt enabled");

    PIPELINE.shutdown.wait_all_stopped().await;
    info!("All pipeline tasks stopped, {} commands handled, idling", COMMAND_POOL.allocated_total());

    cortex_m::interrupt::disable();
    loop {
        cortex_m::asm::wfi();
    }
}
