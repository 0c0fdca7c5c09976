#![no_std]
#![no_main]
#![feature(type_alias_impl_trait)]
#![feature(impl_trait_in_assoc_type)]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _; // Register the panic handler.
use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;
use esp_println as _; // Register the defmt UART global logger.

use esp_hal::gpio::AnyPin;
use esp_hal::uart::Uart;

use dht_logger as lib;
use lib::SerialPort;

// This creates a default app-descriptor required by the esp-idf bootloader.
esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    defmt::info!("Init...");

    let reset_reason = esp_hal::system::reset_reason();
    defmt::info!("Reset Reason: {:?}", defmt::Debug2Format(&reset_reason));

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timg0 = TimerGroup::new(peripherals.TIMG0);

    let sw_int =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);

    esp_rtos::start(timg0.timer0, sw_int.software_interrupt0);

    defmt::info!("RTOS scheduler initialized");

    let sensor_config = lib::CONFIG
        .sensor_config()
        .expect("Invalid DHT_SENSOR_PINS / DHT_POWER_PINS / DHT_SENSOR_TYPE");
    let interval_ms = lib::CONFIG
        .log_interval_ms(sensor_config.sensor_type())
        .expect("Invalid LOG_INTERVAL_MS");
    let serial = lib::CONFIG
        .serial_settings(&sensor_config)
        .expect("Invalid SERIAL_PORT / SERIAL_BAUD / SERIAL_TX_PIN / SERIAL_RX_PIN");

    defmt::info!(
        "Sensors: {} x {} on pins {=[u8]}, power pins {=[u8]}",
        sensor_config.pins().len(),
        sensor_config.sensor_type(),
        sensor_config.pins(),
        sensor_config.power_pins()
    );

    defmt::info!(
        "Output: {} at {} baud, tx {=u8}, rx {=u8}",
        serial.port,
        serial.baud,
        serial.tx_pin,
        serial.rx_pin
    );

    let uart_config = esp_hal::uart::Config::default().with_baudrate(serial.baud);
    let uart = match serial.port {
        SerialPort::Uart0 => Uart::new(peripherals.UART0, uart_config),
        SerialPort::Uart1 => Uart::new(peripherals.UART1, uart_config),
    }
    .expect("Failed to initialize UART");
    // SAFETY: The serial pins are validated to be distinct from each other and from every
    // sensor and power pin.
    let uart = uart
        .with_rx(unsafe { AnyPin::steal(serial.rx_pin) })
        .with_tx(unsafe { AnyPin::steal(serial.tx_pin) });
    let sink = lib::device::UartSink::new(uart);

    // SAFETY: The configured pins are validated to be distinct and are not handed to any
    // other driver in this firmware.
    let sensors = lib::SensorArray::new(
        &sensor_config,
        |pin, kind| unsafe { lib::device::DhtTransport::steal(pin, kind) },
        |pin| unsafe { lib::device::power_pin(pin) },
    );

    let mut logger = lib::IntervalLogger::new(sensors, sink, lib::device::EmbassyClock)
        .with_interval(interval_ms)
        .expect("Invalid LOG_INTERVAL_MS");

    let mut delay = esp_hal::delay::Delay::new();
    let Ok(()) = logger.initialize(&mut delay);
    defmt::info!("Sensors initialized");

    spawner.must_spawn(lib::task::logger_task(logger));

    loop {
        Timer::after(Duration::from_secs(60)).await;
        defmt::debug!("[{}s] alive", embassy_time::Instant::now().as_secs());
    }
}
