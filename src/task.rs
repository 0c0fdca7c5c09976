use embassy_time::{Duration, Timer};
use esp_hal::gpio::Output;

use crate::device::{DhtTransport, EmbassyClock, UartSink};
use crate::logger::{IntervalLogger, LoggerError};

pub type FirmwareLogger = IntervalLogger<DhtTransport, Output<'static>, UartSink, EmbassyClock>;

#[embassy_executor::task]
pub async fn logger_task(mut logger: FirmwareLogger) -> ! {
    let interval = Duration::from_millis(u64::from(logger.interval_ms()));
    defmt::info!("Logging every {} ms", logger.interval_ms());

    loop {
        let wait = match logger.tick() {
            Ok(budget) => budget.into(),
            Err(LoggerError::NotInitialized) => {
                defmt::error!("Logger ticked before initialization");
                interval
            }
            Err(LoggerError::Format) => {
                defmt::warn!("Record dropped: serialization failed");
                interval
            }
            Err(LoggerError::Write(kind)) => {
                defmt::warn!(
                    "Record dropped: UART write failed ({:?})",
                    defmt::Debug2Format(&kind)
                );
                interval
            }
        };
        Timer::after(wait).await;
    }
}
