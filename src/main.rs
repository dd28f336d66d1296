//! thermolink: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  MqttClient      Jhd1313m1 / ConsoleDisplay  SystemClock │
//! │  (Transport)     (Display)                   (Clock)     │
//! │  GroveTemperature<IioAdc | SimAdc>           LogEventSink│
//! │  (Sensor)                                    (EventSink) │
//! │                                                          │
//! │  ──────────────── Port Trait Boundary ─────────────      │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │          SampleLoop (pure logic)               │      │
//! │  │  convert · present · encode · publish          │      │
//! │  └────────────────────────────────────────────────┘      │
//! │                                                          │
//! │  ShutdownSignal (SIGINT) · StdDelay (interval)           │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use log::{error, info};

use thermolink::adapters::log_sink::LogEventSink;
use thermolink::adapters::mqtt::MqttClient;
use thermolink::adapters::time::SystemClock;
use thermolink::app::controller::SampleLoop;
use thermolink::app::ports::{AcquisitionError, DisplayError, DisplayPort, SensorPort};
use thermolink::config::TelemetryConfig;
use thermolink::drivers::delay::StdDelay;
use thermolink::sensors::temperature::GroveTemperature;
use thermolink::shutdown::ShutdownSignal;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    info!("thermolink v{} starting", env!("CARGO_PKG_VERSION"));

    let config = TelemetryConfig::default();
    config.validate().context("invalid configuration")?;

    let shutdown = ShutdownSignal::new();
    let signal = shutdown.clone();
    ctrlc::set_handler(move || {
        if signal.request() {
            info!("Received shutdown signal, finishing current iteration");
        }
    })
    .context("installing SIGINT handler")?;

    let transport = MqttClient::from_address(&config.broker_address)
        .with_context(|| format!("broker address '{}'", config.broker_address))?;
    let clock = SystemClock::new();
    let mut sink = LogEventSink::new();

    let sample_loop = SampleLoop::start(
        &config,
        transport,
        || open_display(&config),
        || open_sensor(&config),
        clock,
        &mut sink,
    )
    .context("startup failed")?;

    let stats = sample_loop
        .run(&shutdown, &mut StdDelay::new(), &mut sink)
        .context("sample loop aborted")?;

    info!(
        "Clean shutdown after {} samples ({} delivered)",
        stats.samples, stats.delivered
    );
    Ok(())
}

// ── Hardware selection ────────────────────────────────────────

#[cfg(feature = "linux-hw")]
fn open_display(config: &TelemetryConfig) -> Result<impl DisplayPort, DisplayError> {
    use linux_embedded_hal::I2cdev;
    use thermolink::drivers::jhd1313m1::Jhd1313m1;

    let path = format!("/dev/i2c-{}", config.i2c_bus);
    let i2c = I2cdev::new(&path).map_err(|e| {
        error!("opening {path}: {e}");
        DisplayError::Unavailable
    })?;
    Jhd1313m1::new(i2c, StdDelay::new(), config.lcd_address, config.rgb_address)
}

#[cfg(not(feature = "linux-hw"))]
fn open_display(_config: &TelemetryConfig) -> Result<impl DisplayPort, DisplayError> {
    use thermolink::adapters::console_display::ConsoleDisplay;

    info!("No LCD support compiled in, rendering frames to the log");
    Ok(ConsoleDisplay::new())
}

#[cfg(feature = "linux-hw")]
fn open_sensor(config: &TelemetryConfig) -> Result<impl SensorPort, AcquisitionError> {
    use thermolink::sensors::adc::IioAdc;

    let adc = IioAdc::open(config.iio_device, config.adc_channel, config.adc_bits)?;
    Ok(GroveTemperature::new(adc))
}

#[cfg(not(feature = "linux-hw"))]
fn open_sensor(config: &TelemetryConfig) -> Result<impl SensorPort, AcquisitionError> {
    use log::warn;
    use thermolink::sensors::adc::SimAdc;

    info!("No ADC support compiled in, using the simulated thermistor");
    let mut adc = SimAdc::new(config.adc_bits);
    match std::env::var("THERMOLINK_SIM_RAW").map(|v| v.trim().parse::<u16>()) {
        Ok(Ok(raw)) => adc = adc.with_raw(raw),
        Ok(Err(e)) => warn!("ignoring THERMOLINK_SIM_RAW: {e}"),
        Err(_) => {}
    }
    Ok(GroveTemperature::new(adc))
}
