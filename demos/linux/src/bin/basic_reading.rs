//! Basic light reading example
//!
//! This example demonstrates how to:
//! - Initialize the LTR-329 sensor
//! - Configure gain, integration time, and measurement rate
//! - Poll the dual-channel readings
//! - Derive the visible-only level and a lux estimate
//! - Handle invalid/overrun samples gracefully

// This example uses linux-embedded-hal for demonstration
// Replace with your platform's I2C implementation
#[cfg(target_os = "linux")]
use linux_embedded_hal::{Delay, I2cdev};
#[cfg(target_os = "linux")]
use ltr329::{Error, Ltr329};

#[cfg(target_os = "linux")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize I2C interface
    let i2c = I2cdev::new("/dev/i2c-1")?;
    let delay = Delay;

    let mut sensor = Ltr329::new_with_delay(i2c, delay);

    println!("LTR-329 Basic Reading Example");
    println!("=============================");

    // Identity check, reset, and activation
    println!("Initializing sensor...");
    sensor.init().expect("failed to initialize LTR-329, check your wiring");

    // Configure the measurement. The measurement rate must be >= the
    // integration time for accurate readings.
    sensor.set_gain(4).expect("failed to set gain");
    sensor.set_integration_time(100).expect("failed to set integration time");
    sensor.set_measurement_rate(200).expect("failed to set measurement rate");

    // The sample buffered before reconfiguration still carries the old
    // settings; flush it before trusting the readings.
    sensor
        .discard_buffered_sample()
        .expect("failed to flush the stale sample");

    println!("Sensor configured:");
    println!("   - Gain: 4x");
    println!("   - Integration time: 100 ms");
    println!("   - Measurement rate: 200 ms");
    println!();

    println!("Starting measurements... (Press Ctrl+C to exit)");
    println!("┌──────────┬─────────┬─────────┬──────────┐");
    println!("│ Vis + IR │   IR    │ Visible │   Lux    │");
    println!("├──────────┼─────────┼─────────┼──────────┤");

    loop {
        // Wait for the next measurement cycle
        std::thread::sleep(std::time::Duration::from_millis(200));

        match sensor.read_channels() {
            Ok((visible_plus_ir, ir)) => {
                let visible = visible_plus_ir - ir;
                let lux = sensor.lux().unwrap_or(0.0);
                println!(
                    "│ {:8} │ {:7} │ {:7} │ {:8.2} │",
                    visible_plus_ir, ir, visible, lux
                );
            }
            Err(Error::DataInvalid) => {
                // The stale sample has been drained; the next cycle will
                // produce a fresh one.
                println!("│ sample overrun, retrying next cycle         │");
            }
            Err(e) => {
                println!("│ Error reading sensor: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn main() {
    println!("LTR-329 Basic Reading Example");
    println!("=============================");
    println!();
    println!("This example requires Linux with I2C support.");
    println!("To adapt for your platform:");
    println!("1. Replace linux-embedded-hal with your platform's HAL");
    println!("2. Update the I2C initialization code");
    println!("3. Ensure your platform supports the embedded-hal traits");
}
