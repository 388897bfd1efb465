//! Interrupt configuration example (LTR-303)
//!
//! This example demonstrates how to:
//! - Configure threshold-based interrupts
//! - Set the persistence count and pin polarity
//! - Enable the interrupt output while the sensor keeps measuring

// This example uses linux-embedded-hal for demonstration
#[cfg(target_os = "linux")]
use linux_embedded_hal::{Delay, I2cdev};
#[cfg(target_os = "linux")]
use ltr329::Ltr303;

#[cfg(target_os = "linux")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize I2C interface
    let i2c = I2cdev::new("/dev/i2c-1")?;
    let delay = Delay;

    let mut sensor = Ltr303::new_with_delay(i2c, delay);

    println!("LTR-303 Interrupt Demo");
    println!("======================");

    println!("Initializing sensor...");
    sensor.init().expect("failed to initialize LTR-303, check your wiring");

    sensor.als().set_gain(1).expect("failed to set gain");
    sensor
        .als()
        .set_integration_time(100)
        .expect("failed to set integration time");
    sensor
        .als()
        .set_measurement_rate(500)
        .expect("failed to set measurement rate");

    // Interrupt fires outside the [100, 2000] window, after 4 consecutive
    // violating samples, with an active-low pin.
    let mut interrupts = sensor.interrupts();
    interrupts.set_threshold_low(100).expect("failed to set low threshold");
    interrupts.set_threshold_high(2000).expect("failed to set high threshold");
    interrupts.set_persistence(4).expect("failed to set persistence");
    interrupts.set_polarity(false).expect("failed to set polarity");
    interrupts.set_enabled(true).expect("failed to enable the interrupt");

    println!("Interrupt configured:");
    println!("   - Window: 100 .. 2000 counts");
    println!("   - Persistence: 4 samples");
    println!("   - Polarity: active-low");
    println!();

    println!("Polling readings... (wire INT to a GPIO to observe the pin)");

    loop {
        std::thread::sleep(std::time::Duration::from_millis(500));

        let status = match sensor.als().status() {
            Ok(status) => status,
            Err(e) => {
                println!("Error reading status: {:?}", e);
                continue;
            }
        };
        if !status.new_data_available {
            continue;
        }

        match sensor.als().read_channels() {
            Ok((visible_plus_ir, ir)) => {
                let in_window = (100..=2000).contains(&visible_plus_ir);
                println!(
                    "Vis+IR: {:5}  IR: {:5}  {}",
                    visible_plus_ir,
                    ir,
                    if in_window { "in window" } else { "OUT OF WINDOW" }
                );
            }
            Err(e) => println!("Error reading sensor: {:?}", e),
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn main() {
    println!("LTR-303 Interrupt Demo");
    println!("======================");
    println!();
    println!("This example requires Linux with I2C support.");
    println!("Replace linux-embedded-hal with your platform's HAL to adapt it.");
}
