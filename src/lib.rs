//! # LTR-329/LTR-303 Ambient Light Sensor Driver
//!
//! This is a platform-agnostic Rust driver for the Lite-On LTR-329 and
//! LTR-303 ambient light sensors, built using the [`embedded-hal`] traits
//! for I2C communication.
//!
//! Both parts expose the same measurement core:
//! - Dual photodiode channels (visible+IR and IR-only), read atomically
//! - Programmable gain (1x to 96x)
//! - Programmable integration time (50ms to 400ms)
//! - Programmable measurement rate (50ms to 2000ms)
//!
//! The LTR-303 additionally drives an interrupt pin with configurable
//! thresholds, persistence, and polarity. The driver models that as
//! composition: [`Ltr303`] wraps an [`Ltr329`] and hands out an
//! [`InterruptControl`] view over the same bus handle.
//!
//! ## Features
//!
//! - **Validated configuration**: gain, integration time, and measurement
//!   rate setters reject values the hardware cannot encode before touching
//!   the bus
//! - **Coherent readings**: both channels are always drained in a single
//!   4-byte transaction, never as two reads a measurement could tear
//! - **Async/await support** with feature gating (optional)
//! - **Lux estimation** from the channel ratio
//! - **No caching**: every getter re-reads the device
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ltr329::Ltr329;
//!
//! # fn main() {
//! # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
//! # let delay = embedded_hal_mock::eh1::delay::NoopDelay::new();
//! let mut sensor = Ltr329::new_with_delay(i2c, delay);
//!
//! // Verify identity, reset, and switch to active mode
//! sensor.init().unwrap();
//!
//! // Configure the measurement
//! sensor.set_gain(4).unwrap();
//! sensor.set_integration_time(100).unwrap();
//! sensor.set_measurement_rate(200).unwrap();
//!
//! // The sample buffered before reconfiguration is stale; flush it
//! sensor.discard_buffered_sample().unwrap();
//!
//! // Poll for readings
//! let (visible_plus_ir, ir) = sensor.read_channels().unwrap();
//! let visible = visible_plus_ir - ir;
//! # let _ = visible;
//! # }
//! ```
//!
//! ## Interrupts (LTR-303)
//!
//! ```rust,no_run
//! use ltr329::Ltr303;
//!
//! # fn main() {
//! # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
//! # let delay = embedded_hal_mock::eh1::delay::NoopDelay::new();
//! let mut sensor = Ltr303::new_with_delay(i2c, delay);
//! sensor.init().unwrap();
//!
//! let mut interrupts = sensor.interrupts();
//! interrupts.set_threshold_low(100).unwrap();
//! interrupts.set_threshold_high(2000).unwrap();
//! interrupts.set_persistence(4).unwrap();
//! interrupts.set_enabled(true).unwrap();
//! # }
//! ```
//!
//! ## Async Usage
//!
//! Enable the `async` feature to use async/await patterns:
//!
//! ```toml
//! [dependencies]
//! ltr329 = { version = "0.1", features = ["async"] }
//! ```
//!
//! ```rust,ignore
//! use ltr329::Ltr329;
//!
//! let i2c = /* your async I2C implementation */;
//! let delay = /* your async delay implementation */;
//! let mut sensor = Ltr329::new_async_with_delay(i2c, delay);
//!
//! sensor.init_async().await.unwrap();
//! sensor.set_gain_async(4).await.unwrap();
//!
//! let (visible_plus_ir, ir) = sensor.read_channels_async().await.unwrap();
//! ```
//!
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal

#![no_std]
#![deny(missing_docs)]

pub mod ll;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

#[cfg(feature = "async")]
use embedded_hal_async::delay::DelayNs as AsyncDelayNs;
#[cfg(feature = "async")]
use embedded_hal_async::i2c::I2c as AsyncI2c;

use crate::ll::{Field, RegisterBus};

pub use crate::ll::I2C_ADDRESS;

/// PART_ID register contents both parts report.
const EXPECTED_PART_ID: u8 = 0xA0;
/// MANUFAC_ID register contents both parts report.
const EXPECTED_MANUFACTURER_ID: u8 = 0x05;

/// Settle time after a soft reset, in milliseconds.
const RESET_SETTLE_MS: u32 = 10;

/// Gain multiplier per register code; codes 4 and 5 are reserved.
const ALS_GAINS: [Option<u8>; 8] = [
    Some(1),
    Some(2),
    Some(4),
    Some(8),
    None,
    None,
    Some(48),
    Some(96),
];

/// Integration time in milliseconds per register code.
const INTEGRATION_TIMES_MS: [u16; 8] = [100, 50, 200, 400, 150, 250, 300, 350];

/// Measurement rate in milliseconds per register code; codes 6 and 7 alias
/// 2000 ms.
const MEASUREMENT_RATES_MS: [u16; 8] = [50, 100, 200, 500, 1000, 2000, 2000, 2000];

fn encode_gain(gain: u8) -> Option<u8> {
    ALS_GAINS
        .iter()
        .position(|&entry| entry == Some(gain))
        .map(|code| code as u8)
}

fn decode_gain(code: u8) -> Option<u8> {
    ALS_GAINS[(code & 0x07) as usize]
}

fn encode_ms(table: &[u16; 8], ms: u16) -> Option<u8> {
    table.iter().position(|&entry| entry == ms).map(|code| code as u8)
}

/// Channel-ratio lux estimate from the LTR-303/329 appendix.
///
/// `integration_ms` scales the counts back to the 100 ms reference window.
/// A fully saturated IR ratio (or two zero channels) yields 0.0.
fn raw_to_lux(visible_plus_ir: u16, ir: u16, gain: u8, integration_ms: u16) -> f32 {
    let ch0 = visible_plus_ir as f32;
    let ch1 = ir as f32;
    let ratio = ch1 / (ch0 + ch1);
    let gain = gain as f32;
    let int_time = integration_ms as f32 / 100.0;

    if ratio < 0.45 {
        (1.7743 * ch0 + 1.1059 * ch1) / gain / int_time
    } else if ratio < 0.64 {
        (4.2785 * ch0 - 1.9548 * ch1) / gain / int_time
    } else if ratio < 0.85 {
        (0.5926 * ch0 - 0.1185 * ch1) / gain / int_time
    } else {
        0.0
    }
}

/// All possible errors in this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error<E> {
    /// I2C communication error
    I2c(E),
    /// The device at the configured address did not identify as an
    /// LTR-329/LTR-303
    InvalidDeviceId {
        /// PART_ID register contents (expected `0xA0`)
        part_id: u8,
        /// MANUFAC_ID register contents (expected `0x05`)
        manufacturer_id: u8,
    },
    /// Configuration value the hardware cannot encode; rejected before any
    /// bus transaction
    InvalidConfig(&'static str),
    /// The gain field holds a reserved code with no defined multiplier
    ReservedGainCode(u8),
    /// The buffered sample was flagged invalid/overrun. It has still been
    /// drained, so the next measurement cycle can proceed; retry after the
    /// next measurement interval.
    DataInvalid,
}

/// Snapshot of the ALS status register. Always read fresh, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct AlsStatus {
    /// The buffered sample was overwritten before being read out.
    pub data_invalid: bool,
    /// A new sample has been acquired since the last data read.
    pub new_data_available: bool,
}

/// LTR-329 driver: device identity, measurement configuration, and the
/// dual-channel reading path.
///
/// The driver holds the bus handle exclusively and keeps no shadow of the
/// device state; every getter issues a fresh transaction. Callers sharing a
/// device between execution contexts must serialize access externally for
/// the whole duration of any call.
pub struct Ltr329<I2C, Delay = ()> {
    bus: RegisterBus<I2C>,
    delay: Delay,
}

impl<I2C, E> Ltr329<I2C, ()>
where
    I2C: I2c<Error = E>,
{
    /// Create a new LTR-329 driver instance without delay support.
    ///
    /// Without a delay provider, [`init`](Self::init) and
    /// [`reset`](Self::reset) are unavailable; use
    /// [`new_with_delay`](Self::new_with_delay) for the full lifecycle.
    pub fn new(i2c: I2C) -> Self {
        Self {
            bus: RegisterBus::new(i2c, I2C_ADDRESS),
            delay: (),
        }
    }
}

impl<I2C, E, Delay> Ltr329<I2C, Delay>
where
    I2C: I2c<Error = E>,
    Delay: DelayNs,
{
    /// Create a new LTR-329 driver instance with delay support.
    pub fn new_with_delay(i2c: I2C, delay: Delay) -> Self {
        Self {
            bus: RegisterBus::new(i2c, I2C_ADDRESS),
            delay,
        }
    }
}

impl<I2C, Delay> Ltr329<I2C, Delay> {
    /// Rebind the driver to a non-default device address.
    pub fn with_address(mut self, address: u8) -> Self {
        self.bus.address = address;
        self
    }

    /// Destroy the driver and return the I2C interface.
    pub fn destroy(self) -> I2C {
        self.bus.release()
    }
}

impl<I2C, E, Delay> Ltr329<I2C, Delay>
where
    I2C: I2c<Error = E>,
{
    /// Verify the attached device and bring it up.
    ///
    /// Reads PART_ID and MANUFAC_ID; both must match the expected constants
    /// or the call fails with [`Error::InvalidDeviceId`] before any further
    /// transaction. On success the sensor is reset and switched to active
    /// mode.
    pub fn init(&mut self) -> Result<(), Error<E>>
    where
        Delay: DelayNs,
    {
        let part_id = self.bus.read_byte(ll::PART_ID).map_err(Error::I2c)?;
        let manufacturer_id = self.bus.read_byte(ll::MANUFAC_ID).map_err(Error::I2c)?;
        if part_id != EXPECTED_PART_ID || manufacturer_id != EXPECTED_MANUFACTURER_ID {
            return Err(Error::InvalidDeviceId {
                part_id,
                manufacturer_id,
            });
        }

        self.reset()?;
        self.set_active_mode(true)
    }

    /// Soft-reset the sensor and wait for it to settle (10 ms).
    pub fn reset(&mut self) -> Result<(), Error<E>>
    where
        Delay: DelayNs,
    {
        self.bus.write_flag(ll::SW_RESET, true).map_err(Error::I2c)?;
        self.delay.delay_ms(RESET_SETTLE_MS);
        Ok(())
    }

    /// Whether the sensor is in active (measuring) mode.
    pub fn active_mode(&mut self) -> Result<bool, Error<E>> {
        self.bus.read_flag(ll::ACTIVE_MODE).map_err(Error::I2c)
    }

    /// Switch between active and standby mode.
    ///
    /// The register bit updates immediately, but data acquisition can lag by
    /// one measurement cycle; see
    /// [`gain_of_current_sample`](Self::gain_of_current_sample).
    pub fn set_active_mode(&mut self, active: bool) -> Result<(), Error<E>> {
        self.bus.write_flag(ll::ACTIVE_MODE, active).map_err(Error::I2c)
    }

    /// ALS gain multiplier: 1, 2, 4, 8, 48 or 96.
    ///
    /// Fails with [`Error::ReservedGainCode`] if the register holds one of
    /// the two reserved codes.
    pub fn gain(&mut self) -> Result<u8, Error<E>> {
        let code = self.bus.read_field(ll::ALS_GAIN).map_err(Error::I2c)?;
        decode_gain(code).ok_or(Error::ReservedGainCode(code))
    }

    /// Set the ALS gain multiplier.
    ///
    /// Takes effect on the next measurement cycle, not the one currently
    /// buffered.
    pub fn set_gain(&mut self, gain: u8) -> Result<(), Error<E>> {
        let code = encode_gain(gain)
            .ok_or(Error::InvalidConfig("gain must be 1, 2, 4, 8, 48 or 96"))?;
        self.bus.write_field(ll::ALS_GAIN, code).map_err(Error::I2c)
    }

    /// ALS integration time in milliseconds: 50, 100, 150, 200, 250, 300,
    /// 350 or 400.
    pub fn integration_time(&mut self) -> Result<u16, Error<E>> {
        let code = self.bus.read_field(ll::INTEGRATION_TIME).map_err(Error::I2c)?;
        Ok(INTEGRATION_TIMES_MS[code as usize])
    }

    /// Set the ALS integration time in milliseconds.
    pub fn set_integration_time(&mut self, ms: u16) -> Result<(), Error<E>> {
        let code = encode_ms(&INTEGRATION_TIMES_MS, ms).ok_or(Error::InvalidConfig(
            "integration time must be 50, 100, 150, 200, 250, 300, 350 or 400 ms",
        ))?;
        self.bus.write_field(ll::INTEGRATION_TIME, code).map_err(Error::I2c)
    }

    /// ALS measurement rate in milliseconds: 50, 100, 200, 500, 1000 or
    /// 2000.
    pub fn measurement_rate(&mut self) -> Result<u16, Error<E>> {
        let code = self.bus.read_field(ll::MEASUREMENT_RATE).map_err(Error::I2c)?;
        Ok(MEASUREMENT_RATES_MS[code as usize])
    }

    /// Set the ALS measurement rate in milliseconds.
    ///
    /// Hardware precondition: the measurement rate must be greater than or
    /// equal to the integration time, otherwise sensor accuracy degrades.
    /// The hardware accepts any combination, so the driver does not enforce
    /// this cross-field constraint.
    pub fn set_measurement_rate(&mut self, ms: u16) -> Result<(), Error<E>> {
        let code = encode_ms(&MEASUREMENT_RATES_MS, ms).ok_or(Error::InvalidConfig(
            "measurement rate must be 50, 100, 200, 500, 1000 or 2000 ms",
        ))?;
        self.bus.write_field(ll::MEASUREMENT_RATE, code).map_err(Error::I2c)
    }

    /// Gain that was active when the currently buffered sample was acquired.
    ///
    /// May differ from [`gain`](Self::gain) right after
    /// [`set_gain`](Self::set_gain), since the new gain has not yet produced
    /// a sample.
    pub fn gain_of_current_sample(&mut self) -> Result<u8, Error<E>> {
        let code = self.bus.read_field(ll::DATA_GAIN).map_err(Error::I2c)?;
        decode_gain(code).ok_or(Error::ReservedGainCode(code))
    }

    /// Read the ALS status register.
    pub fn status(&mut self) -> Result<AlsStatus, Error<E>> {
        let byte = self.bus.read_byte(ll::ALS_STATUS).map_err(Error::I2c)?;
        Ok(AlsStatus {
            data_invalid: ll::DATA_INVALID.extract(byte) != 0,
            new_data_available: ll::NEW_DATA.extract(byte) != 0,
        })
    }

    /// Drain the buffered sample without using it.
    ///
    /// Typically done after reconfiguration, so the next
    /// [`read_channels`](Self::read_channels) reflects the new settings.
    pub fn discard_buffered_sample(&mut self) -> Result<(), Error<E>> {
        self.bus.read_u32_le(ll::ALS_DATA).map_err(Error::I2c).map(drop)
    }

    /// Read both light channels: `(visible_plus_ir, ir)`.
    ///
    /// Both channels are drained in a single 4-byte transaction; reading
    /// them separately could tear the pair if the hardware updates between
    /// reads. If the status register flags the sample invalid/overrun the
    /// call fails with [`Error::DataInvalid`], but the buffer has still been
    /// consumed so the next acquisition cycle can proceed.
    pub fn read_channels(&mut self) -> Result<(u16, u16), Error<E>> {
        let raw = self.bus.read_u32_le(ll::ALS_DATA).map_err(Error::I2c)?;
        if self.status()?.data_invalid {
            return Err(Error::DataInvalid);
        }
        Ok(((raw >> 16) as u16, raw as u16))
    }

    /// The visible + IR light channel.
    ///
    /// Performs the same atomic dual-channel read and validity check as
    /// [`read_channels`](Self::read_channels); provided for symmetry, not as
    /// a cheaper alternative.
    pub fn visible_plus_ir_light(&mut self) -> Result<u16, Error<E>> {
        self.read_channels().map(|(visible_plus_ir, _)| visible_plus_ir)
    }

    /// The IR-only light channel.
    ///
    /// Performs the same atomic dual-channel read and validity check as
    /// [`read_channels`](Self::read_channels).
    pub fn ir_light(&mut self) -> Result<u16, Error<E>> {
        self.read_channels().map(|(_, ir)| ir)
    }

    /// Estimate the ambient light level in lux.
    ///
    /// Combines one dual-channel read with the gain of the buffered sample
    /// and the configured integration time, using the vendor's
    /// channel-ratio formula.
    pub fn lux(&mut self) -> Result<f32, Error<E>> {
        let (visible_plus_ir, ir) = self.read_channels()?;
        let gain = self.gain_of_current_sample()?;
        let integration_ms = self.integration_time()?;
        Ok(raw_to_lux(visible_plus_ir, ir, gain, integration_ms))
    }
}

/// LTR-303 driver: an LTR-329 measurement core plus the interrupt
/// capability.
pub struct Ltr303<I2C, Delay = ()> {
    als: Ltr329<I2C, Delay>,
}

impl<I2C, E> Ltr303<I2C, ()>
where
    I2C: I2c<Error = E>,
{
    /// Create a new LTR-303 driver instance without delay support.
    pub fn new(i2c: I2C) -> Self {
        Self { als: Ltr329::new(i2c) }
    }
}

impl<I2C, E, Delay> Ltr303<I2C, Delay>
where
    I2C: I2c<Error = E>,
    Delay: DelayNs,
{
    /// Create a new LTR-303 driver instance with delay support.
    pub fn new_with_delay(i2c: I2C, delay: Delay) -> Self {
        Self {
            als: Ltr329::new_with_delay(i2c, delay),
        }
    }
}

impl<I2C, Delay> Ltr303<I2C, Delay> {
    /// Rebind the driver to a non-default device address.
    pub fn with_address(mut self, address: u8) -> Self {
        self.als = self.als.with_address(address);
        self
    }

    /// The shared measurement core (identity, configuration, reading
    /// channel).
    pub fn als(&mut self) -> &mut Ltr329<I2C, Delay> {
        &mut self.als
    }

    /// Interrupt configuration view over the same device handle.
    pub fn interrupts(&mut self) -> InterruptControl<'_, I2C> {
        InterruptControl {
            bus: &mut self.als.bus,
        }
    }

    /// Destroy the driver and return the I2C interface.
    pub fn destroy(self) -> I2C {
        self.als.destroy()
    }
}

impl<I2C, E, Delay> Ltr303<I2C, Delay>
where
    I2C: I2c<Error = E>,
{
    /// Verify the attached device and bring it up. See [`Ltr329::init`].
    pub fn init(&mut self) -> Result<(), Error<E>>
    where
        Delay: DelayNs,
    {
        self.als.init()
    }
}

/// Interrupt configuration for the LTR-303, borrowing the device handle of
/// the wrapping driver.
///
/// The enable and polarity bits only latch while the sensor is inactive, so
/// their setters briefly drop the sensor to standby and restore the
/// previous mode before returning. That sequence is a multi-transaction
/// critical section: no other transaction may be issued to the device while
/// a setter runs (the exclusive borrow enforces this within one execution
/// context).
pub struct InterruptControl<'a, I2C> {
    bus: &'a mut RegisterBus<I2C>,
}

impl<'a, I2C, E> InterruptControl<'a, I2C>
where
    I2C: I2c<Error = E>,
{
    /// Upper interrupt threshold, raw 16-bit channel-0 units.
    pub fn threshold_high(&mut self) -> Result<u16, Error<E>> {
        self.bus.read_u16_le(ll::ALS_THRES_UP).map_err(Error::I2c)
    }

    /// Set the upper interrupt threshold. The full 16-bit range is
    /// accepted.
    pub fn set_threshold_high(&mut self, raw: u16) -> Result<(), Error<E>> {
        self.bus.write_u16_le(ll::ALS_THRES_UP, raw).map_err(Error::I2c)
    }

    /// Lower interrupt threshold, raw 16-bit channel-0 units.
    pub fn threshold_low(&mut self) -> Result<u16, Error<E>> {
        self.bus.read_u16_le(ll::ALS_THRES_LOW).map_err(Error::I2c)
    }

    /// Set the lower interrupt threshold. The full 16-bit range is
    /// accepted.
    pub fn set_threshold_low(&mut self, raw: u16) -> Result<(), Error<E>> {
        self.bus.write_u16_le(ll::ALS_THRES_LOW, raw).map_err(Error::I2c)
    }

    /// Number of consecutive threshold-violating samples required before
    /// the interrupt asserts: 1 means every sample, up to 16.
    pub fn persistence(&mut self) -> Result<u8, Error<E>> {
        Ok(self.bus.read_field(ll::INT_PERSIST).map_err(Error::I2c)? + 1)
    }

    /// Set the interrupt persistence count (1 to 16 samples).
    pub fn set_persistence(&mut self, samples: u8) -> Result<(), Error<E>> {
        if !(1..=16).contains(&samples) {
            return Err(Error::InvalidConfig("persistence must be 1 to 16 samples"));
        }
        self.bus.write_field(ll::INT_PERSIST, samples - 1).map_err(Error::I2c)
    }

    /// Whether the interrupt pin is enabled.
    pub fn enabled(&mut self) -> Result<bool, Error<E>> {
        self.bus.read_flag(ll::INT_ENABLE).map_err(Error::I2c)
    }

    /// Enable or disable the interrupt pin.
    pub fn set_enabled(&mut self, enable: bool) -> Result<(), Error<E>> {
        self.write_flag_in_standby(ll::INT_ENABLE, enable)
    }

    /// Interrupt pin polarity: `true` for active-high.
    pub fn polarity(&mut self) -> Result<bool, Error<E>> {
        self.bus.read_flag(ll::INT_POLARITY).map_err(Error::I2c)
    }

    /// Set the interrupt pin polarity.
    pub fn set_polarity(&mut self, active_high: bool) -> Result<(), Error<E>> {
        self.write_flag_in_standby(ll::INT_POLARITY, active_high)
    }

    // The interrupt bits only latch while the sensor is inactive: save the
    // current mode, drop to standby, write, restore. The restore write is
    // issued on every exit path; a failed flag write takes precedence in
    // the reported result.
    fn write_flag_in_standby(&mut self, field: Field, value: bool) -> Result<(), Error<E>> {
        let saved = self.bus.read_flag(ll::ACTIVE_MODE).map_err(Error::I2c)?;
        self.bus.write_flag(ll::ACTIVE_MODE, false).map_err(Error::I2c)?;
        let write = self.bus.write_flag(field, value).map_err(Error::I2c);
        let restore = self.bus.write_flag(ll::ACTIVE_MODE, saved).map_err(Error::I2c);
        write.and(restore)
    }
}

#[cfg(feature = "async")]
impl<I2C, E> Ltr329<I2C, ()>
where
    I2C: AsyncI2c<Error = E>,
{
    /// Create a new LTR-329 driver instance without delay support (async
    /// version).
    pub fn new_async(i2c: I2C) -> Self {
        Self {
            bus: RegisterBus::new(i2c, I2C_ADDRESS),
            delay: (),
        }
    }
}

#[cfg(feature = "async")]
impl<I2C, E, Delay> Ltr329<I2C, Delay>
where
    I2C: AsyncI2c<Error = E>,
    Delay: AsyncDelayNs,
{
    /// Create a new LTR-329 driver instance with delay support (async
    /// version).
    pub fn new_async_with_delay(i2c: I2C, delay: Delay) -> Self {
        Self {
            bus: RegisterBus::new(i2c, I2C_ADDRESS),
            delay,
        }
    }
}

#[cfg(feature = "async")]
impl<I2C, E, Delay> Ltr329<I2C, Delay>
where
    I2C: AsyncI2c<Error = E>,
{
    /// Verify the attached device and bring it up (async version).
    pub async fn init_async(&mut self) -> Result<(), Error<E>>
    where
        Delay: AsyncDelayNs,
    {
        let part_id = self.bus.read_byte_async(ll::PART_ID).await.map_err(Error::I2c)?;
        let manufacturer_id = self
            .bus
            .read_byte_async(ll::MANUFAC_ID)
            .await
            .map_err(Error::I2c)?;
        if part_id != EXPECTED_PART_ID || manufacturer_id != EXPECTED_MANUFACTURER_ID {
            return Err(Error::InvalidDeviceId {
                part_id,
                manufacturer_id,
            });
        }

        self.reset_async().await?;
        self.set_active_mode_async(true).await
    }

    /// Soft-reset the sensor and wait for it to settle (async version).
    pub async fn reset_async(&mut self) -> Result<(), Error<E>>
    where
        Delay: AsyncDelayNs,
    {
        self.bus
            .write_flag_async(ll::SW_RESET, true)
            .await
            .map_err(Error::I2c)?;
        self.delay.delay_ms(RESET_SETTLE_MS).await;
        Ok(())
    }

    /// Whether the sensor is in active mode (async version).
    pub async fn active_mode_async(&mut self) -> Result<bool, Error<E>> {
        self.bus.read_flag_async(ll::ACTIVE_MODE).await.map_err(Error::I2c)
    }

    /// Switch between active and standby mode (async version).
    pub async fn set_active_mode_async(&mut self, active: bool) -> Result<(), Error<E>> {
        self.bus
            .write_flag_async(ll::ACTIVE_MODE, active)
            .await
            .map_err(Error::I2c)
    }

    /// ALS gain multiplier (async version).
    pub async fn gain_async(&mut self) -> Result<u8, Error<E>> {
        let code = self.bus.read_field_async(ll::ALS_GAIN).await.map_err(Error::I2c)?;
        decode_gain(code).ok_or(Error::ReservedGainCode(code))
    }

    /// Set the ALS gain multiplier (async version).
    pub async fn set_gain_async(&mut self, gain: u8) -> Result<(), Error<E>> {
        let code = encode_gain(gain)
            .ok_or(Error::InvalidConfig("gain must be 1, 2, 4, 8, 48 or 96"))?;
        self.bus
            .write_field_async(ll::ALS_GAIN, code)
            .await
            .map_err(Error::I2c)
    }

    /// ALS integration time in milliseconds (async version).
    pub async fn integration_time_async(&mut self) -> Result<u16, Error<E>> {
        let code = self
            .bus
            .read_field_async(ll::INTEGRATION_TIME)
            .await
            .map_err(Error::I2c)?;
        Ok(INTEGRATION_TIMES_MS[code as usize])
    }

    /// Set the ALS integration time in milliseconds (async version).
    pub async fn set_integration_time_async(&mut self, ms: u16) -> Result<(), Error<E>> {
        let code = encode_ms(&INTEGRATION_TIMES_MS, ms).ok_or(Error::InvalidConfig(
            "integration time must be 50, 100, 150, 200, 250, 300, 350 or 400 ms",
        ))?;
        self.bus
            .write_field_async(ll::INTEGRATION_TIME, code)
            .await
            .map_err(Error::I2c)
    }

    /// ALS measurement rate in milliseconds (async version).
    pub async fn measurement_rate_async(&mut self) -> Result<u16, Error<E>> {
        let code = self
            .bus
            .read_field_async(ll::MEASUREMENT_RATE)
            .await
            .map_err(Error::I2c)?;
        Ok(MEASUREMENT_RATES_MS[code as usize])
    }

    /// Set the ALS measurement rate in milliseconds (async version).
    ///
    /// The measurement rate must be greater than or equal to the
    /// integration time; see [`set_measurement_rate`](Self::set_measurement_rate).
    pub async fn set_measurement_rate_async(&mut self, ms: u16) -> Result<(), Error<E>> {
        let code = encode_ms(&MEASUREMENT_RATES_MS, ms).ok_or(Error::InvalidConfig(
            "measurement rate must be 50, 100, 200, 500, 1000 or 2000 ms",
        ))?;
        self.bus
            .write_field_async(ll::MEASUREMENT_RATE, code)
            .await
            .map_err(Error::I2c)
    }

    /// Gain of the currently buffered sample (async version).
    pub async fn gain_of_current_sample_async(&mut self) -> Result<u8, Error<E>> {
        let code = self.bus.read_field_async(ll::DATA_GAIN).await.map_err(Error::I2c)?;
        decode_gain(code).ok_or(Error::ReservedGainCode(code))
    }

    /// Read the ALS status register (async version).
    pub async fn status_async(&mut self) -> Result<AlsStatus, Error<E>> {
        let byte = self.bus.read_byte_async(ll::ALS_STATUS).await.map_err(Error::I2c)?;
        Ok(AlsStatus {
            data_invalid: ll::DATA_INVALID.extract(byte) != 0,
            new_data_available: ll::NEW_DATA.extract(byte) != 0,
        })
    }

    /// Drain the buffered sample without using it (async version).
    pub async fn discard_buffered_sample_async(&mut self) -> Result<(), Error<E>> {
        self.bus
            .read_u32_le_async(ll::ALS_DATA)
            .await
            .map_err(Error::I2c)
            .map(drop)
    }

    /// Read both light channels atomically (async version). See
    /// [`read_channels`](Self::read_channels).
    pub async fn read_channels_async(&mut self) -> Result<(u16, u16), Error<E>> {
        let raw = self.bus.read_u32_le_async(ll::ALS_DATA).await.map_err(Error::I2c)?;
        if self.status_async().await?.data_invalid {
            return Err(Error::DataInvalid);
        }
        Ok(((raw >> 16) as u16, raw as u16))
    }

    /// The visible + IR light channel (async version).
    pub async fn visible_plus_ir_light_async(&mut self) -> Result<u16, Error<E>> {
        self.read_channels_async()
            .await
            .map(|(visible_plus_ir, _)| visible_plus_ir)
    }

    /// The IR-only light channel (async version).
    pub async fn ir_light_async(&mut self) -> Result<u16, Error<E>> {
        self.read_channels_async().await.map(|(_, ir)| ir)
    }

    /// Estimate the ambient light level in lux (async version).
    pub async fn lux_async(&mut self) -> Result<f32, Error<E>> {
        let (visible_plus_ir, ir) = self.read_channels_async().await?;
        let gain = self.gain_of_current_sample_async().await?;
        let integration_ms = self.integration_time_async().await?;
        Ok(raw_to_lux(visible_plus_ir, ir, gain, integration_ms))
    }
}

#[cfg(feature = "async")]
impl<I2C, E> Ltr303<I2C, ()>
where
    I2C: AsyncI2c<Error = E>,
{
    /// Create a new LTR-303 driver instance without delay support (async
    /// version).
    pub fn new_async(i2c: I2C) -> Self {
        Self {
            als: Ltr329::new_async(i2c),
        }
    }
}

#[cfg(feature = "async")]
impl<I2C, E, Delay> Ltr303<I2C, Delay>
where
    I2C: AsyncI2c<Error = E>,
    Delay: AsyncDelayNs,
{
    /// Create a new LTR-303 driver instance with delay support (async
    /// version).
    pub fn new_async_with_delay(i2c: I2C, delay: Delay) -> Self {
        Self {
            als: Ltr329::new_async_with_delay(i2c, delay),
        }
    }
}

#[cfg(feature = "async")]
impl<I2C, E, Delay> Ltr303<I2C, Delay>
where
    I2C: AsyncI2c<Error = E>,
{
    /// Verify the attached device and bring it up (async version).
    pub async fn init_async(&mut self) -> Result<(), Error<E>>
    where
        Delay: AsyncDelayNs,
    {
        self.als.init_async().await
    }
}

#[cfg(feature = "async")]
impl<'a, I2C, E> InterruptControl<'a, I2C>
where
    I2C: AsyncI2c<Error = E>,
{
    /// Upper interrupt threshold (async version).
    pub async fn threshold_high_async(&mut self) -> Result<u16, Error<E>> {
        self.bus.read_u16_le_async(ll::ALS_THRES_UP).await.map_err(Error::I2c)
    }

    /// Set the upper interrupt threshold (async version).
    pub async fn set_threshold_high_async(&mut self, raw: u16) -> Result<(), Error<E>> {
        self.bus
            .write_u16_le_async(ll::ALS_THRES_UP, raw)
            .await
            .map_err(Error::I2c)
    }

    /// Lower interrupt threshold (async version).
    pub async fn threshold_low_async(&mut self) -> Result<u16, Error<E>> {
        self.bus.read_u16_le_async(ll::ALS_THRES_LOW).await.map_err(Error::I2c)
    }

    /// Set the lower interrupt threshold (async version).
    pub async fn set_threshold_low_async(&mut self, raw: u16) -> Result<(), Error<E>> {
        self.bus
            .write_u16_le_async(ll::ALS_THRES_LOW, raw)
            .await
            .map_err(Error::I2c)
    }

    /// Interrupt persistence count (async version).
    pub async fn persistence_async(&mut self) -> Result<u8, Error<E>> {
        Ok(self.bus.read_field_async(ll::INT_PERSIST).await.map_err(Error::I2c)? + 1)
    }

    /// Set the interrupt persistence count (async version).
    pub async fn set_persistence_async(&mut self, samples: u8) -> Result<(), Error<E>> {
        if !(1..=16).contains(&samples) {
            return Err(Error::InvalidConfig("persistence must be 1 to 16 samples"));
        }
        self.bus
            .write_field_async(ll::INT_PERSIST, samples - 1)
            .await
            .map_err(Error::I2c)
    }

    /// Whether the interrupt pin is enabled (async version).
    pub async fn enabled_async(&mut self) -> Result<bool, Error<E>> {
        self.bus.read_flag_async(ll::INT_ENABLE).await.map_err(Error::I2c)
    }

    /// Enable or disable the interrupt pin (async version).
    pub async fn set_enabled_async(&mut self, enable: bool) -> Result<(), Error<E>> {
        self.write_flag_in_standby_async(ll::INT_ENABLE, enable).await
    }

    /// Interrupt pin polarity (async version).
    pub async fn polarity_async(&mut self) -> Result<bool, Error<E>> {
        self.bus.read_flag_async(ll::INT_POLARITY).await.map_err(Error::I2c)
    }

    /// Set the interrupt pin polarity (async version).
    pub async fn set_polarity_async(&mut self, active_high: bool) -> Result<(), Error<E>> {
        self.write_flag_in_standby_async(ll::INT_POLARITY, active_high).await
    }

    async fn write_flag_in_standby_async(
        &mut self,
        field: Field,
        value: bool,
    ) -> Result<(), Error<E>> {
        let saved = self.bus.read_flag_async(ll::ACTIVE_MODE).await.map_err(Error::I2c)?;
        self.bus
            .write_flag_async(ll::ACTIVE_MODE, false)
            .await
            .map_err(Error::I2c)?;
        let write = self.bus.write_flag_async(field, value).await.map_err(Error::I2c);
        let restore = self
            .bus
            .write_flag_async(ll::ACTIVE_MODE, saved)
            .await
            .map_err(Error::I2c);
        write.and(restore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    extern crate std;
    use std::vec;
    use std::vec::Vec;

    #[test]
    fn test_device_creation() {
        let expectations = [];
        let i2c = I2cMock::new(&expectations);
        let sensor = Ltr329::new(i2c);
        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_init_verifies_identity_then_resets_and_activates() {
        let expectations = [
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x86], vec![0xA0]),
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x87], vec![0x05]),
            // soft reset (read-modify-write of ALS_CONTR)
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x80], vec![0x00]),
            I2cTransaction::write(I2C_ADDRESS, vec![0x80, 0x02]),
            // active mode, after the reset cleared the register
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x80], vec![0x00]),
            I2cTransaction::write(I2C_ADDRESS, vec![0x80, 0x01]),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Ltr329::new_with_delay(i2c, NoopDelay::new());

        sensor.init().unwrap();

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_init_rejects_identity_mismatch_without_reset() {
        let expectations = [
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x86], vec![0x00]),
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x87], vec![0x05]),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Ltr329::new_with_delay(i2c, NoopDelay::new());

        assert_eq!(
            sensor.init(),
            Err(Error::InvalidDeviceId {
                part_id: 0x00,
                manufacturer_id: 0x05,
            })
        );

        // done() verifies no reset transaction followed the failed check
        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_gain_round_trip_for_every_table_entry() {
        let pairs: [(u8, u8); 6] = [(1, 0), (2, 1), (4, 2), (8, 3), (48, 6), (96, 7)];

        let mut expectations = Vec::new();
        let mut contr = 0x00u8;
        for &(_, code) in &pairs {
            // setter read-modify-writes the gain field
            expectations.push(I2cTransaction::write_read(
                I2C_ADDRESS,
                vec![0x80],
                vec![contr],
            ));
            contr = code << 2;
            expectations.push(I2cTransaction::write(I2C_ADDRESS, vec![0x80, contr]));
            // getter reads it back
            expectations.push(I2cTransaction::write_read(
                I2C_ADDRESS,
                vec![0x80],
                vec![contr],
            ));
        }
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Ltr329::new(i2c);

        for &(gain, _) in &pairs {
            sensor.set_gain(gain).unwrap();
            assert_eq!(sensor.gain().unwrap(), gain);
        }

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_set_gain_rejects_unsupported_values_without_transactions() {
        let i2c = I2cMock::new(&[]);
        let mut sensor = Ltr329::new(i2c);

        for gain in [0u8, 3, 16, 47, 97, 255] {
            assert!(matches!(sensor.set_gain(gain), Err(Error::InvalidConfig(_))));
        }

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_gain_reports_reserved_register_code() {
        let expectations = [I2cTransaction::write_read(
            I2C_ADDRESS,
            vec![0x80],
            vec![4 << 2],
        )];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Ltr329::new(i2c);

        assert_eq!(sensor.gain(), Err(Error::ReservedGainCode(4)));

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_integration_time_round_trip_for_every_table_entry() {
        let pairs: [(u16, u8); 8] = [
            (100, 0),
            (50, 1),
            (200, 2),
            (400, 3),
            (150, 4),
            (250, 5),
            (300, 6),
            (350, 7),
        ];

        let mut expectations = Vec::new();
        let mut measrate = 0x00u8;
        for &(_, code) in &pairs {
            expectations.push(I2cTransaction::write_read(
                I2C_ADDRESS,
                vec![0x85],
                vec![measrate],
            ));
            measrate = code << 3;
            expectations.push(I2cTransaction::write(I2C_ADDRESS, vec![0x85, measrate]));
            expectations.push(I2cTransaction::write_read(
                I2C_ADDRESS,
                vec![0x85],
                vec![measrate],
            ));
        }
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Ltr329::new(i2c);

        for &(ms, _) in &pairs {
            sensor.set_integration_time(ms).unwrap();
            assert_eq!(sensor.integration_time().unwrap(), ms);
        }

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_measurement_rate_round_trip_for_every_table_entry() {
        let pairs: [(u16, u8); 6] = [(50, 0), (100, 1), (200, 2), (500, 3), (1000, 4), (2000, 5)];

        let mut expectations = Vec::new();
        let mut measrate = 0x00u8;
        for &(_, code) in &pairs {
            expectations.push(I2cTransaction::write_read(
                I2C_ADDRESS,
                vec![0x85],
                vec![measrate],
            ));
            measrate = code;
            expectations.push(I2cTransaction::write(I2C_ADDRESS, vec![0x85, measrate]));
            expectations.push(I2cTransaction::write_read(
                I2C_ADDRESS,
                vec![0x85],
                vec![measrate],
            ));
        }
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Ltr329::new(i2c);

        for &(ms, _) in &pairs {
            sensor.set_measurement_rate(ms).unwrap();
            assert_eq!(sensor.measurement_rate().unwrap(), ms);
        }

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_measurement_rate_alias_codes_decode_to_2000() {
        let expectations = [
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x85], vec![0x06]),
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x85], vec![0x07]),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Ltr329::new(i2c);

        assert_eq!(sensor.measurement_rate().unwrap(), 2000);
        assert_eq!(sensor.measurement_rate().unwrap(), 2000);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_timing_setters_reject_off_table_values_without_transactions() {
        let i2c = I2cMock::new(&[]);
        let mut sensor = Ltr329::new(i2c);

        assert!(matches!(
            sensor.set_integration_time(75),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            sensor.set_measurement_rate(250),
            Err(Error::InvalidConfig(_))
        ));

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_read_channels_splits_the_atomic_pair() {
        let expectations = [
            // 0x12340056 little-endian across 0x88..0x8B
            I2cTransaction::write_read(
                I2C_ADDRESS,
                vec![0x88],
                vec![0x56, 0x00, 0x34, 0x12],
            ),
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x8C], vec![0x04]),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Ltr329::new(i2c);

        assert_eq!(sensor.read_channels().unwrap(), (0x1234, 0x0056));

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_read_channels_drains_exactly_once_on_invalid_data() {
        let expectations = [
            I2cTransaction::write_read(
                I2C_ADDRESS,
                vec![0x88],
                vec![0xAA, 0xBB, 0xCC, 0xDD],
            ),
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x8C], vec![0x80]),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Ltr329::new(i2c);

        assert_eq!(sensor.read_channels(), Err(Error::DataInvalid));

        // done() verifies the drain was a single 4-byte transaction
        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_discard_buffered_sample_issues_one_channel_read() {
        let expectations = [I2cTransaction::write_read(
            I2C_ADDRESS,
            vec![0x88],
            vec![0x00, 0x00, 0x00, 0x00],
        )];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Ltr329::new(i2c);

        sensor.discard_buffered_sample().unwrap();

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_status_decodes_invalid_and_new_data_flags() {
        let expectations = [
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x8C], vec![0x84]),
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x8C], vec![0x00]),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Ltr329::new(i2c);

        assert_eq!(
            sensor.status().unwrap(),
            AlsStatus {
                data_invalid: true,
                new_data_available: true,
            }
        );
        assert_eq!(
            sensor.status().unwrap(),
            AlsStatus {
                data_invalid: false,
                new_data_available: false,
            }
        );

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_gain_of_current_sample_reads_the_status_register() {
        let expectations = [I2cTransaction::write_read(
            I2C_ADDRESS,
            vec![0x8C],
            vec![0x60],
        )];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Ltr329::new(i2c);

        // bits 6:4 = 0b110, the 48x code
        assert_eq!(sensor.gain_of_current_sample().unwrap(), 48);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_persistence_round_trip_and_range_check() {
        let mut expectations = Vec::new();
        let mut persist = 0x00u8;
        for samples in 1..=16u8 {
            expectations.push(I2cTransaction::write_read(
                I2C_ADDRESS,
                vec![0x9E],
                vec![persist],
            ));
            persist = samples - 1;
            expectations.push(I2cTransaction::write(I2C_ADDRESS, vec![0x9E, persist]));
            expectations.push(I2cTransaction::write_read(
                I2C_ADDRESS,
                vec![0x9E],
                vec![persist],
            ));
        }
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Ltr303::new(i2c);

        let mut interrupts = sensor.interrupts();
        for samples in 1..=16u8 {
            interrupts.set_persistence(samples).unwrap();
            assert_eq!(interrupts.persistence().unwrap(), samples);
        }
        assert!(matches!(
            interrupts.set_persistence(0),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            interrupts.set_persistence(17),
            Err(Error::InvalidConfig(_))
        ));

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_thresholds_are_single_16_bit_transactions() {
        let expectations = [
            I2cTransaction::write(I2C_ADDRESS, vec![0x97, 0xEF, 0xBE]),
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x97], vec![0xEF, 0xBE]),
            I2cTransaction::write(I2C_ADDRESS, vec![0x99, 0x64, 0x00]),
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x99], vec![0x64, 0x00]),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Ltr303::new(i2c);

        let mut interrupts = sensor.interrupts();
        interrupts.set_threshold_high(0xBEEF).unwrap();
        assert_eq!(interrupts.threshold_high().unwrap(), 0xBEEF);
        interrupts.set_threshold_low(100).unwrap();
        assert_eq!(interrupts.threshold_low().unwrap(), 100);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_set_enabled_drops_to_standby_and_restores_active_mode() {
        let expectations = [
            // save the current mode
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x80], vec![0x01]),
            // transient standby, strictly before the interrupt write
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x80], vec![0x01]),
            I2cTransaction::write(I2C_ADDRESS, vec![0x80, 0x00]),
            // the interrupt enable bit itself
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x8F], vec![0x00]),
            I2cTransaction::write(I2C_ADDRESS, vec![0x8F, 0x02]),
            // restore the saved mode
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x80], vec![0x00]),
            I2cTransaction::write(I2C_ADDRESS, vec![0x80, 0x01]),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Ltr303::new(i2c);

        sensor.interrupts().set_enabled(true).unwrap();

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_set_polarity_keeps_an_inactive_sensor_inactive() {
        let expectations = [
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x80], vec![0x00]),
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x80], vec![0x00]),
            I2cTransaction::write(I2C_ADDRESS, vec![0x80, 0x00]),
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x8F], vec![0x00]),
            I2cTransaction::write(I2C_ADDRESS, vec![0x8F, 0x04]),
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x80], vec![0x00]),
            I2cTransaction::write(I2C_ADDRESS, vec![0x80, 0x00]),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Ltr303::new(i2c);

        sensor.interrupts().set_polarity(true).unwrap();

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_end_to_end_bring_up_and_reading() {
        let expectations = [
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x86], vec![0xA0]),
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x87], vec![0x05]),
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x80], vec![0x00]),
            I2cTransaction::write(I2C_ADDRESS, vec![0x80, 0x02]),
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x80], vec![0x00]),
            I2cTransaction::write(I2C_ADDRESS, vec![0x80, 0x01]),
            // channel value 0x00640032: visible+IR = 100, IR = 50
            I2cTransaction::write_read(
                I2C_ADDRESS,
                vec![0x88],
                vec![0x32, 0x00, 0x64, 0x00],
            ),
            I2cTransaction::write_read(I2C_ADDRESS, vec![0x8C], vec![0x04]),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Ltr329::new_with_delay(i2c, NoopDelay::new());

        sensor.init().unwrap();
        let (visible_plus_ir, ir) = sensor.read_channels().unwrap();
        assert_eq!((visible_plus_ir, ir), (100, 50));
        assert_eq!(visible_plus_ir - ir, 50);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_lux_formula_branches() {
        // equal channels: ratio 0.5, middle coefficient band
        assert_eq!(raw_to_lux(0x1000, 0x1000, 1, 100), 9517.875);
        // IR-dominated: ratio beyond the last band reads as darkness
        assert_eq!(raw_to_lux(0, 0xFFFF, 1, 100), 0.0);
        // no light on either channel
        assert_eq!(raw_to_lux(0, 0, 1, 100), 0.0);
        // gain and integration time scale the estimate down
        let reference = raw_to_lux(4096, 0, 1, 100);
        assert_eq!(raw_to_lux(4096, 0, 8, 100), reference / 8.0);
        assert_eq!(raw_to_lux(4096, 0, 1, 400), reference / 4.0);
    }
}
