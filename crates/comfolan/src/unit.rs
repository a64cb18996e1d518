// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! High-level ventilation unit control.
//!
//! Thin verbs over the protocol engine: fan speed, operating mode, bypass,
//! balance, boost, away, ComfoCool, temperature profile, and the sensor
//! registration layer with the catalog's display scaling. The RMI byte
//! strings are the unit's schedule commands; opcode 0x83 reads a schedule
//! entry, 0x84 sets one with a duration, 0x85 clears it.

use crate::bridge::Bridge;
use crate::error::{DecodeError, Error};
use crate::pdo::{Consumer, PdoType, PdoValue};
use crate::rmi::{self, unit, NODE_VENTILATION_UNIT};
use crate::sensors::{self, Sensor};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::debug;

const SUBUNIT_FAN_SPEED: u8 = 0x01;
const SUBUNIT_BYPASS: u8 = 0x02;
const SUBUNIT_TEMPERATURE_PROFILE: u8 = 0x03;
const SUBUNIT_COMFOCOOL: u8 = 0x05;
const SUBUNIT_SUPPLY_FAN: u8 = 0x06;
const SUBUNIT_EXHAUST_FAN: u8 = 0x07;
const SUBUNIT_OPERATING_MODE: u8 = 0x08;

const CMD_DEFAULT: u8 = 0x01;
const CMD_BOOST: u8 = 0x06;
const CMD_AWAY: u8 = 0x0b;

/// Until explicitly changed.
const TIMEOUT_PERSISTENT: i32 = -1;

/// Read a schedule entry: `83 15 subunit cmd`.
fn schedule_get(subunit: u8, cmd: u8) -> Vec<u8> {
    vec![0x83, unit::SCHEDULE, subunit, cmd]
}

/// Set a schedule entry with a duration: `84 15 subunit cmd 00000000 timeout value`.
fn schedule_set(subunit: u8, cmd: u8, timeout: i32, value: u8) -> Vec<u8> {
    let mut msg = vec![0x84, unit::SCHEDULE, subunit, cmd, 0x00, 0x00, 0x00, 0x00];
    msg.extend_from_slice(&timeout.to_le_bytes());
    msg.push(value);
    msg
}

/// Clear a schedule entry: `85 15 subunit cmd`.
fn schedule_clear(subunit: u8, cmd: u8) -> Vec<u8> {
    vec![0x85, unit::SCHEDULE, subunit, cmd]
}

fn first_byte(reply: &[u8]) -> Result<u8, Error> {
    reply
        .first()
        .copied()
        .ok_or_else(|| DecodeError::Truncated { expected: 1, got: 0 }.into())
}

fn last_byte(reply: &[u8]) -> Result<u8, Error> {
    reply
        .last()
        .copied()
        .ok_or_else(|| DecodeError::Truncated { expected: 1, got: 0 }.into())
}

// ---------------------------------------------------------------------------
// Setting enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VentilationSpeed {
    Away,
    Low,
    Medium,
    High,
}

impl VentilationSpeed {
    fn level(self) -> u8 {
        match self {
            Self::Away => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Away),
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for VentilationSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Away => "away",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for VentilationSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "away" => Ok(Self::Away),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("invalid speed: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VentilationMode {
    Auto,
    Manual,
}

impl fmt::Display for VentilationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if *self == Self::Auto { "auto" } else { "manual" })
    }
}

impl FromStr for VentilationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "manual" => Ok(Self::Manual),
            other => Err(format!("invalid mode: {}", other)),
        }
    }
}

/// Tri-state setting used by bypass and the sensor-based ventilation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VentilationSetting {
    Auto,
    On,
    Off,
}

impl fmt::Display for VentilationSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Auto => "auto",
            Self::On => "on",
            Self::Off => "off",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for VentilationSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            other => Err(format!("invalid setting: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VentilationBalance {
    Balance,
    SupplyOnly,
    ExhaustOnly,
}

impl fmt::Display for VentilationBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Balance => "balance",
            Self::SupplyOnly => "supply_only",
            Self::ExhaustOnly => "exhaust_only",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for VentilationBalance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "balance" => Ok(Self::Balance),
            "supply_only" => Ok(Self::SupplyOnly),
            "exhaust_only" => Ok(Self::ExhaustOnly),
            other => Err(format!("invalid balance mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureProfile {
    Warm,
    Normal,
    Cool,
}

impl TemperatureProfile {
    fn level(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Cool => 1,
            Self::Warm => 2,
        }
    }
}

impl fmt::Display for TemperatureProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Warm => "warm",
            Self::Normal => "normal",
            Self::Cool => "cool",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for TemperatureProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warm" => Ok(Self::Warm),
            "normal" => Ok(Self::Normal),
            "cool" => Ok(Self::Cool),
            other => Err(format!("invalid temperature profile: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComfoCoolMode {
    Auto,
    Off,
}

impl fmt::Display for ComfoCoolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if *self == Self::Auto { "auto" } else { "off" })
    }
}

impl FromStr for ComfoCoolMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "off" => Ok(Self::Off),
            other => Err(format!("invalid comfocool mode: {}", other)),
        }
    }
}

/// Sensor-based ventilation control channels on the temp/hum control unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorVentMode {
    TemperaturePassive,
    HumidityComfort,
    HumidityProtection,
}

impl SensorVentMode {
    fn property(self) -> u8 {
        match self {
            Self::TemperaturePassive => 0x04,
            Self::HumidityComfort => 0x06,
            Self::HumidityProtection => 0x07,
        }
    }
}

// ---------------------------------------------------------------------------
// High-level client
// ---------------------------------------------------------------------------

/// Callback invoked with (sensor, decoded value) on every update.
pub type SensorCallback = Arc<dyn Fn(&'static Sensor, PdoValue) + Send + Sync>;

/// Callback invoked with (node id, decoded errors) on alarm updates.
pub type AlarmCallback = Arc<dyn Fn(u32, Vec<(u32, &'static str)>) + Send + Sync>;

struct SensorState {
    callback: Mutex<Option<SensorCallback>>,
    /// Values are buffered until this instant right after connecting; the
    /// bridge emits stale samples for the first moments of a session.
    hold_until: Mutex<Option<Instant>>,
    latest: Mutex<HashMap<u32, (&'static Sensor, PdoValue)>>,
}

impl SensorState {
    fn on_sample(&self, sensor: &'static Sensor, value: PdoValue) {
        let held = {
            let hold = self.hold_until.lock().expect("sensor hold poisoned");
            matches!(*hold, Some(until) if Instant::now() < until)
        };

        self.latest
            .lock()
            .expect("sensor values poisoned")
            .insert(sensor.id, (sensor, value.clone()));

        if held {
            return;
        }
        let callback = self.callback.lock().expect("sensor callback poisoned").clone();
        if let Some(callback) = callback {
            callback(sensor, value);
        }
    }

    fn flush(&self) {
        *self.hold_until.lock().expect("sensor hold poisoned") = None;
        let snapshot: Vec<(&'static Sensor, PdoValue)> = {
            let latest = self.latest.lock().expect("sensor values poisoned");
            latest.values().cloned().collect()
        };
        let callback = self.callback.lock().expect("sensor callback poisoned").clone();
        if let Some(callback) = callback {
            for (sensor, value) in snapshot {
                callback(sensor, value);
            }
        }
    }
}

/// A connected ventilation unit, addressed through its bridge.
pub struct ComfoClient {
    bridge: Bridge,
    sensor_state: Arc<SensorState>,
}

impl ComfoClient {
    pub fn new(bridge: Bridge) -> Self {
        Self {
            bridge,
            sensor_state: Arc::new(SensorState {
                callback: Mutex::new(None),
                hold_until: Mutex::new(None),
                latest: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// Connect, start the session, and hold sensor emission briefly so
    /// the bridge's stale initial samples are not surfaced.
    pub async fn connect(&self) -> Result<(), Error> {
        self.bridge.connect(true).await?;

        let hold = self.bridge.session().config().sensor_hold();
        if !hold.is_zero() {
            debug!(hold = ?hold, "holding sensor emission");
            *self
                .sensor_state
                .hold_until
                .lock()
                .expect("sensor hold poisoned") = Some(Instant::now() + hold);

            let state = Arc::clone(&self.sensor_state);
            tokio::spawn(async move {
                tokio::time::sleep(hold).await;
                state.flush();
            });
        }
        Ok(())
    }

    pub async fn disconnect(&self) {
        self.bridge.disconnect().await
    }

    /// Set the callback receiving decoded sensor updates.
    pub fn set_sensor_callback(&self, callback: Option<SensorCallback>) {
        *self
            .sensor_state
            .callback
            .lock()
            .expect("sensor callback poisoned") = callback;
    }

    /// Set the callback receiving decoded alarm reports.
    pub fn set_alarm_callback(&self, callback: Option<AlarmCallback>) {
        match callback {
            Some(callback) => {
                self.bridge.set_alarm_handler(Some(Arc::new(move |node_id, alarm| {
                    let errors = sensors::decode_alarm_errors(
                        alarm.errors.as_deref().unwrap_or_default(),
                        alarm.sw_program_version.unwrap_or(u32::MAX),
                    );
                    callback(node_id, errors);
                })));
            }
            None => self.bridge.set_alarm_handler(None),
        }
    }

    /// Subscribe a catalog sensor; updates flow to the sensor callback.
    pub async fn register_sensor(&self, sensor: &'static Sensor) -> Result<(), Error> {
        let state = Arc::clone(&self.sensor_state);
        let consumer: Consumer = Arc::new(move |_, value| state.on_sample(sensor, value));
        self.bridge
            .subscribe(sensor.id, sensor.pdo_type, false, consumer)
            .await
    }

    /// Cancel a catalog sensor subscription.
    pub async fn deregister_sensor(&self, sensor: &'static Sensor) -> Result<(), Error> {
        self.sensor_state
            .latest
            .lock()
            .expect("sensor values poisoned")
            .remove(&sensor.id);
        self.bridge.unsubscribe(sensor.id, sensor.pdo_type).await
    }

    async fn rmi(&self, message: Vec<u8>) -> Result<Vec<u8>, Error> {
        self.bridge.rmi(NODE_VENTILATION_UNIT, message).await
    }

    // -- fan speed ---------------------------------------------------------

    pub async fn get_speed(&self) -> Result<VentilationSpeed, Error> {
        let reply = self.rmi(schedule_get(SUBUNIT_FAN_SPEED, CMD_DEFAULT)).await?;
        let level = last_byte(&reply)?;
        VentilationSpeed::from_level(level)
            .ok_or_else(|| DecodeError::UnknownType(level).into())
    }

    pub async fn set_speed(&self, speed: VentilationSpeed) -> Result<(), Error> {
        self.rmi(schedule_set(SUBUNIT_FAN_SPEED, CMD_DEFAULT, 1, speed.level()))
            .await
            .map(drop)
    }

    // -- operating mode ----------------------------------------------------

    pub async fn get_mode(&self) -> Result<VentilationMode, Error> {
        let reply = self.rmi(schedule_get(SUBUNIT_OPERATING_MODE, CMD_DEFAULT)).await?;
        Ok(if first_byte(&reply)? == 1 {
            VentilationMode::Manual
        } else {
            VentilationMode::Auto
        })
    }

    pub async fn set_mode(&self, mode: VentilationMode) -> Result<(), Error> {
        let msg = match mode {
            VentilationMode::Auto => schedule_clear(SUBUNIT_OPERATING_MODE, CMD_DEFAULT),
            VentilationMode::Manual => schedule_set(SUBUNIT_OPERATING_MODE, CMD_DEFAULT, 1, 1),
        };
        self.rmi(msg).await.map(drop)
    }

    // -- bypass ------------------------------------------------------------

    pub async fn get_bypass(&self) -> Result<VentilationSetting, Error> {
        let reply = self.rmi(schedule_get(SUBUNIT_BYPASS, CMD_DEFAULT)).await?;
        match last_byte(&reply)? {
            0 => Ok(VentilationSetting::Auto),
            1 => Ok(VentilationSetting::On),
            2 => Ok(VentilationSetting::Off),
            other => Err(DecodeError::UnknownType(other).into()),
        }
    }

    pub async fn set_bypass(
        &self,
        setting: VentilationSetting,
        timeout: i32,
    ) -> Result<(), Error> {
        let msg = match setting {
            VentilationSetting::Auto => schedule_clear(SUBUNIT_BYPASS, CMD_DEFAULT),
            VentilationSetting::On => schedule_set(SUBUNIT_BYPASS, CMD_DEFAULT, timeout, 1),
            VentilationSetting::Off => schedule_set(SUBUNIT_BYPASS, CMD_DEFAULT, timeout, 2),
        };
        self.rmi(msg).await.map(drop)
    }

    // -- balance -----------------------------------------------------------

    pub async fn get_balance_mode(&self) -> Result<VentilationBalance, Error> {
        let supply = self.rmi(schedule_get(SUBUNIT_SUPPLY_FAN, CMD_DEFAULT)).await?;
        let exhaust = self.rmi(schedule_get(SUBUNIT_EXHAUST_FAN, CMD_DEFAULT)).await?;
        match (first_byte(&supply)?, first_byte(&exhaust)?) {
            (s, e) if s == e => Ok(VentilationBalance::Balance),
            (1, 0) => Ok(VentilationBalance::SupplyOnly),
            (0, 1) => Ok(VentilationBalance::ExhaustOnly),
            (s, _) => Err(DecodeError::UnknownType(s).into()),
        }
    }

    pub async fn set_balance_mode(
        &self,
        balance: VentilationBalance,
        timeout: i32,
    ) -> Result<(), Error> {
        let (supply, exhaust) = match balance {
            VentilationBalance::Balance => (
                schedule_clear(SUBUNIT_SUPPLY_FAN, CMD_DEFAULT),
                schedule_clear(SUBUNIT_EXHAUST_FAN, CMD_DEFAULT),
            ),
            VentilationBalance::SupplyOnly => (
                schedule_set(SUBUNIT_SUPPLY_FAN, CMD_DEFAULT, timeout, 1),
                schedule_clear(SUBUNIT_EXHAUST_FAN, CMD_DEFAULT),
            ),
            VentilationBalance::ExhaustOnly => (
                schedule_clear(SUBUNIT_SUPPLY_FAN, CMD_DEFAULT),
                schedule_set(SUBUNIT_EXHAUST_FAN, CMD_DEFAULT, timeout, 1),
            ),
        };
        self.rmi(supply).await?;
        self.rmi(exhaust).await.map(drop)
    }

    // -- boost / away ------------------------------------------------------

    pub async fn get_boost(&self) -> Result<bool, Error> {
        let reply = self.rmi(schedule_get(SUBUNIT_FAN_SPEED, CMD_BOOST)).await?;
        Ok(first_byte(&reply)? == 1)
    }

    /// Boost runs at high speed for `timeout` seconds.
    pub async fn set_boost(&self, enable: bool, timeout: i32) -> Result<(), Error> {
        let msg = if enable {
            schedule_set(SUBUNIT_FAN_SPEED, CMD_BOOST, timeout, 3)
        } else {
            schedule_clear(SUBUNIT_FAN_SPEED, CMD_BOOST)
        };
        self.rmi(msg).await.map(drop)
    }

    pub async fn get_away(&self) -> Result<bool, Error> {
        let reply = self.rmi(schedule_get(SUBUNIT_FAN_SPEED, CMD_AWAY)).await?;
        Ok(first_byte(&reply)? == 1)
    }

    pub async fn set_away(&self, enable: bool, timeout: i32) -> Result<(), Error> {
        let msg = if enable {
            schedule_set(SUBUNIT_FAN_SPEED, CMD_AWAY, timeout, 0)
        } else {
            schedule_clear(SUBUNIT_FAN_SPEED, CMD_AWAY)
        };
        self.rmi(msg).await.map(drop)
    }

    // -- comfocool ---------------------------------------------------------

    pub async fn get_comfocool_mode(&self) -> Result<ComfoCoolMode, Error> {
        let reply = self.rmi(schedule_get(SUBUNIT_COMFOCOOL, CMD_DEFAULT)).await?;
        Ok(if first_byte(&reply)? == 0 {
            ComfoCoolMode::Auto
        } else {
            ComfoCoolMode::Off
        })
    }

    pub async fn set_comfocool_mode(
        &self,
        mode: ComfoCoolMode,
        timeout: i32,
    ) -> Result<(), Error> {
        let msg = match mode {
            ComfoCoolMode::Auto => schedule_clear(SUBUNIT_COMFOCOOL, CMD_DEFAULT),
            ComfoCoolMode::Off => schedule_set(SUBUNIT_COMFOCOOL, CMD_DEFAULT, timeout, 0),
        };
        self.rmi(msg).await.map(drop)
    }

    // -- temperature profile -----------------------------------------------

    pub async fn get_temperature_profile(&self) -> Result<TemperatureProfile, Error> {
        let reply = self
            .rmi(schedule_get(SUBUNIT_TEMPERATURE_PROFILE, CMD_DEFAULT))
            .await?;
        match last_byte(&reply)? {
            0 => Ok(TemperatureProfile::Normal),
            1 => Ok(TemperatureProfile::Cool),
            2 => Ok(TemperatureProfile::Warm),
            other => Err(DecodeError::UnknownType(other).into()),
        }
    }

    pub async fn set_temperature_profile(
        &self,
        profile: TemperatureProfile,
    ) -> Result<(), Error> {
        self.rmi(schedule_set(
            SUBUNIT_TEMPERATURE_PROFILE,
            CMD_DEFAULT,
            TIMEOUT_PERSISTENT,
            profile.level(),
        ))
        .await
        .map(drop)
    }

    // -- sensor-based ventilation ------------------------------------------

    pub async fn get_sensor_ventmode(
        &self,
        channel: SensorVentMode,
    ) -> Result<VentilationSetting, Error> {
        let value = self
            .bridge
            .get_property(
                NODE_VENTILATION_UNIT,
                unit::TEMPHUMCONTROL,
                0x01,
                channel.property(),
                PdoType::UInt8,
            )
            .await?;
        match value.as_i64() {
            Some(1) => Ok(VentilationSetting::Auto),
            Some(2) => Ok(VentilationSetting::On),
            Some(0) => Ok(VentilationSetting::Off),
            _ => Err(DecodeError::UnknownType(0xff).into()),
        }
    }

    pub async fn set_sensor_ventmode(
        &self,
        channel: SensorVentMode,
        setting: VentilationSetting,
    ) -> Result<(), Error> {
        let raw = match setting {
            VentilationSetting::Auto => 1,
            VentilationSetting::On => 2,
            VentilationSetting::Off => 0,
        };
        self.rmi(rmi::set_single(
            unit::TEMPHUMCONTROL,
            0x01,
            channel.property(),
            &[raw],
        ))
        .await
        .map(drop)
    }

    // -- airflow configuration ---------------------------------------------

    /// Target airflow in m³/h for one speed step.
    pub async fn get_flow_for_speed(&self, speed: VentilationSpeed) -> Result<i64, Error> {
        let property = flow_property(speed);
        let value = self
            .bridge
            .get_property(
                NODE_VENTILATION_UNIT,
                unit::VENTILATIONCONFIG,
                0x01,
                property,
                PdoType::Int16,
            )
            .await?;
        value
            .as_i64()
            .ok_or_else(|| DecodeError::UnknownType(PdoType::Int16.tag()).into())
    }

    pub async fn set_flow_for_speed(
        &self,
        speed: VentilationSpeed,
        flow: i64,
    ) -> Result<(), Error> {
        self.bridge
            .set_property(
                NODE_VENTILATION_UNIT,
                unit::VENTILATIONCONFIG,
                0x01,
                flow_property(speed),
                flow,
                PdoType::Int16,
            )
            .await
    }

    // -- errors ------------------------------------------------------------

    /// Acknowledge and clear the unit's active errors.
    pub async fn clear_errors(&self) -> Result<(), Error> {
        self.rmi(vec![0x82, unit::ERROR, 0x01]).await.map(drop)
    }
}

fn flow_property(speed: VentilationSpeed) -> u8 {
    match speed {
        VentilationSpeed::Away => 3,
        VentilationSpeed::Low => 4,
        VentilationSpeed::Medium => 5,
        VentilationSpeed::High => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_speed_low_bytes() {
        // The on-wire schedule command for "low".
        assert_eq!(
            schedule_set(SUBUNIT_FAN_SPEED, CMD_DEFAULT, 1, 1),
            vec![0x84, 0x15, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01]
        );
    }

    #[test]
    fn test_schedule_set_persistent_timeout() {
        let msg = schedule_set(SUBUNIT_BYPASS, CMD_DEFAULT, TIMEOUT_PERSISTENT, 1);
        assert_eq!(
            msg,
            vec![0x84, 0x15, 0x02, 0x01, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0x01]
        );
    }

    #[test]
    fn test_schedule_get_and_clear() {
        assert_eq!(
            schedule_get(SUBUNIT_OPERATING_MODE, CMD_DEFAULT),
            vec![0x83, 0x15, 0x08, 0x01]
        );
        assert_eq!(
            schedule_clear(SUBUNIT_COMFOCOOL, CMD_DEFAULT),
            vec![0x85, 0x15, 0x05, 0x01]
        );
    }

    #[test]
    fn test_boost_command_bytes() {
        let msg = schedule_set(SUBUNIT_FAN_SPEED, CMD_BOOST, 3600, 3);
        assert_eq!(&msg[..4], &[0x84, 0x15, 0x01, 0x06]);
        assert_eq!(&msg[8..12], &3600i32.to_le_bytes());
        assert_eq!(msg[12], 3);
    }

    #[test]
    fn test_speed_parsing() {
        assert_eq!("away".parse::<VentilationSpeed>().unwrap(), VentilationSpeed::Away);
        assert_eq!("high".parse::<VentilationSpeed>().unwrap(), VentilationSpeed::High);
        assert!("turbo".parse::<VentilationSpeed>().is_err());
        assert_eq!(VentilationSpeed::from_level(2), Some(VentilationSpeed::Medium));
        assert_eq!(VentilationSpeed::from_level(9), None);
    }

    #[test]
    fn test_setting_roundtrip_display() {
        for s in ["auto", "on", "off"] {
            assert_eq!(s.parse::<VentilationSetting>().unwrap().to_string(), s);
        }
        for s in ["warm", "normal", "cool"] {
            assert_eq!(s.parse::<TemperatureProfile>().unwrap().to_string(), s);
        }
    }
}
