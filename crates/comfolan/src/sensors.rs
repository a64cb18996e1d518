// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sensor catalog and alarm error tables.
//!
//! The catalog is data, not code: it maps each PDID to its declared type,
//! human name, unit and display scaling, and feeds the PDO registry from
//! outside the engine. PDIDs with unknown semantics are transported
//! unchanged and carry no scaling.

use crate::pdo::{PdoType, PdoValue};
use crate::util::u64_to_bits;

pub const UNIT_WATT: &str = "W";
pub const UNIT_KWH: &str = "kWh";
pub const UNIT_CELSIUS: &str = "°C";
pub const UNIT_PERCENT: &str = "%";
pub const UNIT_RPM: &str = "rpm";
pub const UNIT_M3H: &str = "m³/h";

// Well-known PDIDs.
pub const SENSOR_DEVICE_STATE: u32 = 16;
pub const SENSOR_CHANGING_FILTERS: u32 = 18;
pub const SENSOR_OPERATING_MODE_2: u32 = 49;
pub const SENSOR_FAN_MODE_SUPPLY_2: u32 = 54;
pub const SENSOR_FAN_MODE_EXHAUST_2: u32 = 55;
pub const SENSOR_OPERATING_MODE: u32 = 56;
pub const SENSOR_FAN_SPEED_MODE: u32 = 65;
pub const SENSOR_BYPASS_ACTIVATION_STATE: u32 = 66;
pub const SENSOR_PROFILE_TEMPERATURE: u32 = 67;
pub const SENSOR_FAN_MODE_SUPPLY: u32 = 70;
pub const SENSOR_FAN_MODE_EXHAUST: u32 = 71;
pub const SENSOR_NEXT_CHANGE_FAN: u32 = 81;
pub const SENSOR_NEXT_CHANGE_BYPASS: u32 = 82;
pub const SENSOR_NEXT_CHANGE_FAN_SUPPLY: u32 = 86;
pub const SENSOR_NEXT_CHANGE_FAN_EXHAUST: u32 = 87;
pub const SENSOR_FAN_EXHAUST_DUTY: u32 = 117;
pub const SENSOR_FAN_SUPPLY_DUTY: u32 = 118;
pub const SENSOR_FAN_EXHAUST_FLOW: u32 = 119;
pub const SENSOR_FAN_SUPPLY_FLOW: u32 = 120;
pub const SENSOR_FAN_EXHAUST_SPEED: u32 = 121;
pub const SENSOR_FAN_SUPPLY_SPEED: u32 = 122;
pub const SENSOR_POWER_USAGE: u32 = 128;
pub const SENSOR_POWER_USAGE_TOTAL_YEAR: u32 = 129;
pub const SENSOR_POWER_USAGE_TOTAL: u32 = 130;
pub const SENSOR_PREHEATER_POWER_TOTAL_YEAR: u32 = 144;
pub const SENSOR_PREHEATER_POWER_TOTAL: u32 = 145;
pub const SENSOR_PREHEATER_POWER: u32 = 146;
pub const SENSOR_RF_PAIRING_MODE: u32 = 176;
pub const SENSOR_DAYS_TO_REPLACE_FILTER: u32 = 192;
pub const SENSOR_UNIT_TEMPERATURE: u32 = 208;
pub const SENSOR_RMOT: u32 = 209;
pub const SENSOR_SEASON_HEATING_ACTIVE: u32 = 210;
pub const SENSOR_SEASON_COOLING_ACTIVE: u32 = 211;
pub const SENSOR_TARGET_TEMPERATURE: u32 = 212;
pub const SENSOR_AVOIDED_HEATING: u32 = 213;
pub const SENSOR_AVOIDED_HEATING_TOTAL_YEAR: u32 = 214;
pub const SENSOR_AVOIDED_HEATING_TOTAL: u32 = 215;
pub const SENSOR_AVOIDED_COOLING: u32 = 216;
pub const SENSOR_AVOIDED_COOLING_TOTAL_YEAR: u32 = 217;
pub const SENSOR_AVOIDED_COOLING_TOTAL: u32 = 218;
pub const SENSOR_TEMPERATURE_SUPPLY: u32 = 221;
pub const SENSOR_UNIT_AIRFLOW: u32 = 224;
pub const SENSOR_COMFORTCONTROL_MODE: u32 = 225;
pub const SENSOR_FAN_SPEED_MODE_MODULATED: u32 = 226;
pub const SENSOR_BYPASS_STATE: u32 = 227;
pub const SENSOR_FROSTPROTECTION_UNBALANCE: u32 = 228;
pub const SENSOR_AIRFLOW_CONSTRAINTS: u32 = 230;
pub const SENSOR_TEMPERATURE_EXTRACT: u32 = 274;
pub const SENSOR_TEMPERATURE_EXHAUST: u32 = 275;
pub const SENSOR_TEMPERATURE_OUTDOOR: u32 = 276;
pub const SENSOR_HUMIDITY_EXTRACT: u32 = 290;
pub const SENSOR_HUMIDITY_EXHAUST: u32 = 291;
pub const SENSOR_HUMIDITY_OUTDOOR: u32 = 292;
pub const SENSOR_HUMIDITY_AFTER_PREHEATER: u32 = 293;
pub const SENSOR_HUMIDITY_SUPPLY: u32 = 294;
pub const SENSOR_BYPASS_OVERRIDE: u32 = 338;
pub const SENSOR_FAN_MODE_SUPPLY_3: u32 = 342;
pub const SENSOR_FAN_MODE_EXHAUST_3: u32 = 343;
pub const SENSOR_ANALOG_INPUT_1: u32 = 369;
pub const SENSOR_ANALOG_INPUT_2: u32 = 370;
pub const SENSOR_ANALOG_INPUT_3: u32 = 371;
pub const SENSOR_ANALOG_INPUT_4: u32 = 372;
pub const SENSOR_COMFOFOND_TEMP_OUTDOOR: u32 = 416;
pub const SENSOR_COMFOFOND_TEMP_GROUND: u32 = 417;
pub const SENSOR_COMFOFOND_GHE_STATE: u32 = 418;
pub const SENSOR_COMFOFOND_GHE_PRESENT: u32 = 419;

/// Display transformation for a raw sensor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueScale {
    /// Raw value, unchanged.
    None,
    /// Tenths of a unit (temperatures).
    Tenths,
    /// 0 = celsius, otherwise fahrenheit.
    TemperatureUnit,
    /// 3 = m³/h, otherwise l/s.
    AirflowUnit,
    /// Airflow-constraint bit set.
    AirflowConstraints,
}

/// One catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct Sensor {
    pub id: u32,
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub pdo_type: PdoType,
    pub scale: ValueScale,
}

const fn sensor(id: u32, name: &'static str, unit: Option<&'static str>, pdo_type: PdoType) -> Sensor {
    Sensor {
        id,
        name,
        unit,
        pdo_type,
        scale: ValueScale::None,
    }
}

const fn tenths(id: u32, name: &'static str, unit: Option<&'static str>) -> Sensor {
    Sensor {
        id,
        name,
        unit,
        pdo_type: PdoType::Int16,
        scale: ValueScale::Tenths,
    }
}

/// The full sensor catalog, ordered by PDID.
pub static SENSORS: &[Sensor] = &[
    sensor(16, "Device State", None, PdoType::UInt8),
    sensor(18, "Changing filters", None, PdoType::UInt8),
    sensor(33, "sensor_33", None, PdoType::UInt8),
    sensor(37, "sensor_37", None, PdoType::UInt8),
    sensor(49, "Operating Mode", None, PdoType::UInt8),
    sensor(53, "sensor_53", None, PdoType::UInt8),
    sensor(54, "Supply Fan Mode", None, PdoType::UInt8),
    sensor(55, "Exhaust Fan Mode", None, PdoType::UInt8),
    sensor(56, "Operating Mode", None, PdoType::UInt8),
    sensor(65, "Fan Speed", None, PdoType::UInt8),
    sensor(66, "Bypass Activation State", None, PdoType::UInt8),
    sensor(67, "Temperature Profile Mode", None, PdoType::UInt8),
    sensor(70, "Supply Fan Mode", None, PdoType::UInt8),
    sensor(71, "Exhaust Fan Mode", None, PdoType::UInt8),
    sensor(81, "Fan Speed Next Change", None, PdoType::UInt32),
    sensor(82, "Bypass Next Change", None, PdoType::UInt32),
    sensor(85, "sensor_85", None, PdoType::UInt32),
    sensor(86, "Supply Fan Next Change", None, PdoType::UInt32),
    sensor(87, "Exhaust Fan Next Change", None, PdoType::UInt32),
    sensor(117, "Exhaust Fan Duty", Some(UNIT_PERCENT), PdoType::UInt8),
    sensor(118, "Supply Fan Duty", Some(UNIT_PERCENT), PdoType::UInt8),
    sensor(119, "Exhaust Fan Flow", Some(UNIT_M3H), PdoType::UInt16),
    sensor(120, "Supply Fan Flow", Some(UNIT_M3H), PdoType::UInt16),
    sensor(121, "Exhaust Fan Speed", Some(UNIT_RPM), PdoType::UInt16),
    sensor(122, "Supply Fan Speed", Some(UNIT_RPM), PdoType::UInt16),
    sensor(128, "Power Usage", Some(UNIT_WATT), PdoType::UInt16),
    sensor(129, "Power Usage (year)", Some(UNIT_KWH), PdoType::UInt16),
    sensor(130, "Power Usage (total)", Some(UNIT_KWH), PdoType::UInt16),
    sensor(144, "Preheater Power Usage (year)", Some(UNIT_KWH), PdoType::UInt16),
    sensor(145, "Preheater Power Usage (total)", Some(UNIT_KWH), PdoType::UInt16),
    sensor(146, "Preheater Power Usage", Some(UNIT_WATT), PdoType::UInt16),
    sensor(176, "RF Pairing Mode", None, PdoType::UInt8),
    sensor(192, "Days remaining to replace the filter", None, PdoType::UInt16),
    Sensor {
        id: 208,
        name: "Device Temperature Unit",
        unit: None,
        pdo_type: PdoType::UInt8,
        scale: ValueScale::TemperatureUnit,
    },
    tenths(209, "Running Mean Outdoor Temperature (RMOT)", Some(UNIT_CELSIUS)),
    sensor(210, "Heating Season is active", None, PdoType::Bool),
    sensor(211, "Cooling Season is active", None, PdoType::Bool),
    tenths(212, "Target Temperature", Some(UNIT_CELSIUS)),
    sensor(213, "Avoided Heating Power Usage", Some(UNIT_WATT), PdoType::UInt16),
    sensor(214, "Avoided Heating Power Usage (year)", Some(UNIT_KWH), PdoType::UInt16),
    sensor(215, "Avoided Heating Power Usage (total)", Some(UNIT_KWH), PdoType::UInt16),
    sensor(216, "Avoided Cooling Power Usage", Some(UNIT_WATT), PdoType::UInt16),
    sensor(217, "Avoided Cooling Power Usage (year)", Some(UNIT_KWH), PdoType::UInt16),
    sensor(218, "Avoided Cooling Power Usage (total)", Some(UNIT_KWH), PdoType::UInt16),
    sensor(219, "sensor_219", None, PdoType::UInt16),
    tenths(220, "Outdoor Air Temperature (?)", None),
    tenths(221, "Supply Air Temperature", Some(UNIT_CELSIUS)),
    Sensor {
        id: 224,
        name: "Device Airflow Unit",
        unit: None,
        pdo_type: PdoType::UInt8,
        scale: ValueScale::AirflowUnit,
    },
    sensor(225, "Sensor based ventilation mode", None, PdoType::UInt8),
    sensor(226, "Fan Speed (modulated)", None, PdoType::UInt16),
    sensor(227, "Bypass State", Some(UNIT_PERCENT), PdoType::UInt8),
    sensor(228, "frostprotection_unbalance", None, PdoType::UInt8),
    Sensor {
        id: 230,
        name: "Airflow constraints",
        unit: None,
        pdo_type: PdoType::Int64,
        scale: ValueScale::AirflowConstraints,
    },
    tenths(274, "Extract Air Temperature", Some(UNIT_CELSIUS)),
    tenths(275, "Exhaust Air Temperature", Some(UNIT_CELSIUS)),
    tenths(276, "Outdoor Air Temperature", Some(UNIT_CELSIUS)),
    tenths(277, "Outdoor Air Temperature (?)", Some(UNIT_CELSIUS)),
    tenths(278, "Supply Air Temperature (?)", Some(UNIT_CELSIUS)),
    sensor(290, "Extract Air Humidity", Some(UNIT_PERCENT), PdoType::UInt8),
    sensor(291, "Exhaust Air Humidity", Some(UNIT_PERCENT), PdoType::UInt8),
    sensor(292, "Outdoor Air Humidity", Some(UNIT_PERCENT), PdoType::UInt8),
    sensor(293, "Outdoor Air Humidity (after preheater)", Some(UNIT_PERCENT), PdoType::UInt8),
    sensor(294, "Supply Air Humidity", Some(UNIT_PERCENT), PdoType::UInt8),
    sensor(321, "sensor_321", None, PdoType::UInt16),
    sensor(325, "sensor_325", None, PdoType::UInt16),
    sensor(337, "sensor_337", None, PdoType::UInt32),
    sensor(338, "Bypass Override", None, PdoType::UInt32),
    sensor(341, "sensor_341", None, PdoType::UInt32),
    sensor(342, "Supply Fan Mode", None, PdoType::UInt32),
    sensor(343, "Exhaust Fan Mode", None, PdoType::UInt32),
    sensor(369, "Analog Input 1", None, PdoType::UInt8),
    sensor(370, "Analog Input 2", None, PdoType::UInt8),
    sensor(371, "Analog Input 3", None, PdoType::UInt8),
    sensor(372, "Analog Input 4", None, PdoType::UInt8),
    tenths(384, "sensor_384", None),
    sensor(386, "sensor_386", None, PdoType::Bool),
    tenths(400, "sensor_400", None),
    sensor(401, "sensor_401", None, PdoType::UInt8),
    sensor(402, "sensor_402", None, PdoType::Bool),
    tenths(416, "ComfoFond Outdoor Air Temperature", None),
    tenths(417, "ComfoFond Ground Temperature", None),
    sensor(418, "ComfoFond GHE State Percentage", None, PdoType::UInt8),
    sensor(419, "ComfoFond GHE Present", None, PdoType::Bool),
    sensor(784, "sensor_784", None, PdoType::UInt8),
    sensor(785, "sensor_785", None, PdoType::Bool),
    tenths(802, "sensor_802", None),
];

/// Look up a sensor by PDID.
pub fn find(pdid: u32) -> Option<&'static Sensor> {
    SENSORS.iter().find(|s| s.id == pdid)
}

/// Render a decoded value with the sensor's display scaling applied.
pub fn display_value(sensor: &Sensor, value: &PdoValue) -> String {
    match sensor.scale {
        ValueScale::None => value.to_string(),
        ValueScale::Tenths => match value.as_i64() {
            Some(raw) => format!("{:.1}", raw as f64 / 10.0),
            None => value.to_string(),
        },
        ValueScale::TemperatureUnit => match value.as_i64() {
            Some(0) => "celsius".to_string(),
            Some(_) => "fahrenheit".to_string(),
            None => value.to_string(),
        },
        ValueScale::AirflowUnit => match value.as_i64() {
            Some(3) => "m3ph".to_string(),
            Some(_) => "lps".to_string(),
            None => value.to_string(),
        },
        ValueScale::AirflowConstraints => match value.as_i64() {
            Some(raw) => match airflow_constraints(raw as u64) {
                Some(constraints) if !constraints.is_empty() => constraints.join(", "),
                Some(_) => "none".to_string(),
                None => "unknown".to_string(),
            },
            None => value.to_string(),
        },
    }
}

/// Decode the airflow-constraint bitmask. Returns `None` when the value
/// does not carry constraint information (bit 45 unset).
pub fn airflow_constraints(value: u64) -> Option<Vec<&'static str>> {
    let bits = u64_to_bits(value);
    if !bits.contains(&45) {
        return None;
    }

    let mut constraints = Vec::new();
    let mut push = |active: bool, name: &'static str| {
        if active {
            constraints.push(name);
        }
    };
    let has = |bit: u32| bits.contains(&bit);

    push(has(2) || has(3), "Resistance");
    push(has(4), "PreheaterNegative");
    push(has(5) || has(7), "NoiseGuard");
    push(has(6) || has(8), "ResistanceGuard");
    push(has(9), "FrostProtection");
    push(has(10), "Bypass");
    push(has(12), "AnalogInput1");
    push(has(13), "AnalogInput2");
    push(has(14), "AnalogInput3");
    push(has(15), "AnalogInput4");
    push(has(16), "Hood");
    push(has(18), "AnalogPreset");
    push(has(19), "ComfoCool");
    push(has(22), "PreheaterPositive");
    push(has(23), "RFSensorFlowPreset");
    push(has(24), "RFSensorFlowProportional");
    push(has(25), "TemperatureComfort");
    push(has(26), "HumidityComfort");
    push(has(27), "HumidityProtection");
    push(has(47), "CO2ZoneX1");
    push(has(48), "CO2ZoneX2");
    push(has(49), "CO2ZoneX3");
    push(has(50), "CO2ZoneX4");
    push(has(51), "CO2ZoneX5");
    push(has(52), "CO2ZoneX6");
    push(has(53), "CO2ZoneX7");
    push(has(54), "CO2ZoneX8");

    Some(constraints)
}

// ---------------------------------------------------------------------------
// Alarm error tables
// ---------------------------------------------------------------------------

/// Firmware 1.4.0 and below report alarms against the old error table.
pub const FIRMWARE_140_VERSION_THRESHOLD: u32 = 3_222_278_144;

/// Error ids shared by every firmware generation.
static ERRORS_BASE: &[(u32, &str)] = &[
    (21, "DANGER! OVERHEATING! Two or more sensors are detecting an incorrect temperature. Ventilation has stopped."),
    (22, "Temperature too high for ComfoAir Q (TEMP_HRU ERROR)"),
    (23, "The extract air temperature sensor has a malfunction (SENSOR_ETA ERROR)"),
    (24, "The extract air temperature sensor is detecting an incorrect temperature (TEMP_SENSOR_ETA ERROR)"),
    (25, "The exhaust air temperature sensor has a malfunction (SENSOR_EHA ERROR)"),
    (26, "The exhaust air temperature sensor is detecting an incorrect temperature (TEMP_SENSOR_EHA ERROR)"),
    (27, "The outdoor air temperature sensor has a malfunction (SENSOR_ODA ERROR)"),
    (28, "The outdoor air temperature sensor is detecting an incorrect temperature (TEMP_SENSOR_ODA ERROR)"),
    (29, "The pre-conditioned outdoor air temperature sensor has a malfunction"),
    (30, "The pre-conditioned outdoor air temperature sensor is detecting an incorrect temperature (TEMP_SENSOR_P-ODA ERROR)"),
    (31, "The supply air temperature sensor has a malfunction (SENSOR_SUP ERROR)"),
    (32, "The supply air temperature sensor is detecting an incorrect temperature (TEMP_SENSOR_SUP ERROR)"),
    (33, "The Ventilation Unit has not been commissioned (INIT ERROR)"),
    (34, "The front door is open"),
    (35, "The Pre-heater is present, but not in the correct position (right/left). (PREHEAT_LOCATION ERROR)"),
    (37, "The pre-heater has a malfunction (PREHEAT ERROR)"),
    (38, "The pre-heater has a malfunction (PREHEAT ERROR)"),
    (39, "The extract air humidity sensor has a malfunction (SENSOR_ETA ERROR)"),
    (41, "The exhaust air humidity sensor has a malfunction (SENSOR_EHA ERROR)"),
    (43, "The outdoor air humidity sensor has a malfunction (SENSOR_ODA ERROR)"),
    (45, "The outdoor air humidity sensor has a malfunction (SENSOR_P-ODA ERROR)"),
    (47, "The supply air humidity sensor has a malfunction (SENSOR_SUP ERROR)"),
    (49, "The exhaust air flow sensor has a malfunction (SENSOR_EHA ERROR)"),
    (50, "The supply air flow sensor has a malfunction (SENSOR_SUP ERROR)"),
    (51, "The extract air fan has a malfunction (FAN_EHA ERROR)"),
    (52, "The supply air fan has a malfunction (FAN_SUP ERROR)"),
    (53, "Exhaust air pressure too high. Check air outlets, ducts and filters for pollution and obstructions. Check valve settings (EXT_PRESSURE_EHA ERROR)"),
    (54, "Supply air pressure too high. Check air outlets, ducts and filters for pollution and obstructions. Check valve settings. (EXT_PRESSURE_SUP ERROR)"),
    (55, "The extract air fan has a malfunction (FAN_EHA ERROR)"),
    (56, "The supply air fan has a malfunction (FAN_SUP ERROR)"),
    (57, "The exhaust air flow is not reaching its set point (AIRFLOW_EHA ERROR)"),
    (58, "The supply air flow is not reaching its set point (AIRFLOW_SUP ERROR)"),
    (59, "Failed to reach required temperature too often for outdoor air after pre-heater (TEMPCONTROL_P-ODA ERROR)"),
    (60, "Failed to reach required temperature too often for supply air. The modulating by-pass may have a malfunction. (TEMPCONTROL_SUP ERROR)"),
    (61, "Supply air temperature is too low too often (TEMP_SUP_MIN ERROR)"),
    (62, "Unbalance occurred too often beyond tolerance levels in past period (UNBALANCE ERROR)"),
    (63, "Postheater was present, but is no longer detected (POSTHEAT_CONNECT ERROR)"),
    (64, "Temperature sensor value for supply air ComfoCool exceeded limit too often (CCOOL_TEMP ERROR)"),
    (65, "Room temperature sensor was present, but is no longer detected (T_ROOM_PRES ERROR)"),
    (66, "RF Communication hardware was present, but is no longer detected (RF_PRES ERROR)"),
    (67, "Option Box was present, but is no longer detected (OPTION_BOX CONNECT ERROR)"),
    (68, "Pre-heater was present, but is no longer detected (PREHEAT_PRES ERROR)"),
    (69, "Postheater was present, but is no longer detected (POSTHEAT_CONNECT ERROR)"),
];

/// Error ids 70+ on current firmware.
static ERRORS_CURRENT: &[(u32, &str)] = &[
    (70, "Analog input 1 was present, but is no longer detected (ANALOG_1_PRES ERROR)"),
    (71, "Analog input 2 was present, but is no longer detected (ANALOG_2_PRES ERROR)"),
    (72, "Analog input 3 was present, but is no longer detected (ANALOG_3_PRES ERROR)"),
    (73, "Analog input 4 was present, but is no longer detected (ANALOG_4_PRES ERROR)"),
    (74, "ComfoHood was present, but is no longer detected (HOOD_CONNECT ERROR)"),
    (75, "ComfoCool was present, but is no longer detected (CCOOL_CONNECT ERROR)"),
    (76, "ComfoFond was present, but is no longer detected (GROUND_HEAT_CONNECT ERROR)"),
    (77, "The filters of the Ventilation Unit must be replaced now"),
    (78, "It is necessary to replace or clean the external filter"),
    (79, "Order new filters now, because the remaining filter life time is limited"),
    (80, "Service mode is active (SERVICE MODE)"),
    (81, "Preheater has no communication with the ComfoAir unit (PREHEAT ERROR , 1081)"),
    (82, "ComfoHood temperature error (HOOD_TEMP ERROR)"),
    (83, "Postheater temperature error (POSTHEAT_TEMP ERROR)"),
    (84, "Outdoor temperature of ComfoFond error (GROUND_HEAT_TEMP ERROR)"),
    (85, "Analog input 1 error (ANALOG_1_IN ERROR)"),
    (86, "Analog input 2 error (ANALOG_2_IN ERROR)"),
    (87, "Analog input 3 error (ANALOG_3_IN ERROR)"),
    (88, "Analog input 4 error (ANALOG_4_IN ERROR)"),
    (89, "Bypass is in manual mode"),
    (90, "ComfoCool is overheating"),
    (91, "ComfoCool compressor error (CCOOL_COMPRESSOR ERROR)"),
    (92, "ComfoCool room temperature sensor error (CCOOL_TEMP ERROR)"),
    (93, "ComfoCool condensor temperature sensor error (CCOOL_TEMP ERROR)"),
    (94, "ComfoCool supply air temperature sensor error (CCOOL_TEMP ERROR)"),
    (95, "ComfoHood temperature is too high (HOOD_TEMP ERROR)"),
    (96, "ComfoHood is activated"),
    (97, "QM_Constraint_min_ERR"),
    (98, "H_21_qm_min_ERR"),
    (99, "Configuration error"),
    (100, "Error analysis is in progress…"),
    (101, "ComfoNet Error"),
    (102, "The number of CO2 sensors has decreased – one or more sensors are no longer detected"),
    (103, "More than 8 sensors detected in a zone"),
    (104, "CO₂ Sensor C error"),
];

/// Error ids 70+ on firmware 1.4.0 and below (the table shifted by four).
static ERRORS_140: &[(u32, &str)] = &[
    (70, "ComfoHood was present, but is no longer detected (HOOD_CONNECT ERROR)"),
    (71, "ComfoCool was present, but is no longer detected (CCOOL_CONNECT ERROR)"),
    (72, "ComfoFond was present, but is no longer detected (GROUND_HEAT_CONNECT ERROR)"),
    (73, "The filters of the Ventilation Unit must be replaced now"),
    (74, "It is necessary to replace or clean the external filter"),
    (75, "Order new filters now, because the remaining filter life time is limited"),
    (76, "Service mode is active (SERVICE MODE)"),
    (77, "Preheater has no communication with the ComfoAir unit (PREHEAT ERROR , 1081)"),
    (78, "ComfoHood temperature error (HOOD_TEMP ERROR)"),
    (79, "Postheater temperature error (POSTHEAT_TEMP ERROR)"),
    (80, "Outdoor temperature of ComfoFond error (GROUND_HEAT_TEMP ERROR)"),
    (81, "Bypass is in manual mode"),
    (82, "ComfoCool is overheating"),
    (83, "ComfoCool compressor error (CCOOL_COMPRESSOR ERROR)"),
    (84, "ComfoCool room temperature sensor error (CCOOL_TEMP ERROR)"),
    (85, "ComfoCool condensor temperature sensor error (CCOOL_TEMP ERROR)"),
    (86, "ComfoCool supply air temperature sensor error (CCOOL_TEMP ERROR)"),
];

/// Look up the message for one error id.
pub fn error_text(error_id: u32, sw_program_version: u32) -> Option<&'static str> {
    let lookup = |table: &[(u32, &'static str)]| {
        table
            .iter()
            .find(|(id, _)| *id == error_id)
            .map(|(_, text)| *text)
    };

    lookup(ERRORS_BASE).or_else(|| {
        if sw_program_version <= FIRMWARE_140_VERSION_THRESHOLD {
            lookup(ERRORS_140)
        } else {
            lookup(ERRORS_CURRENT)
        }
    })
}

/// Expand an alarm's error bitmask into (error id, message) pairs.
pub fn decode_alarm_errors(errors: &[u8], sw_program_version: u32) -> Vec<(u32, &'static str)> {
    crate::util::bytes_to_bits(errors)
        .into_iter()
        .filter_map(|bit| error_text(bit, sw_program_version).map(|text| (bit, text)))
        .collect()
}
