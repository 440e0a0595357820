//! Unit systems and conversion into the units sent to the server.
//!
//! Records arrive tagged with the host's unit system (weewx `usUnits` codes).
//! Meteotemplate assumes Celsius, hPa, mm and km/h unless the request names
//! other units through `uT`, `uP`, `uR` and `uW`.

use serde::{Deserialize, Serialize};

const HPA_PER_INHG: f64 = 33.863_886_666_7;
const HPA_PER_MMHG: f64 = 1.333_223_874;
const MPS_PER_MPH: f64 = 0.447_04;
const MPS_PER_KT: f64 = 0.514_444_444;
const MM_PER_IN: f64 = 25.4;

/// Unit system a record is expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum UnitSystem {
    /// Fahrenheit, inHg, mph, inches.
    Us,
    /// Celsius, mbar, km/h, centimetres.
    #[default]
    Metric,
    /// Celsius, mbar, m/s, millimetres.
    MetricWx,
}

impl TryFrom<u8> for UnitSystem {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x01 => Ok(UnitSystem::Us),
            0x10 => Ok(UnitSystem::Metric),
            0x11 => Ok(UnitSystem::MetricWx),
            other => Err(format!("unknown unit system code {other}")),
        }
    }
}

impl From<UnitSystem> for u8 {
    fn from(system: UnitSystem) -> Self {
        match system {
            UnitSystem::Us => 0x01,
            UnitSystem::Metric => 0x10,
            UnitSystem::MetricWx => 0x11,
        }
    }
}

/// Physical quantity of an observation. Decides conversion and precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitGroup {
    Temperature,
    Humidity,
    Pressure,
    Speed,
    Direction,
    Rain,
    RainRate,
    Radiation,
    Other,
}

impl UnitGroup {
    /// Group of a host observation name.
    pub fn for_observation(name: &str) -> Self {
        match name {
            "outTemp" | "inTemp" | "dewpoint" | "windchill" | "heatindex" | "appTemp" => {
                UnitGroup::Temperature
            }
            "outHumidity" | "inHumidity" => UnitGroup::Humidity,
            "barometer" | "pressure" | "altimeter" => UnitGroup::Pressure,
            "windSpeed" | "windGust" => UnitGroup::Speed,
            "windDir" | "windGustDir" => UnitGroup::Direction,
            "rain" | "hourRain" | "dayRain" | "rain24" | "stormRain" | "monthRain"
            | "yearRain" => UnitGroup::Rain,
            "rainRate" => UnitGroup::RainRate,
            "radiation" | "maxSolarRad" => UnitGroup::Radiation,
            n if n.starts_with("extraTemp")
                || n.starts_with("soilTemp")
                || n.starts_with("leafTemp") =>
            {
                UnitGroup::Temperature
            }
            n if n.starts_with("extraHumid") => UnitGroup::Humidity,
            _ => UnitGroup::Other,
        }
    }
}

/// Parameter names used to announce non-default units.
pub(crate) const UNIT_PARAMS: [&str; 4] = ["uT", "uW", "uR", "uP"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedUnit {
    #[default]
    Kph,
    Mps,
    Mph,
    Kt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RainUnit {
    #[default]
    Mm,
    In,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureUnit {
    #[default]
    Hpa,
    Mbar,
    Inhg,
    Mmhg,
}

/// Units the uploaded values are expressed in.
///
/// The default matches what the server assumes when no unit parameter is
/// present, in which case no unit parameter is sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Units {
    pub temperature: TemperatureUnit,
    pub wind: SpeedUnit,
    pub rain: RainUnit,
    pub pressure: PressureUnit,
}

impl Units {
    /// Convert `value` of the given group from `system` into these units.
    pub fn convert(&self, value: f64, group: UnitGroup, system: UnitSystem) -> f64 {
        match group {
            UnitGroup::Temperature => {
                let celsius = match system {
                    UnitSystem::Us => (value - 32.0) * 5.0 / 9.0,
                    _ => value,
                };
                match self.temperature {
                    TemperatureUnit::Celsius => celsius,
                    TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
                }
            }
            UnitGroup::Pressure => {
                let hpa = match system {
                    UnitSystem::Us => value * HPA_PER_INHG,
                    _ => value,
                };
                match self.pressure {
                    PressureUnit::Hpa | PressureUnit::Mbar => hpa,
                    PressureUnit::Inhg => hpa / HPA_PER_INHG,
                    PressureUnit::Mmhg => hpa / HPA_PER_MMHG,
                }
            }
            UnitGroup::Speed => {
                let mps = match system {
                    UnitSystem::Us => value * MPS_PER_MPH,
                    UnitSystem::Metric => value / 3.6,
                    UnitSystem::MetricWx => value,
                };
                match self.wind {
                    SpeedUnit::Kph => mps * 3.6,
                    SpeedUnit::Mps => mps,
                    SpeedUnit::Mph => mps / MPS_PER_MPH,
                    SpeedUnit::Kt => mps / MPS_PER_KT,
                }
            }
            UnitGroup::Rain | UnitGroup::RainRate => {
                let mm = match system {
                    UnitSystem::Us => value * MM_PER_IN,
                    UnitSystem::Metric => value * 10.0,
                    UnitSystem::MetricWx => value,
                };
                match self.rain {
                    RainUnit::Mm => mm,
                    RainUnit::In => mm / MM_PER_IN,
                }
            }
            UnitGroup::Humidity
            | UnitGroup::Direction
            | UnitGroup::Radiation
            | UnitGroup::Other => value,
        }
    }

    /// Number of decimals a value of `group` is formatted with.
    ///
    /// | group       | decimals                     |
    /// |-------------|------------------------------|
    /// | temperature | 1                            |
    /// | humidity    | 0                            |
    /// | pressure    | 1 (hPa, mbar, mmHg), 3 (inHg)|
    /// | speed       | 1                            |
    /// | direction   | 0                            |
    /// | rain, rate  | 1 (mm), 2 (in)               |
    /// | radiation   | 0                            |
    /// | other       | 2                            |
    pub fn decimals(&self, group: UnitGroup) -> usize {
        match group {
            UnitGroup::Temperature | UnitGroup::Speed => 1,
            UnitGroup::Humidity | UnitGroup::Direction | UnitGroup::Radiation => 0,
            UnitGroup::Pressure => match self.pressure {
                PressureUnit::Inhg => 3,
                _ => 1,
            },
            UnitGroup::Rain | UnitGroup::RainRate => match self.rain {
                RainUnit::Mm => 1,
                RainUnit::In => 2,
            },
            UnitGroup::Other => 2,
        }
    }

    /// Unit parameters for every unit that differs from the server default.
    pub fn params(&self) -> Vec<(&'static str, &'static str)> {
        let defaults = Units::default();
        let mut params = Vec::new();
        if self.temperature != defaults.temperature {
            params.push(("uT", "F"));
        }
        if self.wind != defaults.wind {
            let value = match self.wind {
                SpeedUnit::Kph => "kph",
                SpeedUnit::Mps => "mps",
                SpeedUnit::Mph => "mph",
                SpeedUnit::Kt => "kt",
            };
            params.push(("uW", value));
        }
        if self.rain != defaults.rain {
            params.push(("uR", "in"));
        }
        if self.pressure != defaults.pressure {
            let value = match self.pressure {
                PressureUnit::Hpa => "hpa",
                PressureUnit::Mbar => "mbar",
                PressureUnit::Inhg => "inhg",
                PressureUnit::Mmhg => "mmhg",
            };
            params.push(("uP", value));
        }
        params
    }
}

/// Format `value` with a fixed number of decimals, never emitting `-0`.
///
/// Returns `None` when the value does not survive rounding as a finite number.
pub fn format_value(value: f64, decimals: usize) -> Option<String> {
    let scale = 10f64.powi(decimals as i32);
    let mut rounded = (value * scale).round() / scale;
    if !rounded.is_finite() {
        return None;
    }
    if rounded == 0.0 {
        rounded = 0.0;
    }
    Some(format!("{:.*}", decimals, rounded))
}
