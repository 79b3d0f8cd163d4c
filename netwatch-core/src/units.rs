//! Unit and icon lookup for sensor presentation.
//!
//! Netdata reports a free-form unit string per series. A handful of them map
//! onto well-known host units (and sometimes a device class); everything else
//! is passed through verbatim.

use std::fmt;

/// Icon used when nothing more specific applies.
pub const DEFAULT_ICON: &str = "mdi:chart-line";

/// Round to a fixed number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Device classes understood by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    Power,
    Temperature,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Power => "power",
            DeviceClass::Temperature => "temperature",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value conversion applied after rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    None,
    /// kilobits/s to megabytes/s (`/1024/8`, 3 decimals).
    KilobitsToMegabytes,
}

impl Conversion {
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Conversion::None => value,
            Conversion::KilobitsToMegabytes => round_to(value / 1024.0 / 8.0, 3),
        }
    }
}

struct UnitMapping {
    unit: &'static str,
    display_unit: &'static str,
    device_class: Option<DeviceClass>,
    keeps_icon: bool,
    conversion: Conversion,
}

// Keyed by the lower-cased netdata unit.
const UNIT_TABLE: &[UnitMapping] = &[
    UnitMapping {
        unit: "kilobits/s",
        display_unit: "MB/s",
        device_class: None,
        keeps_icon: true,
        conversion: Conversion::KilobitsToMegabytes,
    },
    UnitMapping {
        unit: "percentage",
        display_unit: "%",
        device_class: None,
        keeps_icon: true,
        conversion: Conversion::None,
    },
    UnitMapping {
        unit: "watts",
        display_unit: "W",
        device_class: Some(DeviceClass::Power),
        keeps_icon: false,
        conversion: Conversion::None,
    },
    UnitMapping {
        unit: "celsius",
        display_unit: "°C",
        device_class: Some(DeviceClass::Temperature),
        keeps_icon: false,
        conversion: Conversion::None,
    },
];

/// How a metric sensor is presented to the host platform.
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    pub unit: Option<String>,
    pub icon: Option<&'static str>,
    pub device_class: Option<DeviceClass>,
    pub conversion: Conversion,
}

impl Presentation {
    /// Look up the presentation for a dimension of a series with the given unit.
    pub fn lookup(series: &str, dimension: &str, units: &str) -> Self {
        let icon = icon_for(series, dimension);
        let lower = units.to_lowercase();

        match UNIT_TABLE.iter().find(|m| m.unit == lower) {
            Some(mapping) => Self {
                unit: Some(mapping.display_unit.to_string()),
                icon: if mapping.keeps_icon { Some(icon) } else { None },
                device_class: mapping.device_class,
                conversion: mapping.conversion,
            },
            None => Self {
                unit: (!units.is_empty()).then(|| units.to_string()),
                icon: Some(icon),
                device_class: None,
                conversion: Conversion::None,
            },
        }
    }

    /// Presentation for a series whose unit is not known yet.
    pub fn unknown(series: &str, dimension: &str) -> Self {
        Self::lookup(series, dimension, "")
    }

    /// Convert an already rounded reading into the display unit.
    pub fn convert(&self, value: f64) -> f64 {
        self.conversion.apply(value)
    }
}

fn icon_for(series: &str, dimension: &str) -> &'static str {
    if series.contains("net.") {
        if dimension.contains("received") {
            return "mdi:download";
        }
        if dimension.contains("sent") {
            return "mdi:upload";
        }
    }
    DEFAULT_ICON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kilobits_convert_to_megabytes() {
        let p = Presentation::lookup("net.eth0", "received", "kilobits/s");
        assert_eq!(p.unit.as_deref(), Some("MB/s"));
        assert_eq!(p.convert(8192.0), 1.0);
        assert_eq!(p.convert(1000.0), 0.122);
    }

    #[test]
    fn unit_lookup_is_case_insensitive() {
        let p = Presentation::lookup("system.cpu", "user", "Percentage");
        assert_eq!(p.unit.as_deref(), Some("%"));
        assert_eq!(p.convert(42.5), 42.5);
    }

    #[test]
    fn power_and_temperature_have_device_class_and_no_icon() {
        let p = Presentation::lookup("sensors.power", "psu", "Watts");
        assert_eq!(p.unit.as_deref(), Some("W"));
        assert_eq!(p.device_class, Some(DeviceClass::Power));
        assert_eq!(p.icon, None);

        let p = Presentation::lookup("sensors.temp", "cpu", "Celsius");
        assert_eq!(p.unit.as_deref(), Some("°C"));
        assert_eq!(p.device_class, Some(DeviceClass::Temperature));
        assert_eq!(p.icon, None);
    }

    #[test]
    fn unknown_unit_passes_through() {
        let p = Presentation::lookup("system.ram", "used", "MiB");
        assert_eq!(p.unit.as_deref(), Some("MiB"));
        assert_eq!(p.icon, Some(DEFAULT_ICON));
        assert_eq!(p.device_class, None);
        assert_eq!(p.convert(123.45), 123.45);
    }

    #[test]
    fn network_icons_follow_direction() {
        assert_eq!(icon_for("net.eth0", "received"), "mdi:download");
        assert_eq!(icon_for("net.eth0", "sent"), "mdi:upload");
        assert_eq!(icon_for("net.eth0", "errors"), DEFAULT_ICON);
        assert_eq!(icon_for("system.cpu", "received"), DEFAULT_ICON);
    }

    #[test]
    fn unknown_presentation_has_no_unit() {
        let p = Presentation::unknown("system.cpu", "user");
        assert_eq!(p.unit, None);
        assert_eq!(p.icon, Some(DEFAULT_ICON));
    }

    #[test]
    fn round_to_decimals() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(0.1220703125, 3), 0.122);
        assert_eq!(round_to(-2.5, 0), -3.0);
    }
}
