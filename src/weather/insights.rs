use serde::Serialize;

use crate::weather::repo::WeatherReading;

pub const TREND_RISING: &str = "rising";
pub const TREND_FALLING: &str = "falling";
pub const TREND_STABLE: &str = "stable";
pub const TREND_UNDEFINED: &str = "undefined";

pub const ALERT_HEAT: &str = "heat warning";
pub const ALERT_WIND: &str = "high wind";
pub const ALERT_NORMAL: &str = "normal conditions";
pub const ALERT_NO_DATA: &str = "no data";

const HEAT_THRESHOLD_C: f64 = 30.0;
const WIND_THRESHOLD_KMH: f64 = 25.0;

/// Trend/alert summary derived from the two most recent readings.
#[derive(Debug, Serialize, PartialEq)]
pub struct Insight {
    pub summary: String,
    pub trend: &'static str,
    pub alert: &'static str,
}

/// Classify the given readings, newest first. Pure and total: any input
/// yields exactly one trend and one alert.
pub fn classify(readings: &[WeatherReading]) -> Insight {
    let Some(current) = readings.first() else {
        return Insight {
            summary: "Waiting for enough data to analyze...".to_string(),
            trend: TREND_UNDEFINED,
            alert: ALERT_NO_DATA,
        };
    };
    // A single reading compares against itself, forcing "stable".
    let previous = readings.get(1).unwrap_or(current);

    let trend = if current.temperature > previous.temperature {
        TREND_RISING
    } else if current.temperature < previous.temperature {
        TREND_FALLING
    } else {
        TREND_STABLE
    };

    // Heat takes priority over wind; the labels are mutually exclusive.
    let alert = if current.temperature > HEAT_THRESHOLD_C {
        ALERT_HEAT
    } else if current.windspeed > WIND_THRESHOLD_KMH {
        ALERT_WIND
    } else {
        ALERT_NORMAL
    };

    let summary = format!(
        "Current temperature is {}°C with winds of {} km/h.",
        current.temperature, current.windspeed
    );

    Insight {
        summary,
        trend,
        alert,
    }
}
