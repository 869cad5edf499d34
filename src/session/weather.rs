//! WMO weather codes as reported by the weather tool

use serde::{Deserialize, Serialize};

/// Result of one weather lookup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity in percent, -1 when unknown
    pub humidity: f64,
    /// WMO code; the agent reports it as a float
    pub weather_code: f64,
}

impl WeatherReport {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_code(self.weather_code)
    }

    /// Humidity in percent, `None` when the lookup could not provide it
    pub fn humidity_percent(&self) -> Option<f64> {
        (self.humidity >= 0.0).then_some(self.humidity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Foggy,
    Rainy,
    Snowy,
    Thunderstorm,
}

impl WeatherCondition {
    /// Unknown codes read as clear skies
    pub fn from_code(code: f64) -> Self {
        // NaN saturates to 0, which is clear
        match code.round() as i64 {
            1..=3 => WeatherCondition::PartlyCloudy,
            45 => WeatherCondition::Foggy,
            61..=67 => WeatherCondition::Rainy,
            71..=75 => WeatherCondition::Snowy,
            95..=99 => WeatherCondition::Thunderstorm,
            _ => WeatherCondition::Clear,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "☀️",
            WeatherCondition::PartlyCloudy => "⛅",
            WeatherCondition::Foggy => "🌫️",
            WeatherCondition::Rainy => "🌧️",
            WeatherCondition::Snowy => "❄️",
            WeatherCondition::Thunderstorm => "⛈️",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "Clear skies",
            WeatherCondition::PartlyCloudy => "Partly cloudy",
            WeatherCondition::Foggy => "Foggy",
            WeatherCondition::Rainy => "Rainy",
            WeatherCondition::Snowy => "Snowy",
            WeatherCondition::Thunderstorm => "Thunderstorms",
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.emoji(), self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(WeatherCondition::from_code(0.0), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_code(2.0), WeatherCondition::PartlyCloudy);
        assert_eq!(WeatherCondition::from_code(45.0), WeatherCondition::Foggy);
        assert_eq!(WeatherCondition::from_code(63.0), WeatherCondition::Rainy);
        assert_eq!(WeatherCondition::from_code(75.0), WeatherCondition::Snowy);
        assert_eq!(WeatherCondition::from_code(96.0), WeatherCondition::Thunderstorm);
    }

    #[test]
    fn test_unknown_codes_are_clear() {
        assert_eq!(WeatherCondition::from_code(-1.0), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_code(48.0), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_code(80.0), WeatherCondition::Clear);
    }

    #[test]
    fn test_from_fractional_code() {
        assert_eq!(WeatherCondition::from_code(2.0), WeatherCondition::PartlyCloudy);
        assert_eq!(WeatherCondition::from_code(62.6), WeatherCondition::Rainy);
        assert_eq!(WeatherCondition::from_code(f64::NAN), WeatherCondition::Clear);
    }

    #[test]
    fn test_negative_humidity_is_unknown() {
        let report = WeatherReport {
            temperature: 0.0,
            humidity: -1.0,
            weather_code: 0.0,
        };
        assert_eq!(report.humidity_percent(), None);

        let report = WeatherReport { humidity: 47.0, ..report };
        assert_eq!(report.humidity_percent(), Some(47.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(WeatherCondition::Rainy.to_string(), "🌧️ Rainy");
    }
}
