use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

const KELVIN_OFFSET: f64 = 273.15;

/// A temperature in degrees Fahrenheit.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Fahrenheit(pub f64);

impl Fahrenheit {
    pub fn from_kelvin(kelvin: f64) -> Self {
        Self((kelvin - KELVIN_OFFSET) * 9.0 / 5.0 + 32.0)
    }

    /// Nearest whole degree, halves away from zero.
    pub fn round(self) -> Self {
        Self(self.0.round())
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Fahrenheit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}°F", self.0)
    }
}

// Whole degrees go out as JSON integers.
impl Serialize for Fahrenheit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let v = self.0;
        if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            serializer.serialize_i64(v as i64)
        } else {
            serializer.serialize_f64(v)
        }
    }
}

/// Per-request bookkeeping, consumed when the report is produced.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub city: String,
    pub started_at: DateTime<Utc>,
    begin: Instant,
}

impl RequestContext {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            started_at: Utc::now(),
            begin: Instant::now(),
        }
    }

    pub fn finish(self, temp: Fahrenheit) -> WeatherReport {
        WeatherReport {
            city: self.city,
            temp,
            took: format!("{:?}", self.begin.elapsed()),
        }
    }
}

/// Body of a successful `/weather/{city}` response.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub city: String,
    pub temp: Fahrenheit,
    pub took: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kelvin_to_fahrenheit() {
        assert_eq!(Fahrenheit::from_kelvin(300.15).round(), Fahrenheit(81.0));
        assert_eq!(Fahrenheit::from_kelvin(293.15).round(), Fahrenheit(68.0));
        assert_eq!(Fahrenheit::from_kelvin(273.15).round(), Fahrenheit(32.0));
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(Fahrenheit(70.5).round(), Fahrenheit(71.0));
        assert_eq!(Fahrenheit(-0.5).round(), Fahrenheit(-1.0));
        assert_eq!(Fahrenheit(70.49).round(), Fahrenheit(70.0));
    }

    #[test]
    fn report_serializes_whole_degrees_as_integers() {
        let report = WeatherReport {
            city: "Boston".into(),
            temp: Fahrenheit(68.0),
            took: "1ms".into(),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"city":"Boston","temp":68,"took":"1ms"}"#);

        let json = serde_json::to_string(&Fahrenheit(68.25)).unwrap();
        assert_eq!(json, "68.25");
    }

    #[test]
    fn context_finish_keeps_city() {
        let ctx = RequestContext::new("Oslo");
        assert!(ctx.started_at <= Utc::now());

        let report = ctx.finish(Fahrenheit(20.0));
        assert_eq!(report.city, "Oslo");
        assert_eq!(report.temp, Fahrenheit(20.0));
        assert!(!report.took.is_empty());
    }
}
