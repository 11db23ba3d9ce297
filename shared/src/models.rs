use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MappingError;
use crate::statistics::{self, Surprise};

/// Qualitative importance of an indicator release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    pub const ALL: [Impact; 3] = [Impact::High, Impact::Medium, Impact::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::High => "HIGH",
            Impact::Medium => "MEDIUM",
            Impact::Low => "LOW",
        }
    }

    pub fn is_high(&self) -> bool {
        matches!(self, Impact::High)
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Impact {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(Impact::High),
            "MEDIUM" => Ok(Impact::Medium),
            "LOW" => Ok(Impact::Low),
            _ => Err(MappingError::UnknownImpact(s.to_string())),
        }
    }
}

/// Volatility bucket assigned by the statistics engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VolatilityCategory {
    High,
    Medium,
    Low,
}

impl VolatilityCategory {
    pub const ALL: [VolatilityCategory; 3] = [
        VolatilityCategory::High,
        VolatilityCategory::Medium,
        VolatilityCategory::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityCategory::High => "HIGH",
            VolatilityCategory::Medium => "MEDIUM",
            VolatilityCategory::Low => "LOW",
        }
    }
}

impl fmt::Display for VolatilityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VolatilityCategory {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(VolatilityCategory::High),
            "MEDIUM" => Ok(VolatilityCategory::Medium),
            "LOW" => Ok(VolatilityCategory::Low),
            _ => Err(MappingError::UnknownCategory(s.to_string())),
        }
    }
}

/// A scheduled economic data release.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub id: i64,
    pub released_at: DateTime<Utc>,
    pub country: String,
    pub name: String,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
    pub previous: Option<f64>,
    pub impact: Impact,
    pub source: Option<String>,
    pub unit: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Indicator {
    pub fn surprise(&self) -> Surprise {
        statistics::surprise(self.actual, self.forecast)
    }
}

/// Validated field set for creating or fully replacing an indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIndicator {
    pub released_at: DateTime<Utc>,
    pub country: String,
    pub name: String,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
    pub previous: Option<f64>,
    pub impact: Impact,
    pub source: Option<String>,
    pub unit: Option<String>,
}

/// Measured high/low price range for an indicator over one window.
#[derive(Debug, Clone, PartialEq)]
pub struct VolatilitySample {
    pub id: i64,
    pub indicator_id: i64,
    pub timeframe: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub high_price: f64,
    pub low_price: f64,
    pub volatility: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewVolatilitySample {
    pub indicator_id: i64,
    pub timeframe: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub high_price: f64,
    pub low_price: f64,
    pub volatility: f64,
}

impl NewVolatilitySample {
    /// Price movement over the window, used when no volatility is supplied.
    pub fn price_range(high_price: f64, low_price: f64) -> f64 {
        high_price - low_price
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSetting {
    pub id: i64,
    pub user_id: i64,
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional constraints when listing indicators. Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorFilter {
    pub country: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub impact: Option<Impact>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_parsing_is_closed() {
        assert_eq!("HIGH".parse::<Impact>().unwrap(), Impact::High);
        assert_eq!(" medium ".parse::<Impact>().unwrap(), Impact::Medium);
        assert_eq!("Low".parse::<Impact>().unwrap(), Impact::Low);
        assert_eq!(
            "CRITICAL".parse::<Impact>(),
            Err(MappingError::UnknownImpact("CRITICAL".to_string()))
        );
        assert!("".parse::<Impact>().is_err());
    }

    #[test]
    fn test_impact_string_round_trip() {
        for impact in Impact::ALL {
            assert_eq!(impact.as_str().parse::<Impact>().unwrap(), impact);
        }
        assert!(Impact::High.is_high());
        assert!(!Impact::Low.is_high());
    }

    #[test]
    fn test_category_parsing() {
        for category in VolatilityCategory::ALL {
            assert_eq!(category.to_string().parse::<VolatilityCategory>().unwrap(), category);
        }
        assert!(matches!(
            "EXTREME".parse::<VolatilityCategory>(),
            Err(MappingError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_price_range() {
        assert_eq!(NewVolatilitySample::price_range(1.25, 1.0), 0.25);
    }
}
