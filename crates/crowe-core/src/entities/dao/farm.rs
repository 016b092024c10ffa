use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Growing conditions a strain prefers, as free-form ranges (`"20-24°C"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct OptimalConditions {
    pub temperature: String,
    pub humidity: String,
    pub light: String,
    pub co2: String,
}

/// A cultivated strain. Owned by exactly one farm and only ever appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strain {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub growth_rate: String,
    pub preferred_substrate: String,
    pub optimal_conditions: OptimalConditions,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub farm_id: String,
}

/// Caller-supplied part of a [`Strain`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStrain {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub growth_rate: String,
    #[serde(default)]
    pub preferred_substrate: String,
    #[serde(default)]
    pub optimal_conditions: OptimalConditions,
}

/// One sensor snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalReading {
    pub temperature: f64,
    pub humidity: f64,
    pub co2: f64,
    pub light: f64,
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// Sensor values as submitted; the timestamp is assigned on save.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadingInput {
    pub temperature: f64,
    pub humidity: f64,
    pub co2: f64,
    pub light: f64,
}

impl ReadingInput {
    pub fn at(self, timestamp: DateTime<Utc>) -> EnvironmentalReading {
        EnvironmentalReading {
            temperature: self.temperature,
            humidity: self.humidity,
            co2: self.co2,
            light: self.light,
            timestamp,
        }
    }
}

/// A growing operation, stored in `farms:{userId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub size: String,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    pub user_id: String,
    pub strains: Vec<Strain>,
    /// Most recent reading; the history lives in `env:{farmId}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environmental_data: Option<EnvironmentalReading>,
}

/// Caller-supplied part of a [`Farm`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewFarm {
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub size: String,
}

/// Fields of a [`Farm`] that an update may overwrite. `strains` replaces the
/// whole sequence.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub size: Option<String>,
    pub strains: Option<Vec<Strain>>,
    pub environmental_data: Option<EnvironmentalReading>,
}

impl FarmPatch {
    pub fn merge(self, base: Farm, now: DateTime<Utc>) -> Farm {
        Farm {
            name: self.name.unwrap_or(base.name),
            description: self.description.unwrap_or(base.description),
            location: self.location.unwrap_or(base.location),
            size: self.size.unwrap_or(base.size),
            strains: self.strains.unwrap_or(base.strains),
            environmental_data: self.environmental_data.or(base.environmental_data),
            updated_at: now,
            ..base
        }
    }
}
