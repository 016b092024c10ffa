pub mod analysis;
pub mod chat;
pub mod farm;
pub mod task;

pub use analysis::{Analysis, AnalysisKind, NewAnalysis};
pub use chat::{Chat, ChatPatch, Message, NewMessage, Role};
pub use farm::{
    EnvironmentalReading, Farm, FarmPatch, NewFarm, NewStrain, OptimalConditions, ReadingInput,
    Strain,
};
pub use task::{NewTask, Priority, Task, TaskPatch, TaskStatus};

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in patch bodies.
pub(crate) fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// [`double_option`] for epoch-millisecond timestamps.
pub(crate) fn double_option_millis<'de, D>(
    de: D,
) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<i64> = Option::deserialize(de)?;
    raw.map(|ms| {
        DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {ms}")))
    })
    .transpose()
    .map(Some)
}
