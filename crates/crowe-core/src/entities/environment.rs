use std::future::Future;

use tracing::debug;

use crate::entities::{EnvironmentalReading, FarmPatch, FarmStore, KvStore, ReadingInput, keys};
use crate::error::Result;

/// Readings kept per farm in `env:{farmId}`; older ones are discarded.
pub const ENVIRONMENT_HISTORY_CAP: usize = 1000;

/// Readings returned by default from [`EnvironmentStore::get_environmental_history`].
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

pub trait EnvironmentStore: Send + Sync + 'static {
    /// Stamp `reading`, make it the farm's latest reading and push it onto the
    /// farm's capped history. Fails with
    /// [`CoreError::FarmNotFound`](crate::CoreError::FarmNotFound) when the
    /// farm does not exist.
    fn save_environmental_data(
        &self,
        user_id: &str,
        farm_id: &str,
        reading: ReadingInput,
    ) -> impl Future<Output = Result<EnvironmentalReading>> + Send;

    /// Up to `limit` readings, newest first.
    fn get_environmental_history(
        &self,
        farm_id: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<EnvironmentalReading>>> + Send;
}

impl EnvironmentStore for KvStore {
    async fn save_environmental_data(
        &self,
        user_id: &str,
        farm_id: &str,
        reading: ReadingInput,
    ) -> Result<EnvironmentalReading> {
        self.require_farm(user_id, farm_id).await?;
        let stamped = reading.at(self.now());

        self.update_farm(
            user_id,
            farm_id,
            FarmPatch {
                environmental_data: Some(stamped),
                ..FarmPatch::default()
            },
        )
        .await?;

        let history = keys::environment(farm_id);
        self.prepend(&history, &stamped).await?;
        self.keep_head(&history, ENVIRONMENT_HISTORY_CAP).await?;
        debug!(user_id, farm_id, "environmental reading saved");
        Ok(stamped)
    }

    async fn get_environmental_history(
        &self,
        farm_id: &str,
        limit: usize,
    ) -> Result<Vec<EnvironmentalReading>> {
        self.read_head(&keys::environment(farm_id), limit).await
    }
}
