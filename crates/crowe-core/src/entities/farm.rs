use std::future::Future;

use tracing::{debug, info};

use crate::entities::{Farm, FarmPatch, KvStore, NewFarm, NewStrain, Strain, keys, new_id};
use crate::error::{CoreError, Result};

pub trait FarmStore: Send + Sync + 'static {
    /// Register a farm with no strains and no reading yet.
    fn create_farm(&self, farm: NewFarm) -> impl Future<Output = Result<Farm>> + Send;

    fn get_farm(
        &self,
        user_id: &str,
        farm_id: &str,
    ) -> impl Future<Output = Result<Option<Farm>>> + Send;

    /// Overlay `patch` on the stored farm. Silently does nothing when the
    /// farm does not exist.
    fn update_farm(
        &self,
        user_id: &str,
        farm_id: &str,
        patch: FarmPatch,
    ) -> impl Future<Output = Result<()>> + Send;

    /// All of the user's farms, most recently updated first.
    fn get_user_farms(&self, user_id: &str) -> impl Future<Output = Result<Vec<Farm>>> + Send;

    /// Append a strain to the farm. Fails with [`CoreError::FarmNotFound`]
    /// when the farm does not exist.
    fn add_strain_to_farm(
        &self,
        user_id: &str,
        farm_id: &str,
        strain: NewStrain,
    ) -> impl Future<Output = Result<Strain>> + Send;
}

impl KvStore {
    /// Load a farm or fail with [`CoreError::FarmNotFound`].
    pub(crate) async fn require_farm(&self, user_id: &str, farm_id: &str) -> Result<Farm> {
        self.get_farm(user_id, farm_id)
            .await?
            .ok_or_else(|| CoreError::FarmNotFound {
                farm_id: farm_id.to_owned(),
            })
    }
}

impl FarmStore for KvStore {
    async fn create_farm(&self, farm: NewFarm) -> Result<Farm> {
        let now = self.now();
        let created = Farm {
            id: new_id(),
            name: farm.name,
            description: farm.description,
            location: farm.location,
            size: farm.size,
            created_at: now,
            updated_at: now,
            user_id: farm.user_id,
            strains: Vec::new(),
            environmental_data: None,
        };
        self.write(&keys::farms(&created.user_id), &created.id, &created)
            .await?;
        info!(user_id = %created.user_id, farm_id = %created.id, "farm created");
        Ok(created)
    }

    async fn get_farm(&self, user_id: &str, farm_id: &str) -> Result<Option<Farm>> {
        self.read(&keys::farms(user_id), farm_id).await
    }

    async fn update_farm(&self, user_id: &str, farm_id: &str, patch: FarmPatch) -> Result<()> {
        let Some(existing) = self.get_farm(user_id, farm_id).await? else {
            debug!(user_id, farm_id, "update of missing farm ignored");
            return Ok(());
        };
        let updated = patch.merge(existing, self.now());
        self.write(&keys::farms(user_id), farm_id, &updated).await
    }

    async fn get_user_farms(&self, user_id: &str) -> Result<Vec<Farm>> {
        let mut farms: Vec<Farm> = self.read_all(&keys::farms(user_id)).await?;
        farms.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(farms)
    }

    async fn add_strain_to_farm(
        &self,
        user_id: &str,
        farm_id: &str,
        strain: NewStrain,
    ) -> Result<Strain> {
        let farm = self.require_farm(user_id, farm_id).await?;
        let added = Strain {
            id: new_id(),
            name: strain.name,
            kind: strain.kind,
            description: strain.description,
            growth_rate: strain.growth_rate,
            preferred_substrate: strain.preferred_substrate,
            optimal_conditions: strain.optimal_conditions,
            created_at: self.now(),
            farm_id: farm_id.to_owned(),
        };

        let mut strains = farm.strains;
        strains.push(added.clone());
        self.update_farm(
            user_id,
            farm_id,
            FarmPatch {
                strains: Some(strains),
                ..FarmPatch::default()
            },
        )
        .await?;
        debug!(user_id, farm_id, strain_id = %added.id, "strain added");
        Ok(added)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::ManualClock;
    use crate::entities::OptimalConditions;
    use std::sync::Arc;

    fn store() -> KvStore {
        KvStore::in_memory().with_clock(Arc::new(ManualClock::new(10_000, 1)))
    }

    fn new_farm(name: &str) -> NewFarm {
        NewFarm {
            user_id: "u1".into(),
            name: name.into(),
            description: "grow room".into(),
            location: "Basement".into(),
            size: "12 racks".into(),
        }
    }

    fn oyster() -> NewStrain {
        NewStrain {
            name: "Pearl Oyster".into(),
            kind: "oyster".into(),
            description: "Aggressive colonizer".into(),
            growth_rate: "fast".into(),
            preferred_substrate: "straw".into(),
            optimal_conditions: OptimalConditions {
                temperature: "18-24C".into(),
                humidity: "85-95%".into(),
                light: "indirect".into(),
                co2: "<800ppm".into(),
            },
        }
    }

    #[tokio::test]
    async fn new_farm_starts_without_strains() {
        let store = store();
        let farm = store.create_farm(new_farm("North")).await.unwrap();
        let fetched = store.get_farm("u1", &farm.id).await.unwrap().unwrap();
        assert!(fetched.strains.is_empty());
        assert!(fetched.environmental_data.is_none());
        assert_eq!(fetched, farm);
    }

    #[tokio::test]
    async fn strains_append_in_order() {
        let store = store();
        let farm = store.create_farm(new_farm("North")).await.unwrap();
        let first = store.add_strain_to_farm("u1", &farm.id, oyster()).await.unwrap();
        let mut lions_mane = oyster();
        lions_mane.name = "Lion's Mane".into();
        let second = store
            .add_strain_to_farm("u1", &farm.id, lions_mane)
            .await
            .unwrap();

        let fetched = store.get_farm("u1", &farm.id).await.unwrap().unwrap();
        assert_eq!(fetched.strains, vec![first.clone(), second]);
        assert_eq!(first.farm_id, farm.id);
        assert!(fetched.updated_at > farm.updated_at);
    }

    #[tokio::test]
    async fn strain_on_missing_farm_fails() {
        let store = store();
        let err = store
            .add_strain_to_farm("u1", "nowhere", oyster())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::FarmNotFound { .. }));
    }

    #[tokio::test]
    async fn patch_without_strains_keeps_them() {
        let store = store();
        let farm = store.create_farm(new_farm("North")).await.unwrap();
        store.add_strain_to_farm("u1", &farm.id, oyster()).await.unwrap();
        store
            .update_farm(
                "u1",
                &farm.id,
                FarmPatch {
                    location: Some("Garage".into()),
                    ..FarmPatch::default()
                },
            )
            .await
            .unwrap();
        let fetched = store.get_farm("u1", &farm.id).await.unwrap().unwrap();
        assert_eq!(fetched.location, "Garage");
        assert_eq!(fetched.strains.len(), 1);
    }

    #[tokio::test]
    async fn user_farms_most_recent_first() {
        let store = store();
        let a = store.create_farm(new_farm("A")).await.unwrap();
        let b = store.create_farm(new_farm("B")).await.unwrap();
        store
            .update_farm("u1", &a.id, FarmPatch::default())
            .await
            .unwrap();
        let names: Vec<_> = store
            .get_user_farms("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(names, [a.id, b.id]);
    }

    #[tokio::test]
    async fn update_of_missing_farm_is_a_no_op() {
        let store = store();
        store
            .update_farm("u1", "ghost", FarmPatch::default())
            .await
            .unwrap();
        assert!(store.get_user_farms("u1").await.unwrap().is_empty());
    }
}
