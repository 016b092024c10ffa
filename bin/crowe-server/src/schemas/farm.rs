use crowe_core::entities::{EnvironmentalReading, Farm, FarmPatch, Strain};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateFarmRequest {
    pub name: Option<String>,
    pub description: String,
    pub location: String,
    pub size: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFarmRequest {
    pub farm_id: String,
    #[serde(flatten)]
    pub patch: FarmPatch,
}

#[derive(Debug, Serialize)]
pub struct FarmList {
    pub farms: Vec<Farm>,
}

#[derive(Debug, Serialize)]
pub struct FarmBody {
    pub farm: Farm,
}

#[derive(Debug, Serialize)]
pub struct StrainBody {
    pub strain: Strain,
}

#[derive(Debug, Serialize)]
pub struct ReadingBody {
    pub reading: EnvironmentalReading,
}

#[derive(Debug, Serialize)]
pub struct ReadingList {
    pub readings: Vec<EnvironmentalReading>,
}
