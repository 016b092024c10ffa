//! Farms, their strains and environmental readings.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use crowe_core::entities::environment::DEFAULT_HISTORY_LIMIT;
use crowe_core::entities::{EnvironmentStore, FarmStore, NewFarm, NewStrain, ReadingInput};

use crate::error::ServerError;
use crate::middleware::UserId;
use crate::schemas::farm::{
    CreateFarmRequest, FarmBody, FarmList, ReadingBody, ReadingList, StrainBody,
    UpdateFarmRequest,
};
use crate::schemas::{Ack, LimitQuery, required};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/farms", get(list_farms).post(create_farm).patch(update_farm))
        .route("/farms/{id}/strains", post(add_strain))
        .route(
            "/farms/{id}/environment",
            get(environment_history).post(record_reading),
        )
}

async fn list_farms(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
) -> Result<Json<FarmList>, ServerError> {
    let farms = state.store.get_user_farms(&user_id).await?;
    Ok(Json(FarmList { farms }))
}

async fn create_farm(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Json(req): Json<CreateFarmRequest>,
) -> Result<Json<FarmBody>, ServerError> {
    let farm = state
        .store
        .create_farm(NewFarm {
            user_id,
            name: required(req.name, "name")?,
            description: req.description,
            location: req.location,
            size: req.size,
        })
        .await?;
    Ok(Json(FarmBody { farm }))
}

async fn update_farm(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Json(req): Json<UpdateFarmRequest>,
) -> Result<Json<Ack>, ServerError> {
    state
        .store
        .update_farm(&user_id, &req.farm_id, req.patch)
        .await?;
    Ok(Json(Ack::ok()))
}

async fn add_strain(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(farm_id): Path<String>,
    Json(strain): Json<NewStrain>,
) -> Result<Json<StrainBody>, ServerError> {
    if strain.name.trim().is_empty() {
        return Err(ServerError::BadRequest("name is required".into()));
    }
    let strain = state
        .store
        .add_strain_to_farm(&user_id, &farm_id, strain)
        .await?;
    Ok(Json(StrainBody { strain }))
}

async fn record_reading(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(farm_id): Path<String>,
    Json(reading): Json<ReadingInput>,
) -> Result<Json<ReadingBody>, ServerError> {
    let reading = state
        .store
        .save_environmental_data(&user_id, &farm_id, reading)
        .await?;
    Ok(Json(ReadingBody { reading }))
}

/// Newest readings first. History is keyed by farm alone, so the caller must
/// own the farm to read it.
async fn environment_history(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(farm_id): Path<String>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<ReadingList>, ServerError> {
    if state.store.get_farm(&user_id, &farm_id).await?.is_none() {
        return Err(ServerError::NotFound(format!("farm {farm_id} not found")));
    }
    let readings = state
        .store
        .get_environmental_history(&farm_id, q.limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .await?;
    Ok(Json(ReadingList { readings }))
}

#[cfg(test)]
mod test {
    use crate::routes::test_support::{app, call};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    async fn new_farm(app: &axum::Router) -> String {
        let (status, body) = call(
            app,
            Method::POST,
            "/api/farms",
            Some("u1"),
            Some(json!({"name": "Basement", "location": "Home", "size": "2 tents"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["farm"]["strains"], json!([]));
        body["farm"]["id"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn farm_lifecycle() {
        let (app, _) = app(None);
        let id = new_farm(&app).await;

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/farms/{id}/strains"),
            Some("u1"),
            Some(json!({"name": "Golden Oyster", "type": "oyster", "optimalConditions": {"temperature": "20-28C", "humidity": "90%", "light": "indirect", "co2": "low"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["strain"]["farmId"], id.as_str());
        assert_eq!(body["strain"]["type"], "oyster");

        let (status, _) = call(
            &app,
            Method::PATCH,
            "/api/farms",
            Some("u1"),
            Some(json!({"farmId": id, "location": "Garage"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(&app, Method::GET, "/api/farms", Some("u1"), None).await;
        assert_eq!(body["farms"][0]["location"], "Garage");
        assert_eq!(body["farms"][0]["strains"][0]["name"], "Golden Oyster");
    }

    #[tokio::test]
    async fn readings_round_trip() {
        let (app, _) = app(None);
        let id = new_farm(&app).await;
        let uri = format!("/api/farms/{id}/environment");
        for t in [20.0, 21.5, 23.0] {
            let (status, body) = call(
                &app,
                Method::POST,
                &uri,
                Some("u1"),
                Some(json!({"temperature": t, "humidity": 88.0, "co2": 600.0, "light": 0.0})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["reading"]["temperature"], t);
        }
        let (_, body) = call(&app, Method::GET, &format!("{uri}?limit=2"), Some("u1"), None).await;
        let temps: Vec<_> = body["readings"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["temperature"].as_f64().unwrap())
            .collect();
        assert_eq!(temps, [23.0, 21.5]);

        let (_, body) = call(&app, Method::GET, "/api/farms", Some("u1"), None).await;
        assert_eq!(body["farms"][0]["environmentalData"]["temperature"], 23.0);
    }

    #[tokio::test]
    async fn unknown_farm_is_404() {
        let (app, _) = app(None);
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/farms/ghost/strains",
            Some("u1"),
            Some(json!({"name": "Enoki"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/farms/ghost/environment",
            Some("u1"),
            Some(json!({"temperature": 1.0, "humidity": 1.0, "co2": 1.0, "light": 1.0})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, Method::GET, "/api/farms/ghost/environment", Some("u1"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn other_users_cannot_read_history() {
        let (app, _) = app(None);
        let id = new_farm(&app).await;
        let (status, _) = call(
            &app,
            Method::GET,
            &format!("/api/farms/{id}/environment"),
            Some("intruder"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
