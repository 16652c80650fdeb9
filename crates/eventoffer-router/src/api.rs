use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Deserializer};

use eventoffer_core::AppState;
use eventoffer_storage::{EventOfferPatch, EventPatch, NewEvent, NewOffer, OfferPatch};

use crate::error::ApiError;

type ApiResult = Result<Response, ApiError>;

/// Event, offer and association routes, relative to `/api`.
pub fn resource_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/", get(list_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/{id}/offers", get(list_event_offers))
        .route("/offers", get(list_offers).post(create_offer))
        .route("/offers/", get(list_offers).post(create_offer))
        .route(
            "/offers/{id}",
            get(get_offer).put(update_offer).delete(delete_offer),
        )
        .route("/offers/{id}/events", get(list_offer_events))
        .route("/event-offers", post(create_event_offer))
        .route("/event-offers/", post(create_event_offer))
        .route(
            "/event-offers/{event_id}/{offer_id}",
            get(get_event_offer)
                .put(update_event_offer)
                .delete(delete_event_offer),
        )
}

#[derive(Debug, Deserialize)]
struct ListParams {
    skip: Option<u64>,
    limit: Option<u64>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field (`None`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
struct CreateEventBody {
    id: String,
    code: String,
    name: String,
    description: Option<String>,
    lifetime_hours: Option<i32>,
    disable_all_campaigns: Option<bool>,
    queue_name: Option<String>,
}

impl From<CreateEventBody> for NewEvent {
    fn from(body: CreateEventBody) -> Self {
        let mut event = NewEvent::new(body.id, body.code, body.name);
        event.description = body.description;
        if let Some(lifetime_hours) = body.lifetime_hours {
            event.lifetime_hours = lifetime_hours;
        }
        if let Some(disable_all_campaigns) = body.disable_all_campaigns {
            event.disable_all_campaigns = disable_all_campaigns;
        }
        if let Some(queue_name) = body.queue_name {
            event.queue_name = queue_name;
        }
        event
    }
}

#[derive(Debug, Deserialize)]
struct UpdateEventBody {
    code: Option<String>,
    name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    description: Option<Option<String>>,
    lifetime_hours: Option<i32>,
    disable_all_campaigns: Option<bool>,
    queue_name: Option<String>,
}

impl From<UpdateEventBody> for EventPatch {
    fn from(body: UpdateEventBody) -> Self {
        Self {
            code: body.code,
            name: body.name,
            description: body.description,
            lifetime_hours: body.lifetime_hours,
            disable_all_campaigns: body.disable_all_campaigns,
            queue_name: body.queue_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateOfferBody {
    id: String,
    code: String,
    name: String,
    description: Option<String>,
    priority: Option<i32>,
    target_system: Option<String>,
}

impl From<CreateOfferBody> for NewOffer {
    fn from(body: CreateOfferBody) -> Self {
        let mut offer = NewOffer::new(body.id, body.code, body.name);
        offer.description = body.description;
        if let Some(priority) = body.priority {
            offer.priority = priority;
        }
        if let Some(target_system) = body.target_system {
            offer.target_system = target_system;
        }
        offer
    }
}

#[derive(Debug, Deserialize)]
struct UpdateOfferBody {
    code: Option<String>,
    name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    description: Option<Option<String>>,
    priority: Option<i32>,
    target_system: Option<String>,
}

impl From<UpdateOfferBody> for OfferPatch {
    fn from(body: UpdateOfferBody) -> Self {
        Self {
            code: body.code,
            name: body.name,
            description: body.description,
            priority: body.priority,
            target_system: body.target_system,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateEventOfferBody {
    event_id: String,
    offer_id: String,
    delay_minutes: Option<i32>,
    action_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateEventOfferBody {
    delay_minutes: Option<i32>,
    action_type: Option<String>,
}

async fn list_events(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult {
    let Query(params) = params?;
    let events = state.events.list(params.skip, params.limit).await?;
    Ok(Json(events).into_response())
}

async fn create_event(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateEventBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body?;
    let event = state.events.create(body.into()).await?;
    Ok((StatusCode::CREATED, Json(event)).into_response())
}

async fn get_event(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    let event = state.events.get(&id).await?;
    Ok(Json(event).into_response())
}

async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateEventBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body?;
    let event = state.events.update(&id, body.into()).await?;
    Ok(Json(event).into_response())
}

async fn delete_event(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    state.events.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn list_event_offers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let links = state.associations.list_for_event(&id).await?;
    Ok(Json(links).into_response())
}

async fn list_offers(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult {
    let Query(params) = params?;
    let offers = state.offers.list(params.skip, params.limit).await?;
    Ok(Json(offers).into_response())
}

async fn create_offer(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateOfferBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body?;
    let offer = state.offers.create(body.into()).await?;
    Ok((StatusCode::CREATED, Json(offer)).into_response())
}

async fn get_offer(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    let offer = state.offers.get(&id).await?;
    Ok(Json(offer).into_response())
}

async fn update_offer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateOfferBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body?;
    let offer = state.offers.update(&id, body.into()).await?;
    Ok(Json(offer).into_response())
}

async fn delete_offer(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    state.offers.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn list_offer_events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let links = state.associations.list_for_offer(&id).await?;
    Ok(Json(links).into_response())
}

async fn create_event_offer(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateEventOfferBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body?;
    let link = state
        .associations
        .create(
            &body.event_id,
            &body.offer_id,
            body.delay_minutes,
            body.action_type,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(link)).into_response())
}

async fn get_event_offer(
    State(state): State<Arc<AppState>>,
    Path((event_id, offer_id)): Path<(String, String)>,
) -> ApiResult {
    let link = state.associations.get(&event_id, &offer_id).await?;
    Ok(Json(link).into_response())
}

async fn update_event_offer(
    State(state): State<Arc<AppState>>,
    Path((event_id, offer_id)): Path<(String, String)>,
    body: Result<Json<UpdateEventOfferBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body?;
    let patch = EventOfferPatch {
        delay_minutes: body.delay_minutes,
        action_type: body.action_type,
    };
    let link = state
        .associations
        .update(&event_id, &offer_id, patch)
        .await?;
    Ok(Json(link).into_response())
}

async fn delete_event_offer(
    State(state): State<Arc<AppState>>,
    Path((event_id, offer_id)): Path<(String, String)>,
) -> ApiResult {
    state.associations.delete(&event_id, &offer_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
