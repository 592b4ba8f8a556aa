//! HTTP endpoints of the controller.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use hexlight_app::{
    BrightnessReply, HexColors, HexlightError, HexlightResult, LightController, PaletteReply,
    PathReply, PlugReply, StatusReply,
};
use hexlight_core::{ColorTriple, Hue};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::ApiError;

type SharedController = Arc<LightController>;

/// JSON envelope of the non text replies.
#[derive(Debug, Serialize)]
struct Reply<T> {
    data: T,
}

type JsonReply<T> = Result<Json<Reply<T>>, ApiError>;

fn reply<T>(data: T) -> Json<Reply<T>> {
    Json(Reply { data })
}

/// Runs the controller request on the blocking pool, since stopping an effect
/// joins its thread.
async fn blocking<T, F>(controller: &SharedController, request: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&LightController) -> HexlightResult<T> + Send + 'static,
{
    let controller = controller.clone();
    let result = tokio::task::spawn_blocking(move || request(&controller)).await?;
    Ok(result?)
}

/// Creates the router with all controller endpoints.
pub fn router(controller: SharedController) -> Router {
    Router::new()
        .route("/", get(main_page))
        .route("/clear", get(clear))
        .route("/cycle_through_rainbow", get(cycle_through_rainbow))
        .route("/rainbow_wheel", get(rainbow_cycle))
        .route("/rainbow_cycle", get(rainbow_cycle))
        .route("/play_song", get(play_song))
        .route("/authenticate_spotify", post(authenticate))
        .route("/set_color/:color", get(set_color))
        .route("/set_hex_color/:index/:color", get(set_hex_color))
        .route("/flash_around", get(flash_around))
        .route("/set_brightness/:value", get(set_brightness))
        .route("/get_brightness", get(brightness))
        .route("/get_path", get(path))
        .route("/get_hex_colors", get(hex_colors))
        .route("/set_color_palette", get(random_color_palette))
        .route("/set_color_palette/:hue", get(set_color_palette))
        .route("/day_time", get(day_time))
        .route("/toggle_power", get(toggle_power))
        .route("/plug_state", get(plug_state))
        .route("/chase", get(chase))
        .route("/status", get(status))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(controller)
}

async fn main_page() -> &'static str {
    "Main Page"
}

async fn clear(State(controller): State<SharedController>) -> Result<String, ApiError> {
    blocking(&controller, LightController::clear).await
}

async fn cycle_through_rainbow(
    State(controller): State<SharedController>,
) -> Result<String, ApiError> {
    blocking(&controller, LightController::cycle_through_rainbow).await
}

async fn rainbow_cycle(State(controller): State<SharedController>) -> JsonReply<String> {
    blocking(&controller, LightController::rainbow_cycle)
        .await
        .map(reply)
}

async fn play_song(State(controller): State<SharedController>) -> JsonReply<String> {
    blocking(&controller, LightController::play_song)
        .await
        .map(reply)
}

async fn authenticate(
    State(controller): State<SharedController>,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&controller, move |controller| controller.authenticate(&body)).await?;
    Ok((StatusCode::FOUND, [(header::LOCATION, "/play_song")]))
}

async fn set_color(
    State(controller): State<SharedController>,
    Path(color): Path<String>,
) -> JsonReply<String> {
    let color: ColorTriple = color.parse()?;
    blocking(&controller, move |controller| controller.set_color(color))
        .await
        .map(reply)
}

async fn set_hex_color(
    State(controller): State<SharedController>,
    Path((index, color)): Path<(String, String)>,
) -> JsonReply<String> {
    let index: usize = index
        .parse()
        .map_err(|_| HexlightError::InvalidHexagon(index.clone()))?;
    let color: ColorTriple = color.parse()?;
    blocking(&controller, move |controller| {
        controller.set_hex_color(index, color)
    })
    .await
    .map(reply)
}

async fn flash_around(State(controller): State<SharedController>) -> JsonReply<String> {
    blocking(&controller, LightController::flash_around)
        .await
        .map(reply)
}

async fn set_brightness(
    State(controller): State<SharedController>,
    Path(value): Path<String>,
) -> JsonReply<String> {
    let brightness: f32 = value
        .parse()
        .map_err(|_| HexlightError::InvalidBrightness(value.clone()))?;
    blocking(&controller, move |controller| {
        controller.set_brightness(brightness)
    })
    .await
    .map(reply)
}

async fn brightness(State(controller): State<SharedController>) -> JsonReply<BrightnessReply> {
    blocking(&controller, |controller| Ok(controller.brightness()))
        .await
        .map(reply)
}

async fn path(State(controller): State<SharedController>) -> JsonReply<PathReply> {
    blocking(&controller, |controller| Ok(controller.path()))
        .await
        .map(reply)
}

async fn hex_colors(State(controller): State<SharedController>) -> JsonReply<HexColors> {
    blocking(&controller, |controller| Ok(controller.hex_colors()))
        .await
        .map(reply)
}

async fn random_color_palette(
    State(controller): State<SharedController>,
) -> JsonReply<PaletteReply> {
    blocking(&controller, |controller| controller.set_color_palette(None))
        .await
        .map(reply)
}

async fn set_color_palette(
    State(controller): State<SharedController>,
    Path(hue): Path<String>,
) -> JsonReply<PaletteReply> {
    let hue: Hue = hue.parse()?;
    blocking(&controller, move |controller| {
        controller.set_color_palette(Some(hue))
    })
    .await
    .map(reply)
}

async fn day_time(State(controller): State<SharedController>) -> JsonReply<String> {
    blocking(&controller, LightController::day_time)
        .await
        .map(reply)
}

async fn toggle_power(State(controller): State<SharedController>) -> JsonReply<PlugReply> {
    blocking(&controller, LightController::toggle_power)
        .await
        .map(reply)
}

async fn plug_state(State(controller): State<SharedController>) -> JsonReply<PlugReply> {
    blocking(&controller, LightController::plug_state)
        .await
        .map(reply)
}

async fn chase(State(controller): State<SharedController>) -> JsonReply<String> {
    blocking(&controller, LightController::chase)
        .await
        .map(reply)
}

async fn status(State(controller): State<SharedController>) -> JsonReply<StatusReply> {
    blocking(&controller, |controller| Ok(controller.status()))
        .await
        .map(reply)
}
