// HTTP handler bindings for the engine API endpoints
//
// This module provides thin wrapper functions that bind Rocket HTTP routes
// to the Bot's core logic methods. Handlers are responsible for:
// - Deserializing incoming JSON requests
// - Extracting Bot instance from Rocket's managed state
// - Delegating to Bot methods
// - Mapping engine errors to 422 responses

use log::warn;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use serde_json::{json, Value};

use snake_autopilot::bot::Bot;
use snake_autopilot::error::EngineError;
use snake_autopilot::types::GameState;

type Rejection = status::Custom<Json<Value>>;

fn reject(err: EngineError) -> Rejection {
    warn!("Rejected request: {}", err);
    status::Custom(
        Status::UnprocessableEntity,
        Json(json!({ "error": err.to_string() })),
    )
}

/// GET / endpoint
/// Returns bot metadata and appearance configuration
#[get("/")]
pub fn index(bot: &rocket::State<Bot>) -> Json<Value> {
    Json(bot.info())
}

/// POST /start endpoint
/// Creates the game session, building the cycle when the game asks for it
#[post("/start", format = "json", data = "<start_req>")]
pub fn start(bot: &rocket::State<Bot>, start_req: Json<GameState>) -> Result<Status, Rejection> {
    bot.start(&start_req.game, &start_req.board)
        .map(|_| Status::Ok)
        .map_err(reject)
}

/// POST /move endpoint
/// Called each turn to compute and return the next move
#[post("/move", format = "json", data = "<move_req>")]
pub async fn get_move(
    bot: &rocket::State<Bot>,
    move_req: Json<GameState>,
) -> Result<Json<Value>, Rejection> {
    bot.get_move(&move_req.game, &move_req.turn, &move_req.board)
        .await
        .map(Json)
        .map_err(reject)
}

/// POST /end endpoint
/// Called when a game ends - drops the session
#[post("/end", format = "json", data = "<end_req>")]
pub fn end(bot: &rocket::State<Bot>, end_req: Json<GameState>) -> Status {
    bot.end(&end_req.game);

    Status::Ok
}
