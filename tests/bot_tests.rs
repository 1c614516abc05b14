// Integration tests for the HTTP-facing bot API
//
// These exercise the session handling behind /start, /move and /end
// without going through Rocket.

use std::thread;
use std::time::Duration;

use snake_autopilot::bot::Bot;
use snake_autopilot::config::Config;
use snake_autopilot::error::EngineError;
use snake_autopilot::types::{Board, Coord, Game, GameState, PolicyMode};

fn game(id: &str, mode: Option<PolicyMode>) -> Game {
    Game {
        id: id.to_string(),
        mode,
    }
}

fn board(rows: i32, cols: i32, snake: Vec<Coord>) -> Board {
    Board {
        rows,
        cols,
        walls: Vec::new(),
        food: Some(Coord::new(rows - 2, cols - 2)),
        snake,
        direction: None,
    }
}

fn starting_body() -> Vec<Coord> {
    vec![Coord::new(1, 3), Coord::new(1, 2), Coord::new(1, 1)]
}

#[test]
fn test_info_reports_appearance() {
    let bot = Bot::new(Config::default_hardcoded());
    let info = bot.info();
    assert_eq!(info["apiversion"], "1");
    assert_eq!(info["color"], "#00DEAD");
}

#[tokio::test]
async fn test_move_heads_toward_food() {
    let bot = Bot::new(Config::seeded(8));
    let game = game("g1", None);
    let board = board(10, 10, starting_body());

    bot.start(&game, &board).unwrap();
    let response = bot.get_move(&game, &0, &board).await.unwrap();

    let dir = response["move"].as_str().unwrap();
    assert!(dir == "right" || dir == "down", "unexpected move {}", dir);
}

#[tokio::test]
async fn test_cycle_session_survives_turns() {
    let bot = Bot::new(Config::seeded(2));
    let game = game("cycle", Some(PolicyMode::CycleFollowing));
    let first = board(6, 6, starting_body());

    bot.start(&game, &first).unwrap();
    assert!(bot.get_move(&game, &0, &first).await.is_ok());

    let second = board(
        6,
        6,
        vec![Coord::new(2, 3), Coord::new(1, 3), Coord::new(1, 2)],
    );
    let response = bot.get_move(&game, &1, &second).await.unwrap();
    assert!(response["move"].is_string());

    bot.end(&game);
    assert_eq!(bot.active_games(), 0);
}

#[test]
fn test_start_rejects_cycle_on_odd_board() {
    let bot = Bot::new(Config::seeded(1));
    let game = game("odd", Some(PolicyMode::CycleFollowing));

    let result = bot.start(&game, &board(7, 7, starting_body()));

    assert_eq!(result, Err(EngineError::OddDimensions { rows: 7, cols: 7 }));
    assert_eq!(bot.active_games(), 0);
}

#[tokio::test]
async fn test_move_without_start_creates_session() {
    let bot = Bot::new(Config::seeded(4));
    let game = game("late", None);

    let response = bot.get_move(&game, &5, &board(8, 8, starting_body())).await;

    assert!(response.is_ok());
    assert_eq!(bot.active_games(), 1);
}

#[tokio::test]
async fn test_invalid_body_is_rejected() {
    let bot = Bot::new(Config::seeded(4));
    let game = game("broken", None);
    let body = vec![Coord::new(1, 3), Coord::new(3, 3)];

    let result = bot.get_move(&game, &0, &board(8, 8, body)).await;

    assert!(matches!(result, Err(EngineError::InvalidBody(_))));
}

#[tokio::test]
async fn test_oversized_board_is_rejected() {
    let bot = Bot::new(Config::seeded(4));
    let game = game("huge", None);
    let huge = board(50_000, 50_000, starting_body());

    assert!(matches!(
        bot.start(&game, &huge),
        Err(EngineError::GridTooLarge { .. })
    ));
    assert!(matches!(
        bot.get_move(&game, &0, &huge).await,
        Err(EngineError::GridTooLarge { .. })
    ));
    assert_eq!(bot.active_games(), 0);
}

#[tokio::test]
async fn test_least_recent_session_is_evicted_at_cap() {
    let mut config = Config::seeded(6);
    config.sessions.max_active = 2;
    let bot = Bot::new(config);
    let b = board(8, 8, starting_body());

    bot.start(&game("first", None), &b).unwrap();
    thread::sleep(Duration::from_millis(5));
    bot.start(&game("second", None), &b).unwrap();
    thread::sleep(Duration::from_millis(5));
    // a move refreshes the first game, leaving the second as the oldest
    bot.get_move(&game("first", None), &1, &b).await.unwrap();
    thread::sleep(Duration::from_millis(5));
    bot.start(&game("third", None), &b).unwrap();

    assert_eq!(bot.active_games(), 2);
    assert!(bot.has_game("first"));
    assert!(!bot.has_game("second"));
    assert!(bot.has_game("third"));
}

#[test]
fn test_idle_sessions_are_dropped() {
    let mut config = Config::seeded(6);
    config.sessions.idle_timeout_secs = 0;
    let bot = Bot::new(config);
    let b = board(8, 8, starting_body());

    bot.start(&game("stale", None), &b).unwrap();
    bot.start(&game("fresh", None), &b).unwrap();

    assert_eq!(bot.active_games(), 1);
    assert!(bot.has_game("fresh"));
}

#[tokio::test]
async fn test_concurrent_first_moves_share_a_session() {
    let bot = Bot::new(Config::seeded(9));
    let g = game("racy", None);
    let b = board(8, 8, starting_body());

    let (a, c) = tokio::join!(bot.get_move(&g, &0, &b), bot.get_move(&g, &0, &b));

    assert!(a.is_ok() && c.is_ok());
    assert_eq!(bot.active_games(), 1);
}

#[test]
fn test_game_state_parses_from_json() {
    let raw = r#"{
        "game": { "id": "abc", "mode": "cycle_following" },
        "turn": 3,
        "board": {
            "rows": 6,
            "cols": 6,
            "food": { "row": 4, "col": 4 },
            "snake": [
                { "row": 1, "col": 3 },
                { "row": 1, "col": 2 },
                { "row": 1, "col": 1 }
            ],
            "direction": "right"
        }
    }"#;
    let state: GameState = serde_json::from_str(raw).unwrap();
    assert_eq!(state.game.mode, Some(PolicyMode::CycleFollowing));
    assert_eq!(state.board.snake.len(), 3);
    assert!(state.board.walls.is_empty());
}
