// Game sessions behind the HTTP API
//
// One engine per game id. The engine keeps its Hamiltonian cycle across
// turns; every /move replaces the occupancy with the posted board. Sessions
// idle for longer than the configured timeout are dropped, and the least
// recently used one is evicted when the cap is reached.

use log::{error, info, warn};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Config, SessionConfig};
use crate::engine::Engine;
use crate::error::EngineError;
use crate::types::{Board, Direction, Game};

/// A game's engine and the time of its latest request
struct Session {
    engine: Arc<Mutex<Engine>>,
    last_seen: Instant,
}

impl Session {
    fn new(engine: Engine, now: Instant) -> Self {
        Session {
            engine: Arc::new(Mutex::new(engine)),
            last_seen: now,
        }
    }
}

/// Drops idle sessions, then the least recently used ones until a new
/// session fits under `limits.max_active`
fn make_room(sessions: &mut HashMap<String, Session>, limits: &SessionConfig, now: Instant) {
    let idle_timeout = Duration::from_secs(limits.idle_timeout_secs);
    sessions.retain(|id, session| {
        let keep = now.saturating_duration_since(session.last_seen) < idle_timeout;
        if !keep {
            info!("Game {}: session idle, dropping", id);
        }
        keep
    });

    while sessions.len() >= limits.max_active {
        let Some(oldest) = sessions
            .iter()
            .min_by_key(|(_, session)| session.last_seen)
            .map(|(id, _)| id.clone())
        else {
            break;
        };
        warn!("Game {}: evicted to stay under {} sessions", oldest, limits.max_active);
        sessions.remove(&oldest);
    }
}

/// Snake bot with OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
pub struct Bot {
    config: Config,
    sessions: Mutex<HashMap<String, Session>>,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        Bot {
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        let appearance = &self.config.appearance;
        json!({
            "apiversion": "1",
            "author": appearance.author,
            "color": appearance.color,
            "head": appearance.head,
            "tail": appearance.tail,
            "version": env!("CARGO_PKG_VERSION"),
        })
    }

    pub fn active_games(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn has_game(&self, id: &str) -> bool {
        self.sessions.lock().contains_key(id)
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    ///
    /// Creates the game's engine; the game may override the configured mode.
    pub fn start(&self, game: &Game, board: &Board) -> Result<(), EngineError> {
        info!("GAME START {}", game.id);
        let engine = self.create_engine(game, board)?;
        let now = Instant::now();

        let mut sessions = self.sessions.lock();
        if !sessions.contains_key(&game.id) {
            make_room(&mut sessions, &self.config.sessions, now);
        }
        sessions.insert(game.id.clone(), Session::new(engine, now));
        Ok(())
    }

    fn create_engine(&self, game: &Game, board: &Board) -> Result<Engine, EngineError> {
        let mut config = self.config.clone();
        if let Some(mode) = game.mode {
            config.engine.mode = mode;
        }
        Engine::from_board(board, &config).inspect_err(|e| {
            warn!("Game {}: cannot create engine: {}", game.id, e);
        })
    }

    /// Session for `game`, created on the fly if /start was never seen
    ///
    /// Lookup and creation happen under one lock, so concurrent first moves
    /// for a game share a single engine.
    fn session(&self, game: &Game, board: &Board) -> Result<Arc<Mutex<Engine>>, EngineError> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock();
        if !sessions.contains_key(&game.id) {
            make_room(&mut sessions, &self.config.sessions, now);
        }

        match sessions.entry(game.id.clone()) {
            Entry::Occupied(mut entry) => {
                let session = entry.get_mut();
                session.last_seen = now;
                Ok(Arc::clone(&session.engine))
            }
            Entry::Vacant(entry) => {
                warn!("Game {}: move without start, creating session", game.id);
                let session = entry.insert(Session::new(self.create_engine(game, board)?, now));
                Ok(Arc::clone(&session.engine))
            }
        }
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, game: &Game) {
        info!("GAME OVER {}", game.id);

        let Some(session) = self.sessions.lock().remove(&game.id) else {
            return;
        };
        if self.config.profiling.enabled {
            let engine = session.engine.lock();
            if self.config.profiling.log_to_stderr {
                engine.profiler().print_report();
            } else {
                info!("Game {} search profile: {}", game.id, json!(engine.stats()));
            }
        }
    }

    /// Computes and returns the next move
    /// Corresponds to POST /move endpoint
    ///
    /// The board is synchronised into the game's engine and the decision
    /// runs on tokio's blocking pool, since the searches are CPU-bound.
    ///
    /// # Arguments
    /// * `game` - Current game metadata
    /// * `turn` - Current turn number
    /// * `board` - Current board state
    ///
    /// # Returns
    /// * `Result<Value, EngineError>` - JSON response containing the chosen move direction
    pub async fn get_move(&self, game: &Game, turn: &i32, board: &Board) -> Result<Value, EngineError> {
        let start_time = Instant::now();
        let engine = self.session(game, board)?;
        let board = board.clone();

        let decision = tokio::task::spawn_blocking(move || {
            let mut engine = engine.lock();
            engine.sync_board(&board)?;
            Ok::<_, EngineError>((engine.compute_next_direction(), engine.snake().direction()))
        })
        .await;

        let chosen = match decision {
            Ok(Ok((Some(dir), _))) => dir,
            Ok(Ok((None, heading))) => {
                // nothing to chase: keep going, or use the fallback
                heading.unwrap_or(self.config.policy.fallback_direction)
            }
            Ok(Err(e)) => return Err(e),
            Err(e) => {
                error!("Turn {}: decision task failed: {}", turn, e);
                self.config.policy.fallback_direction
            }
        };

        info!(
            "Turn {}: {} ({}ms)",
            turn,
            chosen.as_str(),
            start_time.elapsed().as_millis()
        );
        Ok(Self::move_response(chosen))
    }

    fn move_response(dir: Direction) -> Value {
        json!({ "move": dir.as_str() })
    }
}
