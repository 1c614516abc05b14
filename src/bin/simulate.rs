//! Headless Game Simulator
//!
//! Plays a single-snake game against the engine and reports the outcome
//! together with the search profile. Useful for comparing the sequential and
//! parallel search strategies and the two decision policies.
//!
//! Usage:
//!   cargo run --release --bin simulate -- [options]
//!
//! The snake starts at (1,3),(1,2),(1,1) heading right. The first food sits
//! in the far interior corner; later food is placed at random from the
//! seeded rng.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::process;
use std::time::Instant;

use snake_autopilot::config::Config;
use snake_autopilot::engine::Engine;
use snake_autopilot::grid::Grid;
use snake_autopilot::snake::{MoveOutcome, Snake};
use snake_autopilot::types::{Coord, Direction, PolicyMode, SearchStrategy};

struct Options {
    rows: i32,
    cols: i32,
    cycle: bool,
    parallel: bool,
    seed: u64,
    until_length: Option<usize>,
    max_steps: usize,
    config_path: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            rows: 22,
            cols: 22,
            cycle: false,
            parallel: false,
            seed: 42,
            until_length: None,
            max_steps: 1_000_000,
            config_path: None,
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --rows <N>          Rows including the wall border (default 22)");
    eprintln!("  --cols <N>          Columns including the wall border (default 22)");
    eprintln!("  --cycle             Follow a Hamiltonian cycle instead of graph search");
    eprintln!("  --parallel          Use level-synchronous parallel BFS");
    eprintln!("  --seed <N>          Seed for searches and food placement (default 42)");
    eprintln!("  --until-length <N>  Stop once the snake reaches this length");
    eprintln!("  --max-steps <N>     Give up after this many moves (default 1000000)");
    eprintln!("  --config <PATH>     Read policy constants from a TOML file");
    eprintln!();
    eprintln!("Example: {} --rows 12 --cols 12 --cycle --seed 7", program);
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("{} needs a value", flag))?;
    value
        .parse()
        .map_err(|_| format!("invalid value for {}: {}", flag, value))
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--rows" => options.rows = parse_value(arg, iter.next())?,
            "--cols" => options.cols = parse_value(arg, iter.next())?,
            "--cycle" => options.cycle = true,
            "--parallel" => options.parallel = true,
            "--seed" => options.seed = parse_value(arg, iter.next())?,
            "--until-length" => options.until_length = Some(parse_value(arg, iter.next())?),
            "--max-steps" => options.max_steps = parse_value(arg, iter.next())?,
            "--config" => options.config_path = Some(parse_value(arg, iter.next())?),
            "--help" | "-h" => return Err(String::new()),
            other => return Err(format!("unknown option: {}", other)),
        }
    }
    if options.rows < 6 || options.cols < 6 {
        return Err("the board needs at least 6 rows and 6 columns".to_string());
    }
    Ok(options)
}

fn build_config(options: &Options) -> Result<Config, String> {
    let mut config = match &options.config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::default_hardcoded(),
    };
    config.engine.seed = Some(options.seed);
    if options.cycle {
        config.engine.mode = PolicyMode::CycleFollowing;
    }
    if options.parallel {
        config.engine.strategy = SearchStrategy::Parallel;
    }
    Ok(config)
}

fn build_engine(options: &Options, config: &Config) -> Result<Engine, String> {
    let mut grid = Grid::new(options.rows, options.cols).map_err(|e| e.to_string())?;
    let snake = Snake::from_body(
        &mut grid,
        &[Coord::new(1, 3), Coord::new(1, 2), Coord::new(1, 1)],
        Some(Direction::Right),
    )
    .map_err(|e| e.to_string())?;
    grid.place_food(Coord::new(options.rows - 2, options.cols - 2))
        .map_err(|e| e.to_string())?;
    Engine::new(grid, snake, config).map_err(|e| e.to_string())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "warn");
    }
    env_logger::init();

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("Error: {}", message);
            }
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let config = match build_config(&options) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let mut engine = match build_engine(&options, &config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let capacity = engine.grid().interior_size();
    let target = options.until_length.unwrap_or(capacity).min(capacity);
    let mut food_rng = StdRng::seed_from_u64(options.seed);

    println!("============================================================");
    println!(
        "Simulating {}x{} board ({} cells), {:?}, {:?} search",
        options.rows,
        options.cols,
        capacity,
        engine.mode(),
        config.engine.strategy
    );
    println!("============================================================");

    let started = Instant::now();
    let mut steps = 0;
    let mut verdict = "step limit reached";
    while steps < options.max_steps {
        if engine.snake().len() >= target {
            verdict = "target length reached";
            break;
        }
        let Some((_, outcome)) = engine.tick() else {
            verdict = "no decision available";
            break;
        };
        steps += 1;
        match outcome {
            MoveOutcome::Died => {
                verdict = "snake died";
                break;
            }
            MoveOutcome::Ate => {
                if engine.snake().len() < capacity
                    && engine.grid_mut().place_random_food(&mut food_rng).is_none()
                {
                    verdict = "no room for food";
                    break;
                }
            }
            MoveOutcome::Moved => {}
        }
    }

    let elapsed = started.elapsed();
    println!();
    println!("Outcome:      {}", verdict);
    println!("Final length: {} / {}", engine.snake().len(), capacity);
    println!("Steps:        {}", steps);
    println!("Wall time:    {:.3}s", elapsed.as_secs_f64());
    if steps > 0 {
        println!(
            "Per step:     {:.2}µs",
            elapsed.as_secs_f64() * 1_000_000.0 / steps as f64
        );
    }

    engine.profiler().print_report();

    if verdict == "snake died" {
        process::exit(2);
    }
}
