//! Avoid Obstacles headless driver
//!
//! Runs the gameplay core at a fixed frame step with a simple autopilot in
//! place of touch input, and prints a summary per session. Useful for
//! balancing difficulty tables without a renderer.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;
    use std::path::PathBuf;

    use clap::Parser;
    use glam::Vec2;

    use avoid_obstacles::sim::{EntityKind, GameEvent, GameState, GameStateMachine};
    use avoid_obstacles::{EngineConfig, MemoryStore};

    /// Headless autopilot for the avoidance game core
    #[derive(Parser, Debug)]
    #[command(author, version, about, long_about = None)]
    pub struct Args {
        /// JSON engine config (defaults are used when omitted)
        #[arg(short, long)]
        pub config: Option<PathBuf>,

        /// Override the spawn seed
        #[arg(short, long)]
        pub seed: Option<u64>,

        /// Sessions to play back to back
        #[arg(short = 'n', long, default_value_t = 5)]
        pub sessions: u32,

        /// Simulated frames per second
        #[arg(long, default_value_t = 60)]
        pub fps: u32,

        /// Cut a session off after this many seconds
        #[arg(long, default_value_t = 120.0)]
        pub max_seconds: f32,

        /// Log every gameplay event
        #[arg(short, long)]
        pub verbose: bool,
    }

    /// How far above the player the autopilot looks for threats
    const LOOK_AHEAD: f32 = 260.0;
    /// Candidate x positions sampled across the field
    const LANES: usize = 24;

    pub fn run(args: Args) -> Result<(), Box<dyn Error>> {
        let mut config = match &args.config {
            Some(path) => EngineConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => EngineConfig::default(),
        };
        if let Some(seed) = args.seed {
            config = config.with_seed(seed);
        }

        let mut game = GameStateMachine::new(config, Box::new(MemoryStore::new()))?;
        let dt = 1.0 / args.fps.max(1) as f32;

        for session in 1..=args.sessions {
            game.start();
            while game.state() == GameState::Playing && game.survival_time() < args.max_seconds {
                let target = steer(&game);
                game.move_player_to(target);
                game.tick(dt);
                report(game.drain_events(), args.verbose);
            }
            if game.state() == GameState::Playing {
                log::info!("Session {} hit the time limit", session);
                game.end();
                report(game.drain_events(), args.verbose);
            }

            let summary = game.summary();
            println!(
                "session {:>3}: score {:>6}  time {:>6.1}s  level {}  dodges {:>4}  collisions {}  power-ups {}  adaptive x{:.2}",
                session,
                summary.score,
                summary.survival_time,
                summary.difficulty_level,
                summary.dodges,
                summary.collisions,
                summary.power_ups_collected,
                game.adaptive().multiplier()
            );
            if let Some(rank) = summary.high_score_rank {
                println!("             high score #{}", rank);
            }
        }

        let stats = game.stats();
        println!(
            "{} games, best score {}, average {:.1}, longest {:.1}s, best combo {}",
            stats.games_played,
            stats.best_score,
            stats.average_score(),
            stats.best_survival_time,
            game.combo().best_combo()
        );
        for (i, entry) in game.high_scores().entries().iter().enumerate() {
            println!(
                "{:>2}. {:>6}  level {}  {:.1}s  (game {})",
                i + 1,
                entry.score,
                entry.level,
                entry.survival_time,
                entry.game
            );
        }
        Ok(())
    }

    /// Pick the lane farthest from incoming obstacles, drifting to power-ups when clear
    fn steer(game: &GameStateMachine) -> Vec2 {
        let player = game.player();
        let field = game.field();
        let half = player.size.x / 2.0;
        let (left, right) = (field.min.x + half + 2.0, field.max.x - half - 2.0);

        let threats: Vec<(f32, f32)> = game
            .obstacles()
            .active()
            .filter(|e| e.position.y > player.position.y && e.position.y - player.position.y < LOOK_AHEAD)
            .map(|e| (e.position.x, e.size.x / 2.0 + half))
            .collect();

        if threats.is_empty() {
            let pickup = game
                .power_ups()
                .active()
                .filter(|e| matches!(e.kind, EntityKind::PowerUp(_)))
                .min_by(|a, b| a.position.y.total_cmp(&b.position.y));
            return match pickup {
                Some(p) => Vec2::new(p.position.x.clamp(left, right), player.position.y),
                None => player.position,
            };
        }

        let clearance = |x: f32| {
            threats
                .iter()
                .map(|(tx, reach)| (x - tx).abs() - reach)
                .fold(f32::INFINITY, f32::min)
        };
        let best = (0..=LANES)
            .map(|i| left + (right - left) * i as f32 / LANES as f32)
            .max_by(|a, b| {
                let score = |x: f32| clearance(x) - (x - player.position.x).abs() * 0.05;
                score(*a).total_cmp(&score(*b))
            })
            .unwrap_or(player.position.x);

        Vec2::new(best, player.position.y)
    }

    fn report(events: Vec<GameEvent>, verbose: bool) {
        for event in events {
            match event {
                GameEvent::DifficultyIncreased { level } => log::info!("Level {}", level),
                GameEvent::ComboMilestone { combo } => log::info!("Combo x{}", combo),
                GameEvent::PowerUpCollected { kind } => log::info!("Picked up {}", kind.as_str()),
                GameEvent::ShieldAbsorbed { .. } => log::info!("Shield absorbed a hit"),
                other if verbose => log::debug!("{:?}", other),
                _ => {}
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use clap::Parser;

    let args = native::Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::info!("Avoid Obstacles (headless) starting...");

    native::run(args)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm host drives the engine through the library, this is just to satisfy the compiler
}
