//! Arcade Lab entry point
//!
//! Usage:
//!   arcade-lab snake [--debug] [--seed N]
//!   arcade-lab projectile [--blueprint NAME] [--blueprint-dir DIR] [--grid] [--fps] [--debug]
//!
//! Logs go to stderr (`RUST_LOG=debug arcade-lab snake 2>log.txt`).

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use anyhow::{Context, Result};
    use clap::{Parser, Subcommand};

    use arcade_lab::Settings;
    use arcade_lab::games::{ArtilleryGame, ArtilleryOptions, SnakeGame};
    use arcade_lab::platform::terminal::TerminalPlatform;
    use arcade_lab::sim::Blueprint;

    #[derive(Parser)]
    #[command(name = "arcade-lab", version)]
    #[command(about = "Fixed-step arcade prototypes in the terminal")]
    struct Args {
        /// JSON settings file; missing keys keep their defaults
        #[arg(long, global = true)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand)]
    enum Command {
        /// Grid snake (arrow keys, q quits)
        Snake {
            /// Show head, length and apple position
            #[arg(long)]
            debug: bool,
            /// Food placement seed
            #[arg(long)]
            seed: Option<u64>,
        },
        /// Turret and ballistic projectiles (left/right aim, space fires, q quits)
        Projectile {
            /// Blueprint name
            #[arg(long, default_value = "blocks")]
            blueprint: String,
            /// Load `<DIR>/<NAME>.json` instead of a builtin map
            #[arg(long)]
            blueprint_dir: Option<PathBuf>,
            /// Show the latest projectile
            #[arg(long)]
            debug: bool,
            /// Draw block grid lines
            #[arg(long)]
            grid: bool,
            /// Show frames per second
            #[arg(long)]
            fps: bool,
        },
    }

    fn time_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }

    pub fn main() -> Result<()> {
        env_logger::init();
        let args = Args::parse();

        let settings = Settings::load_or_default(args.config.as_deref())
            .context("failed to load settings")?;

        match args.command {
            Command::Snake { debug, seed } => {
                let seed = seed.or(settings.snake.seed).unwrap_or_else(time_seed);
                let mut game = SnakeGame::new(&settings.snake, seed, debug);

                let mut platform = TerminalPlatform::new().context("failed to set up terminal")?;
                let stats = arcade_lab::run(&mut platform, &mut game, &settings.looping)?;
                drop(platform);

                let world = game.world();
                println!(
                    "Snake length {} after {} ticks ({} apples)",
                    world.snake.len(),
                    stats.ticks,
                    world.apples_eaten
                );
            }
            Command::Projectile {
                blueprint,
                blueprint_dir,
                debug,
                grid,
                fps,
            } => {
                // Bad maps fail before the terminal is touched
                let map = match &blueprint_dir {
                    Some(dir) => Blueprint::load(dir, &blueprint),
                    None => Blueprint::builtin(&blueprint),
                }
                .with_context(|| format!("failed to load blueprint {blueprint:?}"))?;

                let options = ArtilleryOptions { debug, grid, fps };
                let mut game = ArtilleryGame::new(map, &settings, options);

                let mut platform = TerminalPlatform::new().context("failed to set up terminal")?;
                let stats = arcade_lab::run(&mut platform, &mut game, &settings.looping)?;
                drop(platform);

                let pm = game.projectiles();
                println!(
                    "Fired {} projectiles, {} exploded, over {} ticks",
                    pm.fired, pm.exploded, stats.ticks
                );
            }
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The terminal front-end is native only
}
