//! Binary entrypoint for the Mystery Mansion CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml` and seed the mansion into storage
//! - `play [--player <id>]` - play (or resume) a case at the text prompt
//! - `path <from> <to>` - print the shortest route between two rooms
//! - `status` - print a brief summary of the stored world and saves
//!
//! See the library crate docs for module-level details: `mystery_mansion::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use mystery_mansion::config::Config;
use mystery_mansion::game::{
    load_world_from_json, GameCommand, GameDatabase, GameStoreBuilder, MysteryGame, RoomGraph,
};

#[derive(Parser)]
#[command(name = "mystery-mansion")]
#[command(about = "A text murder mystery with a persistent mansion")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default configuration and seed the mansion
    Init,
    /// Play the mystery at the prompt
    Play {
        /// Player id (defaults to game.default_player_id)
        #[arg(short, long)]
        player: Option<u32>,
    },
    /// Show the shortest route between two rooms
    Path {
        /// Starting room name
        from: String,
        /// Destination room name
        to: String,
    },
    /// Show world and save statistics
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init writes the config itself, so only the other commands read it up front.
    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Init => {
            Config::create_default(&cli.config).await?;
            let config = Config::load(&cli.config).await?;
            info!("Created default configuration at {}", cli.config);

            let db = open_database(&config).await?;
            let world = db.load_world().await?;
            println!("Mystery Mansion initialized.");
            println!("Configuration: {}", cli.config);
            println!("Database: {}", config.storage.db_path().display());
            println!(
                "Rooms: {}  Passages: {}  Clues needed: {}",
                world.rooms.len(),
                world.connections.len(),
                world.required_clues.len()
            );
        }
        Commands::Play { player } => {
            let config = load_config(pre_config, &cli.config)?;
            let player_id = player.unwrap_or(config.game.default_player_id);
            let db = open_database(&config).await?;
            play(&config, &db, player_id).await?;
        }
        Commands::Path { from, to } => {
            let config = load_config(pre_config, &cli.config)?;
            let db = open_database(&config).await?;
            let world = db.load_world().await?;

            let lookup = |name: &str| {
                world
                    .rooms
                    .iter()
                    .find(|room| room.name.eq_ignore_ascii_case(name.trim()))
                    .map(|room| room.id)
                    .ok_or_else(|| anyhow!("Unknown room: {}", name))
            };
            let from_id = lookup(&from)?;
            let to_id = lookup(&to)?;

            let mut graph = RoomGraph::new();
            graph.preload_connections(db.list_connections()).await?;
            let path = graph.find_shortest_path(from_id, to_id);

            if path.is_empty() {
                println!("No path from {} to {}.", from, to);
            } else {
                let names: Vec<&str> = path
                    .iter()
                    .filter_map(|id| world.room(*id).map(|room| room.name.as_str()))
                    .collect();
                println!("{} ({} moves)", names.join(" -> "), path.len() - 1);
            }
        }
        Commands::Status => {
            let config = load_config(pre_config, &cli.config)?;
            let db = open_database(&config).await?;
            let world = db.load_world().await?;
            let players = db.list_player_ids().await?;

            println!("{}", config.game.title);
            println!("Database: {}", config.storage.db_path().display());
            println!("Rooms: {}", world.rooms.len());
            println!("Passages: {}", world.connections.len());
            println!("Clues needed: {}", world.required_clues.len());
            if players.is_empty() {
                println!("Saved games: none");
            } else {
                let ids: Vec<String> = players.iter().map(|id| id.to_string()).collect();
                println!("Saved games: {} (players {})", players.len(), ids.join(", "));
            }
        }
    }

    Ok(())
}

fn load_config(pre_config: Option<Config>, path: &str) -> Result<Config> {
    pre_config.ok_or_else(|| {
        anyhow!(
            "Could not load {}. Run `mystery-mansion init` to create one.",
            path
        )
    })
}

/// Open the configured store, seeding it from the seed file (or the built-in
/// mansion) when empty.
async fn open_database(config: &Config) -> Result<GameDatabase> {
    let mut builder = GameStoreBuilder::new(config.storage.db_path());
    if let Some(seed_file) = &config.game.seed_file {
        let world = load_world_from_json(seed_file)?;
        info!("Using world seed from {}", seed_file);
        builder = builder.with_world(world);
    }
    Ok(GameDatabase::from_builder(builder).await?)
}

async fn play(config: &Config, db: &GameDatabase, player_id: u32) -> Result<()> {
    let mut game = MysteryGame::load(db, player_id).await?;
    if game.game_started {
        game.look();
    } else {
        game.start_game();
    }

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}\n", config.game.title);
    println!("{}", game.feedback());

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            // EOF behaves like QUIT.
            if config.game.autosave_on_quit {
                save_reporting(&game, db).await;
            }
            break;
        };

        match game.process_command(&line) {
            GameCommand::Save => {
                if save_reporting(&game, db).await {
                    println!("Game saved.");
                }
            }
            GameCommand::Quit => {
                if config.game.autosave_on_quit {
                    save_reporting(&game, db).await;
                }
                println!("{}", game.feedback());
                break;
            }
            GameCommand::Restart => {
                println!("{}", game.feedback());
                game.start_game();
                println!("{}", game.feedback());
            }
            _ => println!("{}", game.feedback()),
        }
    }

    Ok(())
}

/// Save progress, reporting a failure to the player without ending the game.
async fn save_reporting(game: &MysteryGame, db: &GameDatabase) -> bool {
    match game.save(db).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Save failed for player {}: {}", game.state.player_id, e);
            println!("Could not save your progress: {}", e);
            false
        }
    }
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .map(|cfg| cfg.logging.level_filter())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Only echo to the console when attached to a terminal; the prompt owns stdout otherwise.
        let is_tty = atty::is(atty::Stream::Stderr);

        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());

            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }

            if is_tty && record.level() <= log::Level::Warn {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}
