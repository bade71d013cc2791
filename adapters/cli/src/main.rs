#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates, simulates and prints an isometric world.

mod ascii;
mod wander;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use isoworld_core::{
    BuildingKind, CellCoord, CellRect, CellRectSize, Command, ComponentKind, Event, Inventory,
    ItemKind, Position, Sprite, TerrainKind,
};
use isoworld_system_interaction::{Interaction, InteractionInput, TileInfo};
use isoworld_system_render::RenderSystem;
use isoworld_world::{self as world, query, GenerationConfig, SystemDispatcher, World};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{ascii::AsciiCanvas, wander::Wanderer};

const STORAGE_FOOTPRINT: CellRectSize = CellRectSize::new(2, 2);

#[derive(Debug, Parser)]
#[command(name = "isoworld", about = "Generate and simulate an isometric tile world")]
struct Args {
    /// Grid width in tiles.
    #[arg(long, default_value_t = 50)]
    width: u32,
    /// Grid height in tiles.
    #[arg(long, default_value_t = 50)]
    height: u32,
    /// Terrain seed; drawn at random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML file with terrain generation parameters.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// JSON snapshot to resume instead of generating a new world.
    #[arg(long, value_name = "PATH", conflicts_with = "config")]
    restore: Option<PathBuf>,
    /// Number of settlers spawned on a freshly generated world.
    #[arg(long, default_value_t = 3)]
    settlers: usize,
    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 10)]
    ticks: u32,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Writes a JSON snapshot of the final world to this path.
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>,
    /// Increases log verbosity (`-v` debug, `-vv` trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Entry point for the isoworld command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    run(&args)
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(args: &Args) -> Result<()> {
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut world = match &args.restore {
        Some(path) => restore(path)?,
        None => {
            let config = load_config(args.config.as_deref())?;
            let mut world = World::new(args.width, args.height);
            world
                .generate(seed, &config)
                .context("terrain generation parameters are invalid")?;
            populate(&mut world, seed, args.settlers);
            world
        }
    };

    let mut dispatcher = SystemDispatcher::new();
    dispatcher.add_system(Box::new(Wanderer::new(seed, query::grid(&world))));

    let dt = Duration::from_millis(args.tick_ms);
    let mut events = Vec::new();
    for _ in 0..args.ticks {
        world::apply(&mut world, Command::Tick { dt }, &mut events);
        dispatcher.tick(&mut world, dt, &mut events);
    }
    report_simulation(&events);

    gather(&mut world);

    let mut renderer = RenderSystem::new(AsciiCanvas::from_grid(query::grid(&world)));
    let drawn = renderer.render(query::entity_view(&world));
    println!("{}", renderer.into_drawer().render());
    print_stats(&world, drawn);

    if let Some(path) = &args.snapshot {
        let json = world.to_json().context("failed to encode world snapshot")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
        info!(path = %path.display(), "snapshot written");
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GenerationConfig> {
    let Some(path) = path else {
        return Ok(GenerationConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

fn restore(path: &Path) -> Result<World> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    World::from_json(&json).with_context(|| format!("failed to restore snapshot {}", path.display()))
}

/// Spawns settlers on random walkable tiles and a storage shed on the first
/// free footprint.
fn populate(world: &mut World, seed: u64, settlers: usize) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let candidates: Vec<CellCoord> = query::grid(world)
        .tiles()
        .iter()
        .filter(|tile| tile.walkable() && tile.is_empty())
        .map(|tile| tile.cell())
        .collect();

    let mut events = Vec::new();
    for cell in candidates.choose_multiple(&mut rng, settlers) {
        let mut inventory = Inventory::default();
        let _ = inventory.add_item(ItemKind::Bucket, 1);
        let _ = inventory.select_item(ItemKind::Bucket);
        world::apply(
            world,
            Command::SpawnEntity {
                components: vec![
                    Position::from(*cell).into(),
                    Sprite::new("settler").with_offset(0, -8).into(),
                    inventory.into(),
                ],
            },
            &mut events,
        );
    }

    let storage = query::grid(world).tiles().iter().map(|tile| tile.cell()).find(|origin| {
        query::grid(world).is_area_free(CellRect::from_origin_and_size(*origin, STORAGE_FOOTPRINT))
    });
    match storage {
        Some(origin) => world::apply(
            world,
            Command::PlaceBuilding {
                kind: BuildingKind::Storage,
                origin,
                footprint: STORAGE_FOOTPRINT,
            },
            &mut events,
        ),
        None => warn!("no free area for the storage shed"),
    }
}

/// Lets the first settler harvest the tile it stands on.
fn gather(world: &mut World) {
    let settlers = query::entities_with(world, &[ComponentKind::Position, ComponentKind::Inventory]);
    let Some(actor) = settlers.first().copied() else {
        return;
    };
    let Some(entity) = query::entity(world, actor) else {
        return;
    };

    let input = InteractionInput {
        hovered: entity.position().map(|position| position.cell()),
        harvest_action: true,
        held_item: entity.inventory().and_then(Inventory::selected_item),
        ..InteractionInput::default()
    };
    let mut interaction = Interaction::new();
    interaction.set_actor(Some(actor));

    let mut commands = Vec::new();
    interaction.handle(
        input,
        |cell| {
            query::tile(world, cell).map(|tile| TileInfo::new(tile.terrain(), !tile.is_empty()))
        },
        &mut commands,
    );

    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    for event in &events {
        match event {
            Event::Harvested {
                harvester,
                item,
                added,
                ..
            } => info!(%harvester, ?item, added, "harvested"),
            Event::HarvestRejected {
                harvester, reason, ..
            } => info!(%harvester, %reason, "nothing harvested"),
            _ => {}
        }
    }
}

fn report_simulation(events: &[Event]) {
    let moved = events
        .iter()
        .filter(|event| matches!(event, Event::EntityMoved { .. }))
        .count();
    let blocked = events
        .iter()
        .filter(|event| matches!(event, Event::MoveRejected { .. }))
        .count();
    info!(moved, blocked, "simulation finished");
}

fn print_stats(world: &World, drawn: usize) {
    let stats = query::stats(world);
    println!();
    println!(
        "{}x{} tiles, {} entities ({} drawn), {} occupied tiles, tick {}",
        stats.width,
        stats.height,
        stats.entities,
        drawn,
        stats.occupied_tiles,
        stats.tick_count
    );
    if let Some(recipe) = query::recipe(world) {
        println!("seed {}", recipe.seed);
    }
    for kind in TerrainKind::ALL {
        println!("{:>8}: {}", kind.name(), stats.terrain.count(kind));
    }
}
