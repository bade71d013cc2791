use isoworld_core::{CellCoord, TerrainKind};
use isoworld_world::{self as world, query, GenerationConfig, NoiseField, World};

fn generated(width: u32, height: u32, seed: u64, config: &GenerationConfig) -> World {
    let mut world = World::new(width, height);
    world.generate(seed, config).expect("valid configuration");
    world
}

fn terrain_matrix(world: &World) -> Vec<TerrainKind> {
    query::grid(world).tiles().iter().map(|tile| tile.terrain()).collect()
}

#[test]
fn identical_inputs_generate_identical_terrain() {
    let config = GenerationConfig::default();
    for seed in [0, 1, 42, 12_256_897, u64::MAX] {
        let first = generated(40, 30, seed, &config);
        let second = generated(40, 30, seed, &config);
        assert_eq!(
            terrain_matrix(&first),
            terrain_matrix(&second),
            "seed {seed} diverged"
        );
    }
}

#[test]
fn regeneration_on_the_same_world_is_stable() {
    let config = GenerationConfig::default();
    let mut world = generated(24, 24, 5, &config);
    let before = terrain_matrix(&world);
    let _ = world.set_terrain(CellCoord::new(4, 4), TerrainKind::Water);
    world.generate(5, &config).expect("valid configuration");
    assert_eq!(terrain_matrix(&world), before);
}

#[test]
fn outer_ring_is_always_border() {
    let configs = [
        GenerationConfig::default(),
        GenerationConfig {
            water_level: 0.0,
            sand_level: 0.0,
            grass_level: 1.0,
            rock_level: 1.0,
            tree_chance: 1.0,
            ..GenerationConfig::default()
        },
        GenerationConfig {
            octaves: 1,
            scale: 3.7,
            water_level: 1.0,
            sand_level: 1.0,
            grass_level: 1.0,
            rock_level: 1.0,
            ..GenerationConfig::default()
        },
    ];

    for config in &configs {
        for (width, height) in [(2, 2), (2, 7), (9, 3), (16, 11)] {
            let world = generated(width, height, 77, config);
            for tile in query::grid(&world).tiles() {
                let on_ring =
                    tile.x() == 0 || tile.y() == 0 || tile.x() == width - 1 || tile.y() == height - 1;
                if on_ring {
                    assert_eq!(tile.terrain(), TerrainKind::Border, "{}", tile.cell());
                    assert!(!tile.walkable());
                    assert!(!tile.buildable());
                }
            }
        }
    }
}

#[test]
fn interior_tiles_follow_their_noise_band() {
    let config = GenerationConfig::default();
    let seed = 2_024;
    let world = generated(48, 48, seed, &config);
    let noise = NoiseField::new(seed);

    for tile in query::grid(&world).tiles() {
        let on_ring = tile.x() == 0 || tile.y() == 0 || tile.x() == 47 || tile.y() == 47;
        if on_ring {
            continue;
        }

        let value = noise.fractal(
            f64::from(tile.x()),
            f64::from(tile.y()),
            config.octaves,
            config.persistence,
            config.lacunarity,
            config.scale,
        );
        let allowed: &[TerrainKind] = if value < config.water_level {
            &[TerrainKind::Water]
        } else if value < config.sand_level {
            &[TerrainKind::Sand, TerrainKind::Rock]
        } else if value < config.grass_level {
            &[TerrainKind::Grass, TerrainKind::Tree, TerrainKind::Rock]
        } else {
            &[TerrainKind::Rock]
        };
        assert!(
            allowed.contains(&tile.terrain()),
            "{} with value {value} became {}",
            tile.cell(),
            tile.terrain()
        );
        assert_eq!(tile.walkable(), tile.terrain().walkable());
        assert_eq!(tile.buildable(), tile.terrain().buildable());
    }
}

#[test]
fn known_seed_marks_origin_as_border() {
    let world = generated(5, 5, 12_256_897, &GenerationConfig::default());
    let origin = query::tile(&world, CellCoord::new(0, 0)).expect("origin exists");
    assert_eq!(origin.terrain(), TerrainKind::Border);
}

#[test]
fn generate_command_reports_dimensions() {
    let mut world = World::new(6, 6);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        isoworld_core::Command::GenerateTerrain { seed: 3 },
        &mut events,
    );
    assert!(matches!(
        events.as_slice(),
        [isoworld_core::Event::TerrainGenerated { seed: 3, width: 6, height: 6 }]
    ));
}
