use std::{fs, process::Command};

use isoworld_core::TerrainKind;
use isoworld_world::{query, World};

fn run_isoworld(args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_isoworld"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch isoworld binary");
    assert!(
        output.status.success(),
        "isoworld exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is utf-8")
}

#[test]
fn map_output_is_framed_by_border_glyphs() {
    let stdout = run_isoworld(&[
        "--width", "8", "--height", "8", "--seed", "1", "--ticks", "1", "--settlers", "0",
    ]);
    let rows: Vec<&str> = stdout.lines().take(8).collect();

    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0], "########");
    assert_eq!(rows[7], "########");
    for row in &rows[1..7] {
        assert_eq!(row.chars().count(), 8, "row {row:?}");
        assert!(row.starts_with('#') && row.ends_with('#'), "row {row:?}");
    }
    assert!(stdout.contains("seed 1"));
}

#[test]
fn written_snapshot_restores_the_same_world() {
    let path = std::env::temp_dir().join(format!("isoworld-snapshot-{}.json", std::process::id()));
    let path_arg = path.to_str().expect("temp path is utf-8");

    let _ = run_isoworld(&[
        "--width", "12", "--height", "10", "--seed", "7", "--ticks", "3", "--snapshot", path_arg,
    ]);
    let json = fs::read_to_string(&path).expect("snapshot written");
    let _ = fs::remove_file(&path);

    let world = World::from_json(&json).expect("snapshot decodes");
    let stats = query::stats(&world);
    assert_eq!((stats.width, stats.height), (12, 10));
    assert_eq!(stats.tick_count, 3);
    assert_eq!(stats.terrain.count(TerrainKind::Border), 2 * 12 + 2 * 10 - 4);
    assert_eq!(query::recipe(&world).map(|recipe| recipe.seed), Some(7));
}
