//! Blockworks - Entry Point
//!
//! Interactive shell for working with schematics outside a live host: spawn
//! named definitions from a schematics directory, move them around, resync
//! and tick the deferred scheduler. Useful for inspecting what a definition
//! materializes into before loading it on a real server.

use blockworks::core::error::Result;
use blockworks::core::EngineConfig;
use blockworks::host::{NullReplication, Scene, Scheduler};
use blockworks::schematic::{
    AllowAll, DirectorySource, EngineContext, Placement, SchematicGraph, SchematicSpawner,
};

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::{self, Write};

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("blockworks=debug")
        .init();

    tracing::info!("Blockworks starting...");

    let schematics_dir =
        std::env::args().nth(1).unwrap_or_else(|| "schematics".to_string());
    let mut spawner = SchematicSpawner::new(DirectorySource::new(&schematics_dir));

    let mut scene = Scene::new();
    let mut scheduler = Scheduler::new();
    let mut replication = NullReplication;
    let mut rng = ChaCha8Rng::from_entropy();
    let config = EngineConfig::default();
    let mut placed: Vec<SchematicGraph> = Vec::new();

    println!("\n=== BLOCKWORKS ===");
    println!("Schematic materialization sandbox (reading from '{schematics_dir}/')");
    println!();
    println!("Commands:");
    println!("  spawn <name> [x y z]  - Spawn a schematic at a position");
    println!("  move <idx> <x y z>    - Move a placed schematic's root");
    println!("  resync <idx>          - Re-resolve and resync a placed schematic");
    println!("  tick                  - Advance the scheduler by 0.25s");
    println!("  list / l              - List placed schematics and scene size");
    println!("  destroy <idx>         - Tear a placed schematic down");
    println!("  quit / q              - Exit");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();

        let mut env = EngineContext {
            scene: &mut scene,
            scheduler: &mut scheduler,
            replication: &mut replication,
            rng: &mut rng,
            config: &config,
        };

        match parts.as_slice() {
            ["quit" | "q"] => break,
            ["tick"] => {
                env.scheduler.advance(0.25, env.scene);
                println!("Advanced to t={:.2}", env.scheduler.now());
            }
            ["list" | "l"] => {
                for (index, graph) in placed.iter().enumerate() {
                    println!("  [{index}] {} ({} objects)", graph.name(), graph.len());
                }
                println!("Scene holds {} objects total", env.scene.len());
            }
            ["spawn", name, rest @ ..] => {
                let placement = Placement {
                    position: parse_vec3(rest).unwrap_or(Vec3::ZERO),
                    ..Placement::default()
                };
                match spawner.spawn(name, None, placement, &mut AllowAll, &mut env) {
                    Ok(graph) => {
                        println!("Spawned '{}' with {} objects", graph.name(), graph.len());
                        placed.push(graph);
                    }
                    Err(err) => println!("Spawn failed: {err}"),
                }
            }
            ["move", index, rest @ ..] => {
                match (index.parse::<usize>().ok(), parse_vec3(rest)) {
                    (Some(index), Some(position)) if index < placed.len() => {
                        let root = placed[index].root();
                        if let Some(object) = env.scene.get_mut(root) {
                            object.local_position = position;
                        }
                        println!("Moved root of '{}'; run resync {index}", placed[index].name());
                    }
                    _ => println!("Usage: move <idx> <x y z>"),
                }
            }
            ["resync", index] => match index.parse::<usize>() {
                Ok(index) if index < placed.len() => {
                    match spawner.update(&placed[index], None, true, &mut env) {
                        Ok(()) => println!("Resynced '{}'", placed[index].name()),
                        Err(err) => println!("Resync failed: {err}"),
                    }
                }
                _ => println!("Usage: resync <idx>"),
            },
            ["destroy", index] => match index.parse::<usize>() {
                Ok(index) if index < placed.len() => {
                    let graph = placed.remove(index);
                    println!("Destroying '{}'", graph.name());
                    spawner.destroy(graph, &mut env);
                }
                _ => println!("Usage: destroy <idx>"),
            },
            [] => {}
            _ => println!("Unknown command"),
        }
    }

    tracing::info!("Blockworks shutting down");
    Ok(())
}

fn parse_vec3(parts: &[&str]) -> Option<Vec3> {
    match parts {
        [x, y, z] => Some(Vec3::new(
            x.parse().ok()?,
            y.parse().ok()?,
            z.parse().ok()?,
        )),
        _ => None,
    }
}
