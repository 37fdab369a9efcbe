//! Limbwright - Entry Point
//!
//! Demo driver for the anatomy subsystem: assembles a humanoid from the
//! template registry, grafts extra hands onto it until the limb ceiling
//! refuses one, and shows the typed failures a caller is expected to
//! turn into user-facing text.

use limbwright::anatomy::attach::{self, AttachError};
use limbwright::anatomy::graph::BodyGraph;
use limbwright::anatomy::resolver::AttachmentResolver;
use limbwright::anatomy::templates::TemplateRegistry;
use limbwright::core::error::{AnatomyError, Result};
use limbwright::core::types::{EntityId, Vec2};
use limbwright::ecs::world::World;

use rand::Rng;
use std::path::Path;

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("limbwright=debug")
        .init();

    tracing::info!("Limbwright starting...");

    let mut registry = TemplateRegistry::builtin_humanoid();
    load_data(&mut registry);

    let mut world = World::new();
    let resolver = AttachmentResolver::new(&registry);

    let subject = resolver.build_body(&mut world, "Subject", "humanoid", Vec2::new(0.0, 0.0))?;
    println!("Assembled {}", world.describe(subject));
    print_body(&world, subject);

    // Graft spare hands; each template lands in its own derived slot.
    for template in ["human_left_hand", "human_right_hand"] {
        match resolver.graft(&mut world, subject, template) {
            Ok(graft) => println!(
                "Added hand to {} (slot '{}' on {})",
                world.describe(subject),
                graft.slot_id,
                world.describe(graft.anchor)
            ),
            Err(err) => println!("{}", refusal_text(err)),
        }
        world.tick();
    }

    // Pad the subject to six hands, then watch the ceiling refuse more.
    if let Some(hand) = registry.get("human_left_hand").cloned() {
        let torso = BodyGraph::new(&world, subject)?.root();
        for index in 0..2 {
            let spare = world.spawn_part(&hand, Vec2::new(0.0, 0.0));
            attach::attach(&mut world, subject, torso, &format!("spare_{}", index), spare)?;
            world.tick();
        }
    }
    match resolver.graft(&mut world, subject, "human_right_hand") {
        Ok(_) => println!("Added yet another hand"),
        Err(err) => println!("{}", refusal_text(err)),
    }

    // Grafting onto an entity without a part tree is a routine refusal.
    let ghost = world.spawn_body("Ghost", Vec2::new(5.0, 5.0));
    if let Err(err) = resolver.graft(&mut world, ghost, "human_left_hand") {
        println!("{}", refusal_text(err));
    }

    print_body(&world, subject);
    tracing::info!("Limbwright done after {} ticks", world.current_tick);
    Ok(())
}

/// Load shipped templates and plans when running from the repo root
fn load_data(registry: &mut TemplateRegistry) {
    let data = Path::new("data");
    if !data.exists() {
        tracing::warn!("No data directory found - using built-in templates only");
        return;
    }
    for (dir, what) in [("parts", "part templates"), ("plans", "body plans")] {
        let path = data.join(dir);
        if !path.exists() {
            continue;
        }
        let loaded = if dir == "parts" {
            registry.load_parts_dir(&path)
        } else {
            registry.load_plans_dir(&path)
        };
        match loaded {
            Ok(ids) => tracing::info!("Loaded {} {} from {}", ids.len(), what, path.display()),
            Err(err) => tracing::warn!("Failed to load {}: {}", what, err),
        }
    }
}

/// Turn a typed refusal into the text a player would see
fn refusal_text(err: AnatomyError) -> String {
    match err {
        AnatomyError::Attach(AttachError::NoBody(_)) => {
            let scream = rand::thread_rng().gen_bool(0.2);
            format!(
                "You have no body{}",
                if scream { " and you must scream." } else { "." }
            )
        }
        AnatomyError::Attach(AttachError::LimitExceeded { .. }) => {
            "You have enough hands already".to_string()
        }
        AnatomyError::Attach(AttachError::SlotOccupied { slot_id, .. }) => {
            format!("Couldn't create a slot with id {}", slot_id)
        }
        other => format!("Refused: {}", other),
    }
}

fn print_body(world: &World, body: EntityId) {
    let Ok(graph) = BodyGraph::new(world, body) else {
        println!("  (no part tree)");
        return;
    };
    println!("Body of {}:", world.describe(body));
    for part in graph.parts() {
        if let Some(component) = world.part(part) {
            println!("  {:<6} {}", component.kind.to_string(), world.describe(part));
        }
    }
}
