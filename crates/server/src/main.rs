//! WyldMUD - trigger-driven MUD engine
//!
//! Headless game-loop binary: loads settings and zone fragments, then
//! drives the cooperative tick. Transport to real clients is owned by the
//! surrounding deployment; effects are logged here.

use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn, Level};

use wyldmud_config::{Settings, ZoneDef};
use wyldmud_world::{load_zone, GameEvent, World};

/// Built-in fragment used when the zones directory is empty, so the loop
/// has something to show.
const DEMO_ZONE: &str = r#"
id = "old_town"
name = "Old Town"

[[rooms]]
id = "square"
name = "Town Square"

[[characters]]
id = "guard"
name = "town guard"
pronouns = "she"
room = "square"

[[characters.triggers]]
id = "greet"
type = "catch_say"
script = "sayto %S% Well met, %s%."

[[characters.triggers.criteria]]
subject = "%*%"
operator = "contains"
predicate = "(hello|hi|greetings)"

[[characters.triggers]]
id = "patrol_call"
type = "timer_tick"
flags = ["requires_player_in_room"]
script = "emote shifts her weight and scans the square."

[[characters.triggers.criteria]]
subject = "%time_elapsed%"
operator = "numgte"
predicate = "10"

[[characters]]
id = "visitor"
name = "wandering visitor"
player = true
room = "square"
"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("WyldMUD starting up");

    let settings = Settings::load_or_default("config/wyldmud.toml");
    info!(
        tick_seconds = settings.tick_seconds,
        pause_ceiling = settings.pause_ceiling,
        zones_dir = %settings.zones_dir.display(),
        "settings loaded"
    );

    let mut world = World::new().with_pause_ceiling(settings.pause_ceiling);
    let loaded = load_zones(&mut world, &settings)?;

    if loaded == 0 {
        warn!("no zone fragments found, loading built-in demo zone");
        let zone = ZoneDef::from_toml(DEMO_ZONE).context("demo zone")?;
        let index = load_zone(&mut world, &zone)?;
        // let the visitor say hello so the greeting trigger shows up in
        // the effect log right away
        if let (Some(&room), Some(&visitor)) = (
            index.rooms.get("square"),
            index.characters.get("visitor"),
        ) {
            world.dispatch(&GameEvent::say(room, visitor, "hello there"));
        }
    }

    info!("entering game loop");
    let mut interval = tokio::time::interval(Duration::from_secs_f64(settings.tick_seconds));
    loop {
        interval.tick().await;
        world.tick(settings.tick_seconds);
        for effect in world.drain_effects() {
            info!(?effect, "action");
        }
    }
}

fn load_zones(world: &mut World, settings: &Settings) -> anyhow::Result<usize> {
    let Ok(entries) = std::fs::read_dir(&settings.zones_dir) else {
        return Ok(0);
    };
    let mut loaded = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == "toml") {
            continue;
        }
        match ZoneDef::load(&path) {
            Ok(zone) => {
                let index = load_zone(world, &zone)
                    .with_context(|| format!("loading {}", path.display()))?;
                info!(
                    zone = %index.zone,
                    rooms = index.rooms.len(),
                    characters = index.characters.len(),
                    objects = index.objects.len(),
                    "zone loaded"
                );
                loaded += 1;
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "skipping unreadable zone fragment");
            }
        }
    }
    Ok(loaded)
}
