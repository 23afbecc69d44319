use std::{path::Path, time::Duration};

use anyhow::{bail, Context};
use bevy::{
    ecs::message::{MessageReader, MessageWriter},
    log::LogPlugin,
    prelude::*,
    time::TimeUpdateStrategy,
};
use clap::{Arg, Command};

use flight_locomotion::{
    components::{
        CharacterMotion, FlightCamera, FlightCharacter, LocomotionSnapshot, MoveAxes,
        PlayerCharacter,
    },
    events::{FlightCommand, FlightCommandKind, FlightEffectEvent, FlightSignalEvent},
    locomotion::MovementMode,
    resources::{load_flight_settings, FlightSettings, GroundPlane},
    FlightLocomotionPlugin, FlightLocomotionSet,
};

const FRAME_RATE: f64 = 60.0;

const FORWARD: MoveAxes = MoveAxes {
    forward: 1.0,
    right: 0.0,
    up: 0.0,
};

const FORWARD_RIGHT: MoveAxes = MoveAxes {
    forward: 1.0,
    right: 1.0,
    up: 0.0,
};

const IDLE: MoveAxes = MoveAxes {
    forward: 0.0,
    right: 0.0,
    up: 0.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scenario {
    /// Drop out of high flight and dive-bomb the ground
    Divebomb,
    /// Charge a take-off on the ground and release it fully charged
    Takeoff,
    /// Dash in flight and dodge right
    Dodge,
}

impl Scenario {
    fn parse(name: &str) -> anyhow::Result<Self> {
        match name {
            "divebomb" => Ok(Scenario::Divebomb),
            "takeoff" => Ok(Scenario::Takeoff),
            "dodge" => Ok(Scenario::Dodge),
            _ => bail!("unknown scenario '{}'", name),
        }
    }

    fn start(self) -> (Vec3, MovementMode) {
        match self {
            Scenario::Divebomb => (Vec3::new(0.0, 10_000.0, 0.0), MovementMode::Flying),
            Scenario::Takeoff => (Vec3::new(0.0, 89.0, 0.0), MovementMode::Walking),
            Scenario::Dodge => (Vec3::new(0.0, 2_000.0, 0.0), MovementMode::Flying),
        }
    }

    /// Commands sent on given frames.
    fn script(self) -> &'static [(u32, FlightCommandKind)] {
        match self {
            Scenario::Divebomb => &[(2, FlightCommandKind::Fly)],
            Scenario::Takeoff => &[
                (2, FlightCommandKind::TakeoffPress),
                (150, FlightCommandKind::TakeoffRelease),
            ],
            Scenario::Dodge => &[
                (2, FlightCommandKind::Move(FORWARD)),
                (3, FlightCommandKind::Dash),
                (30, FlightCommandKind::Move(FORWARD_RIGHT)),
                (32, FlightCommandKind::Move(FORWARD)),
                (200, FlightCommandKind::Move(IDLE)),
            ],
        }
    }
}

#[derive(Resource)]
struct ScriptedScenario {
    scenario: Scenario,
    frame: u32,
}

fn spawn_scenario_system(
    mut commands: Commands,
    settings: Res<FlightSettings>,
    script: Res<ScriptedScenario>,
) {
    let (location, mode) = script.scenario.start();
    let mut motion = CharacterMotion::new(&settings.character);
    motion.mode = mode;

    commands.spawn((
        PlayerCharacter,
        FlightCharacter::new(&settings.character),
        motion,
        Transform::from_translation(location),
    ));
    commands.spawn((FlightCamera, Transform::default()));
}

fn scenario_script_system(
    mut script: ResMut<ScriptedScenario>,
    player_query: Query<Entity, With<PlayerCharacter>>,
    mut command_writer: MessageWriter<FlightCommand>,
) {
    script.frame += 1;
    let Ok(player) = player_query.single() else {
        return;
    };

    for (frame, kind) in script.scenario.script() {
        if *frame == script.frame {
            info!("frame {}: {:?}", frame, kind);
            command_writer.write(FlightCommand::new(player, *kind));
        }
    }
}

fn scenario_report_system(
    script: Res<ScriptedScenario>,
    mut signal_reader: MessageReader<FlightSignalEvent>,
    mut effect_reader: MessageReader<FlightEffectEvent>,
) {
    for event in signal_reader.read() {
        info!("frame {}: signal {:?}", script.frame, event.signal);
    }
    for event in effect_reader.read() {
        info!("frame {}: effect {:?}", script.frame, event.effect);
    }
}

fn main() -> anyhow::Result<()> {
    let matches = Command::new("flight-demo")
        .about("Runs a scripted flight locomotion scenario without a window")
        .arg(
            Arg::new("config")
                .long("config")
                .takes_value(true)
                .help("Flight settings TOML file"),
        )
        .arg(
            Arg::new("scenario")
                .long("scenario")
                .takes_value(true)
                .possible_values(["divebomb", "takeoff", "dodge"])
                .default_value("divebomb"),
        )
        .arg(
            Arg::new("frames")
                .long("frames")
                .takes_value(true)
                .default_value("600"),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .takes_value(true)
                .default_value("info,flight_locomotion=debug")
                .help("Log filter, e.g. warn or flight_locomotion=trace"),
        )
        .get_matches();

    let scenario = Scenario::parse(matches.value_of("scenario").unwrap_or("divebomb"))?;
    let frames: u32 = matches
        .value_of("frames")
        .unwrap_or("600")
        .parse()
        .context("--frames must be a whole number")?;

    let settings = match matches.value_of("config") {
        Some(path) => load_flight_settings(Path::new(path))
            .with_context(|| format!("failed to load flight settings from {}", path))?,
        None => FlightSettings::default(),
    };
    if let Some(error) = settings.validate().into_iter().next() {
        return Err(error).context("invalid flight settings");
    }

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        LogPlugin {
            filter: matches.value_of("log").unwrap_or("info").to_string(),
            ..Default::default()
        },
    ))
    .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / FRAME_RATE,
    )))
    .insert_resource(settings)
    .insert_resource(GroundPlane::default())
    .insert_resource(ScriptedScenario { scenario, frame: 0 })
    .add_plugins(FlightLocomotionPlugin)
    .add_systems(Startup, spawn_scenario_system)
    .add_systems(
        Update,
        (
            scenario_script_system.before(FlightLocomotionSet),
            scenario_report_system.after(FlightLocomotionSet),
        ),
    );

    for _ in 0..frames {
        app.update();
    }

    let world = app.world_mut();
    let mut query = world
        .query_filtered::<(&Transform, &CharacterMotion, &LocomotionSnapshot), With<PlayerCharacter>>();
    for (transform, motion, snapshot) in query.iter(world) {
        info!(
            "{:?} finished at {:.0} while {:?}, flags {:?}",
            scenario, transform.translation, motion.mode, snapshot.flags
        );
    }

    Ok(())
}
