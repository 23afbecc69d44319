//! Flight locomotion plugin.
//!
//! Registers the flight messages, the [`FlightSettings`] resource and the
//! chained per-frame systems that drive every [`FlightCharacter`].
//!
//! # Usage
//!
//! ```ignore
//! use bevy::prelude::*;
//! use flight_locomotion::{components::FlightCharacter, FlightLocomotionPlugin};
//!
//! App::new()
//!     .add_plugins((MinimalPlugins, FlightLocomotionPlugin))
//!     .add_systems(Startup, |mut commands: Commands| {
//!         commands.spawn((FlightCharacter::default(), Transform::default()));
//!     })
//!     .run();
//! ```
//!
//! Insert a customized [`FlightSettings`] before adding the plugin to tune it.
//!
//! [`FlightCharacter`]: crate::components::FlightCharacter

use bevy::prelude::*;

use crate::{
    events::{
        CharacterHit, CharacterLanded, FlightCommand, FlightEffectEvent, FlightLandingNotify,
        FlightSignalEvent, MontageRequest,
    },
    resources::FlightSettings,
    systems::{
        character_motion_system, dash_auto_stop_system, ensure_flight_state_system,
        flight_command_system, flight_impact_system, flight_initialize_system,
        flight_landing_notify_system, flight_landing_system, flight_locomotion_system,
        flight_signal_system, montage_playback_system,
    },
};

/// Every flight system runs in this set, in a fixed order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlightLocomotionSet;

pub struct FlightLocomotionPlugin;

impl Plugin for FlightLocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FlightSettings>();

        app.add_message::<FlightCommand>()
            .add_message::<FlightSignalEvent>()
            .add_message::<FlightEffectEvent>()
            .add_message::<MontageRequest>()
            .add_message::<CharacterLanded>()
            .add_message::<CharacterHit>()
            .add_message::<FlightLandingNotify>();

        app.add_systems(
            Update,
            (
                ensure_flight_state_system,
                flight_initialize_system,
                flight_command_system,
                dash_auto_stop_system,
                character_motion_system,
                flight_landing_system,
                flight_locomotion_system,
                flight_signal_system,
                flight_impact_system,
                montage_playback_system,
                flight_landing_notify_system,
            )
                .chain()
                .in_set(FlightLocomotionSet),
        );

        if let Some(settings) = app.world().get_resource::<FlightSettings>() {
            for error in settings.validate() {
                error!("Flight settings: {}", error);
            }
        }

        log::info!("Flight locomotion plugin initialized");
    }
}
