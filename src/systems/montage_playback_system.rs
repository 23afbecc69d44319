use bevy::{
    ecs::message::{MessageReader, MessageWriter},
    prelude::*,
};

use crate::components::MontagePlayback;
use crate::events::{FlightLandingNotify, MontageAction, MontageRequest};
use crate::resources::FlightSettings;

/// Headless stand-in for the animation graph: applies montage requests and
/// raises the landing notify when a landing animation completes.
pub fn montage_playback_system(
    time: Res<Time>,
    settings: Res<FlightSettings>,
    mut request_reader: MessageReader<MontageRequest>,
    mut query: Query<(Entity, &mut MontagePlayback)>,
    mut notify_writer: MessageWriter<FlightLandingNotify>,
) {
    for request in request_reader.read() {
        let Ok((_, mut playback)) = query.get_mut(request.entity) else {
            continue;
        };

        match &request.action {
            MontageAction::Play {
                montage,
                section,
                rate,
            } => {
                playback.play(&settings.animations, montage, section.as_deref(), *rate);
            }
            MontageAction::Stop { montage, .. } => playback.stop(montage.as_deref()),
        }
    }

    let delta = time.delta_secs();
    for (entity, mut playback) in query.iter_mut() {
        if playback.montage.is_none() {
            continue;
        }

        if let Some((montage, section)) = playback.tick(delta) {
            if settings.has_landing_notify(&montage, &section) {
                notify_writer.write(FlightLandingNotify { entity });
            }
        }
    }
}
