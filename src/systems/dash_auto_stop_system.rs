use bevy::{
    ecs::message::MessageWriter,
    prelude::*,
};

use crate::components::{CharacterMotion, FlightCharacter, FlightLocomotionState};
use crate::events::{FlightEffect, FlightEffectEvent};
use crate::locomotion::MovementMode;
use crate::resources::FlightSettings;
use crate::systems::{stop_dash, CharacterContext};

/// Dashing needs forward input while flying and planar input otherwise.
pub fn should_keep_dashing(mode: MovementMode, character: &FlightCharacter) -> bool {
    let axes = character.effective_axes();
    match mode {
        MovementMode::Flying => axes.forward > 0.0,
        MovementMode::Walking | MovementMode::Falling => axes.has_planar(),
    }
}

/// Ends dashes whose input was let go.
pub fn dash_auto_stop_system(
    settings: Res<FlightSettings>,
    mut query: Query<(
        Entity,
        &mut FlightCharacter,
        &mut CharacterMotion,
        &mut Transform,
        &mut FlightLocomotionState,
    )>,
    mut effect_writer: MessageWriter<FlightEffectEvent>,
) {
    for (entity, mut character, mut motion, mut transform, locomotion) in query.iter_mut() {
        if !character.is_dashing || should_keep_dashing(motion.mode, &character) {
            continue;
        }

        let mut host = CharacterContext::new(
            entity,
            &mut character,
            &mut motion,
            &mut transform,
            Quat::IDENTITY,
            settings.character.walkable_floor_y,
        );
        let mut effects: Vec<FlightEffect> = Vec::new();
        stop_dash(
            &mut host,
            locomotion.into_inner(),
            &settings.character,
            &mut effects,
        );
        debug!("Dash on {:?} stopped, input released", entity);

        for effect in effects {
            effect_writer.write(FlightEffectEvent { entity, effect });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::MoveAxes;

    #[test]
    fn test_flying_dash_needs_forward_input() {
        let mut character = FlightCharacter::default();
        character.axes = MoveAxes {
            forward: 0.0,
            right: 1.0,
            up: 0.0,
        };
        assert!(!should_keep_dashing(MovementMode::Flying, &character));
        assert!(should_keep_dashing(MovementMode::Walking, &character));

        character.axes.forward = 1.0;
        assert!(should_keep_dashing(MovementMode::Flying, &character));
    }

    #[test]
    fn test_disabled_input_ends_dash() {
        let mut character = FlightCharacter::default();
        character.axes.forward = 1.0;
        character.input_enabled = false;
        assert!(!should_keep_dashing(MovementMode::Falling, &character));
    }
}
