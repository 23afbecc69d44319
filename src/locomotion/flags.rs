use super::divebomb::DiveBombPhase;
use super::dodge::{DodgeController, DodgeSide};
use super::host::MovementMode;
use super::takeoff::TakeoffPhase;

bitflags::bitflags! {
    /// Snapshot of the locomotion state for animation blending.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[repr(transparent)]
    pub struct LocomotionFlags: u32 {
        const FLYING            = (1 << 0);
        const FALLING           = (1 << 1);
        const DASHING           = (1 << 2);
        const DODGING           = (1 << 3);
        const DODGING_LEFT      = (1 << 4);
        const DODGING_RIGHT     = (1 << 5);
        const TAKING_OFF        = (1 << 6);
        const DIVEBOMB_ENGAGED  = (1 << 7);
        const DIVEBOMBING       = (1 << 8);
        const NONE              = 0;
    }
}

impl LocomotionFlags {
    pub fn collect(
        mode: MovementMode,
        is_dashing: bool,
        dodge: &DodgeController,
        divebomb: DiveBombPhase,
        takeoff: TakeoffPhase,
    ) -> Self {
        let mut flags = LocomotionFlags::NONE;
        flags.set(LocomotionFlags::FLYING, mode == MovementMode::Flying);
        flags.set(LocomotionFlags::FALLING, mode == MovementMode::Falling);
        flags.set(LocomotionFlags::DASHING, is_dashing);
        flags.set(LocomotionFlags::DODGING, dodge.is_dodging());
        flags.set(
            LocomotionFlags::DODGING_LEFT,
            dodge.side() == Some(DodgeSide::Left),
        );
        flags.set(
            LocomotionFlags::DODGING_RIGHT,
            dodge.side() == Some(DodgeSide::Right),
        );
        flags.set(LocomotionFlags::TAKING_OFF, takeoff.is_taking_off());
        flags.set(LocomotionFlags::DIVEBOMB_ENGAGED, divebomb.is_engaged());
        flags.set(LocomotionFlags::DIVEBOMBING, divebomb.is_divebombing());
        flags
    }
}
