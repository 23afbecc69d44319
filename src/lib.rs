//! Third-person flight locomotion for Bevy characters.
//!
//! [`locomotion`] holds the engine-agnostic controllers: flight, dash and
//! dodge, the dive-bomb and the charged take-off. They drive any owner that
//! implements [`locomotion::FlightHost`]. The remaining modules plug them
//! into Bevy through [`FlightLocomotionPlugin`].

#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]

pub mod components;
pub mod events;
pub mod flight_plugin;
pub mod locomotion;
pub mod resources;
pub mod systems;

pub use flight_plugin::{FlightLocomotionPlugin, FlightLocomotionSet};
