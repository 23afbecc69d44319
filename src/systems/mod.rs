mod character_context;
mod character_motion_system;
mod dash_auto_stop_system;
mod flight_command_system;
mod flight_impact_system;
mod flight_landing_system;
mod flight_locomotion_system;
mod flight_setup_system;
mod flight_signal_system;
mod montage_playback_system;

pub use character_context::*;
pub use character_motion_system::*;
pub use dash_auto_stop_system::*;
pub use flight_command_system::*;
pub use flight_impact_system::*;
pub use flight_landing_system::*;
pub use flight_locomotion_system::*;
pub use flight_setup_system::*;
pub use flight_signal_system::*;
pub use montage_playback_system::*;
