//! Engine-agnostic flight locomotion: flight, dash and dodge, the dive-bomb
//! sequence and the charged take-off.

mod controller;
mod divebomb;
mod dodge;
mod flags;
mod host;
mod impact;
mod montage;
mod profile;
mod rotation;
mod takeoff;
mod timer;

#[cfg(test)]
mod testing;

pub use controller::*;
pub use divebomb::*;
pub use dodge::*;
pub use flags::*;
pub use host::*;
pub use impact::*;
pub use montage::*;
pub use profile::*;
pub use rotation::*;
pub use takeoff::*;
pub use timer::*;
