mod flight_event;

pub use flight_event::*;
