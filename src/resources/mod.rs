mod flight_settings;

pub use flight_settings::*;
