mod flight;

pub use flight::*;
