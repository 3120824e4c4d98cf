#![forbid(unsafe_code)]

pub mod model;
pub mod progress;
pub mod time;

pub use progress::Progress;
pub use time::Clock;
