pub mod logging;
pub mod timezone;
