pub mod claims;
pub mod telemetry;
