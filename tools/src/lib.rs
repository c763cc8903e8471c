pub mod player;
pub mod record;
pub mod report;
pub mod telemetry;
