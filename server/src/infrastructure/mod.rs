/// Audit logging for security events.
pub mod audit;
/// Configuration management.
pub mod config;
/// HTTP server wiring.
pub mod server;
/// Telemetry setup for logging, tracing, and metrics.
pub mod telemetry;
