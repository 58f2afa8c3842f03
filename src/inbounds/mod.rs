/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------+-------+-------+------------------------------+
/// | Exports:                                                 |
/// |   - handlers                                             |
/// |   - ingest_error                                         |
/// +----------------------------------------------------------+

/// Request handlers for inbound telemetry.
pub mod handlers;

/// Failure kinds of the ingest pipeline.
pub mod ingest_error;
