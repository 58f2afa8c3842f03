/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------+-------+-------+------------------------------+
/// | Exports:                                                 |
/// |   - telemetry_handler                                    |
/// +----------------------------------------------------------+

/// Handler for authenticated telemetry readings
pub mod telemetry_handler;
