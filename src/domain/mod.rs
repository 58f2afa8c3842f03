/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------+-------+-------+------------------------------+
/// | Exports:                                                 |
/// |   - models                                               |
/// |   - services                                             |
/// +----------------------------------------------------------+

/// Claim sets, telemetry documents and publish requests.
pub mod models;

/// Token verification, payload parsing and queue publishing.
pub mod services;
