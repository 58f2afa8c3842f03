/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------+-------+-------+------------------------------+
/// | Exports:                                                 |
/// |   - payload_parser                                       |
/// |   - queue_publisher                                      |
/// |   - token_verifier                                       |
/// +----------------------------------------------------------+

pub mod payload_parser;
pub mod queue_publisher;
pub mod token_verifier;
