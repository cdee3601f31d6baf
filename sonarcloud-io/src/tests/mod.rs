//! Test modules for sonarcloud-io
//!
//! Sample file decoding, error reporting and labeled vertex export.
