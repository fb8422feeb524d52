//! End-to-end conversion tests
//!
//! Documents go through real packages in both directions.

mod properties;
mod roundtrip;
