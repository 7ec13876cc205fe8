//! face.landmark_frame.v1 input schema
//!
//! This module defines the wire format the landmark-producing side emits,
//! one record per frame, and the adapter that parses and validates it.

mod adapter;
mod frame_record;

pub use adapter::*;
pub use frame_record::*;
