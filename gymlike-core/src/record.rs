//! Structured records of named tensor-like fields.
//!
//! A [`Record`] is what environments hand to the training stack and what the
//! training stack hands back: the action goes in under the `action` key, and the
//! next observation, reward and done flag come out under their own keys.
//!
//! ```rust
//! use gymlike_core::record::{Device, Record, RecordValue};
//! use ndarray::arr1;
//!
//! let mut record = Record::new(vec![], Device::Cpu);
//! record.insert("action", RecordValue::Array(arr1(&[0.1f32, -0.2]).into_dyn()));
//! assert!(record.contains_key("action"));
//! ```
mod base;
mod device;

pub use base::{Record, RecordValue};
pub use device::Device;
