use serde::{Deserialize, Serialize};

/// Optional bounds a [`Marshaller`](crate::Marshaller) enforces on native input before
/// copying it.
///
/// Both limits are off by default, so the default marshaller accepts every valid buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarshalConfig {
    /// Largest record count accepted per call.
    pub max_descriptors: Option<usize>,
    /// Largest extra descriptor length accepted per record.
    pub max_extra_length: Option<usize>,
}
