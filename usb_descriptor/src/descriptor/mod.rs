mod endpoint;
mod native;

pub use endpoint::*;
pub use native::*;

/// `bDescriptorType` of an endpoint descriptor.
pub const DT_ENDPOINT: u8 = 0x5;

/// `bLength` of a standard endpoint descriptor.
pub const DESCRIPTOR_LEN_ENDPOINT: u8 = 7;
/// `bLength` of an audio class endpoint descriptor, which adds `bRefresh` and `bSynchAddress`.
pub const DESCRIPTOR_LEN_AUDIO_ENDPOINT: u8 = 9;
