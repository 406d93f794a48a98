//! Marshals libusb endpoint descriptor arrays into a managed runtime.
//!
//! libusb hands out endpoint descriptors as a contiguous array of
//! [`libusb_endpoint_descriptor`] records that it keeps ownership of. [`Marshaller`] turns
//! such an array into an array of the runtime's own descriptor objects:
//!
//! - the output has exactly one object per record, in the same order;
//! - every field is copied with its native width and signedness;
//! - extra descriptor bytes are deep-copied, so nothing refers to libusb memory afterwards;
//! - either the whole array is returned or a single [`Error`], never a partial array.
//!
//! The runtime is abstracted by [`Runtime`]. [`heap::Heap`] implements it for callers that
//! want the descriptors as Rust values.
//!
//! ```
//! use usb_descriptor::{libusb_endpoint_descriptor, NativeEndpoints};
//! use usb_marshal::heap::Heap;
//!
//! let records = [libusb_endpoint_descriptor {
//!     bLength: 7,
//!     bDescriptorType: 5,
//!     bEndpointAddress: 0x81,
//!     bmAttributes: 0x02,
//!     wMaxPacketSize: 512,
//!     bInterval: 0,
//!     bRefresh: 0,
//!     bSynchAddress: 0,
//!     extra: std::ptr::null(),
//!     extra_length: 0,
//! }];
//! // SAFETY: no record carries extra descriptors.
//! let endpoints = unsafe { NativeEndpoints::from_slice(&records) };
//! let mut heap = Heap::new();
//! let array = usb_marshal::marshal(&mut heap, &endpoints).unwrap();
//! assert_eq!(array.len(), 1);
//! assert_eq!(array.get(0).unwrap().max_packet_size, 512);
//! ```

mod config;
mod error;
pub mod heap;
mod marshal;
mod runtime;

pub use config::*;
pub use error::*;
pub use marshal::*;
pub use runtime::*;

pub use usb_descriptor::{libusb_endpoint_descriptor, EndpointDescriptor, NativeEndpoints};
