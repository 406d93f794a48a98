//! libusb endpoint descriptor records and their owned counterparts.
//!
//! [`NativeEndpoints`] borrows an array of records handed out by libusb without taking
//! ownership of it. [`EndpointDescriptor`] is the owned value each record is copied into.
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod descriptor;

pub use descriptor::*;
