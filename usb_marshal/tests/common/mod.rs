#![allow(dead_code)]

use std::{ffi::c_int, ptr};

use usb_descriptor::{libusb_endpoint_descriptor, NativeEndpoints, DT_ENDPOINT};

/// Native endpoint records together with the extra bytes they point to, standing in for a
/// buffer libusb would own.
#[derive(Default)]
pub struct NativeBuffer {
    extras: Vec<Vec<u8>>,
    records: Vec<libusb_endpoint_descriptor>,
}

impl NativeBuffer {
    pub fn push(&mut self, template: libusb_endpoint_descriptor, extra: &[u8]) -> &mut Self {
        let extra = extra.to_vec();
        let mut record = template;
        record.extra = if extra.is_empty() {
            ptr::null()
        } else {
            extra.as_ptr()
        };
        record.extra_length = extra.len() as c_int;
        // Moving the Vec keeps its heap buffer, so `record.extra` stays valid.
        self.extras.push(extra);
        self.records.push(record);
        self
    }

    pub fn records(&self) -> &[libusb_endpoint_descriptor] {
        &self.records
    }

    pub fn extra_mut(&mut self, index: usize) -> &mut [u8] {
        &mut self.extras[index]
    }

    pub fn view(&self) -> NativeEndpoints<'_> {
        // SAFETY: every non-null `extra` points into `self.extras`, which lives as long as
        // the borrow of `self`.
        unsafe { NativeEndpoints::from_slice(&self.records) }
    }
}

pub fn endpoint(
    length: u8,
    address: u8,
    attributes: u8,
    max_packet_size: u16,
    interval: u8,
) -> libusb_endpoint_descriptor {
    libusb_endpoint_descriptor {
        bLength: length,
        bDescriptorType: DT_ENDPOINT,
        bEndpointAddress: address,
        bmAttributes: attributes,
        wMaxPacketSize: max_packet_size,
        bInterval: interval,
        bRefresh: 0,
        bSynchAddress: 0,
        extra: ptr::null(),
        extra_length: 0,
    }
}
