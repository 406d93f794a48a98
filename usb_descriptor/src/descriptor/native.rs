use core::{
    ffi::{c_int, c_uchar},
    fmt, slice,
};

use super::InvalidEndpoint;

/// Endpoint descriptor record as laid out by libusb.
///
/// Only ever read through [`NativeEndpoint`], one field at a time.
#[allow(non_camel_case_types, non_snake_case)]
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct libusb_endpoint_descriptor {
    pub bLength: u8,
    pub bDescriptorType: u8,
    pub bEndpointAddress: u8,
    pub bmAttributes: u8,
    pub wMaxPacketSize: u16,
    pub bInterval: u8,
    pub bRefresh: u8,
    pub bSynchAddress: u8,
    /// Class or vendor specific descriptors that followed the endpoint descriptor.
    pub extra: *const c_uchar,
    pub extra_length: c_int,
}

/// A borrowed run of native endpoint descriptor records.
///
/// The records, and the extra descriptors they point to, stay owned by libusb. Nothing
/// handed out by this view outlives `'a`.
#[derive(Clone, Copy)]
pub struct NativeEndpoints<'a> {
    records: &'a [libusb_endpoint_descriptor],
}

impl<'a> NativeEndpoints<'a> {
    /// View over `count` contiguous records starting at `ptr`.
    ///
    /// A `count` of zero yields an empty view and `ptr` is never read, so it may be null.
    ///
    /// # Safety
    ///
    /// When `count` is nonzero, `ptr` must point to `count` initialized records that are
    /// neither freed nor mutated for `'a`. Every record must also satisfy the requirements
    /// of [`from_slice`](Self::from_slice).
    pub unsafe fn from_raw_parts(ptr: *const libusb_endpoint_descriptor, count: usize) -> Self {
        if count == 0 {
            return Self { records: &[] };
        }
        // SAFETY: upheld by the caller.
        Self {
            records: unsafe { slice::from_raw_parts(ptr, count) },
        }
    }

    /// View over records that are already in a slice.
    ///
    /// # Safety
    ///
    /// For every record with a positive `extra_length`, `extra` must either be null or point
    /// to `extra_length` initialized bytes that are neither freed nor mutated for `'a`.
    pub unsafe fn from_slice(records: &'a [libusb_endpoint_descriptor]) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NativeEndpoint<'a>> {
        self.records.get(index).map(|raw| NativeEndpoint { raw })
    }

    pub fn iter(&self) -> Iter<'a> {
        Iter(self.records)
    }
}

impl fmt::Debug for NativeEndpoints<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &NativeEndpoints<'a> {
    type Item = NativeEndpoint<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// One record of a [`NativeEndpoints`] view.
#[derive(Clone, Copy)]
pub struct NativeEndpoint<'a> {
    raw: &'a libusb_endpoint_descriptor,
}

impl<'a> NativeEndpoint<'a> {
    pub fn length(&self) -> u8 {
        self.raw.bLength
    }

    pub fn descriptor_type(&self) -> u8 {
        self.raw.bDescriptorType
    }

    pub fn address(&self) -> u8 {
        self.raw.bEndpointAddress
    }

    pub fn attributes(&self) -> u8 {
        self.raw.bmAttributes
    }

    pub fn max_packet_size(&self) -> u16 {
        self.raw.wMaxPacketSize
    }

    pub fn interval(&self) -> u8 {
        self.raw.bInterval
    }

    pub fn refresh(&self) -> u8 {
        self.raw.bRefresh
    }

    pub fn synch_address(&self) -> u8 {
        self.raw.bSynchAddress
    }

    /// The length libusb reported for [`extra`](Self::extra), unchecked.
    pub fn extra_length(&self) -> c_int {
        self.raw.extra_length
    }

    /// The extra descriptors of this record, still borrowed from libusb.
    ///
    /// A length of zero yields an empty slice whatever the pointer holds.
    pub fn extra(&self) -> Result<&'a [u8], InvalidEndpoint> {
        let length = self.raw.extra_length;
        match usize::try_from(length) {
            Err(_) => Err(InvalidEndpoint::NegativeExtraLength { length }),
            Ok(0) => Ok(&[]),
            Ok(_) if self.raw.extra.is_null() => Err(InvalidEndpoint::NullExtra { length }),
            // SAFETY: the view this record came from was built under the promise that a
            // non-null `extra` covers `extra_length` bytes for `'a`.
            Ok(len) => Ok(unsafe { slice::from_raw_parts(self.raw.extra, len) }),
        }
    }
}

impl fmt::Debug for NativeEndpoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(stringify!(NativeEndpoint))
            .field("length", &self.length())
            .field("descriptor_type", &format_args!("{:#04x}", self.descriptor_type()))
            .field("address", &format_args!("{:#04x}", self.address()))
            .field("attributes", &format_args!("{:#04x}", self.attributes()))
            .field("max_packet_size", &self.max_packet_size())
            .field("interval", &self.interval())
            .field("refresh", &self.refresh())
            .field("synch_address", &format_args!("{:#04x}", self.synch_address()))
            .field("extra_length", &self.extra_length())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct Iter<'a>(&'a [libusb_endpoint_descriptor]);

impl<'a> Iterator for Iter<'a> {
    type Item = NativeEndpoint<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.split_first().map(|(raw, rest)| {
            self.0 = rest;
            NativeEndpoint { raw }
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }
}

impl ExactSizeIterator for Iter<'_> {
    fn len(&self) -> usize {
        self.0.len()
    }
}
