use alloc::{boxed::Box, vec::Vec};
use core::{ffi::c_int, fmt};

use super::NativeEndpoint;

/// An endpoint descriptor copied out of libusb.
///
/// Every scalar keeps the width and signedness of its native field. `extra` is an
/// independent copy of the native extra descriptors and is empty rather than absent when
/// there were none.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndpointDescriptor {
    #[cfg_attr(feature = "serde", serde(rename = "bLength"))]
    pub length: u8,
    #[cfg_attr(feature = "serde", serde(rename = "bDescriptorType"))]
    pub descriptor_type: u8,
    /// The address of the endpoint on the USB device described by this descriptor.
    #[cfg_attr(feature = "serde", serde(rename = "bEndpointAddress"))]
    pub address: u8,
    #[cfg_attr(feature = "serde", serde(rename = "bmAttributes"))]
    pub attributes: u8,
    #[cfg_attr(feature = "serde", serde(rename = "wMaxPacketSize"))]
    pub max_packet_size: u16,
    #[cfg_attr(feature = "serde", serde(rename = "bInterval"))]
    pub interval: u8,
    /// Audio endpoints only.
    #[cfg_attr(feature = "serde", serde(rename = "bRefresh"))]
    pub refresh: u8,
    /// Audio endpoints only.
    #[cfg_attr(feature = "serde", serde(rename = "bSynchAddress"))]
    pub synch_address: u8,
    pub extra: Box<[u8]>,
}

impl EndpointDescriptor {
    /// Copies every field of `native`, duplicating the extra descriptors.
    pub fn copy_from(native: NativeEndpoint<'_>) -> Result<Self, InvalidEndpoint> {
        Ok(EndpointDescriptor {
            length: native.length(),
            descriptor_type: native.descriptor_type(),
            address: native.address(),
            attributes: native.attributes(),
            max_packet_size: native.max_packet_size(),
            interval: native.interval(),
            refresh: native.refresh(),
            synch_address: native.synch_address(),
            extra: copy_extra(native.extra()?)?,
        })
    }

    pub fn extra(&self) -> &[u8] {
        &self.extra
    }

    pub fn extra_length(&self) -> usize {
        self.extra.len()
    }
}

fn copy_extra(src: &[u8]) -> Result<Box<[u8]>, InvalidEndpoint> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(src.len())
        .map_err(|_| InvalidEndpoint::ExtraAllocation { len: src.len() })?;
    buf.extend_from_slice(src);
    Ok(buf.into_boxed_slice())
}

impl fmt::Debug for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(stringify!(EndpointDescriptor))
            .field("length", &self.length)
            .field("descriptor_type", &format_args!("{:#04x}", self.descriptor_type))
            .field("address", &format_args!("{:#04x}", self.address))
            .field("attributes", &format_args!("{:#04x}", self.attributes))
            .field("max_packet_size", &self.max_packet_size)
            .field("interval", &self.interval)
            .field("refresh", &self.refresh)
            .field("synch_address", &format_args!("{:#04x}", self.synch_address))
            .field("extra", &format_args!("{:02x?}", self.extra))
            .finish()
    }
}

/// Multi-line dump with one field per line, values right aligned.
impl fmt::Display for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Endpoint Descriptor:")?;
        writeln!(f, "  bLength {:18}", self.length)?;
        writeln!(f, "  bDescriptorType {:10}", self.descriptor_type)?;
        writeln!(f, "  bEndpointAddress      0x{:02x}", self.address)?;
        writeln!(f, "  bmAttributes {:13}", self.attributes)?;
        writeln!(f, "  wMaxPacketSize {:11}", self.max_packet_size)?;
        writeln!(f, "  bInterval {:16}", self.interval)?;
        writeln!(f, "  bRefresh {:17}", self.refresh)?;
        writeln!(f, "  bSynchAddress {:12}", self.synch_address)?;
        writeln!(f, "  extralen {:17}", self.extra.len())?;
        writeln!(f, "  extra:")?;
        for line in self.extra.chunks(16) {
            write!(f, "   ")?;
            for b in line {
                write!(f, " {:02x}", b)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidEndpoint {
    #[error("extra descriptor length {length} is negative")]
    NegativeExtraLength { length: c_int },
    #[error("extra descriptor pointer is null but {length} bytes were announced")]
    NullExtra { length: c_int },
    #[error("could not allocate {len} bytes for the extra descriptors")]
    ExtraAllocation { len: usize },
}
