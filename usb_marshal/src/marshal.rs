use std::ffi::c_int;

use tracing::{debug, trace, warn};
use usb_descriptor::{
    libusb_endpoint_descriptor, EndpointDescriptor, NativeEndpoint, NativeEndpoints,
};

use crate::{Error, MarshalConfig, Result, Runtime};

/// Copies native endpoint descriptor arrays into a [`Runtime`].
///
/// Holds only its configuration, so one marshaller can serve any number of concurrent
/// calls as long as each call has its own runtime and native buffer.
#[derive(Clone, Debug, Default)]
pub struct Marshaller {
    config: MarshalConfig,
}

impl Marshaller {
    pub fn new(config: MarshalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MarshalConfig {
        &self.config
    }

    /// Marshals every record of `endpoints` into a new array, in order.
    ///
    /// The array is allocated first. Each record is then deep-copied, boxed and stored at
    /// its index. The first failure aborts the call: later records are not read, the
    /// partially filled array is dropped and only the error is returned.
    pub fn marshal<R: Runtime>(
        &self,
        rt: &mut R,
        endpoints: &NativeEndpoints<'_>,
    ) -> Result<R::Array> {
        let count = endpoints.len();
        self.check_count(count)?;
        debug!(count, "marshalling endpoint descriptors");

        let mut array = rt.new_array(count).map_err(|err| {
            warn!(count, error = %err, "cannot allocate endpoint descriptor array");
            Error::from(err)
        })?;

        let mut extra_bytes = 0;
        for (index, record) in endpoints.iter().enumerate() {
            match self.marshal_element(rt, &mut array, index, record) {
                Ok(extra) => extra_bytes += extra,
                Err(err) => {
                    warn!(index, count, error = %err, "aborting endpoint descriptor marshalling");
                    return Err(err);
                }
            }
        }

        debug!(count, extra_bytes, "marshalled endpoint descriptors");
        Ok(array)
    }

    /// Marshals `count` records starting at `ptr`, as handed out by libusb.
    ///
    /// # Safety
    ///
    /// Same as [`NativeEndpoints::from_raw_parts`] once `count` is known to be
    /// non-negative.
    pub unsafe fn marshal_raw<R: Runtime>(
        &self,
        rt: &mut R,
        count: c_int,
        ptr: *const libusb_endpoint_descriptor,
    ) -> Result<R::Array> {
        let count = usize::try_from(count).map_err(|_| Error::NegativeCount { count })?;
        self.check_count(count)?;
        // SAFETY: upheld by the caller.
        let endpoints = unsafe { NativeEndpoints::from_raw_parts(ptr, count) };
        self.marshal(rt, &endpoints)
    }

    fn check_count(&self, count: usize) -> Result<()> {
        match self.config.max_descriptors {
            Some(max) if count > max => Err(Error::TooManyDescriptors { count, max }),
            _ => Ok(()),
        }
    }

    /// Copies, boxes and stores one record. Returns the number of extra bytes copied.
    fn marshal_element<R: Runtime>(
        &self,
        rt: &mut R,
        array: &mut R::Array,
        index: usize,
        record: NativeEndpoint<'_>,
    ) -> Result<usize> {
        if let Some(max) = self.config.max_extra_length {
            // Negative lengths are rejected by the copy itself.
            let length = usize::try_from(record.extra_length()).unwrap_or_default();
            if length > max {
                return Err(Error::ExtraTooLong { index, length, max });
            }
        }

        let descriptor =
            EndpointDescriptor::copy_from(record).map_err(|e| Error::element(index, e))?;
        let extra = descriptor.extra_length();
        trace!(index, address = descriptor.address, extra, "copied endpoint descriptor");

        let object = rt
            .new_object(descriptor)
            .map_err(|e| Error::element(index, e))?;
        rt.set_element(array, index, object)
            .map_err(|e| Error::element(index, e))?;
        Ok(extra)
    }
}

/// [`Marshaller::marshal`] with the default configuration.
pub fn marshal<R: Runtime>(rt: &mut R, endpoints: &NativeEndpoints<'_>) -> Result<R::Array> {
    Marshaller::default().marshal(rt, endpoints)
}

/// [`Marshaller::marshal_raw`] with the default configuration.
///
/// # Safety
///
/// See [`Marshaller::marshal_raw`].
pub unsafe fn marshal_raw<R: Runtime>(
    rt: &mut R,
    count: c_int,
    ptr: *const libusb_endpoint_descriptor,
) -> Result<R::Array> {
    // SAFETY: upheld by the caller.
    unsafe { Marshaller::default().marshal_raw(rt, count, ptr) }
}
