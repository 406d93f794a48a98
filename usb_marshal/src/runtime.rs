use usb_descriptor::EndpointDescriptor;

use crate::RuntimeError;

/// The managed runtime a descriptor array is marshalled into.
///
/// Stands in for the call context of the runtime: it owns the object model, and every
/// primitive may fail when the runtime runs out of resources. Implementations must not
/// retry internally.
pub trait Runtime {
    /// A boxed descriptor object.
    type Object;
    /// A fixed-length array of [`Object`](Self::Object) slots.
    type Array;

    /// Allocates an array with `len` empty slots.
    fn new_array(&mut self, len: usize) -> Result<Self::Array, RuntimeError>;

    /// Boxes one descriptor. The descriptor already owns its copy of the extra bytes.
    fn new_object(&mut self, descriptor: EndpointDescriptor) -> Result<Self::Object, RuntimeError>;

    fn set_element(
        &mut self,
        array: &mut Self::Array,
        index: usize,
        object: Self::Object,
    ) -> Result<(), RuntimeError>;
}

impl<R: Runtime + ?Sized> Runtime for &mut R {
    type Object = R::Object;
    type Array = R::Array;

    fn new_array(&mut self, len: usize) -> Result<Self::Array, RuntimeError> {
        (**self).new_array(len)
    }

    fn new_object(&mut self, descriptor: EndpointDescriptor) -> Result<Self::Object, RuntimeError> {
        (**self).new_object(descriptor)
    }

    fn set_element(
        &mut self,
        array: &mut Self::Array,
        index: usize,
        object: Self::Object,
    ) -> Result<(), RuntimeError> {
        (**self).set_element(array, index, object)
    }
}
