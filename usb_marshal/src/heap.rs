//! A managed heap implemented in Rust.
//!
//! [`Heap`] is the [`Runtime`] used when descriptors are consumed from Rust. It can be
//! bounded by [`HeapLimits`], in which case allocations past the limit fail the same way
//! an exhausted runtime would.

use std::{fmt, mem, ops::Deref, sync::Arc};

use serde::{Deserialize, Serialize};
use usb_descriptor::EndpointDescriptor;

use crate::{Runtime, RuntimeError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeapLimits {
    /// Maximum number of arrays and objects the heap hands out.
    pub max_allocations: Option<usize>,
    /// Maximum number of bytes charged for arrays and objects, extra bytes included.
    pub max_bytes: Option<usize>,
}

/// Reference to a boxed descriptor object on a [`Heap`].
///
/// Equality compares descriptors field by field. Use [`Handle::ptr_eq`] for identity.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Handle(Arc<EndpointDescriptor>);

impl Handle {
    pub fn ptr_eq(a: &Handle, b: &Handle) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl Deref for Handle {
    type Target = EndpointDescriptor;

    fn deref(&self) -> &EndpointDescriptor {
        &self.0
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Fixed-length array of descriptor objects.
///
/// Slots start out empty and are filled by [`Runtime::set_element`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectArray {
    slots: Box<[Option<Handle>]>,
}

impl ObjectArray {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// `None` when `index` is out of bounds or the slot was never filled.
    pub fn get(&self, index: usize) -> Option<&Handle> {
        self.slots.get(index)?.as_ref()
    }

    /// Filled slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Handle> + '_ {
        self.slots.iter().flatten()
    }

    pub fn into_vec(self) -> Vec<Handle> {
        self.slots.into_vec().into_iter().flatten().collect()
    }
}

#[derive(Debug, Default)]
pub struct Heap {
    limits: HeapLimits,
    allocations: usize,
    bytes: usize,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: HeapLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn limits(&self) -> &HeapLimits {
        &self.limits
    }

    /// Number of arrays and objects allocated so far.
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    pub fn allocated_bytes(&self) -> usize {
        self.bytes
    }

    /// Accounts for one allocation of `bytes`, unless that would exceed a limit.
    fn charge(&mut self, bytes: Option<usize>) -> bool {
        let Some(total) = bytes.and_then(|b| self.bytes.checked_add(b)) else {
            return false;
        };
        let allocations = self.allocations + 1;
        if self.limits.max_allocations.is_some_and(|max| allocations > max)
            || self.limits.max_bytes.is_some_and(|max| total > max)
        {
            return false;
        }
        self.allocations = allocations;
        self.bytes = total;
        true
    }
}

impl Runtime for Heap {
    type Object = Handle;
    type Array = ObjectArray;

    fn new_array(&mut self, len: usize) -> Result<ObjectArray, RuntimeError> {
        let err = RuntimeError::ArrayAllocation { len };
        let mut slots = Vec::new();
        slots.try_reserve_exact(len).map_err(|_| err.clone())?;
        // Counters only move once the slots really exist.
        if !self.charge(len.checked_mul(mem::size_of::<Option<Handle>>())) {
            return Err(err);
        }
        slots.resize_with(len, || None);
        Ok(ObjectArray {
            slots: slots.into_boxed_slice(),
        })
    }

    fn new_object(&mut self, descriptor: EndpointDescriptor) -> Result<Handle, RuntimeError> {
        let bytes = mem::size_of::<EndpointDescriptor>().checked_add(descriptor.extra_length());
        if !self.charge(bytes) {
            return Err(RuntimeError::ObjectAllocation);
        }
        Ok(Handle(Arc::new(descriptor)))
    }

    fn set_element(
        &mut self,
        array: &mut ObjectArray,
        index: usize,
        object: Handle,
    ) -> Result<(), RuntimeError> {
        let len = array.len();
        let slot = array
            .slots
            .get_mut(index)
            .ok_or(RuntimeError::IndexOutOfBounds { index, len })?;
        *slot = Some(object);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(address: u8, extra: &[u8]) -> EndpointDescriptor {
        EndpointDescriptor {
            length: 7,
            descriptor_type: 5,
            address,
            attributes: 2,
            max_packet_size: 64,
            interval: 0,
            refresh: 0,
            synch_address: 0,
            extra: extra.into(),
        }
    }

    #[test]
    fn new_array_has_empty_slots() {
        let mut heap = Heap::new();
        let array = heap.new_array(3).unwrap();
        assert_eq!(array.len(), 3);
        assert!(array.get(0).is_none());
        assert_eq!(array.iter().count(), 0);
        assert_eq!(heap.allocations(), 1);
    }

    #[test]
    fn set_element_fills_slot() {
        let mut heap = Heap::new();
        let mut array = heap.new_array(2).unwrap();
        let h = heap.new_object(descriptor(0x81, &[])).unwrap();
        heap.set_element(&mut array, 1, h.clone()).unwrap();
        assert!(array.get(0).is_none());
        assert!(Handle::ptr_eq(array.get(1).unwrap(), &h));
        assert_eq!(
            heap.set_element(&mut array, 2, h),
            Err(RuntimeError::IndexOutOfBounds { index: 2, len: 2 })
        );
    }

    #[test]
    fn allocation_limit() {
        let mut heap = Heap::with_limits(HeapLimits {
            max_allocations: Some(2),
            max_bytes: None,
        });
        heap.new_array(1).unwrap();
        heap.new_object(descriptor(1, &[])).unwrap();
        assert_eq!(
            heap.new_object(descriptor(2, &[])),
            Err(RuntimeError::ObjectAllocation)
        );
        assert_eq!(heap.new_array(0), Err(RuntimeError::ArrayAllocation { len: 0 }));
        assert_eq!(heap.allocations(), 2);
    }

    #[test]
    fn byte_limit_counts_extra() {
        let base = mem::size_of::<EndpointDescriptor>();
        let mut heap = Heap::with_limits(HeapLimits {
            max_allocations: None,
            max_bytes: Some(base + 4),
        });
        assert!(heap.new_object(descriptor(1, &[0; 5])).is_err());
        assert_eq!(heap.allocated_bytes(), 0);
        heap.new_object(descriptor(1, &[0; 4])).unwrap();
        assert_eq!(heap.allocated_bytes(), base + 4);
    }

    #[test]
    fn huge_array_fails_cleanly() {
        let mut heap = Heap::new();
        assert_eq!(
            heap.new_array(usize::MAX),
            Err(RuntimeError::ArrayAllocation { len: usize::MAX })
        );
        assert_eq!(heap.allocations(), 0);
    }

    #[test]
    fn failed_reserve_leaves_counters_untouched() {
        // Small enough that the byte count fits in usize, too large to reserve.
        let len = usize::MAX / 16;
        let mut heap = Heap::new();
        assert_eq!(heap.new_array(len), Err(RuntimeError::ArrayAllocation { len }));
        assert_eq!(heap.allocations(), 0);
        assert_eq!(heap.allocated_bytes(), 0);

        heap.new_array(2).unwrap();
        assert_eq!(heap.allocations(), 1);
        assert_eq!(heap.allocated_bytes(), 2 * mem::size_of::<Option<Handle>>());
    }

    #[test]
    fn limits_deserialize() {
        let limits: HeapLimits = serde_json::from_str(r#"{"max_bytes": 4096}"#).unwrap();
        assert_eq!(limits.max_bytes, Some(4096));
        assert_eq!(limits.max_allocations, None);
    }
}
