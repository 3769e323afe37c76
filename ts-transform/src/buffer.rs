//! This module handles the batched instance buffer that the animator writes into.

use crate::Transform;

/// A fixed-size buffer of per-particle transforms with an explicit dirty flag.
///
/// The animator writes every slot it updates with [`set`](InstanceBuffer::set) and then calls
/// [`mark_dirty`](InstanceBuffer::mark_dirty) once per frame. The renderer calls
/// [`take_dirty`](InstanceBuffer::take_dirty) and only re-uploads the transforms when it returns
/// true, so an idle buffer costs nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceBuffer {
    /// The transform slots, one per particle.
    transforms: Vec<Transform>,

    /// Whether the buffer has been written since the last upload.
    dirty: bool,
}

impl InstanceBuffer {
    /// Create a buffer with `count` identity slots. A fresh buffer is dirty so that the first
    /// frame uploads the initial poses.
    pub fn new(count: usize) -> Self {
        Self {
            transforms: vec![Transform::IDENTITY; count],
            dirty: true,
        }
    }

    /// The number of slots in the buffer.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether the buffer has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Write the transform for slot `i`.
    ///
    /// Writing does not mark the buffer dirty; callers mark it once after updating all their
    /// slots for the frame.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds. Animator loops are bounded by the group count, which
    /// matches the buffer length, so this cannot happen in practice.
    pub fn set(&mut self, i: usize, transform: Transform) {
        self.transforms[i] = transform;
    }

    /// The current contents of the buffer.
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Mark the buffer as needing an upload.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Return whether the buffer was dirty, clearing the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn dirty_flag_round_trip() {
        let mut buffer = InstanceBuffer::new(4);

        // A fresh buffer uploads its initial contents
        assert!(buffer.take_dirty());
        assert!(!buffer.take_dirty());

        buffer.set(2, Transform::from_position(Vec3::ONE));
        assert!(!buffer.take_dirty(), "set() alone must not mark the buffer");

        buffer.mark_dirty();
        assert!(buffer.take_dirty());
        assert!(!buffer.take_dirty());
    }

    #[test]
    fn empty_buffer_is_well_behaved() {
        let mut buffer = InstanceBuffer::new(0);
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.transforms(), &[]);
        buffer.mark_dirty();
        assert!(buffer.take_dirty());
    }

    #[test]
    fn set_writes_the_right_slot() {
        let mut buffer = InstanceBuffer::new(3);
        let t = Transform::from_position(Vec3::new(1., 2., 3.));
        buffer.set(1, t);

        assert_eq!(buffer.transforms()[0], Transform::IDENTITY);
        assert_eq!(buffer.transforms()[1], t);
        assert_eq!(buffer.transforms()[2], Transform::IDENTITY);
    }
}
