//! Immutable flattened canvas snapshots.

use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique snapshot identifier.
pub type SnapshotId = Uuid;

/// A fully rendered, encoded image of the whole canvas at one instant.
///
/// The store treats the pixel payload as opaque bytes; the renderer decides
/// the encoding. Clones share the same payload.
#[derive(Clone)]
pub struct Snapshot {
    id: SnapshotId,
    width: u32,
    height: u32,
    encoded: Arc<[u8]>,
}

impl Snapshot {
    /// Wrap an encoded image of the given pixel size.
    pub fn new(width: u32, height: u32, encoded: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            width,
            height,
            encoded: encoded.into(),
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.encoded
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Snapshot {}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.encoded.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_equality() {
        let a = Snapshot::new(2, 2, vec![1, 2, 3]);
        let b = Snapshot::new(2, 2, vec![1, 2, 3]);
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn test_clone_shares_payload() {
        let a = Snapshot::new(4, 3, vec![9; 16]);
        let b = a.clone();
        assert_eq!(a.bytes().as_ptr(), b.bytes().as_ptr());
        assert_eq!((b.width(), b.height()), (4, 3));
    }
}
