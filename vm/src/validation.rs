//! Block verification rules.
//!
//! A block is well-formed when its parent resolves and its height is exactly
//! one above the parent's. Nothing else about the payload or timestamp is
//! checked.

use tsvm_primitives::{id_to_hex, Block};

use crate::error::{VmError, VmResult};

/// Check that `child` correctly extends `parent`.
pub fn verify_child(parent: &Block, child: &Block) -> VmResult<()> {
    if child.parent_id() != parent.id() {
        return Err(VmError::InvalidBlock(format!(
            "parent id mismatch: expected {}, got {}",
            id_to_hex(&parent.id()),
            id_to_hex(&child.parent_id()),
        )));
    }

    let expected = parent
        .height()
        .checked_add(1)
        .ok_or_else(|| VmError::InvalidBlock("parent height overflow".into()))?;
    if child.height() != expected {
        return Err(VmError::InvalidBlock(format!(
            "height must be {}, got {}",
            expected,
            child.height()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genesis() -> Block {
        Block::genesis(b"genesis").unwrap()
    }

    #[test]
    fn test_valid_child() {
        let parent = genesis();
        let child = Block::with_data(parent.id(), 1, b"c", 5).unwrap();
        assert!(verify_child(&parent, &child).is_ok());
    }

    #[test]
    fn test_wrong_height() {
        let parent = genesis();
        for height in [0, 2, u64::MAX] {
            let child = Block::with_data(parent.id(), height, b"c", 5).unwrap();
            let err = verify_child(&parent, &child).unwrap_err();
            assert!(matches!(err, VmError::InvalidBlock(_)), "height {}", height);
        }
    }

    #[test]
    fn test_wrong_parent() {
        let parent = genesis();
        let child = Block::with_data([3; 32], 1, b"c", 5).unwrap();
        let err = verify_child(&parent, &child).unwrap_err();
        assert!(err.to_string().contains("parent id mismatch"));
    }

    #[test]
    fn test_parent_at_max_height() {
        let parent = Block::with_data([1; 32], u64::MAX, b"p", 5).unwrap();
        let child = Block::with_data(parent.id(), 0, b"c", 5).unwrap();
        let err = verify_child(&parent, &child).unwrap_err();
        assert_eq!(err, VmError::InvalidBlock("parent height overflow".into()));
    }
}
