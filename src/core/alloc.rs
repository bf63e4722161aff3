// Growth and shrink of record backing storage, behind a swappable trait.
use crate::core::error::{Error, ErrorKind};
use crate::core::record::{PartRecord, RECORD_SIZE};

/// Resizes the contiguous block that holds a store's records.
///
/// Both methods are all-or-nothing: on `Err` the block's length, contents
/// and capacity must be exactly what they were before the call.
pub trait Reallocate {
    /// Make room for `len` records without further allocation.
    fn grow(&mut self, block: &mut Vec<PartRecord>, len: usize) -> Result<(), Error>;

    /// Drop trailing records down to `len` and hand back the spare capacity.
    fn shrink(&mut self, block: &mut Vec<PartRecord>, len: usize) -> Result<(), Error>;
}

/// Reallocator backed by the global allocator, with an optional byte budget.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemReallocator {
    max_bytes: Option<usize>,
}

impl SystemReallocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_bytes(max_bytes: Option<usize>) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> Option<usize> {
        self.max_bytes
    }
}

impl Reallocate for SystemReallocator {
    fn grow(&mut self, block: &mut Vec<PartRecord>, len: usize) -> Result<(), Error> {
        let requested = len.checked_mul(RECORD_SIZE).ok_or_else(|| {
            Error::new(ErrorKind::Alloc)
                .with_message("record storage size overflows usize")
                .with_count(block.len())
        })?;
        if let Some(limit) = self.max_bytes {
            if requested > limit {
                return Err(Error::new(ErrorKind::Alloc)
                    .with_message(format!("byte budget of {limit} bytes exhausted"))
                    .with_hint("Raise --max-bytes or delete records first.")
                    .with_count(block.len())
                    .with_requested(requested));
            }
        }
        let additional = len.saturating_sub(block.len());
        block.try_reserve_exact(additional).map_err(|err| {
            Error::new(ErrorKind::Alloc)
                .with_message("cannot grow record storage")
                .with_count(block.len())
                .with_requested(requested)
                .with_source(err)
        })
    }

    fn shrink(&mut self, block: &mut Vec<PartRecord>, len: usize) -> Result<(), Error> {
        // The old block stays in place until the smaller one is allocated.
        let keep = len.min(block.len());
        let mut next = Vec::new();
        next.try_reserve_exact(keep).map_err(|err| {
            Error::new(ErrorKind::Alloc)
                .with_message("cannot shrink record storage")
                .with_count(block.len())
                .with_requested(keep * RECORD_SIZE)
                .with_source(err)
        })?;
        next.extend_from_slice(&block[..keep]);
        *block = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Reallocate, SystemReallocator};
    use crate::core::error::ErrorKind;
    use crate::core::record::{PartRecord, RECORD_SIZE};

    #[test]
    fn grow_reserves_exact_room() {
        let mut realloc = SystemReallocator::new();
        let mut block = Vec::new();
        realloc.grow(&mut block, 3).expect("grow");
        assert!(block.capacity() >= 3);
        assert!(block.is_empty());
    }

    #[test]
    fn grow_past_budget_leaves_block_untouched() {
        let mut realloc = SystemReallocator::with_max_bytes(Some(RECORD_SIZE));
        let mut block = vec![PartRecord::new(1, "Bolt", 5.0, "mm", 0.25)];
        let capacity = block.capacity();

        let err = realloc.grow(&mut block, 2).expect_err("over budget");
        assert_eq!(err.kind(), ErrorKind::Alloc);
        assert_eq!(err.requested(), Some(2 * RECORD_SIZE));
        assert_eq!(err.count(), Some(1));
        assert!(err.hint().is_some());
        assert_eq!(block.len(), 1);
        assert_eq!(block.capacity(), capacity);
    }

    #[test]
    fn impossible_size_is_reported_not_aborted() {
        let mut realloc = SystemReallocator::new();
        let mut block = Vec::new();
        let err = realloc.grow(&mut block, usize::MAX).expect_err("overflow");
        assert_eq!(err.kind(), ErrorKind::Alloc);
    }

    #[test]
    fn shrink_drops_tail_and_capacity() {
        let mut realloc = SystemReallocator::new();
        let mut block = vec![
            PartRecord::new(1, "Bolt", 5.0, "mm", 0.25),
            PartRecord::new(2, "Nut", 3.0, "mm", 0.10),
        ];
        realloc.shrink(&mut block, 1).expect("shrink");
        assert_eq!(block.len(), 1);
        assert_eq!(block[0].part_number, 1);
        assert!(block.capacity() >= 1);
    }

    #[test]
    fn shrink_to_zero_leaves_an_empty_block() {
        let mut realloc = SystemReallocator::new();
        let mut block = vec![PartRecord::new(1, "Bolt", 5.0, "mm", 0.25)];
        realloc.shrink(&mut block, 0).expect("shrink");
        assert!(block.is_empty());
        assert_eq!(block.capacity(), 0);
    }
}
