// Growable, insertion-ordered record store with transactional resizes.
use std::iter::FusedIterator;
use std::slice;

use tracing::{debug, warn};

use crate::core::alloc::{Reallocate, SystemReallocator};
use crate::core::error::{Error, ErrorKind};
use crate::core::record::{PartRecord, RECORD_SIZE};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StoreOptions {
    pub max_bytes: Option<usize>,
}

impl StoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }
}

/// Result of [`RecordStore::remove_last`] when no resize failed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Removal {
    Removed(PartRecord),
    AlreadyEmpty,
}

/// Owner of a contiguous, growable sequence of [`PartRecord`]s.
///
/// The block is `None` whenever the store is empty, so an empty store holds
/// no backing storage at all. Every mutation either completes or leaves the
/// store exactly as it was.
#[derive(Debug)]
pub struct RecordStore<R = SystemReallocator> {
    block: Option<Vec<PartRecord>>,
    realloc: R,
}

impl RecordStore<SystemReallocator> {
    pub fn new() -> Self {
        Self::with_options(StoreOptions::new())
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self::with_reallocator(SystemReallocator::with_max_bytes(options.max_bytes))
    }
}

impl Default for RecordStore<SystemReallocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Reallocate> RecordStore<R> {
    pub fn with_reallocator(realloc: R) -> Self {
        Self {
            block: None,
            realloc,
        }
    }

    pub fn reallocator(&self) -> &R {
        &self.realloc
    }

    /// Append `record` at the tail and return the new count.
    pub fn append(&mut self, record: PartRecord) -> Result<usize, Error> {
        let count = self.count();
        let new_count = count.checked_add(1).ok_or_else(|| {
            Error::new(ErrorKind::Alloc)
                .with_message("record count overflows usize")
                .with_count(count)
        })?;

        match self.block.as_mut() {
            Some(block) => {
                self.realloc
                    .grow(block, new_count)
                    .inspect_err(|err| log_resize_failure("grow", count, err))?;
                block.push(record);
            }
            None => {
                let mut block = Vec::new();
                self.realloc
                    .grow(&mut block, new_count)
                    .inspect_err(|err| log_resize_failure("grow", count, err))?;
                block.push(record);
                self.block = Some(block);
            }
        }

        debug!(
            count = new_count,
            bytes = new_count * RECORD_SIZE,
            part_number = record.part_number,
            "appended record"
        );
        Ok(new_count)
    }

    /// Remove the tail record.
    ///
    /// Removing the only record releases the backing storage. Removing from
    /// an empty store is a no-op reported as [`Removal::AlreadyEmpty`].
    pub fn remove_last(&mut self) -> Result<Removal, Error> {
        let Some(block) = self.block.as_mut() else {
            debug!("remove_last on empty store");
            return Ok(Removal::AlreadyEmpty);
        };
        let count = block.len();
        let Some(&record) = block.last() else {
            self.block = None;
            return Ok(Removal::AlreadyEmpty);
        };

        if count == 1 {
            self.block = None;
            debug!(part_number = record.part_number, "released record storage");
            return Ok(Removal::Removed(record));
        }

        self.realloc
            .shrink(block, count - 1)
            .inspect_err(|err| log_resize_failure("shrink", count, err))?;
        debug!(
            count = count - 1,
            bytes = (count - 1) * RECORD_SIZE,
            part_number = record.part_number,
            "removed last record"
        );
        Ok(Removal::Removed(record))
    }

    /// Drop every record and the backing storage.
    pub fn release(&mut self) {
        if let Some(block) = self.block.take() {
            debug!(count = block.len(), "released record storage");
        }
    }
}

impl<R> RecordStore<R> {
    pub fn count(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_none()
    }

    /// Bytes occupied by the stored records: `count * RECORD_SIZE`.
    pub fn byte_size(&self) -> usize {
        self.count() * RECORD_SIZE
    }

    pub fn has_backing_storage(&self) -> bool {
        self.block.is_some()
    }

    pub fn get(&self, index: usize) -> Option<&PartRecord> {
        self.records().get(index)
    }

    pub fn last(&self) -> Option<&PartRecord> {
        self.records().last()
    }

    pub fn iter(&self) -> Records<'_> {
        Records {
            inner: self.records().iter(),
        }
    }

    fn records(&self) -> &[PartRecord] {
        self.block.as_deref().unwrap_or(&[])
    }
}

fn log_resize_failure(op: &str, count: usize, err: &Error) {
    warn!(
        op,
        count,
        requested = err.requested(),
        error = %err,
        "record storage resize failed; store unchanged"
    );
}

/// Read-only iterator over a store's records in insertion order.
#[derive(Clone, Debug)]
pub struct Records<'a> {
    inner: slice::Iter<'a, PartRecord>,
}

impl<'a> Iterator for Records<'a> {
    type Item = &'a PartRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Records<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for Records<'_> {}

impl FusedIterator for Records<'_> {}

impl<'a, R> IntoIterator for &'a RecordStore<R> {
    type Item = &'a PartRecord;
    type IntoIter = Records<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
