//! Purpose: Define the public Rust API boundary for `partstore`.
//! Exports: Store, record and error types needed by the console and callers.
//! Role: Additive-only surface; hides the internal `core` module layout.
//! Invariants: This module is the only public path to the record store.

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::alloc::{Reallocate, SystemReallocator};
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::record::{
    PART_NAME_MAX, PartName, PartRecord, RECORD_SIZE, SIZE_METRIC_MAX, SizeMetric,
};
pub use crate::core::store::{RecordStore, Records, Removal, StoreOptions};
pub use crate::core::text::BoundedText;
