//! Purpose: Shared library crate used by the `partstore` console and tests.
//! Exports: `api` (record store, part records, reallocation seam, errors).
//! Role: Owns every record the console shows; the console only drives it.
//! Invariants: An empty store holds no backing storage.
//! Invariants: Failed appends and removals leave the store exactly as it was.
pub mod api;
mod core;
