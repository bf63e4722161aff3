// Core modules implementing record layout, storage growth, and error modeling.
pub mod alloc;
pub mod error;
pub mod record;
pub mod store;
pub mod text;
