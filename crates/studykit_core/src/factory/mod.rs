//! Polymorphic configuration decoding.
//!
//! Documents carry an outer category discriminator (`catType`) and a nested
//! variant discriminator (`type`). The registry maps tags to decoders per
//! category; the factory reads the discriminators and dispatches.

pub mod decoder;
pub mod error;
pub mod registry;
pub mod tag;
