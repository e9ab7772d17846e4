//! Core type definitions using newtype patterns for type safety.
//!
//! These types keep raw strings and integers from leaking across layers:
//! a category is always one of the known set, a record id always came
//! from the store.

mod attempt_id;
mod category;
mod image;
mod record_id;
mod source;

pub use attempt_id::{AttemptId, AttemptIdError};
pub use category::{Category, CategoryError};
pub use image::ImageHandle;
pub use record_id::RecordId;
pub use source::Source;
