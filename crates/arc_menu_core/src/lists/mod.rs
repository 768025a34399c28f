//! In-memory views over the store that the menu widgets render.

pub mod api_index;
pub mod projects;
pub mod requests;

/// Remaining scroll distance, in points, under which the next page loads.
pub const LOAD_MORE_THRESHOLD: f32 = 120.0;
