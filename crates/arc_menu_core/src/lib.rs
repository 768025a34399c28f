//! Menu models and drag-and-drop interaction for the ARC request menus.
//!
//! Nothing here depends on a UI toolkit. The `arc_menu` crate renders these
//! models with egui.

pub mod data;
pub mod dnd;
pub mod events;
pub mod lists;
pub mod selection;
pub mod store;
