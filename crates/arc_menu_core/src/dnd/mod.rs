//! Drag-and-drop interaction shared by the menu widgets.
//!
//! A widget owns one [`arbitrator::DropArbitrator`] configured with the
//! [`arbitrator::DropCapabilities`] it supports. Host drag events go through
//! the arbitrator, which classifies them with [`effect::resolve_drop_effect`],
//! keeps the single [`hover_timer::HoverTimer`] and turns accepted drops into
//! [`crate::store::mutation::MutationRequest`] values. Positions inside a
//! request list come from [`insertion::resolve_insertion_index`].

pub mod arbitrator;
pub mod clock;
pub mod effect;
pub mod hover_timer;
pub mod insertion;
pub mod payload;

pub const DEFAULT_DRAG_OPEN_TIMEOUT_MS: u64 = 700;
