//! Event entity, store adapter, and lifecycle manager for Muster.
//!
//! Owns the Event invariants (creation, participant membership, deletion
//! authorization, due-today selection) behind a narrow store seam so the
//! chat runtime stays free of persistence concerns.

pub mod error;
pub mod event;
pub mod lifecycle;
pub mod store;

pub use error::EventError;
pub use event::{derive_event_id, Event};
pub use lifecycle::{EventDraft, EventLifecycle};
pub use store::{EventStore, JsonEventStore};
