//! Behaviour edits against the control plane.
mod engine;
mod resync;
mod update;


pub use engine::SyncEngine;
pub use resync::refresh_tree;
pub use update::{AppliedUpdate, BehaviourEdit, OptimisticUpdate, ResyncOutcome};
