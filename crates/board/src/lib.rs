//! Shared board-state logic for the admin screens.
//!
//! The admin pages (WIP task board, deal pipeline, gallery editors) all use
//! the same interaction pattern: apply a state change to the in-memory list
//! immediately, persist it asynchronously, and roll back on failure. This
//! crate keeps that pattern pure so the behavior is unit-testable without a
//! browser or a database: the store mutates lists and counters and hands the
//! caller an effect describing what to persist; the caller reports back via
//! the `*_failed` methods.

pub mod reorder;
pub mod store;

pub use reorder::{OrderError, Sequenced, move_down, move_up, reorder, validate_order};
pub use store::{
    BoardItem, BoardStore, BucketChange, CommitEffect, Counts, ReorderChange, UndoState,
};
