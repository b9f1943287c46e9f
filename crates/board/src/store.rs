//! Optimistic mutation controller with a single undo window.
//!
//! The store owns the active and completed lists for one admin page session
//! plus the aggregate counters shown in the header. Completing an item does
//! not persist anything right away: the item leaves the active list and a
//! pending window opens for a fixed grace period. The window either commits
//! (timer elapses, or another completion starts and force-commits it),
//! or reverts (the user presses undo in time). At most one window exists;
//! stacked toasts are not a thing.
//!
//! Persistence is the caller's job. Committing hands back a [`CommitEffect`];
//! if the server call fails the caller feeds it into
//! [`BoardStore::commit_failed`], which restores the item and records exactly
//! one user-visible notice. Field updates and reorders follow the same shape
//! with their own rollback tokens.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::reorder::{self, OrderError, Sequenced};

pub const DEFAULT_GRACE: Duration = Duration::from_secs(5);

/// An item that lives on a board, counted into a bucket (task priority,
/// pipeline stage) for the header aggregates.
pub trait BoardItem: Clone {
    type Bucket: Copy + Eq + Hash + std::fmt::Debug;

    fn id(&self) -> Uuid;
    fn bucket(&self) -> Self::Bucket;
    fn set_bucket(&mut self, bucket: Self::Bucket);
}

/// Aggregate counters, maintained by delta on every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counts<B: Eq + Hash> {
    pub active: usize,
    pub by_bucket: HashMap<B, usize>,
}

impl<B: Copy + Eq + Hash> Counts<B> {
    fn from_items<'a, I, T>(items: I) -> Self
    where
        T: BoardItem<Bucket = B> + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut counts = Self {
            active: 0,
            by_bucket: HashMap::new(),
        };
        for item in items {
            counts.add(item.bucket());
        }
        counts
    }

    pub fn bucket(&self, bucket: B) -> usize {
        self.by_bucket.get(&bucket).copied().unwrap_or(0)
    }

    fn add(&mut self, bucket: B) {
        self.active += 1;
        *self.by_bucket.entry(bucket).or_insert(0) += 1;
    }

    fn remove(&mut self, bucket: B) {
        self.active = self.active.saturating_sub(1);
        if let Some(count) = self.by_bucket.get_mut(&bucket) {
            *count = count.saturating_sub(1);
        }
    }

    fn shift(&mut self, from: B, to: B) {
        self.remove(from);
        self.add(to);
    }
}

/// Lifecycle of the most recent completion, as the undo toast renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoState {
    Pending,
    Committed,
    Reverted,
}

/// Commit handed to the caller for persistence. Keeps the item's original
/// active index so a failed server call can restore it exactly.
#[derive(Debug, Clone)]
pub struct CommitEffect<T> {
    item: T,
    index: usize,
}

impl<T: BoardItem> CommitEffect<T> {
    pub fn item(&self) -> &T {
        &self.item
    }
}

/// Rollback token for an optimistic bucket change.
#[derive(Debug, Clone)]
pub struct BucketChange<B> {
    id: Uuid,
    prior: B,
}

/// Rollback token for an optimistic reorder.
#[derive(Debug, Clone)]
pub struct ReorderChange<T> {
    pub pairs: Vec<(Uuid, i64)>,
    prior: Vec<T>,
}

#[derive(Debug, Clone)]
struct PendingCompletion<T> {
    item: T,
    index: usize,
    deadline: Instant,
}

#[derive(Debug, Clone)]
pub struct BoardStore<T: BoardItem> {
    grace: Duration,
    active: Vec<T>,
    completed: Vec<T>,
    pending: Option<PendingCompletion<T>>,
    undo_state: Option<UndoState>,
    counts: Counts<T::Bucket>,
    notices: Vec<String>,
}

impl<T: BoardItem> BoardStore<T> {
    pub fn new(active: Vec<T>, completed: Vec<T>) -> Self {
        Self::with_grace(active, completed, DEFAULT_GRACE)
    }

    pub fn with_grace(active: Vec<T>, completed: Vec<T>, grace: Duration) -> Self {
        let counts = Counts::from_items(active.iter());
        Self {
            grace,
            active,
            completed,
            pending: None,
            undo_state: None,
            counts,
            notices: Vec::new(),
        }
    }

    pub fn active(&self) -> &[T] {
        &self.active
    }

    pub fn completed(&self) -> &[T] {
        &self.completed
    }

    pub fn counts(&self) -> &Counts<T::Bucket> {
        &self.counts
    }

    pub fn pending_item(&self) -> Option<&T> {
        self.pending.as_ref().map(|pending| &pending.item)
    }

    /// Where the most recent completion toast stands, if any.
    pub fn undo_state(&self) -> Option<UndoState> {
        self.undo_state
    }

    /// Error notices surfaced to the user, oldest first.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Full recount from the active list. Only used by tests to check the
    /// delta-maintained counters never drift.
    pub fn recount(&self) -> Counts<T::Bucket> {
        Counts::from_items(self.active.iter())
    }

    /// Starts an undo window for `id`: the item leaves the active list and
    /// the counters immediately, and the commit is deferred until the grace
    /// period elapses. If another window is still open it is force-committed
    /// first and its effect is returned — at most one window exists.
    pub fn complete(&mut self, id: Uuid, now: Instant) -> Option<CommitEffect<T>> {
        let index = self.active.iter().position(|item| item.id() == id)?;

        let forced = self.pending.take().map(|previous| {
            tracing::debug!("force-committing pending completion to open a new undo window");
            self.push_completed(previous.item.clone());
            CommitEffect {
                item: previous.item,
                index: previous.index,
            }
        });

        let item = self.active.remove(index);
        self.counts.remove(item.bucket());
        self.pending = Some(PendingCompletion {
            item,
            index,
            deadline: now + self.grace,
        });
        self.undo_state = Some(UndoState::Pending);

        forced
    }

    /// Commits the pending window once its deadline has passed.
    pub fn tick(&mut self, now: Instant) -> Option<CommitEffect<T>> {
        match &self.pending {
            Some(pending) if now >= pending.deadline => {
                let pending = self.pending.take().expect("pending checked above");
                self.push_completed(pending.item.clone());
                self.undo_state = Some(UndoState::Committed);
                Some(CommitEffect {
                    item: pending.item,
                    index: pending.index,
                })
            }
            _ => None,
        }
    }

    /// Reverts a still-open window: the item returns to its original place
    /// with its original counters and no server call is made.
    pub fn undo(&mut self, now: Instant) -> bool {
        match &self.pending {
            Some(pending) if now < pending.deadline => {
                let pending = self.pending.take().expect("pending checked above");
                let index = pending.index.min(self.active.len());
                self.counts.add(pending.item.bucket());
                self.active.insert(index, pending.item);
                self.undo_state = Some(UndoState::Reverted);
                true
            }
            _ => false,
        }
    }

    /// The server rejected a commit: restore the item to the active list and
    /// surface one error notice.
    pub fn commit_failed(&mut self, effect: CommitEffect<T>, message: &str) {
        self.completed.retain(|item| item.id() != effect.item.id());
        let index = effect.index.min(self.active.len());
        self.counts.add(effect.item.bucket());
        self.active.insert(index, effect.item);
        self.undo_state = None;
        self.notices.push(message.to_string());
    }

    /// Reopens a completed item, prepending it to the active list.
    pub fn reopen(&mut self, id: Uuid) -> bool {
        let Some(index) = self.completed.iter().position(|item| item.id() == id) else {
            return false;
        };
        let item = self.completed.remove(index);
        self.counts.add(item.bucket());
        self.active.insert(0, item);
        true
    }

    /// Rolls a failed reopen back into the completed list.
    pub fn reopen_failed(&mut self, id: Uuid, message: &str) {
        if let Some(index) = self.active.iter().position(|item| item.id() == id) {
            let item = self.active.remove(index);
            self.counts.remove(item.bucket());
            self.completed.insert(0, item);
        }
        self.notices.push(message.to_string());
    }

    /// Optimistically moves an item to a new bucket and returns the rollback
    /// token. The counters shift in the same tick.
    pub fn update_bucket(&mut self, id: Uuid, bucket: T::Bucket) -> Option<BucketChange<T::Bucket>> {
        let item = self.active.iter_mut().find(|item| item.id() == id)?;
        let prior = item.bucket();
        item.set_bucket(bucket);
        self.counts.shift(prior, bucket);
        Some(BucketChange { id, prior })
    }

    /// Restores a failed bucket change and surfaces one error notice.
    pub fn rollback_bucket(&mut self, change: BucketChange<T::Bucket>, message: &str) {
        if let Some(item) = self.active.iter_mut().find(|item| item.id() == change.id) {
            let current = item.bucket();
            item.set_bucket(change.prior);
            self.counts.shift(current, change.prior);
        }
        self.notices.push(message.to_string());
    }

    fn push_completed(&mut self, item: T) {
        // Most recently completed first.
        self.completed.insert(0, item);
    }
}

impl<T: BoardItem + Sequenced> BoardStore<T> {
    /// Optimistic drag-reorder of the active list. Returns the id-to-position
    /// batch to persist plus the prior ordering for rollback.
    pub fn reorder(&mut self, src: usize, dst: usize) -> Result<ReorderChange<T>, OrderError> {
        let prior = self.active.clone();
        let pairs = reorder::reorder(&mut self.active, src, dst)?;
        Ok(ReorderChange { pairs, prior })
    }

    /// Restores the pre-reorder ordering and surfaces one error notice.
    pub fn rollback_reorder(&mut self, change: ReorderChange<T>, message: &str) {
        self.active = change.prior;
        self.notices.push(message.to_string());
    }
}
