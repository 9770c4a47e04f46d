//! Live listings of a user's objects.
//!
//! Every view is rebuilt from the latest full snapshot.

use crate::error::DriveResult;
use crate::schema::{ObjectState, StoredObject};
use sealdrive_store::{StoredDocument, Subscription};
use tracing::warn;

/// A live, owner-scoped view of one lifecycle state.
#[derive(Debug)]
pub struct Listing {
    subscription: Subscription,
    state: ObjectState,
}

impl Listing {
    pub(crate) fn new(subscription: Subscription, state: ObjectState) -> Self {
        Self {
            subscription,
            state,
        }
    }

    pub fn state(&self) -> ObjectState {
        self.state
    }

    /// Objects in the latest snapshot, newest first.
    pub fn current(&self) -> Vec<StoredObject> {
        decode_snapshot(&self.subscription.latest(), self.state)
    }

    /// Waits for the next change and returns the rebuilt view.
    pub async fn next(&mut self) -> DriveResult<Vec<StoredObject>> {
        let snapshot = self.subscription.changed().await?;
        Ok(decode_snapshot(&snapshot, self.state))
    }

    /// Stops listening.
    pub fn cancel(self) {
        self.subscription.cancel();
    }
}

/// Decodes a snapshot, skipping undecodable records, newest first.
pub fn decode_snapshot(snapshot: &[StoredDocument], state: ObjectState) -> Vec<StoredObject> {
    let mut objects: Vec<StoredObject> = snapshot
        .iter()
        .filter_map(|doc| match StoredObject::from_stored(doc) {
            Ok(object) => Some(object),
            Err(e) => {
                warn!(object_id = %doc.id, %state, error = %e, "skipping undecodable record");
                None
            }
        })
        .collect();
    sort_newest_first(&mut objects);
    objects
}

/// Sorts by creation time, newest first. Ties break on identity.
pub fn sort_newest_first(objects: &mut [StoredObject]) {
    objects.sort_by(|a, b| {
        b.record
            .created_at
            .cmp(&a.record.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// The first `limit` objects of an already sorted view.
pub fn recent(objects: &[StoredObject], limit: usize) -> Vec<StoredObject> {
    objects.iter().take(limit).cloned().collect()
}

/// Starred objects, order preserved.
pub fn starred(objects: &[StoredObject]) -> Vec<StoredObject> {
    objects
        .iter()
        .filter(|o| o.record.starred)
        .cloned()
        .collect()
}
