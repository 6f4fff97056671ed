//! Volatile in-memory storage for posts and campaigns.
//!
//! Every entity kind lives in its own [`Collection`], an insertion-ordered map
//! guarded by its own lock. Nothing survives a restart.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::route::{campaign::model::Campaign, post::model::Post};

/// An entity that can be kept in a [`Collection`].
pub trait Record: Clone {
	type Status;

	fn id(&self) -> Uuid;

	fn set_status(&mut self, status: Self::Status);
}

/// A keyed collection that remembers insertion order.
///
/// The lock is only held for the duration of a single operation, never
/// across an `.await`.
#[derive(Debug)]
pub struct Collection<T> {
	records: RwLock<IndexMap<Uuid, T>>,
}

impl<T> Default for Collection<T> {
	fn default() -> Self {
		Self {
			records: RwLock::new(IndexMap::new()),
		}
	}
}

impl<T: Record> Collection<T> {
	/// Returns every record, oldest first.
	pub fn list(&self) -> Vec<T> {
		self.records.read().values().cloned().collect()
	}

	pub fn get(&self, id: Uuid) -> Option<T> {
		self.records.read().get(&id).cloned()
	}

	/// Inserts a record, replacing any record with the same id in place.
	pub fn put(&self, record: T) {
		self.records.write().insert(record.id(), record);
	}

	/// Removes a record, returning whether it existed.
	pub fn delete(&self, id: Uuid) -> bool {
		self.records.write().shift_remove(&id).is_some()
	}

	/// Sets the status of a record and returns the updated record.
	pub fn update_status(&self, id: Uuid, status: T::Status) -> Option<T> {
		let mut records = self.records.write();
		let record = records.get_mut(&id)?;

		record.set_status(status);
		Some(record.clone())
	}
}

/// All collections of the application.
#[derive(Clone, Default)]
pub struct Store {
	/// Standalone posts. Posts created as part of a campaign are only
	/// reachable through their campaign.
	pub posts: Arc<Collection<Post>>,
	pub campaigns: Arc<Collection<Campaign>>,
}
