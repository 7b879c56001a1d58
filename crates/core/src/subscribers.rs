//! Connectivity subscriber registry.
//!
//! Subscribers live in an [`IndexMap`] keyed by [`HandlerId`], so delivery
//! follows registration order and removal is O(1). Two registration styles:
//!
//! - Owned: the registry keeps the listener alive; the returned
//!   [`Subscription`] removes it on drop unless [`Subscription::detach`]ed.
//! - Weak: the registry only holds a [`Weak`] reference; the caller owns the
//!   listener and the entry disappears once the listener is dropped.
//!
//! Delivery is best effort. Each listener runs inside its own failure
//! boundary: an `Err` or a panic is logged and recorded, and delivery moves
//! on to the next listener.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::Mutex;
use showctl_protocol::ConnectivityState;

/// Unique identifier for subscribers.
pub type HandlerId = u64;

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

/// Returns a new globally-unique handler ID.
pub fn next_handler_id() -> HandlerId {
	NEXT_HANDLER_ID.fetch_add(1, Ordering::SeqCst)
}

/// Error a listener may report back; it is logged, never propagated.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

pub type ListenerResult = Result<(), ListenerError>;

/// Receives the connectivity state after network operations.
pub trait StatusListener: Send + Sync {
	fn on_status(&self, state: ConnectivityState) -> ListenerResult;
}

impl<F> StatusListener for F
where
	F: Fn(ConnectivityState) -> ListenerResult + Send + Sync,
{
	fn on_status(&self, state: ConnectivityState) -> ListenerResult {
		self(state)
	}
}

enum Entry {
	Owned(Arc<dyn StatusListener>),
	Weak(Weak<dyn StatusListener>),
}

impl Entry {
	fn upgrade(&self) -> Option<Arc<dyn StatusListener>> {
		match self {
			Entry::Owned(listener) => Some(Arc::clone(listener)),
			Entry::Weak(weak) => weak.upgrade(),
		}
	}
}

type EntryMap = Arc<Mutex<IndexMap<HandlerId, Entry>>>;

/// A listener that failed during one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
	pub handler_id: HandlerId,
	pub reason: String,
}

/// Ordered set of connectivity subscribers.
#[derive(Default)]
pub struct Subscribers {
	entries: EntryMap,
}

impl Subscribers {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers an owned listener.
	pub fn add(&self, listener: Arc<dyn StatusListener>) -> Subscription {
		let id = next_handler_id();
		self.entries.lock().insert(id, Entry::Owned(listener));
		Subscription::from_entries(id, &self.entries)
	}

	/// Registers a listener without taking ownership of it.
	pub fn add_weak(&self, listener: Weak<dyn StatusListener>) -> HandlerId {
		let id = next_handler_id();
		self.entries.lock().insert(id, Entry::Weak(listener));
		id
	}

	/// Removes a listener by ID. Returns `false` if it was not registered.
	pub fn remove(&self, id: HandlerId) -> bool {
		self.entries.lock().shift_remove(&id).is_some()
	}

	/// Number of live listeners.
	pub fn len(&self) -> usize {
		self.entries.lock().values().filter(|entry| entry.upgrade().is_some()).count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Delivers `state` to every live listener in registration order.
	///
	/// Dead weak entries are pruned. The registry lock is released before any
	/// listener runs, so listeners may register or drop subscriptions.
	pub fn notify(&self, state: ConnectivityState) -> Vec<DeliveryFailure> {
		let listeners: Vec<(HandlerId, Arc<dyn StatusListener>)> = {
			let mut map = self.entries.lock();
			map.retain(|_, entry| entry.upgrade().is_some());
			map.iter().filter_map(|(id, entry)| entry.upgrade().map(|l| (*id, l))).collect()
		};

		let mut failures = Vec::new();
		for (id, listener) in listeners {
			let reason = match catch_unwind(AssertUnwindSafe(|| listener.on_status(state))) {
				Ok(Ok(())) => continue,
				Ok(Err(e)) => e.to_string(),
				Err(panic) => format!("panicked: {}", panic_message(panic.as_ref())),
			};
			tracing::error!(handler_id = id, %state, error = %reason, "Status subscriber error");
			failures.push(DeliveryFailure { handler_id: id, reason });
		}
		failures
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
	if let Some(msg) = payload.downcast_ref::<&str>() {
		msg
	} else if let Some(msg) = payload.downcast_ref::<String>() {
		msg
	} else {
		"non-string panic payload"
	}
}

/// RAII handle that unregisters an owned subscriber on drop.
///
/// Holds a weak reference to the registry, so dropping after the owning
/// [`Session`] is gone is safe (becomes a no-op).
///
/// [`Session`]: crate::Session
#[must_use = "dropping a Subscription unregisters the callback; call detach() to keep it"]
pub struct Subscription {
	id: HandlerId,
	dropper: Option<Arc<dyn Fn(HandlerId) + Send + Sync>>,
}

impl Subscription {
	/// Creates a subscription with a custom dropper function.
	pub fn new(id: HandlerId, dropper: Arc<dyn Fn(HandlerId) + Send + Sync>) -> Self {
		Self { id, dropper: Some(dropper) }
	}

	fn from_entries(id: HandlerId, entries: &EntryMap) -> Self {
		let weak = Arc::downgrade(entries);
		let dropper = Arc::new(move |id: HandlerId| {
			if let Some(map) = weak.upgrade() {
				map.lock().shift_remove(&id);
			}
		});
		Self::new(id, dropper)
	}

	/// Returns this subscription's handler ID.
	pub fn id(&self) -> HandlerId {
		self.id
	}

	/// Explicitly unsubscribes. Equivalent to dropping.
	pub fn unsubscribe(mut self) {
		if let Some(dropper) = self.dropper.take() {
			(dropper)(self.id);
		}
	}

	/// Keeps the subscriber registered for the life of the session.
	pub fn detach(mut self) -> HandlerId {
		self.dropper = None;
		self.id
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(dropper) = self.dropper.take() {
			(dropper)(self.id);
		}
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription")
			.field("id", &self.id)
			.field("active", &self.dropper.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicUsize;

	use super::*;

	fn counter() -> (Arc<AtomicUsize>, Arc<dyn StatusListener>) {
		let count = Arc::new(AtomicUsize::new(0));
		let seen = Arc::clone(&count);
		let listener: Arc<dyn StatusListener> = Arc::new(move |_state: ConnectivityState| -> ListenerResult {
			seen.fetch_add(1, Ordering::SeqCst);
			Ok(())
		});
		(count, listener)
	}

	#[test]
	fn test_handler_id_increments() {
		let id1 = next_handler_id();
		let id2 = next_handler_id();
		assert!(id2 > id1);
	}

	#[test]
	fn delivers_in_registration_order() {
		let subs = Subscribers::new();
		let order = Arc::new(Mutex::new(Vec::new()));

		let mut handles = Vec::new();
		for tag in ["first", "second", "third"] {
			let order = Arc::clone(&order);
			handles.push(subs.add(Arc::new(move |_state: ConnectivityState| -> ListenerResult {
				order.lock().push(tag);
				Ok(())
			})));
		}

		assert!(subs.notify(ConnectivityState::Connected).is_empty());
		assert_eq!(*order.lock(), ["first", "second", "third"]);
	}

	#[test]
	fn failing_listener_does_not_stop_delivery() {
		let subs = Subscribers::new();
		let bad = subs.add(Arc::new(|_state: ConnectivityState| -> ListenerResult { Err("display gone".into()) }));
		let boom = subs.add(Arc::new(|_state: ConnectivityState| -> ListenerResult { panic!("widget crashed") }));
		let (count, listener) = counter();
		let _good = subs.add(listener);

		let failures = subs.notify(ConnectivityState::Disconnected);

		assert_eq!(count.load(Ordering::SeqCst), 1);
		assert_eq!(failures.len(), 2);
		assert_eq!(failures[0].handler_id, bad.id());
		assert_eq!(failures[0].reason, "display gone");
		assert_eq!(failures[1].handler_id, boom.id());
		assert!(failures[1].reason.contains("widget crashed"));

		// Registry still usable afterwards.
		subs.notify(ConnectivityState::Connected);
		assert_eq!(count.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn subscription_drop_unregisters() {
		let subs = Subscribers::new();
		let (count, listener) = counter();
		{
			let _sub = subs.add(listener);
			assert_eq!(subs.len(), 1);
		}
		assert!(subs.is_empty());
		subs.notify(ConnectivityState::Connected);
		assert_eq!(count.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn detached_subscription_stays_registered() {
		let subs = Subscribers::new();
		let (count, listener) = counter();
		let id = subs.add(listener).detach();

		subs.notify(ConnectivityState::Connected);
		assert_eq!(count.load(Ordering::SeqCst), 1);
		assert!(subs.remove(id));
		assert!(!subs.remove(id));
	}

	#[test]
	fn weak_listener_is_not_kept_alive() {
		let subs = Subscribers::new();
		let (count, listener) = counter();
		subs.add_weak(Arc::downgrade(&listener));

		subs.notify(ConnectivityState::Connected);
		assert_eq!(count.load(Ordering::SeqCst), 1);

		drop(listener);
		assert!(subs.is_empty());
		assert!(subs.notify(ConnectivityState::Connected).is_empty());
		assert_eq!(count.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn subscription_outliving_registry_is_safe() {
		let subs = Subscribers::new();
		let (_count, listener) = counter();
		let sub = subs.add(listener);
		drop(subs);
		drop(sub);
	}

	#[test]
	fn listener_may_subscribe_during_delivery() {
		let subs = Arc::new(Subscribers::new());
		let inner = Arc::clone(&subs);
		let added = Arc::new(Mutex::new(Vec::new()));
		let sink = Arc::clone(&added);
		let _sub = subs.add(Arc::new(move |_state: ConnectivityState| -> ListenerResult {
			let (_c, l) = counter();
			sink.lock().push(inner.add(l).detach());
			Ok(())
		}));

		subs.notify(ConnectivityState::Connected);
		assert_eq!(added.lock().len(), 1);
		assert_eq!(subs.len(), 2);
	}
}
