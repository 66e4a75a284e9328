use std::cell::RefCell;
use std::rc::Rc;

use crate::{ObservableValue, Scope, Subscription};

/// A single emission. Compared by identity, so two occurrences carrying
/// equal payloads are still two distinct changes of the slot.
struct Occurrence<T> {
	payload: Rc<RefCell<Option<T>>>,
}

impl<T> Occurrence<T> {
	fn new(payload: T) -> Self {
		Occurrence {
			payload: Rc::new(RefCell::new(Some(payload))),
		}
	}

	fn take(&self) -> Option<T> {
		self.payload.borrow_mut().take()
	}

	fn is_pending(&self) -> bool {
		self.payload.borrow().is_some()
	}
}

impl<T> Clone for Occurrence<T> {
	fn clone(&self) -> Self {
		Occurrence {
			payload: self.payload.clone(),
		}
	}
}

impl<T> PartialEq for Occurrence<T> {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.payload, &other.payload)
	}
}

type Slot<T> = ObservableValue<Option<Occurrence<T>>>;

/// An event with a payload that every occurrence hands to exactly one
/// observer call.
///
/// The event is either empty or holds one pending payload. A new
/// occurrence overwrites an undelivered one. Delivery empties the slot
/// before the observer runs, so a payload is never replayed: not to a
/// second observer, and not to observers registered later. A payload that
/// occurs while nobody listens waits for the first registration.
pub struct OneShotEvent<T: 'static> {
	slot: Slot<T>,
}

/// An event without a payload.
pub type Action = OneShotEvent<()>;

impl<T: 'static> Clone for OneShotEvent<T> {
	fn clone(&self) -> Self {
		OneShotEvent {
			slot: self.slot.clone(),
		}
	}
}

impl<T: 'static> Default for OneShotEvent<T> {
	fn default() -> Self {
		OneShotEvent::new()
	}
}

impl<T: 'static> OneShotEvent<T> {
	pub fn new() -> Self {
		OneShotEvent {
			slot: ObservableValue::new(None).accept_all(),
		}
	}

	pub fn occurred(&self, payload: T) {
		self.slot.set(Some(Occurrence::new(payload)));
	}

	pub fn is_pending(&self) -> bool {
		self.slot
			.get()
			.map_or(false, |occurrence| occurrence.is_pending())
	}

	/// Drop the pending payload, if any, without delivering it.
	pub fn clear(&self) {
		self.slot.set(None);
	}

	/// Register `observer` until the returned subscription is released.
	/// A payload that is already pending is delivered right away.
	pub fn subscribe(&self, observer: impl Fn(T) + 'static) -> Subscription {
		let observer: Rc<dyn Fn(T)> = Rc::new(observer);

		let subscription = self.slot.subscribe({
			let slot = self.slot.downgrade();
			let observer = observer.clone();
			move |pending| {
				if let Some(slot) = slot.upgrade() {
					deliver(&slot, pending, &*observer);
				}
			}
		});

		deliver(&self.slot, &self.slot.get(), &*observer);
		subscription
	}

	/// Observe until `scope` ends. Does nothing if the scope is already over.
	pub fn observe(&self, scope: &(impl Scope + ?Sized), observer: impl Fn(T) + 'static) {
		if !scope.is_active() {
			return;
		}

		scope.add(self.subscribe(observer));
	}

	/// Observe for as long as this event exists.
	pub fn observe_forever(&self, observer: impl Fn(T) + 'static) {
		self.subscribe(observer).forget();
	}

	/// Re-emit every occurrence of this event on `target` until `scope`
	/// ends.
	pub fn attach(&self, scope: &(impl Scope + ?Sized), target: &OneShotEvent<T>) {
		let target = target.clone();
		self.observe(scope, move |payload| target.occurred(payload));
	}

	pub fn observer_count(&self) -> usize {
		self.slot.listener_count()
	}
}

impl OneShotEvent<()> {
	pub fn fire(&self) {
		self.occurred(())
	}

	pub fn on_fired(&self, scope: &(impl Scope + ?Sized), action: impl Fn() + 'static) {
		self.observe(scope, move |()| action());
	}
}

fn deliver<T: 'static>(slot: &Slot<T>, pending: &Option<Occurrence<T>>, observer: &dyn Fn(T)) {
	let Some(payload) = pending.as_ref().and_then(Occurrence::take) else {
		return;
	};

	slot.set(None);
	observer(payload);
}

impl<T: 'static> std::fmt::Debug for OneShotEvent<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OneShotEvent")
			.field("pending", &self.is_pending())
			.field("observers", &self.observer_count())
			.finish()
	}
}
