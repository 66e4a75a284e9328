use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

/// Handle of a registered listener. Ids grow monotonically, so ordering by
/// id is the same as ordering by registration.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ListenerId(u64);

pub(crate) struct Listeners<F: ?Sized> {
	next: u64,
	entries: SmallVec<[(ListenerId, Rc<F>); 4]>,
}

impl<F: ?Sized> Default for Listeners<F> {
	fn default() -> Self {
		Listeners::new()
	}
}

impl<F: ?Sized> Listeners<F> {
	pub fn new() -> Self {
		Listeners {
			next: 0,
			entries: SmallVec::new(),
		}
	}

	pub fn insert(&mut self, listener: Rc<F>) -> ListenerId {
		let id = ListenerId(self.next);
		self.next += 1;
		self.entries.push((id, listener));
		id
	}

	pub fn remove(&mut self, id: ListenerId) -> bool {
		let before = self.entries.len();
		self.entries.retain(|(entry, _)| *entry != id);
		before != self.entries.len()
	}

	pub fn contains(&self, id: ListenerId) -> bool {
		self.entries.iter().any(|(entry, _)| *entry == id)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	fn snapshot(&self) -> SmallVec<[(ListenerId, Rc<F>); 4]> {
		self.entries.iter().cloned().collect()
	}
}

/// Call every listener in registration order.
///
/// No borrow is held while a listener runs, so listeners may subscribe,
/// unsubscribe or mutate their source. A listener removed by an earlier
/// one in the same round is skipped.
pub(crate) fn dispatch<F: ?Sized>(listeners: &RefCell<Listeners<F>>, mut call: impl FnMut(&F)) {
	let snapshot = listeners.borrow().snapshot();
	for (id, listener) in snapshot {
		if listeners.borrow().contains(id) {
			call(&*listener);
		}
	}
}
