use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::listeners::{dispatch, Listeners};
use crate::{Notify, Observable, ObservableValue, Scope, Subscription, WeakObservable};

/// Payload-less change signal, typically owned by a view-model and used
/// as the parent of its fields.
#[derive(Clone, Default)]
pub struct Notifier {
	body: Rc<NotifierBody>,
}

#[derive(Default)]
struct NotifierBody {
	listeners: RefCell<Listeners<dyn Fn()>>,
}

impl Notifier {
	pub fn new() -> Self {
		Default::default()
	}

	/// A new value that notifies this notifier on every accepted change.
	pub fn child<T>(&self, value: T) -> ObservableValue<T>
	where
		T: Clone + PartialEq + 'static,
	{
		ObservableValue::new(value).parent(self)
	}

	pub fn observe(&self, scope: &(impl Scope + ?Sized), listener: impl Fn() + 'static) {
		if !scope.is_active() {
			return;
		}

		scope.add(self.on_change(listener));
	}

	pub fn listener_count(&self) -> usize {
		self.body.listeners.borrow().len()
	}
}

impl Notify for NotifierBody {
	fn notify_change(&self) {
		dispatch(&self.listeners, |listener| listener());
	}
}

impl Observable for Notifier {
	fn notify_change(&self) {
		self.body.notify_change()
	}

	fn on_change(&self, listener: impl Fn() + 'static) -> Subscription {
		let id = self.body.listeners.borrow_mut().insert(Rc::new(listener));
		let this = Rc::downgrade(&self.body);
		Subscription::new(move || {
			if let Some(body) = this.upgrade() {
				body.listeners.borrow_mut().remove(id);
			}
		})
	}

	fn weak_observable(&self) -> WeakObservable {
		WeakObservable::new(Rc::downgrade(&self.body) as Weak<dyn Notify>)
	}
}

impl std::fmt::Debug for Notifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Notifier")
			.field("listeners", &self.listener_count())
			.finish()
	}
}
