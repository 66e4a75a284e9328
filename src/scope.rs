use std::cell::RefCell;
use std::rc::Rc;

use crate::Subscription;

/// A lifetime boundary that owns subscriptions and tears them down when
/// it ends.
pub trait Scope {
	/// Take ownership of `subscription`. An inactive scope tears it down
	/// immediately.
	fn add(&self, subscription: Subscription);

	fn is_active(&self) -> bool;
}

/// Composite of subscriptions that can be cleared and reused, or disposed
/// for good.
#[derive(Clone, Default)]
pub struct Disposables {
	body: Rc<RefCell<DisposablesInner>>,
}

#[derive(Default)]
struct DisposablesInner {
	disposed: bool,
	subscriptions: Vec<Subscription>,
}

impl Disposables {
	pub fn new() -> Self {
		Default::default()
	}

	/// Tear down every current member. New members are still accepted.
	pub fn clear(&self) {
		let subscriptions = std::mem::take(&mut self.body.borrow_mut().subscriptions);
		tracing::trace!(count = subscriptions.len(), "disposables cleared");
		teardown(subscriptions);
	}

	/// Tear down every current member and every member added later.
	pub fn dispose(&self) {
		let subscriptions = {
			let mut inner = self.body.borrow_mut();
			if inner.disposed {
				return;
			}
			inner.disposed = true;
			std::mem::take(&mut inner.subscriptions)
		};

		tracing::trace!(count = subscriptions.len(), "disposables disposed");
		teardown(subscriptions);
	}

	pub fn is_disposed(&self) -> bool {
		self.body.borrow().disposed
	}

	pub fn len(&self) -> usize {
		self.body.borrow().subscriptions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl Scope for Disposables {
	fn add(&self, subscription: Subscription) {
		let mut inner = self.body.borrow_mut();
		if inner.disposed {
			std::mem::drop(inner);
			subscription.unsubscribe();
			return;
		}

		inner.subscriptions.push(subscription);
	}

	fn is_active(&self) -> bool {
		!self.is_disposed()
	}
}

impl std::fmt::Debug for Disposables {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Disposables")
			.field("len", &self.len())
			.field("disposed", &self.is_disposed())
			.finish()
	}
}

/// The lifetime of a UI component or view-model. Once [`Lifecycle::end`]
/// is called, everything bound to it is unsubscribed.
#[derive(Clone, Default, Debug)]
pub struct Lifecycle {
	members: Disposables,
}

impl Lifecycle {
	pub fn new() -> Self {
		Default::default()
	}

	/// Register a callback to run when this lifecycle ends.
	pub fn on_end(&self, callback: impl FnOnce() + 'static) {
		self.add(Subscription::new(callback));
	}

	pub fn end(&self) {
		self.members.dispose();
	}

	pub fn is_ended(&self) -> bool {
		self.members.is_disposed()
	}
}

impl Scope for Lifecycle {
	fn add(&self, subscription: Subscription) {
		self.members.add(subscription)
	}

	fn is_active(&self) -> bool {
		!self.is_ended()
	}
}

fn teardown(subscriptions: Vec<Subscription>) {
	for subscription in subscriptions {
		subscription.unsubscribe();
	}
}
