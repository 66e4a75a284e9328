//! Observable fields with interception hooks and one-shot events.
//!
//! Everything in this crate is single-threaded: handles are `Rc`-based and
//! therefore neither `Send` nor `Sync`, so all mutation and all listener
//! invocations happen on the thread that owns the values.

pub mod macros;

mod event;
mod formatted;
mod listeners;
mod notifier;
mod scope;
mod subscription;
mod value;

use std::rc::Weak;

pub use event::{Action, OneShotEvent};
pub use formatted::Formatted;
pub use notifier::Notifier;
pub use scope::{Disposables, Lifecycle, Scope};
pub use subscription::Subscription;
pub use value::{ObservableValue, WeakValue};

/// Anything that can announce "something changed" without a payload.
///
/// Parent links use this trait: a child value only needs to poke its
/// parent, never to read or write the parent's value.
pub trait Observable {
	/// Fire every change listener without altering the stored value.
	fn notify_change(&self);

	/// Register a listener that does not care about the value itself.
	fn on_change(&self, listener: impl Fn() + 'static) -> Subscription;

	/// A non-owning handle that can be used as a parent link.
	fn weak_observable(&self) -> WeakObservable;
}

pub(crate) trait Notify: 'static {
	fn notify_change(&self);
}

/// Non-owning reference to an [`Observable`].
///
/// Notifying a target that has already been dropped does nothing.
#[derive(Clone)]
pub struct WeakObservable {
	target: Weak<dyn Notify>,
}

impl WeakObservable {
	pub(crate) fn new(target: Weak<dyn Notify>) -> Self {
		WeakObservable { target }
	}

	pub fn notify_change(&self) {
		if let Some(target) = self.target.upgrade() {
			target.notify_change();
		}
	}

	pub fn is_alive(&self) -> bool {
		self.target.strong_count() > 0
	}
}

impl std::fmt::Debug for WeakObservable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WeakObservable")
			.field("alive", &self.is_alive())
			.finish()
	}
}
