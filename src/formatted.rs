use std::fmt::{Debug, Display};
use std::ops::Deref;
use std::rc::Rc;

use crate::{Observable, ObservableValue, Subscription, WeakObservable};

/// An [`ObservableValue<S>`] that is also read and written as a `G`.
///
/// Writes through [`Formatted::set_formatted`] are parsed back into `S` and
/// go through the full `set` pipeline of the underlying value.
pub struct Formatted<S, G> {
	value: ObservableValue<S>,
	format: Rc<dyn Fn(&S) -> G>,
	parse: Rc<dyn Fn(G) -> S>,
}

impl<S, G> Clone for Formatted<S, G> {
	fn clone(&self) -> Self {
		Formatted {
			value: self.value.clone(),
			format: self.format.clone(),
			parse: self.parse.clone(),
		}
	}
}

impl<S, G> Formatted<S, G>
where
	S: Clone + 'static,
	G: 'static,
{
	pub fn new(
		value: S,
		format: impl Fn(&S) -> G + 'static,
		parse: impl Fn(G) -> S + 'static,
	) -> Self
	where
		S: PartialEq,
	{
		Self::from_value(ObservableValue::new(value), format, parse)
	}

	pub fn from_value(
		value: ObservableValue<S>,
		format: impl Fn(&S) -> G + 'static,
		parse: impl Fn(G) -> S + 'static,
	) -> Self {
		Formatted {
			value,
			format: Rc::new(format),
			parse: Rc::new(parse),
		}
	}

	pub fn formatted(&self) -> G {
		(self.format)(&self.value.get())
	}

	pub fn set_formatted(&self, value: G) -> bool {
		self.value.set((self.parse)(value))
	}

	/// Subscribe to the formatted representation.
	pub fn subscribe_formatted(&self, listener: impl Fn(G) + 'static) -> Subscription {
		let format = self.format.clone();
		self.value.subscribe(move |value| listener(format(value)))
	}

	pub fn value(&self) -> &ObservableValue<S> {
		&self.value
	}

	pub fn into_value(self) -> ObservableValue<S> {
		self.value
	}
}

impl<S, G> Deref for Formatted<S, G> {
	type Target = ObservableValue<S>;

	fn deref(&self) -> &Self::Target {
		&self.value
	}
}

impl<S, G> Observable for Formatted<S, G>
where
	S: Clone + 'static,
{
	fn notify_change(&self) {
		self.value.notify_change()
	}

	fn on_change(&self, listener: impl Fn() + 'static) -> Subscription {
		self.value.on_change(listener)
	}

	fn weak_observable(&self) -> WeakObservable {
		self.value.weak_observable()
	}
}

impl<S, G> Display for Formatted<S, G>
where
	S: Clone + 'static,
	G: Display + 'static,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		Display::fmt(&self.formatted(), f)
	}
}

impl<S, G> Debug for Formatted<S, G>
where
	S: Clone + Debug + 'static,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Formatted").field(&self.value.get()).finish()
	}
}
