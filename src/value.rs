use std::cell::RefCell;
use std::fmt::{Debug, Display};
use std::rc::{Rc, Weak};

use crate::formatted::Formatted;
use crate::listeners::{dispatch, Listeners};
use crate::{Notify, Observable, Scope, Subscription, WeakObservable};

type Listener<T> = dyn Fn(&T);
type Transform<T> = Rc<dyn Fn(T) -> T>;
type Predicate<T> = Rc<dyn Fn(&T, &T) -> bool>;
type PostSetter<T> = Rc<dyn Fn(&T, &T)>;

/// A mutable single-value cell with synchronous change notification.
///
/// Every accepted [`ObservableValue::set`] runs the same pipeline:
///
/// 1. the pre-setter transforms the incoming value into a candidate;
/// 2. unless forced, the acceptance predicate sees `(current, candidate)`
///    and may reject the change (default: `current != candidate`);
/// 3. the candidate is stored;
/// 4. every listener is called with [`ObservableValue::get`], in
///    registration order;
/// 5. the post-setter sees `(candidate, previous)`;
/// 6. the parent, if any, is notified. Its value is left alone.
///
/// Cloning produces another handle to the same cell. Handles are `!Send`,
/// which pins all writes to the owning thread. Listeners and hooks may
/// re-enter the value; a hook that panics unwinds through `set`.
pub struct ObservableValue<T> {
	body: Rc<ValueBody<T>>,
}

/// Non-owning handle to an [`ObservableValue`].
pub struct WeakValue<T> {
	body: Weak<ValueBody<T>>,
}

struct ValueBody<T> {
	value: RefCell<T>,
	listeners: RefCell<Listeners<Listener<T>>>,
	inner: RefCell<ValueInner<T>>,
}

struct ValueInner<T> {
	name: Option<&'static str>,
	hooks: Hooks<T>,
	parent: Option<WeakObservable>,
	/// Listeners installed on other values on behalf of this one, keyed by
	/// the value they listen to. Released together with this value.
	links: Vec<(WeakObservable, Subscription)>,
}

struct Hooks<T> {
	pre_setter: Option<Transform<T>>,
	pre_getter: Option<Transform<T>>,
	accept_change: Predicate<T>,
	post_setter: Option<PostSetter<T>>,
}

impl<T> Clone for Hooks<T> {
	fn clone(&self) -> Self {
		Hooks {
			pre_setter: self.pre_setter.clone(),
			pre_getter: self.pre_getter.clone(),
			accept_change: self.accept_change.clone(),
			post_setter: self.post_setter.clone(),
		}
	}
}

impl<T> Clone for ObservableValue<T> {
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

impl<T> Clone for WeakValue<T> {
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

impl<T> Default for ObservableValue<T>
where
	T: Default + Clone + PartialEq + 'static,
{
	fn default() -> Self {
		ObservableValue::new(Default::default())
	}
}

impl<T> ObservableValue<T>
where
	T: Clone + 'static,
{
	pub fn new(value: T) -> Self
	where
		T: PartialEq,
	{
		ObservableValue {
			body: Rc::new(ValueBody {
				value: RefCell::new(value),
				listeners: RefCell::new(Listeners::new()),
				inner: RefCell::new(ValueInner {
					name: None,
					hooks: Hooks {
						pre_setter: None,
						pre_getter: None,
						accept_change: Rc::new(|current: &T, candidate: &T| current != candidate),
						post_setter: None,
					},
					parent: None,
					links: Vec::new(),
				}),
			}),
		}
	}

	/// The current value with the pre-getter applied.
	#[inline]
	pub fn get(&self) -> T {
		self.body.get()
	}

	/// Set a new value. Returns `false` when the acceptance predicate
	/// rejected it, in which case nothing was stored or notified.
	#[inline]
	pub fn set(&self, value: T) -> bool {
		self.body.set(value, false)
	}

	/// Set a new value, bypassing the acceptance predicate.
	#[inline]
	pub fn force_update(&self, value: T) -> bool {
		self.body.set(value, true)
	}

	#[inline]
	pub fn set_with(&self, value: T, force: bool) -> bool {
		self.body.set(value, force)
	}

	/// Set a new value and return what [`ObservableValue::get`] reported
	/// before the call, whether or not the change was accepted.
	pub fn replace(&self, value: T) -> T {
		let previous = self.get();
		self.set(value);
		previous
	}

	/// Register a listener that receives the value after every accepted
	/// change.
	pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
		let id = self.body.listeners.borrow_mut().insert(Rc::new(listener));
		let this = Rc::downgrade(&self.body);
		Subscription::new(move || {
			if let Some(body) = this.upgrade() {
				body.listeners.borrow_mut().remove(id);
			}
		})
	}

	/// Listen until `scope` ends. Does nothing if the scope is already over.
	pub fn observe(&self, scope: &(impl Scope + ?Sized), listener: impl Fn(&T) + 'static) {
		if !scope.is_active() {
			return;
		}

		scope.add(self.subscribe(listener));
	}

	/// Listen for as long as this value exists.
	pub fn observe_forever(&self, listener: impl Fn(&T) + 'static) {
		self.subscribe(listener).forget();
	}

	pub fn listener_count(&self) -> usize {
		self.body.listeners.borrow().len()
	}

	pub fn downgrade(&self) -> WeakValue<T> {
		WeakValue {
			body: Rc::downgrade(&self.body),
		}
	}

	pub fn pre_setter(self, setter: impl Fn(T) -> T + 'static) -> Self {
		self.body.inner.borrow_mut().hooks.pre_setter = Some(Rc::new(setter));
		self
	}

	pub fn pre_getter(self, getter: impl Fn(T) -> T + 'static) -> Self {
		self.body.inner.borrow_mut().hooks.pre_getter = Some(Rc::new(getter));
		self
	}

	/// React to an accepted change with `(new, previous)`.
	pub fn post_setter(self, reaction: impl Fn(&T, &T) + 'static) -> Self {
		self.body.inner.borrow_mut().hooks.post_setter = Some(Rc::new(reaction));
		self
	}

	/// Replace the acceptance predicate. It receives `(current, candidate)`.
	pub fn accept_change(self, predicate: impl Fn(&T, &T) -> bool + 'static) -> Self {
		self.body.inner.borrow_mut().hooks.accept_change = Rc::new(predicate);
		self
	}

	pub fn accept_all(self) -> Self {
		self.accept_change(|_, _| true)
	}

	/// Notify `parent` after every accepted change of this value.
	pub fn parent(self, parent: &impl Observable) -> Self {
		self.body.inner.borrow_mut().parent = Some(parent.weak_observable());
		self
	}

	/// Label used in change logs.
	pub fn named(self, name: &'static str) -> Self {
		self.body.inner.borrow_mut().name = Some(name);
		self
	}

	/// Keep this value and `other` equal in both directions.
	///
	/// Each side forwards only when the other side differs, which ends the
	/// ping-pong after one round trip. Neither side keeps the other alive,
	/// and dropping either side removes the forwarder on the survivor.
	pub fn sync_with(self, other: &ObservableValue<T>) -> Self
	where
		T: PartialEq,
	{
		let to_other = forward(&self, other.downgrade(), |_| true);
		let to_self = forward(other, self.downgrade(), |_| true);
		other.hold(self.weak_observable(), to_other);
		self.hold(other.weak_observable(), to_self);
		self
	}

	/// A new value that notifies this one on every accepted change.
	pub fn child<U>(&self, value: U) -> ObservableValue<U>
	where
		U: Clone + PartialEq + 'static,
	{
		ObservableValue::new(value).parent(self)
	}

	/// Copy every change of `source` into this value until `scope` ends.
	pub fn follow(self, source: &ObservableValue<T>, scope: &(impl Scope + ?Sized)) -> Self
	where
		T: PartialEq,
	{
		self.follow_if(source, scope, |_| true)
	}

	/// Like [`ObservableValue::follow`], but only for values accepted by
	/// `filter`.
	pub fn follow_if(
		self,
		source: &ObservableValue<T>,
		scope: &(impl Scope + ?Sized),
		filter: impl Fn(&T) -> bool + 'static,
	) -> Self
	where
		T: PartialEq,
	{
		if scope.is_active() {
			scope.add(forward(source, self.downgrade(), filter));
		}
		self
	}

	/// View this value through a formatter/parser pair.
	pub fn formatted<G: 'static>(
		self,
		format: impl Fn(&T) -> G + 'static,
		parse: impl Fn(G) -> T + 'static,
	) -> Formatted<T, G> {
		Formatted::from_value(self, format, parse)
	}
}

impl<T> ObservableValue<T> {
	fn hold(&self, source: WeakObservable, subscription: Subscription) {
		let mut inner = self.body.inner.borrow_mut();
		inner.links.retain(|(source, _)| source.is_alive());
		inner.links.push((source, subscription));
	}
}

fn forward<T>(
	source: &ObservableValue<T>,
	target: WeakValue<T>,
	filter: impl Fn(&T) -> bool + 'static,
) -> Subscription
where
	T: Clone + PartialEq + 'static,
{
	source.subscribe(move |value| {
		if !filter(value) {
			return;
		}

		if let Some(target) = target.upgrade() {
			if target.get() != *value {
				target.set(value.clone());
			}
		}
	})
}

impl<T> ValueBody<T>
where
	T: Clone + 'static,
{
	fn get(&self) -> T {
		let value = self.value.borrow().clone();
		let getter = self.inner.borrow().hooks.pre_getter.clone();
		match getter {
			Some(getter) => getter(value),
			None => value,
		}
	}

	fn set(&self, value: T, force: bool) -> bool {
		let (hooks, name) = {
			let inner = self.inner.borrow();
			(inner.hooks.clone(), inner.name)
		};

		let previous = self.get();
		let candidate = match &hooks.pre_setter {
			Some(setter) => setter(value),
			None => value,
		};

		if !force && !(hooks.accept_change)(&previous, &candidate) {
			tracing::trace!(name = name.unwrap_or("<unnamed>"), "change rejected");
			return false;
		}

		let stored = candidate.clone();
		let replaced = std::mem::replace(&mut *self.value.borrow_mut(), stored);
		std::mem::drop(replaced);

		self.notify();

		if let Some(post_setter) = &hooks.post_setter {
			post_setter(&candidate, &previous);
		}

		if let Some(name) = name {
			tracing::debug!(name, forced = force, "value changed");
		}

		let parent = self.inner.borrow().parent.clone();
		if let Some(parent) = parent {
			parent.notify_change();
		}

		true
	}

	fn notify(&self) {
		dispatch(&self.listeners, |listener| listener(&self.get()));
	}
}

impl<T: Clone + 'static> Notify for ValueBody<T> {
	fn notify_change(&self) {
		self.notify()
	}
}

impl<T> Observable for ObservableValue<T>
where
	T: Clone + 'static,
{
	fn notify_change(&self) {
		self.body.notify()
	}

	fn on_change(&self, listener: impl Fn() + 'static) -> Subscription {
		self.subscribe(move |_| listener())
	}

	fn weak_observable(&self) -> WeakObservable {
		WeakObservable::new(Rc::downgrade(&self.body) as Weak<dyn Notify>)
	}
}

impl<T> WeakValue<T> {
	pub fn upgrade(&self) -> Option<ObservableValue<T>> {
		self.body.upgrade().map(|body| ObservableValue { body })
	}
}

impl<T> Display for ObservableValue<T>
where
	T: Display + Clone + 'static,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		Display::fmt(&self.get(), f)
	}
}

impl<T> Debug for ObservableValue<T>
where
	T: Debug + Clone + 'static,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		Debug::fmt(&self.get(), f)
	}
}
