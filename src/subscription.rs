/// RAII registration handle.
///
/// The teardown runs exactly once: on [`Subscription::unsubscribe`], or when
/// the handle is dropped. [`Subscription::forget`] detaches the registration
/// so it lives as long as its source.
#[must_use = "dropping a Subscription immediately unsubscribes it"]
pub struct Subscription {
	teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
	pub fn new(teardown: impl FnOnce() + 'static) -> Self {
		Subscription {
			teardown: Some(Box::new(teardown)),
		}
	}

	/// A subscription with nothing to tear down.
	pub fn empty() -> Self {
		Subscription { teardown: None }
	}

	pub fn is_active(&self) -> bool {
		self.teardown.is_some()
	}

	pub fn unsubscribe(mut self) {
		self.run();
	}

	/// Keep the registration alive forever. Cleanup becomes the caller's
	/// problem.
	pub fn forget(mut self) {
		self.teardown = None;
	}

	fn run(&mut self) {
		if let Some(teardown) = self.teardown.take() {
			teardown();
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.run();
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription")
			.field("active", &self.is_active())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use super::Subscription;

	fn counting() -> (Rc<Cell<u32>>, Subscription) {
		let count = Rc::new(Cell::new(0));
		let subscription = Subscription::new({
			let count = count.clone();
			move || count.set(count.get() + 1)
		});
		(count, subscription)
	}

	#[test]
	fn drop_tears_down_once() {
		let (count, subscription) = counting();
		assert!(subscription.is_active());
		drop(subscription);
		assert_eq!(count.get(), 1);
	}

	#[test]
	fn unsubscribe_does_not_run_twice() {
		let (count, subscription) = counting();
		subscription.unsubscribe();
		assert_eq!(count.get(), 1);
	}

	#[test]
	fn forget_skips_teardown() {
		let (count, subscription) = counting();
		subscription.forget();
		assert_eq!(count.get(), 0);
	}

	#[test]
	fn empty_is_inactive() {
		assert!(!Subscription::empty().is_active());
	}
}
