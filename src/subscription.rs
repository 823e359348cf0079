use smallvec::SmallVec;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// An idempotent, thread-safe cancellation handle.
///
/// `unsubscribe` is total: once any handle variant has been closed, no
/// subscription placed into it afterwards remains open.
pub trait SubscriptionLike {
  fn unsubscribe(&mut self);

  fn is_closed(&self) -> bool;

  /// Erases the concrete handle type.
  fn boxed(self) -> BoxSubscription
  where
    Self: Sized + Send + 'static,
  {
    Box::new(self)
  }
}

pub type BoxSubscription = Box<dyn SubscriptionLike + Send>;

impl<T: SubscriptionLike + ?Sized> SubscriptionLike for Box<T> {
  #[inline]
  fn unsubscribe(&mut self) {
    (**self).unsubscribe()
  }

  #[inline]
  fn is_closed(&self) -> bool {
    (**self).is_closed()
  }
}

/// A subscription with nothing to cancel.
#[derive(Clone, Copy, Default)]
pub struct NopSubscription;

impl SubscriptionLike for NopSubscription {
  #[inline]
  fn unsubscribe(&mut self) {}

  #[inline]
  fn is_closed(&self) -> bool {
    true
  }
}

/// A shared closed flag and nothing more.
#[derive(Clone, Default)]
pub struct BoolSubscription {
  closed: Arc<AtomicBool>,
}

impl BoolSubscription {
  pub fn new() -> Self {
    Self::default()
  }
}

impl SubscriptionLike for BoolSubscription {
  fn unsubscribe(&mut self) {
    self.closed.store(true, Ordering::SeqCst);
  }

  fn is_closed(&self) -> bool {
    self.closed.load(Ordering::SeqCst)
  }
}

type Teardown = Box<dyn FnOnce() + Send>;

/// Runs a teardown action exactly once, on the first `unsubscribe`.
#[derive(Clone)]
pub struct ActionSubscription {
  action: Arc<Mutex<Option<Teardown>>>,
}

impl ActionSubscription {
  pub fn new<F>(action: F) -> Self
  where
    F: FnOnce() + Send + 'static,
  {
    ActionSubscription {
      action: Arc::new(Mutex::new(Some(Box::new(action)))),
    }
  }
}

impl SubscriptionLike for ActionSubscription {
  fn unsubscribe(&mut self) {
    let action = self.action.lock().unwrap().take();
    if let Some(action) = action {
      action();
    }
  }

  fn is_closed(&self) -> bool {
    self.action.lock().unwrap().is_none()
  }
}

#[derive(Default)]
struct SerialInner {
  closed: bool,
  current: Option<BoxSubscription>,
}

/// Holds at most one inner subscription; the current-child slot.
///
/// Replacing the inner closes the previous one. Closing the container
/// closes the inner, and any subscription set afterwards is closed on
/// arrival.
#[derive(Clone, Default)]
pub struct SerialSubscription {
  inner: Arc<Mutex<SerialInner>>,
}

impl SerialSubscription {
  pub fn new() -> Self {
    Self::default()
  }

  /// Installs `subscription`, closing whatever was held before. When the
  /// container is already closed the argument is closed instead.
  pub fn set(&self, subscription: BoxSubscription) {
    let mut subscription = subscription;
    let previous;
    {
      let mut inner = self.inner.lock().unwrap();
      if inner.closed {
        drop(inner);
        subscription.unsubscribe();
        return;
      }
      previous = inner.current.replace(subscription);
    }
    if let Some(mut previous) = previous {
      previous.unsubscribe();
    }
  }

  /// Atomically drops the current inner, then installs the subscription
  /// produced by `make` unless the container closed in the meantime.
  ///
  /// `make` runs with the container lock released, so it may subscribe to
  /// sources that synchronously close this very container.
  pub fn clear_and_set<F>(&self, make: F)
  where
    F: FnOnce() -> BoxSubscription,
  {
    let previous;
    {
      let mut inner = self.inner.lock().unwrap();
      if inner.closed {
        return;
      }
      previous = inner.current.take();
    }
    if let Some(mut previous) = previous {
      previous.unsubscribe();
    }
    self.set(make());
  }
}

impl SubscriptionLike for SerialSubscription {
  fn unsubscribe(&mut self) {
    let current;
    {
      let mut inner = self.inner.lock().unwrap();
      if inner.closed {
        return;
      }
      inner.closed = true;
      current = inner.current.take();
    }
    if let Some(mut current) = current {
      current.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool {
    self.inner.lock().unwrap().closed
  }
}

#[derive(Default)]
struct CompositeInner {
  closed: bool,
  next_key: u64,
  children: SmallVec<[(u64, BoxSubscription); 2]>,
}

/// A set of concurrently owned child subscriptions.
#[derive(Clone, Default)]
pub struct CompositeSubscription {
  inner: Arc<Mutex<CompositeInner>>,
}

impl CompositeSubscription {
  pub fn new() -> Self {
    Self::default()
  }

  /// Inserts `subscription` and returns a key usable with [`remove`].
  /// When the composite is already closed the argument is closed
  /// immediately.
  ///
  /// [`remove`]: CompositeSubscription::remove
  pub fn add(&self, subscription: BoxSubscription) -> u64 {
    let mut subscription = subscription;
    let mut inner = self.inner.lock().unwrap();
    let key = inner.next_key;
    inner.next_key += 1;
    if inner.closed {
      drop(inner);
      subscription.unsubscribe();
    } else {
      inner.children.push((key, subscription));
    }
    key
  }

  /// Removes and closes the child registered under `key`. Unknown keys
  /// are ignored.
  pub fn remove(&self, key: u64) {
    let child;
    {
      let mut inner = self.inner.lock().unwrap();
      match inner.children.iter().position(|(k, _)| *k == key) {
        Some(idx) => child = inner.children.swap_remove(idx).1,
        None => return,
      }
    }
    let mut child = child;
    child.unsubscribe();
  }

  pub fn len(&self) -> usize {
    self.inner.lock().unwrap().children.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl SubscriptionLike for CompositeSubscription {
  fn unsubscribe(&mut self) {
    let children;
    {
      let mut inner = self.inner.lock().unwrap();
      if inner.closed {
        return;
      }
      inner.closed = true;
      children = std::mem::take(&mut inner.children);
    }
    for (_, mut child) in children {
      child.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool {
    self.inner.lock().unwrap().closed
  }
}
