use crate::error::RxError;
use crate::subscription::{SerialSubscription, SubscriptionLike};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

/// The sink side of a stream.
///
/// The default `error` panics on the delivering thread — an unhandled
/// stream error is a bug by design. The default `complete` does nothing.
pub trait Observer {
  type Item;

  fn next(&mut self, value: Self::Item);

  fn error(&mut self, err: RxError) {
    panic!("unhandled error in observable sequence: {}", err)
  }

  fn complete(&mut self) {}
}

pub type BoxObserver<Item> = Box<dyn Observer<Item = Item> + Send>;

impl<O: Observer + ?Sized> Observer for Box<O> {
  type Item = O::Item;

  #[inline]
  fn next(&mut self, value: Self::Item) {
    (**self).next(value)
  }

  #[inline]
  fn error(&mut self, err: RxError) {
    (**self).error(err)
  }

  #[inline]
  fn complete(&mut self) {
    (**self).complete()
  }
}

/// Observer built from a `next` closure; terminal handling is the trait
/// default.
pub struct ObserverNext<N, Item> {
  next: N,
  _hint: PhantomData<fn(Item)>,
}

impl<N, Item> ObserverNext<N, Item>
where
  N: FnMut(Item),
{
  pub fn new(next: N) -> Self {
    ObserverNext {
      next,
      _hint: PhantomData,
    }
  }
}

impl<N, Item> Observer for ObserverNext<N, Item>
where
  N: FnMut(Item),
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    (self.next)(value);
  }
}

/// Observer built from `next` and `complete` closures.
pub struct ObserverComplete<N, C, Item> {
  next: N,
  complete: C,
  _hint: PhantomData<fn(Item)>,
}

impl<N, C, Item> ObserverComplete<N, C, Item>
where
  N: FnMut(Item),
  C: FnMut(),
{
  pub fn new(next: N, complete: C) -> Self {
    ObserverComplete {
      next,
      complete,
      _hint: PhantomData,
    }
  }
}

impl<N, C, Item> Observer for ObserverComplete<N, C, Item>
where
  N: FnMut(Item),
  C: FnMut(),
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    (self.next)(value);
  }

  fn complete(&mut self) {
    (self.complete)();
  }
}

/// Observer built from all three closures.
pub struct ObserverAll<N, E, C, Item> {
  next: N,
  error: E,
  complete: C,
  _hint: PhantomData<fn(Item)>,
}

impl<N, E, C, Item> ObserverAll<N, E, C, Item>
where
  N: FnMut(Item),
  E: FnMut(RxError),
  C: FnMut(),
{
  pub fn new(next: N, error: E, complete: C) -> Self {
    ObserverAll {
      next,
      error,
      complete,
      _hint: PhantomData,
    }
  }
}

impl<N, E, C, Item> Observer for ObserverAll<N, E, C, Item>
where
  N: FnMut(Item),
  E: FnMut(RxError),
  C: FnMut(),
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    (self.next)(value);
  }

  fn error(&mut self, err: RxError) {
    (self.error)(err);
  }

  fn complete(&mut self) {
    (self.complete)();
  }
}

/// Serializes delivery and lets several producers share one downstream.
///
/// Combinators that compose multiple upstream subscriptions (`merge_all`,
/// `amb`, `take_until`, `concat`'s continuation) hand clones of this to
/// each producer; the mutex guarantees observer methods never overlap.
pub struct SyncObserver<O> {
  inner: Arc<Mutex<O>>,
}

impl<O> Clone for SyncObserver<O> {
  fn clone(&self) -> Self {
    SyncObserver {
      inner: self.inner.clone(),
    }
  }
}

impl<O> SyncObserver<O> {
  pub fn new(observer: O) -> Self {
    SyncObserver {
      inner: Arc::new(Mutex::new(observer)),
    }
  }
}

impl<O: Observer> Observer for SyncObserver<O> {
  type Item = O::Item;

  fn next(&mut self, value: Self::Item) {
    self.inner.lock().unwrap().next(value);
  }

  fn error(&mut self, err: RxError) {
    self.inner.lock().unwrap().error(err);
  }

  fn complete(&mut self) {
    self.inner.lock().unwrap().complete();
  }
}

/// Enforces the observable contract around a downstream observer.
///
/// At most one terminal notification goes through; anything after a
/// terminal is silently dropped; the first terminal also closes the
/// subscription handed over at construction, cancelling the upstream
/// producer even if it naively keeps emitting.
pub struct CheckedObserver<O> {
  observer: O,
  life: SerialSubscription,
  stopped: bool,
}

impl<O> CheckedObserver<O> {
  pub fn new(observer: O, life: SerialSubscription) -> Self {
    CheckedObserver {
      observer,
      life,
      stopped: false,
    }
  }
}

impl<O: Observer> Observer for CheckedObserver<O> {
  type Item = O::Item;

  fn next(&mut self, value: Self::Item) {
    if !self.stopped {
      self.observer.next(value);
    }
  }

  fn error(&mut self, err: RxError) {
    if self.stopped {
      return;
    }
    self.stopped = true;
    self.observer.error(err);
    self.life.unsubscribe();
  }

  fn complete(&mut self) {
    if self.stopped {
      return;
    }
    self.stopped = true;
    self.observer.complete();
    self.life.unsubscribe();
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::error::rx_error;
  use crate::subscription::BoolSubscription;

  fn collecting() -> (
    ObserverAll<
      impl FnMut(i32),
      impl FnMut(RxError),
      impl FnMut(),
      i32,
    >,
    Arc<Mutex<Vec<String>>>,
  ) {
    let seen = Arc::new(Mutex::new(vec![]));
    let (n, e, c) = (seen.clone(), seen.clone(), seen.clone());
    let observer = ObserverAll::new(
      move |v| n.lock().unwrap().push(format!("next {}", v)),
      move |err: RxError| e.lock().unwrap().push(format!("error {}", err)),
      move || c.lock().unwrap().push("complete".to_string()),
    );
    (observer, seen)
  }

  #[test]
  fn checked_drops_after_complete() {
    let (observer, seen) = collecting();
    let mut checked = CheckedObserver::new(observer, SerialSubscription::new());

    checked.next(1);
    checked.complete();
    checked.next(2);
    checked.error(rx_error(crate::error::EmptyError));
    checked.complete();

    assert_eq!(*seen.lock().unwrap(), vec!["next 1", "complete"]);
  }

  #[test]
  fn checked_allows_single_error() {
    let (observer, seen) = collecting();
    let mut checked = CheckedObserver::new(observer, SerialSubscription::new());

    checked.next(1);
    checked.error(rx_error(crate::error::EmptyError));
    checked.next(2);
    checked.complete();

    assert_eq!(
      *seen.lock().unwrap(),
      vec!["next 1", "error sequence is empty"]
    );
  }

  #[test]
  fn checked_closes_life_on_terminal() {
    let life = SerialSubscription::new();
    let upstream = BoolSubscription::new();
    life.set(upstream.clone().boxed());

    let mut checked =
      CheckedObserver::new(ObserverNext::new(|_: i32| {}), life.clone());
    checked.next(1);
    assert!(!upstream.is_closed());
    checked.complete();
    assert!(upstream.is_closed());
    assert!(life.is_closed());
  }

  #[test]
  #[should_panic(expected = "unhandled error")]
  fn default_error_panics() {
    let mut observer = ObserverNext::new(|_: i32| {});
    observer.error(rx_error(crate::error::EmptyError));
  }

  #[test]
  fn sync_observer_shares_downstream() {
    let (observer, seen) = collecting();
    let mut left = SyncObserver::new(observer);
    let mut right = left.clone();

    left.next(1);
    right.next(2);
    right.complete();

    assert_eq!(*seen.lock().unwrap(), vec!["next 1", "next 2", "complete"]);
  }
}
