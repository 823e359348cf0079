use crate::error::RxError;
use crate::observer::{
  BoxObserver, CheckedObserver, Observer, ObserverAll, ObserverComplete,
  ObserverNext,
};
use crate::scheduler::CurrentThreadScheduler;
use crate::subscription::{
  ActionSubscription, BoxSubscription, SerialSubscription, SubscriptionLike,
};
use std::sync::Arc;

pub mod from_iter;
pub mod interval;
pub mod of;

pub use from_iter::{from_iter, from_iter_on};
pub use interval::{interval, timer};
pub use of::{empty, empty_on, of, of_on, throw, throw_on};

type SubscribeFn<Item> =
  dyn Fn(BoxObserver<Item>) -> BoxSubscription + Send + Sync;

/// A lazy push source of notifications.
///
/// Subscribing hands the producer a contract-enforcing observer (see
/// [`CheckedObserver`]): at most one terminal notification reaches the
/// caller, nothing is delivered after it, and the first terminal closes
/// the upstream subscription. Cloning shares the producer; every
/// subscription runs it afresh.
pub struct Observable<Item> {
  on_subscribe: Arc<SubscribeFn<Item>>,
}

impl<Item> Clone for Observable<Item> {
  fn clone(&self) -> Self {
    Observable {
      on_subscribe: self.on_subscribe.clone(),
    }
  }
}

impl<Item: Send + 'static> Observable<Item> {
  /// The canonical factory: `delegate` receives the downstream observer
  /// and returns the subscription that cancels its production.
  ///
  /// Subscription runs inside the current-thread trampoline, so any
  /// work a synchronous producer enqueues drains before `subscribe`
  /// returns.
  pub fn create_with_subscription<F>(delegate: F) -> Self
  where
    F: Fn(BoxObserver<Item>) -> BoxSubscription + Send + Sync + 'static,
  {
    Observable {
      on_subscribe: Arc::new(delegate),
    }
  }

  /// Like [`create_with_subscription`], for producers that hand back a
  /// plain teardown thunk instead of a subscription.
  ///
  /// [`create_with_subscription`]: Observable::create_with_subscription
  pub fn create<F, Teardown>(delegate: F) -> Self
  where
    F: Fn(BoxObserver<Item>) -> Teardown + Send + Sync + 'static,
    Teardown: FnOnce() + Send + 'static,
  {
    Self::create_with_subscription(move |observer| {
      ActionSubscription::new(delegate(observer)).boxed()
    })
  }

  /// Runs the producer for `observer` and returns the handle that
  /// cancels it.
  pub fn subscribe_observer<O>(&self, observer: O) -> SerialSubscription
  where
    O: Observer<Item = Item> + Send + 'static,
  {
    let life = SerialSubscription::new();
    let checked = CheckedObserver::new(observer, life.clone());
    CurrentThreadScheduler::run_immediate(|| {
      let subscription = (self.on_subscribe)(Box::new(checked));
      life.set(subscription);
    });
    life
  }

  /// Subscribes with a `next` handler; an error panics on the
  /// delivering thread (the default observer behavior).
  pub fn subscribe<N>(&self, next: N) -> SerialSubscription
  where
    N: FnMut(Item) + Send + 'static,
  {
    self.subscribe_observer(ObserverNext::new(next))
  }

  pub fn subscribe_complete<N, C>(&self, next: N, complete: C) -> SerialSubscription
  where
    N: FnMut(Item) + Send + 'static,
    C: FnMut() + Send + 'static,
  {
    self.subscribe_observer(ObserverComplete::new(next, complete))
  }

  pub fn subscribe_all<N, E, C>(
    &self,
    next: N,
    error: E,
    complete: C,
  ) -> SerialSubscription
  where
    N: FnMut(Item) + Send + 'static,
    E: FnMut(RxError) + Send + 'static,
    C: FnMut() + Send + 'static,
  {
    self.subscribe_observer(ObserverAll::new(next, error, complete))
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::sync::Mutex;

  #[test]
  fn create_runs_teardown_on_unsubscribe() {
    let torn_down = Arc::new(Mutex::new(false));
    let flag = torn_down.clone();
    let source = Observable::create(move |_observer: BoxObserver<i32>| {
      let flag = flag.clone();
      move || *flag.lock().unwrap() = true
    });

    let mut subscription = source.subscribe(|_| {});
    assert!(!*torn_down.lock().unwrap());
    subscription.unsubscribe();
    assert!(*torn_down.lock().unwrap());
  }

  #[test]
  fn terminal_notification_runs_teardown() {
    let torn_down = Arc::new(Mutex::new(false));
    let flag = torn_down.clone();
    let source = Observable::create(move |mut observer: BoxObserver<i32>| {
      observer.next(1);
      observer.complete();
      let flag = flag.clone();
      move || *flag.lock().unwrap() = true
    });

    let subscription = source.subscribe(|_| {});
    assert!(*torn_down.lock().unwrap());
    assert!(subscription.is_closed());
  }

  #[test]
  fn nothing_delivered_after_complete() {
    let source = Observable::create(move |mut observer: BoxObserver<i32>| {
      observer.next(1);
      observer.complete();
      observer.next(2);
      move || {}
    });

    let seen = Arc::new(Mutex::new(vec![]));
    let (n, c) = (seen.clone(), seen.clone());
    source.subscribe_complete(
      move |v| n.lock().unwrap().push(format!("next {}", v)),
      move || c.lock().unwrap().push("complete".to_string()),
    );

    assert_eq!(*seen.lock().unwrap(), vec!["next 1", "complete"]);
  }

  #[test]
  fn nothing_delivered_after_error() {
    let source = Observable::create(move |mut observer: BoxObserver<i32>| {
      observer.next(1);
      observer.error(crate::error::rx_error(crate::error::EmptyError));
      observer.next(2);
      observer.complete();
      move || {}
    });

    let seen = Arc::new(Mutex::new(vec![]));
    let (n, e, c) = (seen.clone(), seen.clone(), seen.clone());
    source.subscribe_all(
      move |v| n.lock().unwrap().push(format!("next {}", v)),
      move |err| e.lock().unwrap().push(format!("error {}", err)),
      move || c.lock().unwrap().push("complete".to_string()),
    );

    assert_eq!(
      *seen.lock().unwrap(),
      vec!["next 1", "error sequence is empty"]
    );
  }

  #[test]
  fn each_subscription_reruns_the_producer() {
    let runs = Arc::new(Mutex::new(0));
    let counter = runs.clone();
    let source = Observable::create(move |mut observer: BoxObserver<i32>| {
      *counter.lock().unwrap() += 1;
      observer.next(1);
      observer.complete();
      move || {}
    });

    source.subscribe(|_| {});
    source.clone().subscribe(|_| {});
    assert_eq!(*runs.lock().unwrap(), 2);
  }
}
