use crate::error::RxError;
use crate::observable::Observable;
use crate::scheduler::{self, SharedScheduler};
use crate::subscription::{
  CompositeSubscription, SerialSubscription, SubscriptionLike,
};

/// Creates an observable emitting `value` and completing.
///
/// Emission happens synchronously inside `subscribe`; use [`of_on`] to
/// emit through another scheduler.
pub fn of<Item>(value: Item) -> Observable<Item>
where
  Item: Clone + Send + 'static,
{
  of_on(value, scheduler::immediate())
}

/// Like [`of`], scheduling `next` and then `complete` as two separate
/// actions on `scheduler`.
pub fn of_on<Item>(value: Item, scheduler: SharedScheduler) -> Observable<Item>
where
  Item: Clone + Send + 'static,
{
  let value = std::sync::Arc::new(std::sync::Mutex::new(value));
  Observable::create_with_subscription(move |mut observer| {
    let value = value.lock().unwrap().clone();
    let tail = SerialSubscription::new();
    let tail_slot = tail.clone();
    let completer = scheduler.clone();
    let first = scheduler.schedule(Box::new(move || {
      observer.next(value);
      let done = completer.schedule(Box::new(move || observer.complete()));
      tail_slot.set(done);
    }));
    let subscription = CompositeSubscription::new();
    subscription.add(first);
    subscription.add(tail.boxed());
    subscription.boxed()
  })
}

/// Creates an observable that completes without emitting.
pub fn empty<Item>() -> Observable<Item>
where
  Item: Send + 'static,
{
  empty_on(scheduler::immediate())
}

pub fn empty_on<Item>(scheduler: SharedScheduler) -> Observable<Item>
where
  Item: Send + 'static,
{
  Observable::create_with_subscription(move |mut observer| {
    scheduler.schedule(Box::new(move || observer.complete()))
  })
}

/// Creates an observable that terminates with `error`.
pub fn throw<Item>(error: RxError) -> Observable<Item>
where
  Item: Send + 'static,
{
  throw_on(error, scheduler::immediate())
}

pub fn throw_on<Item>(
  error: RxError,
  scheduler: SharedScheduler,
) -> Observable<Item>
where
  Item: Send + 'static,
{
  Observable::create_with_subscription(move |mut observer| {
    let error = error.clone();
    scheduler.schedule(Box::new(move || observer.error(error)))
  })
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::error::{rx_error, EmptyError};
  use std::sync::{Arc, Mutex};

  #[test]
  fn of_emits_value_then_completes() {
    let seen = Arc::new(Mutex::new(vec![]));
    let (n, c) = (seen.clone(), seen.clone());
    of(100).subscribe_complete(
      move |v| n.lock().unwrap().push(format!("next {}", v)),
      move || c.lock().unwrap().push("complete".to_string()),
    );
    assert_eq!(*seen.lock().unwrap(), vec!["next 100", "complete"]);
  }

  #[test]
  fn of_replays_per_subscription() {
    let total = Arc::new(Mutex::new(0));
    let source = of("v");
    for _ in 0..2 {
      let t = total.clone();
      let subscription = source.subscribe(move |_| *t.lock().unwrap() += 1);
      // a synchronous source is already complete when subscribe returns
      assert!(subscription.is_closed());
    }
    assert_eq!(*total.lock().unwrap(), 2);
  }

  #[test]
  fn empty_only_completes() {
    let completed = Arc::new(Mutex::new(false));
    let c = completed.clone();
    empty::<i32>().subscribe_complete(
      |_| panic!("empty must not emit"),
      move || *c.lock().unwrap() = true,
    );
    assert!(*completed.lock().unwrap());
  }

  #[test]
  fn throw_delivers_error() {
    let seen = Arc::new(Mutex::new(vec![]));
    let (n, e, c) = (seen.clone(), seen.clone(), seen.clone());
    throw::<i32>(rx_error(EmptyError)).subscribe_all(
      move |v| n.lock().unwrap().push(format!("next {}", v)),
      move |err| e.lock().unwrap().push(format!("error {}", err)),
      move || c.lock().unwrap().push("complete".to_string()),
    );
    assert_eq!(*seen.lock().unwrap(), vec!["error sequence is empty"]);
  }
}
