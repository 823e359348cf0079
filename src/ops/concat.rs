use crate::observable::Observable;
use crate::observer::{BoxObserver, Observer, SyncObserver};
use crate::subscription::{SerialSubscription, SubscriptionLike};

impl<Item: Send + 'static> Observable<Item> {
  /// Emits everything from this observable, then everything from
  /// `other`. `other` is only subscribed once this completes; an error
  /// here propagates without touching `other`.
  pub fn concat(&self, other: &Observable<Item>) -> Observable<Item> {
    let first = self.clone();
    let second = other.clone();
    Observable::create_with_subscription(move |observer| {
      let inner = SerialSubscription::new();
      let downstream = SyncObserver::new(observer);
      let handoff = ConcatObserver {
        downstream,
        second: second.clone(),
        inner: inner.clone(),
      };
      inner.set(first.subscribe_observer(handoff).boxed());
      inner.boxed()
    })
  }
}

struct ConcatObserver<Item> {
  downstream: SyncObserver<BoxObserver<Item>>,
  second: Observable<Item>,
  inner: SerialSubscription,
}

impl<Item: Send + 'static> Observer for ConcatObserver<Item> {
  type Item = Item;

  fn next(&mut self, value: Item) {
    self.downstream.next(value)
  }

  fn error(&mut self, err: crate::error::RxError) {
    self.downstream.error(err)
  }

  fn complete(&mut self) {
    let second = self.second.clone();
    let downstream = self.downstream.clone();
    self
      .inner
      .clear_and_set(move || second.subscribe_observer(downstream).boxed());
  }
}
