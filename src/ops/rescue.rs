use crate::observable::Observable;
use crate::observer::{BoxObserver, Observer, SyncObserver};
use crate::subscription::{SerialSubscription, SubscriptionLike};

impl<Item: Send + 'static> Observable<Item> {
  /// Continues with `fallback` if the source errors. Values emitted
  /// before the error flow through unchanged; completion is untouched.
  pub fn rescue(&self, fallback: &Observable<Item>) -> Observable<Item> {
    let source = self.clone();
    let fallback = fallback.clone();
    Observable::create_with_subscription(move |observer| {
      let inner = SerialSubscription::new();
      let handoff = RescueObserver {
        downstream: SyncObserver::new(observer),
        fallback: fallback.clone(),
        inner: inner.clone(),
      };
      inner.set(source.subscribe_observer(handoff).boxed());
      inner.boxed()
    })
  }
}

struct RescueObserver<Item> {
  downstream: SyncObserver<BoxObserver<Item>>,
  fallback: Observable<Item>,
  inner: SerialSubscription,
}

impl<Item: Send + 'static> Observer for RescueObserver<Item> {
  type Item = Item;

  fn next(&mut self, value: Item) {
    self.downstream.next(value)
  }

  fn error(&mut self, _: crate::error::RxError) {
    let fallback = self.fallback.clone();
    let downstream = self.downstream.clone();
    self
      .inner
      .clear_and_set(move || fallback.subscribe_observer(downstream).boxed());
  }

  fn complete(&mut self) {
    self.downstream.complete()
  }
}
