use crate::observable::Observable;
use crate::observer::{BoxObserver, Observer, SyncObserver};
use crate::subscription::{
  CompositeSubscription, SerialSubscription, SubscriptionLike,
};
use std::marker::PhantomData;

impl<Item: Send + 'static> Observable<Item> {
  /// Mirrors the source until `other` produces its first value, at
  /// which point the stream completes and both subscriptions close.
  ///
  /// `other` completing without a value only releases its own
  /// subscription; the source keeps going. An error from `other`
  /// propagates downstream.
  pub fn take_until<Signal: Send + 'static>(
    &self,
    other: &Observable<Signal>,
  ) -> Observable<Item> {
    let source = self.clone();
    let other = other.clone();
    Observable::create_with_subscription(move |observer| {
      let composite = CompositeSubscription::new();
      let downstream = SyncObserver::new(observer);

      let source_slot = SerialSubscription::new();
      composite.add(source_slot.clone().boxed());
      let other_slot = SerialSubscription::new();
      let other_key = composite.add(other_slot.clone().boxed());

      source_slot.set(
        source
          .subscribe_observer(MirrorObserver {
            downstream: downstream.clone(),
          })
          .boxed(),
      );
      other_slot.set(
        other
          .subscribe_observer(GateObserver {
            downstream,
            composite: composite.clone(),
            other_key,
            _hint: PhantomData,
          })
          .boxed(),
      );
      composite.boxed()
    })
  }
}

struct MirrorObserver<Item> {
  downstream: SyncObserver<BoxObserver<Item>>,
}

impl<Item: Send + 'static> Observer for MirrorObserver<Item> {
  type Item = Item;

  fn next(&mut self, value: Item) {
    self.downstream.next(value)
  }

  fn error(&mut self, err: crate::error::RxError) {
    self.downstream.error(err)
  }

  fn complete(&mut self) {
    self.downstream.complete()
  }
}

struct GateObserver<Item, Signal> {
  downstream: SyncObserver<BoxObserver<Item>>,
  composite: CompositeSubscription,
  other_key: u64,
  _hint: PhantomData<fn(Signal)>,
}

impl<Item: Send + 'static, Signal> Observer for GateObserver<Item, Signal> {
  type Item = Signal;

  fn next(&mut self, _: Signal) {
    self.downstream.complete();
  }

  fn error(&mut self, err: crate::error::RxError) {
    self.downstream.error(err);
  }

  fn complete(&mut self) {
    self.composite.remove(self.other_key);
  }
}
