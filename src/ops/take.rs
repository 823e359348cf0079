use crate::observable::Observable;
use crate::observer::Observer;
use crate::subscription::{NopSubscription, SubscriptionLike};

impl<Item: Send + 'static> Observable<Item> {
  /// Emits the first `count` values, completing on the notification
  /// that reaches the count. `take(0)` completes at subscription
  /// without touching the source.
  pub fn take(&self, count: usize) -> Observable<Item> {
    let source = self.clone();
    Observable::create_with_subscription(move |mut observer| {
      if count == 0 {
        observer.complete();
        return NopSubscription.boxed();
      }
      source
        .subscribe_observer(TakeObserver {
          observer,
          remaining: count,
        })
        .boxed()
    })
  }
}

struct TakeObserver<O> {
  observer: O,
  remaining: usize,
}

impl<O: Observer> Observer for TakeObserver<O> {
  type Item = O::Item;

  fn next(&mut self, value: Self::Item) {
    if self.remaining == 0 {
      return;
    }
    self.remaining -= 1;
    self.observer.next(value);
    if self.remaining == 0 {
      self.observer.complete();
    }
  }

  fn error(&mut self, err: crate::error::RxError) {
    self.observer.error(err)
  }

  fn complete(&mut self) {
    self.observer.complete()
  }
}
