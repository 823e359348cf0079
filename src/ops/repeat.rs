use crate::observable::Observable;
use crate::observer::{BoxObserver, Observer, SyncObserver};
use crate::subscription::{
  NopSubscription, SerialSubscription, SubscriptionLike,
};
use std::sync::{Arc, Mutex};

impl<Item: Send + 'static> Observable<Item> {
  /// Resubscribes to the source every time it completes. Errors are not
  /// caught. Without a bound downstream (`take`, unsubscription) a
  /// synchronous source loops forever.
  pub fn repeat(&self) -> Observable<Item> {
    self.repeat_with(None)
  }

  /// Replays the source `count` full runs, then completes.
  pub fn repeat_n(&self, count: usize) -> Observable<Item> {
    self.repeat_with(Some(count))
  }

  fn repeat_with(&self, count: Option<usize>) -> Observable<Item> {
    let source = self.clone();
    Observable::create_with_subscription(move |mut observer| {
      if count == Some(0) {
        observer.complete();
        return NopSubscription.boxed();
      }
      let inner = SerialSubscription::new();
      let restart = RepeatObserver {
        source: source.clone(),
        downstream: SyncObserver::new(observer),
        inner: inner.clone(),
        remaining: Arc::new(Mutex::new(count)),
      };
      inner.set(source.subscribe_observer(restart).boxed());
      inner.boxed()
    })
  }
}

struct RepeatObserver<Item> {
  source: Observable<Item>,
  downstream: SyncObserver<BoxObserver<Item>>,
  inner: SerialSubscription,
  remaining: Arc<Mutex<Option<usize>>>,
}

impl<Item> Clone for RepeatObserver<Item> {
  fn clone(&self) -> Self {
    RepeatObserver {
      source: self.source.clone(),
      downstream: self.downstream.clone(),
      inner: self.inner.clone(),
      remaining: self.remaining.clone(),
    }
  }
}

impl<Item: Send + 'static> Observer for RepeatObserver<Item> {
  type Item = Item;

  fn next(&mut self, value: Item) {
    self.downstream.next(value)
  }

  fn error(&mut self, err: crate::error::RxError) {
    self.downstream.error(err)
  }

  fn complete(&mut self) {
    let run_again = {
      let mut remaining = self.remaining.lock().unwrap();
      match *remaining {
        None => true,
        Some(runs) if runs > 1 => {
          *remaining = Some(runs - 1);
          true
        }
        Some(_) => false,
      }
    };
    if run_again {
      let source = self.source.clone();
      let restart = self.clone();
      self
        .inner
        .clear_and_set(move || source.subscribe_observer(restart).boxed());
    } else {
      self.downstream.complete();
    }
  }
}
