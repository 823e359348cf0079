use crate::observable::Observable;
use crate::subscription::{
  ActionSubscription, CompositeSubscription, SubscriptionLike,
};
use std::sync::Arc;

impl<Item: Send + 'static> Observable<Item> {
  /// Runs `action` exactly once per subscription when the stream ends,
  /// whether by terminal notification or by unsubscription.
  pub fn finalize<F>(&self, action: F) -> Observable<Item>
  where
    F: Fn() + Send + Sync + 'static,
  {
    let source = self.clone();
    let action = Arc::new(action);
    Observable::create_with_subscription(move |observer| {
      let composite = CompositeSubscription::new();
      let action = action.clone();
      composite.add(ActionSubscription::new(move || action()).boxed());
      composite.add(source.subscribe_observer(observer).boxed());
      composite.boxed()
    })
  }
}

#[cfg(test)]
mod test {
  use crate::observable;
  use crate::subscription::SubscriptionLike;
  use std::sync::{Arc, Mutex};

  #[test]
  fn runs_on_completion() {
    let finalized = Arc::new(Mutex::new(0));
    let f = finalized.clone();
    observable::from_iter(vec![1, 2])
      .finalize(move || *f.lock().unwrap() += 1)
      .subscribe(|_| {});
    assert_eq!(*finalized.lock().unwrap(), 1);
  }

  #[test]
  fn runs_on_unsubscribe() {
    let finalized = Arc::new(Mutex::new(0));
    let f = finalized.clone();
    let source = crate::observable::Observable::create(
      |_observer: crate::observer::BoxObserver<i32>| move || {},
    );
    let mut subscription = source
      .finalize(move || *f.lock().unwrap() += 1)
      .subscribe(|_| {});

    assert_eq!(*finalized.lock().unwrap(), 0);
    subscription.unsubscribe();
    subscription.unsubscribe();
    assert_eq!(*finalized.lock().unwrap(), 1);
  }
}
