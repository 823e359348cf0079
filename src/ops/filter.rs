use crate::observable::Observable;
use crate::observer::Observer;
use crate::ops::guard;
use crate::subscription::SubscriptionLike;
use std::sync::Arc;

impl<Item: Send + 'static> Observable<Item> {
  /// Emits only the values `predicate` accepts. A panicking predicate
  /// terminates the stream with an error.
  pub fn filter<F>(&self, predicate: F) -> Observable<Item>
  where
    F: Fn(&Item) -> bool + Send + Sync + 'static,
  {
    let source = self.clone();
    let predicate = Arc::new(predicate);
    Observable::create_with_subscription(move |observer| {
      source
        .subscribe_observer(FilterObserver {
          observer,
          predicate: predicate.clone(),
        })
        .boxed()
    })
  }
}

struct FilterObserver<O, F> {
  observer: O,
  predicate: Arc<F>,
}

impl<O, F> Observer for FilterObserver<O, F>
where
  O: Observer,
  F: Fn(&O::Item) -> bool,
{
  type Item = O::Item;

  fn next(&mut self, value: Self::Item) {
    match guard(&*self.predicate, &value) {
      Ok(true) => self.observer.next(value),
      Ok(false) => {}
      Err(err) => self.observer.error(err),
    }
  }

  fn error(&mut self, err: crate::error::RxError) {
    self.observer.error(err)
  }

  fn complete(&mut self) {
    self.observer.complete()
  }
}
