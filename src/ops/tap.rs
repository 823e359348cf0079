use crate::observable::Observable;
use crate::observer::Observer;
use crate::ops::guard;
use crate::subscription::SubscriptionLike;
use std::sync::Arc;

impl<Item: Send + 'static> Observable<Item> {
  /// Applies `action` to each value for its side effect, then emits the
  /// value unchanged. Errors pass through without invoking `action`; a
  /// panicking `action` terminates the stream with an error.
  pub fn tap<F>(&self, action: F) -> Observable<Item>
  where
    F: Fn(&Item) + Send + Sync + 'static,
  {
    let source = self.clone();
    let action = Arc::new(action);
    Observable::create_with_subscription(move |observer| {
      source
        .subscribe_observer(TapObserver {
          observer,
          action: action.clone(),
        })
        .boxed()
    })
  }
}

struct TapObserver<O, F> {
  observer: O,
  action: Arc<F>,
}

impl<O, F> Observer for TapObserver<O, F>
where
  O: Observer,
  F: Fn(&O::Item),
{
  type Item = O::Item;

  fn next(&mut self, value: Self::Item) {
    match guard(&*self.action, &value) {
      Ok(()) => self.observer.next(value),
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
