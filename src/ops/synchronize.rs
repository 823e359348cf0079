use crate::observable::Observable;
use crate::observer::SyncObserver;
use crate::subscription::SubscriptionLike;

impl<Item: Send + 'static> Observable<Item> {
  /// Serializes delivery under one mutex, for sources whose producers
  /// may call the observer from several threads at once.
  pub fn synchronize(&self) -> Observable<Item> {
    let source = self.clone();
    Observable::create_with_subscription(move |observer| {
      source
        .subscribe_observer(SyncObserver::new(observer))
        .boxed()
    })
  }
}

#[cfg(test)]
mod test {
  use crate::observable;
  use std::sync::{Arc, Mutex};

  #[test]
  fn stream_passes_through_unchanged() {
    let seen = Arc::new(Mutex::new(vec![]));
    let (n, c) = (seen.clone(), seen.clone());
    observable::from_iter(vec![1, 2, 3])
      .synchronize()
      .subscribe_complete(
        move |v| n.lock().unwrap().push(v.to_string()),
        move || c.lock().unwrap().push("complete".to_string()),
      );
    assert_eq!(*seen.lock().unwrap(), vec!["1", "2", "3", "complete"]);
  }
}
