use crate::observable::Observable;
use crate::observer::{BoxObserver, Observer, SyncObserver};
use crate::subscription::{
  CompositeSubscription, SerialSubscription, SubscriptionLike,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

impl<Item: Send + 'static> Observable<Observable<Item>> {
  /// Flattens a stream of streams, running every inner stream as soon
  /// as the generator produces it.
  ///
  /// Values arrive in the real-time order their producers fired,
  /// serialized through one synchronized downstream. The merged stream
  /// completes when the generator and every inner stream have
  /// completed; any error tears the whole composite down.
  pub fn merge_all(&self) -> Observable<Item> {
    let source = self.clone();
    Observable::create_with_subscription(move |observer| {
      let composite = CompositeSubscription::new();
      let downstream = SyncObserver::new(observer);
      // one live entry for the generator itself, plus one per inner
      let active = Arc::new(AtomicUsize::new(1));

      let generator_slot = SerialSubscription::new();
      let generator_key = composite.add(generator_slot.clone().boxed());
      generator_slot.set(
        source
          .subscribe_observer(MergeOuterObserver {
            downstream: downstream.clone(),
            active: active.clone(),
            composite: composite.clone(),
            generator_key,
          })
          .boxed(),
      );
      composite.boxed()
    })
  }
}

struct MergeOuterObserver<Item> {
  downstream: SyncObserver<BoxObserver<Item>>,
  active: Arc<AtomicUsize>,
  composite: CompositeSubscription,
  generator_key: u64,
}

impl<Item: Send + 'static> Observer for MergeOuterObserver<Item> {
  type Item = Observable<Item>;

  fn next(&mut self, inner: Observable<Item>) {
    self.active.fetch_add(1, Ordering::SeqCst);
    let slot = SerialSubscription::new();
    let key = self.composite.add(slot.clone().boxed());
    slot.set(
      inner
        .subscribe_observer(MergeInnerObserver {
          downstream: self.downstream.clone(),
          active: self.active.clone(),
          composite: self.composite.clone(),
          key,
        })
        .boxed(),
    );
  }

  fn error(&mut self, err: crate::error::RxError) {
    self.composite.clone().unsubscribe();
    self.downstream.error(err);
  }

  fn complete(&mut self) {
    self.composite.remove(self.generator_key);
    if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
      self.downstream.complete();
    }
  }
}

struct MergeInnerObserver<Item> {
  downstream: SyncObserver<BoxObserver<Item>>,
  active: Arc<AtomicUsize>,
  composite: CompositeSubscription,
  key: u64,
}

impl<Item: Send + 'static> Observer for MergeInnerObserver<Item> {
  type Item = Item;

  fn next(&mut self, value: Item) {
    self.downstream.next(value);
  }

  fn error(&mut self, err: crate::error::RxError) {
    self.composite.clone().unsubscribe();
    self.downstream.error(err);
  }

  fn complete(&mut self) {
    self.composite.remove(self.key);
    if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
      self.downstream.complete();
    }
  }
}

#[cfg(test)]
mod test {
  use crate::error::{rx_error, EmptyError};
  use crate::observable;
  use std::sync::{Arc, Mutex};

  #[test]
  fn flattens_inner_streams() {
    let seen = Arc::new(Mutex::new(vec![]));
    let (s, c) = (seen.clone(), seen.clone());
    observable::from_iter(vec![
      observable::from_iter(vec![1, 2]),
      observable::from_iter(vec![3, 4]),
    ])
    .merge_all()
    .subscribe_complete(
      move |v| s.lock().unwrap().push(v.to_string()),
      move || c.lock().unwrap().push("complete".to_string()),
    );

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.last().unwrap(), "complete");
    let mut values: Vec<&String> =
      seen.iter().take(seen.len() - 1).collect();
    values.sort();
    assert_eq!(values, vec!["1", "2", "3", "4"]);
  }

  #[test]
  fn flat_map_applies_and_merges() {
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    observable::from_iter(vec![1, 10])
      .flat_map(|v| observable::from_iter(vec![v, v + 1]))
      .subscribe(move |v| s.lock().unwrap().push(v));

    let mut seen = seen.lock().unwrap().clone();
    seen.sort();
    assert_eq!(seen, vec![1, 2, 10, 11]);
  }

  #[test]
  fn inner_error_tears_everything_down() {
    let seen = Arc::new(Mutex::new(vec![]));
    let (n, e, c) = (seen.clone(), seen.clone(), seen.clone());
    observable::from_iter(vec![
      observable::throw::<i32>(rx_error(EmptyError)),
      observable::from_iter(vec![1]),
    ])
    .merge_all()
    .subscribe_all(
      move |v| n.lock().unwrap().push(format!("next {}", v)),
      move |err| e.lock().unwrap().push(format!("error {}", err)),
      move || c.lock().unwrap().push("complete".to_string()),
    );

    assert_eq!(*seen.lock().unwrap(), vec!["error sequence is empty"]);
  }

  #[test]
  fn empty_generator_completes() {
    let completed = Arc::new(Mutex::new(false));
    let c = completed.clone();
    observable::from_iter(Vec::<crate::observable::Observable<i32>>::new())
      .merge_all()
      .subscribe_complete(|_| {}, move || *c.lock().unwrap() = true);
    assert!(*completed.lock().unwrap());
  }
}
