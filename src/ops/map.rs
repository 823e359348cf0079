use crate::observable::Observable;
use crate::observer::Observer;
use crate::ops::guard;
use crate::subscription::SubscriptionLike;
use std::marker::PhantomData;
use std::sync::Arc;

impl<Item: Send + 'static> Observable<Item> {
  /// Transforms every value with `f`. A panicking `f` terminates the
  /// stream with an error.
  pub fn map<Out, F>(&self, f: F) -> Observable<Out>
  where
    Out: Send + 'static,
    F: Fn(Item) -> Out + Send + Sync + 'static,
  {
    let source = self.clone();
    let f = Arc::new(f);
    Observable::create_with_subscription(move |observer| {
      source
        .subscribe_observer(MapObserver {
          observer,
          f: f.clone(),
          _hint: PhantomData,
        })
        .boxed()
    })
  }

  /// `map(f).merge_all()`: maps every value to an inner observable and
  /// merges the inner streams as their producers fire.
  pub fn flat_map<Out, F>(&self, f: F) -> Observable<Out>
  where
    Out: Send + 'static,
    F: Fn(Item) -> Observable<Out> + Send + Sync + 'static,
  {
    self.map(f).merge_all()
  }
}

struct MapObserver<O, F, Item> {
  observer: O,
  f: Arc<F>,
  _hint: PhantomData<fn(Item)>,
}

impl<Item, Out, O, F> Observer for MapObserver<O, F, Item>
where
  O: Observer<Item = Out>,
  F: Fn(Item) -> Out,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    match guard(&*self.f, value) {
      Ok(mapped) => self.observer.next(mapped),
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
