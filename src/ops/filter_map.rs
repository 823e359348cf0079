use crate::observable::Observable;
use crate::observer::Observer;
use crate::ops::guard;
use crate::subscription::SubscriptionLike;
use std::marker::PhantomData;
use std::sync::Arc;

impl<Item: Send + 'static> Observable<Item> {
  /// The partial-function transform: emits `f(v)` for every value where
  /// `f` is defined, i.e. returns `Some`. Equivalent to `filter` + `map`
  /// in one step.
  pub fn filter_map<Out, F>(&self, f: F) -> Observable<Out>
  where
    Out: Send + 'static,
    F: Fn(Item) -> Option<Out> + Send + Sync + 'static,
  {
    let source = self.clone();
    let f = Arc::new(f);
    Observable::create_with_subscription(move |observer| {
      source
        .subscribe_observer(FilterMapObserver {
          observer,
          f: f.clone(),
          _hint: PhantomData,
        })
        .boxed()
    })
  }
}

struct FilterMapObserver<O, F, Item> {
  observer: O,
  f: Arc<F>,
  _hint: PhantomData<fn(Item)>,
}

impl<Item, Out, O, F> Observer for FilterMapObserver<O, F, Item>
where
  O: Observer<Item = Out>,
  F: Fn(Item) -> Option<Out>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    match guard(&*self.f, value) {
      Ok(Some(mapped)) => self.observer.next(mapped),
      Ok(None) => {}
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
