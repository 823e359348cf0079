use crate::notification::Notification;
use crate::observable::Observable;
use crate::observer::Observer;
use crate::subscription::SubscriptionLike;
use std::marker::PhantomData;

impl<Item: Send + 'static> Observable<Item> {
  /// Reifies every observer call as a [`Notification`] value; terminal
  /// notifications are followed by an ordinary completion.
  pub fn materialize(&self) -> Observable<Notification<Item>> {
    let source = self.clone();
    Observable::create_with_subscription(move |observer| {
      source
        .subscribe_observer(MaterializeObserver {
          observer,
          _hint: PhantomData,
        })
        .boxed()
    })
  }
}

impl<Item: Send + 'static> Observable<Notification<Item>> {
  /// Replays reified notifications as real observer calls; the inverse
  /// of [`materialize`].
  ///
  /// [`materialize`]: Observable::materialize
  pub fn dematerialize(&self) -> Observable<Item> {
    let source = self.clone();
    Observable::create_with_subscription(move |observer| {
      source
        .subscribe_observer(DematerializeObserver { observer })
        .boxed()
    })
  }
}

struct MaterializeObserver<O, Item> {
  observer: O,
  _hint: PhantomData<fn(Item)>,
}

impl<Item, O> Observer for MaterializeObserver<O, Item>
where
  O: Observer<Item = Notification<Item>>,
{
  type Item = Item;

  fn next(&mut self, value: Item) {
    self.observer.next(Notification::Next(value));
  }

  fn error(&mut self, err: crate::error::RxError) {
    self.observer.next(Notification::Error(err));
    self.observer.complete();
  }

  fn complete(&mut self) {
    self.observer.next(Notification::Completed);
    self.observer.complete();
  }
}

struct DematerializeObserver<O> {
  observer: O,
}

impl<O: Observer> Observer for DematerializeObserver<O> {
  type Item = Notification<O::Item>;

  fn next(&mut self, notification: Self::Item) {
    notification.accept(&mut self.observer);
  }

  fn error(&mut self, err: crate::error::RxError) {
    self.observer.error(err);
  }

  fn complete(&mut self) {
    self.observer.complete();
  }
}
