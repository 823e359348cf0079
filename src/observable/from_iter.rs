use crate::observable::Observable;
use crate::scheduler::{self, SchedulerExt, SharedScheduler};

/// Creates an observable that produces values from an iterator.
///
/// One element is emitted per trampoline step, so closing the returned
/// subscription between steps cancels the remainder of the sequence.
/// Completes when the iterator is exhausted. Never emits an error.
///
/// # Examples
///
/// ```
/// use rxcore::observable;
///
/// observable::from_iter(0..10)
///   .subscribe(|v| println!("{},", v));
/// ```
pub fn from_iter<Item, Iter>(iter: Iter) -> Observable<Item>
where
  Item: Send + 'static,
  Iter: IntoIterator<Item = Item> + Clone + Send + Sync + 'static,
  Iter::IntoIter: Send,
{
  from_iter_on(iter, scheduler::current_thread())
}

/// Like [`from_iter`], stepping the iterator on `scheduler`.
pub fn from_iter_on<Item, Iter>(
  iter: Iter,
  scheduler: SharedScheduler,
) -> Observable<Item>
where
  Item: Send + 'static,
  Iter: IntoIterator<Item = Item> + Clone + Send + Sync + 'static,
  Iter::IntoIter: Send,
{
  Observable::create_with_subscription(move |mut observer| {
    let mut iter = iter.clone().into_iter();
    scheduler.schedule_recursive(move |ctx| match iter.next() {
      Some(value) => {
        observer.next(value);
        ctx.reschedule();
      }
      None => observer.complete(),
    })
  })
}
