use crate::observable::Observable;
use crate::scheduler::SharedScheduler;
use crate::subscription::{
  ActionSubscription, SerialSubscription, SubscriptionLike,
};

impl<Item: Send + 'static> Observable<Item> {
  /// Performs the subscription itself on `scheduler`. Closing the
  /// returned handle schedules the unsubscribe on the same scheduler,
  /// never inline, so a subscribe already queued always completes
  /// before its unsubscribe runs.
  pub fn subscribe_on(&self, scheduler: SharedScheduler) -> Observable<Item> {
    let source = self.clone();
    let scheduler = scheduler.clone();
    Observable::create_with_subscription(move |observer| {
      let upstream = SerialSubscription::new();
      let slot = upstream.clone();
      let source = source.clone();
      let task = scheduler.schedule(Box::new(move || {
        slot.set(source.subscribe_observer(observer).boxed());
      }));

      let scheduler = scheduler.clone();
      ActionSubscription::new(move || {
        let mut task = task;
        let mut upstream = upstream;
        scheduler.schedule(Box::new(move || {
          task.unsubscribe();
          upstream.unsubscribe();
        }));
      })
      .boxed()
    })
  }
}

#[cfg(test)]
mod test {
  use crate::observable;
  use crate::scheduler::Instant;
  use crate::subscription::SubscriptionLike;
  use crate::test_scheduler::VirtualScheduler;
  use std::sync::{Arc, Mutex};

  #[test]
  fn subscription_happens_on_the_scheduler() {
    let scheduler = VirtualScheduler::new();
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();

    observable::from_iter(vec![1, 2])
      .subscribe_on(scheduler.shared())
      .subscribe(move |v| s.lock().unwrap().push(v));

    // nothing can have run before the virtual clock is driven
    assert!(seen.lock().unwrap().is_empty());
    scheduler.run();
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
  }

  #[test]
  fn unsubscribe_is_scheduled_not_inline() {
    let scheduler = VirtualScheduler::new();
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();

    let mut subscription =
      observable::from_iter_on(0..100, scheduler.shared())
        .subscribe_on(scheduler.shared())
        .subscribe(move |v| s.lock().unwrap().push(v));

    subscription.unsubscribe();
    scheduler.run_to(Instant::from_millis(500));
    // the unsubscribe ran queued behind the subscribe: the producer was
    // subscribed first and then cancelled before its first emission
    assert!(seen.lock().unwrap().is_empty());
  }
}
