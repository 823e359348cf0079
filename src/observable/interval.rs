use crate::observable::Observable;
use crate::scheduler::{SchedulerExt, SharedScheduler};
use std::time::Duration;

/// Creates an observable counting 0, 1, 2, … with `period` between
/// emissions, starting one period after subscription. Never completes;
/// stop it by unsubscribing (or with `take`).
pub fn interval(period: Duration, scheduler: SharedScheduler) -> Observable<usize> {
  Observable::create_with_subscription(move |mut observer| {
    let mut count = 0usize;
    scheduler.schedule_recursive_after(period, move |ctx| {
      observer.next(count);
      count += 1;
      ctx.reschedule_after(period);
    })
  })
}

/// Creates an observable emitting a single `0` and completing once `due`
/// has elapsed.
pub fn timer(due: Duration, scheduler: SharedScheduler) -> Observable<usize> {
  Observable::create_with_subscription(move |mut observer| {
    scheduler.schedule_after(
      due,
      Box::new(move || {
        observer.next(0);
        observer.complete();
      }),
    )
  })
}
