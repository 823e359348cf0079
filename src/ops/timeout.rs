use crate::error::{rx_error, TimeoutError};
use crate::observable::{self, Observable};
use crate::scheduler::SharedScheduler;
use std::time::Duration;

impl<Item: Clone + Send + 'static> Observable<Item> {
  /// Terminates with [`TimeoutError`] unless the source produces its
  /// first notification within `due`.
  pub fn timeout(
    &self,
    due: Duration,
    scheduler: SharedScheduler,
  ) -> Observable<Item> {
    self.timeout_with(due, None, scheduler)
  }

  /// Switches to `fallback` instead of erroring when `due` elapses
  /// first. The fallback is never subscribed while the source wins the
  /// race.
  pub fn timeout_or(
    &self,
    due: Duration,
    fallback: &Observable<Item>,
    scheduler: SharedScheduler,
  ) -> Observable<Item> {
    self.timeout_with(due, Some(fallback.clone()), scheduler)
  }

  fn timeout_with(
    &self,
    due: Duration,
    fallback: Option<Observable<Item>>,
    scheduler: SharedScheduler,
  ) -> Observable<Item> {
    let fallback =
      fallback.unwrap_or_else(|| observable::throw(rx_error(TimeoutError)));
    // race the marked source against the deadline, then flatten the
    // winner: a marked value replays as-is, the deadline marker swaps
    // in the fallback
    let deadline =
      observable::timer(due, scheduler).map(|_: usize| None::<Item>);
    self
      .map(Some)
      .amb(&deadline)
      .flat_map(move |probe| match probe {
        Some(value) => observable::of(value),
        None => fallback.clone(),
      })
  }
}

#[cfg(test)]
mod test {
  use crate::observable;
  use crate::test_scheduler::VirtualScheduler;
  use std::sync::{Arc, Mutex};
  use std::time::Duration;

  #[test]
  fn fast_source_is_untouched() {
    let scheduler = VirtualScheduler::new();
    let shared = scheduler.shared();
    let seen = Arc::new(Mutex::new(vec![]));
    let (n, c) = (seen.clone(), seen.clone());

    observable::of_on("quick", shared.clone())
      .timeout(Duration::from_millis(100), shared)
      .subscribe_complete(
        move |v| n.lock().unwrap().push(format!("next {}", v)),
        move || c.lock().unwrap().push("complete".to_string()),
      );

    scheduler.run();
    assert_eq!(*seen.lock().unwrap(), vec!["next quick", "complete"]);
  }

  #[test]
  fn slow_source_errors_without_fallback() {
    let scheduler = VirtualScheduler::new();
    let shared = scheduler.shared();
    let seen = Arc::new(Mutex::new(vec![]));
    let e = seen.clone();

    observable::timer(Duration::from_millis(500), shared.clone())
      .map_to("late")
      .timeout(Duration::from_millis(50), shared)
      .subscribe_all(
        |_| panic!("value must not arrive"),
        move |err| e.lock().unwrap().push(err.to_string()),
        || panic!("must not complete"),
      );

    scheduler.run();
    assert_eq!(
      *seen.lock().unwrap(),
      vec!["timeout expired before the sequence produced a value"]
    );
  }

  #[test]
  fn slow_source_switches_to_fallback() {
    let scheduler = VirtualScheduler::new();
    let shared = scheduler.shared();
    let seen = Arc::new(Mutex::new(vec![]));
    let (n, c) = (seen.clone(), seen.clone());

    let slow = observable::timer(Duration::from_millis(500), shared.clone())
      .map_to("late");
    let fallback = observable::of_on("backup", shared.clone());
    slow
      .timeout_or(Duration::from_millis(50), &fallback, shared)
      .subscribe_complete(
        move |v| n.lock().unwrap().push(format!("next {}", v)),
        move || c.lock().unwrap().push("complete".to_string()),
      );

    scheduler.run();
    assert_eq!(*seen.lock().unwrap(), vec!["next backup", "complete"]);
  }
}
