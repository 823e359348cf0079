use crate::observable::Observable;
use crate::observer::{BoxObserver, Observer, SyncObserver};
use crate::subscription::{
  CompositeSubscription, SerialSubscription, SubscriptionLike,
};
use std::sync::{Arc, Mutex};

impl<Item: Send + 'static> Observable<Item> {
  /// Subscribes to both sources; the first to produce any notification
  /// wins, the loser is unsubscribed on the spot, and only the winner's
  /// notifications are delivered from then on.
  pub fn amb(&self, other: &Observable<Item>) -> Observable<Item> {
    let left = self.clone();
    let right = other.clone();
    Observable::create_with_subscription(move |observer| {
      let composite = CompositeSubscription::new();
      let left_slot = SerialSubscription::new();
      let right_slot = SerialSubscription::new();
      let left_key = composite.add(left_slot.clone().boxed());
      let right_key = composite.add(right_slot.clone().boxed());

      let state = Arc::new(AmbState {
        choice: Mutex::new(None),
        composite: composite.clone(),
        left_key,
        right_key,
      });
      let downstream = SyncObserver::new(observer);

      left_slot.set(
        left
          .subscribe_observer(AmbObserver {
            side: Side::Left,
            state: state.clone(),
            downstream: downstream.clone(),
          })
          .boxed(),
      );
      right_slot.set(
        right
          .subscribe_observer(AmbObserver {
            side: Side::Right,
            state,
            downstream,
          })
          .boxed(),
      );
      composite.boxed()
    })
  }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
  Left,
  Right,
}

struct AmbState {
  choice: Mutex<Option<Side>>,
  composite: CompositeSubscription,
  left_key: u64,
  right_key: u64,
}

struct AmbObserver<Item> {
  side: Side,
  state: Arc<AmbState>,
  downstream: SyncObserver<BoxObserver<Item>>,
}

impl<Item> AmbObserver<Item> {
  /// Latches this side as the winner on first notification; exactly one
  /// side can make the `None -> Some` transition.
  fn wins(&self) -> bool {
    let mut choice = self.state.choice.lock().unwrap();
    match *choice {
      Some(winner) => winner == self.side,
      None => {
        *choice = Some(self.side);
        drop(choice);
        let loser_key = match self.side {
          Side::Left => self.state.right_key,
          Side::Right => self.state.left_key,
        };
        self.state.composite.remove(loser_key);
        true
      }
    }
  }
}

impl<Item: Send + 'static> Observer for AmbObserver<Item> {
  type Item = Item;

  fn next(&mut self, value: Item) {
    if self.wins() {
      self.downstream.next(value);
    }
  }

  fn error(&mut self, err: crate::error::RxError) {
    if self.wins() {
      self.downstream.error(err);
    }
  }

  fn complete(&mut self) {
    if self.wins() {
      self.downstream.complete();
    }
  }
}

#[cfg(test)]
mod test {
  use crate::observable;
  use crate::scheduler::{Instant, Scheduler};
  use crate::test_scheduler::VirtualScheduler;
  use std::sync::{Arc, Mutex};
  use std::time::Duration;

  #[test]
  fn synchronous_left_wins() {
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    observable::from_iter(vec![1, 2])
      .amb(&observable::from_iter(vec![10, 20]))
      .subscribe(move |v| s.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
  }

  #[test]
  fn later_source_loses_under_virtual_time() {
    let scheduler = VirtualScheduler::new();
    let shared = scheduler.shared();
    let slow = observable::timer(Duration::from_millis(50), shared.clone())
      .map_to("slow");
    let fast = observable::timer(Duration::from_millis(20), shared).map_to("fast");

    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    let probe = scheduler.clone();
    slow
      .amb(&fast)
      .subscribe(move |v| s.lock().unwrap().push((probe.now(), v)));

    scheduler.run();
    assert_eq!(
      *seen.lock().unwrap(),
      vec![(Instant::from_millis(20), "fast")]
    );
  }
}
