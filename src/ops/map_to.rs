use crate::observable::Observable;

impl<Item: Send + 'static> Observable<Item> {
  /// Replaces every value with a clone of `value`.
  pub fn map_to<Out>(&self, value: Out) -> Observable<Out>
  where
    Out: Clone + Send + Sync + 'static,
  {
    self.map(move |_| value.clone())
  }
}

#[cfg(test)]
mod test {
  use crate::observable;
  use std::sync::{Arc, Mutex};

  #[test]
  fn values_are_replaced() {
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    observable::from_iter(0..3)
      .map_to("tick")
      .subscribe(move |v| s.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec!["tick", "tick", "tick"]);
  }
}
