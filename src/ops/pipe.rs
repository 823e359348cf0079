use crate::observable::Observable;

impl<Item: Send + 'static> Observable<Item> {
  /// Binds this observable once and applies `f` to it, so several
  /// references inside `f` share the same upstream instance.
  pub fn pipe<R, F>(&self, f: F) -> R
  where
    F: FnOnce(Observable<Item>) -> R,
  {
    f(self.clone())
  }
}

#[cfg(test)]
mod test {
  use crate::observable;
  use std::sync::{Arc, Mutex};

  #[test]
  fn shares_one_upstream_binding() {
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    observable::from_iter(vec![1, 2, 3])
      .pipe(|source| source.clone().concat(&source))
      .subscribe(move |v| s.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 1, 2, 3]);
  }
}
