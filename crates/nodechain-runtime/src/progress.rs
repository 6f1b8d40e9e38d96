//! Global run progress values.
//!
//! Progress is idle (0) outside a run. A run with `total` steps reports
//! `100 / (total + 1)` on start, which is non-zero and below the first step
//! value, then `completed / total * 100` after every step.

pub use nodechain_store::IDLE_PROGRESS;

/// Progress reported once a run of `total` steps has started.
pub fn started_progress(total: usize) -> f64 {
  100.0 / (total as f64 + 1.0)
}

/// Progress after `completed` of `total` steps.
pub fn step_progress(completed: usize, total: usize) -> f64 {
  if total == 0 {
    return 100.0;
  }
  completed as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_progress_strictly_increases() {
    for total in 1..=300 {
      let mut last = IDLE_PROGRESS;
      let started = started_progress(total);
      assert!(started > last);
      last = started;

      for completed in 1..=total {
        let value = step_progress(completed, total);
        assert!(value > last, "total={} completed={}", total, completed);
        last = value;
      }
      assert_eq!(last, 100.0);
    }
  }
}
