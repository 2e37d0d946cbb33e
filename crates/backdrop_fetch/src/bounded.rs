//! Bounded-concurrency work runner.

use backdrop_error::{BackdropResult, TaskError, TaskErrorKind};
use futures::FutureExt;
use futures::future::join_all;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Mutex;
use tracing::{debug, error};

/// Run `worker` over `items` with at most `concurrency` in flight.
///
/// `max(1, concurrency)` workers pull items from a shared cursor until it is
/// drained. Results come back in input order no matter which item finishes
/// first. A panicking item yields a [`TaskErrorKind::Panicked`] result for that
/// item only; the remaining items still run.
///
/// Workers are futures on the calling task, so nothing is spawned and the
/// worker closure may borrow from the caller.
///
/// # Examples
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use backdrop_fetch::run_bounded;
///
/// let results = run_bounded(vec![3, 1, 2], |n| async move { Ok::<_, backdrop_error::BackdropError>(n * 10) }, 2).await;
/// let values: Vec<_> = results.into_iter().map(|r| r.unwrap()).collect();
/// assert_eq!(values, vec![30, 10, 20]);
/// # }
/// ```
pub async fn run_bounded<T, R, F, Fut>(
    items: Vec<T>,
    worker: F,
    concurrency: usize,
) -> Vec<BackdropResult<R>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = BackdropResult<R>>,
{
    let total = items.len();
    let lanes = concurrency.max(1).min(total.max(1));
    debug!(total, lanes, "Running bounded work");

    let cursor = Mutex::new(items.into_iter().enumerate());
    let worker = &worker;
    let cursor = &cursor;

    let lane_results = join_all((0..lanes).map(|_| async move {
        let mut finished = Vec::new();
        loop {
            let next = match cursor.lock() {
                Ok(mut items) => items.next(),
                Err(_) => None,
            };
            let Some((index, item)) = next else { break };

            let outcome = AssertUnwindSafe(async { worker(item).await })
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| {
                    let message = panic_message(payload.as_ref());
                    error!(index, message = %message, "Worker panicked");
                    Err(TaskError::new(TaskErrorKind::Panicked { index, message }).into())
                });
            finished.push((index, outcome));
        }
        finished
    }))
    .await;

    let mut slots: Vec<Option<BackdropResult<R>>> = (0..total).map(|_| None).collect();
    for (index, outcome) in lane_results.into_iter().flatten() {
        slots[index] = Some(outcome);
    }
    slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| {
                Err(TaskError::new(TaskErrorKind::Join("item was never run".to_string())).into())
            })
        })
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
