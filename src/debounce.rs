use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;
type Action<T> = Arc<dyn Fn(T) -> BoxFuture + Send + Sync>;

/// Trailing-edge debounce: `call` schedules the action after `quiet` and any
/// newer `call` inside that window discards the older one.
///
/// Once the action has started it is never cancelled.
pub struct Debouncer<T> {
    quiet: Duration,
    action: Action<T>,
    generation: Arc<AtomicU64>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(quiet: Duration, action: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            quiet,
            action: Arc::new(move |arg: T| Box::pin(action(arg)) as BoxFuture),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn call(&self, arg: T) -> JoinHandle<()> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = self.generation.clone();
        let action = self.action.clone();
        let quiet = self.quiet;
        tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            if generation.load(Ordering::SeqCst) != ticket {
                debug!(ticket, "Debounced call superseded");
                return;
            }
            action(arg).await;
        })
    }
}
