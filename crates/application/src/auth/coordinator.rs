//! Single-flight token refresh.
//!
//! The first request that finds the access token expired becomes the
//! leader and runs the refresh. Requests arriving while it runs register
//! as waiters and receive the leader's new token in arrival order. If the
//! refresh fails the waiters are abandoned, never resolved with a token.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use invoicer_domain::AuthError;
use invoicer_domain::config::DEFAULT_REFRESH_WAIT;
use tokio::sync::oneshot;
use tracing::{debug, warn};

enum State {
    Idle,
    Refreshing {
        waiters: Vec<oneshot::Sender<String>>,
    },
}

enum Role {
    Leader,
    Waiter(oneshot::Receiver<String>),
}

/// Serializes refresh attempts so at most one exchange is in flight.
pub struct RefreshCoordinator {
    state: Mutex<State>,
    wait_timeout: Duration,
}

impl RefreshCoordinator {
    /// Creates an idle coordinator whose waiters give up after `wait_timeout`.
    #[must_use]
    pub const fn new(wait_timeout: Duration) -> Self {
        Self {
            state: Mutex::new(State::Idle),
            wait_timeout,
        }
    }

    /// Returns true while a refresh is in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.lock(), State::Refreshing { .. })
    }

    /// Number of requests currently waiting on the in-flight refresh.
    #[must_use]
    pub fn waiter_count(&self) -> usize {
        match &*self.lock() {
            State::Idle => 0,
            State::Refreshing { waiters } => waiters.len(),
        }
    }

    /// Obtains a fresh access token, running `refresh` only if no other
    /// refresh is in flight.
    ///
    /// # Errors
    ///
    /// - `AuthError::RefreshFailed` (or `RefreshUnavailable`) for the
    ///   leader when `refresh` fails
    /// - `AuthError::RefreshAbandoned` for waiters of a failed refresh
    /// - `AuthError::RefreshTimedOut` for waiters that gave up
    pub async fn refresh_with<F, Fut>(&self, refresh: F) -> Result<String, AuthError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, AuthError>>,
    {
        let role = {
            let mut state = self.lock();
            match &mut *state {
                State::Idle => {
                    *state = State::Refreshing {
                        waiters: Vec::new(),
                    };
                    Role::Leader
                }
                State::Refreshing { waiters } => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Role::Waiter(rx)
                }
            }
        };

        match role {
            Role::Leader => self.lead(refresh).await,
            Role::Waiter(rx) => self.wait(rx).await,
        }
    }

    async fn lead<F, Fut>(&self, refresh: F) -> Result<String, AuthError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, AuthError>>,
    {
        debug!("starting token refresh");
        let guard = LeaderGuard {
            coordinator: self,
            finished: false,
        };
        let outcome = refresh().await;
        let waiters = guard.finish();

        match outcome {
            Ok(token) => {
                debug!(waiters = waiters.len(), "refresh done, releasing waiters");
                for waiter in waiters {
                    // A waiter that timed out has dropped its receiver.
                    let _ = waiter.send(token.clone());
                }
                Ok(token)
            }
            Err(e) => {
                warn!(error = %e, abandoned = waiters.len(), "refresh failed");
                drop(waiters);
                match e {
                    AuthError::RefreshUnavailable => Err(e),
                    _ => Err(AuthError::RefreshFailed),
                }
            }
        }
    }

    async fn wait(&self, rx: oneshot::Receiver<String>) -> Result<String, AuthError> {
        debug!("waiting on in-flight refresh");
        match tokio::time::timeout(self.wait_timeout, rx).await {
            Ok(Ok(token)) => Ok(token),
            Ok(Err(_)) => Err(AuthError::RefreshAbandoned),
            Err(_) => Err(AuthError::RefreshTimedOut {
                waited_ms: u64::try_from(self.wait_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    fn reset(&self) -> Vec<oneshot::Sender<String>> {
        match std::mem::replace(&mut *self.lock(), State::Idle) {
            State::Idle => Vec::new(),
            State::Refreshing { waiters } => waiters,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_WAIT)
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .field("wait_timeout", &self.wait_timeout)
            .finish()
    }
}

/// Returns the coordinator to `Idle` if the leader is dropped mid-refresh.
struct LeaderGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    finished: bool,
}

impl LeaderGuard<'_> {
    fn finish(mut self) -> Vec<oneshot::Sender<String>> {
        self.finished = true;
        self.coordinator.reset()
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let abandoned = self.coordinator.reset();
            warn!(abandoned = abandoned.len(), "refresh leader dropped");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::task::JoinSet;

    async fn slow_refresh(
        calls: Arc<AtomicUsize>,
        result: Result<String, AuthError>,
    ) -> Result<String, AuthError> {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        result
    }

    async fn wait_for_waiters(coordinator: &RefreshCoordinator, count: usize) {
        while coordinator.waiter_count() < count {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_refresh() {
        let coordinator = Arc::new(RefreshCoordinator::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let mut set = JoinSet::new();

        for _ in 0..8 {
            let coordinator = Arc::clone(&coordinator);
            let calls = Arc::clone(&calls);
            set.spawn(async move {
                coordinator
                    .refresh_with(|| slow_refresh(calls, Ok("NEW".to_string())))
                    .await
            });
        }

        let mut tokens = Vec::new();
        while let Some(result) = set.join_next().await {
            tokens.push(result.unwrap().unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(tokens, vec!["NEW".to_string(); 8]);
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failed_refresh_fails_every_caller() {
        let coordinator = Arc::new(RefreshCoordinator::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let mut set = JoinSet::new();

        for _ in 0..5 {
            let coordinator = Arc::clone(&coordinator);
            let calls = Arc::clone(&calls);
            set.spawn(async move {
                coordinator
                    .refresh_with(|| {
                        slow_refresh(
                            calls,
                            Err(AuthError::Transport {
                                status: Some(400),
                                message: "invalid_grant".to_string(),
                            }),
                        )
                    })
                    .await
            });
        }

        let mut errors = Vec::new();
        while let Some(result) = set.join_next().await {
            errors.push(result.unwrap().unwrap_err());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            errors.iter().filter(|e| **e == AuthError::RefreshFailed).count(),
            1
        );
        assert_eq!(
            errors
                .iter()
                .filter(|e| **e == AuthError::RefreshAbandoned)
                .count(),
            4
        );
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn test_waiters_resolve_in_arrival_order() {
        let coordinator = Arc::new(RefreshCoordinator::default());
        let (release_tx, release_rx) = oneshot::channel::<()>();
        let order = Arc::new(Mutex::new(Vec::new()));

        let leader = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move {
                coordinator
                    .refresh_with(|| async move {
                        release_rx.await.unwrap();
                        Ok("T".to_string())
                    })
                    .await
            })
        };
        while !coordinator.is_refreshing() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let mut waiters = Vec::new();
        for id in 0..3 {
            let waiter = Arc::clone(&coordinator);
            let order = Arc::clone(&order);
            waiters.push(tokio::spawn(async move {
                let token = waiter
                    .refresh_with(|| async {
                        Err(AuthError::Validation {
                            message: "waiter must not refresh".to_string(),
                        })
                    })
                    .await
                    .unwrap();
                order.lock().unwrap().push(id);
                token
            }));
            wait_for_waiters(&coordinator, id + 1).await;
        }

        release_tx.send(()).unwrap();
        assert_eq!(leader.await.unwrap().unwrap(), "T");
        for waiter in waiters {
            assert_eq!(waiter.await.unwrap(), "T");
        }
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_waiter_times_out() {
        let coordinator = Arc::new(RefreshCoordinator::new(Duration::from_millis(20)));
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let leader = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move {
                coordinator
                    .refresh_with(|| async move {
                        release_rx.await.unwrap();
                        Ok("LATE".to_string())
                    })
                    .await
            })
        };
        while !coordinator.is_refreshing() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let err = coordinator
            .refresh_with(|| async { Ok("unused".to_string()) })
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::RefreshTimedOut { waited_ms: 20 });

        release_tx.send(()).unwrap();
        assert_eq!(leader.await.unwrap().unwrap(), "LATE");
    }

    #[tokio::test]
    async fn test_dropped_leader_resets_state() {
        let coordinator = Arc::new(RefreshCoordinator::default());

        let leader = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move {
                coordinator
                    .refresh_with(|| std::future::pending::<Result<String, AuthError>>())
                    .await
            })
        };
        while !coordinator.is_refreshing() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let waiter = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move {
                coordinator
                    .refresh_with(|| async { Ok("unused".to_string()) })
                    .await
            })
        };
        wait_for_waiters(&coordinator, 1).await;

        leader.abort();
        assert!(leader.await.unwrap_err().is_cancelled());

        assert_eq!(waiter.await.unwrap(), Err(AuthError::RefreshAbandoned));
        assert!(!coordinator.is_refreshing());
        assert_eq!(
            coordinator
                .refresh_with(|| async { Ok("AGAIN".to_string()) })
                .await
                .unwrap(),
            "AGAIN"
        );
    }

    #[tokio::test]
    async fn test_missing_refresh_token_is_reported_as_such() {
        let coordinator = RefreshCoordinator::default();

        let err = coordinator
            .refresh_with(|| async { Err(AuthError::RefreshUnavailable) })
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::RefreshUnavailable);
    }
}
