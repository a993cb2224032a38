//! Session state shared by every request issued through one client.
//!
//! Lifecycle of the in-flight refresh marker:
//! - init: no refresh in flight
//! - set: the first caller that needs a refresh starts one
//! - cleared: the refresh settles, whether it succeeded or failed
//!
//! Callers that need a refresh while one is in flight await the same
//! operation instead of starting another.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

use super::error::ApiError;

/// Outcome of a refresh: the authenticated user's id, if the server sent one.
pub type RefreshOutcome = Result<Option<String>, ApiError>;

type InFlightRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

#[derive(Default)]
struct Inner {
    in_flight: Option<InFlightRefresh>,
    user_id: Option<String>,
}

/// Explicitly owned session state. Clones share the same state.
#[derive(Clone, Default)]
pub struct SessionState {
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("refreshing", &self.is_refreshing())
            .field("user_id", &self.user_id())
            .finish()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.lock().in_flight.is_some()
    }

    /// Id of the user from the last successful login or refresh.
    pub fn user_id(&self) -> Option<String> {
        self.lock().user_id.clone()
    }

    pub fn set_user_id(&self, user_id: Option<String>) {
        self.lock().user_id = user_id;
    }

    /// Returns the in-flight refresh, starting it with `start` if none exists.
    ///
    /// The check and the set happen under one lock with no await in between,
    /// so concurrent callers always end up sharing a single refresh. The
    /// returned future clears the marker when it settles.
    pub fn join_or_start_refresh<F>(&self, start: F) -> BoxFuture<'static, RefreshOutcome>
    where
        F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
    {
        let mut inner = self.lock();
        if let Some(existing) = &inner.in_flight {
            tracing::debug!("Joining in-flight session refresh");
            return existing.clone().boxed();
        }

        tracing::debug!("Starting session refresh");
        let state = self.clone();
        let refresh = start();
        let shared = async move {
            let outcome = refresh.await;
            {
                let mut inner = state.lock();
                inner.in_flight = None;
                if let Ok(Some(user_id)) = &outcome {
                    inner.user_id = Some(user_id.clone());
                }
            }
            outcome
        }
        .boxed()
        .shared();

        inner.in_flight = Some(shared.clone());
        shared.boxed()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
