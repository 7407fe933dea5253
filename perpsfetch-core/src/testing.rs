//! In-memory fake of the Perps API for tests.
//!
//! `FakeApi` implements [`Transport`]: routes are matched by URL suffix and
//! every request is recorded. Clones share state, so a test can hand one
//! clone to a client and inspect the call log through another.

use crate::api::{ApiError, ApiResponse, QueryParams, Transport};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One request seen by the fake.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub params: QueryParams,
    pub api_key: String,
}

#[derive(Debug, Clone)]
enum Route {
    Fixed(ApiResponse),
    /// Serves `records[offset..offset + min(limit, cap)]`.
    Paged { records: Vec<Value>, cap: usize },
    Fail(ApiError),
}

#[derive(Debug, Default)]
struct FakeState {
    routes: HashMap<String, Route>,
    calls: Vec<RecordedCall>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Always answer `endpoint` with `response`.
    pub fn respond(&self, endpoint: &str, response: ApiResponse) {
        self.state()
            .routes
            .insert(endpoint.to_string(), Route::Fixed(response));
    }

    /// Serve `records` honouring `limit` and `offset`.
    pub fn paged(&self, endpoint: &str, records: Vec<Value>) {
        self.paged_with_cap(endpoint, records, usize::MAX);
    }

    /// Like [`paged`](Self::paged), but never return more than `cap` records per call.
    pub fn paged_with_cap(&self, endpoint: &str, records: Vec<Value>, cap: usize) {
        self.state()
            .routes
            .insert(endpoint.to_string(), Route::Paged { records, cap });
    }

    /// Fail every request to `endpoint`.
    pub fn fail(&self, endpoint: &str, error: ApiError) {
        self.state()
            .routes
            .insert(endpoint.to_string(), Route::Fail(error));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    pub fn calls_to(&self, endpoint: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.url.ends_with(endpoint))
            .count()
    }
}

fn param_usize(params: &QueryParams, name: &str) -> Option<usize> {
    params.get(name).and_then(|v| v.parse().ok())
}

impl Transport for FakeApi {
    fn get(
        &self,
        url: &str,
        params: &QueryParams,
        api_key: &str,
    ) -> Result<ApiResponse, ApiError> {
        let mut state = self.state();
        state.calls.push(RecordedCall {
            url: url.to_string(),
            params: params.clone(),
            api_key: api_key.to_string(),
        });

        let route = state
            .routes
            .iter()
            .find(|(endpoint, _)| url.ends_with(endpoint.as_str()))
            .map(|(_, route)| route.clone());

        match route {
            None => Err(ApiError::Http { status: 404 }),
            Some(Route::Fail(e)) => Err(e),
            Some(Route::Fixed(resp)) => Ok(resp),
            Some(Route::Paged { records, cap }) => {
                let offset = param_usize(params, "offset").unwrap_or(0);
                let limit = param_usize(params, "limit").unwrap_or(usize::MAX).min(cap);
                let page = records
                    .into_iter()
                    .skip(offset)
                    .take(limit)
                    .collect::<Vec<_>>();
                Ok(ApiResponse::from_records(page))
            }
        }
    }
}
