//! In-memory cluster source for tests

use super::ClusterSource;
use crate::error::QueryError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

enum Response {
    Data(Option<serde_json::Value>),
    Fail(String),
    Panic,
}

/// Mock source answering by path; unknown paths fail
#[derive(Default)]
pub struct MockSource {
    responses: HashMap<String, Response>,
    calls: AtomicUsize,
    paths: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, value: serde_json::Value) -> Self {
        self.responses
            .insert(path.to_string(), Response::Data(Some(value)));
        self
    }

    pub fn with_empty(mut self, path: &str) -> Self {
        self.responses.insert(path.to_string(), Response::Data(None));
        self
    }

    pub fn with_failure(mut self, path: &str, stderr: &str) -> Self {
        self.responses
            .insert(path.to_string(), Response::Fail(stderr.to_string()));
        self
    }

    pub fn with_panic(mut self, path: &str) -> Self {
        self.responses.insert(path.to_string(), Response::Panic);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queried_paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClusterSource for MockSource {
    async fn query(
        &self,
        path: &str,
        _filters: &[(&str, &str)],
    ) -> Result<Option<serde_json::Value>, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().unwrap().push(path.to_string());

        match self.responses.get(path) {
            Some(Response::Data(value)) => Ok(value.clone()),
            Some(Response::Fail(stderr)) => Err(QueryError::CommandFailed {
                path: path.to_string(),
                status: "exit status: 2".to_string(),
                stderr: stderr.clone(),
            }),
            Some(Response::Panic) => panic!("mock source panic for {path}"),
            None => Err(QueryError::CommandFailed {
                path: path.to_string(),
                status: "exit status: 2".to_string(),
                stderr: format!("no such path '{path}'"),
            }),
        }
    }
}
