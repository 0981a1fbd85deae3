//! A REST client that records requests and answers with canned bodies.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use discord_structures::model::{Cache, Context};
use discord_structures::{Rest, RestRequest, Result};
use futures::future::BoxFuture;
use serde_json::Value;

#[derive(Debug, Default)]
pub struct Recorder {
    requests: Mutex<Vec<RestRequest>>,
    responses: Mutex<VecDeque<Option<Value>>>,
}

impl Recorder {
    /// Queue the body of the next response. Requests without a queued body
    /// get an empty response.
    pub fn respond(&self, body: Option<Value>) {
        self.responses.lock().unwrap().push_back(body);
    }

    pub fn requests(&self) -> Vec<RestRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> RestRequest {
        self.requests().pop().expect("no request was made")
    }
}

impl Rest for Recorder {
    fn request(&self, request: RestRequest) -> BoxFuture<'_, Result<Option<Value>>> {
        self.requests.lock().unwrap().push(request);
        let response = self.responses.lock().unwrap().pop_front().flatten();
        Box::pin(async move { Ok(response) })
    }
}

pub fn context() -> (Context, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let rest: Arc<dyn Rest> = recorder.clone();
    (Context::from_parts(rest, Arc::new(Cache::default())), recorder)
}
