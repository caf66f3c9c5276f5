use std::cell::RefCell;

use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::settings::Settings;
use crate::transport::Transport;

/// Records every request and answers each from `reply`.
pub(crate) struct Recorder {
    pub(crate) requests: RefCell<Vec<HttpRequest>>,
    reply: fn() -> Result<HttpResponse>,
}

impl Default for Recorder {
    /// Answers `200 {"ok":true}`.
    fn default() -> Self {
        Self::replying(|| Ok(HttpResponse::new(200, r#"{"ok":true}"#)))
    }
}

impl Recorder {
    pub(crate) fn replying(reply: fn() -> Result<HttpResponse>) -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            reply,
        }
    }

    pub(crate) fn only(&self) -> HttpRequest {
        let requests = self.requests.borrow();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests[0].clone()
    }

    pub(crate) fn count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for Recorder {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.borrow_mut().push(request.clone());
        (self.reply)()
    }
}

pub(crate) fn settings() -> Settings {
    Settings::new().with_api_key("test-key")
}
