//! HTTP transport seam for the query client

use crate::error::{Result, TxAsmError};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use std::io::{BufRead, BufReader};
use std::time::Duration;
use tracing::debug;

/// Default request timeout for one-shot requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Blocking HTTP operations the client needs.
///
/// `get_json` and `post_form` hand back the decoded body whatever the
/// status code; problem documents are interpreted by the caller.
pub trait HorizonTransport {
    fn get_json(&self, url: &str) -> Result<serde_json::Value>;

    /// Plain-text GET; non-2xx statuses are errors
    fn get_text(&self, url: &str) -> Result<String>;

    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<serde_json::Value>;

    /// Open a server-sent event stream
    fn open_stream(&self, url: &str) -> Result<Box<dyn BufRead + Send>>;
}

/// [`HorizonTransport`] over `reqwest::blocking`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    stream_client: Client,
}

impl HttpTransport {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        // event streams stay open indefinitely
        let stream_client = Client::builder().timeout(None::<Duration>).build()?;
        Ok(Self {
            client,
            stream_client,
        })
    }

    fn decode(status: u16, body: &str) -> Result<serde_json::Value> {
        serde_json::from_str(body).map_err(|e| {
            if (200..300).contains(&status) {
                TxAsmError::DeserializationError(e.to_string())
            } else {
                TxAsmError::Horizon {
                    status,
                    title: body.chars().take(200).collect(),
                }
            }
        })
    }
}

impl HorizonTransport for HttpTransport {
    fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        debug!(url, "GET");
        let response = self.client.get(url).header(ACCEPT, "application/json").send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Self::decode(status, &body)
    }

    fn get_text(&self, url: &str) -> Result<String> {
        debug!(url, "GET");
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(TxAsmError::Horizon {
                status: status.as_u16(),
                title: format!("GET {} failed", url),
            });
        }
        Ok(response.text()?)
    }

    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<serde_json::Value> {
        debug!(url, "POST");
        let response = self.client.post(url).form(form).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Self::decode(status, &body)
    }

    fn open_stream(&self, url: &str) -> Result<Box<dyn BufRead + Send>> {
        debug!(url, "opening event stream");
        let response = self
            .stream_client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(TxAsmError::Horizon {
                status: status.as_u16(),
                title: format!("stream {} refused", url),
            });
        }
        Ok(Box::new(BufReader::new(response)))
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording transport used by the client tests

    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::Cursor;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Request {
        Get(String),
        Post(String, Vec<(String, String)>),
        Stream(String),
    }

    #[derive(Default)]
    pub struct MockTransport {
        json: HashMap<String, serde_json::Value>,
        text: HashMap<String, String>,
        streams: HashMap<String, String>,
        post_response: Option<serde_json::Value>,
        pub requests: RefCell<Vec<Request>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_json(mut self, url: &str, body: serde_json::Value) -> Self {
            self.json.insert(url.to_string(), body);
            self
        }

        pub fn with_text(mut self, url: &str, body: &str) -> Self {
            self.text.insert(url.to_string(), body.to_string());
            self
        }

        pub fn with_stream(mut self, url: &str, body: &str) -> Self {
            self.streams.insert(url.to_string(), body.to_string());
            self
        }

        pub fn with_post_response(mut self, body: serde_json::Value) -> Self {
            self.post_response = Some(body);
            self
        }

        pub fn requests(&self) -> Vec<Request> {
            self.requests.borrow().clone()
        }

        fn not_found(url: &str) -> TxAsmError {
            TxAsmError::NetworkError(format!("unexpected request {}", url))
        }
    }

    impl HorizonTransport for MockTransport {
        fn get_json(&self, url: &str) -> Result<serde_json::Value> {
            self.requests.borrow_mut().push(Request::Get(url.to_string()));
            self.json.get(url).cloned().ok_or_else(|| Self::not_found(url))
        }

        fn get_text(&self, url: &str) -> Result<String> {
            self.requests.borrow_mut().push(Request::Get(url.to_string()));
            self.text.get(url).cloned().ok_or_else(|| Self::not_found(url))
        }

        fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<serde_json::Value> {
            let form = form
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            self.requests
                .borrow_mut()
                .push(Request::Post(url.to_string(), form));
            self.post_response.clone().ok_or_else(|| Self::not_found(url))
        }

        fn open_stream(&self, url: &str) -> Result<Box<dyn BufRead + Send>> {
            self.requests.borrow_mut().push(Request::Stream(url.to_string()));
            let body = self.streams.get(url).cloned().ok_or_else(|| Self::not_found(url))?;
            Ok(Box::new(Cursor::new(body.into_bytes())))
        }
    }
}
