use std::{
    sync::{Arc, Mutex},
    thread,
};

use tiny_http::{Response, Server};

/// In-process stand-in for the search service. Records every request as
/// `"METHOD /path?query"` and answers with whatever the handler returns.
pub(crate) struct FakeServer {
    pub url: String,
    server: Arc<Server>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeServer {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&str, &str) -> (u16, String) + Send + 'static,
    {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind fake server"));
        let addr = server
            .server_addr()
            .to_ip()
            .expect("fake server listens on tcp");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let worker = Arc::clone(&server);
        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            for request in worker.incoming_requests() {
                let method = request.method().to_string();
                let url = request.url().to_string();
                seen.lock().unwrap().push(format!("{method} {url}"));
                let (status, body) = handler(&method, &url);
                let _ = request.respond(Response::from_string(body).with_status_code(status));
            }
        });

        Self {
            url: format!("http://{addr}"),
            server,
            requests,
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.server.unblock();
    }
}
