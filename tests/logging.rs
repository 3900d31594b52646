use std::sync::Mutex;

use async_trait::async_trait;
use log::{Level, LevelFilter, Log, Metadata, Record};
use mockito::Server;
use redmine_comm::{ContentHandler, HttpRequest, ReqwestResponse, RequestDispatcher, Response};
use reqwest::Url;

/// Keeps every record logged by this crate.
struct Collector {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for Collector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with("redmine_comm")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.records
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static COLLECTOR: Collector = Collector {
    records: Mutex::new(Vec::new()),
};

struct StatusHandler;

#[async_trait]
impl ContentHandler<ReqwestResponse> for StatusHandler {
    type Output = u16;
    type Error = anyhow::Error;

    async fn process_content(&self, response: &mut ReqwestResponse) -> anyhow::Result<u16> {
        Ok(response.status().as_u16())
    }
}

#[tokio::test]
async fn test_one_debug_line_per_call() {
    log::set_logger(&COLLECTOR).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let mut server = Server::new_async().await;
    let throttled = server
        .mock("GET", "/issues.json?limit=25")
        .with_status(429)
        .expect(1)
        .create_async()
        .await;
    let ok = server
        .mock("GET", "/issues.json?limit=25")
        .with_status(200)
        .with_body(r#"{"issues":[]}"#)
        .expect(1)
        .create_async()
        .await;

    let uri = format!("{}/issues.json?limit=25", server.url());
    let mut request = HttpRequest::get(Url::parse(&uri).unwrap());
    let status = RequestDispatcher::new(reqwest::Client::new())
        .send_request(&mut request, &StatusHandler)
        .await
        .unwrap();

    throttled.assert_async().await;
    ok.assert_async().await;
    assert_eq!(status, 200);

    let debug: Vec<String> = COLLECTOR
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, _)| *level == Level::Debug)
        .map(|(_, message)| message.clone())
        .collect();
    assert_eq!(debug, vec![format!("GET {} HTTP/1.1", uri)]);
}
