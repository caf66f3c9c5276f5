//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP through the default `UreqTransport`.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use textrazor::{
    AccountManager, Category, ClassifierManager, DictionaryEntry, DictionaryManager,
    DictionaryOptions, Error, Settings, TextRazor,
};

const API_KEY: &str = "integration-key";

/// Start the mock server on a random port in a background thread.
fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, API_KEY).await
        })
        .unwrap();
    });

    addr
}

/// Serve the same raw HTTP response to every connection, counting requests.
fn start_raw_server(status_line: &str, extra_headers: &str, body: &[u8]) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let mut response = format!(
        "HTTP/1.1 {status_line}\r\n{extra_headers}Content-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(body);

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            counter.fetch_add(1, Ordering::SeqCst);
            read_request(&mut stream);
            let _ = stream.write_all(&response);
        }
    });
    (addr, hits)
}

/// Consume one request: headers, then `Content-Length` bytes of body.
fn read_request(stream: &mut TcpStream) {
    let mut reader = BufReader::new(stream);
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            return;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0; content_length];
    let _ = reader.read_exact(&mut body);
}

fn settings(addr: SocketAddr) -> Settings {
    Settings::new()
        .with_api_key(API_KEY)
        .with_end_point(format!("http://{addr}/"))
        .with_encryption(false)
        .with_connect_timeout_seconds(5)
        .with_timeout_seconds(10)
}

#[test]
fn dictionary_lifecycle_and_analysis() {
    let addr = start_server();
    let settings = settings(addr);
    let dictionaries = DictionaryManager::new(&settings).unwrap();

    // Step 1: no dictionaries yet.
    let all = dictionaries.all_dictionaries().unwrap();
    assert!(all["response"]["dictionaries"].as_array().unwrap().is_empty());

    // Step 2: create a dictionary.
    let options = DictionaryOptions {
        case_insensitive: Some(true),
        ..Default::default()
    };
    dictionaries.create_dictionary("banks", &options).unwrap();
    let fetched = dictionaries.get_dictionary("banks").unwrap();
    assert_eq!(fetched["response"]["caseInsensitive"], true);

    // Step 3: add entries, one with a server-assigned id.
    let added = dictionaries
        .add_entries(
            "banks",
            &[
                DictionaryEntry::new("Barclays").with_id("barclays"),
                DictionaryEntry::new("Lloyds"),
            ],
        )
        .unwrap();
    let generated = added["response"]["entries"][1]["id"].as_str().unwrap().to_string();

    // Step 4: the added entry can be fetched back by id.
    let entry = dictionaries.get_entry("banks", "barclays").unwrap();
    assert_eq!(entry["response"]["id"], "barclays");
    assert_eq!(entry["response"]["text"], "Barclays");
    let entry = dictionaries.get_entry("banks", &generated).unwrap();
    assert_eq!(entry["response"]["text"], "Lloyds");

    // Step 5: page through entries.
    let page = dictionaries.all_entries("banks", Some(1), Some(0)).unwrap();
    assert_eq!(page["response"]["total"], 2);
    assert_eq!(page["response"]["entries"].as_array().unwrap().len(), 1);

    // Step 6: analysis picks up dictionary matches.
    let mut client = TextRazor::new(&settings).unwrap();
    client
        .options_mut()
        .add_extractor("entities")
        .add_entity_dictionary("banks");
    let reply = client
        .analyze("LONDON - barclays misled shareholders")
        .unwrap();
    assert_eq!(reply["ok"], true);
    assert_eq!(reply["response"]["entities"][0]["entityId"], "barclays");

    // Step 7: delete an entry, then the dictionary.
    dictionaries.delete_entry("banks", "barclays").unwrap();
    let err = dictionaries.get_entry("banks", "barclays").unwrap_err();
    assert!(matches!(err, Error::Service { status: 404, .. }));

    dictionaries.delete_dictionary("banks").unwrap();
    let err = dictionaries.delete_dictionary("banks").unwrap_err();
    assert!(matches!(err, Error::Service { status: 404, .. }));
}

#[test]
fn classifier_lifecycle() {
    let addr = start_server();
    let classifiers = ClassifierManager::new(&settings(addr)).unwrap();

    classifiers
        .create_classifier(
            "topics",
            &[
                Category::new("1", "concept('sport')").with_label("Sport"),
                Category::new("2", "concept('politics')").with_label("Politics"),
            ],
        )
        .unwrap();

    let all = classifiers.all_categories("topics", None, None).unwrap();
    assert_eq!(all["response"]["total"], 2);

    let category = classifiers.get_category("topics", "2").unwrap();
    assert_eq!(category["response"]["label"], "Politics");

    let mut client = TextRazor::new(&settings(addr)).unwrap();
    client
        .options_mut()
        .add_classifier("topics")
        .set_classifier_max_categories(1);
    let reply = client.analyze("Sport and Politics").unwrap();
    assert_eq!(reply["response"]["categories"].as_array().unwrap().len(), 1);

    classifiers.delete_category("topics", "1").unwrap();
    let err = classifiers.get_category("topics", "1").unwrap_err();
    assert!(matches!(err, Error::Service { status: 404, .. }));

    classifiers
        .create_classifier_with_csv("topics", "7,Weather,concept('weather')\n")
        .unwrap();
    let category = classifiers.get_category("topics", "7").unwrap();
    assert_eq!(category["response"]["label"], "Weather");

    classifiers.delete_classifier("topics").unwrap();
}

#[test]
fn account_reports_usage() {
    let addr = start_server();
    let settings = settings(addr);

    let mut client = TextRazor::new(&settings).unwrap();
    client.options_mut().add_extractor("words");
    let reply = client.analyze("some text").unwrap();
    let words = reply["response"]["sentences"][0]["words"].as_array().unwrap();
    assert_eq!(words.len(), 2);

    let account = AccountManager::new(&settings).unwrap().get_account().unwrap();
    assert_eq!(account["response"]["requestsUsedToday"], 1);
}

#[test]
fn service_errors_carry_status_and_body() {
    let addr = start_server();

    // No extractor configured.
    let client = TextRazor::new(&settings(addr)).unwrap();
    match client.analyze("text").unwrap_err() {
        Error::Service { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("extractor"), "{body}");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // URL analysis is rejected by the stub.
    let mut client = TextRazor::new(&settings(addr)).unwrap();
    client.options_mut().add_extractor("entities");
    let err = client.analyze_url("https://example.com/").unwrap_err();
    assert!(matches!(err, Error::Service { status: 400, .. }));

    // Wrong key.
    let mut client = TextRazor::new(&settings(addr)).unwrap();
    client.connection_mut().set_api_key("wrong");
    client.options_mut().add_extractor("entities");
    let err = client.analyze("text").unwrap_err();
    assert!(matches!(err, Error::Service { status: 401, .. }));
}

#[test]
fn compression_disabled_still_works() {
    let addr = start_server();
    let mut client = TextRazor::new(&settings(addr).with_compression(false)).unwrap();
    client.options_mut().add_extractor("words");
    let reply = client.analyze("plain").unwrap();
    assert_eq!(reply["ok"], true);
}

#[test]
fn unreachable_host_is_transport_error() {
    // Bind then drop to obtain a port nobody listens on.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let mut client = TextRazor::new(&settings(addr)).unwrap();
    client.options_mut().add_extractor("entities");
    let err = client.analyze("text").unwrap_err();
    assert!(matches!(err, Error::Transport { .. }), "got {err:?}");
    assert!(!err.is_service_error());
}

#[test]
fn redirect_is_returned_not_followed() {
    let (addr, hits) = start_raw_server("302 Found", "Location: /elsewhere\r\n", b"");
    let mut client = TextRazor::new(&settings(addr)).unwrap();
    client.options_mut().add_extractor("entities");

    let err = client.analyze("text").unwrap_err();
    assert!(matches!(err, Error::Service { status: 302, .. }), "got {err:?}");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn undecodable_200_body_is_malformed_response() {
    let (addr, hits) = start_raw_server("200 OK", "Content-Type: application/json\r\n", b"\xff\xfe");
    let account = AccountManager::new(&settings(addr)).unwrap();

    let err = account.get_account().unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }), "got {err:?}");
    assert!(err.is_service_error());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn undecodable_error_body_keeps_status() {
    let (addr, _) = start_raw_server("500 Internal Server Error", "", b"\xff\xfe");
    let account = AccountManager::new(&settings(addr)).unwrap();

    match account.get_account().unwrap_err() {
        Error::Service { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "\u{fffd}\u{fffd}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
