//! GitHubClient against a one-shot local HTTP server.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use filesync_core::RepoSlug;
use filesync_github::{
    GitHubClient, HostedRepository, PublishError, PublishResult, PullRequest, PullRequestHost,
};

/// Serve one request per entry of `responses`, in order; returns the raw requests.
fn serve(responses: Vec<(&'static str, String)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");

    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream);

            let mut head = String::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("read line");
                if let Some(value) = line
                    .to_ascii_lowercase()
                    .strip_prefix("content-length:")
                    .map(str::trim)
                {
                    content_length = value.parse().expect("content length");
                }
                let done = line == "\r\n";
                head.push_str(&line);
                if done {
                    break;
                }
            }
            let mut request_body = vec![0u8; content_length];
            reader.read_exact(&mut request_body).expect("read body");

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).expect("write");
            stream.flush().expect("flush");

            requests.push(format!("{head}{}", String::from_utf8_lossy(&request_body)));
        }
        requests
    });

    (format!("http://{addr}"), handle)
}

/// Serve exactly one request with `status` and `body`; returns the raw request.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let (api, server) = serve(vec![(status, body.to_string())]);
    let handle = thread::spawn(move || {
        server
            .join()
            .expect("server")
            .pop()
            .expect("one request")
    });
    (api, handle)
}

fn repo_page(prefix: &str, count: usize) -> String {
    let entries: Vec<String> = (0..count)
        .map(|i| format!(r#"{{"name":"{prefix}-{i}","archived":{}}}"#, i == 0))
        .collect();
    format!("[{}]", entries.join(","))
}

fn request() -> PullRequest {
    PullRequest {
        title: "file-sync".to_string(),
        body: "Synchronized files".to_string(),
        head: "file-sync".to_string(),
        base: "main".to_string(),
        draft: false,
    }
}

#[test]
fn created_pull_request_is_reported() {
    let (api, server) = serve_once(
        "201 Created",
        r#"{"number":7,"html_url":"https://github.com/octo/repo/pull/7"}"#,
    );
    let client = GitHubClient::new(api, Some("tok".to_string()));

    let result = client
        .create_pull_request(&RepoSlug::new("octo", "repo"), &request())
        .expect("publish");
    assert_eq!(
        result,
        PublishResult::Created {
            number: 7,
            url: "https://github.com/octo/repo/pull/7".to_string()
        }
    );

    let raw = server.join().expect("server");
    let lower = raw.to_ascii_lowercase();
    assert!(raw.starts_with("POST /repos/octo/repo/pulls "), "{raw}");
    assert!(lower.contains("authorization: bearer tok"), "{raw}");
    assert!(raw.contains(r#""head":"file-sync""#), "{raw}");
    assert!(raw.contains(r#""base":"main""#), "{raw}");
    assert!(raw.contains(r#""draft":false"#), "{raw}");
}

#[test]
fn already_exists_is_tolerated() {
    let (api, server) = serve_once(
        "422 Unprocessable Entity",
        r#"{"message":"Validation Failed","errors":[{"resource":"PullRequest","code":"custom","message":"A pull request already exists for octo:file-sync."}]}"#,
    );
    let client = GitHubClient::new(api, None);

    let result = client
        .create_pull_request(&RepoSlug::new("octo", "repo"), &request())
        .expect("tolerated");
    assert_eq!(result, PublishResult::AlreadyExists);

    let raw = server.join().expect("server");
    assert!(
        !raw.to_ascii_lowercase().contains("authorization:"),
        "no token means no auth header"
    );
}

#[test]
fn server_error_is_a_publish_failure() {
    let (api, server) = serve_once(
        "403 Forbidden",
        r#"{"message":"Resource not accessible by integration"}"#,
    );
    let client = GitHubClient::new(api, Some("tok".to_string()));

    let err = client
        .create_pull_request(&RepoSlug::new("octo", "repo"), &request())
        .unwrap_err();
    server.join().expect("server");
    match err {
        PublishError::Rejected { status, message } => {
            assert_eq!(status, 403);
            assert!(message.contains("Resource not accessible"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unreachable_host_is_a_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = GitHubClient::new(format!("http://{addr}"), None);
    let err = client
        .create_pull_request(&RepoSlug::new("octo", "repo"), &request())
        .unwrap_err();
    assert!(matches!(err, PublishError::Transport { .. }), "got: {err}");
}

#[test]
fn repositories_are_listed_across_pages() {
    let (api, server) = serve(vec![
        ("200 OK", repo_page("svc", 100)),
        ("200 OK", repo_page("lib", 2)),
    ]);
    let client = GitHubClient::new(api, Some("tok".to_string()));

    let repos = client.list_repositories("octo").expect("listing");
    assert_eq!(repos.len(), 102);
    assert_eq!(
        repos[0],
        HostedRepository {
            slug: RepoSlug::new("octo", "svc-0"),
            archived: true,
        }
    );
    assert_eq!(repos[101].slug, RepoSlug::new("octo", "lib-1"));
    assert!(!repos[101].archived);

    let raw = server.join().expect("server");
    assert_eq!(raw.len(), 2);
    assert!(raw[0].starts_with("GET /orgs/octo/repos?"), "{}", raw[0]);
    assert!(raw[0].contains("per_page=100"), "{}", raw[0]);
    assert!(raw[0].contains("&page=1 "), "{}", raw[0]);
    assert!(raw[1].contains("&page=2 "), "{}", raw[1]);
    assert!(raw[1].to_ascii_lowercase().contains("authorization: bearer tok"));
}

#[test]
fn short_first_page_ends_the_listing() {
    let (api, server) = serve(vec![("200 OK", "[]".to_string())]);
    let client = GitHubClient::new(api, None);

    let repos = client.list_repositories("octo").expect("listing");
    assert!(repos.is_empty());
    assert_eq!(server.join().expect("server").len(), 1);
}

#[test]
fn unknown_organization_is_rejected() {
    let (api, server) = serve(vec![("404 Not Found", r#"{"message":"Not Found"}"#.to_string())]);
    let client = GitHubClient::new(api, None);

    let err = client.list_repositories("nobody").unwrap_err();
    server.join().expect("server");
    assert!(
        matches!(err, PublishError::Rejected { status: 404, .. }),
        "got: {err}"
    );
}
