//! Transport-layer tests against a mock Jira server: token pagination,
//! offset draining, and classified error surfacing.

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use issuesync::credentials::SiteCredentials;
use issuesync::error::ErrorCode;
use issuesync::jira::{IssueDetailOptions, JiraClient};

fn client_for(server: &MockServer) -> JiraClient {
    let credentials = SiteCredentials {
        base_url: server.uri(),
        admin_email: "admin@example.com".to_string(),
        api_token: "token".to_string(),
    };
    JiraClient::new(&credentials, 100).unwrap()
}

fn comment_page(start_at: u64, count: usize, total: u64) -> Value {
    let comments: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": format!("{}", start_at as usize + i),
                "author": {"accountId": "acc-1", "displayName": "Alice"},
                "body": "text",
            })
        })
        .collect();
    json!({
        "startAt": start_at,
        "maxResults": 100,
        "total": total,
        "comments": comments,
    })
}

#[tokio::test]
async fn comment_drain_issues_one_request_per_page() {
    let server = MockServer::start().await;

    for (start_at, count) in [(0u64, 100usize), (100, 100), (200, 50)] {
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/PROJ-1/comment"))
            .and(query_param("startAt", start_at.to_string()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(comment_page(start_at, count, 250)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let comments = client_for(&server)
        .fetch_comments("PROJ-1")
        .await
        .unwrap();
    assert_eq!(comments.len(), 250);
}

#[tokio::test]
async fn worklog_drain_stops_at_total() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/PROJ-2/worklog"))
        .and(query_param("startAt", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "startAt": 0,
            "maxResults": 100,
            "total": 2,
            "worklogs": [
                {"id": "w1", "timeSpentSeconds": 3600},
                {"id": "w2", "timeSpentSeconds": 1800},
            ],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let worklogs = client_for(&server)
        .fetch_worklogs("PROJ-2")
        .await
        .unwrap();
    assert_eq!(worklogs.len(), 2);
}

#[tokio::test]
async fn search_follows_page_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/search/jql"))
        .and(query_param("nextPageToken", "t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issues": [{"id": "2", "key": "PROJ-2"}],
            "isLast": true,
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/search/jql"))
        .and(query_param_is_missing("nextPageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issues": [{"id": "1", "key": "PROJ-1"}],
            "nextPageToken": "t2",
            "isLast": false,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.search("project = PROJ", None).await.unwrap();
    assert!(first.has_more());
    assert_eq!(first.issues.len(), 1);

    let second = client
        .search("project = PROJ", first.next_page_token.as_deref())
        .await
        .unwrap();
    assert!(!second.has_more());
    assert_eq!(second.issues[0]["key"], "PROJ-2");
}

#[tokio::test]
async fn vendor_error_code_wins_over_http_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/search/jql"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "errorCode": "SUSPENDED_PAYMENT",
            "errorMessages": ["The site is suspended"],
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .search("project = PROJ", None)
        .await
        .err()
        .unwrap();
    assert_eq!(err.code(), ErrorCode::SuspendedPayment);
    assert!(!err.retryable());
}

#[tokio::test]
async fn rate_limit_is_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/search/jql"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "errorCode": "RATE_LIMIT_EXCEEDED",
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .search("project = PROJ", None)
        .await
        .err()
        .unwrap();
    assert_eq!(err.code(), ErrorCode::RateLimit);
    assert!(err.retryable());
}

#[tokio::test]
async fn connection_refused_classifies_as_network() {
    let credentials = SiteCredentials {
        // Reserved port with nothing listening.
        base_url: "http://127.0.0.1:9".to_string(),
        admin_email: "admin@example.com".to_string(),
        api_token: "token".to_string(),
    };
    let client = JiraClient::new(&credentials, 100).unwrap();

    let err = client.search("project = PROJ", None).await.err().unwrap();
    assert_eq!(err.code(), ErrorCode::Network);
    assert!(err.retryable());
    assert!(err.classification.status.is_none());
}

#[tokio::test]
async fn issue_detail_uses_embedded_lists_when_complete() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/PROJ-1"))
        .and(query_param("expand", "renderedFields,comment,changelog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "1",
            "key": "PROJ-1",
            "fields": {
                "summary": "A bug",
                "comment": {"comments": [{"id": "c1"}], "total": 1},
                "worklog": {"worklogs": [], "total": 0},
            },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let detail = client_for(&server)
        .fetch_issue_detail("PROJ-1", IssueDetailOptions::default())
        .await
        .unwrap();
    assert_eq!(detail.comments.len(), 1);
    assert!(detail.worklogs.is_empty());
    // No sub-resource requests were needed; mock expectations verify it.
}

#[tokio::test]
async fn issue_detail_drains_truncated_comments() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/PROJ-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "1",
            "key": "PROJ-1",
            "fields": {
                "summary": "A bug",
                // Embedded list truncated: 1 of 150.
                "comment": {"comments": [{"id": "c1"}], "total": 150},
                "worklog": {"worklogs": [], "total": 0},
            },
        })))
        .mount(&server)
        .await;
    for (start_at, count) in [(0u64, 100usize), (100, 50)] {
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/PROJ-1/comment"))
            .and(query_param("startAt", start_at.to_string()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(comment_page(start_at, count, 150)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let detail = client_for(&server)
        .fetch_issue_detail("PROJ-1", IssueDetailOptions::default())
        .await
        .unwrap();
    assert_eq!(detail.comments.len(), 150);
}

#[tokio::test]
async fn issue_detail_drains_when_containers_are_absent() {
    let server = MockServer::start().await;

    // No comment or worklog containers at all; the payload says nothing
    // about how many exist.
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/PROJ-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "1",
            "key": "PROJ-1",
            "fields": {"summary": "A bug"},
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/PROJ-1/comment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(comment_page(0, 2, 2)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/PROJ-1/worklog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "startAt": 0,
            "maxResults": 100,
            "total": 1,
            "worklogs": [{"id": "w1", "timeSpentSeconds": 600}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let detail = client_for(&server)
        .fetch_issue_detail("PROJ-1", IssueDetailOptions::default())
        .await
        .unwrap();
    assert_eq!(detail.comments.len(), 2);
    assert_eq!(detail.worklogs.len(), 1);
}

#[tokio::test]
async fn sub_resource_drain_ignores_search_page_size() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/PROJ-1/comment"))
        .and(query_param("maxResults", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(comment_page(0, 3, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = SiteCredentials {
        base_url: server.uri(),
        admin_email: "admin@example.com".to_string(),
        api_token: "token".to_string(),
    };
    // A site tuned to small search pages still drains sub-resources at 100.
    let client = JiraClient::new(&credentials, 25).unwrap();

    let comments = client.fetch_comments("PROJ-1").await.unwrap();
    assert_eq!(comments.len(), 3);
}
