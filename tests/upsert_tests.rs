//! Persistence tests: replaying the same issue payload must not duplicate
//! rows, and degenerate payloads (missing authors, no sprint) must still
//! persist cleanly.

mod test_utils;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use uuid::Uuid;

use issuesync::jira::IssueDetail;
use issuesync::models::{comment, issue, jira_user, sprint, worklog};
use issuesync::upsert::upsert_issue_detail;
use test_utils::setup_test_db;

fn sample_detail() -> IssueDetail {
    IssueDetail {
        raw: json!({
            "id": "10001",
            "key": "PROJ-1",
            "fields": {
                "summary": "Fix the flaky import",
                "status": {"name": "In Progress"},
                "issuetype": {"name": "Bug"},
                "created": "2024-03-01T09:00:00.000+0000",
                "updated": "2024-03-05T14:30:00.000+0000",
                "assignee": {
                    "accountId": "acc-alice",
                    "displayName": "Alice",
                    "emailAddress": "alice@example.com",
                },
                "customfield_10020": [{
                    "id": 77,
                    "name": "Sprint 12",
                    "state": "active",
                    "boardId": 4,
                    "startDate": "2024-03-04T00:00:00.000+0000",
                }],
            },
        }),
        comments: vec![
            json!({
                "id": "c-1",
                "author": {"accountId": "acc-bob", "displayName": "Bob"},
                "body": "Looks related to the retry loop",
                "created": "2024-03-02T10:00:00.000+0000",
            }),
            json!({
                "id": "c-2",
                // Deleted account: no accountId.
                "author": {"displayName": "Former user"},
                "body": {"type": "doc", "content": []},
            }),
        ],
        worklogs: vec![json!({
            "id": "w-1",
            "author": {"accountId": "acc-alice", "displayName": "Alice"},
            "timeSpentSeconds": 5400,
            "started": "2024-03-03T08:00:00.000+0000",
        })],
    }
}

#[tokio::test]
async fn replaying_the_same_issue_does_not_duplicate_rows() {
    let db = setup_test_db().await.unwrap();
    let project_id = Uuid::new_v4();
    let detail = sample_detail();

    upsert_issue_detail(&db, project_id, &detail).await.unwrap();
    upsert_issue_detail(&db, project_id, &detail).await.unwrap();

    assert_eq!(issue::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(comment::Entity::find().count(&db).await.unwrap(), 2);
    assert_eq!(worklog::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(sprint::Entity::find().count(&db).await.unwrap(), 1);
    // alice, bob, and the synthesized anonymous author
    assert_eq!(jira_user::Entity::find().count(&db).await.unwrap(), 3);
}

#[tokio::test]
async fn persists_issue_fields_and_watermark() {
    let db = setup_test_db().await.unwrap();
    let project_id = Uuid::new_v4();

    let updated = upsert_issue_detail(&db, project_id, &sample_detail())
        .await
        .unwrap();
    assert!(updated.is_some());

    let row = issue::Entity::find_by_id("10001")
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.key, "PROJ-1");
    assert_eq!(row.summary, "Fix the flaky import");
    assert_eq!(row.status.as_deref(), Some("In Progress"));
    assert_eq!(row.assignee_account_id.as_deref(), Some("acc-alice"));
    assert_eq!(row.sprint_id, Some(77));
    assert_eq!(row.payload["fields"]["summary"], "Fix the flaky import");
}

#[tokio::test]
async fn synthesizes_author_for_anonymized_comments() {
    let db = setup_test_db().await.unwrap();
    upsert_issue_detail(&db, Uuid::new_v4(), &sample_detail())
        .await
        .unwrap();

    let row = comment::Entity::find_by_id("c-2")
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.author_account_id, "anon-c-2");

    let anon = jira_user::Entity::find_by_id("anon-c-2")
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(anon.display_name, "Former user");
}

#[tokio::test]
async fn reassignment_updates_in_place() {
    let db = setup_test_db().await.unwrap();
    let project_id = Uuid::new_v4();

    upsert_issue_detail(&db, project_id, &sample_detail())
        .await
        .unwrap();

    let mut reassigned = sample_detail();
    reassigned.raw["fields"]["assignee"] = json!({
        "accountId": "acc-bob",
        "displayName": "Bob",
    });
    reassigned.raw["fields"]["status"] = json!({"name": "Done"});
    upsert_issue_detail(&db, project_id, &reassigned)
        .await
        .unwrap();

    let row = issue::Entity::find_by_id("10001")
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.assignee_account_id.as_deref(), Some("acc-bob"));
    assert_eq!(row.status.as_deref(), Some("Done"));
    assert_eq!(issue::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn issue_without_sprint_or_assignee_persists() {
    let db = setup_test_db().await.unwrap();
    let detail = IssueDetail {
        raw: json!({
            "id": "10002",
            "key": "PROJ-2",
            "fields": {"summary": "Backlog item", "updated": "2024-03-05T14:30:00.000+0000"},
        }),
        comments: vec![],
        worklogs: vec![],
    };

    upsert_issue_detail(&db, Uuid::new_v4(), &detail)
        .await
        .unwrap();

    let row = issue::Entity::find_by_id("10002")
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(row.assignee_account_id.is_none());
    assert!(row.sprint_id.is_none());
    assert_eq!(sprint::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn comments_link_back_to_their_issue() {
    let db = setup_test_db().await.unwrap();
    upsert_issue_detail(&db, Uuid::new_v4(), &sample_detail())
        .await
        .unwrap();

    let linked = comment::Entity::find()
        .filter(comment::Column::IssueId.eq("10001"))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(linked, 2);
}

#[tokio::test]
async fn issue_joins_to_its_sprint() {
    let db = setup_test_db().await.unwrap();
    upsert_issue_detail(&db, Uuid::new_v4(), &sample_detail())
        .await
        .unwrap();

    let (row, linked_sprint) = issue::Entity::find_by_id("10001")
        .find_also_related(sprint::Entity)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.sprint_id, Some(77));
    assert_eq!(linked_sprint.unwrap().name, "Sprint 12");
}
