//! Integration tests for the issue repository against a real database:
//! - Like toggles keep `likes_count` equal to the liker-set size
//! - Status transitions stamp lifecycle timestamps once
//! - Radius queries return only nearby issues of the same type
//! - Comments, owner edits and deletes

use civic_core::geo::Coordinate;
use civic_core::issue::{IssueStatus, IssueType};
use civic_db::models::issue::{CreateIssue, Issue, UpdateIssue};
use civic_db::repositories::{IssueFilter, IssueRepo, NewIssue, RadiusFilter};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_issue(issue_type: IssueType, latitude: f64, longitude: f64) -> CreateIssue {
    CreateIssue {
        issue_type,
        image: "aGVsbG8=".to_string(),
        latitude,
        longitude,
        landmark: Some("MG Road".to_string()),
        address: None,
        description: Some("Deep pothole near the bus stop".to_string()),
        priority: None,
        criticality: None,
        predicted_type: None,
    }
}

async fn insert(pool: &PgPool, input: &CreateIssue, submitter: &str) -> Issue {
    IssueRepo::create(
        pool,
        &NewIssue {
            input,
            department: input.issue_type.department().as_str(),
            priority: "low",
            criticality: "Normal",
            submitter,
        },
    )
    .await
    .unwrap()
}

async fn liker_count(pool: &PgPool, issue_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM issue_likes WHERE issue_id = $1")
        .bind(issue_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

fn within(lat: f64, lng: f64, radius_m: f64) -> RadiusFilter {
    RadiusFilter {
        center: Coordinate::new(lat, lng).unwrap(),
        radius_m,
    }
}

// ---------------------------------------------------------------------------
// Test: creation defaults
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_defaults(pool: PgPool) {
    let issue = insert(&pool, &new_issue(IssueType::LeakyPipes, 18.52, 73.85), "a@x.com").await;

    assert_eq!(issue.status, "open");
    assert_eq!(issue.department, "DEPT_WATER");
    assert_eq!(issue.likes_count, 0);
    assert_eq!(issue.record_version, 1);
    assert!(issue.in_progress_at.is_none());
    assert!(issue.closed_at.is_none());
}

// ---------------------------------------------------------------------------
// Test: like toggles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_like_count_matches_liker_set(pool: PgPool) {
    let issue = insert(&pool, &new_issue(IssueType::Potholes, 18.52, 73.85), "a@x.com").await;

    let sequence = ["b@x.com", "c@x.com", "b@x.com", "d@x.com", "c@x.com", "e@x.com"];
    for liker in sequence {
        let toggled = IssueRepo::toggle_like(&pool, issue.id, liker)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            i64::from(toggled.issue.likes_count),
            liker_count(&pool, issue.id).await
        );
    }

    let likers = IssueRepo::likers(&pool, issue.id).await.unwrap();
    assert_eq!(likers, ["d@x.com", "e@x.com"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_double_toggle_restores_state(pool: PgPool) {
    let issue = insert(&pool, &new_issue(IssueType::Potholes, 18.52, 73.85), "a@x.com").await;

    let first = IssueRepo::toggle_like(&pool, issue.id, "b@x.com")
        .await
        .unwrap()
        .unwrap();
    assert!(first.liked);
    assert_eq!(first.issue.likes_count, 1);

    let second = IssueRepo::toggle_like(&pool, issue.id, "b@x.com")
        .await
        .unwrap()
        .unwrap();
    assert!(!second.liked);
    assert_eq!(second.issue.likes_count, 0);
    assert!(IssueRepo::likers(&pool, issue.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_likes_keep_count_consistent(pool: PgPool) {
    let issue = insert(&pool, &new_issue(IssueType::Garbage, 18.52, 73.85), "a@x.com").await;

    let issue_id = issue.id;
    let mut handles = Vec::new();
    for i in 0..10 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            IssueRepo::toggle_like(&pool, issue_id, &format!("user{i}@x.com"))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let reloaded = IssueRepo::find_by_id(&pool, issue.id).await.unwrap().unwrap();
    assert_eq!(reloaded.likes_count, 10);
    assert_eq!(liker_count(&pool, issue.id).await, 10);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_toggle_on_missing_issue_returns_none(pool: PgPool) {
    let result = IssueRepo::toggle_like(&pool, 999_999, "b@x.com").await.unwrap();
    assert!(result.is_none());
}

// ---------------------------------------------------------------------------
// Test: comments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comments_append_in_order(pool: PgPool) {
    let issue = insert(&pool, &new_issue(IssueType::Potholes, 18.52, 73.85), "a@x.com").await;

    IssueRepo::add_comment(&pool, issue.id, "b@x.com", "Still there")
        .await
        .unwrap()
        .unwrap();
    IssueRepo::add_comment(&pool, issue.id, "c@x.com", "Getting worse")
        .await
        .unwrap()
        .unwrap();

    let detail = IssueRepo::find_detail(&pool, issue.id).await.unwrap().unwrap();
    let bodies: Vec<_> = detail.comments.iter().map(|c| c.body.as_str()).collect();
    assert_eq!(bodies, ["Still there", "Getting worse"]);
    assert_eq!(detail.issue.likes_count, 0);

    let missing = IssueRepo::add_comment(&pool, 999_999, "b@x.com", "hello")
        .await
        .unwrap();
    assert!(missing.is_none());
}

// ---------------------------------------------------------------------------
// Test: status transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_closed_at_is_stamped_once(pool: PgPool) {
    let issue = insert(&pool, &new_issue(IssueType::Potholes, 18.52, 73.85), "a@x.com").await;

    let resolved = IssueRepo::transition_status(
        &pool,
        issue.id,
        IssueStatus::Open,
        IssueStatus::Resolved,
    )
    .await
    .unwrap()
    .unwrap();
    let first_closed = resolved.closed_at.expect("closed_at stamped");
    assert!(resolved.in_progress_at.is_none());

    let reopened = IssueRepo::transition_status(
        &pool,
        issue.id,
        IssueStatus::Resolved,
        IssueStatus::InProgress,
    )
    .await
    .unwrap()
    .unwrap();
    assert!(reopened.in_progress_at.is_some());
    assert_eq!(reopened.closed_at, Some(first_closed));

    let resolved_again = IssueRepo::transition_status(
        &pool,
        issue.id,
        IssueStatus::InProgress,
        IssueStatus::Resolved,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(resolved_again.status, "resolved");
    assert_eq!(resolved_again.closed_at, Some(first_closed));
    assert_eq!(resolved_again.in_progress_at, reopened.in_progress_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_transition_from_stale_status_does_nothing(pool: PgPool) {
    let issue = insert(&pool, &new_issue(IssueType::Potholes, 18.52, 73.85), "a@x.com").await;

    let stale = IssueRepo::transition_status(
        &pool,
        issue.id,
        IssueStatus::InProgress,
        IssueStatus::Resolved,
    )
    .await
    .unwrap();
    assert!(stale.is_none());

    let reloaded = IssueRepo::find_by_id(&pool, issue.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, "open");
    assert!(reloaded.closed_at.is_none());
}

// ---------------------------------------------------------------------------
// Test: geospatial duplicate finder
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_nearby_duplicate_scenario(pool: PgPool) {
    let first = insert(&pool, &new_issue(IssueType::Potholes, 18.52, 73.85), "a@x.com").await;
    let second = insert(&pool, &new_issue(IssueType::Potholes, 18.5205, 73.8505), "b@x.com").await;
    // Same place, other category.
    insert(&pool, &new_issue(IssueType::Garbage, 18.5205, 73.8505), "c@x.com").await;
    // Same category, several kilometres away.
    insert(&pool, &new_issue(IssueType::Potholes, 18.60, 73.85), "d@x.com").await;

    let found = IssueRepo::find_nearby(&pool, "potholes", within(18.52, 73.85, 500.0), 50)
        .await
        .unwrap();

    let ids: Vec<_> = found.iter().map(|n| n.issue.id).collect();
    assert_eq!(ids, [first.id, second.id]);
    assert!(found[0].distance_m < 1.0);
    assert!((60.0..85.0).contains(&found[1].distance_m));
    assert!(found.iter().all(|n| n.distance_m <= 500.0));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_nearby_with_no_matches_is_empty(pool: PgPool) {
    insert(&pool, &new_issue(IssueType::Potholes, 18.52, 73.85), "a@x.com").await;

    let found = IssueRepo::find_nearby(&pool, "potholes", within(19.07, 72.87, 500.0), 50)
        .await
        .unwrap();
    assert!(found.is_empty());
}

// ---------------------------------------------------------------------------
// Test: listing, edits and deletes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters(pool: PgPool) {
    insert(&pool, &new_issue(IssueType::Potholes, 18.52, 73.85), "a@x.com").await;
    insert(&pool, &new_issue(IssueType::LeakyPipes, 18.52, 73.85), "b@x.com").await;
    insert(&pool, &new_issue(IssueType::Potholes, 19.07, 72.87), "b@x.com").await;

    let by_submitter = IssueRepo::list_filtered(
        &pool,
        &IssueFilter {
            submitter: Some("b@x.com"),
            ..Default::default()
        },
        50,
        0,
    )
    .await
    .unwrap();
    assert_eq!(by_submitter.len(), 2);

    let water = IssueRepo::list_filtered(
        &pool,
        &IssueFilter {
            department: Some("DEPT_WATER"),
            ..Default::default()
        },
        50,
        0,
    )
    .await
    .unwrap();
    assert_eq!(water.len(), 1);
    assert_eq!(water[0].issue_type, "leaky_pipes");

    let near_pune = IssueRepo::list_filtered(
        &pool,
        &IssueFilter {
            issue_type: Some("potholes"),
            within: Some(within(18.52, 73.85, 5_000.0)),
            ..Default::default()
        },
        50,
        0,
    )
    .await
    .unwrap();
    assert_eq!(near_pune.len(), 1);
    assert_eq!(near_pune[0].submitter, "a@x.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_and_delete(pool: PgPool) {
    let issue = insert(&pool, &new_issue(IssueType::Potholes, 18.52, 73.85), "a@x.com").await;
    IssueRepo::toggle_like(&pool, issue.id, "b@x.com").await.unwrap();

    let updated = IssueRepo::update(
        &pool,
        issue.id,
        &UpdateIssue {
            description: None,
            landmark: Some("FC Road".to_string()),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.landmark.as_deref(), Some("FC Road"));
    assert_eq!(updated.description, issue.description);

    assert!(IssueRepo::delete(&pool, issue.id).await.unwrap());
    assert!(!IssueRepo::delete(&pool, issue.id).await.unwrap());
    assert_eq!(liker_count(&pool, issue.id).await, 0);
}
