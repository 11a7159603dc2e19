//! Repository for the `issues`, `issue_likes` and `issue_comments` tables.

use civic_core::geo::{BoundingBox, Coordinate, EARTH_RADIUS_M};
use civic_core::issue::{IssueStatus, ISSUE_RECORD_VERSION};
use civic_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::issue::{
    CreateIssue, Issue, IssueComment, IssueDetail, IssueSampleRow, LikeToggle, NearbyIssue,
    UpdateIssue,
};

/// Column list for `issues` queries.
const COLUMNS: &str = "\
    id, issue_type, department, image, latitude, longitude, landmark, address, \
    description, status, priority, criticality, submitter, likes_count, \
    in_progress_at, closed_at, record_version, created_at, updated_at";

/// Column list for `issue_comments` queries.
const COMMENT_COLUMNS: &str = "id, issue_id, author, body, created_at";

/// Haversine distance in meters from the point bound at `$lat`/`$lng` to the
/// row's coordinate.
fn distance_sql(lat: usize, lng: usize) -> String {
    format!(
        "(2 * {EARTH_RADIUS_M} * ASIN(LEAST(1, SQRT( \
             POWER(SIN(RADIANS(latitude - ${lat}) / 2), 2) \
             + COS(RADIANS(${lat})) * COS(RADIANS(latitude)) \
             * POWER(SIN(RADIANS(longitude - ${lng}) / 2), 2)))))"
    )
}

/// A circle to restrict a query to.
#[derive(Debug, Clone, Copy)]
pub struct RadiusFilter {
    pub center: Coordinate,
    pub radius_m: f64,
}

impl RadiusFilter {
    fn bbox(&self) -> BoundingBox {
        BoundingBox::around(&self.center, self.radius_m)
    }
}

/// Optional filters for [`IssueRepo::list_filtered`]. Values are already
/// validated against the vocabularies.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter<'a> {
    pub status: Option<&'a str>,
    pub issue_type: Option<&'a str>,
    pub priority: Option<&'a str>,
    pub submitter: Option<&'a str>,
    pub department: Option<&'a str>,
    pub within: Option<RadiusFilter>,
}

/// Issue values resolved by the caller before insert.
#[derive(Debug, Clone)]
pub struct NewIssue<'a> {
    pub input: &'a CreateIssue,
    pub department: &'a str,
    pub priority: &'a str,
    pub criticality: &'a str,
    pub submitter: &'a str,
}

/// Provides CRUD, like/comment and lifecycle operations for issues.
pub struct IssueRepo;

impl IssueRepo {
    /// Insert a new issue with status `open`, returning the full row.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        new: &NewIssue<'_>,
    ) -> Result<Issue, sqlx::Error> {
        let query = format!(
            "INSERT INTO issues \
                (issue_type, department, image, latitude, longitude, landmark, address, \
                 description, priority, criticality, submitter, record_version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        );
        let input = new.input;
        sqlx::query_as::<_, Issue>(&query)
            .bind(input.issue_type.as_str())
            .bind(new.department)
            .bind(&input.image)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.landmark)
            .bind(&input.address)
            .bind(&input.description)
            .bind(new.priority)
            .bind(new.criticality)
            .bind(new.submitter)
            .bind(ISSUE_RECORD_VERSION)
            .fetch_one(executor)
            .await
    }

    /// Find an issue by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM issues WHERE id = $1");
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an issue by ID and lock its row for the rest of the transaction.
    pub async fn find_for_update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM issues WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find an issue with its likers and comments.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<IssueDetail>, sqlx::Error> {
        let Some(issue) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        Self::with_detail(pool, issue).await.map(Some)
    }

    /// Attach likers and comments to an already loaded issue.
    pub async fn with_detail(pool: &PgPool, issue: Issue) -> Result<IssueDetail, sqlx::Error> {
        let likers = Self::likers(pool, issue.id).await?;
        let comments = Self::comments(pool, issue.id).await?;
        Ok(IssueDetail {
            issue,
            likers,
            comments,
        })
    }

    /// List issues with optional filters, newest first.
    pub async fn list_filtered(
        pool: &PgPool,
        filter: &IssueFilter<'_>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Issue>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        for (column, value) in [
            ("status", filter.status),
            ("issue_type", filter.issue_type),
            ("priority", filter.priority),
            ("submitter", filter.submitter),
            ("department", filter.department),
        ] {
            if value.is_some() {
                conditions.push(format!("{column} = ${param_idx}"));
                param_idx += 1;
            }
        }
        if filter.within.is_some() {
            conditions.push(format!(
                "latitude BETWEEN ${} AND ${} AND longitude BETWEEN ${} AND ${} \
                 AND {} <= ${}",
                param_idx,
                param_idx + 1,
                param_idx + 2,
                param_idx + 3,
                distance_sql(param_idx + 4, param_idx + 5),
                param_idx + 6,
            ));
            param_idx += 7;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM issues {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Issue>(&query);
        for value in [
            filter.status,
            filter.issue_type,
            filter.priority,
            filter.submitter,
            filter.department,
        ]
        .into_iter()
        .flatten()
        {
            q = q.bind(value);
        }
        if let Some(within) = filter.within {
            let bbox = within.bbox();
            q = q
                .bind(bbox.min_lat)
                .bind(bbox.max_lat)
                .bind(bbox.min_lng)
                .bind(bbox.max_lng)
                .bind(within.center.latitude)
                .bind(within.center.longitude)
                .bind(within.radius_m);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// Issues of `issue_type` within the radius, nearest first.
    pub async fn find_nearby(
        pool: &PgPool,
        issue_type: &str,
        within: RadiusFilter,
        limit: i64,
    ) -> Result<Vec<NearbyIssue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS}, d.distance_m FROM issues \
             CROSS JOIN LATERAL (SELECT {} AS distance_m) d \
             WHERE issue_type = $3 \
               AND latitude BETWEEN $4 AND $5 \
               AND longitude BETWEEN $6 AND $7 \
               AND d.distance_m <= $8 \
             ORDER BY d.distance_m ASC, id ASC \
             LIMIT $9",
            distance_sql(1, 2)
        );
        let bbox = within.bbox();
        sqlx::query_as::<_, NearbyIssue>(&query)
            .bind(within.center.latitude)
            .bind(within.center.longitude)
            .bind(issue_type)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lng)
            .bind(bbox.max_lng)
            .bind(within.radius_m)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Toggle `liker`'s membership in the issue's liker set.
    ///
    /// The issue row is locked while membership and `likes_count` change, so
    /// the count always equals the set size. Returns `None` if the issue does
    /// not exist.
    pub async fn toggle_like(
        pool: &PgPool,
        issue_id: DbId,
        liker: &str,
    ) -> Result<Option<LikeToggle>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if Self::find_for_update(&mut *tx, issue_id).await?.is_none() {
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM issue_likes WHERE issue_id = $1 AND liker = $2")
            .bind(issue_id)
            .bind(liker)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let liked = removed == 0;
        let delta_sql = if liked {
            sqlx::query("INSERT INTO issue_likes (issue_id, liker) VALUES ($1, $2)")
                .bind(issue_id)
                .bind(liker)
                .execute(&mut *tx)
                .await?;
            "likes_count + 1"
        } else {
            "GREATEST(likes_count - 1, 0)"
        };

        let query = format!(
            "UPDATE issues SET likes_count = {delta_sql} WHERE id = $1 RETURNING {COLUMNS}"
        );
        let issue = sqlx::query_as::<_, Issue>(&query)
            .bind(issue_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(LikeToggle { issue, liked }))
    }

    /// Liker identities in insertion order.
    pub async fn likers<'e, E: PgExecutor<'e>>(
        executor: E,
        issue_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT liker FROM issue_likes WHERE issue_id = $1 ORDER BY id ASC")
            .bind(issue_id)
            .fetch_all(executor)
            .await
    }

    /// Append a comment. Returns `None` if the issue does not exist.
    pub async fn add_comment(
        pool: &PgPool,
        issue_id: DbId,
        author: &str,
        body: &str,
    ) -> Result<Option<IssueComment>, sqlx::Error> {
        let query = format!(
            "INSERT INTO issue_comments (issue_id, author, body) \
             SELECT $1, $2, $3 WHERE EXISTS (SELECT 1 FROM issues WHERE id = $1) \
             RETURNING {COMMENT_COLUMNS}"
        );
        sqlx::query_as::<_, IssueComment>(&query)
            .bind(issue_id)
            .bind(author)
            .bind(body)
            .fetch_optional(pool)
            .await
    }

    /// Comments on an issue, oldest first.
    pub async fn comments(pool: &PgPool, issue_id: DbId) -> Result<Vec<IssueComment>, sqlx::Error> {
        let query = format!(
            "SELECT {COMMENT_COLUMNS} FROM issue_comments WHERE issue_id = $1 ORDER BY id ASC"
        );
        sqlx::query_as::<_, IssueComment>(&query)
            .bind(issue_id)
            .fetch_all(pool)
            .await
    }

    /// Apply an owner's edit. Only non-`None` fields are written.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateIssue,
    ) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!(
            "UPDATE issues SET \
                description = COALESCE($2, description), \
                landmark = COALESCE($3, landmark) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .bind(&input.description)
            .bind(&input.landmark)
            .fetch_optional(pool)
            .await
    }

    /// Delete an issue with its likes and comments.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM issues WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move an issue from `from` to `to` if it is still in `from`.
    ///
    /// The first entry into `inprogress` stamps `in_progress_at` and the first
    /// entry into `resolved` stamps `closed_at`; existing stamps are kept.
    /// Returns `None` when the row is missing or its status has moved on.
    pub async fn transition_status<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        from: IssueStatus,
        to: IssueStatus,
    ) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!(
            "UPDATE issues SET \
                status = $2, \
                in_progress_at = CASE \
                    WHEN $2 = 'inprogress' AND in_progress_at IS NULL THEN NOW() \
                    ELSE in_progress_at END, \
                closed_at = CASE \
                    WHEN $2 = 'resolved' AND closed_at IS NULL THEN NOW() \
                    ELSE closed_at END \
             WHERE id = $1 AND status = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .bind(to.as_str())
            .bind(from.as_str())
            .fetch_optional(executor)
            .await
    }

    /// Analytics projection of every issue, optionally within a radius.
    pub async fn samples(
        pool: &PgPool,
        within: Option<RadiusFilter>,
    ) -> Result<Vec<IssueSampleRow>, sqlx::Error> {
        const SAMPLE_COLUMNS: &str = "issue_type, status, created_at, closed_at";
        match within {
            None => {
                let query = format!("SELECT {SAMPLE_COLUMNS} FROM issues ORDER BY created_at");
                sqlx::query_as::<_, IssueSampleRow>(&query)
                    .fetch_all(pool)
                    .await
            }
            Some(within) => {
                let query = format!(
                    "SELECT {SAMPLE_COLUMNS} FROM issues \
                     WHERE latitude BETWEEN $3 AND $4 \
                       AND longitude BETWEEN $5 AND $6 \
                       AND {} <= $7 \
                     ORDER BY created_at",
                    distance_sql(1, 2)
                );
                let bbox = within.bbox();
                sqlx::query_as::<_, IssueSampleRow>(&query)
                    .bind(within.center.latitude)
                    .bind(within.center.longitude)
                    .bind(bbox.min_lat)
                    .bind(bbox.max_lat)
                    .bind(bbox.min_lng)
                    .bind(bbox.max_lng)
                    .bind(within.radius_m)
                    .fetch_all(pool)
                    .await
            }
        }
    }
}
