use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, Statement, TransactionTrait,
};
use tracing::debug;

use crate::blogs::domain::{Blog, BlogChanges, BlogRow, BlogStats, Comment, FieldUpdate, LikeAction, LikeOutcome, NewBlog};
use crate::blogs::repository::BlogRepository;
use crate::errors::ServiceError;
use models::{blog, blog_image, comment, like};

/// Upper bound for the concatenated image list of one blog.
const GROUP_CONCAT_MAX_LEN: u32 = 1 << 20;

/// Counters and images are joined in as pre-grouped subqueries so the feed is a
/// single round trip regardless of the number of blogs.
const LIST_BLOGS_SQL: &str = r"
SELECT b.id, b.author_id, b.title, b.description_markdown, b.creation_date, b.last_modified_date,
       COALESCE(l.cnt, 0) AS likes_count,
       COALESCE(c.cnt, 0) AS comments_count,
       i.urls AS image_urls
FROM blogs b
LEFT JOIN (SELECT blog_id, COUNT(*) AS cnt FROM likes GROUP BY blog_id) l ON l.blog_id = b.id
LEFT JOIN (SELECT blog_id, COUNT(*) AS cnt FROM comments GROUP BY blog_id) c ON c.blog_id = b.id
LEFT JOIN (
    SELECT blog_id, GROUP_CONCAT(image_url ORDER BY id SEPARATOR '\n') AS urls
    FROM blog_images GROUP BY blog_id
) i ON i.blog_id = b.id
ORDER BY b.creation_date DESC, b.id DESC";

#[derive(Debug, FromQueryResult)]
struct BlogStatsRow {
    id: i64,
    author_id: i64,
    title: String,
    description_markdown: Option<String>,
    creation_date: DateTime<Utc>,
    last_modified_date: DateTime<Utc>,
    likes_count: i64,
    comments_count: i64,
    image_urls: Option<String>,
}

impl From<BlogStatsRow> for BlogRow {
    fn from(r: BlogStatsRow) -> Self {
        let image_urls = r
            .image_urls
            .map(|s| s.split('\n').filter(|u| !u.is_empty()).map(str::to_string).collect())
            .unwrap_or_default();
        BlogRow {
            blog: Blog {
                id: r.id,
                author_id: r.author_id,
                title: r.title,
                description_markdown: r.description_markdown,
                creation_date: r.creation_date,
                last_modified_date: r.last_modified_date,
                image_urls,
            },
            stats: BlogStats { likes_count: r.likes_count, comments_count: r.comments_count },
        }
    }
}

fn to_comment(m: comment::Model) -> Comment {
    Comment {
        id: m.id,
        blog_id: m.blog_id,
        author_id: m.author_id,
        text: m.text,
        creation_time: m.creation_time,
        last_modified_time: m.last_modified_time,
    }
}

/// DATETIME columns keep whole seconds; truncate so returned values match stored ones.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

fn images_for(blog_id: i64, urls: &[String]) -> Vec<blog_image::ActiveModel> {
    urls.iter()
        .map(|u| blog_image::ActiveModel { blog_id: Set(blog_id), image_url: Set(u.clone()), ..Default::default() })
        .collect()
}

fn missing_blog_on_fk(e: DbErr) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => ServiceError::not_found("blog"),
        _ => ServiceError::Db(e.to_string()),
    }
}

pub struct SeaOrmBlogRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmBlogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BlogRepository for SeaOrmBlogRepository {
    async fn create_blog(&self, author_id: i64, new: NewBlog, image_urls: Vec<String>) -> Result<Blog, ServiceError> {
        let txn = self.db.begin().await?;
        let ts = now();
        let created = blog::ActiveModel {
            author_id: Set(author_id),
            title: Set(new.title),
            description_markdown: Set(new.description_markdown),
            creation_date: Set(ts),
            last_modified_date: Set(ts),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        if !image_urls.is_empty() {
            blog_image::Entity::insert_many(images_for(created.id, &image_urls))
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;
        debug!(blog_id = created.id, images = image_urls.len(), "blog inserted");
        Ok(Blog {
            id: created.id,
            author_id: created.author_id,
            title: created.title,
            description_markdown: created.description_markdown,
            creation_date: created.creation_date,
            last_modified_date: created.last_modified_date,
            image_urls,
        })
    }

    async fn owns_blog(&self, blog_id: i64, author_id: i64) -> Result<bool, ServiceError> {
        let n = blog::Entity::find()
            .filter(blog::Column::Id.eq(blog_id))
            .filter(blog::Column::AuthorId.eq(author_id))
            .count(&self.db)
            .await?;
        Ok(n > 0)
    }

    async fn update_blog(&self, blog_id: i64, author_id: i64, changes: BlogChanges) -> Result<(), ServiceError> {
        let mut update = blog::Entity::update_many().col_expr(blog::Column::LastModifiedDate, Expr::value(now()));
        match changes.title {
            FieldUpdate::Set(t) => update = update.col_expr(blog::Column::Title, Expr::value(t)),
            FieldUpdate::Clear => return Err(ServiceError::Validation("Title cannot be empty".into())),
            FieldUpdate::Unchanged => {}
        }
        match changes.description_markdown {
            FieldUpdate::Set(d) => update = update.col_expr(blog::Column::DescriptionMarkdown, Expr::value(d)),
            FieldUpdate::Clear => {
                update = update.col_expr(blog::Column::DescriptionMarkdown, Expr::value(Option::<String>::None))
            }
            FieldUpdate::Unchanged => {}
        }

        let txn = self.db.begin().await?;
        let res = update
            .filter(blog::Column::Id.eq(blog_id))
            .filter(blog::Column::AuthorId.eq(author_id))
            .exec(&txn)
            .await?;
        if res.rows_affected == 0 {
            // MySQL may report zero for a matched but unchanged row; re-check the same predicate.
            let owned = blog::Entity::find()
                .filter(blog::Column::Id.eq(blog_id))
                .filter(blog::Column::AuthorId.eq(author_id))
                .count(&txn)
                .await?;
            if owned == 0 {
                return Err(ServiceError::NotFound(
                    "Blog not found or you do not have permission to edit it".into(),
                ));
            }
        }
        if !changes.remove_image_urls.is_empty() {
            blog_image::Entity::delete_many()
                .filter(blog_image::Column::BlogId.eq(blog_id))
                .filter(blog_image::Column::ImageUrl.is_in(changes.remove_image_urls.iter().cloned()))
                .exec(&txn)
                .await?;
        }
        if !changes.add_image_urls.is_empty() {
            blog_image::Entity::insert_many(images_for(blog_id, &changes.add_image_urls))
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(())
    }

    async fn list_blogs(&self) -> Result<Vec<BlogRow>, ServiceError> {
        // The session variable must be set on the same connection as the query.
        let txn = self.db.begin().await?;
        txn.execute_unprepared(&format!("SET SESSION group_concat_max_len = {GROUP_CONCAT_MAX_LEN}")).await?;
        let rows = BlogStatsRow::find_by_statement(Statement::from_string(DatabaseBackend::MySql, LIST_BLOGS_SQL))
            .all(&txn)
            .await?;
        txn.commit().await?;
        Ok(rows.into_iter().map(BlogRow::from).collect())
    }

    async fn add_comment(&self, blog_id: i64, author_id: i64, text: String) -> Result<Comment, ServiceError> {
        let ts = now();
        let created = comment::ActiveModel {
            blog_id: Set(blog_id),
            author_id: Set(author_id),
            text: Set(text),
            creation_time: Set(ts),
            last_modified_time: Set(ts),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(missing_blog_on_fk)?;
        Ok(to_comment(created))
    }

    async fn list_comments(&self, blog_id: i64) -> Result<Vec<Comment>, ServiceError> {
        let rows = comment::Entity::find()
            .filter(comment::Column::BlogId.eq(blog_id))
            .order_by_desc(comment::Column::CreationTime)
            .order_by_desc(comment::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(to_comment).collect())
    }

    async fn toggle_like(&self, blog_id: i64, user_id: i64) -> Result<LikeOutcome, ServiceError> {
        let txn = self.db.begin().await?;
        // Row lock on the blog serializes toggles per blog, so concurrent first
        // likes cannot deadlock on the gap locks of the empty DELETE.
        if blog::Entity::find_by_id(blog_id).lock_exclusive().one(&txn).await?.is_none() {
            return Err(ServiceError::not_found("blog"));
        }
        // Delete-if-present, else insert; the primary key makes the insert idempotent.
        let removed = like::Entity::delete_many()
            .filter(like::Column::BlogId.eq(blog_id))
            .filter(like::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        let action = if removed.rows_affected > 0 {
            LikeAction::Unliked
        } else {
            txn.execute(Statement::from_sql_and_values(
                DatabaseBackend::MySql,
                "INSERT IGNORE INTO likes (blog_id, user_id) VALUES (?, ?)",
                [blog_id.into(), user_id.into()],
            ))
            .await?;
            LikeAction::Liked
        };
        let likes_count = like::Entity::find().filter(like::Column::BlogId.eq(blog_id)).count(&txn).await? as i64;
        txn.commit().await?;
        Ok(LikeOutcome { action, likes_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use anyhow::Result;

    fn new_blog(title: &str) -> NewBlog {
        NewBlog { title: title.into(), description_markdown: Some("body".into()) }
    }

    async fn find_row(repo: &SeaOrmBlogRepository, id: i64) -> Result<BlogRow> {
        repo.list_blogs()
            .await?
            .into_iter()
            .find(|r| r.blog.id == id)
            .ok_or_else(|| anyhow::anyhow!("blog {id} missing from feed"))
    }

    #[tokio::test]
    async fn create_blog_with_images_and_list_stats() -> Result<()> {
        let Some(db) = get_db().await? else { return Ok(()); };
        let repo = SeaOrmBlogRepository::new(db);
        let urls = vec!["http://localhost:9000/blog-images/a.png".to_string(), "http://localhost:9000/blog-images/b.png".to_string()];
        let b = repo.create_blog(2, new_blog("two images"), urls.clone()).await?;

        let row = find_row(&repo, b.id).await?;
        assert_eq!(row.blog.image_urls, urls);
        assert_eq!(row.stats, BlogStats { likes_count: 0, comments_count: 0 });
        assert_eq!(row.blog.creation_date, b.creation_date);
        Ok(())
    }

    #[tokio::test]
    async fn toggle_like_twice_restores_count() -> Result<()> {
        let Some(db) = get_db().await? else { return Ok(()); };
        let repo = SeaOrmBlogRepository::new(db);
        let b = repo.create_blog(2, new_blog("likes"), vec![]).await?;

        let first = repo.toggle_like(b.id, 3).await?;
        assert_eq!(first, LikeOutcome { action: LikeAction::Liked, likes_count: 1 });
        let second = repo.toggle_like(b.id, 3).await?;
        assert_eq!(second, LikeOutcome { action: LikeAction::Unliked, likes_count: 0 });

        assert!(matches!(repo.toggle_like(i64::MAX, 3).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_toggles_do_not_fail() -> Result<()> {
        let Some(db) = get_db().await? else { return Ok(()); };
        let repo = SeaOrmBlogRepository::new(db);
        let b = repo.create_blog(2, new_blog("race"), vec![]).await?;

        let (a, c) = tokio::join!(repo.toggle_like(b.id, 7), repo.toggle_like(b.id, 7));
        let (a, c) = (a?, c?);
        assert_ne!(a.action, c.action);
        assert_eq!(find_row(&repo, b.id).await?.stats.likes_count, 0);

        let (x, y) = tokio::join!(repo.toggle_like(b.id, 8), repo.toggle_like(b.id, 9));
        assert_eq!((x?.action, y?.action), (LikeAction::Liked, LikeAction::Liked));
        assert_eq!(find_row(&repo, b.id).await?.stats.likes_count, 2);
        Ok(())
    }

    #[tokio::test]
    async fn owns_blog_checks_author() -> Result<()> {
        let Some(db) = get_db().await? else { return Ok(()); };
        let repo = SeaOrmBlogRepository::new(db);
        let b = repo.create_blog(5, new_blog("owned"), vec![]).await?;
        assert!(repo.owns_blog(b.id, 5).await?);
        assert!(!repo.owns_blog(b.id, 6).await?);
        assert!(!repo.owns_blog(i64::MAX, 5).await?);
        Ok(())
    }

    #[tokio::test]
    async fn update_applies_granular_image_diff() -> Result<()> {
        let Some(db) = get_db().await? else { return Ok(()); };
        let repo = SeaOrmBlogRepository::new(db);
        let keep = "http://x/keep.png".to_string();
        let drop = "http://x/drop.png".to_string();
        let b = repo.create_blog(5, new_blog("diff"), vec![keep.clone(), drop.clone()]).await?;

        let changes = BlogChanges {
            add_image_urls: vec!["http://x/new.png".into()],
            remove_image_urls: vec![drop.clone()],
            ..Default::default()
        };
        repo.update_blog(b.id, 5, changes).await?;

        let row = find_row(&repo, b.id).await?;
        assert_eq!(row.blog.image_urls, vec![keep, "http://x/new.png".to_string()]);
        assert_eq!(row.blog.title, "diff");
        assert!(row.blog.last_modified_date >= b.last_modified_date);
        Ok(())
    }

    #[tokio::test]
    async fn update_enforces_ownership() -> Result<()> {
        let Some(db) = get_db().await? else { return Ok(()); };
        let repo = SeaOrmBlogRepository::new(db);
        let b = repo.create_blog(5, new_blog("mine"), vec!["http://x/1.png".into()]).await?;

        let changes = BlogChanges { remove_image_urls: vec!["http://x/1.png".into()], ..Default::default() };
        assert!(matches!(repo.update_blog(b.id, 6, changes).await, Err(ServiceError::NotFound(_))));
        assert_eq!(find_row(&repo, b.id).await?.blog.image_urls.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn description_can_be_cleared() -> Result<()> {
        let Some(db) = get_db().await? else { return Ok(()); };
        let repo = SeaOrmBlogRepository::new(db);
        let b = repo.create_blog(5, new_blog("clear"), vec![]).await?;
        let changes = BlogChanges { description_markdown: FieldUpdate::Clear, ..Default::default() };
        repo.update_blog(b.id, 5, changes).await?;
        assert_eq!(find_row(&repo, b.id).await?.blog.description_markdown, None);
        Ok(())
    }

    #[tokio::test]
    async fn comments_newest_first_and_missing_blog_is_not_found() -> Result<()> {
        let Some(db) = get_db().await? else { return Ok(()); };
        let repo = SeaOrmBlogRepository::new(db);
        let b = repo.create_blog(2, new_blog("comments"), vec![]).await?;
        let c1 = repo.add_comment(b.id, 3, "first".into()).await?;
        let c2 = repo.add_comment(b.id, 4, "second".into()).await?;

        let list = repo.list_comments(b.id).await?;
        assert_eq!(list.iter().map(|c| c.id).collect::<Vec<_>>(), vec![c2.id, c1.id]);
        assert_eq!(find_row(&repo, b.id).await?.stats.comments_count, 2);

        assert!(matches!(repo.add_comment(i64::MAX, 3, "x".into()).await, Err(ServiceError::NotFound(_))));
        assert!(repo.list_comments(i64::MAX).await?.is_empty());
        Ok(())
    }
}
