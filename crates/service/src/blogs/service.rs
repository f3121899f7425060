use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use super::domain::{
    Blog, BlogWithStats, CommentWithAuthor, CreateBlogInput, LikeOutcome, UpdateBlogInput,
};
use super::repository::BlogRepository;
use crate::aggregation::{
    allowed_authors, author_or, distinct_ids, resolve_or_empty, FollowingResolver, IdentityResolver, SELF_AUTHOR,
    UNKNOWN_AUTHOR, UNKNOWN_USER,
};
use crate::auth::AuthContext;
use crate::errors::ServiceError;
use crate::storage::{blog_image_key, ObjectStore, UploadedFile, BLOG_IMAGES_BUCKET};

/// Blog workflows: persistence plus enrichment from the identity and followers peers.
pub struct BlogService<R: BlogRepository + ?Sized> {
    repo: Arc<R>,
    identity: Arc<dyn IdentityResolver>,
    following: Arc<dyn FollowingResolver>,
    store: Arc<dyn ObjectStore>,
}

impl<R: BlogRepository + ?Sized> BlogService<R> {
    pub fn new(
        repo: Arc<R>,
        identity: Arc<dyn IdentityResolver>,
        following: Arc<dyn FollowingResolver>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self { repo, identity, following, store }
    }

    /// Upload files in order and return their public URLs.
    async fn upload_images(&self, author_id: i64, files: Vec<UploadedFile>) -> Result<Vec<String>, ServiceError> {
        let mut urls = Vec::with_capacity(files.len());
        let stamp = Utc::now().timestamp_nanos_opt().map(i128::from).unwrap_or_default();
        for (i, file) in files.into_iter().enumerate() {
            if file.bytes.is_empty() {
                continue;
            }
            let key = blog_image_key(author_id, stamp, i + 1, &file.extension());
            let url = self
                .store
                .put_object(BLOG_IMAGES_BUCKET, &key, file.bytes, file.content_type.as_deref())
                .await?;
            urls.push(url);
        }
        Ok(urls)
    }

    /// Feed for the caller: blogs by followed authors and by the caller, newest
    /// first. Filtering happens before author lookup, so only visible authors
    /// are resolved.
    #[instrument(skip(self, ctx, bearer_token), fields(user_id = ctx.user_id))]
    pub async fn list_feed(&self, ctx: &AuthContext, bearer_token: &str) -> Result<Vec<BlogWithStats>, ServiceError> {
        let (rows, allowed) = tokio::join!(
            self.repo.list_blogs(),
            allowed_authors(self.following.as_ref(), bearer_token, ctx.user_id)
        );
        let visible: Vec<_> = rows?.into_iter().filter(|r| allowed.contains(&r.blog.author_id)).collect();

        let ids = distinct_ids(visible.iter().map(|r| r.blog.author_id));
        let authors = resolve_or_empty(self.identity.as_ref(), &ids).await;

        Ok(visible
            .into_iter()
            .map(|r| {
                let author = author_or(&authors, r.blog.author_id, UNKNOWN_AUTHOR);
                BlogWithStats { blog: r.blog, stats: r.stats, author }
            })
            .collect())
    }

    #[instrument(skip(self, ctx, input, files), fields(user_id = ctx.user_id, files = files.len()))]
    pub async fn create_blog(
        &self,
        ctx: &AuthContext,
        input: CreateBlogInput,
        files: Vec<UploadedFile>,
    ) -> Result<Blog, ServiceError> {
        let new = input.into_new_blog()?;
        let urls = self.upload_images(ctx.user_id, files).await?;
        let blog = self.repo.create_blog(ctx.user_id, new, urls).await?;
        info!(blog_id = blog.id, author_id = blog.author_id, images = blog.image_urls.len(), event = "blog_created");
        Ok(blog)
    }

    /// Partial update restricted to the author. Absent fields stay untouched.
    #[instrument(skip(self, ctx, input, files), fields(user_id = ctx.user_id, blog_id))]
    pub async fn update_blog(
        &self,
        ctx: &AuthContext,
        blog_id: i64,
        input: UpdateBlogInput,
        files: Vec<UploadedFile>,
    ) -> Result<(), ServiceError> {
        let mut changes = input.into_changes()?;
        let has_files = files.iter().any(|f| !f.bytes.is_empty());
        if changes.title.is_unchanged()
            && changes.description_markdown.is_unchanged()
            && changes.remove_image_urls.is_empty()
            && !has_files
        {
            return Err(ServiceError::Validation("no data provided for update".into()));
        }
        // Nothing reaches the object store for a blog the caller cannot edit.
        if !self.repo.owns_blog(blog_id, ctx.user_id).await? {
            return Err(ServiceError::NotFound("Blog not found or you do not have permission to edit it".into()));
        }
        changes.add_image_urls = self.upload_images(ctx.user_id, files).await?;
        self.repo.update_blog(blog_id, ctx.user_id, changes).await?;
        info!(blog_id, author_id = ctx.user_id, event = "blog_updated");
        Ok(())
    }

    /// The created comment, with the caller's own author info (or "You").
    #[instrument(skip(self, ctx, text), fields(user_id = ctx.user_id, blog_id))]
    pub async fn add_comment(&self, ctx: &AuthContext, blog_id: i64, text: String) -> Result<CommentWithAuthor, ServiceError> {
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(ServiceError::Validation("Comment text is required".into()));
        }
        let comment = self.repo.add_comment(blog_id, ctx.user_id, text).await?;
        let authors = resolve_or_empty(self.identity.as_ref(), &[ctx.user_id]).await;
        let author = author_or(&authors, ctx.user_id, SELF_AUTHOR);
        info!(blog_id, comment_id = comment.id, event = "comment_added");
        Ok(CommentWithAuthor { comment, author })
    }

    #[instrument(skip(self))]
    pub async fn list_comments(&self, blog_id: i64) -> Result<Vec<CommentWithAuthor>, ServiceError> {
        let comments = self.repo.list_comments(blog_id).await?;
        let ids = distinct_ids(comments.iter().map(|c| c.author_id));
        let authors = resolve_or_empty(self.identity.as_ref(), &ids).await;
        Ok(comments
            .into_iter()
            .map(|c| {
                let author = author_or(&authors, c.author_id, UNKNOWN_USER);
                CommentWithAuthor { comment: c, author }
            })
            .collect())
    }

    #[instrument(skip(self, ctx), fields(user_id = ctx.user_id))]
    pub async fn toggle_like(&self, ctx: &AuthContext, blog_id: i64) -> Result<LikeOutcome, ServiceError> {
        let outcome = self.repo.toggle_like(blog_id, ctx.user_id).await?;
        info!(blog_id, action = outcome.action.as_str(), likes = outcome.likes_count, event = "like_toggled");
        Ok(outcome)
    }
}
