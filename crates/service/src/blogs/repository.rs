use async_trait::async_trait;

use super::domain::{Blog, BlogChanges, BlogRow, Comment, LikeOutcome, NewBlog};
use crate::errors::ServiceError;

/// Persistence for the blog service. Multi-statement writes are atomic.
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Blog row and one image row per url, all or nothing.
    async fn create_blog(&self, author_id: i64, blog: NewBlog, image_urls: Vec<String>) -> Result<Blog, ServiceError>;

    /// Whether `blog_id` exists and was written by `author_id`.
    async fn owns_blog(&self, blog_id: i64, author_id: i64) -> Result<bool, ServiceError>;

    /// Applies `changes` only where `id = blog_id AND author_id = author_id`;
    /// `NotFound` when nothing matches. Always refreshes `last_modified_date`.
    async fn update_blog(&self, blog_id: i64, author_id: i64, changes: BlogChanges) -> Result<(), ServiceError>;

    /// Every blog with counters and images, newest first.
    async fn list_blogs(&self) -> Result<Vec<BlogRow>, ServiceError>;

    /// `NotFound` when the blog does not exist.
    async fn add_comment(&self, blog_id: i64, author_id: i64, text: String) -> Result<Comment, ServiceError>;

    /// Newest first; empty for an unknown blog.
    async fn list_comments(&self, blog_id: i64) -> Result<Vec<Comment>, ServiceError>;

    /// Like if absent, unlike if present. `NotFound` when the blog does not exist.
    async fn toggle_like(&self, blog_id: i64, user_id: i64) -> Result<LikeOutcome, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use crate::blogs::domain::{BlogStats, FieldUpdate, LikeAction};
    use chrono::{Duration, SubsecRound, Utc};
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct State {
        blogs: Vec<Blog>,
        comments: Vec<Comment>,
        likes: HashSet<(i64, i64)>, // key: (blog_id, user_id)
        ticks: i64,
    }

    impl State {
        /// Strictly increasing timestamps so ordering is deterministic.
        fn now(&mut self) -> chrono::DateTime<Utc> {
            self.ticks += 1;
            Utc::now().trunc_subsecs(0) + Duration::seconds(self.ticks)
        }
    }

    #[derive(Default)]
    pub struct MockBlogRepository {
        state: Mutex<State>,
    }

    #[async_trait]
    impl BlogRepository for MockBlogRepository {
        async fn create_blog(&self, author_id: i64, blog: NewBlog, image_urls: Vec<String>) -> Result<Blog, ServiceError> {
            let mut st = self.state.lock().unwrap();
            let now = st.now();
            let created = Blog {
                id: st.blogs.len() as i64 + 1,
                author_id,
                title: blog.title,
                description_markdown: blog.description_markdown,
                creation_date: now,
                last_modified_date: now,
                image_urls,
            };
            st.blogs.push(created.clone());
            Ok(created)
        }

        async fn owns_blog(&self, blog_id: i64, author_id: i64) -> Result<bool, ServiceError> {
            let st = self.state.lock().unwrap();
            Ok(st.blogs.iter().any(|b| b.id == blog_id && b.author_id == author_id))
        }

        async fn update_blog(&self, blog_id: i64, author_id: i64, changes: BlogChanges) -> Result<(), ServiceError> {
            let mut st = self.state.lock().unwrap();
            let now = st.now();
            let blog = st
                .blogs
                .iter_mut()
                .find(|b| b.id == blog_id && b.author_id == author_id)
                .ok_or_else(|| {
                    ServiceError::NotFound("Blog not found or you do not have permission to edit it".into())
                })?;
            match changes.title {
                FieldUpdate::Set(t) => blog.title = t,
                FieldUpdate::Clear => return Err(ServiceError::Validation("Title cannot be empty".into())),
                FieldUpdate::Unchanged => {}
            }
            match changes.description_markdown {
                FieldUpdate::Set(d) => blog.description_markdown = Some(d),
                FieldUpdate::Clear => blog.description_markdown = None,
                FieldUpdate::Unchanged => {}
            }
            blog.image_urls.retain(|u| !changes.remove_image_urls.contains(u));
            blog.image_urls.extend(changes.add_image_urls);
            blog.last_modified_date = now;
            Ok(())
        }

        async fn list_blogs(&self) -> Result<Vec<BlogRow>, ServiceError> {
            let st = self.state.lock().unwrap();
            let mut rows: Vec<BlogRow> = st
                .blogs
                .iter()
                .map(|b| BlogRow {
                    blog: b.clone(),
                    stats: BlogStats {
                        likes_count: st.likes.iter().filter(|(bid, _)| *bid == b.id).count() as i64,
                        comments_count: st.comments.iter().filter(|c| c.blog_id == b.id).count() as i64,
                    },
                })
                .collect();
            rows.sort_by(|a, b| b.blog.creation_date.cmp(&a.blog.creation_date).then(b.blog.id.cmp(&a.blog.id)));
            Ok(rows)
        }

        async fn add_comment(&self, blog_id: i64, author_id: i64, text: String) -> Result<Comment, ServiceError> {
            let mut st = self.state.lock().unwrap();
            if !st.blogs.iter().any(|b| b.id == blog_id) {
                return Err(ServiceError::not_found("blog"));
            }
            let now = st.now();
            let c = Comment {
                id: st.comments.len() as i64 + 1,
                blog_id,
                author_id,
                text,
                creation_time: now,
                last_modified_time: now,
            };
            st.comments.push(c.clone());
            Ok(c)
        }

        async fn list_comments(&self, blog_id: i64) -> Result<Vec<Comment>, ServiceError> {
            let st = self.state.lock().unwrap();
            let mut out: Vec<Comment> = st.comments.iter().filter(|c| c.blog_id == blog_id).cloned().collect();
            out.sort_by(|a, b| b.creation_time.cmp(&a.creation_time).then(b.id.cmp(&a.id)));
            Ok(out)
        }

        async fn toggle_like(&self, blog_id: i64, user_id: i64) -> Result<LikeOutcome, ServiceError> {
            let mut st = self.state.lock().unwrap();
            if !st.blogs.iter().any(|b| b.id == blog_id) {
                return Err(ServiceError::not_found("blog"));
            }
            let action = if st.likes.remove(&(blog_id, user_id)) {
                LikeAction::Unliked
            } else {
                st.likes.insert((blog_id, user_id));
                LikeAction::Liked
            };
            let likes_count = st.likes.iter().filter(|(bid, _)| *bid == blog_id).count() as i64;
            Ok(LikeOutcome { action, likes_count })
        }
    }
}
