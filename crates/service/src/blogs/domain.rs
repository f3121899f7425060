use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregation::AuthorInfo;
use crate::errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub description_markdown: Option<String>,
    pub creation_date: DateTime<Utc>,
    pub last_modified_date: DateTime<Utc>,
    /// In insertion order.
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogStats {
    pub likes_count: i64,
    pub comments_count: i64,
}

/// A blog with its counters, as read from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct BlogRow {
    pub blog: Blog,
    pub stats: BlogStats,
}

/// Feed entry: blog fields flattened, plus counters and the resolved author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogWithStats {
    #[serde(flatten)]
    pub blog: Blog,
    pub stats: BlogStats,
    pub author: AuthorInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub blog_id: i64,
    pub author_id: i64,
    pub text: String,
    pub creation_time: DateTime<Utc>,
    pub last_modified_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: AuthorInfo,
}

/// Presence-tagged field for partial updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    Unchanged,
    Set(T),
    Clear,
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::Unchanged
    }
}

impl<T> FieldUpdate<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, FieldUpdate::Unchanged)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBlog {
    pub title: String,
    pub description_markdown: Option<String>,
}

/// Text fields of a create request as they arrive from the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateBlogInput {
    pub title: Option<String>,
    pub description_markdown: Option<String>,
}

impl CreateBlogInput {
    pub fn into_new_blog(self) -> Result<NewBlog, ServiceError> {
        let title = self.title.map(|t| t.trim().to_string()).unwrap_or_default();
        if title.is_empty() {
            return Err(ServiceError::Validation("Title is required".into()));
        }
        let description_markdown = self.description_markdown.filter(|d| !d.trim().is_empty());
        Ok(NewBlog { title, description_markdown })
    }
}

/// Fields of an update request as they arrive from the form: `None` means the
/// field was absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateBlogInput {
    pub title: Option<String>,
    pub description_markdown: Option<String>,
    pub images_to_delete: Vec<String>,
}

/// What the store applies for an update. Image lists are a granular diff.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlogChanges {
    pub title: FieldUpdate<String>,
    pub description_markdown: FieldUpdate<String>,
    pub add_image_urls: Vec<String>,
    pub remove_image_urls: Vec<String>,
}

impl UpdateBlogInput {
    /// Title may be replaced but never cleared; an empty description clears it.
    pub fn into_changes(self) -> Result<BlogChanges, ServiceError> {
        let title = match self.title {
            None => FieldUpdate::Unchanged,
            Some(t) if t.trim().is_empty() => {
                return Err(ServiceError::Validation("Title cannot be empty".into()));
            }
            Some(t) => FieldUpdate::Set(t.trim().to_string()),
        };
        let description_markdown = match self.description_markdown {
            None => FieldUpdate::Unchanged,
            Some(d) if d.trim().is_empty() => FieldUpdate::Clear,
            Some(d) => FieldUpdate::Set(d),
        };
        let remove_image_urls = self.images_to_delete.into_iter().filter(|u| !u.trim().is_empty()).collect();
        Ok(BlogChanges { title, description_markdown, add_image_urls: Vec::new(), remove_image_urls })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAction {
    Liked,
    Unliked,
}

impl LikeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LikeAction::Liked => "liked",
            LikeAction::Unliked => "unliked",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    pub action: LikeAction,
    pub likes_count: i64,
}
