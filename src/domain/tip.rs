use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::infra::store::Document;

/// Document fields used by store-side filters.
pub const AUTHOR_FIELD: &str = "userId";
pub const TITLE_FIELD: &str = "title";
pub const CATEGORY_FIELD: &str = "category";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(rename = "userId")]
    pub author_id: String,
    #[serde(rename = "userDisplayName")]
    pub author_display_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub user_ratings: HashMap<String, i32>,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub rating_count: usize,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub review_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(rename = "userId")]
    pub author_id: String,
    #[serde(rename = "userName")]
    pub author_display_name: String,
    pub text: String,
    pub rating: i32,
    /// RFC 3339 timestamp of creation.
    #[serde(rename = "time")]
    pub created_at: String,
}

impl Tip {
    pub fn new(
        title: String,
        description: String,
        category: String,
        author_id: String,
        author_display_name: String,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id: None,
            title,
            description,
            category,
            author_id,
            author_display_name,
            created_at,
            featured: false,
            user_ratings: HashMap::new(),
            average_rating: 0.0,
            rating_count: 0,
            comments: Vec::new(),
            review_count: 0,
        }
    }

    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author_id == user_id
    }

    /// Records `rating` for `user_id`, replacing any earlier rating from the
    /// same user, and refreshes the aggregate.
    pub fn rate(&mut self, user_id: &str, rating: i32) {
        self.user_ratings.insert(user_id.to_string(), rating);
        self.refresh_rating_aggregate();
    }

    pub fn rating_of(&self, user_id: &str) -> Option<i32> {
        self.user_ratings.get(user_id).copied()
    }

    pub fn refresh_rating_aggregate(&mut self) {
        self.rating_count = self.user_ratings.len();
        self.average_rating = if self.user_ratings.is_empty() {
            0.0
        } else {
            let sum: i64 = self.user_ratings.values().map(|value| i64::from(*value)).sum();
            sum as f64 / self.user_ratings.len() as f64
        };
    }

    /// Newest comments come first.
    pub fn push_comment(&mut self, comment: Comment) {
        self.comments.insert(0, comment);
        self.review_count = self.comments.len();
    }

    pub fn comment_mut(&mut self, comment_id: &str) -> Option<&mut Comment> {
        self.comments
            .iter_mut()
            .find(|comment| comment.id == comment_id)
    }

    /// Removes the first comment with `comment_id` written by `author_id`.
    pub fn remove_comment(&mut self, comment_id: &str, author_id: &str) -> Option<Comment> {
        let index = self
            .comments
            .iter()
            .position(|comment| comment.id == comment_id && comment.author_id == author_id)?;
        let removed = self.comments.remove(index);
        self.review_count = self.comments.len();
        Some(removed)
    }
}

impl Document for Tip {
    const COLLECTION: &'static str = "cookingTips";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn assign_id(&mut self, id: String) {
        self.id = Some(id);
    }
}
