use std::sync::Arc;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::users::UserDirectory;
use crate::domain::tip::{Comment, Tip, AUTHOR_FIELD, CATEGORY_FIELD, TITLE_FIELD};
use crate::infra::store::DocumentStore;

const ANONYMOUS_COMMENTER: &str = "Anonymous";

#[derive(Debug, thiserror::Error)]
pub enum TipError {
    #[error("tip not found")]
    NotFound,
    #[error("comment not found")]
    CommentNotFound,
    #[error("caller is not the author")]
    Forbidden,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type TipResult<T> = std::result::Result<T, TipError>;

#[derive(Debug, Clone)]
pub struct TipDraft {
    pub title: String,
    pub description: String,
    pub category: String,
}

#[derive(Clone)]
pub struct TipService {
    tips: Arc<dyn DocumentStore<Tip>>,
    users: UserDirectory,
}

impl TipService {
    pub fn new(tips: Arc<dyn DocumentStore<Tip>>, users: UserDirectory) -> Self {
        Self { tips, users }
    }

    pub async fn create(&self, draft: TipDraft, caller_id: &str) -> TipResult<Tip> {
        let display_name = self.users.display_name_or(caller_id, caller_id).await;
        let tip = Tip::new(
            draft.title,
            draft.description,
            draft.category,
            caller_id.to_string(),
            display_name,
            OffsetDateTime::now_utc(),
        );
        Ok(self.tips.save(tip).await?)
    }

    pub async fn list_all(&self) -> TipResult<Vec<Tip>> {
        Ok(self.tips.find_all().await?)
    }

    pub async fn list_mine(&self, caller_id: &str) -> TipResult<Vec<Tip>> {
        Ok(self.tips.find_by_field(AUTHOR_FIELD, caller_id).await?)
    }

    pub async fn search(&self, title: &str) -> TipResult<Vec<Tip>> {
        Ok(self.tips.search_field(TITLE_FIELD, title).await?)
    }

    pub async fn list_by_category(&self, category: &str) -> TipResult<Vec<Tip>> {
        Ok(self.tips.find_by_field(CATEGORY_FIELD, category).await?)
    }

    pub async fn list_featured(&self) -> TipResult<Vec<Tip>> {
        let tips = self.tips.find_all().await?;
        Ok(tips.into_iter().filter(|tip| tip.featured).collect())
    }

    /// The most-rated tip. On a tie the earliest in store order wins.
    pub async fn tip_of_the_day(&self) -> TipResult<Option<Tip>> {
        let tips = self.tips.find_all().await?;
        let mut best: Option<Tip> = None;
        for tip in tips {
            let beats_current = best
                .as_ref()
                .map_or(true, |current| tip.rating_count > current.rating_count);
            if beats_current {
                best = Some(tip);
            }
        }
        Ok(best)
    }

    /// `Ok(None)` when the tip is missing or the caller is not its author;
    /// nothing is written in either case.
    pub async fn update(&self, id: &str, draft: TipDraft, caller_id: &str) -> TipResult<Option<Tip>> {
        let mut tip = match self.tips.find_by_id(id).await? {
            Some(tip) if tip.is_authored_by(caller_id) => tip,
            _ => return Ok(None),
        };
        tip.title = draft.title;
        tip.description = draft.description;
        tip.category = draft.category;
        Ok(Some(self.tips.save(tip).await?))
    }

    pub async fn rate(&self, id: &str, rating: i32, rater_id: &str) -> TipResult<Tip> {
        let mut tip = self.find(id).await?;
        tip.rate(rater_id, rating);
        Ok(self.tips.save(tip).await?)
    }

    /// Never fails: a missing tip, a missing rating, and a store fault all
    /// read as 0.
    pub async fn user_rating(&self, id: &str, user_id: &str) -> i32 {
        match self.tips.find_by_id(id).await {
            Ok(Some(tip)) => tip.rating_of(user_id).unwrap_or(0),
            Ok(None) => 0,
            Err(err) => {
                tracing::warn!(error = ?err, tip_id = %id, user_id = %user_id, "user rating lookup failed");
                0
            }
        }
    }

    pub async fn delete(&self, id: &str, caller_id: &str) -> TipResult<()> {
        let tip = self.find(id).await?;
        if !tip.is_authored_by(caller_id) {
            return Err(TipError::Forbidden);
        }
        self.tips.delete_by_id(id).await?;
        Ok(())
    }

    pub async fn set_featured(&self, id: &str, featured: bool) -> TipResult<Tip> {
        let mut tip = self.find(id).await?;
        tip.featured = featured;
        Ok(self.tips.save(tip).await?)
    }

    pub async fn add_comment(
        &self,
        tip_id: &str,
        text: String,
        rating: i32,
        caller_id: &str,
    ) -> TipResult<Comment> {
        let mut tip = self.find(tip_id).await?;
        let display_name = self
            .users
            .display_name_or(caller_id, ANONYMOUS_COMMENTER)
            .await;
        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(anyhow::Error::from)?;

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            author_id: caller_id.to_string(),
            author_display_name: display_name,
            text,
            rating,
            created_at,
        };
        tip.push_comment(comment.clone());
        self.tips.save(tip).await?;
        Ok(comment)
    }

    pub async fn list_comments(&self, tip_id: &str) -> TipResult<Vec<Comment>> {
        Ok(self.find(tip_id).await?.comments)
    }

    pub async fn update_comment(
        &self,
        tip_id: &str,
        comment_id: &str,
        text: String,
        rating: i32,
        caller_id: &str,
    ) -> TipResult<Comment> {
        let mut tip = self.find(tip_id).await?;
        let comment = tip
            .comment_mut(comment_id)
            .ok_or(TipError::CommentNotFound)?;
        if comment.author_id != caller_id {
            return Err(TipError::Forbidden);
        }
        comment.text = text;
        comment.rating = rating;
        let updated = comment.clone();

        self.tips.save(tip).await?;
        Ok(updated)
    }

    pub async fn delete_comment(&self, tip_id: &str, comment_id: &str, caller_id: &str) -> TipResult<()> {
        let mut tip = self.find(tip_id).await?;
        if tip.remove_comment(comment_id, caller_id).is_none() {
            return Err(if tip.comments.iter().any(|comment| comment.id == comment_id) {
                TipError::Forbidden
            } else {
                TipError::CommentNotFound
            });
        }
        self.tips.save(tip).await?;
        Ok(())
    }

    async fn find(&self, id: &str) -> TipResult<Tip> {
        self.tips.find_by_id(id).await?.ok_or(TipError::NotFound)
    }
}
