use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::tips::{TipDraft, TipService};
use crate::app::users::UserDirectory;
use crate::domain::tip::{Comment, Tip};
use crate::http::{AdminToken, AppError, AuthUser};
use crate::AppState;

fn tip_service(state: &AppState) -> TipService {
    TipService::new(state.tips.clone(), UserDirectory::new(state.users.clone()))
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let tips = state.tips.ping().await.is_ok();
    let users = state.users.ping().await.is_ok();
    let status = if tips && users { "ok" } else { "degraded" };

    Json(HealthResponse { status })
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Deserialize)]
pub struct TipRequest {
    pub title: String,
    pub description: String,
    pub category: String,
}

impl From<TipRequest> for TipDraft {
    fn from(request: TipRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            category: request.category,
        }
    }
}

pub async fn create_tip(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<TipRequest>,
) -> Result<Json<Tip>, AppError> {
    let tip = tip_service(&state)
        .create(payload.into(), &auth.user_id)
        .await
        .map_err(|err| AppError::from_tip(err, "create tip", None, Some(auth.user_id.as_str())))?;

    tracing::info!(tip_id = ?tip.id, author_id = %auth.user_id, "tip created");
    Ok(Json(tip))
}

pub async fn list_tips(State(state): State<AppState>) -> Result<Json<Vec<Tip>>, AppError> {
    let tips = tip_service(&state)
        .list_all()
        .await
        .map_err(|err| AppError::from_tip(err, "list tips", None, None))?;
    Ok(Json(tips))
}

pub async fn list_my_tips(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Tip>>, AppError> {
    let tips = tip_service(&state)
        .list_mine(&auth.user_id)
        .await
        .map_err(|err| AppError::from_tip(err, "list tips", None, Some(auth.user_id.as_str())))?;
    Ok(Json(tips))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub title: String,
}

pub async fn search_tips(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Tip>>, AppError> {
    let tips = tip_service(&state)
        .search(&query.title)
        .await
        .map_err(|err| AppError::from_tip(err, "search tips", None, None))?;
    Ok(Json(tips))
}

#[derive(Deserialize)]
pub struct CategoryQuery {
    pub category: String,
}

pub async fn list_tips_by_category(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<Tip>>, AppError> {
    let tips = tip_service(&state)
        .list_by_category(&query.category)
        .await
        .map_err(|err| AppError::from_tip(err, "list tips", None, None))?;
    Ok(Json(tips))
}

pub async fn list_featured_tips(
    State(state): State<AppState>,
) -> Result<Json<Vec<Tip>>, AppError> {
    let tips = tip_service(&state)
        .list_featured()
        .await
        .map_err(|err| AppError::from_tip(err, "list featured tips", None, None))?;
    Ok(Json(tips))
}

/// Responds with `null` when there are no tips yet.
pub async fn tip_of_the_day(
    State(state): State<AppState>,
) -> Result<Json<Option<Tip>>, AppError> {
    let tip = tip_service(&state)
        .tip_of_the_day()
        .await
        .map_err(|err| AppError::from_tip(err, "pick tip of the day", None, None))?;
    Ok(Json(tip))
}

/// Responds with `null` when the tip is missing or belongs to someone else.
pub async fn update_tip(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<TipRequest>,
) -> Result<Json<Option<Tip>>, AppError> {
    let tip = tip_service(&state)
        .update(&id, payload.into(), &auth.user_id)
        .await
        .map_err(|err| {
            AppError::from_tip(
                err,
                "update tip",
                Some(id.as_str()),
                Some(auth.user_id.as_str()),
            )
        })?;

    if tip.is_none() {
        tracing::debug!(tip_id = %id, caller_id = %auth.user_id, "tip update ignored");
    }
    Ok(Json(tip))
}

#[derive(Deserialize)]
pub struct RateQuery {
    pub rating: i32,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

pub async fn rate_tip(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<RateQuery>,
) -> Result<Json<Tip>, AppError> {
    let rater_id = query
        .user_id
        .filter(|user_id| !user_id.is_empty())
        .unwrap_or(auth.user_id);

    let tip = tip_service(&state)
        .rate(&id, query.rating, &rater_id)
        .await
        .map_err(|err| {
            AppError::from_tip(
                err,
                "rate tip",
                Some(id.as_str()),
                Some(rater_id.as_str()),
            )
        })?;
    Ok(Json(tip))
}

#[derive(Deserialize)]
pub struct UserRatingQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Always 200; anything that prevents a lookup reads as 0, including
/// malformed path or query input.
pub async fn get_user_rating(
    path: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
    query: Result<Query<UserRatingQuery>, QueryRejection>,
) -> Json<i32> {
    let (Ok(Path(id)), Ok(Query(query))) = (path, query) else {
        return Json(0);
    };
    let Some(user_id) = query.user_id else {
        return Json(0);
    };
    Json(tip_service(&state).user_rating(&id, &user_id).await)
}

pub async fn delete_tip(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    tip_service(&state)
        .delete(&id, &auth.user_id)
        .await
        .map_err(|err| {
            AppError::from_tip(
                err,
                "delete tip",
                Some(id.as_str()),
                Some(auth.user_id.as_str()),
            )
        })?;

    tracing::info!(tip_id = %id, caller_id = %auth.user_id, "tip deleted");
    Ok(Json(MessageResponse {
        message: "tip deleted",
    }))
}

#[derive(Deserialize)]
pub struct FeaturedRequest {
    pub featured: bool,
}

pub async fn set_tip_featured(
    Path(id): Path<String>,
    _admin: AdminToken,
    State(state): State<AppState>,
    Json(payload): Json<FeaturedRequest>,
) -> Result<Json<Tip>, AppError> {
    let tip = tip_service(&state)
        .set_featured(&id, payload.featured)
        .await
        .map_err(|err| AppError::from_tip(err, "update featured flag", Some(id.as_str()), None))?;

    tracing::info!(tip_id = %id, featured = payload.featured, "featured flag changed");
    Ok(Json(tip))
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub text: String,
    #[serde(default)]
    pub rating: i32,
}

pub async fn add_comment(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CommentRequest>,
) -> Result<Json<Comment>, AppError> {
    let comment = tip_service(&state)
        .add_comment(&id, payload.text, payload.rating, &auth.user_id)
        .await
        .map_err(|err| {
            AppError::from_tip(
                err,
                "add comment",
                Some(id.as_str()),
                Some(auth.user_id.as_str()),
            )
        })?;
    Ok(Json(comment))
}

pub async fn list_comments(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let comments = tip_service(&state)
        .list_comments(&id)
        .await
        .map_err(|err| AppError::from_tip(err, "list comments", Some(id.as_str()), None))?;
    Ok(Json(comments))
}

pub async fn update_comment(
    Path((tip_id, comment_id)): Path<(String, String)>,
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CommentRequest>,
) -> Result<Json<Comment>, AppError> {
    let comment = tip_service(&state)
        .update_comment(
            &tip_id,
            &comment_id,
            payload.text,
            payload.rating,
            &auth.user_id,
        )
        .await
        .map_err(|err| {
            AppError::from_tip(
                err,
                "update comment",
                Some(tip_id.as_str()),
                Some(auth.user_id.as_str()),
            )
        })?;
    Ok(Json(comment))
}

pub async fn delete_comment(
    Path((tip_id, comment_id)): Path<(String, String)>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    tip_service(&state)
        .delete_comment(&tip_id, &comment_id, &auth.user_id)
        .await
        .map_err(|err| {
            AppError::from_tip(
                err,
                "delete comment",
                Some(tip_id.as_str()),
                Some(auth.user_id.as_str()),
            )
        })?;

    Ok(Json(MessageResponse {
        message: "comment deleted",
    }))
}
