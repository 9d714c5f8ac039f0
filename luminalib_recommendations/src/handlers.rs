use std::sync::Arc;

use actix_web::web::Data;
use actix_web::{Error, HttpResponse};
use paperclip::actix::{api_v2_operation, web};

use luminalib_borrows::api::UserId;

use crate::api::{RecommendationsQuery, DEFAULT_NO_OF_RECOMMENDATIONS};
use crate::recommendations_provider::RecommendationsProvider;

type Provider = Data<Arc<RecommendationsProvider>>;

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn get_recommendations_for_user(
    provider: Provider,
    user_id: web::Path<UserId>,
    query: web::Query<RecommendationsQuery>,
) -> Result<HttpResponse, Error> {
    let user_id = user_id.into_inner();
    let limit = query.limit.unwrap_or(DEFAULT_NO_OF_RECOMMENDATIONS) as usize;

    Ok(match provider.get_recommendations(user_id, limit).await {
        Ok(recommendations) => HttpResponse::Ok().json(recommendations),
        Err(err) => {
            tracing::error!("Recommendations for user {} failed {:#}", user_id, err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn get_reviews_summary(
    provider: Provider,
    user_id: web::Path<UserId>,
) -> Result<HttpResponse, Error> {
    let user_id = user_id.into_inner();

    Ok(match provider.get_reviews_summary(user_id).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(err) => {
            tracing::error!("Reviews summary for user {} failed {:#}", user_id, err);
            HttpResponse::InternalServerError().finish()
        }
    })
}
