use std::sync::Arc;

use actix_web::http::header::LOCATION;
use actix_web::web::Data;
use actix_web::{Error, HttpResponse};
use paperclip::actix::{api_v2_operation, web};

use crate::api::{BookId, ReviewDetails, UserDetails, UserId};
use crate::book_existence_checker::BookExistenceChecker;
use crate::borrows_repository::{BorrowsRepository, BorrowsRepositoryError};

type Repository = Data<Arc<dyn BorrowsRepository>>;

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn get_all_users(repository: Repository) -> Result<HttpResponse, Error> {
    Ok(match repository.get_all_user_ids().await {
        Ok(user_ids) => HttpResponse::Ok().json(user_ids),
        Err(err) => {
            tracing::error!("Get all users failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn add_user(
    repository: Repository,
    details: web::Json<UserDetails>,
) -> Result<HttpResponse, Error> {
    Ok(match repository.add_user(details.into_inner()).await {
        Ok(user_id) => HttpResponse::Ok()
            .append_header((LOCATION, format!("/api/user/{}", user_id)))
            .finish(),
        Err(err @ BorrowsRepositoryError::UserAlreadyExists(_)) => {
            HttpResponse::BadRequest().json(err.to_string())
        }
        Err(err) => {
            tracing::error!("Add user failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn get_user(
    repository: Repository,
    user_id: web::Path<UserId>,
) -> Result<HttpResponse, Error> {
    Ok(match repository.get_user(user_id.into_inner()).await {
        Ok(details) => HttpResponse::Ok().json(details),
        Err(BorrowsRepositoryError::UserNotFound(_)) => HttpResponse::NotFound().finish(),
        Err(err) => {
            tracing::error!("Get user failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn borrow_book(
    repository: Repository,
    book_existence_checker: Data<Arc<dyn BookExistenceChecker>>,
    path: web::Path<(UserId, BookId)>,
) -> Result<HttpResponse, Error> {
    let (user_id, book_id) = path.into_inner();
    match book_existence_checker.book_exists(book_id).await {
        Ok(true) => {}
        Ok(false) => return Ok(HttpResponse::NotFound().json(format!("Book {book_id} not found"))),
        Err(err) => {
            tracing::error!("Failed to check if book {} exists {}", book_id, err);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    }

    Ok(match repository.borrow_book(user_id, book_id).await {
        Ok(()) => {
            tracing::info!("User {} borrowed book {}", user_id, book_id);
            HttpResponse::Ok().finish()
        }
        Err(err @ BorrowsRepositoryError::BookAlreadyBorrowed(_)) => {
            HttpResponse::Forbidden().json(err.to_string())
        }
        Err(err @ BorrowsRepositoryError::UserNotFound(_)) => {
            HttpResponse::NotFound().json(err.to_string())
        }
        Err(err) => {
            tracing::error!("Borrow book failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn return_book(
    repository: Repository,
    path: web::Path<(UserId, BookId)>,
) -> Result<HttpResponse, Error> {
    let (user_id, book_id) = path.into_inner();
    Ok(match repository.return_book(user_id, book_id).await {
        Ok(()) => {
            tracing::info!("User {} returned book {}", user_id, book_id);
            HttpResponse::Ok().finish()
        }
        Err(err @ BorrowsRepositoryError::BookNotBorrowedByUser(_)) => {
            HttpResponse::Forbidden().json(err.to_string())
        }
        Err(err) => {
            tracing::error!("Return book failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn get_active_borrows(
    repository: Repository,
    user_id: web::Path<UserId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match repository.get_active_borrows(user_id.into_inner()).await {
            Ok(book_ids) => HttpResponse::Ok().json(book_ids),
            Err(err) => {
                tracing::error!("Get active borrows failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn get_borrow_history(
    repository: Repository,
    user_id: web::Path<UserId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match repository.get_borrow_history(user_id.into_inner()).await {
            Ok(records) => HttpResponse::Ok().json(records),
            Err(err) => {
                tracing::error!("Get borrow history failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn add_review(
    repository: Repository,
    user_id: web::Path<UserId>,
    details: web::Json<ReviewDetails>,
) -> Result<HttpResponse, Error> {
    Ok(
        match repository
            .add_review(user_id.into_inner(), details.into_inner())
            .await
        {
            Ok(review) => HttpResponse::Ok().json(review),
            Err(
                err @ (BorrowsRepositoryError::ReviewedBookNotBorrowed(_)
                | BorrowsRepositoryError::InvalidRating(_)),
            ) => HttpResponse::BadRequest().json(err.to_string()),
            Err(err @ BorrowsRepositoryError::UserNotFound(_)) => {
                HttpResponse::NotFound().json(err.to_string())
            }
            Err(err) => {
                tracing::error!("Add review failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn get_reviews(
    repository: Repository,
    user_id: web::Path<UserId>,
) -> Result<HttpResponse, Error> {
    Ok(match repository.get_reviews(user_id.into_inner()).await {
        Ok(reviews) => HttpResponse::Ok().json(reviews),
        Err(err) => {
            tracing::error!("Get reviews failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn is_book_in_use(
    repository: Repository,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    Ok(match repository.is_book_in_use(book_id.into_inner()).await {
        Ok(in_use) => HttpResponse::Ok().json(in_use),
        Err(err) => {
            tracing::error!("Book usage check failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}
