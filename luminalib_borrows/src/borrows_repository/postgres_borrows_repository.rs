use anyhow::Context;
use serde_json::json;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Row, Statement};

use crate::api::{BookId, BorrowRecord, Review, ReviewDetails, UserDetails, UserId};
use crate::borrows_repository::{
    now_timestamp, validate_rating, BorrowsRepository, BorrowsRepositoryError,
};

pub struct PostgresBorrowsRepositoryConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

pub struct PostgresBorrowsRepository {
    client: Client,
}

impl PostgresBorrowsRepository {
    pub async fn init(config: PostgresBorrowsRepositoryConfig) -> anyhow::Result<Self> {
        let connection_str = format!(
            "postgresql://{}:{}@{}",
            config.username, config.password, config.hostname
        );
        tracing::info!("Connecting to postgres at {}", config.hostname);
        let (client, connection) = tokio_postgres::connect(&connection_str, NoTls)
            .await
            .context("Failed to start postgres")?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("Postgres connection error: {}", e);
            }
        });

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS users (
            id              SERIAL PRIMARY KEY,
            params          JSONB
            );
        CREATE UNIQUE INDEX IF NOT EXISTS users_email ON users ((params->>'email'));
        ",
            )
            .await
            .context("Failed to setup users table")?;

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS borrows (
            id                   SERIAL PRIMARY KEY,
            book_id              INTEGER NOT NULL,
            user_id              INTEGER NOT NULL,
            borrowed_at          BIGINT NOT NULL,
            returned_at          BIGINT
            );
        CREATE UNIQUE INDEX IF NOT EXISTS active_borrows ON borrows (book_id) WHERE returned_at IS NULL;
        ",
            )
            .await
            .context("Failed to setup borrows table")?;

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS reviews (
            id                   SERIAL PRIMARY KEY,
            book_id              INTEGER NOT NULL,
            user_id              INTEGER NOT NULL,
            rating               SMALLINT NOT NULL,
            comment              TEXT
            )
        ",
            )
            .await
            .context("Failed to setup reviews table")?;

        Ok(Self { client })
    }

    async fn ensure_user_exists(&self, user_id: UserId) -> Result<(), BorrowsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT id FROM users WHERE id = $1")
            .await?;
        if self.client.query(&stmt, &[&user_id]).await?.is_empty() {
            Err(BorrowsRepositoryError::UserNotFound(user_id))
        } else {
            Ok(())
        }
    }
}

fn is_unique_violation(err: &tokio_postgres::Error) -> bool {
    err.as_db_error()
        .map(|db_err| db_err.code() == &SqlState::UNIQUE_VIOLATION)
        .unwrap_or_default()
}

fn review_from_row(row: &Row) -> Result<Review, BorrowsRepositoryError> {
    let rating: i16 = row.try_get(3)?;
    Ok(Review {
        review_id: row.try_get(0)?,
        user_id: row.try_get(1)?,
        book_id: row.try_get(2)?,
        rating: u8::try_from(rating)
            .map_err(|_| BorrowsRepositoryError::Other(format!("Invalid rating {rating}")))?,
        comment: row.try_get(4)?,
    })
}

#[async_trait::async_trait]
impl BorrowsRepository for PostgresBorrowsRepository {
    async fn add_user(&self, details: UserDetails) -> Result<UserId, BorrowsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("INSERT INTO users (params) VALUES ($1) RETURNING id")
            .await?;

        let rows = match self.client.query(&stmt, &[&json!(details)]).await {
            Ok(rows) => rows,
            Err(err) if is_unique_violation(&err) => {
                return Err(BorrowsRepositoryError::UserAlreadyExists(details.email))
            }
            Err(err) => return Err(err.into()),
        };

        let user_id: UserId = rows
            .first()
            .ok_or_else(|| BorrowsRepositoryError::Other("Id not returned".to_string()))?
            .try_get(0)?;

        Ok(user_id)
    }

    async fn get_user(&self, id: UserId) -> Result<UserDetails, BorrowsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT params FROM users WHERE id = ($1)")
            .await?;

        let rows = self.client.query(&stmt, &[&id]).await?;

        let details: serde_json::Value = rows
            .first()
            .ok_or(BorrowsRepositoryError::UserNotFound(id))?
            .try_get(0)?;

        Ok(serde_json::from_value(details)?)
    }

    async fn get_all_user_ids(&self) -> Result<Vec<UserId>, BorrowsRepositoryError> {
        let stmt: Statement = self.client.prepare("SELECT id FROM users ORDER BY id").await?;
        let rows = self.client.query(&stmt, &[]).await?;
        rows.iter().map(|row| Ok(row.try_get(0)?)).collect()
    }

    async fn borrow_book(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<(), BorrowsRepositoryError> {
        self.ensure_user_exists(user_id).await?;
        let stmt: Statement = self
            .client
            .prepare("INSERT INTO borrows (book_id, user_id, borrowed_at) VALUES ($1, $2, $3)")
            .await?;

        match self
            .client
            .execute(&stmt, &[&book_id, &user_id, &now_timestamp()])
            .await
        {
            Ok(_) => Ok(()),
            // active_borrows index allows only one open borrow per book
            Err(err) if is_unique_violation(&err) => {
                Err(BorrowsRepositoryError::BookAlreadyBorrowed(book_id))
            }
            Err(other_err) => Err(other_err.into()),
        }
    }

    async fn return_book(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<(), BorrowsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "UPDATE borrows SET returned_at = $3 \
                 WHERE book_id = $1 AND user_id = $2 AND returned_at IS NULL RETURNING id",
            )
            .await?;

        let rows = self
            .client
            .query(&stmt, &[&book_id, &user_id, &now_timestamp()])
            .await?;

        if rows.is_empty() {
            Err(BorrowsRepositoryError::BookNotBorrowedByUser(book_id))
        } else {
            Ok(())
        }
    }

    async fn get_active_borrows(
        &self,
        user_id: UserId,
    ) -> Result<Vec<BookId>, BorrowsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "SELECT book_id FROM borrows WHERE user_id = $1 AND returned_at IS NULL ORDER BY book_id",
            )
            .await?;
        let rows = self.client.query(&stmt, &[&user_id]).await?;
        rows.iter().map(|row| Ok(row.try_get(0)?)).collect()
    }

    async fn get_borrow_history(
        &self,
        user_id: UserId,
    ) -> Result<Vec<BorrowRecord>, BorrowsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "SELECT book_id, borrowed_at, returned_at FROM borrows WHERE user_id = $1 ORDER BY id",
            )
            .await?;

        let rows = self.client.query(&stmt, &[&user_id]).await?;

        rows.iter()
            .map(|row| {
                Ok(BorrowRecord {
                    book_id: row.try_get(0)?,
                    borrowed_at: row.try_get(1)?,
                    returned_at: row.try_get(2)?,
                })
            })
            .collect()
    }

    async fn add_review(
        &self,
        user_id: UserId,
        details: ReviewDetails,
    ) -> Result<Review, BorrowsRepositoryError> {
        validate_rating(details.rating)?;
        self.ensure_user_exists(user_id).await?;

        let stmt: Statement = self
            .client
            .prepare("SELECT 1 FROM borrows WHERE user_id = $1 AND book_id = $2 LIMIT 1")
            .await?;
        if self
            .client
            .query(&stmt, &[&user_id, &details.book_id])
            .await?
            .is_empty()
        {
            return Err(BorrowsRepositoryError::ReviewedBookNotBorrowed(
                details.book_id,
            ));
        }

        let stmt: Statement = self
            .client
            .prepare(
                "INSERT INTO reviews (book_id, user_id, rating, comment) VALUES ($1, $2, $3, $4) \
                 RETURNING id, user_id, book_id, rating, comment",
            )
            .await?;
        let rows = self
            .client
            .query(
                &stmt,
                &[
                    &details.book_id,
                    &user_id,
                    &i16::from(details.rating),
                    &details.comment,
                ],
            )
            .await?;

        review_from_row(
            rows.first()
                .ok_or_else(|| BorrowsRepositoryError::Other("Review not returned".to_string()))?,
        )
    }

    async fn get_reviews(&self, user_id: UserId) -> Result<Vec<Review>, BorrowsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "SELECT id, user_id, book_id, rating, comment FROM reviews WHERE user_id = $1 ORDER BY id",
            )
            .await?;
        let rows = self.client.query(&stmt, &[&user_id]).await?;
        rows.iter().map(review_from_row).collect()
    }

    async fn is_book_in_use(&self, book_id: BookId) -> Result<bool, BorrowsRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "SELECT EXISTS(SELECT 1 FROM borrows WHERE book_id = $1) \
                 OR EXISTS(SELECT 1 FROM reviews WHERE book_id = $1)",
            )
            .await?;
        let row = self.client.query_one(&stmt, &[&book_id]).await?;
        Ok(row.try_get(0)?)
    }
}

#[cfg(all(test, feature = "postgres_tests"))]
mod tests_postgres_borrows_repository {
    use serial_test::file_serial;
    use testcontainers::core::IntoContainerPort;
    use testcontainers::runners::AsyncRunner;
    use testcontainers::{ContainerAsync, GenericImage, ImageExt};

    use super::*;

    async fn start_postgres_container_and_init_repo(
    ) -> (ContainerAsync<GenericImage>, PostgresBorrowsRepository) {
        let pg_container = GenericImage::new("postgres", "latest")
            .with_mapped_port(5432, 5432.tcp())
            .with_env_var("POSTGRES_USER", "postgres")
            .with_env_var("POSTGRES_PASSWORD", "postgres")
            .start()
            .await
            .expect("Failed to start postgres");

        for _ in 0..10 {
            if let Ok(repo) = PostgresBorrowsRepository::init(PostgresBorrowsRepositoryConfig {
                hostname: "127.0.0.1".to_string(),
                username: "postgres".to_string(),
                password: "postgres".to_string(),
            })
            .await
            {
                return (pg_container, repo);
            }
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        }
        panic!("Failed to setup postgres container")
    }

    #[tokio::test]
    #[file_serial(key, path => "../.pgtestslock")]
    /// Covers users, borrowing, returning and reviewing in one testcase
    /// for the sake of not starting container multiple times
    async fn test_borrows_lifecycle() {
        let (_container, repository) = start_postgres_container_and_init_repo().await;

        let reader = UserDetails {
            name: "Reader".to_string(),
            email: "reader@example.com".to_string(),
        };
        let user_id = repository.add_user(reader.clone()).await.unwrap();
        assert_eq!(repository.get_user(user_id).await.unwrap(), reader);
        assert!(matches!(
            repository.add_user(reader.clone()).await,
            Err(BorrowsRepositoryError::UserAlreadyExists(..))
        ));
        let other_id = repository
            .add_user(UserDetails {
                name: "Other".to_string(),
                email: "other@example.com".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(
            repository.get_all_user_ids().await.unwrap(),
            vec![user_id, other_id]
        );

        let book_id: BookId = 123;
        assert!(matches!(
            repository
                .add_review(
                    user_id,
                    ReviewDetails {
                        book_id,
                        rating: 4,
                        comment: None,
                    }
                )
                .await,
            Err(BorrowsRepositoryError::ReviewedBookNotBorrowed(..))
        ));

        repository.borrow_book(user_id, book_id).await.unwrap();
        assert!(matches!(
            repository.borrow_book(other_id, book_id).await,
            Err(BorrowsRepositoryError::BookAlreadyBorrowed(..))
        ));
        assert_eq!(
            repository.get_active_borrows(user_id).await.unwrap(),
            vec![book_id]
        );
        assert!(matches!(
            repository.return_book(other_id, book_id).await,
            Err(BorrowsRepositoryError::BookNotBorrowedByUser(..))
        ));
        repository.return_book(user_id, book_id).await.unwrap();
        assert_eq!(
            repository.get_active_borrows(user_id).await.unwrap(),
            Vec::<BookId>::default()
        );

        let history = repository.get_borrow_history(user_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].returned_at.is_some());

        let review = repository
            .add_review(
                user_id,
                ReviewDetails {
                    book_id,
                    rating: 5,
                    comment: Some("Wonderful".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(repository.get_reviews(user_id).await.unwrap(), vec![review]);
        assert!(repository.is_book_in_use(book_id).await.unwrap());
        assert!(!repository.is_book_in_use(book_id + 1).await.unwrap());
    }
}
