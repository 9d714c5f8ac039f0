use anyhow::Context;
use serde_json::json;
use tokio_postgres::{Client, NoTls, Statement};

use crate::api::{Book, BookDetails, BookDetailsPatch, BookId};
use crate::books_repository::{BookRepository, BookRepositoryError};

pub struct PostgresBooksRepository {
    client: Client,
}

pub struct PostgresBooksRepositoryConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl PostgresBooksRepository {
    pub async fn init(config: PostgresBooksRepositoryConfig) -> anyhow::Result<Self> {
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
        CREATE TABLE IF NOT EXISTS books (
            id              SERIAL PRIMARY KEY,
            params          JSONB
            )
        ",
            )
            .await
            .context("Failed to setup books table")?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl BookRepository for PostgresBooksRepository {
    async fn add_book(&self, details: BookDetails) -> Result<BookId, BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("INSERT INTO books (params) VALUES ($1) RETURNING id")
            .await?;

        let rows = self.client.query(&stmt, &[&json!(details)]).await?;

        let book_id: BookId = rows
            .first()
            .ok_or_else(|| BookRepositoryError::Other("Id not returned".to_string()))?
            .try_get(0)?;

        Ok(book_id)
    }

    async fn update_book(
        &self,
        book_id: BookId,
        patch: BookDetailsPatch,
    ) -> Result<bool, BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("UPDATE books SET params = params || ($1)::JSONB WHERE id = ($2) RETURNING id")
            .await?;

        let rows = self.client.query(&stmt, &[&json!(patch), &book_id]).await?;
        Ok(!rows.is_empty())
    }

    async fn get_book(&self, book_id: BookId) -> Result<BookDetails, BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT params FROM books WHERE id = ($1)")
            .await?;

        let rows = self.client.query(&stmt, &[&book_id]).await?;

        let details: serde_json::Value = rows
            .first()
            .ok_or(BookRepositoryError::NotFound(book_id))?
            .try_get(0)?;

        Ok(serde_json::from_value(details)?)
    }

    async fn list_books(&self) -> Result<Vec<Book>, BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT id, params FROM books ORDER BY id")
            .await?;

        let rows = self.client.query(&stmt, &[]).await?;

        rows.iter()
            .map(|row| {
                let book_id = row.try_get(0)?;
                let params: serde_json::Value = row.try_get(1)?;
                Ok(Book {
                    book_id,
                    details: serde_json::from_value(params)?,
                })
            })
            .collect()
    }

    async fn delete_book(&self, book_id: BookId) -> Result<(), BookRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("DELETE FROM books WHERE id = ($1) RETURNING id")
            .await?;

        let rows = self.client.query(&stmt, &[&book_id]).await?;
        if rows.is_empty() {
            Err(BookRepositoryError::NotFound(book_id))
        } else {
            Ok(())
        }
    }
}

#[cfg(all(test, feature = "postgres_tests"))]
mod postgres_book_repository_tests {
    use serial_test::file_serial;
    use testcontainers::core::IntoContainerPort;
    use testcontainers::runners::AsyncRunner;
    use testcontainers::{ContainerAsync, GenericImage, ImageExt};

    use crate::api::{Book, BookDetails, BookDetailsPatch};
    use crate::books_repository::{
        BookRepository, BookRepositoryError, PostgresBooksRepository,
        PostgresBooksRepositoryConfig,
    };

    async fn start_postgres_container_and_init_repo(
    ) -> (ContainerAsync<GenericImage>, PostgresBooksRepository) {
        let pg_container = GenericImage::new("postgres", "latest")
            .with_mapped_port(5432, 5432.tcp())
            .with_env_var("POSTGRES_USER", "postgres")
            .with_env_var("POSTGRES_PASSWORD", "postgres")
            .start()
            .await
            .expect("Failed to start postgres");

        for _ in 0..10 {
            if let Ok(repo) = PostgresBooksRepository::init(PostgresBooksRepositoryConfig {
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

    fn book_details(title: &str) -> BookDetails {
        BookDetails {
            title: title.to_string(),
            author: "Ursula K. Le Guin".to_string(),
            description: "Anarchist moon".to_string(),
            summary: None,
        }
    }

    #[tokio::test]
    #[file_serial(key, path => "../.pgtestslock")]
    /// Covers add, get, list, patch and delete in one testcase
    /// for the sake of not starting container multiple times
    async fn test_book_lifecycle() {
        let (_container, repo) = start_postgres_container_and_init_repo().await;

        assert!(matches!(
            repo.get_book(20000).await,
            Err(BookRepositoryError::NotFound(..))
        ));
        assert_eq!(repo.list_books().await.unwrap(), vec![]);

        let id_1 = repo.add_book(book_details("The Dispossessed")).await.unwrap();
        let id_2 = repo.add_book(book_details("The Lathe of Heaven")).await.unwrap();
        assert_eq!(
            repo.get_book(id_1).await.unwrap(),
            book_details("The Dispossessed")
        );
        assert_eq!(
            repo.list_books().await.unwrap(),
            vec![
                Book {
                    book_id: id_1,
                    details: book_details("The Dispossessed"),
                },
                Book {
                    book_id: id_2,
                    details: book_details("The Lathe of Heaven"),
                },
            ]
        );

        assert!(!repo
            .update_book(2000, BookDetailsPatch::default())
            .await
            .unwrap());
        let patch = BookDetailsPatch {
            summary: Some("Shevek travels to Urras".to_string()),
            ..BookDetailsPatch::default()
        };
        assert!(repo.update_book(id_1, patch).await.unwrap());
        assert_eq!(
            repo.get_book(id_1).await.unwrap().summary,
            Some("Shevek travels to Urras".to_string())
        );

        repo.delete_book(id_2).await.unwrap();
        assert!(matches!(
            repo.delete_book(id_2).await,
            Err(BookRepositoryError::NotFound(..))
        ));
        assert_eq!(repo.list_books().await.unwrap().len(), 1);
    }
}
