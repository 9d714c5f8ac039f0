use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};

use serde_json::json;

use crate::api::{Book, BookDetails, BookDetailsPatch, BookId};
use crate::books_repository::{BookRepository, BookRepositoryError};

pub struct InMemoryBookRepository {
    book_sequence_generator: AtomicI32,
    books: parking_lot::RwLock<BTreeMap<BookId, BookDetails>>,
}

impl Default for InMemoryBookRepository {
    fn default() -> Self {
        Self {
            book_sequence_generator: AtomicI32::new(1),
            books: Default::default(),
        }
    }
}

#[async_trait::async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn add_book(&self, details: BookDetails) -> Result<BookId, BookRepositoryError> {
        let id = self.book_sequence_generator.fetch_add(1, Ordering::Relaxed);
        self.books.write().insert(id, details);
        Ok(id)
    }

    async fn update_book(
        &self,
        book_id: BookId,
        patch: BookDetailsPatch,
    ) -> Result<bool, BookRepositoryError> {
        let mut locked_books = self.books.write();
        if let Some(book) = locked_books.get_mut(&book_id) {
            let mut result_book = json!(book);
            json_patch::merge(&mut result_book, &json!(patch));
            *book = serde_json::from_value(result_book)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn get_book(&self, book_id: BookId) -> Result<BookDetails, BookRepositoryError> {
        self.books
            .read()
            .get(&book_id)
            .cloned()
            .ok_or(BookRepositoryError::NotFound(book_id))
    }

    async fn list_books(&self) -> Result<Vec<Book>, BookRepositoryError> {
        Ok(self
            .books
            .read()
            .iter()
            .map(|(&book_id, details)| Book {
                book_id,
                details: details.clone(),
            })
            .collect())
    }

    async fn delete_book(&self, book_id: BookId) -> Result<(), BookRepositoryError> {
        self.books
            .write()
            .remove(&book_id)
            .map(|_| ())
            .ok_or(BookRepositoryError::NotFound(book_id))
    }
}
