use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI32, Ordering};

use crate::api::{BookId, BorrowRecord, Review, ReviewDetails, ReviewId, UserDetails, UserId};
use crate::borrows_repository::{
    now_timestamp, validate_rating, BorrowsRepository, BorrowsRepositoryError,
};

pub struct InMemoryBorrowsRepository {
    users: parking_lot::RwLock<BTreeMap<UserId, UserDetails>>,
    active_borrows: parking_lot::RwLock<HashMap<BookId, UserId>>,
    history: parking_lot::RwLock<HashMap<UserId, Vec<BorrowRecord>>>,
    reviews: parking_lot::RwLock<Vec<Review>>,
    user_sequence_generator: AtomicI32,
    review_sequence_generator: AtomicI32,
}

impl Default for InMemoryBorrowsRepository {
    fn default() -> Self {
        Self {
            users: Default::default(),
            active_borrows: Default::default(),
            history: Default::default(),
            reviews: Default::default(),
            user_sequence_generator: AtomicI32::new(1),
            review_sequence_generator: AtomicI32::new(1),
        }
    }
}

impl InMemoryBorrowsRepository {
    fn ensure_user_exists(&self, user_id: UserId) -> Result<(), BorrowsRepositoryError> {
        if self.users.read().contains_key(&user_id) {
            Ok(())
        } else {
            Err(BorrowsRepositoryError::UserNotFound(user_id))
        }
    }
}

#[async_trait::async_trait]
impl BorrowsRepository for InMemoryBorrowsRepository {
    async fn add_user(&self, details: UserDetails) -> Result<UserId, BorrowsRepositoryError> {
        let mut locked_users = self.users.write();
        if locked_users.values().any(|user| user.email == details.email) {
            return Err(BorrowsRepositoryError::UserAlreadyExists(details.email));
        }
        let id = self.user_sequence_generator.fetch_add(1, Ordering::Relaxed);
        locked_users.insert(id, details);
        Ok(id)
    }

    async fn get_user(&self, id: UserId) -> Result<UserDetails, BorrowsRepositoryError> {
        self.users
            .read()
            .get(&id)
            .cloned()
            .ok_or(BorrowsRepositoryError::UserNotFound(id))
    }

    async fn get_all_user_ids(&self) -> Result<Vec<UserId>, BorrowsRepositoryError> {
        Ok(self.users.read().keys().cloned().collect())
    }

    async fn borrow_book(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<(), BorrowsRepositoryError> {
        self.ensure_user_exists(user_id)?;
        let mut active_borrows_lock = self.active_borrows.write();

        match active_borrows_lock.entry(book_id) {
            Entry::Occupied(_) => Err(BorrowsRepositoryError::BookAlreadyBorrowed(book_id)),
            Entry::Vacant(entry) => {
                entry.insert(user_id);
                self.history
                    .write()
                    .entry(user_id)
                    .or_default()
                    .push(BorrowRecord {
                        book_id,
                        borrowed_at: now_timestamp(),
                        returned_at: None,
                    });
                Ok(())
            }
        }
    }

    async fn return_book(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<(), BorrowsRepositoryError> {
        let mut active_borrows_lock = self.active_borrows.write();

        match active_borrows_lock.entry(book_id) {
            Entry::Occupied(occupied) if occupied.get() == &user_id => {
                occupied.remove();
                let mut history_lock = self.history.write();
                let open_record = history_lock
                    .get_mut(&user_id)
                    .and_then(|records| {
                        records
                            .iter_mut()
                            .rev()
                            .find(|r| r.book_id == book_id && r.returned_at.is_none())
                    })
                    .ok_or_else(|| {
                        BorrowsRepositoryError::Other(format!(
                            "Missing open borrow record for book {book_id}"
                        ))
                    })?;
                open_record.returned_at = Some(now_timestamp());
                Ok(())
            }
            _ => Err(BorrowsRepositoryError::BookNotBorrowedByUser(book_id)),
        }
    }

    async fn get_active_borrows(
        &self,
        user_id: UserId,
    ) -> Result<Vec<BookId>, BorrowsRepositoryError> {
        let mut books: Vec<BookId> = self
            .active_borrows
            .read()
            .iter()
            .filter(|(_, &uid)| user_id == uid)
            .map(|(book_id, _)| *book_id)
            .collect();
        books.sort();
        Ok(books)
    }

    async fn get_borrow_history(
        &self,
        user_id: UserId,
    ) -> Result<Vec<BorrowRecord>, BorrowsRepositoryError> {
        Ok(self
            .history
            .read()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_review(
        &self,
        user_id: UserId,
        details: ReviewDetails,
    ) -> Result<Review, BorrowsRepositoryError> {
        validate_rating(details.rating)?;
        self.ensure_user_exists(user_id)?;

        let has_borrowed = self
            .history
            .read()
            .get(&user_id)
            .map(|records| records.iter().any(|r| r.book_id == details.book_id))
            .unwrap_or_default();
        if !has_borrowed {
            return Err(BorrowsRepositoryError::ReviewedBookNotBorrowed(
                details.book_id,
            ));
        }

        let review_id: ReviewId = self.review_sequence_generator.fetch_add(1, Ordering::Relaxed);
        let review = Review {
            review_id,
            user_id,
            book_id: details.book_id,
            rating: details.rating,
            comment: details.comment,
        };
        self.reviews.write().push(review.clone());
        Ok(review)
    }

    async fn get_reviews(&self, user_id: UserId) -> Result<Vec<Review>, BorrowsRepositoryError> {
        Ok(self
            .reviews
            .read()
            .iter()
            .filter(|review| review.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn is_book_in_use(&self, book_id: BookId) -> Result<bool, BorrowsRepositoryError> {
        let borrowed = self
            .history
            .read()
            .values()
            .flatten()
            .any(|record| record.book_id == book_id);
        Ok(borrowed || self.reviews.read().iter().any(|r| r.book_id == book_id))
    }
}

#[cfg(test)]
mod tests_in_memory_borrows_repository {
    use super::*;

    fn user(name: &str) -> UserDetails {
        UserDetails {
            name: name.to_string(),
            email: format!("{name}@example.com"),
        }
    }

    #[tokio::test]
    /// Simple test to cover user management
    /// 1. Gets all users - expects empty
    /// 2. Creates user and reads it back
    /// 3. Rejects second user with the same email
    /// 4. Gets user not existing in db to get not found
    async fn test_user_management() {
        let repository = InMemoryBorrowsRepository::default();
        assert_eq!(
            repository.get_all_user_ids().await.unwrap(),
            Vec::<UserId>::default()
        );

        let user_id = repository.add_user(user("ada")).await.unwrap();
        assert_eq!(repository.get_user(user_id).await.unwrap(), user("ada"));
        assert_eq!(repository.get_all_user_ids().await.unwrap(), vec![user_id]);

        let duplicate = repository
            .add_user(UserDetails {
                name: "Other Ada".to_string(),
                ..user("ada")
            })
            .await;
        assert!(matches!(
            duplicate,
            Err(BorrowsRepositoryError::UserAlreadyExists(..))
        ));

        let user_2_id = repository.add_user(user("grace")).await.unwrap();
        assert_eq!(
            repository.get_all_user_ids().await.unwrap(),
            vec![user_id, user_2_id]
        );

        assert!(matches!(
            repository.get_user(user_2_id + 1).await,
            Err(BorrowsRepositoryError::UserNotFound(..))
        ));
    }

    #[tokio::test]
    /// Covers borrowing and returning
    /// 1. Borrows a book and lists it
    /// 2. Second user cannot borrow it nor return it
    /// 3. Owner returns it, history is closed
    /// 4. Borrowing again opens a new history record
    async fn test_borrow_management() {
        let repository = InMemoryBorrowsRepository::default();
        let user_1_id = repository.add_user(user("u1")).await.unwrap();
        let user_2_id = repository.add_user(user("u2")).await.unwrap();
        let book_id: BookId = 7;

        assert!(matches!(
            repository.borrow_book(999, book_id).await,
            Err(BorrowsRepositoryError::UserNotFound(999))
        ));

        repository.borrow_book(user_1_id, book_id).await.unwrap();
        assert_eq!(
            repository.get_active_borrows(user_1_id).await.unwrap(),
            vec![book_id]
        );

        assert!(matches!(
            repository.borrow_book(user_2_id, book_id).await,
            Err(BorrowsRepositoryError::BookAlreadyBorrowed(..))
        ));
        assert!(matches!(
            repository.return_book(user_2_id, book_id).await,
            Err(BorrowsRepositoryError::BookNotBorrowedByUser(..))
        ));

        repository.return_book(user_1_id, book_id).await.unwrap();
        assert_eq!(
            repository.get_active_borrows(user_1_id).await.unwrap(),
            Vec::<BookId>::default()
        );
        assert!(matches!(
            repository.return_book(user_1_id, book_id).await,
            Err(BorrowsRepositoryError::BookNotBorrowedByUser(..))
        ));

        let history = repository.get_borrow_history(user_1_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].book_id, book_id);
        assert!(history[0].returned_at.is_some());

        repository.borrow_book(user_2_id, book_id).await.unwrap();
        let history = repository.get_borrow_history(user_2_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].returned_at, None);
    }

    #[tokio::test]
    async fn test_book_in_use_after_borrow_or_review() {
        let repository = InMemoryBorrowsRepository::default();
        let user_id = repository.add_user(user("reader")).await.unwrap();

        assert!(!repository.is_book_in_use(5).await.unwrap());

        repository.borrow_book(user_id, 5).await.unwrap();
        assert!(repository.is_book_in_use(5).await.unwrap());

        repository.return_book(user_id, 5).await.unwrap();
        assert!(repository.is_book_in_use(5).await.unwrap());
        assert!(!repository.is_book_in_use(6).await.unwrap());
    }

    #[tokio::test]
    async fn test_reviews_require_borrow_and_valid_rating() {
        let repository = InMemoryBorrowsRepository::default();
        let user_id = repository.add_user(user("reader")).await.unwrap();
        let review = ReviewDetails {
            book_id: 3,
            rating: 5,
            comment: Some("Loved it".to_string()),
        };

        assert!(matches!(
            repository.add_review(user_id, review.clone()).await,
            Err(BorrowsRepositoryError::ReviewedBookNotBorrowed(3))
        ));

        repository.borrow_book(user_id, 3).await.unwrap();
        repository.return_book(user_id, 3).await.unwrap();

        assert!(matches!(
            repository
                .add_review(
                    user_id,
                    ReviewDetails {
                        rating: 6,
                        ..review.clone()
                    }
                )
                .await,
            Err(BorrowsRepositoryError::InvalidRating(6))
        ));

        let stored = repository.add_review(user_id, review.clone()).await.unwrap();
        assert_eq!(stored.book_id, 3);
        assert_eq!(stored.user_id, user_id);
        assert_eq!(repository.get_reviews(user_id).await.unwrap(), vec![stored]);
        assert_eq!(repository.get_reviews(user_id + 1).await.unwrap(), vec![]);
    }
}
