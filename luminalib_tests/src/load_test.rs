use std::collections::HashMap;

use rand::prelude::SliceRandom;
use rand::{thread_rng, Rng};

use luminalib_borrows::api::{ReviewDetails, UserDetails};
use luminalib_borrows::client::LuminalibBorrowsClient;
use luminalib_recommendations::client::LuminalibRecommendationsClient;
use luminalib_repository::api::BookDetails;
use luminalib_repository::client::LuminalibRepositoryClient;

#[tokio::test]
/// Fills the services with generated books, users, borrows and reviews
/// and asks for recommendations of every generated user
async fn generate_lots_of_books_borrows_and_reviews() {
    const NO_OF_BOOKS_TO_GENERATE: usize = 50;
    const NO_OF_AUTHORS_TO_GENERATE: usize = 20;
    const NO_OF_USERS_TO_GENERATE: usize = 10;
    const NO_OF_BORROWS: usize = 200;

    let mut rng = thread_rng();
    let repository_client =
        LuminalibRepositoryClient::new("http://127.0.0.1:8001").expect("Failed to create client");
    let borrows_client = LuminalibBorrowsClient::new("http://127.0.0.1:8002")
        .expect("Failed to create borrows client");
    let recommendations_client = LuminalibRecommendationsClient::new("http://127.0.0.1:8003")
        .expect("Failed to create recommendations client");

    let authors = generate_authors(&mut rng, NO_OF_AUTHORS_TO_GENERATE);
    let books = generate_books(&mut rng, NO_OF_BOOKS_TO_GENERATE, &authors);
    let users = generate_users(&mut rng, NO_OF_USERS_TO_GENERATE);

    let mut book_ids = vec![];
    for book in books {
        let book_id = repository_client
            .add_book(book)
            .await
            .expect("Failed to add book");
        book_ids.push(book_id);
        println!("Added book {}", book_id);
    }

    let mut user_ids = vec![];
    for user in users {
        let user_id = borrows_client
            .add_user(user)
            .await
            .expect("Failed to add user");
        user_ids.push(user_id);
        println!("Added user {}", user_id);
    }

    let mut borrowed_books = HashMap::new();
    for _ in 0..NO_OF_BORROWS {
        let book_id = *book_ids.choose(&mut rng).unwrap();
        let user_id = *user_ids.choose(&mut rng).unwrap();

        if let Some(borrowing_user) = borrowed_books.remove(&book_id) {
            let returned = borrows_client
                .return_book(book_id, borrowing_user)
                .await
                .expect("Failed to return book");
            assert!(returned, "Failed to return book - result false");

            borrows_client
                .add_review(borrowing_user, generate_review(&mut rng, book_id))
                .await
                .expect("Failed to add review");
            println!("User {} returned and reviewed book {}", borrowing_user, book_id);
        }

        let borrowed = borrows_client
            .borrow_book(book_id, user_id)
            .await
            .expect("Failed to borrow book");
        assert!(borrowed, "Failed to borrow book - result false");
        borrowed_books.insert(book_id, user_id);
        println!("User {} borrowed book {}", user_id, book_id);
    }

    for user_id in user_ids {
        let recommendations = recommendations_client
            .get_recommendations(user_id, None)
            .await
            .expect("Failed to get recommendations");
        assert!(recommendations.len() <= 5);
        println!("Recommendations for user {}: {:?}", user_id, recommendations);
    }
}

fn generate_authors(rng: &mut impl Rng, no_of_authors: usize) -> Vec<String> {
    (0..no_of_authors)
        .map(|_| {
            format!(
                "{} {}",
                FIRST_NAMES.choose(rng).unwrap(),
                LAST_NAMES.choose(rng).unwrap()
            )
        })
        .collect()
}

fn generate_books(
    rng: &mut impl Rng,
    no_of_books_to_generate: usize,
    authors: &[String],
) -> Vec<BookDetails> {
    (0..no_of_books_to_generate)
        .map(|no| BookDetails {
            title: format!("A tale of number {} and {}", no, rng.gen_range(0..1000)),
            author: authors.choose(rng).unwrap().clone(),
            description: TOPICS
                .choose_multiple(rng, 4)
                .cloned()
                .collect::<Vec<_>>()
                .join(" "),
            summary: None,
        })
        .collect()
}

fn generate_users(rng: &mut impl Rng, no_of_users_to_generate: usize) -> Vec<UserDetails> {
    let run_id: u32 = rng.gen();
    (0..no_of_users_to_generate)
        .map(|no| {
            let first_name = FIRST_NAMES.choose(rng).unwrap();
            let last_name = LAST_NAMES.choose(rng).unwrap();
            UserDetails {
                name: format!("{} {}", first_name, last_name),
                email: format!(
                    "{}.{}.{}.{}@example.com",
                    first_name.to_lowercase(),
                    last_name.to_lowercase(),
                    run_id,
                    no
                ),
            }
        })
        .collect()
}

fn generate_review(rng: &mut impl Rng, book_id: i32) -> ReviewDetails {
    ReviewDetails {
        book_id,
        rating: rng.gen_range(1..=5),
        comment: rng
            .gen_bool(0.8)
            .then(|| COMMENTS.choose(rng).unwrap().to_string()),
    }
}

const TOPICS: [&str; 16] = [
    "dragons", "wizards", "castles", "knights", "markets", "finance", "rockets", "planets",
    "detectives", "murder", "romance", "weddings", "pirates", "oceans", "gardens", "cooking",
];

const COMMENTS: [&str; 8] = [
    "I loved this book, it was wonderful",
    "A great story with memorable characters",
    "Really enjoyable and gripping",
    "Good but a bit slow in the middle",
    "Not my kind of book",
    "Boring and predictable",
    "Terrible writing, a waste of time",
    "It was fine",
];

const FIRST_NAMES: [&str; 24] = [
    "Ryan", "Dorothy", "Jacob", "Amy", "Nicholas", "Kathleen", "Gary", "Angela", "Eric",
    "Shirley", "Jonathan", "Emma", "Stephen", "Brenda", "Larry", "Pamela", "Justin", "Nicole",
    "Scott", "Anna", "Brandon", "Samantha", "Benjamin", "Katherine",
];

const LAST_NAMES: [&str; 24] = [
    "Wilson", "Moore", "Taylor", "Anderson", "Thomas", "Jackson", "White", "Harris", "Martin",
    "Thompson", "Garcia", "Martinez", "Robinson", "Clark", "Rodriguez", "Lewis", "Lee",
    "Walker", "Hall", "Allen", "Young", "Hernandez", "King", "Wright",
];
