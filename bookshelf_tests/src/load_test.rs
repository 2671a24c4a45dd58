use rand::prelude::SliceRandom;
use rand::{thread_rng, Rng};

use bookshelf::api::BookDetails;
use bookshelf::client::BookshelfClient;

#[tokio::test]
async fn generate_lots_of_books() {
    const NO_OF_BOOKS_TO_GENERATE: usize = 100;

    let mut rng = thread_rng();
    let bookshelf_url =
        std::env::var("BOOKSHELF_URL").unwrap_or("http://127.0.0.1:8080".to_string());
    let client = BookshelfClient::new(&bookshelf_url).expect("Failed to create client");

    let mut book_ids = vec![];
    for book in generate_books(&mut rng, NO_OF_BOOKS_TO_GENERATE) {
        let book = client.add_book(&book).await.expect("Failed to add book");
        println!("Added book {}", book.id);
        book_ids.push(book.id);
    }

    let listed = client
        .list_books("Admin", "python")
        .await
        .expect("Failed to list books");
    assert!(book_ids
        .iter()
        .all(|book_id| listed.iter().any(|book| book.id == *book_id)));

    book_ids.shuffle(&mut rng);
    for book_id in book_ids.iter().take(NO_OF_BOOKS_TO_GENERATE / 2) {
        client
            .delete_book(*book_id)
            .await
            .expect("Failed to delete book")
            .expect("Book not found");
        println!("Deleted book {}", book_id);
    }
}

fn generate_books(rng: &mut impl Rng, no_of_books_to_generate: usize) -> Vec<BookDetails> {
    (0..no_of_books_to_generate)
        .map(|no| BookDetails {
            title: format!("A tale of number {} and {}", no, rng.gen_range(0..1000)),
            author: format!(
                "{} {}",
                FIRST_NAMES.choose(rng).unwrap(),
                LAST_NAMES.choose(rng).unwrap()
            ),
            pages: rng.gen_range(50..1200),
            price: f64::from(rng.gen_range(199..4999_u32)) / 100.0,
        })
        .collect()
}

const FIRST_NAMES: [&str; 12] = [
    "Ryan", "Dorothy", "Jacob", "Amy", "Nicholas", "Kathleen", "Gary", "Angela", "Eric",
    "Shirley", "Frank", "Ursula",
];

const LAST_NAMES: [&str; 12] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Herbert",
    "Le Guin", "Asimov", "Banks",
];
