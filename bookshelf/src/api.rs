use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

pub type BookId = i32;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
/// Fields of the book supplied on create and update. All of them are required
pub struct BookDetails {
    pub title: String,
    pub author: String,
    pub pages: i32,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
/// Book as stored in the repository, with the id assigned on creation
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub pages: i32,
    pub price: f64,
}

impl Book {
    pub fn new(id: BookId, details: BookDetails) -> Self {
        Self {
            id,
            title: details.title,
            author: details.author,
            pages: details.pages,
            price: details.price,
        }
    }

    pub fn details(&self) -> BookDetails {
        BookDetails {
            title: self.title.clone(),
            author: self.author.clone(),
            pages: self.pages,
            price: self.price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Body of every error response
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
