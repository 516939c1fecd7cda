pub mod author;
pub mod book;
pub mod book_authors;
pub mod book_copy;
pub mod category;
pub mod publisher;
