use crate::domain::value_objects::{BookId, Isbn};
use crate::ports::catalog_store::{Book, CatalogStore as CatalogStoreTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

/// Map a `books` row into the catalog record.
///
/// ISBN and copy counts are validated on the way out so a corrupted row
/// surfaces as an error instead of an invalid domain value.
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    let isbn_str: String = row.get("isbn");
    let isbn = Isbn::try_from(isbn_str).map_err(|e| {
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            as Box<dyn std::error::Error + Send + Sync>
    })?;

    let total_copies_i32: i32 = row.get("total_copies");
    let available_copies_i32: i32 = row.get("available_copies");
    let total_copies: u32 = total_copies_i32.try_into().map_err(|_| {
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("total_copies out of range: {}", total_copies_i32),
        )) as Box<dyn std::error::Error + Send + Sync>
    })?;
    let available_copies: u32 = available_copies_i32.try_into().map_err(|_| {
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("available_copies out of range: {}", available_copies_i32),
        )) as Box<dyn std::error::Error + Send + Sync>
    })?;

    Ok(Book {
        book_id: BookId::from_uuid(row.get("book_id")),
        isbn,
        title: row.get("title"),
        author: row.get("author"),
        total_copies,
        available_copies,
    })
}

/// PostgreSQL CatalogStore.
///
/// The copy counter is serialized per book by row-level locking: both
/// mutations are single conditional UPDATE statements, so two checkouts
/// of the last copy can never both pass the `available_copies > 0`
/// guard, and contention on one book never blocks another.
pub struct CatalogStore {
    pool: PgPool,
}

impl CatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStoreTrait for CatalogStore {
    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT book_id, isbn, title, author, total_copies, available_copies
            FROM books
            WHERE book_id = $1
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn try_decrement_available(&self, book_id: BookId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET available_copies = available_copies - 1
            WHERE book_id = $1 AND available_copies > 0
            "#,
        )
        .bind(book_id.value())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn increment_available(&self, book_id: BookId) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE books
            SET available_copies = LEAST(available_copies + 1, total_copies)
            WHERE book_id = $1
            "#,
        )
        .bind(book_id.value())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
