use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::blog::{Blog, BlogInput};
use crate::middleware::response::PageRequest;

const BLOG_SELECT: &str = "SELECT b.id, b.author_id, u.full_name AS author_name, b.title, b.content, b.image_url,
        b.is_published, b.view_count, b.created_at, b.updated_at
     FROM blogs b JOIN users u ON u.id = b.author_id";

pub struct BlogRepository {
    pool: PgPool,
}

impl BlogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, author_id: Uuid, input: &BlogInput) -> Result<Blog, DatabaseError> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO blogs (id, author_id, title, content, image_url, is_published)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(author_id)
        .bind(input.title.trim())
        .bind(&input.content)
        .bind(&input.image_url)
        .bind(input.is_published)
        .fetch_one(&self.pool)
        .await?;
        self.get(id).await
    }

    pub async fn update(&self, id: Uuid, input: &BlogInput) -> Result<Blog, DatabaseError> {
        let result = sqlx::query(
            "UPDATE blogs SET title = $2, content = $3, image_url = $4, is_published = $5, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.title.trim())
        .bind(&input.content)
        .bind(&input.image_url)
        .bind(input.is_published)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Blog not found".to_string()));
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Blog not found".to_string()));
        }
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Blog, DatabaseError> {
        let blog = sqlx::query_as::<_, Blog>(&format!("{} WHERE b.id = $1", BLOG_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        blog.ok_or_else(|| DatabaseError::NotFound("Blog not found".to_string()))
    }

    /// Public read of a published post; counts the view
    pub async fn view_published(&self, id: Uuid) -> Result<Blog, DatabaseError> {
        let result = sqlx::query("UPDATE blogs SET view_count = view_count + 1 WHERE id = $1 AND is_published")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Blog not found".to_string()));
        }
        self.get(id).await
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        published_only: bool,
        page: PageRequest,
    ) -> Result<(Vec<Blog>, i64), DatabaseError> {
        let pattern = search.map(|s| format!("%{}%", s.trim()));
        let where_clause = "WHERE ($1::text IS NULL OR b.title ILIKE $1) AND (b.is_published OR NOT $2)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM blogs b {}", where_clause))
            .bind(&pattern)
            .bind(published_only)
            .fetch_one(&self.pool)
            .await?;

        let blogs = sqlx::query_as::<_, Blog>(&format!(
            "{} {} ORDER BY b.created_at DESC LIMIT $3 OFFSET $4",
            BLOG_SELECT, where_clause
        ))
        .bind(&pattern)
        .bind(published_only)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((blogs, total))
    }
}
