use sqlx::SqlitePool;

use crate::models::{Address, Company, User};

pub struct UserRepository {
    pool: SqlitePool,
}

// Row types for database queries
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    username: String,
    email: String,
    phone: String,
    website: String,
    is_deleted: bool,
    is_local_only: bool,
}

#[derive(sqlx::FromRow)]
struct AddressRow {
    street: String,
    suite: String,
    city: String,
    zipcode: String,
    lat: String,
    lng: String,
}

#[derive(sqlx::FromRow)]
struct CompanyRow {
    name: String,
    catch_phrase: String,
    bs: String,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user: &User) -> Result<User, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, name, username, email, phone, website, is_deleted, is_local_only)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.website)
        .bind(user.is_deleted)
        .bind(user.is_local_only)
        .execute(&mut *tx)
        .await?;

        insert_children(&mut tx, user).await?;

        tx.commit().await?;

        self.get_by_id(user.id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => self.hydrate_user(row).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_all(&self) -> Result<Vec<User>, sqlx::Error> {
        let rows: Vec<UserRow> =
            sqlx::query_as("SELECT * FROM users WHERE is_deleted = 0 ORDER BY rowid")
                .fetch_all(&self.pool)
                .await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            users.push(self.hydrate_user(row).await?);
        }
        Ok(users)
    }

    /// Writes a batch of users in one transaction. Existing rows are
    /// overwritten along with their address and company children; nothing
    /// is visible until the whole batch commits.
    pub async fn upsert_many(&self, users: &[User]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        for user in users {
            sqlx::query(
                r#"
                INSERT INTO users (id, name, username, email, phone, website, is_deleted, is_local_only)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    username = excluded.username,
                    email = excluded.email,
                    phone = excluded.phone,
                    website = excluded.website,
                    is_deleted = excluded.is_deleted,
                    is_local_only = excluded.is_local_only
                "#,
            )
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.website)
            .bind(user.is_deleted)
            .bind(user.is_local_only)
            .execute(&mut *tx)
            .await?;

            // Replace children
            sqlx::query("DELETE FROM addresses WHERE user_id = ?")
                .bind(user.id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM companies WHERE user_id = ?")
                .bind(user.id)
                .execute(&mut *tx)
                .await?;

            insert_children(&mut tx, user).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn update_contact(
        &self,
        id: i64,
        name: &str,
        email: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query("UPDATE users SET name = ?, email = ? WHERE id = ?")
            .bind(name)
            .bind(email)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.get_by_id(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn soft_delete(&self, id: i64) -> Result<(), sqlx::Error> {
        // The row stays so the id remains taken
        sqlx::query("UPDATE users SET is_deleted = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn search(&self, query: &str) -> Result<Vec<User>, sqlx::Error> {
        // LIKE metacharacters in the query must match themselves
        let escaped = query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{}%", escaped);
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT * FROM users
            WHERE is_deleted = 0
              AND (LOWER(name) LIKE LOWER(?) ESCAPE '\'
                   OR LOWER(username) LIKE LOWER(?) ESCAPE '\'
                   OR LOWER(email) LIKE LOWER(?) ESCAPE '\')
            ORDER BY rowid
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            users.push(self.hydrate_user(row).await?);
        }
        Ok(users)
    }

    pub async fn next_id(&self) -> Result<i64, sqlx::Error> {
        // Soft-deleted rows keep their ids, so they count here too
        let row: (Option<i64>,) = sqlx::query_as("SELECT MAX(id) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0.map_or(1, |max| max + 1))
    }

    async fn hydrate_user(&self, row: UserRow) -> Result<User, sqlx::Error> {
        let address: Option<AddressRow> = sqlx::query_as(
            "SELECT street, suite, city, zipcode, lat, lng FROM addresses WHERE user_id = ?",
        )
        .bind(row.id)
        .fetch_optional(&self.pool)
        .await?;

        let company: Option<CompanyRow> =
            sqlx::query_as("SELECT name, catch_phrase, bs FROM companies WHERE user_id = ?")
                .bind(row.id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(User {
            id: row.id,
            name: row.name,
            username: row.username,
            email: row.email,
            phone: row.phone,
            website: row.website,
            address: address.map(|a| Address {
                street: a.street,
                suite: a.suite,
                city: a.city,
                zipcode: a.zipcode,
                lat: a.lat,
                lng: a.lng,
            }),
            company: company.map(|c| Company {
                name: c.name,
                catch_phrase: c.catch_phrase,
                bs: c.bs,
            }),
            is_deleted: row.is_deleted,
            is_local_only: row.is_local_only,
        })
    }
}

async fn insert_children(
    conn: &mut sqlx::SqliteConnection,
    user: &User,
) -> Result<(), sqlx::Error> {
    if let Some(address) = &user.address {
        sqlx::query(
            "INSERT INTO addresses (user_id, street, suite, city, zipcode, lat, lng) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(&address.street)
        .bind(&address.suite)
        .bind(&address.city)
        .bind(&address.zipcode)
        .bind(&address.lat)
        .bind(&address.lng)
        .execute(&mut *conn)
        .await?;
    }

    if let Some(company) = &user.company {
        sqlx::query("INSERT INTO companies (user_id, name, catch_phrase, bs) VALUES (?, ?, ?, ?)")
            .bind(user.id)
            .bind(&company.name)
            .bind(&company.catch_phrase)
            .bind(&company.bs)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    struct TestContext {
        repo: UserRepository,
        _temp_dir: TempDir, // Keep alive for duration of test
    }

    async fn setup_repo() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let pool = init_db(Some(db_path)).await.unwrap();
        TestContext {
            repo: UserRepository::new(pool),
            _temp_dir: temp_dir,
        }
    }

    fn sample_user(id: i64, name: &str) -> User {
        let username = name.to_lowercase().replace(' ', ".");
        User {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", username),
            username,
            phone: "555-1234".to_string(),
            website: "example.org".to_string(),
            address: Some(Address {
                street: "Main St 1".to_string(),
                suite: "Apt 1".to_string(),
                city: "Springfield".to_string(),
                zipcode: "12345".to_string(),
                lat: "10.0".to_string(),
                lng: "20.0".to_string(),
            }),
            company: Some(Company {
                name: "Acme".to_string(),
                catch_phrase: "We deliver".to_string(),
                bs: "logistics".to_string(),
            }),
            is_deleted: false,
            is_local_only: false,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        let user = sample_user(1, "Leanne Graham");
        let created = repo.create(&user).await.unwrap();
        assert_eq!(created, user);

        let fetched = repo.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Leanne Graham");
        assert_eq!(fetched.address.unwrap().city, "Springfield");
        assert_eq!(fetched.company.unwrap().name, "Acme");
    }

    #[tokio::test]
    async fn test_create_without_aggregates() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        let mut user = sample_user(1, "No Extras");
        user.address = None;
        user.company = None;

        let created = repo.create(&user).await.unwrap();
        assert!(created.address.is_none());
        assert!(created.company.is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_id_fails() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.create(&sample_user(1, "First")).await.unwrap();
        assert!(repo.create(&sample_user(1, "Second")).await.is_err());
    }

    #[tokio::test]
    async fn test_get_all_excludes_deleted() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.create(&sample_user(1, "Keep One")).await.unwrap();
        repo.create(&sample_user(2, "Drop Me")).await.unwrap();
        repo.create(&sample_user(3, "Keep Two")).await.unwrap();
        repo.soft_delete(2).await.unwrap();

        let users = repo.get_all().await.unwrap();
        let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_soft_delete_keeps_row() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.create(&sample_user(1, "Ghost")).await.unwrap();
        repo.soft_delete(1).await.unwrap();

        // Still reachable by id, just flagged
        let user = repo.get_by_id(1).await.unwrap().unwrap();
        assert!(user.is_deleted);
        assert!(repo.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_next_id_on_empty_store() {
        let ctx = setup_repo().await;
        assert_eq!(ctx.repo.next_id().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_next_id_counts_deleted_rows() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.create(&sample_user(7, "Soon Gone")).await.unwrap();
        repo.soft_delete(7).await.unwrap();

        assert_eq!(repo.next_id().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_upsert_many_inserts_and_updates() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.create(&sample_user(1, "Old Name")).await.unwrap();

        let mut changed = sample_user(1, "New Name");
        changed.address = None;
        let added = sample_user(2, "Brand New");

        repo.upsert_many(&[changed, added]).await.unwrap();

        let first = repo.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(first.name, "New Name");
        // Child rows follow the incoming record
        assert!(first.address.is_none());
        assert!(first.company.is_some());

        let second = repo.get_by_id(2).await.unwrap().unwrap();
        assert_eq!(second.name, "Brand New");
    }

    #[tokio::test]
    async fn test_update_contact_changes_only_name_and_email() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.create(&sample_user(1, "Before Edit")).await.unwrap();

        let updated = repo
            .update_contact(1, "After Edit", "after@example.com")
            .await
            .unwrap();
        assert_eq!(updated.name, "After Edit");
        assert_eq!(updated.email, "after@example.com");
        assert_eq!(updated.username, "before.edit");
        assert_eq!(updated.phone, "555-1234");
    }

    #[tokio::test]
    async fn test_update_contact_missing_user() {
        let ctx = setup_repo().await;
        let result = ctx.repo.update_contact(99, "Nobody", "n@example.com").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_search_matches_name_username_email() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.create(&sample_user(1, "Leanne Graham")).await.unwrap();
        repo.create(&sample_user(2, "Ervin Howell")).await.unwrap();
        repo.create(&sample_user(3, "Clementine Bauch")).await.unwrap();

        // Name match, case-insensitive
        let found = repo.search("LEANNE").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);

        // Username match
        let found = repo.search("ervin.howell").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);

        // Email match
        let found = repo.search("clementine.bauch@example").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 3);

        // Substring across several users
        let found = repo.search("example.com").await.unwrap();
        assert_eq!(found.len(), 3);
    }

    #[tokio::test]
    async fn test_search_escapes_like_wildcards() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.create(&sample_user(1, "Alice")).await.unwrap();
        repo.create(&sample_user(2, "Bob")).await.unwrap();

        // Metacharacters match themselves, not everything
        assert!(repo.search("%").await.unwrap().is_empty());
        assert!(repo.search("a_i").await.unwrap().is_empty());

        // A literal % in the data is still findable
        let mut promo = sample_user(3, "Percent Off");
        promo.email = "50%off@example.com".to_string();
        repo.create(&promo).await.unwrap();

        let found = repo.search("%off").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 3);
    }

    #[tokio::test]
    async fn test_search_excludes_deleted() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.create(&sample_user(1, "Leanne Graham")).await.unwrap();
        repo.soft_delete(1).await.unwrap();

        assert!(repo.search("leanne").await.unwrap().is_empty());
    }
}
