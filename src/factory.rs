use crate::db::UserRepository;
use crate::location::GeoPoint;
use crate::models::{Address, Company, User};

/// Input for a locally created user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Assembles new local-only users with store-assigned ids.
pub struct UserFactory<'a> {
    repo: &'a UserRepository,
}

impl<'a> UserFactory<'a> {
    pub fn new(repo: &'a UserRepository) -> Self {
        Self { repo }
    }

    /// Builds a user from the given input. The id is one past the highest
    /// id in the store, the username is derived from the name, and the
    /// record is marked local-only until the remote learns about it.
    ///
    /// The address and company are always present: empty strings, with
    /// coordinates from `location` or `"0"` when none was captured.
    /// Inserting the result is the caller's job.
    pub async fn build(
        &self,
        input: NewUser,
        location: Option<GeoPoint>,
    ) -> Result<User, sqlx::Error> {
        let id = self.repo.next_id().await?;

        let (lat, lng) = match location {
            Some(point) => (point.lat.to_string(), point.lng.to_string()),
            None => ("0".to_string(), "0".to_string()),
        };

        Ok(User {
            id,
            username: derive_username(&input.name),
            name: input.name,
            email: input.email,
            phone: input.phone,
            website: String::new(),
            address: Some(Address {
                street: String::new(),
                suite: String::new(),
                city: String::new(),
                zipcode: String::new(),
                lat,
                lng,
            }),
            company: Some(Company::default()),
            is_deleted: false,
            is_local_only: true,
        })
    }
}

/// Lowercases the name and turns spaces into dots.
fn derive_username(name: &str) -> String {
    name.to_lowercase().replace(' ', ".")
}
