use serde::{Deserialize, Serialize};
use std::fmt;

/// A postal address with geographic coordinates.
///
/// Stored flat; the remote API nests `lat`/`lng` under a `geo` object,
/// so serialization goes through [`AddressWire`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "AddressWire", into = "AddressWire")]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub lat: String,
    pub lng: String,
}

/// Wire shape of an [`Address`].
#[derive(Serialize, Deserialize)]
struct AddressWire {
    street: String,
    suite: String,
    city: String,
    zipcode: String,
    geo: GeoWire,
}

#[derive(Serialize, Deserialize)]
struct GeoWire {
    lat: String,
    lng: String,
}

impl From<AddressWire> for Address {
    fn from(wire: AddressWire) -> Self {
        Self {
            street: wire.street,
            suite: wire.suite,
            city: wire.city,
            zipcode: wire.zipcode,
            lat: wire.geo.lat,
            lng: wire.geo.lng,
        }
    }
}

impl From<Address> for AddressWire {
    fn from(address: Address) -> Self {
        Self {
            street: address.street,
            suite: address.suite,
            city: address.city,
            zipcode: address.zipcode,
            geo: GeoWire {
                lat: address.lat,
                lng: address.lng,
            },
        }
    }
}

/// The company a user works for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    #[serde(rename = "catchPhrase")]
    pub catch_phrase: String,
    pub bs: String,
}

/// A user record.
///
/// `is_deleted` and `is_local_only` are local bookkeeping and never cross
/// the wire: a soft-deleted user keeps its row (and its id) forever, and a
/// local-only user was created offline with a locally assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: Option<Address>,
    pub company: Option<Company>,
    #[serde(skip)]
    pub is_deleted: bool,
    #[serde(skip)]
    pub is_local_only: bool,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.len()))?;
        writeln!(f, "Id:       {}", self.id)?;
        writeln!(f, "Username: {}", self.username)?;
        writeln!(f, "Email:    {}", self.email)?;
        writeln!(f, "Phone:    {}", self.phone)?;
        writeln!(f, "Website:  {}", self.website)?;

        if let Some(address) = &self.address {
            writeln!(f, "\nAddress:")?;
            writeln!(f, "  {} {}", address.street, address.suite)?;
            writeln!(f, "  {} {}", address.city, address.zipcode)?;
            writeln!(f, "  geo: {}, {}", address.lat, address.lng)?;
        }

        if let Some(company) = &self.company {
            writeln!(f, "\nCompany:")?;
            writeln!(f, "  {}", company.name)?;
            if !company.catch_phrase.is_empty() {
                writeln!(f, "  \"{}\"", company.catch_phrase)?;
            }
        }

        if self.is_deleted {
            writeln!(f, "\n(deleted)")?;
        }
        if self.is_local_only {
            writeln!(f, "\n(created locally, not yet synced)")?;
        }

        Ok(())
    }
}
