//! Records shared by every store implementation.
//!
//! These are the shapes the credential service reads and writes through the
//! gateway traits. They carry no behaviour and no storage-specific fields.

/// Identity assigned to a user by the store. Zero is never assigned.
pub type UserId = i64;

/// Identity of a pre-provisioned application. Zero is never valid.
pub type AppId = i32;

/// A registered user as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// Encoded one-way hash of the password, never the password itself.
    pub pass_hash: Vec<u8>,
}

/// An application allowed to request tokens, with the secret its tokens are
/// signed with.
#[derive(Clone, PartialEq, Eq)]
pub struct App {
    pub id: AppId,
    pub name: String,
    pub secret: String,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}
