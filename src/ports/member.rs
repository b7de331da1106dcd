use uuid::Uuid;

use crate::domain::{Member, NewMember};

#[mockall::automock]
#[async_trait::async_trait]
pub trait MemberPort {
    async fn get_member(&self, member_id: Uuid) -> Result<Member, Error>;
    async fn get_member_by_name(&self, name: &str) -> Result<Member, Error>;
    async fn member_exists(&self, name: &str) -> Result<bool, Error>;
    async fn create_member(&self, member: &NewMember) -> Result<Uuid, Error>;
    async fn update_member(&self, member: &Member) -> Result<(), Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Domain-level error when a member does not exist
    #[error("member {0} does not exist")]
    MemberDoesNotExist(Uuid),

    /// Domain-level error when no member carries the given name
    #[error("member named {0:?} does not exist")]
    MemberNameDoesNotExist(String),

    /// Storage-level uniqueness constraint on the member name
    #[error("member name {0:?} already exists")]
    NameAlreadyExists(String),

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
