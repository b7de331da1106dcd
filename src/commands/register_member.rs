use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;
use uuid::Uuid;

use crate::{
    domain::NewMember,
    ports::member::{self, MemberPort},
};

use super::{DomainLogic, Error};

/// Signs a new member up under a unique name.
///
/// Credential verification on later requests is the transport layer's job;
/// this command only establishes the account.
pub struct RegisterMemberRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RegisterMemberResponse {
    pub member_id: Uuid,
}

impl<M, P, C, K, N> Service<RegisterMemberRequest> for DomainLogic<M, P, C, K, N>
where
    M: MemberPort + 'static,
{
    type Response = RegisterMemberResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RegisterMemberRequest) -> Self::Future {
        let members = self.members.clone();
        Box::pin(async move {
            if members.member_exists(&req.name).await? {
                return Err(Error::NameTaken(req.name));
            }

            // The storage uniqueness constraint is the authoritative guard;
            // a duplicate slipping past the pre-check surfaces the same way.
            let member_id = members
                .create_member(&NewMember {
                    name: req.name.clone(),
                    password: req.password,
                })
                .await
                .map_err(|err| match err {
                    member::Error::NameAlreadyExists(name) => Error::NameTaken(name),
                    err => err.into(),
                })?;
            tracing::info!(%member_id, "member registered");

            Ok(RegisterMemberResponse { member_id })
        })
    }
}
