//! In-memory repository adapters.
//!
//! Back the HTTP test harnesses and local experiments with the same port
//! semantics as the document-store adapters, including the id-versus-slug
//! dispatch and the owner-scoped mutation outcomes.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{
    InvitationPersistenceError, InvitationRepository, MutationOutcome, UserPersistenceError,
    UserRepository,
};
use crate::domain::{EmailAddress, Invitation, InvitationPatch, NewUser, RecordId, User};

/// Vec-backed [`UserRepository`].
#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<User>>, UserPersistenceError> {
        self.users.lock().map_err(|_| UserPersistenceError::Query {
            message: "user store mutex poisoned".to_owned(),
        })
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, UserPersistenceError> {
        let mut users = self.lock()?;
        if users.iter().any(|existing| existing.email() == &user.email) {
            return Err(UserPersistenceError::DuplicateEmail {
                email: user.email.to_string(),
            });
        }
        let stored = User::new(
            RecordId::generate(),
            user.name,
            user.email,
            user.password_hash,
        );
        users.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let users = self.lock()?;
        Ok(users.iter().find(|user| user.email() == email).cloned())
    }
}

/// Vec-backed [`InvitationRepository`].
#[derive(Default)]
pub struct MemoryInvitationRepository {
    invitations: Mutex<Vec<Invitation>>,
}

impl MemoryInvitationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, Vec<Invitation>>, InvitationPersistenceError> {
        self.invitations
            .lock()
            .map_err(|_| InvitationPersistenceError::Query {
                message: "invitation store mutex poisoned".to_owned(),
            })
    }
}

#[async_trait]
impl InvitationRepository for MemoryInvitationRepository {
    async fn insert(
        &self,
        invitation: Invitation,
    ) -> Result<Invitation, InvitationPersistenceError> {
        let mut invitations = self.lock()?;
        invitations.push(invitation.clone());
        Ok(invitation)
    }

    async fn list_by_owner(
        &self,
        owner: &RecordId,
    ) -> Result<Vec<Invitation>, InvitationPersistenceError> {
        let invitations = self.lock()?;
        // Reverse insertion order first so the stable sort keeps the most
        // recently inserted record ahead on creation-time ties.
        let mut owned: Vec<Invitation> = invitations
            .iter()
            .rev()
            .filter(|invitation| invitation.owner_id() == owner)
            .cloned()
            .collect();
        owned.sort_by_key(|invitation| std::cmp::Reverse(invitation.created_at()));
        Ok(owned)
    }

    async fn find_by_id_or_slug(
        &self,
        identifier: &str,
    ) -> Result<Option<Invitation>, InvitationPersistenceError> {
        let invitations = self.lock()?;
        if RecordId::is_candidate(identifier) {
            let by_id = invitations
                .iter()
                .find(|invitation| invitation.id().as_ref() == identifier);
            if let Some(found) = by_id {
                return Ok(Some(found.clone()));
            }
        }
        Ok(invitations
            .iter()
            .find(|invitation| invitation.slug().as_ref() == identifier)
            .cloned())
    }

    async fn update(
        &self,
        owner: &RecordId,
        id: &RecordId,
        patch: InvitationPatch,
    ) -> Result<MutationOutcome, InvitationPersistenceError> {
        let mut invitations = self.lock()?;
        let Some(invitation) = invitations
            .iter_mut()
            .find(|invitation| invitation.id() == id)
        else {
            return Ok(MutationOutcome::NotFound);
        };
        if invitation.owner_id() != owner {
            return Ok(MutationOutcome::Forbidden);
        }
        invitation.apply(patch);
        Ok(MutationOutcome::Applied(invitation.clone()))
    }

    async fn delete(
        &self,
        owner: &RecordId,
        id: &RecordId,
    ) -> Result<MutationOutcome, InvitationPersistenceError> {
        let mut invitations = self.lock()?;
        let Some(index) = invitations
            .iter()
            .position(|invitation| invitation.id() == id)
        else {
            return Ok(MutationOutcome::NotFound);
        };
        if invitations[index].owner_id() != owner {
            return Ok(MutationOutcome::Forbidden);
        }
        Ok(MutationOutcome::Applied(invitations.remove(index)))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use chrono::{Duration, NaiveDate, NaiveTime, Utc};

    use crate::domain::{InvitationDraft, Slug, UserName};

    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: UserName::new("Ada").expect("valid name"),
            email: EmailAddress::new(email).expect("valid email"),
            password_hash: "$2b$10$hash".to_owned(),
        }
    }

    fn draft(title: &str) -> InvitationDraft {
        InvitationDraft {
            title: title.to_owned(),
            host: String::new(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2026, 9, 12).expect("valid date"),
            time: NaiveTime::from_hms_opt(18, 30, 0).expect("valid time"),
            address: String::new(),
            lat: None,
            lng: None,
            music_url: None,
            gallery: Vec::new(),
        }
    }

    fn invitation(owner: &RecordId, title: &str, offset_secs: i64) -> Invitation {
        let created_at = Utc::now() + Duration::seconds(offset_secs);
        Invitation::restore(
            RecordId::generate(),
            owner.clone(),
            draft(title),
            Slug::derive(title, created_at.timestamp_millis()),
            created_at,
        )
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = MemoryUserRepository::new();
        repo.insert(new_user("ada@example.com")).await.expect("first insert");
        let err = repo
            .insert(new_user("ada@example.com"))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, UserPersistenceError::DuplicateEmail { .. }));
    }

    #[tokio::test]
    async fn list_orders_newest_first() {
        let repo = MemoryInvitationRepository::new();
        let owner = RecordId::generate();
        repo.insert(invitation(&owner, "Old", 0)).await.expect("insert");
        repo.insert(invitation(&owner, "New", 60)).await.expect("insert");
        let listed = repo.list_by_owner(&owner).await.expect("list");
        let titles: Vec<&str> = listed.iter().map(|i| i.title()).collect();
        assert_eq!(titles, vec!["New", "Old"]);
    }

    #[tokio::test]
    async fn resolver_prefers_id_then_falls_back_to_slug() {
        let repo = MemoryInvitationRepository::new();
        let owner = RecordId::generate();
        let stored = repo
            .insert(invitation(&owner, "Fiesta", 0))
            .await
            .expect("insert");

        let by_id = repo
            .find_by_id_or_slug(stored.id().as_ref())
            .await
            .expect("query");
        assert_eq!(by_id.as_ref().map(Invitation::id), Some(stored.id()));

        let by_slug = repo
            .find_by_id_or_slug(stored.slug().as_ref())
            .await
            .expect("query");
        assert_eq!(by_slug.as_ref().map(Invitation::id), Some(stored.id()));
    }

    #[tokio::test]
    async fn id_shaped_slug_still_resolves() {
        // A slug that happens to be 24 hex characters takes the id path
        // first, misses, and must still be found by slug.
        let repo = MemoryInvitationRepository::new();
        let owner = RecordId::generate();
        let id_shaped = "abcdefabcdefabcdefabcdef";
        let stored = Invitation::restore(
            RecordId::generate(),
            owner.clone(),
            draft("Fiesta"),
            Slug::new(id_shaped).expect("valid slug"),
            Utc::now(),
        );
        repo.insert(stored.clone()).await.expect("insert");

        let resolved = repo.find_by_id_or_slug(id_shaped).await.expect("query");
        assert_eq!(resolved.as_ref().map(Invitation::id), Some(stored.id()));
    }

    #[tokio::test]
    async fn mutations_distinguish_absent_from_foreign() {
        let repo = MemoryInvitationRepository::new();
        let owner = RecordId::generate();
        let stranger = RecordId::generate();
        let stored = repo
            .insert(invitation(&owner, "Mine", 0))
            .await
            .expect("insert");

        let absent = repo
            .update(&owner, &RecordId::generate(), InvitationPatch::default())
            .await
            .expect("update");
        assert_eq!(absent, MutationOutcome::NotFound);

        let foreign = repo
            .update(&stranger, stored.id(), InvitationPatch::default())
            .await
            .expect("update");
        assert_eq!(foreign, MutationOutcome::Forbidden);

        let foreign_delete = repo.delete(&stranger, stored.id()).await.expect("delete");
        assert_eq!(foreign_delete, MutationOutcome::Forbidden);

        let owned_delete = repo.delete(&owner, stored.id()).await.expect("delete");
        assert!(matches!(owned_delete, MutationOutcome::Applied(_)));
    }
}
