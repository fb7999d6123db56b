//! In-process stores for tests. Same contracts as the Postgres adapters.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    error::{RepoError, RepoResult},
    stacks::{repo::StackRepo, repo_types::Stack},
    users::{repo::UserRepo, repo_types::User},
    verification::{repo::VerificationRepo, repo_types::EmailVerification},
};

#[derive(Default)]
pub struct MemoryUserRepo(Mutex<BTreeMap<String, User>>);

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn insert(&self, user: &User) -> RepoResult<()> {
        let mut users = self.0.lock();
        if users.contains_key(&user.id) || users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Duplicate);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<User> {
        self.0.lock().get(id).cloned().ok_or(RepoError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<User> {
        self.0
            .lock()
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn find_all(&self) -> RepoResult<Vec<User>> {
        Ok(self.0.lock().values().cloned().collect())
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        let mut users = self.0.lock();
        if users.values().any(|u| u.email == user.email && u.id != user.id) {
            return Err(RepoError::Duplicate);
        }
        let slot = users.get_mut(&user.id).ok_or(RepoError::NotFound)?;
        *slot = user.clone();
        Ok(())
    }

    async fn update_name(&self, id: &str, name: &str) -> RepoResult<()> {
        let mut users = self.0.lock();
        let slot = users.get_mut(id).ok_or(RepoError::NotFound)?;
        slot.name = name.to_string();
        Ok(())
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        self.0.lock().remove(id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[derive(Default)]
pub struct MemoryStackRepo(Mutex<BTreeMap<String, Stack>>);

#[async_trait]
impl StackRepo for MemoryStackRepo {
    async fn insert(&self, stack: &Stack) -> RepoResult<()> {
        let mut stacks = self.0.lock();
        if stacks.contains_key(&stack.id) {
            return Err(RepoError::Duplicate);
        }
        stacks.insert(stack.id.clone(), stack.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Stack> {
        self.0.lock().get(id).cloned().ok_or(RepoError::NotFound)
    }

    async fn find_by_owner(&self, owner: &str) -> RepoResult<Vec<Stack>> {
        Ok(self.0.lock().values().filter(|s| s.owner == owner).cloned().collect())
    }

    async fn find_all(&self) -> RepoResult<Vec<Stack>> {
        Ok(self.0.lock().values().cloned().collect())
    }

    async fn update(&self, stack: &Stack) -> RepoResult<()> {
        let mut stacks = self.0.lock();
        let slot = stacks.get_mut(&stack.id).ok_or(RepoError::NotFound)?;
        *slot = stack.clone();
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryVerificationRepo(Mutex<HashMap<String, EmailVerification>>);

#[async_trait]
impl VerificationRepo for MemoryVerificationRepo {
    async fn insert(&self, v: &EmailVerification) -> RepoResult<()> {
        let mut pending = self.0.lock();
        if pending.contains_key(&v.email) {
            return Err(RepoError::Duplicate);
        }
        pending.insert(v.email.clone(), v.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<EmailVerification> {
        self.0.lock().get(email).cloned().ok_or(RepoError::NotFound)
    }

    async fn update(&self, v: &EmailVerification) -> RepoResult<()> {
        let mut pending = self.0.lock();
        let slot = pending.get_mut(&v.email).ok_or(RepoError::NotFound)?;
        *slot = v.clone();
        Ok(())
    }

    async fn delete(&self, email: &str) -> RepoResult<()> {
        self.0.lock().remove(email).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

/// Lets a verification of the touched user commit mid-operation: right after a
/// `find_by_id` has handed out its snapshot, or just before a rename lands.
#[derive(Default)]
pub struct ConcurrentVerifyUserRepo(pub MemoryUserRepo);

impl ConcurrentVerifyUserRepo {
    fn verify(&self, id: &str) {
        if let Some(stored) = self.0 .0.lock().get_mut(id) {
            stored.verified = true;
        }
    }
}

#[async_trait]
impl UserRepo for ConcurrentVerifyUserRepo {
    async fn insert(&self, user: &User) -> RepoResult<()> {
        self.0.insert(user).await
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<User> {
        let snapshot = self.0.find_by_id(id).await?;
        self.verify(id);
        Ok(snapshot)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<User> {
        self.0.find_by_email(email).await
    }

    async fn find_all(&self) -> RepoResult<Vec<User>> {
        self.0.find_all().await
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        self.0.update(user).await
    }

    async fn update_name(&self, id: &str, name: &str) -> RepoResult<()> {
        self.verify(id);
        self.0.update_name(id, name).await
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        self.0.delete(id).await
    }
}

/// Deletes every stack it hands out, so the following write finds nothing.
#[derive(Default)]
pub struct VanishingStackRepo(pub MemoryStackRepo);

impl VanishingStackRepo {
    fn take(&self, stacks: &[Stack]) {
        let mut stored = self.0 .0.lock();
        for s in stacks {
            stored.remove(&s.id);
        }
    }
}

#[async_trait]
impl StackRepo for VanishingStackRepo {
    async fn insert(&self, stack: &Stack) -> RepoResult<()> {
        self.0.insert(stack).await
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Stack> {
        let stack = self.0.find_by_id(id).await?;
        self.take(std::slice::from_ref(&stack));
        Ok(stack)
    }

    async fn find_by_owner(&self, owner: &str) -> RepoResult<Vec<Stack>> {
        let stacks = self.0.find_by_owner(owner).await?;
        self.take(&stacks);
        Ok(stacks)
    }

    async fn find_all(&self) -> RepoResult<Vec<Stack>> {
        self.0.find_all().await
    }

    async fn update(&self, stack: &Stack) -> RepoResult<()> {
        self.0.update(stack).await
    }
}

/// Deletes the pending verification as soon as it has been read.
#[derive(Default)]
pub struct VanishingVerificationRepo(pub MemoryVerificationRepo);

#[async_trait]
impl VerificationRepo for VanishingVerificationRepo {
    async fn insert(&self, v: &EmailVerification) -> RepoResult<()> {
        self.0.insert(v).await
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<EmailVerification> {
        let v = self.0.find_by_email(email).await?;
        self.0 .0.lock().remove(email);
        Ok(v)
    }

    async fn update(&self, v: &EmailVerification) -> RepoResult<()> {
        self.0.update(v).await
    }

    async fn delete(&self, email: &str) -> RepoResult<()> {
        self.0.delete(email).await
    }
}
