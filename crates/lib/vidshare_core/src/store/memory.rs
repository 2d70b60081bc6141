//! In-process `UserStore` for tests and local development.
//!
//! Every operation takes the lock once, so single-row writes (and the
//! refresh-token compare-and-swap) are atomic with respect to each other.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, UserStore};
use crate::models::channel::{ChannelProfile, OwnerSummary, Video, WatchedVideo};
use crate::models::user::{NewUser, PublicUser, UserRecord};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, UserRecord>,
    videos: HashMap<Uuid, Video>,
    /// (subscriber, channel) edges.
    subscriptions: Vec<(Uuid, Uuid)>,
    history: HashMap<Uuid, Vec<Uuid>>,
}

impl Inner {
    fn by_username(&self, username: &str) -> Option<&UserRecord> {
        self.users.values().find(|u| u.username == username)
    }

    fn email_taken_by_other(&self, email: &str, id: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != id)
    }
}

/// Lock-protected maps standing in for the database tables.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a video row.
    pub async fn add_video(&self, video: Video) {
        self.inner.write().await.videos.insert(video.id, video);
    }

    /// Add a subscription edge; duplicates are ignored.
    pub async fn subscribe(&self, subscriber: Uuid, channel: Uuid) {
        let mut inner = self.inner.write().await;
        if !inner.subscriptions.contains(&(subscriber, channel)) {
            inner.subscriptions.push((subscriber, channel));
        }
    }

    /// Append a video to a user's watch history.
    pub async fn record_view(&self, user: Uuid, video: Uuid) {
        self.inner
            .write()
            .await
            .history
            .entry(user)
            .or_default()
            .push(video);
    }

    /// Remove an identity. Returns whether it existed.
    pub async fn delete_user(&self, id: Uuid) -> bool {
        self.inner.write().await.users.remove(&id).is_some()
    }

    async fn update_public<F>(&self, id: Uuid, f: F) -> StoreResult<Option<PublicUser>>
    where
        F: FnOnce(&mut UserRecord) + Send,
    {
        let mut inner = self.inner.write().await;
        Ok(inner.users.get_mut(&id).map(|user| {
            f(user);
            user.updated_at = Utc::now();
            user.clone().into_public()
        }))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<UserRecord>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_public_user(&self, id: Uuid) -> StoreResult<Option<PublicUser>> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .map(UserRecord::into_public))
    }

    async fn find_user_by_login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> StoreResult<Option<UserRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| {
                username.is_some_and(|n| u.username == n) || email.is_some_and(|e| u.email == e)
            })
            .cloned())
    }

    async fn user_exists(&self, username: &str, email: &str) -> StoreResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .any(|u| u.username == username || u.email == email))
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<PublicUser> {
        let mut inner = self.inner.write().await;
        if inner.by_username(&user.username).is_some() {
            return Err(StoreError::Conflict("username".into()));
        }
        if inner.email_taken_by_other(&user.email, None) {
            return Err(StoreError::Conflict("email".into()));
        }
        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            fullname: user.fullname,
            avatar: user.avatar,
            cover_image: user.cover_image,
            password_hash: user.password_hash,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(record.id, record.clone());
        Ok(record.into_public())
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(match inner.users.get_mut(&id) {
            Some(user) => {
                user.refresh_token = token.map(str::to_string);
                true
            }
            None => false,
        })
    }

    async fn swap_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        token: &str,
    ) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(match inner.users.get_mut(&id) {
            Some(user) if user.refresh_token.as_deref() == Some(expected) => {
                user.refresh_token = Some(token.to_string());
                true
            }
            _ => false,
        })
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> StoreResult<bool> {
        let updated = self
            .update_public(id, |u| u.password_hash = password_hash.to_string())
            .await?;
        Ok(updated.is_some())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        fullname: &str,
        email: &str,
    ) -> StoreResult<Option<PublicUser>> {
        let mut inner = self.inner.write().await;
        if inner.email_taken_by_other(email, Some(id)) {
            return Err(StoreError::Conflict("email".into()));
        }
        Ok(inner.users.get_mut(&id).map(|user| {
            user.fullname = fullname.to_string();
            user.email = email.to_string();
            user.updated_at = Utc::now();
            user.clone().into_public()
        }))
    }

    async fn update_avatar(&self, id: Uuid, url: &str) -> StoreResult<Option<PublicUser>> {
        self.update_public(id, |u| u.avatar = url.to_string()).await
    }

    async fn update_cover_image(&self, id: Uuid, url: &str) -> StoreResult<Option<PublicUser>> {
        self.update_public(id, |u| u.cover_image = url.to_string())
            .await
    }

    async fn channel_profile(
        &self,
        viewer: Uuid,
        username: &str,
    ) -> StoreResult<Option<ChannelProfile>> {
        let inner = self.inner.read().await;
        let Some(channel) = inner.by_username(username) else {
            return Ok(None);
        };
        let subscribers = inner
            .subscriptions
            .iter()
            .filter(|(_, c)| *c == channel.id)
            .count();
        let subscribed_to = inner
            .subscriptions
            .iter()
            .filter(|(s, _)| *s == channel.id)
            .count();
        Ok(Some(ChannelProfile {
            id: channel.id,
            fullname: channel.fullname.clone(),
            username: channel.username.clone(),
            avatar: channel.avatar.clone(),
            cover_image: channel.cover_image.clone(),
            subscribers_count: subscribers as i64,
            channels_subscribed_to_count: subscribed_to as i64,
            is_subscribed: inner.subscriptions.contains(&(viewer, channel.id)),
        }))
    }

    async fn watch_history(&self, user: Uuid) -> StoreResult<Vec<WatchedVideo>> {
        let inner = self.inner.read().await;
        let Some(ids) = inner.history.get(&user) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| inner.videos.get(id))
            .filter_map(|video| {
                let owner = inner.users.get(&video.owner_id)?;
                Some(WatchedVideo::from_parts(
                    video.clone(),
                    OwnerSummary {
                        fullname: owner.fullname.clone(),
                        username: owner.username.clone(),
                        avatar: owner.avatar.clone(),
                    },
                ))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.into(),
            fullname: "Test User".into(),
            avatar: "https://media.test/avatar.png".into(),
            cover_image: String::new(),
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn create_user_rejects_duplicate_email() {
        let store = MemoryStore::new();
        store
            .create_user(new_user("alice", "alice@example.com"))
            .await
            .unwrap();
        let err = store
            .create_user(new_user("alice2", "alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(field) if field == "email"));
    }

    #[tokio::test]
    async fn swap_only_replaces_matching_token() {
        let store = MemoryStore::new();
        let user = store
            .create_user(new_user("bob", "bob@example.com"))
            .await
            .unwrap();
        assert!(store.set_refresh_token(user.id, Some("one")).await.unwrap());
        assert!(!store.swap_refresh_token(user.id, "zero", "two").await.unwrap());
        assert!(store.swap_refresh_token(user.id, "one", "two").await.unwrap());
        let record = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(record.refresh_token.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn login_lookup_matches_either_field() {
        let store = MemoryStore::new();
        store
            .create_user(new_user("carol", "carol@example.com"))
            .await
            .unwrap();
        let by_name = store.find_user_by_login(Some("carol"), None).await.unwrap();
        let by_email = store
            .find_user_by_login(None, Some("carol@example.com"))
            .await
            .unwrap();
        let neither = store.find_user_by_login(None, None).await.unwrap();
        assert!(by_name.is_some());
        assert!(by_email.is_some());
        assert!(neither.is_none());
    }
}
