//! PostgreSQL round trip for `PgStore`.
//!
//! Needs a scratch database: `DATABASE_URL=postgres://... cargo test -- --ignored`.

use std::sync::Arc;

use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;
use vidshare_core::auth::{AuthError, TokenService, TokenSettings};
use vidshare_core::models::user::NewUser;
use vidshare_core::store::{PgStore, StoreError, UserStore};

fn new_user(tag: &str) -> NewUser {
    NewUser {
        username: format!("user_{tag}"),
        email: format!("{tag}@example.com"),
        fullname: format!("User {tag}"),
        avatar: format!("https://media.test/{tag}.png"),
        cover_image: String::new(),
        password_hash: "hash".into(),
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a scratch PostgreSQL database"]
async fn pg_store_round_trip() {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("connect");
    vidshare_core::migrate::migrate(&pool).await.expect("migrate");

    let store = Arc::new(PgStore::new(pool.clone()));
    let tag = Uuid::new_v4().simple().to_string();

    let channel = store.create_user(new_user(&tag)).await.expect("create");
    let dup = store.create_user(new_user(&tag)).await;
    assert!(matches!(dup, Err(StoreError::Conflict(_))));

    let viewer_tag = format!("{tag}v");
    let viewer = store.create_user(new_user(&viewer_tag)).await.expect("create viewer");

    sqlx::query("INSERT INTO subscriptions (id, subscriber_id, channel_id) VALUES ($1, $2, $3)")
        .bind(Uuid::new_v4())
        .bind(viewer.id)
        .bind(channel.id)
        .execute(&pool)
        .await
        .expect("subscribe");

    let profile = store
        .channel_profile(viewer.id, &channel.username)
        .await
        .expect("profile")
        .expect("channel exists");
    assert_eq!(profile.subscribers_count, 1);
    assert!(profile.is_subscribed);

    let video_ids = [Uuid::new_v4(), Uuid::new_v4()];
    for (i, id) in video_ids.iter().enumerate() {
        sqlx::query(
            "INSERT INTO videos (id, owner_id, video_file, thumbnail, title, description, duration, created_at) \
             VALUES ($1, $2, 'f', 't', $3, 'd', 1.0, $4)",
        )
        .bind(id)
        .bind(channel.id)
        .bind(format!("video {i}"))
        .bind(Utc::now())
        .execute(&pool)
        .await
        .expect("insert video");
    }
    for id in video_ids.iter().rev() {
        sqlx::query("INSERT INTO watch_history (user_id, video_id) VALUES ($1, $2)")
            .bind(viewer.id)
            .bind(id)
            .execute(&pool)
            .await
            .expect("record view");
    }
    let history = store.watch_history(viewer.id).await.expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, video_ids[1]);
    assert_eq!(history[0].owner.username, channel.username);

    let tokens = TokenService::new(store.clone(), TokenSettings::new("a-secret", "r-secret"))
        .expect("token service");
    let pair = tokens.issue_token_pair(channel.id).await.expect("issue");
    tokens.rotate_on_refresh(&pair.refresh_token).await.expect("rotate");
    assert!(matches!(
        tokens.rotate_on_refresh(&pair.refresh_token).await,
        Err(AuthError::Unauthorized(_))
    ));
    tokens.revoke(channel.id).await.expect("revoke");
    let record = store.find_user(channel.id).await.unwrap().unwrap();
    assert!(record.refresh_token.is_none());
}
