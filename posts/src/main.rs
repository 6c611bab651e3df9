//! Postboard demo
//!
//! Runs the blog store against the configured JSON API:
//! - Fetches users and posts
//! - Adds a local post and reacts to it
//! - Creates a post through the API
//! - Prints the newest posts with their reactions
//!
//! # Usage
//!
//! ```bash
//! POSTBOARD_API_URL=https://jsonplaceholder.typicode.com cargo run --bin postboard
//! ```

use anyhow::Context;
use postboard::selectors::{
    select_all_posts, select_posts_error, select_posts_newest_first, select_posts_status,
    select_user_by_id,
};
use postboard::{
    AppAction, AppReducer, AppState, BlogEnvironment, Config, HttpBlogService, NewPost, PostsAction,
    ReactionKind, UserId, UsersAction,
};
use postboard_runtime::Store;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,postboard=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("loading configuration")?;
    tracing::info!(api = %config.api.base_url, "Configuration loaded");

    let service = HttpBlogService::from_config(&config.api)?;
    let store = Store::with_config(
        AppState::default(),
        AppReducer::new(),
        BlogEnvironment::live(service),
        config.store_config(),
    );

    let mut users = store.send(UsersAction::FetchUsers.into()).await?;
    let mut posts = store.send(PostsAction::FetchPosts.into()).await?;
    users.wait_with_timeout(REQUEST_TIMEOUT).await?;
    posts.wait_with_timeout(REQUEST_TIMEOUT).await?;

    let (status, error, count) = store
        .state(|s| {
            (
                select_posts_status(s),
                select_posts_error(s).map(str::to_string),
                select_all_posts(s).len(),
            )
        })
        .await;
    match error {
        Some(error) => tracing::warn!(%status, %error, "Fetch failed"),
        None => tracing::info!(%status, count, "Posts fetched"),
    }

    let author = UserId::new("1");
    store
        .send(PostsAction::post_added("Hello from postboard", "Written locally.", author.clone()).into())
        .await?;

    let local_id = store
        .state(|s| select_all_posts(s).last().map(|post| post.id.clone()))
        .await
        .context("local post missing after add")?;
    for reaction in [ReactionKind::Heart, ReactionKind::Rocket, ReactionKind::Heart] {
        store
            .send(AppAction::Posts(PostsAction::reaction_added(local_id.clone(), reaction)))
            .await?;
    }

    let mut created = store
        .send(
            PostsAction::AddNewPost(NewPost::new(
                "Created remotely",
                "Sent through the API.",
                author,
            ))
            .into(),
        )
        .await?;
    created.wait_with_timeout(REQUEST_TIMEOUT).await?;

    let lines = store
        .state(|s| {
            select_posts_newest_first(s)
                .into_iter()
                .take(5)
                .map(|post| {
                    let by = select_user_by_id(s, &post.user_id)
                        .map_or("Unknown author", |user| user.name.as_str());
                    let reactions: Vec<String> = ReactionKind::ALL
                        .into_iter()
                        .map(|kind| format!("{} {}", kind.emoji(), post.reactions.get(kind)))
                        .collect();
                    format!(
                        "[{}] {} by {} ({})\n    {}",
                        post.id,
                        post.title,
                        by,
                        post.date.to_rfc3339(),
                        reactions.join("  ")
                    )
                })
                .collect::<Vec<_>>()
        })
        .await;

    println!("\nNewest posts:");
    for line in lines {
        println!("{line}");
    }

    store.shutdown_gracefully().await?;
    tracing::info!("Shutdown complete");

    Ok(())
}
