//! End-to-end tests of the blog store against the mock service

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use chrono::Duration as ChronoDuration;
use postboard::mocks::MockBlogService;
use postboard::selectors::{
    select_all_posts, select_all_users, select_post_by_id, select_posts_error,
    select_posts_status,
};
use postboard::{
    AppAction, BlogEnvironment, BlogStore, FetchStatus, NewPost, Phase, PostId, PostsAction,
    ReactionKind, RemotePost, User, UserId, UsersAction, blog_store,
};
use postboard_core::environment::Clock;
use postboard_runtime::StoreError;
use postboard_testing::{SequentialIdGenerator, test_clock};
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(2);

fn store_with(service: MockBlogService) -> BlogStore<MockBlogService> {
    blog_store(BlogEnvironment::new(
        Arc::new(service),
        Arc::new(test_clock()),
        Arc::new(SequentialIdGenerator::new("local")),
    ))
}

async fn dispatch(store: &BlogStore<MockBlogService>, action: impl Into<AppAction>) {
    let mut handle = store.send(action.into()).await.unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();
}

fn remote(id: &str) -> RemotePost {
    RemotePost {
        id: PostId::new(id),
        title: format!("remote {id}"),
        body: String::new(),
        user_id: UserId::new("1"),
    }
}

#[tokio::test]
async fn test_fetch_posts_success() {
    let store = store_with(MockBlogService::with_posts(3));
    let now = test_clock().now();

    dispatch(&store, PostsAction::FetchPosts).await;

    let state = store.state(Clone::clone).await;
    assert_eq!(select_posts_status(&state), FetchStatus::Succeeded);
    assert_eq!(select_posts_error(&state), None);

    let posts = select_all_posts(&state);
    assert_eq!(posts.len(), 3);
    for (i, post) in posts.iter().enumerate() {
        let minutes = i64::try_from(i).unwrap() + 1;
        assert_eq!(post.date, now - ChronoDuration::minutes(minutes));
        assert_eq!(post.reactions.total(), 0);
    }
}

#[tokio::test]
async fn test_repeated_fetches_accumulate_duplicates() {
    let store = store_with(MockBlogService::with_posts(4));

    dispatch(&store, PostsAction::FetchPosts).await;
    dispatch(&store, PostsAction::FetchPosts).await;

    let ids: Vec<String> = store
        .state(|s| select_all_posts(s).iter().map(|p| p.id.to_string()).collect())
        .await;
    assert_eq!(ids, ["1", "2", "3", "4", "1", "2", "3", "4"]);
}

#[tokio::test]
async fn test_fetch_posts_failure_keeps_posts() {
    let service = MockBlogService::with_posts(2);
    let store = store_with(service.clone());

    dispatch(&store, PostsAction::FetchPosts).await;
    service.fail_with("Network Error");
    dispatch(&store, PostsAction::FetchPosts).await;

    let state = store.state(Clone::clone).await;
    assert_eq!(select_posts_status(&state), FetchStatus::Failed);
    assert_eq!(select_posts_error(&state), Some("Network Error"));
    assert_eq!(select_all_posts(&state).len(), 2);
}

#[tokio::test]
async fn test_fetch_status_is_loading_while_in_flight() {
    let store = store_with(MockBlogService::with_posts(1).with_latency(Duration::from_millis(50)));

    assert_eq!(store.state(select_posts_status).await, FetchStatus::Idle);

    let mut handle = store.send(PostsAction::FetchPosts.into()).await.unwrap();
    assert_eq!(store.state(select_posts_status).await, FetchStatus::Loading);

    handle.wait_with_timeout(WAIT).await.unwrap();
    assert_eq!(store.state(select_posts_status).await, FetchStatus::Succeeded);
}

#[tokio::test]
async fn test_overlapping_fetches_both_land() {
    let store = store_with(MockBlogService::with_posts(3).with_latency(Duration::from_millis(30)));

    let mut first = store.send(PostsAction::FetchPosts.into()).await.unwrap();
    let mut second = store.send(PostsAction::FetchPosts.into()).await.unwrap();
    assert_eq!(store.state(select_posts_status).await, FetchStatus::Loading);

    first.wait_with_timeout(WAIT).await.unwrap();
    second.wait_with_timeout(WAIT).await.unwrap();

    let state = store.state(Clone::clone).await;
    assert_eq!(select_all_posts(&state).len(), 6);
    assert_eq!(select_posts_status(&state), FetchStatus::Succeeded);
    assert_eq!(select_posts_error(&state), None);
}

#[tokio::test]
async fn test_add_new_post_derives_id_from_string_max() {
    let service = MockBlogService::with_remote_posts(vec![remote("1"), remote("2"), remote("10")]);
    let store = store_with(service.clone());

    dispatch(&store, PostsAction::FetchPosts).await;
    dispatch(
        &store,
        PostsAction::AddNewPost(NewPost::new("New", "Body", UserId::new("4"))),
    )
    .await;

    let state = store.state(Clone::clone).await;
    let added = select_post_by_id(&state, &PostId::new("3")).expect("post 3 added");
    assert_eq!(added.title, "New");
    assert_eq!(added.user_id, UserId::new("4"));
    assert_eq!(added.date, test_clock().now());
    assert_eq!(added.reactions.total(), 0);
    assert_eq!(select_all_posts(&state).len(), 4);
    assert_eq!(
        service.created_posts().unwrap(),
        vec![NewPost::new("New", "Body", UserId::new("4"))]
    );
}

#[tokio::test]
async fn test_add_new_post_failure_is_silent() {
    let service = MockBlogService::with_posts(2);
    let store = store_with(service.clone());
    dispatch(&store, PostsAction::FetchPosts).await;
    let before = store.state(Clone::clone).await;

    service.fail_with("Request failed with status code 500");
    dispatch(
        &store,
        PostsAction::AddNewPost(NewPost::new("T", "B", UserId::new("1"))),
    )
    .await;

    assert_eq!(store.state(Clone::clone).await, before);
}

#[tokio::test]
async fn test_local_post_and_reaction() {
    let store = store_with(MockBlogService::new());

    dispatch(&store, PostsAction::post_added("Hi", "There", UserId::new("2"))).await;
    let id = store
        .state(|s| select_all_posts(s)[0].id.clone())
        .await;
    assert_eq!(id, PostId::new("local-1"));

    dispatch(&store, PostsAction::reaction_added(id.clone(), ReactionKind::Heart)).await;

    let reactions = store
        .state(|s| select_post_by_id(s, &id).map(|p| p.reactions))
        .await
        .unwrap();
    assert_eq!(reactions.heart, 1);
    assert_eq!(reactions.total(), 1);
}

#[tokio::test]
async fn test_concurrent_reactions_are_all_counted() {
    let store = store_with(MockBlogService::new());
    dispatch(&store, PostsAction::post_added("Hot", "", UserId::new("1"))).await;
    let id = PostId::new("local-1");

    let sends = (0..20).map(|i| {
        let store = store.clone();
        let kind = if i % 2 == 0 {
            ReactionKind::ThumbsUp
        } else {
            ReactionKind::Coffee
        };
        let action = PostsAction::reaction_added(id.clone(), kind);
        async move { store.send(action.into()).await }
    });
    for result in futures::future::join_all(sends).await {
        result.unwrap();
    }

    let reactions = store
        .state(|s| select_post_by_id(s, &id).map(|p| p.reactions))
        .await
        .unwrap();
    assert_eq!(reactions.thumbs_up, 10);
    assert_eq!(reactions.coffee, 10);
}

#[tokio::test]
async fn test_send_and_wait_for_phase() {
    let store = store_with(MockBlogService::with_posts(2));

    let settled = store
        .send_and_wait_for(
            PostsAction::FetchPosts.into(),
            |a| matches!(a, AppAction::Posts(PostsAction::FetchPostsPhase(_))),
            WAIT,
        )
        .await
        .unwrap();

    let AppAction::Posts(PostsAction::FetchPostsPhase(Phase::Fulfilled(posts))) = settled else {
        panic!("expected fulfilled fetch, got {settled:?}");
    };
    assert_eq!(posts.len(), 2);
}

#[tokio::test]
async fn test_rejected_phase_is_broadcast() {
    let service = MockBlogService::new();
    service.fail_with("Network Error");
    let store = store_with(service);
    let mut rx = store.subscribe_actions();

    dispatch(&store, UsersAction::FetchUsers).await;

    assert_eq!(
        rx.recv().await.unwrap(),
        AppAction::Users(UsersAction::FetchUsersPhase(Phase::Rejected(
            "Network Error".to_string()
        )))
    );
}

#[tokio::test]
async fn test_fetch_users_fills_users_slice() {
    let service = MockBlogService::new().with_users(vec![
        User::new(UserId::new("1"), "Leanne Graham"),
        User::new(UserId::new("2"), "Ervin Howell"),
    ]);
    let store = store_with(service);

    dispatch(&store, UsersAction::FetchUsers).await;

    let names: Vec<String> = store
        .state(|s| select_all_users(s).iter().map(|u| u.name.clone()).collect())
        .await;
    assert_eq!(names, ["Leanne Graham", "Ervin Howell"]);
}

#[tokio::test]
async fn test_shutdown_rejects_new_actions() {
    let store = store_with(MockBlogService::with_posts(1).with_latency(Duration::from_millis(20)));
    let _ = store.send(PostsAction::FetchPosts.into()).await.unwrap();

    store.shutdown(WAIT).await.unwrap();

    assert_eq!(store.state(select_posts_status).await, FetchStatus::Succeeded);
    assert!(matches!(
        store.send(PostsAction::FetchPosts.into()).await,
        Err(StoreError::ShutdownInProgress)
    ));
}
