//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when creating `Effect` variants from reducers.

/// Create an `Effect::Future` from an async block body
///
/// The body is wrapped in `async move` and must evaluate to `Option<Action>`.
///
/// # Example
///
/// ```rust,ignore
/// use postboard_core::async_effect;
///
/// async_effect! {
///     let phase = thunks::fetch_posts(service.as_ref()).await;
///     Some(PostsAction::FetchPostsPhase(phase))
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use postboard_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(30),
///     action: PostsAction::FetchPosts
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}
