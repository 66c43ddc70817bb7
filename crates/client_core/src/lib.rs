use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use shared::domain::{Comment, Post, PostId, User, UserId};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{resource} request failed: {source}")]
    Transport {
        resource: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{resource} request returned status {status}")]
    Status {
        resource: &'static str,
        status: StatusCode,
    },
    #[error("{resource} response was not valid JSON: {source}")]
    Decode {
        resource: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// One post with its author and comment thread resolved, ready to render.
///
/// `author` is `None` when the user lookup failed; the feed still renders the
/// post with a fallback author line instead of aborting the refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub post: Post,
    pub author: Option<User>,
    pub comments: Vec<Comment>,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_users(&self) -> Result<Vec<User>, FetchError> {
        let response = self
            .http
            .get(format!("{}/users", self.base_url))
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                resource: "users",
                source,
            })?;
        response.json().await.map_err(|source| FetchError::Decode {
            resource: "users",
            source,
        })
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<User, FetchError> {
        let response = self
            .http
            .get(format!("{}/users/{}", self.base_url, user_id.0))
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                resource: "user",
                source,
            })?;
        response.json().await.map_err(|source| FetchError::Decode {
            resource: "user",
            source,
        })
    }

    pub async fn get_user_posts(&self, user_id: UserId) -> Result<Vec<Post>, FetchError> {
        let response = self
            .http
            .get(format!("{}/posts", self.base_url))
            .query(&[("userId", user_id.0)])
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                resource: "posts",
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                resource: "posts",
                status,
            });
        }

        response.json().await.map_err(|source| FetchError::Decode {
            resource: "posts",
            source,
        })
    }

    pub async fn get_post_comments(&self, post_id: PostId) -> Result<Vec<Comment>, FetchError> {
        let response = self
            .http
            .get(format!("{}/posts/{}/comments", self.base_url, post_id.0))
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                resource: "comments",
                source,
            })?;
        response.json().await.map_err(|source| FetchError::Decode {
            resource: "comments",
            source,
        })
    }

    /// Fetches a user's posts and resolves each one into a [`PostDetail`].
    ///
    /// Posts are resolved one at a time: a post's author and comments both
    /// complete before the next post's fetches begin. A failed author or
    /// comments lookup degrades that single post (logged here) rather than
    /// failing the whole feed; only the posts request itself can error.
    pub async fn fetch_post_feed(&self, user_id: UserId) -> Result<Vec<PostDetail>, FetchError> {
        let posts = self.get_user_posts(user_id).await?;

        let mut feed = Vec::with_capacity(posts.len());
        for post in posts {
            let author = match self.get_user(post.user_id).await {
                Ok(user) => Some(user),
                Err(err) => {
                    warn!(
                        user_id = post.user_id.0,
                        post_id = post.id.0,
                        "author fetch failed: {err}"
                    );
                    None
                }
            };

            let comments = match self.get_post_comments(post.id).await {
                Ok(comments) => comments,
                Err(err) => {
                    warn!(post_id = post.id.0, "comments fetch failed: {err}");
                    Vec::new()
                }
            };

            feed.push(PostDetail {
                post,
                author,
                comments,
            });
        }

        Ok(feed)
    }
}
