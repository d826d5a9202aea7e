//! Blog content: public pages and the author dashboard

use super::{ClientError, PublicClient, SessionClient, item_path, with_query};
use inkpost_core::{
    ContactDraft, ContentKind, FeedItem, FeedItemDraft, Id, MessageResponse, Post, PostDraft,
};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

pub const CONTACT_PATH: &str = "/api/contact";

/// Shown when the contact endpoint accepts a message without saying anything
pub const CONTACT_THANKS: &str = "Thank you for your message! We'll get back to you soon.";

/// The three collections shown on the home page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeFeed {
    pub posts: Vec<Post>,
    pub news: Vec<FeedItem>,
    pub trending: Vec<FeedItem>,
}

/// Request body for dashboard writes: the draft plus its author
#[derive(Serialize)]
struct Authored<'a, T: Serialize> {
    #[serde(flatten)]
    draft: &'a T,
    #[serde(rename = "userId")]
    user_id: &'a Id,
}

/// Public pages
impl PublicClient {
    /// List a collection, optionally filtered by a search term
    pub async fn list_content<T: DeserializeOwned>(
        &self,
        kind: ContentKind,
        search: Option<&str>,
    ) -> Result<Vec<T>, ClientError> {
        let path = with_query(kind.path(), &[("search", search)]);
        self.execute(self.request(Method::GET, &path)).await
    }

    pub async fn list_posts(&self, search: Option<&str>) -> Result<Vec<Post>, ClientError> {
        self.list_content(ContentKind::Posts, search).await
    }

    pub async fn list_news(&self, search: Option<&str>) -> Result<Vec<FeedItem>, ClientError> {
        self.list_content(ContentKind::News, search).await
    }

    pub async fn list_trending(&self, search: Option<&str>) -> Result<Vec<FeedItem>, ClientError> {
        self.list_content(ContentKind::Trending, search).await
    }

    /// Load the home page: posts, news and trending under one search term
    ///
    /// The three lists are fetched concurrently. The page loads completely
    /// or not at all, so the first failure is returned.
    pub async fn home(&self, search: Option<&str>) -> Result<HomeFeed, ClientError> {
        let (posts, news, trending) = tokio::try_join!(
            self.list_posts(search),
            self.list_news(search),
            self.list_trending(search),
        )?;
        Ok(HomeFeed {
            posts,
            news,
            trending,
        })
    }

    /// Single item from a collection
    pub async fn get_content<T: DeserializeOwned>(
        &self,
        kind: ContentKind,
        id: &Id,
    ) -> Result<T, ClientError> {
        self.execute(self.request(Method::GET, &item_path(kind.path(), id)))
            .await
    }

    /// Single blog post page
    pub async fn get_post(&self, id: &Id) -> Result<Post, ClientError> {
        self.get_content(ContentKind::Posts, id).await
    }

    /// Submit the contact form and return the acknowledgement to show
    pub async fn send_contact(&self, draft: &ContactDraft) -> Result<String, ClientError> {
        let req = self.request(Method::POST, CONTACT_PATH).json(draft);
        let value = self.execute_value(req).await?;
        let ack: MessageResponse = serde_json::from_value(value).unwrap_or_default();
        Ok(ack
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| CONTACT_THANKS.to_string()))
    }
}

/// Author dashboard
impl SessionClient {
    /// Items in a collection owned by `user_id`
    ///
    /// The `userId` filter is advisory on the server side, so ownership is
    /// checked again here.
    pub async fn my_content<T>(&self, kind: ContentKind, user_id: &Id) -> Result<Vec<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        let owner = user_id.to_string();
        let path = with_query(kind.path(), &[("userId", Some(owner.as_str()))]);
        let items: Vec<JsonValue> = self.get_as(&path).await?;

        items
            .into_iter()
            .filter(|item| {
                item.get("user_id")
                    .and_then(|v| serde_json::from_value::<Id>(v.clone()).ok())
                    .is_some_and(|id| &id == user_id)
            })
            .map(|item| serde_json::from_value(item).map_err(ClientError::from))
            .collect()
    }

    pub async fn my_posts(&self, user_id: &Id) -> Result<Vec<Post>, ClientError> {
        self.my_content(ContentKind::Posts, user_id).await
    }

    pub async fn my_feed_items(
        &self,
        kind: ContentKind,
        user_id: &Id,
    ) -> Result<Vec<FeedItem>, ClientError> {
        self.my_content(kind, user_id).await
    }

    async fn write_content<T: Serialize>(
        &self,
        method: Method,
        path: &str,
        user_id: &Id,
        draft: &T,
    ) -> Result<JsonValue, ClientError> {
        self.send_as(method, path, &Authored { draft, user_id }).await
    }

    pub async fn create_post(&self, user_id: &Id, draft: &PostDraft) -> Result<JsonValue, ClientError> {
        self.write_content(Method::POST, ContentKind::Posts.path(), user_id, draft)
            .await
    }

    pub async fn update_post(
        &self,
        id: &Id,
        user_id: &Id,
        draft: &PostDraft,
    ) -> Result<JsonValue, ClientError> {
        let path = item_path(ContentKind::Posts.path(), id);
        self.write_content(Method::PATCH, &path, user_id, draft).await
    }

    /// Create a news or trending entry
    pub async fn create_feed_item(
        &self,
        kind: ContentKind,
        user_id: &Id,
        draft: &FeedItemDraft,
    ) -> Result<JsonValue, ClientError> {
        self.write_content(Method::POST, kind.path(), user_id, draft)
            .await
    }

    pub async fn update_feed_item(
        &self,
        kind: ContentKind,
        id: &Id,
        user_id: &Id,
        draft: &FeedItemDraft,
    ) -> Result<JsonValue, ClientError> {
        let path = item_path(kind.path(), id);
        self.write_content(Method::PATCH, &path, user_id, draft).await
    }

    /// Delete an item from any collection
    pub async fn delete_content(&self, kind: ContentKind, id: &Id) -> Result<(), ClientError> {
        self.send_unit(Method::DELETE, &item_path(kind.path(), id)).await
    }
}
