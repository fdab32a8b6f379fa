//! REST implementation of the chat platform port

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use starboard_common::GatewayConfig;
use starboard_core::{
    Channel, ChatPlatform, MirrorPost, PlatformError, PlatformResult, PostBody, Snowflake,
    SourceMessage, User,
};
use tracing::{debug, instrument};

use super::dto::{ApiErrorBody, CreateMessageRequest, EditMessageRequest, MessageDto};

/// Page size used when listing reactors
pub const REACTORS_PAGE_LIMIT: usize = 100;

/// Chat platform reached over its REST API
#[derive(Debug, Clone)]
pub struct RestPlatform {
    client: Client,
    base_url: Url,
}

impl RestPlatform {
    /// Create a client from gateway settings
    pub fn new(config: &GatewayConfig) -> PlatformResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.bot_token {
            let mut value = HeaderValue::from_str(&format!("Bot {token}"))
                .map_err(|_| PlatformError::transport("bot token is not a valid header value"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| PlatformError::transport(e.to_string()))?;

        Self::with_client(client, &config.api_base_url)
    }

    /// Create from an existing client
    pub fn with_client(client: Client, base_url: &str) -> PlatformResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| PlatformError::transport(format!("invalid API base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(PlatformError::transport("API base URL cannot be a base"));
        }
        Ok(Self { client, base_url })
    }

    /// Build an endpoint URL; segments are percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    async fn send(request: RequestBuilder) -> PlatformResult<Response> {
        request
            .send()
            .await
            .map_err(|e| PlatformError::transport(e.to_string()))
    }

    /// Turn a non-success response into a rejection
    async fn check(response: Response) -> PlatformResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = if body.message.is_empty() { text } else { body.message };
        Err(PlatformError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> PlatformResult<T> {
        response
            .json()
            .await
            .map_err(|e| PlatformError::Decode(e.to_string()))
    }

    /// GET that maps 404 to `None`
    async fn get_optional<T: DeserializeOwned>(&self, url: Url) -> PlatformResult<Option<T>> {
        let response = Self::send(self.request(Method::GET, url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check(response).await?;
        Self::decode(response).await.map(Some)
    }

    /// Request that maps 404 to a not-found error for `resource`
    async fn expect_found(
        request: RequestBuilder,
        resource: &'static str,
        id: Snowflake,
    ) -> PlatformResult<Response> {
        let response = Self::send(request).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(PlatformError::not_found(resource, id));
        }
        Self::check(response).await
    }
}

#[async_trait]
impl ChatPlatform for RestPlatform {
    #[instrument(skip(self))]
    async fn resolve_channel(&self, channel_id: Snowflake) -> PlatformResult<Option<Channel>> {
        let url = self.endpoint(&["channels", &channel_id.to_string()]);
        self.get_optional(url).await
    }

    #[instrument(skip(self))]
    async fn fetch_user(&self, user_id: Snowflake) -> PlatformResult<Option<User>> {
        let url = self.endpoint(&["users", &user_id.to_string()]);
        self.get_optional(url).await
    }

    #[instrument(skip(self))]
    async fn fetch_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> PlatformResult<Option<SourceMessage>> {
        let Some(channel) = self.resolve_channel(channel_id).await? else {
            return Ok(None);
        };
        let url = self.endpoint(&[
            "channels",
            &channel_id.to_string(),
            "messages",
            &message_id.to_string(),
        ]);
        let message: Option<MessageDto> = self.get_optional(url).await?;
        Ok(message.and_then(|m| m.into_source(&channel)))
    }

    #[instrument(skip(self))]
    async fn fetch_feed_post(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> PlatformResult<Option<MirrorPost>> {
        let url = self.endpoint(&[
            "channels",
            &channel_id.to_string(),
            "messages",
            &message_id.to_string(),
        ]);
        let message: Option<MessageDto> = self.get_optional(url).await?;
        Ok(message.map(MessageDto::into_post))
    }

    #[instrument(skip(self))]
    async fn fetch_recent_posts(
        &self,
        channel_id: Snowflake,
        limit: u8,
    ) -> PlatformResult<Vec<MirrorPost>> {
        let mut url = self.endpoint(&["channels", &channel_id.to_string(), "messages"]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());

        let response = Self::expect_found(
            self.request(Method::GET, url),
            "Channel",
            channel_id,
        )
        .await?;
        let messages: Vec<MessageDto> = Self::decode(response).await?;
        Ok(messages.into_iter().map(MessageDto::into_post).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_reactors(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> PlatformResult<Vec<User>> {
        let mut reactors = Vec::new();
        let mut after: Option<Snowflake> = None;

        loop {
            let mut url = self.endpoint(&[
                "channels",
                &channel_id.to_string(),
                "messages",
                &message_id.to_string(),
                "reactions",
                emoji,
            ]);
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("limit", &REACTORS_PAGE_LIMIT.to_string());
                if let Some(after) = after {
                    query.append_pair("after", &after.to_string());
                }
            }

            let response = Self::expect_found(
                self.request(Method::GET, url),
                "Message",
                message_id,
            )
            .await?;
            let page: Vec<User> = Self::decode(response).await?;
            let page_len = page.len();
            after = page.last().map(|user| user.id);
            reactors.extend(page);

            if page_len < REACTORS_PAGE_LIMIT || after.is_none() {
                break;
            }
        }

        debug!(count = reactors.len(), "Reactors fetched");
        Ok(reactors)
    }

    #[instrument(skip(self, body))]
    async fn send_post(&self, channel_id: Snowflake, body: &PostBody) -> PlatformResult<MirrorPost> {
        let url = self.endpoint(&["channels", &channel_id.to_string(), "messages"]);
        let request = self
            .request(Method::POST, url)
            .json(&CreateMessageRequest::from(body));

        let response = Self::expect_found(request, "Channel", channel_id).await?;
        let message: MessageDto = Self::decode(response).await?;
        Ok(message.into_post())
    }

    #[instrument(skip(self, content))]
    async fn edit_post_content(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        content: &str,
    ) -> PlatformResult<MirrorPost> {
        let url = self.endpoint(&[
            "channels",
            &channel_id.to_string(),
            "messages",
            &message_id.to_string(),
        ]);
        let request = self
            .request(Method::PATCH, url)
            .json(&EditMessageRequest { content });

        let response = Self::expect_found(request, "Message", message_id).await?;
        let message: MessageDto = Self::decode(response).await?;
        Ok(message.into_post())
    }

    #[instrument(skip(self))]
    async fn delete_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> PlatformResult<()> {
        let url = self.endpoint(&[
            "channels",
            &channel_id.to_string(),
            "messages",
            &message_id.to_string(),
        ]);
        Self::expect_found(self.request(Method::DELETE, url), "Message", message_id).await?;
        Ok(())
    }
}
