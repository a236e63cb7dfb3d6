use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::common::{Chat, ChatId, ChatMessage, CreateChatRequest, SendMessageRequest, Session};
use crate::error::{ApiError, ApiResult};

use super::api::ChatApi;

/// [`ChatApi`] over the backend's REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpChatApi {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpChatApi {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let parsed = Url::parse(base_url)?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::NotABaseUrl(base_url.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn with_auth(builder: RequestBuilder, session: &Session) -> RequestBuilder {
        match session.access_token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

async fn read_body(response: Response) -> ApiResult<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::status(status, body));
    }
    Ok(body)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let body = read_body(response).await?;
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn list_chats(&self, session: &Session) -> ApiResult<Vec<Chat>> {
        let request = self.http.get(self.endpoint(&["chats", ""]));
        let response = Self::with_auth(request, session).send().await?;
        read_json(response).await
    }

    async fn list_messages(&self, chat_id: &ChatId) -> ApiResult<Vec<ChatMessage>> {
        let response = self
            .http
            .get(self.endpoint(&["messages"]))
            .query(&[("chat_id", chat_id.as_str())])
            .send()
            .await?;
        read_json(response).await
    }

    async fn send_message(
        &self,
        session: &Session,
        request: &SendMessageRequest,
    ) -> ApiResult<()> {
        let builder = self.http.post(self.endpoint(&["send_message"])).json(request);
        let response = Self::with_auth(builder, session).send().await?;
        read_body(response).await.map(|_| ())
    }

    async fn create_chat(&self, session: &Session, request: &CreateChatRequest) -> ApiResult<()> {
        let builder = self.http.post(self.endpoint(&["chats", ""])).json(request);
        let response = Self::with_auth(builder, session).send().await?;
        read_body(response).await.map(|_| ())
    }

    async fn add_user_to_chat(
        &self,
        session: &Session,
        chat_id: &ChatId,
        username: &str,
    ) -> ApiResult<String> {
        let url = self.endpoint(&["chats", chat_id.as_str(), "add_user", username]);
        let response = Self::with_auth(self.http.post(url), session).send().await?;
        let reply: serde_json::Value = read_json(response).await?;

        Ok(reply
            .get("status")
            .and_then(|status| status.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| reply.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_keep_trailing_slash_and_base_path() {
        let api = HttpChatApi::new("http://localhost:8000").unwrap();
        assert_eq!(
            api.endpoint(&["chats", ""]).as_str(),
            "http://localhost:8000/chats/"
        );

        let nested = HttpChatApi::new("http://example.com/api/").unwrap();
        assert_eq!(
            nested.endpoint(&["send_message"]).as_str(),
            "http://example.com/api/send_message"
        );
    }

    #[test]
    fn path_segments_are_escaped() {
        let api = HttpChatApi::new("http://localhost:8000").unwrap();
        let url = api.endpoint(&["chats", "3", "add_user", "bob smith"]);
        assert_eq!(url.path(), "/chats/3/add_user/bob%20smith");
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(matches!(
            HttpChatApi::new("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpChatApi::new("mailto:someone@example.com"),
            Err(ApiError::NotABaseUrl(_))
        ));
    }
}
