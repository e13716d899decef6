use async_trait::async_trait;
use reqwest::header::{COOKIE, REFERER};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use url::Url;

use super::{ApiStatus, MessagingApi, SendMessageRequest};
use crate::config::CoreConfig;
use crate::constants::{fields, headers, ANNOUNCEMENTS_PAGE_PATH, ANNOUNCEMENT_READ_PATH, THREAD_MESSAGES_PATH};
use crate::error::ApiError;
use crate::models::{AnnouncementId, Message, MessageId, ThreadId};

#[derive(Deserialize)]
struct MessagesResponse {
    messages: Vec<Message>,
}

/// reqwest-backed client for the school backend
#[derive(Debug, Clone)]
pub struct HttpMessagingApi {
    client: Client,
    base_url: Url,
    send_path: String,
    session_cookie: Option<String>,
}

impl HttpMessagingApi {
    pub fn new(config: &CoreConfig) -> Result<Self, ApiError> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url)?,
            send_path: config.send_path.clone(),
            session_cookie: config.session_cookie.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    /// Headers every programmatic request carries
    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header(headers::REQUESTED_WITH, headers::REQUESTED_WITH_VALUE)
            .header(REFERER, self.base_url.as_str());
        match &self.session_cookie {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    /// Scrape the anti-forgery token from the announcements page
    pub async fn fetch_csrf_token(&self) -> Result<Option<String>, ApiError> {
        let url = self.endpoint(ANNOUNCEMENTS_PAGE_PATH)?;
        let response = self.prepare(self.client.get(url)).send().await?;
        let html = checked(response).await?.text().await?;
        Ok(extract_csrf_token(&html))
    }
}

/// Reject non-2xx responses, keeping the body for the error message
async fn checked(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

async fn decode_status(response: Response) -> Result<ApiStatus, ApiError> {
    let text = checked(response).await?.text().await?;
    Ok(serde_json::from_str(&text)?)
}

#[async_trait]
impl MessagingApi for HttpMessagingApi {
    async fn send_message(&self, request: &SendMessageRequest) -> Result<ApiStatus, ApiError> {
        let path = self
            .send_path
            .replace("{thread_id}", &request.thread_id.to_string());
        let url = self.endpoint(&path)?;

        let mut form = Form::new()
            .text(fields::RECIPIENT, request.recipient.clone())
            .text(fields::SUBJECT, request.subject.clone())
            .text(fields::BODY, request.body.clone());
        for file in &request.files {
            let mut part = Part::bytes(file.bytes.clone()).file_name(file.filename.clone());
            if let Some(mime) = &file.mime {
                part = part.mime_str(mime)?;
            }
            form = form.part(fields::ATTACHMENTS, part);
        }

        tracing::debug!(url = url.as_str(), files = request.files.len(), "sending message");
        let response = self.prepare(self.client.post(url)).multipart(form).send().await?;
        decode_status(response).await
    }

    async fn mark_announcement_read(
        &self,
        id: AnnouncementId,
        csrf_token: &str,
    ) -> Result<ApiStatus, ApiError> {
        let url = self.endpoint(&ANNOUNCEMENT_READ_PATH.replace("{id}", &id.to_string()))?;
        let response = self
            .prepare(self.client.post(url))
            .header(headers::CSRF_TOKEN, csrf_token)
            .send()
            .await?;
        decode_status(response).await
    }

    async fn fetch_thread_messages(
        &self,
        thread_id: ThreadId,
        after: Option<MessageId>,
    ) -> Result<Vec<Message>, ApiError> {
        let path = THREAD_MESSAGES_PATH.replace("{thread_id}", &thread_id.to_string());
        let mut url = self.endpoint(&path)?;
        if let Some(after) = after {
            url.query_pairs_mut().append_pair("after", &after.to_string());
        }

        let response = self.prepare(self.client.get(url)).send().await?;
        let text = checked(response).await?.text().await?;
        let parsed: MessagesResponse = serde_json::from_str(&text)?;
        Ok(parsed.messages)
    }
}

/// Value of the `csrfmiddlewaretoken` hidden input in an HTML page
pub fn extract_csrf_token(html: &str) -> Option<String> {
    let marker = html.find(fields::CSRF_INPUT)?;
    let tag_start = html[..marker].rfind('<')?;
    let tag_end = marker + html[marker..].find('>')?;
    let tag = &html[tag_start..tag_end];

    let value_at = tag.find("value=")? + "value=".len();
    let rest = &tag[value_at..];
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &rest[1..];
    let value = &rest[..rest.find(quote)?];
    (!value.is_empty()).then(|| value.to_string())
}
