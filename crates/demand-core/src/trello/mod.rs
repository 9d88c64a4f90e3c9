//! Trello REST client for card creation and attachment upload.

use reqwest::{multipart, Client, Request};
use serde::{Deserialize, Serialize};

use crate::config::{Credentials, PriorityLabels};
use crate::error::ValidationError;
use crate::models::{Attachment, FormState};
use crate::util::{compact_text, is_http_url, normalize_text_option};
use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.trello.com/1";
pub const ENV_API_BASE_URL: &str = "DEMAND_API_BASE_URL";

/// Remote operations the submission workflow depends on.
#[allow(async_fn_in_trait)]
pub trait CardApi {
    /// Create a card and return its identifier.
    async fn create_card(&self, credentials: &Credentials, card: &NewCard) -> Result<CreatedCard>;

    /// Attach one file to an existing card.
    async fn upload_attachment(
        &self,
        credentials: &Credentials,
        card_id: &str,
        attachment: &Attachment,
    ) -> Result<()>;
}

/// JSON body of `POST /cards`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCard {
    pub name: String,
    pub desc: String,
    pub pos: String,
    #[serde(rename = "idList")]
    pub id_list: String,
    #[serde(rename = "idLabels", skip_serializing_if = "Option::is_none")]
    pub id_labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

impl NewCard {
    /// Build the card payload for a validated form.
    pub fn from_form(
        form: &FormState,
        labels: &PriorityLabels,
    ) -> std::result::Result<Self, ValidationError> {
        Ok(Self {
            name: form.card_name(),
            desc: form.description.clone(),
            pos: "bottom".to_string(),
            id_list: form.target_list_id.trim().to_string(),
            id_labels: form
                .priority
                .map(|priority| vec![labels.label_for(priority).to_string()]),
            due: form.due()?,
        })
    }
}

/// Fields of the created card we keep.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedCard {
    pub id: String,
    #[serde(default, rename = "shortUrl")]
    pub short_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl CreatedCard {
    /// Best link to show the user.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        self.short_url.as_deref().or(self.url.as_deref())
    }
}

/// HTTP client for the Trello REST API.
#[derive(Debug, Clone)]
pub struct TrelloClient {
    base_url: String,
    client: Client,
}

impl TrelloClient {
    /// Builds a client for an explicit API base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into().as_str())?;
        let client = Client::builder().build().map_err(|error| {
            Error::InvalidInput(format!("Failed to construct HTTP client: {error}"))
        })?;
        Ok(Self { base_url, client })
    }

    /// Builds a client for `DEMAND_API_BASE_URL`, or the public API when unset.
    pub fn from_env() -> Result<Self> {
        let base_url = normalize_text_option(std::env::var(ENV_API_BASE_URL).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let client = Self::new(base_url)?;
        tracing::debug!("Using Trello API at {}", client.base_url());
        Ok(client)
    }

    /// Returns the base URL this client was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_create_card_request(
        &self,
        credentials: &Credentials,
        card: &NewCard,
    ) -> reqwest::Result<Request> {
        self.client
            .post(format!("{}/cards", self.base_url))
            .query(&[
                ("key", credentials.api_key.as_str()),
                ("token", credentials.token.as_str()),
            ])
            .json(card)
            .build()
    }

    fn build_upload_request(
        &self,
        credentials: &Credentials,
        card_id: &str,
        attachment: &Attachment,
    ) -> reqwest::Result<Request> {
        let file_part =
            multipart::Part::bytes(attachment.bytes.clone()).file_name(attachment.file_name.clone());
        let form = multipart::Form::new()
            .text("key", credentials.api_key.clone())
            .text("token", credentials.token.clone())
            .part("file", file_part)
            .text("name", attachment.file_name.clone());

        self.client
            .post(format!("{}/cards/{}/attachments", self.base_url, card_id))
            .multipart(form)
            .build()
    }
}

impl CardApi for TrelloClient {
    async fn create_card(&self, credentials: &Credentials, card: &NewCard) -> Result<CreatedCard> {
        let request = self
            .build_create_card_request(credentials, card)
            .map_err(|error| Error::RecordCreation(format!("Invalid request: {error}")))?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|error| Error::RecordCreation(format!("Request failed: {error}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RecordCreation(format!(
                "HTTP {status}: {}",
                compact_text(&body)
            )));
        }

        response
            .json::<CreatedCard>()
            .await
            .map_err(|error| Error::RecordCreation(format!("Failed to parse response: {error}")))
    }

    async fn upload_attachment(
        &self,
        credentials: &Credentials,
        card_id: &str,
        attachment: &Attachment,
    ) -> Result<()> {
        let upload_error = |message: String| Error::AttachmentUpload {
            file_name: attachment.file_name.clone(),
            message,
        };

        let request = self
            .build_upload_request(credentials, card_id, attachment)
            .map_err(|error| upload_error(format!("Invalid request: {error}")))?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|error| upload_error(format!("Request failed: {error}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(upload_error(format!(
                "HTTP {status}: {}",
                compact_text(&body)
            )));
        }
        Ok(())
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let base = raw.trim().trim_end_matches('/').to_string();
    if base.is_empty() {
        return Err(Error::InvalidInput(
            "API base URL must not be empty".to_string(),
        ));
    }
    if !is_http_url(&base) {
        return Err(Error::InvalidInput(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Priority};
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> Credentials {
        Credentials {
            api_key: "test-key".to_string(),
            token: "test-token".to_string(),
        }
    }

    fn form() -> FormState {
        FormState {
            title: "Logo redesign".to_string(),
            description: "New logo needed".to_string(),
            target_list_id: "abc123".to_string(),
            ..FormState::default()
        }
    }

    #[test]
    fn normalize_base_url_rejects_invalid_values() {
        assert!(normalize_base_url("").is_err());
        assert!(normalize_base_url("api.trello.com").is_err());
    }

    #[test]
    fn client_keeps_normalized_base_url() {
        let client = TrelloClient::new(" http://127.0.0.1:8080/1/ ").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8080/1");
    }

    #[test]
    fn normalize_base_url_trims_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://api.trello.com/1/").unwrap(),
            "https://api.trello.com/1"
        );
    }

    #[test]
    fn minimal_card_omits_optional_fields() {
        let card = NewCard::from_form(&form(), &PriorityLabels::default()).unwrap();
        assert_eq!(
            serde_json::to_value(&card).unwrap(),
            serde_json::json!({
                "name": "Logo redesign",
                "desc": "New logo needed",
                "pos": "bottom",
                "idList": "abc123",
            })
        );
    }

    #[test]
    fn priority_maps_to_label_id() {
        let labels = PriorityLabels::default();
        let mut form = form();
        form.priority = Some("urgente".parse::<Priority>().unwrap());
        form.category = Some(Category::Design);

        let card = NewCard::from_form(&form, &labels).unwrap();
        assert_eq!(card.name, "Logo redesign [Design]");
        assert_eq!(
            card.id_labels,
            Some(vec![labels.label_for(Priority::Urgent).to_string()])
        );
    }

    #[test]
    fn create_card_request_shape() {
        let client = TrelloClient::new(DEFAULT_BASE_URL).unwrap();
        let card = NewCard::from_form(&form(), &PriorityLabels::default()).unwrap();
        let request = client
            .build_create_card_request(&credentials(), &card)
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://api.trello.com/1/cards?key=test-key&token=test-token"
        );
        assert_eq!(
            request
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .unwrap(),
            "application/json"
        );
    }

    #[test]
    fn upload_request_is_multipart() {
        let client = TrelloClient::new(DEFAULT_BASE_URL).unwrap();
        let attachment = Attachment::new("brief.pdf", vec![1, 2, 3]).unwrap();
        let request = client
            .build_upload_request(&credentials(), "card-1", &attachment)
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://api.trello.com/1/cards/card-1/attachments"
        );
        let content_type = request
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(content_type.starts_with("multipart/form-data"));
    }

    #[tokio::test]
    async fn create_card_posts_json_and_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cards"))
            .and(query_param("key", "test-key"))
            .and(query_param("token", "test-token"))
            .and(body_json(serde_json::json!({
                "name": "Logo redesign",
                "desc": "New logo needed",
                "pos": "bottom",
                "idList": "abc123",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "card-42",
                "shortUrl": "https://trello.com/c/abc",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = TrelloClient::new(server.uri()).unwrap();
        let card = NewCard::from_form(&form(), &PriorityLabels::default()).unwrap();
        let created = client.create_card(&credentials(), &card).await.unwrap();

        assert_eq!(created.id, "card-42");
        assert_eq!(created.link(), Some("https://trello.com/c/abc"));
    }

    #[tokio::test]
    async fn create_card_maps_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cards"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let client = TrelloClient::new(server.uri()).unwrap();
        let card = NewCard::from_form(&form(), &PriorityLabels::default()).unwrap();
        let error = client.create_card(&credentials(), &card).await.unwrap_err();

        match error {
            Error::RecordCreation(message) => {
                assert!(message.contains("401"));
                assert!(message.contains("invalid token"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn upload_attachment_sends_credentials_and_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cards/card-42/attachments"))
            .and(body_string_contains("name=\"token\""))
            .and(body_string_contains("test-token"))
            .and(body_string_contains("filename=\"brief.txt\""))
            .and(body_string_contains("hello trello"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = TrelloClient::new(server.uri()).unwrap();
        let attachment = Attachment::new("brief.txt", b"hello trello".to_vec()).unwrap();
        client
            .upload_attachment(&credentials(), "card-42", &attachment)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn upload_attachment_failure_names_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cards/card-42/attachments"))
            .respond_with(ResponseTemplate::new(413))
            .mount(&server)
            .await;

        let client = TrelloClient::new(server.uri()).unwrap();
        let attachment = Attachment::new("huge.mov", vec![0; 8]).unwrap();
        let error = client
            .upload_attachment(&credentials(), "card-42", &attachment)
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            Error::AttachmentUpload { ref file_name, .. } if file_name == "huge.mov"
        ));
    }
}
