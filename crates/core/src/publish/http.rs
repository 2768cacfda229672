use std::fmt;

use async_trait::async_trait;
use reqwest::{
    Client, Url,
    multipart::{Form, Part},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Publisher;
use crate::{
    error::PublishError,
    types::{ImageBuffer, PublishStatus},
};

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    status: String,
    token: Option<String>,
}

impl LoginResponse {
    fn into_token(self) -> Result<String, PublishError> {
        if self.status != PublishStatus::OK {
            return Err(PublishError::Login(format!("status `{}`", self.status)));
        }
        self.token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| PublishError::Login("no session token returned".to_string()))
    }
}

#[derive(Deserialize)]
struct StatusResponse {
    status: String,
}

/// Session against the publishing gateway, authenticated once at construction.
pub struct HttpSession {
    client: Client,
    base: Url,
    token: String,
}

impl HttpSession {
    const LOGIN: &'static str = "login";
    const PHOTO: &'static str = "media/photo";
    const PROFILE_PICTURE: &'static str = "account/profile-picture";
    const STORY: &'static str = "media/story";

    pub async fn login(
        client: Client,
        base: Url,
        credentials: &Credentials,
    ) -> Result<Self, PublishError> {
        let token = client
            .post(endpoint(&base, Self::LOGIN))
            .json(credentials)
            .send()
            .await?
            .error_for_status()?
            .json::<LoginResponse>()
            .await?
            .into_token()?;

        info!(username = %credentials.username, "publishing session established");
        Ok(Self {
            client,
            base,
            token,
        })
    }

    async fn upload(
        &self,
        path: &str,
        image: &ImageBuffer,
        caption: Option<&str>,
    ) -> Result<PublishStatus, PublishError> {
        let file = Part::bytes(image.to_vec())
            .file_name("image.jpg")
            .mime_str("image/jpeg")?;
        let mut form = Form::new().part("file", file);
        if let Some(caption) = caption {
            form = form.text("caption", caption.to_owned());
        }

        debug!(path, bytes = image.len(), "uploading");
        let response: StatusResponse = self
            .client
            .post(endpoint(&self.base, path))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(PublishStatus::new(response.status))
    }
}

#[async_trait]
impl Publisher for HttpSession {
    async fn publish_photo(
        &self,
        image: &ImageBuffer,
        caption: &str,
    ) -> Result<PublishStatus, PublishError> {
        self.upload(Self::PHOTO, image, Some(caption)).await
    }

    async fn change_profile_picture(&self, image: &ImageBuffer) -> Result<PublishStatus, PublishError> {
        self.upload(Self::PROFILE_PICTURE, image, None).await
    }

    async fn publish_story(
        &self,
        image: &ImageBuffer,
        caption: &str,
    ) -> Result<PublishStatus, PublishError> {
        self.upload(Self::STORY, image, Some(caption)).await
    }
}

fn endpoint(base: &Url, path: &str) -> String {
    format!("{}/{path}", base.as_str().trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_endpoints_with_or_without_trailing_slash() {
        let bare = Url::parse("https://gateway.example/api").unwrap();
        let slashed = Url::parse("https://gateway.example/api/").unwrap();

        assert_eq!(endpoint(&bare, "media/photo"), "https://gateway.example/api/media/photo");
        assert_eq!(endpoint(&slashed, "login"), "https://gateway.example/api/login");
    }

    fn login_response(body: &str) -> LoginResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn ok_login_yields_the_session_token() {
        let token = login_response(r#"{"status":"ok","token":"abc123"}"#)
            .into_token()
            .unwrap();
        assert_eq!(token, "abc123");
    }

    #[test]
    fn rejected_login_is_a_login_error() {
        let err = login_response(r#"{"status":"fail","token":"abc123"}"#)
            .into_token()
            .unwrap_err();
        assert!(matches!(&err, PublishError::Login(reason) if reason == "status `fail`"));
        assert_eq!(err.to_string(), "login rejected: status `fail`");
    }

    #[test]
    fn login_without_token_is_a_login_error() {
        for body in [r#"{"status":"ok"}"#, r#"{"status":"ok","token":""}"#] {
            let err = login_response(body).into_token().unwrap_err();
            assert!(matches!(err, PublishError::Login(_)));
        }
    }

    #[test]
    fn credentials_debug_hides_password() {
        let credentials = Credentials {
            username: "nounsbot".to_string(),
            password: "hunter2".to_string(),
        };

        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("nounsbot"));
        assert!(!rendered.contains("hunter2"));
    }
}
