use super::{check_response, SupabaseClient};
use crate::constants::AUTH_PATH;
use crate::error::{AppError, AppResult};
use base64::{engine::general_purpose, Engine as _};
use reqwest::Method;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
  pub id: String,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub user_metadata: serde_json::Value,
  #[serde(default)]
  pub created_at: Option<String>,
}

/// Tokens returned by a successful sign-in or refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  pub access_token: String,
  pub refresh_token: String,
  pub expires_in: i64,
  /// Unix seconds; not every endpoint sends it.
  #[serde(default)]
  pub expires_at: Option<i64>,
  #[serde(default = "default_token_type")]
  pub token_type: String,
  pub user: AuthUser,
}

fn default_token_type() -> String {
  "bearer".to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignUpResult {
  pub user_id: String,
  pub email: Option<String>,
  /// The account exists but the email link has not been clicked yet.
  pub confirmation_required: bool,
  /// Present when the project auto-confirms new accounts.
  pub session: Option<Session>,
}

#[derive(Debug, Deserialize)]
pub struct JwtClaims {
  pub sub: String,
  pub email: Option<String>,
  pub exp: i64,
}

/// Decode the JWT payload without verifying the signature.
pub fn decode_jwt_claims(token: &str) -> AppResult<JwtClaims> {
  let parts: Vec<&str> = token.split('.').collect();
  if parts.len() != 3 {
    return Err(AppError::Auth("Invalid JWT token format".to_string()));
  }

  let decoded = general_purpose::URL_SAFE_NO_PAD
    .decode(parts[1].trim_end_matches('='))
    .map_err(|e| AppError::Auth(format!("Failed to decode JWT payload: {}", e)))?;

  serde_json::from_slice::<JwtClaims>(&decoded)
    .map_err(|e| AppError::Auth(format!("Failed to parse JWT claims: {}", e)))
}

pub fn is_token_expired(token: &str) -> AppResult<bool> {
  let claims = decode_jwt_claims(token)?;
  Ok(claims.exp <= chrono::Utc::now().timestamp())
}

/// Auth endpoints answer 4xx for bad credentials; surface those as [`AppError::Auth`].
fn auth_error(err: AppError) -> AppError {
  match err {
    AppError::Api { status, message } if (400..500).contains(&status) => AppError::Auth(message),
    other => other,
  }
}

impl SupabaseClient {
  /// Install a session's access token for subsequent requests.
  pub fn use_session(&self, session: &Session) {
    self.set_access_token(Some(session.access_token.clone()));
  }

  pub async fn sign_up(
    &self,
    email: &str,
    password: &str,
    username: Option<&str>,
  ) -> AppResult<SignUpResult> {
    let mut data = serde_json::Map::new();
    if let Some(name) = username {
      data.insert("username".to_string(), serde_json::Value::from(name));
    }
    let body = serde_json::json!({
      "email": email,
      "password": password,
      "data": data,
    });

    let response = self
      .request(Method::POST, &format!("{}/signup", AUTH_PATH))
      .json(&body)
      .send()
      .await?;
    let response = check_response(response).await.map_err(auth_error)?;
    let json: serde_json::Value = response.json().await?;

    // Auto-confirm projects answer with a full session, others with the bare user
    if json.get("access_token").is_some() {
      let session: Session = serde_json::from_value(json)?;
      self.use_session(&session);
      return Ok(SignUpResult {
        user_id: session.user.id.clone(),
        email: session.user.email.clone(),
        confirmation_required: false,
        session: Some(session),
      });
    }

    let user_value = json.get("user").cloned().unwrap_or(json);
    let user: AuthUser = serde_json::from_value(user_value)?;
    log::info!("Signed up {}; waiting for email confirmation", email);
    Ok(SignUpResult {
      user_id: user.id,
      email: user.email,
      confirmation_required: true,
      session: None,
    })
  }

  pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
    let body = serde_json::json!({
      "email": email,
      "password": password,
    });

    let response = self
      .request(Method::POST, &format!("{}/token", AUTH_PATH))
      .query(&[("grant_type", "password")])
      .json(&body)
      .send()
      .await?;
    let response = check_response(response).await.map_err(auth_error)?;
    let session: Session = response.json().await?;

    self.use_session(&session);
    log::info!("Signed in as {}", session.user.id);
    Ok(session)
  }

  pub async fn refresh_session(&self, refresh_token: &str) -> AppResult<Session> {
    let response = self
      .request(Method::POST, &format!("{}/token", AUTH_PATH))
      .query(&[("grant_type", "refresh_token")])
      .json(&serde_json::json!({ "refresh_token": refresh_token }))
      .send()
      .await?;
    let response = check_response(response).await.map_err(auth_error)?;
    let session: Session = response.json().await?;

    self.use_session(&session);
    Ok(session)
  }

  /// Revoke the session server-side. The local token is dropped even if that fails.
  pub async fn sign_out(&self) -> AppResult<()> {
    if !self.is_signed_in() {
      return Ok(());
    }
    let result = self
      .request(Method::POST, &format!("{}/logout", AUTH_PATH))
      .send()
      .await;
    self.set_access_token(None);

    match result {
      Ok(response) => {
        if let Err(e) = check_response(response).await {
          log::warn!("Logout request rejected: {}", e);
        }
      }
      Err(e) => log::warn!("Failed to send logout request: {}", e),
    }
    Ok(())
  }

  pub async fn current_user(&self) -> AppResult<AuthUser> {
    if !self.is_signed_in() {
      return Err(AppError::Auth("Not signed in".to_string()));
    }
    let response = self
      .request(Method::GET, &format!("{}/user", AUTH_PATH))
      .send()
      .await?;
    let response = check_response(response).await.map_err(auth_error)?;
    Ok(response.json().await?)
  }
}
