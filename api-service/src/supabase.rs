use common::env::Env;
use common::errors::AppError;
use common::http_client::HttpClient;
use common::models::AuthUser;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::{info, instrument};

/// Verifies access tokens against Supabase Auth (`GET /auth/v1/user`).
#[derive(Clone)]
pub struct SupabaseAuth {
    http_client: HttpClient,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, AppError> {
        Ok(Self {
            http_client: HttpClient::new(5, 1)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    /// `None` when the settings lack a Supabase URL or anon key.
    pub fn from_env(env: &Env) -> Result<Option<Self>, AppError> {
        if !env.supabase_configured() {
            return Ok(None);
        }
        Self::new(&env.supabase_url, &env.supabase_anon_key).map(Some)
    }

    /// Resolve the user behind `token`. A rejected token yields `Ok(None)`.
    #[instrument(skip_all)]
    pub async fn get_user(&self, token: &str) -> Result<Option<AuthUser>, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.anon_key)
                .map_err(|_| AppError::internal("Supabase anon key is not a valid header"))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| AppError::auth("Invalid Authorization header format"))?,
        );

        let url = format!("{}/auth/v1/user", self.base_url);
        match self.http_client.get_json::<AuthUser>(&url, headers).await {
            Ok(user) => {
                info!(user_id = %user.id, "Resolved Supabase user");
                Ok(Some(user))
            }
            Err(AppError::HttpError {
                status: 401 | 403, ..
            }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
