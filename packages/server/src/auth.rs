//! # Sessions
//!
//! One mechanism, verified everywhere: the `pharmasite_session` cookie holds
//! an HS256 JWT `{sub, role, exp}`. The admin guard and every handler decode
//! it the same way; a missing, expired or forged token means anonymous.
//!
//! Passwords are stored as argon2 PHC strings.

use crate::config::{AccountConfig, SessionConfig};
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use pharmasite_store::{Principal, Role};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

pub const SESSION_COOKIE: &str = "pharmasite_session";
pub const LOGIN_PATH: &str = "/admin/login";
pub const ADMIN_HOME: &str = "/admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: u64,
}

/// Hash `password` with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())?;
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!(error = %e, "Stored password hash is not a valid PHC string");
            false
        }
    }
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Signs and checks sessions for the configured accounts
#[derive(Clone)]
pub struct Authenticator {
    keys: Arc<Keys>,
    accounts: Arc<Vec<AccountConfig>>,
    ttl: Duration,
    secure_cookie: bool,
}

impl Authenticator {
    pub fn new(secret: &[u8], ttl: Duration, accounts: Vec<AccountConfig>) -> Self {
        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
            }),
            accounts: Arc::new(accounts),
            ttl,
            secure_cookie: false,
        }
    }

    /// Build from config. An empty secret gets a random one, so sessions do
    /// not survive a restart. `env_admin` is the `ADMIN_EMAIL`/`ADMIN_PASSWORD`
    /// pair, hashed here and given the editor role.
    pub fn from_config(
        session: &SessionConfig,
        accounts: &[AccountConfig],
        env_admin: Option<(String, String)>,
    ) -> ServerResult<Self> {
        let secret = if session.secret.is_empty() {
            warn!("No session secret configured; using a random one for this run");
            rand::random::<[u8; 32]>().to_vec()
        } else {
            session.secret.as_bytes().to_vec()
        };

        let mut accounts = accounts.to_vec();
        if let Some((email, password)) = env_admin {
            if !accounts.iter().any(|a| a.email.eq_ignore_ascii_case(&email)) {
                let password_hash = hash_password(&password).map_err(|e| ServerError::Auth(e.to_string()))?;
                accounts.push(AccountConfig {
                    email,
                    password_hash,
                    role: Role::Editor,
                });
            }
        }
        if accounts.is_empty() {
            warn!("No admin accounts configured; nobody can sign in");
        }

        let mut auth = Self::new(&secret, Duration::from_secs(session.ttl_secs), accounts);
        auth.secure_cookie = session.secure_cookie;
        Ok(auth)
    }

    /// Check credentials; the principal on success
    pub fn login(&self, email: &str, password: &str) -> Option<Principal> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email.trim()))?;

        verify_password(password, &account.password_hash).then(|| Principal::User {
            email: account.email.clone(),
            role: account.role,
        })
    }

    pub fn issue(&self, principal: &Principal) -> Result<String, jsonwebtoken::errors::Error> {
        let Principal::User { email, role } = principal else {
            return Err(jsonwebtoken::errors::ErrorKind::InvalidSubject.into());
        };

        let claims = Claims {
            sub: email.clone(),
            role: *role,
            exp: now_secs() + self.ttl.as_secs(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
    }

    /// Decode a token; `None` for anything that does not verify
    pub fn verify(&self, token: &str) -> Option<Principal> {
        match decode::<Claims>(token, &self.keys.decoding, &Validation::new(Algorithm::HS256)) {
            Ok(data) => Some(Principal::User {
                email: data.claims.sub,
                role: data.claims.role,
            }),
            Err(e) => {
                debug!(error = %e, "Rejected session token");
                None
            }
        }
    }

    pub fn principal(&self, jar: &CookieJar) -> Principal {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| self.verify(cookie.value()))
            .unwrap_or(Principal::Anonymous)
    }

    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie)
            .build()
    }

    /// Cookie to hand `CookieJar::remove`; the path must match the one set
    pub fn removal_cookie() -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE).path("/").build()
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// The principal behind the request's session cookie
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(CurrentUser(state.auth.principal(&jar)))
    }
}

fn is_admin_path(path: &str) -> bool {
    path == ADMIN_HOME || path.starts_with("/admin/")
}

/// Route guard for `/admin/*`
pub async fn guard(State(state): State<AppState>, jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if !is_admin_path(path) {
        return next.run(request).await;
    }

    let signed_in = state.auth.principal(&jar).is_authenticated();
    let on_login = path == LOGIN_PATH;

    match (signed_in, on_login) {
        (false, false) => Redirect::to(LOGIN_PATH).into_response(),
        (true, true) if request.method() == Method::GET => Redirect::to(ADMIN_HOME).into_response(),
        _ => next.run(request).await,
    }
}
