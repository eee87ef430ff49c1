use hyper::header::{HeaderValue, SET_COOKIE};
use hyper::{Body, Method, Request};
use once_cell::sync::OnceCell;

use super::api::{Login, LoginReturn, Register};
use super::models::User;
use crate::database::pool::DbPool;
use crate::error::AppError;
use crate::interface::{created, missing, ok_response, parse_body, AppResult};
use crate::{authority, session};

async fn register(req: Request<Body>, pool: &DbPool) -> Result<User, AppError> {
    let form: Register = parse_body(req).await?;
    form.validate()?;
    let mut conn = pool.get().await;
    let user = User::register(&mut *conn, &form.name, &form.email, &form.password).await?;
    log::info!("New identity registered: {}", user.name);
    Ok(user)
}

async fn login(req: Request<Body>, pool: &DbPool) -> AppResult {
    let form: Login = parse_body(req).await?;
    form.validate()?;
    let mut conn = pool.get().await;
    let login = User::login(&mut *conn, form.name.as_deref(), form.email.as_deref(), &form.password).await;
    if let Err(AppError::Unauthenticated) = &login {
        let who = form.email.as_deref().or(form.name.as_deref()).unwrap_or("<unknown>");
        log::warn!("A failed login attempt: {}", who);
    }
    let user = login?;
    let session = session::Session {
        user_id: user.id,
        role: user.role,
    };
    let token = session::token(&session)?;
    let cookie = session::session_cookie(&token);
    let token = if form.with_token { Some(token) } else { None };
    let mut response = ok_response(LoginReturn { user, token });
    let header_value = HeaderValue::from_str(&cookie).map_err(unexpected!())?;
    response.headers_mut().insert(SET_COOKIE, header_value);
    Ok(response)
}

/// Sessions are stateless, logout just discards the cookie.
async fn logout(req: Request<Body>) -> AppResult {
    session::authenticate(&req)?;
    let mut response = ok_response(true);

    static HEADER_VALUE: OnceCell<HeaderValue> = OnceCell::new();
    let header_value = HEADER_VALUE.get_or_init(|| {
        HeaderValue::from_str(&session::expired_cookie()).unwrap()
    });
    response.headers_mut().append(SET_COOKIE, header_value.clone());
    Ok(response)
}

async fn all(req: Request<Body>, pool: &DbPool) -> Result<Vec<User>, AppError> {
    let session = session::authenticate(&req)?;
    authority::require_admin(&session)?;
    let mut conn = pool.get().await;
    User::all(&mut *conn).await.map_err(Into::into)
}

pub async fn router(req: Request<Body>, path: &str, pool: &DbPool) -> AppResult {
    match (path, req.method().clone()) {
        ("/register", Method::POST) => register(req, pool).await.map(created),
        ("/login", Method::POST) => login(req, pool).await,
        ("/logout", Method::POST) => logout(req).await,
        ("" | "/", Method::GET) => all(req, pool).await.map(ok_response),
        _ => missing(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn logout_requires_a_session() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/users/logout")
            .body(Body::empty())
            .unwrap();
        let err = logout(req).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));
    }
}
