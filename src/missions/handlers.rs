use hyper::{Body, Method, Request};
use uuid::Uuid;

use super::api::{Create, Edit};
use super::Mission;
use crate::campaigns::Campaign;
use crate::database::pool::DbPool;
use crate::error::AppError;
use crate::interface::{created, missing, no_content, ok_response, parse_body, parse_id, AppResult};
use crate::session;

async fn list(pool: &DbPool, campaign_id: Uuid) -> AppResult {
    let mut conn = pool.get().await;
    let db = &mut *conn;
    Campaign::require(db, &campaign_id).await?;
    let missions = Mission::get_by_campaign(db, &campaign_id).await?;
    Ok(ok_response(missions))
}

async fn create(req: Request<Body>, pool: &DbPool, campaign_id: Uuid) -> AppResult {
    let session = session::authenticate(&req)?;
    let form: Create = parse_body(req).await?;
    let mut conn = pool.get().await;
    let db = &mut *conn;
    Campaign::owned(db, &session, &campaign_id).await?;
    form.validate()?;
    let mission = Mission::create(db, &campaign_id, &form.name, &form.description, form.completed).await?;
    Ok(created(mission))
}

async fn get(pool: &DbPool, campaign_id: Uuid, id: Uuid) -> AppResult {
    let mut conn = pool.get().await;
    let db = &mut *conn;
    Campaign::require(db, &campaign_id).await?;
    let mission = Mission::get(db, &campaign_id, &id)
        .await?
        .ok_or(AppError::NotFound("Mission"))?;
    Ok(ok_response(mission))
}

async fn update(req: Request<Body>, pool: &DbPool, campaign_id: Uuid, id: Uuid) -> AppResult {
    let session = session::authenticate(&req)?;
    let form: Edit = parse_body(req).await?;
    let mut conn = pool.get().await;
    let db = &mut *conn;
    Campaign::owned(db, &session, &campaign_id).await?;
    form.validate()?;
    let mission = Mission::edit(
        db,
        &campaign_id,
        &id,
        form.name.as_deref(),
        form.description.as_deref(),
        form.completed,
    )
    .await?
    .ok_or(AppError::NotFound("Mission"))?;
    Ok(ok_response(mission))
}

async fn remove(req: Request<Body>, pool: &DbPool, campaign_id: Uuid, id: Uuid) -> AppResult {
    let session = session::authenticate(&req)?;
    let mut conn = pool.get().await;
    let db = &mut *conn;
    Campaign::owned(db, &session, &campaign_id).await?;
    if Mission::delete(db, &campaign_id, &id).await? == 0 {
        return Err(AppError::NotFound("Mission"));
    }
    Ok(no_content())
}

pub async fn router(req: Request<Body>, path: &str, pool: &DbPool, campaign_id: Uuid) -> AppResult {
    match (path, req.method().clone()) {
        ("" | "/", Method::GET) => return list(pool, campaign_id).await,
        ("" | "/", Method::POST) => return create(req, pool, campaign_id).await,
        _ => (),
    }
    let (id, rest) = parse_id(path)?;
    if !rest.is_empty() {
        return missing();
    }
    match req.method().clone() {
        Method::GET => get(pool, campaign_id, id).await,
        Method::PUT => update(req, pool, campaign_id, id).await,
        Method::DELETE => remove(req, pool, campaign_id, id).await,
        _ => missing(),
    }
}
