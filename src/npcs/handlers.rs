use hyper::{Body, Method, Request};
use uuid::Uuid;

use super::api::{Create, Edit, NpcWithLocations};
use super::Npc;
use crate::campaigns::Campaign;
use crate::database::pool::DbPool;
use crate::database::Querist;
use crate::error::AppError;
use crate::interface::{created, missing, no_content, ok_response, parse_body, parse_id, AppResult};
use crate::session;

async fn replace_locations<T: Querist>(
    db: &mut T,
    npc_id: &Uuid,
    location_ids: &[Uuid],
    campaign_id: &Uuid,
) -> Result<(), AppError> {
    Npc::disconnect_locations(db, npc_id).await?;
    for location_id in location_ids {
        Npc::connect_location(db, npc_id, location_id, campaign_id).await?;
    }
    Ok(())
}

async fn list(pool: &DbPool, campaign_id: Uuid) -> AppResult {
    let mut conn = pool.get().await;
    let db = &mut *conn;
    Campaign::require(db, &campaign_id).await?;
    let npcs = Npc::with_locations_by_campaign(db, &campaign_id).await?;
    Ok(ok_response(npcs))
}

async fn create(req: Request<Body>, pool: &DbPool, campaign_id: Uuid) -> AppResult {
    let session = session::authenticate(&req)?;
    let form: Create = parse_body(req).await?;
    let mut conn = pool.get().await;
    let db = &mut *conn;
    Campaign::owned(db, &session, &campaign_id).await?;
    form.validate()?;
    let npc = Npc::create(db, &campaign_id, &form.name, &form.description).await?;
    if let Some(location_ids) = &form.location_ids {
        replace_locations(db, &npc.id, location_ids, &campaign_id).await?;
    }
    let locations = Npc::locations(db, &npc.id).await?;
    Ok(created(NpcWithLocations { npc, locations }))
}

async fn get(pool: &DbPool, campaign_id: Uuid, id: Uuid) -> AppResult {
    let mut conn = pool.get().await;
    let db = &mut *conn;
    Campaign::require(db, &campaign_id).await?;
    let npc = Npc::get(db, &campaign_id, &id).await?.ok_or(AppError::NotFound("NPC"))?;
    let locations = Npc::locations(db, &id).await?;
    Ok(ok_response(NpcWithLocations { npc, locations }))
}

async fn update(req: Request<Body>, pool: &DbPool, campaign_id: Uuid, id: Uuid) -> AppResult {
    let session = session::authenticate(&req)?;
    let form: Edit = parse_body(req).await?;
    let mut conn = pool.get().await;
    let db = &mut *conn;
    Campaign::owned(db, &session, &campaign_id).await?;
    form.validate()?;
    let npc = Npc::edit(db, &campaign_id, &id, form.name.as_deref(), form.description.as_deref())
        .await?
        .ok_or(AppError::NotFound("NPC"))?;
    if let Some(location_ids) = &form.location_ids {
        replace_locations(db, &id, location_ids, &campaign_id).await?;
    }
    let locations = Npc::locations(db, &id).await?;
    Ok(ok_response(NpcWithLocations { npc, locations }))
}

async fn remove(req: Request<Body>, pool: &DbPool, campaign_id: Uuid, id: Uuid) -> AppResult {
    let session = session::authenticate(&req)?;
    let mut conn = pool.get().await;
    let db = &mut *conn;
    Campaign::owned(db, &session, &campaign_id).await?;
    if Npc::delete(db, &campaign_id, &id).await? == 0 {
        return Err(AppError::NotFound("NPC"));
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
