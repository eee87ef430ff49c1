use hyper::{Body, Method, Request};
use uuid::Uuid;

use super::api::{CampaignCreated, CampaignWithRelated, ContributorChange, Create, Edit, Join, NewCode};
use super::{Campaign, Contributor, ContributorWithUser};
use crate::characters::Character;
use crate::database::pool::DbPool;
use crate::error::AppError;
use crate::interface::{
    created, missing, no_content, ok_response, parse_body, parse_id, parse_query, pop_segment, AppResult,
};
use crate::locations::Location;
use crate::maps::Map;
use crate::missions::Mission;
use crate::notes::Note;
use crate::npcs::Npc;
use crate::session;

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    user_id: Option<Uuid>,
}

/// The public list, optionally narrowed to one owner's campaigns.
async fn list(req: Request<Body>, pool: &DbPool) -> Result<Vec<Campaign>, AppError> {
    let ListQuery { user_id } = parse_query(req.uri())?;
    let mut conn = pool.get().await;
    Campaign::all(&mut *conn, user_id.as_ref()).await.map_err(Into::into)
}

async fn create(req: Request<Body>, pool: &DbPool) -> AppResult {
    let session = session::authenticate(&req)?;
    let form: Create = parse_body(req).await?;
    form.validate()?;
    let mut conn = pool.get().await;
    let campaign = Campaign::create(&mut *conn, &form.name, &form.description, &session.user_id).await?;
    log::info!("A campaign was created: {} ({})", campaign.name, campaign.id);
    let join_code = campaign.join_code.clone();
    Ok(created(CampaignCreated { campaign, join_code }))
}

/// A campaign read carries its children, the front end renders them all
/// on one screen.
async fn get_with_related(pool: &DbPool, id: Uuid) -> Result<CampaignWithRelated, AppError> {
    let mut conn = pool.get().await;
    let db = &mut *conn;
    let campaign = Campaign::require(db, &id).await?;
    let contributors = ContributorWithUser::get_by_campaign(db, &id).await?;
    let characters = Character::get_by_campaign(db, &id).await?;
    let locations = Location::get_by_campaign(db, &id).await?;
    let missions = Mission::get_by_campaign(db, &id).await?;
    let notes = Note::get_by_campaign(db, &id).await?;
    let maps = Map::get_by_campaign(db, &id).await?;
    let npcs = Npc::with_locations_by_campaign(db, &id).await?;
    Ok(CampaignWithRelated {
        campaign,
        contributors,
        characters,
        locations,
        missions,
        notes,
        maps,
        npcs,
    })
}

async fn edit(req: Request<Body>, pool: &DbPool, id: Uuid) -> AppResult {
    let session = session::authenticate(&req)?;
    let form: Edit = parse_body(req).await?;
    let mut conn = pool.get().await;
    let db = &mut *conn;
    Campaign::owned(db, &session, &id).await?;
    form.validate()?;
    let campaign = Campaign::edit(db, &id, form.name.as_deref(), form.description.as_deref())
        .await?
        .ok_or(AppError::NotFound("Campaign"))?;
    Ok(ok_response(campaign))
}

async fn remove(req: Request<Body>, pool: &DbPool, id: Uuid) -> AppResult {
    let session = session::authenticate(&req)?;
    let mut conn = pool.get().await;
    let db = &mut *conn;
    let campaign = Campaign::owned(db, &session, &id).await?;
    if Campaign::delete(db, &id).await? == 0 {
        return Err(AppError::NotFound("Campaign"));
    }
    log::info!("A campaign was deleted: {} ({})", campaign.name, campaign.id);
    Ok(no_content())
}

async fn new_code(req: Request<Body>, pool: &DbPool, id: Uuid) -> AppResult {
    let session = session::authenticate(&req)?;
    let mut conn = pool.get().await;
    let db = &mut *conn;
    Campaign::owned(db, &session, &id).await?;
    let join_code = Campaign::regenerate_code(db, &id).await?;
    Ok(ok_response(NewCode { join_code }))
}

/// Redeeming a code makes the caller a contributor. The code resolves
/// to the campaign, so a bad code reads as a missing campaign.
async fn join(req: Request<Body>, pool: &DbPool) -> AppResult {
    let session = session::authenticate(&req)?;
    let form: Join = parse_body(req).await?;
    form.validate()?;
    let mut conn = pool.get().await;
    let db = &mut *conn;
    let campaign = Campaign::get_by_code(db, &form.code)
        .await?
        .ok_or(AppError::NotFound("Campaign"))?;
    campaign.ensure_not_owner(&session.user_id)?;
    let contributor = Contributor::add(db, &session.user_id, &campaign.id).await?;
    Ok(ok_response(contributor))
}

async fn contributors(req: Request<Body>, pool: &DbPool, id: Uuid) -> AppResult {
    session::authenticate(&req)?;
    let mut conn = pool.get().await;
    let db = &mut *conn;
    Campaign::require(db, &id).await?;
    let contributors = ContributorWithUser::get_by_campaign(db, &id).await?;
    Ok(ok_response(contributors))
}

async fn add_contributor(req: Request<Body>, pool: &DbPool, id: Uuid) -> AppResult {
    let session = session::authenticate(&req)?;
    let form: ContributorChange = parse_body(req).await?;
    let mut conn = pool.get().await;
    let db = &mut *conn;
    let campaign = Campaign::owned(db, &session, &id).await?;
    campaign.ensure_not_owner(&form.user_id)?;
    let contributor = Contributor::add(db, &form.user_id, &id).await?;
    Ok(created(contributor))
}

async fn remove_contributor(req: Request<Body>, pool: &DbPool, id: Uuid) -> AppResult {
    let session = session::authenticate(&req)?;
    let form: ContributorChange = parse_body(req).await?;
    let mut conn = pool.get().await;
    let db = &mut *conn;
    Campaign::owned(db, &session, &id).await?;
    if Contributor::remove(db, &form.user_id, &id).await? == 0 {
        return Err(AppError::NotFound("Contributor"));
    }
    Ok(no_content())
}

pub async fn router(req: Request<Body>, path: &str, pool: &DbPool) -> AppResult {
    match (path, req.method().clone()) {
        ("" | "/", Method::GET) => return list(req, pool).await.map(ok_response),
        ("" | "/", Method::POST) => return create(req, pool).await,
        ("/join", Method::POST) => return join(req, pool).await,
        _ => (),
    }
    let (id, rest) = parse_id(path)?;
    match (rest, req.method().clone()) {
        ("", Method::GET) => return get_with_related(pool, id).await.map(ok_response),
        ("", Method::PUT) => return edit(req, pool, id).await,
        ("", Method::DELETE) => return remove(req, pool, id).await,
        ("/join-code", Method::POST) => return new_code(req, pool, id).await,
        ("/contributors", Method::GET) => return contributors(req, pool, id).await,
        ("/contributors", Method::POST) => return add_contributor(req, pool, id).await,
        ("/contributors", Method::DELETE) => return remove_contributor(req, pool, id).await,
        _ => (),
    }
    let (child, tail) = pop_segment(rest);
    match child {
        "npcs" => crate::npcs::handlers::router(req, tail, pool, id).await,
        "characters" => crate::characters::handlers::router(req, tail, pool, id).await,
        "locations" => crate::locations::handlers::router(req, tail, pool, id).await,
        "missions" => crate::missions::handlers::router(req, tail, pool, id).await,
        "notes" => crate::notes::handlers::router(req, tail, pool, id).await,
        "maps" => crate::maps::handlers::router(req, tail, pool, id).await,
        _ => missing(),
    }
}
