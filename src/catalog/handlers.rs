//! One set of handlers serves all ten catalog tables. Reads are open
//! to anyone, writes require an administrator session.
use hyper::{Body, Method, Request};
use serde::Serialize;
use uuid::Uuid;

use super::api::{
    CreateClass, CreateFeat, CreateFeature, CreateForm, CreateItem, CreateRace, CreateRaceAbility, CreateSpell,
    CreateSubclass, CreateSubrace, CreateSubraceAbility, EditClass, EditFeat, EditFeature, EditForm, EditItem,
    EditRace, EditRaceAbility, EditSpell, EditSubclass, EditSubrace, EditSubraceAbility,
};
use super::models::CatalogEntity;
use crate::authority;
use crate::database::pool::DbPool;
use crate::error::AppError;
use crate::interface::{created, missing, no_content, ok_response, parse_body, parse_id, pop_segment, AppResult};
use crate::session;

async fn list<E: CatalogEntity + Serialize>(pool: &DbPool) -> AppResult {
    let mut conn = pool.get().await;
    let entries = E::all(&mut *conn).await?;
    Ok(ok_response(entries))
}

async fn get<E: CatalogEntity + Serialize>(pool: &DbPool, id: Uuid) -> AppResult {
    let mut conn = pool.get().await;
    let entry = E::get_by_id(&mut *conn, &id)
        .await?
        .ok_or(AppError::NotFound(E::WHAT))?;
    Ok(ok_response(entry))
}

async fn create<C: CreateForm>(req: Request<Body>, pool: &DbPool) -> AppResult {
    let session = session::authenticate(&req)?;
    authority::require_admin(&session)?;
    let form: C = parse_body(req).await?;
    form.validate()?;
    let mut conn = pool.get().await;
    let entry = form.insert(&mut *conn).await?;
    Ok(created(entry))
}

async fn update<U: EditForm>(req: Request<Body>, pool: &DbPool, id: Uuid) -> AppResult {
    let session = session::authenticate(&req)?;
    authority::require_admin(&session)?;
    let form: U = parse_body(req).await?;
    form.validate()?;
    let mut conn = pool.get().await;
    let entry = form
        .apply(&mut *conn, &id)
        .await?
        .ok_or(AppError::NotFound(U::Entity::WHAT))?;
    Ok(ok_response(entry))
}

async fn remove<E: CatalogEntity>(req: Request<Body>, pool: &DbPool, id: Uuid) -> AppResult {
    let session = session::authenticate(&req)?;
    authority::require_admin(&session)?;
    let mut conn = pool.get().await;
    if E::delete(&mut *conn, &id).await? == 0 {
        return Err(AppError::NotFound(E::WHAT));
    }
    Ok(no_content())
}

async fn entity<C, U>(req: Request<Body>, path: &str, pool: &DbPool) -> AppResult
where
    C: CreateForm,
    U: EditForm<Entity = C::Entity>,
{
    match (path, req.method().clone()) {
        ("" | "/", Method::GET) => return list::<C::Entity>(pool).await,
        ("" | "/", Method::POST) => return create::<C>(req, pool).await,
        _ => (),
    }
    let (id, rest) = parse_id(path)?;
    if !rest.is_empty() {
        return missing();
    }
    match req.method().clone() {
        Method::GET => get::<C::Entity>(pool, id).await,
        Method::PUT => update::<U>(req, pool, id).await,
        Method::DELETE => remove::<C::Entity>(req, pool, id).await,
        _ => missing(),
    }
}

pub async fn router(req: Request<Body>, path: &str, pool: &DbPool) -> AppResult {
    let (table, rest) = pop_segment(path);
    match table {
        "races" => entity::<CreateRace, EditRace>(req, rest, pool).await,
        "subraces" => entity::<CreateSubrace, EditSubrace>(req, rest, pool).await,
        "race-abilities" => entity::<CreateRaceAbility, EditRaceAbility>(req, rest, pool).await,
        "subrace-abilities" => entity::<CreateSubraceAbility, EditSubraceAbility>(req, rest, pool).await,
        "classes" => entity::<CreateClass, EditClass>(req, rest, pool).await,
        "subclasses" => entity::<CreateSubclass, EditSubclass>(req, rest, pool).await,
        "spells" => entity::<CreateSpell, EditSpell>(req, rest, pool).await,
        "items" => entity::<CreateItem, EditItem>(req, rest, pool).await,
        "features" => entity::<CreateFeature, EditFeature>(req, rest, pool).await,
        "feats" => entity::<CreateFeat, EditFeat>(req, rest, pool).await,
        _ => missing(),
    }
}
