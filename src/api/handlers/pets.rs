/*
 * Responsibility
 * - /pets 系 CRUD handler
 * - admins グループは全件操作可, users グループは自分が owner の pet のみ
 * - owner の変更は admins のみ
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::{
        dto::pets::{PetRequest, PetResponse},
        extractors::auth_ctx::AuthCtxExtractor,
    },
    error::AppError,
    repos::Pet,
    services::auth::AuthCtx,
    state::AppState,
};

fn is_admin(state: &AppState, ctx: &AuthCtx) -> bool {
    ctx.in_group(&state.groups.admins)
}

fn can_access(state: &AppState, ctx: &AuthCtx, pet: &Pet) -> bool {
    is_admin(state, ctx) || pet.owner == ctx.principal
}

async fn find_pet(state: &AppState, pet_id: &str) -> Result<Pet, AppError> {
    state
        .pets
        .get(pet_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Pet with id {pet_id}")))
}

pub async fn list_pets(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<Vec<PetResponse>>, AppError> {
    let pets = state.pets.scan_all().await?;

    // The gate guarantees membership in one of the two groups.
    let admin = is_admin(&state, &ctx);
    let res = pets
        .into_iter()
        .filter(|p| admin || p.owner == ctx.principal)
        .map(PetResponse::from)
        .collect();

    Ok(Json(res))
}

pub async fn get_pet(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(pet_id): Path<String>,
) -> Result<Json<PetResponse>, AppError> {
    let pet = find_pet(&state, &pet_id).await?;

    if !can_access(&state, &ctx, &pet) {
        return Err(AppError::Forbidden);
    }

    Ok(Json(pet.into()))
}

pub async fn create_pet(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<PetRequest>,
) -> Result<(StatusCode, Json<PetResponse>), AppError> {
    if req.id.is_some() {
        return Err(AppError::bad_request(
            "ID_NOT_ALLOWED",
            "POST /pets assigns the id; use PUT /pets/{pet_id} to update",
        ));
    }
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_ERROR", msg))?;

    let pet = Pet {
        id: Uuid::new_v4().to_string(),
        owner: ctx.principal.clone(),
        owner_display_name: ctx.claims.email.clone(),
        name: req.name,
        species: req.species,
    };

    state.pets.put(&pet).await?;
    tracing::info!(pet_id = %pet.id, owner = %pet.owner, "pet created");

    Ok((StatusCode::CREATED, Json(pet.into())))
}

pub async fn update_pet(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(pet_id): Path<String>,
    Json(req): Json<PetRequest>,
) -> Result<Json<PetResponse>, AppError> {
    if req.id.as_deref() != Some(pet_id.as_str()) {
        return Err(AppError::bad_request(
            "ID_MISMATCH",
            "pet id in body doesn't match the request path",
        ));
    }
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_ERROR", msg))?;

    let existing = find_pet(&state, &pet_id).await?;

    let owner = req.owner.unwrap_or_else(|| existing.owner.clone());
    let allowed = is_admin(&state, &ctx)
        || (existing.owner == ctx.principal && owner == existing.owner);
    if !allowed {
        return Err(AppError::Forbidden);
    }

    let pet = Pet {
        id: pet_id,
        owner,
        owner_display_name: req.owner_display_name.or(existing.owner_display_name),
        name: req.name,
        species: req.species,
    };

    state.pets.put(&pet).await?;

    Ok(Json(pet.into()))
}

pub async fn delete_pet(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(pet_id): Path<String>,
) -> Result<Json<PetResponse>, AppError> {
    let pet = find_pet(&state, &pet_id).await?;

    if !can_access(&state, &ctx, &pet) {
        return Err(AppError::Forbidden);
    }

    state.pets.delete(&pet_id).await?;
    tracing::info!(%pet_id, by = %ctx.principal, "pet deleted");

    Ok(Json(pet.into()))
}
