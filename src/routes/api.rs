use actix_web::error::BlockingError;
use actix_web::{HttpResponse, Responder, delete, get, patch, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde::Serialize;

use crate::forms::listings::{
    AddListingForm, AddListingFormPayload, UpdateListingForm, UpdateListingFormPayload,
};
use crate::matching::MatchEngine;
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::listings::{
    ListingsQueryParams, create_listing as create_listing_service,
    delete_listing as delete_listing_service, get_listing as get_listing_service,
    rematch_listing as rematch_listing_service, show_listings as show_listings_service,
    show_my_listings as show_my_listings_service, update_listing as update_listing_service,
};
use crate::services::matches::{
    mark_notification_read as mark_notification_read_service,
    show_my_matches as show_my_matches_service,
    show_my_notifications as show_my_notifications_service,
};
use crate::services::{ServiceError, ServiceResult};

/// Registers the `/api/v1` endpoints. `/listings/my` comes before
/// `/listings/{listing_id}` so it is not parsed as an id.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(show_listings)
        .service(show_my_listings)
        .service(get_listing)
        .service(create_listing)
        .service(update_listing)
        .service(delete_listing)
        .service(rematch_listing)
        .service(show_my_matches)
        .service(show_my_notifications)
        .service(mark_notification_read);
}

fn json_response<T: Serialize>(result: ServiceResult<T>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(err) => error_response(err),
    }
}

fn blocking_response<T, F>(
    result: Result<ServiceResult<T>, BlockingError>,
    on_success: F,
) -> HttpResponse
where
    F: FnOnce(T) -> HttpResponse,
{
    match result {
        Ok(Ok(value)) => on_success(value),
        Ok(Err(err)) => error_response(err),
        Err(e) => {
            log::error!("Blocking task failed: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/listings")]
pub async fn show_listings(
    params: web::Query<ListingsQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(show_listings_service(
        params.into_inner(),
        &user,
        repo.get_ref(),
    ))
}

#[get("/listings/my")]
pub async fn show_my_listings(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(show_my_listings_service(&user, repo.get_ref()))
}

#[get("/listings/{listing_id}")]
pub async fn get_listing(
    listing_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(get_listing_service(
        listing_id.into_inner(),
        &user,
        repo.get_ref(),
    ))
}

#[post("/listings")]
pub async fn create_listing(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    engine: web::Data<MatchEngine>,
    web::Json(form): web::Json<AddListingForm>,
) -> impl Responder {
    let payload: AddListingFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => return error_response(ServiceError::from(e)),
    };

    let result = web::block(move || {
        create_listing_service(payload, &user, repo.get_ref(), engine.get_ref())
    })
    .await;

    blocking_response(result, |saved| HttpResponse::Created().json(saved))
}

#[patch("/listings/{listing_id}")]
pub async fn update_listing(
    listing_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    engine: web::Data<MatchEngine>,
    web::Json(form): web::Json<UpdateListingForm>,
) -> impl Responder {
    let payload: UpdateListingFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => return error_response(ServiceError::from(e)),
    };
    let listing_id = listing_id.into_inner();

    let result = web::block(move || {
        update_listing_service(
            listing_id,
            payload,
            &user,
            repo.get_ref(),
            engine.get_ref(),
        )
    })
    .await;

    blocking_response(result, |saved| HttpResponse::Ok().json(saved))
}

#[delete("/listings/{listing_id}")]
pub async fn delete_listing(
    listing_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let listing_id = listing_id.into_inner();

    let result =
        web::block(move || delete_listing_service(listing_id, &user, repo.get_ref())).await;

    blocking_response(result, |()| HttpResponse::NoContent().finish())
}

/// Retries the matching pass of a listing, e.g. after a save that came back
/// with `matching_failed`.
#[post("/listings/{listing_id}/rematch")]
pub async fn rematch_listing(
    listing_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    engine: web::Data<MatchEngine>,
) -> impl Responder {
    let listing_id = listing_id.into_inner();

    let result = web::block(move || {
        rematch_listing_service(listing_id, &user, repo.get_ref(), engine.get_ref())
    })
    .await;

    blocking_response(result, |matches| HttpResponse::Ok().json(matches))
}

#[get("/matches/my")]
pub async fn show_my_matches(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(show_my_matches_service(&user, repo.get_ref()))
}

#[get("/notifications/my")]
pub async fn show_my_notifications(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(show_my_notifications_service(&user, repo.get_ref()))
}

#[patch("/notifications/{notification_id}/read")]
pub async fn mark_notification_read(
    notification_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match mark_notification_read_service(notification_id.into_inner(), &user, repo.get_ref()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}
