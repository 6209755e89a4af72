//! Client API handlers.
//!
//! ```text
//! POST   /api/clients                 {"name","email","phone","address"}
//! GET    /api/clients                 active clients
//! GET    /api/clients/archived/all    archived clients
//! GET    /api/clients/{id}
//! PUT    /api/clients/{id}            partial update
//! DELETE /api/clients/{id}
//! PATCH  /api/clients/{id}/archive
//! PATCH  /api/clients/{id}/restore
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{ArchiveFilter, Client, ClientId, ClientPatch, ClientRequest, NewClient};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::SuccessResponse;

/// Archive-state change result.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClientStateResponse {
    pub success: bool,
    pub client: Client,
}

/// Create a client for the caller.
#[utoipa::path(
    post,
    path = "/api/clients",
    request_body = ClientRequest,
    responses(
        (status = 201, description = "Created", body = Client),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 409, description = "Name already used", body = ErrorEnvelope),
    ),
    tags = ["clients"],
    operation_id = "createClient"
)]
#[post("")]
pub async fn create_client(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    payload: web::Json<ClientRequest>,
) -> ApiResult<HttpResponse> {
    let client = NewClient::try_from(payload.into_inner())?;
    let created = state.clients.create(&user, client).await?;
    Ok(HttpResponse::Created().json(created))
}

/// List the caller's active clients.
#[utoipa::path(
    get,
    path = "/api/clients",
    responses(
        (status = 200, description = "Active clients", body = [Client]),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
    ),
    tags = ["clients"],
    operation_id = "listClients"
)]
#[get("")]
pub async fn list_clients(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
) -> ApiResult<web::Json<Vec<Client>>> {
    let clients = state
        .clients_query
        .list(&user.id, ArchiveFilter::Active)
        .await?;
    Ok(web::Json(clients))
}

/// List the caller's archived clients.
#[utoipa::path(
    get,
    path = "/api/clients/archived/all",
    responses(
        (status = 200, description = "Archived clients", body = [Client]),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
    ),
    tags = ["clients"],
    operation_id = "listArchivedClients"
)]
#[get("/archived/all")]
pub async fn list_archived_clients(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
) -> ApiResult<web::Json<Vec<Client>>> {
    let clients = state
        .clients_query
        .list(&user.id, ArchiveFilter::Archived)
        .await?;
    Ok(web::Json(clients))
}

#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    params(("id" = Uuid, Path, description = "Client identifier")),
    responses(
        (status = 200, description = "Client", body = Client),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tags = ["clients"],
    operation_id = "getClient"
)]
#[get("/{id}")]
pub async fn get_client(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Client>> {
    let id = ClientId::new(path.into_inner());
    let client = state.clients_query.get(&user.id, &id).await?;
    Ok(web::Json(client))
}

/// Apply a partial update. Unknown fields are rejected.
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    params(("id" = Uuid, Path, description = "Client identifier")),
    request_body = ClientPatch,
    responses(
        (status = 200, description = "Updated", body = Client),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 409, description = "Name already used", body = ErrorEnvelope),
    ),
    tags = ["clients"],
    operation_id = "updateClient"
)]
#[put("/{id}")]
pub async fn update_client(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    path: web::Path<Uuid>,
    payload: web::Json<ClientPatch>,
) -> ApiResult<web::Json<Client>> {
    let id = ClientId::new(path.into_inner());
    let client = state
        .clients
        .update(&user.id, &id, payload.into_inner())
        .await?;
    Ok(web::Json(client))
}

/// Delete a client nothing references.
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    params(("id" = Uuid, Path, description = "Client identifier")),
    responses(
        (status = 200, description = "Deleted", body = SuccessResponse),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 409, description = "Client still has projects", body = ErrorEnvelope),
    ),
    tags = ["clients"],
    operation_id = "deleteClient"
)]
#[delete("/{id}")]
pub async fn delete_client(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<SuccessResponse>> {
    let id = ClientId::new(path.into_inner());
    state.clients.delete(&user.id, &id).await?;
    Ok(web::Json(SuccessResponse::ok()))
}

#[utoipa::path(
    patch,
    path = "/api/clients/{id}/archive",
    params(("id" = Uuid, Path, description = "Client identifier")),
    responses(
        (status = 200, description = "Archived", body = ClientStateResponse),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tags = ["clients"],
    operation_id = "archiveClient"
)]
#[patch("/{id}/archive")]
pub async fn archive_client(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ClientStateResponse>> {
    let id = ClientId::new(path.into_inner());
    let client = state.clients.archive(&user.id, &id).await?;
    Ok(web::Json(ClientStateResponse {
        success: true,
        client,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/clients/{id}/restore",
    params(("id" = Uuid, Path, description = "Client identifier")),
    responses(
        (status = 200, description = "Restored", body = ClientStateResponse),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tags = ["clients"],
    operation_id = "restoreClient"
)]
#[patch("/{id}/restore")]
pub async fn restore_client(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ClientStateResponse>> {
    let id = ClientId::new(path.into_inner());
    let client = state.clients.restore(&user.id, &id).await?;
    Ok(web::Json(ClientStateResponse {
        success: true,
        client,
    }))
}

/// Mount the client routes on a `/clients` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_client)
        .service(list_clients)
        .service(list_archived_clients)
        .service(get_client)
        .service(update_client)
        .service(delete_client)
        .service(archive_client)
        .service(restore_client);
}
