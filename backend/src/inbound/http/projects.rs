//! Project API handlers.
//!
//! ```text
//! POST   /api/projects                 {"title","description","client"}
//! GET    /api/projects                 active projects
//! GET    /api/projects/archived/all    archived projects
//! GET    /api/projects/{id}
//! PUT    /api/projects/{id}            {"title","description"}
//! DELETE /api/projects/{id}
//! PATCH  /api/projects/{id}/archive
//! PATCH  /api/projects/{id}/restore
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{ArchiveFilter, NewProject, Project, ProjectId, ProjectPatch, ProjectRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::SuccessResponse;

/// Archive-state change result.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectStateResponse {
    pub success: bool,
    pub project: Project,
}

/// Create a project under one of the caller's clients.
#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = ProjectRequest,
    responses(
        (status = 201, description = "Created", body = Project),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 404, description = "Client not found", body = ErrorEnvelope),
        (status = 409, description = "Title already used for this client", body = ErrorEnvelope),
    ),
    tags = ["projects"],
    operation_id = "createProject"
)]
#[post("")]
pub async fn create_project(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    payload: web::Json<ProjectRequest>,
) -> ApiResult<HttpResponse> {
    let project = NewProject::try_from(payload.into_inner())?;
    let created = state.projects.create(&user, project).await?;
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    get,
    path = "/api/projects",
    responses(
        (status = 200, description = "Active projects", body = [Project]),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
    ),
    tags = ["projects"],
    operation_id = "listProjects"
)]
#[get("")]
pub async fn list_projects(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
) -> ApiResult<web::Json<Vec<Project>>> {
    let projects = state
        .projects_query
        .list(&user.id, ArchiveFilter::Active)
        .await?;
    Ok(web::Json(projects))
}

#[utoipa::path(
    get,
    path = "/api/projects/archived/all",
    responses(
        (status = 200, description = "Archived projects", body = [Project]),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
    ),
    tags = ["projects"],
    operation_id = "listArchivedProjects"
)]
#[get("/archived/all")]
pub async fn list_archived_projects(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
) -> ApiResult<web::Json<Vec<Project>>> {
    let projects = state
        .projects_query
        .list(&user.id, ArchiveFilter::Archived)
        .await?;
    Ok(web::Json(projects))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(("id" = Uuid, Path, description = "Project identifier")),
    responses(
        (status = 200, description = "Project", body = Project),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tags = ["projects"],
    operation_id = "getProject"
)]
#[get("/{id}")]
pub async fn get_project(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Project>> {
    let id = ProjectId::new(path.into_inner());
    let project = state.projects_query.get(&user.id, &id).await?;
    Ok(web::Json(project))
}

/// Update title or description. The client cannot be changed.
#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    params(("id" = Uuid, Path, description = "Project identifier")),
    request_body = ProjectPatch,
    responses(
        (status = 200, description = "Updated", body = Project),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 409, description = "Title already used for this client", body = ErrorEnvelope),
    ),
    tags = ["projects"],
    operation_id = "updateProject"
)]
#[put("/{id}")]
pub async fn update_project(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    path: web::Path<Uuid>,
    payload: web::Json<ProjectPatch>,
) -> ApiResult<web::Json<Project>> {
    let id = ProjectId::new(path.into_inner());
    let project = state
        .projects
        .update(&user.id, &id, payload.into_inner())
        .await?;
    Ok(web::Json(project))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    params(("id" = Uuid, Path, description = "Project identifier")),
    responses(
        (status = 200, description = "Deleted", body = SuccessResponse),
        (status = 404, description = "Not found", body = ErrorEnvelope),
        (status = 409, description = "Project still has delivery notes", body = ErrorEnvelope),
    ),
    tags = ["projects"],
    operation_id = "deleteProject"
)]
#[delete("/{id}")]
pub async fn delete_project(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<SuccessResponse>> {
    let id = ProjectId::new(path.into_inner());
    state.projects.delete(&user.id, &id).await?;
    Ok(web::Json(SuccessResponse::ok()))
}

#[utoipa::path(
    patch,
    path = "/api/projects/{id}/archive",
    params(("id" = Uuid, Path, description = "Project identifier")),
    responses(
        (status = 200, description = "Archived", body = ProjectStateResponse),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tags = ["projects"],
    operation_id = "archiveProject"
)]
#[patch("/{id}/archive")]
pub async fn archive_project(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ProjectStateResponse>> {
    let id = ProjectId::new(path.into_inner());
    let project = state.projects.archive(&user.id, &id).await?;
    Ok(web::Json(ProjectStateResponse {
        success: true,
        project,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/projects/{id}/restore",
    params(("id" = Uuid, Path, description = "Project identifier")),
    responses(
        (status = 200, description = "Restored", body = ProjectStateResponse),
        (status = 404, description = "Not found", body = ErrorEnvelope),
    ),
    tags = ["projects"],
    operation_id = "restoreProject"
)]
#[patch("/{id}/restore")]
pub async fn restore_project(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ProjectStateResponse>> {
    let id = ProjectId::new(path.into_inner());
    let project = state.projects.restore(&user.id, &id).await?;
    Ok(web::Json(ProjectStateResponse {
        success: true,
        project,
    }))
}

/// Mount the project routes on a `/projects` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_project)
        .service(list_projects)
        .service(list_archived_projects)
        .service(get_project)
        .service(update_project)
        .service(delete_project)
        .service(archive_project)
        .service(restore_project);
}

#[cfg(test)]
mod tests {
    //! Exercises handler wiring with mocked driving ports.

    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::test as actix_test;
    use mockall::predicate::eq;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::{ClientId, Error};
    use crate::domain::ports::{MockProjectCommand, MockProjectQuery};
    use crate::test_support::{TestApp, build_app};

    fn sample_project(owner: &crate::domain::User) -> Project {
        Project {
            id: ProjectId::random(),
            owner_id: owner.id,
            client_id: ClientId::random(),
            title: "Roof repair".to_owned(),
            description: None,
            company_name: Some("Acme".to_owned()),
            is_archived: false,
            archived_at: None,
            created_at: owner.created_at,
            updated_at: owner.created_at,
        }
    }

    #[actix_web::test]
    async fn create_passes_validated_fields_to_the_port() {
        let harness = TestApp::new();
        let user = harness.seed_user("owner@example.com");
        let client = ClientId::random();
        let project = sample_project(&user);
        let mut command = MockProjectCommand::new();
        command
            .expect_create()
            .withf(move |_, new| new.title == "Roof repair" && new.client_id == client)
            .times(1)
            .return_once(move |_, _| Ok(project));
        let mut state = harness.http_state();
        state.projects = Arc::new(command);
        let app = actix_test::init_service(build_app(state)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/projects")
            .insert_header((AUTHORIZATION, harness.bearer_for(&user)))
            .set_json(json!({ "title": " Roof repair ", "client": client.as_uuid() }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["title"], "Roof repair");
        assert_eq!(body["companyName"], "Acme");
    }

    #[actix_web::test]
    async fn create_without_client_is_rejected_before_the_port() {
        let harness = TestApp::new();
        let user = harness.seed_user("owner@example.com");
        let mut command = MockProjectCommand::new();
        command.expect_create().never();
        let mut state = harness.http_state();
        state.projects = Arc::new(command);
        let app = actix_test::init_service(build_app(state)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/projects")
            .insert_header((AUTHORIZATION, harness.bearer_for(&user)))
            .set_json(json!({ "title": "Roof repair" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["errors"]["field"], "client");
    }

    #[actix_web::test]
    async fn archived_listing_uses_archived_filter() {
        let harness = TestApp::new();
        let user = harness.seed_user("owner@example.com");
        let owner = user.id;
        let mut query = MockProjectQuery::new();
        query
            .expect_list()
            .with(eq(owner), eq(ArchiveFilter::Archived))
            .times(1)
            .return_once(|_, _| Ok(Vec::new()));
        let mut state = harness.http_state();
        state.projects_query = Arc::new(query);
        let app = actix_test::init_service(build_app(state)).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/projects/archived/all")
            .insert_header((AUTHORIZATION, harness.bearer_for(&user)))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn delete_blocked_by_notes_is_conflict() {
        let harness = TestApp::new();
        let user = harness.seed_user("owner@example.com");
        let mut command = MockProjectCommand::new();
        command.expect_delete().times(1).return_once(|_, _| {
            Err(Error::conflict("project still has delivery notes")
                .with_details(json!({ "code": "resource_in_use" })))
        });
        let mut state = harness.http_state();
        state.projects = Arc::new(command);
        let app = actix_test::init_service(build_app(state)).await;

        let request = actix_test::TestRequest::delete()
            .uri(&format!("/api/projects/{}", ProjectId::random()))
            .insert_header((AUTHORIZATION, harness.bearer_for(&user)))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["errors"]["code"], "resource_in_use");
    }
}
