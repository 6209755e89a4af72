//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer, the
//! request and response schemas they reference, and the bearer-token
//! security scheme. Swagger UI serves it in debug builds and the
//! `openapi-dump` binary writes it out for external tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    BearerToken, Client, ClientPatch, ClientRequest, CompanyInfo, CompanyInfoPatch, DeliveryNote,
    DeliveryNoteDetails, DeliveryNoteRequest, ErrorCode, LineItem, NoteState, PersonalInfo,
    PersonalInfoPatch, Project, ProjectPatch, ProjectRequest, Role, UserProfile,
};
use crate::inbound::http::clients::ClientStateResponse;
use crate::inbound::http::delivery_notes::{SignResponse, SignatureFormSchema};
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::projects::ProjectStateResponse;
use crate::inbound::http::users::{
    AcceptInvitationRequest, ChangePasswordRequest, CompanyResponse, CredentialsRequest,
    EmailRequest, PersonalResponse, ResetPasswordRequest, SuccessResponse, ValidationRequest,
};

/// Adds the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Token returned by register, login or invitation acceptance.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Albaran API",
        description = "Accounts, clients, projects and signed delivery notes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::validate_email,
        crate::inbound::http::users::request_password_reset,
        crate::inbound::http::users::reset_password,
        crate::inbound::http::users::change_password,
        crate::inbound::http::users::invite,
        crate::inbound::http::users::accept_invitation,
        crate::inbound::http::users::update_personal,
        crate::inbound::http::users::update_company,
        crate::inbound::http::users::profile,
        crate::inbound::http::users::soft_delete,
        crate::inbound::http::users::hard_delete,
        crate::inbound::http::clients::create_client,
        crate::inbound::http::clients::list_clients,
        crate::inbound::http::clients::list_archived_clients,
        crate::inbound::http::clients::get_client,
        crate::inbound::http::clients::update_client,
        crate::inbound::http::clients::delete_client,
        crate::inbound::http::clients::archive_client,
        crate::inbound::http::clients::restore_client,
        crate::inbound::http::projects::create_project,
        crate::inbound::http::projects::list_projects,
        crate::inbound::http::projects::list_archived_projects,
        crate::inbound::http::projects::get_project,
        crate::inbound::http::projects::update_project,
        crate::inbound::http::projects::delete_project,
        crate::inbound::http::projects::archive_project,
        crate::inbound::http::projects::restore_project,
        crate::inbound::http::delivery_notes::create_note,
        crate::inbound::http::delivery_notes::list_notes,
        crate::inbound::http::delivery_notes::get_note,
        crate::inbound::http::delivery_notes::note_pdf,
        crate::inbound::http::delivery_notes::sign_note,
        crate::inbound::http::delivery_notes::delete_note,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorEnvelope,
        ErrorCode,
        BearerToken,
        UserProfile,
        Role,
        PersonalInfo,
        PersonalInfoPatch,
        CompanyInfo,
        CompanyInfoPatch,
        CredentialsRequest,
        ValidationRequest,
        EmailRequest,
        ResetPasswordRequest,
        ChangePasswordRequest,
        AcceptInvitationRequest,
        SuccessResponse,
        PersonalResponse,
        CompanyResponse,
        Client,
        ClientRequest,
        ClientPatch,
        ClientStateResponse,
        Project,
        ProjectRequest,
        ProjectPatch,
        ProjectStateResponse,
        DeliveryNote,
        DeliveryNoteRequest,
        DeliveryNoteDetails,
        LineItem,
        NoteState,
        SignResponse,
        SignatureFormSchema,
    )),
    tags(
        (name = "users", description = "Registration, login and account management"),
        (name = "clients", description = "Clients owned by the caller"),
        (name = "projects", description = "Projects under the caller's clients"),
        (name = "delivery notes", description = "Delivery notes, PDFs and signatures"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
