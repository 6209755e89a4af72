//! Account API handlers.
//!
//! ```text
//! POST   /api/users/register                {"email","password"}
//! POST   /api/users/login                   {"email","password"}
//! PUT    /api/users/validation              {"code"}
//! POST   /api/users/password-reset/request  {"email"}
//! POST   /api/users/password-reset/reset    {"token","newPassword"}
//! PUT    /api/users/password                {"currentPassword","newPassword"}
//! POST   /api/users/invite                  {"email"}
//! POST   /api/users/invitation/accept       {"email","inviteCode","password"}
//! PUT    /api/users                         personal fields
//! PATCH  /api/users/company                 company fields
//! GET    /api/users/profile
//! DELETE /api/users/soft
//! DELETE /api/users/hard
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    BearerToken, CompanyInfo, CompanyInfoPatch, Credentials, PersonalInfo, PersonalInfoPatch,
    UserProfile,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{Authenticated, PendingValidation};
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    EMAIL, FieldName, PASSWORD, credentials_error, existing_password, new_password, parse_email,
    required,
};

const NEW_PASSWORD: FieldName = FieldName::new("newPassword");

/// Email and password pair for registration and login.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `PUT /api/users/validation`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ValidationRequest {
    pub code: Option<String>,
}

/// Body carrying a single email address.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EmailRequest {
    pub email: Option<String>,
}

/// Body of `POST /api/users/password-reset/reset`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub new_password: Option<String>,
}

/// Body of `PUT /api/users/password`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Body of `POST /api/users/invitation/accept`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitationRequest {
    pub email: Option<String>,
    pub invite_code: Option<String>,
    pub password: Option<String>,
}

/// `{"success": true}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub(crate) fn ok() -> Self {
        Self { success: true }
    }
}

/// Result of a personal-data update.
#[derive(Debug, Serialize, ToSchema)]
pub struct PersonalResponse {
    pub success: bool,
    pub personal: PersonalInfo,
}

/// Result of a company-data update.
#[derive(Debug, Serialize, ToSchema)]
pub struct CompanyResponse {
    pub success: bool,
    pub company: CompanyInfo,
}

fn credentials(
    payload: CredentialsRequest,
    build: fn(&str, &str) -> Result<Credentials, crate::domain::CredentialsValidationError>,
) -> ApiResult<Credentials> {
    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();
    build(&email, &password).map_err(|err| credentials_error(err, PASSWORD))
}

/// Register a new identity and email its validation code.
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Registered", body = BearerToken),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 409, description = "Email already registered", body = ErrorEnvelope),
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = credentials(payload.into_inner(), Credentials::for_registration)?;
    let token = state.accounts.register(credentials).await?;
    Ok(HttpResponse::Created().json(token))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Logged in", body = BearerToken),
        (status = 400, description = "Invalid credentials", body = ErrorEnvelope),
        (status = 403, description = "Email not validated", body = ErrorEnvelope),
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<BearerToken>> {
    let credentials = credentials(payload.into_inner(), Credentials::for_login)?;
    let token = state.accounts.login(credentials).await?;
    Ok(web::Json(token))
}

/// Consume the emailed validation code.
#[utoipa::path(
    put,
    path = "/api/users/validation",
    request_body = ValidationRequest,
    responses(
        (status = 200, description = "Email validated", body = SuccessResponse),
        (status = 400, description = "Wrong code", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
    ),
    tags = ["users"],
    operation_id = "validateEmail"
)]
#[put("/validation")]
pub async fn validate_email(
    state: web::Data<HttpState>,
    PendingValidation(user): PendingValidation,
    payload: web::Json<ValidationRequest>,
) -> ApiResult<web::Json<SuccessResponse>> {
    let code = required(payload.into_inner().code, FieldName::new("code"))?;
    state.accounts.validate_email(&user, code.trim()).await?;
    Ok(web::Json(SuccessResponse::ok()))
}

/// Email a password-reset link. Succeeds whether or not the email is known.
#[utoipa::path(
    post,
    path = "/api/users/password-reset/request",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Request accepted", body = SuccessResponse),
        (status = 400, description = "Missing email", body = ErrorEnvelope),
    ),
    tags = ["users"],
    operation_id = "requestPasswordReset",
    security([])
)]
#[post("/password-reset/request")]
pub async fn request_password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<EmailRequest>,
) -> ApiResult<web::Json<SuccessResponse>> {
    let email = required(payload.into_inner().email, EMAIL)?;
    state.accounts.request_password_reset(&email).await?;
    Ok(web::Json(SuccessResponse::ok()))
}

/// Replace the password using an emailed reset token.
#[utoipa::path(
    post,
    path = "/api/users/password-reset/reset",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = SuccessResponse),
        (status = 400, description = "Invalid or expired token", body = ErrorEnvelope),
    ),
    tags = ["users"],
    operation_id = "resetPassword",
    security([])
)]
#[post("/password-reset/reset")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    payload: web::Json<ResetPasswordRequest>,
) -> ApiResult<web::Json<SuccessResponse>> {
    let ResetPasswordRequest {
        token,
        new_password: raw_password,
    } = payload.into_inner();
    let token = required(token, FieldName::new("token"))?;
    let password = new_password(raw_password, NEW_PASSWORD)?;
    state.accounts.reset_password(token.trim(), password).await?;
    Ok(web::Json(SuccessResponse::ok()))
}

/// Replace the password after checking the current one.
#[utoipa::path(
    put,
    path = "/api/users/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = SuccessResponse),
        (status = 400, description = "Current password mismatch", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
    ),
    tags = ["users"],
    operation_id = "changePassword"
)]
#[put("/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<web::Json<SuccessResponse>> {
    let ChangePasswordRequest {
        current_password,
        new_password: raw_password,
    } = payload.into_inner();
    let current = existing_password(current_password, FieldName::new("currentPassword"))?;
    let password = new_password(raw_password, NEW_PASSWORD)?;
    state
        .accounts
        .change_password(&user, current, password)
        .await?;
    Ok(web::Json(SuccessResponse::ok()))
}

/// Invite a colleague into the caller's company.
#[utoipa::path(
    post,
    path = "/api/users/invite",
    request_body = EmailRequest,
    responses(
        (status = 201, description = "Invitation sent", body = UserProfile),
        (status = 400, description = "Invalid email", body = ErrorEnvelope),
        (status = 409, description = "Email already registered", body = ErrorEnvelope),
    ),
    tags = ["users"],
    operation_id = "inviteUser"
)]
#[post("/invite")]
pub async fn invite(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    payload: web::Json<EmailRequest>,
) -> ApiResult<HttpResponse> {
    let email = parse_email(payload.into_inner().email, EMAIL)?;
    let invited = state.accounts.invite(&user, email).await?;
    Ok(HttpResponse::Created().json(invited))
}

/// Accept an invitation and set a password.
#[utoipa::path(
    post,
    path = "/api/users/invitation/accept",
    request_body = AcceptInvitationRequest,
    responses(
        (status = 200, description = "Invitation accepted", body = BearerToken),
        (status = 400, description = "Invalid invitation", body = ErrorEnvelope),
    ),
    tags = ["users"],
    operation_id = "acceptInvitation",
    security([])
)]
#[post("/invitation/accept")]
pub async fn accept_invitation(
    state: web::Data<HttpState>,
    payload: web::Json<AcceptInvitationRequest>,
) -> ApiResult<web::Json<BearerToken>> {
    let AcceptInvitationRequest {
        email,
        invite_code,
        password,
    } = payload.into_inner();
    let email = parse_email(email, EMAIL)?;
    let invite_code = required(invite_code, FieldName::new("inviteCode"))?;
    let password = new_password(password, PASSWORD)?;
    let token = state
        .accounts
        .accept_invitation(email, invite_code.trim(), password)
        .await?;
    Ok(web::Json(token))
}

/// Update personal data.
#[utoipa::path(
    put,
    path = "/api/users",
    request_body = PersonalInfoPatch,
    responses(
        (status = 200, description = "Updated", body = PersonalResponse),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
    ),
    tags = ["users"],
    operation_id = "updatePersonalData"
)]
#[put("")]
pub async fn update_personal(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    payload: web::Json<PersonalInfoPatch>,
) -> ApiResult<web::Json<PersonalResponse>> {
    let personal = state
        .accounts
        .update_personal(&user, payload.into_inner())
        .await?;
    Ok(web::Json(PersonalResponse {
        success: true,
        personal,
    }))
}

/// Update company data.
#[utoipa::path(
    patch,
    path = "/api/users/company",
    request_body = CompanyInfoPatch,
    responses(
        (status = 200, description = "Updated", body = CompanyResponse),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
    ),
    tags = ["users"],
    operation_id = "updateCompanyData"
)]
#[patch("/company")]
pub async fn update_company(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
    payload: web::Json<CompanyInfoPatch>,
) -> ApiResult<web::Json<CompanyResponse>> {
    let company = state
        .accounts
        .update_company(&user, payload.into_inner())
        .await?;
    Ok(web::Json(CompanyResponse {
        success: true,
        company,
    }))
}

/// The caller's identity without secrets.
#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
    ),
    tags = ["users"],
    operation_id = "getProfile"
)]
#[get("/profile")]
pub async fn profile(Authenticated(user): Authenticated) -> web::Json<UserProfile> {
    web::Json(UserProfile::from(&user))
}

/// Mark the caller's identity as deleted.
#[utoipa::path(
    delete,
    path = "/api/users/soft",
    responses(
        (status = 200, description = "Deleted", body = SuccessResponse),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
    ),
    tags = ["users"],
    operation_id = "softDeleteUser"
)]
#[delete("/soft")]
pub async fn soft_delete(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
) -> ApiResult<web::Json<SuccessResponse>> {
    state.accounts.soft_delete(&user).await?;
    Ok(web::Json(SuccessResponse::ok()))
}

/// Remove the caller's identity. Fails while it still owns resources.
#[utoipa::path(
    delete,
    path = "/api/users/hard",
    responses(
        (status = 200, description = "Removed", body = SuccessResponse),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 409, description = "Identity still owns resources", body = ErrorEnvelope),
    ),
    tags = ["users"],
    operation_id = "hardDeleteUser"
)]
#[delete("/hard")]
pub async fn hard_delete(
    state: web::Data<HttpState>,
    Authenticated(user): Authenticated,
) -> ApiResult<web::Json<SuccessResponse>> {
    state.accounts.hard_delete(&user).await?;
    Ok(web::Json(SuccessResponse::ok()))
}

/// Mount the account routes on a `/users` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(validate_email)
        .service(request_password_reset)
        .service(reset_password)
        .service(change_password)
        .service(invite)
        .service(accept_invitation)
        .service(update_personal)
        .service(update_company)
        .service(profile)
        .service(soft_delete)
        .service(hard_delete);
}
