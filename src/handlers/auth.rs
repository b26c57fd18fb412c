// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::BearerToken, client::ClientContext, i18n::Locale},
    models::auth::{
        AuthResponse, LoginUserPayload, RegisterUserPayload, ResendVerificationPayload, UpdateUserPayload,
        UserIdentity,
    },
    services::auth::SignUp,
};

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    params(
        ("x-client-id" = Uuid, Header, description = "Instância de aplicação (navegador)")
    ),
    responses(
        (status = 201, description = "Usuário criado e sessão iniciada", body = AuthResponse),
        (status = 400, description = "Payload inválido"),
        (status = 403, description = "Papel não pode ser escolhido no cadastro"),
        (status = 409, description = "E-mail já em uso")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    client: ClientContext,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let session = app_state
        .auth_service
        .sign_up(
            client.0,
            SignUp {
                email: &payload.email,
                password: &payload.password,
                full_name: &payload.full_name,
                phone: payload.phone.as_deref(),
                role: payload.role.as_deref(),
            },
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    // O store do cliente já vê a nova sessão quando a resposta sai
    app_state.registry.sync(client.0).await;

    Ok((StatusCode::CREATED, Json(AuthResponse::from(session))))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    params(
        ("x-client-id" = Uuid, Header, description = "Instância de aplicação (navegador)")
    ),
    responses(
        (status = 200, description = "Sessão iniciada", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    client: ClientContext,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let session = app_state
        .auth_service
        .sign_in(client.0, &payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    app_state.registry.sync(client.0).await;

    Ok(Json(AuthResponse::from(session)))
}

// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    params(
        ("x-client-id" = Uuid, Header, description = "Instância de aplicação (navegador)")
    ),
    responses(
        (status = 204, description = "Sessão encerrada"),
        (status = 401, description = "Token não corresponde à sessão do cliente")
    ),
    security(("api_jwt" = []))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    locale: Locale,
    client: ClientContext,
    bearer: BearerToken,
) -> Result<StatusCode, ApiError> {
    app_state
        .auth_service
        .sign_out(client.0, bearer.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    // Aplica a saída no store antes de responder e libera o cliente
    app_state.registry.sync(client.0).await;
    app_state.registry.remove(client.0).await;

    Ok(StatusCode::NO_CONTENT)
}

// PATCH /api/auth/user
#[utoipa::path(
    patch,
    path = "/api/auth/user",
    tag = "Auth",
    request_body = UpdateUserPayload,
    params(
        ("x-client-id" = Uuid, Header, description = "Instância de aplicação (navegador)")
    ),
    responses(
        (status = 200, description = "Usuário atualizado", body = UserIdentity),
        (status = 401, description = "Sem sessão ou token não corresponde")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    locale: Locale,
    client: ClientContext,
    bearer: BearerToken,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<UserIdentity>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let session = app_state
        .auth_service
        .update_user(client.0, bearer.as_deref(), &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    app_state.registry.sync(client.0).await;

    Ok(Json(session.user))
}

// POST /api/auth/resend-verification
#[utoipa::path(
    post,
    path = "/api/auth/resend-verification",
    tag = "Auth",
    request_body = ResendVerificationPayload,
    responses(
        (status = 202, description = "Pedido aceito (não revela se o e-mail existe)")
    )
)]
pub async fn resend_verification(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<ResendVerificationPayload>,
) -> Result<StatusCode, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    app_state
        .auth_service
        .resend_verification(&payload.email)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::ACCEPTED)
}
