use super::*;

#[test]
fn status_mapping_covers_client_errors() {
    assert_eq!(AppError::EmailAlreadyExists.status(), StatusCode::CONFLICT);
    assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::MissingClientId.status(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::RoleNotSelfAssignable("admin".into()).status(), StatusCode::FORBIDDEN);
}

#[test]
fn unexpected_errors_are_500() {
    let err = AppError::InternalServerError(anyhow::anyhow!("boom"));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn message_follows_locale() {
    let pt = AppError::InvalidCredentials.to_api_error(&Locale("pt".into()));
    let en = AppError::InvalidCredentials.to_api_error(&Locale("en".into()));
    assert_eq!(pt.error, "E-mail ou senha inválidos.");
    assert_eq!(en.error, "Invalid e-mail or password.");
}

#[test]
fn unsupported_locale_falls_back_to_english() {
    let api = AppError::UserNotFound.to_api_error(&Locale("fr".into()));
    assert_eq!(api.error, "User not found.");
}

#[test]
fn internal_details_never_leak() {
    let api = AppError::InternalServerError(anyhow::anyhow!("password=hunter2")).to_api_error(&Locale::default());
    assert!(!api.error.contains("hunter2"));
    assert!(api.details.is_none());
}

#[test]
fn config_error_names_the_variable() {
    assert_eq!(
        ConfigError::Missing("JWT_SECRET").to_string(),
        "variável de ambiente obrigatória ausente: JWT_SECRET"
    );
}
