use super::*;
use serde_json::json;

// =============================================================================
// self_assignable_role
// =============================================================================

#[test]
fn sign_up_defaults_to_client() {
    assert_eq!(self_assignable_role(None).unwrap(), Role::Client);
    assert_eq!(self_assignable_role(Some("  ")).unwrap(), Role::Client);
}

#[test]
fn tenant_roles_can_be_chosen_at_sign_up() {
    assert_eq!(self_assignable_role(Some("Cooperative")).unwrap(), Role::Cooperative);
    assert_eq!(self_assignable_role(Some("provider")).unwrap(), Role::Provider);
}

#[test]
fn staff_roles_cannot_be_self_assigned() {
    for raw in ["admin", "Super Admin", "technician", "accountant", "stock_manager"] {
        assert!(matches!(self_assignable_role(Some(raw)), Err(AppError::RoleNotSelfAssignable(_))), "{raw}");
    }
}

#[test]
fn unknown_role_is_rejected_not_guessed() {
    assert!(matches!(self_assignable_role(Some("wizard")), Err(AppError::RoleNotSelfAssignable(r)) if r == "wizard"));
}

// =============================================================================
// merge_metadata
// =============================================================================

fn as_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[test]
fn merge_keeps_role_and_unknown_keys() {
    let metadata = as_map(json!({"role": "client", "farm": "Boa Vista", "full_name": "Old"}));
    let changes = UpdateUserPayload { full_name: Some(" New ".into()), ..Default::default() };
    let merged = merge_metadata(metadata, &changes);
    assert_eq!(merged["full_name"], json!("New"));
    assert_eq!(merged["role"], json!("client"));
    assert_eq!(merged["farm"], json!("Boa Vista"));
}

#[test]
fn blank_phone_removes_it() {
    let metadata = as_map(json!({"phone": "123"}));
    let changes = UpdateUserPayload { phone: Some("".into()), ..Default::default() };
    assert!(!merge_metadata(metadata, &changes).contains_key("phone"));
}

#[test]
fn empty_changes_are_a_no_op() {
    let metadata = as_map(json!({"role": "admin", "phone": "1"}));
    assert_eq!(merge_metadata(metadata.clone(), &UpdateUserPayload::default()), metadata);
}

// =============================================================================
// cadastro
// =============================================================================

fn sign_up_input(phone: Option<&str>) -> SignUp<'_> {
    SignUp { email: "ana@farm.com", password: "secret", full_name: " Ana ", phone, role: None }
}

#[test]
fn blank_phone_is_dropped_from_metadata_and_profile() {
    let input = sign_up_input(Some("   "));
    let metadata = sign_up_metadata(&input, Role::Client);
    let profile = sign_up_profile(Uuid::new_v4(), "ana@farm.com", &input, Role::Client);
    assert!(!metadata.contains_key("phone"));
    assert_eq!(profile.phone, None);
}

#[test]
fn phone_is_trimmed_the_same_way_in_both_records() {
    let input = sign_up_input(Some(" 11 9999-0000 "));
    let metadata = sign_up_metadata(&input, Role::Provider);
    let profile = sign_up_profile(Uuid::new_v4(), "ana@farm.com", &input, Role::Provider);
    assert_eq!(metadata["phone"], json!("11 9999-0000"));
    assert_eq!(profile.phone.as_deref(), Some("11 9999-0000"));
    assert_eq!(metadata["role"], json!("provider"));
    assert_eq!(profile.role.as_deref(), Some("provider"));
    assert_eq!(profile.full_name.as_deref(), Some("Ana"));
}

// =============================================================================
// bearer
// =============================================================================

fn session_with_token(token: &str) -> Session {
    Session {
        access_token: token.into(),
        expires_at: Utc::now(),
        user: UserIdentity { id: Uuid::new_v4(), email: "a@farm.com".into(), metadata: Map::new(), email_confirmed_at: None },
    }
}

#[test]
fn only_the_session_token_is_accepted() {
    let session = session_with_token("abc");
    assert!(bearer_matches(&session, Some("abc")).is_ok());
    assert!(matches!(bearer_matches(&session, Some("xyz")), Err(AppError::InvalidToken)));
    assert!(matches!(bearer_matches(&session, None), Err(AppError::InvalidToken)));
}
