//! Tests for identity value types.

use super::*;
use rstest::rstest;

#[rstest]
#[case("ana@example.com", "ana@example.com")]
#[case("  Ana@Example.COM ", "ana@example.com")]
#[case("first.last+tag@sub.example.org", "first.last+tag@sub.example.org")]
fn email_is_normalised(#[case] raw: &str, #[case] expected: &str) {
    let email = Email::parse(raw).expect("valid email");
    assert_eq!(email.as_ref(), expected);
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("   ", UserValidationError::EmptyEmail)]
#[case("no-at-sign", UserValidationError::InvalidEmail)]
#[case("ana@example", UserValidationError::InvalidEmail)]
#[case("ana @example.com", UserValidationError::InvalidEmail)]
fn email_rejects_malformed_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Email::parse(raw), Err(expected));
}

#[rstest]
#[case("+34600111222", true)]
#[case("600111222", true)]
#[case("1234567", false)]
#[case("+34 600 111 222", false)]
#[case("phone", false)]
fn phone_format(#[case] raw: &str, #[case] valid: bool) {
    assert_eq!(validate_phone(raw).is_ok(), valid);
}

#[rstest]
#[case("admin", Role::Admin)]
#[case("user", Role::User)]
fn role_parses_storage_names(#[case] raw: &str, #[case] expected: Role) {
    let role: Role = raw.parse().expect("known role");
    assert_eq!(role, expected);
    assert_eq!(role.as_str(), raw);
}

#[rstest]
fn role_rejects_unknown_names() {
    let err = "root".parse::<Role>().expect_err("unknown role");
    assert_eq!(err, UserValidationError::UnknownRole("root".to_owned()));
}

#[rstest]
fn personal_patch_only_touches_present_fields() {
    let mut info = PersonalInfo {
        first_name: Some("Ana".to_owned()),
        last_name: Some("García".to_owned()),
        phone: None,
        nif: Some("12345678Z".to_owned()),
    };
    let patch = PersonalInfoPatch {
        last_name: Some("López".to_owned()),
        phone: Some("+34600111222".to_owned()),
        ..PersonalInfoPatch::default()
    };
    assert!(!patch.is_empty());
    patch.apply(&mut info);
    assert_eq!(info.first_name.as_deref(), Some("Ana"));
    assert_eq!(info.last_name.as_deref(), Some("López"));
    assert_eq!(info.phone.as_deref(), Some("+34600111222"));
    assert_eq!(info.nif.as_deref(), Some("12345678Z"));
}

#[rstest]
fn company_patch_rejects_unknown_fields() {
    let result: Result<CompanyInfoPatch, _> =
        serde_json::from_value(serde_json::json!({ "name": "Acme", "owner": "x" }));
    assert!(result.is_err());
}

#[rstest]
fn empty_patches_report_empty() {
    assert!(PersonalInfoPatch::default().is_empty());
    assert!(CompanyInfoPatch::default().is_empty());
}
