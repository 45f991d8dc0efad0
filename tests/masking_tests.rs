use dispatch_service::utils::{mask_optional, mask_recipient};

/// Test: Long recipients keep only their first and last two characters
#[test]
fn test_long_recipient_keeps_edges_only() {
    assert_eq!(mask_recipient("ab@example.com"), "ab****om");
    assert_eq!(mask_recipient("+15551230000"), "+1****00");
}

/// Test: Recipients of four characters or fewer are fully masked
#[test]
fn test_short_recipient_fully_masked() {
    assert_eq!(mask_recipient("1234"), "****");
    assert_eq!(mask_recipient("a1"), "****");
    assert_eq!(mask_recipient(""), "****");
}

/// Test: Five characters is the first length where edges survive
#[test]
fn test_mask_boundary_length() {
    assert_eq!(mask_recipient("abcde"), "ab****de");
}

/// Test: Masking counts characters, not bytes
#[test]
fn test_mask_multibyte_recipient() {
    assert_eq!(mask_recipient("üser@mail.de"), "üs****de");
    assert_eq!(mask_recipient("üsér"), "****");
}

/// Test: Absent recipient fields log as a placeholder, not an empty mask
#[test]
fn test_mask_optional_absent_field() {
    assert_eq!(mask_optional(None), "-");
    assert_eq!(mask_optional(Some("u@x.com")), "u@****om");
}
