use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        OverlayError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        OverlayError::locked("x")
            .to_string()
            .contains("overlay is locked:")
    );
    assert!(
        OverlayError::persistence("x")
            .to_string()
            .contains("persistence error:")
    );
    assert!(
        OverlayError::font_not_ready("x")
            .to_string()
            .contains("font not ready:")
    );
    assert!(
        OverlayError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = OverlayError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn font_readiness_is_not_user_visible() {
    assert!(!OverlayError::font_not_ready("Playfair").is_user_visible());
    assert!(OverlayError::locked("k1").is_user_visible());
    assert!(OverlayError::persistence("503").is_user_visible());
}

#[test]
fn serde_json_errors_convert() {
    let err: OverlayError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, OverlayError::Serde(_)));
}
