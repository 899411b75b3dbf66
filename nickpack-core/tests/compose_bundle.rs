use nickpack_core::compose::{ArtifactKind, ComposeError, Composer};
use nickpack_core::config::AssetConfig;
use std::path::{Path, PathBuf};

fn workspace_assets() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../assets")
}

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

#[test]
fn test_compose_single_artifact_is_encoded_png() {
    let composer = Composer::new(AssetConfig::from_dir(workspace_assets())).unwrap();
    let avatar = composer.compose("abc", ArtifactKind::Avatar).unwrap();
    assert!(avatar.len() > PNG_MAGIC.len());
    assert_eq!(&avatar[..PNG_MAGIC.len()], PNG_MAGIC);
}

#[test]
fn test_build_bundle_yields_three_non_empty_buffers() {
    let composer = Composer::new(AssetConfig::from_dir(workspace_assets())).unwrap();
    let bundle = composer.build_bundle("abc").unwrap();
    for buffer in [&bundle.avatar, &bundle.cover_primary, &bundle.cover_secondary] {
        assert!(buffer.len() > PNG_MAGIC.len());
        assert_eq!(&buffer[..PNG_MAGIC.len()], PNG_MAGIC);
    }
}

#[test]
fn test_build_bundle_is_deterministic() {
    let composer = Composer::new(AssetConfig::from_dir(workspace_assets())).unwrap();
    let first = composer.build_bundle("abc").unwrap();
    let second = composer.build_bundle("abc").unwrap();
    assert_eq!(first.avatar, second.avatar);
    assert_eq!(first.cover_primary, second.cover_primary);
    assert_eq!(first.cover_secondary, second.cover_secondary);
}

#[test]
fn test_overlong_nickname_still_composes() {
    let composer = Composer::new(AssetConfig::from_dir(workspace_assets())).unwrap();
    let bundle = composer.build_bundle(&"w".repeat(32)).unwrap();
    assert!(!bundle.cover_secondary.is_empty());
}

#[test]
fn test_missing_template_fails_with_template_load() {
    let assets_dir = workspace_assets();
    let assets = AssetConfig {
        avatar_template: assets_dir.join("does_not_exist.png"),
        cover_primary_template: assets_dir.join("cover_primary.png"),
        cover_secondary_template: assets_dir.join("cover_secondary.png"),
        font: assets_dir.join("brand.ttf"),
    };
    let composer = Composer::new(assets).unwrap();
    let err = composer.build_bundle("abc").unwrap_err();
    assert!(matches!(err, ComposeError::TemplateLoad { .. }), "got {err:?}");
}

#[test]
fn test_unreadable_font_fails_at_construction() {
    let assets_dir = workspace_assets();
    let assets = AssetConfig {
        avatar_template: assets_dir.join("avatar.png"),
        cover_primary_template: assets_dir.join("cover_primary.png"),
        cover_secondary_template: assets_dir.join("cover_secondary.png"),
        font: assets_dir.join("no_such_font.ttf"),
    };
    let err = Composer::new(assets).unwrap_err();
    assert!(matches!(err, ComposeError::FontLoad { .. }), "got {err:?}");
}
