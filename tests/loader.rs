use std::{fs, path::Path, sync::Arc};

use musicards::audio::{
    error::AudioError,
    loader::{ConfigLoader, DirSource},
};

fn write(root: &Path, path: &str, contents: &str) {
    let full = root.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, contents).unwrap();
}

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "audio/rent/config.json",
        r#"{"audios":[{"nome":"seasons.mp3","tempo_inicio":30,"tempo_fim":50,"loop":true,"fadeIn":400}]}"#,
    );
    write(root, "audio/rent/seasons.mp3", "not really an mp3");
    write(
        root,
        "audio/cats/config.json",
        r#"{"audios":[{"nome":"memory.mp3","tempo_inicio":1,"tempo_fim":20}]}"#,
    );
    write(root, "audio/broken/config.json", "{ nope");
    fs::create_dir_all(root.join("audio/empty")).unwrap();
    dir
}

fn loader(root: &Path) -> ConfigLoader {
    ConfigLoader::new(Arc::new(DirSource::new(root)))
}

#[tokio::test]
async fn discovers_items_with_a_config() {
    let dir = site();
    let items = loader(dir.path()).discover().await;
    assert_eq!(items, vec!["broken", "cats", "rent"]);
}

#[tokio::test]
async fn discovery_without_audio_dir_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    assert!(loader(dir.path()).discover().await.is_empty());
}

#[tokio::test]
async fn loads_config_with_defaults() {
    let dir = site();
    let config = loader(dir.path()).load("rent").await.unwrap();

    assert_eq!(config.file_name, "seasons.mp3");
    assert_eq!(config.start_time, 30.0);
    assert_eq!(config.end_time, 50.0);
    assert!(config.looping);
    assert_eq!(config.fade_in_ms, 400);
    assert_eq!(config.fade_out_ms, 1000);
    assert!((config.volume - 0.7).abs() < f32::EPSILON);
}

#[tokio::test]
async fn missing_and_malformed_configs_fail() {
    let dir = site();
    let loader = loader(dir.path());

    assert!(matches!(
        loader.load("empty").await,
        Err(AudioError::ConfigFetch { .. })
    ));
    assert!(matches!(
        loader.load("broken").await,
        Err(AudioError::ConfigParse { .. })
    ));
}

#[tokio::test]
async fn fetches_media_bytes() {
    let dir = site();
    let loader = loader(dir.path());

    let rent = loader.load("rent").await.unwrap();
    let bytes = loader.media("rent", &rent).await.unwrap();
    assert_eq!(bytes, b"not really an mp3");

    let cats = loader.load("cats").await.unwrap();
    assert!(matches!(
        loader.media("cats", &cats).await,
        Err(AudioError::MediaOpen { .. })
    ));
}
