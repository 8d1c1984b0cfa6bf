use rust_bitranslator::pipelines::common::{ModelTier, TranslationDirection};
use rust_bitranslator::{Config, DevicePreference, Precision, TranslatorConfig, TranslatorError};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_missing_fields_take_default_values() -> anyhow::Result<()> {
    //    Given
    let directory = tempfile::tempdir()?;
    let path = directory.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "model_root": "/opt/translator",
            "device": "cuda",
            "precision": "half",
            "tier": "full",
            "direction": "target_to_source",
            "generation": { "num_beams": 3 }
        }"#,
    )?;

    //    When
    let config = TranslatorConfig::from_file(&path)?;

    //    Then
    assert_eq!(config.model_root, PathBuf::from("/opt/translator"));
    assert_eq!(config.device, DevicePreference::Cuda);
    assert_eq!(config.precision, Precision::Half);
    assert_eq!(config.tier, ModelTier::Full);
    assert_eq!(config.direction, TranslationDirection::TargetToSource);
    assert_eq!(config.generation.num_beams, 3);
    assert_eq!(config.generation.no_repeat_ngram_size, 2);
    assert_eq!(config.max_chunk_chars, 512);
    assert_eq!(config.debounce_interval(), Duration::from_millis(800));
    assert_eq!(config.min_auto_chars, 5);
    assert!(!config.auto_translate);
    assert!(!config.pretrained_fallback);
    Ok(())
}

#[test]
fn test_load_validates_the_file() -> anyhow::Result<()> {
    let directory = tempfile::tempdir()?;
    let path = directory.path().join("config.json");
    fs::write(&path, r#"{ "max_chunk_chars": 0 }"#)?;

    let error = TranslatorConfig::load(Some(path.as_path())).unwrap_err();

    assert!(matches!(error, TranslatorError::InvalidConfigurationError(_)));
    Ok(())
}

#[test]
fn test_invalid_generation_settings_are_rejected() -> anyhow::Result<()> {
    let mut config = TranslatorConfig::default();
    config.validate()?;

    config.generation.num_beams = 0;
    assert!(config.validate().is_err());

    config.generation.num_beams = 4;
    config.generation.min_length = 64;
    config.generation.max_length = 32;
    assert!(config.validate().is_err());
    Ok(())
}

#[test]
fn test_malformed_and_missing_files() -> anyhow::Result<()> {
    let directory = tempfile::tempdir()?;
    let malformed = directory.path().join("malformed.json");
    fs::write(&malformed, "{ not json")?;

    assert!(matches!(
        TranslatorConfig::from_file(&malformed),
        Err(TranslatorError::InvalidConfigurationError(_))
    ));
    assert!(matches!(
        TranslatorConfig::from_file(directory.path().join("missing.json")),
        Err(TranslatorError::IOError(_))
    ));
    Ok(())
}

#[test]
fn test_configuration_round_trips_through_json() -> anyhow::Result<()> {
    let config = TranslatorConfig {
        auto_translate: true,
        collapse_repeated_words: true,
        ..Default::default()
    };

    let parsed: TranslatorConfig = serde_json::from_str(&serde_json::to_string(&config)?)?;

    assert_eq!(parsed, config);
    Ok(())
}

#[test]
fn test_command_line_values() -> anyhow::Result<()> {
    assert_eq!(
        "zh-en".parse::<TranslationDirection>()?,
        TranslationDirection::TargetToSource
    );
    assert_eq!("FULL".parse::<ModelTier>()?, ModelTier::Full);
    assert_eq!("gpu".parse::<DevicePreference>()?, DevicePreference::Cuda);
    assert!("fr-en".parse::<TranslationDirection>().is_err());
    Ok(())
}

#[test]
fn test_direction_accepts_language_pairs() -> anyhow::Result<()> {
    let config: TranslatorConfig = serde_json::from_str(r#"{ "direction": "zh-en" }"#)?;
    assert_eq!(config.direction, TranslationDirection::TargetToSource);

    let config: TranslatorConfig = serde_json::from_str(r#"{ "direction": "en-zh" }"#)?;
    assert_eq!(config.direction, TranslationDirection::SourceToTarget);
    Ok(())
}
