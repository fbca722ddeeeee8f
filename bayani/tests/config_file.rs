//! Loading daemon configuration from disk
#![allow(clippy::unwrap_used)]

use std::{io::Write, path::PathBuf};

use bayani::config::{Config, ConfigFileError, locate};
use bayani_delivery::{Amount, ConfigError, parse_local_instant};
use chrono::Weekday;
use pretty_assertions::assert_eq;
use tempfile::{NamedTempFile, TempDir};

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn loads_overrides_from_disk() {
    let file = write_config(
        r#"(
            rules: (
                same_day: (days: ["Sat"], fee: "₱175", free_threshold: 1200),
                cycle: (delivery_day: "Fri", delivery_time: "08:00:00", day_end: "17:00:00"),
            ),
            clock: (utc_offset_minutes: 0),
            countdown: (tick_interval_ms: 500),
        )"#,
    );

    let config = Config::load(file.path()).unwrap();
    config.validate().unwrap();

    let rules = &config.rules;
    assert_eq!(rules.same_day.days, vec![Weekday::Sat]);
    assert_eq!(rules.same_day.fee, Amount::from_pesos(175));
    assert_eq!(rules.same_day_fee(Amount::from_pesos(1199)), Amount::from_pesos(175));
    assert_eq!(rules.same_day_fee(Amount::from_pesos(1200)), Amount::ZERO);
    assert!(!rules.is_same_day_available(parse_local_instant("2025-10-12T09:00").unwrap()));

    // Friday runs close at the end of Wednesday
    let tuesday = parse_local_instant("2025-10-07T12:00").unwrap();
    assert_eq!(
        rules.next_delivery_instant(tuesday),
        parse_local_instant("2025-10-10T08:00").unwrap()
    );
    assert_eq!(
        rules.order_cutoff(tuesday),
        parse_local_instant("2025-10-08T23:59:59.999").unwrap()
    );

    assert_eq!(config.clock.utc_offset_minutes, 0);
    assert_eq!(config.countdown.tick_interval_ms, 500);
}

#[test]
fn rejects_inconsistent_rules() {
    let file = write_config(r#"(rules: (same_day: (dispatch_cutoff: "17:00:00")))"#);
    let config = Config::load(file.path()).unwrap();

    assert!(matches!(
        config.validate(),
        Err(ConfigFileError::Rules(ConfigError::WindowOrder { .. }))
    ));
}

#[test]
fn reports_parse_errors_with_path() {
    let file = write_config("(rules: (same_day: (fee: -5)))");
    let err = Config::load(file.path()).unwrap_err();

    assert!(matches!(err, ConfigFileError::Parse { .. }));
    assert!(err.to_string().contains(&file.path().display().to_string()));
}

#[test]
fn reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = Config::load(&dir.path().join("absent.ron")).unwrap_err();

    assert!(matches!(err, ConfigFileError::Read { .. }));
}

#[test]
fn lookup_prefers_override_then_first_existing_candidate() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.ron");
    let second = dir.path().join("second.ron");
    std::fs::write(&second, "()").unwrap();

    let candidates = [first.clone(), second.clone()];
    assert_eq!(locate(None, &candidates).unwrap(), second);

    std::fs::write(&first, "()").unwrap();
    assert_eq!(locate(None, &candidates).unwrap(), first);

    let pinned = write_config("()");
    assert_eq!(
        locate(Some(pinned.path().to_path_buf()), &candidates).unwrap(),
        pinned.path()
    );

    let missing = PathBuf::from("/nonexistent/bayani.config.ron");
    assert!(matches!(
        locate(Some(missing), &candidates),
        Err(ConfigFileError::MissingOverride(_))
    ));
}

#[test]
fn shipped_sample_matches_stock_rules() {
    let sample = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../bayani.config.ron");
    let config = Config::load(&sample).unwrap();

    assert_eq!(config.rules, bayani_delivery::DeliveryRules::default());
    assert_eq!(config.clock.utc_offset_minutes, 480);
    assert_eq!(config.countdown.tick_interval_ms, 1000);
    assert!(config.validate().is_ok());
}
