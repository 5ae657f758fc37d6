use super::*;
use pretty_assertions::assert_eq;

#[test]
fn empty_file_gives_defaults() {
    let config = EquivConfig::from_toml_str("").unwrap();
    assert_eq!(config, EquivConfig::default());
    assert_eq!(config.limits(), Limits::default());
    assert_eq!(config.capability_set(), CapabilitySet::standard());
}

#[test]
fn sections_are_read() {
    let config = EquivConfig::from_toml_str(
        r#"
        [limits]
        max-steps = 500
        timeout-ms = 250

        [compare]
        tolerance = 1e-6
        failure-policy = "exact-message"

        [capabilities]
        extended = true
        "#,
    )
    .unwrap();
    assert_eq!(
        config.limits(),
        Limits {
            max_steps: 500,
            timeout: Duration::from_millis(250),
            max_depth: Limits::default().max_depth,
        }
    );
    assert_eq!(
        config.compare,
        CompareOptions::default()
            .with_tolerance(1e-6)
            .with_failure_policy(FailurePolicy::ExactMessage)
    );
    assert!(config.capability_set().contains("sorted"));
}

#[test]
fn invalid_values_are_rejected() {
    for text in [
        "[compare]\ntolerance = -0.5\n",
        "[limits]\nmax-steps = 0\n",
        "[limits]\ntimeout-ms = 0\n",
        "[limits]\nmax-depth = 0\n",
    ] {
        assert!(
            matches!(EquivConfig::from_toml_str(text), Err(ConfigError::Invalid(_))),
            "{text}"
        );
    }
    for text in ["[limits]\nmax-steps = \"many\"\n", "[unknown]\n", "[limits]\nsteps = 1\n"] {
        assert!(
            matches!(EquivConfig::from_toml_str(text), Err(ConfigError::Parse(_))),
            "{text}"
        );
    }
}

#[test]
fn overrides_win_over_the_file() {
    let mut config = EquivConfig::from_toml_str("[compare]\ntolerance = 0.1\n").unwrap();
    config.apply(&Overrides {
        tolerance: Some(0.2),
        max_steps: Some(42),
        extended_builtins: true,
        ..Overrides::default()
    });
    assert_eq!(config.compare.tolerance, 0.2);
    assert_eq!(config.limits.max_steps, 42);
    assert!(config.capabilities.extended);
    assert_eq!(config.compare.failure_policy, FailurePolicy::StatusOnly);
}

#[test]
fn resolve_validates_after_overrides() {
    let overrides = Overrides {
        tolerance: Some(f64::NAN),
        ..Overrides::default()
    };
    assert!(matches!(
        Settings::resolve(None, &overrides),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let result = EquivConfig::load(Path::new("/nonexistent/equiv.toml"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}
