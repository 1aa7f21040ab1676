use arcade_bracket::Config;
use std::collections::HashMap;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_when_unset() {
    let config = Config::from_lookup(|_| None);
    assert_eq!(config, Config::default());
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 8080);
    assert_eq!(config.sweep_limit, 1024);
}

#[test]
fn reads_values() {
    let config = Config::from_lookup(lookup(&[
        ("HOST", "127.0.0.1"),
        ("PORT", " 9000 "),
        ("BRACKET_SWEEP_LIMIT", "64"),
    ]));
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 9000);
    assert_eq!(config.sweep_limit, 64);
}

#[test]
fn invalid_or_blank_values_fall_back() {
    let config = Config::from_lookup(lookup(&[("HOST", "  "), ("PORT", "eighty"), ("BRACKET_SWEEP_LIMIT", "-1")]));
    assert_eq!(config, Config::default());
}
