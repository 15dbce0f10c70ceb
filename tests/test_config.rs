use std::io::Write;
use std::time::Duration;

use harbor::config::{Config, ConfigError};
use harbor::server::listener::Privileges;

fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_key_values() {
    let cfg = Config::from_key_values(
        "# site\nvhost=example.com, www.example.com\nport=8080\ndiskpath=/srv/www\n",
    )
    .unwrap();

    assert_eq!(cfg.vhosts, vec!["example.com", "www.example.com"]);
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.disk_path.to_str(), Some("/srv/www"));
    assert_eq!(cfg.drop_uid, None);
    assert_eq!(cfg.poll_timeout, Duration::from_millis(2000));
}

#[test]
fn test_config_first_key_wins() {
    let cfg = Config::from_key_values("vhost=a\nport=80\nport=81\ndiskpath=/tmp\n").unwrap();
    assert_eq!(cfg.port, 80);
}

#[test]
fn test_config_missing_key() {
    let err = Config::from_key_values("vhost=a\ndiskpath=/tmp\n").unwrap_err();
    assert!(matches!(err, ConfigError::MissingKey("port")));
}

#[test]
fn test_config_invalid_port() {
    let err = Config::from_key_values("vhost=a\nport=99999\ndiskpath=/tmp\n").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { key: "port", .. }));
}

#[test]
fn test_config_privileges_need_both_ids() {
    let both = Config::from_key_values("vhost=a\nport=80\ndiskpath=/tmp\ndrop_uid=1000\ndrop_gid=1001\n")
        .unwrap();
    assert_eq!(both.privileges(), Some(Privileges { uid: 1000, gid: 1001 }));

    let one = Config::from_key_values("vhost=a\nport=80\ndiskpath=/tmp\ndrop_uid=1000\n").unwrap();
    assert_eq!(one.privileges(), None);

    let zero = Config::from_key_values("vhost=a\nport=80\ndiskpath=/tmp\ndrop_uid=0\ndrop_gid=0\n")
        .unwrap();
    assert_eq!(zero.privileges(), None);
}

#[test]
fn test_config_yaml() {
    let cfg = Config::from_yaml(
        "vhost: [example.com, alias.test]\nport: 9000\ndiskpath: /var/www\npoll_timeout_ms: 250\n",
    )
    .unwrap();

    assert_eq!(cfg.vhosts, vec!["example.com", "alias.test"]);
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.poll_timeout, Duration::from_millis(250));
}

#[test]
fn test_config_yaml_comma_separated_hosts() {
    let cfg = Config::from_yaml("vhost: \"a.test,b.test\"\nport: 80\ndiskpath: /tmp\n").unwrap();
    assert_eq!(cfg.vhosts, vec!["a.test", "b.test"]);
}

#[test]
fn test_config_yaml_missing_key() {
    let err = Config::from_yaml("port: 80\ndiskpath: /tmp\n").unwrap_err();
    assert!(matches!(err, ConfigError::MissingKey("vhost")));
}

#[test]
fn test_config_from_file_picks_format_by_extension() {
    let plain = write_config(".config", "vhost=plain\nport=8001\ndiskpath=/tmp\n");
    let yaml = write_config(".yml", "vhost: yaml\nport: 8002\ndiskpath: /tmp\n");

    assert_eq!(Config::from_file(plain.path()).unwrap().vhosts, vec!["plain"]);
    assert_eq!(Config::from_file(yaml.path()).unwrap().port, 8002);
}

#[test]
fn test_config_missing_file() {
    let err = Config::from_file("/nonexistent/harbor/server.config").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_config_load_from_env() {
    let file = write_config(".config", "vhost=env.test\nport=8123\ndiskpath=/tmp\n");
    unsafe {
        std::env::set_var("HARBOR_CONFIG", file.path());
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.port, 8123);
    unsafe {
        std::env::remove_var("HARBOR_CONFIG");
    }
}
