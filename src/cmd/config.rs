use std::path::PathBuf;
use std::sync::OnceLock;

use config::Config;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct MessengerConfig {
    // maximum search threads
    pub threads: usize,

    // Miller-Rabin rounds
    pub prime_test_rounds: usize,

    pub public_exponent: u64,

    // directory of `public.key`, `private.key` and `<email>.key`
    pub key_dir: PathBuf,

    pub min_key_bits: usize,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get().max(1),
            prime_test_rounds: 10,
            public_exponent: 65537,
            key_dir: PathBuf::from("."),
            min_key_bits: cipher::rsa::MIN_KEY_BITS,
        }
    }
}

impl MessengerConfig {
    /// 只有第一次调用时的`f`生效
    pub fn config_with_file(f: Option<&str>) -> &'static Self {
        static CONFIG: OnceLock<MessengerConfig> = OnceLock::new();

        CONFIG.get_or_init(|| {
            let mut cfg = Self::load(f).unwrap_or_else(|e| {
                log::warn!("load config failed, use the default config: {e}");
                MessengerConfig::default()
            });

            cfg.threads = cfg.threads.max(1);
            cfg.prime_test_rounds = cfg.prime_test_rounds.max(1);

            log::trace!("{:?}", cfg);

            cfg
        })
    }

    fn load(f: Option<&str>) -> Result<Self, config::ConfigError> {
        let default_config = Config::try_from(&MessengerConfig::default())?;

        let mut config = Config::builder().add_source(default_config);
        if let Some(f) = f {
            config = config.add_source(config::File::with_name(f).required(false));
        }

        // 环境变量优先于配置文件
        config
            .add_source(
                config::Environment::with_prefix("MESSENGER")
                    .try_parsing(true)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::MessengerConfig;

    #[test]
    fn default_config() {
        let cfg = MessengerConfig::default();
        assert!(cfg.threads >= 1);
        assert_eq!(cfg.prime_test_rounds, 10);
        assert_eq!(cfg.public_exponent, 65537);
        assert_eq!(cfg.min_key_bits, 1024);
    }

    #[test]
    fn load_from_file() {
        let dir = std::env::temp_dir().join(format!("messenger-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let f = dir.join("messenger.json");
        std::fs::write(&f, r#"{"prime_test_rounds": 20, "key_dir": "/tmp/keys"}"#).unwrap();

        let cfg = MessengerConfig::load(f.to_str()).unwrap();
        assert_eq!(cfg.prime_test_rounds, 20);
        assert_eq!(cfg.key_dir.to_str(), Some("/tmp/keys"));
        assert_eq!(cfg.public_exponent, 65537);

        // missing files are optional
        let cfg = MessengerConfig::load(dir.join("none.json").to_str()).unwrap();
        assert_eq!(cfg.prime_test_rounds, 10);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn env_overrides_file() {
        let dir = std::env::temp_dir().join(format!("messenger-config-env-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let f = dir.join("messenger.json");
        std::fs::write(&f, r#"{"min_key_bits": 4096, "public_exponent": 3}"#).unwrap();

        std::env::set_var("MESSENGER__MIN_KEY_BITS", "2048");
        let cfg = MessengerConfig::load(f.to_str());
        std::env::remove_var("MESSENGER__MIN_KEY_BITS");

        let cfg = cfg.unwrap();
        assert_eq!(cfg.min_key_bits, 2048);
        assert_eq!(cfg.public_exponent, 3);

        std::fs::remove_dir_all(dir).unwrap();
    }
}
