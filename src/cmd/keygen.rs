use std::path::PathBuf;

use cipher::rsa::{KeyPair, PublicKey};
use clap::Args;
use num_bigint::BigUint;
use num_traits::Num;

use super::MessengerConfig;
use crate::error::MessengerError;
use crate::store::{KeyStore, PrivateKeyFile, PublicKeyFile};

/// 十进制或者`0x`开头的十六进制
pub(super) fn parse_exponent(s: &str) -> Result<BigUint, String> {
    let s = s.trim();
    let x = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => BigUint::from_str_radix(hex, 16),
        None => BigUint::from_str_radix(s, 10),
    };

    x.map_err(|e| format!("`{s}` is not a valid integer: {e}"))
}

#[derive(Args, Clone)]
#[command(about = "generate a RSA key pair into the key directory")]
pub struct KeygenArgs {
    #[arg(value_name = "BITs")]
    #[arg(help = "the modulus bits length, must be even")]
    bits: usize,

    #[arg(short, long, value_parser = parse_exponent, conflicts_with = "exponent_from")]
    #[arg(help = "the public exponent, use the configured `public_exponent` if not specified")]
    exponent: Option<BigUint>,

    #[arg(long, value_name = "PUBLIC_KEY_FILE")]
    #[arg(help = "reuse the public exponent of an existing public key file")]
    exponent_from: Option<PathBuf>,

    #[arg(long, help = "force write if the key files already exist")]
    force: bool,
}

impl KeygenArgs {
    fn exponent(&self, cfg: &MessengerConfig) -> anyhow::Result<BigUint> {
        let e = if let Some(e) = self.exponent.as_ref() {
            e.clone()
        } else if let Some(f) = self.exponent_from.as_deref() {
            let pk = KeyStore::read_json::<PublicKeyFile>(f)?;
            let pk = pk.public_key().map_err(|e| MessengerError::InvalidKey {
                path: f.display().to_string(),
                reason: e.to_string(),
            })?;
            pk.exponent().clone()
        } else {
            BigUint::from(cfg.public_exponent)
        };

        PublicKey::is_valid_exponent(&e)
            .map_err(|err| MessengerError::InvalidExponent(err.to_string()))?;

        Ok(e)
    }

    pub fn exe(self, cfg: &MessengerConfig) -> anyhow::Result<()> {
        if self.bits < cfg.min_key_bits || (self.bits & 1) != 0 {
            anyhow::bail!(MessengerError::InvalidKeySize {
                min: cfg.min_key_bits,
                real: self.bits,
            });
        }

        let e = self.exponent(cfg)?;
        log::info!(
            "generate {} bits key with the public exponent {e}, {} threads",
            self.bits,
            cfg.threads
        );

        let pair = KeyPair::generate(self.bits, &e, cfg.prime_test_rounds, cfg.threads)?;
        let store = KeyStore::new(&cfg.key_dir);
        store.save_pair(
            &PublicKeyFile::new(pair.public_key()),
            &PrivateKeyFile::new(pair.private_key()),
            self.force,
        )?;

        log::info!(
            "write `{}` and `{}`",
            store.public_path().display(),
            store.private_path().display()
        );

        Ok(())
    }
}
