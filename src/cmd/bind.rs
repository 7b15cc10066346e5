use std::path::PathBuf;

use clap::Args;

use super::MessengerConfig;
use crate::error::MessengerError;
use crate::store::{KeyStore, PublicKeyFile};

#[derive(Args, Clone)]
#[command(about = "bind an email address to the local key pair")]
pub struct BindArgs {
    #[arg(value_name = "EMAIL")]
    email: String,
}

#[derive(Args, Clone)]
#[command(about = "import the public key of an email address into the key directory")]
pub struct ImportArgs {
    #[arg(value_name = "EMAIL")]
    email: String,

    #[arg(value_name = "PUBLIC_KEY_FILE")]
    file: PathBuf,

    #[arg(long, help = "force write if the `<EMAIL>.key` already exists")]
    force: bool,
}

impl BindArgs {
    pub fn exe(self, cfg: &MessengerConfig) -> anyhow::Result<()> {
        let store = KeyStore::new(&cfg.key_dir);
        let (mut pk, mut sk) = (store.load_public()?, store.load_private()?);

        pk.email = Some(self.email.clone());
        if !sk.bind(&self.email) {
            log::info!("`{}` is already bound to the private key", self.email);
        }

        store.save_public(&pk, true)?;
        store.save_private(&sk, true)?;
        log::info!("bind `{}` to `{}`", self.email, store.dir().display());

        Ok(())
    }
}

impl ImportArgs {
    pub fn exe(self, cfg: &MessengerConfig) -> anyhow::Result<()> {
        let store = KeyStore::new(&cfg.key_dir);
        let mut pk = KeyStore::read_json::<PublicKeyFile>(&self.file)?;
        if let Err(e) = pk.public_key() {
            anyhow::bail!(MessengerError::InvalidKey {
                path: self.file.display().to_string(),
                reason: e.to_string(),
            });
        }

        match pk.email.as_deref() {
            Some(email) if email != self.email => {
                log::warn!("the key file is bound to `{email}`, import it as `{}`", self.email);
            }
            _ => {}
        }
        pk.email = Some(self.email.clone());

        store.save_peer(&self.email, &pk, self.force)?;
        log::info!("write `{}`", store.peer_path(&self.email).display());

        Ok(())
    }
}
