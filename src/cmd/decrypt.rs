use std::path::PathBuf;

use clap::Args;

use super::MessengerConfig;
use crate::error::MessengerError;
use crate::store::{KeyStore, MessageFile};

#[derive(Args, Clone)]
#[command(about = "decrypt a message with the local private key")]
pub struct DecryptArgs {
    #[arg(value_name = "CIPHERTEXT", required_unless_present = "message_file")]
    #[arg(help = "base64 ciphertext")]
    ciphertext: Option<String>,

    #[arg(short, long, value_name = "FILE", conflicts_with = "ciphertext")]
    #[arg(help = "message json file, its email must be bound to the private key")]
    message_file: Option<PathBuf>,
}

impl DecryptArgs {
    pub fn run(&self, cfg: &MessengerConfig) -> anyhow::Result<String> {
        let store = KeyStore::new(&cfg.key_dir);
        let sk_file = store.load_private()?;

        let ciphertext = match (self.ciphertext.as_ref(), self.message_file.as_deref()) {
            (Some(c), _) => c.clone(),
            (None, Some(f)) => {
                let msg = KeyStore::read_json::<MessageFile>(f)?;
                if !sk_file.is_bound(&msg.email) {
                    anyhow::bail!(MessengerError::EmailNotBound(msg.email));
                }
                msg.content
            }
            (None, None) => anyhow::bail!("need the ciphertext or a message file"),
        };

        let sk = sk_file.private_key().map_err(|e| MessengerError::InvalidKey {
            path: store.private_path().display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(sk.decrypt_message(ciphertext.trim())?)
    }

    pub fn exe(self, cfg: &MessengerConfig) -> anyhow::Result<()> {
        let msg = self.run(cfg)?;
        println!("{msg}");
        Ok(())
    }
}
