use std::path::{Path, PathBuf};

use cipher::rsa::PublicKey;
use clap::Args;

use super::MessengerConfig;
use crate::error::MessengerError;
use crate::store::{KeyStore, MessageFile, PublicKeyFile};

#[derive(Args, Clone)]
#[command(about = "encrypt a message with a public key")]
pub struct EncryptArgs {
    #[arg(value_name = "KEY")]
    #[arg(help = "public key file, or an email address imported into the key directory")]
    key: String,

    #[arg(value_name = "MESSAGE")]
    message: String,

    #[arg(long, help = "output a message json with the recipient email")]
    email: Option<String>,

    #[arg(short, long, help = "file to save the output, it will output to stdout if not specified")]
    ofile: Option<PathBuf>,

    #[arg(long, help = "force write if the ofile already exists")]
    force: bool,
}

/// 优先按文件路径查找, 否则查找密钥目录中的`<email>.key`
pub(super) fn resolve_public_key(
    key: &str,
    store: &KeyStore,
) -> Result<(PathBuf, PublicKey), MessengerError> {
    let path = Path::new(key);
    let path = if path.is_file() {
        path.to_path_buf()
    } else {
        store.peer_path(key)
    };

    let pk = KeyStore::read_json::<PublicKeyFile>(&path)?;
    let pk = pk.public_key().map_err(|e| MessengerError::InvalidKey {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    Ok((path, pk))
}

impl EncryptArgs {
    pub fn run(&self, cfg: &MessengerConfig) -> anyhow::Result<String> {
        let store = KeyStore::new(&cfg.key_dir);
        let (path, pk) = resolve_public_key(&self.key, &store)?;
        log::debug!("encrypt with the public key `{}`", path.display());

        let content = pk.encrypt_message(&self.message)?;
        match self.email.as_ref() {
            Some(email) => {
                let msg = MessageFile {
                    email: email.clone(),
                    content,
                };
                Ok(serde_json::to_string_pretty(&msg)?)
            }
            None => Ok(content),
        }
    }

    pub fn exe(self, cfg: &MessengerConfig) -> anyhow::Result<()> {
        let out = self.run(cfg)?;

        match self.ofile.as_deref() {
            Some(f) => KeyStore::write_file(f, out.as_bytes(), self.force)?,
            None => println!("{out}"),
        }

        Ok(())
    }
}
