//! 本地密钥文件
//!
//! - `public.key`: `{"email": <string|null>, "key": <base64>}`
//! - `private.key`: `{"email": [<string>...], "key": <base64>}`
//! - `<email>.key`: 对方的公钥, 格式同`public.key`
//!
//! `key`字段是`KeyCodec`二进制数据的base64编码. 读取时兼容首字母大写的字段名.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use cipher::rsa::{PrivateKey, PublicKey};
use encode::base::Base64;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
#[cfg(feature = "sec-zeroize")]
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::MessengerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyFile {
    #[serde(alias = "Email", default)]
    pub email: Option<String>,

    #[serde(alias = "Key")]
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sec-zeroize", derive(Zeroize, ZeroizeOnDrop))]
pub struct PrivateKeyFile {
    #[serde(alias = "Email", default)]
    pub email: Vec<String>,

    #[serde(alias = "Key")]
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFile {
    #[serde(alias = "Email")]
    pub email: String,

    #[serde(alias = "Content")]
    pub content: String,
}

impl PublicKeyFile {
    pub fn new(key: &PublicKey) -> Self {
        Self {
            email: None,
            key: Base64::std().encode_to_string(&key.to_blob()),
        }
    }

    pub fn blob(&self) -> Result<Vec<u8>, MessengerError> {
        Ok(Base64::std().decode_str(&self.key)?)
    }

    pub fn public_key(&self) -> Result<PublicKey, MessengerError> {
        Ok(PublicKey::from_blob(&self.blob()?)?)
    }
}

impl PrivateKeyFile {
    pub fn new(key: &PrivateKey) -> Self {
        Self {
            email: Vec::new(),
            key: Base64::std().encode_to_string(&key.to_blob()),
        }
    }

    pub fn blob(&self) -> Result<Vec<u8>, MessengerError> {
        Ok(Base64::std().decode_str(&self.key)?)
    }

    pub fn private_key(&self) -> Result<PrivateKey, MessengerError> {
        Ok(PrivateKey::from_blob(&self.blob()?)?)
    }

    pub fn is_bound(&self, email: &str) -> bool {
        self.email.iter().any(|x| x == email)
    }

    /// 返回是否新增
    pub fn bind(&mut self, email: &str) -> bool {
        if self.is_bound(email) {
            false
        } else {
            self.email.push(email.to_string());
            true
        }
    }
}

/// 密钥文件所在目录
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    pub const PUBLIC_KEY: &'static str = "public.key";
    pub const PRIVATE_KEY: &'static str = "private.key";

    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        self.dir.as_path()
    }

    pub fn public_path(&self) -> PathBuf {
        self.dir.join(Self::PUBLIC_KEY)
    }

    pub fn private_path(&self) -> PathBuf {
        self.dir.join(Self::PRIVATE_KEY)
    }

    pub fn peer_path(&self, email: &str) -> PathBuf {
        self.dir.join(format!("{email}.key"))
    }

    pub fn load_public(&self) -> Result<PublicKeyFile, MessengerError> {
        Self::read_json(&self.public_path())
    }

    pub fn load_private(&self) -> Result<PrivateKeyFile, MessengerError> {
        Self::read_json(&self.private_path())
    }

    pub fn load_peer(&self, email: &str) -> Result<PublicKeyFile, MessengerError> {
        Self::read_json(&self.peer_path(email))
    }

    /// 两个文件都不存在或者`force`时才写入, 避免只覆盖其中一个
    pub fn save_pair(
        &self,
        pk: &PublicKeyFile,
        sk: &PrivateKeyFile,
        force: bool,
    ) -> Result<(), MessengerError> {
        let (public_path, private_path) = (self.public_path(), self.private_path());
        if !force {
            for p in [&public_path, &private_path] {
                if p.exists() {
                    return Err(MessengerError::FileExists(p.display().to_string()));
                }
            }
        }

        Self::write_json(&public_path, pk, true)?;
        Self::write_json(&private_path, sk, true)
    }

    pub fn save_public(&self, pk: &PublicKeyFile, force: bool) -> Result<(), MessengerError> {
        Self::write_json(&self.public_path(), pk, force)
    }

    pub fn save_private(&self, sk: &PrivateKeyFile, force: bool) -> Result<(), MessengerError> {
        Self::write_json(&self.private_path(), sk, force)
    }

    pub fn save_peer(
        &self,
        email: &str,
        pk: &PublicKeyFile,
        force: bool,
    ) -> Result<(), MessengerError> {
        Self::write_json(&self.peer_path(email), pk, force)
    }

    pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, MessengerError> {
        if !path.is_file() {
            return Err(MessengerError::KeyNotExist(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        serde_json::from_str::<T>(&content)
            .map_err(|e| MessengerError::JsonParseFailed(format!("{}: {e}", path.display())))
    }

    pub fn write_json<T: Serialize>(
        path: &Path,
        value: &T,
        force: bool,
    ) -> Result<(), MessengerError> {
        let content = serde_json::to_vec_pretty(value)
            .map_err(|e| MessengerError::JsonParseFailed(format!("{}: {e}", path.display())))?;
        Self::write_file(path, &content, force)
    }

    /// `force`为false时文件已存在则返回`FileExists`, 检查与创建是同一次`open`
    pub fn write_file(path: &Path, content: &[u8], force: bool) -> Result<(), MessengerError> {
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .create_new(!force)
            .open(path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    MessengerError::FileExists(path.display().to_string())
                }
                _ => MessengerError::Io(e),
            })?;
        file.write_all(content)?;
        log::debug!("write `{}`", path.display());

        Ok(())
    }
}
