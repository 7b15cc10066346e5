//! 教科书RSA(无填充)
//!
//! - 随机选择两个质数$p$和$q$($p\neq q$), 则模数$n=p*q$, $\phi(n)=(p-1)(q-1)$;
//! - 公钥指数$e$由外部提供, 需要与$\phi(n)$互质;
//! - 私钥指数$d$满足: $d*e \equiv 1 \mod \phi(n)$;
//!
//! 加密: $y = x ^ e \mod n$;
//!
//! 解密: $y = x^d \mod n$;
//!
//! 公钥与私钥都以`KeyCodec`定义的二进制格式传输和保存: `(e, n)`或`(d, n)`.
//!
//! 消息$x$按UTF-8字节的小端序无符号整数解释, 必须满足$x \lt n$.

mod codec;
pub use codec::KeyCodec;

mod key;
pub use key::{KeyPair, PrivateKey, PublicKey, MIN_KEY_BITS};

mod search;
pub use search::PrimeSearch;

/// 用公钥二进制数据加密字符串, 返回base64编码的密文
pub fn encode_message(plaintext: &str, public_key: &[u8]) -> Result<String, crate::CipherError> {
    PublicKey::from_blob(public_key)?.encrypt_message(plaintext)
}

/// 用私钥二进制数据解密base64编码的密文
pub fn decode_message(ciphertext: &str, private_key: &[u8]) -> Result<String, crate::CipherError> {
    PrivateKey::from_blob(private_key)?.decrypt_message(ciphertext)
}
