use encode::EncodeError;
use std::{error::Error, fmt::Display};

#[derive(Debug)]
pub enum CipherError {
    /// 密钥二进制数据格式错误
    InvalidKeyBlob(String),

    /// 密钥二进制数据声明的长度超过剩余数据长度
    TruncatedKeyBlob {
        offset: usize,
        need: usize,
        remain: usize,
    },

    InvalidPublicKey(String),

    InvalidPrivateKey(String),

    /// 消息按整数解释时不小于模数
    MessageTooLong { msg_bits: u64, modulus_bits: u64 },

    InvalidCiphertext(String),

    /// 解密结果不是UTF-8字符串
    InvalidPlaintext(String),

    InvalidPrimeSize(String),

    /// 不合法的密钥长度
    InvalidKeySize { min: usize, real: usize },

    Encode(EncodeError),

    Other(String),
}

impl Display for CipherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKeyBlob(s)
            | Self::InvalidPublicKey(s)
            | Self::InvalidPrivateKey(s)
            | Self::InvalidCiphertext(s)
            | Self::InvalidPlaintext(s)
            | Self::InvalidPrimeSize(s)
            | Self::Other(s) => f.write_str(s),
            Self::TruncatedKeyBlob {
                offset,
                need,
                remain,
            } => f.write_fmt(format_args!(
                "Truncated key blob at offset `{offset}`: need `{need}` bytes but only `{remain}` remain"
            )),
            Self::MessageTooLong {
                msg_bits,
                modulus_bits,
            } => f.write_fmt(format_args!(
                "Message of `{msg_bits}` bits does not fit in a `{modulus_bits}` bits modulus"
            )),
            Self::InvalidKeySize { min, real } => f.write_fmt(format_args!(
                "Invalid key size `{real}` bits, need an even size of at least `{min}` bits"
            )),
            Self::Encode(e) => f.write_fmt(format_args!("{e}")),
        }
    }
}

impl Error for CipherError {}

impl From<EncodeError> for CipherError {
    fn from(value: EncodeError) -> Self {
        Self::Encode(value)
    }
}
