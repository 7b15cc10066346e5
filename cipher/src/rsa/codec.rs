use crate::CipherError;
use num_bigint::BigUint;
use utils::BigUintExt;

const LEN_SIZE: usize = 4;

/// 密钥二进制格式:
///
/// ```txt
/// | exp_len: u32 BE | exp: exp_len bytes | mod_len: u32 BE | mod: mod_len bytes |
/// ```
///
/// `exp`和`mod`都是小端序补码, 最高位为1时补一个0字节(见`BigUintExt::to_signed_bytes_le`).
/// 公钥为`(e, n)`, 私钥为`(d, n)`, 两者格式相同.
pub struct KeyCodec;

impl KeyCodec {
    pub fn encode(exponent: &BigUint, modulus: &BigUint) -> Vec<u8> {
        let (exp, modulus) = (
            BigUintExt(exponent).to_signed_bytes_le(),
            BigUintExt(modulus).to_signed_bytes_le(),
        );

        let mut blob = Vec::with_capacity(LEN_SIZE * 2 + exp.len() + modulus.len());
        for part in [exp, modulus] {
            blob.extend_from_slice(&(part.len() as u32).to_be_bytes());
            blob.extend(part);
        }

        blob
    }

    /// 返回`(exponent, modulus)`
    pub fn decode(blob: &[u8]) -> Result<(BigUint, BigUint), CipherError> {
        let (exponent, rest) = Self::read_component(blob, 0)?;
        let (modulus, rest) = Self::read_component(rest, blob.len() - rest.len())?;

        if !rest.is_empty() {
            return Err(CipherError::InvalidKeyBlob(format!(
                "key blob has `{}` trailing bytes after the modulus",
                rest.len()
            )));
        }

        Ok((exponent, modulus))
    }

    fn read_component(buf: &[u8], offset: usize) -> Result<(BigUint, &[u8]), CipherError> {
        let Some((len, rest)) = buf.split_first_chunk::<LEN_SIZE>() else {
            return Err(CipherError::TruncatedKeyBlob {
                offset,
                need: LEN_SIZE,
                remain: buf.len(),
            });
        };

        let len = u32::from_be_bytes(*len) as usize;
        if len > rest.len() {
            return Err(CipherError::TruncatedKeyBlob {
                offset: offset + LEN_SIZE,
                need: len,
                remain: rest.len(),
            });
        }

        let (x, rest) = rest.split_at(len);
        let x = BigUintExt::<BigUint>::from_signed_bytes_le(x).ok_or_else(|| {
            CipherError::InvalidKeyBlob(format!(
                "negative key component at offset `{}`",
                offset + LEN_SIZE
            ))
        })?;

        Ok((x, rest))
    }
}
