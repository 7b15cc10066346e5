use crate::rsa::{KeyCodec, PrimeSearch};
use crate::CipherError;
use encode::base::Base64;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::fmt::{Display, Formatter};
use utils::BigUintExt;
use xrand::rngs::OsRng;
use xrand::Rng;

/// 生成密钥时模数的最小位数
pub const MIN_KEY_BITS: usize = 1024;

#[derive(Clone, Debug, PartialOrd, PartialEq, Ord, Eq)]
pub struct PublicKey {
    // n = p * q
    n: BigUint,
    // public exponent, gcd(e, (p-1)(q-1)) = 1
    e: BigUint,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivateKey {
    n: BigUint,
    // d * e = 1 % (p-1)(q-1)
    d: BigUint,
}

#[derive(Clone, Debug)]
pub struct KeyPair {
    pk: PublicKey,
    sk: PrivateKey,
}

impl PublicKey {
    /// n: RSA modules
    /// e: public key exponent
    /// note: not to check the `n` and `exp` are right RSA parameters
    pub fn new_uncheck(n: BigUint, exp: BigUint) -> Self {
        Self { e: exp, n }
    }

    pub fn from_blob(blob: &[u8]) -> Result<Self, CipherError> {
        let (e, n) = KeyCodec::decode(blob)?;
        Ok(Self { n, e })
    }

    pub fn to_blob(&self) -> Vec<u8> {
        KeyCodec::encode(&self.e, &self.n)
    }

    /// n
    pub fn modules(&self) -> &BigUint {
        &self.n
    }

    /// e
    pub fn exponent(&self) -> &BigUint {
        &self.e
    }

    /// RSAEP: RSA Encrypt primitive, $m^e \mod n, m \lt n$
    pub fn rsaep(&self, m: &BigUint) -> Result<BigUint, CipherError> {
        if m < &self.n {
            Ok(m.modpow(&self.e, &self.n))
        } else {
            Err(CipherError::MessageTooLong {
                msg_bits: m.bits(),
                modulus_bits: self.n.bits(),
            })
        }
    }

    /// 明文的UTF-8字节按小端序无符号整数解释, 密文按`BigUintExt::to_signed_bytes_le`序列化后base64编码
    pub fn encrypt_message(&self, plaintext: &str) -> Result<String, CipherError> {
        let m = BigUint::from_bytes_le(plaintext.as_bytes());
        let c = self.rsaep(&m)?;
        Ok(Base64::std().encode_to_string(&BigUintExt(&c).to_signed_bytes_le()))
    }

    /// 外部提供的公钥指数至少为3且为奇数, 偶数与$\phi(n)$永远不互质
    pub fn is_valid_exponent(e: &BigUint) -> Result<(), CipherError> {
        if e < &BigUint::from(3u8) {
            Err(CipherError::InvalidPublicKey(format!(
                "rsa: public exponent {:#x} is too small",
                e
            )))
        } else if !e.bit(0) {
            Err(CipherError::InvalidPublicKey(format!(
                "rsa: public exponent {:#x} is even",
                e
            )))
        } else {
            Ok(())
        }
    }
}

impl PrivateKey {
    pub fn new_uncheck(modulus: BigUint, private_exp: BigUint) -> Self {
        Self {
            n: modulus,
            d: private_exp,
        }
    }

    pub fn from_blob(blob: &[u8]) -> Result<Self, CipherError> {
        let (d, n) = KeyCodec::decode(blob)?;
        Ok(Self { n, d })
    }

    pub fn to_blob(&self) -> Vec<u8> {
        KeyCodec::encode(&self.d, &self.n)
    }

    pub fn modules(&self) -> &BigUint {
        &self.n
    }

    pub fn exponent(&self) -> &BigUint {
        &self.d
    }

    /// RSADP: RSA Decrypt primitive
    pub fn rsadp(&self, c: &BigUint) -> Result<BigUint, CipherError> {
        if c < &self.n {
            Ok(c.modpow(&self.d, &self.n))
        } else {
            Err(CipherError::InvalidCiphertext(format!(
                "rsadp: invalid cipher message {:#x} that need less than {:#x}",
                c, self.n
            )))
        }
    }

    /// `PublicKey::encrypt_message`的逆过程.
    ///
    /// 明文末尾的`\0`字符在整数表示中不可区分, 解密结果不包含它们.
    pub fn decrypt_message(&self, ciphertext: &str) -> Result<String, CipherError> {
        let c = Base64::std().decode_str(ciphertext)?;
        let c = BigUintExt::<BigUint>::from_signed_bytes_le(&c).ok_or_else(|| {
            CipherError::InvalidCiphertext("rsadp: negative cipher message".to_string())
        })?;

        let m = self.rsadp(&c)?;
        let m = if m.is_zero() {
            Vec::new()
        } else {
            m.to_bytes_le()
        };

        String::from_utf8(m).map_err(|e| CipherError::InvalidPlaintext(format!("rsadp: {e}")))
    }
}

impl KeyPair {
    /// n = p * q, phi = (p-1)(q-1), d = e^{-1} \mod phi
    pub fn derive(p: &BigUint, q: &BigUint, e: &BigUint) -> Result<Self, CipherError> {
        let one = BigUint::one();
        if p <= &one || q <= &one {
            return Err(CipherError::InvalidPrivateKey(
                "rsa: invalid prime value".to_string(),
            ));
        } else if p == q {
            return Err(CipherError::InvalidPrivateKey(
                "rsa: the two primes must be distinct".to_string(),
            ));
        }

        let (n, phi) = (p * q, (p - 1u32) * (q - 1u32));
        let d = BigUintExt(e).modinv(&phi).ok_or_else(|| {
            CipherError::InvalidPublicKey(format!(
                "rsa: public exponent {:#x} is not coprime with phi(n)",
                e
            ))
        })?;

        Ok(Self {
            pk: PublicKey::new_uncheck(n.clone(), e.clone()),
            sk: PrivateKey::new_uncheck(n, d),
        })
    }

    /// 生成`bits_len`位左右的密钥对.
    ///
    /// p的位数是`bits_len/2`乘以`[0.8, 1.2)`之间的随机因子, q取剩下的位数, 两者都按字节长度
    /// 各自搜索一个素数. p与q相同或e与phi(n)不互质时重新搜索.
    pub fn generate(
        bits_len: usize,
        e: &BigUint,
        test_rounds: usize,
        threads: usize,
    ) -> Result<Self, CipherError> {
        if bits_len < MIN_KEY_BITS || (bits_len & 1) != 0 {
            return Err(CipherError::InvalidKeySize {
                min: MIN_KEY_BITS,
                real: bits_len,
            });
        }
        PublicKey::is_valid_exponent(e)?;

        loop {
            let offset: f64 = OsRng.gen_range(0.8..1.2);
            let p_bits = ((bits_len / 2) as f64 * offset) as usize;
            let (p, q) = (
                Self::search_one(p_bits / 8, test_rounds, threads)?,
                Self::search_one((bits_len - p_bits) / 8, test_rounds, threads)?,
            );

            match Self::derive(&p, &q, e) {
                Ok(pair) => {
                    log::debug!(
                        "rsa key generated with a {} bits modulus",
                        pair.pk.n.bits()
                    );
                    return Ok(pair);
                }
                Err(err @ (CipherError::InvalidPublicKey(_) | CipherError::InvalidPrivateKey(_))) => {
                    log::debug!("discard the prime pair: {err}");
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn search_one(byte_len: usize, test_rounds: usize, threads: usize) -> Result<BigUint, CipherError> {
        PrimeSearch::new(byte_len, 1)
            .threads(threads)
            .test_rounds(test_rounds)
            .search()?
            .pop()
            .ok_or_else(|| CipherError::Other("rsa: prime search returned nothing".to_string()))
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.sk
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{n={:#x}, e={:#x}}}", self.n, self.e)
    }
}
