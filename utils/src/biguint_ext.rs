use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{Euclid, One, Signed, Zero};
use rand::{Rand, RandError};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::ops::Deref;

/// Miller-Rabin测试轮数为0时使用的默认值
pub const DEFAULT_TEST_ROUNDS: usize = 10;

pub struct BigUintExt<T: Borrow<BigUint>>(pub T);

impl<T: Borrow<BigUint>> Deref for BigUintExt<T> {
    type Target = BigUint;
    fn deref(&self) -> &Self::Target {
        self.0.borrow()
    }
}

impl<T: Borrow<BigUint>> PartialEq<Self> for BigUintExt<T> {
    fn eq(&self, other: &Self) -> bool {
        self.deref().eq(other.deref())
    }
}

impl<T: Borrow<BigUint>> Eq for BigUintExt<T> {}

impl<T: Borrow<BigUint>> PartialOrd<Self> for BigUintExt<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Borrow<BigUint>> Ord for BigUintExt<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deref().cmp(other.deref())
    }
}

impl<T: Borrow<BigUint>> PartialEq<BigUint> for BigUintExt<T> {
    fn eq(&self, other: &BigUint) -> bool {
        self.deref().eq(other)
    }
}

impl<T: Borrow<BigUint>> PartialOrd<BigUint> for BigUintExt<T> {
    fn partial_cmp(&self, other: &BigUint) -> Option<Ordering> {
        self.deref().partial_cmp(other)
    }
}

impl<T: Borrow<BigUint>> BigUintExt<T> {
    /// 扩展欧几里得算法求模逆: self * inv = 1 \mod modulus
    ///
    /// 余数链结束时`i`即为gcd(self, modulus), 不互质时返回None;
    /// Bézout系数可能为负, 加上modulus后落在`[0, modulus)`之中.
    pub fn modinv(&self, modulus: &BigUint) -> Option<BigUint> {
        if modulus.is_zero() {
            return None;
        }

        let n = BigInt::from(modulus.clone());
        let (mut a, mut i) = (BigInt::from(self.deref().clone()), n.clone());
        let (mut v, mut d) = (BigInt::zero(), BigInt::one());

        while a.is_positive() {
            let (t, r) = i.div_rem(&a);
            i = std::mem::replace(&mut a, r);
            let next = &v - &t * &d;
            v = std::mem::replace(&mut d, next);
        }

        if !i.is_one() {
            return None;
        }

        v.rem_euclid(&n).to_biguint()
    }

    /// 小端序补码字节, 最高字节的最高位为1时在末尾补一个0字节, 保证按有符号数解析时仍为非负数.
    /// 0编码为`[0]`.
    pub fn to_signed_bytes_le(&self) -> Vec<u8> {
        let mut bytes = self.to_bytes_le();
        if bytes.last().map_or(false, |x| (x & 0x80) != 0) {
            bytes.push(0);
        }
        bytes
    }

    /// `to_signed_bytes_le`的逆过程, 按有符号小端序补码解析, 结果为负数时返回None.
    /// 空切片解析为0.
    pub fn from_signed_bytes_le(bytes: &[u8]) -> Option<BigUint> {
        BigInt::from_signed_bytes_le(bytes).to_biguint()
    }

    /// 从`[2, self-2]`中均匀选择一个Miller-Rabin证据, 不在范围内则重新采样.
    ///
    /// note: 内部调用函数, self是大于等于5的奇数
    fn try_gen_witness<R: Rand>(&self, rng: &mut R) -> Result<BigUint, RandError> {
        let upper = self.deref() - 2u32;
        let bits = upper.bits() as usize;
        let (mut buf, top) = (vec![0u8; (bits + 7) >> 3], bits & 7);
        let two = BigUint::from(2u32);

        loop {
            rng.try_rand(buf.as_mut_slice())?;
            // 清除高于bits的位, 减少拒绝采样的次数
            if top != 0 {
                if let Some(x) = buf.last_mut() {
                    *x &= (1u8 << top) - 1;
                }
            }

            let a = BigUint::from_bytes_le(buf.as_slice());
            if a >= two && a <= upper {
                return Ok(a);
            }
        }
    }

    /// Miller-Rabin概率素性测试.
    ///
    /// `test_rounds`为0时使用`DEFAULT_TEST_ROUNDS`. 对于合数, 通过`t`轮测试的概率至多为$4^{-t}$.
    /// 随机源失败时返回错误, 本次测试结果作废.
    pub fn try_probably_prime_test<R: Rand>(
        &self,
        test_rounds: usize,
        rng: &mut R,
    ) -> Result<bool, RandError> {
        let n = self.deref();
        if n.bits() <= 2 {
            // 0, 1, 2, 3
            return Ok(n >= &BigUint::from(2u8));
        } else if n.is_even() {
            return Ok(false);
        }

        let rounds = if test_rounds == 0 {
            DEFAULT_TEST_ROUNDS
        } else {
            test_rounds
        };

        // n - 1 = d * 2^s
        let n_m1 = n - 1u32;
        let s = n_m1.trailing_zeros().unwrap_or(0);
        let d = &n_m1 >> s;

        'next_round: for _ in 0..rounds {
            let a = self.try_gen_witness(rng)?;
            let mut x = a.modpow(&d, n);
            if x.is_one() || x == n_m1 {
                continue;
            }

            for _ in 1..s {
                x = (&x * &x) % n;
                if x.is_one() {
                    return Ok(false);
                }
                if x == n_m1 {
                    continue 'next_round;
                }
            }

            return Ok(false);
        }

        Ok(true)
    }

    /// 同`try_probably_prime_test`, 随机源失败视为未通过测试
    pub fn probably_prime_test<R: Rand>(&self, test_rounds: usize, rng: &mut R) -> bool {
        self.try_probably_prime_test(test_rounds, rng)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use crate::BigUintExt;
    use num_bigint::BigUint;
    use num_traits::{Num, One};
    use rand::DefaultRand;
    use std::ops::Deref;

    #[test]
    fn composite_validate() {
        let cases = [
            "0",
            "1",
            "4",
            "9",
            "15",
            "100",
            // carmichael numbers
            "561",
            "1105",
            "1729",
            "41041",
            "825265",
            "321197185",
            "3215031751",
            "21284175091214687912771199898307297748211672914763848041968395774954376176754",
            "6084766654921918907427900243509372380954290099172559290432744450051395395951",
            "84594350493221918389213352992032324280367711247940675652888030554255915464401",
            "82793403787388584738507275144194252681",
            "80579735209",
            "105919633",
            // product of two 512-bit primes
            "119451566173317735431738293210828581780782268143408244038749883065030903633819834992678213521519591157978069671413568628503493717868536064542766136160363079394358602183697284761955346762889474635089870923764011224441236731026166679927746947917825747169248615802071463078245667006038519421178126440466017451111",
        ];

        let (test_rounds, mut rng) = (10, DefaultRand::default());
        for s in cases {
            let composite =
                BigUint::from_str_radix(s, 10).expect("convert string to big uint failed");
            assert!(
                !BigUintExt(composite).probably_prime_test(test_rounds, &mut rng),
                "composite `{}` test failed",
                s
            );
        }
    }

    #[test]
    fn prime_validate() {
        let cases = [
            "2",
            "3",
            "5",
            "7",
            "97",
            "7919",
            "13756265695458089029",
            "18699199384836356663",
            "98920366548084643601728869055592650835572950932266967461790948584315647051443",
            "11687580791658462755431841885367579471402812650426052849536667118728987914306818440563395157054812095651974161970348882140361548066486532297986865782208361",
            // Curve25519: 2^255-19
            "57896044618658097711785492504343953926634992332820282019728792003956564819949",
            // E-521: 2^521-1
            "6864797660130609714981900799081393217269435300143305409394463459185543183397656052122559640661454554977296311391480858037121987999716643812574028291115057151",
        ];

        let (test_rounds, mut rng) = (10usize, DefaultRand::default());
        for s in cases {
            let prime = BigUint::from_str_radix(s, 10).expect("convert string to big uint failed");
            assert!(
                BigUintExt(prime).probably_prime_test(test_rounds, &mut rng),
                "prime `{}` test failed",
                s
            );
        }
    }

    #[test]
    fn zero_rounds_falls_back_to_default() {
        let mut rng = DefaultRand::default();
        assert!(BigUintExt(BigUint::from(7919u32)).probably_prime_test(0, &mut rng));
        assert!(!BigUintExt(BigUint::from(561u32)).probably_prime_test(0, &mut rng));
    }

    #[test]
    fn witness_in_range() {
        let mut rng = DefaultRand::default();
        for n in [5u32, 7, 9, 257, 65537] {
            let n = BigUintExt(BigUint::from(n));
            let upper = n.deref() - 2u32;
            for _ in 0..64 {
                let a = n.try_gen_witness(&mut rng).unwrap();
                assert!(a >= BigUint::from(2u32) && a <= upper, "{a} out of [2, {upper}]");
            }
        }
    }

    #[test]
    fn mod_inv() {
        let cases = [
            ("1234567", "458948883992"),
            ("239487239847", "2410312426921032588552076022197566074856950548502459942654116941958108831682612228890093858261341614673227141477904012196503648957050582631942730706805009223062734745341073406696246014589361659774041027169249453200378729434170325843778659198143763193776859869524088940195577346119843545301547043747207749969763750084308926339295559968882457872412993810129130294592999947926365264059284647209730384947211681434464714438488520940127459844288859336526896320919633919"),
            ("3", "11"),
            ("65537", "3120"),
            ("65537", "119451566173317735431738293210828581780782268143408244038749883065030903633819834992678213521519591157978069671413568628503493717868536064542766136160363057486393600768887777809288721732155576735937709059879891381172800920477999493530778307742941520390915049359974725066893232388840073277283628370835882990000"),
        ];

        for (a, n) in cases {
            let (a, n) = (
                BigUint::from_str_radix(a, 10).expect("can't convert str to big uint"),
                BigUint::from_str_radix(n, 10).expect("can't convert str to big uint"),
            );

            let inv = BigUintExt(&a).modinv(&n).expect("inverse exist");
            assert!(inv < n, "{inv} is not reduced modulo {n}");
            assert!(((&a * &inv) % &n).is_one(), "{} * {} != 1 % {}", a, inv, n);
        }
    }

    #[test]
    fn mod_inv_rsa_exponent() {
        let (e, phi, d) = (
            BigUint::from(65537u32),
            BigUint::from_str_radix("119451566173317735431738293210828581780782268143408244038749883065030903633819834992678213521519591157978069671413568628503493717868536064542766136160363057486393600768887777809288721732155576735937709059879891381172800920477999493530778307742941520390915049359974725066893232388840073277283628370835882990000", 10).unwrap(),
            BigUint::from_str_radix("69805995588322565105209956081015668303739568299195757182051082159812298064782731287434318013651507114445307083715584553810142452365031398079304823974331213492704709032266246583120203146616818490466123247697330668287182850197398455875845376020368910530717846032587271241236918187591527937602967529405427203473", 10).unwrap(),
        );

        assert_eq!(BigUintExt(&e).modinv(&phi), Some(d));
    }

    #[test]
    fn mod_inv_not_coprime() {
        let (a, n) = (BigUint::from(6u32), BigUint::from(9u32));
        assert_eq!(BigUintExt(&a).modinv(&n), None);
        assert_eq!(BigUintExt(&a).modinv(&BigUint::from(0u32)), None);
    }

    #[test]
    fn signed_bytes() {
        let cases: [(u64, &[u8]); 6] = [
            (0, &[0x00]),
            (1, &[0x01]),
            (0x7f, &[0x7f]),
            (0x80, &[0x80, 0x00]),
            (65537, &[0x01, 0x00, 0x01]),
            (0xff00, &[0x00, 0xff, 0x00]),
        ];

        for (x, bytes) in cases {
            let x = BigUint::from(x);
            assert_eq!(BigUintExt(&x).to_signed_bytes_le(), bytes, "{x:#x}");
            assert_eq!(
                BigUintExt::<BigUint>::from_signed_bytes_le(bytes),
                Some(x)
            );
        }

        assert_eq!(
            BigUintExt::<BigUint>::from_signed_bytes_le(&[]),
            Some(BigUint::from(0u8))
        );
        // 0x80 without the padding byte is -128
        assert_eq!(BigUintExt::<BigUint>::from_signed_bytes_le(&[0x80]), None);
    }
}
