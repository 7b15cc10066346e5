use num_bigint::BigUint;
use rand::{Rand, RandError};
use std::marker::PhantomData;

/// 无限的随机奇数候选序列.
///
/// 每个候选都是`byte_len`字节的随机数(按小端序无符号数解释), 每次取数都重新构造一个`R`.
/// 偶数在交给素性测试之前直接丢弃; 序列本身永不结束, 由调用者决定何时停止.
pub struct CandidateSource<R: Rand> {
    buf: Vec<u8>,
    _rng: PhantomData<R>,
}

impl<R: Rand> CandidateSource<R> {
    pub fn new(byte_len: usize) -> Result<Self, String> {
        if byte_len == 0 {
            return Err("prime candidate size must at least 1-byte".to_string());
        }

        Ok(Self {
            buf: vec![0u8; byte_len],
            _rng: PhantomData,
        })
    }

    pub fn byte_len(&self) -> usize {
        self.buf.len()
    }
}

impl<R: Rand> Iterator for CandidateSource<R> {
    type Item = Result<BigUint, RandError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut rng = R::default();
            if let Err(e) = rng.try_rand(self.buf.as_mut_slice()) {
                return Some(Err(e));
            }

            // 小端序, 首字节的最低位即奇偶性
            if self.buf.first().map_or(false, |x| (x & 1) == 1) {
                return Some(Ok(BigUint::from_bytes_le(self.buf.as_slice())));
            }
        }
    }
}
