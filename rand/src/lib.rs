//! 密码学安全的随机源
//!
//! `Rand`是所有随机数消费者(素数候选、Miller-Rabin证据)依赖的唯一接口.

pub use xrand::Error as RandError;

pub trait Rand: Default {
    fn rand(&mut self, random: &mut [u8]);

    /// 随机源可能失败时使用, 失败不会写入部分数据的保证由实现者负责
    fn try_rand(&mut self, random: &mut [u8]) -> Result<(), RandError> {
        self.rand(random);
        Ok(())
    }
}

mod default_rand;
pub use default_rand::DefaultRand;

// 每次取随机数都重新构造一个生成器, 不在调用之间共享状态
impl<T: xrand::RngCore + Default> Rand for T {
    fn rand(&mut self, random: &mut [u8]) {
        let mut r = Self::default();
        r.fill_bytes(random);
    }

    fn try_rand(&mut self, random: &mut [u8]) -> Result<(), RandError> {
        let mut r = Self::default();
        r.try_fill_bytes(random)
    }
}

#[cfg(test)]
mod tests {
    use crate::{DefaultRand, Rand};

    #[test]
    fn default_rand_fills_buffer() {
        let mut rng = DefaultRand::default();
        let (mut a, mut b) = ([0u8; 32], [0u8; 32]);
        rng.rand(&mut a);
        rng.try_rand(&mut b).unwrap();
        // 2^-256
        assert_ne!(a, b, "two draws from the os rng are identical");
        assert_ne!(a, [0u8; 32]);
    }

    #[test]
    fn fresh_generator_per_draw() {
        let mut rng = xrand::rngs::OsRng;
        let mut buf = [0u8; 16];
        Rand::try_rand(&mut rng, &mut buf).unwrap();
        assert_ne!(buf, [0u8; 16]);
    }
}
