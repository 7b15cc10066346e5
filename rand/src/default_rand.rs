use crate::{Rand, RandError};
use xrand::rngs::OsRng;
use xrand::RngCore;

/// 默认使用OsRng <br>
/// OsRng不持有状态, 每次调用都直接向操作系统取随机数, 可以在线程间自由复制.
#[derive(Copy, Clone, Default, Debug)]
pub struct DefaultRand {
    rng: OsRng,
}

impl Rand for DefaultRand {
    fn rand(&mut self, random: &mut [u8]) {
        self.rng.fill_bytes(random);
    }

    fn try_rand(&mut self, random: &mut [u8]) -> Result<(), RandError> {
        self.rng.try_fill_bytes(random)
    }
}
