use crate::{CipherError, DefaultRand, Rand};
use num_bigint::BigUint;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use utils::{BigUintExt, CandidateSource, DEFAULT_TEST_ROUNDS};

/// 并发素数搜索
///
/// 每个工作线程独立地从自己的`CandidateSource`取候选数, 通过Miller-Rabin测试后在同一把锁内
/// 检查计数并加入结果. 结果数量达到`count`时置位停止标志, 所有线程在每个候选前后检查该标志.
#[derive(Clone, Debug)]
pub struct PrimeSearch {
    byte_len: usize,
    count: usize,
    threads: usize,
    test_rounds: usize,
}

impl PrimeSearch {
    /// 搜索`count`个`byte_len`字节的素数
    pub fn new(byte_len: usize, count: usize) -> Self {
        Self {
            byte_len,
            count,
            threads: num_cpus::get().max(1),
            test_rounds: DEFAULT_TEST_ROUNDS,
        }
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// 0表示使用默认轮数
    pub fn test_rounds(mut self, rounds: usize) -> Self {
        self.test_rounds = rounds;
        self
    }

    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// 返回的素数互不相同且无序
    pub fn search(&self) -> Result<Vec<BigUint>, CipherError> {
        self.search_with::<DefaultRand>()
    }

    pub fn search_with<R: Rand + Send>(&self) -> Result<Vec<BigUint>, CipherError> {
        if self.count == 0 {
            return Ok(Vec::new());
        }

        self.check_reachable()?;

        let sources = (0..self.threads)
            .map(|_| CandidateSource::<R>::new(self.byte_len))
            .collect::<Result<Vec<_>, _>>()
            .map_err(CipherError::InvalidPrimeSize)?;

        log::debug!(
            "search {} primes of {} bytes with {} threads",
            self.count,
            self.byte_len,
            self.threads
        );

        let (found, stop) = (Mutex::new(Vec::with_capacity(self.count)), AtomicBool::new(false));
        thread::scope(|s| {
            for (id, source) in sources.into_iter().enumerate() {
                let (found, stop) = (&found, &stop);
                s.spawn(move || self.worker::<R>(id, source, found, stop));
            }
        });

        let primes = found.into_inner().unwrap_or_else(PoisonError::into_inner);
        log::debug!("found {} primes of {} bytes", primes.len(), self.byte_len);

        Ok(primes)
    }

    fn worker<R: Rand>(
        &self,
        id: usize,
        source: CandidateSource<R>,
        found: &Mutex<Vec<BigUint>>,
        stop: &AtomicBool,
    ) {
        let (mut rng, mut tested) = (R::default(), 0usize);

        for candidate in source {
            if stop.load(Ordering::Acquire) {
                break;
            }

            let candidate = match candidate {
                Ok(x) => x,
                Err(e) => {
                    log::debug!("worker {id} discard the candidate draw: {e}");
                    continue;
                }
            };

            tested += 1;
            match BigUintExt(&candidate).try_probably_prime_test(self.test_rounds, &mut rng) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    log::debug!("worker {id} discard the candidate test: {e}");
                    continue;
                }
            }

            let mut primes = found.lock().unwrap_or_else(PoisonError::into_inner);
            if primes.len() < self.count && !primes.contains(&candidate) {
                primes.push(candidate);
            }

            if primes.len() >= self.count {
                stop.store(true, Ordering::Release);
                break;
            }
        }

        log::trace!("worker {id} stopped after {tested} candidates");
    }

    // 位数小于64时估计可用的素数个数, 数量不够时直接返回错误而不是无限搜索.
    // 估计值取pi(x)的一半, 偏保守: 例如1字节内有53个奇素数, 但请求30个也会被拒绝.
    fn check_reachable(&self) -> Result<(), CipherError> {
        let bits = self.byte_len.saturating_mul(8);
        if bits == 0 || bits >= 64 {
            return Ok(());
        }

        let prime_limit = (1u64 << bits) as f64;
        // pi approximates the number of primes less than prime_limit
        let mut pi = prime_limit / (prime_limit.ln() - 1f64);
        // Use a factor of two to ensure that the search terminates
        // in a reasonable amount of time.
        pi /= 2f64;
        if pi <= (self.count as f64) {
            return Err(CipherError::InvalidPrimeSize(format!(
                "too few primes of {} bytes to find {} distinct ones (conservative estimate)",
                self.byte_len, self.count
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::rsa::PrimeSearch;
    use crate::{CipherError, DefaultRand, Rand};
    use num_bigint::BigUint;
    use rand::RandError;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use utils::BigUintExt;

    static FLAKY_DRAWS: AtomicUsize = AtomicUsize::new(0);

    // 每50次取随机数失败一次
    #[derive(Default)]
    struct FlakyRand(DefaultRand);

    impl Rand for FlakyRand {
        fn rand(&mut self, random: &mut [u8]) {
            self.0.rand(random);
        }

        fn try_rand(&mut self, random: &mut [u8]) -> Result<(), RandError> {
            if FLAKY_DRAWS.fetch_add(1, Ordering::Relaxed) % 50 == 49 {
                Err(RandError::new(std::io::Error::other("rng unavailable")))
            } else {
                self.0.try_rand(random)
            }
        }
    }

    fn check_primes(primes: &[BigUint], byte_len: usize, count: usize) {
        assert_eq!(primes.len(), count);
        let distinct = primes.iter().collect::<HashSet<_>>();
        assert_eq!(distinct.len(), count, "duplicate primes in {primes:?}");

        let mut rng = DefaultRand::default();
        for p in primes {
            assert!(p.bits() as usize <= byte_len * 8, "{p} is too large");
            assert!(BigUintExt(p).probably_prime_test(10, &mut rng), "{p} is not prime");
        }
    }

    #[test]
    fn search_u64_primes() {
        let primes = PrimeSearch::new(8, 3).test_rounds(10).search().unwrap();
        check_primes(&primes, 8, 3);
    }

    #[test]
    fn never_exceeds_target() {
        for threads in [1usize, 2, 4, 16] {
            for count in [1usize, 5, 20] {
                let primes = PrimeSearch::new(4, count)
                    .threads(threads)
                    .search()
                    .unwrap();
                check_primes(&primes, 4, count);
            }
        }
    }

    #[test]
    fn small_primes() {
        // 53 odd primes below 256
        let primes = PrimeSearch::new(1, 20).threads(8).search().unwrap();
        check_primes(&primes, 1, 20);
    }

    #[test]
    fn rand_failures_are_skipped() {
        for count in [1usize, 3, 10] {
            let primes = PrimeSearch::new(8, count)
                .threads(4)
                .search_with::<FlakyRand>()
                .unwrap();
            check_primes(&primes, 8, count);
        }
        assert!(FLAKY_DRAWS.load(Ordering::Relaxed) >= 50, "no draw failed");
    }

    #[test]
    fn zero_target() {
        assert!(PrimeSearch::new(8, 0).search().unwrap().is_empty());
    }

    #[test]
    fn unreachable_target() {
        assert!(matches!(
            PrimeSearch::new(1, 100).search(),
            Err(CipherError::InvalidPrimeSize(_))
        ));
        // 53 odd primes fit in one byte, the estimate only allows 28
        assert!(matches!(
            PrimeSearch::new(1, 30).search(),
            Err(CipherError::InvalidPrimeSize(_))
        ));
        assert!(matches!(
            PrimeSearch::new(0, 1).search(),
            Err(CipherError::InvalidPrimeSize(_))
        ));
    }

    #[test]
    fn rsa_sized_primes() {
        let primes = PrimeSearch::new(64, 2).search().unwrap();
        check_primes(&primes, 64, 2);
    }
}
