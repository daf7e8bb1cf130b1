//! 随机延迟
//!
//! 所有"像人一样"的停顿都从这里取值

use rand::Rng;
use std::time::Duration;

/// 在 `[min, max]` 范围内取一个随机时长；`max <= min` 时返回 `min`
pub fn random_between(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let millis = rand::thread_rng().gen_range(min.as_millis()..=max.as_millis());
    Duration::from_millis(millis as u64)
}

/// 随机等待 `[min, max]`
pub async fn random_delay(min: Duration, max: Duration) {
    let wait = random_between(min, max);
    tokio::time::sleep(wait).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_between_stays_in_range() {
        let min = Duration::from_secs(3);
        let max = Duration::from_secs(5);
        for _ in 0..100 {
            let d = random_between(min, max);
            assert!(d >= min && d <= max, "{:?}", d);
        }
    }

    #[test]
    fn test_random_between_degenerate_range() {
        let d = Duration::from_millis(2000);
        assert_eq!(random_between(d, d), d);
        assert_eq!(random_between(d, Duration::ZERO), d);
    }

    #[test]
    fn test_random_delay_waits_at_least_min() {
        let start = std::time::Instant::now();
        tokio_test::block_on(random_delay(
            Duration::from_millis(20),
            Duration::from_millis(30),
        ));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
