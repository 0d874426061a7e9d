use std::time::Duration;

/// 查询前注入的延迟，用于压测或模拟慢查询
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LookupDelay {
    #[default]
    None,
    Fixed(Duration),
}

impl LookupDelay {
    /// 0 表示不延迟
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            LookupDelay::None
        } else {
            LookupDelay::Fixed(Duration::from_millis(ms))
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            LookupDelay::None => Duration::ZERO,
            LookupDelay::Fixed(d) => *d,
        }
    }

    pub async fn apply(&self) {
        if let LookupDelay::Fixed(d) = self {
            tokio::time::sleep(*d).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn test_from_millis() {
        assert_eq!(LookupDelay::from_millis(0), LookupDelay::None);
        assert_eq!(
            LookupDelay::from_millis(250),
            LookupDelay::Fixed(Duration::from_millis(250))
        );
        assert_eq!(LookupDelay::from_millis(250).duration().as_millis(), 250);
        assert_eq!(LookupDelay::default().duration(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_apply_none_returns_immediately() {
        let start = Instant::now();
        LookupDelay::None.apply().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_apply_fixed_sleeps() {
        let start = Instant::now();
        LookupDelay::from_millis(20).apply().await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
