//! 補充リクエストのシングルフライト制御
//!
//! 同時に存在できる補充リクエストは1つだけ。実行中に来た要求はキューせず捨てる。
//! 許可証（`RefillPermit`）がドロップされた時点でガードが解放される。

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct GuardState {
    in_flight: AtomicBool,
    issued: AtomicU64,
    dropped: AtomicU64,
}

/// シングルフライトガード
#[derive(Debug, Clone, Default)]
pub struct RefillGuard {
    state: Arc<GuardState>,
}

impl RefillGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 許可証の取得を試みる
    ///
    /// 既にリクエストが実行中なら `None`（その要求は破棄扱い）。
    pub fn try_acquire(&self) -> Option<RefillPermit> {
        match self
            .state
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                self.state.issued.fetch_add(1, Ordering::Relaxed);
                Some(RefillPermit {
                    state: Arc::clone(&self.state),
                })
            }
            Err(_) => {
                self.state.dropped.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.in_flight.load(Ordering::Acquire)
    }

    /// 発行済みリクエスト数
    pub fn issued_count(&self) -> u64 {
        self.state.issued.load(Ordering::Relaxed)
    }

    /// 実行中だったため破棄した要求数
    pub fn dropped_count(&self) -> u64 {
        self.state.dropped.load(Ordering::Relaxed)
    }
}

/// 実行中リクエストの許可証
#[derive(Debug)]
pub struct RefillPermit {
    state: Arc<GuardState>,
}

impl Drop for RefillPermit {
    fn drop(&mut self) {
        self.state.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_request_dropped_while_in_flight() {
        let guard = RefillGuard::new();

        let permit = guard.try_acquire();
        assert!(permit.is_some());
        assert!(guard.is_in_flight());

        assert!(guard.try_acquire().is_none());
        assert_eq!(guard.issued_count(), 1);
        assert_eq!(guard.dropped_count(), 1);
    }

    #[test]
    fn test_drop_releases_guard() {
        let guard = RefillGuard::new();
        {
            let _permit = guard.try_acquire().unwrap();
        }
        assert!(!guard.is_in_flight());
        assert!(guard.try_acquire().is_some());
        assert_eq!(guard.issued_count(), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let guard = RefillGuard::new();
        let other = guard.clone();

        let _permit = guard.try_acquire().unwrap();
        assert!(other.is_in_flight());
        assert!(other.try_acquire().is_none());
    }
}
