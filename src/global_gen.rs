//! Default generator and entry point functions.

#![cfg(feature = "global_gen")]
#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use std::sync;

use crate::entropy::Entropy;
use crate::{GenerateError, Uuid, V1Generator, V1Options};
use inner::PerProcess;

type Global<T> = sync::OnceLock<sync::Mutex<PerProcess<T>>>;

/// Returns the lock handle of a process-wide global value, creating one with `init` if none
/// exists.
fn lock_global<T>(
    cell: &'static Global<T>,
    init: fn() -> T,
) -> sync::MutexGuard<'static, PerProcess<T>> {
    // generator state is never left half-updated
    cell.get_or_init(|| sync::Mutex::new(PerProcess::new(init)))
        .lock()
        .unwrap_or_else(sync::PoisonError::into_inner)
}

/// Returns the lock handle of the global UUIDv1 generator.
fn lock_global_v1() -> sync::MutexGuard<'static, PerProcess<V1Generator>> {
    static G: Global<V1Generator> = sync::OnceLock::new();
    lock_global(&G, || V1Generator::new(Entropy::select().fill()))
}

/// Returns the lock handle of the global entropy provider for UUIDv4.
fn lock_global_entropy() -> sync::MutexGuard<'static, PerProcess<Entropy>> {
    static G: Global<Entropy> = sync::OnceLock::new();
    lock_global(&G, Entropy::select)
}

/// Generates a UUIDv1 object from the current time.
///
/// This function employs a global generator whose node ID and initial clock sequence are drawn
/// once from the best available entropy source. The generator state is guarded by a single lock,
/// so the ordering and rate guarantees hold process-wide. On Unix, the generator is reseeded when
/// the process ID changes (i.e., upon process forks) to prevent collisions across processes.
///
/// # Errors
///
/// Returns [`GenerateError::RateExceeded`] if more than 10000 UUIDs are requested within the same
/// millisecond; the caller may retry once the clock advances.
///
/// # Examples
///
/// ```rust
/// let uuid = uuid14::uuid1()?;
/// println!("{uuid}"); // e.g., "d9428888-122b-11e1-b85c-61cd3cbb3210"
/// # Ok::<(), uuid14::GenerateError>(())
/// ```
pub fn uuid1() -> Result<Uuid, GenerateError> {
    uuid1_with(&V1Options::default())
}

/// Generates a UUIDv1 object with the global generator, applying the overrides given.
///
/// See [`V1Generator::generate_with`] for the meaning of the options and [`uuid1`] for the
/// guarantees of the global generator.
///
/// # Panics
///
/// Panics if `options.msecs` is outside the range from
/// [`MIN_MSECS`](crate::timestamp::MIN_MSECS) to [`MAX_MSECS`](crate::timestamp::MAX_MSECS).
pub fn uuid1_with(options: &V1Options) -> Result<Uuid, GenerateError> {
    lock_global_v1().get_mut().generate_with(options)
}

/// Generates a UUIDv4 object from the best available entropy source.
///
/// The entropy provider has a lock of its own, so this function never waits on [`uuid1`] callers.
///
/// # Examples
///
/// ```rust
/// let uuid = uuid14::uuid4();
/// println!("{uuid}"); // e.g., "2ca4b2ce-6c13-40d4-bccf-37d222820f6f"
/// ```
pub fn uuid4() -> Uuid {
    Uuid::from_random_v4(lock_global_entropy().get_mut().fill())
}

mod inner {
    /// A thin wrapper to reset the value when the process ID changes (i.e., upon Unix forks).
    #[derive(Debug)]
    pub struct PerProcess<T> {
        #[cfg(unix)]
        pid: u32,
        value: T,
        init: fn() -> T,
    }

    impl<T> PerProcess<T> {
        pub fn new(init: fn() -> T) -> Self {
            Self {
                #[cfg(unix)]
                pid: std::process::id(),
                value: init(),
                init,
            }
        }

        /// Returns a mutable reference to the inner value, recreating it on Unix if the process
        /// ID has changed.
        pub fn get_mut(&mut self) -> &mut T {
            #[cfg(unix)]
            if self.pid != std::process::id() {
                tracing::debug!("process ID changed; reseeding global generator");
                *self = Self::new(self.init);
            }
            &mut self.value
        }
    }

    #[cfg(all(test, unix))]
    mod tests {
        use super::PerProcess;
        use std::sync::atomic::{AtomicU32, Ordering};

        /// Recreates the value when the process ID changes
        #[test]
        fn recreates_the_value_when_the_process_id_changes() {
            static CALLS: AtomicU32 = AtomicU32::new(0);
            let mut p = PerProcess::new(|| CALLS.fetch_add(1, Ordering::Relaxed));
            assert_eq!(*p.get_mut(), 0);
            assert_eq!(*p.get_mut(), 0);

            p.pid = p.pid.wrapping_add(1);
            assert_eq!(*p.get_mut(), 1);
            assert_eq!(p.pid, std::process::id());
            assert_eq!(*p.get_mut(), 1);
        }
    }
}
