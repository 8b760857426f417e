//! Sources of randomness for UUID generation

use rand::rngs::{adapter::ReseedingRng, OsRng};
use rand::{RngCore, SeedableRng};
use rand_chacha::{ChaCha12Core, ChaCha12Rng};

/// Number of bytes generated before the secure provider reseeds itself from the operating system.
const RESEED_THRESHOLD: u64 = 1024 * 64;

/// A trait that defines the minimum entropy source interface for UUID generation.
pub trait EntropySource {
    /// Returns the next 16 random bytes.
    fn next_16_bytes(&mut self) -> Result<[u8; 16], rand::Error>;
}

/// An adapter that implements [`EntropySource`] for [`RngCore`] types.
///
/// # Examples
///
/// ```rust
/// use uuid14::entropy::Adapter;
///
/// let mut rng = Adapter(rand::thread_rng());
/// let uuid = uuid14::uuid4_from(&mut rng)?;
/// assert_eq!(uuid.version(), Some(4));
/// # Ok::<(), rand::Error>(())
/// ```
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Adapter<T>(/** The wrapped [`RngCore`] type. */ pub T);

impl<T: RngCore> EntropySource for Adapter<T> {
    fn next_16_bytes(&mut self) -> Result<[u8; 16], rand::Error> {
        let mut bytes = [0u8; 16];
        self.0.try_fill_bytes(&mut bytes)?;
        Ok(bytes)
    }
}

/// Quality of an entropy provider, in descending order of preference.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Capability {
    /// A CSPRNG seeded and periodically reseeded by the operating system.
    CryptographicallySecure,
    /// A general-purpose PRNG seeded on a best-effort basis.
    BestEffort,
}

impl Capability {
    /// All capabilities, most preferred first.
    pub const RANKED: [Self; 2] = [Self::CryptographicallySecure, Self::BestEffort];
}

/// The entropy provider picked by probing the environment.
///
/// [`Entropy::select`] tries each [`Capability`] in [`Capability::RANKED`] order and keeps the
/// first one available. The secure provider runs [`ChaCha12Core`] behind a [`ReseedingRng`] that
/// draws a fresh seed from [`OsRng`] every 64 KiB, the strategy used by [`rand::rngs::ThreadRng`].
/// A best-effort PRNG is always available, so selection never fails. If the secure provider
/// reports an error after selection, it degrades to the PRNG for the rest of its lifetime.
#[derive(Clone, Debug)]
pub struct Entropy {
    inner: Inner,
}

#[derive(Clone, Debug)]
enum Inner {
    Secure(ReseedingRng<ChaCha12Core, OsRng>),
    Prng(ChaCha12Rng),
}

impl Entropy {
    /// Selects the best available provider.
    pub fn select() -> Self {
        let entropy = Capability::RANKED
            .iter()
            .find_map(|e| Self::probe(*e))
            .unwrap_or_else(Self::best_effort);
        tracing::debug!(capability = ?entropy.capability(), "selected entropy provider");
        entropy
    }

    /// Returns a provider of the given capability if the environment supports it.
    pub fn probe(capability: Capability) -> Option<Self> {
        match capability {
            Capability::CryptographicallySecure => match ChaCha12Core::from_rng(OsRng) {
                Ok(core) => Some(Self {
                    inner: Inner::Secure(ReseedingRng::new(core, RESEED_THRESHOLD, OsRng)),
                }),
                Err(err) => {
                    tracing::warn!(%err, "operating system entropy source unavailable");
                    None
                }
            },
            Capability::BestEffort => Some(Self::best_effort()),
        }
    }

    /// Returns a PRNG-based provider seeded from the clock and the process ID.
    pub fn best_effort() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|e| e.as_nanos() as u64)
            .unwrap_or_default();
        let seed = nanos ^ ((std::process::id() as u64) << 32);
        Self {
            inner: Inner::Prng(ChaCha12Rng::seed_from_u64(seed)),
        }
    }

    /// Returns the capability of the current provider.
    pub fn capability(&self) -> Capability {
        match self.inner {
            Inner::Secure(_) => Capability::CryptographicallySecure,
            Inner::Prng(_) => Capability::BestEffort,
        }
    }

    /// Returns the next 16 random bytes, falling back to the PRNG if the secure provider fails.
    pub fn fill(&mut self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        if let Inner::Secure(rng) = &mut self.inner {
            match rng.try_fill_bytes(&mut bytes) {
                Ok(()) => return bytes,
                Err(err) => {
                    tracing::warn!(%err, "secure entropy provider failed; using PRNG");
                    *self = Self::best_effort();
                }
            }
        }
        if let Inner::Prng(prng) = &mut self.inner {
            prng.fill_bytes(&mut bytes);
        }
        bytes
    }
}

impl Default for Entropy {
    fn default() -> Self {
        Self::select()
    }
}

impl EntropySource for Entropy {
    fn next_16_bytes(&mut self) -> Result<[u8; 16], rand::Error> {
        Ok(self.fill())
    }
}
