use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use parking_lot::Mutex;
use vc_core::Tag;

const SIZE_CLASSES: &[usize] = &[32, 64, 128, 256, 512, 1024, 4096];

struct Bucket {
    class: usize,
    free: Mutex<Vec<Vec<u8>>>,
}

struct PoolInner {
    buckets: Vec<Bucket>,
    rented: AtomicU64,
    released: AtomicU64,
}

impl PoolInner {
    fn new() -> Self {
        let buckets = SIZE_CLASSES
            .iter()
            .map(|&class| Bucket {
                class,
                free: Mutex::new(Vec::new()),
            })
            .collect();
        Self {
            buckets,
            rented: AtomicU64::new(0),
            released: AtomicU64::new(0),
        }
    }

    fn bucket_for(&self, len: usize) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.class >= len)
    }

    fn take(&self, len: usize) -> (Vec<u8>, usize) {
        self.rented.fetch_add(1, Ordering::Relaxed);
        if let Some(bucket) = self.bucket_for(len) {
            if let Some(mut buf) = bucket.free.lock().pop() {
                buf.resize(len, 0);
                return (buf, bucket.class);
            }
            return (vec![0u8; len], bucket.class);
        }
        // Larger than every size class: rent an exact-size, unpooled buffer.
        (vec![0u8; len], len)
    }

    fn give_back(&self, size_class: usize, mut buf: Vec<u8>) {
        use zeroize::Zeroize;
        buf.zeroize();
        self.released.fetch_add(1, Ordering::Relaxed);
        buf.clear();
        if let Some(bucket) = self.buckets.iter().find(|b| b.class == size_class) {
            bucket.free.lock().push(buf);
        }
    }
}

static POOL: OnceLock<PoolInner> = OnceLock::new();

fn inner() -> &'static PoolInner {
    POOL.get_or_init(PoolInner::new)
}

/// A rented buffer, tagged with its `Purpose`/`MaterialSemantics` at
/// acquisition. The backing bytes are zeroized and returned to their size
/// class on drop, from whichever thread happens to drop the value.
pub struct SensitiveBuffer {
    data: Vec<u8>,
    size_class: usize,
    tag: Tag,
}

impl SensitiveBuffer {
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Drop for SensitiveBuffer {
    fn drop(&mut self) {
        let data = std::mem::take(&mut self.data);
        inner().give_back(self.size_class, data);
    }
}

/// Handle onto the process-wide sensitive buffer pool. Zero-sized: every
/// `Pool` value talks to the same global storage, so it can be passed
/// around freely (including into signing/verification delegates) without
/// plumbing a lifetime.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pool;

impl Pool {
    /// Rent a buffer of at least `len` bytes, tagged for routing. Renting
    /// zero length returns an empty, still-owned buffer rather than `None`.
    pub fn acquire(&self, len: usize, tag: Tag) -> SensitiveBuffer {
        let (data, size_class) = inner().take(len);
        SensitiveBuffer { data, size_class, tag }
    }

    /// `(rented, released)` lifetime counters, for diagnostics.
    pub fn stats(&self) -> (u64, u64) {
        let p = inner();
        (p.rented.load(Ordering::Relaxed), p.released.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc_core::{MaterialSemantics, Purpose};

    #[test]
    fn zero_length_rent_is_empty_but_owned() {
        let pool = Pool;
        let buf = pool.acquire(0, Tag::new(Purpose::Nonce, MaterialSemantics::Direct));
        assert!(buf.is_empty());
        assert_eq!(buf.data(), &[] as &[u8]);
    }

    #[test]
    fn released_buffer_is_zeroized_before_reuse() {
        let pool = Pool;
        {
            let mut buf = pool.acquire(64, Tag::new(Purpose::Signing, MaterialSemantics::Direct));
            buf.data_mut().fill(0xAB);
        }
        let buf = pool.acquire(64, Tag::new(Purpose::Signing, MaterialSemantics::Direct));
        assert!(buf.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn stats_track_rent_and_release() {
        let pool = Pool;
        let (before_rented, before_released) = pool.stats();
        {
            let _buf = pool.acquire(16, Tag::new(Purpose::Digest, MaterialSemantics::Direct));
        }
        let (after_rented, after_released) = pool.stats();
        assert!(after_rented > before_rented);
        assert!(after_released > before_released);
    }
}
