//! Owned output buffers with a release hook.
//!
//! A [`PackedBuffer`] owns its storage outright; moving it moves
//! ownership, and sharing it across owners goes through `Arc`. An optional
//! release hook runs exactly once, when the buffer is finally dropped,
//! with the number of elements released.

use std::fmt;
use std::ops::Deref;

/// Callback run once when a [`PackedBuffer`] is dropped. Receives the
/// element count.
pub type ReleaseHook = Box<dyn FnOnce(usize) + Send + Sync>;

/// A contiguous output buffer handed to the caller.
pub struct PackedBuffer<T> {
    data: Vec<T>,
    release: Option<ReleaseHook>,
}

impl<T> PackedBuffer<T> {
    /// Wrap `data` with no release hook.
    pub fn new(data: Vec<T>) -> Self {
        Self {
            data,
            release: None,
        }
    }

    /// Attach a hook run when the buffer is dropped, replacing any
    /// previous hook without running it.
    pub fn on_release(mut self, hook: impl FnOnce(usize) + Send + Sync + 'static) -> Self {
        self.release = Some(Box::new(hook));
        self
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Split into storage and hook.
    ///
    /// The hook does not run; whoever takes the parts now owns the
    /// obligation to release them.
    pub fn into_parts(mut self) -> (Vec<T>, Option<ReleaseHook>) {
        (std::mem::take(&mut self.data), self.release.take())
    }
}

impl<T> Deref for PackedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> From<Vec<T>> for PackedBuffer<T> {
    fn from(data: Vec<T>) -> Self {
        Self::new(data)
    }
}

impl<T> Drop for PackedBuffer<T> {
    fn drop(&mut self) {
        if let Some(hook) = self.release.take() {
            hook(self.data.len());
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PackedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedBuffer")
            .field("len", &self.data.len())
            .field("has_release", &self.release.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_hook(
        calls: &Arc<AtomicUsize>,
        released: &Arc<AtomicUsize>,
    ) -> impl FnOnce(usize) + Send + Sync + 'static {
        let calls = Arc::clone(calls);
        let released = Arc::clone(released);
        move |n| {
            calls.fetch_add(1, Ordering::SeqCst);
            released.store(n, Ordering::SeqCst);
        }
    }

    #[test]
    fn hook_runs_once_on_drop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let released = Arc::new(AtomicUsize::new(0));
        let buf = PackedBuffer::new(vec![1u8, 2, 3]).on_release(counting_hook(&calls, &released));
        assert_eq!(&buf[..], &[1, 2, 3]);
        drop(buf);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(released.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn shared_buffer_releases_after_last_owner() {
        let calls = Arc::new(AtomicUsize::new(0));
        let released = Arc::new(AtomicUsize::new(0));
        let buf = Arc::new(
            PackedBuffer::new(vec![0.5f32; 8]).on_release(counting_hook(&calls, &released)),
        );
        let other = Arc::clone(&buf);
        let handle = std::thread::spawn(move || other.len());
        assert_eq!(handle.join().unwrap(), 8);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        drop(buf);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn into_parts_hands_off_the_hook() {
        let calls = Arc::new(AtomicUsize::new(0));
        let released = Arc::new(AtomicUsize::new(0));
        let buf = PackedBuffer::new(vec![9u8; 4]).on_release(counting_hook(&calls, &released));
        let (data, hook) = buf.into_parts();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let hook = hook.unwrap();
        hook(data.len());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(released.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn empty_buffer_still_releases() {
        let calls = Arc::new(AtomicUsize::new(0));
        let released = Arc::new(AtomicUsize::new(7));
        drop(PackedBuffer::<u8>::new(Vec::new()).on_release(counting_hook(&calls, &released)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(released.load(Ordering::SeqCst), 0);
    }
}
