/*! Streams connecting blocks.

Blocks are connected with streams. A block can have zero or more input
streams and zero or more output streams. This pipeline runs on exactly
one thread with no backpressure beneath the dispatch loop, so unlike
`rustradio`'s `Arc<Mutex<..>>`-guarded circular buffer, a stream here is
a plain `Rc<RefCell<VecDeque<T>>>`: cheap to share between a block and
the handle its constructor returns, with no locking.

Two flavors exist, mirroring `rustradio`:

* [`ReadStream`]/[`WriteStream`] carry `Copy` samples (I/Q, floats) in
  bulk.
* [`NCReadStream`]/[`NCWriteStream`] ("non-copy") carry one item at a
  time, for types too large or structured to want copied sample-by-
  sample — here, whole [`crate::pulse_data::PulseBurst`]s, the
  equivalent of `rustradio`'s `Vec<T>` PDU streams.
*/

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A FIFO of `Copy` samples shared between one writer and one reader.
pub struct Stream<T> {
    buf: RefCell<VecDeque<T>>,
    eof: RefCell<bool>,
}

impl<T> Default for Stream<T> {
    fn default() -> Self {
        Self {
            buf: RefCell::new(VecDeque::new()),
            eof: RefCell::new(false),
        }
    }
}

/// Create a new sample stream, returning the write and read handles.
#[must_use]
pub fn new_stream<T>() -> (WriteStream<T>, ReadStream<T>) {
    let inner = Rc::new(Stream::default());
    (
        WriteStream {
            inner: inner.clone(),
        },
        ReadStream { inner },
    )
}

/// Write side of a [`Stream`].
pub struct WriteStream<T> {
    inner: Rc<Stream<T>>,
}

impl<T> Clone for WriteStream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> WriteStream<T> {
    /// Push samples onto the stream.
    pub fn write(&self, samples: impl IntoIterator<Item = T>) {
        self.inner.buf.borrow_mut().extend(samples);
    }

    /// Mark the stream as having no more data coming.
    pub fn close(&self) {
        *self.inner.eof.borrow_mut() = true;
    }
}

/// Read side of a [`Stream`].
pub struct ReadStream<T> {
    inner: Rc<Stream<T>>,
}

impl<T> Clone for ReadStream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Copy> ReadStream<T> {
    /// Number of samples currently available.
    #[must_use]
    pub fn available(&self) -> usize {
        self.inner.buf.borrow().len()
    }

    /// True if the writer closed the stream and all samples were drained.
    #[must_use]
    pub fn eof(&self) -> bool {
        *self.inner.eof.borrow() && self.available() == 0
    }

    /// Drain up to `max` samples.
    pub fn drain(&self, max: usize) -> Vec<T> {
        let mut buf = self.inner.buf.borrow_mut();
        let n = std::cmp::min(max, buf.len());
        buf.drain(..n).collect()
    }
}

/// A queue of non-`Copy`, one-item-at-a-time values (bursts, PDUs).
struct NcInner<T> {
    buf: RefCell<VecDeque<T>>,
    eof: RefCell<bool>,
}

/// Write side of a non-copy stream.
pub struct NCWriteStream<T> {
    inner: Rc<NcInner<T>>,
}

impl<T> Clone for NCWriteStream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> NCWriteStream<T> {
    /// Push one item (taking ownership).
    pub fn push(&self, item: T) {
        self.inner.buf.borrow_mut().push_back(item);
    }

    /// Mark the stream as having no more items coming.
    pub fn close(&self) {
        *self.inner.eof.borrow_mut() = true;
    }
}

/// Read side of a non-copy stream.
pub struct NCReadStream<T> {
    inner: Rc<NcInner<T>>,
}

impl<T> Clone for NCReadStream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> NCReadStream<T> {
    /// Pop one item, if available.
    pub fn pop(&self) -> Option<T> {
        self.inner.buf.borrow_mut().pop_front()
    }

    /// True if the writer closed the stream and all items were drained.
    #[must_use]
    pub fn eof(&self) -> bool {
        *self.inner.eof.borrow() && self.inner.buf.borrow().is_empty()
    }
}

/// Create a new non-copy stream, returning the write and read handles.
#[must_use]
pub fn new_nocopy_stream<T>() -> (NCWriteStream<T>, NCReadStream<T>) {
    let inner = Rc::new(NcInner {
        buf: RefCell::new(VecDeque::new()),
        eof: RefCell::new(false),
    });
    (
        NCWriteStream {
            inner: inner.clone(),
        },
        NCReadStream { inner },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_stream_round_trips() {
        let (w, r) = new_stream::<u8>();
        w.write([1u8, 2, 3]);
        assert_eq!(r.available(), 3);
        assert_eq!(r.drain(2), vec![1, 2]);
        assert_eq!(r.available(), 1);
        assert!(!r.eof());
        w.close();
        assert!(!r.eof());
        r.drain(1);
        assert!(r.eof());
    }

    #[test]
    fn nocopy_stream_round_trips() {
        let (w, r) = new_nocopy_stream::<Vec<u8>>();
        w.push(vec![1, 2, 3]);
        w.push(vec![4, 5]);
        assert_eq!(r.pop(), Some(vec![1, 2, 3]));
        assert_eq!(r.pop(), Some(vec![4, 5]));
        assert_eq!(r.pop(), None);
        w.close();
        assert!(r.eof());
    }
}
