/*! Graphs contain blocks connected by streams, and run them.

Unlike `rustradio`'s `Graph`, which wires blocks by numbered ports
because any block may have any number of typed inputs/outputs, this
crate's graph shape is fixed: one source, one pulse detector, one
dispatch block, draining I/Q through the detector and dispatch loop to
the sinks and back around. `Graph` here is a thin ordered list that
calls `work()` on each block in turn until all of them report `Noop` or
`Eof`, which keeps the scheduling policy explicit and reviewable
without the bookkeeping `rustradio` needs for an arbitrary topology.
*/
use crate::Error;
use crate::block::{Block, BlockRet};
use log::debug;

/// An ordered pipeline of blocks, run to completion.
#[derive(Default)]
pub struct Graph {
    blocks: Vec<Box<dyn Block>>,
}

impl Graph {
    /// Create a new, empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block to the end of the pipeline.
    pub fn add(&mut self, b: Box<dyn Block>) {
        self.blocks.push(b);
    }

    /// Run every block in order, repeatedly, until none of them can make
    /// progress.
    pub fn run(&mut self) -> Result<(), Error> {
        loop {
            let mut all_done = true;
            for b in &mut self.blocks {
                match b.work()? {
                    BlockRet::Ok => all_done = false,
                    BlockRet::Noop => {
                        if !b.eof() {
                            all_done = false;
                        }
                    }
                    BlockRet::Eof => {}
                }
            }
            if all_done {
                debug!("Graph::run: all blocks idle, stopping");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{ReadStream, WriteStream, new_stream};

    struct Counter {
        dst: WriteStream<u32>,
        remaining: u32,
    }
    impl Block for Counter {
        fn block_name(&self) -> &str {
            "Counter"
        }
        fn work(&mut self) -> Result<BlockRet, Error> {
            if self.remaining == 0 {
                self.dst.close();
                return Ok(BlockRet::Eof);
            }
            self.dst.write([self.remaining]);
            self.remaining -= 1;
            Ok(BlockRet::Ok)
        }
        fn eof(&self) -> bool {
            self.remaining == 0
        }
    }

    struct Sum {
        src: ReadStream<u32>,
        total: std::rc::Rc<std::cell::RefCell<u32>>,
    }
    impl Block for Sum {
        fn block_name(&self) -> &str {
            "Sum"
        }
        fn work(&mut self) -> Result<BlockRet, Error> {
            let drained = self.src.drain(1024);
            if drained.is_empty() {
                return Ok(BlockRet::Noop);
            }
            *self.total.borrow_mut() += drained.iter().sum::<u32>();
            Ok(BlockRet::Ok)
        }
        fn eof(&self) -> bool {
            self.src.eof()
        }
    }

    #[test]
    fn runs_until_idle() {
        let (w, r) = new_stream();
        let total = std::rc::Rc::new(std::cell::RefCell::new(0));
        let mut g = Graph::new();
        g.add(Box::new(Counter {
            dst: w.clone(),
            remaining: 5,
        }));
        g.add(Box::new(Sum {
            src: r,
            total: total.clone(),
        }));
        g.run().unwrap();
        assert_eq!(*total.borrow(), 15);
        let _ = w;
    }
}
