/*! Block trait, shared by every node in a receiver graph.

Blocks are the building blocks of the pipeline: a sample source, a pulse
detector, and the decoder dispatch loop are each one `Block`. You
connect them with [`crate::stream::Stream`]s and run them with
[`crate::graph::Graph`].

This is a smaller cousin of `rustradio`'s block model: that framework
runs blocks across threads, so `work()` there negotiates backpressure
through a lock-free circular buffer. This pipeline is single-threaded
and cooperative, with no backpressure below the dispatch loop, so
`work()` below just drains what is available and returns.
*/

use crate::Error;

/// Return type for a block's `work()` call, telling the [`crate::graph::Graph`]
/// runner whether to keep scheduling this block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRet {
    /// At least one item was produced or consumed.
    Ok,

    /// Nothing was produced, because there wasn't enough input.
    ///
    /// When every block in a graph returns `Noop` or `Eof` on the same
    /// pass, the graph is done and `Graph::run()` returns.
    Noop,

    /// This block will never produce anything else.
    Eof,
}

/// Trait every pipeline node implements.
pub trait Block {
    /// Human-readable block name, for logging.
    fn block_name(&self) -> &str;

    /// Do one unit of work: drain available input, produce available
    /// output.
    fn work(&mut self) -> Result<BlockRet, Error>;

    /// Return true once this block will never produce more output.
    ///
    /// Default implementation never reports EOF; sources that reach the
    /// end of a finite input override this.
    fn eof(&self) -> bool {
        false
    }
}
