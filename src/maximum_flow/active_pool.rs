use std::sync::{Mutex, PoisonError};

/// A node taken out of the [`ActivePool`]. Only the pool hands these out, and
/// the handle is not `Clone`, so exactly one worker drives a node at a time.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ActiveNode(usize);

impl ActiveNode {
    #[inline]
    pub(crate) fn id(&self) -> usize {
        self.0
    }
}

struct Stack {
    head: Option<usize>,
    next: Vec<Option<usize>>,
    len: usize,
    entered: usize,
}

/// LIFO stack of nodes carrying excess, linked through per-node `next` slots.
/// Source and sink are never admitted.
pub(crate) struct ActivePool {
    source: usize,
    sink: usize,
    stack: Mutex<Stack>,
}

impl ActivePool {
    pub(crate) fn new(num_nodes: usize, source: usize, sink: usize) -> Self {
        Self { source, sink, stack: Mutex::new(Stack { head: None, next: vec![None; num_nodes], len: 0, entered: 0 }) }
    }

    pub(crate) fn enter(&self, node: usize) {
        if node == self.source || node == self.sink {
            return;
        }
        // the stack is consistent after every statement, so a poisoned lock is still usable
        let mut stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        stack.next[node] = stack.head;
        stack.head = Some(node);
        stack.len += 1;
        stack.entered += 1;
    }

    pub(crate) fn leave(&self) -> Option<ActiveNode> {
        let mut stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        let node = stack.head?;
        stack.head = stack.next[node].take();
        stack.len -= 1;
        Some(ActiveNode(node))
    }

    pub(crate) fn len(&self) -> usize {
        self.stack.lock().unwrap_or_else(PoisonError::into_inner).len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `enter` calls that admitted a node since the pool was created.
    pub(crate) fn entered(&self) -> usize {
        self.stack.lock().unwrap_or_else(PoisonError::into_inner).entered
    }
}
