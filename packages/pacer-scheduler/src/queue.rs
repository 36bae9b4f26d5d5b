use crate::task::TaskId;
use std::cell::RefCell;
use std::collections::VecDeque;

/// A deferred start of one task, invoked with the context that admits it.
pub(crate) type Runner<C> = Box<dyn FnOnce(&C)>;

pub(crate) struct QueuedTask<C> {
    pub id: TaskId,
    pub run: Runner<C>,
}

/// A simple FIFO queue of task runners.
/// The scheduler is single-threaded, so we use RefCell<VecDeque>.
pub(crate) struct TaskQueue<C> {
    queue: RefCell<VecDeque<QueuedTask<C>>>,
}

impl<C> Default for TaskQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TaskQueue<C> {
    pub fn new() -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
        }
    }

    pub fn push(&self, id: TaskId, run: Runner<C>) {
        self.queue.borrow_mut().push_back(QueuedTask { id, run });
    }

    /// Removes the head. The borrow is released before the caller runs it,
    /// so runners may push or pop re-entrantly.
    pub fn pop(&self) -> Option<QueuedTask<C>> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_fifo_order() {
        let queue: TaskQueue<RefCell<Vec<u64>>> = TaskQueue::new();
        for n in 0..3 {
            queue.push(
                TaskId::from_raw(n),
                Box::new(move |log: &RefCell<Vec<u64>>| log.borrow_mut().push(n)),
            );
        }
        assert_eq!(queue.len(), 3);

        let log = RefCell::new(Vec::new());
        while let Some(task) = queue.pop() {
            (task.run)(&log);
        }
        assert_eq!(log.into_inner(), vec![0, 1, 2]);
        assert!(queue.is_empty());
    }
}
