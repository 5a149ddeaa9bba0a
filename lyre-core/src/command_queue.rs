use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::commands::PlaybackCommand;

/// Whether a command equal to the current tail is queued again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupPolicy {
    #[default]
    KeepAll,
    SkipRepeatedTail,
}

/// Mutex-guarded FIFO between any number of producers and the scheduler thread
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Mutex<VecDeque<PlaybackCommand>>,
    dedup: DedupPolicy,
}

impl CommandQueue {
    pub fn new(dedup: DedupPolicy) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            dedup,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<PlaybackCommand>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push a command. Returns false when the dedup policy dropped it.
    pub fn enqueue(&self, command: PlaybackCommand) -> bool {
        let mut pending = self.lock();
        if self.dedup == DedupPolicy::SkipRepeatedTail && pending.back() == Some(&command) {
            log::debug!("Dropping repeated {} command", command.name());
            return false;
        }
        pending.push_back(command);
        true
    }

    /// Pop the oldest command, never blocks
    pub fn try_dequeue(&self) -> Option<PlaybackCommand> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;
    use crate::{commands::PlaybackOption, library::TrackId, playlist::PlayList};

    #[test]
    fn strict_fifo() {
        let queue = CommandQueue::default();
        queue.enqueue(PlaybackCommand::Pause);
        queue.enqueue(PlaybackCommand::Next);
        queue.enqueue(PlaybackCommand::Exit);

        assert_eq!(queue.try_dequeue(), Some(PlaybackCommand::Pause));
        assert_eq!(queue.try_dequeue(), Some(PlaybackCommand::Next));
        assert_eq!(queue.try_dequeue(), Some(PlaybackCommand::Exit));
        assert_eq!(queue.try_dequeue(), None);
    }

    #[test]
    fn keep_all_queues_duplicates() {
        let queue = CommandQueue::new(DedupPolicy::KeepAll);
        assert!(queue.enqueue(PlaybackCommand::Next));
        assert!(queue.enqueue(PlaybackCommand::Next));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn skip_repeated_tail_only_checks_the_tail() {
        let queue = CommandQueue::new(DedupPolicy::SkipRepeatedTail);
        assert!(queue.enqueue(PlaybackCommand::Next));
        assert!(!queue.enqueue(PlaybackCommand::Next));
        assert!(queue.enqueue(PlaybackCommand::Toggle));
        assert!(queue.enqueue(PlaybackCommand::Next));
        assert_eq!(queue.len(), 3);

        let list = PlayList::from(vec![TrackId(1)]);
        assert!(queue.enqueue(PlaybackCommand::play(list.clone(), PlaybackOption::Shuffle)));
        assert!(!queue.enqueue(PlaybackCommand::play(list.clone(), PlaybackOption::Shuffle)));
        assert!(queue.enqueue(PlaybackCommand::play(
            list,
            PlaybackOption::PlayAfterCurrentTrack
        )));
    }

    #[test]
    fn concurrent_producers_lose_nothing() {
        let queue = Arc::new(CommandQueue::default());
        let producers: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for _ in 0..250 {
                        queue.enqueue(PlaybackCommand::Next);
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        let mut drained = 0;
        while queue.try_dequeue().is_some() {
            drained += 1;
        }
        assert_eq!(drained, 1000);
        assert!(queue.is_empty());
    }
}
