// PhraseQueue - FIFO of phrases awaiting expansion
//
// RUST CONCEPT: A singly linked list without unsafe
// Links live in a Vec and point at each other by index. The queue keeps head
// and tail indices so enqueue never scans, and freed slots are reused so a
// long-lived queue does not keep growing.

use crate::error::ContainerError;
use crate::phrase::Phrase;

#[derive(Debug, Clone)]
struct Link {
    phrase: Option<Phrase>, // None once the slot is on the free list
    next: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct PhraseQueue {
    links: Vec<Link>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl PhraseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, phrase: Phrase) {
        let link = Link {
            phrase: Some(phrase),
            next: None,
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.links[index] = link;
                index
            }
            None => {
                self.links.push(link);
                self.links.len() - 1
            }
        };

        // Link from the current last item, or start the chain
        match self.tail {
            Some(tail) => self.links[tail].next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
    }

    pub fn dequeue(&mut self) -> Result<Phrase, ContainerError> {
        let index = self.head.ok_or(ContainerError::QueueEmpty)?;
        let link = &mut self.links[index];
        let phrase = link.phrase.take().ok_or(ContainerError::QueueEmpty)?;

        self.head = link.next.take();
        self.len -= 1;

        if self.head.is_none() {
            // Drained: drop every slot but keep the allocation
            self.tail = None;
            self.links.clear();
            self.free.clear();
        } else {
            self.free.push(index);
        }

        Ok(phrase)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl FromIterator<Phrase> for PhraseQueue {
    fn from_iter<I: IntoIterator<Item = Phrase>>(iter: I) -> Self {
        let mut queue = PhraseQueue::new();
        queue.extend(iter);
        queue
    }
}

impl Extend<Phrase> for PhraseQueue {
    fn extend<I: IntoIterator<Item = Phrase>>(&mut self, iter: I) {
        for phrase in iter {
            self.enqueue(phrase);
        }
    }
}
