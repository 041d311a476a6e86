//! # Cola de Conexiones
//! src/server/queue.rs
//!
//! Cola FIFO thread-safe sin límite de capacidad entre el acceptor (único
//! productor) y los workers (N consumidores).
//!
//! - `push` nunca bloquea ni falla
//! - `pop_timeout` bloquea hasta que haya un elemento, venza el timeout o
//!   alguien llame a `wake_all`

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

struct QueueState<T> {
    items: VecDeque<T>,

    /// Se incrementa en cada `wake_all` para liberar a los que esperan
    wake_generation: u64,
}

/// Cola FIFO con remoción bloqueante
pub struct WorkQueue<T> {
    state: Mutex<QueueState<T>>,

    /// Condvar para notificar cuando hay nuevos elementos
    available: Condvar,
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                wake_generation: 0,
            }),
            available: Condvar::new(),
        }
    }

    /// El estado sigue siendo consistente aunque un thread haya hecho panic
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Encola al final y despierta a un consumidor
    pub fn push(&self, item: T) {
        self.lock().items.push_back(item);
        self.available.notify_one();
    }

    /// Desencola el primer elemento esperando a lo sumo `timeout`
    ///
    /// Retorna `None` si venció el timeout o si hubo un `wake_all`.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let state = self.lock();
        let generation = state.wake_generation;

        let (mut state, _) = self
            .available
            .wait_timeout_while(state, timeout, |s| {
                s.items.is_empty() && s.wake_generation == generation
            })
            .unwrap_or_else(PoisonError::into_inner);

        state.items.pop_front()
    }

    /// Intenta desencolar sin bloquear
    pub fn try_pop(&self) -> Option<T> {
        self.lock().items.pop_front()
    }

    /// Despierta a todos los consumidores que están esperando
    pub fn wake_all(&self) {
        self.lock().wake_generation += 1;
        self.available.notify_all();
    }

    /// Retorna el tamaño actual de la cola
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Verifica si la cola está vacía
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_fifo_order() {
        let queue = WorkQueue::new();
        for i in 0..5 {
            queue.push(i);
        }

        let drained: Vec<_> = (0..5).map(|_| queue.try_pop().unwrap()).collect();
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_pop_timeout_on_empty_queue() {
        let queue: WorkQueue<u32> = WorkQueue::new();
        let start = Instant::now();

        assert_eq!(queue.pop_timeout(Duration::from_millis(50)), None);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_pop_returns_immediately_when_available() {
        let queue = WorkQueue::new();
        queue.push("conn");

        let start = Instant::now();
        assert_eq!(queue.pop_timeout(Duration::from_secs(10)), Some("conn"));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_blocked_consumer_receives_push() {
        let queue = Arc::new(WorkQueue::new());
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop_timeout(Duration::from_secs(10)))
        };

        thread::sleep(Duration::from_millis(50));
        queue.push(7);
        assert_eq!(consumer.join().unwrap(), Some(7));
    }

    #[test]
    fn test_wake_all_releases_waiters() {
        let queue: Arc<WorkQueue<u32>> = Arc::new(WorkQueue::new());
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    let start = Instant::now();
                    let item = queue.pop_timeout(Duration::from_secs(10));
                    (item, start.elapsed())
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(100));
        queue.wake_all();

        for waiter in waiters {
            let (item, elapsed) = waiter.join().unwrap();
            assert_eq!(item, None);
            assert!(elapsed < Duration::from_secs(5));
        }
    }

    #[test]
    fn test_every_item_consumed_exactly_once() {
        let queue = Arc::new(WorkQueue::new());
        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    let mut seen = Vec::new();
                    while let Some(item) = queue.pop_timeout(Duration::from_millis(200)) {
                        seen.push(item);
                    }
                    seen
                })
            })
            .collect();

        for i in 0..1000 {
            queue.push(i);
        }

        let mut all: Vec<u32> = consumers.into_iter().flat_map(|c| c.join().unwrap()).collect();
        all.sort_unstable();
        assert_eq!(all, (0..1000).collect::<Vec<_>>());
    }
}
