//! # Pool de Workers
//! src/server/pool.rs
//!
//! Cola FIFO acotada de conexiones aceptadas y un número fijo de threads
//! que la consumen. Reemplaza el modelo de un thread por conexión.
//!
//! ```text
//! accept() ──▶ ConnectionQueue (cap N) ──▶ worker-0 .. worker-k
//! ```
//!
//! Cuando la cola está llena, `push` bloquea al acceptor hasta que un
//! worker libere un lugar: los clientes nuevos esperan en el backlog del
//! kernel en vez de crear threads sin límite.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// Cola acotada thread-safe
pub struct ConnectionQueue<T> {
    state: Mutex<QueueState<T>>,

    /// Notifica a workers cuando hay conexiones nuevas
    not_empty: Condvar,

    /// Notifica al acceptor cuando se liberó espacio
    not_full: Condvar,

    max_capacity: usize,
}

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

impl<T> ConnectionQueue<T> {
    /// Crea una nueva cola con capacidad máxima
    pub fn new(max_capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(max_capacity),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            max_capacity: max_capacity.max(1),
        }
    }

    /// Encola un elemento, bloqueando mientras la cola esté llena
    ///
    /// Si la cola se cerró devuelve el elemento en `Err`.
    pub fn push(&self, item: T) -> Result<(), T> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        while state.items.len() >= self.max_capacity && !state.closed {
            state = self
                .not_full
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if state.closed {
            return Err(item);
        }

        state.items.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Desencola el elemento más antiguo
    ///
    /// Bloquea hasta que haya uno. `None` cuando la cola está cerrada y vacía.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        loop {
            if let Some(item) = state.items.pop_front() {
                self.not_full.notify_one();
                return Some(item);
            }
            if state.closed {
                return None;
            }

            state = self
                .not_empty
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Cierra la cola: los workers terminan al vaciarla
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Retorna el tamaño actual de la cola
    pub(crate) fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .len()
    }

    /// Retorna la capacidad máxima
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }
}

/// Threads que consumen una [`ConnectionQueue`]
pub struct WorkerPool<T> {
    queue: Arc<ConnectionQueue<T>>,
    handles: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Inicia `workers` threads que aplican `handle` a cada elemento
    ///
    /// Un panic dentro de `handle` se registra y el worker sigue atendiendo.
    pub fn spawn<F>(workers: usize, queue_capacity: usize, handle: F) -> std::io::Result<Self>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let queue = Arc::new(ConnectionQueue::new(queue_capacity));
        let handle = Arc::new(handle);
        let mut handles = Vec::with_capacity(workers);

        for i in 0..workers.max(1) {
            let queue = Arc::clone(&queue);
            let handle = Arc::clone(&handle);

            let worker = thread::Builder::new()
                .name(format!("worker-{}", i))
                .spawn(move || Self::worker_loop(queue, handle))?;
            handles.push(worker);
        }

        tracing::debug!(workers = handles.len(), queue_capacity, "worker pool started");
        Ok(Self { queue, handles })
    }

    /// Loop principal del worker
    fn worker_loop<F>(queue: Arc<ConnectionQueue<T>>, handle: Arc<F>)
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        while let Some(item) = queue.pop() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| (*handle)(item)));
            if outcome.is_err() {
                tracing::error!("connection handler panicked");
            }
        }

        tracing::debug!("worker exiting");
    }

    /// Entrega un elemento a los workers (bloquea si la cola está llena)
    pub fn submit(&self, item: T) -> Result<(), T> {
        self.queue.push(item)
    }

    pub fn queue(&self) -> &ConnectionQueue<T> {
        &self.queue
    }

    pub fn workers(&self) -> usize {
        self.handles.len()
    }

    /// Cierra la cola y espera a que los workers terminen lo pendiente
    pub fn shutdown(self) {
        self.queue.close();
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}
