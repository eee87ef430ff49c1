use std::collections::VecDeque;
use std::ops::{Deref, DerefMut, Drop};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use async_trait::async_trait;
use futures::channel::oneshot;

#[async_trait]
pub trait Factory {
    type Output;

    async fn make(&self) -> Self::Output;
}

/// A borrowed connection. Dropping it hands the connection back to the
/// pool, there is no separate release step to forget.
pub struct Connect<C, F>
where
    F: Factory<Output = C>,
{
    connect: Option<C>,
    pool: Weak<SharedPool<C, F>>,
}

impl<C, F> Deref for Connect<C, F>
where
    F: Factory<Output = C>,
{
    type Target = C;

    fn deref(&self) -> &C {
        self.connect.as_ref().unwrap()
    }
}

impl<C, F> DerefMut for Connect<C, F>
where
    F: Factory<Output = C>,
{
    fn deref_mut(&mut self) -> &mut C {
        self.connect.as_mut().unwrap()
    }
}

impl<C, F> Drop for Connect<C, F>
where
    F: Factory<Output = C>,
{
    fn drop(&mut self) {
        if let (Some(conn), Some(pool)) = (self.connect.take(), self.pool.upgrade()) {
            pool.put_back(conn);
        }
    }
}

struct InternalPool<C> {
    waiters: VecDeque<oneshot::Sender<C>>,
    conns: VecDeque<C>,
}

struct SharedPool<C, F: Factory<Output = C>> {
    factory: F,
    state: Mutex<InternalPool<C>>,
}

impl<C, F: Factory<Output = C>> SharedPool<C, F> {
    // The lock only guards two queues, nothing holds it across an await.
    fn state(&self) -> MutexGuard<InternalPool<C>> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn put_back(&self, mut connect: C) {
        let mut state = self.state();
        while let Some(waiter) = state.waiters.pop_front() {
            // A waiter may have given up, hand the connection to the next one.
            if let Err(returned) = waiter.send(connect) {
                connect = returned;
            } else {
                return;
            }
        }
        state.conns.push_back(connect);
    }
}

/// A fixed-size connection pool. Cloning is cheap and every clone draws
/// from the same set of connections.
pub struct Pool<C, F: Factory<Output = C>> {
    inner: Arc<SharedPool<C, F>>,
}

impl<C, F: Factory<Output = C>> Clone for Pool<C, F> {
    fn clone(&self) -> Pool<C, F> {
        Pool {
            inner: self.inner.clone(),
        }
    }
}

impl<C, F> Pool<C, F>
where
    F: Factory<Output = C>,
{
    pub async fn with_num(num: usize, factory: F) -> Pool<C, F> {
        let mut conns: VecDeque<C> = VecDeque::with_capacity(num);
        for _ in 0..num {
            conns.push_back(factory.make().await);
        }
        let waiters = VecDeque::new();
        let internal_pool = InternalPool { waiters, conns };
        let shared_pool = SharedPool {
            state: Mutex::new(internal_pool),
            factory,
        };
        Pool {
            inner: Arc::new(shared_pool),
        }
    }

    pub async fn get(&self) -> Connect<C, F> {
        let pool = Arc::downgrade(&self.inner);
        let rx = {
            let mut state = self.inner.state();
            if let Some(conn) = state.conns.pop_front() {
                return Connect {
                    connect: Some(conn),
                    pool,
                };
            }
            let (tx, rx) = oneshot::channel::<C>();
            state.waiters.push_back(tx);
            rx
        };
        // `self` keeps the shared pool alive, so the sender cannot vanish.
        let conn = rx.await.expect("connection pool dropped while waiting");
        Connect {
            connect: Some(conn),
            pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NumberFactory(AtomicUsize);

    #[async_trait]
    impl Factory for NumberFactory {
        type Output = usize;

        async fn make(&self) -> usize {
            self.0.fetch_add(1, Ordering::SeqCst)
        }
    }

    fn factory() -> NumberFactory {
        NumberFactory(AtomicUsize::new(0))
    }

    #[tokio::test]
    async fn drop_returns_the_connection() {
        let pool = Pool::with_num(2, factory()).await;
        let a = pool.get().await;
        let b = pool.get().await;
        assert_eq!((*a, *b), (0, 1));
        drop(a);
        // No third connection is ever made.
        let c = pool.get().await;
        assert_eq!(*c, 0);
    }

    #[tokio::test]
    async fn exhausted_pool_waits_for_a_drop() {
        let pool = Pool::with_num(1, factory()).await;
        let held = pool.get().await;
        let waiting = tokio::spawn({
            let pool = pool.clone();
            async move {
                let conn = pool.get().await;
                *conn
            }
        });
        tokio::task::yield_now().await;
        drop(held);
        assert_eq!(waiting.await.unwrap(), 0);
    }
}
