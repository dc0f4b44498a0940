//! Shutdown Coordination
//!
//! Provides cancellation tokens for blocked producers and a coordinator that
//! turns process signals into a broadcast shutdown notification.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Cloneable flag that a blocked operation polls to abandon its wait
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        // Release pairs with the Acquire in is_cancelled
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Coordinates graceful shutdown across the application
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator
    pub fn new() -> (Self, broadcast::Receiver<()>) {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(8);

        let coordinator = Self {
            shutdown_tx,
            token: CancellationToken::new(),
        };

        (coordinator, shutdown_rx)
    }

    /// Subscribe to shutdown notifications
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Token that is cancelled when shutdown is triggered
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Trigger shutdown
    pub fn trigger_shutdown(&self) {
        self.token.cancel();
        let _ = self.shutdown_tx.send(());
    }

    /// Check if shutdown has been requested
    pub fn is_shutdown_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Install signal handlers that trigger this coordinator
    ///
    /// The first signal requests a graceful shutdown; a second one exits the
    /// process with status 130. Must be called from within a tokio runtime.
    pub fn install_signal_handlers(&self) {
        setup_signal_handlers(self.shutdown_tx.clone(), self.token.clone());
    }
}

fn setup_signal_handlers(shutdown_tx: broadcast::Sender<()>, token: CancellationToken) {
    use std::sync::atomic::AtomicUsize;

    let signal_count = Arc::new(AtomicUsize::new(0));

    let on_signal = move |tx: &broadcast::Sender<()>, token: &CancellationToken, ctr: &AtomicUsize| {
        let prev = ctr.fetch_add(1, Ordering::AcqRel);
        token.cancel();
        let _ = tx.send(());
        if prev >= 1 {
            log::warn!("Second interrupt received; exiting immediately");
            std::process::exit(130);
        }
        log::info!("Interrupt received; shutting down (repeat to force exit)");
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        // Restore default SIGPIPE so piping output into `head` ends quietly
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }

        for kind in [
            SignalKind::terminate(),
            SignalKind::hangup(),
            SignalKind::quit(),
        ] {
            let tx = shutdown_tx.clone();
            let token = token.clone();
            let ctr = signal_count.clone();

            tokio::spawn(async move {
                if let Ok(mut sig) = signal(kind) {
                    while sig.recv().await.is_some() {
                        on_signal(&tx, &token, &ctr);
                    }
                }
            });
        }
    }

    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            on_signal(&shutdown_tx, &token, &signal_count);
        }
    });
}
