use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Turns SIGINT/SIGTERM into a cooperative stop: the chunk being written
/// finishes, no further chunk or entity starts.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    cancel_token: CancellationToken,
    shutdown_requested: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new(cancel_token: CancellationToken) -> Self {
        Self {
            cancel_token,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn register_handlers(&self) {
        let coordinator = self.clone();

        tokio::spawn(async move {
            let ctrl_c = async {
                signal::ctrl_c()
                    .await
                    .expect("Failed to install SIGINT handler");
            };

            #[cfg(unix)]
            let terminate = async {
                signal::unix::signal(signal::unix::SignalKind::terminate())
                    .expect("Failed to install SIGTERM handler")
                    .recv()
                    .await;
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => info!("Received SIGINT"),
                _ = terminate => info!("Received SIGTERM"),
            }

            coordinator.request_stop();
        });
    }

    pub fn request_stop(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
        self.cancel_token.cancel();
        warn!("Stop requested: finishing the chunk in flight, starting nothing new");
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    /// Any failure, including a run where only some entities failed.
    GeneralError = 1,
    ShutdownRequested = 130, // Standard exit code for SIGINT
}

impl ExitCode {
    pub fn resolve(succeeded: bool, shutdown_requested: bool) -> Self {
        match (shutdown_requested, succeeded) {
            (true, _) => ExitCode::ShutdownRequested,
            (false, true) => ExitCode::Success,
            (false, false) => ExitCode::GeneralError,
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_precedence() {
        assert_eq!(ExitCode::resolve(true, false).as_i32(), 0);
        assert_eq!(ExitCode::resolve(false, false).as_i32(), 1);
        assert_eq!(ExitCode::resolve(true, true).as_i32(), 130);
        assert_eq!(ExitCode::resolve(false, true).as_i32(), 130);
    }

    #[tokio::test]
    async fn test_request_stop_cancels_token() {
        let token = CancellationToken::new();
        let coordinator = ShutdownCoordinator::new(token.clone());
        assert!(!coordinator.is_shutdown_requested());

        coordinator.request_stop();

        assert!(coordinator.is_shutdown_requested());
        assert!(token.is_cancelled());
    }
}
