use iced::futures::SinkExt;
use iced::{stream, Subscription};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, trace};

use crate::Message;

/// Turns SIGTERM/SIGINT into a single `Message::Terminate` so the event loop
/// shuts down normally and the instance lock is dropped.
pub fn termination_subscription() -> Subscription<Message> {
    #[derive(Hash)]
    struct Termination;

    trace!("termination_subscription() called");

    Subscription::run_with_id(
        std::any::TypeId::of::<Termination>(),
        stream::channel(1, move |mut output| async move {
            let (mut sigterm, mut sigint) =
                match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                    (Ok(term), Ok(int)) => (term, int),
                    (Err(e), _) | (_, Err(e)) => {
                        error!("Failed to install signal handlers: {}", e);
                        return std::future::pending().await;
                    }
                };

            tokio::select! {
                _ = sigterm.recv() => info!("SIGTERM received, bye bye!"),
                _ = sigint.recv() => info!("SIGINT received, bye bye!"),
            }

            let _ = output.send(Message::Terminate).await;
            std::future::pending::<()>().await;
        }),
    )
}
