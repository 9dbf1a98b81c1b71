use crate::errors::Error;

use futures::future::select_all;
use log;
use std::fmt;
use tokio::signal::unix::signal;
use tokio::signal::unix::Signal;
use tokio::signal::unix::SignalKind;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShutdownSignal {
    /* SIGINT, CTRL^C on a terminal */
    Interrupt,

    /* SIGTERM, what the kubelet sends when the pod is deleted */
    Terminate,
}

impl ShutdownSignal {

    fn kind(&self) -> SignalKind {
	match self {
	    ShutdownSignal::Interrupt => SignalKind::interrupt(),
	    ShutdownSignal::Terminate => SignalKind::terminate(),
	}
    }
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	match self {
	    ShutdownSignal::Interrupt => f.write_str("SIGINT"),
	    ShutdownSignal::Terminate => f.write_str("SIGTERM"),
	}
    }
}

/*
 * ShutdownListener holds the registration for a set of signals.  Once
 * registered, a signal no longer kills the process: it is queued until
 * recv() is awaited.
 *
 * Dropping the listener releases the registration.
 */
pub struct ShutdownListener {
    streams: Vec<(ShutdownSignal, Signal)>,
}

impl ShutdownListener {

    pub fn register(signals: &[ShutdownSignal]) -> Result<Self, Error> {
	let mut streams = Vec::with_capacity(signals.len());

	for sig in signals {
	    let stream = signal(sig.kind()).map_err(Error::SignalRegistration)?;
	    log::debug!("Listening for {}", sig);
	    streams.push((*sig, stream));
	}

	Ok(Self{ streams })
    }

    /*
     * Waits, with no timeout, until any of the registered signals arrives.
     * With nothing registered it waits forever.
     */
    pub async fn recv(mut self) -> ShutdownSignal {
	if self.streams.is_empty() {
	    return futures::future::pending().await;
	}

	let waits = self.streams
	    .iter_mut()
	    .map(|(sig, stream)| {
		let sig = *sig;
		Box::pin(async move {
		    stream.recv().await;
		    sig
		})
	    })
	    .collect::<Vec<_>>();

	let (sig, _, _) = select_all(waits).await;
	sig
    }
}

#[cfg(test)]
mod tests {
    use super::{ShutdownListener, ShutdownSignal};
    use std::time::Duration;

    #[tokio::test]
    async fn test_register_interrupt_and_terminate() {
	let listener = ShutdownListener::register(&[ShutdownSignal::Interrupt, ShutdownSignal::Terminate]).unwrap();
	assert_eq!(listener.streams.len(), 2);
    }

    #[tokio::test]
    async fn test_recv_terminate() {
	let listener = ShutdownListener::register(&[ShutdownSignal::Terminate]).unwrap();

	let status = std::process::Command::new("kill")
	    .args(["-TERM", &std::process::id().to_string()])
	    .status()
	    .unwrap();
	assert!(status.success());

	let received = tokio::time::timeout(Duration::from_secs(5), listener.recv()).await.unwrap();
	assert_eq!(received, ShutdownSignal::Terminate);
    }

    #[test]
    fn test_display() {
	assert_eq!(ShutdownSignal::Interrupt.to_string(), "SIGINT");
	assert_eq!(ShutdownSignal::Terminate.to_string(), "SIGTERM");
    }
}
