//! Interactive device-code sign-in.
//!
//! The operator is shown a verification page and a user code on standard error while the
//! token endpoint is polled. Standard output is never touched so the JSON envelope stays
//! the only thing written there.

// std
use std::io::{self, Write};
// self
use crate::{
	_prelude::*,
	flows::{SignIn, SignInFuture},
	http::ReqwestHttpClient,
	oauth::{DeviceCodeFacade, DeviceCodeTicket},
	provider::ServiceDescriptor,
};

type Prompt = dyn Fn(&DeviceCodeTicket) + Send + Sync;

/// [`SignIn`] backed by the OAuth 2.0 device authorization grant.
#[derive(Clone)]
pub struct DeviceCodeSignIn {
	facade: DeviceCodeFacade,
	prompt: Arc<Prompt>,
}
impl DeviceCodeSignIn {
	/// Creates a sign-in for the descriptor that prompts on standard error.
	pub fn new(descriptor: &ServiceDescriptor, http_client: ReqwestHttpClient) -> Self {
		Self {
			facade: DeviceCodeFacade::from_descriptor(descriptor, http_client),
			prompt: Arc::new(prompt_on_stderr),
		}
	}

	/// Replaces the operator prompt.
	pub fn with_prompt(mut self, prompt: impl Fn(&DeviceCodeTicket) + Send + Sync + 'static) -> Self {
		self.prompt = Arc::new(prompt);

		self
	}
}
impl SignIn for DeviceCodeSignIn {
	fn sign_in(&self) -> SignInFuture<'_> {
		Box::pin(async move {
			let ticket = self.facade.request_device_code().await?;

			tracing::debug!(
				expires_in = ticket.expires_in().as_secs(),
				interval = ticket.interval().as_secs(),
				"Device code issued."
			);

			(self.prompt)(&ticket);

			self.facade.poll_token(&ticket).await
		})
	}
}
impl Debug for DeviceCodeSignIn {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DeviceCodeSignIn").field("facade", &self.facade).finish_non_exhaustive()
	}
}

/// Formats the instruction shown to the operator.
pub fn prompt_message(ticket: &DeviceCodeTicket) -> String {
	format!(
		"To sign in, use a web browser to open the page {} and enter the code {} to authenticate.",
		ticket.verification_uri(),
		ticket.user_code()
	)
}

fn prompt_on_stderr(ticket: &DeviceCodeTicket) {
	let mut stderr = io::stderr().lock();

	// Nothing sensible to do if the terminal is gone; polling continues regardless.
	let _ = writeln!(stderr, "{}", prompt_message(ticket));
	let _ = stderr.flush();
}
