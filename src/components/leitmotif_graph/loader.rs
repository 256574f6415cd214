//! Fetches graph definitions relative to the page origin.

use js_sys::Error as JsError;
use log::info;
use serde_json::Value;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

#[derive(Debug, Error)]
pub enum LoadError {
	#[error("no browser window available")]
	NoWindow,
	#[error("{context}: {message}")]
	Js { context: &'static str, message: String },
	#[error("couldn't retrieve {url}: {status} - {status_text}")]
	Status {
		url: String,
		status: u16,
		status_text: String,
	},
	#[error("response body from {url} is not text")]
	NotText { url: String },
	#[error("invalid JSON from {url}: {source}")]
	Json {
		url: String,
		#[source]
		source: serde_json::Error,
	},
}

impl LoadError {
	fn js(context: &'static str, value: JsValue) -> Self {
		let message = match value.dyn_ref::<JsError>() {
			Some(error) => String::from(error.message()),
			None => value.as_string().unwrap_or_else(|| format!("{value:?}")),
		};
		LoadError::Js { context, message }
	}
}

/// Absolute URL for an endpoint path on the current origin.
pub fn endpoint_url(origin: &str, path: &str) -> String {
	match (origin.ends_with('/'), path.starts_with('/')) {
		(true, true) => format!("{origin}{}", &path[1..]),
		(false, false) => format!("{origin}/{path}"),
		_ => format!("{origin}{path}"),
	}
}

pub async fn fetch_document(path: &str) -> Result<Value, LoadError> {
	let window = web_sys::window().ok_or(LoadError::NoWindow)?;
	let origin = window
		.location()
		.origin()
		.map_err(|err| LoadError::js("reading page origin", err))?;
	let url = endpoint_url(&origin, path);
	info!("fetching {url}");

	let response = JsFuture::from(window.fetch_with_str(&url))
		.await
		.map_err(|err| LoadError::js("fetch", err))?;
	let response: Response = response
		.dyn_into()
		.map_err(|err| LoadError::js("fetch returned a non-response", err))?;

	if !response.ok() {
		return Err(LoadError::Status {
			url,
			status: response.status(),
			status_text: response.status_text(),
		});
	}

	let body = response
		.text()
		.map_err(|err| LoadError::js("reading body", err))?;
	let body = JsFuture::from(body)
		.await
		.map_err(|err| LoadError::js("reading body", err))?;
	let text = body.as_string().ok_or_else(|| LoadError::NotText { url: url.clone() })?;

	serde_json::from_str(&text).map_err(|source| LoadError::Json { url, source })
}
