use leptos::prelude::*;

/// 404 page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<h1>"Not found"</h1>
		<p>"There is no graph here. " <a href="/">"Back to the leitmotifs"</a></p>
	}
}
