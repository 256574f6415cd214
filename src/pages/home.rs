use leptos::prelude::*;

use crate::components::leitmotif_graph::{GraphConfig, LeitmotifGraph};

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<div class="fullscreen-graph">
			<LeitmotifGraph config={GraphConfig::default()} fullscreen=true />
			<div class="graph-overlay">
				<h1>"Leitmotifs"</h1>
				<p class="subtitle">
					"Drag nodes to reposition. Scroll or pinch to zoom. Drag the background to pan."
				</p>
			</div>
		</div>
	}
}
