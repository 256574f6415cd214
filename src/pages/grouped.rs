use leptos::prelude::*;

use crate::components::leitmotif_graph::{GraphConfig, LeitmotifGraph};

const GROUPED_ENDPOINT: &str = "/utdr-leitmotif-graph.json";

/// The same graph, fed from the grouped (`motifGroups`) document.
#[component]
pub fn Grouped() -> impl IntoView {
	view! {
		<div class="fullscreen-graph">
			<LeitmotifGraph config={GraphConfig::grouped(GROUPED_ENDPOINT)} fullscreen=true />
		</div>
	}
}
