use leptos::prelude::*;

use crate::components::constellation::ConstellationCanvas;

/// 404 Not Found Page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="fullscreen-constellation">
			<ConstellationCanvas fullscreen=true reduced_capacity=Some(true) />
			<div class="constellation-overlay">
				<h1>"Uh oh!" <br /> "We couldn't find that page!"</h1>
				<a href="/">"Back home"</a>
			</div>
		</div>
	}
}
