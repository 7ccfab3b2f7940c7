use leptos::prelude::*;

use crate::components::constellation::ConstellationCanvas;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-constellation">
				<ConstellationCanvas fullscreen=true />
				<div class="constellation-overlay">
					<h1>"Constellation"</h1>
					<p class="subtitle">"Nodes drift, reach for each other, and briefly hold a shape."</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
