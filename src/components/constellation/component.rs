use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, info};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Document, HtmlCanvasElement, IntersectionObserver,
	IntersectionObserverEntry, Window,
};

use crate::simulation::SurfaceConfig;

use super::canvas::{CanvasSurface, configure_backing_store, context_2d};
use super::engine::Engine;
use super::surface::RenderError;

/// Browser callbacks that must outlive the effect that registered them.
struct Listeners {
	_resize: Closure<dyn FnMut()>,
	_visibility: Closure<dyn FnMut()>,
	_intersection: Option<(IntersectionObserver, Closure<dyn FnMut(js_sys::Array)>)>,
}

fn measure(
	window: &Window,
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	reduced_capacity: Option<bool>,
) -> SurfaceConfig {
	let (width, height) = if fullscreen {
		(
			window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
			window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
		)
	} else {
		canvas
			.parent_element()
			.map(|p| (p.client_width() as f64, p.client_height() as f64))
			.unwrap_or((800.0, 600.0))
	};
	let pixel_density = window.device_pixel_ratio();
	match reduced_capacity {
		Some(reduced) => SurfaceConfig::new(width, height, pixel_density, reduced),
		None => SurfaceConfig::detect(width, height, pixel_density),
	}
}

fn now(window: &Window) -> f64 {
	window
		.performance()
		.map(|p| p.now())
		.unwrap_or_else(js_sys::Date::now)
}

fn document_visible(document: &Document) -> bool {
	!document.hidden()
}

/// Background canvas running the constellation simulation.
///
/// `reduced_capacity` forces the small-surface limits on or off; when unset,
/// narrow surfaces get them automatically. `seed` pins the random stream.
#[component]
pub fn ConstellationCanvas(
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] reduced_capacity: Option<bool>,
	#[prop(default = None)] seed: Option<u64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let engine: Rc<RefCell<Option<Engine>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let listeners: Rc<RefCell<Option<Listeners>>> = Rc::new(RefCell::new(None));

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if engine.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let mount = Mount {
			canvas,
			fullscreen,
			reduced_capacity,
			seed,
			engine: engine.clone(),
			animate: animate.clone(),
			listeners: listeners.clone(),
		};
		if let Err(err) = mount.start() {
			error!("constellation canvas failed to start: {err}");
		}
	});

	let style = if fullscreen {
		"display: block; position: fixed; inset: 0; pointer-events: none;"
	} else {
		"display: block; pointer-events: none;"
	};

	view! { <canvas node_ref=canvas_ref class="constellation-canvas" style=style aria-hidden="true" /> }
}

struct Mount {
	canvas: HtmlCanvasElement,
	fullscreen: bool,
	reduced_capacity: Option<bool>,
	seed: Option<u64>,
	engine: Rc<RefCell<Option<Engine>>>,
	animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
	listeners: Rc<RefCell<Option<Listeners>>>,
}

impl Mount {
	fn start(self) -> Result<(), RenderError> {
		let window = web_sys::window().ok_or(RenderError::ContextUnavailable)?;
		let document = window.document().ok_or(RenderError::ContextUnavailable)?;
		let ctx = context_2d(&self.canvas)?;

		let surface = measure(&window, &self.canvas, self.fullscreen, self.reduced_capacity);
		configure_backing_store(&self.canvas, &ctx, &surface)?;
		let seed = self.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
		info!(
			"constellation canvas mounted: {}x{} @{}x, seed {seed}",
			surface.width, surface.height, surface.pixel_density
		);
		let mut engine = Engine::new(surface, seed, now(&window));
		engine.set_document_visible(document_visible(&document));
		*self.engine.borrow_mut() = Some(engine);

		let resize = self.resize_listener(&ctx);
		window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;

		let visibility = self.visibility_listener(document.clone());
		document.add_event_listener_with_callback(
			"visibilitychange",
			visibility.as_ref().unchecked_ref(),
		)?;

		let intersection = match self.intersection_observer() {
			Ok(observer) => Some(observer),
			Err(err) => {
				debug!("viewport tracking unavailable: {err}");
				None
			}
		};

		*self.listeners.borrow_mut() = Some(Listeners {
			_resize: resize,
			_visibility: visibility,
			_intersection: intersection,
		});

		self.start_loop(&window, ctx)
	}

	fn resize_listener(&self, ctx: &CanvasRenderingContext2d) -> Closure<dyn FnMut()> {
		let (canvas, ctx, engine) = (self.canvas.clone(), ctx.clone(), self.engine.clone());
		let (fullscreen, reduced_capacity) = (self.fullscreen, self.reduced_capacity);
		Closure::new(move || {
			let Some(window) = web_sys::window() else {
				return;
			};
			let surface = measure(&window, &canvas, fullscreen, reduced_capacity);
			if let Err(err) = configure_backing_store(&canvas, &ctx, &surface) {
				error!("resize failed: {err}");
				return;
			}
			if let Some(ref mut engine) = *engine.borrow_mut() {
				engine.resize(surface);
			}
		})
	}

	fn visibility_listener(&self, document: Document) -> Closure<dyn FnMut()> {
		let engine = self.engine.clone();
		Closure::new(move || {
			let visible = document_visible(&document);
			debug!("document visible: {visible}");
			if let Some(ref mut engine) = *engine.borrow_mut() {
				engine.set_document_visible(visible);
			}
		})
	}

	fn intersection_observer(
		&self,
	) -> Result<(IntersectionObserver, Closure<dyn FnMut(js_sys::Array)>), RenderError> {
		let engine = self.engine.clone();
		let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
			// Only the most recent entry for our single target matters.
			let Some(entry) = entries
				.iter()
				.filter_map(|e| e.dyn_into::<IntersectionObserverEntry>().ok())
				.last()
			else {
				return;
			};
			if let Some(ref mut engine) = *engine.borrow_mut() {
				engine.set_in_viewport(entry.is_intersecting());
			}
		});
		let observer = IntersectionObserver::new(callback.as_ref().unchecked_ref())?;
		observer.observe(&self.canvas);
		Ok((observer, callback))
	}

	fn start_loop(&self, window: &Window, ctx: CanvasRenderingContext2d) -> Result<(), RenderError> {
		let (engine, animate_inner) = (self.engine.clone(), self.animate.clone());
		*self.animate.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			// Re-arm first so a failing frame never ends the loop.
			if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				if let Err(err) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
					error!("failed to schedule next frame: {}", RenderError::from(err));
				}
			}
			if let Some(ref mut engine) = *engine.borrow_mut() {
				engine.frame(timestamp, &mut CanvasSurface::new(&ctx));
			}
		}));
		if let Some(ref cb) = *self.animate.borrow() {
			window.request_animation_frame(cb.as_ref().unchecked_ref())?;
		}
		Ok(())
	}
}
