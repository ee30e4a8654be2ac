//! End-to-end scenarios for the site built from settings
//!
//! 1. Landing page to the informational page
//! 2. Repeated identical navigation
//! 3. Unknown path
//! 4. Settings toggles (analytics, default theme, fallback)

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use appflow::prelude::*;
use appflow::{BuildError, ValidationError};
use appflow_pages::testing::{RecordingRenderer, RecordingSink};
use rstest::{fixture, rstest};

struct Running {
	site: Site,
	sink: RecordingSink,
	renderer: RecordingRenderer,
	urls: Rc<RefCell<Vec<(Location, Location)>>>,
	_observer: Subscription,
}

fn start(settings: &SiteSettings) -> Running {
	let sink = RecordingSink::new();
	let renderer = RecordingRenderer::new();
	let site = build_site(settings, renderer.clone(), sink.clone()).unwrap();

	let urls = Rc::new(RefCell::new(Vec::new()));
	let observer = site.router().on_change(Url, {
		let urls = Rc::clone(&urls);
		move |new: &Location, old: &Location| urls.borrow_mut().push((new.clone(), old.clone()))
	});

	Running {
		site,
		sink,
		renderer,
		urls,
		_observer: observer,
	}
}

#[fixture]
fn running() -> Running {
	start(&SiteSettings::default())
}

#[rstest]
fn test_landing_to_why_appflow(running: Running) {
	running.site.store().set(PageTheme, Theme::Dark);

	running.site.router().push("/why-appflow").unwrap();

	assert_eq!(
		*running.urls.borrow(),
		vec![(
			Location::new("/why-appflow", ""),
			Location::new("/", "")
		)]
	);
	assert_eq!(running.site.store().get(PageTheme), Theme::Light);
	assert_eq!(running.sink.paths(), vec!["/why-appflow".to_string()]);
	assert_eq!(
		running.site.router().current_match().route().component_tag(),
		Some("why-appflow-page")
	);
	assert_eq!(running.renderer.last().as_deref(), Some("why-appflow-page"));
}

#[rstest]
fn test_repeated_navigation(running: Running) {
	let router = running.site.router();

	router.push("/why-appflow").unwrap();
	router.push("/why-appflow").unwrap();
	router.push("/why-appflow#pricing").unwrap();

	assert_eq!(running.urls.borrow().len(), 1);
	assert_eq!(running.sink.count(), 1);
	assert_eq!(running.renderer.rendered().len(), 2);
}

#[rstest]
fn test_unknown_path(running: Running) {
	let result = running.site.router().push("/does-not-exist");

	assert!(result.is_ok());
	assert!(running.site.router().current_match().is_fallback());
	assert_eq!(running.urls.borrow().len(), 1);
	assert_eq!(running.renderer.last().as_deref(), Some("not-found"));
}

#[rstest]
fn test_analytics_disabled_still_resets_theme() {
	let mut settings = SiteSettings::default();
	settings.analytics.enabled = false;
	let running = start(&settings);
	running.site.store().set(PageTheme, Theme::Dark);

	running.site.router().push("/why-appflow").unwrap();

	assert_eq!(running.sink.count(), 0);
	assert!(!running.site.analytics_enabled());
	assert_eq!(running.site.store().get(PageTheme), Theme::Light);
}

#[rstest]
fn test_settings_file_drives_site() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("appflow.toml");
	fs::write(
		&path,
		r#"
[page]
default_theme = "dark"

[router]
fallback = "page-404"

[[router.routes]]
path = "/"
component = "landing-page"

[[router.routes]]
path = "/appflow"
redirect = "/why-appflow"

[[router.routes]]
path = "/why-appflow"
component = "why-appflow-page"
"#,
	)
	.unwrap();
	let sink = RecordingSink::new();
	let renderer = RecordingRenderer::new();

	let site = appflow::load_site(&path, renderer.clone(), sink.clone()).unwrap();
	site.store().set(PageTheme, Theme::Light);
	site.router().push("/appflow").unwrap();
	site.router().push("/missing").unwrap();

	assert_eq!(site.store().get(PageTheme), Theme::Dark);
	assert_eq!(
		sink.paths(),
		vec!["/why-appflow".to_string(), "/missing".to_string()]
	);
	assert_eq!(
		renderer.rendered(),
		vec![
			"landing-page".to_string(),
			"why-appflow-page".to_string(),
			"page-404".to_string(),
		]
	);
}

#[rstest]
fn test_invalid_route_table_fails_to_build() {
	let mut settings = SiteSettings::default();
	settings.router.routes.clear();

	let result = build_site(&settings, RecordingRenderer::new(), RecordingSink::new());

	assert!(matches!(
		result,
		Err(BuildError::Routes(ValidationError::NoRoutes))
	));
}
